/// Rejection reasons for function and property names.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NameError {
    #[error("name is required")]
    Empty,

    #[error("name must be at least {min} characters long")]
    TooShort { min: usize },

    #[error(
        "name must start with a letter and can only contain letters, numbers, and underscores (e.g., add_two_numbers)"
    )]
    InvalidFormat,
}

/// Violations of the parameter tree's structural rules.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaStructureError {
    #[error("invalid property name: {0}")]
    Name(#[from] NameError),

    #[error("'{0}' is reserved for the execution policy")]
    ReservedName(String),

    #[error("property already exists: {0}")]
    DuplicateName(String),

    #[error("no such property: {0}")]
    UnknownProperty(String),

    #[error("enum type requires at least one enum value")]
    EnumRequiresValues,

    #[error("default value '{value}' must be one of the defined enum values")]
    EnumDefaultNotInSet { value: String },

    #[error("object type requires at least one property")]
    ObjectRequiresChildren,

    #[error("array type requires an items definition")]
    ArrayRequiresItems,

    #[error("property '{0}' is not an object")]
    NotAnObject(String),

    #[error("property '{0}' is not an array")]
    NotAnArray(String),

    #[error("property '{0}' is not an enum")]
    NotAnEnum(String),

    #[error("{path}: {source}")]
    InvalidChild {
        path: String,
        source: Box<SchemaStructureError>,
    },
}

impl SchemaStructureError {
    /// Innermost error, skipping any `InvalidChild` wrappers.
    pub fn root_cause(&self) -> &SchemaStructureError {
        match self {
            Self::InvalidChild { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

/// Reasons a pasted tool document is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("paste a function schema to continue")]
    Empty,

    #[error("invalid JSON: {0}")]
    MalformedJson(String),

    #[error("schema must be an OpenAI function tool")]
    NotAFunctionTool,

    #[error("invalid function name: {0}")]
    InvalidName(NameError),

    #[error("function description is required")]
    InvalidDescription,

    #[error("parameters must be an object")]
    ParametersNotObject,

    #[error("parameters.type must be \"object\"")]
    ParametersNotObjectType,

    #[error("parameters.properties must be an object")]
    PropertiesNotObject,

    #[error("invalid property '{path}': {reason}")]
    InvalidProperty { path: String, reason: String },

    #[error("parameters.required must be an array of property names")]
    InvalidRequired,

    #[error("required property '{0}' is not defined in parameters.properties")]
    UnknownRequired(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ToolsmithError {
    #[error("invalid function name: {0}")]
    Name(#[from] NameError),

    #[error("schema error: {0}")]
    Structure(#[from] SchemaStructureError),

    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("please enter a description")]
    MissingDescription,

    #[error("repository error: {0}")]
    Repository(String),

    #[error("tool not found: {0}")]
    NotFound(String),
}
