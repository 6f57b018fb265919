use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use super::execution::EXECUTION_SPECS_PROPERTY;
use super::name::validate_property_name;
use crate::error::SchemaStructureError;

/// Editing-level kind of a property.
///
/// `Enum` is a refinement of JSON Schema `string` carrying a closed value set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PropertyKind {
    #[default]
    String,
    Number,
    Boolean,
    Object,
    Array,
    Enum,
}

impl PropertyKind {
    pub const ALL: [PropertyKind; 6] = [
        Self::String,
        Self::Number,
        Self::Boolean,
        Self::Object,
        Self::Array,
        Self::Enum,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Object => "object",
            Self::Array => "array",
            Self::Enum => "enum",
        }
    }

    /// The JSON Schema `type` this kind lowers to.
    pub fn schema_type(&self) -> &'static str {
        match self {
            Self::Enum => "string",
            other => other.as_str(),
        }
    }
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PropertyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| {
                format!(
                    "unsupported type '{}' (expected: string, number, boolean, object, array, enum)",
                    s
                )
            })
    }
}

/// Kind-specific payload of a property.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    String,
    Number,
    Boolean,
    Enum { values: Vec<String> },
    Object { children: Properties },
    Array { items: Box<PropertyDefinition> },
}

impl Shape {
    pub fn kind(&self) -> PropertyKind {
        match self {
            Self::String => PropertyKind::String,
            Self::Number => PropertyKind::Number,
            Self::Boolean => PropertyKind::Boolean,
            Self::Enum { .. } => PropertyKind::Enum,
            Self::Object { .. } => PropertyKind::Object,
            Self::Array { .. } => PropertyKind::Array,
        }
    }
}

/// A single entry of a tool's parameter schema.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDefinition {
    pub shape: Shape,
    pub description: Option<String>,
    pub default: Option<Value>,
}

impl PropertyDefinition {
    pub fn new(shape: Shape) -> Self {
        Self {
            shape,
            description: None,
            default: None,
        }
    }

    pub fn string() -> Self {
        Self::new(Shape::String)
    }

    pub fn number() -> Self {
        Self::new(Shape::Number)
    }

    pub fn boolean() -> Self {
        Self::new(Shape::Boolean)
    }

    pub fn enumeration<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(Shape::Enum {
            values: values.into_iter().map(Into::into).collect(),
        })
    }

    pub fn object(children: Properties) -> Self {
        Self::new(Shape::Object { children })
    }

    pub fn array(items: PropertyDefinition) -> Self {
        Self::new(Shape::Array {
            items: Box::new(items),
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn kind(&self) -> PropertyKind {
        self.shape.kind()
    }

    /// Check the structural rules for this definition and everything below it.
    pub fn validate(&self) -> Result<(), SchemaStructureError> {
        match &self.shape {
            Shape::String | Shape::Number | Shape::Boolean => Ok(()),
            Shape::Enum { values } => {
                if values.is_empty() {
                    return Err(SchemaStructureError::EnumRequiresValues);
                }
                check_enum_default(self.default.as_ref(), values)
            }
            Shape::Object { children } => {
                if children.is_empty() {
                    return Err(SchemaStructureError::ObjectRequiresChildren);
                }
                for (name, child) in children.iter() {
                    validate_entry(name, child).map_err(|e| nest(name, e))?;
                }
                Ok(())
            }
            Shape::Array { items } => items.validate().map_err(|e| nest("items", e)),
        }
    }
}

/// An enum default must be one of the values; non-string defaults never are.
pub(crate) fn check_enum_default(
    default: Option<&Value>,
    values: &[String],
) -> Result<(), SchemaStructureError> {
    let Some(default) = default else {
        return Ok(());
    };
    match default.as_str() {
        Some(s) if values.iter().any(|v| v == s) => Ok(()),
        Some(s) => Err(SchemaStructureError::EnumDefaultNotInSet {
            value: s.to_string(),
        }),
        None => Err(SchemaStructureError::EnumDefaultNotInSet {
            value: default.to_string(),
        }),
    }
}

/// Validate a named entry: its name, then its definition.
pub(crate) fn validate_entry(
    name: &str,
    def: &PropertyDefinition,
) -> Result<(), SchemaStructureError> {
    validate_property_name(name)?;
    if name == EXECUTION_SPECS_PROPERTY {
        return Err(SchemaStructureError::ReservedName(name.to_string()));
    }
    def.validate()
}

fn nest(segment: &str, err: SchemaStructureError) -> SchemaStructureError {
    match err {
        SchemaStructureError::InvalidChild { path, source } => SchemaStructureError::InvalidChild {
            path: format!("{}.{}", segment, path),
            source,
        },
        other => SchemaStructureError::InvalidChild {
            path: segment.to_string(),
            source: Box::new(other),
        },
    }
}

/// Ordered map of property name to definition.
///
/// Names are unique. Iteration follows insertion order; equality does not.
#[derive(Debug, Clone, Default)]
pub struct Properties {
    entries: Vec<(String, PropertyDefinition)>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&PropertyDefinition> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, def)| def)
    }

    pub(crate) fn get_mut(&mut self, name: &str) -> Option<&mut PropertyDefinition> {
        self.entries
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, def)| def)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyDefinition)> {
        self.entries.iter().map(|(n, def)| (n.as_str(), def))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    /// Insert or replace without validation. Replacing keeps the position.
    pub fn insert(&mut self, name: impl Into<String>, def: PropertyDefinition) {
        let name = name.into();
        match self.position(&name) {
            Some(i) => self.entries[i].1 = def,
            None => self.entries.push((name, def)),
        }
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, name: impl Into<String>, def: PropertyDefinition) -> Self {
        self.insert(name, def);
        self
    }

    pub fn remove(&mut self, name: &str) -> Option<PropertyDefinition> {
        let i = self.position(name)?;
        Some(self.entries.remove(i).1)
    }

    /// Validated add, update, or rename of one entry.
    ///
    /// With `previous_name = None` this adds a new entry and fails if the name
    /// is taken. With `Some(prev)` it replaces `prev`, renaming it in place
    /// when `prev != name`. Nothing changes on error.
    pub fn add_or_update(
        &mut self,
        name: &str,
        def: PropertyDefinition,
        previous_name: Option<&str>,
    ) -> Result<(), SchemaStructureError> {
        validate_entry(name, &def)?;

        match previous_name {
            None => {
                if self.contains(name) {
                    return Err(SchemaStructureError::DuplicateName(name.to_string()));
                }
                self.entries.push((name.to_string(), def));
            }
            Some(prev) => {
                let i = self
                    .position(prev)
                    .ok_or_else(|| SchemaStructureError::UnknownProperty(prev.to_string()))?;
                if prev != name && self.contains(name) {
                    return Err(SchemaStructureError::DuplicateName(name.to_string()));
                }
                self.entries[i] = (name.to_string(), def);
            }
        }
        Ok(())
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|(n, _)| n == name)
    }
}

impl PartialEq for Properties {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(name, def)| other.get(name).is_some_and(|o| o == def))
    }
}

impl<S: Into<String>> FromIterator<(S, PropertyDefinition)> for Properties {
    fn from_iter<I: IntoIterator<Item = (S, PropertyDefinition)>>(iter: I) -> Self {
        let mut props = Self::new();
        for (name, def) in iter {
            props.insert(name, def);
        }
        props
    }
}
