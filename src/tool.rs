use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use tracing::warn;

use crate::error::ParseError;
use crate::schema::{ExecutionPolicy, ParameterTree, codec};

/// Discriminator of every tool document.
pub const FUNCTION_TYPE: &str = "function";

/// Key holding the editor's execution policy in the persisted form.
pub const EXECUTION_SPECS_KEY: &str = "executionSpecs";

/// A complete function tool: the unit of exchange and persistence.
///
/// Serializes to the persisted form: the canonical schema from
/// [`codec::serialize`] plus an `executionSpecs` object.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolDocument {
    pub name: String,
    pub description: String,
    pub parameters: ParameterTree,
    pub strict: bool,
    pub execution_policy: ExecutionPolicy,
}

impl ToolDocument {
    /// A document with no parameters, `strict` on, and the default policy.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: ParameterTree::new(),
            strict: true,
            execution_policy: ExecutionPolicy::default(),
        }
    }

    pub fn kind(&self) -> &'static str {
        FUNCTION_TYPE
    }

    /// The canonical OpenAI-style schema, including `execution_specs`.
    pub fn to_schema(&self) -> Value {
        codec::serialize(self)
    }

    /// The canonical schema plus the `executionSpecs` policy object.
    pub fn to_persisted(&self) -> Value {
        let mut value = self.to_schema();
        if let Value::Object(map) = &mut value {
            map.insert(
                EXECUTION_SPECS_KEY.to_string(),
                serde_json::to_value(self.execution_policy).unwrap_or_default(),
            );
        }
        value
    }

    /// Restore a document from its persisted form.
    ///
    /// The schema part goes through the same validation as pasted JSON. The
    /// policy comes from `executionSpecs`, falling back to defaults when it
    /// is missing or malformed.
    pub fn from_persisted(value: &Value) -> Result<Self, ParseError> {
        let parsed = codec::parse_value(value)?;

        let policy = match value.get(EXECUTION_SPECS_KEY) {
            None | Some(Value::Null) => ExecutionPolicy::default(),
            Some(specs) => serde_json::from_value(specs.clone()).unwrap_or_else(|e| {
                warn!(name = %parsed.name, error = %e, "invalid executionSpecs, using defaults");
                ExecutionPolicy::default()
            }),
        };

        Ok(parsed.into_document(policy))
    }
}

impl Serialize for ToolDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_persisted().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ToolDocument {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_persisted(&value).map_err(serde::de::Error::custom)
    }
}
