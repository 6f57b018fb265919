use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Name of the synthetic property that mirrors the execution policy inside
/// `parameters.properties`.
pub const EXECUTION_SPECS_PROPERTY: &str = "execution_specs";

/// Where a tool is executed. Only client-side execution exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionType {
    #[default]
    ClientSide,
}

impl fmt::Display for ExecutionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ClientSide => write!(f, "client_side"),
        }
    }
}

impl FromStr for ExecutionType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "client_side" => Ok(Self::ClientSide),
            _ => anyhow::bail!("invalid execution type '{}' (expected: client_side)", s),
        }
    }
}

/// Retry and timeout budget attached to a tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionPolicy {
    #[serde(rename = "type", default)]
    pub execution_type: ExecutionType,

    #[serde(default = "default_max_retry_attempts")]
    pub max_retry_attempts: u32,

    /// Total wait budget across all retries.
    #[serde(default = "default_wait_time_in_millis")]
    pub wait_time_in_millis: u64,
}

fn default_max_retry_attempts() -> u32 {
    1
}

fn default_wait_time_in_millis() -> u64 {
    60_000
}

impl Default for ExecutionPolicy {
    fn default() -> Self {
        Self {
            execution_type: ExecutionType::default(),
            max_retry_attempts: default_max_retry_attempts(),
            wait_time_in_millis: default_wait_time_in_millis(),
        }
    }
}

impl ExecutionPolicy {
    /// The `execution_specs` property schema injected at serialization time.
    pub fn to_reserved_property(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "type": { "type": "string", "enum": [self.execution_type.to_string()] },
                "maxRetryAttempts": { "type": "number", "enum": [self.max_retry_attempts] },
                "waitTimeInMillis": { "type": "number", "enum": [self.wait_time_in_millis] },
            }
        })
    }
}
