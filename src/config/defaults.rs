use serde::{Deserialize, Serialize};

use crate::schema::ExecutionPolicy;

/// `[execution]` table: the policy attached to new and imported tools.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Retries after the first failed attempt
    #[serde(default)]
    pub max_retry_attempts: Option<u32>,

    /// Total wait budget across retries, in milliseconds
    #[serde(default)]
    pub wait_time_in_millis: Option<u64>,
}

impl ExecutionConfig {
    /// Fields set in `other` win.
    pub fn merge(self, other: Self) -> Self {
        Self {
            max_retry_attempts: other.max_retry_attempts.or(self.max_retry_attempts),
            wait_time_in_millis: other.wait_time_in_millis.or(self.wait_time_in_millis),
        }
    }

    pub fn policy(&self) -> ExecutionPolicy {
        let defaults = ExecutionPolicy::default();
        ExecutionPolicy {
            execution_type: defaults.execution_type,
            max_retry_attempts: self
                .max_retry_attempts
                .unwrap_or(defaults.max_retry_attempts),
            wait_time_in_millis: self
                .wait_time_in_millis
                .unwrap_or(defaults.wait_time_in_millis),
        }
    }
}

/// `[defaults]` table: initial switches of a new editor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorDefaults {
    #[serde(default)]
    pub strict: Option<bool>,

    #[serde(default)]
    pub additional_properties: Option<bool>,
}

impl EditorDefaults {
    /// Fields set in `other` win.
    pub fn merge(self, other: Self) -> Self {
        Self {
            strict: other.strict.or(self.strict),
            additional_properties: other.additional_properties.or(self.additional_properties),
        }
    }
}
