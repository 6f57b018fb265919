mod memory;
mod sqlite;

pub use memory::MemoryToolRepository;
pub use sqlite::SqliteToolRepository;

use anyhow::Result;
use async_trait::async_trait;

use crate::tool::ToolDocument;

/// Storage for tool documents, keyed by tool name.
#[async_trait]
pub trait ToolRepository: Send + Sync {
    /// Load a tool by name
    async fn get(&self, name: &str) -> Result<Option<ToolDocument>>;

    /// Insert or overwrite the tool stored under `tool.name`
    async fn put(&self, tool: &ToolDocument) -> Result<()>;

    /// Move a stored tool to a new name.
    ///
    /// Fails if `old_name` is missing or `new_name` belongs to another tool.
    async fn rename(&self, old_name: &str, new_name: &str) -> Result<()>;

    /// Store `tool` and drop the entry under `previous_name` in one step.
    ///
    /// Used when a tool was renamed while being edited. Fails, changing
    /// nothing, if `tool.name` belongs to another tool.
    async fn replace(&self, previous_name: &str, tool: &ToolDocument) -> Result<()>;

    /// Delete a tool. Fails if it does not exist.
    async fn delete(&self, name: &str) -> Result<()>;

    /// List all tools, sorted by name
    async fn list(&self) -> Result<Vec<ToolSummary>>;
}

/// Summary of a stored tool for listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolSummary {
    pub name: String,
    pub description: String,
    pub property_count: usize,
    pub updated_at: String,
}

impl std::fmt::Display for ToolSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let description: String = if self.description.chars().count() > 50 {
            self.description.chars().take(47).collect::<String>() + "..."
        } else {
            self.description.clone()
        };

        write!(
            f,
            "{:<32} {:<6} {}",
            self.name, self.property_count, description
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_display_truncates_long_descriptions() {
        let summary = ToolSummary {
            name: "get_weather".to_string(),
            description: "x".repeat(80),
            property_count: 2,
            updated_at: "2026-01-01T00:00:00+00:00".to_string(),
        };
        let line = summary.to_string();
        assert!(line.starts_with("get_weather"));
        assert!(line.ends_with("..."));
        assert_eq!(line.chars().filter(|c| *c == 'x').count(), 47);
    }
}
