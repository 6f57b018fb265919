use std::collections::BTreeMap;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::debug;

use super::{ToolRepository, ToolSummary};
use crate::tool::ToolDocument;

/// In-process tool repository, mainly for tests and previews.
#[derive(Default)]
pub struct MemoryToolRepository {
    tools: Mutex<BTreeMap<String, (ToolDocument, DateTime<Utc>)>>,
}

impl MemoryToolRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ToolRepository for MemoryToolRepository {
    async fn get(&self, name: &str) -> Result<Option<ToolDocument>> {
        let tools = self.tools.lock().await;
        Ok(tools.get(name).map(|(doc, _)| doc.clone()))
    }

    async fn put(&self, tool: &ToolDocument) -> Result<()> {
        let mut tools = self.tools.lock().await;
        tools.insert(tool.name.clone(), (tool.clone(), Utc::now()));
        debug!(name = %tool.name, "saved tool");
        Ok(())
    }

    async fn rename(&self, old_name: &str, new_name: &str) -> Result<()> {
        let mut tools = self.tools.lock().await;
        if !tools.contains_key(old_name) {
            anyhow::bail!("tool '{}' not found", old_name);
        }
        if old_name == new_name {
            return Ok(());
        }
        if tools.contains_key(new_name) {
            anyhow::bail!("tool '{}' already exists", new_name);
        }
        if let Some((mut doc, _)) = tools.remove(old_name) {
            doc.name = new_name.to_string();
            tools.insert(new_name.to_string(), (doc, Utc::now()));
        }
        debug!(from = %old_name, to = %new_name, "renamed tool");
        Ok(())
    }

    async fn replace(&self, previous_name: &str, tool: &ToolDocument) -> Result<()> {
        let mut tools = self.tools.lock().await;
        if previous_name != tool.name && tools.contains_key(&tool.name) {
            anyhow::bail!("tool '{}' already exists", tool.name);
        }
        tools.remove(previous_name);
        tools.insert(tool.name.clone(), (tool.clone(), Utc::now()));
        debug!(from = %previous_name, to = %tool.name, "replaced tool");
        Ok(())
    }

    async fn delete(&self, name: &str) -> Result<()> {
        let mut tools = self.tools.lock().await;
        if tools.remove(name).is_none() {
            anyhow::bail!("tool '{}' not found", name);
        }
        debug!(name = %name, "deleted tool");
        Ok(())
    }

    async fn list(&self) -> Result<Vec<ToolSummary>> {
        let tools = self.tools.lock().await;
        Ok(tools
            .values()
            .map(|(doc, updated_at)| ToolSummary {
                name: doc.name.clone(),
                description: doc.description.clone(),
                property_count: doc.parameters.properties().len(),
                updated_at: updated_at.to_rfc3339(),
            })
            .collect())
    }
}
