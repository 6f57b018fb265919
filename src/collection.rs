//! The "all tools under one key" exchange format.
//!
//! A collection is a JSON object mapping tool name to persisted tool. Older
//! exports stored a JSON array of tools instead; both are accepted on input.

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use tracing::warn;

use crate::tool::ToolDocument;

/// Decode a collection. Entries that fail validation are skipped with a
/// warning; a later entry with the same name replaces an earlier one.
pub fn from_json(text: &str) -> Result<Vec<ToolDocument>> {
    let value: Value = serde_json::from_str(text).context("collection is not valid JSON")?;

    let entries: Vec<(String, Value)> = match value {
        Value::Object(map) => map.into_iter().collect(),
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, item)| (format!("#{}", i), item))
            .collect(),
        _ => anyhow::bail!("collection must be a JSON object or array"),
    };

    let mut tools: Vec<ToolDocument> = Vec::with_capacity(entries.len());
    for (key, entry) in entries {
        match ToolDocument::from_persisted(&entry) {
            Ok(tool) => match tools.iter_mut().find(|t| t.name == tool.name) {
                Some(existing) => *existing = tool,
                None => tools.push(tool),
            },
            Err(e) => warn!(entry = %key, error = %e, "skipping invalid tool"),
        }
    }
    Ok(tools)
}

/// Encode tools as a name-keyed collection.
pub fn to_json(tools: &[ToolDocument]) -> Value {
    let map: Map<String, Value> = tools
        .iter()
        .map(|tool| (tool.name.clone(), tool.to_persisted()))
        .collect();
    Value::Object(map)
}
