use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{EditorDefaults, ExecutionConfig};
use crate::editor::EditorSettings;
use crate::repository::SqliteToolRepository;

/// Project config file, looked up in the current directory
pub const PROJECT_CONFIG_FILE: &str = "toolsmith.toml";

/// Environment variable overriding the database path
pub const DATABASE_ENV: &str = "TOOLSMITH_DB";

/// Layered configuration: project file over global file over defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// SQLite database holding saved tools
    #[serde(default)]
    pub database: Option<PathBuf>,

    /// Execution policy for new and imported tools
    #[serde(default)]
    pub execution: ExecutionConfig,

    /// Initial editor switches
    #[serde(default)]
    pub defaults: EditorDefaults,
}

impl ProjectConfig {
    /// Load `~/.config/toolsmith/config.toml`, then `./toolsmith.toml` on top.
    pub fn load() -> Result<Self> {
        let global = std::env::var("HOME")
            .ok()
            .map(|home| PathBuf::from(home).join(".config/toolsmith/config.toml"));
        let project = PathBuf::from(PROJECT_CONFIG_FILE);
        Self::load_from(global.as_deref(), Some(&project))
    }

    /// Load and merge explicit files. Missing files are skipped.
    pub fn load_from(global: Option<&Path>, project: Option<&Path>) -> Result<Self> {
        let mut config = Self::default();
        for path in [global, project].into_iter().flatten() {
            if let Some(layer) = Self::read_file(path)? {
                config = config.merge(layer);
            }
        }
        Ok(config)
    }

    fn read_file(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        debug!(path = %path.display(), "loaded config file");
        Ok(Some(config))
    }

    /// Fields set in `other` win.
    pub fn merge(self, other: Self) -> Self {
        Self {
            database: other.database.or(self.database),
            execution: self.execution.merge(other.execution),
            defaults: self.defaults.merge(other.defaults),
        }
    }

    /// Database path: explicit flag, then `TOOLSMITH_DB`, then config, then
    /// `~/.toolsmith/tools.db`.
    pub fn database_path(&self, cli: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = cli {
            return Ok(path.to_path_buf());
        }
        if let Some(path) = std::env::var_os(DATABASE_ENV).filter(|p| !p.is_empty()) {
            return Ok(PathBuf::from(path));
        }
        if let Some(path) = &self.database {
            return Ok(path.clone());
        }
        SqliteToolRepository::default_path()
    }

    /// Settings for a fresh editor session.
    pub fn editor_settings(&self) -> EditorSettings {
        let fallback = EditorSettings::default();
        EditorSettings {
            strict: self.defaults.strict.unwrap_or(fallback.strict),
            additional_properties: self
                .defaults
                .additional_properties
                .unwrap_or(fallback.additional_properties),
            execution_policy: self.execution.policy(),
        }
    }
}
