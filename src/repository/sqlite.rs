use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, Transaction};
use tokio::task;
use tracing::debug;

use super::{ToolRepository, ToolSummary};
use crate::tool::ToolDocument;

/// SQLite-based tool repository
pub struct SqliteToolRepository {
    /// Path to the SQLite database file
    db_path: PathBuf,
}

/// Open a SQLite connection with standard pragmas (busy_timeout).
fn open_connection(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)
        .with_context(|| format!("failed to open database: {}", db_path.display()))?;
    conn.execute_batch("PRAGMA busy_timeout=5000;")
        .context("failed to set busy_timeout")?;
    Ok(conn)
}

fn load_data(tx: &Transaction<'_>, name: &str) -> Result<Option<String>> {
    let data = tx
        .query_row("SELECT data FROM tools WHERE name = ?1", [name], |row| {
            row.get::<_, String>(0)
        })
        .optional()?;
    Ok(data)
}

fn exists(tx: &Transaction<'_>, name: &str) -> Result<bool> {
    let count: i64 = tx.query_row(
        "SELECT COUNT(*) FROM tools WHERE name = ?1",
        [name],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Insert or update, keeping `created_at` of an existing row.
fn upsert(conn: &Connection, tool: &ToolDocument) -> Result<()> {
    let data = serde_json::to_string(tool)?;
    let now = Utc::now().to_rfc3339();

    conn.execute(
        "INSERT INTO tools (name, description, property_count, created_at, updated_at, data)
         VALUES (?1, ?2, ?3, ?4, ?4, ?5)
         ON CONFLICT(name) DO UPDATE SET
            description = excluded.description,
            property_count = excluded.property_count,
            updated_at = excluded.updated_at,
            data = excluded.data",
        rusqlite::params![
            tool.name,
            tool.description,
            tool.parameters.properties().len() as i64,
            now,
            data,
        ],
    )?;
    Ok(())
}

impl SqliteToolRepository {
    /// Create a new SQLite repository at the given path
    pub fn new(db_path: impl Into<PathBuf>) -> Result<Self> {
        let db_path = db_path.into();

        // Create parent directories if they don't exist
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory: {}", parent.display()))?;
        }

        let repository = Self { db_path };
        repository.init_schema()?;

        Ok(repository)
    }

    /// Default database location (~/.toolsmith/tools.db)
    pub fn default_path() -> Result<PathBuf> {
        let home = std::env::var("HOME").context("HOME environment variable not set")?;
        Ok(PathBuf::from(home).join(".toolsmith").join("tools.db"))
    }

    /// Create a repository at the default location
    pub fn default_location() -> Result<Self> {
        Self::new(Self::default_path()?)
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Initialize the database schema
    fn init_schema(&self) -> Result<()> {
        let conn = open_connection(&self.db_path)?;

        conn.execute_batch("PRAGMA journal_mode=WAL;")
            .context("failed to set WAL mode")?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS tools (
                name TEXT PRIMARY KEY,
                description TEXT NOT NULL,
                property_count INTEGER NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                data TEXT NOT NULL
            )",
            [],
        )
        .context("failed to create tools table")?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_tools_updated ON tools(updated_at)",
            [],
        )
        .context("failed to create updated_at index")?;

        debug!(path = %self.db_path.display(), "initialized SQLite tool repository");

        Ok(())
    }
}

#[async_trait]
impl ToolRepository for SqliteToolRepository {
    async fn get(&self, name: &str) -> Result<Option<ToolDocument>> {
        let name = name.to_string();
        let db_path = self.db_path.clone();

        task::spawn_blocking(move || {
            let conn = open_connection(&db_path)?;

            let data = conn
                .query_row("SELECT data FROM tools WHERE name = ?1", [&name], |row| {
                    row.get::<_, String>(0)
                })
                .optional()?;

            match data {
                Some(data) => {
                    let tool: ToolDocument = serde_json::from_str(&data)
                        .with_context(|| format!("stored tool '{}' is corrupt", name))?;
                    debug!(name = %name, "loaded tool");
                    Ok(Some(tool))
                }
                None => Ok(None),
            }
        })
        .await
        .context("spawn_blocking failed")?
    }

    async fn put(&self, tool: &ToolDocument) -> Result<()> {
        let tool = tool.clone();
        let db_path = self.db_path.clone();

        task::spawn_blocking(move || {
            let conn = open_connection(&db_path)?;
            upsert(&conn, &tool)?;
            debug!(name = %tool.name, "saved tool");
            Ok::<_, anyhow::Error>(())
        })
        .await
        .context("spawn_blocking failed")??;

        Ok(())
    }

    async fn rename(&self, old_name: &str, new_name: &str) -> Result<()> {
        let old_name = old_name.to_string();
        let new_name = new_name.to_string();
        let db_path = self.db_path.clone();

        task::spawn_blocking(move || {
            let mut conn = open_connection(&db_path)?;
            let tx = conn.transaction()?;

            let data = load_data(&tx, &old_name)?
                .ok_or_else(|| anyhow::anyhow!("tool '{}' not found", old_name))?;
            if old_name == new_name {
                return Ok(());
            }
            if exists(&tx, &new_name)? {
                anyhow::bail!("tool '{}' already exists", new_name);
            }

            let mut tool: ToolDocument = serde_json::from_str(&data)
                .with_context(|| format!("stored tool '{}' is corrupt", old_name))?;
            tool.name = new_name.clone();

            tx.execute("DELETE FROM tools WHERE name = ?1", [&old_name])?;
            upsert(&tx, &tool)?;
            tx.commit()?;

            debug!(from = %old_name, to = %new_name, "renamed tool");
            Ok::<_, anyhow::Error>(())
        })
        .await
        .context("spawn_blocking failed")??;

        Ok(())
    }

    async fn replace(&self, previous_name: &str, tool: &ToolDocument) -> Result<()> {
        let previous_name = previous_name.to_string();
        let tool = tool.clone();
        let db_path = self.db_path.clone();

        task::spawn_blocking(move || {
            let mut conn = open_connection(&db_path)?;
            let tx = conn.transaction()?;

            if previous_name != tool.name {
                if exists(&tx, &tool.name)? {
                    anyhow::bail!("tool '{}' already exists", tool.name);
                }
                tx.execute("DELETE FROM tools WHERE name = ?1", [&previous_name])?;
            }
            upsert(&tx, &tool)?;
            tx.commit()?;

            debug!(from = %previous_name, to = %tool.name, "replaced tool");
            Ok::<_, anyhow::Error>(())
        })
        .await
        .context("spawn_blocking failed")??;

        Ok(())
    }

    async fn delete(&self, name: &str) -> Result<()> {
        let name = name.to_string();
        let db_path = self.db_path.clone();

        task::spawn_blocking(move || {
            let conn = open_connection(&db_path)?;
            conn.execute("DELETE FROM tools WHERE name = ?1", [&name])?;
            if conn.changes() == 0 {
                anyhow::bail!("tool '{}' not found", name);
            }
            debug!(name = %name, "deleted tool");
            Ok::<_, anyhow::Error>(())
        })
        .await
        .context("spawn_blocking failed")??;

        Ok(())
    }

    async fn list(&self) -> Result<Vec<ToolSummary>> {
        let db_path = self.db_path.clone();

        task::spawn_blocking(move || {
            let conn = open_connection(&db_path)?;

            let mut stmt = conn.prepare(
                "SELECT name, description, property_count, updated_at
                 FROM tools
                 ORDER BY name",
            )?;

            let tools = stmt
                .query_map([], |row| {
                    Ok(ToolSummary {
                        name: row.get(0)?,
                        description: row.get(1)?,
                        property_count: row.get::<_, i64>(2)? as usize,
                        updated_at: row.get(3)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;

            Ok(tools)
        })
        .await
        .context("spawn_blocking failed")?
    }
}
