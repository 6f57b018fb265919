use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use toolsmith::config::ExecutionConfig;
use toolsmith::{
    ProjectConfig, SqliteToolRepository, ToolEditor, ToolRepository, collection, schema,
};

#[derive(Parser)]
#[command(name = "toolsmith", version)]
#[command(about = "Build, validate, and store OpenAI-style function tools", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Tool database (defaults to $TOOLSMITH_DB, the config file, then ~/.toolsmith/tools.db)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a function schema file without saving it
    Validate {
        /// Schema file, or - for stdin
        file: String,
    },

    /// Print the canonical form of a function schema file
    Preview {
        /// Schema file, or - for stdin
        file: String,

        #[command(flatten)]
        policy: PolicyArgs,
    },

    /// Validate a function schema file and save it
    Import {
        /// Schema file, or - for stdin
        file: String,

        #[command(flatten)]
        policy: PolicyArgs,
    },

    /// List saved tools
    List,

    /// Print a saved tool
    Show {
        /// Tool name
        name: String,

        /// Include the executionSpecs policy object
        #[arg(long)]
        persisted: bool,
    },

    /// Rename a saved tool
    Rename {
        /// Current name
        old_name: String,

        /// New name
        new_name: String,
    },

    /// Delete a saved tool
    Delete {
        /// Tool name
        name: String,
    },

    /// Export all saved tools as one JSON collection
    Export {
        /// Output file path (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Import a JSON collection of tools (name-keyed object or array)
    ImportCollection {
        /// Collection file, or - for stdin
        file: String,
    },
}

/// Overrides for the configured execution policy
#[derive(Args)]
struct PolicyArgs {
    /// Retries after the first failed attempt
    #[arg(long)]
    max_retry_attempts: Option<u32>,

    /// Total wait budget across retries, in milliseconds
    #[arg(long)]
    wait_time_ms: Option<u64>,
}

impl PolicyArgs {
    fn editor(&self, config: &ProjectConfig) -> ToolEditor {
        let overrides = ExecutionConfig {
            max_retry_attempts: self.max_retry_attempts,
            wait_time_in_millis: self.wait_time_ms,
        };
        let mut settings = config.editor_settings();
        settings.execution_policy = config.execution.clone().merge(overrides).policy();
        ToolEditor::new(settings)
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive("info".parse().expect("valid log directive"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_input(file: &str) -> Result<String> {
    if file == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("failed to read stdin")?;
        Ok(text)
    } else {
        std::fs::read_to_string(file).with_context(|| format!("failed to read {}", file))
    }
}

fn open_repository(config: &ProjectConfig, cli_db: Option<&Path>) -> Result<SqliteToolRepository> {
    let path = config.database_path(cli_db)?;
    debug!(path = %path.display(), "opening tool database");
    SqliteToolRepository::new(&path).context("failed to initialize tool database")
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = ProjectConfig::load().context("failed to load configuration")?;

    match cli.command {
        Commands::Validate { file } => {
            let raw = read_input(&file)?;
            if let Some(e) = schema::validate_only(&raw) {
                anyhow::bail!("{}", e);
            }
            println!("valid");
        }

        Commands::Preview { file, policy } => {
            let raw = read_input(&file)?;
            let preview = policy.editor(&config).json_preview(&raw)?;
            println!("{}", serde_json::to_string_pretty(&preview)?);
        }

        Commands::Import { file, policy } => {
            let raw = read_input(&file)?;
            let repo = open_repository(&config, cli.db.as_deref())?;
            let doc = policy.editor(&config).save_from_json(&repo, &raw).await?;
            println!("Saved tool: {}", doc.name);
        }

        Commands::List => {
            let repo = open_repository(&config, cli.db.as_deref())?;
            let tools = repo.list().await?;

            if tools.is_empty() {
                println!("No tools found.");
                return Ok(());
            }

            println!("{:<32} {:<6} DESCRIPTION", "NAME", "PARAMS");
            println!("{}", "-".repeat(70));
            for tool in tools {
                println!("{}", tool);
            }
        }

        Commands::Show { name, persisted } => {
            let repo = open_repository(&config, cli.db.as_deref())?;
            let doc = repo
                .get(&name)
                .await?
                .ok_or_else(|| anyhow::anyhow!("tool not found: {}", name))?;
            let value = if persisted {
                doc.to_persisted()
            } else {
                doc.to_schema()
            };
            println!("{}", serde_json::to_string_pretty(&value)?);
        }

        Commands::Rename { old_name, new_name } => {
            schema::validate_function_name(&new_name)
                .with_context(|| format!("invalid tool name: {}", new_name))?;
            let repo = open_repository(&config, cli.db.as_deref())?;
            repo.rename(&old_name, &new_name).await?;
            println!("Renamed tool {} to {}", old_name, new_name);
        }

        Commands::Delete { name } => {
            let repo = open_repository(&config, cli.db.as_deref())?;
            repo.delete(&name).await?;
            println!("Deleted tool: {}", name);
        }

        Commands::Export { output } => {
            let repo = open_repository(&config, cli.db.as_deref())?;
            let mut tools = Vec::new();
            for summary in repo.list().await? {
                if let Some(doc) = repo.get(&summary.name).await? {
                    tools.push(doc);
                }
            }
            let json = serde_json::to_string_pretty(&collection::to_json(&tools))
                .context("failed to serialize tools")?;

            match output {
                Some(path) => {
                    std::fs::write(&path, json)
                        .with_context(|| format!("failed to write to {}", path.display()))?;
                    info!(count = tools.len(), path = %path.display(), "exported tools");
                    println!("Exported {} tools to {}", tools.len(), path.display());
                }
                None => println!("{}", json),
            }
        }

        Commands::ImportCollection { file } => {
            let text = read_input(&file)?;
            let tools = collection::from_json(&text)?;
            let repo = open_repository(&config, cli.db.as_deref())?;
            for tool in &tools {
                repo.put(tool)
                    .await
                    .with_context(|| format!("failed to save {}", tool.name))?;
            }
            info!(count = tools.len(), "imported collection");
            println!("Imported {} tools", tools.len());
        }
    }

    Ok(())
}
