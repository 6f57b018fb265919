mod defaults;
mod project;

pub use defaults::{EditorDefaults, ExecutionConfig};
pub use project::{DATABASE_ENV, PROJECT_CONFIG_FILE, ProjectConfig};
