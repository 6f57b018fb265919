pub mod collection;
pub mod config;
pub mod editor;
pub mod error;
pub mod repository;
pub mod schema;
pub mod tool;

pub use config::ProjectConfig;
pub use editor::{EditorSettings, PropertyDraft, ToolEditor};
pub use error::{NameError, ParseError, SchemaStructureError, ToolsmithError};
pub use repository::{MemoryToolRepository, SqliteToolRepository, ToolRepository, ToolSummary};
pub use schema::{
    Coerced, EXECUTION_SPECS_PROPERTY, ExecutionPolicy, ExecutionType, ParameterTree, ParsedTool,
    Properties, PropertyDefinition, PropertyKind, Shape,
};
pub use tool::ToolDocument;
