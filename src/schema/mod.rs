//! The schema engine: the parameter tree model and the codec that converts it
//! to and from OpenAI-style function tool JSON. Everything here is pure.

pub mod codec;
mod coerce;
mod execution;
mod name;
mod property;
mod tree;

pub use codec::{ParsedTool, parse, serialize, validate_only};
pub use coerce::{Coerced, coerce_default};
pub use execution::{EXECUTION_SPECS_PROPERTY, ExecutionPolicy, ExecutionType};
pub use name::{MIN_FUNCTION_NAME_LEN, validate_function_name, validate_property_name};
pub use property::{Properties, PropertyDefinition, PropertyKind, Shape};
pub use tree::ParameterTree;
