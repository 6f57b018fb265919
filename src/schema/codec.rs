//! Conversion between [`ToolDocument`] values and OpenAI-style function tool
//! JSON.
//!
//! [`serialize`] lowers a document to its canonical JSON form, always
//! injecting the `execution_specs` property. [`parse`] accepts pasted JSON in
//! any of the three supported envelopes, validates it, and raises it back
//! into a [`ParameterTree`]. Lowering and raising are exact inverses for
//! every tree the editor can build.

use serde_json::{Map, Value, json};
use tracing::debug;

use super::execution::{EXECUTION_SPECS_PROPERTY, ExecutionPolicy};
use super::name::{validate_function_name, validate_property_name};
use super::property::{PropertyDefinition, Properties, Shape};
use super::tree::ParameterTree;
use crate::error::{ParseError, SchemaStructureError};
use crate::tool::{FUNCTION_TYPE, ToolDocument};

/// Name, description, parameters, and strict flag read from pasted JSON.
///
/// Carries no execution policy: any policy in the input is discarded and the
/// editor's own policy is attached via [`ParsedTool::into_document`].
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedTool {
    pub name: String,
    pub description: String,
    pub parameters: ParameterTree,
    pub strict: bool,
}

impl ParsedTool {
    pub fn into_document(self, policy: ExecutionPolicy) -> ToolDocument {
        ToolDocument {
            name: self.name,
            description: self.description,
            parameters: self.parameters,
            strict: self.strict,
            execution_policy: policy,
        }
    }
}

/// Lower a document to its canonical JSON form.
pub fn serialize(doc: &ToolDocument) -> Value {
    let mut properties = lower_properties(doc.parameters.properties());
    properties.insert(
        EXECUTION_SPECS_PROPERTY.to_string(),
        doc.execution_policy.to_reserved_property(),
    );

    json!({
        "type": doc.kind(),
        "name": doc.name,
        "description": doc.description,
        "parameters": {
            "type": "object",
            "properties": properties,
            "required": doc.parameters.required(),
            "additionalProperties": doc.parameters.additional_properties(),
        },
        "strict": doc.strict,
    })
}

/// Lower a single property definition to its JSON Schema form.
pub fn lower_property(def: &PropertyDefinition) -> Value {
    let mut schema = Map::new();
    schema.insert("type".to_string(), json!(def.kind().schema_type()));
    if let Some(description) = &def.description {
        schema.insert("description".to_string(), json!(description));
    }
    if let Some(default) = &def.default {
        schema.insert("default".to_string(), default.clone());
    }
    match &def.shape {
        Shape::Enum { values } => {
            schema.insert("enum".to_string(), json!(values));
        }
        Shape::Object { children } => {
            schema.insert(
                "properties".to_string(),
                Value::Object(lower_properties(children)),
            );
        }
        Shape::Array { items } => {
            schema.insert("items".to_string(), lower_property(items));
        }
        Shape::String | Shape::Number | Shape::Boolean => {}
    }
    Value::Object(schema)
}

fn lower_properties(props: &Properties) -> Map<String, Value> {
    props
        .iter()
        .map(|(name, def)| (name.to_string(), lower_property(def)))
        .collect()
}

/// Parse and validate pasted tool JSON.
pub fn parse(raw: &str) -> Result<ParsedTool, ParseError> {
    if raw.trim().is_empty() {
        return Err(ParseError::Empty);
    }
    let value: Value = serde_json::from_str(raw).map_err(|e| {
        let message = e.to_string();
        ParseError::MalformedJson(message.lines().next().unwrap_or_default().to_string())
    })?;
    parse_value(&value)
}

/// Validate pasted tool JSON without keeping the result.
///
/// Runs exactly the checks of [`parse`], so the two always agree.
pub fn validate_only(raw: &str) -> Option<ParseError> {
    parse(raw).err()
}

/// [`parse`] for an already-decoded JSON value.
pub fn parse_value(value: &Value) -> Result<ParsedTool, ParseError> {
    let function = unwrap_envelope(value).ok_or(ParseError::NotAFunctionTool)?;

    let name = function
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .trim();
    validate_function_name(name).map_err(ParseError::InvalidName)?;

    let description = function
        .get("description")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .ok_or(ParseError::InvalidDescription)?;

    let params = function
        .get("parameters")
        .and_then(Value::as_object)
        .ok_or(ParseError::ParametersNotObject)?;
    if params.get("type").and_then(Value::as_str) != Some("object") {
        return Err(ParseError::ParametersNotObjectType);
    }

    let parameters = raise_tree(params)?;
    let strict = function.get("strict").is_none_or(truthy);

    debug!(
        name = %name,
        properties = parameters.properties().len(),
        "parsed tool schema"
    );

    Ok(ParsedTool {
        name: name.to_string(),
        description: description.to_string(),
        parameters,
        strict,
    })
}

/// Locate the function object inside one of the accepted envelopes.
///
/// In priority order: `{type: "function", function: {...}}`, then
/// `{type: "function", name, parameters, ...}`, then a bare
/// `{name, parameters, ...}`.
fn unwrap_envelope(value: &Value) -> Option<&Map<String, Value>> {
    let obj = value.as_object()?;
    let is_function_type = obj.get("type").and_then(Value::as_str) == Some(FUNCTION_TYPE);

    if is_function_type {
        if let Some(function) = obj.get("function").and_then(Value::as_object) {
            return Some(function);
        }
    }

    let has_name_and_parameters =
        obj.get("name").is_some_and(truthy) && obj.get("parameters").is_some_and(truthy);
    has_name_and_parameters.then_some(obj)
}

/// JSON truthiness: everything except `null`, `false`, `0`, and `""`.
fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn raise_tree(params: &Map<String, Value>) -> Result<ParameterTree, ParseError> {
    let properties = match params.get("properties") {
        None | Some(Value::Null) => Properties::new(),
        Some(Value::Object(map)) => {
            let mut props = Properties::new();
            for (name, schema) in map {
                if name == EXECUTION_SPECS_PROPERTY {
                    continue;
                }
                check_name(name, name)?;
                props.insert(name.clone(), raise_property(name, schema)?);
            }
            props
        }
        Some(_) => return Err(ParseError::PropertiesNotObject),
    };

    let required = match params.get("required") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => {
            let mut names = Vec::with_capacity(items.len());
            for item in items {
                let name = item.as_str().ok_or(ParseError::InvalidRequired)?;
                if name == EXECUTION_SPECS_PROPERTY {
                    continue;
                }
                if !properties.contains(name) {
                    return Err(ParseError::UnknownRequired(name.to_string()));
                }
                names.push(name.to_string());
            }
            names
        }
        Some(_) => return Err(ParseError::InvalidRequired),
    };

    let additional_properties = params.get("additionalProperties").is_some_and(truthy);

    ParameterTree::from_parts(properties, required, additional_properties).map_err(|e| match e {
        SchemaStructureError::UnknownProperty(name) => ParseError::UnknownRequired(name),
        other => ParseError::InvalidProperty {
            path: String::new(),
            reason: other.to_string(),
        },
    })
}

fn check_name(path: &str, name: &str) -> Result<(), ParseError> {
    validate_property_name(name).map_err(|e| invalid(path, e))?;
    if name == EXECUTION_SPECS_PROPERTY {
        return Err(invalid(
            path,
            SchemaStructureError::ReservedName(name.to_string()),
        ));
    }
    Ok(())
}

fn invalid(path: &str, reason: impl ToString) -> ParseError {
    ParseError::InvalidProperty {
        path: path.to_string(),
        reason: reason.to_string(),
    }
}

/// Raise one property schema. `path` names it for error messages, with
/// `.child` for object properties and `[]` for array items.
fn raise_property(path: &str, schema: &Value) -> Result<PropertyDefinition, ParseError> {
    let obj = schema
        .as_object()
        .ok_or_else(|| invalid(path, "property schema must be an object"))?;

    let schema_type = obj
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| invalid(path, "missing \"type\""))?;

    let enum_values = match obj.get("enum") {
        None | Some(Value::Null) => None,
        Some(Value::Array(values)) if schema_type == "string" => {
            let values = values
                .iter()
                .map(|v| v.as_str().map(str::to_string))
                .collect::<Option<Vec<_>>>()
                .ok_or_else(|| invalid(path, "enum values must be strings"))?;
            Some(values)
        }
        Some(Value::Array(_)) => {
            return Err(invalid(path, "enum is only supported on string properties"));
        }
        Some(_) => return Err(invalid(path, "enum must be an array")),
    };

    if schema_type != "object" && obj.contains_key("properties") {
        return Err(invalid(path, "properties is only allowed on object properties"));
    }
    if schema_type != "array" && obj.contains_key("items") {
        return Err(invalid(path, "items is only allowed on array properties"));
    }

    let shape = match schema_type {
        "string" => match enum_values {
            Some(values) if !values.is_empty() => Shape::Enum { values },
            _ => Shape::String,
        },
        "number" => Shape::Number,
        "boolean" => Shape::Boolean,
        "object" => {
            let children = match obj.get("properties") {
                None | Some(Value::Null) => Properties::new(),
                Some(Value::Object(map)) => {
                    let mut children = Properties::new();
                    for (name, child) in map {
                        let child_path = format!("{}.{}", path, name);
                        check_name(&child_path, name)?;
                        children.insert(name.clone(), raise_property(&child_path, child)?);
                    }
                    children
                }
                Some(_) => return Err(invalid(path, "properties must be an object")),
            };
            Shape::Object { children }
        }
        "array" => {
            let items = obj
                .get("items")
                .filter(|items| !items.is_null())
                .ok_or_else(|| invalid(path, SchemaStructureError::ArrayRequiresItems))?;
            Shape::Array {
                items: Box::new(raise_property(&format!("{}[]", path), items)?),
            }
        }
        other => {
            return Err(invalid(
                path,
                format!(
                    "unsupported type \"{}\" (expected: string, number, boolean, object, array)",
                    other
                ),
            ));
        }
    };

    let description = match obj.get("description") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => return Err(invalid(path, "description must be a string")),
    };

    let def = PropertyDefinition {
        shape,
        description,
        default: obj.get("default").filter(|d| !d.is_null()).cloned(),
    };
    // Children are already validated, so only this level's rules can fail.
    def.validate().map_err(|e| invalid(path, e))?;
    Ok(def)
}
