mod common;

use serde_json::json;
use toolsmith::error::{NameError, ParseError};
use toolsmith::schema::{self, codec};
use toolsmith::{
    EXECUTION_SPECS_PROPERTY, ExecutionPolicy, ExecutionType, MemoryToolRepository,
    PropertyDraft, PropertyKind, Shape, ToolDocument, ToolEditor, ToolRepository,
};

use common::weather_tool;

#[test]
fn test_serialized_tool_reparses_to_same_tree() {
    let doc = weather_tool();
    let text = doc.to_schema().to_string();

    let parsed = schema::parse(&text).expect("serialized tool should parse");
    assert_eq!(parsed.name, doc.name);
    assert_eq!(parsed.description, doc.description);
    assert_eq!(parsed.parameters, doc.parameters);
    assert!(parsed.strict);
    assert!(schema::validate_only(&text).is_none());
}

#[test]
fn test_serialized_tool_carries_execution_specs() {
    let mut doc = weather_tool();
    doc.execution_policy = ExecutionPolicy {
        max_retry_attempts: 4,
        ..ExecutionPolicy::default()
    };
    let value = doc.to_schema();

    let specs = &value["parameters"]["properties"][EXECUTION_SPECS_PROPERTY];
    assert_eq!(specs["type"], "object");
    assert_eq!(
        specs["properties"]["type"],
        json!({"type": "string", "enum": ["client_side"]})
    );
    assert_eq!(
        specs["properties"]["maxRetryAttempts"],
        json!({"type": "number", "enum": [4]})
    );
    assert_eq!(
        specs["properties"]["waitTimeInMillis"],
        json!({"type": "number", "enum": [60000]})
    );
    let required = value["parameters"]["required"]
        .as_array()
        .expect("required array");
    assert!(!required.iter().any(|r| r == EXECUTION_SPECS_PROPERTY));
}

#[test]
fn test_weather_schema_with_enum_and_optional_field() {
    let raw = json!({
        "type": "function",
        "name": "get_weather",
        "description": "Weather lookup",
        "parameters": {
            "type": "object",
            "properties": {
                "city": {"type": "string", "description": "City"},
                "unit": {"type": "string", "enum": ["c", "f"], "default": "c"}
            },
            "required": ["city"],
            "additionalProperties": false
        },
        "strict": true
    })
    .to_string();

    let parsed = schema::parse(&raw).expect("weather schema should parse");
    let unit = parsed
        .parameters
        .properties()
        .get("unit")
        .expect("unit property");
    assert_eq!(unit.kind(), PropertyKind::Enum);
    assert_eq!(unit.default, Some(json!("c")));
    assert!(parsed.parameters.is_required("city"));
    assert!(!parsed.parameters.is_required("unit"));

    let lowered = codec::serialize(&parsed.into_document(ExecutionPolicy::default()));
    assert_eq!(
        lowered["parameters"]["properties"]["unit"],
        json!({"type": "string", "default": "c", "enum": ["c", "f"]})
    );
}

#[test]
fn test_envelope_is_unwrapped() {
    let raw = json!({
        "type": "function",
        "function": {
            "name": "lookup_user",
            "description": "Find a user",
            "parameters": {"type": "object", "properties": {}}
        }
    })
    .to_string();

    let parsed = schema::parse(&raw).expect("envelope should parse");
    assert_eq!(parsed.name, "lookup_user");
    assert!(parsed.parameters.properties().is_empty());
    assert!(parsed.strict);
}

#[test]
fn test_short_name_is_rejected() {
    let raw = json!({
        "type": "function",
        "name": "ab",
        "description": "too short",
        "parameters": {"type": "object", "properties": {}}
    })
    .to_string();

    assert_eq!(
        schema::validate_only(&raw),
        Some(ParseError::InvalidName(NameError::TooShort { min: 3 }))
    );
}

#[test]
fn test_non_object_parameters_type_is_rejected() {
    let raw = json!({
        "type": "function",
        "name": "list_things",
        "description": "d",
        "parameters": {"type": "array"}
    })
    .to_string();

    assert_eq!(
        schema::parse(&raw).unwrap_err(),
        ParseError::ParametersNotObjectType
    );
}

#[test]
fn test_pasted_execution_specs_are_ignored_for_editor_policy() {
    let mut source = weather_tool();
    source.execution_policy.max_retry_attempts = 9;
    let raw = source.to_schema().to_string();

    let local = ExecutionPolicy {
        execution_type: ExecutionType::ClientSide,
        max_retry_attempts: 2,
        wait_time_in_millis: 1_000,
    };
    let doc = schema::parse(&raw)
        .expect("parse")
        .into_document(local);
    assert_eq!(doc.execution_policy, local);
    assert!(!doc.parameters.properties().contains(EXECUTION_SPECS_PROPERTY));
}

#[test]
fn test_nested_array_of_objects_survives_round_trip() {
    let raw = json!({
        "type": "function",
        "name": "create_order",
        "description": "Create an order",
        "parameters": {
            "type": "object",
            "properties": {
                "lines": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "sku": {"type": "string"},
                            "qty": {"type": "number", "default": 1}
                        }
                    }
                }
            },
            "required": ["lines"]
        }
    })
    .to_string();

    let parsed = schema::parse(&raw).expect("parse");
    let lines = parsed.parameters.properties().get("lines").expect("lines");
    match &lines.shape {
        Shape::Array { items } => match &items.shape {
            Shape::Object { children } => {
                assert_eq!(children.names().collect::<Vec<_>>(), ["sku", "qty"]);
            }
            other => panic!("expected object items, got {:?}", other),
        },
        other => panic!("expected array, got {:?}", other),
    }

    let doc = parsed.into_document(ExecutionPolicy::default());
    let again = schema::parse(&doc.to_schema().to_string()).expect("reparse");
    assert_eq!(again.parameters, doc.parameters);
}

#[tokio::test]
async fn test_editor_builds_saves_and_reloads() {
    let repo = MemoryToolRepository::new();
    let mut editor = ToolEditor::default();
    assert!(editor.set_name("add_numbers").is_none());
    editor.set_description("Add two numbers");

    let mut draft = PropertyDraft::new("count", PropertyKind::Number);
    draft.default_text = "5".to_string();
    let coerced = editor.commit_property(&draft).expect("commit count");
    assert!(!coerced.expect("default present").is_fallback());

    let saved = editor.save(&repo).await.expect("save");
    let value = saved.to_schema();
    assert_eq!(
        value["parameters"]["properties"]["count"],
        json!({"type": "number", "default": 5})
    );
    assert_eq!(value["parameters"]["required"], json!(["count"]));

    let loaded = repo
        .get("add_numbers")
        .await
        .expect("get")
        .expect("saved tool exists");
    let reopened = ToolEditor::from_document(loaded);
    assert_eq!(reopened.parameters(), &saved.parameters);
    assert_eq!(reopened.original_name(), Some("add_numbers"));
}

#[test]
fn test_persisted_form_restores_policy() {
    let mut doc = ToolDocument::new("persist_me", "Persisted tool");
    doc.execution_policy.wait_time_in_millis = 5_000;

    let persisted = serde_json::to_string(&doc).expect("serialize");
    let restored: ToolDocument = serde_json::from_str(&persisted).expect("deserialize");
    assert_eq!(restored, doc);
}
