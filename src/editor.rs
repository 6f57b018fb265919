//! Editing session for a single tool.
//!
//! [`ToolEditor`] holds the state behind a tool form: name, description, the
//! parameter tree, switches, and the execution policy. Raw form input enters
//! through [`PropertyDraft`]; the tree operations themselves live in
//! [`ParameterTree`].

use serde_json::Value;
use tracing::{info, warn};

use crate::error::{NameError, ParseError, SchemaStructureError, ToolsmithError};
use crate::repository::ToolRepository;
use crate::schema::{
    Coerced, ExecutionPolicy, ParameterTree, Properties, PropertyDefinition, PropertyKind, Shape,
    codec, coerce_default, validate_function_name,
};
use crate::tool::ToolDocument;

/// Initial switches and policy for a new editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditorSettings {
    pub strict: bool,
    pub additional_properties: bool,
    pub execution_policy: ExecutionPolicy,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            strict: true,
            additional_properties: false,
            execution_policy: ExecutionPolicy::default(),
        }
    }
}

/// Raw contents of the property form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyDraft {
    pub name: String,
    pub kind: PropertyKind,
    pub description: String,
    /// Default value as typed; coerced to `kind` on commit.
    pub default_text: String,
    pub enum_values: Vec<String>,
    pub children: Properties,
    pub items: Option<PropertyDefinition>,
    /// Name of the property being edited, `None` when adding.
    pub editing: Option<String>,
}

impl PropertyDraft {
    pub fn new(name: impl Into<String>, kind: PropertyKind) -> Self {
        Self {
            name: name.into(),
            kind,
            ..Default::default()
        }
    }

    /// Build the definition, returning the default's coercion outcome too.
    pub fn to_definition(
        &self,
    ) -> Result<(PropertyDefinition, Option<Coerced>), SchemaStructureError> {
        let shape = match self.kind {
            PropertyKind::String => Shape::String,
            PropertyKind::Number => Shape::Number,
            PropertyKind::Boolean => Shape::Boolean,
            PropertyKind::Enum => Shape::Enum {
                values: self.enum_values.clone(),
            },
            PropertyKind::Object => Shape::Object {
                children: self.children.clone(),
            },
            PropertyKind::Array => Shape::Array {
                items: Box::new(
                    self.items
                        .clone()
                        .ok_or(SchemaStructureError::ArrayRequiresItems)?,
                ),
            },
        };

        let description = Some(self.description.trim())
            .filter(|d| !d.is_empty())
            .map(str::to_string);
        let coerced = coerce_default(&self.default_text, self.kind);

        let def = PropertyDefinition {
            shape,
            description,
            default: coerced.clone().map(Coerced::into_value),
        };
        Ok((def, coerced))
    }

    /// Load an existing property back into form fields.
    pub fn from_definition(name: &str, def: &PropertyDefinition) -> Self {
        let mut draft = Self::new(name, def.kind());
        draft.description = def.description.clone().unwrap_or_default();
        draft.default_text = match &def.default {
            None => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        };
        match &def.shape {
            Shape::Enum { values } => draft.enum_values = values.clone(),
            Shape::Object { children } => draft.children = children.clone(),
            Shape::Array { items } => draft.items = Some(items.as_ref().clone()),
            Shape::String | Shape::Number | Shape::Boolean => {}
        }
        draft.editing = Some(name.to_string());
        draft
    }
}

/// State of one tool being created or edited.
#[derive(Debug, Clone)]
pub struct ToolEditor {
    name: String,
    description: String,
    parameters: ParameterTree,
    strict: bool,
    execution_policy: ExecutionPolicy,
    show_execution_policy: bool,
    /// Stored name of the tool being edited, used to rename on save.
    original_name: Option<String>,
}

impl ToolEditor {
    pub fn new(settings: EditorSettings) -> Self {
        let mut parameters = ParameterTree::new();
        parameters.set_additional_properties(settings.additional_properties);
        Self {
            name: String::new(),
            description: String::new(),
            parameters,
            strict: settings.strict,
            execution_policy: settings.execution_policy,
            show_execution_policy: false,
            original_name: None,
        }
    }

    /// Open an existing tool for editing.
    pub fn from_document(doc: ToolDocument) -> Self {
        Self {
            original_name: Some(doc.name.clone()),
            name: doc.name,
            description: doc.description,
            parameters: doc.parameters,
            strict: doc.strict,
            execution_policy: doc.execution_policy,
            show_execution_policy: false,
        }
    }

    /// Load a stored tool for editing.
    pub async fn open(repo: &dyn ToolRepository, name: &str) -> Result<Self, ToolsmithError> {
        let doc = repo
            .get(name)
            .await
            .map_err(|e| ToolsmithError::Repository(format!("{:#}", e)))?
            .ok_or_else(|| ToolsmithError::NotFound(name.to_string()))?;
        Ok(Self::from_document(doc))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn parameters(&self) -> &ParameterTree {
        &self.parameters
    }

    pub fn strict(&self) -> bool {
        self.strict
    }

    pub fn execution_policy(&self) -> ExecutionPolicy {
        self.execution_policy
    }

    pub fn shows_execution_policy(&self) -> bool {
        self.show_execution_policy
    }

    pub fn original_name(&self) -> Option<&str> {
        self.original_name.as_deref()
    }

    /// Set the name and return its live validation result.
    pub fn set_name(&mut self, name: impl Into<String>) -> Option<NameError> {
        self.name = name.into();
        validate_function_name(&self.name).err()
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    pub fn set_strict(&mut self, strict: bool) {
        self.strict = strict;
    }

    pub fn set_additional_properties(&mut self, allowed: bool) {
        self.parameters.set_additional_properties(allowed);
    }

    pub fn set_execution_policy(&mut self, policy: ExecutionPolicy) {
        self.execution_policy = policy;
    }

    /// Show or hide the policy controls. Output always carries the policy.
    pub fn set_show_execution_policy(&mut self, show: bool) {
        self.show_execution_policy = show;
    }

    /// Whether the form may be saved: valid name and a description.
    pub fn is_valid(&self) -> bool {
        validate_function_name(&self.name).is_ok() && !self.description.trim().is_empty()
    }

    /// Apply the property form. Returns the default's coercion outcome so
    /// callers can warn about a fallback.
    pub fn commit_property(
        &mut self,
        draft: &PropertyDraft,
    ) -> Result<Option<Coerced>, SchemaStructureError> {
        let (def, coerced) = draft.to_definition()?;
        self.parameters
            .add_or_update_property(&draft.name, def, draft.editing.as_deref())?;

        if let Some(Coerced::Fallback { reason, .. }) = &coerced {
            warn!(property = %draft.name, reason = %reason, "default value kept as raw text");
        }
        Ok(coerced)
    }

    /// Form fields for an existing property.
    pub fn edit_property(&self, name: &str) -> Option<PropertyDraft> {
        self.parameters
            .properties()
            .get(name)
            .map(|def| PropertyDraft::from_definition(name, def))
    }

    pub fn remove_property(&mut self, name: &str) {
        self.parameters.remove_property(name);
    }

    pub fn toggle_required(&mut self, name: &str) -> Result<bool, SchemaStructureError> {
        self.parameters.toggle_required(name)
    }

    pub fn set_nested_children(
        &mut self,
        name: &str,
        children: Properties,
    ) -> Result<(), SchemaStructureError> {
        self.parameters.set_nested_children(name, children)
    }

    pub fn set_nested_items(
        &mut self,
        name: &str,
        items: PropertyDefinition,
    ) -> Result<(), SchemaStructureError> {
        self.parameters.set_nested_items(name, items)
    }

    pub fn set_enum_values(
        &mut self,
        name: &str,
        values: Vec<String>,
    ) -> Result<(), SchemaStructureError> {
        self.parameters.set_enum_values(name, values)
    }

    fn snapshot(&self) -> ToolDocument {
        ToolDocument {
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
            parameters: self.parameters.clone(),
            strict: self.strict,
            execution_policy: self.execution_policy,
        }
    }

    /// Live preview of the canonical document, valid or not.
    pub fn preview(&self) -> Value {
        codec::serialize(&self.snapshot())
    }

    /// Validate name and description and produce the document.
    pub fn build(&self) -> Result<ToolDocument, ToolsmithError> {
        validate_function_name(&self.name)?;
        if self.description.trim().is_empty() {
            return Err(ToolsmithError::MissingDescription);
        }
        Ok(self.snapshot())
    }

    /// Build and store the tool, replacing the original entry on rename.
    pub async fn save(&mut self, repo: &dyn ToolRepository) -> Result<ToolDocument, ToolsmithError> {
        let doc = self.build()?;

        let result = match self.original_name.as_deref() {
            Some(previous) if previous != doc.name => repo.replace(previous, &doc).await,
            _ => repo.put(&doc).await,
        };
        result.map_err(|e| ToolsmithError::Repository(format!("{:#}", e)))?;

        info!(name = %doc.name, "tool saved");
        self.original_name = Some(doc.name.clone());
        Ok(doc)
    }

    /// Canonical preview of pasted JSON with this editor's policy attached.
    pub fn json_preview(&self, raw: &str) -> Result<Value, ParseError> {
        let doc = codec::parse(raw)?.into_document(self.execution_policy);
        Ok(codec::serialize(&doc))
    }

    /// Replace the form contents with pasted JSON. The policy is kept.
    pub fn load_json(&mut self, raw: &str) -> Result<(), ParseError> {
        let parsed = codec::parse(raw)?;
        self.name = parsed.name;
        self.description = parsed.description;
        self.parameters = parsed.parameters;
        self.strict = parsed.strict;
        Ok(())
    }

    /// Parse pasted JSON and store it with this editor's policy.
    pub async fn save_from_json(
        &self,
        repo: &dyn ToolRepository,
        raw: &str,
    ) -> Result<ToolDocument, ToolsmithError> {
        let doc = codec::parse(raw)?.into_document(self.execution_policy);
        repo.put(&doc)
            .await
            .map_err(|e| ToolsmithError::Repository(format!("{:#}", e)))?;
        info!(name = %doc.name, "tool saved from JSON");
        Ok(doc)
    }
}

impl Default for ToolEditor {
    fn default() -> Self {
        Self::new(EditorSettings::default())
    }
}
