use tracing::debug;

use super::property::{PropertyDefinition, Properties, Shape, check_enum_default, validate_entry};
use crate::error::SchemaStructureError;

/// The `parameters` object of a tool: properties, required names, and the
/// `additionalProperties` flag.
///
/// `required` only ever names existing properties, in the order they were
/// marked required. The reserved execution policy property is never part of
/// the tree; it is added by the codec on serialization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterTree {
    properties: Properties,
    required: Vec<String>,
    additional_properties: bool,
}

impl ParameterTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assemble a tree from parts, enforcing every tree invariant.
    pub fn from_parts(
        properties: Properties,
        required: Vec<String>,
        additional_properties: bool,
    ) -> Result<Self, SchemaStructureError> {
        for (name, def) in properties.iter() {
            validate_entry(name, def)?;
        }
        let mut deduped: Vec<String> = Vec::with_capacity(required.len());
        for name in required {
            if !properties.contains(&name) {
                return Err(SchemaStructureError::UnknownProperty(name));
            }
            if !deduped.contains(&name) {
                deduped.push(name);
            }
        }
        Ok(Self {
            properties,
            required: deduped,
            additional_properties,
        })
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    pub fn required(&self) -> &[String] {
        &self.required
    }

    pub fn is_required(&self, name: &str) -> bool {
        self.required.iter().any(|r| r == name)
    }

    pub fn additional_properties(&self) -> bool {
        self.additional_properties
    }

    pub fn set_additional_properties(&mut self, allowed: bool) {
        self.additional_properties = allowed;
    }

    /// Add a new property, update one in place, or rename one.
    ///
    /// New properties are marked required. A rename carries the old name's
    /// required status over to the new name.
    pub fn add_or_update_property(
        &mut self,
        name: &str,
        def: PropertyDefinition,
        previous_name: Option<&str>,
    ) -> Result<(), SchemaStructureError> {
        self.properties.add_or_update(name, def, previous_name)?;

        match previous_name {
            None => {
                if !self.is_required(name) {
                    self.required.push(name.to_string());
                }
                debug!(name = %name, "added property");
            }
            Some(prev) if prev != name => {
                for r in self.required.iter_mut().filter(|r| *r == prev) {
                    *r = name.to_string();
                }
                debug!(from = %prev, to = %name, "renamed property");
            }
            Some(_) => debug!(name = %name, "updated property"),
        }
        Ok(())
    }

    /// Remove a property and its required marking. Absent names are ignored.
    pub fn remove_property(&mut self, name: &str) -> Option<PropertyDefinition> {
        self.required.retain(|r| r != name);
        self.properties.remove(name)
    }

    /// Flip whether `name` is required. Returns the new status.
    pub fn toggle_required(&mut self, name: &str) -> Result<bool, SchemaStructureError> {
        if !self.properties.contains(name) {
            return Err(SchemaStructureError::UnknownProperty(name.to_string()));
        }
        if self.is_required(name) {
            self.required.retain(|r| r != name);
            Ok(false)
        } else {
            self.required.push(name.to_string());
            Ok(true)
        }
    }

    /// Replace the sub-properties of an existing object property.
    pub fn set_nested_children(
        &mut self,
        name: &str,
        children: Properties,
    ) -> Result<(), SchemaStructureError> {
        let def = self.property_mut(name)?;
        if !matches!(def.shape, Shape::Object { .. }) {
            return Err(SchemaStructureError::NotAnObject(name.to_string()));
        }
        let candidate = Shape::Object { children };
        PropertyDefinition::new(candidate.clone()).validate()?;
        def.shape = candidate;
        Ok(())
    }

    /// Replace the item schema of an existing array property.
    pub fn set_nested_items(
        &mut self,
        name: &str,
        items: PropertyDefinition,
    ) -> Result<(), SchemaStructureError> {
        let def = self.property_mut(name)?;
        if !matches!(def.shape, Shape::Array { .. }) {
            return Err(SchemaStructureError::NotAnArray(name.to_string()));
        }
        items.validate()?;
        def.shape = Shape::Array {
            items: Box::new(items),
        };
        Ok(())
    }

    /// Replace the value set of an existing enum property.
    ///
    /// Fails if the property's current default is not in the new set.
    pub fn set_enum_values(
        &mut self,
        name: &str,
        values: Vec<String>,
    ) -> Result<(), SchemaStructureError> {
        let def = self.property_mut(name)?;
        if !matches!(def.shape, Shape::Enum { .. }) {
            return Err(SchemaStructureError::NotAnEnum(name.to_string()));
        }
        if values.is_empty() {
            return Err(SchemaStructureError::EnumRequiresValues);
        }
        check_enum_default(def.default.as_ref(), &values)?;
        def.shape = Shape::Enum { values };
        Ok(())
    }

    fn property_mut(&mut self, name: &str) -> Result<&mut PropertyDefinition, SchemaStructureError> {
        self.properties
            .get_mut(name)
            .ok_or_else(|| SchemaStructureError::UnknownProperty(name.to_string()))
    }
}
