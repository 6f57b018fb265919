#![allow(dead_code)]

use toolsmith::{Properties, PropertyDefinition, ToolDocument};

/// A weather tool with a required string, an optional enum, and a nested object.
pub fn weather_tool() -> ToolDocument {
    let mut doc = ToolDocument::new("get_weather", "Get the current weather for a city");
    doc.parameters
        .add_or_update_property(
            "city",
            PropertyDefinition::string().with_description("City name"),
            None,
        )
        .expect("add city");
    doc.parameters
        .add_or_update_property(
            "unit",
            PropertyDefinition::enumeration(["celsius", "fahrenheit"]).with_default("celsius"),
            None,
        )
        .expect("add unit");
    doc.parameters
        .toggle_required("unit")
        .expect("unit is optional");
    doc.parameters
        .add_or_update_property(
            "location",
            PropertyDefinition::object(
                Properties::new()
                    .with("lat", PropertyDefinition::number())
                    .with("lon", PropertyDefinition::number()),
            ),
            None,
        )
        .expect("add location");
    doc
}

/// A minimal tool with a single required string parameter.
pub fn simple_tool(name: &str) -> ToolDocument {
    let mut doc = ToolDocument::new(name, format!("The {} tool", name));
    doc.parameters
        .add_or_update_property("input", PropertyDefinition::string(), None)
        .expect("add input");
    doc
}
