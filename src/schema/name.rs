use std::sync::LazyLock;

use regex::Regex;

use crate::error::NameError;

/// Minimum length of a function name. Property names have no minimum.
pub const MIN_FUNCTION_NAME_LEN: usize = 3;

static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9_]*$").expect("valid identifier regex"));

/// Validate a tool's function name.
///
/// Blankness and length are judged on the trimmed value, the format on the
/// value as given, so surrounding whitespace is still rejected.
pub fn validate_function_name(name: &str) -> Result<(), NameError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(NameError::Empty);
    }
    if trimmed.chars().count() < MIN_FUNCTION_NAME_LEN {
        return Err(NameError::TooShort {
            min: MIN_FUNCTION_NAME_LEN,
        });
    }
    check_format(name)
}

/// Validate a property name (same identifier rule, no minimum length).
pub fn validate_property_name(name: &str) -> Result<(), NameError> {
    if name.trim().is_empty() {
        return Err(NameError::Empty);
    }
    check_format(name)
}

fn check_format(name: &str) -> Result<(), NameError> {
    if IDENTIFIER.is_match(name) {
        Ok(())
    } else {
        Err(NameError::InvalidFormat)
    }
}
