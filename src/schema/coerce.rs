use serde_json::{Number, Value};

use super::property::PropertyKind;

/// Outcome of coercing a raw default-value input to a property kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Coerced {
    /// The text was converted to the kind's JSON type.
    Typed(Value),
    /// Conversion failed; the raw text is kept as a string default.
    Fallback { raw: String, reason: String },
}

impl Coerced {
    /// The value to store as the property default.
    pub fn into_value(self) -> Value {
        match self {
            Self::Typed(value) => value,
            Self::Fallback { raw, .. } => Value::String(raw),
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }
}

/// Coerce the text typed into a default-value field.
///
/// Returns `None` for blank input (no default). Failures do not reject the
/// input: they yield [`Coerced::Fallback`] holding the raw text.
pub fn coerce_default(raw: &str, kind: PropertyKind) -> Option<Coerced> {
    if raw.trim().is_empty() {
        return None;
    }

    let coerced = match kind {
        PropertyKind::String => Coerced::Typed(Value::String(raw.to_string())),
        PropertyKind::Enum => Coerced::Typed(Value::String(raw.trim().to_string())),
        PropertyKind::Boolean => Coerced::Typed(Value::Bool(raw.eq_ignore_ascii_case("true"))),
        PropertyKind::Number => match parse_number(raw.trim()) {
            Some(n) => Coerced::Typed(Value::Number(n)),
            None => Coerced::Fallback {
                raw: raw.to_string(),
                reason: format!("'{}' is not a finite number", raw.trim()),
            },
        },
        PropertyKind::Object | PropertyKind::Array => match serde_json::from_str(raw) {
            Ok(value) => Coerced::Typed(value),
            Err(e) => Coerced::Fallback {
                raw: raw.to_string(),
                reason: format!("invalid JSON: {}", e),
            },
        },
    };
    Some(coerced)
}

/// Integers stay integers so `5` does not turn into `5.0`.
fn parse_number(text: &str) -> Option<Number> {
    if let Ok(i) = text.parse::<i64>() {
        return Some(Number::from(i));
    }
    if let Ok(u) = text.parse::<u64>() {
        return Some(Number::from(u));
    }
    text.parse::<f64>().ok().and_then(Number::from_f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn typed(raw: &str, kind: PropertyKind) -> Value {
        match coerce_default(raw, kind) {
            Some(Coerced::Typed(v)) => v,
            other => panic!("expected typed value for {:?}, got {:?}", raw, other),
        }
    }

    #[test]
    fn blank_means_no_default() {
        for kind in PropertyKind::ALL {
            assert_eq!(coerce_default("", kind), None);
            assert_eq!(coerce_default("  ", kind), None);
        }
    }

    #[test]
    fn numbers() {
        assert_eq!(typed("5", PropertyKind::Number), json!(5));
        assert_eq!(typed(" -2 ", PropertyKind::Number), json!(-2));
        assert_eq!(typed("2.5", PropertyKind::Number), json!(2.5));
        assert_eq!(typed("1e3", PropertyKind::Number), json!(1000.0));

        let fallback = coerce_default("abc", PropertyKind::Number).unwrap();
        assert!(fallback.is_fallback());
        assert_eq!(fallback.into_value(), json!("abc"));

        assert!(coerce_default("inf", PropertyKind::Number).unwrap().is_fallback());
    }

    #[test]
    fn booleans_compare_case_insensitively() {
        assert_eq!(typed("true", PropertyKind::Boolean), json!(true));
        assert_eq!(typed("TRUE", PropertyKind::Boolean), json!(true));
        assert_eq!(typed("yes", PropertyKind::Boolean), json!(false));
        assert_eq!(typed("false", PropertyKind::Boolean), json!(false));
    }

    #[test]
    fn objects_and_arrays_parse_json() {
        assert_eq!(
            typed(r#"{"a": 1}"#, PropertyKind::Object),
            json!({"a": 1})
        );
        assert_eq!(typed("[1, 2]", PropertyKind::Array), json!([1, 2]));

        match coerce_default("{not json", PropertyKind::Object) {
            Some(Coerced::Fallback { raw, reason }) => {
                assert_eq!(raw, "{not json");
                assert!(reason.starts_with("invalid JSON"));
            }
            other => panic!("expected fallback, got {:?}", other),
        }
    }

    #[test]
    fn strings_are_literal_and_enums_trimmed() {
        assert_eq!(typed(" hi ", PropertyKind::String), json!(" hi "));
        assert_eq!(typed(" celsius ", PropertyKind::Enum), json!("celsius"));
    }
}
