//! The reference map shared between resolver and interpreter.
//!
//! The resolver owns one insertion-ordered map per batch and passes it by
//! shared reference into every evaluation; resolved tokens land in it as
//! [`RefEntry::Value`]. External callers may seed raw JSON instead -
//! lookups coerce it on the way in.

use indexmap::IndexMap;

use tksc_sym::value::is_valid_hex;
use tksc_sym::{Color, Dictionary, List, Number, Unit, Value, WithUnit};

/// The active reference map: `{name}` → entry, insertion-ordered.
pub type References = IndexMap<String, RefEntry>;

/// One reference entry: an already-evaluated value or raw JSON to coerce.
#[derive(Clone, Debug)]
pub enum RefEntry {
    Value(Value),
    Raw(serde_json::Value),
}

impl RefEntry {
    /// The value this entry resolves to.
    pub fn to_value(&self) -> Value {
        match self {
            RefEntry::Value(value) => value.deep_copy(),
            RefEntry::Raw(json) => json_to_value(json),
        }
    }
}

/// Coerces raw JSON into a runtime value:
/// arrays become lists, a string that validates as hex becomes a hex
/// color, a `{value, unit}` record becomes a dimensioned number, and any
/// other object becomes a dictionary.
pub fn json_to_value(json: &serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Boolean(*b),
        serde_json::Value::Number(n) => {
            let value = n.as_f64().unwrap_or(0.0);
            Value::Number(Number::new(value, !n.is_i64() && !n.is_u64()))
        }
        serde_json::Value::String(s) => {
            if is_valid_hex(s) {
                Value::Color(Color::Hex(s.clone()))
            } else {
                Value::Str(s.clone())
            }
        }
        serde_json::Value::Array(items) => {
            Value::List(List::explicit(items.iter().map(json_to_value).collect()))
        }
        serde_json::Value::Object(fields) => {
            if let Some(with_unit) = unit_record(fields) {
                return with_unit;
            }
            let entries = fields
                .iter()
                .map(|(k, v)| (k.clone(), json_to_value(v)))
                .collect();
            Value::Dictionary(Dictionary { entries })
        }
    }
}

/// `{"value": 16, "unit": "px"}` → `16px`.
fn unit_record(fields: &serde_json::Map<String, serde_json::Value>) -> Option<Value> {
    if fields.len() != 2 {
        return None;
    }
    let value = fields.get("value")?.as_f64()?;
    let unit = fields.get("unit")?.as_str()?;
    let is_float = fields
        .get("value")
        .map(|n| !n.is_i64() && !n.is_u64())
        .unwrap_or(false);
    Some(Value::WithUnit(WithUnit::new(
        value,
        is_float,
        Unit::new(unit),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalars() {
        assert_eq!(json_to_value(&serde_json::json!(null)), Value::Null);
        assert_eq!(
            json_to_value(&serde_json::json!(true)),
            Value::Boolean(true)
        );
        assert_eq!(json_to_value(&serde_json::json!(16)), Value::int(16.0));
        assert_eq!(json_to_value(&serde_json::json!(1.5)), Value::float(1.5));
        assert_eq!(json_to_value(&serde_json::json!("solid")), Value::str("solid"));
    }

    #[test]
    fn test_hex_string_becomes_color() {
        assert_eq!(
            json_to_value(&serde_json::json!("#ff0080")),
            Value::Color(Color::Hex("#ff0080".into()))
        );
        assert_eq!(
            json_to_value(&serde_json::json!("#ff00")),
            Value::str("#ff00")
        );
    }

    #[test]
    fn test_array_becomes_list() {
        let v = json_to_value(&serde_json::json!([1, "a"]));
        match v {
            Value::List(list) => {
                assert_eq!(list.items.len(), 2);
                assert!(!list.is_implicit);
            }
            other => panic!("expected list, got {other:?}"),
        }
    }

    #[test]
    fn test_unit_record() {
        assert_eq!(
            json_to_value(&serde_json::json!({"value": 16, "unit": "px"})),
            Value::with_unit(16.0, false, "px")
        );
    }

    #[test]
    fn test_plain_object_becomes_dictionary() {
        let v = json_to_value(&serde_json::json!({"a": 1, "value": 2}));
        assert!(matches!(v, Value::Dictionary(_)));

        // Three fields is not a unit record even with value/unit present.
        let v = json_to_value(&serde_json::json!({"value": 1, "unit": "px", "x": 0}));
        assert!(matches!(v, Value::Dictionary(_)));
    }

    #[test]
    fn test_entry_coercion() {
        let entry = RefEntry::Raw(serde_json::json!([1, 2]));
        assert!(matches!(entry.to_value(), Value::List(_)));

        let entry = RefEntry::Value(Value::int(4.0));
        assert_eq!(entry.to_value(), Value::int(4.0));
    }
}
