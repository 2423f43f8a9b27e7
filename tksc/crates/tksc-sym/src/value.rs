//! The tagged value enum and its per-variant behavior.

use std::fmt;

use indexmap::IndexMap;

use crate::error::{Result, SymbolError};
use crate::number::{format_color_component, format_number};

/// A runtime value.
///
/// Everything a script can produce is one of these variants. Values own
/// their data outright, so [`Value::deep_copy`] is a structural clone and
/// stored elements can never alias a live variable.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// Absent value (`null` / `undefined`).
    Null,
    /// Dimensionless number.
    Number(Number),
    /// Number carrying a unit, e.g. `16px`.
    WithUnit(WithUnit),
    /// UTF-8 string, quoted or identifier-like.
    Str(String),
    /// `true` / `false`.
    Boolean(bool),
    /// Ordered sequence; implicit lists render space-separated.
    List(List),
    /// Insertion-ordered string-keyed map.
    Dictionary(Dictionary),
    /// Hex literal or schema-defined dynamic color.
    Color(Color),
}

/// Dimensionless number payload.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Number {
    pub value: f64,
    /// Whether a decimal point has entered the computation; preserved so
    /// integer arithmetic stays integer-printable.
    pub is_float: bool,
}

impl Number {
    pub fn int(value: f64) -> Self {
        Self {
            value,
            is_float: false,
        }
    }

    pub fn float(value: f64) -> Self {
        Self {
            value,
            is_float: true,
        }
    }

    pub fn new(value: f64, is_float: bool) -> Self {
        Self { value, is_float }
    }
}

/// Unit tag, canonical lowercase (`px`, `rem`, `%`, ...).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Unit(String);

impl Unit {
    pub fn new(keyword: impl Into<String>) -> Self {
        Self(keyword.into().to_lowercase())
    }

    /// The canonical keyword.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `Px`-style form used in `type_name()`; `%` stays as-is.
    pub fn capitalized(&self) -> String {
        let mut chars = self.0.chars();
        match chars.next() {
            Some(first) if first.is_ascii_alphabetic() => {
                first.to_ascii_uppercase().to_string() + chars.as_str()
            }
            _ => self.0.clone(),
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Number-with-unit payload.
#[derive(Clone, Debug, PartialEq)]
pub struct WithUnit {
    pub value: f64,
    pub is_float: bool,
    pub unit: Unit,
}

impl WithUnit {
    pub fn new(value: f64, is_float: bool, unit: Unit) -> Self {
        Self {
            value,
            is_float,
            unit,
        }
    }

    /// Drops the unit, keeping printability.
    pub fn to_number(&self) -> Number {
        Number::new(self.value, self.is_float)
    }
}

/// List payload.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct List {
    pub items: Vec<Value>,
    /// Implicit lists come from juxtaposition and print space-separated;
    /// explicit lists come from commas and print comma-separated.
    pub is_implicit: bool,
}

impl List {
    pub fn explicit(items: Vec<Value>) -> Self {
        Self {
            items,
            is_implicit: false,
        }
    }

    pub fn implicit(items: Vec<Value>) -> Self {
        Self {
            items,
            is_implicit: true,
        }
    }
}

/// Dictionary payload; preserves insertion order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Dictionary {
    pub entries: IndexMap<String, Value>,
}

/// Color payload.
#[derive(Clone, Debug, PartialEq)]
pub enum Color {
    /// `#RGB` / `#RRGGBB`, stored as written.
    Hex(String),
    /// Schema-defined color: subtype name plus ordered attributes.
    Dynamic {
        subtype: String,
        attrs: IndexMap<String, Value>,
    },
}

impl Color {
    /// Validates and wraps a hex literal.
    pub fn hex(text: impl Into<String>) -> Result<Self> {
        let text = text.into();
        if is_valid_hex(&text) {
            Ok(Color::Hex(text))
        } else {
            Err(SymbolError::InvalidHexColor { text })
        }
    }

    /// The subtype segment of the type name (`Hex`, or the registered
    /// spec name capitalized).
    pub fn subtype_name(&self) -> String {
        match self {
            Color::Hex(_) => "Hex".to_string(),
            Color::Dynamic { subtype, .. } => capitalize(subtype),
        }
    }
}

/// `#RGB` or `#RRGGBB`.
pub fn is_valid_hex(text: &str) -> bool {
    let Some(digits) = text.strip_prefix('#') else {
        return false;
    };
    (digits.len() == 3 || digits.len() == 6) && digits.bytes().all(|b| b.is_ascii_hexdigit())
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

impl Value {
    /// Convenience constructors.
    pub fn int(value: f64) -> Self {
        Value::Number(Number::int(value))
    }

    pub fn float(value: f64) -> Self {
        Value::Number(Number::float(value))
    }

    pub fn str(value: impl Into<String>) -> Self {
        Value::Str(value.into())
    }

    pub fn with_unit(value: f64, is_float: bool, unit: &str) -> Self {
        Value::WithUnit(WithUnit::new(value, is_float, Unit::new(unit)))
    }

    /// Dotted type name: `Number`, `NumberWithUnit.Px`, `Color.Hex`, ...
    pub fn type_name(&self) -> String {
        match self {
            Value::Null => "Null".to_string(),
            Value::Number(_) => "Number".to_string(),
            Value::WithUnit(n) => format!("NumberWithUnit.{}", n.unit.capitalized()),
            Value::Str(_) => "String".to_string(),
            Value::Boolean(_) => "Boolean".to_string(),
            Value::List(_) => "List".to_string(),
            Value::Dictionary(_) => "Dictionary".to_string(),
            Value::Color(color) => format!("Color.{}", color.subtype_name()),
        }
    }

    /// Value equality as the language sees it: numbers compare by value,
    /// hex colors case-insensitively, lists element-wise (list flavor is
    /// ignored), dictionaries by their entries.
    pub fn equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Number(a), Value::Number(b)) => a.value == b.value,
            (Value::WithUnit(a), Value::WithUnit(b)) => a.value == b.value && a.unit == b.unit,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::List(a), Value::List(b)) => {
                a.items.len() == b.items.len()
                    && a.items.iter().zip(&b.items).all(|(x, y)| x.equals(y))
            }
            (Value::Dictionary(a), Value::Dictionary(b)) => {
                a.entries.len() == b.entries.len()
                    && a.entries
                        .iter()
                        .all(|(k, v)| b.entries.get(k).is_some_and(|w| v.equals(w)))
            }
            (Value::Color(Color::Hex(a)), Value::Color(Color::Hex(b))) => {
                a.eq_ignore_ascii_case(b)
            }
            (
                Value::Color(Color::Dynamic {
                    subtype: sa,
                    attrs: aa,
                }),
                Value::Color(Color::Dynamic {
                    subtype: sb,
                    attrs: ab,
                }),
            ) => {
                sa.eq_ignore_ascii_case(sb)
                    && aa.len() == ab.len()
                    && aa.iter().all(|(k, v)| ab.get(k).is_some_and(|w| v.equals(w)))
            }
            _ => false,
        }
    }

    /// True when both values have the same type, subtype included.
    pub fn type_equals(&self, other: &Value) -> bool {
        self.type_name() == other.type_name()
    }

    /// Structural copy. Values own their data, so stored copies can never
    /// alias the source.
    pub fn deep_copy(&self) -> Value {
        self.clone()
    }

    /// True for variants that need no copying when stored in containers.
    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            Value::Null | Value::Number(_) | Value::WithUnit(_) | Value::Str(_) | Value::Boolean(_)
        )
    }

    /// Attribute lookup without schema knowledge. The interpreter layers
    /// color-schema checks and the `to` conversion proxy on top of this.
    pub fn get_attribute(&self, name: &str) -> Result<Value> {
        match (self, name) {
            (Value::Number(n), "value") => Ok(Value::Number(*n)),
            (Value::WithUnit(n), "value") => Ok(Value::Number(n.to_number())),
            (Value::Color(Color::Dynamic { attrs, .. }), _) => attrs
                .get(name)
                .map(Value::deep_copy)
                .ok_or_else(|| SymbolError::UnknownAttribute {
                    type_name: self.type_name(),
                    attribute: name.to_string(),
                }),
            _ => Err(SymbolError::UnknownAttribute {
                type_name: self.type_name(),
                attribute: name.to_string(),
            }),
        }
    }

    /// Renders the value as the language prints it.
    pub fn render(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Number(n) => format_number(n.value),
            Value::WithUnit(n) => format!("{}{}", format_number(n.value), n.unit),
            Value::Str(s) => s.clone(),
            Value::Boolean(b) => b.to_string(),
            Value::List(list) => {
                let sep = if list.is_implicit { " " } else { ", " };
                list.items
                    .iter()
                    .map(Value::render)
                    .collect::<Vec<_>>()
                    .join(sep)
            }
            Value::Dictionary(dict) => {
                let body = dict
                    .entries
                    .iter()
                    .map(|(k, v)| format!("{k}: {}", v.render()))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{{{body}}}")
            }
            Value::Color(Color::Hex(text)) => text.clone(),
            Value::Color(Color::Dynamic { subtype, attrs }) => {
                render_dynamic_color(subtype, attrs.keys().map(String::as_str), attrs)
            }
        }
    }
}

/// `<subtype_lower>(v1, v2, ...)` with numeric components rounded to two
/// decimals. The caller chooses the attribute order (schema order when the
/// registered spec declares one, insertion order otherwise).
pub fn render_dynamic_color<'a>(
    subtype: &str,
    order: impl Iterator<Item = &'a str>,
    attrs: &IndexMap<String, Value>,
) -> String {
    let parts: Vec<String> = order
        .filter_map(|key| attrs.get(key))
        .map(|value| match value {
            Value::Number(n) => format_color_component(n.value),
            Value::WithUnit(n) => format!("{}{}", format_color_component(n.value), n.unit),
            other => other.render(),
        })
        .collect();
    format!("{}({})", subtype.to_lowercase(), parts.join(", "))
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_names() {
        assert_eq!(Value::Null.type_name(), "Null");
        assert_eq!(Value::int(1.0).type_name(), "Number");
        assert_eq!(
            Value::with_unit(4.0, false, "px").type_name(),
            "NumberWithUnit.Px"
        );
        assert_eq!(
            Value::with_unit(50.0, false, "%").type_name(),
            "NumberWithUnit.%"
        );
        assert_eq!(
            Value::Color(Color::Hex("#fff".into())).type_name(),
            "Color.Hex"
        );
        assert_eq!(
            Value::Color(Color::Dynamic {
                subtype: "rgb".into(),
                attrs: IndexMap::new()
            })
            .type_name(),
            "Color.Rgb"
        );
    }

    #[test]
    fn test_hex_validation() {
        assert!(Color::hex("#fff").is_ok());
        assert!(Color::hex("#FF0080").is_ok());
        assert!(Color::hex("#ff").is_err());
        assert!(Color::hex("ff0080").is_err());
        assert!(Color::hex("#ggg").is_err());
    }

    #[test]
    fn test_equals_ignores_printability() {
        assert!(Value::int(5.0).equals(&Value::float(5.0)));
        assert!(!Value::int(5.0).equals(&Value::with_unit(5.0, false, "px")));
    }

    #[test]
    fn test_hex_equals_case_insensitive() {
        let a = Value::Color(Color::Hex("#FF0080".into()));
        let b = Value::Color(Color::Hex("#ff0080".into()));
        assert!(a.equals(&b));
    }

    #[test]
    fn test_list_equals_ignores_flavor() {
        let a = Value::List(List::explicit(vec![Value::int(1.0)]));
        let b = Value::List(List::implicit(vec![Value::int(1.0)]));
        assert!(a.equals(&b));
    }

    #[test]
    fn test_render_numbers() {
        assert_eq!(Value::int(32.0).render(), "32");
        assert_eq!(Value::float(32.0).render(), "32");
        assert_eq!(Value::float(1.5).render(), "1.5");
        assert_eq!(Value::with_unit(32.0, false, "px").render(), "32px");
    }

    #[test]
    fn test_render_lists() {
        let implicit = Value::List(List::implicit(vec![
            Value::with_unit(1.0, false, "px"),
            Value::with_unit(2.0, false, "px"),
        ]));
        assert_eq!(implicit.render(), "1px 2px");

        let explicit = Value::List(List::explicit(vec![
            Value::str("a"),
            Value::str("b"),
        ]));
        assert_eq!(explicit.render(), "a, b");
    }

    #[test]
    fn test_render_nested_lists() {
        let inner = Value::List(List::implicit(vec![Value::str("solid"), Value::str("red")]));
        let outer = Value::List(List::explicit(vec![inner.clone(), inner]));
        assert_eq!(outer.render(), "solid red, solid red");
    }

    #[test]
    fn test_render_dictionary_in_insertion_order() {
        let mut dict = Dictionary::default();
        dict.entries.insert("b".into(), Value::int(2.0));
        dict.entries.insert("a".into(), Value::int(1.0));
        assert_eq!(Value::Dictionary(dict).render(), "{b: 2, a: 1}");
    }

    #[test]
    fn test_render_dynamic_color_rounds_components() {
        let mut attrs = IndexMap::new();
        attrs.insert("r".to_string(), Value::float(255.004));
        attrs.insert("g".to_string(), Value::float(0.5));
        attrs.insert("b".to_string(), Value::int(128.0));
        let color = Value::Color(Color::Dynamic {
            subtype: "Rgb".into(),
            attrs,
        });
        assert_eq!(color.render(), "rgb(255, 0.5, 128)");
    }

    #[test]
    fn test_get_attribute_value() {
        let n = Value::with_unit(7.0, false, "px");
        assert_eq!(n.get_attribute("value").unwrap(), Value::int(7.0));
        assert!(n.get_attribute("unit").is_err());
    }

    #[test]
    fn test_dynamic_color_attribute() {
        let mut attrs = IndexMap::new();
        attrs.insert("r".to_string(), Value::int(255.0));
        let color = Value::Color(Color::Dynamic {
            subtype: "rgb".into(),
            attrs,
        });
        assert_eq!(color.get_attribute("r").unwrap(), Value::int(255.0));
        assert!(color.get_attribute("missing").is_err());
    }

    #[test]
    fn test_is_primitive() {
        assert!(Value::int(1.0).is_primitive());
        assert!(Value::str("x").is_primitive());
        assert!(!Value::List(List::default()).is_primitive());
        assert!(!Value::Color(Color::Hex("#fff".into())).is_primitive());
    }
}
