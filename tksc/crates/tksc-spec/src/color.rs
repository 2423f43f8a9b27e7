//! The color manager: registered color specs, initializer scripts, and the
//! conversion graph between color spaces.

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use thiserror::Error;
use tracing::debug;

use tksc_sym::value::render_dynamic_color;
use tksc_sym::{Color, Value};

use crate::error::{Result, SpecError};
use crate::graph::ConversionGraph;
use crate::schema::{AttrType, ColorSpecJson};
use crate::script::Script;
use crate::uri;

/// URI of the built-in hex color space; conversion edges into and out of
/// hex are registered against it.
pub const HEX_COLOR_URI: &str = "https://specs.tokenscript.dev/color/hex/0/";

/// A registered color spec.
#[derive(Clone, Debug)]
pub struct ColorSpec {
    /// Registration URI, trailing slash trimmed.
    pub uri: String,
    /// Subtype name, as declared (`rgb`, `hsl`, ...).
    pub name: String,
    pub schema: Option<ColorSchema>,
}

/// The attribute schema of a dynamic color.
#[derive(Clone, Debug)]
pub struct ColorSchema {
    pub properties: IndexMap<String, AttrType>,
    pub required: Vec<String>,
    /// Rendering order; insertion order when absent.
    pub order: Option<Vec<String>>,
}

/// A conversion edge between two color spaces.
#[derive(Clone, Debug)]
pub struct ColorConversion {
    pub source: String,
    pub target: String,
    pub lossless: bool,
    pub script: Script,
}

/// An initializer: `rgb(255, 0, 0)` runs `script` with `input` bound to
/// the argument list and wraps the result into the owning subtype.
#[derive(Clone, Debug)]
pub struct ColorInitializer {
    pub keyword: String,
    /// Subtype the result is wrapped into.
    pub subtype: String,
    /// URI of the owning spec.
    pub uri: String,
    pub script: Script,
}

/// Schema-tagged errors for color attribute assignment.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ColorError {
    #[error("STRING_VALUE_ASSIGNMENT: cannot set attributes on a hex color literal")]
    StringValueAssignment,

    #[error("ATTRIBUTE_CHAIN_TOO_LONG: color attributes take a single-segment chain")]
    AttributeChainTooLong,

    #[error("MISSING_SPEC: no color spec registered for subtype '{subtype}'")]
    MissingSpec { subtype: String },

    #[error("MISSING_SCHEMA: color spec '{subtype}' declares no schema")]
    MissingSchema { subtype: String },

    #[error("UNKNOWN_ATTRIBUTE: schema of '{subtype}' has no attribute '{attribute}'")]
    UnknownAttribute { subtype: String, attribute: String },

    #[error("INVALID_ATTRIBUTE_TYPE: attribute '{attribute}' expects a {expected} value, got {found}")]
    InvalidAttributeType {
        attribute: String,
        expected: String,
        found: String,
    },
}

/// Registry of color specs and conversions.
#[derive(Clone, Debug)]
pub struct ColorManager {
    /// Spec per registration URI, in registration order.
    specs: IndexMap<String, ColorSpec>,
    /// Lowercased subtype name → registration URI.
    names: FxHashMap<String, String>,
    /// Lowercased initializer keyword → initializer.
    initializers: FxHashMap<String, ColorInitializer>,
    /// Conversion edges keyed by version-normalized URI base.
    graph: ConversionGraph<ColorConversion>,
}

impl Default for ColorManager {
    fn default() -> Self {
        let mut manager = Self {
            specs: IndexMap::new(),
            names: FxHashMap::default(),
            initializers: FxHashMap::default(),
            graph: ConversionGraph::new(),
        };
        // The hex space is always present; specs convert against it.
        let hex_uri = HEX_COLOR_URI.trim_end_matches('/').to_string();
        manager.names.insert("hex".to_string(), hex_uri.clone());
        manager.specs.insert(
            hex_uri.clone(),
            ColorSpec {
                uri: hex_uri,
                name: "hex".to_string(),
                schema: None,
            },
        );
        manager
    }
}

impl ColorManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a color spec JSON against `uri`.
    pub fn register(&mut self, uri: &str, json: &serde_json::Value) -> Result<()> {
        let spec: ColorSpecJson = serde_json::from_value(json.clone())?;
        if spec.kind != "color" {
            return Err(SpecError::invalid(format!(
                "expected type \"color\", got \"{}\"",
                spec.kind
            )));
        }

        let uri = uri.trim_end_matches('/').to_string();
        let name_lower = spec.name.to_lowercase();

        for init in &spec.initializers {
            let script = Script::parse(&init.script)?;
            self.initializers.insert(
                init.keyword.to_lowercase(),
                ColorInitializer {
                    keyword: init.keyword.clone(),
                    subtype: spec.name.clone(),
                    uri: uri.clone(),
                    script,
                },
            );
        }

        for conv in &spec.conversions {
            let source = resolve_self(&conv.source, &uri);
            let target = resolve_self(&conv.target, &uri);
            let script = Script::parse(&conv.script)?;
            let edge = ColorConversion {
                source: source.clone(),
                target: target.clone(),
                lossless: conv.lossless,
                script,
            };
            self.graph
                .insert(uri::base_of(&source), uri::base_of(&target), edge);
        }

        let schema = spec.schema.map(|s| ColorSchema {
            properties: s
                .properties
                .into_iter()
                .map(|(name, prop)| (name, prop.kind))
                .collect(),
            required: s.required,
            order: s.order,
        });

        debug!(uri = %uri, name = %spec.name, "registered color spec");
        self.names.insert(name_lower, uri.clone());
        self.specs.insert(
            uri.clone(),
            ColorSpec {
                uri,
                name: spec.name,
                schema,
            },
        );
        Ok(())
    }

    /// Registered subtype names (lowercased), `hex` included.
    pub fn subtype_names(&self) -> Vec<String> {
        self.specs.values().map(|s| s.name.to_lowercase()).collect()
    }

    /// Registration URI for a subtype name.
    pub fn uri_for_subtype(&self, name: &str) -> Option<&String> {
        self.names.get(&name.to_lowercase())
    }

    /// Spec lookup with version fallback.
    pub fn spec(&self, requested: &str) -> Option<&ColorSpec> {
        let resolved = uri::resolve(self.specs.keys(), requested)?;
        self.specs.get(&resolved)
    }

    /// Spec lookup by subtype name.
    pub fn spec_by_subtype(&self, name: &str) -> Option<&ColorSpec> {
        self.specs.get(self.uri_for_subtype(name)?)
    }

    /// Initializer for a call keyword, if any spec declared one.
    pub fn initializer(&self, keyword: &str) -> Option<&ColorInitializer> {
        self.initializers.get(&keyword.to_lowercase())
    }

    /// Shortest conversion path between two spec URIs.
    pub fn conversion_path(&self, from: &str, to: &str) -> Result<Vec<&ColorConversion>> {
        self.graph
            .shortest_path(&uri::base_of(from), &uri::base_of(to))
            .ok_or_else(|| SpecError::NoConversionPath {
                from: from.to_string(),
                to: to.to_string(),
            })
    }

    /// Schema-checked attribute assignment; the interpreter routes every
    /// `color.attr = value` through here.
    pub fn set_attribute(
        &self,
        color: &mut Color,
        chain: &[String],
        value: Value,
    ) -> std::result::Result<(), ColorError> {
        if chain.len() != 1 {
            return Err(ColorError::AttributeChainTooLong);
        }
        let attribute = chain[0].as_str();

        match color {
            Color::Hex(_) => Err(ColorError::StringValueAssignment),
            Color::Dynamic { subtype, attrs } => {
                let spec = self
                    .spec_by_subtype(subtype)
                    .ok_or_else(|| ColorError::MissingSpec {
                        subtype: subtype.clone(),
                    })?;
                let schema = spec.schema.as_ref().ok_or_else(|| ColorError::MissingSchema {
                    subtype: subtype.clone(),
                })?;
                let expected = schema.properties.get(attribute).ok_or_else(|| {
                    ColorError::UnknownAttribute {
                        subtype: subtype.clone(),
                        attribute: attribute.to_string(),
                    }
                })?;

                let matches = match expected {
                    AttrType::Number => {
                        matches!(value, Value::Number(_) | Value::WithUnit(_))
                    }
                    AttrType::String => matches!(value, Value::Str(_)),
                    AttrType::Color => matches!(value, Value::Color(_)),
                };
                if !matches {
                    return Err(ColorError::InvalidAttributeType {
                        attribute: attribute.to_string(),
                        expected: expected.describe().to_string(),
                        found: value.type_name(),
                    });
                }

                attrs.insert(attribute.to_string(), value.deep_copy());
                Ok(())
            }
        }
    }

    /// Renders a color: hex literals verbatim, dynamic colors as
    /// `subtype(v1, v2, ...)` ordered by the schema's `order` when one is
    /// declared.
    pub fn format_color(&self, color: &Color) -> String {
        match color {
            Color::Hex(text) => text.clone(),
            Color::Dynamic { subtype, attrs } => {
                let order = self
                    .spec_by_subtype(subtype)
                    .and_then(|spec| spec.schema.as_ref())
                    .and_then(|schema| schema.order.as_ref());
                match order {
                    Some(order) => {
                        render_dynamic_color(subtype, order.iter().map(String::as_str), attrs)
                    }
                    None => {
                        render_dynamic_color(subtype, attrs.keys().map(String::as_str), attrs)
                    }
                }
            }
        }
    }
}

fn resolve_self(uri_or_self: &str, own_uri: &str) -> String {
    if uri_or_self == "$self" {
        own_uri.to_string()
    } else {
        uri_or_self.trim_end_matches('/').to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RGB_URI: &str = "https://specs.tokenscript.dev/color/rgb/0.0.1/";

    fn rgb_spec() -> serde_json::Value {
        serde_json::json!({
            "name": "rgb",
            "type": "color",
            "schema": {
                "type": "object",
                "properties": {
                    "r": {"type": "number"},
                    "g": {"type": "number"},
                    "b": {"type": "number"}
                },
                "required": ["r", "g", "b"],
                "order": ["r", "g", "b"]
            },
            "initializers": [
                {"keyword": "rgb",
                 "script": {"type": "https://specs.tokenscript.dev/ts/0/", "script": "{input}"}}
            ],
            "conversions": [
                {"source": "$self", "target": HEX_COLOR_URI, "lossless": true,
                 "script": {"type": "https://specs.tokenscript.dev/ts/0/", "script": "{input}"}},
                {"source": HEX_COLOR_URI, "target": "$self", "lossless": true,
                 "script": {"type": "https://specs.tokenscript.dev/ts/0/", "script": "{input}"}}
            ]
        })
    }

    fn manager_with_rgb() -> ColorManager {
        let mut manager = ColorManager::new();
        manager.register(RGB_URI, &rgb_spec()).unwrap();
        manager
    }

    fn rgb_color() -> Color {
        let mut attrs = IndexMap::new();
        attrs.insert("r".to_string(), Value::int(255.0));
        attrs.insert("g".to_string(), Value::int(0.0));
        attrs.insert("b".to_string(), Value::int(128.0));
        Color::Dynamic {
            subtype: "rgb".to_string(),
            attrs,
        }
    }

    #[test]
    fn test_register_binds_name_and_initializer() {
        let manager = manager_with_rgb();
        assert!(manager.uri_for_subtype("RGB").is_some());
        assert!(manager.initializer("rgb").is_some());
        assert_eq!(manager.initializer("rgb").unwrap().subtype, "rgb");
        assert!(manager.initializer("hsl").is_none());
    }

    #[test]
    fn test_register_rejects_wrong_type() {
        let mut manager = ColorManager::new();
        let bad = serde_json::json!({"name": "x", "type": "unit"});
        assert!(manager.register("https://specs/x/0/", &bad).is_err());
    }

    #[test]
    fn test_spec_lookup_with_version_fallback() {
        let manager = manager_with_rgb();
        // Exact, patch-stripped request, and latest all find the spec.
        assert!(manager.spec(RGB_URI).is_some());
        assert!(manager
            .spec("https://specs.tokenscript.dev/color/rgb/latest/")
            .is_some());
    }

    #[test]
    fn test_conversion_path_to_hex() {
        let manager = manager_with_rgb();
        let path = manager.conversion_path(RGB_URI, HEX_COLOR_URI).unwrap();
        assert_eq!(path.len(), 1);
        assert!(path[0].lossless);
    }

    #[test]
    fn test_conversion_path_edges_are_version_normalized() {
        let manager = manager_with_rgb();
        // Registered at 0.0.1; a request for /0/ shares the base.
        let path = manager
            .conversion_path("https://specs.tokenscript.dev/color/rgb/0/", HEX_COLOR_URI)
            .unwrap();
        assert_eq!(path.len(), 1);
    }

    #[test]
    fn test_no_conversion_path() {
        let manager = manager_with_rgb();
        assert!(matches!(
            manager.conversion_path(HEX_COLOR_URI, "https://specs/other/0/"),
            Err(SpecError::NoConversionPath { .. })
        ));
    }

    #[test]
    fn test_set_attribute_happy_path() {
        let manager = manager_with_rgb();
        let mut color = rgb_color();
        manager
            .set_attribute(&mut color, &["r".to_string()], Value::int(17.0))
            .unwrap();
        match color {
            Color::Dynamic { attrs, .. } => assert_eq!(attrs["r"], Value::int(17.0)),
            other => panic!("expected dynamic color, got {other:?}"),
        }
    }

    #[test]
    fn test_set_attribute_on_hex_is_tagged() {
        let manager = manager_with_rgb();
        let mut color = Color::Hex("#fff".to_string());
        assert_eq!(
            manager.set_attribute(&mut color, &["r".to_string()], Value::int(1.0)),
            Err(ColorError::StringValueAssignment)
        );
    }

    #[test]
    fn test_set_attribute_chain_too_long() {
        let manager = manager_with_rgb();
        let mut color = rgb_color();
        assert_eq!(
            manager.set_attribute(
                &mut color,
                &["r".to_string(), "x".to_string()],
                Value::int(1.0)
            ),
            Err(ColorError::AttributeChainTooLong)
        );
    }

    #[test]
    fn test_set_attribute_missing_spec() {
        let manager = ColorManager::new();
        let mut color = rgb_color();
        assert!(matches!(
            manager.set_attribute(&mut color, &["r".to_string()], Value::int(1.0)),
            Err(ColorError::MissingSpec { .. })
        ));
    }

    #[test]
    fn test_set_attribute_type_mismatch() {
        let manager = manager_with_rgb();
        let mut color = rgb_color();
        assert!(matches!(
            manager.set_attribute(&mut color, &["r".to_string()], Value::str("red")),
            Err(ColorError::InvalidAttributeType { .. })
        ));
    }

    #[test]
    fn test_set_attribute_unknown_attribute() {
        let manager = manager_with_rgb();
        let mut color = rgb_color();
        assert!(matches!(
            manager.set_attribute(&mut color, &["alpha".to_string()], Value::int(1.0)),
            Err(ColorError::UnknownAttribute { .. })
        ));
    }

    #[test]
    fn test_format_color_uses_schema_order() {
        let manager = manager_with_rgb();
        let mut attrs = IndexMap::new();
        // Inserted out of order on purpose.
        attrs.insert("b".to_string(), Value::int(128.0));
        attrs.insert("r".to_string(), Value::int(255.0));
        attrs.insert("g".to_string(), Value::int(0.0));
        let color = Color::Dynamic {
            subtype: "rgb".to_string(),
            attrs,
        };
        assert_eq!(manager.format_color(&color), "rgb(255, 0, 128)");
    }

    #[test]
    fn test_format_hex_is_verbatim() {
        let manager = ColorManager::new();
        assert_eq!(
            manager.format_color(&Color::Hex("#FF0080".to_string())),
            "#FF0080"
        );
    }
}
