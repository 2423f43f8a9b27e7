//! Serde shapes for the spec JSON formats.
//!
//! These mirror the registration payloads: ColorSpec, UnitSpec, and
//! FunctionSpec. Validation beyond shape (the `type` discriminator, `$self`
//! resolution, script parsing) happens in the managers.

use indexmap::IndexMap;
use serde::Deserialize;

/// An embedded script: the `type` field is the script-language URI and
/// `script` the TokenScript source.
#[derive(Clone, Debug, Deserialize)]
pub struct ScriptJson {
    #[serde(rename = "type")]
    pub language: String,
    pub script: String,
}

/// Attribute types a color schema may declare.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AttrType {
    Number,
    String,
    Color,
}

impl AttrType {
    pub fn describe(&self) -> &'static str {
        match self {
            AttrType::Number => "number",
            AttrType::String => "string",
            AttrType::Color => "color",
        }
    }
}

/// One schema property.
#[derive(Clone, Debug, Deserialize)]
pub struct PropertyJson {
    #[serde(rename = "type")]
    pub kind: AttrType,
}

/// A color spec's object schema.
#[derive(Clone, Debug, Deserialize)]
pub struct SchemaJson {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub properties: IndexMap<String, PropertyJson>,
    #[serde(default)]
    pub required: Vec<String>,
    #[serde(default)]
    pub order: Option<Vec<String>>,
}

/// An initializer declaration: `rgb(...)` → script.
#[derive(Clone, Debug, Deserialize)]
pub struct InitializerJson {
    pub keyword: String,
    pub script: ScriptJson,
}

/// A conversion edge declaration; `$self` in source/target refers to the
/// spec's own URI.
#[derive(Clone, Debug, Deserialize)]
pub struct ConversionJson {
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub lossless: bool,
    pub script: ScriptJson,
}

/// ColorSpec registration payload.
#[derive(Clone, Debug, Deserialize)]
pub struct ColorSpecJson {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub schema: Option<SchemaJson>,
    #[serde(default)]
    pub initializers: Vec<InitializerJson>,
    #[serde(default)]
    pub conversions: Vec<ConversionJson>,
}

/// Unit kinds: one absolute anchor per family, everything else relative.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UnitKindJson {
    Absolute,
    Relative,
}

/// A unit conversion edge declaration.
#[derive(Clone, Debug, Deserialize)]
pub struct UnitConversionJson {
    pub source: String,
    pub target: String,
    pub script: ScriptJson,
}

/// UnitSpec registration payload. `name` is the unit's URI identifier;
/// for a relative unit, `to_absolute.type` names the absolute anchor URI
/// its script converts to.
#[derive(Clone, Debug, Deserialize)]
pub struct UnitSpecJson {
    pub name: String,
    pub keyword: String,
    #[serde(rename = "type")]
    pub kind: UnitKindJson,
    #[serde(default)]
    pub to_absolute: Option<ScriptJson>,
    #[serde(default)]
    pub conversions: Vec<UnitConversionJson>,
}

/// FunctionSpec registration payload.
#[derive(Clone, Debug, Deserialize)]
pub struct FunctionSpecJson {
    pub name: String,
    pub keyword: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub input: Option<serde_json::Value>,
    pub script: ScriptJson,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_spec_deserializes() {
        let json = serde_json::json!({
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
                {"keyword": "rgb", "script": {"type": "https://specs/ts/0/", "script": "{input}"}}
            ],
            "conversions": [
                {"source": "$self", "target": "https://specs/hex/0/", "lossless": true,
                 "script": {"type": "https://specs/ts/0/", "script": "{input}"}}
            ]
        });
        let spec: ColorSpecJson = serde_json::from_value(json).unwrap();
        assert_eq!(spec.name, "rgb");
        assert_eq!(spec.kind, "color");
        let schema = spec.schema.unwrap();
        assert_eq!(schema.properties.len(), 3);
        assert_eq!(schema.order.as_deref(), Some(&["r".to_string(), "g".to_string(), "b".to_string()][..]));
        assert_eq!(spec.initializers.len(), 1);
        assert!(spec.conversions[0].lossless);
    }

    #[test]
    fn test_unit_spec_deserializes() {
        let json = serde_json::json!({
            "name": "https://specs/unit/gu/0/",
            "keyword": "gu",
            "type": "relative",
            "to_absolute": {"type": "https://specs/unit/px/0/", "script": "{input}.to_number() * 4px"}
        });
        let spec: UnitSpecJson = serde_json::from_value(json).unwrap();
        assert_eq!(spec.keyword, "gu");
        assert_eq!(spec.kind, UnitKindJson::Relative);
        assert!(spec.to_absolute.is_some());
        assert!(spec.conversions.is_empty());
    }

    #[test]
    fn test_function_spec_deserializes() {
        let json = serde_json::json!({
            "name": "double",
            "keyword": "double",
            "type": "function",
            "script": {"type": "https://specs/ts/0/", "script": "{input}.get(0) * 2"}
        });
        let spec: FunctionSpecJson = serde_json::from_value(json).unwrap();
        assert_eq!(spec.keyword, "double");
    }

    #[test]
    fn test_attr_type_lowercase() {
        let t: AttrType = serde_json::from_str("\"number\"").unwrap();
        assert_eq!(t, AttrType::Number);
        assert!(serde_json::from_str::<AttrType>("\"Number\"").is_err());
    }
}
