//! Shared fixtures for the end-to-end resolver tests.
//!
//! Each integration-test target compiles its own copy, so not every item
//! is used by every target.
#![allow(dead_code)]

use indexmap::IndexMap;
use tksc_drv::Config;
use tksc_spec::color::HEX_COLOR_URI;

pub const RGB_URI: &str = "https://specs.tokenscript.dev/color/rgb/0.0.1/";
pub const PX_URI: &str = "https://specs.tokenscript.dev/unit/px/0/";
pub const GU_URI: &str = "https://specs.tokenscript.dev/unit/gu/0/";

/// A config with an RGB color space (lossless conversions against hex)
/// and a grid unit where 1gu = 4px.
pub fn full_config() -> Config {
    let mut config = Config::new();

    config
        .units
        .register(
            "px",
            &serde_json::json!({"name": PX_URI, "keyword": "px", "type": "absolute"}),
        )
        .unwrap();
    config
        .units
        .register(
            "gu",
            &serde_json::json!({
                "name": GU_URI,
                "keyword": "gu",
                "type": "relative",
                "to_absolute": {"type": PX_URI, "script": "{input}.to_number() * 4px"}
            }),
        )
        .unwrap();

    let init = "\
        variable out: Dictionary;\n\
        out.set('r', {input}.get(0));\n\
        out.set('g', {input}.get(1));\n\
        out.set('b', {input}.get(2));\n\
        return out;";
    let to_hex = "\
        variable r: String = {input}.r.to_string(16);\n\
        variable g: String = {input}.g.to_string(16);\n\
        variable b: String = {input}.b.to_string(16);\n\
        if (r.length() < 2) [ r = '0'.concat(r); ]\n\
        if (g.length() < 2) [ g = '0'.concat(g); ]\n\
        if (b.length() < 2) [ b = '0'.concat(b); ]\n\
        return '#'.concat(r).concat(g).concat(b);";
    let from_hex = "\
        variable s: List = {input}.to_string().split();\n\
        variable out: Dictionary;\n\
        out.set('r', parse_int(s.get(1).concat(s.get(2)), 16));\n\
        out.set('g', parse_int(s.get(3).concat(s.get(4)), 16));\n\
        out.set('b', parse_int(s.get(5).concat(s.get(6)), 16));\n\
        return out;";

    config
        .colors
        .register(
            RGB_URI,
            &serde_json::json!({
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
                     "script": {"type": "https://specs.tokenscript.dev/ts/0/", "script": init}}
                ],
                "conversions": [
                    {"source": "$self", "target": HEX_COLOR_URI, "lossless": true,
                     "script": {"type": "https://specs.tokenscript.dev/ts/0/", "script": to_hex}},
                    {"source": HEX_COLOR_URI, "target": "$self", "lossless": true,
                     "script": {"type": "https://specs.tokenscript.dev/ts/0/", "script": from_hex}}
                ]
            }),
        )
        .unwrap();

    config
}

pub fn tokens(pairs: &[(&str, &str)]) -> IndexMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
