//! The unit manager: registered unit specs and conversions between units.
//!
//! One unit per family is `absolute` and anchors conversions; `relative`
//! units carry a script converting to their anchor. Extra pairwise
//! conversions may be declared. All edges land in the shared BFS graph.

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use tracing::debug;

use tksc_sym::{Unit, WithUnit};

use crate::error::{Result, SpecError};
use crate::graph::ConversionGraph;
use crate::schema::{UnitKindJson, UnitSpecJson};
use crate::script::Script;
use crate::uri;

/// Whether a unit anchors its family or converts into the anchor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnitKind {
    Absolute,
    Relative,
}

/// A registered unit spec.
#[derive(Clone, Debug)]
pub struct UnitSpec {
    /// The unit's URI identifier (the spec's `name` field).
    pub uri: String,
    /// Suffix keyword, canonical lowercase.
    pub keyword: String,
    pub kind: UnitKind,
}

/// A conversion edge between two units.
#[derive(Clone, Debug)]
pub struct UnitConversion {
    pub source: String,
    pub target: String,
    pub script: Script,
}

/// Registry of unit specs and conversions.
#[derive(Clone, Debug, Default)]
pub struct UnitManager {
    /// Spec per URI, in registration order.
    specs: IndexMap<String, UnitSpec>,
    /// Lowercased keyword → URI.
    keywords: FxHashMap<String, String>,
    /// Conversion edges keyed by version-normalized URI base.
    graph: ConversionGraph<UnitConversion>,
}

impl UnitManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a unit spec JSON under `keyword`.
    ///
    /// The spec's `name` field is its URI; for relative units the
    /// `to_absolute` script's `type` names the anchor URI it converts to.
    pub fn register(&mut self, keyword: &str, json: &serde_json::Value) -> Result<()> {
        let spec: UnitSpecJson = serde_json::from_value(json.clone())?;
        if !spec.keyword.eq_ignore_ascii_case(keyword) {
            return Err(SpecError::invalid(format!(
                "registration keyword '{keyword}' does not match spec keyword '{}'",
                spec.keyword
            )));
        }

        let own_uri = spec.name.trim_end_matches('/').to_string();
        let keyword = keyword.to_lowercase();
        let kind = match spec.kind {
            UnitKindJson::Absolute => UnitKind::Absolute,
            UnitKindJson::Relative => UnitKind::Relative,
        };

        if kind == UnitKind::Relative {
            let to_absolute = spec
                .to_absolute
                .as_ref()
                .ok_or_else(|| SpecError::invalid("relative unit without to_absolute script"))?;
            let target = to_absolute.language.trim_end_matches('/').to_string();
            let script = Script::parse_with_units(to_absolute, self.keywords_with(&keyword))?;
            self.graph.insert(
                uri::base_of(&own_uri),
                uri::base_of(&target),
                UnitConversion {
                    source: own_uri.clone(),
                    target,
                    script,
                },
            );
        }

        for conv in &spec.conversions {
            let source = conv.source.trim_end_matches('/').to_string();
            let target = conv.target.trim_end_matches('/').to_string();
            let script = Script::parse_with_units(&conv.script, self.keywords_with(&keyword))?;
            self.graph.insert(
                uri::base_of(&source),
                uri::base_of(&target),
                UnitConversion {
                    source,
                    target,
                    script,
                },
            );
        }

        debug!(keyword = %keyword, uri = %own_uri, "registered unit spec");
        self.keywords.insert(keyword.clone(), own_uri.clone());
        self.specs.insert(
            own_uri.clone(),
            UnitSpec {
                uri: own_uri,
                keyword,
                kind,
            },
        );
        Ok(())
    }

    /// All registered suffix keywords; wired into the lexer.
    pub fn keywords(&self) -> Vec<String> {
        self.specs.values().map(|s| s.keyword.clone()).collect()
    }

    fn keywords_with(&self, extra: &str) -> Vec<String> {
        let mut keywords = self.keywords();
        keywords.push(extra.to_string());
        keywords
    }

    /// Spec for a suffix keyword.
    pub fn spec_for_keyword(&self, keyword: &str) -> Option<&UnitSpec> {
        self.specs.get(self.keywords.get(&keyword.to_lowercase())?)
    }

    /// Spec lookup by URI with version fallback.
    pub fn spec(&self, requested: &str) -> Option<&UnitSpec> {
        let resolved = uri::resolve(self.specs.keys(), requested)?;
        self.specs.get(&resolved)
    }

    /// Shortest conversion path between two unit keywords.
    pub fn conversion_path(&self, from: &str, to: &str) -> Result<Vec<&UnitConversion>> {
        let from_spec =
            self.spec_for_keyword(from)
                .ok_or_else(|| SpecError::UnknownUnit {
                    keyword: from.to_string(),
                })?;
        let to_spec = self
            .spec_for_keyword(to)
            .ok_or_else(|| SpecError::UnknownUnit {
                keyword: to.to_string(),
            })?;
        self.graph
            .shortest_path(&uri::base_of(&from_spec.uri), &uri::base_of(&to_spec.uri))
            .ok_or_else(|| SpecError::NoConversionPath {
                from: from.to_string(),
                to: to.to_string(),
            })
    }

    /// Keyword of the unit spec a conversion-path node belongs to.
    pub fn keyword_for_uri(&self, requested: &str) -> Option<&str> {
        self.spec(requested).map(|s| s.keyword.as_str())
    }

    /// Picks the common format for a mixed list of dimensioned values: the
    /// first unit backed by an absolute spec, the first unit otherwise.
    pub fn common_format(&self, values: &[&WithUnit]) -> Option<Unit> {
        values
            .iter()
            .find(|v| {
                self.spec_for_keyword(v.unit.as_str())
                    .is_some_and(|spec| spec.kind == UnitKind::Absolute)
            })
            .or_else(|| values.first())
            .map(|v| v.unit.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PX_URI: &str = "https://specs.tokenscript.dev/unit/px/0/";
    const GU_URI: &str = "https://specs.tokenscript.dev/unit/gu/0/";

    fn px_spec() -> serde_json::Value {
        serde_json::json!({
            "name": PX_URI,
            "keyword": "px",
            "type": "absolute"
        })
    }

    fn gu_spec() -> serde_json::Value {
        serde_json::json!({
            "name": GU_URI,
            "keyword": "gu",
            "type": "relative",
            "to_absolute": {"type": PX_URI, "script": "{input}.to_number() * 4px"}
        })
    }

    fn manager() -> UnitManager {
        let mut m = UnitManager::new();
        m.register("px", &px_spec()).unwrap();
        m.register("gu", &gu_spec()).unwrap();
        m
    }

    #[test]
    fn test_register_and_keywords() {
        let m = manager();
        assert_eq!(m.keywords(), vec!["px".to_string(), "gu".to_string()]);
        assert_eq!(m.spec_for_keyword("GU").unwrap().kind, UnitKind::Relative);
        assert_eq!(m.spec_for_keyword("px").unwrap().kind, UnitKind::Absolute);
    }

    #[test]
    fn test_keyword_mismatch_rejected() {
        let mut m = UnitManager::new();
        assert!(m.register("other", &px_spec()).is_err());
    }

    #[test]
    fn test_relative_needs_to_absolute() {
        let mut m = UnitManager::new();
        let bad = serde_json::json!({
            "name": GU_URI,
            "keyword": "gu",
            "type": "relative"
        });
        assert!(m.register("gu", &bad).is_err());
    }

    #[test]
    fn test_conversion_path_relative_to_absolute() {
        let m = manager();
        let path = m.conversion_path("gu", "px").unwrap();
        assert_eq!(path.len(), 1);
        assert_eq!(path[0].script.source, "{input}.to_number() * 4px");
    }

    #[test]
    fn test_no_reverse_path_without_edge() {
        let m = manager();
        assert!(matches!(
            m.conversion_path("px", "gu"),
            Err(SpecError::NoConversionPath { .. })
        ));
    }

    #[test]
    fn test_unknown_unit() {
        let m = manager();
        assert!(matches!(
            m.conversion_path("parsec", "px"),
            Err(SpecError::UnknownUnit { .. })
        ));
    }

    #[test]
    fn test_common_format_prefers_absolute() {
        let m = manager();
        let gu = WithUnit::new(2.0, false, Unit::new("gu"));
        let px = WithUnit::new(8.0, false, Unit::new("px"));
        let common = m.common_format(&[&gu, &px]).unwrap();
        assert_eq!(common.as_str(), "px");
    }

    #[test]
    fn test_common_format_falls_back_to_first() {
        let m = UnitManager::new();
        let em = WithUnit::new(1.0, false, Unit::new("em"));
        let rem = WithUnit::new(2.0, false, Unit::new("rem"));
        assert_eq!(m.common_format(&[&em, &rem]).unwrap().as_str(), "em");
    }

    #[test]
    fn test_scripts_parse_with_own_keyword() {
        // A unit whose conversion script uses its own suffix.
        let mut m = UnitManager::new();
        m.register("px", &px_spec()).unwrap();
        let spec = serde_json::json!({
            "name": "https://specs.tokenscript.dev/unit/half/0/",
            "keyword": "half",
            "type": "relative",
            "to_absolute": {"type": PX_URI, "script": "{input}.to_number() / 2px"}
        });
        assert!(m.register("half", &spec).is_ok());
    }
}
