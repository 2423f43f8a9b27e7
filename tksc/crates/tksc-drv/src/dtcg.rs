//! DTCG input adapter.
//!
//! Flattens nested token documents whose leaves carry `$value` into the
//! flat `name → expression` maps the resolver consumes. Non-`$` object
//! keys join with dots into token names; sibling `$type` / `$description`
//! / `$extensions` metadata rides along. A `$themes` array yields one
//! flat map per theme by unioning the selected token sets in order.

use indexmap::IndexMap;
use serde_json::Value as Json;
use thiserror::Error;

/// Errors raised while flattening DTCG input.
#[derive(Debug, Error)]
pub enum DtcgError {
    #[error("DTCG document root must be an object")]
    RootNotObject,

    #[error("$themes must be an array of objects")]
    InvalidThemes,

    #[error("theme '{theme}' selects unknown token set '{set}'")]
    UnknownTokenSet { theme: String, set: String },
}

/// A flattened token: the expression plus its sibling metadata.
#[derive(Clone, Debug)]
pub struct DtcgToken {
    pub expression: String,
    pub token_type: Option<String>,
    pub description: Option<String>,
    pub extensions: Option<Json>,
}

/// Flattens a DTCG document into dotted names and tokens.
pub fn flatten(root: &Json) -> Result<IndexMap<String, DtcgToken>, DtcgError> {
    let object = root.as_object().ok_or(DtcgError::RootNotObject)?;
    let mut out = IndexMap::new();
    walk(object, String::new(), &mut out);
    Ok(out)
}

/// Flattens to just the expressions, ready for the resolver.
pub fn expressions(root: &Json) -> Result<IndexMap<String, String>, DtcgError> {
    Ok(flatten(root)?
        .into_iter()
        .map(|(name, token)| (name, token.expression))
        .collect())
}

fn walk(
    object: &serde_json::Map<String, Json>,
    prefix: String,
    out: &mut IndexMap<String, DtcgToken>,
) {
    if let Some(value) = object.get("$value") {
        out.insert(
            prefix,
            DtcgToken {
                expression: expression_text(value),
                token_type: object.get("$type").and_then(Json::as_str).map(String::from),
                description: object
                    .get("$description")
                    .and_then(Json::as_str)
                    .map(String::from),
                extensions: object.get("$extensions").cloned(),
            },
        );
        return;
    }

    for (key, value) in object {
        if key.starts_with('$') {
            continue;
        }
        if let Some(child) = value.as_object() {
            let name = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{prefix}.{key}")
            };
            walk(child, name, out);
        }
    }
}

/// `$value` payloads become expression text: strings pass through, numbers
/// and booleans print plainly, composites keep their JSON form.
fn expression_text(value: &Json) -> String {
    match value {
        Json::String(s) => s.clone(),
        Json::Number(n) => n.to_string(),
        Json::Bool(b) => b.to_string(),
        Json::Null => "null".to_string(),
        other => other.to_string(),
    }
}

/// One theme's flat token map.
#[derive(Clone, Debug)]
pub struct Theme {
    pub name: String,
    pub tokens: IndexMap<String, String>,
}

/// Expands a document with a `$themes` array: each theme unions its
/// selected token sets in declaration order, later sets winning.
pub fn themes(root: &Json) -> Result<Vec<Theme>, DtcgError> {
    let object = root.as_object().ok_or(DtcgError::RootNotObject)?;
    let themes = object
        .get("$themes")
        .and_then(Json::as_array)
        .ok_or(DtcgError::InvalidThemes)?;

    let mut out = Vec::with_capacity(themes.len());
    for theme in themes {
        let theme = theme.as_object().ok_or(DtcgError::InvalidThemes)?;
        let name = theme
            .get("name")
            .or_else(|| theme.get("id"))
            .and_then(Json::as_str)
            .unwrap_or("unnamed")
            .to_string();

        let mut tokens: IndexMap<String, String> = IndexMap::new();
        if let Some(selected) = theme.get("selectedTokenSets").and_then(Json::as_object) {
            for (set_name, status) in selected {
                if status.as_str() == Some("disabled") {
                    continue;
                }
                let set = object
                    .get(set_name)
                    .ok_or_else(|| DtcgError::UnknownTokenSet {
                        theme: name.clone(),
                        set: set_name.clone(),
                    })?;
                for (token_name, expression) in expressions(set)? {
                    tokens.insert(token_name, expression);
                }
            }
        }

        out.push(Theme { name, tokens });
    }
    Ok(out)
}
