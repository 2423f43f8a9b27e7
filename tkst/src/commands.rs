//! Command implementations for the tkst CLI.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Deserialize;
use tracing::info;

use tksc_drv::{dtcg, resolve, Config, RefEntry, References};

use crate::error::{Result, TkstError};

/// Spec files passed on the command line, applied before any resolution.
#[derive(Debug, Default)]
pub struct SpecFiles {
    pub colors: Vec<PathBuf>,
    pub units: Vec<PathBuf>,
    pub functions: Vec<PathBuf>,
}

/// A color spec file: the registration URI plus the spec payload.
#[derive(Debug, Deserialize)]
struct ColorSpecFile {
    uri: String,
    spec: serde_json::Value,
}

/// Loads every spec file into a fresh config.
pub fn build_config(specs: &SpecFiles) -> Result<Config> {
    let mut config = Config::new();

    for path in &specs.colors {
        let file: ColorSpecFile = serde_json::from_str(&std::fs::read_to_string(path)?)?;
        config.colors.register(&file.uri, &file.spec)?;
        info!(path = %path.display(), uri = %file.uri, "registered color spec");
    }
    for path in &specs.units {
        let spec: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(path)?)?;
        let keyword = spec
            .get("keyword")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| TkstError::Validation(format!(
                "unit spec {} has no keyword",
                path.display()
            )))?
            .to_string();
        config.units.register(&keyword, &spec)?;
        info!(path = %path.display(), keyword = %keyword, "registered unit spec");
    }
    for path in &specs.functions {
        let spec: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(path)?)?;
        let keyword = spec
            .get("keyword")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| TkstError::Validation(format!(
                "function spec {} has no keyword",
                path.display()
            )))?
            .to_string();
        config.functions.register(&keyword, &spec)?;
        info!(path = %path.display(), keyword = %keyword, "registered function spec");
    }

    Ok(config)
}

/// `tkst resolve`: batch-resolves a token file and prints JSON results.
pub fn run_resolve(input: &Path, specs: &SpecFiles, pretty: bool) -> Result<()> {
    let config = build_config(specs)?;
    let document: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(input)?)?;
    let tokens = tokens_from_document(&document)?;
    info!(count = tokens.len(), "resolving tokens");

    let output = resolve(&tokens, &config);
    for warning in &output.warnings {
        tracing::warn!("{warning}");
    }

    let mut report = serde_json::Map::new();
    for (name, token) in &output.tokens {
        let mut entry = serde_json::Map::new();
        entry.insert(
            "value".to_string(),
            serde_json::Value::String(tksc_drv::render_value(&token.value, &config)),
        );
        if let Some(error) = &token.error {
            entry.insert(
                "error".to_string(),
                serde_json::json!({
                    "type": error.kind.as_str(),
                    "details": error.details,
                }),
            );
        }
        report.insert(name.clone(), serde_json::Value::Object(entry));
    }

    let report = serde_json::Value::Object(report);
    if pretty {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{report}");
    }
    Ok(())
}

/// `tkst eval`: evaluates one expression with optional `name=value`
/// reference bindings.
pub fn run_eval(expression: &str, bindings: &[String], specs: &SpecFiles) -> Result<()> {
    let config = build_config(specs)?;

    let mut references = References::new();
    for binding in bindings {
        let (name, value) = binding.split_once('=').ok_or_else(|| {
            TkstError::Validation(format!("expected name=value, got '{binding}'"))
        })?;
        let json = serde_json::from_str(value)
            .unwrap_or_else(|_| serde_json::Value::String(value.to_string()));
        references.insert(name.to_string(), RefEntry::Raw(json));
    }

    let value = tksc_drv::interpret(expression, &references, &config)?;
    println!("{}", tksc_drv::render_value(&value, &config));
    Ok(())
}

/// A flat document (all-string object) passes through; anything else goes
/// through the DTCG adapter.
fn tokens_from_document(document: &serde_json::Value) -> Result<IndexMap<String, String>> {
    let object = document
        .as_object()
        .ok_or_else(|| TkstError::Validation("token document must be a JSON object".into()))?;

    let is_flat = object.values().all(serde_json::Value::is_string);
    if is_flat {
        return Ok(object
            .iter()
            .map(|(k, v)| (k.clone(), v.as_str().unwrap_or_default().to_string()))
            .collect());
    }
    Ok(dtcg::expressions(document)?)
}
