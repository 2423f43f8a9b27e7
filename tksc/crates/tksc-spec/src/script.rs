//! Parsed spec scripts.
//!
//! Conversion and initializer scripts are TokenScript sources embedded in
//! spec JSON. They are parsed exactly once, at registration, and shared as
//! `Arc<Program>` so cloning a manager never reparses.

use std::sync::Arc;

use tksc_par::Program;

use crate::error::Result;
use crate::schema::ScriptJson;

/// A spec script with its cached AST.
#[derive(Clone, Debug)]
pub struct Script {
    /// Script-language URI from the spec (`script.type`).
    pub language: String,
    /// Original source, kept for diagnostics.
    pub source: String,
    /// AST parsed at registration.
    pub program: Arc<Program>,
}

impl Script {
    /// Parses an embedded script with only the base unit set.
    pub fn parse(json: &ScriptJson) -> Result<Self> {
        Self::parse_with_units(json, std::iter::empty::<String>())
    }

    /// Parses an embedded script that may use registered unit suffixes.
    pub fn parse_with_units<I, S>(json: &ScriptJson, units: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let parsed = tksc_par::parse_with_units(&json.script, units)?;
        Ok(Self {
            language: json.language.clone(),
            source: json.script.clone(),
            program: Arc::new(parsed.program),
        })
    }
}
