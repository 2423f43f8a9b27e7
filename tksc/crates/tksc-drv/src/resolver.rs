//! Dependency-ordered batch resolution.
//!
//! One parse per token body, adjacency lists for the dependency graph, a
//! queue drain in input order, and per-token error capture. The reference
//! map the interpreter reads *is* the growing result map - resolving a
//! token immediately makes it visible to its dependents.

use std::collections::VecDeque;

use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, warn};

use tksc_interp::{is_uninterpreted_keyword, Interpreter, RefEntry, References};
use tksc_spec::Config;
use tksc_sym::Value;

/// Why a token failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenErrorKind {
    ParseError,
    CircularDependency,
    MissingReference,
    EvaluationError,
}

impl TokenErrorKind {
    /// Wire name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenErrorKind::ParseError => "parse_error",
            TokenErrorKind::CircularDependency => "circular_dependency",
            TokenErrorKind::MissingReference => "missing_reference",
            TokenErrorKind::EvaluationError => "evaluation_error",
        }
    }
}

/// The per-token error record.
#[derive(Clone, Debug)]
pub struct TokenError {
    pub token_name: String,
    pub kind: TokenErrorKind,
    /// The body as it was submitted; it doubles as the fallback value.
    pub original_value: String,
    pub details: String,
}

/// One resolved token: its value, plus the error record when it failed
/// (in which case the value is the original expression text).
#[derive(Clone, Debug)]
pub struct ResolvedToken {
    pub value: Value,
    pub error: Option<TokenError>,
}

impl ResolvedToken {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// The outcome of a batch: per-token results in input order, plus the
/// warnings the run accumulated.
#[derive(Clone, Debug)]
pub struct ResolveOutput {
    pub tokens: IndexMap<String, ResolvedToken>,
    pub warnings: Vec<String>,
}

impl ResolveOutput {
    /// The resolved value for `name`, if it succeeded.
    pub fn value(&self, name: &str) -> Option<&Value> {
        let token = self.tokens.get(name)?;
        token.is_ok().then_some(&token.value)
    }

    /// Every token rendered to its display string, input order preserved.
    pub fn rendered(&self, config: &Config) -> IndexMap<String, String> {
        self.tokens
            .iter()
            .map(|(name, token)| (name.clone(), render_value(&token.value, config)))
            .collect()
    }
}

/// Renders a value, routing colors through the color manager so dynamic
/// colors honor their schema's attribute order.
pub fn render_value(value: &Value, config: &Config) -> String {
    match value {
        Value::Color(color) => config.colors.format_color(color),
        other => other.render(),
    }
}

/// Batch-resolves a flat token map. The input map is never mutated.
pub fn resolve(tokens: &IndexMap<String, String>, config: &Config) -> ResolveOutput {
    Resolver::new(config).resolve(tokens)
}

/// The dependency-aware resolver; one instance per batch.
pub struct Resolver<'c> {
    config: &'c Config,
}

impl<'c> Resolver<'c> {
    pub fn new(config: &'c Config) -> Self {
        Self { config }
    }

    pub fn resolve(&self, tokens: &IndexMap<String, String>) -> ResolveOutput {
        let unit_keywords = self.config.unit_keywords();
        let mut warnings: Vec<String> = Vec::new();
        let mut errors: FxHashMap<String, TokenError> = FxHashMap::default();
        let mut asts: FxHashMap<String, tksc_par::Program> = FxHashMap::default();

        // Adjacency lists; `requires` keeps input order so residual-cycle
        // reporting is deterministic.
        let mut requires: IndexMap<String, FxHashSet<String>> = IndexMap::new();
        let mut required_by: FxHashMap<String, Vec<String>> = FxHashMap::default();

        // Parse pass: one parse per body, collecting reference edges.
        for (name, body) in tokens {
            let trimmed = body.trim();
            if trimmed.is_empty() || is_uninterpreted_keyword(trimmed) {
                // Recorded verbatim; nothing to evaluate.
                requires.insert(name.clone(), FxHashSet::default());
                continue;
            }

            match tksc_par::parse_with_units(body, unit_keywords.clone()) {
                Ok(output) => {
                    let mut required = FxHashSet::default();
                    for reference in output.references {
                        if reference == *name {
                            warnings.push(format!("token '{name}' references itself"));
                        }
                        required_by
                            .entry(reference.clone())
                            .or_default()
                            .push(name.clone());
                        required.insert(reference);
                    }
                    asts.insert(name.clone(), output.program);
                    requires.insert(name.clone(), required);
                }
                Err(err) => {
                    // The body stays usable as a literal fallback.
                    warn!(token = %name, error = %err, "token failed to parse");
                    warnings.push(format!("failed to parse token '{name}': {err}"));
                    errors.insert(
                        name.clone(),
                        TokenError {
                            token_name: name.clone(),
                            kind: TokenErrorKind::ParseError,
                            original_value: body.clone(),
                            details: err.to_string(),
                        },
                    );
                    requires.insert(name.clone(), FxHashSet::default());
                }
            }
        }

        // Everything with no outstanding requirements starts queued, in
        // input order; ties stay deterministic.
        let mut queue: VecDeque<String> = tokens
            .keys()
            .filter(|name| requires.get(*name).is_some_and(|required| required.is_empty()))
            .cloned()
            .collect();

        // The reference map the interpreter reads is the result map being
        // built - no hand-off per token.
        let mut references: References = References::new();
        let mut interpreter = Interpreter::new(self.config);
        let mut resolved: FxHashSet<String> = FxHashSet::default();

        while let Some(name) = queue.pop_front() {
            if !resolved.insert(name.clone()) {
                continue;
            }
            let body = &tokens[&name];

            match asts.get(&name) {
                Some(program) if !errors.contains_key(&name) => {
                    match interpreter.evaluate(program, &references) {
                        Ok(value) => {
                            debug!(token = %name, "resolved");
                            references.insert(name.clone(), RefEntry::Value(value));
                        }
                        Err(err) => {
                            warn!(token = %name, error = %err, "evaluation failed");
                            errors.insert(
                                name.clone(),
                                TokenError {
                                    token_name: name.clone(),
                                    kind: TokenErrorKind::EvaluationError,
                                    original_value: body.clone(),
                                    details: err.to_string(),
                                },
                            );
                            references
                                .insert(name.clone(), RefEntry::Value(Value::Str(body.clone())));
                        }
                    }
                }
                // Literal fallbacks: uninterpreted keywords, empty bodies,
                // parse failures.
                _ => {
                    references.insert(name.clone(), RefEntry::Value(Value::Str(body.clone())));
                }
            }

            // Release dependents whose last requirement this was.
            if let Some(dependents) = required_by.get(&name) {
                for dependent in dependents.clone() {
                    if let Some(outstanding) = requires.get_mut(&dependent) {
                        outstanding.remove(&name);
                        if outstanding.is_empty() && !resolved.contains(&dependent) {
                            queue.push_back(dependent);
                        }
                    }
                }
            }
        }

        // Whatever still has requirements is in a cycle or references a
        // token that does not exist.
        for (name, outstanding) in &requires {
            if resolved.contains(name) {
                continue;
            }
            let mut remaining: Vec<&str> = outstanding.iter().map(String::as_str).collect();
            remaining.sort_unstable();
            let missing = remaining.iter().any(|r| !tokens.contains_key(*r));
            let kind = if missing {
                TokenErrorKind::MissingReference
            } else {
                TokenErrorKind::CircularDependency
            };
            warn!(token = %name, kind = kind.as_str(), "token left unresolved");
            errors.insert(
                name.clone(),
                TokenError {
                    token_name: name.clone(),
                    kind,
                    original_value: tokens[name].clone(),
                    details: format!("unresolved dependencies: {}", remaining.join(", ")),
                },
            );
        }

        // Assemble per-token results in input order.
        let mut out = IndexMap::with_capacity(tokens.len());
        for (name, body) in tokens {
            let error = errors.remove(name);
            let value = if error.is_some() {
                Value::Str(body.clone())
            } else {
                match references.get(name) {
                    Some(entry) => entry.to_value(),
                    None => Value::Str(body.clone()),
                }
            };
            out.insert(name.clone(), ResolvedToken { value, error });
        }

        ResolveOutput {
            tokens: out,
            warnings,
        }
    }
}
