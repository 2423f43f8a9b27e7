//! tksc-interp - The tree-walking TokenScript evaluator.
//!
//! One [`Interpreter`] holds a scoped symbol table and a borrowed
//! [`Config`]; the resolver keeps a single instance alive for a whole
//! batch and hands each evaluation the live reference map. Spec-registered
//! conversion and function scripts are evaluated here too, each in a fresh
//! reference frame ([`convert`]).

pub mod builtins;
pub mod convert;
pub mod error;
pub mod interp;
pub mod refs;

pub use error::EvalError;
pub use interp::Interpreter;
pub use refs::{json_to_value, RefEntry, References};

use tksc_spec::Config;
use tksc_sym::Value;

/// Identifiers the interpreter re-emits verbatim instead of resolving.
/// Matching is case-sensitive.
pub const UNINTERPRETED_KEYWORDS: &[&str] = &[
    "inside",
    "outside",
    "above",
    "below",
    "left",
    "right",
    "top",
    "bottom",
    "before",
    "after",
    "between",
    "uppercase",
    "lowercase",
    "underline",
    "none",
    "innerShadow",
    "outerShadow",
    "shadow",
];

/// Case-sensitive membership test for the uninterpreted keyword set.
pub fn is_uninterpreted_keyword(name: &str) -> bool {
    UNINTERPRETED_KEYWORDS.contains(&name)
}

/// Parses and evaluates a single script against `references`.
///
/// Registered unit keywords are wired into the parse; evaluation uses a
/// fresh interpreter over the given config.
pub fn interpret(
    source: &str,
    references: &References,
    config: &Config,
) -> Result<Value, EvalError> {
    let parsed = tksc_par::parse_with_units(source, config.unit_keywords())?;
    let mut interpreter = Interpreter::new(config);
    interpreter.evaluate(&parsed.program, references)
}
