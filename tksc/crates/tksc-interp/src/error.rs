//! Evaluation errors.
//!
//! Everything that can abort a single script evaluation. The resolver
//! catches these per token; nothing here crosses a batch boundary.

use thiserror::Error;
use tksc_par::ParseError;
use tksc_spec::{ColorError, SpecError};
use tksc_sym::SymbolError;
use tksc_util::Span;

/// The `while` iteration cap; exceeding it aborts the evaluation.
pub const ITERATION_LIMIT: usize = 100_000;

/// Errors raised while evaluating a script.
#[derive(Debug, Error)]
pub enum EvalError {
    /// The script failed to parse (embedded scripts, `interpret` entry).
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// A value-system error (method, operation, type registry).
    #[error(transparent)]
    Symbol(#[from] SymbolError),

    /// A tagged color-schema error.
    #[error(transparent)]
    Color(#[from] ColorError),

    /// A manager error (unknown URI, no conversion path).
    #[error(transparent)]
    Spec(#[from] SpecError),

    /// `{name}` has no entry in the active reference map.
    #[error("UNRESOLVED_REFERENCE: token references unknown name '{name}'")]
    UnresolvedReference { name: String, span: Span },

    /// A bare identifier used as a variable that no scope defines.
    #[error("undefined variable '{name}' at {span}")]
    UndefinedVariable { name: String, span: Span },

    /// A call to a name neither registered nor uninterpreted.
    #[error("unknown function '{name}' at {span}")]
    UnknownFunction { name: String, span: Span },

    /// `if`/`while` condition of the wrong type.
    #[error("Boolean required for condition, got {found} at {span}")]
    ConditionNotBoolean { found: String, span: Span },

    /// The `while` iteration cap tripped.
    #[error("while loop exceeded {limit} iterations")]
    IterationCap { limit: usize },

    /// Declaration name containing a forbidden character. The message text
    /// is load-bearing; callers match on it.
    #[error("Invalid variable name '{name}'. Use a simple name (and underscores) without '.', '-', '['.")]
    InvalidVariableName { name: String },

    /// Unit suffix applied to something that is not a plain number.
    #[error("unit suffix requires a Number, got {found} at {span}")]
    UnitSuffixNotNumber { found: String, span: Span },

    /// `color.to` used as a value instead of `color.to.<subtype>()`.
    #[error("conversion target required after '.to' at {span}")]
    BareConversionProxy { span: Span },

    /// `.to` on a receiver that is not a color.
    #[error("'.to' conversion requires a Color receiver, got {found} at {span}")]
    ConversionOnNonColor { found: String, span: Span },

    /// A conversion script produced something that cannot be a color.
    #[error("conversion script returned {found}, expected a color")]
    BadConversionResult { found: String },

    /// A unit conversion script produced a non-numeric result.
    #[error("unit conversion script returned {found}, expected a number")]
    BadUnitConversionResult { found: String },

    /// A builtin received an argument it cannot digest.
    #[error("{function}: {message}")]
    InvalidArgument { function: String, message: String },
}

/// Result alias for evaluation.
pub type Result<T> = std::result::Result<T, EvalError>;
