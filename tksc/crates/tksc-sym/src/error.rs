//! Error types for the value system.

use thiserror::Error;

/// Errors raised by value methods, operations, and the symbol table.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum SymbolError {
    /// The receiver type has no such method.
    #[error("{type_name} has no method '{method}'")]
    UnknownMethod { type_name: String, method: String },

    /// The receiver type has no such attribute.
    #[error("{type_name} has no attribute '{attribute}'")]
    UnknownAttribute {
        type_name: String,
        attribute: String,
    },

    /// Wrong number of arguments for a method or function.
    #[error("{callee} expects {expected} argument(s), got {supplied}")]
    ArityMismatch {
        callee: String,
        expected: String,
        supplied: usize,
    },

    /// An operand or argument had the wrong type.
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    /// Arithmetic or comparison applied to incompatible operand types.
    #[error("cannot apply '{op}' to {lhs} and {rhs}")]
    InvalidOperands {
        op: String,
        lhs: String,
        rhs: String,
    },

    /// Division by zero.
    #[error("division by zero")]
    DivisionByZero,

    /// Two dimensioned operands with no conversion between their units.
    #[error("multiple incompatible units: '{left}' and '{right}'")]
    IncompatibleUnits { left: String, right: String },

    /// `to_string(radix)` outside [2, 36].
    #[error("invalid radix {radix}, expected 2..=36")]
    InvalidRadix { radix: i64 },

    /// A list index outside the current length.
    #[error("index {index} out of bounds for list of length {length}")]
    IndexOutOfBounds { index: i64, length: usize },

    /// A declared type the registry does not know.
    #[error("Unknown base type '{name}'")]
    UnknownType { name: String },

    /// A declared subtype the registry does not know.
    #[error("Unknown subtype '{sub}' of '{base}'")]
    UnknownSubtype { base: String, sub: String },

    /// `variable` redeclared in the same scope.
    #[error("variable '{name}' is already declared in this scope")]
    Redeclaration { name: String },

    /// Assignment to a name no scope defines.
    #[error("undefined variable '{name}'")]
    UndefinedVariable { name: String },

    /// A hex color literal that fails validation.
    #[error("invalid hex color '{text}'")]
    InvalidHexColor { text: String },
}

/// Result alias for value-system operations.
pub type Result<T> = std::result::Result<T, SymbolError>;
