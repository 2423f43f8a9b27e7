//! tksc-util - Shared infrastructure for the TokenScript interpreter.
//!
//! Currently just source-location tracking: every token and AST node
//! carries a [`Span`] so diagnostics can point back into the original
//! token body.

pub mod span;

pub use span::Span;
