//! tksc-lex - Lexical analysis for TokenScript source.
//!
//! Transforms a token body such as `16 * 1.5px` or
//! `if (x > 20px) [ x = 20px; ]` into a stream of [`Token`]s. The lexer is
//! on-demand: the parser pulls one token at a time and may look ahead with
//! [`Lexer::peek`] / [`Lexer::peek_tokens`], which save and restore the full
//! scanner state.

pub mod cursor;
mod edge_cases;
pub mod lexer;
pub mod token;

pub use lexer::{LexError, Lexer};
pub use token::{Keyword, Token, TokenKind, BASE_UNITS};
