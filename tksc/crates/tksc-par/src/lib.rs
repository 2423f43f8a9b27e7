//! tksc-par - Recursive-descent parser for TokenScript.
//!
//! The parser consumes tokens on demand from [`tksc_lex::Lexer`] and builds
//! the AST defined in [`ast`]. Expressions use precedence climbing; the
//! comma operator builds explicit lists and juxtaposition builds implicit
//! lists, so `a b, c d, e` parses as an explicit list of implicit lists.
//!
//! While parsing, every `{name}` reference is collected into a per-parse
//! set; the batch resolver reads it to build the dependency graph.
//!
//! A script may end in a single expression with no terminator - the usual
//! shape of a token body (`16 * {base}px`) and of embedded conversion
//! scripts. Parse failures carry the offending token and its source span;
//! the parser does not attempt recovery.

pub mod ast;
mod expr;
mod stmt;

use indexmap::IndexSet;
use thiserror::Error;
use tksc_lex::{LexError, Lexer, Token, TokenKind};
use tksc_util::Span;

pub use ast::*;

/// Errors produced while parsing.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ParseError {
    /// The lexer rejected the input.
    #[error(transparent)]
    Lex(#[from] LexError),

    /// A specific token was required.
    #[error("expected {expected}, found {found} at {span}")]
    Expected {
        expected: String,
        found: String,
        span: Span,
    },

    /// An expression statement without its `;`.
    #[error("missing ';' after statement, found {found} at {span}")]
    MissingTerminator { found: String, span: Span },

    /// `variable` not followed by a name.
    #[error("missing variable name at {span}")]
    MissingVariableName { span: Span },

    /// Missing or malformed type in a declaration.
    #[error("missing type in variable declaration at {span}")]
    MissingType { span: Span },

    /// A token that cannot start an expression.
    #[error("invalid expression: unexpected {found} at {span}")]
    InvalidExpression { found: String, span: Span },

    /// The left side of `=` is not a variable or attribute chain.
    #[error("invalid assignment target at {span}")]
    InvalidAssignTarget { span: Span },
}

impl ParseError {
    /// Location of the error.
    pub fn span(&self) -> Span {
        match self {
            ParseError::Lex(err) => err.span(),
            ParseError::Expected { span, .. }
            | ParseError::MissingTerminator { span, .. }
            | ParseError::MissingVariableName { span }
            | ParseError::MissingType { span }
            | ParseError::InvalidExpression { span, .. }
            | ParseError::InvalidAssignTarget { span } => *span,
        }
    }
}

/// A successful parse: the program plus every `{name}` it references.
#[derive(Debug, Clone)]
pub struct ParseOutput {
    pub program: Program,
    pub references: IndexSet<String>,
}

/// Parses a script with only the base unit set.
pub fn parse(source: &str) -> Result<ParseOutput, ParseError> {
    parse_with_units(source, std::iter::empty::<String>())
}

/// Parses a script recognizing additional registered unit keywords.
pub fn parse_with_units<I, S>(source: &str, units: I) -> Result<ParseOutput, ParseError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut parser = Parser::with_units(source, units)?;
    let program = parser.parse_program()?;
    Ok(ParseOutput {
        program,
        references: parser.into_references(),
    })
}

/// The TokenScript parser.
pub struct Parser<'a> {
    /// Token source.
    lexer: Lexer<'a>,

    /// Current (not yet consumed) token.
    current: Token,

    /// `{name}` payloads seen so far, in source order.
    references: IndexSet<String>,
}

impl<'a> Parser<'a> {
    /// Creates a parser over `source` with only the base unit set.
    pub fn new(source: &'a str) -> Result<Self, ParseError> {
        Self::with_units(source, std::iter::empty::<String>())
    }

    /// Creates a parser that also recognizes `units` as unit suffixes.
    pub fn with_units<I, S>(source: &'a str, units: I) -> Result<Self, ParseError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut lexer = Lexer::with_units(source, units);
        let current = lexer.next_token()?;
        Ok(Self {
            lexer,
            current,
            references: IndexSet::new(),
        })
    }

    /// References collected so far.
    pub fn references(&self) -> &IndexSet<String> {
        &self.references
    }

    /// Consumes the parser, yielding the collected reference set.
    pub fn into_references(self) -> IndexSet<String> {
        self.references
    }

    /// Moves to the next token.
    pub(crate) fn advance(&mut self) -> Result<(), ParseError> {
        self.current = self.lexer.next_token()?;
        Ok(())
    }

    /// The current token's span.
    pub(crate) fn current_span(&self) -> Span {
        self.current.span
    }

    /// The current token's kind.
    pub(crate) fn current_kind(&self) -> &TokenKind {
        &self.current.kind
    }

    /// True at end of input.
    pub(crate) fn is_at_end(&self) -> bool {
        self.current.is_eof()
    }

    /// Consumes `kind` if it is the current token.
    pub(crate) fn eat(&mut self, kind: &TokenKind) -> Result<bool, ParseError> {
        if self.current.kind == *kind {
            self.advance()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Requires the current token to be `kind`.
    pub(crate) fn expect(&mut self, kind: &TokenKind, expected: &str) -> Result<(), ParseError> {
        if self.current.kind == *kind {
            self.advance()
        } else {
            Err(ParseError::Expected {
                expected: expected.to_string(),
                found: self.current.kind.describe(),
                span: self.current.span,
            })
        }
    }

    pub(crate) fn expect_semicolon(&mut self) -> Result<(), ParseError> {
        if self.current.kind == TokenKind::Semicolon {
            self.advance()
        } else {
            Err(ParseError::MissingTerminator {
                found: self.current.kind.describe(),
                span: self.current.span,
            })
        }
    }
}
