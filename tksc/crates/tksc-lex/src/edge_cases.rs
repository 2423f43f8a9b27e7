//! Edge-case and property tests for the lexer.

#![cfg(test)]

use proptest::prelude::*;

use crate::{Lexer, TokenKind};

/// Drives a lexer to completion, counting tokens. Stops on the first error.
fn drain(source: &str) -> Result<usize, crate::LexError> {
    let mut lexer = Lexer::new(source);
    let mut count = 0;
    loop {
        let token = lexer.next_token()?;
        if token.is_eof() {
            return Ok(count);
        }
        count += 1;
        // Each non-EOF token consumes at least one character.
        assert!(count <= source.chars().count() + 1, "lexer failed to make progress");
    }
}

proptest! {
    /// The lexer is total: any input either lexes or reports an error, and
    /// it always makes progress.
    #[test]
    fn lexing_never_panics(source in ".{0,64}") {
        let _ = drain(&source);
    }

    /// ASCII words never lex to anything but a single identifier-like token.
    #[test]
    fn ascii_word_is_one_token(word in "[a-zA-Z][a-zA-Z0-9_]{0,12}") {
        let mut lexer = Lexer::new(&word);
        let token = lexer.next_token().unwrap();
        prop_assert!(matches!(
            token.kind,
            TokenKind::Str(_) | TokenKind::Format(_) | TokenKind::Keyword(_)
        ));
        prop_assert!(lexer.is_eof());
    }

    /// Integer literals round-trip through the lexer.
    #[test]
    fn integer_round_trip(n in 0u32..1_000_000) {
        let source = n.to_string();
        let mut lexer = Lexer::new(&source);
        let token = lexer.next_token().unwrap();
        prop_assert_eq!(token.kind, TokenKind::Number { value: n as f64, is_float: false });
    }
}

#[test]
fn whitespace_only_input_is_eof() {
    assert_eq!(drain(" \t\n  ").unwrap(), 0);
}

#[test]
fn comment_only_input_is_eof() {
    assert_eq!(drain("// nothing here").unwrap(), 0);
}

#[test]
fn reference_with_newline_inside() {
    let mut lexer = Lexer::new("{a\n.b}");
    let token = lexer.next_token().unwrap();
    assert_eq!(token.kind, TokenKind::Reference("a.b".into()));
}
