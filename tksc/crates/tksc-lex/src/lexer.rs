//! Main lexer implementation for TokenScript source.
//!
//! The scanner dispatches on the first character of each lexeme. Unit
//! keywords are matched case-insensitively against the closed base set plus
//! whatever unit specs the caller has registered; `%` has its own rule.

use std::collections::HashSet;

use thiserror::Error;
use tksc_util::Span;

use crate::cursor::Cursor;
use crate::token::{keyword_from_ident, Token, TokenKind, BASE_UNITS};

/// Errors produced while scanning.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum LexError {
    /// A character no rule accepts.
    #[error("unexpected character '{ch}' at {span}")]
    UnexpectedChar { ch: char, span: Span },

    /// `{` with no closing `}`.
    #[error("unterminated reference at {span}")]
    UnterminatedReference { span: Span },

    /// `{}` or `{   }`.
    #[error("empty reference at {span}")]
    EmptyReference { span: Span },

    /// Quoted string with no matching closer.
    #[error("unterminated string at {span}")]
    UnterminatedString { span: Span },

    /// `#` followed by anything but exactly 3 or 6 hex digits.
    #[error("malformed hex color '{text}' at {span}")]
    MalformedHexColor { text: String, span: Span },

    /// A numeric literal with more than one decimal point.
    #[error("malformed number '{text}' at {span}")]
    MalformedNumber { text: String, span: Span },
}

impl LexError {
    /// Location of the error.
    pub fn span(&self) -> Span {
        match self {
            LexError::UnexpectedChar { span, .. }
            | LexError::UnterminatedReference { span }
            | LexError::EmptyReference { span }
            | LexError::UnterminatedString { span }
            | LexError::MalformedHexColor { span, .. }
            | LexError::MalformedNumber { span, .. } => *span,
        }
    }
}

/// The TokenScript lexer.
///
/// # Example
///
/// ```
/// use tksc_lex::{Lexer, TokenKind};
///
/// let mut lexer = Lexer::new("16px");
/// assert_eq!(
///     lexer.next_token().unwrap().kind,
///     TokenKind::Number { value: 16.0, is_float: false }
/// );
/// assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Format("px".into()));
/// assert!(lexer.is_eof());
/// ```
pub struct Lexer<'a> {
    /// Character cursor over the source.
    cursor: Cursor<'a>,

    /// Registered unit keywords beyond [`BASE_UNITS`], lowercased.
    extra_units: HashSet<String>,

    /// Start position of the current token.
    token_start: usize,

    /// Start line of the current token.
    token_line: u32,

    /// Start column of the current token.
    token_column: u32,
}

impl<'a> Lexer<'a> {
    /// Creates a lexer recognizing only the base unit set.
    pub fn new(source: &'a str) -> Self {
        Self::with_units(source, std::iter::empty::<String>())
    }

    /// Creates a lexer that additionally recognizes `units` as `Format`
    /// suffixes. Registered unit specs are wired in here by the resolver.
    pub fn with_units<I, S>(source: &'a str, units: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            cursor: Cursor::new(source),
            extra_units: units.into_iter().map(|u| u.into().to_lowercase()).collect(),
            token_start: 0,
            token_line: 1,
            token_column: 1,
        }
    }

    /// The source being lexed.
    pub fn source(&self) -> &'a str {
        self.cursor.source()
    }

    /// Returns the next token, consuming it.
    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_trivia();

        self.token_start = self.cursor.position();
        self.token_line = self.cursor.line();
        self.token_column = self.cursor.column();

        if self.cursor.is_at_end() {
            return Ok(self.make_token(TokenKind::Eof));
        }

        let c = self.cursor.current_char();
        match c {
            '(' => Ok(self.single(TokenKind::LParen)),
            ')' => Ok(self.single(TokenKind::RParen)),
            '[' => Ok(self.single(TokenKind::LBlock)),
            ']' => Ok(self.single(TokenKind::RBlock)),
            ',' => Ok(self.single(TokenKind::Comma)),
            ':' => Ok(self.single(TokenKind::Colon)),
            ';' => Ok(self.single(TokenKind::Semicolon)),
            '+' => Ok(self.single(TokenKind::Plus)),
            '-' => Ok(self.single(TokenKind::Minus)),
            '*' => Ok(self.single(TokenKind::Star)),
            '/' => Ok(self.single(TokenKind::Slash)),
            '^' => Ok(self.single(TokenKind::Caret)),
            '%' => Ok(self.single(TokenKind::Format("%".into()))),
            '=' => {
                self.cursor.advance();
                if self.cursor.match_char('=') {
                    Ok(self.make_token(TokenKind::EqEq))
                } else {
                    Ok(self.make_token(TokenKind::Eq))
                }
            }
            '!' => {
                self.cursor.advance();
                if self.cursor.match_char('=') {
                    Ok(self.make_token(TokenKind::NotEq))
                } else {
                    Ok(self.make_token(TokenKind::Not))
                }
            }
            '<' => {
                self.cursor.advance();
                if self.cursor.match_char('=') {
                    Ok(self.make_token(TokenKind::LtEq))
                } else {
                    Ok(self.make_token(TokenKind::Lt))
                }
            }
            '>' => {
                self.cursor.advance();
                if self.cursor.match_char('=') {
                    Ok(self.make_token(TokenKind::GtEq))
                } else {
                    Ok(self.make_token(TokenKind::Gt))
                }
            }
            '&' => {
                self.cursor.advance();
                if self.cursor.match_char('&') {
                    Ok(self.make_token(TokenKind::AndAnd))
                } else {
                    Err(self.error_here('&'))
                }
            }
            '|' => {
                self.cursor.advance();
                if self.cursor.match_char('|') {
                    Ok(self.make_token(TokenKind::OrOr))
                } else {
                    Err(self.error_here('|'))
                }
            }
            '.' => {
                // A leading dot starts a fractional number; otherwise it is
                // the member-access dot.
                if self.cursor.peek_char(1).is_ascii_digit() {
                    self.lex_number()
                } else {
                    Ok(self.single(TokenKind::Dot))
                }
            }
            '{' => self.lex_reference(),
            '#' => self.lex_hex_color(),
            '\'' | '"' => self.lex_string(c),
            _ if c.is_ascii_digit() => self.lex_number(),
            _ if is_ident_start(c) => Ok(self.lex_identifier()),
            _ => {
                let err = self.error_here(c);
                self.cursor.advance();
                Err(err)
            }
        }
    }

    /// Returns the next token without consuming it.
    pub fn peek(&mut self) -> Result<Token, LexError> {
        let saved = self.cursor.snapshot();
        let token = self.next_token();
        self.cursor.restore(saved);
        token
    }

    /// Returns up to `n` upcoming tokens without consuming them.
    ///
    /// The list is cut short at (and includes) the end-of-input token.
    pub fn peek_tokens(&mut self, n: usize) -> Result<Vec<Token>, LexError> {
        let saved = self.cursor.snapshot();
        let mut tokens = Vec::with_capacity(n);
        let mut result = Ok(());
        for _ in 0..n {
            match self.next_token() {
                Ok(token) => {
                    let eof = token.is_eof();
                    tokens.push(token);
                    if eof {
                        break;
                    }
                }
                Err(err) => {
                    result = Err(err);
                    break;
                }
            }
        }
        self.cursor.restore(saved);
        result.map(|_| tokens)
    }

    /// True if only trivia remains before the end of input.
    pub fn is_eof(&mut self) -> bool {
        matches!(self.peek(), Ok(token) if token.is_eof())
    }

    /// Skips whitespace and `//` line comments.
    fn skip_trivia(&mut self) {
        loop {
            while !self.cursor.is_at_end() && self.cursor.current_char().is_whitespace() {
                self.cursor.advance();
            }
            if self.cursor.current_char() == '/' && self.cursor.peek_char(1) == '/' {
                while !self.cursor.is_at_end() && self.cursor.current_char() != '\n' {
                    self.cursor.advance();
                }
                continue;
            }
            break;
        }
    }

    /// Lexes a numeric literal. A leading `.` is read as `0.`; a second
    /// decimal point is an error.
    fn lex_number(&mut self) -> Result<Token, LexError> {
        let mut text = String::new();
        let mut seen_dot = false;

        if self.cursor.current_char() == '.' {
            text.push_str("0.");
            seen_dot = true;
            self.cursor.advance();
        }

        loop {
            let c = self.cursor.current_char();
            if c.is_ascii_digit() {
                text.push(c);
                self.cursor.advance();
            } else if c == '.' && self.cursor.peek_char(1).is_ascii_digit() {
                if seen_dot {
                    // Consume the malformed tail so the span covers it.
                    text.push(c);
                    self.cursor.advance();
                    while self.cursor.current_char().is_ascii_digit() {
                        text.push(self.cursor.current_char());
                        self.cursor.advance();
                    }
                    return Err(LexError::MalformedNumber {
                        text,
                        span: self.span_here(),
                    });
                }
                seen_dot = true;
                text.push(c);
                self.cursor.advance();
            } else {
                break;
            }
        }

        let value: f64 = text.parse().map_err(|_| LexError::MalformedNumber {
            text: text.clone(),
            span: self.span_here(),
        })?;

        Ok(self.make_token(TokenKind::Number {
            value,
            is_float: seen_dot,
        }))
    }

    /// Lexes `{name}`, stripping interior whitespace.
    fn lex_reference(&mut self) -> Result<Token, LexError> {
        self.cursor.advance(); // '{'
        let mut name = String::new();
        loop {
            if self.cursor.is_at_end() {
                return Err(LexError::UnterminatedReference {
                    span: self.span_here(),
                });
            }
            let c = self.cursor.current_char();
            if c == '}' {
                self.cursor.advance();
                break;
            }
            if !c.is_whitespace() {
                name.push(c);
            }
            self.cursor.advance();
        }
        if name.is_empty() {
            return Err(LexError::EmptyReference {
                span: self.span_here(),
            });
        }
        Ok(self.make_token(TokenKind::Reference(name)))
    }

    /// Lexes `#RGB` / `#RRGGBB`.
    fn lex_hex_color(&mut self) -> Result<Token, LexError> {
        self.cursor.advance(); // '#'
        let mut digits = 0usize;
        while self.cursor.current_char().is_ascii_hexdigit() {
            self.cursor.advance();
            digits += 1;
        }
        // A trailing word character means this was not a color at all.
        let trailing = self.cursor.current_char();
        if !(digits == 3 || digits == 6) || is_ident_continue(trailing) {
            while is_ident_continue(self.cursor.current_char()) {
                self.cursor.advance();
            }
            return Err(LexError::MalformedHexColor {
                text: self.cursor.slice_from(self.token_start).to_string(),
                span: self.span_here(),
            });
        }
        let text = self.cursor.slice_from(self.token_start).to_string();
        Ok(self.make_token(TokenKind::HexColor(text)))
    }

    /// Lexes a quoted string; opener and closer must match.
    fn lex_string(&mut self, quote: char) -> Result<Token, LexError> {
        self.cursor.advance(); // opening quote
        let mut value = String::new();
        loop {
            if self.cursor.is_at_end() {
                return Err(LexError::UnterminatedString {
                    span: self.span_here(),
                });
            }
            let c = self.cursor.current_char();
            self.cursor.advance();
            if c == quote {
                break;
            }
            value.push(c);
        }
        Ok(self.make_token(TokenKind::ExplicitStr(value)))
    }

    /// Lexes an identifier and classifies it as keyword, unit, or string.
    fn lex_identifier(&mut self) -> Token {
        while is_ident_continue(self.cursor.current_char()) {
            self.cursor.advance();
        }
        let text = self.cursor.slice_from(self.token_start);
        let lower = text.to_lowercase();

        if let Some(keyword) = keyword_from_ident(&lower) {
            return self.make_token(TokenKind::Keyword(keyword));
        }
        if BASE_UNITS.contains(&lower.as_str()) || self.extra_units.contains(&lower) {
            return self.make_token(TokenKind::Format(lower));
        }
        let text = text.to_string();
        self.make_token(TokenKind::Str(text))
    }

    /// Single-character token helper.
    fn single(&mut self, kind: TokenKind) -> Token {
        self.cursor.advance();
        self.make_token(kind)
    }

    fn make_token(&self, kind: TokenKind) -> Token {
        Token::new(kind, self.span_here())
    }

    fn span_here(&self) -> Span {
        Span::new(
            self.token_start,
            self.cursor.position(),
            self.token_line,
            self.token_column,
        )
    }

    fn error_here(&self, ch: char) -> LexError {
        LexError::UnexpectedChar {
            ch,
            span: Span::new(
                self.token_start,
                self.token_start + ch.len_utf8(),
                self.token_line,
                self.token_column,
            ),
        }
    }
}

/// Identifier start: ASCII alpha, or any code point at or above U+0080
/// except the acute accent; back tick is excluded by the ASCII bound.
fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || (c as u32 >= 0x80 && c != '\u{00B4}' && c != '`')
}

/// Identifier continuation adds digits, `-`, and `_`.
fn is_ident_continue(c: char) -> bool {
    is_ident_start(c) || c.is_ascii_digit() || c == '-' || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::Keyword;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let mut lexer = Lexer::new(source);
        let mut out = Vec::new();
        loop {
            let token = lexer.next_token().expect("lex failure");
            let eof = token.is_eof();
            out.push(token.kind);
            if eof {
                break;
            }
        }
        out
    }

    #[test]
    fn test_integer_and_float() {
        assert_eq!(
            kinds("16 1.5"),
            vec![
                TokenKind::Number {
                    value: 16.0,
                    is_float: false
                },
                TokenKind::Number {
                    value: 1.5,
                    is_float: true
                },
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_leading_dot_number() {
        assert_eq!(
            kinds(".5"),
            vec![
                TokenKind::Number {
                    value: 0.5,
                    is_float: true
                },
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_two_dots_is_malformed() {
        let mut lexer = Lexer::new("1.2.3");
        assert!(matches!(
            lexer.next_token(),
            Err(LexError::MalformedNumber { .. })
        ));
    }

    #[test]
    fn test_number_with_unit() {
        assert_eq!(
            kinds("16px"),
            vec![
                TokenKind::Number {
                    value: 16.0,
                    is_float: false
                },
                TokenKind::Format("px".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_percent_format() {
        assert_eq!(
            kinds("50%"),
            vec![
                TokenKind::Number {
                    value: 50.0,
                    is_float: false
                },
                TokenKind::Format("%".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_unit_keywords_case_insensitive() {
        assert_eq!(
            kinds("10PX 2Rem"),
            vec![
                TokenKind::Number {
                    value: 10.0,
                    is_float: false
                },
                TokenKind::Format("px".into()),
                TokenKind::Number {
                    value: 2.0,
                    is_float: false
                },
                TokenKind::Format("rem".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_registered_extra_unit() {
        let mut lexer = Lexer::with_units("4gu", ["gu"]);
        lexer.next_token().unwrap();
        assert_eq!(
            lexer.next_token().unwrap().kind,
            TokenKind::Format("gu".into())
        );
    }

    #[test]
    fn test_reference_strips_whitespace() {
        assert_eq!(
            kinds("{ base.spacing }"),
            vec![TokenKind::Reference("base.spacing".into()), TokenKind::Eof]
        );
    }

    #[test]
    fn test_unterminated_reference() {
        let mut lexer = Lexer::new("{base");
        assert!(matches!(
            lexer.next_token(),
            Err(LexError::UnterminatedReference { .. })
        ));
    }

    #[test]
    fn test_empty_reference() {
        let mut lexer = Lexer::new("{  }");
        assert!(matches!(
            lexer.next_token(),
            Err(LexError::EmptyReference { .. })
        ));
    }

    #[test]
    fn test_keywords_case_insensitive() {
        assert_eq!(
            kinds("IF Elif variable TRUE"),
            vec![
                TokenKind::Keyword(Keyword::If),
                TokenKind::Keyword(Keyword::Elif),
                TokenKind::Keyword(Keyword::Variable),
                TokenKind::Keyword(Keyword::True),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_hex_colors() {
        assert_eq!(
            kinds("#fff #FF0080"),
            vec![
                TokenKind::HexColor("#fff".into()),
                TokenKind::HexColor("#FF0080".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_malformed_hex_color() {
        for source in ["#ff", "#ffff", "#fffgg"] {
            let mut lexer = Lexer::new(source);
            assert!(
                matches!(lexer.next_token(), Err(LexError::MalformedHexColor { .. })),
                "expected malformed hex for {source}"
            );
        }
    }

    #[test]
    fn test_quoted_strings() {
        assert_eq!(
            kinds(r#"'single' "double""#),
            vec![
                TokenKind::ExplicitStr("single".into()),
                TokenKind::ExplicitStr("double".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_mismatched_quote_is_unterminated() {
        let mut lexer = Lexer::new("'abc\"");
        assert!(matches!(
            lexer.next_token(),
            Err(LexError::UnterminatedString { .. })
        ));
    }

    #[test]
    fn test_line_comment_skipped() {
        assert_eq!(
            kinds("1 // comment\n2"),
            vec![
                TokenKind::Number {
                    value: 1.0,
                    is_float: false
                },
                TokenKind::Number {
                    value: 2.0,
                    is_float: false
                },
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_operators_and_comparisons() {
        assert_eq!(
            kinds("+ - * / ^ == != < <= > >= = && || !"),
            vec![
                TokenKind::Plus,
                TokenKind::Minus,
                TokenKind::Star,
                TokenKind::Slash,
                TokenKind::Caret,
                TokenKind::EqEq,
                TokenKind::NotEq,
                TokenKind::Lt,
                TokenKind::LtEq,
                TokenKind::Gt,
                TokenKind::GtEq,
                TokenKind::Eq,
                TokenKind::AndAnd,
                TokenKind::OrOr,
                TokenKind::Not,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_single_ampersand_is_error() {
        let mut lexer = Lexer::new("a & b");
        lexer.next_token().unwrap();
        assert!(matches!(
            lexer.next_token(),
            Err(LexError::UnexpectedChar { ch: '&', .. })
        ));
    }

    #[test]
    fn test_hyphenated_identifier() {
        assert_eq!(
            kinds("linear-gradient"),
            vec![TokenKind::Str("linear-gradient".into()), TokenKind::Eof]
        );
    }

    #[test]
    fn test_identifier_casing_preserved() {
        assert_eq!(
            kinds("innerShadow"),
            vec![TokenKind::Str("innerShadow".into()), TokenKind::Eof]
        );
    }

    #[test]
    fn test_emoji_identifier() {
        assert_eq!(
            kinds("🎨-color"),
            vec![TokenKind::Str("🎨-color".into()), TokenKind::Eof]
        );
    }

    #[test]
    fn test_acute_accent_rejected() {
        let mut lexer = Lexer::new("\u{00B4}");
        assert!(matches!(
            lexer.next_token(),
            Err(LexError::UnexpectedChar { .. })
        ));
    }

    #[test]
    fn test_peek_does_not_consume() {
        let mut lexer = Lexer::new("1 2");
        let peeked = lexer.peek().unwrap();
        let next = lexer.next_token().unwrap();
        assert_eq!(peeked, next);
        assert_eq!(
            lexer.next_token().unwrap().kind,
            TokenKind::Number {
                value: 2.0,
                is_float: false
            }
        );
    }

    #[test]
    fn test_peek_tokens_restores_state() {
        let mut lexer = Lexer::new("a.b = 1;");
        let ahead = lexer.peek_tokens(4).unwrap();
        assert_eq!(ahead.len(), 4);
        assert_eq!(ahead[3].kind, TokenKind::Eq);
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Str("a".into()));
    }

    #[test]
    fn test_peek_tokens_stops_at_eof() {
        let mut lexer = Lexer::new("1");
        let ahead = lexer.peek_tokens(5).unwrap();
        assert_eq!(ahead.len(), 2);
        assert!(ahead[1].is_eof());
    }

    #[test]
    fn test_is_eof() {
        let mut lexer = Lexer::new("  // just a comment");
        assert!(lexer.is_eof());
    }

    #[test]
    fn test_spans_point_into_source() {
        let source = "{a} + 8px";
        let mut lexer = Lexer::new(source);
        let reference = lexer.next_token().unwrap();
        assert_eq!(reference.span.snippet(source), "{a}");
        let plus = lexer.next_token().unwrap();
        assert_eq!(plus.span.snippet(source), "+");
    }
}
