//! Token definitions for TokenScript source.

use std::fmt;

use tksc_util::Span;

/// Units the lexer always recognizes as a `Format` suffix.
///
/// Registered unit specs extend this set per lexer instance; `%` is handled
/// by its own character rule and never appears here.
pub const BASE_UNITS: &[&str] = &[
    "px", "em", "rem", "vw", "vh", "pt", "in", "cm", "mm", "deg",
];

/// Reserved words of the language.
///
/// Matching is case-insensitive; the lexer stores the canonical variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Keyword {
    /// "true"
    True,
    /// "false"
    False,
    /// "null"
    Null,
    /// "undefined" - treated as an absent value, same as null
    Undefined,
    /// "while"
    While,
    /// "if"
    If,
    /// "elif"
    Elif,
    /// "else"
    Else,
    /// "return"
    Return,
    /// "variable" - declaration keyword
    Variable,
}

/// Looks up a reserved keyword from an already-lowercased identifier.
pub fn keyword_from_ident(lower: &str) -> Option<Keyword> {
    match lower {
        "true" => Some(Keyword::True),
        "false" => Some(Keyword::False),
        "null" => Some(Keyword::Null),
        "undefined" => Some(Keyword::Undefined),
        "while" => Some(Keyword::While),
        "if" => Some(Keyword::If),
        "elif" => Some(Keyword::Elif),
        "else" => Some(Keyword::Else),
        "return" => Some(Keyword::Return),
        "variable" => Some(Keyword::Variable),
        _ => None,
    }
}

/// The kind of a lexical token, with its payload where one applies.
#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    /// Numeric literal. `is_float` records whether the source spelled a
    /// decimal point, which drives integer-printability downstream.
    Number { value: f64, is_float: bool },

    /// `{dotted.name}` - the payload is the name with whitespace stripped.
    Reference(String),

    /// Bare identifier, original casing preserved.
    Str(String),

    /// Quoted string literal (single or double quotes).
    ExplicitStr(String),

    /// Reserved keyword.
    Keyword(Keyword),

    /// Unit suffix keyword (`px`, `rem`, ..., `%`), canonical lowercase.
    Format(String),

    /// `#RGB` or `#RRGGBB` literal, including the `#`.
    HexColor(String),

    /// "+"
    Plus,
    /// "-"
    Minus,
    /// "*"
    Star,
    /// "/"
    Slash,
    /// "^"
    Caret,

    /// "=="
    EqEq,
    /// "!="
    NotEq,
    /// "<"
    Lt,
    /// ">"
    Gt,
    /// "<="
    LtEq,
    /// ">="
    GtEq,

    /// "="
    Eq,

    /// "("
    LParen,
    /// ")"
    RParen,
    /// "[" - blocks use square brackets in this language
    LBlock,
    /// "]"
    RBlock,

    /// ","
    Comma,
    /// "."
    Dot,
    /// ":"
    Colon,
    /// ";"
    Semicolon,

    /// "&&"
    AndAnd,
    /// "||"
    OrOr,
    /// "!"
    Not,

    /// End of input.
    Eof,
}

impl TokenKind {
    /// Short human-readable description used in parser errors.
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Number { value, .. } => format!("number '{value}'"),
            TokenKind::Reference(name) => format!("reference '{{{name}}}'"),
            TokenKind::Str(s) => format!("identifier '{s}'"),
            TokenKind::ExplicitStr(s) => format!("string '{s}'"),
            TokenKind::Keyword(kw) => format!("keyword '{kw:?}'").to_lowercase(),
            TokenKind::Format(unit) => format!("unit '{unit}'"),
            TokenKind::HexColor(hex) => format!("color '{hex}'"),
            TokenKind::Plus => "'+'".into(),
            TokenKind::Minus => "'-'".into(),
            TokenKind::Star => "'*'".into(),
            TokenKind::Slash => "'/'".into(),
            TokenKind::Caret => "'^'".into(),
            TokenKind::EqEq => "'=='".into(),
            TokenKind::NotEq => "'!='".into(),
            TokenKind::Lt => "'<'".into(),
            TokenKind::Gt => "'>'".into(),
            TokenKind::LtEq => "'<='".into(),
            TokenKind::GtEq => "'>='".into(),
            TokenKind::Eq => "'='".into(),
            TokenKind::LParen => "'('".into(),
            TokenKind::RParen => "')'".into(),
            TokenKind::LBlock => "'['".into(),
            TokenKind::RBlock => "']'".into(),
            TokenKind::Comma => "','".into(),
            TokenKind::Dot => "'.'".into(),
            TokenKind::Colon => "':'".into(),
            TokenKind::Semicolon => "';'".into(),
            TokenKind::AndAnd => "'&&'".into(),
            TokenKind::OrOr => "'||'".into(),
            TokenKind::Not => "'!'".into(),
            TokenKind::Eof => "end of input".into(),
        }
    }
}

/// A token with its source span.
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// True for the end-of-input marker.
    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind.describe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_lookup() {
        assert_eq!(keyword_from_ident("variable"), Some(Keyword::Variable));
        assert_eq!(keyword_from_ident("elif"), Some(Keyword::Elif));
        assert_eq!(keyword_from_ident("px"), None);
        assert_eq!(keyword_from_ident("VARIABLE"), None); // caller lowercases
    }

    #[test]
    fn test_base_units_closed_set() {
        assert!(BASE_UNITS.contains(&"px"));
        assert!(BASE_UNITS.contains(&"deg"));
        assert!(!BASE_UNITS.contains(&"%"));
    }

    #[test]
    fn test_describe() {
        assert_eq!(TokenKind::Comma.describe(), "','");
        assert_eq!(TokenKind::Eof.describe(), "end of input");
        assert_eq!(
            TokenKind::Reference("a.b".into()).describe(),
            "reference '{a.b}'"
        );
    }
}
