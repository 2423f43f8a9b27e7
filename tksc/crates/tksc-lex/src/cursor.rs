//! Character cursor for traversing source text.
//!
//! Maintains position state while iterating through a source string. It
//! handles UTF-8 correctly (token names may contain any non-ASCII code
//! point, emoji included) and tracks line/column for error reporting.

/// A cursor over source text.
///
/// # Example
///
/// ```
/// use tksc_lex::cursor::Cursor;
///
/// let mut cursor = Cursor::new("16px");
/// assert_eq!(cursor.current_char(), '1');
/// cursor.advance();
/// assert_eq!(cursor.current_char(), '6');
/// ```
pub struct Cursor<'a> {
    /// The source text being traversed.
    source: &'a str,

    /// Current byte position in the source.
    position: usize,

    /// Current line number (1-based).
    line: u32,

    /// Current column number (1-based, in characters).
    column: u32,
}

impl<'a> Cursor<'a> {
    /// Creates a new cursor at the start of `source`.
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            position: 0,
            line: 1,
            column: 1,
        }
    }

    /// Returns the character at the cursor, or `'\0'` at the end.
    #[inline]
    pub fn current_char(&self) -> char {
        self.char_at(self.position)
    }

    /// Returns the character starting at byte offset `pos`, or `'\0'`.
    #[inline]
    fn char_at(&self, pos: usize) -> char {
        if pos >= self.source.len() {
            return '\0';
        }

        // Fast path for ASCII (most common case)
        let b = self.source.as_bytes()[pos];
        if b < 128 {
            return b as char;
        }

        self.source[pos..].chars().next().unwrap_or('\0')
    }

    /// Returns the character `offset` characters ahead of the cursor.
    pub fn peek_char(&self, offset: usize) -> char {
        let mut chars = self.source[self.position.min(self.source.len())..].chars();
        for _ in 0..offset {
            if chars.next().is_none() {
                return '\0';
            }
        }
        chars.next().unwrap_or('\0')
    }

    /// Advances the cursor to the next character, updating line/column.
    #[inline]
    pub fn advance(&mut self) {
        if self.position >= self.source.len() {
            return;
        }

        // Fast path for ASCII
        let b = self.source.as_bytes()[self.position];
        if b < 128 {
            self.position += 1;
            if b == b'\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
            return;
        }

        if let Some(c) = self.source[self.position..].chars().next() {
            self.position += c.len_utf8();
            self.column += 1;
        }
    }

    /// Advances by `count` characters, stopping at the end.
    pub fn advance_n(&mut self, count: usize) {
        for _ in 0..count {
            if self.is_at_end() {
                break;
            }
            self.advance();
        }
    }

    /// True if the cursor has consumed the entire source.
    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.position >= self.source.len()
    }

    /// Consumes `expected` if it is the current character.
    pub fn match_char(&mut self, expected: char) -> bool {
        if self.current_char() == expected {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Current line number (1-based).
    #[inline]
    pub fn line(&self) -> u32 {
        self.line
    }

    /// Current column number (1-based).
    #[inline]
    pub fn column(&self) -> u32 {
        self.column
    }

    /// Current byte position.
    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Slice of the source from `start` to the current position.
    pub fn slice_from(&self, start: usize) -> &'a str {
        &self.source[start..self.position]
    }

    /// The full source text.
    pub fn source(&self) -> &'a str {
        self.source
    }

    /// Saves the cursor state so lookahead can be undone.
    pub fn snapshot(&self) -> CursorSnapshot {
        CursorSnapshot {
            position: self.position,
            line: self.line,
            column: self.column,
        }
    }

    /// Restores a previously saved state.
    pub fn restore(&mut self, snapshot: CursorSnapshot) {
        self.position = snapshot.position;
        self.line = snapshot.line;
        self.column = snapshot.column;
    }
}

/// A saved cursor state.
#[derive(Clone, Copy, Debug)]
pub struct CursorSnapshot {
    position: usize,
    line: u32,
    column: u32,
}
