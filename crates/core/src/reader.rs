//! Cursor over command input.
//!
//! [`StringReader`] borrows the input and tracks a byte cursor. It is `Copy`,
//! so every branch point in the dispatcher forks it by value and sibling
//! attempts never observe each other's progress.

use std::collections::BTreeMap;

use cmdtree_diagnostics::{SyntaxError, codes};

/// The character that separates one argument from the next.
pub const ARGUMENT_SEPARATOR: char = ' ';

const SYNTAX_ESCAPE: char = '\\';
const SYNTAX_DOUBLE_QUOTE: char = '"';
const SYNTAX_SINGLE_QUOTE: char = '\'';

/// Shorthand for building a `BTreeMap<String, String>` context from key-value pairs.
macro_rules! ctx {
    () => {
        std::collections::BTreeMap::new()
    };
    ($($k:expr => $v:expr),+ $(,)?) => {
        std::collections::BTreeMap::from([$(($k.into(), $v.into())),+])
    };
}
pub(crate) use ctx;

/// A cursor over an immutable input string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StringReader<'a> {
    input: &'a str,
    cursor: usize,
}

impl<'a> StringReader<'a> {
    /// Create a reader positioned at the start of `input`.
    pub fn new(input: &'a str) -> Self {
        Self { input, cursor: 0 }
    }

    /// Create a reader positioned at `cursor` (clamped to the input length).
    pub fn at(input: &'a str, cursor: usize) -> Self {
        Self {
            input,
            cursor: cursor.min(input.len()),
        }
    }

    /// The full input string.
    pub fn input(&self) -> &'a str {
        self.input
    }

    /// Current byte offset.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Move the cursor. Offsets past the end are clamped.
    pub fn set_cursor(&mut self, cursor: usize) {
        self.cursor = cursor.min(self.input.len());
    }

    /// Total input length in bytes.
    pub fn total_len(&self) -> usize {
        self.input.len()
    }

    /// Bytes left after the cursor.
    pub fn remaining_len(&self) -> usize {
        self.input.len() - self.cursor
    }

    /// The part of the input already consumed.
    pub fn read(&self) -> &'a str {
        &self.input[..self.cursor]
    }

    /// The part of the input not yet consumed.
    pub fn remaining(&self) -> &'a str {
        &self.input[self.cursor..]
    }

    /// Whether at least `n` more bytes can be read.
    pub fn can_read_n(&self, n: usize) -> bool {
        self.cursor + n <= self.input.len()
    }

    /// Whether any input remains.
    pub fn can_read(&self) -> bool {
        self.can_read_n(1)
    }

    /// The character at the cursor.
    pub fn peek(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    /// The character `offset` characters after the cursor.
    pub fn peek_at(&self, offset: usize) -> Option<char> {
        self.remaining().chars().nth(offset)
    }

    /// Consume and return the character at the cursor.
    pub fn next_char(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.cursor += c.len_utf8();
        Some(c)
    }

    /// Advance past the character at the cursor.
    pub fn skip(&mut self) {
        self.next_char();
    }

    /// Advance past any whitespace.
    pub fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.skip();
        }
    }

    /// The next separator-delimited token without consuming it.
    pub fn peek_word(&self) -> &'a str {
        let rest = self.remaining();
        let end = rest.find(ARGUMENT_SEPARATOR).unwrap_or(rest.len());
        &rest[..end]
    }

    /// Build a syntax error positioned at the current cursor.
    pub fn error(&self, id: &'static str, context: BTreeMap<String, String>) -> SyntaxError {
        SyntaxError::from_code(id, context).at(self.input, self.cursor)
    }

    /// Build a syntax error positioned at `cursor`.
    pub fn error_at(
        &self,
        cursor: usize,
        id: &'static str,
        context: BTreeMap<String, String>,
    ) -> SyntaxError {
        SyntaxError::from_code(id, context).at(self.input, cursor)
    }

    /// Characters that may appear in a number.
    pub fn is_allowed_number(c: char) -> bool {
        c.is_ascii_digit() || c == '.' || c == '-'
    }

    /// Characters that open a quoted string.
    pub fn is_quoted_string_start(c: char) -> bool {
        c == SYNTAX_DOUBLE_QUOTE || c == SYNTAX_SINGLE_QUOTE
    }

    /// Characters allowed in an unquoted string.
    pub fn is_allowed_in_unquoted_string(c: char) -> bool {
        c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.' || c == '+'
    }

    fn read_number_text(&mut self) -> (usize, &'a str) {
        let start = self.cursor;
        while self.peek().is_some_and(Self::is_allowed_number) {
            self.skip();
        }
        (start, &self.input[start..self.cursor])
    }

    /// Read a signed integer.
    pub fn read_int(&mut self) -> Result<i64, SyntaxError> {
        let (start, number) = self.read_number_text();
        if number.is_empty() {
            return Err(self.error(codes::READER_EXPECTED_INT, ctx!()));
        }
        number.parse::<i64>().map_err(|_| {
            self.cursor = start;
            self.error(codes::READER_INVALID_INT, ctx!("value" => number))
        })
    }

    /// Read a decimal number.
    pub fn read_float(&mut self) -> Result<f64, SyntaxError> {
        let (start, number) = self.read_number_text();
        if number.is_empty() {
            return Err(self.error(codes::READER_EXPECTED_FLOAT, ctx!()));
        }
        number.parse::<f64>().map_err(|_| {
            self.cursor = start;
            self.error(codes::READER_INVALID_FLOAT, ctx!("value" => number))
        })
    }

    /// Read a run of [unquoted-string characters](Self::is_allowed_in_unquoted_string).
    pub fn read_unquoted_string(&mut self) -> &'a str {
        let start = self.cursor;
        while self.peek().is_some_and(Self::is_allowed_in_unquoted_string) {
            self.skip();
        }
        &self.input[start..self.cursor]
    }

    /// Read a string that must start with a quote character.
    pub fn read_quoted_string(&mut self) -> Result<String, SyntaxError> {
        let Some(next) = self.peek() else {
            return Ok(String::new());
        };
        if !Self::is_quoted_string_start(next) {
            return Err(self.error(codes::READER_EXPECTED_START_OF_QUOTE, ctx!()));
        }
        self.skip();
        self.read_string_until(next)
    }

    /// Read characters up to an unescaped `terminator`, consuming it.
    pub fn read_string_until(&mut self, terminator: char) -> Result<String, SyntaxError> {
        let mut result = String::new();
        let mut escaped = false;
        while let Some(c) = self.next_char() {
            if escaped {
                if c == terminator || c == SYNTAX_ESCAPE {
                    result.push(c);
                    escaped = false;
                } else {
                    self.cursor -= c.len_utf8();
                    return Err(self.error(
                        codes::READER_INVALID_ESCAPE,
                        ctx!("character" => c.to_string()),
                    ));
                }
            } else if c == SYNTAX_ESCAPE {
                escaped = true;
            } else if c == terminator {
                return Ok(result);
            } else {
                result.push(c);
            }
        }
        Err(self.error(codes::READER_EXPECTED_END_OF_QUOTE, ctx!()))
    }

    /// Read either a quoted or an unquoted string.
    pub fn read_string(&mut self) -> Result<String, SyntaxError> {
        let Some(next) = self.peek() else {
            return Ok(String::new());
        };
        if Self::is_quoted_string_start(next) {
            self.skip();
            return self.read_string_until(next);
        }
        Ok(self.read_unquoted_string().to_string())
    }

    /// Read `true` or `false`.
    pub fn read_bool(&mut self) -> Result<bool, SyntaxError> {
        let start = self.cursor;
        let value = self.read_string()?;
        if value.is_empty() {
            return Err(self.error(codes::READER_EXPECTED_BOOL, ctx!()));
        }
        match value.as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            _ => {
                self.cursor = start;
                Err(self.error(codes::READER_INVALID_BOOL, ctx!("value" => value)))
            }
        }
    }

    /// Consume `c` or fail.
    pub fn expect(&mut self, c: char) -> Result<(), SyntaxError> {
        if self.peek() != Some(c) {
            return Err(self.error(
                codes::READER_EXPECTED_SYMBOL,
                ctx!("symbol" => c.to_string()),
            ));
        }
        self.skip();
        Ok(())
    }
}
