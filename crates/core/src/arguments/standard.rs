//! Standard argument parsers: strings, numbers, booleans and fixed choices.

use cmdtree_diagnostics::{SyntaxError, codes};

use super::{ArgValue, ArgumentParser};
use crate::context::CommandContextBuilder;
use crate::reader::{StringReader, ctx};

/// How much input a [`StringParser`] consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringKind {
    /// A single unquoted word.
    Word,
    /// A word, or a single- or double-quoted phrase with `\` escapes.
    Quotable,
    /// Everything up to the end of input.
    Greedy,
}

/// Parses a string argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StringParser {
    kind: StringKind,
}

impl StringParser {
    /// A single unquoted word.
    pub fn word() -> Self {
        Self {
            kind: StringKind::Word,
        }
    }

    /// A word or a quoted phrase.
    pub fn string() -> Self {
        Self {
            kind: StringKind::Quotable,
        }
    }

    /// The rest of the input.
    pub fn greedy() -> Self {
        Self {
            kind: StringKind::Greedy,
        }
    }

    /// The configured kind.
    pub fn kind(&self) -> StringKind {
        self.kind
    }
}

impl<S> ArgumentParser<S> for StringParser {
    fn parse(
        &self,
        reader: &mut StringReader<'_>,
        _context: &CommandContextBuilder<'_, S>,
    ) -> Result<ArgValue, SyntaxError> {
        let empty = |reader: &StringReader<'_>, kind: &str| {
            reader.error(codes::EXPECTED_ARGUMENT, ctx!("argument" => kind))
        };
        match self.kind {
            StringKind::Word => {
                let word = reader.read_unquoted_string();
                if word.is_empty() {
                    return Err(empty(reader, "word"));
                }
                Ok(ArgValue::String(word.to_string()))
            }
            StringKind::Quotable => {
                let quoted = reader.peek().is_some_and(StringReader::is_quoted_string_start);
                let value = reader.read_string()?;
                if value.is_empty() && !quoted {
                    return Err(empty(reader, "string"));
                }
                Ok(ArgValue::String(value))
            }
            StringKind::Greedy => {
                let text = reader.remaining();
                if text.is_empty() {
                    return Err(empty(reader, "text"));
                }
                reader.set_cursor(reader.total_len());
                Ok(ArgValue::String(text.to_string()))
            }
        }
    }

    fn examples(&self) -> Vec<String> {
        let examples: &[&str] = match self.kind {
            StringKind::Word => &["word", "words_with_underscores"],
            StringKind::Quotable => &["\"quoted phrase\"", "word", "\"\""],
            StringKind::Greedy => &["word", "words with spaces", "\"and symbols\""],
        };
        examples.iter().map(ToString::to_string).collect()
    }
}

/// Parses a signed integer within optional bounds (inclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntegerParser {
    min: i64,
    max: i64,
}

impl Default for IntegerParser {
    fn default() -> Self {
        Self::new()
    }
}

impl IntegerParser {
    /// Any integer.
    pub fn new() -> Self {
        Self {
            min: i64::MIN,
            max: i64::MAX,
        }
    }

    /// Integers `>= min`.
    pub fn at_least(min: i64) -> Self {
        Self { min, max: i64::MAX }
    }

    /// Integers in `[min, max]`.
    pub fn between(min: i64, max: i64) -> Self {
        Self { min, max }
    }
}

impl<S> ArgumentParser<S> for IntegerParser {
    fn parse(
        &self,
        reader: &mut StringReader<'_>,
        _context: &CommandContextBuilder<'_, S>,
    ) -> Result<ArgValue, SyntaxError> {
        let start = reader.cursor();
        let value = reader.read_int()?;
        if value < self.min {
            reader.set_cursor(start);
            return Err(reader.error(
                codes::INTEGER_TOO_LOW,
                ctx!("min" => self.min.to_string(), "found" => value.to_string()),
            ));
        }
        if value > self.max {
            reader.set_cursor(start);
            return Err(reader.error(
                codes::INTEGER_TOO_HIGH,
                ctx!("max" => self.max.to_string(), "found" => value.to_string()),
            ));
        }
        Ok(ArgValue::Integer(value))
    }

    fn examples(&self) -> Vec<String> {
        vec!["0".into(), "123".into(), "-123".into()]
    }
}

/// Parses a decimal number within optional bounds (inclusive).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloatParser {
    min: f64,
    max: f64,
}

impl Default for FloatParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FloatParser {
    /// Any finite or infinite number.
    pub fn new() -> Self {
        Self {
            min: f64::MIN,
            max: f64::MAX,
        }
    }

    /// Numbers in `[min, max]`.
    pub fn between(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

impl<S> ArgumentParser<S> for FloatParser {
    fn parse(
        &self,
        reader: &mut StringReader<'_>,
        _context: &CommandContextBuilder<'_, S>,
    ) -> Result<ArgValue, SyntaxError> {
        let start = reader.cursor();
        let value = reader.read_float()?;
        if value < self.min {
            reader.set_cursor(start);
            return Err(reader.error(
                codes::FLOAT_TOO_LOW,
                ctx!("min" => self.min.to_string(), "found" => value.to_string()),
            ));
        }
        if value > self.max {
            reader.set_cursor(start);
            return Err(reader.error(
                codes::FLOAT_TOO_HIGH,
                ctx!("max" => self.max.to_string(), "found" => value.to_string()),
            ));
        }
        Ok(ArgValue::Float(value))
    }

    fn examples(&self) -> Vec<String> {
        ["0", "1.2", ".5", "-1", "-.5", "-1234.56"]
            .iter()
            .map(ToString::to_string)
            .collect()
    }
}

/// Parses `true` or `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BoolParser;

impl<S> ArgumentParser<S> for BoolParser {
    fn parse(
        &self,
        reader: &mut StringReader<'_>,
        _context: &CommandContextBuilder<'_, S>,
    ) -> Result<ArgValue, SyntaxError> {
        reader.read_bool().map(ArgValue::Bool)
    }

    fn suggestions(&self, _context: &CommandContextBuilder<'_, S>, _remaining: &str) -> Vec<String> {
        vec!["true".into(), "false".into()]
    }

    fn examples(&self) -> Vec<String> {
        vec!["true".into(), "false".into()]
    }
}

/// Parses one word from a fixed set of choices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceParser {
    choices: Vec<String>,
}

impl ChoiceParser {
    /// Accept exactly the given words.
    pub fn new<I, T>(choices: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            choices: choices.into_iter().map(Into::into).collect(),
        }
    }

    /// The accepted words in declaration order.
    pub fn choices(&self) -> &[String] {
        &self.choices
    }
}

impl<S> ArgumentParser<S> for ChoiceParser {
    fn parse(
        &self,
        reader: &mut StringReader<'_>,
        _context: &CommandContextBuilder<'_, S>,
    ) -> Result<ArgValue, SyntaxError> {
        let start = reader.cursor();
        let word = reader.read_unquoted_string();
        if self.choices.iter().any(|c| c == word) {
            return Ok(ArgValue::String(word.to_string()));
        }
        reader.set_cursor(start);
        Err(reader.error(
            codes::INVALID_CHOICE,
            ctx!("value" => word, "choices" => self.choices.join(", ")),
        ))
    }

    fn suggestions(&self, _context: &CommandContextBuilder<'_, S>, _remaining: &str) -> Vec<String> {
        self.choices.clone()
    }

    fn examples(&self) -> Vec<String> {
        self.choices.iter().take(2).cloned().collect()
    }
}
