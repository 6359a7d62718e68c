//! Argument parser and completer capabilities.
//!
//! An argument node owns an [`ArgumentParser`] that turns reader text into an
//! [`ArgValue`], and optionally a [`ValueCompleter`] that proposes candidate
//! text for live completion. Standard parsers live in [`standard`].

pub mod standard;

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use cmdtree_diagnostics::{Span, SyntaxError};

use crate::context::CommandContextBuilder;
use crate::reader::StringReader;

/// A typed value bound to an argument name.
#[derive(Clone)]
pub enum ArgValue {
    /// `true` / `false`.
    Bool(bool),
    /// Signed integer.
    Integer(i64),
    /// Decimal number.
    Float(f64),
    /// Any string form (word, quoted, greedy, choice).
    String(String),
    /// A host-defined value produced by an external parser.
    Other(Arc<dyn Any + Send + Sync>),
}

impl ArgValue {
    /// Wrap a host-defined value.
    pub fn other<T: Any + Send + Sync>(value: T) -> Self {
        Self::Other(Arc::new(value))
    }

    /// Name of the variant, used in type-mismatch errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::Other(_) => "value",
        }
    }
}

impl fmt::Debug for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => f.debug_tuple("Bool").field(v).finish(),
            Self::Integer(v) => f.debug_tuple("Integer").field(v).finish(),
            Self::Float(v) => f.debug_tuple("Float").field(v).finish(),
            Self::String(v) => f.debug_tuple("String").field(v).finish(),
            Self::Other(_) => f.write_str("Other(..)"),
        }
    }
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Integer(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::String(v) => f.write_str(v),
            Self::Other(_) => f.write_str("<value>"),
        }
    }
}

impl PartialEq for ArgValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Other(a), Self::Other(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// Conversion from a bound [`ArgValue`] to a concrete Rust type.
pub trait FromArgValue: Sized {
    /// Type name reported when the conversion fails.
    const EXPECTED: &'static str;

    /// Convert, or `None` when the value has a different shape.
    fn from_arg(value: &ArgValue) -> Option<Self>;
}

impl FromArgValue for bool {
    const EXPECTED: &'static str = "bool";

    fn from_arg(value: &ArgValue) -> Option<Self> {
        match value {
            ArgValue::Bool(v) => Some(*v),
            _ => None,
        }
    }
}

impl FromArgValue for i64 {
    const EXPECTED: &'static str = "integer";

    fn from_arg(value: &ArgValue) -> Option<Self> {
        match value {
            ArgValue::Integer(v) => Some(*v),
            _ => None,
        }
    }
}

impl FromArgValue for i32 {
    const EXPECTED: &'static str = "32-bit integer";

    fn from_arg(value: &ArgValue) -> Option<Self> {
        match value {
            ArgValue::Integer(v) => i32::try_from(*v).ok(),
            _ => None,
        }
    }
}

impl FromArgValue for f64 {
    const EXPECTED: &'static str = "float";

    fn from_arg(value: &ArgValue) -> Option<Self> {
        match value {
            ArgValue::Float(v) => Some(*v),
            #[allow(clippy::cast_precision_loss)]
            ArgValue::Integer(v) => Some(*v as f64),
            _ => None,
        }
    }
}

impl FromArgValue for String {
    const EXPECTED: &'static str = "string";

    fn from_arg(value: &ArgValue) -> Option<Self> {
        match value {
            ArgValue::String(v) => Some(v.clone()),
            _ => None,
        }
    }
}

/// A value bound to an argument together with the input range it consumed.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedArgument {
    /// Consumed byte range.
    pub range: Span,
    /// Parsed value.
    pub value: ArgValue,
}

impl ParsedArgument {
    /// Create a parsed argument spanning `[start, end)`.
    pub fn new(start: usize, end: usize, value: ArgValue) -> Self {
        Self {
            range: Span::new(start, end),
            value,
        }
    }
}

/// Turns reader text into a typed value.
///
/// Implementations consume exactly the characters that make up the value and
/// leave the cursor after them. On failure they return a [`SyntaxError`],
/// ideally positioned with [`StringReader::error`]; unpositioned errors are
/// positioned at the reader's cursor by the dispatcher. A panic is caught by
/// the dispatcher and reported as a syntax error on that branch.
pub trait ArgumentParser<S>: Send + Sync {
    /// Parse a value at the reader's cursor.
    fn parse(
        &self,
        reader: &mut StringReader<'_>,
        context: &CommandContextBuilder<'_, S>,
    ) -> Result<ArgValue, SyntaxError>;

    /// Completion candidates used when the argument node has no completer.
    fn suggestions(&self, context: &CommandContextBuilder<'_, S>, remaining: &str) -> Vec<String> {
        let _ = (context, remaining);
        Vec::new()
    }

    /// Example inputs, used in help output.
    fn examples(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Proposes completion candidates for an argument.
///
/// Candidates are filtered against the typed remainder by the dispatcher, so
/// a completer may return its full candidate list.
pub trait ValueCompleter<S>: Send + Sync {
    /// Candidate strings for the argument given the context so far.
    fn complete(&self, context: &CommandContextBuilder<'_, S>, remaining: &str) -> Vec<String>;
}

impl<S, F> ValueCompleter<S> for F
where
    F: Fn(&CommandContextBuilder<'_, S>, &str) -> Vec<String> + Send + Sync,
{
    fn complete(&self, context: &CommandContextBuilder<'_, S>, remaining: &str) -> Vec<String> {
        self(context, remaining)
    }
}
