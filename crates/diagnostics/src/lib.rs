//! Diagnostics for the cmdtree dispatcher.
//!
//! Provides [`SyntaxError`], the structured error produced while attempting a
//! single node of the command tree, and [`Span`], the byte range type shared
//! by the dispatcher's context. Diagnostic codes are defined in the [`codes`]
//! module and carry an explanation and a message template generated from
//! `data/diagnostics.json` at build time.

#![warn(missing_docs)]

/// Diagnostic ID constants auto-generated from the diagnostics table.
pub mod codes;

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;

/// Number of characters of input shown before the cursor in error messages.
pub const CONTEXT_AMOUNT: usize = 10;

/// Byte span in the source input.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Span {
    /// Byte offset of the first character (0-based).
    pub start: usize,
    /// Byte offset one past the last character.
    pub end: usize,
}

impl Span {
    /// Create a span covering `[start, end)`.
    ///
    /// Panics if `end < start`.
    pub fn new(start: usize, end: usize) -> Self {
        assert!(end >= start, "Span end ({end}) < start ({start})");
        Self { start, end }
    }

    /// Create a zero-width span at the given position.
    pub fn empty(pos: usize) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    /// Smallest span covering both `self` and `other`.
    pub fn encompassing(self, other: Span) -> Self {
        Self {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Whether the span covers no bytes.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Length of the span in bytes.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Slice `input` with this span, clamped to the input length.
    pub fn get<'a>(&self, input: &'a str) -> &'a str {
        let end = self.end.min(input.len());
        let start = self.start.min(end);
        &input[start..end]
    }
}

/// A structured syntax error produced while parsing one branch of the tree.
///
/// Errors built by argument parsers usually carry the input and the cursor at
/// which they failed. The dispatcher positions any error that arrives without
/// one before recording it, so every error in a parse result has a cursor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntaxError {
    /// Diagnostic code (e.g., `"CMD1001"`).
    pub id: Cow<'static, str>,
    /// Human-readable message.
    pub message: String,
    /// The full input string the error refers to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,
    /// Byte offset in `input` where parsing failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<usize>,
    /// Machine-readable context for tooling.
    ///
    /// Uses `BTreeMap` for deterministic key ordering in serialized output.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<BTreeMap<String, String>>,
}

impl SyntaxError {
    /// Create an unpositioned error with an explicit message.
    pub fn new(id: impl Into<Cow<'static, str>>, message: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            message: message.into(),
            input: None,
            cursor: None,
            context: None,
        }
    }

    /// Create an error whose message is rendered from the code's template.
    ///
    /// Falls back to the code itself when no template is known.
    pub fn from_code(id: &'static str, ctx: BTreeMap<String, String>) -> Self {
        let message = match message_template(id) {
            Some(template) => render_template(template, &ctx),
            None => id.to_string(),
        };
        let context = if ctx.is_empty() { None } else { Some(ctx) };
        Self {
            id: Cow::Borrowed(id),
            message,
            input: None,
            cursor: None,
            context,
        }
    }

    /// Attach the input and failing cursor (builder pattern).
    pub fn at(mut self, input: &str, cursor: usize) -> Self {
        self.input = Some(input.to_string());
        self.cursor = Some(cursor.min(input.len()));
        self
    }

    /// Attach machine-readable context metadata (builder pattern).
    pub fn with_context(mut self, ctx: BTreeMap<String, String>) -> Self {
        self.context = Some(ctx);
        self
    }

    /// Whether the error carries an input and cursor.
    pub fn is_positioned(&self) -> bool {
        self.input.is_some() && self.cursor.is_some()
    }

    /// Span from the cursor to the end of the word it points at.
    pub fn span(&self) -> Option<Span> {
        let input = self.input.as_deref()?;
        let cursor = self.cursor?;
        let end = input[cursor..]
            .find(' ')
            .map_or(input.len(), |offset| cursor + offset);
        Some(Span::new(cursor, end))
    }

    /// Up to [`CONTEXT_AMOUNT`] characters before the cursor followed by a
    /// `<--[HERE]` marker, prefixed with `...` when truncated.
    pub fn snippet(&self) -> Option<String> {
        let input = self.input.as_deref()?;
        let cursor = self.cursor?;
        let mut start = cursor.saturating_sub(CONTEXT_AMOUNT);
        while start < cursor && !input.is_char_boundary(start) {
            start += 1;
        }
        let mut out = String::new();
        if start > 0 {
            out.push_str("...");
        }
        out.push_str(&input[start..cursor]);
        out.push_str("<--[HERE]");
        Some(out)
    }

    /// Returns the human-readable explanation for this error's code, if available.
    pub fn explain(&self) -> Option<&'static str> {
        explain(&self.id)
    }
}

impl std::fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.cursor, self.snippet()) {
            (Some(cursor), Some(snippet)) => {
                write!(f, "{} at position {}: {}", self.message, cursor, snippet)
            }
            _ => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for SyntaxError {}

/// Returns the human-readable explanation for a diagnostic code, if known.
///
/// Auto-generated from `data/diagnostics.json` at build time.
pub fn explain(id: &str) -> Option<&'static str> {
    include!(concat!(env!("OUT_DIR"), "/generated_explain.rs"))
}

/// Returns the message template for a diagnostic code, if known.
///
/// Templates reference context keys as `{key}` placeholders.
pub fn message_template(id: &str) -> Option<&'static str> {
    include!(concat!(env!("OUT_DIR"), "/generated_templates.rs"))
}

/// Substitute `{key}` placeholders in `template` with values from `ctx`.
///
/// Unknown placeholders are left untouched.
pub fn render_template(template: &str, ctx: &BTreeMap<String, String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) => {
                let key = after[..close].trim();
                match ctx.get(key) {
                    Some(value) => out.push_str(value),
                    None => {
                        out.push('{');
                        out.push_str(&after[..close]);
                        out.push('}');
                    }
                }
                rest = &after[close + 1..];
            }
            None => {
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── Span ────────────────────────────────────────────────────────────

    #[test]
    fn span_new_valid() {
        let s = Span::new(5, 10);
        assert_eq!(s.start, 5);
        assert_eq!(s.end, 10);
        assert_eq!(s.len(), 5);
    }

    #[test]
    fn span_empty() {
        let s = Span::empty(7);
        assert!(s.is_empty());
        assert_eq!(s.start, 7);
    }

    #[test]
    #[should_panic(expected = "Span end (3) < start (5)")]
    fn span_new_inverted_panics() {
        Span::new(5, 3);
    }

    #[test]
    fn span_encompassing_and_get() {
        let s = Span::new(5, 12).encompassing(Span::new(0, 4));
        assert_eq!(s, Span::new(0, 12));
        assert_eq!(Span::new(5, 12).get("give diamond 5"), "diamond");
        assert_eq!(Span::new(13, 40).get("give diamond 5"), "5");
    }

    // ── SyntaxError ─────────────────────────────────────────────────────

    #[test]
    fn from_code_renders_template() {
        let e = SyntaxError::from_code(
            codes::INTEGER_TOO_LOW,
            BTreeMap::from([("min".into(), "1".into()), ("found".into(), "0".into())]),
        );
        assert_eq!(e.id, "CMD1101");
        assert_eq!(e.message, "Integer must not be less than 1, found 0");
        assert_eq!(e.context.as_ref().unwrap().get("min").unwrap(), "1");
    }

    #[test]
    fn from_code_without_context_omits_context() {
        let e = SyntaxError::from_code(codes::DISPATCHER_EXPECTED_SEPARATOR, BTreeMap::new());
        assert!(e.context.is_none());
        assert!(e.message.starts_with("Expected whitespace"));
    }

    #[test]
    fn display_without_position_is_message() {
        let e = SyntaxError::new(codes::READER_EXPECTED_INT, "Expected integer");
        assert!(!e.is_positioned());
        assert_eq!(e.to_string(), "Expected integer");
    }

    #[test]
    fn display_with_position_shows_snippet() {
        let e = SyntaxError::new(codes::READER_EXPECTED_INT, "Expected integer")
            .at("give diamond five", 13);
        assert_eq!(
            e.to_string(),
            "Expected integer at position 13: ...e diamond <--[HERE]"
        );
    }

    #[test]
    fn snippet_short_input_has_no_ellipsis() {
        let e = SyntaxError::new("X", "m").at("tp x", 3);
        assert_eq!(e.snippet().unwrap(), "tp <--[HERE]");
    }

    #[test]
    fn snippet_respects_char_boundaries() {
        // 'é' is 2 bytes; a naive cursor - 10 would land inside it.
        let input = "aé234567890";
        let e = SyntaxError::new("X", "m").at(input, input.len());
        let snippet = e.snippet().unwrap();
        assert!(snippet.ends_with("<--[HERE]"));
    }

    #[test]
    fn span_covers_failing_word() {
        let e = SyntaxError::new("X", "m").at("give diamond five", 13);
        assert_eq!(e.span(), Some(Span::new(13, 17)));
        let e = SyntaxError::new("X", "m").at("give diamond", 4);
        assert_eq!(e.span(), Some(Span::new(4, 4)));
    }

    #[test]
    fn cursor_clamped_to_input() {
        let e = SyntaxError::new("X", "m").at("abc", 99);
        assert_eq!(e.cursor, Some(3));
    }

    // ── Templates ───────────────────────────────────────────────────────

    #[test]
    fn render_template_leaves_unknown_placeholders() {
        let ctx = BTreeMap::from([("a".to_string(), "1".to_string())]);
        assert_eq!(render_template("{a} and {b}", &ctx), "1 and {b}");
        assert_eq!(render_template("open {a", &ctx), "open {a");
    }

    // ── explain() exhaustiveness ────────────────────────────────────────

    #[test]
    fn all_codes_have_explanations_and_templates() {
        let all = [
            codes::READER_EXPECTED_INT,
            codes::READER_INVALID_INT,
            codes::READER_EXPECTED_FLOAT,
            codes::READER_INVALID_FLOAT,
            codes::READER_EXPECTED_BOOL,
            codes::READER_INVALID_BOOL,
            codes::READER_EXPECTED_START_OF_QUOTE,
            codes::READER_EXPECTED_END_OF_QUOTE,
            codes::READER_INVALID_ESCAPE,
            codes::READER_EXPECTED_SYMBOL,
            codes::INTEGER_TOO_LOW,
            codes::INTEGER_TOO_HIGH,
            codes::FLOAT_TOO_LOW,
            codes::FLOAT_TOO_HIGH,
            codes::LITERAL_INCORRECT,
            codes::INVALID_CHOICE,
            codes::EXPECTED_ARGUMENT,
            codes::DISPATCHER_PARSE_EXCEPTION,
            codes::DISPATCHER_EXPECTED_SEPARATOR,
            codes::DISPATCHER_UNKNOWN_COMMAND,
            codes::DISPATCHER_UNKNOWN_ARGUMENT,
            codes::DISPATCHER_INCOMPLETE_COMMAND,
            codes::DISPATCHER_REDIRECT_LIMIT,
        ];
        for code in &all {
            assert!(
                explain(code).is_some(),
                "diagnostic code {code} has no explain() entry"
            );
            assert!(
                message_template(code).is_some(),
                "diagnostic code {code} has no message template"
            );
        }
        assert!(explain("UNKNOWN_CODE").is_none());
    }

    // ── Serde ───────────────────────────────────────────────────────────

    #[test]
    fn syntax_error_serde_omits_absent_fields() {
        let e = SyntaxError::new(codes::READER_EXPECTED_INT, "Expected integer");
        let json = serde_json::to_string(&e).unwrap();
        assert!(!json.contains("cursor"), "None cursor should be omitted: {json}");
        assert!(!json.contains("context"), "None context should be omitted: {json}");
        let back: SyntaxError = serde_json::from_str(&json).unwrap();
        assert_eq!(back, e);
    }
}
