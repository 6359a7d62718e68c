//! Pretty error rendering using ariadne.
//!
//! Syntax errors carry the input and a cursor, so they are rendered as
//! source-annotated reports pointing into the command line. Other command
//! errors have no position and print as a single line.

use std::io::{self, IsTerminal};

use ariadne::{Color, Config, Fmt, IndexType, Label, Report, ReportKind, Source};
use cmdtree_core::CommandError;
use cmdtree_diagnostics::SyntaxError;
use serde_json::json;

const SOURCE_NAME: &str = "<input>";

// ── Output format ───────────────────────────────────────────────────────

/// Output format for results and errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Format {
    /// Coloured, source-annotated output (ariadne).
    Pretty,
    /// Machine-readable JSON.
    Json,
}

impl Format {
    /// Use the explicit choice, else pretty for terminals and JSON for pipes.
    pub(crate) fn resolve_or_detect(explicit: Option<&str>) -> Self {
        match explicit {
            Some("json") => Format::Json,
            Some("pretty") => Format::Pretty,
            _ => {
                if io::stdout().is_terminal() {
                    Format::Pretty
                } else {
                    Format::Json
                }
            }
        }
    }
}

// ── Pretty rendering ────────────────────────────────────────────────────

/// Render a syntax error against `input` to stderr.
pub(crate) fn render_syntax_error_pretty(input: &str, error: &SyntaxError) {
    let Some(cursor) = error.cursor else {
        eprintln!("error[{}]: {}", error.id, error.message);
        return;
    };
    let span = error
        .span()
        .map_or(cursor..cursor, |span| span.start..span.end);
    // ariadne needs a non-empty label to draw an arrow at the end of input.
    let start = span.start.min(input.len());
    let end = span.end.min(input.len()).max(start);
    let (start, end) = if start == end && end < input.len() {
        (start, end + 1)
    } else {
        (start, end)
    };

    let mut builder = Report::build(ReportKind::Error, (SOURCE_NAME, start..end))
        .with_code(error.id.as_ref())
        .with_message(&error.message)
        .with_config(
            Config::default()
                .with_compact(false)
                .with_index_type(IndexType::Byte),
        )
        .with_label(
            Label::new((SOURCE_NAME, start..end))
                .with_message(label_message(error))
                .with_color(Color::Red),
        );
    if let Some(explanation) = error.explain() {
        builder = builder.with_help(explanation);
    }
    let mut cache = (SOURCE_NAME, Source::from(input));
    builder.finish().eprint(&mut cache).ok();
}

/// Compact label from the error context, or the message when there is none.
fn label_message(error: &SyntaxError) -> String {
    if let Some(ctx) = &error.context
        && !ctx.is_empty()
    {
        ctx.iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(", ")
    } else {
        error.message.clone()
    }
}

/// Render any command error to stderr.
pub(crate) fn render_command_error_pretty(input: &str, error: &CommandError) {
    match error.as_syntax() {
        Some(syntax) => render_syntax_error_pretty(input, syntax),
        None => {
            let id = error.id().unwrap_or("error");
            eprintln!("{}: {error}", id.fg(Color::Red));
        }
    }
}

// ── JSON rendering ──────────────────────────────────────────────────────

/// JSON envelope for a failed command.
pub(crate) fn command_error_json(input: &str, error: &CommandError) -> serde_json::Value {
    let mut out = json!({
        "success": false,
        "input": input,
        "message": error.to_string(),
    });
    if let Some(id) = error.id() {
        out["error"] = json!(id);
    }
    if let Some(syntax) = error.as_syntax() {
        out["cursor"] = json!(syntax.cursor);
        if let Some(context) = &syntax.context {
            out["context"] = json!(context);
        }
    }
    out
}

// ── Unified entry point ─────────────────────────────────────────────────

/// Render a command error in the given format.
///
/// - `Pretty` → report to stderr.
/// - `Json`   → error envelope to stdout.
pub(crate) fn render_command_error(input: &str, error: &CommandError, format: Format) {
    match format {
        Format::Pretty => render_command_error_pretty(input, error),
        Format::Json => println!("{}", command_error_json(input, error)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cmdtree_diagnostics::codes;

    #[test]
    fn json_envelope_carries_code_and_cursor() {
        let error: CommandError = SyntaxError::new(codes::READER_EXPECTED_INT, "Expected integer")
            .at("give diamond x", 13)
            .into();
        let out = command_error_json("give diamond x", &error);
        assert_eq!(out["success"], false);
        assert_eq!(out["error"], codes::READER_EXPECTED_INT);
        assert_eq!(out["cursor"], 13);
    }

    #[test]
    fn json_envelope_without_position() {
        let out = command_error_json("x", &CommandError::failed("nope"));
        assert_eq!(out["message"], "nope");
        assert!(out.get("cursor").is_none());
        assert!(out.get("error").is_none());
    }
}
