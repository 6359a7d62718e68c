//! Completion suggestions.

use std::collections::HashSet;
use std::sync::Arc;

use cmdtree_diagnostics::Span;
use serde::Serialize;

use super::{Dispatcher, ParseResults};
use crate::tree::NodeKind;

/// Completion candidates and the input range they replace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestions {
    /// Byte range of the input the candidates replace.
    pub range: Span,
    /// Candidate texts in node insertion order, without duplicates.
    pub list: Vec<String>,
}

impl Suggestions {
    /// Whether there are no candidates.
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Apply candidate `index` to `input`, returning the completed text.
    pub fn apply(&self, input: &str, index: usize) -> Option<String> {
        let candidate = self.list.get(index)?;
        let start = self.range.start.min(input.len());
        let end = self.range.end.min(input.len());
        Some(format!("{}{candidate}{}", &input[..start], &input[end..]))
    }
}

impl<S> Dispatcher<S> {
    /// Completion candidates for `input` on behalf of `source`.
    pub fn suggest(&self, input: &str, source: Arc<S>) -> Suggestions {
        let parse = self.parse(input, source);
        self.completion_suggestions(&parse, input.len())
    }

    /// Completion candidates for a parse result at byte `cursor`.
    ///
    /// The node before the cursor is located in the innermost redirect
    /// context; every child of its parent that the principal may use is
    /// asked for candidates. Literals propose their own text; arguments call
    /// their completer, or their parser's default suggestions. Candidates are
    /// kept when they start with the typed remainder, ignoring ASCII case.
    pub fn completion_suggestions(&self, parse: &ParseResults<'_, S>, cursor: usize) -> Suggestions {
        let input = parse.reader.input();
        let cursor = cursor.min(input.len());
        let (found, context) = parse.context.find_suggestion_context(cursor);
        let start = found.start.min(cursor);
        let remaining = input.get(start..cursor).unwrap_or_default();
        let remaining_lower = remaining.to_lowercase();

        let mut seen = HashSet::new();
        let mut list = Vec::new();
        let Some(parent) = self.node(found.parent) else {
            return Suggestions {
                range: Span::new(start, cursor),
                list,
            };
        };
        for &child in &parent.children {
            let node = self.get(child);
            if !node.can_use(context.source()) {
                continue;
            }
            let candidates = match &node.kind {
                NodeKind::Root => Vec::new(),
                NodeKind::Literal { literal } => vec![literal.clone()],
                NodeKind::Argument {
                    parser, completer, ..
                } => match completer {
                    Some(completer) => completer.complete(context, remaining),
                    None => parser.suggestions(context, remaining),
                },
            };
            for candidate in candidates {
                if candidate.to_lowercase().starts_with(&remaining_lower)
                    && seen.insert(candidate.clone())
                {
                    list.push(candidate);
                }
            }
        }
        if let Some(limit) = self.config.suggestion_limit {
            list.truncate(limit);
        }
        Suggestions {
            range: Span::new(start, cursor),
            list,
        }
    }
}
