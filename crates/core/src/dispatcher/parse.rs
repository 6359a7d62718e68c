//! The backtracking parse.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use cmdtree_diagnostics::{Span, SyntaxError, codes};
use tracing::{trace, warn};

use super::Dispatcher;
use crate::arguments::ParsedArgument;
use crate::context::CommandContextBuilder;
use crate::reader::{ARGUMENT_SEPARATOR, StringReader, ctx};
use crate::tree::{NodeId, NodeKind};

/// Outcome of parsing an input against the tree.
///
/// When the reader has no input left the parse succeeded and the context can
/// be executed. Otherwise the parse got stuck and `errors` holds the syntax
/// error of every child attempted at the point where it stopped.
pub struct ParseResults<'a, S> {
    pub(crate) context: CommandContextBuilder<'a, S>,
    pub(crate) reader: StringReader<'a>,
    pub(crate) errors: Vec<(NodeId, SyntaxError)>,
}

impl<S> Clone for ParseResults<'_, S> {
    fn clone(&self) -> Self {
        Self {
            context: self.context.clone(),
            reader: self.reader,
            errors: self.errors.clone(),
        }
    }
}

impl<S> std::fmt::Debug for ParseResults<'_, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParseResults")
            .field("context", &self.context)
            .field("reader", &self.reader)
            .field("errors", &self.errors)
            .finish()
    }
}

impl<'a, S> ParseResults<'a, S> {
    /// The context of the winning branch.
    pub fn context(&self) -> &CommandContextBuilder<'a, S> {
        &self.context
    }

    /// The reader of the winning branch.
    pub fn reader(&self) -> &StringReader<'a> {
        &self.reader
    }

    /// Errors keyed by the child that produced them.
    pub fn errors(&self) -> &[(NodeId, SyntaxError)] {
        &self.errors
    }

    /// Whether the whole input was consumed.
    pub fn is_complete(&self) -> bool {
        !self.reader.can_read()
    }

    /// The error that got farthest into the input; first recorded wins ties.
    pub fn best_error(&self) -> Option<&SyntaxError> {
        self.errors
            .iter()
            .map(|(_, e)| e)
            .enumerate()
            .max_by_key(|(i, e)| (e.cursor.unwrap_or(0), std::cmp::Reverse(*i)))
            .map(|(_, e)| e)
    }
}

impl<S> Dispatcher<S> {
    /// Parse `input` on behalf of `source`.
    ///
    /// Never fails: a parse that cannot consume the whole input is returned
    /// with its errors so callers can report or complete it.
    pub fn parse<'a>(&self, input: &'a str, source: Arc<S>) -> ParseResults<'a, S> {
        self.parse_reader(StringReader::new(input), source)
    }

    /// Parse from the reader's current cursor.
    pub fn parse_reader<'a>(&self, reader: StringReader<'a>, source: Arc<S>) -> ParseResults<'a, S> {
        let context = CommandContextBuilder::new(source, reader.input(), NodeId::ROOT, reader.cursor());
        self.parse_nodes(NodeId::ROOT, reader, &context)
    }

    /// Children of `node` worth attempting at the reader's position, in
    /// insertion order: the literal equal to the next word, and every argument.
    fn relevant_nodes(&self, node: NodeId, reader: &StringReader<'_>) -> Vec<NodeId> {
        let word = reader.peek_word();
        self.get(node)
            .children
            .iter()
            .copied()
            .filter(|&child| match &self.get(child).kind {
                NodeKind::Literal { literal } => literal == word,
                NodeKind::Argument { .. } => true,
                NodeKind::Root => false,
            })
            .collect()
    }

    fn parse_nodes<'a>(
        &self,
        node: NodeId,
        original: StringReader<'a>,
        context_so_far: &CommandContextBuilder<'a, S>,
    ) -> ParseResults<'a, S> {
        let mut errors: Vec<(NodeId, SyntaxError)> = Vec::new();
        let mut potentials: Vec<ParseResults<'a, S>> = Vec::new();

        for child in self.relevant_nodes(node, &original) {
            let child_node = self.get(child);
            if !child_node.can_use(context_so_far.source()) {
                trace!(node = child_node.name(), "requirement rejected");
                continue;
            }
            let mut context = context_so_far.clone();
            let mut reader = original;
            if let Err(error) = self.parse_child(child, &mut reader, &mut context) {
                trace!(node = child_node.name(), code = %error.id, cursor = ?error.cursor, "branch failed");
                errors.push((child, error));
                continue;
            }
            trace!(node = child_node.name(), cursor = reader.cursor(), "branch matched");

            context.with_executor(child_node.executor.clone());
            if let Some(target) = child_node.redirect
                && reader.can_read()
            {
                reader.skip();
                let depth = context.redirect_depth() + 1;
                if depth > self.config.max_redirect_depth {
                    warn!(
                        node = child_node.name(),
                        limit = self.config.max_redirect_depth,
                        "redirect limit exceeded"
                    );
                    let error = reader.error(
                        codes::DISPATCHER_REDIRECT_LIMIT,
                        ctx!("limit" => self.config.max_redirect_depth.to_string()),
                    );
                    errors.push((child, error));
                    continue;
                }
                let child_context = CommandContextBuilder::new(
                    Arc::clone(context.source_arc()),
                    reader.input(),
                    target,
                    reader.cursor(),
                )
                .with_redirect_depth(depth);
                let parse = self.parse_nodes(target, reader, &child_context);
                context.with_child(parse.context);
                return ParseResults {
                    context,
                    reader: parse.reader,
                    errors: parse.errors,
                };
            }

            if reader.can_read_n(2) {
                reader.skip();
                potentials.push(self.parse_nodes(child, reader, &context));
            } else {
                potentials.push(ParseResults {
                    context,
                    reader,
                    errors: Vec::new(),
                });
            }
        }

        if potentials.len() > 1 {
            // Fully consumed first, then error-free, then encounter order.
            let (winner, _) = potentials
                .iter()
                .enumerate()
                .map(|(i, p)| (i, (p.reader.can_read(), !p.errors.is_empty(), i)))
                .min_by_key(|(_, key)| *key)
                .unwrap_or((0, (false, false, 0)));
            return potentials.swap_remove(winner);
        }
        match potentials.pop() {
            Some(single) => single,
            None => ParseResults {
                context: context_so_far.clone(),
                reader: original,
                errors,
            },
        }
    }

    /// Match one child at the reader, binding it into `context`.
    fn parse_child<'a>(
        &self,
        child: NodeId,
        reader: &mut StringReader<'a>,
        context: &mut CommandContextBuilder<'a, S>,
    ) -> Result<(), SyntaxError> {
        let node = self.get(child);
        let start = reader.cursor();
        match &node.kind {
            NodeKind::Root => return Ok(()),
            NodeKind::Literal { literal } => {
                let end = start + literal.len();
                let matched = reader.remaining().starts_with(literal.as_str())
                    && (end == reader.total_len() || reader.input()[end..].starts_with(ARGUMENT_SEPARATOR));
                if !matched {
                    return Err(reader.error(
                        codes::LITERAL_INCORRECT,
                        ctx!("expected" => literal.as_str()),
                    ));
                }
                reader.set_cursor(end);
                context.with_node(child, node, Span::new(start, end));
            }
            NodeKind::Argument { name, parser, .. } => {
                let parsed = {
                    let context: &CommandContextBuilder<'a, S> = context;
                    panic::catch_unwind(AssertUnwindSafe(|| parser.parse(reader, context)))
                };
                let value = match parsed {
                    Ok(Ok(value)) => value,
                    Ok(Err(error)) if error.is_positioned() => return Err(error),
                    Ok(Err(error)) => return Err(error.at(reader.input(), reader.cursor())),
                    Err(payload) => {
                        reader.set_cursor(start);
                        return Err(reader.error(
                            codes::DISPATCHER_PARSE_EXCEPTION,
                            ctx!("reason" => panic_reason(payload.as_ref())),
                        ));
                    }
                };
                let end = reader.cursor();
                if end < start || !reader.input().is_char_boundary(end) {
                    reader.set_cursor(start);
                    return Err(reader.error(
                        codes::DISPATCHER_PARSE_EXCEPTION,
                        ctx!("reason" => format!("argument parser moved the cursor to {end}")),
                    ));
                }
                context.with_argument(name, ParsedArgument::new(start, end, value));
                context.with_node(child, node, Span::new(start, end));
            }
        }
        if reader.can_read() && reader.peek() != Some(ARGUMENT_SEPARATOR) {
            return Err(reader.error(codes::DISPATCHER_EXPECTED_SEPARATOR, ctx!()));
        }
        Ok(())
    }
}

fn panic_reason(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "argument parser panicked".to_string()
    }
}
