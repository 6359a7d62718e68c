//! Running parsed commands.

use std::sync::Arc;

use cmdtree_diagnostics::codes;
use tracing::{debug, trace};

use super::{Dispatcher, ParseResults};
use crate::context::CommandContext;
use crate::error::CommandError;
use crate::reader::ctx;

impl<S> Dispatcher<S> {
    /// Parse and execute `input` on behalf of `source`.
    pub fn execute(&self, input: &str, source: Arc<S>) -> Result<i32, CommandError> {
        self.parse(input, source).execute()
    }
}

impl<S> ParseResults<'_, S> {
    /// Execute a parse result.
    ///
    /// Unconsumed input is a syntax error: the single recorded error when
    /// there is exactly one, otherwise unknown command (nothing matched) or
    /// unknown argument. Redirects run their modifier once per context and
    /// continue with the nested context for every principal it produces. The
    /// result is the sum of executor results, or the number of successful
    /// executions when a forking redirect was crossed. Reaching the end of
    /// the chain without running an executor is an incomplete command, even
    /// when redirects were followed on the way.
    pub fn execute(self) -> Result<i32, CommandError> {
        if self.reader.can_read() {
            let error = if self.errors.len() == 1 {
                self.errors.into_iter().map(|(_, e)| e).next()
            } else {
                None
            };
            let error = error.unwrap_or_else(|| {
                let code = if self.context.range().is_empty() {
                    codes::DISPATCHER_UNKNOWN_COMMAND
                } else {
                    codes::DISPATCHER_UNKNOWN_ARGUMENT
                };
                self.reader.error(code, ctx!())
            });
            debug!(code = %error.id, cursor = ?error.cursor, "command did not parse");
            return Err(error.into());
        }

        let input = self.reader.input();
        let mut result = 0i32;
        let mut successful_forks = 0i32;
        let mut forked = false;
        let mut found_command = false;
        let mut contexts: Vec<CommandContext<'_, S>> = vec![self.context.build()];

        while !contexts.is_empty() {
            let mut next = Vec::new();
            for context in &contexts {
                if let Some(child) = context.child() {
                    forked |= context.is_forked();
                    if !child.has_nodes() {
                        continue;
                    }
                    match context.modifier() {
                        None => next.push(child.copy_for(Arc::clone(context.source_arc()))),
                        Some(modifier) => match modifier(context) {
                            Ok(sources) => {
                                trace!(count = sources.len(), "redirect modifier produced sources");
                                // A fork that selects nobody still ran.
                                found_command |= forked && sources.is_empty();
                                next.extend(sources.into_iter().map(|source| child.copy_for(source)));
                            }
                            Err(error) if forked => {
                                debug!(%error, "forked redirect modifier failed");
                                found_command = true;
                            }
                            Err(error) => return Err(error),
                        },
                    }
                } else if let Some(executor) = context.executor() {
                    found_command = true;
                    match executor(context) {
                        Ok(value) => {
                            result = result.wrapping_add(value);
                            successful_forks += 1;
                        }
                        Err(error) if forked => {
                            debug!(%error, "forked executor failed");
                        }
                        Err(error) => return Err(error),
                    }
                }
            }
            contexts = next;
        }

        if !found_command {
            return Err(CommandError::Incomplete {
                input: input.to_string(),
            });
        }
        Ok(if forked { successful_forks } else { result })
    }
}
