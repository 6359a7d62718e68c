//! Parse-time and execution-time command contexts.
//!
//! [`CommandContextBuilder`] accumulates bindings while the dispatcher walks
//! the tree and is cloned at every branch point. [`CommandContext`] is the
//! frozen form handed to executors and redirect modifiers.

use std::any::Any;
use std::sync::Arc;

use cmdtree_diagnostics::Span;

use crate::arguments::{ArgValue, FromArgValue, ParsedArgument};
use crate::error::CommandError;
use crate::principal::Principal;
use crate::tree::{CommandNode, Executor, NodeId, RedirectModifier};

/// A node visited during a parse and the input range it consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedNode {
    /// The matched node.
    pub node: NodeId,
    /// Consumed byte range.
    pub range: Span,
}

/// Where completions are computed from: the node whose children are asked and
/// the byte offset the proposals replace from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuggestionContext {
    /// Node whose children produce candidates.
    pub parent: NodeId,
    /// Start of the text being completed.
    pub start: usize,
}

/// Mutable accumulator of parse state for one branch.
pub struct CommandContextBuilder<'a, S> {
    source: Arc<S>,
    input: &'a str,
    root: NodeId,
    arguments: Vec<(String, ParsedArgument)>,
    nodes: Vec<ParsedNode>,
    executor: Option<Executor<S>>,
    child: Option<Box<CommandContextBuilder<'a, S>>>,
    range: Span,
    modifier: Option<RedirectModifier<S>>,
    forks: bool,
    redirect_depth: usize,
}

impl<S> Clone for CommandContextBuilder<'_, S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            input: self.input,
            root: self.root,
            arguments: self.arguments.clone(),
            nodes: self.nodes.clone(),
            executor: self.executor.as_ref().map(Arc::clone),
            child: self.child.clone(),
            range: self.range,
            modifier: self.modifier.as_ref().map(Arc::clone),
            forks: self.forks,
            redirect_depth: self.redirect_depth,
        }
    }
}

impl<S> std::fmt::Debug for CommandContextBuilder<'_, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandContextBuilder")
            .field("input", &self.input)
            .field("root", &self.root)
            .field("arguments", &self.arguments)
            .field("nodes", &self.nodes)
            .field("executor", &self.executor.is_some())
            .field("child", &self.child)
            .field("range", &self.range)
            .field("redirect_depth", &self.redirect_depth)
            .finish_non_exhaustive()
    }
}

impl<'a, S> CommandContextBuilder<'a, S> {
    /// An empty context rooted at `root`, starting at byte `start` of `input`.
    pub fn new(source: Arc<S>, input: &'a str, root: NodeId, start: usize) -> Self {
        Self {
            source,
            input,
            root,
            arguments: Vec::new(),
            nodes: Vec::new(),
            executor: None,
            child: None,
            range: Span::empty(start),
            modifier: None,
            forks: false,
            redirect_depth: 0,
        }
    }

    pub(crate) fn with_redirect_depth(mut self, depth: usize) -> Self {
        self.redirect_depth = depth;
        self
    }

    /// The invoking principal.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Shared handle to the invoking principal.
    pub fn source_arc(&self) -> &Arc<S> {
        &self.source
    }

    /// The full input being parsed.
    pub fn input(&self) -> &'a str {
        self.input
    }

    /// The node this context started at (root, or a redirect target).
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Bound arguments in binding order.
    pub fn arguments(&self) -> &[(String, ParsedArgument)] {
        &self.arguments
    }

    /// A bound argument by name.
    pub fn argument(&self, name: &str) -> Option<&ParsedArgument> {
        self.arguments
            .iter()
            .find_map(|(key, arg)| (key == name).then_some(arg))
    }

    /// Visited nodes in order.
    pub fn nodes(&self) -> &[ParsedNode] {
        &self.nodes
    }

    /// The resolved executor.
    pub fn executor(&self) -> Option<&Executor<S>> {
        self.executor.as_ref()
    }

    /// The nested context produced by a redirect.
    pub fn child(&self) -> Option<&CommandContextBuilder<'a, S>> {
        self.child.as_deref()
    }

    /// The innermost nested context (or `self`).
    pub fn last_child(&self) -> &CommandContextBuilder<'a, S> {
        let mut result = self;
        while let Some(child) = result.child() {
            result = child;
        }
        result
    }

    /// Byte range covered by the visited nodes.
    pub fn range(&self) -> Span {
        self.range
    }

    /// How many redirects were followed to reach this context.
    pub fn redirect_depth(&self) -> usize {
        self.redirect_depth
    }

    /// Bind an argument. A later binding with the same name replaces the
    /// earlier one in place.
    pub fn with_argument(&mut self, name: &str, argument: ParsedArgument) -> &mut Self {
        if let Some(slot) = self.arguments.iter_mut().find(|(key, _)| key == name) {
            slot.1 = argument;
        } else {
            self.arguments.push((name.to_string(), argument));
        }
        self
    }

    /// Record a visited node and pick up its redirect modifier and fork flag.
    pub fn with_node(&mut self, id: NodeId, node: &CommandNode<S>, range: Span) -> &mut Self {
        self.nodes.push(ParsedNode { node: id, range });
        self.range = self.range.encompassing(range);
        self.modifier = node.modifier.as_ref().map(Arc::clone);
        self.forks = node.forks;
        self
    }

    /// Replace the resolved executor.
    pub fn with_executor(&mut self, executor: Option<Executor<S>>) -> &mut Self {
        self.executor = executor;
        self
    }

    /// Attach the context produced by a redirect.
    pub fn with_child(&mut self, child: CommandContextBuilder<'a, S>) -> &mut Self {
        self.child = Some(Box::new(child));
        self
    }

    /// Freeze into an executable context.
    pub fn build(&self) -> CommandContext<'a, S> {
        CommandContext {
            source: Arc::clone(&self.source),
            input: self.input,
            root: self.root,
            arguments: self.arguments.clone(),
            nodes: self.nodes.clone(),
            executor: self.executor.as_ref().map(Arc::clone),
            child: self.child.as_ref().map(|c| Box::new(c.build())),
            range: self.range,
            modifier: self.modifier.as_ref().map(Arc::clone),
            forks: self.forks,
        }
    }

    /// Locate the parent node and start offset for completing at `cursor`,
    /// along with the context level they were found in.
    pub fn find_suggestion_context(&self, cursor: usize) -> (SuggestionContext, &Self) {
        if self.range.end < cursor {
            if let Some(child) = self.child() {
                return child.find_suggestion_context(cursor);
            }
            if let Some(last) = self.nodes.last() {
                let start = (last.range.end + 1).min(self.input.len());
                return (
                    SuggestionContext {
                        parent: last.node,
                        start,
                    },
                    self,
                );
            }
            return (
                SuggestionContext {
                    parent: self.root,
                    start: self.range.start,
                },
                self,
            );
        }
        let mut prev = self.root;
        for parsed in &self.nodes {
            if parsed.range.start <= cursor && cursor <= parsed.range.end {
                return (
                    SuggestionContext {
                        parent: prev,
                        start: parsed.range.start,
                    },
                    self,
                );
            }
            prev = parsed.node;
        }
        (
            SuggestionContext {
                parent: prev,
                start: self.range.start,
            },
            self,
        )
    }
}

/// The frozen context passed to executors and redirect modifiers.
pub struct CommandContext<'a, S> {
    source: Arc<S>,
    input: &'a str,
    root: NodeId,
    arguments: Vec<(String, ParsedArgument)>,
    nodes: Vec<ParsedNode>,
    executor: Option<Executor<S>>,
    child: Option<Box<CommandContext<'a, S>>>,
    range: Span,
    modifier: Option<RedirectModifier<S>>,
    forks: bool,
}

impl<S> Clone for CommandContext<'_, S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            input: self.input,
            root: self.root,
            arguments: self.arguments.clone(),
            nodes: self.nodes.clone(),
            executor: self.executor.as_ref().map(Arc::clone),
            child: self.child.clone(),
            range: self.range,
            modifier: self.modifier.as_ref().map(Arc::clone),
            forks: self.forks,
        }
    }
}

impl<S> std::fmt::Debug for CommandContext<'_, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandContext")
            .field("input", &self.input)
            .field("arguments", &self.arguments)
            .field("nodes", &self.nodes)
            .field("child", &self.child)
            .field("range", &self.range)
            .field("forks", &self.forks)
            .finish_non_exhaustive()
    }
}

impl<'a, S> CommandContext<'a, S> {
    /// A copy of this context running on behalf of another principal.
    pub fn copy_for(&self, source: Arc<S>) -> Self {
        let mut copy = self.clone();
        copy.source = source;
        copy
    }

    /// The invoking principal.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Shared handle to the invoking principal.
    pub fn source_arc(&self) -> &Arc<S> {
        &self.source
    }

    /// The full input.
    pub fn input(&self) -> &'a str {
        self.input
    }

    /// The node this context started at.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Visited nodes in order.
    pub fn nodes(&self) -> &[ParsedNode] {
        &self.nodes
    }

    /// Whether any node was matched in this context.
    pub fn has_nodes(&self) -> bool {
        !self.nodes.is_empty()
    }

    /// Byte range covered by the visited nodes.
    pub fn range(&self) -> Span {
        self.range
    }

    /// The resolved executor.
    pub fn executor(&self) -> Option<&Executor<S>> {
        self.executor.as_ref()
    }

    /// The nested context produced by a redirect.
    pub fn child(&self) -> Option<&CommandContext<'a, S>> {
        self.child.as_deref()
    }

    /// The innermost nested context (or `self`).
    pub fn last_child(&self) -> &CommandContext<'a, S> {
        let mut result = self;
        while let Some(child) = result.child() {
            result = child;
        }
        result
    }

    /// The redirect modifier of the last matched node.
    pub fn modifier(&self) -> Option<&RedirectModifier<S>> {
        self.modifier.as_ref()
    }

    /// Whether the redirect out of this context forks execution.
    pub fn is_forked(&self) -> bool {
        self.forks
    }

    /// Bound arguments in binding order.
    pub fn arguments(&self) -> &[(String, ParsedArgument)] {
        &self.arguments
    }

    /// A bound argument by name.
    pub fn argument(&self, name: &str) -> Option<&ParsedArgument> {
        self.arguments
            .iter()
            .find_map(|(key, arg)| (key == name).then_some(arg))
    }

    /// Whether an argument named `name` was bound.
    pub fn has_argument(&self, name: &str) -> bool {
        self.argument(name).is_some()
    }

    /// The raw input text an argument was parsed from.
    pub fn argument_text(&self, name: &str) -> Option<&'a str> {
        self.argument(name).map(|arg| arg.range.get(self.input))
    }

    /// A bound argument converted to `T`.
    pub fn get<T: FromArgValue>(&self, name: &str) -> Result<T, CommandError> {
        let arg = self
            .argument(name)
            .ok_or_else(|| CommandError::UnknownArgument { name: name.into() })?;
        T::from_arg(&arg.value).ok_or_else(|| CommandError::ArgumentType {
            name: name.into(),
            expected: T::EXPECTED,
        })
    }

    /// A bound argument converted to `T`, or `None` when it was not bound.
    pub fn get_optional<T: FromArgValue>(&self, name: &str) -> Result<Option<T>, CommandError> {
        if self.has_argument(name) {
            self.get(name).map(Some)
        } else {
            Ok(None)
        }
    }

    /// A host-defined argument value.
    pub fn get_other<T: Any + Send + Sync>(&self, name: &str) -> Result<Arc<T>, CommandError> {
        let arg = self
            .argument(name)
            .ok_or_else(|| CommandError::UnknownArgument { name: name.into() })?;
        let type_error = || CommandError::ArgumentType {
            name: name.into(),
            expected: std::any::type_name::<T>(),
        };
        match &arg.value {
            ArgValue::Other(value) => Arc::clone(value).downcast::<T>().map_err(|_| type_error()),
            _ => Err(type_error()),
        }
    }
}

impl<S: Principal> CommandContext<'_, S> {
    /// Fail with [`CommandError::PermissionDenied`] unless the principal
    /// holds `capability`.
    ///
    /// For executors that stay visible to everyone but gate what they do.
    pub fn require_capability(&self, capability: &str) -> Result<(), CommandError> {
        if self.source.has_capability(capability) {
            Ok(())
        } else {
            Err(CommandError::PermissionDenied {
                capability: capability.to_string(),
            })
        }
    }
}
