use std::fmt;
use std::sync::Arc;

use super::{Executor, NodeId, NodeKind, RedirectModifier, Requirement};
use crate::arguments::{ArgumentParser, ValueCompleter};
use crate::context::CommandContext;
use crate::error::CommandError;

/// Builds a node subtree before it is inserted into a dispatcher.
///
/// ```
/// use cmdtree_core::{NodeBuilder, StringParser, IntegerParser};
///
/// let give = NodeBuilder::<()>::literal("give").then(
///     NodeBuilder::argument("item", StringParser::word()).then(
///         NodeBuilder::argument("amount", IntegerParser::at_least(1))
///             .executes(|ctx| ctx.get::<i32>("amount")),
///     ),
/// );
/// assert_eq!(give.name(), "give");
/// ```
pub struct NodeBuilder<S> {
    pub(crate) kind: NodeKind<S>,
    pub(crate) children: Vec<NodeBuilder<S>>,
    pub(crate) executor: Option<Executor<S>>,
    pub(crate) requirement: Option<Requirement<S>>,
    pub(crate) redirect: Option<NodeId>,
    pub(crate) modifier: Option<RedirectModifier<S>>,
    pub(crate) forks: bool,
}

impl<S> Clone for NodeBuilder<S> {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind.clone(),
            children: self.children.clone(),
            executor: self.executor.as_ref().map(Arc::clone),
            requirement: self.requirement.as_ref().map(Arc::clone),
            redirect: self.redirect,
            modifier: self.modifier.as_ref().map(Arc::clone),
            forks: self.forks,
        }
    }
}

impl<S> fmt::Debug for NodeBuilder<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeBuilder")
            .field("kind", &self.kind)
            .field("children", &self.children)
            .field("executor", &self.executor.is_some())
            .field("redirect", &self.redirect)
            .finish_non_exhaustive()
    }
}

impl<S> NodeBuilder<S> {
    fn new(kind: NodeKind<S>) -> Self {
        Self {
            kind,
            children: Vec::new(),
            executor: None,
            requirement: None,
            redirect: None,
            modifier: None,
            forks: false,
        }
    }

    /// A literal keyword node.
    pub fn literal(literal: impl Into<String>) -> Self {
        Self::new(NodeKind::Literal {
            literal: literal.into(),
        })
    }

    /// A typed argument node.
    pub fn argument(name: impl Into<String>, parser: impl ArgumentParser<S> + 'static) -> Self {
        Self::argument_with(name, Arc::new(parser))
    }

    /// A typed argument node sharing an existing parser.
    pub fn argument_with(name: impl Into<String>, parser: Arc<dyn ArgumentParser<S>>) -> Self {
        Self::new(NodeKind::Argument {
            name: name.into(),
            parser,
            completer: None,
        })
    }

    /// Add a child subtree.
    pub fn then(mut self, child: NodeBuilder<S>) -> Self {
        self.children.push(child);
        self
    }

    /// Set the executor.
    pub fn executes<F>(mut self, executor: F) -> Self
    where
        F: Fn(&CommandContext<'_, S>) -> Result<i32, CommandError> + Send + Sync + 'static,
    {
        self.executor = Some(Arc::new(executor));
        self
    }

    /// Set a shared executor, or clear it with `None`.
    pub fn executor(mut self, executor: Option<Executor<S>>) -> Self {
        self.executor = executor;
        self
    }

    /// Set the requirement predicate.
    pub fn requires<F>(mut self, requirement: F) -> Self
    where
        F: Fn(&S) -> bool + Send + Sync + 'static,
    {
        self.requirement = Some(Arc::new(requirement));
        self
    }

    /// Set a shared requirement, or clear it with `None`.
    pub fn requirement(mut self, requirement: Option<Requirement<S>>) -> Self {
        self.requirement = requirement;
        self
    }

    /// Continue parsing at `target` after this node matches.
    pub fn redirect(self, target: NodeId) -> Self {
        self.forward(target, None, false)
    }

    /// Redirect and map the context to a single new principal.
    pub fn redirect_with<F>(self, target: NodeId, modifier: F) -> Self
    where
        S: 'static,
        F: Fn(&CommandContext<'_, S>) -> Result<Arc<S>, CommandError> + Send + Sync + 'static,
    {
        let modifier: RedirectModifier<S> =
            Arc::new(move |ctx: &CommandContext<'_, S>| modifier(ctx).map(|s| vec![s]));
        self.forward(target, Some(modifier), false)
    }

    /// Redirect and continue execution once per principal the modifier returns.
    /// Failures of individual forks do not fail the command.
    pub fn fork<F>(self, target: NodeId, modifier: F) -> Self
    where
        F: Fn(&CommandContext<'_, S>) -> Result<Vec<Arc<S>>, CommandError> + Send + Sync + 'static,
    {
        self.forward(target, Some(Arc::new(modifier)), true)
    }

    /// Set redirect target, modifier and fork flag together.
    pub fn forward(
        mut self,
        target: NodeId,
        modifier: Option<RedirectModifier<S>>,
        forks: bool,
    ) -> Self {
        self.redirect = Some(target);
        self.modifier = modifier;
        self.forks = forks;
        self
    }

    /// Attach a completer to an argument node. Has no effect on literals.
    pub fn suggests(self, completer: impl ValueCompleter<S> + 'static) -> Self {
        self.completer(Some(Arc::new(completer)))
    }

    /// Set or clear a shared completer on an argument node.
    pub fn completer(mut self, completer: Option<Arc<dyn ValueCompleter<S>>>) -> Self {
        if let NodeKind::Argument { completer: slot, .. } = &mut self.kind {
            *slot = completer;
        }
        self
    }

    /// Rename a literal node. Has no effect on arguments.
    pub fn with_literal(mut self, literal: impl Into<String>) -> Self {
        if let NodeKind::Literal { literal: slot } = &mut self.kind {
            *slot = literal.into();
        }
        self
    }

    /// Literal text or argument name.
    pub fn name(&self) -> &str {
        self.kind.name()
    }

    /// What the node will match.
    pub fn kind(&self) -> &NodeKind<S> {
        &self.kind
    }

    /// Child builders in insertion order.
    pub fn children(&self) -> &[NodeBuilder<S>] {
        &self.children
    }

    /// The configured executor.
    pub fn get_executor(&self) -> Option<&Executor<S>> {
        self.executor.as_ref()
    }

    /// The configured requirement.
    pub fn get_requirement(&self) -> Option<&Requirement<S>> {
        self.requirement.as_ref()
    }

    /// The configured redirect target.
    pub fn get_redirect(&self) -> Option<NodeId> {
        self.redirect
    }
}
