//! The command tree: node arena entries and their builder.
//!
//! Nodes are owned by the [`Dispatcher`](crate::Dispatcher)'s arena and
//! addressed by [`NodeId`]. Child edges form a tree; redirect edges are plain
//! ids and may point anywhere, including at an ancestor.

mod builder;

pub use builder::NodeBuilder;

use std::fmt;
use std::sync::Arc;

use crate::arguments::{ArgumentParser, ValueCompleter};
use crate::context::CommandContext;
use crate::error::CommandError;

/// Index of a node in the dispatcher's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// The root node of every dispatcher.
    pub const ROOT: NodeId = NodeId(0);

    /// Arena index.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Runs a fully matched command and returns its result code.
pub type Executor<S> =
    Arc<dyn Fn(&CommandContext<'_, S>) -> Result<i32, CommandError> + Send + Sync>;

/// Decides whether a principal may see and use a node.
pub type Requirement<S> = Arc<dyn Fn(&S) -> bool + Send + Sync>;

/// Maps the context at a redirect to the principals execution continues with.
pub type RedirectModifier<S> =
    Arc<dyn Fn(&CommandContext<'_, S>) -> Result<Vec<Arc<S>>, CommandError> + Send + Sync>;

/// What a node matches.
pub enum NodeKind<S> {
    /// The root of the tree. Matches nothing itself.
    Root,
    /// A fixed keyword.
    Literal {
        /// The keyword text.
        literal: String,
    },
    /// A typed value slot.
    Argument {
        /// Binding name of the value.
        name: String,
        /// Parser capability.
        parser: Arc<dyn ArgumentParser<S>>,
        /// Optional completer capability.
        completer: Option<Arc<dyn ValueCompleter<S>>>,
    },
}

impl<S> Clone for NodeKind<S> {
    fn clone(&self) -> Self {
        match self {
            Self::Root => Self::Root,
            Self::Literal { literal } => Self::Literal {
                literal: literal.clone(),
            },
            Self::Argument {
                name,
                parser,
                completer,
            } => Self::Argument {
                name: name.clone(),
                parser: Arc::clone(parser),
                completer: completer.as_ref().map(Arc::clone),
            },
        }
    }
}

impl<S> fmt::Debug for NodeKind<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Root => f.write_str("Root"),
            Self::Literal { literal } => f.debug_struct("Literal").field("literal", literal).finish(),
            Self::Argument {
                name, completer, ..
            } => f
                .debug_struct("Argument")
                .field("name", name)
                .field("completer", &completer.is_some())
                .finish_non_exhaustive(),
        }
    }
}

impl<S> NodeKind<S> {
    /// Literal text or argument name; empty for the root.
    pub fn name(&self) -> &str {
        match self {
            Self::Root => "",
            Self::Literal { literal } => literal,
            Self::Argument { name, .. } => name,
        }
    }

    /// Whether this is a literal.
    pub fn is_literal(&self) -> bool {
        matches!(self, Self::Literal { .. })
    }

    /// Whether this is an argument.
    pub fn is_argument(&self) -> bool {
        matches!(self, Self::Argument { .. })
    }

    /// Display form used in usage strings: `literal` or `<name>`.
    pub fn usage_text(&self) -> String {
        match self {
            Self::Root => String::new(),
            Self::Literal { literal } => literal.clone(),
            Self::Argument { name, .. } => format!("<{name}>"),
        }
    }
}

/// One node stored in the dispatcher's arena.
pub struct CommandNode<S> {
    pub(crate) kind: NodeKind<S>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) executor: Option<Executor<S>>,
    pub(crate) requirement: Option<Requirement<S>>,
    pub(crate) redirect: Option<NodeId>,
    pub(crate) modifier: Option<RedirectModifier<S>>,
    pub(crate) forks: bool,
}

impl<S> fmt::Debug for CommandNode<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandNode")
            .field("kind", &self.kind)
            .field("children", &self.children)
            .field("executor", &self.executor.is_some())
            .field("requirement", &self.requirement.is_some())
            .field("redirect", &self.redirect)
            .field("forks", &self.forks)
            .finish_non_exhaustive()
    }
}

impl<S> CommandNode<S> {
    pub(crate) fn root() -> Self {
        Self::new(NodeKind::Root)
    }

    pub(crate) fn new(kind: NodeKind<S>) -> Self {
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

    /// What the node matches.
    pub fn kind(&self) -> &NodeKind<S> {
        &self.kind
    }

    /// Literal text or argument name; empty for the root.
    pub fn name(&self) -> &str {
        self.kind.name()
    }

    /// Display form used in usage strings.
    pub fn usage_text(&self) -> String {
        self.kind.usage_text()
    }

    /// Children in insertion order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// The executor, if this node can terminate a command.
    pub fn executor(&self) -> Option<&Executor<S>> {
        self.executor.as_ref()
    }

    /// The requirement predicate, if any.
    pub fn requirement(&self) -> Option<&Requirement<S>> {
        self.requirement.as_ref()
    }

    /// Redirect target.
    pub fn redirect(&self) -> Option<NodeId> {
        self.redirect
    }

    /// Redirect modifier.
    pub fn modifier(&self) -> Option<&RedirectModifier<S>> {
        self.modifier.as_ref()
    }

    /// Whether the redirect forks execution.
    pub fn is_fork(&self) -> bool {
        self.forks
    }

    /// Whether `source` passes this node's requirement.
    pub fn can_use(&self, source: &S) -> bool {
        self.requirement.as_ref().is_none_or(|req| req(source))
    }

    /// Example inputs for argument nodes.
    pub fn examples(&self) -> Vec<String> {
        match &self.kind {
            NodeKind::Literal { literal } => vec![literal.clone()],
            NodeKind::Argument { parser, .. } => parser.examples(),
            NodeKind::Root => Vec::new(),
        }
    }
}
