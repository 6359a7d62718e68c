//! The dispatcher: node arena plus parse, execute, suggest and usage.
//!
//! All nodes live in one `Vec` owned by [`Dispatcher`]; index 0 is the root.
//! Child edges and redirect edges are both [`NodeId`]s, so redirect cycles can
//! exist without cyclic ownership. Parsing, suggesting and usage only read the
//! arena; registration goes through `&mut self`.

mod execute;
mod parse;
mod suggest;
mod usage;

pub use parse::ParseResults;
pub use suggest::Suggestions;

use tracing::debug;

use crate::config::DispatcherConfig;
use crate::error::RegistrationError;
use crate::tree::{CommandNode, Executor, NodeBuilder, NodeId, NodeKind, Requirement};

/// Owner of the command tree.
pub struct Dispatcher<S> {
    nodes: Vec<CommandNode<S>>,
    config: DispatcherConfig,
}

impl<S> Default for Dispatcher<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> std::fmt::Debug for Dispatcher<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("nodes", &self.nodes.len())
            .field("config", &self.config)
            .finish()
    }
}

impl<S> Dispatcher<S> {
    /// An empty tree with default configuration.
    pub fn new() -> Self {
        Self::with_config(DispatcherConfig::default())
    }

    /// An empty tree with the given configuration.
    pub fn with_config(config: DispatcherConfig) -> Self {
        Self {
            nodes: vec![CommandNode::root()],
            config,
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    /// The root node id.
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Look up a node by id.
    pub fn node(&self, id: NodeId) -> Option<&CommandNode<S>> {
        self.nodes.get(id.0)
    }

    /// Number of nodes in the arena, including the root.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    // Ids handed out by this dispatcher are always in bounds; foreign ids are
    // rejected at the public entry points.
    pub(crate) fn get(&self, id: NodeId) -> &CommandNode<S> {
        &self.nodes[id.0]
    }

    fn check_id(&self, id: NodeId) -> Result<(), RegistrationError> {
        if id.0 < self.nodes.len() {
            Ok(())
        } else {
            Err(RegistrationError::UnknownRedirectTarget { target: id.0 })
        }
    }

    // ─── Tree construction ──────────────────────────────────────────────

    /// Register a top-level literal under the root.
    pub fn register(&mut self, builder: NodeBuilder<S>) -> Result<NodeId, RegistrationError> {
        if !builder.kind.is_literal() {
            return Err(RegistrationError::NotALiteral);
        }
        self.add_child(NodeId::ROOT, builder)
    }

    /// Insert `builder` as a child of `parent`.
    ///
    /// If `parent` already has a child with the same name, the two are merged:
    /// a new executor replaces the old one and children are merged
    /// recursively. The whole subtree is validated before anything is
    /// inserted, so a failed call leaves the tree unchanged.
    pub fn add_child(
        &mut self,
        parent: NodeId,
        builder: NodeBuilder<S>,
    ) -> Result<NodeId, RegistrationError> {
        self.check_id(parent)?;
        self.validate(Some(parent), &builder)?;
        Ok(self.insert(parent, builder))
    }

    fn validate(
        &self,
        parent: Option<NodeId>,
        builder: &NodeBuilder<S>,
    ) -> Result<(), RegistrationError> {
        if let Some(target) = builder.redirect {
            self.check_id(target)?;
        }
        let existing = parent.and_then(|p| self.find_child(p, builder.name()));
        if let Some(existing) = existing {
            let node = self.get(existing);
            if node.kind.is_literal() != builder.kind.is_literal() {
                return Err(RegistrationError::NameConflict {
                    name: builder.name().to_string(),
                });
            }
        }
        let redirects = builder.redirect.is_some() || existing.is_some_and(|e| self.get(e).redirect.is_some());
        let has_children =
            !builder.children.is_empty() || existing.is_some_and(|e| !self.get(e).children.is_empty());
        if redirects && has_children {
            return Err(RegistrationError::RedirectWithChildren {
                name: builder.name().to_string(),
            });
        }
        for (i, child) in builder.children.iter().enumerate() {
            let clash = builder.children[..i].iter().any(|other| {
                other.name() == child.name() && other.kind.is_literal() != child.kind.is_literal()
            });
            if clash {
                return Err(RegistrationError::NameConflict {
                    name: child.name().to_string(),
                });
            }
            self.validate(existing, child)?;
        }
        Ok(())
    }

    fn insert(&mut self, parent: NodeId, builder: NodeBuilder<S>) -> NodeId {
        let NodeBuilder {
            kind,
            children,
            executor,
            requirement,
            redirect,
            modifier,
            forks,
        } = builder;
        let id = if let Some(existing) = self.find_child(parent, kind.name()) {
            debug!(node = kind.name(), "merging into existing node");
            let node = &mut self.nodes[existing.0];
            if executor.is_some() {
                node.executor = executor;
            }
            if redirect.is_some() {
                node.redirect = redirect;
                node.modifier = modifier;
                node.forks = forks;
            }
            existing
        } else {
            let id = NodeId(self.nodes.len());
            let mut node = CommandNode::new(kind);
            node.executor = executor;
            node.requirement = requirement;
            node.redirect = redirect;
            node.modifier = modifier;
            node.forks = forks;
            self.nodes.push(node);
            self.nodes[parent.0].children.push(id);
            id
        };
        for child in children {
            self.insert(id, child);
        }
        id
    }

    /// Replace a node's executor.
    pub fn set_executor(
        &mut self,
        node: NodeId,
        executor: Option<Executor<S>>,
    ) -> Result<(), RegistrationError> {
        self.check_id(node)?;
        self.nodes[node.0].executor = executor;
        Ok(())
    }

    /// Replace a node's requirement.
    pub fn set_requirement(
        &mut self,
        node: NodeId,
        requirement: Option<Requirement<S>>,
    ) -> Result<(), RegistrationError> {
        self.check_id(node)?;
        self.nodes[node.0].requirement = requirement;
        Ok(())
    }

    /// Point an existing childless node at `target`. This is the only way to
    /// close a redirect cycle, since builders can only redirect to nodes that
    /// already exist.
    pub fn set_redirect(&mut self, node: NodeId, target: NodeId) -> Result<(), RegistrationError> {
        self.check_id(node)?;
        self.check_id(target)?;
        let entry = &mut self.nodes[node.0];
        if !entry.children.is_empty() || matches!(entry.kind, NodeKind::Root) {
            return Err(RegistrationError::RedirectWithChildren {
                name: entry.name().to_string(),
            });
        }
        entry.redirect = Some(target);
        Ok(())
    }

    // ─── Lookup ─────────────────────────────────────────────────────────

    /// The child of `parent` named `name`.
    pub fn find_child(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        self.node(parent)?
            .children
            .iter()
            .copied()
            .find(|&c| self.get(c).name() == name)
    }

    /// Follow a path of child names from the root.
    pub fn find_node<T: AsRef<str>>(&self, path: &[T]) -> Option<NodeId> {
        path.iter()
            .try_fold(NodeId::ROOT, |node, name| self.find_child(node, name.as_ref()))
    }

    /// Names from the root to `target` along child edges; empty when
    /// `target` is the root or unreachable.
    pub fn path(&self, target: NodeId) -> Vec<String> {
        let mut stack = vec![(NodeId::ROOT, Vec::new())];
        while let Some((node, path)) = stack.pop() {
            if node == target {
                return path;
            }
            for &child in self.get(node).children.iter().rev() {
                let mut next = path.clone();
                next.push(self.get(child).name().to_string());
                stack.push((child, next));
            }
        }
        Vec::new()
    }
}
