//! Registration of owned commands onto the shared tree.
//!
//! [`Registrar`] ties a [`Dispatcher`] and a [`CommandRegistry`] together:
//! it resolves the requested alias against existing claims, inserts the
//! command's literal node under the root, and adds one redirecting literal
//! per secondary alias.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::command::Command;
use crate::dispatcher::Dispatcher;
use crate::error::RegistrationError;
use crate::principal::Principal;
use crate::registry::{CommandMapping, CommandRegistry, HelpText};
use crate::tree::{NodeBuilder, NodeId, Requirement};

/// Registers commands on behalf of owners.
#[derive(Debug)]
pub struct Registrar<'r, S> {
    dispatcher: &'r mut Dispatcher<S>,
    registry: &'r mut CommandRegistry,
}

impl<'r, S> Registrar<'r, S> {
    /// Borrow a dispatcher and registry for registration.
    pub fn new(dispatcher: &'r mut Dispatcher<S>, registry: &'r mut CommandRegistry) -> Self {
        Self {
            dispatcher,
            registry,
        }
    }

    /// Register a literal subtree under its own name plus `secondary` aliases.
    ///
    /// The primary alias is the builder's literal, lowercased. If another
    /// owner holds it, the command is registered as `<owner>.<literal>`
    /// instead. Each secondary alias becomes a literal next to the primary
    /// that redirects to it and shares its requirement and executor.
    /// Secondary aliases that cannot be claimed even after namespacing are
    /// skipped with a warning.
    pub fn register(
        &mut self,
        owner: &str,
        builder: NodeBuilder<S>,
        secondary: &[&str],
    ) -> Result<CommandMapping, RegistrationError> {
        self.register_described(owner, builder, secondary, HelpText::default())
    }

    fn register_described(
        &mut self,
        owner: &str,
        builder: NodeBuilder<S>,
        secondary: &[&str],
        help: HelpText,
    ) -> Result<CommandMapping, RegistrationError> {
        if !builder.kind().is_literal() {
            return Err(RegistrationError::NotALiteral);
        }
        let config = self.dispatcher.config().clone();
        let claim = self
            .registry
            .resolve_primary(owner, builder.name(), &config)?;
        let primary = claim.alias().to_string();
        let builder = if builder.name() == primary {
            builder
        } else {
            debug!(owner, requested = builder.name(), primary = %primary, "rewriting primary literal");
            builder.with_literal(primary.clone())
        };
        let node = self.dispatcher.register(builder)?;

        let mut claimed = Vec::new();
        for alias in secondary {
            let Some(alias) = self.registry.resolve_secondary(owner, alias, &config) else {
                warn!(owner, alias, "secondary alias unavailable, skipping");
                continue;
            };
            if alias == primary || claimed.contains(&alias) {
                continue;
            }
            let alias_node = self.alias_node(&alias, node);
            match self.dispatcher.register(alias_node) {
                Ok(_) => claimed.push(alias),
                Err(error) => warn!(owner, alias = %alias, %error, "could not add alias node"),
            }
        }

        let mapping = self
            .registry
            .record(&claim, owner, node, claimed, help)
            .clone();
        debug!(owner, primary = %mapping.primary_alias, aliases = ?mapping.all_aliases, "registered command");
        Ok(mapping)
    }

    fn alias_node(&self, alias: &str, target: NodeId) -> NodeBuilder<S> {
        let primary = self.dispatcher.node(target);
        NodeBuilder::literal(alias)
            .requirement(primary.and_then(|n| n.requirement().map(Arc::clone)))
            .executor(primary.and_then(|n| n.executor().map(Arc::clone)))
            .redirect(target)
    }
}

impl<S: Principal> Registrar<'_, S> {
    /// Like [`register`](Self::register), but the command also requires the
    /// capability named by the configured permission template, e.g.
    /// `demo.command.tp`.
    pub fn register_with_permission(
        &mut self,
        owner: &str,
        builder: NodeBuilder<S>,
        secondary: &[&str],
    ) -> Result<CommandMapping, RegistrationError> {
        let permission = self.dispatcher.config().permission_for(owner, builder.name());
        let builder = require_capability(builder, permission);
        self.register(owner, builder, secondary)
    }

    /// Compile a parameterized command under `primary` and register it.
    ///
    /// The command's own permission, when set, gates the top-level node.
    pub fn register_command(
        &mut self,
        owner: &str,
        command: &Command<S>,
        primary: &str,
        secondary: &[&str],
    ) -> Result<CommandMapping, RegistrationError> {
        let builder = command.build_node(primary);
        self.register_described(
            owner,
            builder,
            secondary,
            HelpText {
                short: command.short_description().map(str::to_string),
                extended: command.extended_description().map(str::to_string),
            },
        )
    }
}

/// AND a builder's requirement with a capability check.
pub(crate) fn require_capability<S: Principal>(
    builder: NodeBuilder<S>,
    capability: String,
) -> NodeBuilder<S> {
    let existing = builder.get_requirement().map(Arc::clone);
    let requirement: Requirement<S> = Arc::new(move |source: &S| {
        source.has_capability(&capability) && existing.as_ref().is_none_or(|req| req(source))
    });
    builder.requirement(Some(requirement))
}
