//! The command manager: registration, execution, suggestion and help behind
//! one lock.
//!
//! Registration takes the write lock. Parsing, suggesting and help take the
//! read lock and may run concurrently. Execution parses under the read lock
//! and releases it before any executor runs, so executors may call back into
//! the manager (including registering new commands).

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, info};

use crate::command::Command;
use crate::config::DispatcherConfig;
use crate::dispatcher::{Dispatcher, Suggestions};
use crate::error::{CommandError, RegistrationError};
use crate::principal::Principal;
use crate::registrar::Registrar;
use crate::registry::{CommandMapping, CommandRegistry};
use crate::tree::{NodeBuilder, NodeId};

struct State<S> {
    dispatcher: Dispatcher<S>,
    registry: CommandRegistry,
}

/// Help for one registered command.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct CommandHelp {
    /// Registration details.
    pub mapping: CommandMapping,
    /// One compact usage line per visible child of the command.
    pub usage: Vec<String>,
}

/// Shared entry point for hosts.
pub struct CommandManager<S> {
    state: RwLock<State<S>>,
}

impl<S> std::fmt::Debug for CommandManager<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandManager").finish_non_exhaustive()
    }
}

impl<S: Principal> Default for CommandManager<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Principal> CommandManager<S> {
    /// An empty manager with default configuration.
    pub fn new() -> Self {
        Self::with_config(DispatcherConfig::default())
    }

    /// An empty manager with the given configuration.
    pub fn with_config(config: DispatcherConfig) -> Self {
        Self {
            state: RwLock::new(State {
                dispatcher: Dispatcher::with_config(config),
                registry: CommandRegistry::new(),
            }),
        }
    }

    // A panicking executor never holds the lock, and registration validates
    // before mutating, so a poisoned lock still guards a consistent tree.
    fn read(&self) -> RwLockReadGuard<'_, State<S>> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, State<S>> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn with_registrar<T>(&self, f: impl FnOnce(&mut Registrar<'_, S>) -> T) -> T {
        let mut state = self.write();
        let State {
            dispatcher,
            registry,
        } = &mut *state;
        f(&mut Registrar::new(dispatcher, registry))
    }

    // ─── Registration ───────────────────────────────────────────────────

    /// Register a literal subtree. See [`Registrar::register`].
    pub fn register(
        &self,
        owner: &str,
        builder: NodeBuilder<S>,
        secondary: &[&str],
    ) -> Result<CommandMapping, RegistrationError> {
        self.with_registrar(|r| r.register(owner, builder, secondary))
    }

    /// Register a literal subtree gated by the owner's command permission.
    pub fn register_with_permission(
        &self,
        owner: &str,
        builder: NodeBuilder<S>,
        secondary: &[&str],
    ) -> Result<CommandMapping, RegistrationError> {
        self.with_registrar(|r| r.register_with_permission(owner, builder, secondary))
    }

    /// Register a parameterized command.
    pub fn register_command(
        &self,
        owner: &str,
        command: &Command<S>,
        primary: &str,
        secondary: &[&str],
    ) -> Result<CommandMapping, RegistrationError> {
        self.with_registrar(|r| r.register_command(owner, command, primary, secondary))
    }

    /// Direct access to the tree for advanced construction, e.g. redirects to
    /// nodes by id.
    pub fn edit<T>(&self, f: impl FnOnce(&mut Dispatcher<S>) -> T) -> T {
        f(&mut self.write().dispatcher)
    }

    /// Read-only access to the tree.
    pub fn inspect<T>(&self, f: impl FnOnce(&Dispatcher<S>) -> T) -> T {
        f(&self.read().dispatcher)
    }

    // ─── Runtime ────────────────────────────────────────────────────────

    /// Parse and run `input` on behalf of `source`.
    pub fn execute(&self, source: impl Into<Arc<S>>, input: &str) -> Result<i32, CommandError> {
        let source = source.into();
        info!(principal = source.name(), input, "executing command");
        let parse = self.read().dispatcher.parse(input, source);
        let outcome = parse.execute();
        match &outcome {
            Ok(result) => debug!(result, "command finished"),
            Err(error) => debug!(%error, "command failed"),
        }
        outcome
    }

    /// Completion candidates for `input`.
    pub fn suggest(&self, source: impl Into<Arc<S>>, input: &str) -> Vec<String> {
        self.suggestions(source, input).list
    }

    /// Completion candidates with the range they replace.
    pub fn suggestions(&self, source: impl Into<Arc<S>>, input: &str) -> Suggestions {
        self.read().dispatcher.suggest(input, source.into())
    }

    // ─── Help ───────────────────────────────────────────────────────────

    /// Help for the command registered under `alias`, if `source` can use it.
    pub fn help(&self, source: &S, alias: &str) -> Option<CommandHelp> {
        let state = self.read();
        let mapping = state.registry.get(alias)?.clone();
        let node = state.dispatcher.node(mapping.node)?;
        if !node.can_use(source) {
            return None;
        }
        let name = node.name().to_string();
        let mut usage: Vec<String> = state
            .dispatcher
            .smart_usage(mapping.node, source)
            .into_iter()
            .map(|(_, line)| format!("{name} {line}"))
            .collect();
        if node.executor().is_some() || usage.is_empty() {
            usage.insert(0, name);
        }
        Some(CommandHelp { mapping, usage })
    }

    /// One compact usage line per top-level command `source` can use.
    pub fn usage(&self, source: &S) -> Vec<String> {
        let state = self.read();
        state
            .dispatcher
            .smart_usage(NodeId::ROOT, source)
            .into_iter()
            .map(|(_, line)| line)
            .collect()
    }

    /// Every registered mapping, in registration order.
    pub fn mappings(&self) -> Vec<CommandMapping> {
        self.read().registry.mappings().to_vec()
    }

    /// The mapping an alias belongs to.
    pub fn mapping(&self, alias: &str) -> Option<CommandMapping> {
        self.read().registry.get(alias).cloned()
    }
}
