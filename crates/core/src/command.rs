//! Parameterized commands: a higher-level builder compiled into node subtrees.
//!
//! A [`Command`] is a list of [`Parameter`]s, an optional executor, and a
//! table of subcommands. [`Command::build_node`] turns it into a literal
//! [`NodeBuilder`] that can be registered under any alias.

use std::sync::Arc;

use crate::arguments::{ArgumentParser, ValueCompleter};
use crate::context::CommandContext;
use crate::error::{CommandError, RegistrationError};
use crate::principal::Principal;
use crate::tree::{Executor, NodeBuilder, Requirement};

/// A named, typed slot in a parameterized command.
pub struct Parameter<S> {
    key: String,
    parser: Arc<dyn ArgumentParser<S>>,
    completer: Option<Arc<dyn ValueCompleter<S>>>,
    optional: bool,
}

impl<S> Clone for Parameter<S> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            parser: Arc::clone(&self.parser),
            completer: self.completer.as_ref().map(Arc::clone),
            optional: self.optional,
        }
    }
}

impl<S> std::fmt::Debug for Parameter<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Parameter")
            .field("key", &self.key)
            .field("optional", &self.optional)
            .finish_non_exhaustive()
    }
}

impl<S> Parameter<S> {
    /// A required parameter bound under `key`.
    pub fn new(key: impl Into<String>, parser: impl ArgumentParser<S> + 'static) -> Self {
        Self {
            key: key.into(),
            parser: Arc::new(parser),
            completer: None,
            optional: false,
        }
    }

    /// Allow the command to run without this parameter. Only a trailing run
    /// of optional parameters can actually be left out.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Attach a completer.
    pub fn completer(mut self, completer: impl ValueCompleter<S> + 'static) -> Self {
        self.completer = Some(Arc::new(completer));
        self
    }

    /// Binding key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Whether the parameter may be omitted.
    pub fn is_optional(&self) -> bool {
        self.optional
    }
}

/// A compiled parameterized command.
pub struct Command<S> {
    parameters: Vec<Parameter<S>>,
    subcommands: Vec<(Vec<String>, Command<S>)>,
    executor: Option<Executor<S>>,
    requirement: Option<Requirement<S>>,
    short_description: Option<String>,
    extended_description: Option<String>,
}

impl<S> Clone for Command<S> {
    fn clone(&self) -> Self {
        Self {
            parameters: self.parameters.clone(),
            subcommands: self.subcommands.clone(),
            executor: self.executor.as_ref().map(Arc::clone),
            requirement: self.requirement.as_ref().map(Arc::clone),
            short_description: self.short_description.clone(),
            extended_description: self.extended_description.clone(),
        }
    }
}

impl<S> std::fmt::Debug for Command<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Command")
            .field("parameters", &self.parameters)
            .field("subcommands", &self.subcommands)
            .field("executor", &self.executor.is_some())
            .field("short_description", &self.short_description)
            .finish_non_exhaustive()
    }
}

impl<S> Command<S> {
    /// Start building a command.
    pub fn builder() -> CommandBuilder<S> {
        CommandBuilder::default()
    }

    /// Parameters in order.
    pub fn parameters(&self) -> &[Parameter<S>] {
        &self.parameters
    }

    /// Subcommands with their (lowercased) aliases.
    pub fn subcommands(&self) -> &[(Vec<String>, Command<S>)] {
        &self.subcommands
    }

    /// One-line description.
    pub fn short_description(&self) -> Option<&str> {
        self.short_description.as_deref()
    }

    /// Long-form help text.
    pub fn extended_description(&self) -> Option<&str> {
        self.extended_description.as_deref()
    }

    /// Whether `source` passes the command's requirement.
    pub fn can_execute(&self, source: &S) -> bool {
        self.requirement.as_ref().is_none_or(|req| req(source))
    }

    /// Compile into a literal subtree named `alias`.
    ///
    /// Parameters become a chain of argument nodes. The executor is attached
    /// to the last parameter and to every node after which only optional
    /// parameters remain. Each subcommand alias becomes its own literal child.
    pub fn build_node(&self, alias: &str) -> NodeBuilder<S> {
        let mut node = NodeBuilder::literal(alias).requirement(self.requirement.as_ref().map(Arc::clone));
        if let Some(executor) = &self.executor {
            let mut tail: Option<NodeBuilder<S>> = None;
            for (i, parameter) in self.parameters.iter().enumerate().rev() {
                let mut argument = NodeBuilder::argument_with(&parameter.key, Arc::clone(&parameter.parser))
                    .completer(parameter.completer.as_ref().map(Arc::clone));
                if self.parameters[i + 1..].iter().all(Parameter::is_optional) {
                    argument = argument.executor(Some(Arc::clone(executor)));
                }
                if let Some(next) = tail.take() {
                    argument = argument.then(next);
                }
                tail = Some(argument);
            }
            if self.parameters.iter().all(Parameter::is_optional) {
                node = node.executor(Some(Arc::clone(executor)));
            }
            if let Some(first) = tail {
                node = node.then(first);
            }
        }
        for (aliases, subcommand) in &self.subcommands {
            for alias in aliases {
                node = node.then(subcommand.build_node(alias));
            }
        }
        node
    }
}

/// Builder for [`Command`].
pub struct CommandBuilder<S> {
    claimed: Vec<String>,
    conflict: Option<String>,
    subcommands: Vec<(Vec<String>, Command<S>)>,
    parameters: Vec<Parameter<S>>,
    executor: Option<Executor<S>>,
    requirement: Option<Requirement<S>>,
    short_description: Option<String>,
    extended_description: Option<String>,
}

impl<S> Default for CommandBuilder<S> {
    fn default() -> Self {
        Self {
            claimed: Vec::new(),
            conflict: None,
            subcommands: Vec::new(),
            parameters: Vec::new(),
            executor: None,
            requirement: None,
            short_description: None,
            extended_description: None,
        }
    }
}

impl<S> CommandBuilder<S> {
    /// Add a subcommand reachable under each of `aliases` (case-insensitive).
    /// An alias already used by another subcommand makes [`build`](Self::build) fail.
    pub fn child<I, T>(mut self, command: Command<S>, aliases: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let aliases: Vec<String> = aliases
            .into_iter()
            .map(|a| a.as_ref().to_lowercase())
            .collect();
        for alias in &aliases {
            if self.claimed.contains(alias) {
                self.conflict.get_or_insert_with(|| alias.clone());
            }
        }
        self.claimed.extend(aliases.iter().cloned());
        self.subcommands.push((aliases, command));
        self
    }

    /// Append a parameter.
    pub fn parameter(mut self, parameter: Parameter<S>) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Set the executor.
    pub fn executor<F>(mut self, executor: F) -> Self
    where
        F: Fn(&CommandContext<'_, S>) -> Result<i32, CommandError> + Send + Sync + 'static,
    {
        self.executor = Some(Arc::new(executor));
        self
    }

    /// Set the execution requirement.
    pub fn requirement<F>(mut self, requirement: F) -> Self
    where
        F: Fn(&S) -> bool + Send + Sync + 'static,
    {
        self.requirement = Some(Arc::new(requirement));
        self
    }

    /// Set a one-line description.
    pub fn short_description(mut self, text: impl Into<String>) -> Self {
        self.short_description = Some(text.into());
        self
    }

    /// Set long-form help text.
    pub fn extended_description(mut self, text: impl Into<String>) -> Self {
        self.extended_description = Some(text.into());
        self
    }

    /// Validate and produce the command.
    pub fn build(self) -> Result<Command<S>, RegistrationError> {
        if let Some(alias) = self.conflict {
            return Err(RegistrationError::SubcommandAliasConflict { alias });
        }
        if self.executor.is_none() {
            if self.subcommands.is_empty() {
                return Err(RegistrationError::MissingExecutor);
            }
            if !self.parameters.is_empty() {
                return Err(RegistrationError::ParametersWithoutExecutor);
            }
        }
        Ok(Command {
            parameters: self.parameters,
            subcommands: self.subcommands,
            executor: self.executor,
            requirement: self.requirement,
            short_description: self.short_description,
            extended_description: self.extended_description,
        })
    }
}

impl<S: Principal> CommandBuilder<S> {
    /// Require a capability to see and run the command.
    pub fn permission(self, capability: impl Into<String>) -> Self {
        let capability = capability.into();
        self.requirement(move |source: &S| source.has_capability(&capability))
    }
}
