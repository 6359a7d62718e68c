//! Error types for execution and registration.

use cmdtree_diagnostics::{SyntaxError, codes};
use thiserror::Error;

/// Errors that can occur while executing a parsed command.
#[derive(Debug, Clone, Error, PartialEq)]
#[non_exhaustive]
pub enum CommandError {
    /// The input could not be parsed.
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    /// Parsing consumed the input but the last matched node has no executor.
    #[error("unknown or incomplete command: {input}")]
    Incomplete {
        /// The offending input.
        input: String,
    },

    /// An executor or redirect modifier reported a failure.
    #[error("{message}")]
    Failed {
        /// Failure message.
        message: String,
    },

    /// The principal lacks a capability the executor checked for itself.
    #[error("missing capability '{capability}'")]
    PermissionDenied {
        /// The capability that was required.
        capability: String,
    },

    /// An executor asked for an argument that was not parsed.
    #[error("no argument named '{name}' was parsed")]
    UnknownArgument {
        /// Argument name.
        name: String,
    },

    /// An executor asked for an argument as the wrong type.
    #[error("argument '{name}' is not a {expected}")]
    ArgumentType {
        /// Argument name.
        name: String,
        /// The requested type.
        expected: &'static str,
    },
}

impl CommandError {
    /// Shorthand for [`CommandError::Failed`].
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
        }
    }

    /// Diagnostic code for errors that have one.
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::Syntax(e) => Some(&e.id),
            Self::Incomplete { .. } => Some(codes::DISPATCHER_INCOMPLETE_COMMAND),
            _ => None,
        }
    }

    /// The underlying syntax error, if this is one.
    pub fn as_syntax(&self) -> Option<&SyntaxError> {
        match self {
            Self::Syntax(e) => Some(e),
            _ => None,
        }
    }
}

/// Errors that can occur while building or registering commands.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum RegistrationError {
    /// The alias (and its namespaced fallback) is held by another registration.
    #[error("alias '{alias}' is already registered by '{owner}'")]
    AliasClaimed {
        /// The alias that could not be claimed.
        alias: String,
        /// Owner of the existing registration.
        owner: String,
    },

    /// An alias was empty or contained whitespace.
    #[error("invalid alias '{alias}': aliases must be non-empty and contain no whitespace")]
    InvalidAlias {
        /// The rejected alias.
        alias: String,
    },

    /// A top-level registration was not a literal node.
    #[error("only literal nodes can be registered as top-level commands")]
    NotALiteral,

    /// Two subcommands of one command share an alias.
    #[error("subcommand alias '{alias}' is used more than once")]
    SubcommandAliasConflict {
        /// The duplicated alias.
        alias: String,
    },

    /// A command declared parameters but no executor.
    #[error("an executor must exist if you set parameters")]
    ParametersWithoutExecutor,

    /// A command has neither subcommands nor an executor.
    #[error("either a subcommand or an executor must exist")]
    MissingExecutor,

    /// A node was given both a redirect and children.
    #[error("node '{name}' cannot have both a redirect and children")]
    RedirectWithChildren {
        /// Node name.
        name: String,
    },

    /// A redirect pointed at a node that is not in the tree.
    #[error("redirect target {target} does not exist")]
    UnknownRedirectTarget {
        /// The missing node index.
        target: usize,
    },

    /// A literal and an argument with the same name under one parent.
    #[error("'{name}' is already a child of this node with a different kind")]
    NameConflict {
        /// The conflicting name.
        name: String,
    },
}
