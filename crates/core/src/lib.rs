//! cmdtree core library.
//!
//! A shared command tree with a backtracking parser. Hosts register literal
//! and argument nodes (directly through [`Dispatcher`], or with alias
//! bookkeeping through [`Registrar`] / [`CommandManager`]), then parse,
//! execute and complete free-form input against the tree.
//!
//! ```
//! use cmdtree_core::{CommandManager, IntegerParser, NodeBuilder, SimplePrincipal, StringParser};
//!
//! let manager = CommandManager::<SimplePrincipal>::new();
//! manager
//!     .register(
//!         "demo",
//!         NodeBuilder::literal("give").then(
//!             NodeBuilder::argument("item", StringParser::word()).then(
//!                 NodeBuilder::argument("amount", IntegerParser::new())
//!                     .executes(|ctx| ctx.get::<i32>("amount")),
//!             ),
//!         ),
//!         &[],
//!     )
//!     .unwrap();
//!
//! let alex = SimplePrincipal::new("alex");
//! assert_eq!(manager.execute(alex.clone(), "give diamond 5").unwrap(), 5);
//! assert_eq!(manager.suggest(alex, "gi"), ["give"]);
//! ```

#![warn(missing_docs)]

/// Argument parser and completer capabilities.
pub mod arguments;
/// Parameterized command builder.
pub mod command;
/// Dispatcher configuration and loading.
pub mod config;
/// Parse-time and execution-time contexts.
pub mod context;
/// Parse, execute, suggest and usage.
pub mod dispatcher;
/// Execution and registration errors.
pub mod error;
/// Thread-safe host entry point.
pub mod manager;
/// Principals and capabilities.
pub mod principal;
/// Input cursor.
pub mod reader;
/// Alias registration onto the shared tree.
pub mod registrar;
/// Alias bookkeeping.
pub mod registry;
/// Node arena entries and builders.
pub mod tree;

// ── Convenience re-exports ──────────────────────────────────────────────────
// Flat imports for the most common entry points. The full module paths
// remain available for less common types.

// Tree
pub use tree::{CommandNode, Executor, NodeBuilder, NodeId, NodeKind, RedirectModifier, Requirement};

// Dispatcher
pub use dispatcher::{Dispatcher, ParseResults, Suggestions};

// Context
pub use context::{CommandContext, CommandContextBuilder, ParsedNode, SuggestionContext};

// Arguments
pub use arguments::standard::{
    BoolParser, ChoiceParser, FloatParser, IntegerParser, StringKind, StringParser,
};
pub use arguments::{ArgValue, ArgumentParser, FromArgValue, ParsedArgument, ValueCompleter};

// Reader
pub use reader::StringReader;

// Registration
pub use command::{Command, CommandBuilder, Parameter};
pub use registrar::Registrar;
pub use registry::{CommandMapping, CommandRegistry};

// Host surface
pub use config::{ConfigError, DispatcherConfig, load_config_from_str};
pub use error::{CommandError, RegistrationError};
pub use manager::{CommandHelp, CommandManager};
pub use principal::{Principal, SimplePrincipal};

// Diagnostics (re-exported from the diagnostics crate)
pub use cmdtree_diagnostics::{Span, SyntaxError, codes};
