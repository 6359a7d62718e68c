//! Dispatcher configuration.
//!
//! [`DispatcherConfig`] collects the tunables of the dispatcher, registry and
//! registrar. It deserializes from JSON with every field optional, so a host
//! can ship a partial config file and inherit the defaults for the rest.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default bound on nested redirects within one parse.
pub const DEFAULT_MAX_REDIRECT_DEPTH: usize = 64;

/// Errors that can occur when loading or validating a dispatcher config.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// JSON deserialization failed.
    #[error("invalid config JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// A field value is out of its valid range.
    #[error("invalid {field}: {reason}")]
    InvalidField {
        /// The name of the field that failed validation.
        field: String,
        /// Why the value was rejected.
        reason: String,
    },
}

/// Tunables for parsing, suggestion and registration.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatcherConfig {
    /// Maximum number of redirects followed in a single parse. A branch that
    /// would exceed it records a redirect-limit error instead of recursing.
    pub max_redirect_depth: usize,
    /// Separator placed between an owner id and an alias when the bare alias
    /// is already taken, e.g. `"demo"` + `"."` + `"tp"`.
    pub namespace_separator: String,
    /// Template for the capability required by a registered command.
    /// `{owner}` and `{alias}` are substituted; the alias is lowercased.
    pub permission_template: String,
    /// Upper bound on the number of completion candidates returned.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion_limit: Option<usize>,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            max_redirect_depth: DEFAULT_MAX_REDIRECT_DEPTH,
            namespace_separator: ".".into(),
            permission_template: "{owner}.command.{alias}".into(),
            suggestion_limit: None,
        }
    }
}

impl DispatcherConfig {
    /// Set the redirect depth bound (builder pattern).
    pub fn with_max_redirect_depth(mut self, depth: usize) -> Self {
        self.max_redirect_depth = depth;
        self
    }

    /// Set the namespace separator (builder pattern).
    pub fn with_namespace_separator(mut self, separator: impl Into<String>) -> Self {
        self.namespace_separator = separator.into();
        self
    }

    /// Set the permission template (builder pattern).
    pub fn with_permission_template(mut self, template: impl Into<String>) -> Self {
        self.permission_template = template.into();
        self
    }

    /// Cap the number of suggestions (builder pattern).
    pub fn with_suggestion_limit(mut self, limit: usize) -> Self {
        self.suggestion_limit = Some(limit);
        self
    }

    /// Check field ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_redirect_depth == 0 {
            return Err(ConfigError::InvalidField {
                field: "max_redirect_depth".into(),
                reason: "must be > 0".into(),
            });
        }
        if self.namespace_separator.is_empty()
            || self.namespace_separator.chars().any(char::is_whitespace)
        {
            return Err(ConfigError::InvalidField {
                field: "namespace_separator".into(),
                reason: "must be non-empty and contain no whitespace".into(),
            });
        }
        if !self.permission_template.contains("{alias}") {
            return Err(ConfigError::InvalidField {
                field: "permission_template".into(),
                reason: "must reference {alias}".into(),
            });
        }
        if self.suggestion_limit == Some(0) {
            return Err(ConfigError::InvalidField {
                field: "suggestion_limit".into(),
                reason: "must be > 0 when set".into(),
            });
        }
        Ok(())
    }

    /// The capability name guarding `alias` registered by `owner`.
    pub fn permission_for(&self, owner: &str, alias: &str) -> String {
        self.permission_template
            .replace("{owner}", owner)
            .replace("{alias}", &alias.to_lowercase())
    }

    /// The namespaced form of `alias` for `owner`.
    pub fn namespaced(&self, owner: &str, alias: &str) -> String {
        format!("{owner}{}{alias}", self.namespace_separator)
    }
}

/// Parse and validate a dispatcher config from a JSON string.
pub fn load_config_from_str(s: &str) -> Result<DispatcherConfig, ConfigError> {
    let config: DispatcherConfig = serde_json::from_str(s)?;
    config.validate()?;
    Ok(config)
}
