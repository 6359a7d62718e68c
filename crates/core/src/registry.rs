//! Alias bookkeeping: which owner holds which alias, and for which node.

use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use crate::config::DispatcherConfig;
use crate::error::RegistrationError;
use crate::tree::NodeId;

/// A registered command: its owner, aliases and primary node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandMapping {
    /// Id of the plugin or component that registered the command.
    pub owner: String,
    /// The alias the primary node is registered under.
    pub primary_alias: String,
    /// Every alias that reaches the command, primary first.
    pub all_aliases: Vec<String>,
    /// The primary node.
    #[serde(skip)]
    pub node: NodeId,
    /// Short description for listings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Long-form help text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extended_description: Option<String>,
}

/// Descriptions recorded alongside a mapping.
#[derive(Debug, Clone, Default)]
pub(crate) struct HelpText {
    pub(crate) short: Option<String>,
    pub(crate) extended: Option<String>,
}

/// How a requested alias resolved against the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AliasClaim {
    /// The alias is free and may be claimed.
    Free(String),
    /// The alias is the caller's own primary alias; the registration merges
    /// into the existing mapping at this index.
    Merge {
        /// The alias.
        alias: String,
        /// Index of the existing mapping.
        index: usize,
    },
}

impl AliasClaim {
    /// The effective alias.
    pub fn alias(&self) -> &str {
        match self {
            Self::Free(alias) | Self::Merge { alias, .. } => alias,
        }
    }
}

/// Alias → mapping table. Append-only.
#[derive(Debug, Clone, Default)]
pub struct CommandRegistry {
    mappings: Vec<CommandMapping>,
    by_alias: HashMap<String, usize>,
}

/// Lowercase and check an alias.
pub fn normalize_alias(alias: &str) -> Result<String, RegistrationError> {
    if alias.is_empty() || alias.chars().any(char::is_whitespace) {
        return Err(RegistrationError::InvalidAlias {
            alias: alias.to_string(),
        });
    }
    Ok(alias.to_lowercase())
}

impl CommandRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The mapping an alias belongs to.
    pub fn get(&self, alias: &str) -> Option<&CommandMapping> {
        let index = *self.by_alias.get(&alias.to_lowercase())?;
        self.mappings.get(index)
    }

    /// Owner of an alias.
    pub fn owner_of(&self, alias: &str) -> Option<&str> {
        self.get(alias).map(|m| m.owner.as_str())
    }

    /// Whether an alias is claimed.
    pub fn contains(&self, alias: &str) -> bool {
        self.by_alias.contains_key(&alias.to_lowercase())
    }

    /// All mappings in registration order.
    pub fn mappings(&self) -> &[CommandMapping] {
        &self.mappings
    }

    /// Number of mappings.
    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    /// Resolve the primary alias `owner` asked for.
    ///
    /// A free alias is granted as is. The owner's own primary alias merges.
    /// Anything else held by someone (another owner, or a secondary alias) is
    /// retried as `<owner><separator><alias>`; if that is held too, the claim
    /// fails.
    pub fn resolve_primary(
        &self,
        owner: &str,
        alias: &str,
        config: &DispatcherConfig,
    ) -> Result<AliasClaim, RegistrationError> {
        let alias = normalize_alias(alias)?;
        if let Some(claim) = self.try_claim(owner, &alias) {
            return Ok(claim);
        }
        let namespaced = normalize_alias(&config.namespaced(owner, &alias))?;
        if let Some(claim) = self.try_claim(owner, &namespaced) {
            debug!(owner, alias = %alias, namespaced = %namespaced, "alias taken, namespacing");
            return Ok(claim);
        }
        let holder = self.owner_of(&namespaced).unwrap_or_default().to_string();
        Err(RegistrationError::AliasClaimed {
            alias: namespaced,
            owner: holder,
        })
    }

    /// Resolve a secondary alias, namespacing it when taken. `None` when
    /// neither form is available.
    pub fn resolve_secondary(
        &self,
        owner: &str,
        alias: &str,
        config: &DispatcherConfig,
    ) -> Option<String> {
        let alias = normalize_alias(alias).ok()?;
        if !self.contains(&alias) {
            return Some(alias);
        }
        let namespaced = normalize_alias(&config.namespaced(owner, &alias)).ok()?;
        (!self.contains(&namespaced)).then_some(namespaced)
    }

    fn try_claim(&self, owner: &str, alias: &str) -> Option<AliasClaim> {
        match self.by_alias.get(alias) {
            None => Some(AliasClaim::Free(alias.to_string())),
            Some(&index) => {
                let existing = &self.mappings[index];
                (existing.owner == owner && existing.primary_alias == alias).then(|| {
                    AliasClaim::Merge {
                        alias: alias.to_string(),
                        index,
                    }
                })
            }
        }
    }

    /// Record a new mapping or extend the one being merged into, returning
    /// the stored mapping.
    pub(crate) fn record(
        &mut self,
        claim: &AliasClaim,
        owner: &str,
        node: NodeId,
        secondary: Vec<String>,
        help: HelpText,
    ) -> &CommandMapping {
        let index = match claim {
            AliasClaim::Merge { index, .. } => *index,
            AliasClaim::Free(alias) => {
                self.mappings.push(CommandMapping {
                    owner: owner.to_string(),
                    primary_alias: alias.clone(),
                    all_aliases: vec![alias.clone()],
                    node,
                    description: None,
                    extended_description: None,
                });
                let index = self.mappings.len() - 1;
                self.by_alias.insert(alias.clone(), index);
                index
            }
        };
        for alias in secondary {
            if self.by_alias.contains_key(&alias) {
                continue;
            }
            self.by_alias.insert(alias.clone(), index);
            self.mappings[index].all_aliases.push(alias);
        }
        let mapping = &mut self.mappings[index];
        if help.short.is_some() {
            mapping.description = help.short;
        }
        if help.extended.is_some() {
            mapping.extended_description = help.extended;
        }
        mapping
    }
}
