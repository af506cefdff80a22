//! Which units, besides the main one, take part in a run.

use crate::migration::{ConfigurationResolver, MigrationError};

/// Selection mode of a migrate run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    /// Only the main unit.
    #[default]
    MainOnly,
    /// The main unit plus these aliases, in this order.
    Explicit(Vec<String>),
    /// The main unit plus every registered bundle whose host module is loaded.
    AllRegistered,
}

impl Selection {
    /// Build a selection from the `--include-bundles` flag and the
    /// `--include-bundle` values. Supplying both is an error.
    pub fn from_flags(include_all: bool, aliases: Vec<String>) -> Result<Self, MigrationError> {
        let aliases: Vec<String> = aliases
            .into_iter()
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .collect();

        match (include_all, aliases.is_empty()) {
            (true, false) => Err(MigrationError::InvalidSelection),
            (true, true) => Ok(Self::AllRegistered),
            (false, false) => Ok(Self::Explicit(aliases)),
            (false, true) => Ok(Self::MainOnly),
        }
    }

    /// Aliases of the additional units, in execution order.
    ///
    /// Repeated aliases of an explicit list are kept once, at their first
    /// position.
    pub fn aliases(&self, resolver: &ConfigurationResolver) -> Vec<String> {
        match self {
            Self::MainOnly => Vec::new(),
            Self::Explicit(aliases) => {
                let mut unique: Vec<String> = Vec::with_capacity(aliases.len());
                for alias in aliases {
                    if !unique.contains(alias) {
                        unique.push(alias.clone());
                    }
                }
                unique
            }
            Self::AllRegistered => resolver.loaded_aliases(),
        }
    }
}
