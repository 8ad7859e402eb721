//! Process wide defaults used when constructing networks and reading files
use std::sync::{LazyLock, RwLock};

pub static CONFIGURATION: LazyLock<RwLock<Configuration>> =
    LazyLock::new(|| RwLock::new(Configuration::default()));

#[derive(Clone, Debug, PartialEq)]
pub struct Configuration {
    /// Whether newly created networks keep name to id maps for O(1) lookup
    pub indexed: bool,
    /// Prefix used to name species when a stoichiometric matrix is given without names
    pub species_prefix: String,
    /// Prefix used to name reactions when a stoichiometric matrix is given without names
    pub reaction_prefix: String,
    /// Default column delimiter of SIF files
    pub sif_delimiter: char,
    /// Whether interactions from a species to itself are dropped when reading SIF files
    pub discard_self_loops: bool,
}

impl Default for Configuration {
    fn default() -> Self {
        Configuration {
            indexed: true,
            species_prefix: "S".to_string(),
            reaction_prefix: "R".to_string(),
            sif_delimiter: '\t',
            discard_self_loops: true,
        }
    }
}

/// Snapshot of the current configuration
///
/// Falls back to the default configuration if the lock has been poisoned.
pub fn current() -> Configuration {
    CONFIGURATION
        .read()
        .map(|c| c.clone())
        .unwrap_or_default()
}
