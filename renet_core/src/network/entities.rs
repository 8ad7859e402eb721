//! State shared by every storage strategy: species and reaction names plus property values
use crate::configuration;
use crate::network::names::Names;
use crate::network::properties::{Properties, PropertyStore};
use crate::network::{EntityKind, NetworkError};

/// Species names, reaction names and property values of a network
///
/// Readable by anyone, only mutated through the [`crate::network::ReactionNetwork`] operations
/// so that names, ids and storage stay consistent.
#[derive(Clone, Debug, PartialEq)]
pub struct NetworkCore {
    species: Names,
    reactions: Names,
    properties: PropertyStore,
}

impl NetworkCore {
    /// Create a new core
    ///
    /// # Errors
    /// [`NetworkError::DuplicateEntity`] if a species or reaction name is repeated
    pub fn new(
        species: Vec<String>,
        reactions: Vec<String>,
        indexed: bool,
    ) -> Result<Self, NetworkError> {
        Ok(NetworkCore {
            species: Names::new(EntityKind::Species, species, indexed)?,
            reactions: Names::new(EntityKind::Reaction, reactions, indexed)?,
            properties: PropertyStore::new(),
        })
    }

    /// Core without species or reactions, indexing according to the current configuration
    pub fn empty() -> Self {
        Self::empty_with_index(configuration::current().indexed)
    }

    /// Core without species or reactions
    pub fn empty_with_index(indexed: bool) -> Self {
        NetworkCore {
            species: Names::empty(EntityKind::Species, indexed),
            reactions: Names::empty(EntityKind::Reaction, indexed),
            properties: PropertyStore::new(),
        }
    }

    pub fn species(&self) -> &Names {
        &self.species
    }

    pub fn reactions(&self) -> &Names {
        &self.reactions
    }

    pub fn property_store(&self) -> &PropertyStore {
        &self.properties
    }

    /// Property values can be edited freely, they are keyed by the current ids
    pub fn property_store_mut(&mut self) -> &mut PropertyStore {
        &mut self.properties
    }

    pub fn properties(&self) -> Properties<'_> {
        Properties::new(&self.species, &self.reactions, &self.properties)
    }

    pub(crate) fn species_mut(&mut self) -> &mut Names {
        &mut self.species
    }

    pub(crate) fn reactions_mut(&mut self) -> &mut Names {
        &mut self.reactions
    }

    pub(crate) fn set_property_store(&mut self, properties: PropertyStore) {
        self.properties = properties;
    }

    /// Renumbered core holding only the given species and reactions, in the given order
    ///
    /// # Errors
    /// [`NetworkError::InvalidArgument`] if an id is out of range or listed twice
    pub(crate) fn select(
        &self,
        species_ids: &[usize],
        reaction_ids: &[usize],
    ) -> Result<NetworkCore, NetworkError> {
        Ok(NetworkCore {
            species: self.species.select(species_ids)?,
            reactions: self.reactions.select(reaction_ids)?,
            properties: self.properties.select(species_ids, reaction_ids),
        })
    }
}
