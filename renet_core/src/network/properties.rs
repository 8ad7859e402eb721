//! Sparse per species and per reaction values attached to a network
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::network::names::Names;
use crate::network::{EntityRef, NetworkError};

/// Sparse id to value maps for species and reactions
///
/// The store is keyed by integer ids, so it has to be rebuilt with [`PropertyStore::select`]
/// whenever the owning network is renumbered.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyStore {
    species_values: IndexMap<usize, f64>,
    reaction_values: IndexMap<usize, f64>,
}

impl PropertyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_values(
        species_values: IndexMap<usize, f64>,
        reaction_values: IndexMap<usize, f64>,
    ) -> Self {
        PropertyStore {
            species_values,
            reaction_values,
        }
    }

    /// Value of a species, or `default` if none was set
    pub fn species_value(&self, species_id: usize, default: f64) -> f64 {
        self.species_values
            .get(&species_id)
            .copied()
            .unwrap_or(default)
    }

    /// Value of a reaction, or `default` if none was set
    pub fn reaction_value(&self, reaction_id: usize, default: f64) -> f64 {
        self.reaction_values
            .get(&reaction_id)
            .copied()
            .unwrap_or(default)
    }

    /// Set the value of a species, returning the previous value if there was one
    pub fn set_species_value(&mut self, species_id: usize, value: f64) -> Option<f64> {
        self.species_values.insert(species_id, value)
    }

    /// Set the value of a reaction, returning the previous value if there was one
    pub fn set_reaction_value(&mut self, reaction_id: usize, value: f64) -> Option<f64> {
        self.reaction_values.insert(reaction_id, value)
    }

    pub fn species_entries(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.species_values.iter().map(|(k, v)| (*k, *v))
    }

    pub fn reaction_entries(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.reaction_values.iter().map(|(k, v)| (*k, *v))
    }

    /// Build a fresh store for a renumbered network
    ///
    /// Entry `i` of the new store holds the value the old store had for `species[i]`
    /// (respectively `reactions[i]`). Ids not listed are dropped, ids without a value stay absent.
    pub fn select(&self, species: &[usize], reactions: &[usize]) -> PropertyStore {
        PropertyStore {
            species_values: remap(&self.species_values, species),
            reaction_values: remap(&self.reaction_values, reactions),
        }
    }
}

fn remap(values: &IndexMap<usize, f64>, old_ids: &[usize]) -> IndexMap<usize, f64> {
    old_ids
        .iter()
        .enumerate()
        .filter_map(|(new_id, old_id)| values.get(old_id).map(|v| (new_id, *v)))
        .collect()
}

/// Read access to a network's property values, resolving names through the network
///
/// Borrows both the store and the network's name tables, it never owns the network.
#[derive(Clone, Copy, Debug)]
pub struct Properties<'a> {
    species: &'a Names,
    reactions: &'a Names,
    store: &'a PropertyStore,
}

impl<'a> Properties<'a> {
    pub(crate) fn new(species: &'a Names, reactions: &'a Names, store: &'a PropertyStore) -> Self {
        Properties {
            species,
            reactions,
            store,
        }
    }

    /// Underlying id keyed store
    pub fn store(&self) -> &'a PropertyStore {
        self.store
    }

    /// Value of a species given by id or name
    ///
    /// # Errors
    /// [`NetworkError::NotFound`] if a name is given that is not a species of the network
    pub fn species_value<E: Into<EntityRef>>(
        &self,
        species: E,
        default: f64,
    ) -> Result<f64, NetworkError> {
        let id = match species.into() {
            EntityRef::Id(id) => id,
            EntityRef::Name(name) => self.species.get_id(&name)?,
        };
        Ok(self.store.species_value(id, default))
    }

    /// Values of the given species ids, or of every species if `species_ids` is None
    pub fn species_values(&self, species_ids: Option<&[usize]>, default: f64) -> Vec<f64> {
        match species_ids {
            Some(ids) => ids
                .iter()
                .map(|id| self.store.species_value(*id, default))
                .collect(),
            None => (0..self.species.len())
                .map(|id| self.store.species_value(id, default))
                .collect(),
        }
    }

    /// Value of a reaction given by id or name
    ///
    /// # Errors
    /// [`NetworkError::NotFound`] if a name is given that is not a reaction of the network
    pub fn reaction_value<E: Into<EntityRef>>(
        &self,
        reaction: E,
        default: f64,
    ) -> Result<f64, NetworkError> {
        let id = match reaction.into() {
            EntityRef::Id(id) => id,
            EntityRef::Name(name) => self.reactions.get_id(&name)?,
        };
        Ok(self.store.reaction_value(id, default))
    }

    /// Values of the given reaction ids, or of every reaction if `reaction_ids` is None
    pub fn reaction_values(&self, reaction_ids: Option<&[usize]>, default: f64) -> Vec<f64> {
        match reaction_ids {
            Some(ids) => ids
                .iter()
                .map(|id| self.store.reaction_value(*id, default))
                .collect(),
            None => (0..self.reactions.len())
                .map(|id| self.store.reaction_value(id, default))
                .collect(),
        }
    }
}
