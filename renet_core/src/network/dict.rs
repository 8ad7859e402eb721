//! Dictionary storage strategy, each reaction maps to its species coefficients and each species
//! maps to the coefficients of the reactions it takes part in
use std::collections::BTreeSet;
use std::path::Path;

use indexmap::IndexMap;
use nalgebra::DMatrix;
use nalgebra_sparse::{CooMatrix, CscMatrix};

use crate::configuration;
use crate::io::sif::{SifError, SifOptions, SifTuple};
use crate::network::dense::{DenseNetwork, SifSource};
use crate::network::entities::NetworkCore;
use crate::network::renet::ReactionNetwork;
use crate::network::NetworkError;

type Coefficients = IndexMap<String, f64>;

/// Reaction network backed by two mirrored maps of non-zero coefficients
///
/// `reaction_data[r][s]` and `species_data[s][r]` always hold the same coefficient, zero
/// coefficients are never stored.
#[derive(Clone, Debug, PartialEq)]
pub struct DictNetwork {
    core: NetworkCore,
    reaction_data: IndexMap<String, Coefficients>,
    species_data: IndexMap<String, Coefficients>,
}

impl DictNetwork {
    /// Create a network from species names and reaction coefficient maps
    ///
    /// Species referenced by a reaction but absent from `species` are appended in order of
    /// first appearance.
    pub fn new(
        species: Vec<String>,
        reactions: &IndexMap<String, Coefficients>,
    ) -> Result<Self, NetworkError> {
        let mut network = Self::empty();
        network.add_species(species, None)?;
        network.add_reactions(reactions, None)?;
        Ok(network)
    }

    pub fn empty() -> Self {
        Self::empty_with_index(configuration::current().indexed)
    }

    pub fn empty_with_index(indexed: bool) -> Self {
        DictNetwork {
            core: NetworkCore::empty_with_index(indexed),
            reaction_data: IndexMap::new(),
            species_data: IndexMap::new(),
        }
    }

    pub fn from_sif(source: SifSource<'_>, options: &SifOptions) -> Result<Self, SifError> {
        Ok(Self::from(&DenseNetwork::from_sif(source, options)?))
    }

    pub fn from_sif_file<P: AsRef<Path>>(path: P, options: &SifOptions) -> Result<Self, SifError> {
        Ok(Self::from(&DenseNetwork::from_sif_file(path, options)?))
    }

    pub fn from_sif_list(tuples: &[SifTuple]) -> Result<Self, SifError> {
        Ok(Self::from(&DenseNetwork::from_sif_list(tuples)?))
    }

    /// Coefficients of a reaction, keyed by species name
    pub fn reaction_coefficients(&self, reaction: &str) -> Option<&Coefficients> {
        self.reaction_data.get(reaction)
    }

    /// Coefficients of a species in the reactions it takes part in, keyed by reaction name
    pub fn species_coefficients(&self, species: &str) -> Option<&Coefficients> {
        self.species_data.get(species)
    }

    /// Dense copy of the network, names and property values included
    pub fn to_dense(&self) -> DenseNetwork {
        DenseNetwork::from_parts(self.core.clone(), self.stoichiometry())
    }

    fn filter_reaction(&self, reaction_id: usize, keep: impl Fn(f64) -> bool) -> BTreeSet<usize> {
        let Some(coefficients) = self
            .core
            .reactions()
            .name(reaction_id)
            .and_then(|r| self.reaction_data.get(r))
        else {
            return BTreeSet::new();
        };
        coefficients
            .iter()
            .filter(|(_, c)| keep(**c))
            .filter_map(|(s, _)| self.core.species().get_id(s).ok())
            .collect()
    }

    fn filter_species(&self, species_id: usize, keep: impl Fn(f64) -> bool) -> BTreeSet<usize> {
        let Some(coefficients) = self
            .core
            .species()
            .name(species_id)
            .and_then(|s| self.species_data.get(s))
        else {
            return BTreeSet::new();
        };
        coefficients
            .iter()
            .filter(|(_, c)| keep(**c))
            .filter_map(|(r, _)| self.core.reactions().get_id(r).ok())
            .collect()
    }

    /// (species id, reaction id, coefficient) of every stored coefficient
    fn triplets(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        self.core
            .reactions()
            .iter()
            .enumerate()
            .filter_map(move |(j, r)| self.reaction_data.get(r).map(|c| (j, c)))
            .flat_map(move |(j, coefficients)| {
                coefficients.iter().filter_map(move |(s, c)| {
                    self.core.species().get_id(s).ok().map(|i| (i, j, *c))
                })
            })
    }
}

impl From<&DenseNetwork> for DictNetwork {
    fn from(dense: &DenseNetwork) -> Self {
        let matrix = dense.matrix();
        let species = dense.species().as_slice();
        let mut reaction_data: IndexMap<String, Coefficients> =
            IndexMap::with_capacity(dense.num_reactions());
        let mut species_data: IndexMap<String, Coefficients> = species
            .iter()
            .map(|s| (s.clone(), Coefficients::new()))
            .collect();
        for (j, reaction) in dense.reactions().iter().enumerate() {
            let mut coefficients = Coefficients::new();
            for (i, c) in matrix.column(j).iter().enumerate() {
                if *c != 0. {
                    coefficients.insert(species[i].clone(), *c);
                    if let Some(entry) = species_data.get_mut(&species[i]) {
                        entry.insert(reaction.to_string(), *c);
                    }
                }
            }
            reaction_data.insert(reaction.to_string(), coefficients);
        }
        DictNetwork {
            core: dense.core().clone(),
            reaction_data,
            species_data,
        }
    }
}

impl From<&DictNetwork> for DenseNetwork {
    fn from(dict: &DictNetwork) -> Self {
        dict.to_dense()
    }
}

impl ReactionNetwork for DictNetwork {
    fn core(&self) -> &NetworkCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut NetworkCore {
        &mut self.core
    }

    fn stoichiometry(&self) -> DMatrix<f64> {
        let mut matrix = DMatrix::zeros(self.num_species(), self.num_reactions());
        for (i, j, c) in self.triplets() {
            matrix[(i, j)] = c;
        }
        matrix
    }

    fn sparse_stoichiometry(&self) -> CscMatrix<f64> {
        let mut coo = CooMatrix::new(self.num_species(), self.num_reactions());
        for (i, j, c) in self.triplets() {
            coo.push(i, j, c);
        }
        CscMatrix::from(&coo)
    }

    fn reactants_of_reaction(&self, reaction_id: usize) -> BTreeSet<usize> {
        self.filter_reaction(reaction_id, |c| c < 0.)
    }

    fn products_of_reaction(&self, reaction_id: usize) -> BTreeSet<usize> {
        self.filter_reaction(reaction_id, |c| c > 0.)
    }

    fn reactions_with_product(&self, species_id: usize) -> BTreeSet<usize> {
        self.filter_species(species_id, |c| c > 0.)
    }

    fn reactions_with_reactant(&self, species_id: usize) -> BTreeSet<usize> {
        self.filter_species(species_id, |c| c < 0.)
    }

    fn restrict_to_reactions(&self, reaction_ids: &[usize]) -> Result<Self, NetworkError> {
        let reactions = self.core.reactions();
        reactions.check_selection(reaction_ids)?;
        let kept: Vec<&str> = reaction_ids
            .iter()
            .filter_map(|&r| reactions.name(r))
            .collect();
        let involved: BTreeSet<usize> = kept
            .iter()
            .filter_map(|r| self.reaction_data.get(*r))
            .flat_map(|c| c.keys())
            .filter_map(|s| self.core.species().get_id(s).ok())
            .collect();
        let species_ids: Vec<usize> = involved.into_iter().collect();

        let reaction_data: IndexMap<String, Coefficients> = kept
            .iter()
            .map(|r| {
                let coefficients = self.reaction_data.get(*r).cloned().unwrap_or_default();
                (r.to_string(), coefficients)
            })
            .collect();
        let species_data: IndexMap<String, Coefficients> = species_ids
            .iter()
            .filter_map(|&s| self.core.species().name(s))
            .map(|s| {
                let coefficients: Coefficients = self
                    .species_data
                    .get(s)
                    .map(|c| {
                        c.iter()
                            .filter(|(r, _)| reaction_data.contains_key(r.as_str()))
                            .map(|(r, v)| (r.clone(), *v))
                            .collect()
                    })
                    .unwrap_or_default();
                (s.to_string(), coefficients)
            })
            .collect();

        Ok(DictNetwork {
            core: self.core.select(&species_ids, reaction_ids)?,
            reaction_data,
            species_data,
        })
    }

    fn grow_species(&mut self, names: &[String]) {
        for name in names {
            self.species_data.entry(name.clone()).or_default();
        }
    }

    fn grow_reaction(
        &mut self,
        name: &str,
        coefficients: &IndexMap<String, f64>,
    ) -> Result<(), NetworkError> {
        let new_species: Vec<String> = coefficients
            .keys()
            .filter(|s| !self.core.species().contains(s.as_str()))
            .cloned()
            .collect();
        if !new_species.is_empty() {
            self.add_species(new_species, None)?;
        }
        let stored = self.reaction_data.entry(name.to_string()).or_default();
        for (species, coefficient) in coefficients.iter().filter(|(_, c)| **c != 0.) {
            stored.insert(species.clone(), *coefficient);
            self.species_data
                .entry(species.clone())
                .or_default()
                .insert(name.to_string(), *coefficient);
        }
        Ok(())
    }
}
