//! The [`ReactionNetwork`] trait, implemented by every storage strategy
//!
//! Storage strategies supply the stoichiometry, the four sign based traversal primitives and
//! the three mutators (`restrict_to_reactions`, `grow_species`, `grow_reaction`). Everything
//! else (insertion, lookup, traversal, breadth first search, selection and pruning) is built
//! here from those primitives.
use std::collections::BTreeSet;

use indexmap::{IndexMap, IndexSet};
use nalgebra::DMatrix;
use nalgebra_sparse::convert::serial::convert_dense_csc;
use nalgebra_sparse::CscMatrix;
use petgraph::graph::DiGraph;
use tracing::{debug, trace};

use crate::network::entities::NetworkCore;
use crate::network::graph_view::{self, NetworkNode};
use crate::network::names::Names;
use crate::network::properties::{Properties, PropertyStore};
use crate::network::{EntityKind, EntityRef, IdType, NetworkError};

/// A bipartite network of species and reactions linked by signed stoichiometric coefficients
///
/// Negative coefficients mark reactants (consumed species), positive coefficients mark
/// products. Species and reactions are identified by their position in the ordered name
/// tables, any operation that removes entities returns a renumbered network.
///
/// Mutators come in pairs: `add_*` mutates the network in place, `with_*` works on a copy
/// and leaves the receiver untouched.
///
/// # Examples
/// ```rust
/// use indexmap::IndexMap;
/// use renet_core::network::{DenseNetwork, EntityRef, IdType, ReactionNetwork};
/// let mut network = DenseNetwork::empty();
/// let r1: IndexMap<String, f64> = [("A".to_string(), -1.0), ("B".to_string(), 1.0)].into();
/// let r2: IndexMap<String, f64> = [("B".to_string(), -1.0), ("C".to_string(), 1.0)].into();
/// network.add_reaction("R1", &r1, None).unwrap();
/// network.add_reaction("R2", &r2, None).unwrap();
/// let pruned = network
///     .prune(&[EntityRef::from("A")], &[EntityRef::from("C")], IdType::Species)
///     .unwrap();
/// assert_eq!(pruned.num_reactions(), 2);
/// ```
pub trait ReactionNetwork: Clone {
    // region Storage primitives
    /// Names and property values of the network
    fn core(&self) -> &NetworkCore;

    /// Mutable access to the names and property values of the network
    fn core_mut(&mut self) -> &mut NetworkCore;

    /// Stoichiometric matrix, rows are species and columns are reactions
    fn stoichiometry(&self) -> DMatrix<f64>;

    /// Species with a negative coefficient in the reaction
    ///
    /// These four primitives return an empty set for an id out of range.
    fn reactants_of_reaction(&self, reaction_id: usize) -> BTreeSet<usize>;

    /// Species with a positive coefficient in the reaction
    fn products_of_reaction(&self, reaction_id: usize) -> BTreeSet<usize>;

    /// Reactions in which the species has a positive coefficient
    fn reactions_with_product(&self, species_id: usize) -> BTreeSet<usize>;

    /// Reactions in which the species has a negative coefficient
    fn reactions_with_reactant(&self, species_id: usize) -> BTreeSet<usize>;

    /// New network holding only the given reactions, in the given order, and the species
    /// still involved in at least one of them. Property values follow their entities.
    ///
    /// # Errors
    /// [`NetworkError::InvalidArgument`] if a reaction id is out of range or listed twice
    fn restrict_to_reactions(&self, reaction_ids: &[usize]) -> Result<Self, NetworkError>;

    /// Grow the storage for species which were just appended to the species names
    fn grow_species(&mut self, names: &[String]);

    /// Store the coefficients of a reaction which was just appended to the reaction names
    ///
    /// Species named in `coefficients` which are not yet part of the network must be added
    /// before the coefficients are written.
    fn grow_reaction(
        &mut self,
        name: &str,
        coefficients: &IndexMap<String, f64>,
    ) -> Result<(), NetworkError>;
    // endregion Storage primitives

    // region Accessors
    fn species(&self) -> &Names {
        self.core().species()
    }

    fn reactions(&self) -> &Names {
        self.core().reactions()
    }

    /// Names of species or reactions, depending on `id_type`
    fn entities(&self, id_type: IdType) -> &Names {
        match id_type {
            IdType::Species => self.species(),
            IdType::Reaction => self.reactions(),
        }
    }

    fn num_species(&self) -> usize {
        self.species().len()
    }

    fn num_reactions(&self) -> usize {
        self.reactions().len()
    }

    /// Property values of the network, resolving names through the network
    fn properties(&self) -> Properties<'_> {
        self.core().properties()
    }

    fn property_store(&self) -> &PropertyStore {
        self.core().property_store()
    }

    fn property_store_mut(&mut self) -> &mut PropertyStore {
        self.core_mut().property_store_mut()
    }

    /// Stoichiometric matrix in compressed sparse column format
    fn sparse_stoichiometry(&self) -> CscMatrix<f64> {
        convert_dense_csc(&self.stoichiometry())
    }

    /// Graph view of the network (or of the given reactions) for export and rendering
    ///
    /// See [`graph_view`] for the layout of the graph.
    fn to_graph(
        &self,
        reactions: Option<&[EntityRef]>,
    ) -> Result<DiGraph<NetworkNode, f64>, NetworkError> {
        let reaction_ids = match reactions {
            Some(refs) => self.get_ids(refs, IdType::Reaction)?,
            None => (0..self.num_reactions()).collect(),
        };
        Ok(graph_view::build(self, &reaction_ids))
    }
    // endregion Accessors

    // region Mutation
    /// Add new species to the network
    ///
    /// # Parameters
    /// - `names`: Names of the new species
    /// - `values`: Optional property values keyed by species name (new or existing species)
    ///
    /// # Errors
    /// - [`NetworkError::DuplicateEntity`] if a name already exists or is repeated
    /// - [`NetworkError::NotFound`] if `values` names an unknown species
    ///
    /// Nothing is modified when an error is returned.
    fn add_species<I, S>(
        &mut self,
        names: I,
        values: Option<&IndexMap<String, f64>>,
    ) -> Result<&mut Self, NetworkError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let mut pending: IndexSet<&str> = IndexSet::with_capacity(names.len());
        for name in &names {
            if self.species().contains(name) || !pending.insert(name.as_str()) {
                return Err(NetworkError::duplicate(EntityKind::Species, name));
            }
        }
        if let Some(values) = values {
            if let Some(missing) = values
                .keys()
                .find(|k| !self.species().contains(k.as_str()) && !pending.contains(k.as_str()))
            {
                return Err(NetworkError::not_found(EntityKind::Species, missing));
            }
        }

        for name in &names {
            self.core_mut().species_mut().push(name.clone());
        }
        self.grow_species(&names);
        if let Some(values) = values {
            for (name, value) in values {
                let id = self.get_species_id(name)?;
                self.property_store_mut().set_species_value(id, *value);
            }
        }
        trace!(added = names.len(), total = self.num_species(), "added species");
        Ok(self)
    }

    /// Copy of the network with the species added, see [`ReactionNetwork::add_species`]
    fn with_species<I, S>(
        &self,
        names: I,
        values: Option<&IndexMap<String, f64>>,
    ) -> Result<Self, NetworkError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut network = self.clone();
        network.add_species(names, values)?;
        Ok(network)
    }

    /// Add a reaction to the network
    ///
    /// # Parameters
    /// - `name`: Name of the new reaction
    /// - `coefficients`: Map of species name to stoichiometric coefficient, species which are
    ///   not yet in the network are appended to it
    /// - `value`: Optional property value of the reaction
    ///
    /// # Errors
    /// [`NetworkError::DuplicateEntity`] if a reaction with this name already exists
    fn add_reaction(
        &mut self,
        name: &str,
        coefficients: &IndexMap<String, f64>,
        value: Option<f64>,
    ) -> Result<&mut Self, NetworkError> {
        if self.reactions().contains(name) {
            return Err(NetworkError::duplicate(EntityKind::Reaction, name));
        }
        let id = self.core_mut().reactions_mut().push(name.to_string());
        self.grow_reaction(name, coefficients)?;
        if let Some(value) = value {
            self.property_store_mut().set_reaction_value(id, value);
        }
        trace!(reaction = name, id, "added reaction");
        Ok(self)
    }

    /// Copy of the network with the reaction added, see [`ReactionNetwork::add_reaction`]
    fn with_reaction(
        &self,
        name: &str,
        coefficients: &IndexMap<String, f64>,
        value: Option<f64>,
    ) -> Result<Self, NetworkError> {
        let mut network = self.clone();
        network.add_reaction(name, coefficients, value)?;
        Ok(network)
    }

    /// Add several reactions at once
    ///
    /// # Parameters
    /// - `reactions`: Map of reaction name to its coefficient map
    /// - `values`: Optional property values keyed by the names of the new reactions
    ///
    /// # Errors
    /// - [`NetworkError::DuplicateEntity`] if a reaction already exists
    /// - [`NetworkError::NotFound`] if `values` names a reaction which is not being added
    ///
    /// Nothing is modified when an error is returned.
    fn add_reactions(
        &mut self,
        reactions: &IndexMap<String, IndexMap<String, f64>>,
        values: Option<&IndexMap<String, f64>>,
    ) -> Result<&mut Self, NetworkError> {
        if let Some(existing) = reactions.keys().find(|r| self.reactions().contains(r)) {
            return Err(NetworkError::duplicate(EntityKind::Reaction, existing));
        }
        if let Some(values) = values {
            if let Some(missing) = values.keys().find(|r| !reactions.contains_key(*r)) {
                return Err(NetworkError::not_found(EntityKind::Reaction, missing));
            }
        }
        for (name, coefficients) in reactions {
            let value = values.and_then(|v| v.get(name)).copied();
            self.add_reaction(name, coefficients, value)?;
        }
        Ok(self)
    }

    /// Copy of the network with the reactions added, see [`ReactionNetwork::add_reactions`]
    fn with_reactions(
        &self,
        reactions: &IndexMap<String, IndexMap<String, f64>>,
        values: Option<&IndexMap<String, f64>>,
    ) -> Result<Self, NetworkError> {
        let mut network = self.clone();
        network.add_reactions(reactions, values)?;
        Ok(network)
    }
    // endregion Mutation

    // region Lookup
    /// Id of a species, O(1) when the network is indexed and a linear scan otherwise
    fn get_species_id(&self, name: &str) -> Result<usize, NetworkError> {
        self.species().get_id(name)
    }

    fn get_species_ids<I, S>(&self, names: I) -> Result<Vec<usize>, NetworkError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names
            .into_iter()
            .map(|n| self.get_species_id(n.as_ref()))
            .collect()
    }

    /// Id of a reaction, O(1) when the network is indexed and a linear scan otherwise
    fn get_reaction_id(&self, name: &str) -> Result<usize, NetworkError> {
        self.reactions().get_id(name)
    }

    fn get_reaction_ids<I, S>(&self, names: I) -> Result<Vec<usize>, NetworkError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names
            .into_iter()
            .map(|n| self.get_reaction_id(n.as_ref()))
            .collect()
    }

    /// Resolve a mix of ids and names into ids of the given type
    ///
    /// # Errors
    /// [`NetworkError::NotFound`] for unknown names, [`NetworkError::InvalidArgument`] for ids
    /// out of range
    fn get_ids(&self, refs: &[EntityRef], id_type: IdType) -> Result<Vec<usize>, NetworkError> {
        let names = self.entities(id_type);
        refs.iter().map(|r| names.resolve(r)).collect()
    }

    fn species_names(&self, species_ids: &[usize]) -> Result<Vec<&str>, NetworkError> {
        species_ids
            .iter()
            .map(|id| self.species().name_of(*id))
            .collect()
    }

    fn reaction_names(&self, reaction_ids: &[usize]) -> Result<Vec<&str>, NetworkError> {
        reaction_ids
            .iter()
            .map(|id| self.reactions().name_of(*id))
            .collect()
    }
    // endregion Lookup

    // region Traversal
    /// Union of the reactants of the given reactions (of all reactions if None)
    fn get_reactants(&self, reaction_ids: Option<&[usize]>) -> Result<BTreeSet<usize>, NetworkError> {
        match reaction_ids {
            Some(ids) => {
                self.reactions().check_ids(ids)?;
                Ok(reactants_of(self, ids.iter().copied()))
            }
            None => Ok(reactants_of(self, 0..self.num_reactions())),
        }
    }

    /// Union of the products of the given reactions (of all reactions if None)
    fn get_products(&self, reaction_ids: Option<&[usize]>) -> Result<BTreeSet<usize>, NetworkError> {
        match reaction_ids {
            Some(ids) => {
                self.reactions().check_ids(ids)?;
                Ok(products_of(self, ids.iter().copied()))
            }
            None => Ok(products_of(self, 0..self.num_reactions())),
        }
    }

    /// Reactions producing any of the given species
    fn get_reactions_with_products(
        &self,
        species_ids: &[usize],
    ) -> Result<BTreeSet<usize>, NetworkError> {
        self.species().check_ids(species_ids)?;
        Ok(producing(self, species_ids.iter().copied()))
    }

    /// Reactions consuming any of the given species
    fn get_reactions_with_reactants(
        &self,
        species_ids: &[usize],
    ) -> Result<BTreeSet<usize>, NetworkError> {
        self.species().check_ids(species_ids)?;
        Ok(consuming(self, species_ids.iter().copied()))
    }

    /// Reactions with any of the given products combined with reactions with any of the given
    /// reactants
    ///
    /// With both sets given, `union` selects between the union and the intersection of the
    /// two matches. With a single set given, the matches of that set are returned whatever the
    /// value of `union`. With neither, every reaction id is returned.
    fn get_reactions(
        &self,
        reactant_ids: Option<&[usize]>,
        product_ids: Option<&[usize]>,
        union: bool,
    ) -> Result<BTreeSet<usize>, NetworkError> {
        let reactants = reactant_ids
            .map(|ids| checked_set(self.species(), ids))
            .transpose()?;
        let products = product_ids
            .map(|ids| checked_set(self.species(), ids))
            .transpose()?;
        Ok(matching_reactions(
            self,
            reactants.as_ref(),
            products.as_ref(),
            union,
        ))
    }

    /// One hop expansion over the bipartite layering
    ///
    /// For reactions, the successors are the reactions consuming something the given
    /// reactions produce (reversed: producing something they consume). For species, the
    /// successors are the species produced by reactions consuming the given species
    /// (reversed: consumed by reactions producing them).
    fn successors(
        &self,
        ids: &[usize],
        id_type: IdType,
        rev: bool,
    ) -> Result<BTreeSet<usize>, NetworkError> {
        self.entities(id_type).check_ids(ids)?;
        Ok(successors_of(self, ids.iter().copied(), id_type, rev))
    }

    /// Multi source breadth first search over [`ReactionNetwork::successors`]
    ///
    /// # Returns
    /// Map of every reached id to the layer at which it was first reached, the seeds being
    /// layer 0. Entries are ordered by discovery.
    fn bfs(
        &self,
        ids: &[EntityRef],
        id_type: IdType,
        rev: bool,
    ) -> Result<IndexMap<usize, usize>, NetworkError> {
        let seeds = self.get_ids(ids, id_type)?;
        let mut visited: IndexMap<usize, usize> = IndexMap::with_capacity(seeds.len());
        for seed in seeds {
            visited.entry(seed).or_insert(0);
        }
        let mut frontier: Vec<usize> = visited.keys().copied().collect();
        let mut layer = 0;
        while !frontier.is_empty() {
            layer += 1;
            frontier = successors_of(self, frontier, id_type, rev)
                .into_iter()
                .filter(|id| !visited.contains_key(id))
                .collect();
            for id in &frontier {
                visited.insert(*id, layer);
            }
            trace!(layer, discovered = frontier.len(), "bfs layer");
        }
        Ok(visited)
    }
    // endregion Traversal

    // region Selection
    /// Sub network lying on paths from the sources to the targets
    ///
    /// Intersects what is forward reachable from `source` with what is backward reachable from
    /// `target`. For species ids, the kept reactions are those with a reactant and a product in
    /// that intersection. For reaction ids, the reachable reactions are kept directly.
    fn prune(
        &self,
        source: &[EntityRef],
        target: &[EntityRef],
        id_type: IdType,
    ) -> Result<Self, NetworkError> {
        let forward: BTreeSet<usize> = self.bfs(source, id_type, false)?.into_keys().collect();
        let backward: BTreeSet<usize> = self.bfs(target, id_type, true)?.into_keys().collect();
        let reachable: BTreeSet<usize> = forward.intersection(&backward).copied().collect();
        let reactions = match id_type {
            IdType::Species => {
                matching_reactions(self, Some(&reachable), Some(&reachable), false)
            }
            IdType::Reaction => reachable.clone(),
        };
        debug!(
            forward = forward.len(),
            backward = backward.len(),
            reachable = reachable.len(),
            reactions = reactions.len(),
            "pruned network"
        );
        let reactions: Vec<usize> = reactions.into_iter().collect();
        self.restrict_to_reactions(&reactions)
    }

    /// Sub network made of the given reactions, grown by `neighborhood` rounds
    ///
    /// Each round adds the reactions sharing a species (as reactant or product) with the
    /// reactions added in the previous round. Species and reactions are renumbered, reactions
    /// keep their relative order.
    fn select_reactions(&self, ids: &[usize], neighborhood: usize) -> Result<Self, NetworkError> {
        let mut selected = checked_set(self.reactions(), ids)?;
        let mut frontier = selected.clone();
        for round in 0..neighborhood {
            let species = species_of(self, frontier.iter().copied());
            frontier = matching_reactions(self, Some(&species), Some(&species), true)
                .difference(&selected)
                .copied()
                .collect();
            if frontier.is_empty() {
                trace!(round, "neighborhood expansion reached a fixed point");
                break;
            }
            selected.extend(frontier.iter().copied());
        }
        debug!(
            seeds = ids.len(),
            neighborhood,
            selected = selected.len(),
            "selected reactions"
        );
        let selected: Vec<usize> = selected.into_iter().collect();
        self.restrict_to_reactions(&selected)
    }

    /// Sub network made of the reactions involving the given species, see
    /// [`ReactionNetwork::get_reactions`] for how the two sets combine
    ///
    /// Each of the `neighborhood` rounds adds the species of the newly selected reactions to
    /// the given sets before matching again.
    ///
    /// # Errors
    /// [`NetworkError::InvalidArgument`] if neither set is given and `neighborhood` > 0
    fn select_species(
        &self,
        reactant_ids: Option<&[usize]>,
        product_ids: Option<&[usize]>,
        union: bool,
        neighborhood: usize,
    ) -> Result<Self, NetworkError> {
        if reactant_ids.is_none() && product_ids.is_none() {
            if neighborhood > 0 {
                return Err(NetworkError::InvalidArgument(
                    "at least one of reactant_ids or product_ids must be given to expand a neighborhood"
                        .to_string(),
                ));
            }
            return Ok(self.clone());
        }
        let mut reactants = reactant_ids
            .map(|ids| checked_set(self.species(), ids))
            .transpose()?;
        let mut products = product_ids
            .map(|ids| checked_set(self.species(), ids))
            .transpose()?;

        let mut reactions = matching_reactions(self, reactants.as_ref(), products.as_ref(), union);
        let mut frontier = reactions.clone();
        for _ in 0..neighborhood {
            let species = species_of(self, frontier.iter().copied());
            for seeds in [reactants.as_mut(), products.as_mut()].into_iter().flatten() {
                seeds.extend(species.iter().copied());
            }
            frontier = matching_reactions(self, reactants.as_ref(), products.as_ref(), union)
                .difference(&reactions)
                .copied()
                .collect();
            if frontier.is_empty() {
                break;
            }
            reactions.extend(frontier.iter().copied());
        }
        debug!(neighborhood, selected = reactions.len(), "selected species");
        let reactions: Vec<usize> = reactions.into_iter().collect();
        self.restrict_to_reactions(&reactions)
    }

    /// Uniform entry point selecting by species or reaction, given as ids or names
    ///
    /// Species are matched both as reactants and as products.
    fn select(
        &self,
        ids: &[EntityRef],
        id_type: IdType,
        neighborhood: usize,
    ) -> Result<Self, NetworkError> {
        let ids = self.get_ids(ids, id_type)?;
        match id_type {
            IdType::Species => self.select_species(Some(&ids), Some(&ids), true, neighborhood),
            IdType::Reaction => self.select_reactions(&ids, neighborhood),
        }
    }
    // endregion Selection
}

// region Unchecked helpers
// These work on ids which have already been validated.

fn checked_set(names: &Names, ids: &[usize]) -> Result<BTreeSet<usize>, NetworkError> {
    names.check_ids(ids)?;
    Ok(ids.iter().copied().collect())
}

fn reactants_of<N: ReactionNetwork>(
    network: &N,
    reaction_ids: impl IntoIterator<Item = usize>,
) -> BTreeSet<usize> {
    reaction_ids
        .into_iter()
        .flat_map(|r| network.reactants_of_reaction(r))
        .collect()
}

fn products_of<N: ReactionNetwork>(
    network: &N,
    reaction_ids: impl IntoIterator<Item = usize>,
) -> BTreeSet<usize> {
    reaction_ids
        .into_iter()
        .flat_map(|r| network.products_of_reaction(r))
        .collect()
}

fn species_of<N: ReactionNetwork>(
    network: &N,
    reaction_ids: impl IntoIterator<Item = usize>,
) -> BTreeSet<usize> {
    reaction_ids
        .into_iter()
        .flat_map(|r| {
            network
                .reactants_of_reaction(r)
                .into_iter()
                .chain(network.products_of_reaction(r))
        })
        .collect()
}

fn producing<N: ReactionNetwork>(
    network: &N,
    species_ids: impl IntoIterator<Item = usize>,
) -> BTreeSet<usize> {
    species_ids
        .into_iter()
        .flat_map(|s| network.reactions_with_product(s))
        .collect()
}

fn consuming<N: ReactionNetwork>(
    network: &N,
    species_ids: impl IntoIterator<Item = usize>,
) -> BTreeSet<usize> {
    species_ids
        .into_iter()
        .flat_map(|s| network.reactions_with_reactant(s))
        .collect()
}

fn matching_reactions<N: ReactionNetwork>(
    network: &N,
    reactant_ids: Option<&BTreeSet<usize>>,
    product_ids: Option<&BTreeSet<usize>>,
    union: bool,
) -> BTreeSet<usize> {
    match (reactant_ids, product_ids) {
        (None, None) => (0..network.num_reactions()).collect(),
        (Some(reactants), None) => consuming(network, reactants.iter().copied()),
        (None, Some(products)) => producing(network, products.iter().copied()),
        (Some(reactants), Some(products)) => {
            let with_products = producing(network, products.iter().copied());
            let with_reactants = consuming(network, reactants.iter().copied());
            if union {
                &with_products | &with_reactants
            } else {
                &with_products & &with_reactants
            }
        }
    }
}

fn successors_of<N: ReactionNetwork>(
    network: &N,
    ids: impl IntoIterator<Item = usize>,
    id_type: IdType,
    rev: bool,
) -> BTreeSet<usize> {
    match (id_type, rev) {
        (IdType::Reaction, false) => consuming(network, products_of(network, ids)),
        (IdType::Reaction, true) => producing(network, reactants_of(network, ids)),
        (IdType::Species, false) => products_of(network, consuming(network, ids)),
        (IdType::Species, true) => reactants_of(network, producing(network, ids)),
    }
}
// endregion Unchecked helpers

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::{DenseNetwork, DictNetwork};

    fn coefficients(pairs: &[(&str, f64)]) -> IndexMap<String, f64> {
        pairs.iter().map(|(s, c)| (s.to_string(), *c)).collect()
    }

    /// A -> B (R1), B -> C (R2)
    fn abc<N: ReactionNetwork>(mut network: N) -> N {
        network
            .add_reaction("R1", &coefficients(&[("A", -1.0), ("B", 1.0)]), Some(10.0))
            .unwrap();
        network
            .add_reaction("R2", &coefficients(&[("B", -1.0), ("C", 1.0)]), Some(20.0))
            .unwrap();
        network
    }

    /// A -> B -> C -> D -> E through R1..R4
    fn chain<N: ReactionNetwork>(mut network: N) -> N {
        let species = ["A", "B", "C", "D", "E"];
        for (i, pair) in species.windows(2).enumerate() {
            network
                .add_reaction(
                    &format!("R{}", i + 1),
                    &coefficients(&[(pair[0], -1.0), (pair[1], 1.0)]),
                    None,
                )
                .unwrap();
        }
        network
    }

    fn species_names<N: ReactionNetwork>(network: &N) -> Vec<String> {
        network.species().as_slice().to_vec()
    }

    fn reaction_names<N: ReactionNetwork>(network: &N) -> Vec<String> {
        network.reactions().as_slice().to_vec()
    }

    fn check_prune_keeps_path<N: ReactionNetwork>(network: N) {
        let network = abc(network);
        let pruned = network
            .prune(&["A".into()], &["C".into()], IdType::Species)
            .unwrap();
        assert_eq!(reaction_names(&pruned), vec!["R1", "R2"]);
        assert_eq!(species_names(&pruned), vec!["A", "B", "C"]);
    }

    fn check_select_first_reaction<N: ReactionNetwork>(network: N) {
        let network = abc(network);
        let selected = network.select_reactions(&[0], 0).unwrap();
        assert_eq!(reaction_names(&selected), vec!["R1"]);
        assert_eq!(species_names(&selected), vec!["A", "B"]);
        assert_eq!(selected.stoichiometry().shape(), (2, 1));
        // Property values follow the reactions
        assert_eq!(selected.properties().reaction_value("R1", 0.0).unwrap(), 10.0);

        let second = network.select_reactions(&[1], 0).unwrap();
        assert_eq!(species_names(&second), vec!["B", "C"]);
        assert_eq!(second.properties().reaction_value(0usize, 0.0).unwrap(), 20.0);
    }

    fn check_add_reaction_appends_species<N: ReactionNetwork>(network: N) {
        let mut network = abc(network);
        let before = network.stoichiometry();
        network
            .add_reaction("R3", &coefficients(&[("A", -1.0), ("D", 1.0)]), None)
            .unwrap();
        assert_eq!(species_names(&network), vec!["A", "B", "C", "D"]);
        let after = network.stoichiometry();
        assert_eq!(after.shape(), (4, 3));
        for i in 0..3 {
            for j in 0..2 {
                assert_eq!(after[(i, j)], before[(i, j)]);
            }
        }
        assert_eq!(after[(3, 0)], 0.0);
        assert_eq!(after[(3, 1)], 0.0);
        assert_eq!(after[(0, 2)], -1.0);
        assert_eq!(after[(3, 2)], 1.0);
    }

    fn check_reactant_only_match<N: ReactionNetwork>(network: N) {
        let network = abc(network);
        let a = network.get_species_id("A").unwrap();
        let reactions = network.get_reactions(Some(&[a]), None, false).unwrap();
        assert_eq!(reactions, BTreeSet::from([0]));
        let b = network.get_species_id("B").unwrap();
        assert_eq!(
            network.get_reactions(None, Some(&[b]), false).unwrap(),
            BTreeSet::from([0])
        );
        assert_eq!(
            network.get_reactions(Some(&[b]), Some(&[b]), true).unwrap(),
            BTreeSet::from([0, 1])
        );
        assert!(network
            .get_reactions(Some(&[a]), Some(&[a]), false)
            .unwrap()
            .is_empty());
        assert_eq!(
            network.get_reactions(None, None, false).unwrap(),
            BTreeSet::from([0, 1])
        );
    }

    fn check_bfs<N: ReactionNetwork>(network: N) {
        let network = chain(network);
        let forward = network.bfs(&["B".into()], IdType::Species, false).unwrap();
        let expected: IndexMap<usize, usize> = [(1, 0), (2, 1), (3, 2), (4, 3)].into();
        assert_eq!(forward, expected);
        let backward = network.bfs(&["C".into()], IdType::Species, true).unwrap();
        let expected: IndexMap<usize, usize> = [(2, 0), (1, 1), (0, 2)].into();
        assert_eq!(backward, expected);
        let reactions = network
            .bfs(&[EntityRef::Id(0), "R4".into()], IdType::Reaction, false)
            .unwrap();
        assert_eq!(reactions.get(&0), Some(&0));
        assert_eq!(reactions.get(&3), Some(&0));
        assert_eq!(reactions.get(&1), Some(&1));
        assert_eq!(reactions.get(&2), Some(&2));
    }

    fn check_neighborhood<N: ReactionNetwork>(network: N) {
        let network = chain(network);
        let none = network.select_reactions(&[0], 0).unwrap();
        assert_eq!(reaction_names(&none), vec!["R1"]);
        let one = network.select_reactions(&[0], 1).unwrap();
        assert_eq!(reaction_names(&one), vec!["R1", "R2"]);
        let around_r3 = network.select(&["R3".into()], IdType::Reaction, 1).unwrap();
        assert_eq!(reaction_names(&around_r3), vec!["R2", "R3", "R4"]);
        let all = network.select_reactions(&[0], 10).unwrap();
        assert_eq!(all.num_reactions(), 4);
        assert_eq!(all.stoichiometry(), network.stoichiometry());
    }

    fn check_select_species<N: ReactionNetwork>(network: N) {
        let network = chain(network);
        let a = network.get_species_id("A").unwrap();
        let only_a = network.select_species(Some(&[a]), None, true, 0).unwrap();
        assert_eq!(reaction_names(&only_a), vec!["R1"]);
        let grown = network.select_species(Some(&[a]), None, true, 1).unwrap();
        assert_eq!(reaction_names(&grown), vec!["R1", "R2"]);
        let around_c = network.select(&["C".into()], IdType::Species, 0).unwrap();
        assert_eq!(reaction_names(&around_c), vec!["R2", "R3"]);
        assert_eq!(species_names(&around_c), vec!["B", "C", "D"]);

        assert!(matches!(
            network.select_species(None, None, true, 1),
            Err(NetworkError::InvalidArgument(_))
        ));
        let same = network.select_species(None, None, true, 0).unwrap();
        assert_eq!(same.stoichiometry(), network.stoichiometry());
    }

    fn check_copy_and_errors<N: ReactionNetwork>(network: N) {
        let network = abc(network);
        let copy = network
            .with_reaction("R3", &coefficients(&[("C", -1.0), ("D", 1.0)]), Some(1.0))
            .unwrap();
        assert_eq!(network.num_reactions(), 2);
        assert_eq!(network.num_species(), 3);
        assert_eq!(copy.num_reactions(), 3);
        assert_eq!(copy.properties().reaction_value("R3", 0.0).unwrap(), 1.0);

        let mut network = network;
        assert_eq!(
            network.add_reaction("R1", &coefficients(&[("A", -1.0)]), None).err(),
            Some(NetworkError::duplicate(EntityKind::Reaction, "R1"))
        );
        // A failing batch leaves the network untouched
        assert!(network.add_species(["X", "B"], None).is_err());
        assert!(network.add_species(["Y", "Y"], None).is_err());
        assert_eq!(species_names(&network), vec!["A", "B", "C"]);

        let values: IndexMap<String, f64> = [("X".to_string(), 2.0), ("A".to_string(), 3.0)].into();
        network.add_species(["X"], Some(&values)).unwrap();
        assert_eq!(network.num_species(), 4);
        assert_eq!(network.stoichiometry().shape(), (4, 2));
        assert_eq!(network.properties().species_value("X", 0.0).unwrap(), 2.0);
        assert_eq!(network.properties().species_value("A", 0.0).unwrap(), 3.0);

        assert_eq!(
            network.get_species_id("Q"),
            Err(NetworkError::not_found(EntityKind::Species, "Q"))
        );
        assert!(matches!(
            network.get_reactants(Some(&[5])),
            Err(NetworkError::InvalidArgument(_))
        ));
    }

    fn check_batch_reactions<N: ReactionNetwork>(mut network: N) {
        let reactions: IndexMap<String, IndexMap<String, f64>> = [
            ("R1".to_string(), coefficients(&[("A", -1.0), ("B", 1.0)])),
            ("R2".to_string(), coefficients(&[("B", -2.0), ("C", 1.0)])),
        ]
        .into();
        let bad_values: IndexMap<String, f64> = [("R9".to_string(), 1.0)].into();
        assert!(network.add_reactions(&reactions, Some(&bad_values)).is_err());
        assert_eq!(network.num_reactions(), 0);

        let values: IndexMap<String, f64> = [("R2".to_string(), -1.0)].into();
        let copy = network.with_reactions(&reactions, Some(&values)).unwrap();
        assert_eq!(network.num_reactions(), 0);
        assert_eq!(reaction_names(&copy), vec!["R1", "R2"]);
        assert_eq!(copy.properties().reaction_values(None, 0.0), vec![0.0, -1.0]);
        assert_eq!(copy.stoichiometry()[(1, 1)], -2.0);
    }

    fn check_traversal_primitives<N: ReactionNetwork>(network: N) {
        let network = chain(network);
        assert_eq!(network.get_reactants(None).unwrap(), BTreeSet::from([0, 1, 2, 3]));
        assert_eq!(network.get_products(Some(&[0, 1])).unwrap(), BTreeSet::from([1, 2]));
        assert_eq!(
            network.successors(&[0], IdType::Reaction, false).unwrap(),
            BTreeSet::from([1])
        );
        assert_eq!(
            network.successors(&[1], IdType::Reaction, true).unwrap(),
            BTreeSet::from([0])
        );
        assert_eq!(
            network.successors(&[2], IdType::Species, false).unwrap(),
            BTreeSet::from([3])
        );
        assert_eq!(
            network.successors(&[2], IdType::Species, true).unwrap(),
            BTreeSet::from([1])
        );
        assert_eq!(network.species_names(&[4, 0]).unwrap(), vec!["E", "A"]);
        assert_eq!(network.reaction_names(&[1]).unwrap(), vec!["R2"]);
        assert!(network.species_names(&[5]).is_err());
    }

    fn check_prune_by_reactions<N: ReactionNetwork>(network: N) {
        let mut network = chain(network);
        // A dead end branch which is reachable from R1 but can't reach R3
        network
            .add_reaction("R5", &coefficients(&[("B", -1.0), ("F", 1.0)]), None)
            .unwrap();
        let pruned = network
            .prune(&["R1".into()], &["R3".into()], IdType::Reaction)
            .unwrap();
        assert_eq!(reaction_names(&pruned), vec!["R1", "R2", "R3"]);
        let pruned = network
            .prune(&["A".into()], &["D".into()], IdType::Species)
            .unwrap();
        assert_eq!(reaction_names(&pruned), vec!["R1", "R2", "R3"]);
        assert!(!species_names(&pruned).contains(&"F".to_string()));
    }

    fn check_restriction_rejects_bad_ids<N: ReactionNetwork>(network: N) {
        let network = abc(network);
        assert!(matches!(
            network.restrict_to_reactions(&[0, 0]),
            Err(NetworkError::InvalidArgument(_))
        ));
        assert!(matches!(
            network.restrict_to_reactions(&[1, 9]),
            Err(NetworkError::InvalidArgument(_))
        ));
        assert!(network.reactants_of_reaction(7).is_empty());
        assert!(network.products_of_reaction(7).is_empty());
        assert!(network.reactions_with_product(9).is_empty());
        assert!(network.reactions_with_reactant(9).is_empty());
        assert_eq!(species_names(&network), vec!["A", "B", "C"]);
        assert_eq!(reaction_names(&network), vec!["R1", "R2"]);
        let reversed = network.restrict_to_reactions(&[1, 0]).unwrap();
        assert_eq!(reaction_names(&reversed), vec!["R2", "R1"]);
    }

    macro_rules! for_each_strategy {
        ($($check:ident),* $(,)?) => {
            mod dense_strategy {
                use super::*;
                $(
                    #[test]
                    fn $check() {
                        super::$check(DenseNetwork::empty());
                    }
                )*
            }
            mod dict_strategy {
                use super::*;
                $(
                    #[test]
                    fn $check() {
                        super::$check(DictNetwork::empty());
                    }
                )*
            }
            mod unindexed_dense_strategy {
                use super::*;
                $(
                    #[test]
                    fn $check() {
                        super::$check(DenseNetwork::empty_with_index(false));
                    }
                )*
            }
        };
    }

    for_each_strategy!(
        check_prune_keeps_path,
        check_select_first_reaction,
        check_add_reaction_appends_species,
        check_reactant_only_match,
        check_bfs,
        check_neighborhood,
        check_select_species,
        check_copy_and_errors,
        check_batch_reactions,
        check_traversal_primitives,
        check_prune_by_reactions,
        check_restriction_rejects_bad_ids,
    );
}
