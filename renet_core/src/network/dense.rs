//! Dense storage strategy, the stoichiometry is held as a matrix with one row per species and
//! one column per reaction
use std::collections::BTreeSet;
use std::path::Path;

use indexmap::IndexMap;
use nalgebra::DMatrix;
use tracing::debug;

use crate::configuration;
use crate::io::sif::{self, ParsedSif, SifError, SifOptions, SifTuple};
use crate::network::entities::NetworkCore;
use crate::network::renet::ReactionNetwork;
use crate::network::NetworkError;

/// Reaction network backed by a dense stoichiometric matrix
#[derive(Clone, Debug, PartialEq)]
pub struct DenseNetwork {
    core: NetworkCore,
    stoichiometry: DMatrix<f64>,
}

/// Where to read SIF interactions from, see [`DenseNetwork::from_sif`]
#[derive(Clone, Copy, Debug)]
pub enum SifSource<'a> {
    /// Path to a delimited text file
    File(&'a Path),
    /// Already parsed (source, sign, target) triples
    Tuples(&'a [SifTuple]),
}

impl DenseNetwork {
    // region Creation Functions
    /// Create a network from a stoichiometric matrix and the names of its rows and columns
    ///
    /// Indexing follows the current [`configuration::Configuration`].
    ///
    /// # Errors
    /// - [`NetworkError::InvalidArgument`] if the number of names doesn't match the matrix shape
    /// - [`NetworkError::DuplicateEntity`] if a name is repeated
    pub fn new(
        stoichiometry: DMatrix<f64>,
        species: Vec<String>,
        reactions: Vec<String>,
    ) -> Result<Self, NetworkError> {
        Self::with_index_mode(
            stoichiometry,
            species,
            reactions,
            configuration::current().indexed,
        )
    }

    /// Same as [`DenseNetwork::new`] with an explicit choice of indexed or linear lookups
    pub fn with_index_mode(
        stoichiometry: DMatrix<f64>,
        species: Vec<String>,
        reactions: Vec<String>,
        indexed: bool,
    ) -> Result<Self, NetworkError> {
        if stoichiometry.nrows() != species.len() || stoichiometry.ncols() != reactions.len() {
            return Err(NetworkError::InvalidArgument(format!(
                "stoichiometry of shape {:?} doesn't match {} species and {} reactions",
                stoichiometry.shape(),
                species.len(),
                reactions.len()
            )));
        }
        Ok(DenseNetwork {
            core: NetworkCore::new(species, reactions, indexed)?,
            stoichiometry,
        })
    }

    /// Create a network from a stoichiometric matrix, naming missing species `S_i` and
    /// missing reactions `R_i` (prefixes come from the configuration)
    ///
    /// # Examples
    /// ```rust
    /// use nalgebra::DMatrix;
    /// use renet_core::network::{DenseNetwork, ReactionNetwork};
    /// let matrix = DMatrix::from_row_slice(3, 2, &[-1., 0., 1., -1., 0., 1.]);
    /// let network = DenseNetwork::create(matrix.clone(), None, None).unwrap();
    /// assert_eq!(network.species().as_slice(), &["S_0", "S_1", "S_2"]);
    /// assert_eq!(network.stoichiometry(), matrix);
    /// ```
    pub fn create(
        stoichiometry: DMatrix<f64>,
        species: Option<Vec<String>>,
        reactions: Option<Vec<String>>,
    ) -> Result<Self, NetworkError> {
        let conf = configuration::current();
        let species = species.unwrap_or_else(|| {
            (0..stoichiometry.nrows())
                .map(|i| format!("{}_{}", conf.species_prefix, i))
                .collect()
        });
        let reactions = reactions.unwrap_or_else(|| {
            (0..stoichiometry.ncols())
                .map(|i| format!("{}_{}", conf.reaction_prefix, i))
                .collect()
        });
        Self::with_index_mode(stoichiometry, species, reactions, conf.indexed)
    }

    /// Network without species or reactions
    pub fn empty() -> Self {
        DenseNetwork {
            core: NetworkCore::empty(),
            stoichiometry: DMatrix::zeros(0, 0),
        }
    }

    /// Empty network with an explicit choice of indexed or linear lookups
    pub fn empty_with_index(indexed: bool) -> Self {
        DenseNetwork {
            core: NetworkCore::empty_with_index(indexed),
            stoichiometry: DMatrix::zeros(0, 0),
        }
    }

    pub(crate) fn from_parts(core: NetworkCore, stoichiometry: DMatrix<f64>) -> Self {
        DenseNetwork {
            core,
            stoichiometry,
        }
    }

    /// Create a network from the output of the SIF reader, the interaction signs become the
    /// reaction property values
    pub fn from_parsed_sif(parsed: ParsedSif) -> Result<Self, NetworkError> {
        let ParsedSif {
            stoichiometry,
            species,
            reactions,
            reaction_values,
        } = parsed;
        let mut network = Self::new(stoichiometry, species, reactions)?;
        for (id, value) in reaction_values {
            network.core.property_store_mut().set_reaction_value(id, value);
        }
        debug!(
            species = network.num_species(),
            reactions = network.num_reactions(),
            "created network from SIF interactions"
        );
        Ok(network)
    }

    /// Create a network from a SIF file or from a list of interaction triples
    pub fn from_sif(source: SifSource<'_>, options: &SifOptions) -> Result<Self, SifError> {
        match source {
            SifSource::File(path) => Self::from_sif_file(path, options),
            SifSource::Tuples(tuples) => Self::from_sif_list(tuples),
        }
    }

    /// Read a SIF file into a network
    ///
    /// # Parameters
    /// - `path`: Path to the delimited (source, sign, target) file
    /// - `options`: Delimiter, header, self loop and column order options
    pub fn from_sif_file<P: AsRef<Path>>(path: P, options: &SifOptions) -> Result<Self, SifError> {
        let parsed = sif::read_sif(path, options)?;
        Ok(Self::from_parsed_sif(parsed)?)
    }

    /// Create a network from (source, sign, target) triples
    pub fn from_sif_list(tuples: &[SifTuple]) -> Result<Self, SifError> {
        Ok(Self::from_parsed_sif(sif::parse_sif_tuples(tuples))?)
    }
    // endregion Creation Functions

    /// Borrow the stoichiometric matrix without copying it
    pub fn matrix(&self) -> &DMatrix<f64> {
        &self.stoichiometry
    }

    fn filter_column(&self, reaction_id: usize, keep: impl Fn(f64) -> bool) -> BTreeSet<usize> {
        if reaction_id >= self.stoichiometry.ncols() {
            return BTreeSet::new();
        }
        sign_filter(self.stoichiometry.column(reaction_id).iter(), keep)
    }

    fn filter_row(&self, species_id: usize, keep: impl Fn(f64) -> bool) -> BTreeSet<usize> {
        if species_id >= self.stoichiometry.nrows() {
            return BTreeSet::new();
        }
        sign_filter(self.stoichiometry.row(species_id).iter(), keep)
    }
}

impl ReactionNetwork for DenseNetwork {
    fn core(&self) -> &NetworkCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut NetworkCore {
        &mut self.core
    }

    fn stoichiometry(&self) -> DMatrix<f64> {
        self.stoichiometry.clone()
    }

    fn reactants_of_reaction(&self, reaction_id: usize) -> BTreeSet<usize> {
        self.filter_column(reaction_id, |c| c < 0.)
    }

    fn products_of_reaction(&self, reaction_id: usize) -> BTreeSet<usize> {
        self.filter_column(reaction_id, |c| c > 0.)
    }

    fn reactions_with_product(&self, species_id: usize) -> BTreeSet<usize> {
        self.filter_row(species_id, |c| c > 0.)
    }

    fn reactions_with_reactant(&self, species_id: usize) -> BTreeSet<usize> {
        self.filter_row(species_id, |c| c < 0.)
    }

    fn restrict_to_reactions(&self, reaction_ids: &[usize]) -> Result<Self, NetworkError> {
        self.core.reactions().check_selection(reaction_ids)?;
        let columns = self.stoichiometry.select_columns(reaction_ids.iter());
        let species_ids: Vec<usize> = (0..columns.nrows())
            .filter(|&i| columns.row(i).iter().any(|c| *c != 0.))
            .collect();
        Ok(DenseNetwork {
            core: self.core.select(&species_ids, reaction_ids)?,
            stoichiometry: columns.select_rows(species_ids.iter()),
        })
    }

    fn grow_species(&mut self, names: &[String]) {
        let (nrows, ncols) = self.stoichiometry.shape();
        self.stoichiometry.resize_mut(nrows + names.len(), ncols, 0.);
    }

    fn grow_reaction(
        &mut self,
        _name: &str,
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
        let (nrows, ncols) = self.stoichiometry.shape();
        self.stoichiometry.resize_mut(nrows, ncols + 1, 0.);
        for (species, coefficient) in coefficients {
            let id = self.core.species().get_id(species)?;
            self.stoichiometry[(id, ncols)] = *coefficient;
        }
        Ok(())
    }
}

/// Positions of the coefficients satisfying `keep`
fn sign_filter<'a>(
    coefficients: impl Iterator<Item = &'a f64>,
    keep: impl Fn(f64) -> bool,
) -> BTreeSet<usize> {
    coefficients
        .enumerate()
        .filter(|(_, c)| keep(**c))
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::{EntityRef, IdType};
    use proptest::prelude::*;

    fn abc() -> DenseNetwork {
        DenseNetwork::new(
            DMatrix::from_row_slice(3, 2, &[-1., 0., 1., -1., 0., 1.]),
            vec!["A".to_string(), "B".to_string(), "C".to_string()],
            vec!["R1".to_string(), "R2".to_string()],
        )
        .unwrap()
    }

    #[test]
    fn shape_is_checked() {
        let res = DenseNetwork::new(
            DMatrix::zeros(2, 2),
            vec!["A".to_string()],
            vec!["R1".to_string(), "R2".to_string()],
        );
        assert!(matches!(res, Err(NetworkError::InvalidArgument(_))));
    }

    #[test]
    fn create_names_missing_axes() {
        let network = DenseNetwork::create(
            DMatrix::from_row_slice(2, 3, &[-1., 0., 1., 1., -1., 0.]),
            Some(vec!["x".to_string(), "y".to_string()]),
            None,
        )
        .unwrap();
        assert_eq!(network.species().as_slice(), &["x", "y"]);
        assert_eq!(network.reactions().as_slice(), &["R_0", "R_1", "R_2"]);
    }

    #[test]
    fn sign_filters() {
        let network = abc();
        assert_eq!(network.reactants_of_reaction(0), BTreeSet::from([0]));
        assert_eq!(network.products_of_reaction(0), BTreeSet::from([1]));
        assert_eq!(network.reactions_with_product(1), BTreeSet::from([0]));
        assert_eq!(network.reactions_with_reactant(1), BTreeSet::from([1]));
        assert!(network.reactions_with_reactant(2).is_empty());
    }

    #[test]
    fn grows_from_empty() {
        let mut network = DenseNetwork::empty();
        network.add_species(["A", "B"], None).unwrap();
        assert_eq!(network.matrix().shape(), (2, 0));
        let coefficients: IndexMap<String, f64> =
            [("B".to_string(), -1.0), ("C".to_string(), 2.0)].into();
        network.add_reaction("R1", &coefficients, None).unwrap();
        assert_eq!(network.matrix().shape(), (3, 1));
        assert_eq!(network.matrix()[(1, 0)], -1.0);
        assert_eq!(network.matrix()[(2, 0)], 2.0);
        assert_eq!(network.matrix()[(0, 0)], 0.0);
    }

    #[test]
    fn restriction_drops_uninvolved_species() {
        let network = abc();
        let restricted = network.restrict_to_reactions(&[1]).unwrap();
        assert_eq!(restricted.species().as_slice(), &["B", "C"]);
        assert_eq!(
            restricted.matrix(),
            &DMatrix::from_row_slice(2, 1, &[-1., 1.])
        );
        let nothing = network.restrict_to_reactions(&[]).unwrap();
        assert_eq!(nothing.matrix().shape(), (0, 0));
        assert_eq!(nothing.num_species(), 0);
    }

    #[test]
    fn sif_list() {
        let tuples: Vec<SifTuple> = vec![
            ("A".to_string(), 1, "B".to_string()),
            ("B".to_string(), -1, "C".to_string()),
        ];
        let network = DenseNetwork::from_sif(SifSource::Tuples(&tuples), &SifOptions::default())
            .unwrap();
        assert_eq!(network.species().as_slice(), &["A", "B", "C"]);
        assert_eq!(network.properties().reaction_values(None, 0.), vec![1., -1.]);
        let pruned = network
            .prune(&[EntityRef::from("A")], &[EntityRef::from("C")], IdType::Species)
            .unwrap();
        assert_eq!(pruned.num_reactions(), 2);
    }

    #[test]
    fn sparse_export() {
        let network = abc();
        let csc = network.sparse_stoichiometry();
        assert_eq!(csc.nrows(), 3);
        assert_eq!(csc.ncols(), 2);
        assert_eq!(csc.nnz(), 4);
    }

    fn small_matrix() -> impl Strategy<Value = DMatrix<f64>> {
        (1usize..6, 1usize..6).prop_flat_map(|(r, c)| {
            prop::collection::vec(prop::sample::select(vec![-1.0, 0.0, 1.0, 2.0]), r * c)
                .prop_map(move |data| DMatrix::from_vec(r, c, data))
        })
    }

    proptest! {
        #[test]
        fn create_round_trip(matrix in small_matrix()) {
            let network = DenseNetwork::create(matrix.clone(), None, None).unwrap();
            prop_assert_eq!(network.stoichiometry(), matrix);
        }

        #[test]
        fn shape_follows_names(matrix in small_matrix(), extra in 0usize..3) {
            let mut network = DenseNetwork::create(matrix, None, None).unwrap();
            let coefficients: IndexMap<String, f64> = (0..extra)
                .map(|i| (format!("new_{}", i), 1.0))
                .chain([("S_0".to_string(), -1.0)])
                .collect();
            network.add_reaction("extra", &coefficients, None).unwrap();
            network.add_species(["lonely"], None).unwrap();
            prop_assert_eq!(network.matrix().nrows(), network.num_species());
            prop_assert_eq!(network.matrix().ncols(), network.num_reactions());
        }

        #[test]
        fn reactants_and_products_disjoint(matrix in small_matrix()) {
            let network = DenseNetwork::create(matrix, None, None).unwrap();
            for r in 0..network.num_reactions() {
                let reactants = network.reactants_of_reaction(r);
                let products = network.products_of_reaction(r);
                prop_assert!(reactants.is_disjoint(&products));
            }
        }

        #[test]
        fn select_all_is_identity(matrix in small_matrix()) {
            let network = DenseNetwork::create(matrix, None, None).unwrap();
            let all: Vec<usize> = (0..network.num_reactions()).collect();
            let selected = network.select_reactions(&all, 0).unwrap();
            // Species without any coefficient are dropped, everything else is kept in order
            let involved: Vec<usize> = (0..network.num_species())
                .filter(|&s| network.matrix().row(s).iter().any(|c| *c != 0.))
                .collect();
            prop_assert_eq!(selected.matrix(), &network.matrix().select_rows(involved.iter()));
            prop_assert_eq!(selected.reactions(), network.reactions());
        }

        #[test]
        fn bfs_distances_grow_by_at_most_one(matrix in small_matrix(), seed in 0usize..6) {
            let network = DenseNetwork::create(matrix, None, None).unwrap();
            let seed = seed % network.num_species();
            let distances = network.bfs(&[EntityRef::Id(seed)], IdType::Species, false).unwrap();
            for (&a, &da) in &distances {
                for b in network.successors(&[a], IdType::Species, false).unwrap() {
                    let db = distances.get(&b).copied();
                    prop_assert!(db.is_some());
                    prop_assert!(db.unwrap_or(usize::MAX) <= da + 1);
                }
            }
        }

        #[test]
        fn pruned_reactions_touch_reachable_species(matrix in small_matrix(), s in 0usize..6, t in 0usize..6) {
            let network = DenseNetwork::create(matrix, None, None).unwrap();
            let source = EntityRef::Id(s % network.num_species());
            let target = EntityRef::Id(t % network.num_species());
            let forward: BTreeSet<usize> = network
                .bfs(&[source.clone()], IdType::Species, false).unwrap().into_keys().collect();
            let backward: BTreeSet<usize> = network
                .bfs(&[target.clone()], IdType::Species, true).unwrap().into_keys().collect();
            let reachable: BTreeSet<&str> = forward
                .intersection(&backward)
                .map(|&i| network.species().as_slice()[i].as_str())
                .collect();
            let pruned = network.prune(&[source], &[target], IdType::Species).unwrap();
            for r in 0..pruned.num_reactions() {
                let reactants = pruned.reactants_of_reaction(r);
                let products = pruned.products_of_reaction(r);
                prop_assert!(reactants.iter().any(|&i| reachable.contains(pruned.species().as_slice()[i].as_str())));
                prop_assert!(products.iter().any(|&i| reachable.contains(pruned.species().as_slice()[i].as_str())));
            }
        }
    }
}
