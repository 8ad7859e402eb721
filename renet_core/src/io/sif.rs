//! Module for reading interaction networks in SIF format
//!
//! Each row of a SIF file holds a (source, sign, target) triple. Every unique triple becomes a
//! reaction consuming the source and producing the target, and the sign becomes the reaction's
//! property value.
use std::fs;
use std::path::Path;

use derive_builder::Builder;
use indexmap::{IndexMap, IndexSet};
use nalgebra::DMatrix;
use thiserror::Error;
use tracing::{debug, warn};

use crate::configuration;
use crate::network::NetworkError;

/// A (source, sign, target) interaction
pub type SifTuple = (String, i32, String);

/// Options used when reading SIF text
#[derive(Builder, Clone, Debug, PartialEq)]
#[builder(default)]
pub struct SifOptions {
    /// Character separating the columns
    pub delimiter: char,
    /// Whether the first line is a header to skip
    pub has_header: bool,
    /// Whether interactions from a species to itself are dropped
    pub discard_self_loops: bool,
    /// Columns holding the source, the sign and the target, in that order
    pub column_order: [usize; 3],
}

impl Default for SifOptions {
    fn default() -> Self {
        let conf = configuration::current();
        SifOptions {
            delimiter: conf.sif_delimiter,
            has_header: false,
            discard_self_loops: conf.discard_self_loops,
            column_order: [0, 1, 2],
        }
    }
}

/// Output of the SIF reader, ready to become a network
#[derive(Clone, Debug, PartialEq)]
pub struct ParsedSif {
    /// Species by reaction matrix, -1 for the source and +1 for the target
    pub stoichiometry: DMatrix<f64>,
    /// Species in order of first appearance
    pub species: Vec<String>,
    /// One reaction per unique interaction, named `{source}_{sign}_{target}`
    pub reactions: Vec<String>,
    /// Sign of each reaction, keyed by reaction id
    pub reaction_values: IndexMap<usize, f64>,
}

#[derive(Error, Debug)]
pub enum SifError {
    #[error("Unable to read SIF file")]
    UnableToRead(#[from] std::io::Error),
    #[error("Line {line}: expected 3 fields but found {found}")]
    MalformedRow { line: usize, found: usize },
    #[error("Line {line}: unable to parse interaction sign {value:?}")]
    InvalidSign { line: usize, value: String },
    #[error("Column order {0:?} is not a permutation of 0, 1, 2")]
    InvalidColumnOrder([usize; 3]),
    #[error("Unable to build network")]
    Network(#[from] NetworkError),
}

/// Read a SIF file
pub fn read_sif<P: AsRef<Path>>(path: P, options: &SifOptions) -> Result<ParsedSif, SifError> {
    let text = fs::read_to_string(path)?;
    parse_sif_str(&text, options)
}

/// Parse SIF text
///
/// Blank lines are ignored. Rows must have exactly three fields, surrounding whitespace is
/// trimmed from each of them.
pub fn parse_sif_str(text: &str, options: &SifOptions) -> Result<ParsedSif, SifError> {
    let mut order = options.column_order;
    order.sort_unstable();
    if order != [0, 1, 2] {
        return Err(SifError::InvalidColumnOrder(options.column_order));
    }
    let [source_col, sign_col, target_col] = options.column_order;

    let mut tuples: Vec<SifTuple> = Vec::new();
    let skip = usize::from(options.has_header);
    for (n, row) in text.lines().enumerate().skip(skip) {
        let line = n + 1;
        if row.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = row.split(options.delimiter).map(str::trim).collect();
        if fields.len() != 3 {
            return Err(SifError::MalformedRow {
                line,
                found: fields.len(),
            });
        }
        let sign: i32 = fields[sign_col]
            .parse()
            .map_err(|_| SifError::InvalidSign {
                line,
                value: fields[sign_col].to_string(),
            })?;
        let (source, target) = (fields[source_col], fields[target_col]);
        if options.discard_self_loops && source == target {
            warn!(line, species = source, "discarding self loop");
            continue;
        }
        tuples.push((source.to_string(), sign, target.to_string()));
    }
    Ok(parse_sif_tuples(&tuples))
}

/// Build the stoichiometry of a list of interactions
///
/// Repeated interactions are skipped. Self loops are kept as given, leaving the species as the
/// product of its reaction.
pub fn parse_sif_tuples(tuples: &[SifTuple]) -> ParsedSif {
    let mut species: IndexSet<&str> = IndexSet::new();
    let mut interactions: IndexSet<(&str, i32, &str)> = IndexSet::new();
    for (source, sign, target) in tuples {
        if !interactions.insert((source.as_str(), *sign, target.as_str())) {
            warn!(source, sign, target, "skipping repeated interaction");
            continue;
        }
        species.insert(source);
        species.insert(target);
    }

    let mut stoichiometry = DMatrix::zeros(species.len(), interactions.len());
    let mut reactions = Vec::with_capacity(interactions.len());
    let mut reaction_values = IndexMap::with_capacity(interactions.len());
    for (j, (source, sign, target)) in interactions.iter().enumerate() {
        // Indices are present, every species of an interaction was inserted above
        if let (Some(s), Some(t)) = (species.get_index_of(source), species.get_index_of(target)) {
            stoichiometry[(s, j)] = -1.;
            stoichiometry[(t, j)] = 1.;
        }
        reactions.push(format!("{}_{}_{}", source, sign, target));
        reaction_values.insert(j, f64::from(*sign));
    }
    debug!(
        species = species.len(),
        reactions = reactions.len(),
        "parsed SIF interactions"
    );
    ParsedSif {
        stoichiometry,
        species: species.into_iter().map(String::from).collect(),
        reactions,
        reaction_values,
    }
}
