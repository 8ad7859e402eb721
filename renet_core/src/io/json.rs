//! Module providing JSON IO for reaction networks
use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::network::{DenseNetwork, DictNetwork, NetworkError, ReactionNetwork};

// region JSON Network
/// Represents a JSON serialized network, used for reading and writing networks in json format
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct JsonNetwork {
    species: Vec<String>,
    reactions: Vec<JsonReaction>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    species_values: IndexMap<String, f64>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    reaction_values: IndexMap<String, f64>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct JsonReaction {
    id: String,
    /// Non-zero coefficients keyed by species name
    coefficients: IndexMap<String, f64>,
}

impl JsonNetwork {
    fn read<P: AsRef<Path>>(path: P) -> Result<JsonNetwork, JsonError> {
        let network_str = match fs::read_to_string(path) {
            Ok(data) => data,
            Err(err) => return Err(JsonError::UnableToRead(format!("{:?}", err))),
        };
        Self::parse(&network_str)
    }

    fn parse(network_str: &str) -> Result<JsonNetwork, JsonError> {
        match serde_json::from_str::<JsonNetwork>(network_str) {
            Ok(network) => Ok(network),
            Err(err) => Err(JsonError::UnableToParse(format!("{:?}", err))),
        }
    }
}
// endregion JSON Network

// region Conversions
fn to_json<N: ReactionNetwork>(network: &N) -> JsonNetwork {
    let stoichiometry = network.stoichiometry();
    let species = network.species().as_slice();
    let reactions = network
        .reactions()
        .iter()
        .enumerate()
        .map(|(j, id)| JsonReaction {
            id: id.to_string(),
            coefficients: stoichiometry
                .column(j)
                .iter()
                .enumerate()
                .filter(|(_, c)| **c != 0.)
                .map(|(i, c)| (species[i].clone(), *c))
                .collect(),
        })
        .collect();
    let store = network.property_store();
    let reaction_names = network.reactions();
    JsonNetwork {
        species: species.to_vec(),
        reactions,
        species_values: store
            .species_entries()
            .filter_map(|(id, v)| species.get(id).map(|s| (s.clone(), v)))
            .collect(),
        reaction_values: store
            .reaction_entries()
            .filter_map(|(id, v)| reaction_names.name(id).map(|r| (r.to_string(), v)))
            .collect(),
    }
}

fn from_json<N: ReactionNetwork>(mut network: N, json: JsonNetwork) -> Result<N, JsonError> {
    network.add_species(json.species, Some(&json.species_values))?;
    let reactions: IndexMap<String, IndexMap<String, f64>> = json
        .reactions
        .into_iter()
        .map(|r| (r.id, r.coefficients))
        .collect();
    network.add_reactions(&reactions, Some(&json.reaction_values))?;
    debug!(
        species = network.num_species(),
        reactions = network.num_reactions(),
        "read network from JSON"
    );
    Ok(network)
}

impl DenseNetwork {
    /// Read a network written by [`DenseNetwork::write_json`]
    pub fn read_json<P: AsRef<Path>>(path: P) -> Result<DenseNetwork, JsonError> {
        from_json(DenseNetwork::empty(), JsonNetwork::read(path)?)
    }

    pub fn from_json_str(network_str: &str) -> Result<DenseNetwork, JsonError> {
        from_json(DenseNetwork::empty(), JsonNetwork::parse(network_str)?)
    }

    /// Write the network as JSON, property values included
    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<(), JsonError> {
        fs::write(path, self.to_json_string()?)?;
        Ok(())
    }

    pub fn to_json_string(&self) -> Result<String, JsonError> {
        Ok(serde_json::to_string(&to_json(self))?)
    }
}

impl DictNetwork {
    pub fn read_json<P: AsRef<Path>>(path: P) -> Result<DictNetwork, JsonError> {
        from_json(DictNetwork::empty(), JsonNetwork::read(path)?)
    }

    pub fn from_json_str(network_str: &str) -> Result<DictNetwork, JsonError> {
        from_json(DictNetwork::empty(), JsonNetwork::parse(network_str)?)
    }

    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<(), JsonError> {
        fs::write(path, self.to_json_string()?)?;
        Ok(())
    }

    pub fn to_json_string(&self) -> Result<String, JsonError> {
        Ok(serde_json::to_string(&to_json(self))?)
    }
}

#[derive(Error, Debug)]
pub enum JsonError {
    #[error("Unable to read file due to {0}")]
    UnableToRead(String),
    #[error("Unable to parse json due to {0}")]
    UnableToParse(String),
    #[error("Unable to build network")]
    UnableToBuildNetwork(#[from] NetworkError),
    #[error("Serde json parse error")]
    SerdeJsonParseError(#[from] serde_json::Error),
    #[error("Unable to write to file")]
    UnableToWrite(#[from] std::io::Error),
}
// endregion Conversions
