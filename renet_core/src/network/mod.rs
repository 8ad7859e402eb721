//! Module providing reaction networks: species and reactions linked by signed stoichiometric
//! coefficients, stored either as a dense matrix ([`dense::DenseNetwork`]) or as mirrored
//! dictionaries ([`dict::DictNetwork`]).
//!
//! All traversal, selection and pruning algorithms live once on the [`renet::ReactionNetwork`]
//! trait and only rely on a handful of storage specific primitives.
use std::fmt::{Display, Formatter};

use thiserror::Error;

pub mod dense;
pub mod dict;
pub mod entities;
pub mod graph_view;
pub mod names;
pub mod properties;
pub mod renet;

pub use dense::DenseNetwork;
pub use dict::DictNetwork;
pub use renet::ReactionNetwork;

/// Kind of entity an error refers to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Species,
    Reaction,
    Node,
    Edge,
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::Species => write!(f, "species"),
            EntityKind::Reaction => write!(f, "reaction"),
            EntityKind::Node => write!(f, "node"),
            EntityKind::Edge => write!(f, "edge"),
        }
    }
}

/// Which side of the bipartite network a set of ids refers to
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum IdType {
    /// Ids are species ids
    #[default]
    Species,
    /// Ids are reaction ids
    Reaction,
}

impl From<IdType> for EntityKind {
    fn from(value: IdType) -> Self {
        match value {
            IdType::Species => EntityKind::Species,
            IdType::Reaction => EntityKind::Reaction,
        }
    }
}

/// Reference to a species or reaction, either by its integer id or by its name
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum EntityRef {
    Id(usize),
    Name(String),
}

impl From<usize> for EntityRef {
    fn from(value: usize) -> Self {
        EntityRef::Id(value)
    }
}

impl From<&str> for EntityRef {
    fn from(value: &str) -> Self {
        EntityRef::Name(value.to_string())
    }
}

impl From<String> for EntityRef {
    fn from(value: String) -> Self {
        EntityRef::Name(value)
    }
}

impl From<&String> for EntityRef {
    fn from(value: &String) -> Self {
        EntityRef::Name(value.clone())
    }
}

impl Display for EntityRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityRef::Id(id) => write!(f, "{}", id),
            EntityRef::Name(name) => write!(f, "{}", name),
        }
    }
}

/// Errors raised while building, querying or transforming networks and graphs
#[derive(Clone, Debug, Error, PartialEq)]
pub enum NetworkError {
    /// An entity with the same name already exists
    #[error("{kind} {name} already exists")]
    DuplicateEntity { kind: EntityKind, name: String },
    /// No entity with this name exists
    #[error("{kind} {name} not found")]
    NotFound { kind: EntityKind, name: String },
    /// Ids out of range, mismatched shapes, or nothing to expand a selection from
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    /// The operation can't be expressed for this input
    #[error("Unsupported operation: {0}")]
    Unsupported(String),
}

impl NetworkError {
    pub(crate) fn duplicate(kind: EntityKind, name: &str) -> Self {
        NetworkError::DuplicateEntity {
            kind,
            name: name.to_string(),
        }
    }

    pub(crate) fn not_found(kind: EntityKind, name: &str) -> Self {
        NetworkError::NotFound {
            kind,
            name: name.to_string(),
        }
    }
}
