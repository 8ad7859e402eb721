//! Core rust implementation of reaction networks: bipartite species/reaction graphs with signed
//! stoichiometric coefficients, along with traversal, selection and pruning of sub-networks,
//! SIF and JSON readers, and a generic labeled hypergraph.

pub mod configuration;
pub mod graph;
pub mod io;
pub mod network;
