//! In memory hypergraph backed by insertion ordered maps
use indexmap::{IndexMap, IndexSet};
use serde_json::Value;
use tracing::debug;

use crate::graph::{Attributes, BaseGraph, HyperEdge, DIRECTED_KEY, NODES_KEY};
use crate::network::{DenseNetwork, EntityKind, NetworkError, ReactionNetwork};

/// Hypergraph keeping nodes and edges in insertion order
///
/// # Examples
/// ```rust
/// use renet_core::graph::{BaseGraph, Graph, HyperEdge};
/// use renet_core::network::ReactionNetwork;
/// let mut graph = Graph::new();
/// graph.add_edge("e1", HyperEdge::new(["A"], ["B"]), true, None, false).unwrap();
/// graph.add_edge("e2", HyperEdge::new(["B"], ["C"]), true, None, false).unwrap();
/// let network = graph.to_network().unwrap();
/// assert_eq!(network.num_species(), 3);
/// assert_eq!(network.num_reactions(), 2);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Graph {
    edges: IndexMap<String, HyperEdge>,
    /// Node name to the names of the edges it belongs to
    nodes: IndexMap<String, IndexSet<String>>,
    edge_properties: IndexMap<String, Attributes>,
    node_properties: IndexMap<String, Attributes>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    pub fn edges(&self) -> impl Iterator<Item = (&str, &HyperEdge)> {
        self.edges.iter().map(|(n, e)| (n.as_str(), e))
    }

    pub fn edge(&self, name: &str) -> Option<&HyperEdge> {
        self.edges.get(name)
    }

    /// Names of the edges a node belongs to
    pub fn node_edges(&self, name: &str) -> Option<&IndexSet<String>> {
        self.nodes.get(name)
    }

    pub fn is_directed(&self, edge: &str) -> bool {
        self.edge_properties
            .get(edge)
            .and_then(|p| p.get(DIRECTED_KEY))
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Convert the hypergraph into a reaction network, nodes becoming species and edges
    /// reactions
    ///
    /// Edges created from coefficients keep their coefficients, directed edges consume their
    /// sources and produce their targets with unit coefficients.
    ///
    /// # Errors
    /// [`NetworkError::Unsupported`] if an edge is undirected and has no coefficients
    pub fn to_network(&self) -> Result<DenseNetwork, NetworkError> {
        let mut network = DenseNetwork::empty();
        network.add_species(self.nodes.keys().cloned(), None)?;
        for (name, edge) in &self.edges {
            let coefficients = match self.edge_coefficients(name) {
                Some(coefficients) => coefficients,
                None if self.is_directed(name) => edge
                    .source
                    .iter()
                    .map(|s| (s.clone(), -1.))
                    .chain(edge.target.iter().map(|t| (t.clone(), 1.)))
                    .collect(),
                None => {
                    return Err(NetworkError::Unsupported(format!(
                        "edge {} is undirected and can't be converted into a reaction",
                        name
                    )))
                }
            };
            network.add_reaction(name, &coefficients, None)?;
        }
        debug!(
            nodes = self.num_nodes(),
            edges = self.num_edges(),
            "converted hypergraph into network"
        );
        Ok(network)
    }

    fn edge_coefficients(&self, name: &str) -> Option<IndexMap<String, f64>> {
        let nodes = self.edge_properties.get(name)?.get(NODES_KEY)?.as_object()?;
        Some(
            nodes
                .iter()
                .filter_map(|(n, c)| c.as_f64().map(|c| (n.clone(), c)))
                .collect(),
        )
    }
}

impl BaseGraph for Graph {
    fn set_edge(&mut self, name: &str, edge: HyperEdge) {
        self.edges.insert(name.to_string(), edge);
    }

    fn attach_node(&mut self, name: &str, edges: &[&str]) {
        let node = self.nodes.entry(name.to_string()).or_default();
        node.extend(edges.iter().map(|e| e.to_string()));
    }

    fn edge_properties(&self, name: &str) -> Option<&Attributes> {
        self.edge_properties.get(name)
    }

    fn set_edge_properties(&mut self, name: &str, properties: Attributes) {
        self.edge_properties.insert(name.to_string(), properties);
    }

    fn node_properties(&self, name: &str) -> Option<&Attributes> {
        self.node_properties.get(name)
    }

    fn set_node_properties(&mut self, name: &str, properties: Attributes) {
        self.node_properties.insert(name.to_string(), properties);
    }

    fn has_edge(&self, name: &str) -> bool {
        self.edges.contains_key(name)
    }

    fn has_node(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    fn remove_edge(&mut self, name: &str) -> Result<(), NetworkError> {
        let edge = self
            .edges
            .shift_remove(name)
            .ok_or_else(|| NetworkError::not_found(EntityKind::Edge, name))?;
        for node in edge.nodes() {
            if let Some(edges) = self.nodes.get_mut(node) {
                edges.shift_remove(name);
            }
        }
        self.edge_properties.shift_remove(name);
        Ok(())
    }

    fn remove_node(&mut self, name: &str) -> Result<(), NetworkError> {
        let edges = self
            .nodes
            .get(name)
            .cloned()
            .ok_or_else(|| NetworkError::not_found(EntityKind::Node, name))?;
        for edge_name in &edges {
            let emptied = match self.edges.get_mut(edge_name) {
                Some(edge) => {
                    edge.source.shift_remove(name);
                    edge.target.shift_remove(name);
                    edge.is_empty()
                }
                None => false,
            };
            if let Some(Value::Object(nodes)) = self
                .edge_properties
                .get_mut(edge_name)
                .and_then(|p| p.get_mut(NODES_KEY))
            {
                nodes.remove(name);
            }
            if emptied {
                self.remove_edge(edge_name)?;
            }
        }
        self.nodes.shift_remove(name);
        self.node_properties.shift_remove(name);
        Ok(())
    }
}
