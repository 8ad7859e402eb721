//! Module providing a generic labeled hypergraph
//!
//! Edges connect a set of source nodes to a set of target nodes. Nodes and edges carry free
//! form JSON attributes, and a hypergraph can be converted into a
//! [`DenseNetwork`](crate::network::DenseNetwork) with [`Graph::to_network`].
use indexmap::{IndexMap, IndexSet};
use serde_json::Value;

use crate::network::{EntityKind, NetworkError};

pub mod hypergraph;

pub use hypergraph::Graph;

/// Attribute map of a node or an edge
pub type Attributes = IndexMap<String, Value>;

/// Edge attribute marking a directed edge
pub const DIRECTED_KEY: &str = "__directed__";
/// Edge attribute holding the coefficients of an edge created from a coefficient map
pub const NODES_KEY: &str = "__nodes__";

/// Source and target node sets of an edge
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HyperEdge {
    pub source: IndexSet<String>,
    pub target: IndexSet<String>,
}

impl HyperEdge {
    pub fn new<S, T>(source: S, target: T) -> Self
    where
        S: IntoIterator,
        S::Item: Into<String>,
        T: IntoIterator,
        T::Item: Into<String>,
    {
        HyperEdge {
            source: source.into_iter().map(Into::into).collect(),
            target: target.into_iter().map(Into::into).collect(),
        }
    }

    /// Every node of the edge, sources first
    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.source.union(&self.target).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.source.is_empty() && self.target.is_empty()
    }
}

/// Storage independent hypergraph operations
///
/// Implementors provide node and edge storage, the insertion logic is shared.
pub trait BaseGraph: Clone {
    // region Storage primitives
    /// Store an edge, replacing any edge with the same name
    fn set_edge(&mut self, name: &str, edge: HyperEdge);

    /// Make sure a node exists and record that it belongs to the given edges
    fn attach_node(&mut self, name: &str, edges: &[&str]);

    fn edge_properties(&self, name: &str) -> Option<&Attributes>;

    fn set_edge_properties(&mut self, name: &str, properties: Attributes);

    fn node_properties(&self, name: &str) -> Option<&Attributes>;

    fn set_node_properties(&mut self, name: &str, properties: Attributes);

    fn has_edge(&self, name: &str) -> bool;

    fn has_node(&self, name: &str) -> bool;

    /// Remove an edge along with its properties, its nodes are kept
    fn remove_edge(&mut self, name: &str) -> Result<(), NetworkError>;

    /// Remove a node from the graph and from every edge, dropping edges left without nodes
    fn remove_node(&mut self, name: &str) -> Result<(), NetworkError>;
    // endregion Storage primitives

    fn remove_edges(&mut self, edges: &[&str]) -> Result<(), NetworkError> {
        edges.iter().try_for_each(|e| self.remove_edge(e))
    }

    fn remove_nodes(&mut self, nodes: &[&str]) -> Result<(), NetworkError> {
        nodes.iter().try_for_each(|n| self.remove_node(n))
    }

    /// Attach properties to an edge
    ///
    /// Properties are set as given when the edge has none. Otherwise they are merged into the
    /// existing ones if `update` is true, and ignored if it is false.
    fn add_edge_properties(&mut self, name: &str, properties: Attributes, update: bool) {
        match self.edge_properties(name).cloned() {
            None => self.set_edge_properties(name, properties),
            Some(mut existing) => {
                if update {
                    existing.extend(properties);
                    self.set_edge_properties(name, existing);
                }
            }
        }
    }

    /// Add a node to the graph
    ///
    /// # Parameters
    /// - `name`: Name of the node
    /// - `properties`: Optional node properties, merged into the existing ones if `update`
    /// - `update`: Whether an existing node may be updated instead of raising an error
    ///
    /// # Errors
    /// [`NetworkError::DuplicateEntity`] if the node exists and `update` is false
    fn add_node(
        &mut self,
        name: &str,
        properties: Option<Attributes>,
        update: bool,
    ) -> Result<(), NetworkError> {
        if !update && self.has_node(name) {
            return Err(NetworkError::duplicate(EntityKind::Node, name));
        }
        self.attach_node(name, &[]);
        if let Some(properties) = properties {
            let merged = match (update, self.node_properties(name).cloned()) {
                (true, Some(mut existing)) => {
                    existing.extend(properties);
                    existing
                }
                _ => properties,
            };
            self.set_node_properties(name, merged);
        }
        Ok(())
    }

    /// Add several nodes, with optional properties keyed by node name
    fn add_nodes(
        &mut self,
        nodes: &[&str],
        properties: Option<&IndexMap<String, Attributes>>,
        update: bool,
    ) -> Result<(), NetworkError> {
        if !update {
            let mut seen: IndexSet<&str> = IndexSet::with_capacity(nodes.len());
            for &node in nodes {
                if self.has_node(node) || !seen.insert(node) {
                    return Err(NetworkError::duplicate(EntityKind::Node, node));
                }
            }
        }
        for node in nodes {
            let node_properties = properties.and_then(|p| p.get(*node)).cloned();
            self.add_node(node, node_properties, update)?;
        }
        Ok(())
    }

    /// Add an edge, creating its nodes when needed
    ///
    /// Directed edges get the [`DIRECTED_KEY`] property. Updating an existing edge detaches it
    /// from its old nodes and keeps its properties.
    ///
    /// # Errors
    /// [`NetworkError::DuplicateEntity`] if the edge exists and `update` is false
    fn add_edge(
        &mut self,
        name: &str,
        edge: HyperEdge,
        directed: bool,
        properties: Option<Attributes>,
        update: bool,
    ) -> Result<(), NetworkError> {
        if self.has_edge(name) {
            if !update {
                return Err(NetworkError::duplicate(EntityKind::Edge, name));
            }
            let previous = self.edge_properties(name).cloned();
            self.remove_edge(name)?;
            if let Some(previous) = previous {
                self.set_edge_properties(name, previous);
            }
        }
        for node in edge.nodes() {
            self.attach_node(node, &[name]);
        }
        let properties = if directed {
            let mut properties = properties.unwrap_or_default();
            properties.insert(DIRECTED_KEY.to_string(), Value::Bool(true));
            Some(properties)
        } else {
            properties
        };
        if let Some(properties) = properties {
            self.add_edge_properties(name, properties, update);
        }
        self.set_edge(name, edge);
        Ok(())
    }

    /// Add an edge from a coefficient map, negative coefficients are sources and positive
    /// coefficients targets
    ///
    /// The coefficients are kept under the [`NODES_KEY`] property.
    fn add_edge_from_coefficients(
        &mut self,
        name: &str,
        coefficients: &IndexMap<String, f64>,
    ) -> Result<(), NetworkError> {
        if self.has_edge(name) {
            return Err(NetworkError::duplicate(EntityKind::Edge, name));
        }
        let edge = HyperEdge::new(
            coefficients.iter().filter(|(_, c)| **c < 0.).map(|(n, _)| n.as_str()),
            coefficients.iter().filter(|(_, c)| **c > 0.).map(|(n, _)| n.as_str()),
        );
        for node in edge.nodes() {
            self.attach_node(node, &[name]);
        }
        self.set_edge(name, edge);
        let nodes: serde_json::Map<String, Value> = coefficients
            .iter()
            .map(|(n, c)| (n.clone(), Value::from(*c)))
            .collect();
        let mut properties = Attributes::new();
        properties.insert(NODES_KEY.to_string(), Value::Object(nodes));
        self.add_edge_properties(name, properties, true);
        Ok(())
    }
}
