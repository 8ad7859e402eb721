//! Bipartite graph view of a network, for export to external renderers
//!
//! Species and reactions both become nodes. A reactant gets an edge from the species to the
//! reaction, a product gets an edge from the reaction to the species, and each edge is weighted
//! by the stoichiometric coefficient.
use std::fmt::{Display, Formatter};

use indexmap::IndexMap;
use petgraph::graph::{DiGraph, NodeIndex};

use crate::network::renet::ReactionNetwork;

/// Node of the graph view
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum NetworkNode {
    Species(String),
    Reaction(String),
}

impl NetworkNode {
    pub fn name(&self) -> &str {
        match self {
            NetworkNode::Species(name) | NetworkNode::Reaction(name) => name,
        }
    }
}

impl Display for NetworkNode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Build the graph of the given (already validated) reactions and of the species they involve
pub(crate) fn build<N: ReactionNetwork>(
    network: &N,
    reaction_ids: &[usize],
) -> DiGraph<NetworkNode, f64> {
    let stoichiometry = network.stoichiometry();
    let species = network.species().as_slice();
    let mut graph = DiGraph::new();
    let mut species_nodes: IndexMap<usize, NodeIndex> = IndexMap::new();
    for &r in reaction_ids {
        let reaction = graph.add_node(NetworkNode::Reaction(
            network.reactions().as_slice()[r].clone(),
        ));
        for (s, &coefficient) in stoichiometry.column(r).iter().enumerate() {
            if coefficient == 0. {
                continue;
            }
            let node = *species_nodes
                .entry(s)
                .or_insert_with(|| graph.add_node(NetworkNode::Species(species[s].clone())));
            if coefficient < 0. {
                graph.add_edge(node, reaction, coefficient);
            } else {
                graph.add_edge(reaction, node, coefficient);
            }
        }
    }
    graph
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::{DenseNetwork, EntityRef};
    use nalgebra::DMatrix;
    use petgraph::Direction;

    fn abc() -> DenseNetwork {
        DenseNetwork::new(
            DMatrix::from_row_slice(3, 2, &[-1., 0., 2., -1., 0., 1.]),
            vec!["A".to_string(), "B".to_string(), "C".to_string()],
            vec!["R1".to_string(), "R2".to_string()],
        )
        .unwrap()
    }

    #[test]
    fn whole_network() {
        let graph = abc().to_graph(None).unwrap();
        assert_eq!(graph.node_count(), 5);
        assert_eq!(graph.edge_count(), 4);
        let b = graph
            .node_indices()
            .find(|i| graph[*i] == NetworkNode::Species("B".to_string()))
            .unwrap();
        let incoming: Vec<f64> = graph
            .edges_directed(b, Direction::Incoming)
            .map(|e| *e.weight())
            .collect();
        assert_eq!(incoming, vec![2.0]);
        assert_eq!(graph.neighbors_directed(b, Direction::Outgoing).count(), 1);
    }

    #[test]
    fn sub_selection() {
        let graph = abc().to_graph(Some(&[EntityRef::from("R2")])).unwrap();
        let names: Vec<String> = graph.node_weights().map(|n| n.to_string()).collect();
        assert_eq!(names, vec!["R2", "B", "C"]);
        assert!(abc().to_graph(Some(&[EntityRef::from("R9")])).is_err());
    }
}
