//! Structural rules (S001–S005): ids, edge endpoints and acyclicity.

use std::collections::HashSet;

use super::{DiagnosticKind, GRAPH_PATH, ValidationError};
use crate::graph::{GraphIndex, NodeGraph};

pub fn validate_structural(graph: &NodeGraph, index: &GraphIndex, errors: &mut Vec<ValidationError>) {
    s005_non_empty(graph, errors);
    s001_unique_node_ids(graph, errors);
    s002_edges_reference_existing_nodes(graph, index, errors);
    s004_no_duplicate_edges(graph, errors);
    s003_no_cycles(index, errors);
}

fn s005_non_empty(graph: &NodeGraph, errors: &mut Vec<ValidationError>) {
    if graph.nodes.is_empty() {
        errors.push(ValidationError::error(
            "S005",
            DiagnosticKind::Structural,
            GRAPH_PATH,
            "Graph must contain at least one node",
        ));
    }
}

fn s001_unique_node_ids(graph: &NodeGraph, errors: &mut Vec<ValidationError>) {
    let mut seen = HashSet::new();
    for node in &graph.nodes {
        if node.id.trim().is_empty() {
            errors.push(ValidationError::error(
                "S001",
                DiagnosticKind::Structural,
                GRAPH_PATH,
                "Node id must not be empty",
            ));
        } else if !seen.insert(node.id.as_str()) {
            errors.push(ValidationError::error(
                "S001",
                DiagnosticKind::Structural,
                &node.id,
                format!("Duplicate node id '{}'", node.id),
            ));
        }
    }
}

fn s002_edges_reference_existing_nodes(
    graph: &NodeGraph,
    index: &GraphIndex,
    errors: &mut Vec<ValidationError>,
) {
    for edge in &graph.edges {
        for (end, id) in [("source", &edge.from), ("target", &edge.to)] {
            if !index.contains(id) {
                errors.push(ValidationError::error(
                    "S002",
                    DiagnosticKind::Structural,
                    edge.id(),
                    format!("Edge '{}' references unknown {} node '{}'", edge.id(), end, id),
                ));
            }
        }
    }
}

fn s004_no_duplicate_edges(graph: &NodeGraph, errors: &mut Vec<ValidationError>) {
    let mut seen = HashSet::new();
    for edge in &graph.edges {
        if !seen.insert((edge.from.as_str(), edge.to.as_str())) {
            errors.push(ValidationError::warning(
                "S004",
                DiagnosticKind::Structural,
                edge.id(),
                format!("Duplicate edge from '{}' to '{}'", edge.from, edge.to),
            ));
        }
    }
}

/// One diagnostic per cycle, located at its smallest member.
fn s003_no_cycles(index: &GraphIndex, errors: &mut Vec<ValidationError>) {
    for members in index.cycles() {
        let message = if members.len() == 1 {
            format!("Node '{}' depends on itself", members[0])
        } else {
            format!("Nodes {} form a cycle", quoted_list(&members))
        };
        errors.push(ValidationError::error(
            "S003",
            DiagnosticKind::Structural,
            &members[0],
            message,
        ));
    }
}

fn quoted_list(ids: &[String]) -> String {
    ids.iter()
        .map(|id| format!("'{}'", id))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Edge, GraphNode};

    fn run(graph: &NodeGraph) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        validate_structural(graph, &GraphIndex::build(graph), &mut errors);
        errors
    }

    fn graph(nodes: &[&str], edges: &[(&str, &str)]) -> NodeGraph {
        let mut g = NodeGraph::new("g", "G");
        g.nodes = nodes.iter().map(|id| GraphNode::new(id, "builtin.log", id)).collect();
        g.edges = edges.iter().map(|(a, b)| Edge::new(a, b)).collect();
        g
    }

    #[test]
    fn two_node_cycle_is_one_error() {
        let errors = run(&graph(&["a", "b"], &[("a", "b"), ("b", "a")]));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, "S003");
        assert_eq!(errors[0].path, "a");
    }

    #[test]
    fn self_loop_is_a_cycle() {
        let errors = run(&graph(&["a"], &[("a", "a")]));
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("depends on itself"));
    }

    #[test]
    fn dangling_edge_is_reported_at_edge_path() {
        let errors = run(&graph(&["a"], &[("a", "ghost")]));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, "S002");
        assert_eq!(errors[0].path, "a->ghost");
    }

    #[test]
    fn duplicate_node_id() {
        let errors = run(&graph(&["a", "a"], &[]));
        assert_eq!(errors[0].code, "S001");
        assert_eq!(errors[0].path, "a");
    }

    #[test]
    fn duplicate_edge_is_warning() {
        let errors = run(&graph(&["a", "b"], &[("a", "b"), ("a", "b")]));
        assert_eq!(errors.len(), 1);
        assert!(!errors[0].is_error());
    }

    #[test]
    fn empty_graph() {
        let errors = run(&graph(&[], &[]));
        assert_eq!(errors[0].code, "S005");
        assert_eq!(errors[0].path, GRAPH_PATH);
    }
}
