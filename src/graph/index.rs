//! petgraph-based adjacency index over a [`NodeGraph`].
//!
//! Nodes are keyed by id; the index never holds references into the graph,
//! so validation and code generation can build it freely.

use std::collections::{BTreeSet, HashMap};

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{Dfs, Reversed};
use petgraph::Direction;

use super::types::NodeGraph;

pub struct GraphIndex {
    pub graph: DiGraph<String, ()>,
    pub node_indices: HashMap<String, NodeIndex>,
}

impl GraphIndex {
    /// Build the index. Duplicate node ids keep their first occurrence and
    /// edges with an unknown endpoint are skipped; the validator reports both.
    pub fn build(graph: &NodeGraph) -> Self {
        let mut index = DiGraph::new();
        let mut node_indices = HashMap::new();

        for node in &graph.nodes {
            if node_indices.contains_key(&node.id) {
                continue;
            }
            let idx = index.add_node(node.id.clone());
            node_indices.insert(node.id.clone(), idx);
        }

        for edge in &graph.edges {
            if let (Some(&s), Some(&t)) = (node_indices.get(&edge.from), node_indices.get(&edge.to)) {
                if index.find_edge(s, t).is_none() {
                    index.add_edge(s, t, ());
                }
            }
        }

        GraphIndex {
            graph: index,
            node_indices,
        }
    }

    pub fn contains(&self, node_id: &str) -> bool {
        self.node_indices.contains_key(node_id)
    }

    /// All nodes that can reach `node_id` by following edges forward.
    /// `node_id` itself is included only if it sits on a cycle.
    pub fn ancestors(&self, node_id: &str) -> BTreeSet<String> {
        let Some(&start) = self.node_indices.get(node_id) else {
            return BTreeSet::new();
        };
        let reversed = Reversed(&self.graph);
        let mut found = BTreeSet::new();
        let mut dfs = Dfs::empty(reversed);
        for pred in self.graph.neighbors_directed(start, Direction::Incoming) {
            dfs.move_to(pred);
            while let Some(nx) = dfs.next(reversed) {
                found.insert(self.graph[nx].clone());
            }
        }
        found
    }

    /// Every cycle as a sorted member list, ordered by first member.
    /// Self-loops count as one-node cycles.
    pub fn cycles(&self) -> Vec<Vec<String>> {
        let mut cycles: Vec<Vec<String>> = tarjan_scc(&self.graph)
            .into_iter()
            .filter(|scc| {
                scc.len() > 1 || self.graph.find_edge(scc[0], scc[0]).is_some()
            })
            .map(|scc| {
                let mut ids: Vec<String> = scc.iter().map(|&i| self.graph[i].clone()).collect();
                ids.sort();
                ids
            })
            .collect();
        cycles.sort();
        cycles
    }

    /// Kahn's algorithm with ties broken by node id.
    ///
    /// `Err` carries the ids that could not be ordered, sorted.
    pub fn topo_order(&self) -> Result<Vec<String>, Vec<String>> {
        let mut in_degree: HashMap<NodeIndex, usize> = self
            .graph
            .node_indices()
            .map(|i| (i, self.graph.neighbors_directed(i, Direction::Incoming).count()))
            .collect();

        let mut ready: BTreeSet<(String, NodeIndex)> = in_degree
            .iter()
            .filter(|&(_, &d)| d == 0)
            .map(|(&i, _)| (self.graph[i].clone(), i))
            .collect();

        let mut order = Vec::with_capacity(self.graph.node_count());
        while let Some((id, idx)) = ready.pop_first() {
            order.push(id);
            for succ in self.graph.neighbors_directed(idx, Direction::Outgoing) {
                if let Some(d) = in_degree.get_mut(&succ) {
                    *d -= 1;
                    if *d == 0 {
                        ready.insert((self.graph[succ].clone(), succ));
                    }
                }
            }
        }

        if order.len() == self.graph.node_count() {
            return Ok(order);
        }

        let placed: BTreeSet<&String> = order.iter().collect();
        let mut blocked: Vec<String> = self
            .graph
            .node_indices()
            .map(|i| &self.graph[i])
            .filter(|id| !placed.contains(id))
            .cloned()
            .collect();
        blocked.sort();
        Err(blocked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::types::{Edge, GraphNode};

    fn graph(nodes: &[&str], edges: &[(&str, &str)]) -> NodeGraph {
        let mut g = NodeGraph::new("g", "G");
        g.nodes = nodes.iter().map(|id| GraphNode::new(id, "builtin.log", id)).collect();
        g.edges = edges.iter().map(|(a, b)| Edge::new(a, b)).collect();
        g
    }

    #[test]
    fn topo_order_breaks_ties_by_id() {
        let g = graph(&["t", "c", "b", "a"], &[("t", "c"), ("t", "b"), ("t", "a")]);
        let order = GraphIndex::build(&g).topo_order().unwrap();
        assert_eq!(order, vec!["t", "a", "b", "c"]);
    }

    #[test]
    fn topo_order_respects_edges_over_ids() {
        let g = graph(&["a", "z"], &[("z", "a")]);
        assert_eq!(GraphIndex::build(&g).topo_order().unwrap(), vec!["z", "a"]);
    }

    #[test]
    fn topo_order_reports_blocked_nodes() {
        let g = graph(&["a", "b", "c", "d"], &[("a", "b"), ("b", "c"), ("c", "b"), ("c", "d")]);
        assert_eq!(
            GraphIndex::build(&g).topo_order().unwrap_err(),
            vec!["b", "c", "d"]
        );
    }

    #[test]
    fn cycles_are_grouped_per_component() {
        let g = graph(&["a", "b", "c"], &[("a", "b"), ("b", "a"), ("c", "c")]);
        assert_eq!(
            GraphIndex::build(&g).cycles(),
            vec![vec!["a".to_string(), "b".to_string()], vec!["c".to_string()]]
        );
    }

    #[test]
    fn ancestors_are_transitive() {
        let g = graph(&["a", "b", "c", "x"], &[("a", "b"), ("b", "c")]);
        let index = GraphIndex::build(&g);
        let anc = index.ancestors("c");
        assert!(anc.contains("a") && anc.contains("b"));
        assert!(!anc.contains("c") && !anc.contains("x"));
        assert!(index.ancestors("a").is_empty());
    }

    #[test]
    fn dangling_edges_and_duplicates_are_skipped() {
        let mut g = graph(&["a", "a", "b"], &[("a", "b"), ("a", "ghost")]);
        g.edges.push(Edge::new("a", "b"));
        let index = GraphIndex::build(&g);
        assert_eq!(index.graph.node_count(), 2);
        assert_eq!(index.graph.edge_count(), 1);
        assert!(index.ancestors("b").contains("a"));
    }
}
