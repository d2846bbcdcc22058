//! Reference integrity rules (R001–R002): a node may only read outputs of
//! its direct or transitive predecessors.

use std::collections::BTreeSet;

use super::{DiagnosticKind, ValidationError};
use crate::graph::reference::collect_placeholders;
use crate::graph::{GraphIndex, NodeGraph, Placeholder};

pub fn validate_references(graph: &NodeGraph, index: &GraphIndex, errors: &mut Vec<ValidationError>) {
    for node in &graph.nodes {
        let ancestors = index.ancestors(&node.id);

        for (param, value) in &node.params {
            let targets: BTreeSet<String> = collect_placeholders(value)
                .into_iter()
                .filter_map(|p| match p {
                    Placeholder::Node { node_id, .. } => Some(node_id),
                    Placeholder::Secret { .. } => None,
                })
                .collect();

            for target in targets {
                if !index.contains(&target) {
                    errors.push(ValidationError::error(
                        "R001",
                        DiagnosticKind::Reference,
                        &node.id,
                        format!(
                            "Parameter '{}' references unknown node '{}'",
                            param, target
                        ),
                    ));
                } else if !ancestors.contains(&target) || target == node.id {
                    errors.push(ValidationError::error(
                        "R002",
                        DiagnosticKind::Reference,
                        &node.id,
                        format!(
                            "Parameter '{}' references node '{}', which does not run before '{}'",
                            param, target, node.id
                        ),
                    ));
                }
            }
        }
    }
}
