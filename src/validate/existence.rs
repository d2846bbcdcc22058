//! Type existence rule (T001).

use super::{DiagnosticKind, ValidationError};
use crate::catalog::NodeCatalog;
use crate::graph::NodeGraph;

pub fn validate_types(graph: &NodeGraph, catalog: &NodeCatalog, errors: &mut Vec<ValidationError>) {
    for node in &graph.nodes {
        if catalog.get(&node.node_type).is_none() {
            let mut message = format!("Unknown node type '{}'", node.node_type);
            if let Some(hit) = catalog.search(&node.node_type.replace(['.', '_'], " ")).first() {
                message.push_str(&format!("; closest match is '{}'", hit.type_id));
            }
            errors.push(ValidationError::error(
                "T001",
                DiagnosticKind::UnknownType,
                &node.id,
                message,
            ));
        }
    }
}
