//! Parameter completeness and shape rules (P001–P004).

use serde_json::Value;

use super::{DiagnosticKind, ValidationError};
use crate::catalog::{Category, NodeCatalog, NodeType, ParamKind, ParamSpec};
use crate::graph::reference::pure_reference;
use crate::graph::{GraphNode, NodeGraph};

pub fn validate_params(graph: &NodeGraph, catalog: &NodeCatalog, errors: &mut Vec<ValidationError>) {
    for node in &graph.nodes {
        // Unknown types were already reported by the existence stage.
        let Some(node_type) = catalog.get(&node.node_type) else {
            continue;
        };

        for spec in &node_type.params_schema.params {
            match node.params.get(&spec.name) {
                Some(value) if !is_empty(value) => check_shape(node, node_type, spec, value, errors),
                _ if spec.required => errors.push(ValidationError::error(
                    "P001",
                    DiagnosticKind::Schema,
                    &node.id,
                    format!("Missing required parameter '{}'", spec.name),
                )),
                _ => {}
            }
        }

        for key in node.params.keys() {
            if node_type.params_schema.get(key).is_none() {
                errors.push(ValidationError::warning(
                    "P004",
                    DiagnosticKind::Schema,
                    &node.id,
                    format!("Unknown parameter '{}' for type '{}'", key, node_type.id),
                ));
            }
        }
    }
}

fn check_shape(
    node: &GraphNode,
    node_type: &NodeType,
    spec: &ParamSpec,
    value: &Value,
    errors: &mut Vec<ValidationError>,
) {
    if value.as_str().is_some_and(|s| pure_reference(s).is_some()) {
        // Trigger params are read by installTriggers(), outside any run.
        if node_type.category == Category::Trigger {
            errors.push(ValidationError::error(
                "P002",
                DiagnosticKind::Schema,
                &node.id,
                format!(
                    "Trigger parameter '{}' must be a literal {}, not a placeholder",
                    spec.name, spec.kind
                ),
            ));
        }
        // Elsewhere it is resolved at runtime and may carry any kind.
        return;
    }

    if !spec.kind.matches(value) {
        errors.push(ValidationError::error(
            "P002",
            DiagnosticKind::Schema,
            &node.id,
            format!(
                "Parameter '{}' must be a {}, got {}",
                spec.name,
                spec.kind,
                ParamKind::describe(value)
            ),
        ));
        return;
    }

    if let (Some(allowed), Some(s)) = (&spec.enum_values, value.as_str()) {
        if !allowed.iter().any(|a| a == s) {
            errors.push(ValidationError::error(
                "P003",
                DiagnosticKind::Schema,
                &node.id,
                format!(
                    "Parameter '{}' must be one of [{}], got '{}'",
                    spec.name,
                    allowed.join(", "),
                    s
                ),
            ));
        }
    }
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}
