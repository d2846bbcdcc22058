//! Declared-set rules (D001–D002). Both are warnings: the compiler always
//! recomputes scopes and secrets.

use super::{DiagnosticKind, GRAPH_PATH, ValidationError};
use crate::catalog::NodeCatalog;
use crate::graph::NodeGraph;

pub fn validate_declared(graph: &NodeGraph, catalog: &NodeCatalog, errors: &mut Vec<ValidationError>) {
    d001_scopes_match_catalog(graph, catalog, errors);
    d002_secrets_declared(graph, errors);
}

fn d001_scopes_match_catalog(graph: &NodeGraph, catalog: &NodeCatalog, errors: &mut Vec<ValidationError>) {
    let computed = graph.computed_scopes(catalog);
    if computed == graph.scopes {
        return;
    }

    let missing: Vec<&str> = computed.difference(&graph.scopes).map(String::as_str).collect();
    let extra: Vec<&str> = graph.scopes.difference(&computed).map(String::as_str).collect();
    let mut message = String::from("Declared scopes differ from the catalog");
    if !missing.is_empty() {
        message.push_str(&format!("; missing [{}]", missing.join(", ")));
    }
    if !extra.is_empty() {
        message.push_str(&format!("; unexpected [{}]", extra.join(", ")));
    }
    errors.push(ValidationError::warning("D001", DiagnosticKind::Declared, GRAPH_PATH, message));
}

fn d002_secrets_declared(graph: &NodeGraph, errors: &mut Vec<ValidationError>) {
    for name in graph.referenced_secrets().difference(&graph.secrets) {
        errors.push(ValidationError::warning(
            "D002",
            DiagnosticKind::Declared,
            GRAPH_PATH,
            format!("Secret '{}' is referenced but not declared", name),
        ));
    }
}
