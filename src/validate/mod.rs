//! Graph validation against the node catalog.
//!
//! Categories run in a fixed order. Diagnostics accumulate within a
//! category; a category that produced an error stops the run, since later
//! checks assume the earlier invariants.

pub mod declared;
pub mod existence;
pub mod params;
pub mod references;
pub mod structural;

use serde::Serialize;

use crate::catalog::NodeCatalog;
use crate::graph::{GraphIndex, NodeGraph};

/// Path used for graph-level diagnostics.
pub const GRAPH_PATH: &str = "$";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DiagnosticKind {
    Structural,
    UnknownType,
    Schema,
    Reference,
    Declared,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub code: &'static str,
    pub kind: DiagnosticKind,
    pub severity: Severity,
    /// Node id, edge id (`from->to`) or `$`.
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn error(
        code: &'static str,
        kind: DiagnosticKind,
        path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        ValidationError {
            code,
            kind,
            severity: Severity::Error,
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn warning(
        code: &'static str,
        kind: DiagnosticKind,
        path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        ValidationError {
            severity: Severity::Warning,
            ..ValidationError::error(code, kind, path, message)
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let level = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{} [{}] at '{}': {}", level, self.code, self.path, self.message)
    }
}

/// Validate `graph` against `catalog`. Pure and deterministic.
pub fn validate(graph: &NodeGraph, catalog: &NodeCatalog) -> Vec<ValidationError> {
    let index = GraphIndex::build(graph);
    let mut diagnostics = Vec::new();

    let stages: [&dyn Fn(&mut Vec<ValidationError>); 5] = [
        &|out| structural::validate_structural(graph, &index, out),
        &|out| existence::validate_types(graph, catalog, out),
        &|out| params::validate_params(graph, catalog, out),
        &|out| references::validate_references(graph, &index, out),
        &|out| declared::validate_declared(graph, catalog, out),
    ];

    for stage in stages {
        let mut found = Vec::new();
        stage(&mut found);
        let stop = has_errors(&found);
        diagnostics.extend(found);
        if stop {
            break;
        }
    }

    diagnostics
}

pub fn has_errors(diagnostics: &[ValidationError]) -> bool {
    diagnostics.iter().any(ValidationError::is_error)
}

pub fn errors_only(diagnostics: &[ValidationError]) -> Vec<ValidationError> {
    diagnostics.iter().filter(|d| d.is_error()).cloned().collect()
}
