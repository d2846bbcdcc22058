//! Codegen pass: validated NodeGraph → Apps Script project file set.
//!
//! Public API: `compile(graph, catalog) -> Result<CompileOutput, CompileError>`.
//! Output is a pure function of the graph, the catalog and the generation
//! timestamp (`compile_at` takes it explicitly).

mod expr;
mod files;
mod handler;
mod rules;
mod trigger;
mod writer;

use std::collections::BTreeSet;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::catalog::NodeCatalog;
use crate::error::CompileError;
use crate::graph::{GraphIndex, NodeGraph};
use crate::validate::{self, errors_only};

pub const ENTRY_FILE: &str = "Code.gs";
pub const STATE_FILE: &str = "State.gs";
pub const HTTP_FILE: &str = "Http.gs";
pub const AUTH_FILE: &str = "Auth.gs";
pub const MANIFEST_FILE: &str = "appsscript.json";
pub const README_FILE: &str = "README.md";

/// A generated file with its path and content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedFile {
    pub path: String,
    pub content: String,
}

/// Non-fatal compiler diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompilerWarning {
    pub code: &'static str,
    pub node_id: String,
    pub message: String,
}

impl CompilerWarning {
    /// A node was compiled to a marked stub.
    pub fn stub(node_id: &str, type_id: &str) -> Self {
        CompilerWarning {
            code: "C001",
            node_id: node_id.into(),
            message: format!("No emission rule for '{}'; emitted a stub", type_id),
        }
    }
}

/// The complete output of the codegen pass.
#[derive(Debug, Clone, Serialize)]
pub struct CompileOutput {
    pub files: Vec<GeneratedFile>,
    pub warnings: Vec<CompilerWarning>,
    /// Scopes recomputed from the catalog, as written to the manifest.
    pub scopes: BTreeSet<String>,
    pub generated_at: DateTime<Utc>,
}

impl CompileOutput {
    pub fn file(&self, path: &str) -> Option<&GeneratedFile> {
        self.files.iter().find(|f| f.path == path)
    }
}

/// Compile with the current time as generation timestamp.
pub fn compile(graph: &NodeGraph, catalog: &NodeCatalog) -> Result<CompileOutput, CompileError> {
    compile_at(graph, catalog, Utc::now())
}

/// Compile a graph the validator accepts. Refuses graphs with any
/// error-severity diagnostic.
pub fn compile_at(
    graph: &NodeGraph,
    catalog: &NodeCatalog,
    generated_at: DateTime<Utc>,
) -> Result<CompileOutput, CompileError> {
    catalog.ensure_ready()?;

    let errors = errors_only(&validate::validate(graph, catalog));
    if !errors.is_empty() {
        return Err(CompileError::InvalidGraph {
            graph_id: graph.id.clone(),
            errors,
        });
    }

    // Scopes and secrets are never trusted from the input.
    let graph = graph.with_derived_fields(catalog);
    let order = GraphIndex::build(&graph)
        .topo_order()
        .map_err(|blocked| CompileError::InvalidGraph {
            graph_id: graph.id.clone(),
            errors: blocked
                .into_iter()
                .map(|id| {
                    validate::ValidationError::error(
                        "S003",
                        validate::DiagnosticKind::Structural,
                        id,
                        "Node cannot be ordered",
                    )
                })
                .collect(),
        })?;

    let stamp = generated_at.to_rfc3339_opts(SecondsFormat::Secs, true);
    let mut warnings = Vec::new();

    let code = handler::gen_code_gs(&graph, catalog, &order, &stamp, &mut warnings);
    let files = vec![
        GeneratedFile {
            path: ENTRY_FILE.into(),
            content: code,
        },
        GeneratedFile {
            path: STATE_FILE.into(),
            content: files::gen_state_gs(),
        },
        GeneratedFile {
            path: HTTP_FILE.into(),
            content: files::gen_http_gs(),
        },
        GeneratedFile {
            path: AUTH_FILE.into(),
            content: files::gen_auth_gs(&graph),
        },
        GeneratedFile {
            path: MANIFEST_FILE.into(),
            content: files::gen_manifest(&graph.scopes),
        },
        GeneratedFile {
            path: README_FILE.into(),
            content: files::gen_readme(&graph, catalog, &order, &graph.scopes, &stamp),
        },
    ];

    tracing::debug!(
        graph_id = %graph.id,
        nodes = order.len(),
        stubs = warnings.len(),
        "compiled graph"
    );

    Ok(CompileOutput {
        files,
        warnings,
        scopes: graph.scopes.clone(),
        generated_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::builtin::builtin_catalog;
    use crate::graph::{Edge, GraphNode};
    use serde_json::json;

    fn tiny() -> NodeGraph {
        let mut g = NodeGraph::new("tiny", "Tiny");
        g.nodes.push(GraphNode::new("t", "builtin.manual", "Start"));
        g.nodes.push(GraphNode::new("log", "builtin.log", "Say hi").with_param("message", json!("hi")));
        g.edges.push(Edge::new("t", "log"));
        g
    }

    #[test]
    fn codegen_produces_all_files_in_order() {
        let output = compile(&tiny(), &builtin_catalog()).unwrap();
        let paths: Vec<&str> = output.files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(
            paths,
            vec![ENTRY_FILE, STATE_FILE, HTTP_FILE, AUTH_FILE, MANIFEST_FILE, README_FILE]
        );
        assert!(output.warnings.is_empty());
    }

    #[test]
    fn empty_catalog_refuses() {
        let err = compile(&tiny(), &NodeCatalog::new()).unwrap_err();
        assert!(matches!(err, CompileError::Catalog(_)));
    }
}
