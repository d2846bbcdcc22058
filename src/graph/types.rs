//! Workflow graph IR: the JSON-facing node/edge model exchanged with the
//! planner and handed to the validator and code generator.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::reference::{collect_placeholders, Placeholder};
use crate::catalog::NodeCatalog;

// =============================================================================
// NODES & EDGES
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub params: BTreeMap<String, serde_json::Value>,
}

impl GraphNode {
    pub fn new(id: &str, node_type: &str, label: &str) -> Self {
        GraphNode {
            id: id.into(),
            node_type: node_type.into(),
            label: label.into(),
            params: BTreeMap::new(),
        }
    }

    pub fn with_param(mut self, name: &str, value: serde_json::Value) -> Self {
        self.params.insert(name.into(), value);
        self
    }
}

/// `to` runs after `from` and may consume its outputs.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub from: String,
    pub to: String,
}

impl Edge {
    pub fn new(from: &str, to: &str) -> Self {
        Edge {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Diagnostic path for this edge.
    pub fn id(&self) -> String {
        format!("{}->{}", self.from, self.to)
    }
}

// =============================================================================
// GRAPH
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeGraph {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub nodes: Vec<GraphNode>,
    #[serde(default)]
    pub edges: Vec<Edge>,
    /// Union of catalog scopes over the node types. Always derived.
    #[serde(default)]
    pub scopes: BTreeSet<String>,
    /// Credential placeholder names referenced from params.
    #[serde(default)]
    pub secrets: BTreeSet<String>,
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

fn default_version() -> String {
    "1".into()
}

impl NodeGraph {
    pub fn new(id: &str, name: &str) -> Self {
        NodeGraph {
            id: id.into(),
            name: name.into(),
            version: default_version(),
            nodes: Vec::new(),
            edges: Vec::new(),
            scopes: BTreeSet::new(),
            secrets: BTreeSet::new(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Union of `requiredScopes` over the node types that resolve in `catalog`.
    pub fn computed_scopes(&self, catalog: &NodeCatalog) -> BTreeSet<String> {
        self.nodes
            .iter()
            .filter_map(|n| catalog.get(&n.node_type))
            .flat_map(|nt| nt.required_scopes.iter().cloned())
            .collect()
    }

    /// Secret names referenced by `{{secrets.NAME}}` placeholders.
    pub fn referenced_secrets(&self) -> BTreeSet<String> {
        let mut secrets = BTreeSet::new();
        for node in &self.nodes {
            for value in node.params.values() {
                for placeholder in collect_placeholders(value) {
                    if let Placeholder::Secret { name } = placeholder {
                        secrets.insert(name);
                    }
                }
            }
        }
        secrets
    }

    /// A copy with `scopes` and `secrets` recomputed.
    pub fn with_derived_fields(&self, catalog: &NodeCatalog) -> NodeGraph {
        NodeGraph {
            scopes: self.computed_scopes(catalog),
            secrets: self.referenced_secrets(),
            ..self.clone()
        }
    }
}
