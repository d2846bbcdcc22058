//! Node catalog: the registry of operation types and their contracts.
//!
//! Built once at startup (see [`builtin`] and [`loader`]) and shared
//! read-only as `Arc<NodeCatalog>` afterwards.

pub mod builtin;
pub mod loader;
pub mod types;

pub use types::*;

use std::collections::BTreeMap;

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum CatalogError {
    #[error("node type '{id}' is already registered as {existing}, cannot re-register as {attempted}")]
    DuplicateType {
        id: String,
        existing: Category,
        attempted: Category,
    },
    #[error("node type '{0}' not found")]
    NotFound(String),
    #[error("node catalog is empty; it must be populated at startup")]
    Empty,
    #[error("invalid connector descriptor '{file}': {reason}")]
    Descriptor { file: String, reason: String },
}

#[derive(Debug, Clone, Default)]
pub struct NodeCatalog {
    types: BTreeMap<String, NodeType>,
}

impl NodeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an entry. Replacing is allowed as long as the
    /// category stays the same.
    pub fn register(&mut self, node_type: NodeType) -> Result<(), CatalogError> {
        if let Some(existing) = self.types.get(&node_type.id) {
            if existing.category != node_type.category {
                return Err(CatalogError::DuplicateType {
                    id: node_type.id.clone(),
                    existing: existing.category,
                    attempted: node_type.category,
                });
            }
            tracing::debug!(type_id = %node_type.id, "overwriting catalog entry");
        }
        self.types.insert(node_type.id.clone(), node_type);
        Ok(())
    }

    pub fn lookup(&self, type_id: &str) -> Result<&NodeType, CatalogError> {
        self.types
            .get(type_id)
            .ok_or_else(|| CatalogError::NotFound(type_id.to_string()))
    }

    pub fn get(&self, type_id: &str) -> Option<&NodeType> {
        self.types.get(type_id)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Entries in id order.
    pub fn iter(&self) -> impl Iterator<Item = &NodeType> {
        self.types.values()
    }

    /// Fails with [`CatalogError::Empty`] when nothing was loaded.
    pub fn ensure_ready(&self) -> Result<(), CatalogError> {
        if self.is_empty() {
            return Err(CatalogError::Empty);
        }
        Ok(())
    }

    /// Rank entries against `query` by a substring heuristic.
    ///
    /// Every whitespace-separated term contributes independently; the result
    /// is sorted by descending score, ties by type id.
    pub fn search(&self, query: &str) -> Vec<SearchHit> {
        let terms: Vec<String> = query
            .split_whitespace()
            .map(|t| t.to_lowercase())
            .collect();
        if terms.is_empty() {
            return Vec::new();
        }

        let mut hits: Vec<SearchHit> = self
            .types
            .values()
            .filter_map(|nt| {
                let score: u32 = terms.iter().map(|t| score_term(nt, t)).sum();
                (score > 0).then(|| SearchHit {
                    type_id: nt.id.clone(),
                    score,
                })
            })
            .collect();

        hits.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.type_id.cmp(&b.type_id)));
        hits
    }

    /// Public projection for the planner.
    pub fn capabilities(&self) -> Capabilities {
        let mut summaries = BTreeMap::new();
        let mut schemas_by_type = BTreeMap::new();
        let mut scopes_by_type = BTreeMap::new();

        for nt in self.types.values() {
            summaries.insert(
                nt.id.clone(),
                TypeSummary {
                    category: nt.category,
                    app: nt.app.clone(),
                    name: nt.name.clone(),
                    description: nt.description.clone(),
                },
            );
            schemas_by_type.insert(nt.id.clone(), nt.params_schema.clone());
            scopes_by_type.insert(nt.id.clone(), nt.required_scopes.clone());
        }

        Capabilities {
            nodes: self.types.keys().cloned().collect(),
            summaries,
            schemas_by_type,
            scopes_by_type,
        }
    }
}

fn score_term(nt: &NodeType, term: &str) -> u32 {
    let id = nt.id.to_lowercase();
    let name = nt.name.to_lowercase();
    let mut score = 0;

    if id == term || name == term {
        score += 10;
    } else {
        if id.contains(term) {
            score += 5;
        }
        if name.contains(term) {
            score += 4;
        }
    }
    if nt.app.eq_ignore_ascii_case(term) {
        score += 3;
    }
    if nt.category.to_string() == term {
        score += 2;
    }
    if score == 0 && nt.description.to_lowercase().contains(term) {
        score += 1;
    }
    score
}
