//! Workflow graph IR: types, placeholder references and the adjacency index.

pub mod index;
pub mod reference;
pub mod types;

pub use index::GraphIndex;
pub use reference::{Placeholder, TemplatePart};
pub use types::*;

/// Deserialize a graph from its JSON wire form.
pub fn parse(json: &str) -> Result<NodeGraph, serde_json::Error> {
    serde_json::from_str(json)
}
