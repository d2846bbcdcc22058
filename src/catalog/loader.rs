//! Load per-application connector descriptors into a catalog.
//!
//! A descriptor is one JSON file per app:
//!
//! ```json
//! { "app": "notion",
//!   "operations": [
//!     { "operation": "create_page", "name": "Create page", "category": "action",
//!       "params": [{ "name": "title", "kind": "string", "required": true }],
//!       "scopes": ["https://www.googleapis.com/auth/script.external_request"] } ] }
//! ```

use std::collections::BTreeSet;
use std::path::Path;

use serde::Deserialize;

use super::types::*;
use super::{CatalogError, NodeCatalog};

#[derive(Debug, Deserialize)]
struct ConnectorDescriptor {
    app: String,
    #[serde(default)]
    operations: Vec<OperationDescriptor>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OperationDescriptor {
    operation: String,
    name: String,
    category: Category,
    #[serde(default)]
    description: String,
    #[serde(default)]
    params: Vec<ParamSpec>,
    #[serde(default)]
    scopes: BTreeSet<String>,
    #[serde(default)]
    implementation_hint: Option<String>,
}

/// Parse one descriptor's text into node types. `source` names the file in
/// error messages.
pub fn parse_descriptor(source: &str, json: &str) -> Result<Vec<NodeType>, CatalogError> {
    let descriptor: ConnectorDescriptor =
        serde_json::from_str(json).map_err(|e| CatalogError::Descriptor {
            file: source.to_string(),
            reason: e.to_string(),
        })?;

    if descriptor.app.trim().is_empty() {
        return Err(CatalogError::Descriptor {
            file: source.to_string(),
            reason: "app must not be empty".into(),
        });
    }

    descriptor
        .operations
        .into_iter()
        .map(|op| {
            if op.operation.trim().is_empty() {
                return Err(CatalogError::Descriptor {
                    file: source.to_string(),
                    reason: "operation must not be empty".into(),
                });
            }
            Ok(NodeType {
                id: format!("{}.{}", descriptor.app, op.operation),
                category: op.category,
                app: descriptor.app.clone(),
                operation: op.operation,
                name: op.name,
                description: op.description,
                params_schema: ParamsSchema::new(op.params),
                required_scopes: op.scopes,
                implementation_hint: op.implementation_hint,
            })
        })
        .collect()
}

/// Register every operation of one descriptor.
pub fn load_str(
    catalog: &mut NodeCatalog,
    source: &str,
    json: &str,
) -> Result<usize, CatalogError> {
    let types = parse_descriptor(source, json)?;
    let count = types.len();
    for nt in types {
        catalog.register(nt)?;
    }
    Ok(count)
}

/// Register every `*.json` descriptor in `dir`, in file-name order.
pub fn load_dir(catalog: &mut NodeCatalog, dir: &Path) -> Result<usize, CatalogError> {
    let io_err = |e: std::io::Error| CatalogError::Descriptor {
        file: dir.display().to_string(),
        reason: e.to_string(),
    };

    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if path.extension().is_some_and(|ext| ext == "json") {
            paths.push(path);
        }
    }
    paths.sort();

    let mut total = 0;
    for path in &paths {
        let name = path.display().to_string();
        let text = std::fs::read_to_string(path).map_err(|e| CatalogError::Descriptor {
            file: name.clone(),
            reason: e.to_string(),
        })?;
        total += load_str(catalog, &name, &text)?;
    }

    tracing::debug!(dir = %dir.display(), files = paths.len(), types = total, "loaded connector descriptors");
    Ok(total)
}
