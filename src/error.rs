//! Hard-failure error types. Validation diagnostics and tool failures are
//! recovered locally and never surface here.

use serde::Serialize;
use thiserror::Error;

use crate::catalog::CatalogError;
use crate::validate::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    Catalog,
    Parse,
    Validate,
    Codegen,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Catalog => write!(f, "Catalog"),
            Phase::Parse => write!(f, "Parse"),
            Phase::Validate => write!(f, "Validate"),
            Phase::Codegen => write!(f, "Codegen"),
        }
    }
}

/// Compilation was refused. Only raised when the caller broke the
/// precondition that graphs are validated first, or the catalog is empty.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("cannot compile: {0}")]
    Catalog(#[from] CatalogError),
    #[error("graph '{graph_id}' has unresolved errors: {}", summarize(.errors))]
    InvalidGraph {
        graph_id: String,
        errors: Vec<ValidationError>,
    },
}

fn summarize(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error("failed to parse graph JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Compile(#[from] CompileError),
}

impl Error {
    pub fn phase(&self) -> Phase {
        match self {
            Error::Catalog(_) => Phase::Catalog,
            Error::Parse(_) => Phase::Parse,
            Error::Compile(CompileError::Catalog(_)) => Phase::Catalog,
            Error::Compile(CompileError::InvalidGraph { .. }) => Phase::Validate,
        }
    }
}
