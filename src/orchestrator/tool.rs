//! The external text-generation tool boundary.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// One request to the tool: a system instruction plus a user instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolRequest {
    pub system: String,
    pub user: String,
}

/// Anything that went wrong between asking the tool and holding a usable,
/// well-shaped response. Always converted into a fallback by the
/// orchestrator.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ToolError {
    #[error("tool unreachable: {0}")]
    Unreachable(String),
    #[error("tool call timed out after {0:?}")]
    Timeout(Duration),
    /// The provider answered but refused the request.
    #[error("tool rejected the request: {0}")]
    Rejected(String),
    #[error("tool output is not parseable: {0}")]
    Unparseable(String),
    #[error("tool output has the wrong shape: {0}")]
    Shape(String),
}

/// `(systemPrompt, userPrompt) -> responseText`. Implementations wrap a
/// language-model provider; the output shape is never trusted.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, request: &ToolRequest) -> Result<String, ToolError>;
}

/// Run one tool call under `limit`. A timeout is reported as
/// [`ToolError::Timeout`].
pub async fn generate_with_timeout(
    tool: &dyn TextGenerator,
    request: &ToolRequest,
    limit: Duration,
) -> Result<String, ToolError> {
    match tokio::time::timeout(limit, tool.generate(request)).await {
        Ok(result) => result,
        Err(_) => Err(ToolError::Timeout(limit)),
    }
}
