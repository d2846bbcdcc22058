//! WASM entry points for browser use. All of them run against the builtin
//! catalog.

use wasm_bindgen::prelude::*;

use crate::catalog::builtin::builtin_catalog;
use crate::codegen::{self, CompilerWarning};
use crate::error::{CompileError, Error, Phase};
use crate::validate::ValidationError;

/// Validate a graph JSON. Returns an array of diagnostics (warnings
/// included).
#[wasm_bindgen]
pub fn validate_graph_json(json: &str) -> JsValue {
    let result = validate_graph_inner(json);
    serde_wasm_bindgen::to_value(&result).unwrap_or(JsValue::NULL)
}

fn validate_graph_inner(json: &str) -> Vec<ErrorDto> {
    let graph = match crate::graph::parse(json) {
        Ok(g) => g,
        Err(e) => return vec![ErrorDto::from_error(&Error::Parse(e))],
    };
    crate::validate::validate(&graph, &builtin_catalog())
        .iter()
        .map(ErrorDto::from)
        .collect()
}

/// Parse → validate → codegen. Returns `{status: "success", files,
/// warnings}` or `{status: "errors", errors}`.
#[wasm_bindgen]
pub fn compile_graph_json(json: &str) -> JsValue {
    let result = compile_graph_inner(json);
    serde_wasm_bindgen::to_value(&result).unwrap_or(JsValue::NULL)
}

fn compile_graph_inner(json: &str) -> CompileResult {
    let graph = match crate::graph::parse(json) {
        Ok(g) => g,
        Err(e) => {
            return CompileResult::Errors {
                errors: vec![ErrorDto::from_error(&Error::Parse(e))],
            };
        }
    };

    match codegen::compile(&graph, &builtin_catalog()) {
        Ok(output) => CompileResult::Success {
            files: output
                .files
                .into_iter()
                .map(|f| FileDto {
                    path: f.path,
                    content: f.content,
                })
                .collect(),
            warnings: output.warnings.iter().map(ErrorDto::from).collect(),
        },
        Err(CompileError::InvalidGraph { errors, .. }) => CompileResult::Errors {
            errors: errors.iter().map(ErrorDto::from).collect(),
        },
        Err(e) => CompileResult::Errors {
            errors: vec![ErrorDto::from_error(&Error::Compile(e))],
        },
    }
}

/// The planner-facing capabilities projection of the builtin catalog.
#[wasm_bindgen]
pub fn capabilities_json() -> JsValue {
    let caps = builtin_catalog().capabilities();
    serde_wasm_bindgen::to_value(&caps).unwrap_or(JsValue::NULL)
}

// ---------------------------------------------------------------------------
// DTOs for serialization to JS
// ---------------------------------------------------------------------------

#[derive(Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorDto {
    code: String,
    phase: String,
    severity: String,
    message: String,
    path: Option<String>,
}

impl ErrorDto {
    fn from_error(e: &Error) -> Self {
        ErrorDto {
            code: match e.phase() {
                Phase::Parse => "J001",
                _ => "E001",
            }
            .into(),
            phase: e.phase().to_string(),
            severity: "error".into(),
            message: e.to_string(),
            path: None,
        }
    }
}

impl From<&ValidationError> for ErrorDto {
    fn from(e: &ValidationError) -> Self {
        ErrorDto {
            code: e.code.into(),
            phase: Phase::Validate.to_string(),
            severity: if e.is_error() { "error" } else { "warning" }.into(),
            message: e.message.clone(),
            path: Some(e.path.clone()),
        }
    }
}

impl From<&CompilerWarning> for ErrorDto {
    fn from(w: &CompilerWarning) -> Self {
        ErrorDto {
            code: w.code.into(),
            phase: Phase::Codegen.to_string(),
            severity: "warning".into(),
            message: w.message.clone(),
            path: Some(w.node_id.clone()),
        }
    }
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
struct FileDto {
    path: String,
    content: String,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
enum CompileResult {
    Success {
        files: Vec<FileDto>,
        warnings: Vec<ErrorDto>,
    },
    Errors {
        errors: Vec<ErrorDto>,
    },
}
