pub mod catalog;
pub mod codegen;
pub mod error;
pub mod graph;
pub mod orchestrator;
pub mod validate;
pub mod wasm;
