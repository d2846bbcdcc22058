//! Emit `Code.gs`: the `runWorkflow` entry point with one fragment per node
//! in topological order, followed by `installTriggers`.

use crate::catalog::{Category, NodeCatalog, NodeType};
use crate::graph::{GraphNode, NodeGraph};

use super::rules::{self, Emission};
use super::trigger;
use super::writer::CodeWriter;
use super::CompilerWarning;

pub fn gen_code_gs(
    graph: &NodeGraph,
    catalog: &NodeCatalog,
    order: &[String],
    generated_at: &str,
    warnings: &mut Vec<CompilerWarning>,
) -> String {
    let mut w = CodeWriter::new();

    w.comment(&format!("Generated by flowsmith at {}. Do not edit by hand.", generated_at));
    w.comment(&format!("Workflow: {} ({}, version {})", graph.name, graph.id, graph.version));
    w.comment(&format!("Execution order: {}", order.join(" -> ")));
    w.blank();

    let steps: Vec<(&GraphNode, &NodeType)> = order
        .iter()
        .filter_map(|id| graph.node(id))
        .filter_map(|node| catalog.get(&node.node_type).map(|nt| (node, nt)))
        .collect();

    w.block_open("function runWorkflow(e)");
    w.line("const ctx = createExecutionState_(e);");
    for (node, node_type) in &steps {
        w.blank();
        if rules::emit_node(node, node_type, &mut w) == Emission::Stub {
            tracing::warn!(node_id = %node.id, node_type = %node_type.id, "compiled node to a stub");
            warnings.push(CompilerWarning::stub(&node.id, &node_type.id));
        }
    }
    w.blank();
    w.line("finishExecution_(ctx);");
    w.line("return ctx;");
    w.block_close();
    w.blank();

    let triggers: Vec<(&GraphNode, &NodeType)> = steps
        .iter()
        .copied()
        .filter(|(_, nt)| nt.category == Category::Trigger)
        .collect();
    trigger::emit_install_triggers(&triggers, &mut w);

    w.finish()
}
