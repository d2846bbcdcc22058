//! End-to-end: goal → clarify → plan → validate → compile.

mod helpers;

use std::sync::Arc;

use flowsmith::catalog::builtin::{builtin_catalog, scopes};
use flowsmith::codegen::{compile_at, ENTRY_FILE, MANIFEST_FILE};
use flowsmith::orchestrator::{Orchestrator, OrchestratorConfig, PlanStatus, Source};
use flowsmith::validate;
use helpers::*;
use serde_json::json;

const GOAL: &str = "Send me a weekly digest of unread mail into a spreadsheet";

fn clarify_reply() -> String {
    json!({
        "questions": [
            { "id": "frequency", "text": "How often should the digest run?", "topic": "trigger" },
            { "id": "sheet_url", "text": "Which spreadsheet should receive the digest?", "topic": "resource" },
            { "id": "query", "text": "Should read mail be excluded?", "topic": "other" }
        ]
    })
    .to_string()
}

fn plan_reply() -> String {
    let mut graph: serde_json::Value = serde_json::from_str(WEEKLY_DIGEST_JSON).unwrap();
    graph.as_object_mut().unwrap().remove("id");
    graph_reply(graph, "Search unread mail weekly, append the count to the sheet.")
}

#[tokio::test]
async fn weekly_digest_end_to_end() {
    let catalog = Arc::new(builtin_catalog());
    let tool = Arc::new(ScriptedTool::ok(&[clarify_reply(), plan_reply()]));
    let orch = Orchestrator::new(catalog.clone(), tool.clone(), OrchestratorConfig::default()).unwrap();

    let clarify = orch.clarify(GOAL).await;
    assert_eq!(clarify.source, Source::Tool);
    let ids: Vec<&str> = clarify.questions.iter().map(|q| q.id.as_str()).collect();
    assert!(ids.contains(&"frequency") && ids.contains(&"sheet_url"));

    let answers = answers(&[
        ("frequency", "weekly"),
        ("sheet_url", "https://docs.google.com/spreadsheets/d/digest"),
    ]);
    let result = orch.run(GOAL, &answers).await;

    assert_eq!(result.status, PlanStatus::Clean);
    assert_eq!(result.source, Source::Tool);
    assert_eq!(result.fix_attempts, 0);
    assert_eq!(tool.request_count(), 2);

    let graph = &result.graph;
    let types: Vec<&str> = graph.nodes.iter().map(|n| n.node_type.as_str()).collect();
    assert_eq!(types, vec!["builtin.schedule", "gmail.search", "sheets.append_row"]);
    assert!(graph.scopes.contains(scopes::GMAIL_READONLY));
    assert!(graph.scopes.contains(scopes::SHEETS));
    assert!(validate::validate(graph, &catalog).is_empty());

    let output = compile_at(graph, &catalog, fixed_time()).unwrap();
    let code = &output.file(ENTRY_FILE).unwrap().content;
    let search = code.find("GmailApp.search(").unwrap();
    let append = code.find("appendRow(").unwrap();
    assert!(search < append);

    let manifest = &output.file(MANIFEST_FILE).unwrap().content;
    assert!(manifest.contains(scopes::GMAIL_READONLY));
    assert!(manifest.contains(scopes::SHEETS));
}

#[tokio::test]
async fn offline_session_still_compiles() {
    let catalog = Arc::new(builtin_catalog());
    let orch = Orchestrator::new(catalog.clone(), Arc::new(Unreachable), OrchestratorConfig::default()).unwrap();

    let result = orch.run(GOAL, &answers(&[("frequency", "weekly")])).await;
    assert_eq!(result.source, Source::Fallback);

    let output = compile_at(&result.graph, &catalog, fixed_time()).unwrap();
    let code = &output.file(ENTRY_FILE).unwrap().content;
    assert!(code.contains("onWeekDay(ScriptApp.WeekDay.MONDAY).atHour(9)"));
    assert!(code.contains("Logger.log("));
}
