//! Orchestrator sessions against scripted tool doubles.

mod helpers;

use std::collections::BTreeMap;
use std::sync::Arc;

use flowsmith::catalog::builtin::{builtin_catalog, scopes, LOG_ACTION, SCHEDULE_TRIGGER};
use flowsmith::orchestrator::{
    FixAttempt, Orchestrator, OrchestratorConfig, PlanStatus, Source, TextGenerator, ToolError,
};
use flowsmith::validate::{self, has_errors};
use helpers::*;
use serde_json::json;

fn orchestrator(tool: Arc<dyn TextGenerator>) -> Orchestrator {
    Orchestrator::new(Arc::new(builtin_catalog()), tool, OrchestratorConfig::default()).unwrap()
}

/// Manual trigger → gmail.send with the given params.
fn send_graph(params: serde_json::Value) -> serde_json::Value {
    json!({
        "name": "Send a note",
        "nodes": [
            { "id": "start", "type": "builtin.manual" },
            { "id": "send", "type": "gmail.send", "params": params }
        ],
        "edges": [{ "from": "start", "to": "send" }]
    })
}

fn complete_send() -> serde_json::Value {
    send_graph(json!({ "to": "team@example.com", "subject": "Note", "body": "Hello" }))
}

#[tokio::test]
async fn unreachable_tool_yields_valid_fallback() {
    let orch = orchestrator(Arc::new(Unreachable));
    let result = orch.run("Tidy my inbox", &BTreeMap::new()).await;

    assert_eq!(result.source, Source::Fallback);
    assert_eq!(result.status, PlanStatus::Clean);
    assert_eq!(result.fix_attempts, 0);
    assert!(!has_errors(&validate::validate(&result.graph, &builtin_catalog())));

    let types: Vec<&str> = result.graph.nodes.iter().map(|n| n.node_type.as_str()).collect();
    assert_eq!(types, vec![SCHEDULE_TRIGGER, LOG_ACTION]);
}

#[tokio::test]
async fn timeout_is_treated_like_unreachable() {
    let config = OrchestratorConfig {
        tool_timeout_ms: 20,
        ..OrchestratorConfig::default()
    };
    let orch = Orchestrator::new(Arc::new(builtin_catalog()), Arc::new(Hanging), config).unwrap();

    let outcome = orch.plan("Anything", &answers(&[("frequency", "hourly")])).await;
    assert_eq!(outcome.source, Source::Fallback);
    assert_eq!(outcome.graph.nodes[0].params["frequency"], json!("hourly"));

    let clarify = orch.clarify("Anything").await;
    assert_eq!(clarify.source, Source::Fallback);
}

#[tokio::test]
async fn prose_wrapped_plan_is_accepted() {
    let reply = format!(
        "Here is the workflow you asked for:\n```json\n{}\n```\nLet me know!",
        graph_reply(complete_send(), "Sends one note")
    );
    let tool = Arc::new(ScriptedTool::new(vec![Ok(reply)]));
    let result = orchestrator(tool.clone()).run("Send a note", &BTreeMap::new()).await;

    assert_eq!(result.source, Source::Tool);
    assert_eq!(result.status, PlanStatus::Clean);
    assert_eq!(result.rationale, "Sends one note");
    assert_eq!(result.graph.id, "wf-send-a-note");
    assert_eq!(tool.request_count(), 1);
}

#[tokio::test]
async fn wrong_shape_falls_back() {
    let tool = Arc::new(ScriptedTool::ok(&[r#"{"workflow": "not a graph"}"#]));
    let outcome = orchestrator(tool).plan("Send a note", &BTreeMap::new()).await;
    assert_eq!(outcome.source, Source::Fallback);
    assert!(outcome.rationale.contains("wrong shape"));
}

#[tokio::test]
async fn tool_declared_scopes_are_replaced() {
    let mut graph = complete_send();
    graph["scopes"] = json!(["https://example.com/everything"]);
    let tool = Arc::new(ScriptedTool::ok(&[&graph_reply(graph, "")]));

    let outcome = orchestrator(tool).plan("Send a note", &BTreeMap::new()).await;
    assert_eq!(
        outcome.graph.scopes.iter().map(String::as_str).collect::<Vec<_>>(),
        vec![scopes::GMAIL_SEND]
    );
}

#[tokio::test]
async fn fix_loop_reaches_clean() {
    let broken = send_graph(json!({ "to": "team@example.com", "subject": "Note" }));
    let tool = Arc::new(ScriptedTool::ok(&[
        &graph_reply(broken, "first try"),
        &graph_reply(complete_send(), "added body"),
    ]));
    let result = orchestrator(tool.clone()).run("Send a note", &BTreeMap::new()).await;

    assert_eq!(result.status, PlanStatus::Clean);
    assert_eq!(result.fix_attempts, 1);
    assert!(result.diagnostics.is_empty());
    assert_eq!(result.rationale, "first try");

    let requests = tool.requests.lock().unwrap();
    assert_eq!(requests.len(), 2);
    assert!(requests[1].user.contains("P001"));
    assert!(requests[1].user.contains("'body'"));
}

#[tokio::test]
async fn exhausted_fix_attempts_are_best_effort() {
    let broken = graph_reply(send_graph(json!({ "to": "team@example.com" })), "");
    let tool = Arc::new(ScriptedTool::ok(&[&broken, &broken, &broken, &broken]));
    let result = orchestrator(tool.clone()).run("Send a note", &BTreeMap::new()).await;

    assert_eq!(result.status, PlanStatus::BestEffort);
    assert_eq!(result.fix_attempts, 3);
    assert!(has_errors(&result.diagnostics));
    assert_eq!(tool.request_count(), 4);
}

#[tokio::test]
async fn best_graph_is_kept() {
    let two_errors = send_graph(json!({ "to": "team@example.com" }));
    let one_error = send_graph(json!({ "to": "team@example.com", "subject": "Note" }));
    let three_errors = send_graph(json!({}));
    let tool = Arc::new(ScriptedTool::new(vec![
        Ok(graph_reply(two_errors, "")),
        Ok(graph_reply(one_error, "")),
        Ok(graph_reply(three_errors, "")),
        Err(ToolError::Rejected("quota".into())),
    ]));
    let result = orchestrator(tool).run("Send a note", &BTreeMap::new()).await;

    assert_eq!(result.status, PlanStatus::BestEffort);
    assert_eq!(result.fix_attempts, 3);
    let errors: Vec<&str> = result.diagnostics.iter().map(|d| d.code).collect();
    assert_eq!(errors, vec!["P001"]);
    assert_eq!(result.graph.node("send").unwrap().params["subject"], json!("Note"));
}

#[tokio::test]
async fn failed_fix_reports_reason() {
    let orch = orchestrator(Arc::new(Unreachable));
    let graph = weekly_digest();
    match orch.fix(&graph, &[]).await {
        FixAttempt::Failed(ToolError::Unreachable(reason)) => assert_eq!(reason, "connection refused"),
        other => panic!("unexpected: {:?}", other),
    }
}

#[tokio::test]
async fn clarify_fallback_is_bounded() {
    let orch = orchestrator(Arc::new(Unreachable));
    let outcome = orch.clarify("Weekly digest of unread mail into a spreadsheet").await;

    assert_eq!(outcome.source, Source::Fallback);
    assert!((3..=7).contains(&outcome.questions.len()));
    assert_eq!(outcome.questions[0].id, "mail_query");
    assert!(outcome.draft_graph.is_none());
}

#[tokio::test]
async fn clarify_truncates_long_lists() {
    let questions: Vec<_> = (0..10)
        .map(|i| json!({ "id": format!("q{i}"), "text": format!("Question {i}?"), "topic": "other" }))
        .collect();
    let reply = json!({ "questions": questions, "draftGraph": complete_send() }).to_string();
    let tool = Arc::new(ScriptedTool::ok(&[&reply]));

    let outcome = orchestrator(tool).clarify("Send a note").await;
    assert_eq!(outcome.source, Source::Tool);
    assert_eq!(outcome.questions.len(), 7);
    assert_eq!(outcome.questions[6].id, "q6");
    let draft = outcome.draft_graph.unwrap();
    assert_eq!(draft.id, "wf-send-a-note");
    assert!(draft.scopes.contains(scopes::GMAIL_SEND));
}

#[tokio::test]
async fn clarify_garbage_falls_back() {
    let tool = Arc::new(ScriptedTool::ok(&["I would ask about your spreadsheet."]));
    let outcome = orchestrator(tool).clarify("Log rows to a spreadsheet").await;
    assert_eq!(outcome.source, Source::Fallback);
    assert_eq!(outcome.questions[0].id, "sheet_url");
}
