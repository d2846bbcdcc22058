//! Prompt construction. Every prompt asks for a single JSON object; the
//! response is parsed defensively regardless.

use std::collections::BTreeMap;

use serde_json::json;

use super::tool::ToolRequest;
use crate::catalog::Capabilities;
use crate::graph::NodeGraph;
use crate::validate::ValidationError;

const CLARIFY_SYSTEM: &str = "\
You help office workers describe automations for their productivity suite.
Given a goal, ask the clarifying questions needed to build the workflow:
which resources (spreadsheets, folders, calendars, mail queries) it touches,
what starts it and how often, and which external credentials it needs.
Respond with one JSON object and nothing else:
{\"questions\": [{\"id\": \"snake_case_key\", \"text\": \"...\", \"topic\": \"resource|trigger|credential|other\"}],
 \"draftGraph\": <optional best-guess workflow graph>}";

const PLAN_SYSTEM: &str = "\
You turn an automation goal into a workflow graph.
Use only node types listed in the capabilities. Every node has an id, a type,
a label and params matching the type's parameter schema.
Edges {\"from\", \"to\"} order execution; the graph must be acyclic and start
with exactly the trigger nodes it needs.
To use an earlier node's output write {{nodeId.field}}; the referenced node
must be an upstream predecessor. Write credentials as {{secrets.NAME}}, never
as literal values.
Respond with one JSON object and nothing else:
{\"graph\": {\"name\": \"...\", \"nodes\": [...], \"edges\": [...]}, \"rationale\": \"...\"}";

const FIX_SYSTEM: &str = "\
You repair a workflow graph that failed validation.
Change nothing except what is needed to resolve the listed errors.
Keep the node types already in the graph unless an error says a type is unknown.
Respond with one JSON object and nothing else:
{\"graph\": {...}, \"rationale\": \"...\"}";

fn pretty(value: serde_json::Value) -> String {
    serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string())
}

pub fn clarify_request(goal: &str, capabilities: &Capabilities) -> ToolRequest {
    ToolRequest {
        system: CLARIFY_SYSTEM.into(),
        user: pretty(json!({
            "goal": goal,
            "availableNodeTypes": capabilities.summaries,
        })),
    }
}

pub fn plan_request(
    goal: &str,
    answers: &BTreeMap<String, String>,
    capabilities: &Capabilities,
) -> ToolRequest {
    ToolRequest {
        system: PLAN_SYSTEM.into(),
        user: pretty(json!({
            "goal": goal,
            "answers": answers,
            "capabilities": capabilities,
        })),
    }
}

/// Only the current graph and the error list go back to the tool.
pub fn fix_request(graph: &NodeGraph, errors: &[ValidationError]) -> ToolRequest {
    let errors: Vec<_> = errors
        .iter()
        .map(|e| json!({ "code": e.code, "path": e.path, "message": e.message }))
        .collect();
    ToolRequest {
        system: FIX_SYSTEM.into(),
        user: pretty(json!({
            "graph": graph,
            "errors": errors,
        })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::builtin::builtin_catalog;
    use crate::validate::DiagnosticKind;

    #[test]
    fn plan_prompt_embeds_goal_answers_and_capabilities() {
        let caps = builtin_catalog().capabilities();
        let mut answers = BTreeMap::new();
        answers.insert("frequency".to_string(), "weekly".to_string());
        let req = plan_request("digest my mail", &answers, &caps);

        let user: serde_json::Value = serde_json::from_str(&req.user).unwrap();
        assert_eq!(user["goal"], "digest my mail");
        assert_eq!(user["answers"]["frequency"], "weekly");
        assert!(req.user.contains("gmail.search"));
        assert!(req.system.contains("{{nodeId.field}}"));
    }

    #[test]
    fn fix_prompt_carries_error_list() {
        let graph = NodeGraph::new("g", "G");
        let errors = vec![ValidationError::error(
            "P001",
            DiagnosticKind::Schema,
            "send.params.to",
            "Missing required param 'to'",
        )];
        let req = fix_request(&graph, &errors);
        let user: serde_json::Value = serde_json::from_str(&req.user).unwrap();
        assert_eq!(user["errors"][0]["code"], "P001");
        assert_eq!(user["graph"]["id"], "g");
        let keys: Vec<&String> = user.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["errors", "graph"]);
    }
}
