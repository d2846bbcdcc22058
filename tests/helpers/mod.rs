#![allow(dead_code)]

use std::collections::{BTreeMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::json;

use flowsmith::graph::{Edge, GraphNode, NodeGraph};
use flowsmith::orchestrator::{TextGenerator, ToolError, ToolRequest};

// =============================================================================
// Graph builders
// =============================================================================

pub const WEEKLY_DIGEST_JSON: &str = include_str!("../fixtures/weekly_digest.json");
pub const CYCLE_JSON: &str = include_str!("../fixtures/cycle.json");

pub fn weekly_digest() -> NodeGraph {
    flowsmith::graph::parse(WEEKLY_DIGEST_JSON).expect("fixture parses")
}

/// Graph from `(id, type, params)` triples and `(from, to)` pairs.
pub fn graph_of(nodes: &[(&str, &str, serde_json::Value)], edges: &[(&str, &str)]) -> NodeGraph {
    let mut graph = NodeGraph::new("test-graph", "Test graph");
    for (id, node_type, params) in nodes {
        let mut node = GraphNode::new(id, node_type, id);
        if let Some(map) = params.as_object() {
            for (k, v) in map {
                node = node.with_param(k, v.clone());
            }
        }
        graph.nodes.push(node);
    }
    for (from, to) in edges {
        graph.edges.push(Edge::new(from, to));
    }
    graph
}

/// Manual trigger → log, the smallest graph that validates.
pub fn hello_graph() -> NodeGraph {
    graph_of(
        &[
            ("start", "builtin.manual", json!({})),
            ("log", "builtin.log", json!({ "message": "hello" })),
        ],
        &[("start", "log")],
    )
}

pub fn answers(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

pub fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 9, 30, 0).unwrap()
}

// =============================================================================
// Tool doubles
// =============================================================================

/// Replies with queued responses in order, then reports itself unreachable.
/// Records every request it sees.
pub struct ScriptedTool {
    replies: Mutex<VecDeque<Result<String, ToolError>>>,
    pub requests: Mutex<Vec<ToolRequest>>,
}

impl ScriptedTool {
    pub fn new(replies: Vec<Result<String, ToolError>>) -> Self {
        ScriptedTool {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn ok<S: AsRef<str>>(replies: &[S]) -> Self {
        Self::new(replies.iter().map(|r| Ok(r.as_ref().to_string())).collect())
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl TextGenerator for ScriptedTool {
    async fn generate(&self, request: &ToolRequest) -> Result<String, ToolError> {
        self.requests.lock().unwrap().push(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ToolError::Unreachable("script exhausted".into())))
    }
}

pub struct Unreachable;

#[async_trait]
impl TextGenerator for Unreachable {
    async fn generate(&self, _request: &ToolRequest) -> Result<String, ToolError> {
        Err(ToolError::Unreachable("connection refused".into()))
    }
}

/// Never answers within any sane timeout.
pub struct Hanging;

#[async_trait]
impl TextGenerator for Hanging {
    async fn generate(&self, _request: &ToolRequest) -> Result<String, ToolError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok("{}".into())
    }
}

/// Wrap a graph JSON value as a planner reply.
pub fn graph_reply(graph: serde_json::Value, rationale: &str) -> String {
    json!({ "graph": graph, "rationale": rationale }).to_string()
}
