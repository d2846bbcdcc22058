//! Deterministic substitutes used whenever the tool is unavailable or its
//! output cannot be used.

use std::collections::BTreeMap;

use serde_json::json;

use super::{Question, QuestionTopic};
use crate::catalog::builtin::{FREQUENCIES, LOG_ACTION, SCHEDULE_TRIGGER};
use crate::catalog::NodeCatalog;
use crate::graph::{Edge, GraphNode, NodeGraph};

const ID_WORDS: usize = 6;

/// Keyword table: goal substring → question asked when it appears.
const KEYWORD_QUESTIONS: &[(&[&str], &str, QuestionTopic, &str)] = &[
    (
        &["mail", "inbox", "gmail"],
        "mail_query",
        QuestionTopic::Resource,
        "Which messages should be included (for example a search like \"is:unread label:reports\")?",
    ),
    (
        &["sheet", "spreadsheet"],
        "sheet_url",
        QuestionTopic::Resource,
        "What is the URL of the spreadsheet to use?",
    ),
    (
        &["calendar", "meeting", "event"],
        "calendar_id",
        QuestionTopic::Resource,
        "Which calendar should be used (leave empty for your primary calendar)?",
    ),
    (
        &["drive", "folder", "file", "document"],
        "folder_id",
        QuestionTopic::Resource,
        "Which Drive folder should files be read from or written to?",
    ),
    (
        &["form", "survey"],
        "form_id",
        QuestionTopic::Resource,
        "What is the id of the form?",
    ),
    (
        &["slack", "webhook", "api", "http"],
        "external_credential",
        QuestionTopic::Credential,
        "Which external service credential (webhook URL or API key) should be stored as a secret?",
    ),
];

/// Always asked, in this order, after the keyword questions.
const GENERIC_QUESTIONS: &[(&str, QuestionTopic, &str)] = &[
    (
        "frequency",
        QuestionTopic::Trigger,
        "How often should this run (minutes, hourly, daily, weekly or monthly)?",
    ),
    (
        "notify_email",
        QuestionTopic::Other,
        "Who should be emailed if a run fails?",
    ),
    (
        "exclusions",
        QuestionTopic::Other,
        "Are there any items that should be skipped?",
    ),
    (
        "output_format",
        QuestionTopic::Other,
        "How should the result be formatted?",
    ),
];

fn question(id: &str, topic: QuestionTopic, text: &str) -> Question {
    Question {
        id: id.into(),
        text: text.into(),
        topic,
    }
}

/// Questions derived from goal keywords, then the generic ones.
pub fn fallback_questions(goal: &str) -> Vec<Question> {
    let lowered = goal.to_lowercase();
    let keyword = KEYWORD_QUESTIONS
        .iter()
        .filter(|(keys, ..)| keys.iter().any(|k| lowered.contains(k)))
        .map(|(_, id, topic, text)| question(id, *topic, text));
    let generic = GENERIC_QUESTIONS
        .iter()
        .map(|(id, topic, text)| question(id, *topic, text));
    keyword.chain(generic).collect()
}

/// Bring `questions` into `min..=max`: drop duplicates by id, pad from the
/// fallback list, truncate.
pub fn bound_questions(questions: Vec<Question>, goal: &str, min: usize, max: usize) -> Vec<Question> {
    let mut bounded: Vec<Question> = Vec::new();
    for q in questions {
        if !q.text.trim().is_empty() && !bounded.iter().any(|b| b.id == q.id) {
            bounded.push(q);
        }
    }
    if bounded.len() < min {
        for q in fallback_questions(goal) {
            if bounded.len() >= min {
                break;
            }
            if !bounded.iter().any(|b| b.id == q.id) {
                bounded.push(q);
            }
        }
    }
    bounded.truncate(max);
    bounded
}

/// Deterministic graph id for a goal: `wf-` plus its first words.
pub fn graph_id_for(goal: &str) -> String {
    let slug = goal
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
        .take(ID_WORDS)
        .map(|w| w.to_ascii_lowercase())
        .collect::<Vec<_>>()
        .join("-");
    if slug.is_empty() {
        "wf-untitled".into()
    } else {
        format!("wf-{}", slug)
    }
}

/// Minimal valid workflow: a schedule trigger feeding a log action. Uses
/// the `frequency` answer when it names a known cadence, daily otherwise.
pub fn fallback_graph(
    goal: &str,
    answers: &BTreeMap<String, String>,
    catalog: &NodeCatalog,
) -> NodeGraph {
    let frequency = answers
        .get("frequency")
        .map(|f| f.trim().to_lowercase())
        .filter(|f| FREQUENCIES.contains(&f.as_str()))
        .unwrap_or_else(|| "daily".into());

    let name = if goal.trim().is_empty() {
        "Untitled workflow".to_string()
    } else {
        goal.trim().to_string()
    };

    let mut graph = NodeGraph::new(&graph_id_for(goal), &name);
    graph.nodes.push(
        GraphNode::new("trigger", SCHEDULE_TRIGGER, "Scheduled start")
            .with_param("frequency", json!(frequency)),
    );
    graph.nodes.push(
        GraphNode::new("log", LOG_ACTION, "Record run")
            .with_param("message", json!(format!("Placeholder workflow for: {}", name))),
    );
    graph.edges.push(Edge::new("trigger", "log"));
    graph.metadata.insert("fallback".into(), json!(true));
    graph.metadata.insert("goal".into(), json!(goal));
    graph.with_derived_fields(catalog)
}
