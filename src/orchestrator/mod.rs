//! Planning session driver: clarify → plan → validate → bounded fix loop.
//!
//! The text-generation tool is untrusted. Every call is bounded by a
//! timeout, every response is parsed defensively, and every failure turns
//! into a deterministic fallback so a session always ends with a graph.

pub mod config;
pub mod fallback;
pub mod parse;
pub mod prompts;
pub mod tool;

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::catalog::{Capabilities, CatalogError, NodeCatalog};
use crate::graph::NodeGraph;
use crate::validate::{self, errors_only, has_errors, ValidationError};

pub use config::OrchestratorConfig;
pub use parse::{extract_first_object, parse_response, ParseOutcome};
pub use tool::{generate_with_timeout, TextGenerator, ToolError, ToolRequest};

// =============================================================================
// SESSION TYPES
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionTopic {
    Resource,
    Trigger,
    Credential,
    #[default]
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    #[serde(alias = "question")]
    pub text: String,
    #[serde(default)]
    pub topic: QuestionTopic,
}

/// Where a phase's result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Tool,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClarifyOutcome {
    pub questions: Vec<Question>,
    pub draft_graph: Option<NodeGraph>,
    pub source: Source,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanOutcome {
    pub graph: NodeGraph,
    pub rationale: String,
    pub source: Source,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FixAttempt {
    Replaced { graph: NodeGraph, rationale: String },
    Failed(ToolError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PlanStatus {
    /// The graph passed validation.
    Clean,
    /// Fix attempts ran out; `diagnostics` still carries errors.
    BestEffort,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanResult {
    pub graph: NodeGraph,
    pub rationale: String,
    pub status: PlanStatus,
    pub diagnostics: Vec<ValidationError>,
    pub fix_attempts: u32,
    pub source: Source,
}

// Tool response shapes.

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClarifyResponse {
    questions: Vec<Question>,
    #[serde(default)]
    draft_graph: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct GraphResponse {
    graph: NodeGraph,
    #[serde(default)]
    rationale: String,
}

// =============================================================================
// ORCHESTRATOR
// =============================================================================

pub struct Orchestrator {
    catalog: Arc<NodeCatalog>,
    capabilities: Capabilities,
    tool: Arc<dyn TextGenerator>,
    config: OrchestratorConfig,
}

impl Orchestrator {
    pub fn new(
        catalog: Arc<NodeCatalog>,
        tool: Arc<dyn TextGenerator>,
        config: OrchestratorConfig,
    ) -> Result<Self, CatalogError> {
        catalog.ensure_ready()?;
        let capabilities = catalog.capabilities();
        Ok(Orchestrator {
            catalog,
            capabilities,
            tool,
            config: config.normalized(),
        })
    }

    /// One bounded tool call, parsed as `T`.
    async fn ask<T: serde::de::DeserializeOwned>(&self, request: ToolRequest) -> Result<T, ToolError> {
        let raw = generate_with_timeout(self.tool.as_ref(), &request, self.config.tool_timeout()).await?;
        match parse_response::<T>(&raw) {
            ParseOutcome::Parsed(value) => Ok(value),
            ParseOutcome::Syntax(reason) => Err(ToolError::Unparseable(reason)),
            ParseOutcome::Shape(reason) => Err(ToolError::Shape(reason)),
        }
    }

    /// Clarifying questions for `goal`, bounded to the configured range.
    #[tracing::instrument(skip_all, fields(goal = %goal))]
    pub async fn clarify(&self, goal: &str) -> ClarifyOutcome {
        let (min, max) = (self.config.min_questions, self.config.max_questions);
        let request = prompts::clarify_request(goal, &self.capabilities);

        match self.ask::<ClarifyResponse>(request).await {
            Ok(response) if !response.questions.is_empty() => {
                let draft_graph = response
                    .draft_graph
                    .and_then(|v| serde_json::from_value::<NodeGraph>(v).ok())
                    .map(|g| self.normalize(g, goal));
                let questions = fallback::bound_questions(response.questions, goal, min, max);
                tracing::debug!(questions = questions.len(), draft = draft_graph.is_some(), "clarified");
                ClarifyOutcome {
                    questions,
                    draft_graph,
                    source: Source::Tool,
                }
            }
            Ok(_) => {
                tracing::warn!("tool returned no questions; using fallback questions");
                self.fallback_clarify(goal)
            }
            Err(reason) => {
                tracing::warn!(%reason, "clarify call failed; using fallback questions");
                self.fallback_clarify(goal)
            }
        }
    }

    fn fallback_clarify(&self, goal: &str) -> ClarifyOutcome {
        let questions = fallback::fallback_questions(goal);
        ClarifyOutcome {
            questions: fallback::bound_questions(
                questions,
                goal,
                self.config.min_questions,
                self.config.max_questions,
            ),
            draft_graph: None,
            source: Source::Fallback,
        }
    }

    /// Proposed graph for `goal` given the user's answers.
    #[tracing::instrument(skip_all, fields(goal = %goal, answers = answers.len()))]
    pub async fn plan(&self, goal: &str, answers: &BTreeMap<String, String>) -> PlanOutcome {
        let request = prompts::plan_request(goal, answers, &self.capabilities);

        match self.ask::<GraphResponse>(request).await {
            Ok(response) => {
                let graph = self.normalize(response.graph, goal);
                tracing::debug!(graph_id = %graph.id, nodes = graph.nodes.len(), "planned");
                PlanOutcome {
                    graph,
                    rationale: response.rationale,
                    source: Source::Tool,
                }
            }
            Err(reason) => {
                tracing::warn!(%reason, "plan call failed; using fallback graph");
                PlanOutcome {
                    graph: fallback::fallback_graph(goal, answers, &self.catalog),
                    rationale: format!("Fallback plan used because the planner was unavailable: {}", reason),
                    source: Source::Fallback,
                }
            }
        }
    }

    /// Ask for a corrected graph. The replacement keeps the identity
    /// (`id`, `name`, `version`) of `graph`.
    #[tracing::instrument(skip_all, fields(graph_id = %graph.id, errors = errors.len()))]
    pub async fn fix(&self, graph: &NodeGraph, errors: &[ValidationError]) -> FixAttempt {
        let request = prompts::fix_request(graph, errors);

        match self.ask::<GraphResponse>(request).await {
            Ok(response) => {
                let replacement = NodeGraph {
                    id: graph.id.clone(),
                    name: graph.name.clone(),
                    version: graph.version.clone(),
                    ..response.graph
                };
                FixAttempt::Replaced {
                    graph: replacement.with_derived_fields(&self.catalog),
                    rationale: response.rationale,
                }
            }
            Err(reason) => FixAttempt::Failed(reason),
        }
    }

    /// Plan, validate and repair until the graph is clean or the fix budget
    /// runs out. The returned graph is the one with the fewest errors seen.
    #[tracing::instrument(skip_all, fields(goal = %goal))]
    pub async fn run(&self, goal: &str, answers: &BTreeMap<String, String>) -> PlanResult {
        let plan = self.plan(goal, answers).await;

        let mut current = plan.graph;
        let mut diagnostics = validate::validate(&current, &self.catalog);
        let mut best = (current.clone(), diagnostics.clone());
        let mut fix_attempts = 0;

        while has_errors(&diagnostics) && fix_attempts < self.config.max_fix_attempts {
            fix_attempts += 1;
            match self.fix(&current, &errors_only(&diagnostics)).await {
                FixAttempt::Replaced { graph, .. } => {
                    current = graph;
                    diagnostics = validate::validate(&current, &self.catalog);
                    if error_count(&diagnostics) < error_count(&best.1) {
                        best = (current.clone(), diagnostics.clone());
                    }
                    tracing::debug!(
                        attempt = fix_attempts,
                        errors = error_count(&diagnostics),
                        "fix attempt applied"
                    );
                }
                FixAttempt::Failed(reason) => {
                    tracing::warn!(attempt = fix_attempts, %reason, "fix attempt failed");
                }
            }
        }

        let (graph, diagnostics) = best;
        let status = if has_errors(&diagnostics) {
            PlanStatus::BestEffort
        } else {
            PlanStatus::Clean
        };
        tracing::info!(
            graph_id = %graph.id,
            ?status,
            fix_attempts,
            source = ?plan.source,
            "planning session finished"
        );

        PlanResult {
            graph,
            rationale: plan.rationale,
            status,
            diagnostics,
            fix_attempts,
            source: plan.source,
        }
    }

    /// Fill identity gaps and recompute derived fields of a tool-made graph.
    fn normalize(&self, mut graph: NodeGraph, goal: &str) -> NodeGraph {
        if graph.id.trim().is_empty() {
            graph.id = fallback::graph_id_for(goal);
        }
        if graph.name.trim().is_empty() {
            graph.name = goal.trim().to_string();
        }
        graph.with_derived_fields(&self.catalog)
    }
}

fn error_count(diagnostics: &[ValidationError]) -> usize {
    diagnostics.iter().filter(|d| d.is_error()).count()
}
