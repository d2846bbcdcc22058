use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Lower and upper bound on clarifying questions, regardless of config.
pub const QUESTION_FLOOR: usize = 1;
pub const QUESTION_CEILING: usize = 12;
/// Hard upper bound on the validate/fix loop.
pub const FIX_ATTEMPT_CEILING: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OrchestratorConfig {
    /// Bound on the validate/fix loop.
    pub max_fix_attempts: u32,
    /// Per tool call.
    pub tool_timeout_ms: u64,
    pub min_questions: usize,
    pub max_questions: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        OrchestratorConfig {
            max_fix_attempts: 3,
            tool_timeout_ms: 30_000,
            min_questions: 3,
            max_questions: 7,
        }
    }
}

impl OrchestratorConfig {
    /// Overrides from JSON; absent keys keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        let config: OrchestratorConfig = serde_json::from_str(json)?;
        Ok(config.normalized())
    }

    /// Clamp values into usable ranges. A zero timeout becomes 1 ms, fix
    /// attempts are capped and the question bounds are kept ordered.
    pub fn normalized(self) -> Self {
        let min_questions = self.min_questions.clamp(QUESTION_FLOOR, QUESTION_CEILING);
        let max_questions = self.max_questions.clamp(min_questions, QUESTION_CEILING);
        OrchestratorConfig {
            max_fix_attempts: self.max_fix_attempts.min(FIX_ATTEMPT_CEILING),
            tool_timeout_ms: self.tool_timeout_ms.max(1),
            min_questions,
            max_questions,
        }
    }

    pub fn tool_timeout(&self) -> Duration {
        Duration::from_millis(self.tool_timeout_ms)
    }
}
