//! Normalizes a deployment step log into the report returned to callers.

use crate::recipe::DeploymentStep;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Success,
    SuccessWithWarnings,
    Failed,
}

/// Terminal artifact of one orchestrator invocation. Created once, never
/// mutated afterward.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentReport {
    pub recipe: String,
    pub overall_success: bool,
    pub status: ReportStatus,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    pub steps: Vec<DeploymentStep>,
    pub timestamp: DateTime<Utc>,
}

impl DeploymentReport {
    /// Overall success requires every fatal step to have succeeded. Failed
    /// non-fatal steps degrade the report to success-with-warnings without
    /// flipping overall success.
    pub fn from_steps(recipe: impl Into<String>, steps: Vec<DeploymentStep>) -> Self {
        let overall_success = steps.iter().filter(|s| s.fatal).all(|s| s.succeeded);
        let warnings: Vec<String> = steps
            .iter()
            .filter(|s| !s.fatal && !s.succeeded)
            .map(|s| s.description.clone())
            .collect();

        let status = if !overall_success {
            ReportStatus::Failed
        } else if !warnings.is_empty() {
            ReportStatus::SuccessWithWarnings
        } else {
            ReportStatus::Success
        };

        Self {
            recipe: recipe.into(),
            overall_success,
            status,
            warnings,
            steps,
            timestamp: Utc::now(),
        }
    }

    /// Process exit code for CLI callers.
    pub fn exit_code(&self) -> i32 {
        if self.overall_success {
            0
        } else {
            20
        }
    }
}
