//! Step-list execution for deployment recipes.
//!
//! A recipe is a fixed, ordered list of `Step`s interpreted by `StepRunner`
//! against one remote session. The runner records a `DeploymentStep` per
//! executed step, continues past non-fatal failures, and stops executing
//! after the first fatal failure - steps that never ran are not logged.

use crate::exec::ExecutionResult;
use crate::log_status;
use crate::ssh::{RemoteRunner, TransferResult};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

/// Default per-step timeout. Runtime installs and image pulls can be slow;
/// individual steps may override.
pub const STEP_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Debug, Clone)]
pub enum StepAction {
    Remote { command: String, timeout: Duration },
    Upload {
        local: PathBuf,
        remote: String,
        recursive: bool,
    },
}

/// One planned step: what to do, and whether failure aborts the recipe.
#[derive(Debug, Clone)]
pub struct Step {
    pub description: String,
    pub fatal: bool,
    pub action: StepAction,
}

impl Step {
    /// A remote command whose failure aborts the remaining sequence.
    pub fn remote(description: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            fatal: true,
            action: StepAction::Remote {
                command: command.into(),
                timeout: STEP_TIMEOUT,
            },
        }
    }

    /// A remote command whose failure is logged as a warning only.
    pub fn best_effort(description: impl Into<String>, command: impl Into<String>) -> Self {
        let mut step = Self::remote(description, command);
        step.fatal = false;
        step
    }

    /// A file/directory upload. Transfer failures are always fatal.
    pub fn upload(
        description: impl Into<String>,
        local: impl Into<PathBuf>,
        remote: impl Into<String>,
    ) -> Self {
        Self {
            description: description.into(),
            fatal: true,
            action: StepAction::Upload {
                local: local.into(),
                remote: remote.into(),
                recursive: true,
            },
        }
    }
}

/// What actually happened when a step ran.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum StepDetail {
    Exec(ExecutionResult),
    Transfer(TransferResult),
    Error { message: String },
}

/// One executed step, as recorded in the deployment log.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentStep {
    pub description: String,
    pub fatal: bool,
    pub succeeded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<StepDetail>,
}

/// Interprets a step list against a remote runner, accumulating the log.
pub struct StepRunner<'a> {
    remote: &'a mut dyn RemoteRunner,
    steps: Vec<DeploymentStep>,
    aborted: bool,
}

impl<'a> StepRunner<'a> {
    pub fn new(remote: &'a mut dyn RemoteRunner) -> Self {
        Self {
            remote,
            steps: Vec::new(),
            aborted: false,
        }
    }

    /// True once a fatal step has failed; later `run` calls become no-ops.
    pub fn aborted(&self) -> bool {
        self.aborted
    }

    /// Execute one step and record its outcome. Returns whether the step
    /// succeeded (false for skipped steps after an abort).
    pub fn run(&mut self, step: Step) -> bool {
        if self.aborted {
            return false;
        }

        let (succeeded, detail) = match &step.action {
            StepAction::Remote { command, timeout } => {
                match self.remote.run(command, *timeout) {
                    Ok(result) => (result.succeeded, StepDetail::Exec(result)),
                    Err(err) => (
                        false,
                        StepDetail::Error {
                            message: err.to_string(),
                        },
                    ),
                }
            }
            StepAction::Upload {
                local,
                remote,
                recursive,
            } => match self.remote.transfer(local, remote, *recursive) {
                Ok(result) => (true, StepDetail::Transfer(result)),
                Err(err) => (
                    false,
                    StepDetail::Error {
                        message: err.to_string(),
                    },
                ),
            },
        };

        if !succeeded {
            if step.fatal {
                log_status!("deploy", "Fatal step failed: {}", step.description);
                self.aborted = true;
            } else {
                log_status!("deploy", "Warning: step failed: {}", step.description);
            }
        }

        self.steps.push(DeploymentStep {
            description: step.description,
            fatal: step.fatal,
            succeeded,
            detail: Some(detail),
        });

        succeeded
    }

    /// Fold a nested recipe's log into this one. A failed nested recipe
    /// aborts the remaining steps, same as a local fatal failure.
    pub fn absorb(&mut self, steps: Vec<DeploymentStep>, overall_success: bool) {
        self.steps.extend(steps);
        if !overall_success {
            self.aborted = true;
        }
    }

    pub fn into_steps(self) -> Vec<DeploymentStep> {
        self.steps
    }
}
