//! Pipeline error taxonomy: exactly one kind per stage.
//!
//! No error is recovered locally; the first failure aborts the remaining
//! stages and `main` exits with the failing child's status.

use thiserror::Error;

use crate::runner::StepFailure;

pub type Result<T> = std::result::Result<T, RunError>;

/// One variant per pipeline stage. Each means "the stage's external
/// operation exited non-zero or could not be started"; `code` is the child's
/// exit code when one exists.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("build failed: {reason}")]
    BuildFailure { reason: String, code: Option<i32> },

    #[error("staging failed: {reason}")]
    StageFailure { reason: String },

    #[error("launch failed: {reason}")]
    LaunchFailure { reason: String, code: Option<i32> },
}

impl RunError {
    pub(crate) fn build(failure: StepFailure) -> Self {
        RunError::BuildFailure {
            reason: failure.reason,
            code: failure.code,
        }
    }

    pub(crate) fn launch(failure: StepFailure) -> Self {
        RunError::LaunchFailure {
            reason: failure.reason,
            code: failure.code,
        }
    }

    /// Process exit status for this failure: the failing child's own exit
    /// code where one exists (signal-killed or unstartable children have
    /// none), otherwise 1. Staging failures are filesystem errors with no
    /// child process, so they always exit 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            RunError::BuildFailure { code, .. } | RunError::LaunchFailure { code, .. } => {
                code.unwrap_or(1)
            }
            RunError::StageFailure { .. } => 1,
        }
    }
}
