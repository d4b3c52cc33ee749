//! Training progress polling
//!
//! A job starts `Running`. Each check reads `status`: `completed` and
//! `failed` end polling at once, anything else (including a check that
//! did not return 200) keeps it running. When the attempt budget runs out
//! the job is `TimedOut`.

use serde::Serialize;

use crate::api::protocol::{paths, JobProgress};
use crate::api::Transport;
use crate::common::config::PollPolicy;

use super::runner::TestRunner;
use super::Session;

/// Observed state of a training job
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum JobState {
    Running,
    Completed,
    Failed { message: Option<String> },
    TimedOut,
}

impl JobState {
    /// State implied by one progress report
    pub fn from_progress(progress: &JobProgress) -> Self {
        match progress.status.as_deref() {
            Some("completed") => JobState::Completed,
            Some("failed") => JobState::Failed {
                message: progress.message.clone(),
            },
            _ => JobState::Running,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobState::Running)
    }
}

/// Final state and the number of checks spent reaching it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollReport {
    pub state: JobState,
    pub attempts: u32,
}

/// Poll a job until it completes, fails or the budget is spent
///
/// Sleeps `policy.interval` between checks but not after the last one, so
/// the total wait stays under `policy.max_wait()`.
pub async fn poll_job<T: Transport>(
    runner: &TestRunner<T>,
    session: &mut Session,
    job_id: &str,
    policy: &PollPolicy,
) -> PollReport {
    let path = paths::model_progress(job_id);

    for attempt in 1..=policy.attempts {
        let name = format!("Training Progress (Check {})", attempt);

        if let Ok(response) = runner.get(session, &name, &path, 200).await {
            let progress = JobProgress::from_payload(&response.payload());
            runner.console().info(&format!(
                "Status: {}, Progress: {}%",
                progress.status.as_deref().unwrap_or("unknown"),
                progress.progress
            ));

            let state = JobState::from_progress(&progress);
            tracing::debug!(job_id, attempt, ?state, "job progress");
            if state.is_terminal() {
                return PollReport { state, attempts: attempt };
            }
        }

        if attempt < policy.attempts {
            tokio::time::sleep(policy.interval).await;
        }
    }

    PollReport {
        state: JobState::TimedOut,
        attempts: policy.attempts,
    }
}
