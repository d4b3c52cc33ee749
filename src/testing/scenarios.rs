//! Scenario library
//!
//! The nine checks of a run, in execution order. Scenarios that depend on
//! an earlier one read the identifier it left in the [`Session`] and fail
//! their precondition, without sending anything, when it is missing.

use serde::Serialize;

use crate::api::protocol::{
    identifier, paths, CleanRequest, JobProgress, ModelType, TrainRequest, CLEANED_STATUS,
};
use crate::api::Transport;
use crate::common::config::PollPolicy;
use crate::common::Result;

use super::fixtures::{
    self, SUPERVISED_CATEGORY, SUPERVISED_MODEL, TARGET_COLUMN, UNSUPERVISED_MODEL,
};
use super::poll::{poll_job, JobState};
use super::runner::{CheckResult, TestRunner};
use super::{Failure, ScenarioOutcome, Session, SoftPass};

/// One named, ordered check against the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    ApiRoot,
    ModelsList,
    ModelParameters,
    DatasetUpload,
    DatasetColumns,
    DatasetClean,
    ModelTraining,
    TrainingProgress,
    ModelDownload,
}

impl Scenario {
    /// Every scenario, in execution order
    pub const ALL: [Scenario; 9] = [
        Scenario::ApiRoot,
        Scenario::ModelsList,
        Scenario::ModelParameters,
        Scenario::DatasetUpload,
        Scenario::DatasetColumns,
        Scenario::DatasetClean,
        Scenario::ModelTraining,
        Scenario::TrainingProgress,
        Scenario::ModelDownload,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Scenario::ApiRoot => "API Root",
            Scenario::ModelsList => "Models List",
            Scenario::ModelParameters => "Model Parameters",
            Scenario::DatasetUpload => "Dataset Upload",
            Scenario::DatasetColumns => "Dataset Columns",
            Scenario::DatasetClean => "Dataset Clean",
            Scenario::ModelTraining => "Model Training",
            Scenario::TrainingProgress => "Training Progress",
            Scenario::ModelDownload => "Model Download",
        }
    }

    /// Endpoint exercised, for listings
    pub fn endpoint(&self) -> &'static str {
        match self {
            Scenario::ApiRoot => "GET api/",
            Scenario::ModelsList => "GET api/models/list",
            Scenario::ModelParameters => "GET api/models/parameters/{model_type}/{model_name}",
            Scenario::DatasetUpload => "POST api/dataset/upload",
            Scenario::DatasetColumns => "GET api/dataset/{dataset_id}/columns",
            Scenario::DatasetClean => "POST api/dataset/clean",
            Scenario::ModelTraining => "POST api/model/train",
            Scenario::TrainingProgress => "GET api/model/progress/{job_id}",
            Scenario::ModelDownload => "GET api/model/download/{job_id}",
        }
    }

    /// Run this scenario against the current session
    ///
    /// Check-level failures come back as `Ok(ScenarioOutcome::Failed)`. An
    /// `Err` means the scenario could not finish at all.
    pub async fn run<T: Transport>(
        self,
        runner: &TestRunner<T>,
        session: &mut Session,
        poll: &PollPolicy,
    ) -> Result<ScenarioOutcome> {
        match self {
            Scenario::ApiRoot => api_root(runner, session).await,
            Scenario::ModelsList => models_list(runner, session).await,
            Scenario::ModelParameters => model_parameters(runner, session).await,
            Scenario::DatasetUpload => dataset_upload(runner, session).await,
            Scenario::DatasetColumns => dataset_columns(runner, session).await,
            Scenario::DatasetClean => dataset_clean(runner, session).await,
            Scenario::ModelTraining => model_training(runner, session).await,
            Scenario::TrainingProgress => training_progress(runner, session, poll).await,
            Scenario::ModelDownload => model_download(runner, session).await,
        }
    }
}

/// Fold a check into a verdict, passing its payload to `validate`
fn settle<F>(result: CheckResult, validate: F) -> ScenarioOutcome
where
    F: FnOnce(serde_json::Value) -> std::result::Result<(), Failure>,
{
    match result.and_then(|response| validate(response.payload())) {
        Ok(()) => ScenarioOutcome::Passed,
        Err(failure) => ScenarioOutcome::failed(failure),
    }
}

fn require<'a, T: Transport>(
    runner: &TestRunner<T>,
    value: Option<&'a str>,
    what: &str,
) -> std::result::Result<&'a str, Failure> {
    value.ok_or_else(|| {
        let message = format!("No {} available", what);
        runner.console().fail(&message);
        Failure::precondition(message)
    })
}

async fn api_root<T: Transport>(
    runner: &TestRunner<T>,
    session: &mut Session,
) -> Result<ScenarioOutcome> {
    let result = runner.get(session, "API Root", paths::ROOT, 200).await;
    Ok(settle(result, |_| Ok(())))
}

async fn models_list<T: Transport>(
    runner: &TestRunner<T>,
    session: &mut Session,
) -> Result<ScenarioOutcome> {
    let result = runner
        .get(session, "Models List", paths::MODELS_LIST, 200)
        .await;

    Ok(settle(result, |payload| {
        let missing: Vec<&str> = [ModelType::Supervised, ModelType::Unsupervised]
            .iter()
            .map(ModelType::as_str)
            .filter(|key| payload.get(*key).is_none())
            .collect();

        if missing.is_empty() {
            runner.console().ok("Response has correct structure");
            Ok(())
        } else {
            let message = format!("Response missing required fields: {}", missing.join(", "));
            runner.console().fail(&message);
            Err(Failure::contract(message))
        }
    }))
}

async fn model_parameters<T: Transport>(
    runner: &TestRunner<T>,
    session: &mut Session,
) -> Result<ScenarioOutcome> {
    let supervised = runner
        .get(
            session,
            "Supervised Model Parameters",
            &paths::model_parameters(
                ModelType::Supervised,
                SUPERVISED_MODEL,
                Some(SUPERVISED_CATEGORY),
            ),
            200,
        )
        .await;

    let unsupervised = runner
        .get(
            session,
            "Unsupervised Model Parameters",
            &paths::model_parameters(ModelType::Unsupervised, UNSUPERVISED_MODEL, None),
            200,
        )
        .await;

    Ok(match (supervised, unsupervised) {
        (Ok(_), Ok(_)) => ScenarioOutcome::Passed,
        (Err(failure), _) | (_, Err(failure)) => ScenarioOutcome::failed(failure),
    })
}

async fn dataset_upload<T: Transport>(
    runner: &TestRunner<T>,
    session: &mut Session,
) -> Result<ScenarioOutcome> {
    let response = match runner
        .post_multipart(
            session,
            "Dataset Upload",
            paths::DATASET_UPLOAD,
            Vec::new(),
            vec![fixtures::iris_upload()],
            200,
        )
        .await
    {
        Ok(response) => response,
        Err(failure) => return Ok(ScenarioOutcome::failed(failure)),
    };

    let Some(dataset_id) = identifier(&response.payload(), "dataset_id") else {
        runner.console().fail("Response has no dataset_id");
        return Ok(ScenarioOutcome::failed(Failure::contract(
            "upload response has no dataset_id",
        )));
    };

    let message = format!("Dataset ID: {}", dataset_id);
    session.set_dataset_id(dataset_id)?;
    runner.console().ok(&message);
    Ok(ScenarioOutcome::Passed)
}

async fn dataset_columns<T: Transport>(
    runner: &TestRunner<T>,
    session: &mut Session,
) -> Result<ScenarioOutcome> {
    let dataset_id = match require(runner, session.dataset_id(), "dataset ID") {
        Ok(id) => id.to_string(),
        Err(failure) => return Ok(ScenarioOutcome::failed(failure)),
    };

    let result = runner
        .get(
            session,
            "Dataset Columns",
            &paths::dataset_columns(&dataset_id),
            200,
        )
        .await;

    Ok(settle(result, |payload| match payload.get("columns") {
        Some(columns) => {
            runner.console().ok(&format!("Columns: {}", columns));
            Ok(())
        }
        None => {
            runner.console().fail("Response has no columns");
            Err(Failure::contract("columns response has no columns"))
        }
    }))
}

async fn dataset_clean<T: Transport>(
    runner: &TestRunner<T>,
    session: &mut Session,
) -> Result<ScenarioOutcome> {
    let dataset_id = match require(runner, session.dataset_id(), "dataset ID") {
        Ok(id) => id.to_string(),
        Err(failure) => return Ok(ScenarioOutcome::failed(failure)),
    };

    let body = serde_json::to_value(CleanRequest {
        dataset_id: &dataset_id,
        target_column: TARGET_COLUMN,
    })?;
    let result = runner
        .post_json(session, "Dataset Clean", paths::DATASET_CLEAN, body, 200)
        .await;

    Ok(settle(result, |payload| {
        match payload.get("status").and_then(|s| s.as_str()) {
            Some(CLEANED_STATUS) => {
                runner.console().ok("Dataset cleaned successfully");
                Ok(())
            }
            other => {
                let message = format!(
                    "expected status '{}', got {}",
                    CLEANED_STATUS,
                    other.map_or("nothing".to_string(), |s| format!("'{}'", s))
                );
                runner.console().fail(&message);
                Err(Failure::contract(message))
            }
        }
    }))
}

async fn model_training<T: Transport>(
    runner: &TestRunner<T>,
    session: &mut Session,
) -> Result<ScenarioOutcome> {
    let dataset_id = match require(runner, session.dataset_id(), "dataset ID") {
        Ok(id) => id.to_string(),
        Err(failure) => return Ok(ScenarioOutcome::failed(failure)),
    };

    let body = serde_json::to_value(TrainRequest {
        dataset_id: &dataset_id,
        model_type: ModelType::Supervised,
        model_category: SUPERVISED_CATEGORY,
        model_name: SUPERVISED_MODEL,
        parameters: fixtures::training_parameters(),
        target_column: TARGET_COLUMN,
    })?;

    let response = match runner
        .post_json(session, "Model Training", paths::MODEL_TRAIN, body, 200)
        .await
    {
        Ok(response) => response,
        Err(failure) => return Ok(ScenarioOutcome::failed(failure)),
    };

    let Some(job_id) = identifier(&response.payload(), "job_id") else {
        runner.console().fail("Response has no job_id");
        return Ok(ScenarioOutcome::failed(Failure::contract(
            "training response has no job_id",
        )));
    };

    let message = format!("Job ID: {}", job_id);
    session.set_job_id(job_id)?;
    runner.console().ok(&message);
    Ok(ScenarioOutcome::Passed)
}

async fn training_progress<T: Transport>(
    runner: &TestRunner<T>,
    session: &mut Session,
    poll: &PollPolicy,
) -> Result<ScenarioOutcome> {
    let job_id = match require(runner, session.job_id(), "job ID") {
        Ok(id) => id.to_string(),
        Err(failure) => return Ok(ScenarioOutcome::failed(failure)),
    };

    let report = poll_job(runner, session, &job_id, poll).await;

    Ok(match report.state {
        JobState::Completed => {
            runner.console().ok("Training completed successfully!");
            ScenarioOutcome::Passed
        }
        JobState::Failed { message } => {
            let message = format!(
                "Training failed: {}",
                message.as_deref().unwrap_or("no message")
            );
            runner.console().fail(&message);
            ScenarioOutcome::failed(Failure::contract(message))
        }
        JobState::Running | JobState::TimedOut => {
            let message = format!(
                "Training still in progress after {} checks",
                report.attempts
            );
            if poll.timeout_is_failure {
                runner.console().fail(&message);
                ScenarioOutcome::failed(Failure::contract(message))
            } else {
                runner.console().warn(&message);
                ScenarioOutcome::soft(SoftPass::TimedOut)
            }
        }
    })
}

async fn model_download<T: Transport>(
    runner: &TestRunner<T>,
    session: &mut Session,
) -> Result<ScenarioOutcome> {
    let job_id = match require(runner, session.job_id(), "job ID") {
        Ok(id) => id.to_string(),
        Err(failure) => return Ok(ScenarioOutcome::failed(failure)),
    };

    let status = runner
        .get(
            session,
            "Check Training Status for Download",
            &paths::model_progress(&job_id),
            200,
        )
        .await;

    let completed = status.is_ok_and(|response| {
        let progress = JobProgress::from_payload(&response.payload());
        JobState::from_progress(&progress) == JobState::Completed
    });
    if !completed {
        runner
            .console()
            .warn("Training not completed, skipping download test");
        return Ok(ScenarioOutcome::soft(SoftPass::NotApplicable));
    }

    let response = match runner
        .get(session, "Model Download", &paths::model_download(&job_id), 200)
        .await
    {
        Ok(response) => response,
        Err(failure) => return Ok(ScenarioOutcome::failed(failure)),
    };

    runner.console().info(&format!(
        "Content-Type: {}",
        response.content_type.as_deref().unwrap_or("unknown")
    ));
    runner.console().info(&format!(
        "Content-Length: {} bytes",
        response.content_length()
    ));
    Ok(ScenarioOutcome::Passed)
}
