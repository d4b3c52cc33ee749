//! Check and scenario verdicts
//!
//! Failures are values, not errors: every kind is local to one scenario
//! and the run always continues past it.

use serde::Serialize;
use thiserror::Error;

/// Why a check or scenario failed
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Failure {
    /// The request never got a response (DNS, refused, timeout)
    #[error("transport error: {message}")]
    Transport { message: String },

    /// The response status differed from the expected one
    #[error("expected status {expected}, got {actual}")]
    StatusMismatch { expected: u16, actual: u16 },

    /// Status matched but the payload failed a structural or value check
    #[error("contract error: {message}")]
    Contract { message: String },

    /// Required session state was missing; no request was sent
    #[error("precondition not met: {message}")]
    Precondition { message: String },

    /// The scenario itself errored out before producing a verdict
    #[error("scenario aborted: {message}")]
    Aborted { message: String },
}

impl Failure {
    pub fn contract(message: impl Into<String>) -> Self {
        Self::Contract {
            message: message.into(),
        }
    }

    pub fn precondition(message: impl Into<String>) -> Self {
        Self::Precondition {
            message: message.into(),
        }
    }
}

/// Why a scenario passed without reaching its intended end state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SoftPass {
    /// Training was still running when the polling budget ran out
    TimedOut,
    /// Training had not completed, so there was nothing to download
    NotApplicable,
}

impl SoftPass {
    pub fn describe(&self) -> &'static str {
        match self {
            SoftPass::TimedOut => "timed out",
            SoftPass::NotApplicable => "not applicable",
        }
    }
}

/// Verdict of one scenario
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ScenarioOutcome {
    Passed,
    SoftPassed { reason: SoftPass },
    Failed { failure: Failure },
}

impl ScenarioOutcome {
    pub fn failed(failure: Failure) -> Self {
        Self::Failed { failure }
    }

    pub fn soft(reason: SoftPass) -> Self {
        Self::SoftPassed { reason }
    }

    /// Soft passes count as passing
    pub fn is_pass(&self) -> bool {
        !matches!(self, Self::Failed { .. })
    }

    pub fn failure(&self) -> Option<&Failure> {
        match self {
            Self::Failed { failure } => Some(failure),
            _ => None,
        }
    }
}
