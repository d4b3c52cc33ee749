//! End-to-end test orchestration
//!
//! A run threads one [`Session`] through the fixed scenario sequence.
//! Each request becomes a counted check in [`runner`]; scenarios layer
//! payload validation and state hand-off on top, and the
//! [`Orchestrator`] turns the lot into a [`Summary`] and an exit status.

pub mod fixtures;
mod orchestrator;
mod outcome;
pub mod poll;
pub mod report;
pub mod runner;
mod scenarios;
mod session;

#[cfg(test)]
pub(crate) mod scripted;

pub use orchestrator::{run, success_rate, Orchestrator, ScenarioReport, Summary};
pub use outcome::{Failure, ScenarioOutcome, SoftPass};
pub use poll::{poll_job, JobState, PollReport};
pub use runner::{CheckResult, TestRunner};
pub use scenarios::Scenario;
pub use session::Session;
