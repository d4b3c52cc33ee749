//! ML platform API tester
//!
//! Drives an ML platform's HTTP API end to end: model catalog, dataset
//! upload and cleaning, asynchronous training, progress polling and
//! artifact download. Each step is scored as a check and folded into a
//! session-wide pass/fail tally.

pub mod api;
pub mod cli;
pub mod commands;
pub mod common;
pub mod testing;

// Re-export commonly used types for tests
pub use common::{Error, Result};
pub use testing::{Scenario, ScenarioOutcome, Session, Summary};
