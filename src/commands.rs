//! CLI command definitions
//!
//! Defines the clap commands for the API tester.

use std::time::Duration;

use clap::{Args, Subcommand};

use crate::common::config::{
    default_poll_attempts, default_poll_interval_ms, default_request_timeout_secs,
    HarnessConfig, PollPolicy, DEFAULT_BASE_URL,
};
use crate::common::Result;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run every scenario against the platform
    Run(RunArgs),

    /// List the scenarios in execution order
    List,
}

/// Options for a harness run
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Base endpoint of the ML platform
    #[arg(long, env = "ML_API_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Maximum number of training progress checks
    #[arg(long, env = "ML_API_POLL_ATTEMPTS", default_value_t = default_poll_attempts())]
    pub poll_attempts: u32,

    /// Pause between progress checks, in milliseconds
    #[arg(long, env = "ML_API_POLL_INTERVAL_MS", default_value_t = default_poll_interval_ms())]
    pub poll_interval_ms: u64,

    /// Fail the run when training is still in progress after the last check
    #[arg(long)]
    pub timeout_is_failure: bool,

    /// Per-request timeout in seconds (0 disables it)
    #[arg(long, env = "ML_API_REQUEST_TIMEOUT_SECS", default_value_t = default_request_timeout_secs())]
    pub request_timeout_secs: u64,

    /// Print the summary as JSON instead of the console report
    #[arg(long)]
    pub json: bool,

    /// Show response excerpts for passing checks
    #[arg(long, short)]
    pub verbose: bool,
}

impl RunArgs {
    /// Build the harness configuration these options describe
    pub fn to_config(&self) -> Result<HarnessConfig> {
        let mut config = HarnessConfig::new(self.base_url.as_str())?.with_poll(PollPolicy {
            attempts: self.poll_attempts,
            interval: Duration::from_millis(self.poll_interval_ms),
            timeout_is_failure: self.timeout_is_failure,
        })?;

        config.request_timeout =
            (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs));
        config.json = self.json;
        config.verbose = self.verbose;
        Ok(config)
    }
}
