//! Harness configuration
//!
//! There is no configuration file: the base endpoint is the one external
//! configuration point, and the remaining knobs come from CLI flags (with
//! environment fallbacks, see [`crate::commands::RunArgs`]).

use std::time::Duration;

use super::{Error, Result};

/// Platform targeted when no base URL is given
pub const DEFAULT_BASE_URL: &str = "https://easymlearn.preview.emergentagent.com";

/// Complete configuration for one harness run
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// Base endpoint all API paths are resolved against
    pub base_url: String,

    /// Training progress polling policy
    pub poll: PollPolicy,

    /// Per-request timeout; `None` leaves the client without one
    pub request_timeout: Option<Duration>,

    /// Print response snippets for passing checks
    pub verbose: bool,

    /// Emit the summary as JSON and suppress the console trace
    pub json: bool,
}

impl HarnessConfig {
    /// Create a configuration with default settings for `base_url`
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let base_url = normalize_base_url(base_url.into())?;
        Ok(Self {
            base_url,
            poll: PollPolicy::default(),
            request_timeout: Some(Duration::from_secs(default_request_timeout_secs())),
            verbose: false,
            json: false,
        })
    }

    pub fn with_poll(mut self, poll: PollPolicy) -> Result<Self> {
        if poll.attempts == 0 {
            return Err(Error::Config(
                "poll attempts must be at least 1".to_string(),
            ));
        }
        self.poll = poll;
        Ok(self)
    }
}

/// How training progress is polled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Maximum number of progress checks
    pub attempts: u32,

    /// Pause between consecutive checks
    pub interval: Duration,

    /// Count a job that is still running after the last check as a failure
    /// instead of a soft pass
    pub timeout_is_failure: bool,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            attempts: default_poll_attempts(),
            interval: Duration::from_millis(default_poll_interval_ms()),
            timeout_is_failure: false,
        }
    }
}

impl PollPolicy {
    /// Upper bound on the time spent sleeping between checks
    pub fn max_wait(&self) -> Duration {
        self.interval * self.attempts
    }
}

pub fn default_poll_attempts() -> u32 {
    10
}
pub fn default_poll_interval_ms() -> u64 {
    2000
}
pub fn default_request_timeout_secs() -> u64 {
    30
}

fn normalize_base_url(raw: String) -> Result<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    let host = trimmed
        .strip_prefix("http://")
        .or_else(|| trimmed.strip_prefix("https://"))
        .ok_or_else(|| {
            Error::Config(format!(
                "Base URL '{}' must start with http:// or https://",
                raw
            ))
        })?;
    if host.is_empty() {
        return Err(Error::Config(format!("Base URL '{}' has no host", raw)));
    }
    Ok(trimmed.to_string())
}
