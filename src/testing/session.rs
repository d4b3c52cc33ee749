//! Session state threaded through every scenario

use crate::common::{Error, Result};

/// Mutable context shared by all scenarios of one run
///
/// The base endpoint never changes. `dataset_id` and `job_id` are each
/// recorded at most once. `tests_passed <= tests_run` always holds.
#[derive(Debug)]
pub struct Session {
    base_url: String,
    tests_run: u32,
    tests_passed: u32,
    dataset_id: Option<String>,
    job_id: Option<String>,
}

impl Session {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            tests_run: 0,
            tests_passed: 0,
            dataset_id: None,
            job_id: None,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolve an API path against the base endpoint
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub fn tests_run(&self) -> u32 {
        self.tests_run
    }

    pub fn tests_passed(&self) -> u32 {
        self.tests_passed
    }

    pub fn dataset_id(&self) -> Option<&str> {
        self.dataset_id.as_deref()
    }

    pub fn job_id(&self) -> Option<&str> {
        self.job_id.as_deref()
    }

    pub fn set_dataset_id(&mut self, id: String) -> Result<()> {
        if self.dataset_id.is_some() {
            return Err(Error::StateAlreadySet("dataset id"));
        }
        self.dataset_id = Some(id);
        Ok(())
    }

    pub fn set_job_id(&mut self, id: String) -> Result<()> {
        if self.job_id.is_some() {
            return Err(Error::StateAlreadySet("job id"));
        }
        self.job_id = Some(id);
        Ok(())
    }

    /// Count a check as run; called before its result is known
    pub(crate) fn begin_check(&mut self) {
        self.tests_run += 1;
    }

    /// Count the most recently begun check as passed
    pub(crate) fn pass_check(&mut self) {
        debug_assert!(self.tests_passed < self.tests_run);
        self.tests_passed = (self.tests_passed + 1).min(self.tests_run);
    }
}
