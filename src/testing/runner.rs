//! Test case runner
//!
//! Wraps one request in a named check: counts it, sends it, compares the
//! status code with the expected one and reports the outcome. Nothing the
//! transport does escapes as an error; every call ends in a verdict.

use serde_json::Value;

use crate::api::{ApiRequest, ApiResponse, FilePart, Transport};

use super::report::{body_snippet, Console};
use super::{Failure, Session};

/// Verdict of a single check; `Ok` carries the response for payload checks
pub type CheckResult = std::result::Result<ApiResponse, Failure>;

/// Executes checks against the platform
pub struct TestRunner<T> {
    transport: T,
    console: Console,
}

impl<T: Transport> TestRunner<T> {
    pub fn new(transport: T, console: Console) -> Self {
        Self { transport, console }
    }

    pub fn console(&self) -> &Console {
        &self.console
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Run one named check
    ///
    /// `tests_run` is incremented before the request is sent; `tests_passed`
    /// only when the status matches `expected_status`.
    pub async fn run_test(
        &self,
        session: &mut Session,
        name: &str,
        request: ApiRequest,
        expected_status: u16,
    ) -> CheckResult {
        session.begin_check();
        self.console
            .check_started(name, request.method, &request.url);

        let method = request.method;
        let url = request.url.clone();

        match self.transport.send(request).await {
            Ok(response) if response.status == expected_status => {
                session.pass_check();
                self.console.check_passed(&response);
                tracing::info!(
                    check = name,
                    %method,
                    %url,
                    status = response.status,
                    "check passed"
                );
                tracing::debug!(check = name, body = %body_snippet(&response), "response body");
                Ok(response)
            }
            Ok(response) => {
                self.console.check_failed(expected_status, &response);
                tracing::warn!(
                    check = name,
                    %method,
                    %url,
                    expected = expected_status,
                    actual = response.status,
                    "status mismatch"
                );
                Err(Failure::StatusMismatch {
                    expected: expected_status,
                    actual: response.status,
                })
            }
            Err(e) => {
                self.console.check_errored(&e.to_string());
                tracing::warn!(check = name, %method, %url, error = %e, "request failed");
                Err(Failure::Transport {
                    message: e.to_string(),
                })
            }
        }
    }

    pub async fn get(
        &self,
        session: &mut Session,
        name: &str,
        path: &str,
        expected_status: u16,
    ) -> CheckResult {
        let request = ApiRequest::get(session.url(path));
        self.run_test(session, name, request, expected_status).await
    }

    pub async fn post_json(
        &self,
        session: &mut Session,
        name: &str,
        path: &str,
        body: Value,
        expected_status: u16,
    ) -> CheckResult {
        let request = ApiRequest::post_json(session.url(path), body);
        self.run_test(session, name, request, expected_status).await
    }

    pub async fn post_multipart(
        &self,
        session: &mut Session,
        name: &str,
        path: &str,
        fields: Vec<(String, String)>,
        files: Vec<FilePart>,
        expected_status: u16,
    ) -> CheckResult {
        let request = ApiRequest::post_multipart(session.url(path), fields, files);
        self.run_test(session, name, request, expected_status).await
    }
}
