//! Orchestrator
//!
//! Runs every scenario in order against one session. A failing scenario
//! never stops the run; the only skips are each scenario's own
//! precondition checks.

use serde::Serialize;

use crate::api::{HttpTransport, Transport};
use crate::common::config::{HarnessConfig, PollPolicy};
use crate::common::Result;

use super::report::Console;
use super::runner::TestRunner;
use super::scenarios::Scenario;
use super::{Failure, ScenarioOutcome, Session};

/// Outcome of one scenario within a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScenarioReport {
    pub scenario: Scenario,
    #[serde(flatten)]
    pub outcome: ScenarioOutcome,
}

/// Final tally of a run
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub tests_run: u32,
    pub tests_passed: u32,
    /// Percentage of checks passed; 0 when nothing ran
    pub success_rate: f64,
    pub scenarios: Vec<ScenarioReport>,
}

impl Summary {
    pub fn new(session: &Session, scenarios: Vec<ScenarioReport>) -> Self {
        Self {
            tests_run: session.tests_run(),
            tests_passed: session.tests_passed(),
            success_rate: success_rate(session.tests_passed(), session.tests_run()),
            scenarios,
        }
    }

    /// Every check passed and no scenario reported a failure
    ///
    /// Contract and precondition failures leave the check counters
    /// untouched, so the counters alone are not enough.
    pub fn all_passed(&self) -> bool {
        self.tests_passed == self.tests_run && self.scenarios.iter().all(|r| r.outcome.is_pass())
    }

    pub fn failed_scenarios(&self) -> impl Iterator<Item = &ScenarioReport> {
        self.scenarios.iter().filter(|r| !r.outcome.is_pass())
    }

    /// Process exit status: 0 when everything passed, 1 otherwise
    pub fn exit_code(&self) -> i32 {
        if self.all_passed() {
            0
        } else {
            1
        }
    }
}

/// Percentage of passed checks, defined as 0 when none ran
pub fn success_rate(passed: u32, run: u32) -> f64 {
    if run == 0 {
        return 0.0;
    }
    f64::from(passed) / f64::from(run) * 100.0
}

/// Runs the scenario library in its fixed order
pub struct Orchestrator<T> {
    runner: TestRunner<T>,
    poll: PollPolicy,
}

impl<T: Transport> Orchestrator<T> {
    pub fn new(runner: TestRunner<T>, poll: PollPolicy) -> Self {
        Self { runner, poll }
    }

    pub fn runner(&self) -> &TestRunner<T> {
        &self.runner
    }

    /// Execute every scenario against `session` and tally the results
    pub async fn run(&self, session: &mut Session) -> Summary {
        let mut reports = Vec::with_capacity(Scenario::ALL.len());

        for scenario in Scenario::ALL {
            let outcome = match scenario.run(&self.runner, session, &self.poll).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::error!(scenario = scenario.title(), error = %e, "scenario aborted");
                    self.runner
                        .console()
                        .fail(&format!("Test failed with error: {}", e));
                    // counted as one failed check
                    session.begin_check();
                    ScenarioOutcome::failed(Failure::Aborted {
                        message: e.to_string(),
                    })
                }
            };

            tracing::debug!(
                scenario = scenario.title(),
                passed = outcome.is_pass(),
                tests_run = session.tests_run(),
                tests_passed = session.tests_passed(),
                "scenario finished"
            );
            reports.push(ScenarioReport { scenario, outcome });
        }

        Summary::new(session, reports)
    }
}

/// Run the full harness against the configured platform
pub async fn run(config: &HarnessConfig) -> Result<Summary> {
    let transport = HttpTransport::new(config.request_timeout)?;
    let console = if config.json {
        Console::silent()
    } else {
        Console::new(config.verbose)
    };

    tracing::info!(
        base_url = %config.base_url,
        poll_attempts = config.poll.attempts,
        poll_interval_ms = config.poll.interval.as_millis() as u64,
        "Starting ML platform API tests"
    );

    console.banner(&config.base_url);

    let orchestrator = Orchestrator::new(TestRunner::new(transport, console), config.poll);
    let mut session = Session::new(config.base_url.as_str());
    let summary = orchestrator.run(&mut session).await;

    console.summary(&summary);
    tracing::info!(
        tests_run = summary.tests_run,
        tests_passed = summary.tests_passed,
        "Finished ML platform API tests"
    );

    Ok(summary)
}
