//! Console output for a harness run
//!
//! Purely observational; nothing here affects pass/fail accounting.

use colored::Colorize;

use crate::api::{ApiResponse, Method};

use super::orchestrator::Summary;
use super::scenarios::Scenario;
use super::ScenarioOutcome;

/// Longest response excerpt printed for a check
const SNIPPET_CHARS: usize = 200;

/// Writes the human-readable trace of a run to stdout
#[derive(Debug, Clone, Copy)]
pub struct Console {
    enabled: bool,
    verbose: bool,
}

impl Console {
    pub fn new(verbose: bool) -> Self {
        Self {
            enabled: true,
            verbose,
        }
    }

    /// A console that prints nothing
    pub fn silent() -> Self {
        Self {
            enabled: false,
            verbose: false,
        }
    }

    pub fn banner(&self, base_url: &str) {
        if !self.enabled {
            return;
        }
        println!("{}", "Starting ML Platform API Tests".blue().bold());
        println!("  {} {}", "Target:".dimmed(), base_url);
        println!("{}", "=".repeat(50));
    }

    pub fn check_started(&self, name: &str, method: Method, url: &str) {
        if !self.enabled {
            return;
        }
        println!("\n{} {}...", "Testing".blue().bold(), name.white().bold());
        println!("   {} {} {}", "URL:".dimmed(), method, url);
    }

    pub fn check_passed(&self, response: &ApiResponse) {
        if !self.enabled {
            return;
        }
        println!("  {} Passed - Status: {}", "✓".green(), response.status);
        if self.verbose {
            println!("   {} {}", "Response:".dimmed(), body_snippet(response).dimmed());
        }
    }

    pub fn check_failed(&self, expected: u16, response: &ApiResponse) {
        if !self.enabled {
            return;
        }
        println!(
            "  {} Failed - Expected {}, got {}",
            "✗".red(),
            expected,
            response.status
        );
        println!("   {} {}", "Error:".dimmed(), body_snippet(response));
    }

    pub fn check_errored(&self, message: &str) {
        if !self.enabled {
            return;
        }
        println!("  {} Failed - Error: {}", "✗".red(), message);
    }

    /// Extra validation that succeeded
    pub fn ok(&self, message: &str) {
        if self.enabled {
            println!("   {} {}", "✓".green(), message);
        }
    }

    /// Extra validation that failed
    pub fn fail(&self, message: &str) {
        if self.enabled {
            println!("   {} {}", "✗".red(), message.red());
        }
    }

    pub fn warn(&self, message: &str) {
        if self.enabled {
            println!("   {} {}", "⚠".yellow(), message.yellow());
        }
    }

    pub fn info(&self, message: &str) {
        if self.enabled {
            println!("   {}", message);
        }
    }

    pub fn summary(&self, summary: &Summary) {
        if !self.enabled {
            return;
        }
        println!("\n{}", "=".repeat(50));
        println!("{}", "Scenarios:".cyan());
        for report in &summary.scenarios {
            let verdict = match &report.outcome {
                ScenarioOutcome::Passed => "passed".green(),
                ScenarioOutcome::SoftPassed { reason } => {
                    format!("passed ({})", reason.describe()).yellow()
                }
                ScenarioOutcome::Failed { failure } => format!("failed: {}", failure).red(),
            };
            println!("  {:28} {}", report.scenario.title(), verdict);
        }

        println!(
            "\n{} {}/{} tests passed",
            "Test Results:".bold(),
            summary.tests_passed,
            summary.tests_run
        );
        println!("Success Rate: {:.1}%", summary.success_rate);

        if summary.all_passed() {
            println!("{}", "All tests passed!".green().bold());
        } else {
            println!("{}", "Some tests failed".yellow().bold());
        }
    }
}

/// Print the scenarios in execution order
pub fn print_scenarios() {
    println!("{}", "Scenarios (execution order):".cyan());
    for (i, scenario) in Scenario::ALL.iter().enumerate() {
        println!(
            "  {}. {:24} {}",
            i + 1,
            scenario.title(),
            scenario.endpoint().dimmed()
        );
    }
}

/// Leading excerpt of a response body, pretty-printed when it is JSON
pub fn body_snippet(response: &ApiResponse) -> String {
    let text = match response.json() {
        Some(value) => serde_json::to_string_pretty(&value).unwrap_or_else(|_| response.text()),
        None => response.text(),
    };
    truncate(&text, SNIPPET_CHARS)
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
