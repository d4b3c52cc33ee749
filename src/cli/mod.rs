//! CLI command handling
//!
//! Dispatches CLI commands and maps their results to an exit status.

use crate::commands::Commands;
use crate::common::Result;
use crate::testing::{self, report};

/// Dispatch a CLI command, returning the process exit status
pub async fn dispatch(command: Commands) -> Result<i32> {
    match command {
        Commands::Run(args) => {
            let config = args.to_config()?;
            let summary = testing::run(&config).await?;

            if config.json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            }

            for report in summary.failed_scenarios() {
                tracing::debug!(scenario = report.scenario.title(), outcome = ?report.outcome, "failed scenario");
            }

            Ok(summary.exit_code())
        }

        Commands::List => {
            report::print_scenarios();
            Ok(0)
        }
    }
}
