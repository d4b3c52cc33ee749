//! ML platform API tester
//!
//! Runs the end-to-end scenario suite against an ML platform's HTTP API
//! and exits 0 only when every check passed.

use std::path::PathBuf;

use clap::Parser;
use ml_api_tester::{cli, commands::Commands, common::logging};

#[derive(Parser)]
#[command(name = "ml-api-tester", about = "End-to-end tests for an ML platform API")]
#[command(version, long_about = None)]
struct Cli {
    /// Also write logs to this file
    #[arg(long, global = true, env = "ML_API_LOG_FILE")]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    let guard = match logging::init(cli.log_file.as_deref()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let code = match cli::dispatch(cli.command).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            1
        }
    };

    // flush buffered file logs before exiting
    drop(guard);
    std::process::exit(code);
}
