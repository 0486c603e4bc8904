//! Deployer CLI - idempotent "ensure deployed" executor

use std::process::ExitCode;

use clap::Parser;

use deployer_cli::cli::Cli;
use deployer_cli::domain::error::error_code;
use deployer_cli::output::json::format_error;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    cli.init_tracing();
    let json = cli.json;

    match cli.run().await {
        Ok(code) => code,
        Err(e) => {
            tracing::debug!(error = ?e, "command failed");
            match format_error(&format!("{e:#}"), error_code(&e)) {
                Ok(body) if json => println!("{body}"),
                _ => eprintln!("Error: {e:#}"),
            }
            ExitCode::FAILURE
        }
    }
}
