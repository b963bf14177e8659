use extension_server::app::{build_processor, read_request, respond};
use extension_server::cli::Args;
use extension_server::error::ServerError;
use extension_server::logger::initialize as LoggerInitialize;

use extension_core::config::ExtensionConfig;

use std::fs::create_dir_all;
use std::process::ExitCode;

use clap::Parser;
use log::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    if let Some(log_dir) = args.log_dir.as_deref() {
        if let Err(e) = create_dir_all(log_dir) {
            eprintln!("Failed to create log directory {}: {e}", log_dir.display());
            return ExitCode::FAILURE;
        }
    }

    // Initialize logger FIRST
    if let Err(e) = LoggerInitialize(args.log_dir.as_deref(), args.log_level) {
        eprintln!("{e}");
        return ExitCode::FAILURE;
    }

    match run(&args).await {
        Ok(envelope) => {
            println!("{envelope}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: &Args) -> Result<String, ServerError> {
    info!("Extension server starting with config {}", args.config.display());

    let config = ExtensionConfig::load_from_env(&args.config)?;
    let processor = build_processor(&config)?;
    let raw = read_request(&args.request_source())?;

    respond(&processor, &raw).await
}
