use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, Level};

use mavlink_relay::config::RelayConfig;
use mavlink_relay::relay::RelayController;
use mavlink_relay::utils::logging;

/// Transparent MAVLink relay between a GCS and a flight controller.
#[derive(Debug, Parser)]
#[command(name = "mavlink-relay", version, about)]
struct Args {
    /// Path to the configuration file (TOML or JSON)
    #[arg(required_unless_present = "example_config")]
    config_path: Option<PathBuf>,

    /// Override the configured log level (trace, debug, info, warn, error)
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<Level>,

    /// Print an example configuration and exit
    #[arg(long)]
    example_config: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    if args.example_config {
        println!("{}", RelayConfig::example_config());
        return ExitCode::SUCCESS;
    }

    // required_unless_present guarantees a path when we get here
    let Some(config_path) = args.config_path else {
        return ExitCode::FAILURE;
    };

    let mut config = match RelayConfig::from_file(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    if let Some(level) = args.log_level {
        config.logging.log_level = level;
    }

    logging::init(&config.logging);

    if let Err(e) = config.validate_strict() {
        error!(error = %e, "invalid configuration");
        return ExitCode::FAILURE;
    }

    info!(address = %config.listen.address, port = config.listen.port, "me");
    info!(address = %config.fc.address, port = config.fc.port, "fc");
    info!(address = %config.gcs.address, port = config.gcs.port, "gcs");

    let controller = match RelayController::from_config(&config).await {
        Ok(controller) => controller,
        Err(e) => {
            error!(error = %e, "failed to start relay");
            return ExitCode::FAILURE;
        }
    };

    // Never returns Ok under normal operation
    match controller.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "relay terminated");
            ExitCode::FAILURE
        }
    }
}
