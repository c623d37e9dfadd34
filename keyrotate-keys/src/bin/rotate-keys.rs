//! Rotate the RSA key pair of the configured warehouse user
//!
//! Usage:
//!   TARGET_SNOWFLAKE_USER=... TARGET_AWS_KMS_ARN=... cargo run --bin rotate-keys

use anyhow::Context;
use keyrotate_config::{LogFormat, RotationConfig};
use keyrotate_keys::{
    init_aws_clients, key_source_for, rotation_request, InertDirectoryUpdater, KeyRotator,
    SecretsManagerStore, TracingObserver,
};
use std::process::ExitCode;
use tracing::{error, info};

const SERVICE_NAME: &str = "rotate-keys";

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Logging is not up yet, so configuration errors go to stderr
    let config = match RotationConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match config.log_format {
        LogFormat::Json => keyrotate_logging::init_logging(SERVICE_NAME, config.log_level()),
        LogFormat::Console => {
            keyrotate_logging::init_console_logging(SERVICE_NAME, config.log_level())
        }
    }

    info!("Application started");
    finish(run(&config).await)
}

/// Log the outcome once and map it to the process exit status
fn finish(result: anyhow::Result<()>) -> ExitCode {
    match result {
        Ok(()) => {
            info!("Application finished");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %format!("{:#}", e), "Key rotation failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: &RotationConfig) -> anyhow::Result<()> {
    let request = rotation_request(config).context("Invalid rotation target")?;

    let aws = init_aws_clients(config.aws_region.as_deref()).await;
    let key_source = key_source_for(config.key_source, &aws.kms);
    let store = SecretsManagerStore::new(aws.secrets_manager.clone());
    let directory = InertDirectoryUpdater;
    let observer = TracingObserver;

    let rotator = KeyRotator::new(key_source.as_ref(), &store, &directory, &observer);
    let report = rotator
        .rotate(&request)
        .await
        .with_context(|| format!("Key rotation failed for user {}", request.user))?;

    let summary = serde_json::to_string(&report).context("Failed to serialize rotation report")?;
    info!(report = %summary, "Rotation report");
    Ok(())
}
