use anyhow::Context;
use image_ingest::config::{Config, LoggingConfig};
use image_ingest::{function_handler, ImageIngestHandler, S3ObjectStore};
use lambda_runtime::{run, service_fn, Error};
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load configuration
    let config = Config::load().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    // Initialize logging
    init_tracing(&config.logging)?;

    info!(
        service = %config.service.name,
        version = env!("CARGO_PKG_VERSION"),
        bucket = %config.storage.bucket_name,
        payload_field = %config.ingest.payload_field,
        "Starting image ingest function"
    );

    let store = Arc::new(S3ObjectStore::new(&config.storage).await);
    let handler = ImageIngestHandler::new(store, &config);

    run(service_fn(|event| function_handler(event, &handler))).await
}

/// Initialize tracing/logging
fn init_tracing(config: &LoggingConfig) -> anyhow::Result<()> {
    let level = match config.level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::from_default_env()
        .add_directive(format!("image_ingest={}", level).parse()?)
        .add_directive("aws_config=warn".parse()?)
        .add_directive("aws_smithy_runtime=warn".parse()?)
        .add_directive("lambda_runtime=info".parse()?);

    let subscriber = tracing_subscriber::registry().with(filter);

    // CloudWatch stamps every line, so the formatter omits the time
    if config.format == "json" {
        subscriber
            .with(fmt::layer().json().without_time().with_ansi(false))
            .init();
    } else {
        subscriber.with(fmt::layer().pretty()).init();
    }

    Ok(())
}
