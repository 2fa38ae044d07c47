use clap::Parser;
use kinesis_slurper::{create_client, Cli, SlurpConfig, Slurper, SlurperError};
use std::io;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        // stdout carries the records
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = SlurpConfig::try_from(cli)?;

    info!(
        stream = %config.stream_name,
        shard = %config.shard_id,
        region = %config.region,
        "Initializing Kinesis client"
    );
    let client = create_client(&config.region, config.endpoint_url.as_deref()).await;

    let slurper = Slurper::new(client).with_batch_limit(config.batch_limit);
    let request = config.request();
    let mut out = io::stdout().lock();

    slurper.slurp(&request, &mut out).await.map_err(|e| {
        anyhow::anyhow!("Failed to slurp stream {}: {}", request.stream_name, e)
    })?;
    Ok(())
}

#[tokio::main]
async fn main() {
    init_logging();

    if let Err(e) = run(Cli::parse()).await {
        match e.downcast_ref::<SlurperError>() {
            Some(err) if err.is_config_error() => error!(error = %err, "Invalid arguments"),
            _ => error!("{:#}", e),
        }
        std::process::exit(1);
    }
}
