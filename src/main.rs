use anyhow::Context;
use market::config::AppConfig;
use market::server::ServerBuilder;
use market::telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("failed to load configuration")?;
    telemetry::init(config.logging.format);

    tracing::info!(
        backend = ?config.storage.backend,
        address = %config.server.address(),
        "starting market-api"
    );

    ServerBuilder::new(config)
        .serve()
        .await
        .context("server terminated with an error")?;

    Ok(())
}
