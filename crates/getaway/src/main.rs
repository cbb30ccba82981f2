use clap::Parser;
use getaway::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), GetawayError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::parse();
    let server = GetawayServer::builder()
        .bind(&config.addr())
        .lobby_config(config.lobby_config())
        .build()
        .await?;

    tracing::info!(addr = %config.addr(), "listening");
    server.run().await
}
