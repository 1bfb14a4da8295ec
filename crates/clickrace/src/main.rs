use clickrace::{ClickRaceError, ClickRaceServer, ServerConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), ClickRaceError> {
    // A missing .env is fine.
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let config = ServerConfig::from_env()?;
    tracing::info!(host = %config.host, port = config.port, "starting ClickRace");

    let server = ClickRaceServer::builder()
        .bind(&config.bind_addr())
        .build()
        .await?;
    server.run().await
}
