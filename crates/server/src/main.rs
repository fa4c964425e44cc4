use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod accounts;
mod config;
mod error;
mod market;
mod redemption;
mod server;
mod submissions;
mod wallet;


use config::ServerConfig;
use server::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "uramix_server=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting URAMix rewards server");

    let config = ServerConfig::from_env()?;
    info!(
        "Rates: organic {} / inorganic {} base credits, min withdrawal {} credits",
        config.rates.organic_base_credits,
        config.rates.inorganic_base_credits,
        config.rates.min_withdrawal
    );

    let state = Arc::new(AppState::new(config)?);
    server::run(state).await?;
    Ok(())
}
