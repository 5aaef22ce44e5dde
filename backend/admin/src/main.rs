//! Water-report registry admin backend: entry point.
//!
//! Connects to an Ethereum JSON-RPC node that holds the administrator's
//! unlocked account, checks it is on the expected chain, and serves the
//! report / user / settings gateways as a small Axum REST API for the admin
//! UI.

mod api;
mod config;
mod contract;
mod errors;
mod models;
mod provider;
mod reports;
mod rpc;
mod settings;
mod units;
mod users;

#[cfg(test)]
mod testing;

use std::sync::Arc;

use reqwest::Client;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::Config;
use provider::ProviderAdapter;
use rpc::HttpChain;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load optional .env file (ignored if missing).
    let _ = dotenvy::dotenv();

    // Initialise structured logging (RUST_LOG controls verbosity).
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!("{e}"))?;

    let client = Client::builder().timeout(config.request_timeout()).build()?;
    let chain = Arc::new(HttpChain::new(client, config.rpc_url.clone()));

    let provider = Arc::new(ProviderAdapter::new(
        chain,
        config.contract_address,
        config.account,
        config.receipt_poll_interval(),
    ));
    provider
        .ensure_chain(config.chain_id)
        .await
        .map_err(|e| anyhow::anyhow!("{e}"))?;

    let state = Arc::new(api::ApiState {
        reports: reports::ReportGateway::new(provider.clone()),
        users: users::UserGateway::new(provider.clone()),
        settings: settings::SettingsGateway::new(provider),
    });

    let app = api::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr = format!("0.0.0.0:{}", config.api_port);
    info!("Admin API listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
