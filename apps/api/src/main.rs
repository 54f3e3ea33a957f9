mod config;
mod errors;
mod llm_client;
mod models;
mod pricing;
mod routes;
mod sales;
mod signup;
mod state;
mod validation;

#[cfg(test)]
mod test_support;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::OpenAiClient;
use crate::routes::build_router;
use crate::signup::store::SignupLog;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Cardinal Calculator API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize AI client
    let ai = OpenAiClient::new(&config).context("Failed to build AI HTTP client")?;
    info!("AI client initialized (chat model: {})", ai.chat_model());
    info!("Admin pricing config: {:?}", config.admin);

    let port = config.port;
    let state = AppState {
        ai: Arc::new(ai),
        config: Arc::new(config),
        signups: SignupLog::new(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{port}").parse()?;
    info!("Cardinal Calculator backend running on port {port}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
