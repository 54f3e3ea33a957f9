use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /
/// Plain-text banner, kept for uptime checks that predate /health.
pub async fn root_handler(State(state): State<AppState>) -> String {
    format!(
        "Cardinal Calculator backend running on port {}",
        state.config.port
    )
}

/// GET /health
/// Returns a simple status object with service version.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "cardinal-api"
    }))
}
