use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::AiProvider;
use crate::signup::store::SignupLog;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Single gateway to the hosted model. `OpenAiClient` in production.
    pub ai: Arc<dyn AiProvider>,
    /// Includes the admin pricing config; read-only after startup.
    pub config: Arc<Config>,
    pub signups: SignupLog,
}
