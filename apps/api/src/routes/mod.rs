pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method, StatusCode, Uri},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};

use crate::errors::AppError;
use crate::pricing::handlers as pricing;
use crate::sales::handlers as sales;
use crate::signup::handlers as signup;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/", get(health::root_handler))
        .route("/health", get(health::health_handler))
        // Signup capture
        .route("/email", post(signup::handle_email))
        // Pricing engine
        .route("/price", post(pricing::handle_price))
        .route("/analyze-image", post(pricing::handle_analyze_image))
        // Sales assist
        .route("/inference", post(sales::handle_inference))
        .route("/speak", post(sales::handle_speak))
        .route("/natty", post(sales::handle_natty))
        .route("/pro/job-intel", post(sales::handle_job_intel))
        .layer(middleware::map_response(method_not_allowed_as_json))
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

async fn not_found(method: Method, uri: Uri) -> AppError {
    AppError::NotFound(format!("No route for {method} {}", uri.path()))
}

/// Axum answers a wrong method with an empty 405; give it the JSON error body.
async fn method_not_allowed_as_json(response: Response) -> Response {
    if response.status() != StatusCode::METHOD_NOT_ALLOWED {
        return response;
    }

    let allow = response.headers().get(header::ALLOW).cloned();
    let message = match &allow {
        Some(methods) => format!(
            "Method not allowed. Allowed: {}",
            methods.to_str().unwrap_or_default()
        ),
        None => "Method not allowed".to_string(),
    };

    let mut rebuilt = AppError::MethodNotAllowed(message).into_response();
    if let Some(methods) = allow {
        rebuilt.headers_mut().insert(header::ALLOW, methods);
    }
    rebuilt
}
