//! Axum route handler for signup capture.

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;
use crate::validation::required_text;

const DEFAULT_ROLE: &str = "homeowner";
const MAX_EMAIL_LEN: usize = 254;
const MAX_ROLE_LEN: usize = 32;

#[derive(Debug, Deserialize)]
pub struct EmailRequest {
    pub email: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailResponse {
    pub ok: bool,
    pub id: Uuid,
    pub already_registered: bool,
    pub total: usize,
}

/// POST /email
pub async fn handle_email(
    State(state): State<AppState>,
    payload: Result<Json<EmailRequest>, JsonRejection>,
) -> Result<Json<EmailResponse>, AppError> {
    let Json(request) = payload?;

    let email = normalize_email(required_text(request.email.as_deref(), "email")?)?;
    let role = normalize_role(request.role.as_deref())?;

    let outcome = state.signups.append(email, role).await;
    info!(
        "Signup recorded: role={} repeat={} total={}",
        outcome.entry.role, outcome.already_registered, outcome.total
    );

    Ok(Json(EmailResponse {
        ok: true,
        id: outcome.entry.id,
        already_registered: outcome.already_registered,
        total: outcome.total,
    }))
}

/// Lowercases and sanity-checks an address. Deliverability is not verified.
fn normalize_email(raw: &str) -> Result<String, AppError> {
    let email = raw.trim().to_lowercase();
    let invalid = || AppError::Validation(format!("'{}' is not a valid email address", raw.trim()));

    if email.len() > MAX_EMAIL_LEN || email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty()
        || domain.contains('@')
        || !domain.contains('.')
        || domain.starts_with('.')
        || domain.ends_with('.')
    {
        return Err(invalid());
    }
    Ok(email)
}

fn normalize_role(raw: Option<&str>) -> Result<String, AppError> {
    let role = raw.map(str::trim).filter(|r| !r.is_empty()).unwrap_or(DEFAULT_ROLE);
    if role.len() > MAX_ROLE_LEN {
        return Err(AppError::Validation(format!(
            "role must be at most {MAX_ROLE_LEN} characters"
        )));
    }
    Ok(role.to_lowercase())
}
