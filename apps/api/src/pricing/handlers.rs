//! Axum route handlers for the pricing endpoints.

use axum::{
    extract::{
        multipart::{Field, MultipartRejection},
        rejection::JsonRejection,
        Multipart, State,
    },
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::pricing::estimate::{
    estimate_price, validate_sqft, Complexity, JobType, Multipliers, PriceBand, PriceInput,
};
use crate::pricing::heuristics::{apply_cues, detect_cues, Cues, Scores, BASE_RISK, BASE_UPSELL};
use crate::pricing::prompts::YARD_VISION_PROMPT;
use crate::state::AppState;
use crate::validation::required_text;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceRequest {
    pub sqft: Option<f64>,
    #[serde(alias = "jobType")]
    pub base_type: Option<String>,
    pub complexity: Option<String>,
    pub risk_level: Option<f64>,
    pub upsell_score: Option<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceResponse {
    pub ok: bool,
    pub job_type: JobType,
    pub complexity: Complexity,
    pub price: PriceBand,
    pub core_price: f64,
    pub multipliers: Multipliers,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeImageResponse {
    pub ok: bool,
    pub summary: String,
    pub cues: Cues,
    pub scores: Scores,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<PriceBand>,
}

/// Everything pulled out of the /analyze-image multipart body.
#[derive(Debug, Default)]
struct ImageUpload {
    file: Option<(Bytes, String)>,
    sqft: Option<String>,
    job_type: Option<String>,
    complexity: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /price
///
/// Deterministic price band from structured job metrics. No AI call.
pub async fn handle_price(
    State(state): State<AppState>,
    payload: Result<Json<PriceRequest>, JsonRejection>,
) -> Result<Json<PriceResponse>, AppError> {
    let Json(request) = payload?;

    let sqft = request
        .sqft
        .ok_or_else(|| AppError::Validation("sqft is required".to_string()))?;
    let job_type: JobType = required_text(request.base_type.as_deref(), "baseType")?.parse()?;
    let complexity = Complexity::from_optional(request.complexity.as_deref())?;

    let input = PriceInput {
        sqft,
        job_type,
        complexity,
        risk_level: request.risk_level.unwrap_or(f64::from(BASE_RISK)),
        upsell_score: request.upsell_score.unwrap_or(f64::from(BASE_UPSELL)),
    };
    let estimate = estimate_price(&input, &state.config.admin)?;

    info!(
        "Priced {} job: {} sqft → target {}",
        job_type, sqft, estimate.band.target
    );

    Ok(Json(PriceResponse {
        ok: true,
        job_type,
        complexity,
        price: estimate.band,
        core_price: estimate.core_price,
        multipliers: estimate.multipliers,
    }))
}

/// POST /analyze-image
///
/// Multipart upload: `file` (required, image/*), plus optional `sqft`, `jobType`
/// and `complexity` text fields. The vision summary drives the heuristic scores.
/// `sqft` and `jobType` go together: both attach a price band, one alone is a 400.
pub async fn handle_analyze_image(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<AnalyzeImageResponse>, AppError> {
    let upload = read_upload(multipart?).await?;

    let (image, mime) = upload
        .file
        .ok_or_else(|| AppError::Validation("file is required".to_string()))?;

    // Validate pricing fields before spending a vision call on the image.
    let pricing = match (upload.sqft.as_deref(), upload.job_type.as_deref()) {
        (Some(sqft), Some(job_type)) => {
            let sqft: f64 = sqft
                .trim()
                .parse()
                .map_err(|_| AppError::Validation("sqft must be a number".to_string()))?;
            Some((validate_sqft(sqft)?, job_type.parse::<JobType>()?))
        }
        (Some(_), None) => {
            return Err(AppError::Validation(
                "jobType is required when sqft is given".to_string(),
            ))
        }
        (None, Some(_)) => {
            return Err(AppError::Validation(
                "sqft is required when jobType is given".to_string(),
            ))
        }
        (None, None) => None,
    };
    let complexity = Complexity::from_optional(upload.complexity.as_deref())?;

    let summary = state
        .ai
        .describe_image(&image, &mime, YARD_VISION_PROMPT)
        .await?;

    let cues = detect_cues(&summary);
    let scores = apply_cues(&cues);

    let price = match pricing {
        Some((sqft, job_type)) => {
            let input = PriceInput {
                sqft,
                job_type,
                complexity,
                risk_level: f64::from(scores.risk_pct),
                upsell_score: f64::from(scores.upsell_pct),
            };
            Some(estimate_price(&input, &state.config.admin)?.band)
        }
        None => None,
    };

    info!(
        "Analyzed {} byte image: close={} upsell={} risk={}",
        image.len(),
        scores.close_pct,
        scores.upsell_pct,
        scores.risk_pct
    );

    Ok(Json(AnalyzeImageResponse {
        ok: true,
        summary,
        cues,
        scores,
        price,
    }))
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

async fn read_upload(mut multipart: Multipart) -> Result<ImageUpload, AppError> {
    let mut upload = ImageUpload::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" | "image" | "photo" => {
                let mime = image_mime(&field)?;
                let data = field.bytes().await?;
                if data.is_empty() {
                    return Err(AppError::Validation("file is empty".to_string()));
                }
                upload.file = Some((data, mime));
            }
            "sqft" => upload.sqft = non_blank(field.text().await?),
            "jobType" | "baseType" => upload.job_type = non_blank(field.text().await?),
            "complexity" => upload.complexity = non_blank(field.text().await?),
            _ => {}
        }
    }

    Ok(upload)
}

/// Accepts image/* parts. Untyped or octet-stream parts are treated as JPEG.
fn image_mime(field: &Field<'_>) -> Result<String, AppError> {
    match field.content_type() {
        None | Some("application/octet-stream") => Ok("image/jpeg".to_string()),
        Some(ct) if ct.starts_with("image/") => Ok(ct.to_string()),
        Some(ct) => Err(AppError::Validation(format!(
            "file must be an image, got '{ct}'"
        ))),
    }
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
