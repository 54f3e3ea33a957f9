//! Axum route handlers for the sales-assist endpoints.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderMap},
    response::IntoResponse,
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::llm_client::chat_json;
use crate::llm_client::prompts::{JSON_ONLY_SYSTEM, LAWN_PRO_PERSONA};
use crate::pricing::estimate::{
    estimate_price, validate_sqft, Complexity, JobType, PriceBand, PriceInput,
};
use crate::pricing::heuristics::{score_summary, Scores};
use crate::sales::prompts::{INFERENCE_SYSTEM, JOB_INTEL_PROMPT_TEMPLATE, SCRIPT_SYSTEM};
use crate::sales::script::{build_script_prompt, ScriptBrief, ScriptTone};
use crate::sales::tier::Tier;
use crate::state::AppState;
use crate::validation::{bounded_text, required_text};

const MAX_INFERENCE_CHARS: usize = 4000;
const MAX_SPEECH_CHARS: usize = 4096;
const MAX_DESCRIPTION_CHARS: usize = 6000;
const MAX_NOTES_CHARS: usize = 1000;
const MAX_CREW_SIZE: u8 = 8;

/// Voices accepted by the speech endpoint.
const VOICES: &[&str] = &[
    "alloy", "ash", "ballad", "coral", "echo", "fable", "nova", "onyx", "sage", "shimmer", "verse",
];

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct InferenceRequest {
    pub text: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct InferenceResponse {
    pub ok: bool,
    pub reply: String,
    pub scores: Scores,
}

#[derive(Debug, Deserialize)]
pub struct SpeakRequest {
    pub text: Option<String>,
    pub voice: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NattyRequest {
    #[serde(alias = "baseType")]
    pub job_type: Option<String>,
    pub customer_name: Option<String>,
    pub price: Option<u32>,
    pub notes: Option<String>,
    pub tone: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct NattyResponse {
    pub ok: bool,
    pub script: String,
    pub tone: ScriptTone,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobIntelRequest {
    pub description: Option<String>,
    pub sqft: Option<f64>,
    #[serde(alias = "baseType")]
    pub job_type: Option<String>,
    pub complexity: Option<String>,
}

/// Structured assessment returned by the model for /pro/job-intel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobIntel {
    pub summary: String,
    #[serde(default)]
    pub hazards: Vec<String>,
    #[serde(default)]
    pub upsells: Vec<String>,
    #[serde(alias = "crew_size", deserialize_with = "crew_size_from_number")]
    pub crew_size: u8,
    pub hours: f64,
}

#[derive(Debug, Serialize)]
pub struct JobIntelResponse {
    pub ok: bool,
    pub tier: Tier,
    pub intel: JobIntel,
    pub scores: Scores,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<PriceBand>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /inference
///
/// Free-text question → model reply, scored with the same heuristics as photos.
pub async fn handle_inference(
    State(state): State<AppState>,
    payload: Result<Json<InferenceRequest>, JsonRejection>,
) -> Result<Json<InferenceResponse>, AppError> {
    let Json(request) = payload?;
    let text = bounded_text(request.text.as_deref(), "text", MAX_INFERENCE_CHARS)?;

    let reply = state.ai.chat(INFERENCE_SYSTEM, text).await?;
    let scores = score_summary(&reply);

    Ok(Json(InferenceResponse {
        ok: true,
        reply,
        scores,
    }))
}

/// POST /speak
///
/// Text → audio/mpeg bytes from the speech model.
pub async fn handle_speak(
    State(state): State<AppState>,
    payload: Result<Json<SpeakRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(request) = payload?;
    let text = bounded_text(request.text.as_deref(), "text", MAX_SPEECH_CHARS)?;
    let voice = resolve_voice(request.voice.as_deref(), &state.config.tts_voice)?;

    let audio: Bytes = state.ai.speak(text, &voice).await?;
    info!(
        "Synthesized {} chars as {} bytes ({voice})",
        text.chars().count(),
        audio.len()
    );

    Ok(([(header::CONTENT_TYPE, "audio/mpeg")], audio))
}

/// POST /natty
///
/// Generates a short spoken sales script for a job.
pub async fn handle_natty(
    State(state): State<AppState>,
    payload: Result<Json<NattyRequest>, JsonRejection>,
) -> Result<Json<NattyResponse>, AppError> {
    let Json(request) = payload?;

    let job_type: JobType = required_text(request.job_type.as_deref(), "jobType")?.parse()?;
    let notes = match request.notes.as_deref().map(str::trim) {
        Some(n) if !n.is_empty() => Some(bounded_text(Some(n), "notes", MAX_NOTES_CHARS)?),
        _ => None,
    };
    let tone = ScriptTone::parse_lenient(request.tone.as_deref());

    let brief = ScriptBrief {
        job_type,
        customer_name: request
            .customer_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty()),
        price: request.price,
        notes,
        tone,
    };
    let prompt = build_script_prompt(&brief);

    let script = state.ai.chat(SCRIPT_SYSTEM, &prompt).await?;

    Ok(Json(NattyResponse {
        ok: true,
        script: script.trim().to_string(),
        tone,
    }))
}

/// POST /pro/job-intel
///
/// Pro-tier only (`x-tier: pro|enterprise`). Structured job assessment from the
/// model, scored heuristically, with a price band when sqft and jobType are given.
pub async fn handle_job_intel(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<JobIntelRequest>, JsonRejection>,
) -> Result<Json<JobIntelResponse>, AppError> {
    let tier = Tier::from_headers(&headers).require_pro()?;
    let Json(request) = payload?;

    let description = bounded_text(
        request.description.as_deref(),
        "description",
        MAX_DESCRIPTION_CHARS,
    )?;
    let job_type = request
        .job_type
        .as_deref()
        .map(str::trim)
        .filter(|j| !j.is_empty())
        .map(str::parse::<JobType>)
        .transpose()?;
    let complexity = Complexity::from_optional(request.complexity.as_deref())?;
    let sqft = request.sqft.map(validate_sqft).transpose()?;

    let metrics_line = match (sqft, job_type) {
        (Some(sqft), Some(job)) => format!("Measured area: {sqft} sqft. Service: {job}."),
        (Some(sqft), None) => format!("Measured area: {sqft} sqft."),
        (None, Some(job)) => format!("Service: {job}."),
        (None, None) => String::new(),
    };
    let prompt = JOB_INTEL_PROMPT_TEMPLATE
        .replace("{persona}", LAWN_PRO_PERSONA)
        .replace("{description}", description)
        .replace("{metrics_line}", &metrics_line);

    let mut intel: JobIntel = chat_json(state.ai.as_ref(), JSON_ONLY_SYSTEM, &prompt).await?;
    intel.hours = if intel.hours.is_finite() {
        intel.hours.clamp(0.25, 40.0)
    } else {
        0.25
    };

    let scores = score_summary(&format!("{description}\n{}", intel.summary));

    let price = match (sqft, job_type) {
        (Some(sqft), Some(job_type)) => {
            let input = PriceInput {
                sqft,
                job_type,
                complexity,
                risk_level: f64::from(scores.risk_pct),
                upsell_score: f64::from(scores.upsell_pct),
            };
            Some(estimate_price(&input, &state.config.admin)?.band)
        }
        _ => None,
    };

    info!(
        "Job intel for {tier} tier: crew={} hours={} risk={}",
        intel.crew_size, intel.hours, scores.risk_pct
    );

    Ok(Json(JobIntelResponse {
        ok: true,
        tier,
        intel,
        scores,
        price,
    }))
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

/// Models answer with `2`, `2.0` or `12`; round and clamp to a real crew.
fn crew_size_from_number<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = f64::deserialize(deserializer)?;
    if !raw.is_finite() {
        return Ok(1);
    }
    Ok(raw.round().clamp(1.0, f64::from(MAX_CREW_SIZE)) as u8)
}

fn resolve_voice(requested: Option<&str>, default_voice: &str) -> Result<String, AppError> {
    let voice = requested
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default_voice.to_string());

    if VOICES.contains(&voice.as_str()) {
        Ok(voice)
    } else {
        Err(AppError::Validation(format!(
            "Unknown voice '{voice}'. Expected one of: {}",
            VOICES.join(", ")
        )))
    }
}
