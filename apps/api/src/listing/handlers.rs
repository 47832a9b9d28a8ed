//! Axum route handlers for the Listing API.

use axum::{
    extract::State,
    http::{header, HeaderMap},
    response::IntoResponse,
    Json,
};
use chrono::{Local, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use crate::errors::AppError;
use crate::listing::export::{to_txt_bundle, EXPORT_FILE_NAME};
use crate::listing::generator::generate_variants;
use crate::listing::history::{recent_history, HistoryEntry, HistoryItemView};
use crate::listing::models::{
    Audience, GenerationSettings, ListingFormat, ListingRequest, PropertyType, Spelling, Tone,
    MAX_LENGTH_WORDS, MAX_TEMPERATURE, MAX_VARIANTS, MIN_LENGTH_WORDS,
};
use crate::listing::prompts::build_prompt;
use crate::session::{require_licensed, session_id};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub listing: ListingRequest,
    #[serde(default)]
    pub settings: GenerationSettings,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub variants: Vec<String>,
    /// Present when some variants failed after at least one succeeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    pub remaining: u32,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub items: Vec<HistoryItemView>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/listings/generate
///
/// License gate → usage caps → prompt → variants → record usage and history.
pub async fn handle_generate(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, AppError> {
    // held until the updated session is saved
    let _guard = match session_id(&headers) {
        Some(id) => state.locks.acquire(id).await,
        None => return Err(AppError::Unauthorized),
    };
    let mut session = require_licensed(state.sessions.as_ref(), &headers).await?;

    request.listing.validate()?;
    let models = state.config.model_options();
    let model = request.settings.resolve_model(&models)?;

    let now = Local::now();
    if session.usage.roll_over(now.date_naive()) {
        // persist the reset even if this request is then refused
        state.sessions.save(&session).await?;
    }
    if let Err(denied) = session.usage.check(&now, &state.limits) {
        info!(session_id = %session.id, ?denied, "Generation refused by usage caps");
        return Err(denied.into());
    }

    let prompt = build_prompt(&request.listing);
    let outcome = generate_variants(
        &state.llm,
        &prompt,
        model,
        request.settings.temperature,
        request.settings.variants,
    )
    .await;

    if outcome.variants.is_empty() {
        return Err(match outcome.error {
            Some(error) => AppError::Llm(error),
            None => AppError::UnprocessableEntity(
                "No text returned. Try adjusting inputs and generate again.".to_string(),
            ),
        });
    }

    session.usage.record(&now);
    session.last_variants = outcome.variants.clone();
    session.history.push(HistoryEntry {
        inputs: request.listing,
        outputs: outcome.variants.clone(),
        ts: Utc::now(),
    });
    state.sessions.save(&session).await?;

    info!(
        session_id = %session.id,
        variants = outcome.variants.len(),
        used_today = session.usage.count,
        "Listing generated"
    );

    Ok(Json(GenerateResponse {
        variants: outcome.variants,
        warning: outcome.error,
        remaining: session.usage.remaining(&state.limits),
    }))
}

/// GET /api/v1/listings/history
pub async fn handle_history(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<HistoryResponse>, AppError> {
    let session = require_licensed(state.sessions.as_ref(), &headers).await?;
    Ok(Json(HistoryResponse {
        items: recent_history(&session.history),
    }))
}

/// GET /api/v1/listings/export
///
/// Downloads the most recent variants as a plain-text file.
pub async fn handle_export(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let session = require_licensed(state.sessions.as_ref(), &headers).await?;
    if session.last_variants.is_empty() {
        return Err(AppError::NotFound(
            "No listing has been generated in this session yet".to_string(),
        ));
    }

    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{EXPORT_FILE_NAME}\""),
            ),
        ],
        to_txt_bundle(&session.last_variants),
    ))
}

/// GET /api/v1/listings/options
///
/// Everything the form needs to render its selects, sliders and defaults.
pub async fn handle_options(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "property_types": PropertyType::labels(),
        "tones": Tone::labels(),
        "audiences": Audience::labels(),
        "spellings": Spelling::labels(),
        "formats": ListingFormat::labels(),
        "models": state.config.model_options(),
        "length_words": { "min": MIN_LENGTH_WORDS, "max": MAX_LENGTH_WORDS, "step": 10 },
        "temperature": { "min": 0.0, "max": MAX_TEMPERATURE, "step": 0.1 },
        "variants": { "min": 1, "max": MAX_VARIANTS },
        "defaults": {
            "listing": ListingRequest::default(),
            "settings": GenerationSettings::default(),
        }
    }))
}
