use axum::{extract::State, http::HeaderMap, Json};
use chrono::{Local, NaiveDate};
use serde::Serialize;

use crate::errors::AppError;
use crate::session::{require_licensed, session_id};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct UsageResponse {
    pub date: NaiveDate,
    pub used: u32,
    pub remaining: u32,
    pub daily_limit: u32,
    pub cooldown_seconds: u64,
    pub bypass: bool,
}

/// GET /api/v1/usage
///
/// Generations left today for the caller's session.
pub async fn handle_usage(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<UsageResponse>, AppError> {
    let _guard = match session_id(&headers) {
        Some(id) => state.locks.acquire(id).await,
        None => return Err(AppError::Unauthorized),
    };
    let mut session = require_licensed(state.sessions.as_ref(), &headers).await?;

    if session.usage.roll_over(Local::now().date_naive()) {
        state.sessions.save(&session).await?;
    }

    Ok(Json(UsageResponse {
        date: session.usage.date,
        used: session.usage.count,
        remaining: session.usage.remaining(&state.limits),
        daily_limit: state.limits.daily_limit,
        cooldown_seconds: state.limits.cooldown_seconds,
        bypass: session.usage.bypass,
    }))
}
