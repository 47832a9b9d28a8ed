use axum::{extract::State, http::HeaderMap, Json};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::license::{unlock, UnlockOutcome};
use crate::session::{current_session, session_id, Session};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UnlockRequest {
    pub access_key: String,
}

#[derive(Debug, Serialize)]
pub struct UnlockResponse {
    pub session_id: Uuid,
    pub licensed: bool,
    pub bypass: bool,
    pub message: String,
}

/// POST /api/v1/license/unlock
///
/// Unlocks the caller's session, creating one if the request carries no known id.
pub async fn handle_unlock(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<UnlockRequest>,
) -> Result<Json<UnlockResponse>, AppError> {
    let outcome = unlock(
        &request.access_key,
        &state.config.admin_bypass,
        &state.license,
    )
    .await?;

    let _guard = match session_id(&headers) {
        Some(id) => Some(state.locks.acquire(id).await),
        None => None,
    };
    let mut session = current_session(state.sessions.as_ref(), &headers)
        .await?
        .unwrap_or_default();
    session.licensed = true;
    if outcome == UnlockOutcome::AdminOverride {
        session.usage.bypass = true;
    }
    state.sessions.save(&session).await?;

    info!(session_id = %session.id, ?outcome, "Session unlocked");

    Ok(Json(unlock_response(&session, outcome)))
}

fn unlock_response(session: &Session, outcome: UnlockOutcome) -> UnlockResponse {
    let message = match outcome {
        UnlockOutcome::AdminOverride => "Admin override accepted",
        UnlockOutcome::Licensed => "License verified",
    };
    UnlockResponse {
        session_id: session.id,
        licensed: session.licensed,
        bypass: session.usage.bypass,
        message: message.to_string(),
    }
}
