//! Per-user session state: license status, usage counter, and the listings
//! produced during the session.
//!
//! Clients receive the session id when they unlock and send it back in the
//! `x-session-id` header. `AppState` holds an `Arc<dyn SessionStore>`, chosen at
//! startup: in-memory by default, Redis when `REDIS_URL` is set.

use async_trait::async_trait;
use axum::http::HeaderMap;
use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::listing::history::HistoryEntry;

pub mod handlers;
pub mod lock;
pub mod store;
pub mod usage;

use usage::UsageCounter;

pub const SESSION_HEADER: &str = "x-session-id";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub licensed: bool,
    pub usage: UsageCounter,
    pub history: Vec<HistoryEntry>,
    pub last_variants: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            licensed: false,
            usage: UsageCounter::new(Local::now().date_naive()),
            history: Vec::new(),
            last_variants: Vec::new(),
            created_at: Utc::now(),
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Session persistence. Implement this to swap backends without touching handlers.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self, id: Uuid) -> Result<Option<Session>, AppError>;
    async fn save(&self, session: &Session) -> Result<(), AppError>;
}

/// Reads the session id header. Malformed ids are treated as absent.
pub fn session_id(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| Uuid::parse_str(v.trim()).ok())
}

/// Loads the caller's session if the request carries a known id.
pub async fn current_session(
    store: &dyn SessionStore,
    headers: &HeaderMap,
) -> Result<Option<Session>, AppError> {
    match session_id(headers) {
        Some(id) => store.load(id).await,
        None => Ok(None),
    }
}

/// Loads the caller's session and fails with `Unauthorized` unless it has been unlocked.
pub async fn require_licensed(
    store: &dyn SessionStore,
    headers: &HeaderMap,
) -> Result<Session, AppError> {
    match current_session(store, headers).await? {
        Some(session) if session.licensed => Ok(session),
        _ => Err(AppError::Unauthorized),
    }
}
