use std::sync::Arc;

use crate::config::Config;
use crate::license::LicenseVerifier;
use crate::llm_client::LlmClient;
use crate::session::lock::SessionLocks;
use crate::session::usage::UsageLimits;
use crate::session::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub llm: LlmClient,
    pub license: LicenseVerifier,
    /// Pluggable session store. Default: in-memory. Redis when REDIS_URL is set.
    pub sessions: Arc<dyn SessionStore>,
    /// Serialises read-modify-write handlers per session.
    pub locks: SessionLocks,
    pub limits: UsageLimits,
    pub config: Config,
}
