pub mod health;
pub mod ui;

use axum::{
    routing::{get, post},
    Router,
};

use crate::license::handlers as license;
use crate::listing::handlers as listing;
use crate::session::handlers as session;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(ui::index_handler))
        .route("/health", get(health::health_handler))
        // License gate
        .route("/api/v1/license/unlock", post(license::handle_unlock))
        // Usage caps
        .route("/api/v1/usage", get(session::handle_usage))
        // Listings
        .route("/api/v1/listings/options", get(listing::handle_options))
        .route("/api/v1/listings/generate", post(listing::handle_generate))
        .route("/api/v1/listings/history", get(listing::handle_history))
        .route("/api/v1/listings/export", get(listing::handle_export))
        .with_state(state)
}
