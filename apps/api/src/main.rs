mod config;
mod errors;
mod license;
mod listing;
mod llm_client;
mod routes;
mod session;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::license::LicenseVerifier;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::session::lock::SessionLocks;
use crate::session::store::{MemorySessionStore, RedisSessionStore};
use crate::session::usage::UsageLimits;
use crate::session::SessionStore;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing OPENAI_API_KEY)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Listing API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM client
    let llm = LlmClient::new(config.openai_api_key.clone(), &config.openai_base_url)?;
    info!(
        "LLM client initialized (default model: {})",
        config.openai_default_model
    );

    // Initialize license gate
    let license = LicenseVerifier::new(
        &config.gumroad_api_url,
        &config.gumroad_product_permalink,
    )?;
    if !license.is_configured() {
        warn!("GUMROAD_PRODUCT_PERMALINK is not set; only the admin override can unlock");
    }
    if config.admin_bypass.trim().is_empty() {
        info!("Admin override disabled");
    }

    // Initialize session store (Redis when configured, otherwise in-process)
    let sessions: Arc<dyn SessionStore> = match &config.redis_url {
        Some(url) => {
            let client = redis::Client::open(url.as_str())?;
            info!("Redis session store initialized");
            Arc::new(RedisSessionStore::new(client, config.session_ttl_seconds))
        }
        None => {
            info!("In-memory session store initialized");
            Arc::new(MemorySessionStore::new(Duration::from_secs(
                config.session_ttl_seconds,
            )))
        }
    };

    let limits = UsageLimits {
        daily_limit: config.usage_daily_limit,
        cooldown_seconds: config.usage_cooldown_seconds,
    };
    info!(
        "Usage caps: {} generations/day, {}s cooldown",
        limits.daily_limit, limits.cooldown_seconds
    );

    // Build app state
    let state = AppState {
        llm,
        license,
        sessions,
        locks: SessionLocks::new(),
        limits,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
