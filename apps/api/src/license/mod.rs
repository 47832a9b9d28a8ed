//! License gate: Gumroad license verification plus the admin override.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::errors::AppError;

pub mod handlers;

const VERIFY_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum LicenseError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected response: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
struct VerifyResponse {
    #[serde(default)]
    success: bool,
}

/// How a session was unlocked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlockOutcome {
    Licensed,
    AdminOverride,
}

#[derive(Clone)]
pub struct LicenseVerifier {
    client: Client,
    base_url: String,
    product_permalink: String,
}

impl LicenseVerifier {
    pub fn new(base_url: &str, product_permalink: &str) -> Result<Self> {
        Ok(Self {
            client: Client::builder()
                .timeout(VERIFY_TIMEOUT)
                .build()
                .context("Failed to build HTTP client")?,
            base_url: base_url.trim_end_matches('/').to_string(),
            product_permalink: product_permalink.trim().to_string(),
        })
    }

    pub fn is_configured(&self) -> bool {
        !self.product_permalink.is_empty()
    }

    /// Asks Gumroad whether `license_key` belongs to the product. Does not bump the use count.
    ///
    /// Gumroad answers unknown keys with a non-2xx status, which counts as invalid.
    pub async fn verify(&self, license_key: &str) -> Result<bool, LicenseError> {
        let response = self
            .client
            .post(format!("{}/licenses/verify", self.base_url))
            .form(&[
                ("product_permalink", self.product_permalink.as_str()),
                ("license_key", license_key),
                ("increment_uses_count", "false"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            info!(status = %response.status(), "License rejected by Gumroad");
            return Ok(false);
        }

        let bytes = response.bytes().await?;
        let body: VerifyResponse = serde_json::from_slice(&bytes)?;
        Ok(body.success)
    }
}

/// Decides whether `access_key` unlocks the app.
///
/// The admin override is compared first and never reaches Gumroad.
pub async fn unlock(
    access_key: &str,
    admin_override: &str,
    verifier: &LicenseVerifier,
) -> Result<UnlockOutcome, AppError> {
    let key = access_key.trim();
    let admin = admin_override.trim();

    if !admin.is_empty() && key == admin {
        info!("Admin override accepted");
        return Ok(UnlockOutcome::AdminOverride);
    }

    if key.is_empty() {
        return Err(AppError::Validation("access_key cannot be empty".to_string()));
    }

    if !verifier.is_configured() {
        return Err(AppError::Misconfigured(
            "missing GUMROAD_PRODUCT_PERMALINK".to_string(),
        ));
    }

    match verifier.verify(key).await {
        Ok(true) => {
            info!("License verified");
            Ok(UnlockOutcome::Licensed)
        }
        Ok(false) => {
            warn!("Invalid license key submitted");
            Err(AppError::InvalidLicense)
        }
        Err(e) => Err(AppError::LicenseService(e.to_string())),
    }
}
