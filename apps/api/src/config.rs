use anyhow::{Context, Result};

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const GUMROAD_API_URL: &str = "https://api.gumroad.com/v2";

/// Application configuration loaded from environment variables.
/// Fails at startup if the generation API key is missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: String,
    pub openai_default_model: String,
    pub openai_base_url: String,
    /// Gumroad product permalink slug. Empty disables license verification.
    pub gumroad_product_permalink: String,
    pub gumroad_api_url: String,
    /// Private unlock code. Empty disables the override.
    pub admin_bypass: String,
    pub usage_daily_limit: u32,
    pub usage_cooldown_seconds: u64,
    pub redis_url: Option<String>,
    pub session_ttl_seconds: u64,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            openai_api_key: require_env("OPENAI_API_KEY")?,
            openai_default_model: env_or("OPENAI_DEFAULT_MODEL", DEFAULT_MODEL),
            openai_base_url: env_or("OPENAI_BASE_URL", OPENAI_BASE_URL),
            gumroad_product_permalink: env_or("GUMROAD_PRODUCT_PERMALINK", ""),
            gumroad_api_url: env_or("GUMROAD_API_URL", GUMROAD_API_URL),
            admin_bypass: env_or("ADMIN_BYPASS", ""),
            usage_daily_limit: env_or("USAGE_DAILY_LIMIT", "50")
                .parse::<u32>()
                .context("USAGE_DAILY_LIMIT must be a non-negative integer")?,
            usage_cooldown_seconds: env_or("USAGE_COOLDOWN_SECONDS", "5")
                .parse::<u64>()
                .context("USAGE_COOLDOWN_SECONDS must be a non-negative integer")?,
            redis_url: std::env::var("REDIS_URL").ok().filter(|v| !v.trim().is_empty()),
            session_ttl_seconds: env_or("SESSION_TTL_SECONDS", "86400")
                .parse::<u64>()
                .context("SESSION_TTL_SECONDS must be a non-negative integer")?,
            port: env_or("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }

    /// Models offered in the settings panel. The configured default always comes first.
    pub fn model_options(&self) -> Vec<String> {
        let mut models: Vec<String> = Vec::new();
        for model in [self.openai_default_model.as_str(), "gpt-4o", "gpt-4o-mini"] {
            if !models.iter().any(|m| m == model) {
                models.push(model.to_string());
            }
        }
        models
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
pub(crate) fn test_config() -> Config {
    Config {
        openai_api_key: "sk-test".to_string(),
        openai_default_model: DEFAULT_MODEL.to_string(),
        openai_base_url: OPENAI_BASE_URL.to_string(),
        gumroad_product_permalink: "listing-gen-pro".to_string(),
        gumroad_api_url: GUMROAD_API_URL.to_string(),
        admin_bypass: "letmein".to_string(),
        usage_daily_limit: 50,
        usage_cooldown_seconds: 5,
        redis_url: None,
        session_ttl_seconds: 86400,
        port: 8080,
        rust_log: "info".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_options_default_first_without_duplicates() {
        let config = test_config();
        assert_eq!(config.model_options(), vec!["gpt-4o-mini", "gpt-4o"]);
    }

    #[test]
    fn test_model_options_custom_default() {
        let config = Config {
            openai_default_model: "gpt-4.1".to_string(),
            ..test_config()
        };
        assert_eq!(
            config.model_options(),
            vec!["gpt-4.1", "gpt-4o", "gpt-4o-mini"]
        );
    }
}
