use std::str::FromStr;

use anyhow::{ensure, Context, Result};

use crate::pricing::estimate::AdminConfig;

const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub chat_model: String,
    pub vision_model: String,
    pub tts_model: String,
    pub tts_voice: String,
    pub port: u16,
    pub rust_log: String,
    pub max_upload_bytes: usize,
    pub admin: AdminConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            openai_api_key: require_env("OPENAI_API_KEY")?,
            openai_base_url: env_or("OPENAI_BASE_URL", DEFAULT_OPENAI_BASE_URL),
            chat_model: env_or("CHAT_MODEL", "gpt-4o-mini"),
            vision_model: env_or("VISION_MODEL", "gpt-4o-mini"),
            tts_model: env_or("TTS_MODEL", "gpt-4o-mini-tts"),
            tts_voice: env_or("TTS_VOICE", "alloy"),
            port: parse_env("PORT", 10000)?,
            rust_log: env_or("RUST_LOG", "info"),
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            admin: AdminConfig::from_env()?,
        })
    }
}

impl AdminConfig {
    /// Overlays optional pricing overrides on top of the defaults.
    pub fn from_env() -> Result<Self> {
        let defaults = AdminConfig::default();
        let admin = AdminConfig {
            admin_multiplier: parse_env("ADMIN_MULTIPLIER", defaults.admin_multiplier)?,
            band_low_pct: parse_env("BAND_LOW_PCT", defaults.band_low_pct)?,
            band_high_pct: parse_env("BAND_HIGH_PCT", defaults.band_high_pct)?,
            minimum_charge: parse_env("MINIMUM_CHARGE", defaults.minimum_charge)?,
            upsell_share: parse_env("UPSELL_SHARE", defaults.upsell_share)?,
        };
        admin.validate()?;
        Ok(admin)
    }

    /// Rejects overrides that would break band ordering or the 5-dollar grid.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.admin_multiplier.is_finite() && self.admin_multiplier > 0.0,
            "ADMIN_MULTIPLIER must be a positive number, got {}",
            self.admin_multiplier
        );
        ensure!(
            self.upsell_share.is_finite() && self.upsell_share > 0.0,
            "UPSELL_SHARE must be a positive number, got {}",
            self.upsell_share
        );
        ensure!(
            (0.0..1.0).contains(&self.band_low_pct),
            "BAND_LOW_PCT must be in [0, 1), got {}",
            self.band_low_pct
        );
        ensure!(
            (0.0..1.0).contains(&self.band_high_pct),
            "BAND_HIGH_PCT must be in [0, 1), got {}",
            self.band_high_pct
        );
        ensure!(
            self.minimum_charge % 5 == 0,
            "MINIMUM_CHARGE must be a multiple of 5, got {}",
            self.minimum_charge
        );
        Ok(())
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value: '{raw}'")),
        Err(_) => Ok(default),
    }
}
