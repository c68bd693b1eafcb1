//! # rp-configs
//!
//! Layered settings: built-in defaults, then `config/repute.toml` if present, then
//! `REPUTE__SECTION__KEY` environment variables. A `.env` file is loaded first.

use config::{Config, Environment, File, Map};
use secrecy::SecretString;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

pub const DEFAULT_CONFIG_FILE: &str = "config/repute.toml";
const ENV_PREFIX: &str = "REPUTE";
const ENV_SEPARATOR: &str = "__";
/// Read when `llm.api_key` is not set through the layered sources.
const API_KEY_FALLBACK_VAR: &str = "OPENAI_API_KEY";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load settings: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid setting `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackendSettings {
    pub base_url: String,
    pub product_id: i64,
    pub days_back: u32,
    pub timeout_secs: u64,
}

impl BackendSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmSettings {
    pub base_url: String,
    pub model: String,
    #[serde(default)]
    pub api_key: Option<SecretString>,
    pub timeout_secs: u64,
}

impl LlmSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    pub dir: PathBuf,
    pub ttl_hours: u64,
}

impl CacheSettings {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_hours * 3600)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResponseSettings {
    pub allow_empty_completion: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub backend: BackendSettings,
    pub llm: LlmSettings,
    pub cache: CacheSettings,
    pub responses: ResponseSettings,
}

impl Settings {
    /// Loads `.env`, then the layered sources from the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(path) => debug!(path = %path.display(), "loaded .env"),
            Err(e) if e.not_found() => {}
            Err(e) => warn!(error = %e, "ignoring unreadable .env"),
        }
        Self::build(
            Path::new(DEFAULT_CONFIG_FILE),
            None,
            std::env::var(API_KEY_FALLBACK_VAR).ok(),
        )
    }

    /// `env` replaces the process environment when given.
    pub fn build(
        file: &Path,
        env: Option<Map<String, String>>,
        fallback_api_key: Option<String>,
    ) -> Result<Self, ConfigError> {
        let raw = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("backend.base_url", "http://127.0.0.1:8000")?
            .set_default("backend.product_id", 1)?
            .set_default("backend.days_back", 30)?
            .set_default("backend.timeout_secs", 15)?
            .set_default("llm.base_url", "https://api.openai.com/v1")?
            .set_default("llm.model", "gpt-4o-mini")?
            .set_default("llm.timeout_secs", 30)?
            .set_default("cache.dir", "./data/cache")?
            .set_default("cache.ttl_hours", 24)?
            .set_default("responses.allow_empty_completion", true)?
            .add_source(File::from(file).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator(ENV_SEPARATOR)
                    .separator(ENV_SEPARATOR)
                    .try_parsing(true)
                    .source(env),
            )
            .build()?;

        let mut settings: Settings = raw.try_deserialize()?;
        if settings.llm.api_key.is_none() {
            settings.llm.api_key = fallback_api_key
                .filter(|k| !k.is_empty())
                .map(SecretString::from);
        }
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.backend.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "backend.base_url",
                reason: "must not be empty".into(),
            });
        }
        if self.llm.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "llm.timeout_secs",
                reason: "must be at least 1".into(),
            });
        }
        if self.cache.ttl_hours == 0 {
            return Err(ConfigError::Invalid {
                key: "cache.ttl_hours",
                reason: "must be at least 1".into(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> Option<Map<String, String>> {
        Some(pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect())
    }

    fn missing_file() -> PathBuf {
        PathBuf::from("does/not/exist.toml")
    }

    #[test]
    fn defaults_apply_without_sources() {
        let settings = Settings::build(&missing_file(), env(&[]), None).unwrap();
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.llm.model, "gpt-4o-mini");
        assert_eq!(settings.llm.timeout(), Duration::from_secs(30));
        assert_eq!(settings.cache.ttl(), Duration::from_secs(24 * 3600));
        assert_eq!(settings.backend.days_back, 30);
        assert!(settings.responses.allow_empty_completion);
        assert!(settings.llm.api_key.is_none());
    }

    #[test]
    fn file_then_env_override() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[server]\nport = 9000\n\n[backend]\nproduct_id = 7").unwrap();

        let settings = Settings::build(
            file.path(),
            env(&[("REPUTE__SERVER__PORT", "9100"), ("REPUTE__LLM__MODEL", "gpt-4o")]),
            None,
        )
        .unwrap();
        assert_eq!(settings.server.port, 9100);
        assert_eq!(settings.backend.product_id, 7);
        assert_eq!(settings.llm.model, "gpt-4o");
    }

    #[test]
    fn api_key_falls_back_to_openai_var() {
        let settings = Settings::build(&missing_file(), env(&[]), Some("sk-fallback".into())).unwrap();
        assert_eq!(settings.llm.api_key.unwrap().expose_secret(), "sk-fallback");

        let settings = Settings::build(
            &missing_file(),
            env(&[("REPUTE__LLM__API_KEY", "sk-layered")]),
            Some("sk-fallback".into()),
        )
        .unwrap();
        assert_eq!(settings.llm.api_key.unwrap().expose_secret(), "sk-layered");
    }

    #[test]
    fn zero_ttl_is_rejected() {
        let err = Settings::build(&missing_file(), env(&[("REPUTE__CACHE__TTL_HOURS", "0")]), None).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "cache.ttl_hours", .. }));
    }
}
