//! Application configuration, loaded from environment variables.
//!
//! `main` loads `.env` first (via dotenvy), so everything below can also be
//! set there.
//!
//! Environment variables:
//! - `LLM_PROVIDER` - `groq` (default) or `gemini`
//! - `GROQ_API_KEY` / `GEMINI_API_KEY` - credential for the selected provider (required)
//! - `GROQ_MODEL` / `GEMINI_MODEL` - model override
//! - `GROQ_BASE_URL` / `GEMINI_BASE_URL` - API base URL override
//! - `LLM_TIMEOUT_SECS` - per-request timeout for provider calls (default: 60)
//! - `LLM_TEMPERATURE` / `LLM_MAX_TOKENS` - sampling parameters (default: 0.7 / 1024)
//! - `SERVER_HOST` - bind address (default: `0.0.0.0`)
//! - `PORT` / `SERVER_PORT` - HTTP port (default: 3000)

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::infrastructure::gemini::{DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL};
use crate::infrastructure::groq::{DEFAULT_GROQ_BASE_URL, DEFAULT_GROQ_MODEL};
use crate::use_cases::GenerationSettings;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Which LLM provider backs the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Groq,
    Gemini,
}

impl ProviderKind {
    fn api_key_var(&self) -> &'static str {
        match self {
            ProviderKind::Groq => "GROQ_API_KEY",
            ProviderKind::Gemini => "GEMINI_API_KEY",
        }
    }

    fn model_var(&self) -> &'static str {
        match self {
            ProviderKind::Groq => "GROQ_MODEL",
            ProviderKind::Gemini => "GEMINI_MODEL",
        }
    }

    fn base_url_var(&self) -> &'static str {
        match self {
            ProviderKind::Groq => "GROQ_BASE_URL",
            ProviderKind::Gemini => "GEMINI_BASE_URL",
        }
    }

    fn default_model(&self) -> &'static str {
        match self {
            ProviderKind::Groq => DEFAULT_GROQ_MODEL,
            ProviderKind::Gemini => DEFAULT_GEMINI_MODEL,
        }
    }

    fn default_base_url(&self) -> &'static str {
        match self {
            ProviderKind::Groq => DEFAULT_GROQ_BASE_URL,
            ProviderKind::Gemini => DEFAULT_GEMINI_BASE_URL,
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::Groq => f.write_str("groq"),
            ProviderKind::Gemini => f.write_str("gemini"),
        }
    }
}

impl FromStr for ProviderKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "groq" => Ok(ProviderKind::Groq),
            "gemini" => Ok(ProviderKind::Gemini),
            other => Err(ConfigError::Invalid {
                var: "LLM_PROVIDER",
                reason: format!("unknown provider '{}', expected groq or gemini", other),
            }),
        }
    }
}

/// Provider connection settings.
#[derive(Clone)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

// Hand-written so the API key never ends up in logs.
impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("kind", &self.kind)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub provider: ProviderConfig,
    pub generation: GenerationSettings,
    pub host: String,
    pub port: u16,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} is not set")]
    Missing { var: &'static str },
    #[error("{var} is invalid: {reason}")]
    Invalid { var: &'static str, reason: String },
}

impl AppConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let kind = match get("LLM_PROVIDER") {
            Some(raw) => raw.parse()?,
            None => ProviderKind::Groq,
        };

        let api_key = get(kind.api_key_var()).ok_or(ConfigError::Missing {
            var: kind.api_key_var(),
        })?;
        let model = get(kind.model_var()).unwrap_or_else(|| kind.default_model().to_string());
        let base_url =
            get(kind.base_url_var()).unwrap_or_else(|| kind.default_base_url().to_string());
        let timeout_secs = parse_or("LLM_TIMEOUT_SECS", get("LLM_TIMEOUT_SECS"), DEFAULT_TIMEOUT_SECS)?;

        let defaults = GenerationSettings::default();
        let generation = GenerationSettings {
            temperature: parse_or("LLM_TEMPERATURE", get("LLM_TEMPERATURE"), defaults.temperature)?,
            max_tokens: parse_or("LLM_MAX_TOKENS", get("LLM_MAX_TOKENS"), defaults.max_tokens)?,
        };

        let host = get("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = match get("PORT") {
            Some(raw) => parse_or("PORT", Some(raw), DEFAULT_PORT)?,
            None => parse_or("SERVER_PORT", get("SERVER_PORT"), DEFAULT_PORT)?,
        };

        Ok(Self {
            provider: ProviderConfig {
                kind,
                api_key,
                model,
                base_url,
                timeout: Duration::from_secs(timeout_secs),
            },
            generation,
            host,
            port,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T>(var: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match raw {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            var,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults_to_groq() {
        let config = load(&[("GROQ_API_KEY", "gsk_test")]).unwrap();

        assert_eq!(config.provider.kind, ProviderKind::Groq);
        assert_eq!(config.provider.api_key, "gsk_test");
        assert_eq!(config.provider.model, DEFAULT_GROQ_MODEL);
        assert_eq!(config.provider.base_url, DEFAULT_GROQ_BASE_URL);
        assert_eq!(config.provider.timeout, Duration::from_secs(60));
        assert_eq!(config.generation, GenerationSettings::default());
        assert_eq!(config.bind_address(), "0.0.0.0:3000");
    }

    #[test]
    fn test_missing_credential_refuses_to_load() {
        let err = load(&[]).unwrap_err();
        assert!(matches!(err, ConfigError::Missing { var: "GROQ_API_KEY" }));

        let err = load(&[("LLM_PROVIDER", "gemini"), ("GROQ_API_KEY", "gsk")]).unwrap_err();
        assert!(matches!(err, ConfigError::Missing { var: "GEMINI_API_KEY" }));

        let err = load(&[("GROQ_API_KEY", "  ")]).unwrap_err();
        assert!(matches!(err, ConfigError::Missing { .. }));
    }

    #[test]
    fn test_gemini_with_overrides() {
        let config = load(&[
            ("LLM_PROVIDER", "Gemini"),
            ("GEMINI_API_KEY", "key"),
            ("GEMINI_MODEL", "gemini-2.0-flash"),
            ("PORT", "8080"),
            ("SERVER_PORT", "9090"),
            ("LLM_TIMEOUT_SECS", "5"),
            ("LLM_TEMPERATURE", "0.2"),
        ])
        .unwrap();

        assert_eq!(config.provider.kind, ProviderKind::Gemini);
        assert_eq!(config.provider.model, "gemini-2.0-flash");
        assert_eq!(config.provider.base_url, DEFAULT_GEMINI_BASE_URL);
        assert_eq!(config.provider.timeout, Duration::from_secs(5));
        assert_eq!(config.generation.temperature, 0.2);
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_server_port_fallback() {
        let config = load(&[("GROQ_API_KEY", "k"), ("SERVER_PORT", "4000")]).unwrap();
        assert_eq!(config.port, 4000);
    }

    #[test]
    fn test_invalid_values_are_errors() {
        let err = load(&[("LLM_PROVIDER", "openai"), ("GROQ_API_KEY", "k")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "LLM_PROVIDER", .. }));

        let err = load(&[("GROQ_API_KEY", "k"), ("PORT", "http")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "PORT", .. }));
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = load(&[("GROQ_API_KEY", "gsk_secret")]).unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("gsk_secret"));
        assert!(debug.contains("<redacted>"));
    }
}
