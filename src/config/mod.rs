//! Application configuration

pub mod prompts;

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use prompts::{PromptTemplate, RenderedPrompt};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub llm: LlmSettings,
    pub persona_file: Option<PathBuf>,
}

/// Settings for the hosted model backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    /// Backend name: "gemini" or "openai"
    pub provider: String,
    pub api_key: String,
    /// Model override; each backend has its own default
    pub model: Option<String>,
    /// Endpoint override; each backend has its own default
    pub base_url: Option<String>,
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub timeout_secs: u64,
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing {0}: set it in the environment or in .env")]
    MissingCredential(&'static str),

    #[error("Invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },

    #[error("Unknown provider: {0}")]
    UnknownProvider(String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let provider = lookup("LLM_PROVIDER")
            .map(|p| p.trim().to_lowercase())
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| "gemini".into());

        let key_var = match provider.as_str() {
            "gemini" => "GOOGLE_API_KEY",
            "openai" => "OPENAI_API_KEY",
            _ => return Err(ConfigError::UnknownProvider(provider)),
        };
        let api_key = lookup(key_var)
            .filter(|k| !k.trim().is_empty())
            .ok_or(ConfigError::MissingCredential(key_var))?;

        Ok(Self {
            host: lookup("HOST").unwrap_or_else(|| "127.0.0.1".into()),
            port: parse_or(&lookup, "PORT", 8501)?,
            llm: LlmSettings {
                provider,
                api_key,
                model: lookup("LLM_MODEL").filter(|m| !m.is_empty()),
                base_url: lookup("LLM_BASE_URL").filter(|u| !u.is_empty()),
                temperature: parse_or(&lookup, "LLM_TEMPERATURE", 0.7)?,
                max_output_tokens: parse_or(&lookup, "LLM_MAX_OUTPUT_TOKENS", 1024)?,
                timeout_secs: parse_or(&lookup, "LLM_TIMEOUT_SECS", 120)?,
            },
            persona_file: lookup("GEMI_PERSONA_FILE").map(PathBuf::from),
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_from(&[("GOOGLE_API_KEY", "g-key")])).unwrap();

        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8501);
        assert_eq!(config.llm.provider, "gemini");
        assert_eq!(config.llm.api_key, "g-key");
        assert!(config.llm.model.is_none());
        assert_eq!(config.llm.temperature, 0.7);
        assert_eq!(config.llm.max_output_tokens, 1024);
        assert_eq!(config.llm.timeout_secs, 120);
        assert!(config.persona_file.is_none());
    }

    #[test]
    fn test_missing_credential_is_fatal() {
        let err = Config::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingCredential("GOOGLE_API_KEY")));

        let err = Config::from_lookup(lookup_from(&[("GOOGLE_API_KEY", "   ")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingCredential("GOOGLE_API_KEY")));
    }

    #[test]
    fn test_openai_needs_its_own_key() {
        let err = Config::from_lookup(lookup_from(&[
            ("LLM_PROVIDER", "OpenAI"),
            ("GOOGLE_API_KEY", "g-key"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::MissingCredential("OPENAI_API_KEY")));

        let config = Config::from_lookup(lookup_from(&[
            ("LLM_PROVIDER", "openai"),
            ("OPENAI_API_KEY", "o-key"),
            ("LLM_MODEL", "gpt-4o-mini"),
        ]))
        .unwrap();
        assert_eq!(config.llm.provider, "openai");
        assert_eq!(config.llm.model.as_deref(), Some("gpt-4o-mini"));
    }

    #[test]
    fn test_invalid_values() {
        let err = Config::from_lookup(lookup_from(&[
            ("GOOGLE_API_KEY", "g-key"),
            ("PORT", "eighty"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "PORT", .. }));

        let err = Config::from_lookup(lookup_from(&[("LLM_PROVIDER", "palm")])).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownProvider(name) if name == "palm"));
    }
}
