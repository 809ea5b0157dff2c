use std::env;

use crate::completion::CompletionConfig;
use crate::generator::{GenerationPolicy, DEFAULT_MAX_RETRIES};

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
const DEFAULT_TIMEOUT_MS: u64 = 60_000;

/// Process configuration, read from the environment.
#[derive(Clone, PartialEq)]
pub struct AppConfig {
    pub port: u16,
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout_ms: u64,
    pub max_retries: u32,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source. Unset or
    /// unparseable numbers fall back to their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let port = lookup("PORT")
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        let api_key = lookup("OPENAI_API_KEY").unwrap_or_default();

        let base_url = lookup("OPENAI_BASE_URL")
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let model = lookup("OPENAI_MODEL")
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let timeout_ms = lookup("OPENAI_TIMEOUT_MS")
            .and_then(|value| value.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_MS);

        let max_retries = lookup("FLASHCARD_MAX_RETRIES")
            .and_then(|value| value.parse::<u32>().ok())
            .unwrap_or(DEFAULT_MAX_RETRIES);

        Self {
            port,
            api_key,
            base_url,
            model,
            timeout_ms,
            max_retries,
        }
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    pub fn completion_config(&self) -> CompletionConfig {
        CompletionConfig::new(
            self.api_key.clone(),
            self.base_url.clone(),
            self.model.clone(),
            self.timeout_ms,
        )
    }

    pub fn generation_policy(&self) -> GenerationPolicy {
        GenerationPolicy {
            max_retries: self.max_retries,
            ..GenerationPolicy::default()
        }
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("port", &self.port)
            .field("api_key_set", &self.has_api_key())
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout_ms", &self.timeout_ms)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> AppConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = config_from(&[]);
        assert_eq!(config.port, 5000);
        assert_eq!(config.base_url, "https://api.openai.com/v1");
        assert_eq!(config.model, "gpt-3.5-turbo");
        assert_eq!(config.timeout_ms, 60_000);
        assert_eq!(config.max_retries, 1);
        assert!(!config.has_api_key());
    }

    #[test]
    fn values_are_read_from_lookup() {
        let config = config_from(&[
            ("PORT", "8080"),
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_BASE_URL", "http://localhost:9000/v1"),
            ("OPENAI_MODEL", "gpt-4o"),
            ("OPENAI_TIMEOUT_MS", "1500"),
            ("FLASHCARD_MAX_RETRIES", "3"),
        ]);
        assert_eq!(config.port, 8080);
        assert!(config.has_api_key());
        assert_eq!(config.base_url, "http://localhost:9000/v1");
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.timeout_ms, 1500);
        assert_eq!(config.generation_policy().max_attempts(), 4);
        assert_eq!(config.completion_config().model(), "gpt-4o");
    }

    #[test]
    fn unparseable_numbers_fall_back_to_defaults() {
        let config = config_from(&[
            ("PORT", "not-a-port"),
            ("OPENAI_TIMEOUT_MS", "-5"),
            ("FLASHCARD_MAX_RETRIES", "many"),
        ]);
        assert_eq!(config.port, 5000);
        assert_eq!(config.timeout_ms, 60_000);
        assert_eq!(config.max_retries, 1);
    }

    #[test]
    fn blank_api_key_counts_as_missing() {
        assert!(!config_from(&[("OPENAI_API_KEY", "   ")]).has_api_key());
    }

    #[test]
    fn debug_output_hides_api_key() {
        let config = config_from(&[("OPENAI_API_KEY", "sk-secret")]);
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("api_key_set: true"));
    }
}
