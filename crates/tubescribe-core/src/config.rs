use crate::error::ConfigError;

pub const API_KEY_ENV: &str = "YOUTUBE_API_KEY";
pub const DATA_API_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

/// Runtime settings. Nothing here has a compiled-in credential.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub api_base_url: String,
    pub languages: Vec<String>,
    pub concurrency: usize,
}

impl Config {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_base_url: DATA_API_BASE_URL.to_string(),
            languages: vec!["en".to_string()],
            concurrency: 1,
        }
    }

    /// Read the API key from `YOUTUBE_API_KEY`
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = validate_api_key(std::env::var(API_KEY_ENV).ok())?;
        Ok(Self::new(api_key))
    }

    pub fn with_languages(mut self, languages: Vec<String>) -> Self {
        if !languages.is_empty() {
            self.languages = languages;
        }
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }
}

pub fn validate_api_key(value: Option<String>) -> Result<String, ConfigError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ConfigError::MissingApiKey {
            env_var: API_KEY_ENV.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_key_is_missing() {
        assert!(validate_api_key(None).is_err());
        assert!(validate_api_key(Some("  ".into())).is_err());
        assert_eq!(validate_api_key(Some(" abc ".into())).unwrap(), "abc");
    }

    #[test]
    fn builder_keeps_sane_defaults() {
        let config = Config::new("key")
            .with_languages(Vec::new())
            .with_concurrency(0);
        assert_eq!(config.languages, vec!["en".to_string()]);
        assert_eq!(config.concurrency, 1);
        assert_eq!(config.api_base_url, DATA_API_BASE_URL);
    }
}
