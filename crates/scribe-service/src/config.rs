use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} environment variable must be set")]
    Missing(&'static str),
    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct OpenAiSettings {
    pub api_key: String,
    pub base_url: Url,
    pub model: String,
    pub image_model: String,
}

#[derive(Debug, Clone)]
pub struct NewsApiSettings {
    pub api_key: String,
    pub base_url: Url,
}

#[derive(Debug, Clone)]
pub struct HuggingFaceSettings {
    pub api_key: String,
    pub base_url: Url,
    pub model: String,
}

/// Runtime configuration, read from the process environment
#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub bind_address: String,
    pub site_base_url: Url,
    pub request_timeout: Duration,
    pub openai: OpenAiSettings,
    pub news_api: NewsApiSettings,
    pub hugging_face: HuggingFaceSettings,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(std::env::vars().collect())
    }

    /// Build settings from an explicit variable map; unset optional values fall back to defaults
    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self, ConfigError> {
        let lookup = |name: &str| vars.get(name).filter(|v| !v.trim().is_empty()).cloned();
        let required = |name: &'static str| lookup(name).ok_or(ConfigError::Missing(name));
        let or_default = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());

        let timeout_secs = or_default("REQUEST_TIMEOUT_SECS", "120");
        let timeout_secs: u64 = timeout_secs.parse().map_err(|_| ConfigError::Invalid {
            name: "REQUEST_TIMEOUT_SECS",
            value: timeout_secs.clone(),
        })?;

        Ok(Settings {
            database_url: required("DATABASE_URL")?,
            bind_address: or_default("BIND_ADDRESS", "0.0.0.0:3000"),
            site_base_url: parse_url(
                "SITE_BASE_URL",
                &or_default("SITE_BASE_URL", "https://yourdomain.com"),
            )?,
            request_timeout: Duration::from_secs(timeout_secs),
            openai: OpenAiSettings {
                api_key: required("OPENAI_API_KEY")?,
                base_url: parse_url(
                    "OPENAI_BASE_URL",
                    &or_default("OPENAI_BASE_URL", "https://api.openai.com/v1"),
                )?,
                model: or_default("OPENAI_MODEL", "gpt-4o-mini"),
                image_model: or_default("OPENAI_IMAGE_MODEL", "dall-e-3"),
            },
            news_api: NewsApiSettings {
                api_key: or_default("NEWS_API_KEY", ""),
                base_url: parse_url(
                    "NEWS_API_BASE_URL",
                    &or_default("NEWS_API_BASE_URL", "https://newsapi.org/v2"),
                )?,
            },
            hugging_face: HuggingFaceSettings {
                api_key: or_default("HF_API_KEY", ""),
                base_url: parse_url(
                    "HF_API_BASE_URL",
                    &or_default("HF_API_BASE_URL", "https://api-inference.huggingface.co/models"),
                )?,
                model: or_default("HF_SUMMARY_MODEL", "facebook/bart-large-cnn"),
            },
        })
    }

    /// Public URL of an article page
    pub fn article_url(&self, slug: &str) -> String {
        format!(
            "{}/articles/{slug}",
            self.site_base_url.as_str().trim_end_matches('/')
        )
    }
}

fn parse_url(name: &'static str, value: &str) -> Result<Url, ConfigError> {
    Url::parse(value).map_err(|_| ConfigError::Invalid {
        name,
        value: value.to_string(),
    })
}
