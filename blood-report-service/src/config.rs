use anyhow::{Context as _, anyhow};
use std::path::PathBuf;

pub const DEFAULT_MODEL: &str = "google/gemini-2.0-flash-001";
pub const DEFAULT_TEMPERATURE: f64 = 0.5;
pub const DEFAULT_SERPER_URL: &str = "https://google.serper.dev/search";
pub const DEFAULT_UPLOAD_DIR: &str = "data";
pub const DEFAULT_PORT: u16 = 8000;

/// Settings for the shared language model backend
#[derive(Debug, Clone)]
pub struct ModelSettings {
    pub api_key: String,
    pub model: String,
    pub temperature: f64,
    pub gcp_project_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SearchSettings {
    pub api_key: String,
    pub url: String,
}

/// Process-wide configuration, read once at startup
#[derive(Debug, Clone)]
pub struct Settings {
    pub model: ModelSettings,
    pub search: SearchSettings,
    pub upload_dir: PathBuf,
    pub port: u16,
}

impl Settings {
    /// Read settings from the environment, loading a `.env` file first if one exists.
    pub fn from_env() -> anyhow::Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &str| get(key).ok_or_else(|| anyhow!("{} environment variable is required", key));

        let temperature = match get("LLM_TEMPERATURE") {
            Some(raw) => raw
                .parse::<f64>()
                .with_context(|| format!("LLM_TEMPERATURE is not a number: {}", raw))?,
            None => DEFAULT_TEMPERATURE,
        };

        let port = match get("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .with_context(|| format!("PORT is not a valid port: {}", raw))?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            model: ModelSettings {
                api_key: require("OPENROUTER_API_KEY")?,
                model: get("LLM_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
                temperature,
                gcp_project_id: get("GCP_PROJECT_ID"),
            },
            search: SearchSettings {
                api_key: require("SERPER_API_KEY")?,
                url: get("SERPER_URL").unwrap_or_else(|| DEFAULT_SERPER_URL.to_string()),
            },
            upload_dir: PathBuf::from(
                get("UPLOAD_DIR").unwrap_or_else(|| DEFAULT_UPLOAD_DIR.to_string()),
            ),
            port,
        })
    }
}
