use anyhow::{bail, Context, Result};

const DEFAULT_MODEL_BASE_URL: &str = "https://api.deepseek.com/v1";
const DEFAULT_MODEL_NAME: &str = "deepseek-chat";

/// Application configuration loaded from environment variables.
/// Startup aborts if the model credential is missing or a value fails to parse.
#[derive(Debug, Clone)]
pub struct Config {
    pub model_api_key: String,
    pub model_base_url: String,
    pub model_name: String,
    pub model_temperature: f32,
    pub model_timeout_secs: u64,
    pub model_startup_probe: bool,
    pub ocr_enabled: bool,
    pub ocr_languages: String,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key: &str| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup so tests don't touch the process env.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let model_api_key = require(&lookup, "DEEPSEEK_API_KEY")?;

        let model_base_url = optional(&lookup, "MODEL_BASE_URL")
            .unwrap_or_else(|| DEFAULT_MODEL_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        if model_base_url.is_empty() {
            bail!("MODEL_BASE_URL must not be empty");
        }

        let model_temperature = optional(&lookup, "MODEL_TEMPERATURE")
            .unwrap_or_else(|| "0.7".to_string())
            .parse::<f32>()
            .context("MODEL_TEMPERATURE must be a number")?;

        let model_timeout_secs = optional(&lookup, "MODEL_TIMEOUT_SECS")
            .unwrap_or_else(|| "90".to_string())
            .parse::<u64>()
            .context("MODEL_TIMEOUT_SECS must be a whole number of seconds")?;
        if model_timeout_secs == 0 {
            bail!("MODEL_TIMEOUT_SECS must be greater than zero");
        }

        Ok(Config {
            model_api_key,
            model_base_url,
            model_name: optional(&lookup, "MODEL_NAME")
                .unwrap_or_else(|| DEFAULT_MODEL_NAME.to_string()),
            model_temperature,
            model_timeout_secs,
            model_startup_probe: parse_flag(&lookup, "MODEL_STARTUP_PROBE", true)?,
            ocr_enabled: parse_flag(&lookup, "OCR_ENABLED", true)?,
            ocr_languages: optional(&lookup, "OCR_LANGUAGES")
                .unwrap_or_else(|| "chi_sim+eng".to_string()),
            port: optional(&lookup, "PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: optional(&lookup, "RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn require<F>(lookup: &F, key: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    optional(lookup, key)
        .with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Blank values count as unset.
fn optional<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_flag<F>(lookup: &F, key: &str, default: bool) -> Result<bool>
where
    F: Fn(&str) -> Option<String>,
{
    match optional(lookup, key).map(|v| v.to_ascii_lowercase()) {
        None => Ok(default),
        Some(v) => match v.as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            other => bail!("{key} must be true or false, got '{other}'"),
        },
    }
}
