use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: Url,
    pub api_token: Option<String>,
    pub http_timeout: Duration,
    pub preferences_path: PathBuf,
    pub dashboard_preview: usize,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            api_base_url: parse_base_url(&get_env("ATS_API_BASE_URL")?)?,
            api_token: env::var("ATS_API_TOKEN").ok().filter(|t| !t.is_empty()),
            http_timeout: Duration::from_secs(get_env_parse_or("ATS_HTTP_TIMEOUT_SECS", 30)?),
            preferences_path: env::var("ATS_PREFERENCES_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".ats_preferences.json")),
            dashboard_preview: get_env_parse_or("ATS_DASHBOARD_PREVIEW", 5)?,
        })
    }

    /// Config pointing at `base_url` with defaults for everything else.
    pub fn for_base_url(base_url: &str) -> Result<Self> {
        Ok(Self {
            api_base_url: parse_base_url(base_url)?,
            api_token: None,
            http_timeout: Duration::from_secs(30),
            preferences_path: PathBuf::from(".ats_preferences.json"),
            dashboard_preview: 5,
        })
    }
}

/// Endpoint paths are joined onto the base, so it must end with a slash.
fn parse_base_url(raw: &str) -> Result<Url> {
    let normalized = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{}/", raw)
    };
    Url::parse(&normalized)
        .map_err(|e| Error::Config(format!("Invalid value for ATS_API_BASE_URL: {}", e)))
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        Err(_) => Ok(default),
    }
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> Result<&'static Config> {
    CONFIG
        .get()
        .ok_or_else(|| Error::Config("Configuration has not been initialized".to_string()))
}
