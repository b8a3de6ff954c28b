use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::debug;

pub const DEFAULT_CONFIG: &str = r#"---
# Preferred base currency until changed with `fxcache base <CODE>`
currency: "USD"

providers:
  rates:
    base_url: "https://open.er-api.com/v6/latest"
  trend:
    base_url: "https://api.frankfurter.app"
  news:
    base_url: "https://api.rss2json.com/v1/api.json"

cache:
  rates_ttl_secs: 60
  trend_ttl_secs: 600
  news_ttl_secs: 900
  persist: true
"#;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct EndpointConfig {
    pub base_url: String,
}

impl EndpointConfig {
    fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
        }
    }
}

fn default_rates_endpoint() -> EndpointConfig {
    EndpointConfig::new("https://open.er-api.com/v6/latest")
}

fn default_trend_endpoint() -> EndpointConfig {
    EndpointConfig::new("https://api.frankfurter.app")
}

fn default_news_endpoint() -> EndpointConfig {
    EndpointConfig::new("https://api.rss2json.com/v1/api.json")
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    #[serde(default = "default_rates_endpoint")]
    pub rates: EndpointConfig,
    #[serde(default = "default_trend_endpoint")]
    pub trend: EndpointConfig,
    #[serde(default = "default_news_endpoint")]
    pub news: EndpointConfig,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            rates: default_rates_endpoint(),
            trend: default_trend_endpoint(),
            news: default_news_endpoint(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct CacheConfig {
    pub rates_ttl_secs: u64,
    pub trend_ttl_secs: u64,
    pub news_ttl_secs: u64,
    pub persist: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            rates_ttl_secs: 60,
            trend_ttl_secs: 10 * 60,
            news_ttl_secs: 15 * 60,
            persist: true,
        }
    }
}

impl CacheConfig {
    pub fn rates_ttl(&self) -> Duration {
        Duration::from_secs(self.rates_ttl_secs)
    }

    pub fn trend_ttl(&self) -> Duration {
        Duration::from_secs(self.trend_ttl_secs)
    }

    pub fn news_ttl(&self) -> Duration {
        Duration::from_secs(self.news_ttl_secs)
    }
}

fn default_currency() -> String {
    super::currency::DEFAULT_BASE_CURRENCY.to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    pub data_path: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            currency: default_currency(),
            providers: ProvidersConfig::default(),
            cache: CacheConfig::default(),
            data_path: None,
        }
    }
}

impl AppConfig {
    /// Loads the config from the default location, or built-in defaults if
    /// no file exists there yet.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!(
                "No config at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("dev", "fxcache", "fxcache")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("dev", "fxcache", "fxcache")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}
