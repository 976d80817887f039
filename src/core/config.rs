use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::debug;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ServerConfig {
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind_addr: "127.0.0.1:3000".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct PrimaryProviderConfig {
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    /// Number of past UTC days to request history for, starting yesterday.
    #[serde(default = "default_history_days")]
    pub history_days: u32,
}

fn default_history_days() -> u32 {
    4
}

/// Each history day costs one upstream request.
pub const MAX_HISTORY_DAYS: u32 = 7;

/// Length of history requested from the spot rate service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HistoryPeriod {
    #[serde(rename = "day")]
    Day,
    #[serde(rename = "month")]
    Month,
    #[serde(rename = "6months")]
    HalfYear,
    #[default]
    #[serde(rename = "year")]
    Year,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SecondaryProviderConfig {
    pub url: String,
    #[serde(default)]
    pub period: HistoryPeriod,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ProvidersConfig {
    pub primary: Option<PrimaryProviderConfig>,
    pub secondary: Option<SecondaryProviderConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            primary: Some(PrimaryProviderConfig {
                base_url: "https://api.freecurrencyapi.com/v1".to_string(),
                api_key: String::new(),
                history_days: default_history_days(),
            }),
            secondary: Some(SecondaryProviderConfig {
                url: "https://www.xe.com/api/protected/charting-rates".to_string(),
                period: HistoryPeriod::default(),
            }),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
    /// Serve the embedded sample payload instead of calling any provider.
    #[serde(default)]
    pub mock_mode: bool,
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub cache_ttl_secs: Option<u64>,
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            server: ServerConfig::default(),
            providers: ProvidersConfig::default(),
            mock_mode: false,
            request_timeout_secs: default_timeout_secs(),
            cache_ttl_secs: None,
        }
    }
}

impl AppConfig {
    /// Loads the config from the default location, falling back to defaults
    /// when no file exists yet.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!("No config at {}, using defaults", config_path.display());
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("io", "fxconv", "fxconv")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        config.validate()?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    /// Applies `FXCONV_*` overrides from the process environment.
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides from an arbitrary lookup so tests need not touch the
    /// process environment.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup("FXCONV_BIND_ADDR") {
            self.server.bind_addr = addr;
        }

        if let Some(url) = lookup("FXCONV_PRIMARY_URL") {
            let primary = self.primary_or_default();
            primary.base_url = url;
        }
        if let Some(key) = lookup("FXCONV_PRIMARY_API_KEY") {
            let primary = self.primary_or_default();
            primary.api_key = key;
        }
        if let Some(url) = lookup("FXCONV_SECONDARY_URL") {
            let period = self
                .providers
                .secondary
                .as_ref()
                .map_or(HistoryPeriod::default(), |s| s.period);
            self.providers.secondary = Some(SecondaryProviderConfig { url, period });
        }

        if let Some(flag) = lookup("FXCONV_MOCK_MODE") {
            self.mock_mode = matches!(
                flag.trim().to_lowercase().as_str(),
                "1" | "true" | "yes" | "development"
            );
        }
        if let Some(secs) = lookup("FXCONV_TIMEOUT_SECS") {
            self.request_timeout_secs = secs
                .trim()
                .parse()
                .with_context(|| format!("Invalid FXCONV_TIMEOUT_SECS: {secs}"))?;
        }
        if let Some(secs) = lookup("FXCONV_CACHE_TTL_SECS") {
            let ttl: u64 = secs
                .trim()
                .parse()
                .with_context(|| format!("Invalid FXCONV_CACHE_TTL_SECS: {secs}"))?;
            self.cache_ttl_secs = (ttl > 0).then_some(ttl);
        }

        self.validate()?;
        Ok(self)
    }

    /// Rejects values that would make the providers misbehave.
    pub fn validate(&self) -> Result<()> {
        if let Some(primary) = &self.providers.primary {
            if primary.history_days > MAX_HISTORY_DAYS {
                anyhow::bail!(
                    "history_days must be at most {MAX_HISTORY_DAYS}, got {}",
                    primary.history_days
                );
            }
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn cache_ttl(&self) -> Option<Duration> {
        self.cache_ttl_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    fn primary_or_default(&mut self) -> &mut PrimaryProviderConfig {
        self.providers
            .primary
            .get_or_insert_with(|| PrimaryProviderConfig {
                base_url: String::new(),
                api_key: String::new(),
                history_days: default_history_days(),
            })
    }
}
