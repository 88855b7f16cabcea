use anyhow::{Context, Result, anyhow, bail, ensure};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf, time::Duration};

pub const DEFAULT_UPSTREAM_URL: &str = "https://archive-api.open-meteo.com/v1/archive";
pub const DEFAULT_BUCKET: &str = "weather-data-bucket";

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Number of actix workers; the runtime default when absent.
    pub workers: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "0.0.0.0".to_string(), port: 8000, workers: None }
    }
}

impl ServerConfig {
    pub fn listener_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Where historical weather is fetched from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct UpstreamConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self { base_url: DEFAULT_UPSTREAM_URL.to_string(), timeout_secs: 30 }
    }
}

impl UpstreamConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Google Cloud Storage bucket.
    #[default]
    Gcs,
    /// In-process store, lost on restart.
    Mock,
}

impl StorageBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageBackend::Gcs => "gcs",
            StorageBackend::Mock => "mock",
        }
    }
}

impl std::fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub bucket: String,
    /// Service account key file; application default credentials when absent.
    pub service_account_path: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            bucket: DEFAULT_BUCKET.to_string(),
            service_account_path: None,
        }
    }
}

/// Top-level configuration, built once at startup and handed to each component.
///
/// Example TOML:
/// ```toml
/// [server]
/// port = 8000
///
/// [upstream]
/// timeout_secs = 30
///
/// [storage]
/// backend = "mock"
/// bucket = "weather-data-bucket"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    pub storage: StorageConfig,
}

impl Config {
    /// Load config from `path` (or the platform default), returning defaults
    /// when the file does not exist yet.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_file_path()?,
        };

        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to `path`, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-data", "weather-server")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Apply the deployment environment variables on top of the file values.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    /// Same as [`Config::apply_env`] with an explicit variable lookup.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("PORT") {
            self.server.port =
                port.parse().with_context(|| format!("PORT must be a port number, got {port:?}"))?;
        }
        if let Some(bucket) = lookup("GCS_BUCKET_NAME") {
            self.storage.bucket = bucket;
        }
        if let Some(url) = lookup("WEATHER_UPSTREAM_URL") {
            self.upstream.base_url = url;
        }
        if let Some(secs) = lookup("WEATHER_UPSTREAM_TIMEOUT_SECS") {
            self.upstream.timeout_secs = secs.parse().with_context(|| {
                format!("WEATHER_UPSTREAM_TIMEOUT_SECS must be whole seconds, got {secs:?}")
            })?;
        }

        let flag = |name: &str| lookup(name).is_some_and(|v| v.eq_ignore_ascii_case("true"));
        if flag("DEVELOPMENT_MODE") || flag("MOCK_GCS") {
            self.storage.backend = StorageBackend::Mock;
        }

        Ok(())
    }

    /// Reject settings no component can work with.
    pub fn validate(&self) -> Result<()> {
        ensure!(self.upstream.timeout_secs > 0, "upstream.timeout_secs must be greater than 0");
        ensure!(!self.upstream.base_url.trim().is_empty(), "upstream.base_url must not be empty");
        if self.storage.backend == StorageBackend::Gcs && self.storage.bucket.trim().is_empty() {
            bail!("storage.bucket must not be empty when using the gcs backend");
        }
        if self.server.workers == Some(0) {
            bail!("server.workers must be greater than 0 when set");
        }
        Ok(())
    }
}
