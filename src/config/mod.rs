use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::extractors::VideoIdMode;
use crate::TranscriptorError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP listener settings
    pub server: ServerConfig,

    /// Transcript acquisition settings
    pub transcript: TranscriptConfig,

    /// In-memory cache settings
    pub cache: CacheConfig,

    /// Log output settings
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind
    pub host: String,

    /// Port to listen on
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptConfig {
    /// Language preference handed to the primary source, first match wins
    pub languages: Vec<String>,

    /// Keep inline formatting tags in primary transcripts
    pub preserve_formatting: bool,

    /// Upper bound on a primary source call
    pub primary_timeout_secs: u64,

    /// Timed-text endpoint used by the fallback source
    pub fallback_url: String,

    /// Language requested from the timed-text endpoint
    pub fallback_lang: String,

    /// Upper bound on the fallback request
    pub fallback_timeout_secs: u64,

    /// How video ids are pulled out of request URLs
    pub video_id_mode: VideoIdMode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Lifetime of a cached transcript
    pub ttl_hours: i64,

    /// Run a periodic sweep of expired entries (disabled when unset)
    pub sweep_interval_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Emit JSON log lines instead of human-readable ones
    pub json: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 9199,
        }
    }
}

impl Default for TranscriptConfig {
    fn default() -> Self {
        Self {
            languages: vec!["pt".to_string(), "pt-BR".to_string(), "en".to_string()],
            preserve_formatting: true,
            primary_timeout_secs: 30,
            fallback_url: "https://video.google.com/timedtext".to_string(),
            fallback_lang: "pt".to_string(),
            fallback_timeout_secs: 10,
            video_id_mode: VideoIdMode::Permissive,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_hours: crate::transcribe::cache::DEFAULT_TTL_HOURS,
            sweep_interval_secs: None,
        }
    }
}

impl Config {
    /// Load configuration from an explicit path, the usual locations, or defaults
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match Self::locate(explicit)? {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// The file `load` would read, or `None` when defaults apply
    pub fn locate(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            return Ok(Some(path.to_path_buf()));
        }

        let config_path = Self::config_path()?;
        Ok(config_path.exists().then_some(config_path))
    }

    /// Read and validate a YAML config file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs_err::read_to_string(path)
            .context("Failed to read config file")?;

        let config: Config = serde_yaml::from_str(&content)
            .context("Failed to parse config file")?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to the default location, returning where it went
    pub fn save(&self) -> Result<PathBuf> {
        let config_path = Self::config_path()?;
        self.save_to(&config_path)?;
        Ok(config_path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs_err::create_dir_all(parent)?;
            }
        }

        let content = serde_yaml::to_string(self)
            .context("Failed to serialize config")?;

        fs_err::write(path, content)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Get configuration file path
    pub fn config_path() -> Result<PathBuf> {
        // First try current directory for easy testing
        let local_config = PathBuf::from("config.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?;

        Ok(config_dir.join("transcript-service").join("config.yaml"))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: &str| TranscriptorError::InvalidConfig(msg.to_string());

        if self.server.port == 0 {
            return Err(invalid("server.port must be non-zero").into());
        }
        if self.transcript.languages.is_empty() {
            return Err(invalid("transcript.languages must list at least one language").into());
        }
        if self.transcript.primary_timeout_secs == 0 || self.transcript.fallback_timeout_secs == 0 {
            return Err(invalid("transcript timeouts must be at least one second").into());
        }
        url::Url::parse(&self.transcript.fallback_url)
            .map_err(|_| invalid("transcript.fallback_url is not a valid URL"))?;
        if self.cache.ttl_hours <= 0 {
            return Err(invalid("cache.ttl_hours must be positive").into());
        }
        if self.cache_ttl().is_none() {
            return Err(invalid("cache.ttl_hours is too large").into());
        }
        if self.cache.sweep_interval_secs == Some(0) {
            return Err(invalid("cache.sweep_interval_secs must be positive when set").into());
        }

        Ok(())
    }

    /// Display current configuration
    pub fn display(&self) {
        println!("Current Configuration:");
        println!("  Listen: {}:{}", self.server.host, self.server.port);
        println!("  Languages: {}", self.transcript.languages.join(", "));
        println!("  Primary Timeout: {}s", self.transcript.primary_timeout_secs);
        println!(
            "  Fallback: {} (lang={}, timeout {}s)",
            self.transcript.fallback_url,
            self.transcript.fallback_lang,
            self.transcript.fallback_timeout_secs
        );
        println!("  Video Id Mode: {}", self.transcript.video_id_mode);
        println!("  Cache TTL: {}h", self.cache.ttl_hours);
        if let Some(interval) = self.cache.sweep_interval_secs {
            println!("  Cache Sweep: every {}s", interval);
        }
        println!("  JSON Logs: {}", self.logging.json);
    }

    /// Cache lifetime, or `None` when `ttl_hours` does not fit a duration
    pub fn cache_ttl(&self) -> Option<chrono::Duration> {
        chrono::Duration::try_hours(self.cache.ttl_hours)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
