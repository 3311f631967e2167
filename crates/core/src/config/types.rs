use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

use crate::engine::EngineConfig;
use crate::reaper::ReaperConfig;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub engine: EngineConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    8080
}

/// Download directory and session lifetime
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,
    /// Session time-to-live in seconds
    #[serde(default = "default_ttl")]
    pub ttl_secs: u64,
    /// Reaper wake-up interval in seconds
    #[serde(default = "default_reap_interval")]
    pub reap_interval_secs: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            download_dir: default_download_dir(),
            ttl_secs: default_ttl(),
            reap_interval_secs: default_reap_interval(),
        }
    }
}

impl StorageConfig {
    pub fn reaper(&self) -> ReaperConfig {
        ReaperConfig::default()
            .with_ttl_secs(self.ttl_secs)
            .with_interval_secs(self.reap_interval_secs)
    }
}

fn default_download_dir() -> PathBuf {
    PathBuf::from("downloads")
}

fn default_ttl() -> u64 {
    1800 // 30 minutes
}

fn default_reap_interval() -> u64 {
    60
}

/// Sanitized config for API responses (engine arguments hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub engine: SanitizedEngineConfig,
}

/// Sanitized engine config
///
/// Extra arguments can carry cookies or credentials, so only their count
/// is exposed.
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedEngineConfig {
    pub ytdlp_path: PathBuf,
    pub merge_output_format: String,
    pub catalogue_timeout_secs: u64,
    pub download_timeout_secs: u64,
    pub extra_args_count: usize,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            storage: config.storage.clone(),
            engine: SanitizedEngineConfig {
                ytdlp_path: config.engine.ytdlp_path.clone(),
                merge_output_format: config.engine.merge_output_format.clone(),
                catalogue_timeout_secs: config.engine.catalogue_timeout_secs,
                download_timeout_secs: config.engine.download_timeout_secs,
                extra_args_count: config.engine.extra_args.len(),
            },
        }
    }
}
