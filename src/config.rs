//! Configuration management for the RFP aligner

use crate::error::{Result, RfpAlignerError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub ingestion: IngestionConfig,
    pub storage: StorageConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Endpoint of the AI extraction service
    pub endpoint: String,
    /// Name of the environment variable holding the bearer token, if any
    pub api_key_env: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestionConfig {
    pub min_text_chars: usize,
    pub enable_caching: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub records_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub detailed: bool,
    pub color_output: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OutputFormat {
    Console,
    Json,
    Markdown,
    Html,
}

impl Default for Config {
    fn default() -> Self {
        let records_dir = dirs::data_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("rfp-aligner")
            .join("records");

        Self {
            service: ServiceConfig {
                endpoint: "http://localhost:8787/rfp/analyze".to_string(),
                api_key_env: Some("RFP_ALIGNER_API_KEY".to_string()),
                timeout_secs: 120,
            },
            ingestion: IngestionConfig {
                min_text_chars: 50,
                enable_caching: true,
            },
            storage: StorageConfig { records_dir },
            output: OutputConfig {
                format: OutputFormat::Console,
                detailed: false,
                color_output: true,
            },
        }
    }
}

impl Config {
    /// Load from `config_path`, writing defaults there on first run
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = toml::from_str(&content).map_err(|e| {
                RfpAlignerError::Configuration(format!("Failed to parse config: {}", e))
            })?;
            config.validate()?;
            Ok(config)
        } else {
            let config = Self::default();
            config.save_to(config_path)?;
            Ok(config)
        }
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| {
            RfpAlignerError::Configuration(format!("Failed to serialize config: {}", e))
        })?;

        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("rfp-aligner")
            .join("config.toml")
    }

    fn validate(&self) -> Result<()> {
        if self.service.endpoint.trim().is_empty() {
            return Err(RfpAlignerError::Configuration(
                "service.endpoint must not be empty".to_string(),
            ));
        }
        if self.service.timeout_secs == 0 {
            return Err(RfpAlignerError::Configuration(
                "service.timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Bearer token for the extraction service, read from the configured env var
    pub fn api_key(&self) -> Option<String> {
        self.service
            .api_key_env
            .as_deref()
            .and_then(|name| std::env::var(name).ok())
            .filter(|key| !key.trim().is_empty())
    }

    pub fn records_dir(&self) -> &PathBuf {
        &self.storage.records_dir
    }
}
