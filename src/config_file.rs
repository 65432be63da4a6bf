//! Configuration file support
//!
//! Loads segmenter configuration from TOML files.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::config::{AppConfig, LoggingConfig, SegmenterConfig};
use crate::error::{Result, SegmenterError};

/// Configuration file format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Segment settings
    pub segment: SegmentSettings,
    /// Logging settings
    pub logging: Option<LoggingSettings>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentSettings {
    /// Target segment duration in seconds
    pub duration_secs: f64,
    /// Number of the first segment
    pub start_segment_number: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Output format (json, pretty)
    pub format: Option<String>,
}

impl ConfigFile {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| SegmenterError::Config(e.to_string()))
    }

    /// Save configuration to a TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| SegmenterError::Config(e.to_string()))?;
        std::fs::write(path.as_ref(), content)?;
        Ok(())
    }

    /// Generate default configuration file
    pub fn default_config() -> Self {
        Self {
            segment: SegmentSettings {
                duration_secs: 6.0,
                start_segment_number: Some(0),
            },
            logging: Some(LoggingSettings {
                level: "info".to_string(),
                format: Some("pretty".to_string()),
            }),
        }
    }

    /// Convert to AppConfig
    pub fn into_app_config(self) -> AppConfig {
        let defaults = LoggingConfig::default();
        AppConfig {
            segment: SegmenterConfig {
                segment_duration_secs: self.segment.duration_secs,
                start_segment_number: self.segment.start_segment_number.unwrap_or(0),
            },
            logging: match self.logging {
                Some(l) => LoggingConfig {
                    level: l.level,
                    format: l.format.unwrap_or(defaults.format),
                },
                None => defaults,
            },
        }
    }
}

/// Generate default configuration file at the specified path
pub fn generate_default_config<P: AsRef<Path>>(path: P) -> Result<()> {
    let config = ConfigFile::default_config();
    config.to_file(path)?;
    Ok(())
}
