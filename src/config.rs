//! Segmenter configuration

use serde::{Deserialize, Serialize};

use crate::error::{Result, SegmenterError};

/// Segment configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmenterConfig {
    /// Target segment duration in seconds
    pub segment_duration_secs: f64,

    /// Number given to the first dispatched segment
    pub start_segment_number: u64,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            segment_duration_secs: 6.0,
            start_segment_number: 0,
        }
    }
}

impl SegmenterConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.segment_duration_secs.is_finite() || self.segment_duration_secs <= 0.0 {
            return Err(SegmenterError::Config(format!(
                "segment duration must be a positive number of seconds, got {}",
                self.segment_duration_secs
            )));
        }
        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Output format (pretty, json)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl LoggingConfig {
    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }

    pub fn validate(&self) -> Result<()> {
        match self.format.to_ascii_lowercase().as_str() {
            "pretty" | "json" => Ok(()),
            other => Err(SegmenterError::Config(format!(
                "unknown log format {:?} (expected pretty or json)",
                other
            ))),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Segment configuration
    pub segment: SegmenterConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<()> {
        self.segment.validate()?;
        self.logging.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.segment.segment_duration_secs, 6.0);
        assert_eq!(config.segment.start_segment_number, 0);
        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.is_json());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_duration() {
        for secs in [0.0, -4.0, f64::NAN, f64::INFINITY] {
            let config = SegmenterConfig {
                segment_duration_secs: secs,
                ..Default::default()
            };
            assert!(config.validate().is_err(), "accepted {}", secs);
        }
    }

    #[test]
    fn test_validate_rejects_bad_format() {
        let logging = LoggingConfig {
            format: "xml".to_string(),
            ..Default::default()
        };
        assert!(logging.validate().is_err());

        let logging = LoggingConfig {
            format: "JSON".to_string(),
            ..Default::default()
        };
        assert!(logging.validate().is_ok());
        assert!(logging.is_json());
    }
}
