//! Display configuration.
//!
//! The display runs in exactly one fixed timezone; every instant the engine
//! compares is taken in that zone, so the calendar-day boundary never drifts
//! with UTC offsets. The zone is configuration, not a process global.
//!
//! # Example config (YAML)
//!
//! ```yaml
//! timezone: "Asia/Jakarta"
//! poll_seconds: 30
//! ```

use std::path::Path;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Deserialize;

use crate::error::Error;
use crate::{DEFAULT_POLL_SECONDS, DEFAULT_TIMEZONE};

/// Server-side display configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DisplayConfig {
    /// IANA timezone the display lives in (e.g. "Asia/Jakarta")
    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// How often display clients should poll, in seconds
    #[serde(default = "default_poll_seconds")]
    pub poll_seconds: u32,
}

fn default_timezone() -> String {
    DEFAULT_TIMEZONE.to_string()
}

fn default_poll_seconds() -> u32 {
    DEFAULT_POLL_SECONDS
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            poll_seconds: default_poll_seconds(),
        }
    }
}

impl DisplayConfig {
    /// Load configuration from a YAML file.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let config = DisplayConfig::load("config/display.yaml")?;
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::Config(format!(
                "Failed to read config file '{}': {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, Error> {
        let config: Self =
            serde_yaml::from_str(yaml).map_err(|e| Error::Config(format!("Invalid config YAML: {}", e)))?;

        if config.timezone.parse::<Tz>().is_err() {
            return Err(Error::Config(format!(
                "Unknown timezone '{}'",
                config.timezone
            )));
        }
        Ok(config)
    }

    /// The configured timezone.
    ///
    /// Falls back to Asia/Jakarta (with a warning) if the configured name is
    /// unknown, so a hand-edited config cannot take the display down.
    pub fn tz(&self) -> Tz {
        self.timezone.parse().unwrap_or_else(|_| {
            tracing::warn!("Unknown timezone '{}', using {}", self.timezone, DEFAULT_TIMEZONE);
            chrono_tz::Asia::Jakarta
        })
    }

    /// The current instant in the display's timezone.
    pub fn now(&self) -> DateTime<Tz> {
        Utc::now().with_timezone(&self.tz())
    }
}
