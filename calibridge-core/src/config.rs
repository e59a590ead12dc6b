//! Global calibridge configuration.

use std::path::{Path, PathBuf};

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{CalibridgeError, CalibridgeResult};
use crate::event::DEFAULT_TIMEZONE;
use crate::ics::DEFAULT_EXPORT_NAME;

static DEFAULT_DATA_FILE: &str = "~/.local/share/calibridge/events.json";

fn default_data_file() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_FILE)
}

fn default_timezone() -> String {
    DEFAULT_TIMEZONE.to_string()
}

fn default_export_name() -> String {
    DEFAULT_EXPORT_NAME.to_string()
}

/// Configuration at ~/.config/calibridge/config.toml
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CalibridgeConfig {
    /// Where events are stored (supports ~)
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,

    /// Zone for new events and for imported events without a TZID
    #[serde(default = "default_timezone")]
    pub default_timezone: String,

    /// Base name for exported files
    #[serde(default = "default_export_name")]
    pub export_name: String,

    /// Zone that UTC times are converted into on import (system zone if unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_timezone: Option<String>,
}

impl Default for CalibridgeConfig {
    fn default() -> Self {
        CalibridgeConfig {
            data_file: default_data_file(),
            default_timezone: default_timezone(),
            export_name: default_export_name(),
            local_timezone: None,
        }
    }
}

impl CalibridgeConfig {
    pub fn config_path() -> CalibridgeResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| CalibridgeError::Config("Could not determine config directory".into()))?
            .join("calibridge");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from the default config path, falling back to defaults.
    pub fn load() -> CalibridgeResult<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> CalibridgeResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| CalibridgeError::Config(format!("Could not read config file: {e}")))?;

        toml::from_str(&content)
            .map_err(|e| CalibridgeError::Config(format!("{}: {e}", path.display())))
    }

    /// The data file with ~ and environment variables expanded.
    pub fn data_path(&self) -> CalibridgeResult<PathBuf> {
        let raw = self.data_file.to_string_lossy();
        let expanded = shellexpand::full(&raw)
            .map_err(|e| CalibridgeError::Config(format!("Invalid data_file: {e}")))?;

        Ok(PathBuf::from(expanded.as_ref()))
    }

    /// Zone that imported UTC times are shown in.
    ///
    /// Order: `local_timezone` from the config, then the system zone, then UTC.
    pub fn local_tz(&self) -> CalibridgeResult<Tz> {
        if let Some(name) = &self.local_timezone {
            return name
                .parse()
                .map_err(|_| CalibridgeError::InvalidTimezone(name.clone()));
        }

        match iana_time_zone::get_timezone() {
            Ok(name) => Ok(name.parse().unwrap_or_else(|_| {
                warn!(zone = %name, "Unknown system timezone, using UTC");
                Tz::UTC
            })),
            Err(e) => {
                warn!(error = %e, "Could not determine system timezone, using UTC");
                Ok(Tz::UTC)
            }
        }
    }

    /// Create a config file with all options commented out.
    pub fn create_default_config(path: &Path) -> CalibridgeResult<()> {
        let contents = format!(
            "\
# calibridge configuration

# Where events are stored:
# data_file = \"{DEFAULT_DATA_FILE}\"

# Timezone for new events and for imported events without one:
# default_timezone = \"{DEFAULT_TIMEZONE}\"

# Default file name for exports:
# export_name = \"{DEFAULT_EXPORT_NAME}\"

# Timezone UTC times are converted into on import (defaults to the system timezone):
# local_timezone = \"Europe/Berlin\"
"
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                CalibridgeError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| CalibridgeError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}
