//! Application configuration
//!
//! Loaded from TOML (default `~/.config/ev-rental/config.toml`). Every
//! section falls back to its defaults when omitted.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::application::rental::RentalChannel;
use crate::domain::permission::VERIFIED_USER;
use crate::domain::station::StationId;
use crate::domain::vehicle::{VariantField, VehicleId};
use crate::support::errors::{ConfigError, DomainError, DomainResult};

/// Default location of the configuration file
pub fn default_config_path() -> PathBuf {
    dirs_next::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ev-rental")
        .join("config.toml")
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub rental: RentalConfig,
    pub notifications: NotificationsConfig,
    pub stations: Vec<StationConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// trace, debug, info, warn, error (or any `EnvFilter` directive)
    pub level: String,
    /// `text` or `json`
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RentalConfig {
    pub required_capability: String,
    /// Upper bound on waiting for a station's inventory lock
    pub lock_timeout_ms: u64,
    pub channel: RentalChannel,
}

impl Default for RentalConfig {
    fn default() -> Self {
        Self {
            required_capability: VERIFIED_USER.to_string(),
            lock_timeout_ms: 500,
            channel: RentalChannel::Online,
        }
    }
}

impl RentalConfig {
    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationsConfig {
    pub channel_capacity: usize,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 1024,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationConfig {
    pub id: StationId,
    pub capacity: usize,
    pub location: String,
    #[serde(default)]
    pub vehicles: Vec<VehicleConfig>,
}

/// Seed vehicle. Exactly one variant field must be set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleConfig {
    /// Factory name: `city`, `suv`, `luxury`
    pub kind: String,
    /// Allocated by the fleet when omitted
    #[serde(default)]
    pub id: Option<VehicleId>,
    pub model: String,
    pub battery_level: u8,
    pub hourly_rate: u32,
    #[serde(default = "default_true")]
    pub available: bool,
    #[serde(default)]
    pub max_speed: Option<u32>,
    #[serde(default)]
    pub towing_capacity: Option<u32>,
    #[serde(default)]
    pub premium_features: Option<Vec<String>>,
}

fn default_true() -> bool {
    true
}

impl VehicleConfig {
    pub fn variant_field(&self) -> DomainResult<VariantField> {
        match (&self.max_speed, &self.towing_capacity, &self.premium_features) {
            (Some(speed), None, None) => Ok(VariantField::MaxSpeed(*speed)),
            (None, Some(capacity), None) => Ok(VariantField::TowingCapacity(*capacity)),
            (None, None, Some(features)) => Ok(VariantField::PremiumFeatures(features.clone())),
            _ => Err(DomainError::InvalidVehicle(format!(
                "vehicle '{}' must set exactly one of max_speed, towing_capacity, premium_features",
                self.model
            ))),
        }
    }
}

impl AppConfig {
    /// Read, parse and validate a config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let config: Self = toml::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for station in &self.stations {
            if !seen.insert(station.id) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate station id {}",
                    station.id
                )));
            }
            if station.capacity == 0 {
                return Err(ConfigError::Invalid(format!(
                    "station {} has zero capacity",
                    station.id
                )));
            }
            if station.vehicles.len() > station.capacity {
                return Err(ConfigError::Invalid(format!(
                    "station {} seeds {} vehicles but holds {}",
                    station.id,
                    station.vehicles.len(),
                    station.capacity
                )));
            }
        }
        if self.rental.required_capability.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "rental.required_capability must not be empty".into(),
            ));
        }
        Ok(())
    }
}
