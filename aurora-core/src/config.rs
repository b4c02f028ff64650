//! Aggregate configuration for every subsystem, loadable from JSON.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::airlock::AirlockConfig;
use crate::constants;
use crate::diagnostics::DiagnosticsConfig;
use crate::flight::{FlightConfig, FlightConfigError};
use crate::vitals::VitalsConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("flight configuration invalid: {0}")]
    Flight(#[from] FlightConfigError),
    #[error("{section}.{field} {reason}")]
    Invalid {
        section: &'static str,
        field: &'static str,
        reason: String,
    },
}

impl ConfigError {
    pub(crate) fn invalid(
        section: &'static str,
        field: &'static str,
        reason: impl Into<String>,
    ) -> Self {
        Self::Invalid {
            section,
            field,
            reason: reason.into(),
        }
    }
}

/// Real-time pacing of the interactive console.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Wait between flight ticks when no command arrives.
    #[serde(default = "TimingConfig::default_tick_pacing_secs")]
    pub tick_pacing_secs: f64,
    #[serde(default = "TimingConfig::default_monitor_interval_secs")]
    pub monitor_interval_secs: f64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            tick_pacing_secs: Self::default_tick_pacing_secs(),
            monitor_interval_secs: Self::default_monitor_interval_secs(),
        }
    }
}

impl TimingConfig {
    const fn default_tick_pacing_secs() -> f64 {
        constants::TICK_PACING_SECS
    }

    const fn default_monitor_interval_secs() -> f64 {
        constants::MONITOR_INTERVAL_SECS
    }

    #[must_use]
    pub fn tick_pacing(&self) -> Duration {
        Duration::from_secs_f64(self.tick_pacing_secs.max(0.0))
    }

    #[must_use]
    pub fn monitor_interval(&self) -> Duration {
        Duration::from_secs_f64(self.monitor_interval_secs.max(0.0))
    }

    /// # Errors
    ///
    /// Returns an error for negative or non-finite durations.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("tick_pacing_secs", self.tick_pacing_secs),
            ("monitor_interval_secs", self.monitor_interval_secs),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::invalid(
                    "timing",
                    field,
                    format!("must be a non-negative duration (got {value})"),
                ));
            }
        }
        Ok(())
    }
}

/// Every tunable of the simulator. Missing sections and fields take defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuroraConfig {
    pub flight: FlightConfig,
    pub diagnostics: DiagnosticsConfig,
    pub vitals: VitalsConfig,
    pub airlock: AirlockConfig,
    pub timing: TimingConfig,
}

impl AuroraConfig {
    /// Parse and validate a JSON document.
    ///
    /// # Errors
    ///
    /// Returns an error when the document is malformed or any section is invalid.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// # Errors
    ///
    /// Returns the first invalid section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.flight.validate()?;
        self.diagnostics.validate()?;
        self.vitals.validate()?;
        self.airlock.validate()?;
        self.timing.validate()
    }
}
