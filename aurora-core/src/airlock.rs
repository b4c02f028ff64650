//! Airlock pressurization cycle: linear ramp down, hold, ramp back up.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::ConfigError;
use crate::constants;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AirlockConfig {
    #[serde(default = "AirlockConfig::default_internal_psi")]
    pub internal_psi: f64,
    #[serde(default = "AirlockConfig::default_external_psi")]
    pub external_psi: f64,
    /// Time spent at external pressure.
    #[serde(default = "AirlockConfig::default_hold_secs")]
    pub hold_secs: f64,
    #[serde(default = "AirlockConfig::default_step_psi")]
    pub step_psi: f64,
    #[serde(default = "AirlockConfig::default_step_interval_secs")]
    pub step_interval_secs: f64,
}

impl Default for AirlockConfig {
    fn default() -> Self {
        Self {
            internal_psi: Self::default_internal_psi(),
            external_psi: Self::default_external_psi(),
            hold_secs: Self::default_hold_secs(),
            step_psi: Self::default_step_psi(),
            step_interval_secs: Self::default_step_interval_secs(),
        }
    }
}

impl AirlockConfig {
    const fn default_internal_psi() -> f64 {
        constants::AIRLOCK_INTERNAL_PSI
    }

    const fn default_external_psi() -> f64 {
        constants::AIRLOCK_EXTERNAL_PSI
    }

    const fn default_hold_secs() -> f64 {
        constants::AIRLOCK_HOLD_SECS
    }

    const fn default_step_psi() -> f64 {
        constants::AIRLOCK_STEP_PSI
    }

    const fn default_step_interval_secs() -> f64 {
        constants::AIRLOCK_STEP_INTERVAL_SECS
    }

    /// # Errors
    ///
    /// Returns an error for a non-positive step, inverted pressures or negative durations.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.step_psi.is_finite() || self.step_psi <= 0.0 {
            return Err(ConfigError::invalid(
                "airlock",
                "step_psi",
                format!("must be positive (got {})", self.step_psi),
            ));
        }
        if !self.internal_psi.is_finite()
            || !self.external_psi.is_finite()
            || self.external_psi < 0.0
            || self.internal_psi < self.external_psi
        {
            return Err(ConfigError::invalid(
                "airlock",
                "internal_psi",
                format!(
                    "internal {} psi must be at least external {} psi (and external non-negative)",
                    self.internal_psi, self.external_psi
                ),
            ));
        }
        for (field, value) in [
            ("hold_secs", self.hold_secs),
            ("step_interval_secs", self.step_interval_secs),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::invalid(
                    "airlock",
                    field,
                    format!("must be a non-negative duration (got {value})"),
                ));
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn step_interval(&self) -> Duration {
        Duration::from_secs_f64(self.step_interval_secs.max(0.0))
    }

    #[must_use]
    pub fn hold(&self) -> Duration {
        Duration::from_secs_f64(self.hold_secs.max(0.0))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AirlockPhase {
    /// Pressure shown before the next downward step.
    Depressurizing,
    ExternalReached,
    Holding,
    /// Pressure shown before the next upward step.
    Repressurizing,
    InternalReached,
}

impl AirlockPhase {
    /// Phase number printed in the cycle banner (1 through 3).
    #[must_use]
    pub const fn stage(self) -> u8 {
        match self {
            Self::Depressurizing | Self::ExternalReached => 1,
            Self::Holding => 2,
            Self::Repressurizing | Self::InternalReached => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AirlockFrame {
    pub phase: AirlockPhase,
    pub pressure_psi: f64,
}

impl AirlockFrame {
    /// How long the chamber stays in this frame before the next one.
    #[must_use]
    pub fn dwell(&self, cfg: &AirlockConfig) -> Duration {
        match self.phase {
            AirlockPhase::Depressurizing | AirlockPhase::Repressurizing => cfg.step_interval(),
            AirlockPhase::Holding => cfg.hold(),
            AirlockPhase::ExternalReached | AirlockPhase::InternalReached => Duration::ZERO,
        }
    }
}

/// Frames of one full cycle, in order.
#[derive(Debug, Clone)]
pub struct AirlockCycle {
    cfg: AirlockConfig,
    /// Pressure of the next frame.
    pressure: f64,
    last_pressure: f64,
    phase: Option<AirlockPhase>,
}

impl AirlockCycle {
    /// Start a cycle at internal pressure.
    ///
    /// # Errors
    ///
    /// Returns an error when the configuration is invalid.
    pub fn new(cfg: AirlockConfig) -> Result<Self, ConfigError> {
        cfg.validate()?;
        let phase = if cfg.internal_psi > cfg.external_psi {
            AirlockPhase::Depressurizing
        } else {
            AirlockPhase::ExternalReached
        };
        Ok(Self {
            cfg,
            pressure: cfg.internal_psi,
            last_pressure: cfg.internal_psi,
            phase: Some(phase),
        })
    }

    #[must_use]
    pub const fn config(&self) -> &AirlockConfig {
        &self.cfg
    }

    /// Pressure of the most recently yielded frame.
    #[must_use]
    pub const fn last_pressure(&self) -> f64 {
        self.last_pressure
    }
}

impl Iterator for AirlockCycle {
    type Item = AirlockFrame;

    fn next(&mut self) -> Option<Self::Item> {
        let phase = self.phase?;
        let cfg = self.cfg;
        let pressure = self.pressure;
        let (next_pressure, next_phase) = match phase {
            AirlockPhase::Depressurizing => {
                let next = (pressure - cfg.step_psi).max(cfg.external_psi);
                let phase = if next > cfg.external_psi {
                    AirlockPhase::Depressurizing
                } else {
                    AirlockPhase::ExternalReached
                };
                (next, Some(phase))
            }
            AirlockPhase::ExternalReached => (pressure, Some(AirlockPhase::Holding)),
            AirlockPhase::Holding => {
                let phase = if cfg.internal_psi > cfg.external_psi {
                    AirlockPhase::Repressurizing
                } else {
                    AirlockPhase::InternalReached
                };
                (pressure, Some(phase))
            }
            AirlockPhase::Repressurizing => {
                let next = (pressure + cfg.step_psi).min(cfg.internal_psi);
                let phase = if next < cfg.internal_psi {
                    AirlockPhase::Repressurizing
                } else {
                    AirlockPhase::InternalReached
                };
                (next, Some(phase))
            }
            AirlockPhase::InternalReached => (pressure, None),
        };
        self.last_pressure = pressure;
        self.pressure = next_pressure;
        self.phase = next_phase;
        Some(AirlockFrame {
            phase,
            pressure_psi: pressure,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pressures(frames: &[AirlockFrame], phase: AirlockPhase) -> Vec<f64> {
        frames
            .iter()
            .filter(|frame| frame.phase == phase)
            .map(|frame| frame.pressure_psi)
            .collect()
    }

    #[test]
    fn default_cycle_ramps_one_psi_at_a_time() {
        let frames: Vec<_> = AirlockCycle::new(AirlockConfig::default())
            .expect("valid")
            .collect();
        let down = pressures(&frames, AirlockPhase::Depressurizing);
        assert_eq!(down.len(), 15);
        assert!((down[0] - 15.0).abs() < f64::EPSILON);
        assert!((down[14] - 1.0).abs() < f64::EPSILON);
        let up = pressures(&frames, AirlockPhase::Repressurizing);
        assert_eq!(up.len(), 15);
        assert!(up[0].abs() < f64::EPSILON);
        assert!((up[14] - 14.0).abs() < f64::EPSILON);

        let phases: Vec<_> = frames
            .iter()
            .map(|frame| frame.phase)
            .filter(|phase| {
                !matches!(
                    phase,
                    AirlockPhase::Depressurizing | AirlockPhase::Repressurizing
                )
            })
            .collect();
        assert_eq!(
            phases,
            [
                AirlockPhase::ExternalReached,
                AirlockPhase::Holding,
                AirlockPhase::InternalReached
            ]
        );
        let last = frames.last().expect("frames");
        assert!((last.pressure_psi - 15.0).abs() < f64::EPSILON);
        assert_eq!(frames.len(), 33);
    }

    #[test]
    fn uneven_steps_clamp_at_the_targets() {
        let cfg = AirlockConfig {
            internal_psi: 10.0,
            external_psi: 1.0,
            step_psi: 4.0,
            ..AirlockConfig::default()
        };
        let frames: Vec<_> = AirlockCycle::new(cfg).expect("valid").collect();
        assert_eq!(pressures(&frames, AirlockPhase::Depressurizing), [10.0, 6.0, 2.0]);
        assert_eq!(pressures(&frames, AirlockPhase::Repressurizing), [1.0, 5.0, 9.0]);
        assert_eq!(pressures(&frames, AirlockPhase::ExternalReached), [1.0]);
    }

    #[test]
    fn dwell_times_follow_the_phase() {
        let cfg = AirlockConfig::default();
        let frame = |phase| AirlockFrame {
            phase,
            pressure_psi: 0.0,
        };
        assert_eq!(
            frame(AirlockPhase::Depressurizing).dwell(&cfg),
            Duration::from_millis(500)
        );
        assert_eq!(frame(AirlockPhase::Holding).dwell(&cfg), Duration::from_secs(10));
        assert_eq!(frame(AirlockPhase::InternalReached).dwell(&cfg), Duration::ZERO);
        assert_eq!(AirlockPhase::Holding.stage(), 2);
    }

    #[test]
    fn validation() {
        assert!(AirlockConfig::default().validate().is_ok());
        let zero_step = AirlockConfig {
            step_psi: 0.0,
            ..AirlockConfig::default()
        };
        assert!(AirlockCycle::new(zero_step).is_err());
        let inverted = AirlockConfig {
            internal_psi: 1.0,
            external_psi: 5.0,
            ..AirlockConfig::default()
        };
        assert!(inverted.validate().is_err());
        let negative_hold = AirlockConfig {
            hold_secs: -1.0,
            ..AirlockConfig::default()
        };
        assert!(negative_hold.validate().is_err());
    }
}
