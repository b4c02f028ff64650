use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants;

/// Errors raised when flight configuration invariants are violated.
#[derive(Debug, Error, PartialEq)]
pub enum FlightConfigError {
    #[error("{field} must be greater than {min:.4} (got {value:.4})")]
    NotAbove {
        field: &'static str,
        min: f64,
        value: f64,
    },
    #[error("{field} must be at least {min:.4} (got {value:.4})")]
    MinViolation {
        field: &'static str,
        min: f64,
        value: f64,
    },
    #[error("{field} must be between {min:.4} and {max:.4} (got {value:.4})")]
    RangeViolation {
        field: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },
    #[error("eco speed cap {eco:.1} exceeds normal speed cap {normal:.1}")]
    EcoCapAboveNormal { eco: f64, normal: f64 },
    #[error("micrometeorite loss range invalid (min {min:.2} > max {max:.2})")]
    LossRange { min: f64, max: f64 },
    #[error("malfunction system list must not be empty")]
    NoMalfunctionSystems,
}

/// Fuel burn policy for one operating mode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ConsumptionRate {
    /// UAC burned per (km/h of speed) per simulated hour.
    PerSpeed(f64),
    /// UAC burned per simulated hour regardless of speed.
    FixedPerHour(f64),
}

impl ConsumptionRate {
    /// Fuel required to hold `speed_kmh` for `hours`.
    #[must_use]
    pub fn consumption(self, speed_kmh: f64, hours: f64) -> f64 {
        match self {
            Self::PerSpeed(factor) => factor * speed_kmh * hours,
            Self::FixedPerHour(per_hour) => per_hour * hours,
        }
    }

    const fn rate(self) -> f64 {
        match self {
            Self::PerSpeed(value) | Self::FixedPerHour(value) => value,
        }
    }
}

/// Uniform fuel-loss range applied by micrometeorite impacts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LossRange {
    pub min: f64,
    pub max: f64,
}

/// Immutable parameters of a flight panel session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightConfig {
    #[serde(default = "FlightConfig::default_capacity")]
    pub fuel_capacity_uac: f64,
    #[serde(default = "FlightConfig::default_distance")]
    pub initial_distance_km: f64,
    #[serde(default = "FlightConfig::default_initial_speed")]
    pub initial_speed_kmh: f64,
    #[serde(default = "FlightConfig::default_speed_cap")]
    pub speed_cap_kmh: f64,
    #[serde(default = "FlightConfig::default_eco_speed_cap")]
    pub eco_speed_cap_kmh: f64,
    #[serde(default = "FlightConfig::default_maneuver_cost_factor")]
    pub maneuver_cost_factor: f64,
    #[serde(default = "FlightConfig::default_consumption")]
    pub consumption: ConsumptionRate,
    #[serde(default = "FlightConfig::default_eco_consumption")]
    pub eco_consumption: ConsumptionRate,
    #[serde(default = "FlightConfig::default_event_probability")]
    pub event_probability: f64,
    #[serde(default = "FlightConfig::default_micrometeorite_loss")]
    pub micrometeorite_loss: LossRange,
    #[serde(default = "FlightConfig::default_malfunction_systems")]
    pub malfunction_systems: Vec<String>,
    #[serde(default = "FlightConfig::default_hours_per_tick")]
    pub hours_per_tick: f64,
    #[serde(default = "FlightConfig::default_destination")]
    pub destination: String,
}

impl Default for FlightConfig {
    fn default() -> Self {
        Self {
            fuel_capacity_uac: Self::default_capacity(),
            initial_distance_km: Self::default_distance(),
            initial_speed_kmh: Self::default_initial_speed(),
            speed_cap_kmh: Self::default_speed_cap(),
            eco_speed_cap_kmh: Self::default_eco_speed_cap(),
            maneuver_cost_factor: Self::default_maneuver_cost_factor(),
            consumption: Self::default_consumption(),
            eco_consumption: Self::default_eco_consumption(),
            event_probability: Self::default_event_probability(),
            micrometeorite_loss: Self::default_micrometeorite_loss(),
            malfunction_systems: Self::default_malfunction_systems(),
            hours_per_tick: Self::default_hours_per_tick(),
            destination: Self::default_destination(),
        }
    }
}

impl FlightConfig {
    const fn default_capacity() -> f64 {
        constants::FUEL_CAPACITY_UAC
    }

    const fn default_distance() -> f64 {
        constants::INITIAL_DISTANCE_KM
    }

    const fn default_initial_speed() -> f64 {
        constants::INITIAL_SPEED_KMH
    }

    const fn default_speed_cap() -> f64 {
        constants::SPEED_CAP_KMH
    }

    const fn default_eco_speed_cap() -> f64 {
        constants::ECO_SPEED_CAP_KMH
    }

    const fn default_maneuver_cost_factor() -> f64 {
        constants::MANEUVER_COST_FACTOR
    }

    const fn default_consumption() -> ConsumptionRate {
        ConsumptionRate::PerSpeed(constants::CONSUMPTION_PER_SPEED)
    }

    const fn default_eco_consumption() -> ConsumptionRate {
        ConsumptionRate::PerSpeed(constants::ECO_CONSUMPTION_PER_SPEED)
    }

    const fn default_event_probability() -> f64 {
        constants::EVENT_PROBABILITY
    }

    const fn default_micrometeorite_loss() -> LossRange {
        LossRange {
            min: constants::MICROMETEORITE_LOSS_MIN,
            max: constants::MICROMETEORITE_LOSS_MAX,
        }
    }

    fn default_malfunction_systems() -> Vec<String> {
        constants::MALFUNCTION_SYSTEMS
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    const fn default_hours_per_tick() -> f64 {
        constants::HOURS_PER_TICK
    }

    fn default_destination() -> String {
        constants::DESTINATION.to_string()
    }

    /// Switch both modes to the fixed-per-hour burn alternative.
    #[must_use]
    pub fn with_fixed_consumption(mut self) -> Self {
        self.consumption = ConsumptionRate::FixedPerHour(constants::FIXED_CONSUMPTION_PER_HOUR);
        self.eco_consumption =
            ConsumptionRate::FixedPerHour(constants::ECO_FIXED_CONSUMPTION_PER_HOUR);
        self
    }

    /// Speed cap of the requested operating mode.
    #[must_use]
    pub const fn speed_cap(&self, eco_mode: bool) -> f64 {
        if eco_mode {
            self.eco_speed_cap_kmh
        } else {
            self.speed_cap_kmh
        }
    }

    /// Consumption policy of the requested operating mode.
    #[must_use]
    pub const fn consumption_rate(&self, eco_mode: bool) -> ConsumptionRate {
        if eco_mode {
            self.eco_consumption
        } else {
            self.consumption
        }
    }

    /// Check every numeric invariant the panel relies on.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), FlightConfigError> {
        require_above("fuel_capacity_uac", self.fuel_capacity_uac, 0.0)?;
        require_above("initial_distance_km", self.initial_distance_km, 0.0)?;
        require_above("speed_cap_kmh", self.speed_cap_kmh, 0.0)?;
        require_above("eco_speed_cap_kmh", self.eco_speed_cap_kmh, 0.0)?;
        require_above("hours_per_tick", self.hours_per_tick, 0.0)?;
        if self.eco_speed_cap_kmh > self.speed_cap_kmh {
            return Err(FlightConfigError::EcoCapAboveNormal {
                eco: self.eco_speed_cap_kmh,
                normal: self.speed_cap_kmh,
            });
        }
        require_range(
            "initial_speed_kmh",
            self.initial_speed_kmh,
            0.0,
            self.speed_cap_kmh,
        )?;
        require_at_least("maneuver_cost_factor", self.maneuver_cost_factor, 0.0)?;
        require_at_least("consumption", self.consumption.rate(), 0.0)?;
        require_at_least("eco_consumption", self.eco_consumption.rate(), 0.0)?;
        require_range("event_probability", self.event_probability, 0.0, 1.0)?;

        let loss = self.micrometeorite_loss;
        require_at_least("micrometeorite_loss.min", loss.min, 0.0)?;
        if !loss.max.is_finite() || loss.min > loss.max {
            return Err(FlightConfigError::LossRange {
                min: loss.min,
                max: loss.max,
            });
        }
        if self.malfunction_systems.is_empty() {
            return Err(FlightConfigError::NoMalfunctionSystems);
        }
        Ok(())
    }
}

fn require_above(field: &'static str, value: f64, min: f64) -> Result<(), FlightConfigError> {
    if value.is_finite() && value > min {
        Ok(())
    } else {
        Err(FlightConfigError::NotAbove { field, min, value })
    }
}

fn require_at_least(field: &'static str, value: f64, min: f64) -> Result<(), FlightConfigError> {
    if value.is_finite() && value >= min {
        Ok(())
    } else {
        Err(FlightConfigError::MinViolation { field, min, value })
    }
}

fn require_range(
    field: &'static str,
    value: f64,
    min: f64,
    max: f64,
) -> Result<(), FlightConfigError> {
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(FlightConfigError::RangeViolation {
            field,
            min,
            max,
            value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = FlightConfig::default();
        assert!(cfg.validate().is_ok());
        assert!((cfg.speed_cap(false) - 80_000.0).abs() < f64::EPSILON);
        assert!((cfg.speed_cap(true) - 10_000.0).abs() < f64::EPSILON);
        assert_eq!(cfg.malfunction_systems.len(), 6);
    }

    #[test]
    fn consumption_policies() {
        let proportional = ConsumptionRate::PerSpeed(0.0005);
        assert!((proportional.consumption(15_000.0, 240.0) - 1_800.0).abs() < 1e-9);
        let fixed = ConsumptionRate::FixedPerHour(10.0);
        assert!((fixed.consumption(0.0, 240.0) - 2_400.0).abs() < 1e-9);

        let cfg = FlightConfig::default().with_fixed_consumption();
        assert_eq!(cfg.consumption_rate(false), ConsumptionRate::FixedPerHour(10.0));
        assert_eq!(cfg.consumption_rate(true), ConsumptionRate::FixedPerHour(2.0));
    }

    #[test]
    fn validation_rejects_broken_values() {
        let cfg = FlightConfig {
            eco_speed_cap_kmh: 90_000.0,
            ..FlightConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(FlightConfigError::EcoCapAboveNormal { .. })
        ));

        let cfg = FlightConfig {
            event_probability: 1.5,
            ..FlightConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(FlightConfigError::RangeViolation {
                field: "event_probability",
                ..
            })
        ));

        let cfg = FlightConfig {
            micrometeorite_loss: LossRange {
                min: 300.0,
                max: 100.0,
            },
            ..FlightConfig::default()
        };
        assert_eq!(
            cfg.validate(),
            Err(FlightConfigError::LossRange {
                min: 300.0,
                max: 100.0
            })
        );

        let cfg = FlightConfig {
            malfunction_systems: Vec::new(),
            ..FlightConfig::default()
        };
        assert_eq!(cfg.validate(), Err(FlightConfigError::NoMalfunctionSystems));
    }

    #[test]
    fn json_defaults_fill_missing_fields() {
        let cfg: FlightConfig = serde_json::from_str(
            r#"{"hours_per_tick": 24.0, "consumption": {"kind": "fixed_per_hour", "value": 4.0}}"#,
        )
        .expect("parse");
        assert!((cfg.hours_per_tick - 24.0).abs() < f64::EPSILON);
        assert_eq!(cfg.consumption, ConsumptionRate::FixedPerHour(4.0));
        assert!((cfg.fuel_capacity_uac - 100_000.0).abs() < f64::EPSILON);
    }
}
