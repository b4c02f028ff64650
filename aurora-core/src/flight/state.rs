use serde::{Deserialize, Serialize};

use super::config::FlightConfig;
use super::logbook::EventLog;

/// Mutable voyage state owned by a single flight panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoyageState {
    pub fuel_uac: f64,
    pub distance_remaining_km: f64,
    pub speed_kmh: f64,
    pub in_transit: bool,
    pub eco_mode: bool,
    #[serde(default)]
    pub log: EventLog,
}

impl VoyageState {
    /// Fresh state at departure: full tank, configured distance and speed.
    #[must_use]
    pub fn departure(cfg: &FlightConfig) -> Self {
        Self {
            fuel_uac: cfg.fuel_capacity_uac,
            distance_remaining_km: cfg.initial_distance_km,
            speed_kmh: cfg.initial_speed_kmh,
            in_transit: true,
            eco_mode: false,
            log: EventLog::new(),
        }
    }

    /// Out of fuel and stationary; no step can change anything any more.
    #[must_use]
    pub fn is_stranded(&self) -> bool {
        self.fuel_uac <= 0.0 && self.speed_kmh <= 0.0
    }

    #[must_use]
    pub fn has_arrived(&self) -> bool {
        self.distance_remaining_km <= 0.0
    }
}
