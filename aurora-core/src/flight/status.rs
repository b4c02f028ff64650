//! Read-only status snapshot rendered by the console before every prompt.

use serde::{Deserialize, Serialize};

use super::logbook::Clock;
use super::panel::FlightPanel;
use crate::numbers::{trunc_f64_to_i64, trunc_f64_to_usize};

/// Estimated time of arrival split into whole days and hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Eta {
    pub days: i64,
    pub hours: i64,
}

impl Eta {
    /// ETA for `distance_km` at `speed_kmh`; `None` when stationary or already there.
    #[must_use]
    pub fn estimate(distance_km: f64, speed_kmh: f64) -> Option<Self> {
        if speed_kmh <= 0.0 || distance_km <= 0.0 {
            return None;
        }
        let hours = distance_km / speed_kmh;
        Some(Self {
            days: trunc_f64_to_i64((hours / 24.0).floor()),
            hours: trunc_f64_to_i64(hours % 24.0),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusReport {
    pub fuel_pct: f64,
    pub fuel_uac: f64,
    pub progress_pct: f64,
    pub travelled_km: f64,
    pub total_km: f64,
    pub speed_kmh: f64,
    pub distance_remaining_km: f64,
    pub eta: Option<Eta>,
    pub eco_mode: bool,
    pub eco_cap_kmh: f64,
    pub in_transit: bool,
    pub out_of_fuel: bool,
    pub destination: String,
}

impl StatusReport {
    #[must_use]
    pub fn capture<C: Clock>(panel: &FlightPanel<C>) -> Self {
        let cfg = panel.config();
        let state = panel.state();
        let fuel_pct = if cfg.fuel_capacity_uac > 0.0 {
            (state.fuel_uac / cfg.fuel_capacity_uac * 100.0).clamp(0.0, 100.0)
        } else {
            0.0
        };
        let total_km = cfg.initial_distance_km;
        let travelled_km = total_km - state.distance_remaining_km;
        let progress_pct = if total_km > 0.0 {
            (travelled_km / total_km * 100.0).clamp(0.0, 100.0)
        } else if state.distance_remaining_km <= 0.0 {
            100.0
        } else {
            0.0
        };

        Self {
            fuel_pct,
            fuel_uac: state.fuel_uac,
            progress_pct,
            travelled_km,
            total_km,
            speed_kmh: state.speed_kmh,
            distance_remaining_km: state.distance_remaining_km,
            eta: Eta::estimate(state.distance_remaining_km, state.speed_kmh),
            eco_mode: state.eco_mode,
            eco_cap_kmh: cfg.eco_speed_cap_kmh,
            in_transit: state.in_transit,
            out_of_fuel: state.fuel_uac <= 0.0 && state.distance_remaining_km > 0.0,
            destination: cfg.destination.clone(),
        }
    }

    /// Filled cells of a `width`-wide fuel gauge.
    #[must_use]
    pub fn fuel_cells(&self, width: usize) -> usize {
        gauge_cells(self.fuel_pct, width)
    }

    /// Filled cells of a `width`-wide progress gauge.
    #[must_use]
    pub fn progress_cells(&self, width: usize) -> usize {
        gauge_cells(self.progress_pct, width)
    }
}

fn gauge_cells(pct: f64, width: usize) -> usize {
    let filled = trunc_f64_to_usize(pct / 100.0 * crate::numbers::usize_to_f64(width));
    filled.min(width)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flight::config::FlightConfig;
    use crate::flight::logbook::FixedClock;
    use crate::rng::SimRng;

    fn panel() -> FlightPanel<FixedClock> {
        FlightPanel::with_clock(
            FlightConfig::default(),
            SimRng::seeded(4),
            FixedClock::default(),
        )
        .expect("valid")
    }

    #[test]
    fn departure_snapshot() {
        let report = StatusReport::capture(&panel());
        assert!((report.fuel_pct - 100.0).abs() < f64::EPSILON);
        assert!(report.progress_pct.abs() < f64::EPSILON);
        assert_eq!(report.fuel_cells(20), 20);
        assert_eq!(report.progress_cells(20), 0);
        // 225e6 / 15e3 = 15_000 h = 625 days
        assert_eq!(report.eta, Some(Eta { days: 625, hours: 0 }));
        assert!(report.in_transit);
        assert!(!report.out_of_fuel);
        assert_eq!(report.destination, "Mars");
    }

    #[test]
    fn partial_progress_and_fuel_alert() {
        let mut panel = panel();
        panel.with_state_mut(|s| {
            s.fuel_uac = 0.0;
            s.speed_kmh = 0.0;
            s.distance_remaining_km = 168_750_000.0;
        });
        let report = StatusReport::capture(&panel);
        assert!((report.progress_pct - 25.0).abs() < 1e-9);
        assert_eq!(report.progress_cells(20), 5);
        assert_eq!(report.fuel_cells(20), 0);
        assert!(report.eta.is_none());
        assert!(report.out_of_fuel);
    }

    #[test]
    fn eta_splits_days_and_hours() {
        assert_eq!(
            Eta::estimate(1_000.0, 10.0),
            Some(Eta { days: 4, hours: 4 })
        );
        assert_eq!(Eta::estimate(0.0, 10.0), None);
        assert_eq!(Eta::estimate(10.0, 0.0), None);
    }
}
