//! Random in-flight events drawn at most once per simulated step.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::config::FlightConfig;

/// Event kinds, in draw order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Micrometeorite,
    Malfunction,
    SolarStorm,
}

impl EventKind {
    pub const ALL: [Self; 3] = [Self::Micrometeorite, Self::Malfunction, Self::SolarStorm];
}

/// Event that occurred during a step, with its applied effect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FlightEvent {
    /// Hull impact; `fuel_lost_uac` is the loss actually applied after clamping.
    Micrometeorite { fuel_lost_uac: f64 },
    Malfunction { system: String },
    SolarStorm,
}

impl FlightEvent {
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::Micrometeorite { .. } => EventKind::Micrometeorite,
            Self::Malfunction { .. } => EventKind::Malfunction,
            Self::SolarStorm => EventKind::SolarStorm,
        }
    }
}

impl fmt::Display for FlightEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Micrometeorite { fuel_lost_uac } => write!(
                f,
                "EVENT: Micrometeorite impact! Lost {fuel_lost_uac:.2} UAC."
            ),
            Self::Malfunction { system } => write!(
                f,
                "EVENT: Minor anomaly in {system}. Diagnostic recommended."
            ),
            Self::SolarStorm => f.write_str("EVENT: Solar storm! Monitor communications and radiation."),
        }
    }
}

/// Roll for an event and apply its effect to `fuel_uac`.
pub(crate) fn roll_event<R: Rng + ?Sized>(
    cfg: &FlightConfig,
    rng: &mut R,
    fuel_uac: &mut f64,
) -> Option<FlightEvent> {
    if rng.r#gen::<f64>() >= cfg.event_probability {
        return None;
    }
    let kind = EventKind::ALL[rng.gen_range(0..EventKind::ALL.len())];
    let event = match kind {
        EventKind::Micrometeorite => {
            let loss = cfg.micrometeorite_loss;
            let drawn = if loss.max > loss.min {
                rng.gen_range(loss.min..=loss.max)
            } else {
                loss.min
            };
            let before = *fuel_uac;
            *fuel_uac = (before - drawn).max(0.0);
            FlightEvent::Micrometeorite {
                fuel_lost_uac: before - *fuel_uac,
            }
        }
        EventKind::Malfunction => {
            let system = cfg
                .malfunction_systems
                .choose(rng)
                .cloned()
                .unwrap_or_default();
            FlightEvent::Malfunction { system }
        }
        EventKind::SolarStorm => FlightEvent::SolarStorm,
    };
    Some(event)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flight::config::LossRange;
    use crate::rng::SimRng;

    fn always() -> FlightConfig {
        FlightConfig {
            event_probability: 1.0,
            ..FlightConfig::default()
        }
    }

    #[test]
    fn never_fires_at_zero_probability() {
        let cfg = FlightConfig {
            event_probability: 0.0,
            ..FlightConfig::default()
        };
        let mut rng = SimRng::seeded(3);
        let mut fuel = 500.0;
        for _ in 0..200 {
            assert!(roll_event(&cfg, &mut rng, &mut fuel).is_none());
        }
        assert!((fuel - 500.0).abs() < f64::EPSILON);
    }

    #[test]
    fn every_kind_is_reachable_and_effects_are_bounded() {
        let cfg = always();
        let mut rng = SimRng::seeded(11);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..300 {
            let mut fuel = 10_000.0;
            let event = roll_event(&cfg, &mut rng, &mut fuel).expect("event");
            seen.insert(event.kind());
            match event {
                FlightEvent::Micrometeorite { fuel_lost_uac } => {
                    assert!((50.0..=250.0).contains(&fuel_lost_uac));
                    assert!((fuel - (10_000.0 - fuel_lost_uac)).abs() < 1e-9);
                }
                FlightEvent::Malfunction { system } => {
                    assert!(cfg.malfunction_systems.contains(&system));
                    assert!((fuel - 10_000.0).abs() < f64::EPSILON);
                }
                FlightEvent::SolarStorm => assert!((fuel - 10_000.0).abs() < f64::EPSILON),
            }
        }
        assert_eq!(seen.len(), EventKind::ALL.len());
    }

    #[test]
    fn micrometeorite_loss_is_clamped_to_remaining_fuel() {
        let cfg = FlightConfig {
            micrometeorite_loss: LossRange {
                min: 100.0,
                max: 100.0,
            },
            ..always()
        };
        let mut rng = SimRng::seeded(5);
        for _ in 0..100 {
            let mut fuel = 30.0;
            if let Some(FlightEvent::Micrometeorite { fuel_lost_uac }) =
                roll_event(&cfg, &mut rng, &mut fuel)
            {
                assert!((fuel_lost_uac - 30.0).abs() < f64::EPSILON);
                assert!(fuel.abs() < f64::EPSILON);
                assert_eq!(
                    FlightEvent::Micrometeorite { fuel_lost_uac }.to_string(),
                    "EVENT: Micrometeorite impact! Lost 30.00 UAC."
                );
                return;
            }
        }
        panic!("no micrometeorite drawn in 100 rolls");
    }
}
