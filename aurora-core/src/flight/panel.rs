//! Flight command panel: owns the voyage state and applies maneuvers and time steps.
//!
//! Every operation here is a pure state transition. Presentation, pacing and
//! input handling belong to the driver that calls into the panel.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;
use thiserror::Error;

use super::config::{FlightConfig, FlightConfigError};
use super::event::{FlightEvent, roll_event};
use super::logbook::{Clock, SystemClock};
use super::state::VoyageState;
use crate::numbers::{group_thousands, trunc_f64_to_i64};
use crate::rng::SimRng;

/// Reasons a speed-change request was rejected. No state changes on any of them.
#[derive(Debug, Error, PartialEq)]
pub enum ManeuverError {
    #[error("voyage is not active")]
    NotInTransit,
    #[error("no speed given")]
    EmptyInput,
    #[error("speed '{0}' is not a valid number")]
    InvalidSpeed(String),
    #[error("speed cannot be negative (got {0})")]
    NegativeSpeed(f64),
    #[error("insufficient fuel: {required:.2} UAC required, {available:.2} UAC available")]
    InsufficientFuel { required: f64, available: f64 },
}

/// Result of an accepted speed-change request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Maneuver {
    /// Requested speed already matched; nothing spent.
    Unchanged,
    Changed {
        from: f64,
        to: f64,
        cost: f64,
        /// The request exceeded the active cap and was clamped to it.
        adjusted: bool,
    },
}

/// What a single simulated step did.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepOutcome {
    pub fuel_consumed_uac: f64,
    pub distance_covered_km: f64,
    /// Fuel had run out; the ship stopped instead of moving.
    pub drifted: bool,
    pub arrived: bool,
    pub event: Option<FlightEvent>,
}

/// Effect of an eco mode toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EcoChange {
    Enabled { speed_reduced: bool },
    Disabled,
    Unchanged,
    /// Enabling would have required an unaffordable slow-down.
    Refused,
    Ignored,
}

/// Why a session was ended before arrival.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    OperatorExit,
    Interrupted,
    InputClosed,
    Fault(String),
}

impl fmt::Display for EndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OperatorExit => f.write_str("Command 'sair' received."),
            Self::Interrupted => f.write_str("Manual interrupt (Ctrl+C)."),
            Self::InputClosed => f.write_str("Command input closed."),
            Self::Fault(message) => write!(f, "UNEXPECTED ERROR: {message}"),
        }
    }
}

/// Summary of an impulse batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpulseReport {
    pub requested: u32,
    pub completed: u32,
    /// Transit ended before every requested step ran.
    pub ended_early: bool,
    pub events: SmallVec<[FlightEvent; 4]>,
}

/// Stepwise impulse executor, so drivers can pause between steps.
#[derive(Debug, Clone)]
pub struct ImpulseBatch {
    requested: u32,
    completed: u32,
    ended_early: bool,
    events: SmallVec<[FlightEvent; 4]>,
}

impl ImpulseBatch {
    #[must_use]
    pub fn new(requested: u32) -> Self {
        Self {
            requested,
            completed: 0,
            ended_early: false,
            events: SmallVec::new(),
        }
    }

    /// Run the next step, or `None` once the batch is exhausted or transit ended.
    pub fn advance<C: Clock>(&mut self, panel: &mut FlightPanel<C>) -> Option<StepOutcome> {
        if self.completed >= self.requested {
            return None;
        }
        if !panel.state().in_transit {
            self.ended_early = true;
            return None;
        }
        let outcome = panel.tick();
        self.completed += 1;
        if let Some(event) = &outcome.event {
            self.events.push(event.clone());
        }
        Some(outcome)
    }

    #[must_use]
    pub const fn completed(&self) -> u32 {
        self.completed
    }

    #[must_use]
    pub fn report(&self) -> ImpulseReport {
        ImpulseReport {
            requested: self.requested,
            completed: self.completed,
            ended_early: self.ended_early,
            events: self.events.clone(),
        }
    }
}

/// State owner and simulation engine for one voyage.
#[derive(Debug, Clone)]
pub struct FlightPanel<C: Clock = SystemClock> {
    config: FlightConfig,
    state: VoyageState,
    rng: SimRng,
    clock: C,
    steps: u64,
}

impl FlightPanel<SystemClock> {
    /// Build a panel stamping log entries with the local wall clock.
    ///
    /// # Errors
    ///
    /// Returns an error when the configuration is invalid.
    pub fn new(config: FlightConfig, rng: SimRng) -> Result<Self, FlightConfigError> {
        Self::with_clock(config, rng, SystemClock)
    }
}

impl<C: Clock> FlightPanel<C> {
    /// Build a panel with an explicit timestamp source.
    ///
    /// # Errors
    ///
    /// Returns an error when the configuration is invalid.
    pub fn with_clock(config: FlightConfig, rng: SimRng, clock: C) -> Result<Self, FlightConfigError> {
        config.validate()?;
        let state = VoyageState::departure(&config);
        let mut panel = Self {
            config,
            state,
            rng,
            clock,
            steps: 0,
        };
        panel.record("Command panel activated.");
        Ok(panel)
    }

    /// Pick up a voyage from a saved state instead of departure.
    ///
    /// The state's log is kept as is; nothing is recorded.
    ///
    /// # Errors
    ///
    /// Returns an error when the configuration is invalid.
    #[doc(hidden)]
    pub fn resume(
        config: FlightConfig,
        state: VoyageState,
        rng: SimRng,
        clock: C,
    ) -> Result<Self, FlightConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            state,
            rng,
            clock,
            steps: 0,
        })
    }

    #[must_use]
    pub const fn config(&self) -> &FlightConfig {
        &self.config
    }

    #[must_use]
    pub const fn state(&self) -> &VoyageState {
        &self.state
    }

    #[cfg(test)]
    pub(crate) fn with_state_mut<R>(&mut self, f: impl FnOnce(&mut VoyageState) -> R) -> R {
        f(&mut self.state)
    }

    #[must_use]
    pub const fn in_transit(&self) -> bool {
        self.state.in_transit
    }

    /// Number of steps that consumed fuel and moved the ship.
    #[must_use]
    pub const fn steps_taken(&self) -> u64 {
        self.steps
    }

    #[must_use]
    pub const fn rng_draws(&self) -> u64 {
        self.rng.draws()
    }

    /// Speed cap of the currently active mode.
    #[must_use]
    pub const fn speed_cap(&self) -> f64 {
        self.config.speed_cap(self.state.eco_mode)
    }

    /// Append a timestamped entry to the voyage log.
    pub fn record(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::debug!(target: "aurora::flight", "{message}");
        let now = self.clock.now();
        self.state.log.append(now, message);
    }

    /// Log a rejected operator command.
    pub fn record_error(&mut self, error: &impl fmt::Display) {
        self.record(format!("Error: {error}."));
    }

    /// Parse free-form operator text and attempt the speed change.
    ///
    /// # Errors
    ///
    /// Returns why the request was rejected; state is untouched in that case.
    pub fn request_speed(&mut self, input: &str) -> Result<Maneuver, ManeuverError> {
        if !self.state.in_transit {
            self.record("Command ignored: voyage not active.");
            return Err(ManeuverError::NotInTransit);
        }
        let text = input.trim();
        if text.is_empty() {
            return Err(ManeuverError::EmptyInput);
        }
        match text.parse::<f64>() {
            Ok(value) if value.is_finite() => self.set_speed(value),
            _ => {
                self.record(format!("Error: speed '{text}' is invalid."));
                Err(ManeuverError::InvalidSpeed(text.to_string()))
            }
        }
    }

    /// Attempt a maneuver to `requested` km/h, clamping to the active cap.
    ///
    /// # Errors
    ///
    /// Returns why the request was rejected; state is untouched in that case.
    pub fn set_speed(&mut self, requested: f64) -> Result<Maneuver, ManeuverError> {
        if !self.state.in_transit {
            self.record("Command ignored: voyage not active.");
            return Err(ManeuverError::NotInTransit);
        }
        if !requested.is_finite() {
            self.record(format!("Error: speed '{requested}' is invalid."));
            return Err(ManeuverError::InvalidSpeed(requested.to_string()));
        }
        if requested < 0.0 {
            self.record("Error: speed cannot be negative.");
            return Err(ManeuverError::NegativeSpeed(requested));
        }

        let cap = self.speed_cap();
        let adjusted = requested > cap;
        let target = if adjusted {
            self.record(format!(
                "Warning: requested speed ({} km/h) exceeds current limit ({} km/h). Adjusting.",
                kmh(requested),
                kmh(cap)
            ));
            cap
        } else {
            requested
        };

        let from = self.state.speed_kmh;
        let delta = (target - from).abs();
        if delta == 0.0 && !adjusted {
            return Ok(Maneuver::Unchanged);
        }
        let cost = delta * self.config.maneuver_cost_factor;
        if self.state.fuel_uac < cost {
            self.record(format!(
                "Maneuver failed: insufficient fuel. Required: {cost:.2} UAC."
            ));
            return Err(ManeuverError::InsufficientFuel {
                required: cost,
                available: self.state.fuel_uac,
            });
        }

        self.state.fuel_uac = (self.state.fuel_uac - cost).max(0.0);
        self.state.speed_kmh = target;
        self.record(format!(
            "Maneuver: speed {} {} km/h. Cost: {cost:.2} UAC.",
            if adjusted { "adjusted to" } else { "changed to" },
            kmh(target)
        ));
        Ok(Maneuver::Changed {
            from,
            to: target,
            cost,
            adjusted,
        })
    }

    /// Toggle eco mode; enabling above the eco cap pays for the slow-down.
    pub fn set_eco_mode(&mut self, enabled: bool) -> EcoChange {
        if !self.state.in_transit {
            self.record("Command ignored: voyage not active.");
            return EcoChange::Ignored;
        }
        if enabled == self.state.eco_mode {
            self.record(if enabled {
                "Economy mode already enabled."
            } else {
                "Economy mode already disabled."
            });
            return EcoChange::Unchanged;
        }
        if !enabled {
            self.state.eco_mode = false;
            self.record("Economy mode DISABLED.");
            return EcoChange::Disabled;
        }

        let eco_cap = self.config.eco_speed_cap_kmh;
        let speed_reduced = self.state.speed_kmh > eco_cap;
        self.state.eco_mode = true;
        if speed_reduced {
            self.record("Reducing speed to eco limit...");
            if self.set_speed(eco_cap).is_err() {
                self.state.eco_mode = false;
                self.record("Economy mode not enabled: cannot afford the slow-down.");
                return EcoChange::Refused;
            }
        }
        self.record("Economy mode ENABLED.");
        EcoChange::Enabled { speed_reduced }
    }

    /// Advance one tick of the configured length.
    pub fn tick(&mut self) -> StepOutcome {
        self.step(self.config.hours_per_tick)
    }

    /// Advance simulated time by `hours`.
    pub fn step(&mut self, hours: f64) -> StepOutcome {
        if !self.state.in_transit || self.state.is_stranded() {
            return StepOutcome::default();
        }
        if !hours.is_finite() || hours <= 0.0 {
            log::warn!(target: "aurora::flight", "ignoring step of {hours} hours");
            return StepOutcome::default();
        }
        if self.state.fuel_uac <= 0.0 {
            self.record("Fuel exhausted. Ship drifting.");
            self.state.speed_kmh = 0.0;
            return StepOutcome {
                drifted: true,
                ..StepOutcome::default()
            };
        }

        self.steps += 1;
        let speed = self.state.speed_kmh;
        let rate = self.config.consumption_rate(self.state.eco_mode);
        let fuel_before = self.state.fuel_uac;
        self.state.fuel_uac = (fuel_before - rate.consumption(speed, hours)).max(0.0);
        let fuel_consumed_uac = fuel_before - self.state.fuel_uac;

        let distance_before = self.state.distance_remaining_km;
        self.state.distance_remaining_km = (distance_before - speed * hours).max(0.0);
        let distance_covered_km = distance_before - self.state.distance_remaining_km;
        log::debug!(
            target: "aurora::flight",
            "step {}: {hours}h, burned {fuel_consumed_uac:.2} UAC, covered {distance_covered_km:.0} km",
            self.steps
        );

        let event = roll_event(&self.config, &mut self.rng, &mut self.state.fuel_uac);
        if let Some(event) = &event {
            self.record(event.to_string());
        }

        let arrived = distance_before > 0.0 && self.state.has_arrived();
        if arrived {
            self.record(format!(
                "***** ARRIVAL AT {} CONFIRMED! *****",
                self.config.destination.to_uppercase()
            ));
            self.state.speed_kmh = 0.0;
            self.state.in_transit = false;
        }

        StepOutcome {
            fuel_consumed_uac,
            distance_covered_km,
            drifted: false,
            arrived,
            event,
        }
    }

    /// Run up to `steps` ticks back to back.
    pub fn impulse(&mut self, steps: u32) -> ImpulseReport {
        let mut batch = ImpulseBatch::new(steps);
        while batch.advance(self).is_some() {}
        batch.report()
    }

    /// End the session before arrival. Repeated calls are no-ops.
    pub fn end_session(&mut self, reason: &EndReason) {
        if !self.state.in_transit {
            return;
        }
        self.record(reason.to_string());
        self.state.in_transit = false;
    }
}

fn kmh(value: f64) -> String {
    group_thousands(trunc_f64_to_i64(value))
}
