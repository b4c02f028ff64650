//! Flight command panel: voyage state, maneuvers, time steps and events.

pub mod command;
pub mod config;
pub mod event;
pub mod logbook;
pub mod panel;
pub mod state;
pub mod status;

pub use command::{Command, CommandError};
pub use config::{ConsumptionRate, FlightConfig, FlightConfigError, LossRange};
pub use event::{EventKind, FlightEvent};
pub use logbook::{Clock, EventLog, FixedClock, LogEntry, SystemClock, TIMESTAMP_FORMAT};
pub use panel::{
    EcoChange, EndReason, FlightPanel, ImpulseBatch, ImpulseReport, Maneuver, ManeuverError,
    StepOutcome,
};
pub use state::VoyageState;
pub use status::{Eta, StatusReport};
