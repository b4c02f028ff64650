//! Aurora I simulation core
//!
//! Platform-agnostic spacecraft subsystem simulations: the flight command
//! panel, full-ship diagnostics, vital and environmental monitoring, and the
//! airlock pressurization cycle. No terminal I/O and no real-time waits live
//! here; the console crate drives these engines.

pub mod airlock;
pub mod config;
pub mod constants;
pub mod diagnostics;
pub mod flight;
pub mod numbers;
pub mod rng;
pub mod vitals;

// Re-export commonly used types
pub use airlock::{AirlockConfig, AirlockCycle, AirlockFrame, AirlockPhase};
pub use config::{AuroraConfig, ConfigError, TimingConfig};
pub use diagnostics::{
    DiagnosticReport, DiagnosticSweep, DiagnosticsConfig, HealthStatus, SubsystemCheck, run_sweep,
};
pub use flight::{
    Clock, Command, CommandError, ConsumptionRate, EcoChange, EndReason, Eta, EventKind, EventLog,
    FixedClock, FlightConfig, FlightConfigError, FlightEvent, FlightPanel, ImpulseBatch,
    ImpulseReport, LogEntry, LossRange, Maneuver, ManeuverError, StatusReport, StepOutcome,
    SystemClock, VoyageState,
};
pub use rng::{CountingRng, SimRng, StreamDomain};
pub use vitals::{
    Band, CrewVitals, Limits, Parameter, Reading, Sidedness, Unit, VitalStatus, VitalsConfig,
    VitalsSnapshot, check_conditions,
};
