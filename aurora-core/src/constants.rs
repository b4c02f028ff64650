//! Centralized default tuning constants for the Aurora I simulation.
//!
//! These values seed the `Default` implementations of every config section.
//! Runtime overrides go through the JSON config layer, never through these.

// Flight panel -------------------------------------------------------------
pub(crate) const FUEL_CAPACITY_UAC: f64 = 100_000.0;
pub(crate) const INITIAL_DISTANCE_KM: f64 = 225_000_000.0;
pub(crate) const INITIAL_SPEED_KMH: f64 = 15_000.0;
pub(crate) const SPEED_CAP_KMH: f64 = 80_000.0;
pub(crate) const ECO_SPEED_CAP_KMH: f64 = 10_000.0;
pub(crate) const MANEUVER_COST_FACTOR: f64 = 0.005;
pub(crate) const CONSUMPTION_PER_SPEED: f64 = 0.0005;
pub(crate) const ECO_CONSUMPTION_PER_SPEED: f64 = 0.0001;
pub(crate) const FIXED_CONSUMPTION_PER_HOUR: f64 = 10.0;
pub(crate) const ECO_FIXED_CONSUMPTION_PER_HOUR: f64 = 2.0;
pub(crate) const EVENT_PROBABILITY: f64 = 0.07;
pub(crate) const MICROMETEORITE_LOSS_MIN: f64 = 50.0;
pub(crate) const MICROMETEORITE_LOSS_MAX: f64 = 250.0;
pub(crate) const HOURS_PER_TICK: f64 = 240.0;
pub(crate) const DESTINATION: &str = "Mars";
pub(crate) const MALFUNCTION_SYSTEMS: [&str; 6] = [
    "Navigation Sensor",
    "Coolant Pump",
    "Voltage Regulator",
    "Low-Gain Antenna",
    "CO2 Filter",
    "Diagnostics Interface",
];

// Console timing -----------------------------------------------------------
pub(crate) const TICK_PACING_SECS: f64 = 5.0;
pub(crate) const MONITOR_INTERVAL_SECS: f64 = 20.0;

// Diagnostics --------------------------------------------------------------
pub(crate) const DIAG_OPERATIONAL_CHANCE: f64 = 0.85;
pub(crate) const DIAG_WARNING_CHANCE: f64 = 0.10;
pub(crate) const DIAG_CHECK_MIN_MS: u64 = 100;
pub(crate) const DIAG_CHECK_MAX_MS: u64 = 300;
pub(crate) const DIAG_SUBSYSTEMS: [&str; 27] = [
    // Propulsion
    "Main Engine (Nuclear Thermal)",
    "RCS Thrusters (Attitude and Maneuvering)",
    "Propellant Tanks",
    // Structure and mechanisms
    "Structural Integrity (Hull)",
    "Hatches and Seals",
    "Landing Gear (phase dependent)",
    "Robotic Arm",
    // Power
    "Power Generation (Reactor/Solar Arrays)",
    "Main Batteries",
    "Power Distribution (Lines and Converters)",
    // Life support
    "Atmosphere Control (O2/CO2/Humidity)",
    "Water Management System",
    "Internal Temperature Control",
    "Cabin Pressure Monitoring",
    // Communications
    "High-Gain Antenna (Earth Link)",
    "Low-Gain Antenna (Backup/Proximity)",
    "Internal Communications (Intercom)",
    // Guidance, navigation and control
    "Primary Flight Computer",
    "Backup Flight Computer",
    "Navigation Sensors (Star, Sun, IMU)",
    "Guidance and Control Algorithms",
    // Thermal
    "External Thermal Control (Radiators)",
    "Internal Thermal Control (Fluid Loops)",
    // Other
    "Onboard Computers and Data Network",
    "Fire Detection and Suppression",
    "Cosmic Radiation Shielding",
    "Waste Management System",
];

// Vitals -------------------------------------------------------------------
pub(crate) const CREW_SIZE: usize = 7;
pub(crate) const VITALS_ANOMALY_CHANCE: f64 = 0.03;
pub(crate) const VITALS_ANOMALY_WARNING_SHARE: f64 = 0.6;

// Airlock ------------------------------------------------------------------
pub(crate) const AIRLOCK_INTERNAL_PSI: f64 = 15.0;
pub(crate) const AIRLOCK_EXTERNAL_PSI: f64 = 0.0;
pub(crate) const AIRLOCK_HOLD_SECS: f64 = 10.0;
pub(crate) const AIRLOCK_STEP_PSI: f64 = 1.0;
pub(crate) const AIRLOCK_STEP_INTERVAL_SECS: f64 = 0.5;
