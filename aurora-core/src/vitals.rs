//! Vital-sign and cabin environment monitoring.
//!
//! Each check draws one reading per parameter, classifies it against the
//! parameter's limits and rolls the results up into crew and ship status.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::ConfigError;
use crate::constants;
use crate::numbers::round_tenths;

/// Reading status, ordered by severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VitalStatus {
    #[default]
    Normal,
    Warning,
    Critical,
}

impl VitalStatus {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::Warning => "WARNING",
            Self::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for VitalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    Bpm,
    MmHg,
    Celsius,
    BreathsPerMinute,
    Percent,
    Psi,
    Ppm,
}

impl Unit {
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Bpm => "BPM",
            Self::MmHg => "mmHg",
            Self::Celsius => "°C",
            Self::BreathsPerMinute => "breaths/min",
            Self::Percent => "%",
            Self::Psi => "psi",
            Self::Ppm => "ppm",
        }
    }

    /// Decimal places kept when a reading is rounded.
    #[must_use]
    pub const fn decimals(self) -> usize {
        match self {
            Self::Celsius | Self::Percent | Self::Psi => 1,
            Self::Bpm | Self::MmHg | Self::BreathsPerMinute | Self::Ppm => 0,
        }
    }

    #[must_use]
    pub fn round(self, value: f64) -> f64 {
        if self.decimals() == 0 {
            value.round()
        } else {
            round_tenths(value)
        }
    }

    /// Render `value` with this unit's precision.
    #[must_use]
    pub fn format(self, value: f64) -> String {
        format!("{value:.prec$}", prec = self.decimals())
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Closed interval `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub min: f64,
    pub max: f64,
}

impl Band {
    #[must_use]
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    #[must_use]
    pub fn contains(self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// Which deviations from the normal band are abnormal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sidedness {
    #[default]
    Both,
    /// Only readings below the normal band count (e.g. SpO2).
    LowOnly,
    /// Only readings above the normal band count (e.g. CO2).
    HighOnly,
}

impl Sidedness {
    const fn monitors_low(self) -> bool {
        matches!(self, Self::Both | Self::LowOnly)
    }

    const fn monitors_high(self) -> bool {
        matches!(self, Self::Both | Self::HighOnly)
    }
}

/// Nested threshold bands: `critical ⊇ warning ⊇ normal`.
///
/// The critical band bounds the range anomalous readings are drawn from; it
/// does not take part in classification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Limits {
    pub normal: Band,
    pub warning: Band,
    pub critical: Band,
    #[serde(default)]
    pub sidedness: Sidedness,
}

impl Limits {
    #[must_use]
    pub const fn new(normal: Band, warning: Band, critical: Band, sidedness: Sidedness) -> Self {
        Self {
            normal,
            warning,
            critical,
            sidedness,
        }
    }

    /// Classify a reading. Deviations on an unmonitored side are Normal.
    #[must_use]
    pub fn classify(&self, value: f64) -> VitalStatus {
        if self.normal.contains(value) {
            return VitalStatus::Normal;
        }
        let low = value < self.normal.min;
        let monitored = if low {
            self.sidedness.monitors_low()
        } else {
            self.sidedness.monitors_high()
        };
        if !monitored {
            return VitalStatus::Normal;
        }
        let beyond_warning = if low {
            value < self.warning.min
        } else {
            value > self.warning.max
        };
        if beyond_warning {
            VitalStatus::Critical
        } else {
            VitalStatus::Warning
        }
    }

    fn is_nested(&self) -> bool {
        let ordered = [
            self.critical.min,
            self.warning.min,
            self.normal.min,
            self.normal.max,
            self.warning.max,
            self.critical.max,
        ];
        ordered.iter().all(|value| value.is_finite())
            && ordered.windows(2).all(|pair| pair[0] <= pair[1])
    }
}

/// A monitored quantity and the distribution its readings are drawn from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub unit: Unit,
    pub limits: Limits,
    pub mean: f64,
    pub std_dev: f64,
}

impl Parameter {
    #[must_use]
    pub fn new(name: &str, unit: Unit, limits: Limits, mean: f64, std_dev: f64) -> Self {
        Self {
            name: name.to_string(),
            unit,
            limits,
            mean,
            std_dev,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VitalsConfig {
    #[serde(default = "VitalsConfig::default_crew_size")]
    pub crew_size: usize,
    /// Chance a reading is forced outside the normal band.
    #[serde(default = "VitalsConfig::default_anomaly_chance")]
    pub anomaly_chance: f64,
    /// Share of forced anomalies that land in the warning band; the rest go critical.
    #[serde(default = "VitalsConfig::default_anomaly_warning_share")]
    pub anomaly_warning_share: f64,
    #[serde(default = "VitalsConfig::default_environment")]
    pub environment: Vec<Parameter>,
    #[serde(default = "VitalsConfig::default_crew")]
    pub crew: Vec<Parameter>,
}

impl Default for VitalsConfig {
    fn default() -> Self {
        Self {
            crew_size: Self::default_crew_size(),
            anomaly_chance: Self::default_anomaly_chance(),
            anomaly_warning_share: Self::default_anomaly_warning_share(),
            environment: Self::default_environment(),
            crew: Self::default_crew(),
        }
    }
}

impl VitalsConfig {
    const fn default_crew_size() -> usize {
        constants::CREW_SIZE
    }

    const fn default_anomaly_chance() -> f64 {
        constants::VITALS_ANOMALY_CHANCE
    }

    const fn default_anomaly_warning_share() -> f64 {
        constants::VITALS_ANOMALY_WARNING_SHARE
    }

    fn default_environment() -> Vec<Parameter> {
        use Sidedness::{Both, HighOnly};
        vec![
            Parameter::new(
                "Cabin Pressure",
                Unit::Psi,
                Limits::new(
                    Band::new(14.5, 14.9),
                    Band::new(14.0, 15.1),
                    Band::new(13.5, 15.5),
                    Both,
                ),
                14.7,
                0.1,
            ),
            Parameter::new(
                "O2 Level",
                Unit::Percent,
                Limits::new(
                    Band::new(20.0, 21.5),
                    Band::new(19.0, 22.5),
                    Band::new(18.0, 23.5),
                    Both,
                ),
                20.9,
                0.2,
            ),
            Parameter::new(
                "CO2 Level",
                Unit::Ppm,
                Limits::new(
                    Band::new(400.0, 1_000.0),
                    Band::new(400.0, 3_000.0),
                    Band::new(0.0, 5_000.0),
                    HighOnly,
                ),
                800.0,
                200.0,
            ),
            Parameter::new(
                "Cabin Air Temperature",
                Unit::Celsius,
                Limits::new(
                    Band::new(20.0, 24.0),
                    Band::new(18.0, 26.0),
                    Band::new(16.0, 28.0),
                    Both,
                ),
                22.0,
                1.0,
            ),
            Parameter::new(
                "Relative Humidity",
                Unit::Percent,
                Limits::new(
                    Band::new(40.0, 60.0),
                    Band::new(30.0, 70.0),
                    Band::new(20.0, 80.0),
                    Both,
                ),
                50.0,
                5.0,
            ),
        ]
    }

    fn default_crew() -> Vec<Parameter> {
        use Sidedness::{Both, LowOnly};
        vec![
            Parameter::new(
                "Heart Rate",
                Unit::Bpm,
                Limits::new(
                    Band::new(60.0, 100.0),
                    Band::new(50.0, 110.0),
                    Band::new(40.0, 120.0),
                    Both,
                ),
                75.0,
                8.0,
            ),
            Parameter::new(
                "Systolic Pressure",
                Unit::MmHg,
                Limits::new(
                    Band::new(90.0, 120.0),
                    Band::new(85.0, 140.0),
                    Band::new(80.0, 160.0),
                    Both,
                ),
                110.0,
                10.0,
            ),
            Parameter::new(
                "Diastolic Pressure",
                Unit::MmHg,
                Limits::new(
                    Band::new(60.0, 80.0),
                    Band::new(55.0, 90.0),
                    Band::new(50.0, 100.0),
                    Both,
                ),
                70.0,
                8.0,
            ),
            Parameter::new(
                "Body Temperature",
                Unit::Celsius,
                Limits::new(
                    Band::new(36.1, 37.2),
                    Band::new(35.5, 37.8),
                    Band::new(35.0, 38.5),
                    Both,
                ),
                36.8,
                0.3,
            ),
            Parameter::new(
                "Respiratory Rate",
                Unit::BreathsPerMinute,
                Limits::new(
                    Band::new(12.0, 20.0),
                    Band::new(10.0, 24.0),
                    Band::new(8.0, 30.0),
                    Both,
                ),
                16.0,
                2.0,
            ),
            Parameter::new(
                "SpO2",
                Unit::Percent,
                Limits::new(
                    Band::new(95.0, 100.0),
                    Band::new(90.0, 100.0),
                    Band::new(0.0, 100.0),
                    LowOnly,
                ),
                98.0,
                1.0,
            ),
        ]
    }

    /// Identifier of the `index`-th crew member (zero-based).
    #[must_use]
    pub fn crew_id(index: usize) -> String {
        format!("Astronaut_{:02}", index + 1)
    }

    /// # Errors
    ///
    /// Returns an error for out-of-range chances or badly ordered limits.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.crew_size == 0 {
            return Err(ConfigError::invalid(
                "vitals",
                "crew_size",
                "must be at least 1",
            ));
        }
        for (field, value) in [
            ("anomaly_chance", self.anomaly_chance),
            ("anomaly_warning_share", self.anomaly_warning_share),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::invalid(
                    "vitals",
                    field,
                    format!("must be within [0, 1] (got {value})"),
                ));
            }
        }
        for param in self.environment.iter().chain(&self.crew) {
            if !param.limits.is_nested() {
                return Err(ConfigError::invalid(
                    "vitals",
                    "limits",
                    format!("bands of '{}' are not nested", param.name),
                ));
            }
            if !param.mean.is_finite() || !param.std_dev.is_finite() || param.std_dev < 0.0 {
                return Err(ConfigError::invalid(
                    "vitals",
                    "std_dev",
                    format!("distribution of '{}' is invalid", param.name),
                ));
            }
        }
        Ok(())
    }
}

/// One classified sensor reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub parameter: String,
    pub value: f64,
    pub unit: Unit,
    pub status: VitalStatus,
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ({} {})",
            self.parameter,
            self.status,
            self.unit.format(self.value),
            self.unit
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrewVitals {
    pub id: String,
    /// Worst status among this member's readings.
    pub status: VitalStatus,
    pub readings: Vec<Reading>,
}

impl CrewVitals {
    /// Readings outside the normal band.
    pub fn abnormal(&self) -> impl Iterator<Item = &Reading> {
        self.readings
            .iter()
            .filter(|reading| reading.status != VitalStatus::Normal)
    }
}

/// Result of one monitoring check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VitalsSnapshot {
    /// Worst status across environment and crew.
    pub status: VitalStatus,
    pub environment: Vec<Reading>,
    pub crew: Vec<CrewVitals>,
    /// One line per critical reading, environment first.
    pub alarms: Vec<String>,
}

impl VitalsSnapshot {
    #[must_use]
    pub fn is_nominal(&self) -> bool {
        self.status == VitalStatus::Normal
    }

    #[must_use]
    pub fn has_alarms(&self) -> bool {
        !self.alarms.is_empty()
    }
}

/// Take one reading of every parameter for the cabin and each crew member.
pub fn check_conditions<R: Rng + ?Sized>(cfg: &VitalsConfig, rng: &mut R) -> VitalsSnapshot {
    let mut alarms = Vec::new();

    let environment: Vec<Reading> = cfg
        .environment
        .iter()
        .map(|param| take_reading(cfg, param, rng))
        .collect();
    for reading in &environment {
        if reading.status == VitalStatus::Critical {
            alarms.push(format!("Environment: {reading}"));
        }
    }
    let mut status = worst(&environment);

    let mut crew = Vec::with_capacity(cfg.crew_size);
    for index in 0..cfg.crew_size {
        let id = VitalsConfig::crew_id(index);
        let readings: Vec<Reading> = cfg
            .crew
            .iter()
            .map(|param| take_reading(cfg, param, rng))
            .collect();
        for reading in &readings {
            if reading.status == VitalStatus::Critical {
                alarms.push(format!("{id}: {reading}"));
            }
        }
        let member_status = worst(&readings);
        status = status.max(member_status);
        crew.push(CrewVitals {
            id,
            status: member_status,
            readings,
        });
    }

    if status != VitalStatus::Normal {
        log::debug!(target: "aurora::vitals", "check status {status}, {} alarm(s)", alarms.len());
    }
    VitalsSnapshot {
        status,
        environment,
        crew,
        alarms,
    }
}

fn worst(readings: &[Reading]) -> VitalStatus {
    readings
        .iter()
        .map(|reading| reading.status)
        .max()
        .unwrap_or_default()
}

fn take_reading<R: Rng + ?Sized>(cfg: &VitalsConfig, param: &Parameter, rng: &mut R) -> Reading {
    let mut value = gaussian(rng, param.mean, param.std_dev);
    if rng.r#gen::<f64>() < cfg.anomaly_chance {
        value = anomalous_value(cfg, &param.limits, rng);
    }
    let value = param.unit.round(value);
    Reading {
        parameter: param.name.clone(),
        value,
        unit: param.unit,
        status: param.limits.classify(value),
    }
}

/// Draw a value in the warning or critical band on a monitored side.
fn anomalous_value<R: Rng + ?Sized>(cfg: &VitalsConfig, limits: &Limits, rng: &mut R) -> f64 {
    let warning = rng.r#gen::<f64>() < cfg.anomaly_warning_share;
    let low = match limits.sidedness {
        Sidedness::Both => rng.gen_bool(0.5),
        Sidedness::LowOnly => true,
        Sidedness::HighOnly => false,
    };
    match (warning, low) {
        (true, true) => uniform(rng, limits.warning.min, limits.normal.min),
        (true, false) => uniform(rng, limits.normal.max, limits.warning.max),
        (false, true) => uniform(rng, limits.critical.min, limits.warning.min),
        (false, false) => uniform(rng, limits.warning.max, limits.critical.max),
    }
}

fn uniform<R: Rng + ?Sized>(rng: &mut R, lo: f64, hi: f64) -> f64 {
    if hi > lo { rng.gen_range(lo..=hi) } else { lo }
}

/// Box-Muller normal sample.
fn gaussian<R: Rng + ?Sized>(rng: &mut R, mean: f64, std_dev: f64) -> f64 {
    if std_dev <= 0.0 {
        return mean;
    }
    // 1 - u keeps the log argument in (0, 1].
    let u1 = 1.0 - rng.r#gen::<f64>();
    let u2 = rng.r#gen::<f64>();
    let z = (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos();
    z.mul_add(std_dev, mean)
}
