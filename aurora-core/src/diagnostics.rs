//! Full-ship diagnostic sweep: one randomized status per subsystem.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::config::ConfigError;
use crate::constants;

/// Health status drawn for a single subsystem, ordered by severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Operational,
    Warning,
    Critical,
}

impl HealthStatus {
    /// Display order of the grouped report: most severe first.
    pub const REPORT_ORDER: [Self; 3] = [Self::Critical, Self::Warning, Self::Operational];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Operational => "OPERATIONAL",
            Self::Warning => "WARNING",
            Self::Critical => "CRITICAL",
        }
    }

    /// Bracketed indicator used by the grouped panel.
    #[must_use]
    pub const fn indicator(self) -> &'static str {
        match self {
            Self::Operational => "[ OK ]",
            Self::Warning => "[ ! ]",
            Self::Critical => "[ X ]",
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticsConfig {
    #[serde(default = "DiagnosticsConfig::default_subsystems")]
    pub subsystems: Vec<String>,
    #[serde(default = "DiagnosticsConfig::default_operational_chance")]
    pub operational_chance: f64,
    #[serde(default = "DiagnosticsConfig::default_warning_chance")]
    pub warning_chance: f64,
    /// Bounds of the simulated per-check duration, in milliseconds.
    #[serde(default = "DiagnosticsConfig::default_check_min_ms")]
    pub check_min_ms: u64,
    #[serde(default = "DiagnosticsConfig::default_check_max_ms")]
    pub check_max_ms: u64,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            subsystems: Self::default_subsystems(),
            operational_chance: Self::default_operational_chance(),
            warning_chance: Self::default_warning_chance(),
            check_min_ms: Self::default_check_min_ms(),
            check_max_ms: Self::default_check_max_ms(),
        }
    }
}

impl DiagnosticsConfig {
    fn default_subsystems() -> Vec<String> {
        constants::DIAG_SUBSYSTEMS
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    const fn default_operational_chance() -> f64 {
        constants::DIAG_OPERATIONAL_CHANCE
    }

    const fn default_warning_chance() -> f64 {
        constants::DIAG_WARNING_CHANCE
    }

    const fn default_check_min_ms() -> u64 {
        constants::DIAG_CHECK_MIN_MS
    }

    const fn default_check_max_ms() -> u64 {
        constants::DIAG_CHECK_MAX_MS
    }

    /// Probability of a Critical draw: whatever the other two leave.
    #[must_use]
    pub fn critical_chance(&self) -> f64 {
        (1.0 - self.operational_chance - self.warning_chance).max(0.0)
    }

    /// # Errors
    ///
    /// Returns an error when probabilities are out of range or the subsystem list is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.subsystems.is_empty() {
            return Err(ConfigError::invalid(
                "diagnostics",
                "subsystems",
                "must list at least one subsystem",
            ));
        }
        for (field, value) in [
            ("operational_chance", self.operational_chance),
            ("warning_chance", self.warning_chance),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::invalid(
                    "diagnostics",
                    field,
                    format!("must be within [0, 1] (got {value})"),
                ));
            }
        }
        if self.operational_chance + self.warning_chance > 1.0 {
            return Err(ConfigError::invalid(
                "diagnostics",
                "warning_chance",
                "operational and warning chances must sum to at most 1",
            ));
        }
        if self.check_min_ms > self.check_max_ms {
            return Err(ConfigError::invalid(
                "diagnostics",
                "check_min_ms",
                format!(
                    "{} exceeds check_max_ms {}",
                    self.check_min_ms, self.check_max_ms
                ),
            ));
        }
        Ok(())
    }
}

/// Outcome of checking one subsystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubsystemCheck {
    /// One-based position in the sweep.
    pub position: usize,
    pub name: String,
    pub status: HealthStatus,
    /// Simulated time the check takes; the console waits this long.
    pub duration: Duration,
}

/// Lazily performed sweep, one check per `next()`.
#[derive(Debug)]
pub struct DiagnosticSweep<'a, R: Rng + ?Sized> {
    cfg: &'a DiagnosticsConfig,
    rng: &'a mut R,
    next_index: usize,
}

impl<'a, R: Rng + ?Sized> DiagnosticSweep<'a, R> {
    pub fn new(cfg: &'a DiagnosticsConfig, rng: &'a mut R) -> Self {
        Self {
            cfg,
            rng,
            next_index: 0,
        }
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.cfg.subsystems.len()
    }
}

impl<R: Rng + ?Sized> Iterator for DiagnosticSweep<'_, R> {
    type Item = SubsystemCheck;

    fn next(&mut self) -> Option<Self::Item> {
        let name = self.cfg.subsystems.get(self.next_index)?.clone();
        self.next_index += 1;
        let status = draw_status(self.cfg, self.rng);
        let millis = if self.cfg.check_max_ms > self.cfg.check_min_ms {
            self.rng
                .gen_range(self.cfg.check_min_ms..=self.cfg.check_max_ms)
        } else {
            self.cfg.check_min_ms
        };
        log::trace!(target: "aurora::diagnostics", "{name}: {status}");
        Some(SubsystemCheck {
            position: self.next_index,
            name,
            status,
            duration: Duration::from_millis(millis),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.cfg.subsystems.len().saturating_sub(self.next_index);
        (left, Some(left))
    }
}

fn draw_status<R: Rng + ?Sized>(cfg: &DiagnosticsConfig, rng: &mut R) -> HealthStatus {
    let roll = rng.r#gen::<f64>();
    if roll < cfg.operational_chance {
        HealthStatus::Operational
    } else if roll < cfg.operational_chance + cfg.warning_chance {
        HealthStatus::Warning
    } else {
        HealthStatus::Critical
    }
}

/// Completed sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticReport {
    pub checks: Vec<SubsystemCheck>,
}

impl DiagnosticReport {
    /// Sum of the simulated check durations.
    #[must_use]
    pub fn total_duration(&self) -> Duration {
        self.checks.iter().map(|check| check.duration).sum()
    }

    /// Names with `status`, sorted alphabetically.
    #[must_use]
    pub fn with_status(&self, status: HealthStatus) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .checks
            .iter()
            .filter(|check| check.status == status)
            .map(|check| check.name.as_str())
            .collect();
        names.sort_unstable();
        names
    }

    #[must_use]
    pub fn count(&self, status: HealthStatus) -> usize {
        self.checks
            .iter()
            .filter(|check| check.status == status)
            .count()
    }

    /// Most severe status seen, `None` for an empty report.
    #[must_use]
    pub fn worst(&self) -> Option<HealthStatus> {
        self.checks.iter().map(|check| check.status).max()
    }

    /// Width of the longest subsystem name, for column alignment.
    #[must_use]
    pub fn name_width(&self) -> usize {
        self.checks
            .iter()
            .map(|check| check.name.chars().count())
            .max()
            .unwrap_or(0)
    }
}

impl FromIterator<SubsystemCheck> for DiagnosticReport {
    fn from_iter<I: IntoIterator<Item = SubsystemCheck>>(iter: I) -> Self {
        Self {
            checks: iter.into_iter().collect(),
        }
    }
}

/// Check every configured subsystem in order.
pub fn run_sweep<R: Rng + ?Sized>(cfg: &DiagnosticsConfig, rng: &mut R) -> DiagnosticReport {
    let report: DiagnosticReport = DiagnosticSweep::new(cfg, rng).collect();
    log::debug!(
        target: "aurora::diagnostics",
        "sweep finished: {} critical, {} warning, {} operational",
        report.count(HealthStatus::Critical),
        report.count(HealthStatus::Warning),
        report.count(HealthStatus::Operational)
    );
    report
}
