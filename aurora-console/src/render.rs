//! Terminal rendering of panels, banners and reports.

use aurora_core::numbers::{group_thousands, trunc_f64_to_i64};
use aurora_core::{
    DiagnosticReport, FlightEvent, HealthStatus, LogEntry, Reading, StatusReport, VitalStatus,
    VitalsSnapshot,
};
use colored::{ColoredString, Colorize};
use std::io::{self, Write};

pub const GAUGE_WIDTH: usize = 20;

/// Fixed-width bar with `filled` cells of `full` and the rest `empty`.
#[must_use]
pub fn gauge(filled: usize, width: usize, full: char, empty: char) -> String {
    let filled = filled.min(width);
    let mut bar = String::with_capacity(width + 2);
    bar.push('[');
    bar.extend(std::iter::repeat_n(full, filled));
    bar.extend(std::iter::repeat_n(empty, width - filled));
    bar.push(']');
    bar
}

fn whole(value: f64) -> String {
    group_thousands(trunc_f64_to_i64(value))
}

pub fn status_panel<W: Write>(out: &mut W, report: &StatusReport) -> io::Result<()> {
    let rule = "=".repeat(55);
    writeln!(out)?;
    writeln!(out, "{}", rule.cyan())?;
    writeln!(
        out,
        "{}",
        "========= COMMAND PANEL - AURORA I =========".bright_cyan().bold()
    )?;
    writeln!(out, "{}", rule.cyan())?;

    let fuel_bar = gauge(report.fuel_cells(GAUGE_WIDTH), GAUGE_WIDTH, '#', '-');
    let fuel_bar = if report.fuel_pct < 20.0 {
        fuel_bar.red()
    } else {
        fuel_bar.green()
    };
    writeln!(
        out,
        " Fuel        {fuel_bar} : {:.2}% ({} UAC)",
        report.fuel_pct,
        whole(report.fuel_uac)
    )?;
    let progress_bar = gauge(report.progress_cells(GAUGE_WIDTH), GAUGE_WIDTH, '>', '.');
    writeln!(
        out,
        " Progress    {} : {:.1}% ({} / {} km)",
        progress_bar.blue(),
        report.progress_pct,
        whole(report.travelled_km),
        whole(report.total_km)
    )?;
    writeln!(
        out,
        " Current speed              : {} km/h",
        whole(report.speed_kmh)
    )?;
    writeln!(
        out,
        " {:<27}: {} km",
        format!("Distance to {}", report.destination),
        whole(report.distance_remaining_km)
    )?;
    let eta = report.eta.map_or_else(
        || "N/A (stopped or arrived)".to_string(),
        |eta| format!("{} days, {} hours", eta.days, eta.hours),
    );
    writeln!(out, " ETA (estimate)             : {eta}")?;
    if report.eco_mode {
        writeln!(
            out,
            " Economy mode               : {} (Max: {} km/h)",
            "ENABLED".green(),
            whole(report.eco_cap_kmh)
        )?;
    } else {
        writeln!(out, " Economy mode               : DISABLED")?;
    }
    let voyage = if report.in_transit {
        "IN PROGRESS".green()
    } else {
        "COMPLETED / INTERRUPTED".yellow()
    };
    writeln!(out, " Voyage status              : {voyage}")?;
    if report.out_of_fuel {
        writeln!(out, "{}", " !!! ALERT: OUT OF FUEL !!!".red().bold())?;
    }
    writeln!(out, "{}", rule.cyan())
}

pub fn log_entries<W: Write>(out: &mut W, entries: &[LogEntry]) -> io::Result<()> {
    for entry in entries {
        writeln!(out, "{} {}", "LOG:".dimmed(), entry.message)?;
    }
    Ok(())
}

pub fn event_banner<W: Write>(out: &mut W, event: &FlightEvent) -> io::Result<()> {
    let rule = "+".repeat(35);
    writeln!(out)?;
    writeln!(out, "{}", rule.yellow())?;
    writeln!(out, "    {}", "!!! ATTENTION: EVENT !!!".yellow().bold())?;
    writeln!(out, "    {event}")?;
    writeln!(out, "{}", rule.yellow())
}

pub fn panel_deactivated<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "=".repeat(55))?;
    writeln!(
        out,
        "{}",
        "=========== COMMAND PANEL DEACTIVATED ===========".bright_cyan()
    )
}

fn health_color(status: HealthStatus, text: &str) -> ColoredString {
    match status {
        HealthStatus::Operational => text.green(),
        HealthStatus::Warning => text.yellow(),
        HealthStatus::Critical => text.red().bold(),
    }
}

fn group_heading(status: HealthStatus) -> (&'static str, &'static str) {
    match status {
        HealthStatus::Critical => (
            "--- CRITICAL STATUS (Immediate action!) ---",
            "No system in critical state.",
        ),
        HealthStatus::Warning => (
            "--- WARNING STATUS (Monitor/Maintain) ---",
            "No system in warning state.",
        ),
        HealthStatus::Operational => (
            "--- OPERATIONAL STATUS ---",
            "No operational system reported (check diagnostics).",
        ),
    }
}

/// Grouped status panel printed after a sweep.
pub fn diagnostic_panel<W: Write>(out: &mut W, report: &DiagnosticReport) -> io::Result<()> {
    writeln!(out)?;
    writeln!(
        out,
        "{}",
        "--- SPACECRAFT STATUS CONTROL PANEL ---".bright_cyan().bold()
    )?;
    if report.checks.is_empty() {
        return writeln!(out, "No diagnostic data available.");
    }
    let width = report.name_width();
    for status in HealthStatus::REPORT_ORDER {
        let (heading, none) = group_heading(status);
        writeln!(out)?;
        writeln!(out, "{}", health_color(status, heading))?;
        let names = report.with_status(status);
        if names.is_empty() {
            writeln!(out, "{none}")?;
        }
        for name in names {
            writeln!(
                out,
                "{} {name:<width$} : {}",
                health_color(status, status.indicator()),
                health_color(status, status.label())
            )?;
        }
    }
    writeln!(out, "{}", "-".repeat(49))
}

fn vital_color(status: VitalStatus, text: &str) -> ColoredString {
    match status {
        VitalStatus::Normal => text.green(),
        VitalStatus::Warning => text.yellow(),
        VitalStatus::Critical => text.red().bold(),
    }
}

fn reading_line<W: Write>(out: &mut W, indent: &str, reading: &Reading) -> io::Result<()> {
    let value = reading.unit.format(reading.value);
    writeln!(
        out,
        "{indent}{:<25}: {value} {:<4} [{}]",
        reading.parameter,
        reading.unit.symbol(),
        vital_color(reading.status, reading.status.label())
    )
}

pub fn alarm_banner<W: Write>(out: &mut W, alarms: &[String], timestamp: &str) -> io::Result<()> {
    let rule = "!".repeat(70);
    writeln!(out)?;
    writeln!(out, "{}", rule.red().bold())?;
    writeln!(
        out,
        "{}",
        format!("!!! CRITICAL ALARM - LIFE SUPPORT / MEDICAL ({timestamp}) !!!")
            .red()
            .bold()
    )?;
    for alarm in alarms {
        writeln!(out, "  - {alarm}")?;
    }
    writeln!(out, "{}", rule.red().bold())?;
    writeln!(out)
}

/// Full report printed when a check is not nominal.
pub fn vitals_report<W: Write>(
    out: &mut W,
    snapshot: &VitalsSnapshot,
    timestamp: &str,
) -> io::Result<()> {
    writeln!(out)?;
    writeln!(
        out,
        "--- Vital and Environmental Conditions Report [{timestamp}] ---"
    )?;
    writeln!(
        out,
        "OVERALL SHIP STATUS: {}",
        vital_color(snapshot.status, snapshot.status.label())
    )?;

    writeln!(out)?;
    writeln!(out, "-- Environmental Status (ECLSS) --")?;
    let mut environment: Vec<&Reading> = snapshot.environment.iter().collect();
    environment.sort_by(|a, b| a.parameter.cmp(&b.parameter));
    for reading in environment {
        reading_line(out, "  ", reading)?;
    }

    writeln!(out)?;
    writeln!(out, "-- Crew Vital Status --")?;
    for member in &snapshot.crew {
        writeln!(
            out,
            "  {}: [{}]",
            member.id,
            vital_color(member.status, member.status.label())
        )?;
        let mut abnormal: Vec<&Reading> = member.abnormal().collect();
        abnormal.sort_by(|a, b| a.parameter.cmp(&b.parameter));
        for reading in abnormal {
            reading_line(out, "    - ", reading)?;
        }
    }
    writeln!(out, "{}", "-".repeat(64))
}
