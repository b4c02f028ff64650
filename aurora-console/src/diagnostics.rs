//! Ship-wide diagnostic sweep with live progress.

use anyhow::Result;
use aurora_core::{DiagnosticReport, DiagnosticSweep, DiagnosticsConfig, HealthStatus, SimRng};
use colored::Colorize;
use std::io::Write;
use tokio::io::AsyncBufRead;

use crate::console::{Console, Wait};
use crate::render;

/// Run one sweep, pacing each check by its simulated duration.
///
/// Returns `None` when the operator interrupts before the sweep completes.
pub async fn run_diagnostics<R, W>(
    console: &mut Console<R, W>,
    cfg: &DiagnosticsConfig,
    rng: &mut SimRng,
) -> Result<Option<DiagnosticReport>>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    writeln!(
        console.out(),
        "\n{}",
        "--- STARTING AURORA I GENERAL DIAGNOSTIC ---".bright_cyan().bold()
    )?;
    let sweep = DiagnosticSweep::new(cfg, rng);
    let total = sweep.total();
    let mut checks = Vec::with_capacity(total);
    for check in sweep {
        let progress = format!("[{}/{total}]", check.position);
        write!(console.out(), "{progress} Checking: {} ...", check.name)?;
        if console.sleep(check.duration).await? == Wait::Interrupted {
            writeln!(console.out(), "\n\nDiagnostic interrupted by operator.")?;
            log::warn!("diagnostic sweep interrupted after {} check(s)", checks.len());
            return Ok(None);
        }
        writeln!(
            console.out(),
            "\r{progress} Checked : {} - Status: {}{}",
            check.name,
            check.status,
            " ".repeat(10)
        )?;
        checks.push(check);
    }

    let report = DiagnosticReport { checks };
    let rule = "-".repeat(49);
    writeln!(console.out(), "{rule}")?;
    writeln!(
        console.out(),
        "Full diagnostic completed in {:.2} seconds.",
        report.total_duration().as_secs_f64()
    )?;
    writeln!(console.out(), "{rule}")?;
    render::diagnostic_panel(console.out(), &report)?;
    log::info!(
        "diagnostic sweep: {} critical, {} warning, {} operational",
        report.count(HealthStatus::Critical),
        report.count(HealthStatus::Warning),
        report.count(HealthStatus::Operational)
    );
    Ok(Some(report))
}
