//! Airlock pressurization cycle rendered in place.

use anyhow::Result;
use aurora_core::{AirlockConfig, AirlockCycle, AirlockPhase};
use colored::Colorize;
use std::io::Write;
use tokio::io::AsyncBufRead;

use crate::console::{Console, Wait};

/// Run one full cycle. Returns `false` when the operator interrupts it.
pub async fn run_airlock<R, W>(console: &mut Console<R, W>, cfg: AirlockConfig) -> Result<bool>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut cycle = AirlockCycle::new(cfg)?;
    writeln!(
        console.out(),
        "\n{}",
        "--- AIRLOCK PRESSURE CONTROL MODULE ---".bright_cyan().bold()
    )?;
    writeln!(
        console.out(),
        "Starting cycle: {:.1} PSI -> {:.1} PSI -> {:.1} PSI",
        cfg.internal_psi,
        cfg.external_psi,
        cfg.internal_psi
    )?;
    writeln!(console.out(), "{}", "-".repeat(54))?;

    let mut phase = None;
    while let Some(frame) = cycle.next() {
        if phase != Some(frame.phase) {
            phase_header(console.out(), frame.phase, &cfg)?;
            phase = Some(frame.phase);
        }
        let psi = frame.pressure_psi;
        match frame.phase {
            AirlockPhase::Depressurizing => {
                write!(console.out(), "\r Pressure: {psi:.1} PSI... Depressurizing")?;
            }
            AirlockPhase::Repressurizing => {
                write!(console.out(), "\r Pressure: {psi:.1} PSI... Repressurizing ")?;
            }
            AirlockPhase::ExternalReached => {
                writeln!(console.out(), "\r Pressure: {psi:.1} PSI... External level reached.  ")?;
                writeln!(console.out(), "[PHASE 1] Depressurization complete.")?;
            }
            AirlockPhase::Holding => {}
            AirlockPhase::InternalReached => {
                writeln!(console.out(), "\r Pressure: {psi:.1} PSI... Internal level reached.   ")?;
                writeln!(console.out(), "[PHASE 3] Repressurization complete.")?;
            }
        }
        if console.sleep(frame.dwell(&cfg)).await? == Wait::Interrupted {
            writeln!(
                console.out(),
                "\n\n{}",
                "! WARNING: Pressurization cycle manually interrupted by operator!"
                    .red()
                    .bold()
            )?;
            writeln!(
                console.out(),
                "  Last recorded pressure: {:.1} PSI",
                cycle.last_pressure()
            )?;
            log::warn!("airlock cycle interrupted at {:.1} psi", cycle.last_pressure());
            return Ok(false);
        }
        if frame.phase == AirlockPhase::Holding {
            writeln!(console.out(), "[PHASE 2] Hold time complete.")?;
        }
    }

    writeln!(
        console.out(),
        "\n{}",
        "--- AIRLOCK PRESSURIZATION CYCLE COMPLETE ---".green().bold()
    )?;
    log::info!("airlock cycle complete");
    Ok(true)
}

fn phase_header<W: Write>(out: &mut W, phase: AirlockPhase, cfg: &AirlockConfig) -> Result<()> {
    match phase {
        AirlockPhase::Depressurizing => writeln!(out, "\n[PHASE 1] Starting depressurization...")?,
        AirlockPhase::Holding => {
            writeln!(
                out,
                "\n[PHASE 2] Holding pressure at {:.1} PSI for {:.1} seconds.",
                cfg.external_psi, cfg.hold_secs
            )?;
            writeln!(
                out,
                "          (Simulating extravehicular activity or vacuum interface)"
            )?;
        }
        AirlockPhase::Repressurizing => writeln!(out, "\n[PHASE 3] Starting repressurization...")?,
        AirlockPhase::ExternalReached | AirlockPhase::InternalReached => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::scripted;

    #[tokio::test]
    async fn default_cycle_walks_all_three_phases() {
        let mut console = scripted("");
        let completed = run_airlock(&mut console, AirlockConfig::default())
            .await
            .unwrap();
        let out = String::from_utf8(console.into_output()).unwrap();
        assert!(completed);
        assert!(out.contains("Starting cycle: 15.0 PSI -> 0.0 PSI -> 15.0 PSI"));
        assert!(out.contains("\r Pressure: 15.0 PSI... Depressurizing"));
        assert!(out.contains("\r Pressure: 0.0 PSI... External level reached."));
        assert!(out.contains("[PHASE 2] Holding pressure at 0.0 PSI for 10.0 seconds."));
        assert!(out.contains("\r Pressure: 14.0 PSI... Repressurizing"));
        assert!(out.contains("\r Pressure: 15.0 PSI... Internal level reached."));
        assert!(out.contains("AIRLOCK PRESSURIZATION CYCLE COMPLETE"));
        let p1 = out.find("[PHASE 1] Depressurization complete.").unwrap();
        let p2 = out.find("[PHASE 2] Hold time complete.").unwrap();
        let p3 = out.find("[PHASE 3] Repressurization complete.").unwrap();
        assert!(p1 < p2 && p2 < p3);
    }

    #[tokio::test]
    async fn equal_pressures_skip_the_pumping_phases() {
        let cfg = AirlockConfig {
            internal_psi: 5.0,
            external_psi: 5.0,
            ..AirlockConfig::default()
        };
        let mut console = scripted("");
        assert!(run_airlock(&mut console, cfg).await.unwrap());
        let out = String::from_utf8(console.into_output()).unwrap();
        assert!(!out.contains("Depressurizing"));
        assert!(!out.contains("Repressurizing"));
        assert!(out.contains("[PHASE 2] Hold time complete."));
    }

    #[tokio::test]
    async fn invalid_configuration_is_an_error() {
        let cfg = AirlockConfig {
            step_psi: 0.0,
            ..AirlockConfig::default()
        };
        let mut console = scripted("");
        assert!(run_airlock(&mut console, cfg).await.is_err());
    }

    #[tokio::test]
    async fn ctrl_c_aborts_the_cycle_and_reports_pressure() {
        let mut console = scripted("");
        console.press_ctrl_c();
        let completed = run_airlock(&mut console, AirlockConfig::default())
            .await
            .unwrap();
        let out = String::from_utf8(console.into_output()).unwrap();
        assert!(!completed);
        assert!(out.contains("! WARNING: Pressurization cycle manually interrupted by operator!"));
        assert!(out.contains("  Last recorded pressure: 15.0 PSI"));
        assert!(!out.contains("[PHASE 1] Depressurization complete."));
        assert!(!out.contains("AIRLOCK PRESSURIZATION CYCLE COMPLETE"));
    }
}
