//! Periodic vital and environmental monitoring.

use anyhow::Result;
use aurora_core::flight::TIMESTAMP_FORMAT;
use aurora_core::{Clock, SimRng, VitalsConfig, check_conditions};
use colored::Colorize;
use std::io::Write;
use std::time::Duration;
use tokio::io::AsyncBufRead;

use crate::console::{Console, Wait};
use crate::render;

/// How the monitor is paced and when it stops on its own.
#[derive(Debug, Clone, Copy)]
pub struct MonitorSchedule {
    pub interval: Duration,
    /// Stop after this many checks; `None` runs until interrupted.
    pub max_checks: Option<u32>,
}

/// Check conditions every `schedule.interval` until Ctrl+C. Returns the number of checks run.
pub async fn run_monitor<R, W, C>(
    console: &mut Console<R, W>,
    cfg: &VitalsConfig,
    rng: &mut SimRng,
    schedule: MonitorSchedule,
    clock: &C,
) -> Result<u32>
where
    R: AsyncBufRead + Unpin,
    W: Write,
    C: Clock,
{
    let interval_secs = schedule.interval.as_secs_f64();
    writeln!(
        console.out(),
        "\n{}",
        format!("=== STARTING PERIODIC MONITORING (Interval: {interval_secs}s) ===")
            .bright_cyan()
            .bold()
    )?;
    writeln!(console.out(), "Press Ctrl+C to stop monitoring.")?;

    let mut checks = 0u32;
    loop {
        writeln!(
            console.out(),
            "\n[{}] Running check...",
            clock.now().format("%H:%M:%S")
        )?;
        let snapshot = check_conditions(cfg, rng);
        checks += 1;
        let stamp = clock.now().format(TIMESTAMP_FORMAT).to_string();
        if snapshot.has_alarms() {
            log::warn!("{} critical vital alarm(s)", snapshot.alarms.len());
            render::alarm_banner(console.out(), &snapshot.alarms, &stamp)?;
        }
        if snapshot.is_nominal() {
            writeln!(
                console.out(),
                "[{}] Overall status: {}. Conditions nominal.",
                clock.now().format("%H:%M:%S"),
                "NORMAL".green()
            )?;
        } else {
            render::vitals_report(console.out(), &snapshot, &stamp)?;
        }

        if schedule.max_checks.is_some_and(|max| checks >= max) {
            writeln!(console.out(), "\n=== PERIODIC MONITORING COMPLETE ===")?;
            break;
        }
        writeln!(console.out(), "Next check in {interval_secs} seconds...")?;
        if console.sleep(schedule.interval).await? == Wait::Interrupted {
            writeln!(
                console.out(),
                "\n\n=== PERIODIC MONITORING STOPPED BY OPERATOR ==="
            )?;
            break;
        }
    }
    log::info!("vitals monitor ran {checks} check(s)");
    Ok(checks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::scripted;
    use aurora_core::{FixedClock, StreamDomain};

    fn schedule(max: u32) -> MonitorSchedule {
        MonitorSchedule {
            interval: Duration::from_secs(20),
            max_checks: Some(max),
        }
    }

    #[tokio::test]
    async fn stops_after_the_configured_number_of_checks() {
        let mut console = scripted("");
        let mut rng = SimRng::for_domain(5, StreamDomain::Vitals);
        let checks = run_monitor(
            &mut console,
            &VitalsConfig::default(),
            &mut rng,
            schedule(3),
            &FixedClock::default(),
        )
        .await
        .unwrap();
        let out = String::from_utf8(console.into_output()).unwrap();
        assert_eq!(checks, 3);
        assert_eq!(out.matches("[00:00:00] Running check...").count(), 3);
        assert_eq!(out.matches("Next check in 20 seconds...").count(), 2);
        assert!(out.contains("PERIODIC MONITORING COMPLETE"));
    }

    #[tokio::test]
    async fn forced_anomalies_print_the_alarm_and_full_report() {
        let cfg = VitalsConfig {
            anomaly_chance: 1.0,
            anomaly_warning_share: 0.0,
            ..VitalsConfig::default()
        };
        let mut console = scripted("");
        let mut rng = SimRng::for_domain(5, StreamDomain::Vitals);
        run_monitor(&mut console, &cfg, &mut rng, schedule(1), &FixedClock::default())
            .await
            .unwrap();
        let out = String::from_utf8(console.into_output()).unwrap();
        assert!(out.contains("!!! CRITICAL ALARM - LIFE SUPPORT / MEDICAL (01/01/30 00:00:00) !!!"));
        assert!(out.contains("OVERALL SHIP STATUS: CRITICAL"));
        assert!(out.contains("-- Crew Vital Status --"));
        assert!(out.contains("Astronaut_07: [CRITICAL]"));
        assert!(!out.contains("Conditions nominal."));
    }

    #[tokio::test]
    async fn quiet_ship_prints_one_normal_line() {
        let cfg = VitalsConfig {
            anomaly_chance: 0.0,
            ..VitalsConfig::default()
        };
        let nominal = (0..50u64).find_map(|seed| {
            let mut rng = SimRng::for_domain(seed, StreamDomain::Vitals);
            check_conditions(&cfg, &mut rng).is_nominal().then_some(seed)
        });
        let Some(seed) = nominal else {
            return;
        };
        let mut console = scripted("");
        let mut rng = SimRng::for_domain(seed, StreamDomain::Vitals);
        run_monitor(&mut console, &cfg, &mut rng, schedule(1), &FixedClock::default())
            .await
            .unwrap();
        let out = String::from_utf8(console.into_output()).unwrap();
        assert!(out.contains("Overall status: NORMAL. Conditions nominal."));
        assert!(!out.contains("OVERALL SHIP STATUS"));
    }

    #[tokio::test]
    async fn ctrl_c_stops_open_ended_monitoring() {
        let open_ended = MonitorSchedule {
            interval: Duration::from_secs(20),
            max_checks: None,
        };
        let mut console = scripted("");
        console.press_ctrl_c();
        let mut rng = SimRng::for_domain(5, StreamDomain::Vitals);
        let checks = run_monitor(
            &mut console,
            &VitalsConfig::default(),
            &mut rng,
            open_ended,
            &FixedClock::default(),
        )
        .await
        .unwrap();
        let out = String::from_utf8(console.into_output()).unwrap();
        assert_eq!(checks, 1);
        assert!(out.contains("Next check in 20 seconds..."));
        assert!(out.contains("=== PERIODIC MONITORING STOPPED BY OPERATOR ==="));
        assert!(!out.contains("PERIODIC MONITORING COMPLETE"));
    }
}
