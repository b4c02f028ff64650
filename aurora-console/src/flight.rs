//! Interactive driver for the flight command panel.

use anyhow::Result;
use aurora_core::{
    Clock, Command, EndReason, FlightEvent, FlightPanel, ImpulseBatch, StatusReport,
};
use std::io::Write;
use std::time::Duration;
use tokio::io::AsyncBufRead;

use crate::console::{Console, Input, Wait};
use crate::render;

const PROMPT: &str = "Commands: [speed], 'impulso N', 'eco on/off', 'sair': ";

/// Whether the operator let a paused event go or interrupted it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Ack {
    Continue,
    Interrupted,
}

/// Flight session bound to one panel; prints log entries as they are appended.
pub struct FlightSession<'a, C: Clock> {
    panel: &'a mut FlightPanel<C>,
    pacing: Duration,
    printed: usize,
}

impl<'a, C: Clock> FlightSession<'a, C> {
    pub fn new(panel: &'a mut FlightPanel<C>, pacing: Duration) -> Self {
        Self {
            panel,
            pacing,
            printed: 0,
        }
    }

    /// Run until the voyage ends, then show the final status.
    ///
    /// Failures inside the loop end the session as a fault instead of propagating.
    pub async fn run<R, W>(mut self, console: &mut Console<R, W>) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        log::info!("flight session started");
        if let Err(err) = self.drive(console).await {
            log::error!("flight session fault: {err:#}");
            self.panel.end_session(&EndReason::Fault(format!("{err:#}")));
        }
        self.flush_log(console)?;
        render::panel_deactivated(console.out())?;
        render::status_panel(console.out(), &StatusReport::capture(self.panel))?;
        writeln!(console.out(), "{}", "=".repeat(55))?;
        log::info!(
            "flight session ended after {} step(s), {} log entries",
            self.panel.steps_taken(),
            self.panel.state().log.len()
        );
        Ok(())
    }

    async fn drive<R, W>(&mut self, console: &mut Console<R, W>) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        self.flush_log(console)?;
        while self.panel.in_transit() {
            render::status_panel(console.out(), &StatusReport::capture(self.panel))?;
            writeln!(
                console.out(),
                "\nNext update in {}s. Simulating {}h.",
                self.pacing.as_secs_f64(),
                self.panel.config().hours_per_tick
            )?;
            let line = match console.prompt(PROMPT).await? {
                Input::Line(line) => line,
                Input::Interrupted => {
                    writeln!(console.out())?;
                    self.panel.end_session(&EndReason::Interrupted);
                    break;
                }
                Input::Closed => {
                    writeln!(console.out())?;
                    self.panel.end_session(&EndReason::InputClosed);
                    break;
                }
            };

            let mut impulse_ran = false;
            let mut event = None;
            match Command::parse(&line) {
                Ok(Command::Exit) => self.panel.end_session(&EndReason::OperatorExit),
                Ok(Command::Eco(enabled)) => {
                    self.panel.set_eco_mode(enabled);
                    event = self.single_step();
                }
                Ok(Command::Impulse(steps)) => {
                    impulse_ran = true;
                    self.impulse(console, steps).await?;
                }
                Ok(Command::Speed(text)) => {
                    if self.panel.request_speed(&text).is_ok() {
                        event = self.single_step();
                    }
                }
                Ok(Command::Idle) => event = self.single_step(),
                Err(err) => self.panel.record_error(&err),
            }
            self.flush_log(console)?;

            if let Some(event) = event {
                if acknowledge(console, &event).await? == Ack::Interrupted {
                    self.panel.end_session(&EndReason::Interrupted);
                }
            } else if self.panel.in_transit()
                && !impulse_ran
                && console.sleep(self.pacing).await? == Wait::Interrupted
            {
                writeln!(console.out())?;
                self.panel.end_session(&EndReason::Interrupted);
            }
        }
        Ok(())
    }

    fn single_step(&mut self) -> Option<FlightEvent> {
        if self.panel.in_transit() {
            self.panel.tick().event
        } else {
            None
        }
    }

    async fn impulse<R, W>(&mut self, console: &mut Console<R, W>, steps: u32) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        writeln!(console.out(), "\n>>> Starting impulse of {steps} step(s)...")?;
        let mut batch = ImpulseBatch::new(steps);
        let mut interrupted = false;
        while let Some(outcome) = batch.advance(self.panel) {
            write!(console.out(), ".")?;
            console.out().flush()?;
            if outcome.event.is_some() || outcome.drifted || outcome.arrived {
                writeln!(console.out())?;
            }
            self.flush_log(console)?;
            if let Some(event) = outcome.event {
                if acknowledge(console, &event).await? == Ack::Interrupted {
                    interrupted = true;
                    break;
                }
                writeln!(console.out(), "... Resuming impulse ...")?;
            }
            // Steps never block, so give the Ctrl+C listener a turn.
            tokio::task::yield_now().await;
            if console.interrupted() {
                interrupted = true;
                break;
            }
        }
        let report = batch.report();
        if interrupted {
            writeln!(
                console.out(),
                "\n... Impulse interrupted after {} step(s).",
                report.completed
            )?;
            self.panel.end_session(&EndReason::Interrupted);
            return Ok(());
        }
        if report.ended_early {
            writeln!(
                console.out(),
                "\n... Impulse halted at step {}: voyage over.",
                report.completed + 1
            )?;
        }
        writeln!(
            console.out(),
            "\n>>> Impulse complete after {} step(s).",
            report.completed
        )?;
        Ok(())
    }

    fn flush_log<R, W>(&mut self, console: &mut Console<R, W>) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        let entries = self.panel.state().log.since(self.printed);
        render::log_entries(console.out(), entries)?;
        self.printed += entries.len();
        Ok(())
    }
}

async fn acknowledge<R, W>(console: &mut Console<R, W>, event: &FlightEvent) -> Result<Ack>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    render::event_banner(console.out(), event)?;
    match console.prompt("    Press Enter to continue...").await? {
        Input::Interrupted => {
            writeln!(console.out())?;
            Ok(Ack::Interrupted)
        }
        Input::Line(_) | Input::Closed => Ok(Ack::Continue),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::{CTRL_C, scripted};
    use aurora_core::{FixedClock, FlightConfig, SimRng, VoyageState};

    fn panel(cfg: FlightConfig) -> FlightPanel<FixedClock> {
        FlightPanel::with_clock(cfg, SimRng::seeded(3), FixedClock::default()).unwrap()
    }

    fn quiet() -> FlightConfig {
        FlightConfig {
            event_probability: 0.0,
            ..FlightConfig::default()
        }
    }

    async fn play(panel: &mut FlightPanel<FixedClock>, script: &str) -> String {
        let mut console = scripted(script);
        FlightSession::new(panel, Duration::ZERO)
            .run(&mut console)
            .await
            .unwrap();
        String::from_utf8(console.into_output()).unwrap()
    }

    #[tokio::test]
    async fn exit_command_ends_without_a_step() {
        let mut panel = panel(quiet());
        let out = play(&mut panel, "sair\n").await;
        assert_eq!(panel.steps_taken(), 0);
        assert!(!panel.in_transit());
        assert!(out.contains("LOG: Command panel activated."));
        assert!(out.contains("LOG: Command 'sair' received."));
        assert!(out.contains("COMMAND PANEL DEACTIVATED"));
        assert!(out.contains("COMPLETED / INTERRUPTED"));
    }

    #[tokio::test]
    async fn speed_and_idle_lines_each_take_one_step() {
        let mut panel = panel(quiet());
        let out = play(&mut panel, "90000\n\nabc\nimpulso 0\nsair\n").await;
        assert_eq!(panel.steps_taken(), 2);
        assert!((panel.state().speed_kmh - 80_000.0).abs() < f64::EPSILON);
        assert!(out.contains("LOG: Maneuver: speed adjusted to 80,000 km/h. Cost: 325.00 UAC."));
        assert!(out.contains("LOG: Error: speed 'abc' is invalid."));
        assert!(out.contains("LOG: Error: impulse count must be positive."));
    }

    #[tokio::test]
    async fn eco_commands_step_after_toggling() {
        let mut panel = panel(quiet());
        let out = play(&mut panel, "eco on\neco on\neco off\nsair\n").await;
        assert_eq!(panel.steps_taken(), 3);
        assert!(out.contains("LOG: Economy mode ENABLED."));
        assert!(out.contains("LOG: Economy mode already enabled."));
        assert!(out.contains("LOG: Economy mode DISABLED."));
        assert!(out.contains("(Max: 10,000 km/h)"));
    }

    #[tokio::test]
    async fn impulse_runs_to_arrival_and_reports_early_halt() {
        let cfg = FlightConfig {
            initial_distance_km: 10_000_000.0,
            ..quiet()
        };
        let mut panel = panel(cfg);
        let out = play(&mut panel, "impulso 5\n").await;
        assert_eq!(panel.steps_taken(), 3);
        assert!(out.contains(">>> Starting impulse of 5 step(s)..."));
        assert!(out.contains("Impulse halted at step 4: voyage over."));
        assert!(out.contains(">>> Impulse complete after 3 step(s)."));
        assert!(out.contains("LOG: ***** ARRIVAL AT MARS CONFIRMED! *****"));
    }

    #[tokio::test]
    async fn events_pause_for_acknowledgment() {
        let cfg = FlightConfig {
            event_probability: 1.0,
            ..FlightConfig::default()
        };
        let mut panel = panel(cfg);
        // one line acknowledges the event, then the operator leaves
        let out = play(&mut panel, "\n\nsair\n").await;
        assert_eq!(panel.steps_taken(), 1);
        assert!(out.contains("!!! ATTENTION: EVENT !!!"));
        assert!(out.contains("Press Enter to continue..."));
        assert!(out.contains("LOG: EVENT: "));
    }

    #[tokio::test]
    async fn closed_input_ends_the_session() {
        let mut panel = panel(quiet());
        let out = play(&mut panel, "").await;
        assert!(!panel.in_transit());
        assert!(panel.state().log.contains("Command input closed."));
        assert!(out.contains("COMMAND PANEL DEACTIVATED"));
    }

    #[tokio::test]
    async fn drifting_ship_keeps_the_session_open() {
        let cfg = quiet();
        let mut state = VoyageState::departure(&cfg);
        state.fuel_uac = 0.0;
        state.speed_kmh = 12_000.0;
        let mut panel =
            FlightPanel::resume(cfg, state, SimRng::seeded(3), FixedClock::default()).unwrap();
        let out = play(&mut panel, "\n\nsair\n").await;
        assert!(out.contains("LOG: Fuel exhausted. Ship drifting."));
        assert!(out.contains("!!! ALERT: OUT OF FUEL !!!"));
        assert!(panel.state().log.contains("Command 'sair' received."));
    }

    /// The session ended on Ctrl+C exactly once and still printed its final panel.
    fn assert_interrupted_once(panel: &FlightPanel<FixedClock>, out: &str) {
        assert!(!panel.in_transit());
        let entries = panel.state().log.since(0);
        let ends = entries
            .iter()
            .filter(|entry| entry.message == "Manual interrupt (Ctrl+C).")
            .count();
        assert_eq!(ends, 1);
        assert_eq!(out.matches("LOG: Manual interrupt (Ctrl+C).").count(), 1);
        let closed = out.find("COMMAND PANEL DEACTIVATED").unwrap();
        assert!(out[closed..].contains("COMPLETED / INTERRUPTED"));
    }

    #[tokio::test]
    async fn ctrl_c_at_the_prompt_ends_the_session() {
        let mut panel = panel(quiet());
        let out = play(&mut panel, &format!("{CTRL_C}sair\n")).await;
        assert_eq!(panel.steps_taken(), 0);
        assert!(!panel.state().log.contains("Command 'sair' received."));
        assert_interrupted_once(&panel, &out);
    }

    #[tokio::test]
    async fn ctrl_c_during_the_pacing_wait_ends_the_session() {
        let mut panel = panel(quiet());
        let out = play(&mut panel, &format!("\n{CTRL_C}\n\n")).await;
        assert_eq!(panel.steps_taken(), 1);
        assert_interrupted_once(&panel, &out);
    }

    #[tokio::test]
    async fn ctrl_c_at_an_event_pause_ends_the_session() {
        let cfg = FlightConfig {
            event_probability: 1.0,
            ..FlightConfig::default()
        };
        let mut panel = panel(cfg);
        let out = play(&mut panel, &format!("\n{CTRL_C}\n\n")).await;
        assert_eq!(panel.steps_taken(), 1);
        assert!(out.contains("Press Enter to continue..."));
        assert_interrupted_once(&panel, &out);
    }

    #[tokio::test]
    async fn ctrl_c_stops_a_long_impulse_between_steps() {
        // stationary: no step ever arrives or drifts, so only Ctrl+C ends it
        let cfg = FlightConfig {
            initial_speed_kmh: 0.0,
            ..quiet()
        };
        let mut panel = panel(cfg);
        let out = play(&mut panel, &format!("impulso 4000000000\n{CTRL_C}")).await;
        assert_eq!(panel.steps_taken(), 1);
        assert!(out.contains(">>> Starting impulse of 4000000000 step(s)..."));
        assert!(out.contains("... Impulse interrupted after 1 step(s)."));
        assert!(!out.contains("Impulse complete"));
        assert_interrupted_once(&panel, &out);
    }

    #[tokio::test]
    async fn ctrl_c_at_an_event_pause_inside_an_impulse() {
        let cfg = FlightConfig {
            event_probability: 1.0,
            ..FlightConfig::default()
        };
        let mut panel = panel(cfg);
        let out = play(&mut panel, &format!("impulso 10\n{CTRL_C}")).await;
        assert_eq!(panel.steps_taken(), 1);
        assert!(out.contains("... Impulse interrupted after 1 step(s)."));
        assert_interrupted_once(&panel, &out);
    }
}
