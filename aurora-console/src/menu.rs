//! Main menu that routes the operator to each subsystem.

use anyhow::{Context, Result};
use aurora_core::flight::TIMESTAMP_FORMAT;
use aurora_core::{AuroraConfig, Clock, FlightPanel, SimRng, StreamDomain};
use clap::ValueEnum;
use colored::Colorize;
use std::io::Write;
use tokio::io::AsyncBufRead;

use crate::airlock::run_airlock;
use crate::console::{Console, Input};
use crate::diagnostics::run_diagnostics;
use crate::flight::FlightSession;
use crate::monitor::{MonitorSchedule, run_monitor};

/// Subsystem reachable from the menu or directly via `--module`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Module {
    /// Airlock pressurization cycle
    Airlock,
    /// Ship-wide systems diagnostic
    Diagnostics,
    /// Continuous vital and environmental monitoring
    Monitor,
    /// Interactive flight command panel
    Flight,
}

impl Module {
    fn from_choice(choice: &str) -> Option<Self> {
        match choice {
            "1" => Some(Self::Airlock),
            "2" => Some(Self::Diagnostics),
            "3" => Some(Self::Monitor),
            "4" => Some(Self::Flight),
            _ => None,
        }
    }

    const fn number(self) -> u8 {
        match self {
            Self::Airlock => 1,
            Self::Diagnostics => 2,
            Self::Monitor => 3,
            Self::Flight => 4,
        }
    }

    const fn title(self) -> &'static str {
        match self {
            Self::Airlock => "Airlock Pressure Control",
            Self::Diagnostics => "Ship-Wide Systems Diagnostic",
            Self::Monitor => "Vital and Environmental Monitoring",
            Self::Flight => "Flight Command Panel",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Shutdown,
}

/// Ship-wide state that outlives a single subsystem visit.
pub struct App<C: Clock> {
    config: AuroraConfig,
    seed: u64,
    flight_sessions: u32,
    diagnostics_rng: SimRng,
    vitals_rng: SimRng,
    monitor_checks: Option<u32>,
    clock: C,
}

impl<C: Clock + Clone> App<C> {
    pub fn new(config: AuroraConfig, seed: u64, clock: C) -> Self {
        Self {
            config,
            seed,
            flight_sessions: 0,
            diagnostics_rng: SimRng::for_domain(seed, StreamDomain::Diagnostics),
            vitals_rng: SimRng::for_domain(seed, StreamDomain::Vitals),
            monitor_checks: None,
            clock,
        }
    }

    /// Stop the monitor after `checks` checks instead of waiting for Ctrl+C.
    #[must_use]
    pub const fn with_monitor_checks(mut self, checks: Option<u32>) -> Self {
        self.monitor_checks = checks;
        self
    }

    /// Menu loop from the startup banner to the shutdown banner.
    pub async fn run_menu<R, W>(&mut self, console: &mut Console<R, W>) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        self.banner(console.out(), "ACTIVATED")?;
        log::info!("main control system activated (seed {})", self.seed);
        let outcome = self.menu_loop(console).await;
        if let Err(err) = &outcome {
            log::error!("main control system fault: {err:#}");
            let rule = "!".repeat(45);
            writeln!(console.out(), "\n{}", rule.red())?;
            writeln!(console.out(), "  UNEXPECTED ERROR IN MAIN SYSTEM: {err:#}")?;
            writeln!(console.out(), "  Restarting the system is recommended.")?;
            writeln!(console.out(), "{}", rule.red())?;
            writeln!(console.out(), "Shutting down due to unexpected error.")?;
        }
        writeln!(console.out())?;
        self.banner(console.out(), "DEACTIVATED")?;
        console.out().flush()?;
        outcome
    }

    async fn menu_loop<R, W>(&mut self, console: &mut Console<R, W>) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        loop {
            console.clear()?;
            main_menu(console.out())?;
            let flow = match console.prompt("Enter the option number: ").await? {
                Input::Line(choice) => self.dispatch(console, &choice).await?,
                Input::Interrupted => {
                    writeln!(
                        console.out(),
                        "\n\n{}",
                        "[ALERT] Manual interrupt (Ctrl+C) detected at the Main Menu.".yellow()
                    )?;
                    if confirm(console, "   Really shut down the system? (s/N): ").await? {
                        writeln!(console.out(), "Shutting down at operator request...")?;
                        Flow::Shutdown
                    } else {
                        writeln!(console.out(), "Returning to menu.")?;
                        Flow::Continue
                    }
                }
                Input::Closed => {
                    writeln!(console.out(), "\nCommand input closed. Shutting down.")?;
                    Flow::Shutdown
                }
            };
            if flow == Flow::Shutdown {
                return Ok(());
            }
        }
    }

    async fn dispatch<R, W>(&mut self, console: &mut Console<R, W>, choice: &str) -> Result<Flow>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        if choice == "0" {
            writeln!(console.out(), "\n>>> Command [0]: Shut Down Main System...")?;
            if confirm(
                console,
                "   Are you sure you want to shut down the main system? (s/N): ",
            )
            .await?
            {
                writeln!(
                    console.out(),
                    "\nShutting down the Aurora I Main Control System. Until next time, Chief Engineer!"
                )?;
                return Ok(Flow::Shutdown);
            }
            writeln!(console.out(), "   Shutdown cancelled.")?;
            return Ok(Flow::Continue);
        }

        let Some(module) = Module::from_choice(choice) else {
            writeln!(
                console.out(),
                "\n{} Option '{choice}' is invalid. Please choose a number from the menu.",
                "[ERROR]".red()
            )?;
            return Ok(Flow::Continue);
        };

        console.clear()?;
        writeln!(
            console.out(),
            "\n>>> Accessing Module [{}]: {}...",
            module.number(),
            module.title()
        )?;
        match module {
            Module::Airlock | Module::Diagnostics => {
                self.run_module(console, module).await?;
                writeln!(console.out(), "{}", "-".repeat(30))?;
                console
                    .prompt("Press Enter to return to the Main Menu...")
                    .await?;
            }
            Module::Monitor => {
                writeln!(console.out(), "   This module runs continuous checks.")?;
                writeln!(
                    console.out(),
                    "   To return to the Main Menu, stop monitoring with [Ctrl] + [C] at any time."
                )?;
                if let Input::Line(_) = console
                    .prompt("\n   Press Enter to start monitoring...")
                    .await?
                {
                    self.run_module(console, module).await?;
                    writeln!(
                        console.out(),
                        "\n[INFO] Continuous monitoring ended. Returning to the Main Menu."
                    )?;
                }
            }
            Module::Flight => {
                writeln!(console.out(), "   This module has its own interactive interface.")?;
                writeln!(
                    console.out(),
                    "   Type 'sair' inside the Command Panel to return to the Main Menu."
                )?;
                if let Input::Line(_) = console
                    .prompt("\n   Press Enter to open the Command Panel...")
                    .await?
                {
                    self.run_module(console, module).await?;
                    writeln!(
                        console.out(),
                        "\n[INFO] Command Panel closed. Returning to the Main Menu."
                    )?;
                }
            }
        }
        Ok(Flow::Continue)
    }

    /// Run one subsystem to completion.
    pub async fn run_module<R, W>(&mut self, console: &mut Console<R, W>, module: Module) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        match module {
            Module::Airlock => {
                if run_airlock(console, self.config.airlock).await? {
                    writeln!(console.out(), "\n[INFO] Pressurization cycle complete.")?;
                } else {
                    writeln!(
                        console.out(),
                        "\n{} Pressurization cycle was not completed (interrupted).",
                        "[ALERT]".yellow()
                    )?;
                }
            }
            Module::Diagnostics => {
                run_diagnostics(console, &self.config.diagnostics, &mut self.diagnostics_rng)
                    .await?;
                writeln!(console.out(), "\n[INFO] Diagnostic finished.")?;
            }
            Module::Monitor => {
                let schedule = MonitorSchedule {
                    interval: self.config.timing.monitor_interval(),
                    max_checks: self.monitor_checks,
                };
                run_monitor(
                    console,
                    &self.config.vitals,
                    &mut self.vitals_rng,
                    schedule,
                    &self.clock,
                )
                .await?;
            }
            Module::Flight => {
                let session = self.flight_sessions;
                self.flight_sessions = self.flight_sessions.wrapping_add(1);
                let rng = SimRng::for_domain(self.seed, StreamDomain::Flight { session });
                let mut panel =
                    FlightPanel::with_clock(self.config.flight.clone(), rng, self.clock.clone())
                        .context("invalid flight configuration")?;
                FlightSession::new(&mut panel, self.config.timing.tick_pacing())
                    .run(console)
                    .await?;
            }
        }
        Ok(())
    }

    fn banner<W: Write>(&self, out: &mut W, state: &str) -> Result<()> {
        let rule = "*".repeat(60);
        writeln!(out, "{}", rule.bright_cyan())?;
        writeln!(out, "      Aurora I Spacecraft Main Control System")?;
        writeln!(out, "{}", format!("{state:^60}").bold())?;
        let stamp = self.clock.now().format(TIMESTAMP_FORMAT).to_string();
        writeln!(out, "{stamp:^60}")?;
        writeln!(out, "{}", rule.bright_cyan())?;
        Ok(())
    }
}

fn main_menu<W: Write>(out: &mut W) -> Result<()> {
    let rule = "=".repeat(50);
    writeln!(out, "\n{}", rule.cyan())?;
    writeln!(
        out,
        "{}",
        "=== MAIN MENU - AURORA I SPACECRAFT ===".bright_cyan().bold()
    )?;
    writeln!(out, "{}", rule.cyan())?;
    writeln!(out, "Select the system you want to access:")?;
    for module in Module::value_variants() {
        writeln!(out, "  {}. {}", module.number(), module.title())?;
    }
    writeln!(out, "{}", "-".repeat(50))?;
    writeln!(out, "  0. Shut Down Main Control System")?;
    writeln!(out, "{}", rule.cyan())?;
    Ok(())
}

/// `true` only for an explicit `s` or `y`.
async fn confirm<R, W>(console: &mut Console<R, W>, question: &str) -> Result<bool>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    Ok(match console.prompt(question).await? {
        Input::Line(answer) => matches!(answer.to_lowercase().as_str(), "s" | "y"),
        Input::Interrupted | Input::Closed => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::{CTRL_C, scripted};
    use aurora_core::FixedClock;

    async fn session(script: &str) -> String {
        let mut app = App::new(AuroraConfig::default(), 11, FixedClock::default())
            .with_monitor_checks(Some(2));
        let mut console = scripted(script);
        app.run_menu(&mut console).await.unwrap();
        String::from_utf8(console.into_output()).unwrap()
    }

    #[tokio::test]
    async fn invalid_choice_and_cancelled_shutdown_return_to_menu() {
        let out = session("9\n0\nn\n0\ns\n").await;
        assert!(out.contains("Option '9' is invalid."));
        assert!(out.contains("Shutdown cancelled."));
        assert!(out.contains("Until next time, Chief Engineer!"));
        assert_eq!(out.matches("=== MAIN MENU - AURORA I SPACECRAFT ===").count(), 3);
        assert!(out.contains("ACTIVATED"));
        assert!(out.contains("DEACTIVATED"));
        assert!(out.contains("01/01/30 00:00:00"));
    }

    #[tokio::test]
    async fn end_of_input_shuts_down() {
        let out = session("").await;
        assert!(out.contains("Command input closed. Shutting down."));
        assert!(out.contains("DEACTIVATED"));
    }

    #[tokio::test]
    async fn diagnostics_and_airlock_pause_before_returning() {
        let out = session("2\n\n1\n\n0\ny\n").await;
        assert!(out.contains(">>> Accessing Module [2]: Ship-Wide Systems Diagnostic..."));
        assert!(out.contains("[INFO] Diagnostic finished."));
        assert!(out.contains(">>> Accessing Module [1]: Airlock Pressure Control..."));
        assert!(out.contains("[INFO] Pressurization cycle complete."));
        assert_eq!(out.matches("Press Enter to return to the Main Menu...").count(), 2);
    }

    #[tokio::test]
    async fn monitor_runs_its_bounded_checks() {
        let out = session("3\n\n0\ns\n").await;
        assert_eq!(out.matches("Running check...").count(), 2);
        assert!(out.contains("[INFO] Continuous monitoring ended."));
    }

    #[tokio::test]
    async fn flight_sessions_draw_fresh_streams() {
        let mut app = App::new(AuroraConfig::default(), 11, FixedClock::default());
        let mut console = scripted("4\n\nsair\n4\n\nsair\n0\ns\n");
        app.run_menu(&mut console).await.unwrap();
        let out = String::from_utf8(console.into_output()).unwrap();
        assert_eq!(app.flight_sessions, 2);
        assert_eq!(out.matches("COMMAND PANEL DEACTIVATED").count(), 2);
        assert_eq!(out.matches("[INFO] Command Panel closed.").count(), 2);
    }

    #[tokio::test]
    async fn ctrl_c_at_the_menu_asks_before_shutting_down() {
        let out = session(&format!("{CTRL_C}s\n")).await;
        assert!(out.contains("[ALERT] Manual interrupt (Ctrl+C) detected at the Main Menu."));
        assert!(out.contains("Really shut down the system? (s/N): "));
        assert!(out.contains("Shutting down at operator request..."));
        assert_eq!(out.matches("=== MAIN MENU - AURORA I SPACECRAFT ===").count(), 1);
    }

    #[tokio::test]
    async fn declined_ctrl_c_shutdown_returns_to_the_menu() {
        let out = session(&format!("{CTRL_C}n\n0\ns\n")).await;
        assert!(out.contains("Returning to menu."));
        assert!(out.contains("Until next time, Chief Engineer!"));
        assert_eq!(out.matches("=== MAIN MENU - AURORA I SPACECRAFT ===").count(), 2);
    }

    #[tokio::test]
    async fn ctrl_c_inside_a_module_returns_to_the_menu() {
        // interrupt the flight session at its first prompt, then leave
        let out = session(&format!("4\n\n{CTRL_C}0\ns\n")).await;
        assert!(out.contains("LOG: Manual interrupt (Ctrl+C)."));
        assert!(out.contains("COMMAND PANEL DEACTIVATED"));
        assert!(!out.contains("[ALERT] Manual interrupt (Ctrl+C) detected at the Main Menu."));
        assert!(out.contains("[INFO] Command Panel closed. Returning to the Main Menu."));
        assert!(out.contains("Until next time, Chief Engineer!"));
    }
}
