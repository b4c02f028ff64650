mod airlock;
mod console;
mod diagnostics;
mod flight;
mod menu;
mod monitor;
mod render;

use anyhow::{Context, Result};
use aurora_core::{AuroraConfig, SystemClock};
use clap::Parser;
use std::io::{IsTerminal, stdout};
use std::path::{Path, PathBuf};
use tokio::io::BufReader;

use console::{Console, Interrupts};
use menu::{App, Module};

#[derive(Debug, Parser)]
#[command(name = "aurora-console", version)]
#[command(about = "Aurora I spacecraft main control system simulator")]
struct Args {
    /// JSON configuration file; missing fields keep their defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for every random stream (random when omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Real seconds between flight simulation steps
    #[arg(long)]
    pace_secs: Option<f64>,

    /// Seconds between vital monitoring checks
    #[arg(long)]
    monitor_interval: Option<f64>,

    /// Use the fixed per-hour fuel consumption instead of the speed-proportional one
    #[arg(long)]
    fixed_consumption: bool,

    /// Run a single subsystem and exit instead of showing the menu
    #[arg(long, value_enum)]
    module: Option<Module>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Skip real-time waits
    #[arg(long, hide = true)]
    instant: bool,

    /// Stop the vital monitor after this many checks
    #[arg(long, hide = true)]
    monitor_checks: Option<u32>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = load_config(&args)?;
    let seed = args.seed.unwrap_or_else(rand::random);
    log::info!("starting with seed {seed}");

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start the async runtime")?;
    let outcome = runtime.block_on(run(&args, config, seed));
    // A pending stdin read must not block shutdown.
    runtime.shutdown_background();
    outcome
}

async fn run(args: &Args, config: AuroraConfig, seed: u64) -> Result<()> {
    let out = stdout();
    let terminal = out.is_terminal();
    if !terminal {
        colored::control::set_override(false);
    }
    let clear_screen = !args.instant && terminal;
    let interrupts = Interrupts::from_ctrl_c()?;
    let mut console = Console::new(BufReader::new(tokio::io::stdin()), out.lock(), interrupts)
        .instant(args.instant)
        .clear_screen(clear_screen);
    let mut app = App::new(config, seed, SystemClock).with_monitor_checks(args.monitor_checks);
    match args.module {
        Some(module) => app.run_module(&mut console, module).await,
        None => app.run_menu(&mut console).await,
    }
}

fn init_logging(verbose: bool) {
    let mut builder = env_logger::Builder::from_default_env();
    if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.format_timestamp(None).init();
}

/// Defaults, then the config file, then command-line overrides.
fn load_config(args: &Args) -> Result<AuroraConfig> {
    let mut config = match &args.config {
        Some(path) => read_config(path)?,
        None => AuroraConfig::default(),
    };
    if let Some(pace) = args.pace_secs {
        config.timing.tick_pacing_secs = pace;
    }
    if let Some(interval) = args.monitor_interval {
        config.timing.monitor_interval_secs = interval;
    }
    if args.fixed_consumption {
        config.flight = config.flight.with_fixed_consumption();
    }
    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn read_config(path: &Path) -> Result<AuroraConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    AuroraConfig::from_json(&text)
        .with_context(|| format!("failed to parse config file {}", path.display()))
}
