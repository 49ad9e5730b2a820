//! # antsw
//!
//! Antenna switch controller: claims the relay pins, applies the default
//! configuration and serves the operator console on stdin until `quit` or
//! a shutdown signal, then releases every pin.
//!
//! # Usage
//!
//! ```bash
//! # Run against the relay board with /etc/antsw/antsw.toml
//! antsw
//!
//! # No hardware, start in U/v Satcom
//! antsw --simulate --configuration uv-satcom
//!
//! # Walk every relay to check the wiring, verbose logging
//! antsw --identify --dwell-ms 500 -v
//!
//! # Print the configuration table as JSON
//! antsw --dump-table
//! ```

use antsw::console::{Command, Console, Flow};
use antsw::{ConfigurationEngine, ConfigurationTable, DriverRegistry};
use antsw_common::config::StationConfig;
use antsw_common::consts::{DEFAULT_CONFIG_PATH, DEFAULT_IDENTIFY_DWELL_MS};
use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;
use tracing::{Level, error, info, warn};
use tracing_subscriber::EnvFilter;

/// How often the main loop checks the shutdown flag.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Antenna switch relay controller
#[derive(Parser, Debug)]
#[command(name = "antsw")]
#[command(author = "WB1FJ")]
#[command(version)]
#[command(about = "Antenna switch relay configuration engine")]
#[command(long_about = None)]
struct Args {
    /// Path to the station configuration file. Defaults apply if it is missing.
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Force the simulation driver
    #[arg(short = 's', long)]
    simulate: bool,

    /// Driver to load, overriding the configuration file
    #[arg(short, long)]
    driver: Option<String>,

    /// Configuration to activate after startup (key or label)
    #[arg(long, value_name = "CONFIG")]
    configuration: Option<String>,

    /// Run the relay identification walk after startup
    #[arg(long)]
    identify: bool,

    /// Pause between identification steps, in milliseconds
    #[arg(long, default_value_t = DEFAULT_IDENTIFY_DWELL_MS)]
    dwell_ms: u64,

    /// Print the configuration table as JSON and exit
    #[arg(long)]
    dump_table: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long)]
    json: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Err(e) = run() {
        error!("antsw failed: {}", e);
        std::process::exit(1);
    }
    Ok(())
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = StationConfig::load_or_default(&args.config);
    let base_level = match &config {
        Ok(config) => config.shared.log_level.into(),
        Err(_) => Level::INFO,
    };
    setup_tracing(&args, base_level);
    let config = config?;

    if args.dump_table {
        let table = ConfigurationTable::builtin()?;
        println!("{}", serde_json::to_string_pretty(&table)?);
        return Ok(());
    }

    info!(
        "{} v{} starting...",
        config.shared.service_name,
        env!("CARGO_PKG_VERSION")
    );

    let driver_name = if args.simulate {
        info!("Simulation mode enabled");
        "simulation".to_string()
    } else if let Some(name) = &args.driver {
        info!("Driver from CLI: {}", name);
        name.clone()
    } else {
        config.driver.name.clone()
    };

    // Installed before any pin is claimed so a signal at any point after
    // this still ends in `engine.shutdown()`.
    let running = Arc::new(AtomicBool::new(true));
    let flag = Arc::clone(&running);
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        flag.store(false, Ordering::SeqCst);
    })?;

    let registry = DriverRegistry::with_builtin();
    info!("Available drivers: {:?}", registry.list_drivers());
    let mut driver = registry.create_driver(&driver_name)?;
    driver.init(&config.driver)?;

    let mut engine =
        ConfigurationEngine::new(driver, &config.pins, ConfigurationTable::builtin()?)?;
    let mut console = Console::attach(
        &mut engine,
        io::stdout(),
        Duration::from_millis(args.dwell_ms),
    )?;

    apply_startup(
        &mut engine,
        &mut console,
        args.configuration.as_deref(),
        args.identify,
        &running,
    )?;
    if running.load(Ordering::SeqCst) {
        serve_console(&mut engine, &mut console, &running)?;
    }

    engine.shutdown();
    info!("antsw shutdown complete");
    Ok(())
}

/// Apply the command-line configuration and identify walk, skipping
/// whatever a shutdown signal has already overtaken.
fn apply_startup<W: Write>(
    engine: &mut ConfigurationEngine,
    console: &mut Console<W>,
    configuration: Option<&str>,
    identify: bool,
    running: &AtomicBool,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(name) = configuration {
        if !running.load(Ordering::SeqCst) {
            return Ok(());
        }
        engine.activate_named(name)?;
    }
    if identify && running.load(Ordering::SeqCst) {
        console.execute(engine, Command::Identify)?;
    }
    Ok(())
}

/// Dispatch console input until `quit` or a shutdown signal.
fn serve_console(
    engine: &mut ConfigurationEngine,
    console: &mut Console<io::Stdout>,
    running: &AtomicBool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut input = Some(spawn_input_reader()?);
    console.execute(engine, Command::Status)?;

    while running.load(Ordering::SeqCst) {
        let Some(rx) = &input else {
            std::thread::sleep(POLL_INTERVAL);
            continue;
        };
        match rx.recv_timeout(POLL_INTERVAL) {
            Ok(line) => {
                if console.handle_line(engine, &line)? == Flow::Quit {
                    info!("Quit requested from console");
                    break;
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                info!("Console input closed, running until shutdown signal");
                input = None;
            }
        }
    }
    Ok(())
}

/// Read stdin on its own thread so the main loop can watch the shutdown flag.
fn spawn_input_reader() -> io::Result<Receiver<String>> {
    let (tx, rx) = mpsc::channel();
    std::thread::Builder::new()
        .name("console-input".to_string())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                match line {
                    Ok(line) => {
                        if tx.send(line).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!("Console read failed: {}", e);
                        break;
                    }
                }
            }
        })?;
    Ok(rx)
}

/// Setup tracing subscriber. Logs go to stderr; stdout belongs to the console.
fn setup_tracing(args: &Args, base_level: Level) {
    let level = if args.verbose { Level::DEBUG } else { base_level };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use antsw::drivers::simulation::{SimulationDriver, SimulationProbe};
    use antsw_common::hal::config::PinMap;
    use antsw_common::relay::ConfigurationId;

    fn engine() -> (ConfigurationEngine, Console<Vec<u8>>, SimulationProbe) {
        let probe = SimulationProbe::default();
        let driver = Box::new(SimulationDriver::with_probe(probe.clone()));
        let mut engine = ConfigurationEngine::new(
            driver,
            &PinMap::default(),
            ConfigurationTable::builtin().unwrap(),
        )
        .unwrap();
        let console = Console::attach(&mut engine, Vec::new(), Duration::ZERO).unwrap();
        (engine, console, probe)
    }

    #[test]
    fn startup_actions_applied_while_running() {
        let (mut engine, mut console, _) = engine();
        let running = AtomicBool::new(true);

        apply_startup(&mut engine, &mut console, Some("uv-satcom"), true, &running).unwrap();
        assert_eq!(engine.active_configuration(), ConfigurationId::UvSatcom);
        assert!(!console.output().is_empty());
    }

    #[test]
    fn signal_before_startup_actions_skips_them() {
        let (mut engine, mut console, probe) = engine();
        let running = AtomicBool::new(false);
        probe.clear_writes();

        apply_startup(&mut engine, &mut console, Some("uv-satcom"), true, &running).unwrap();
        assert_eq!(engine.active_configuration(), ConfigurationId::LocalRepeater);
        assert_eq!(probe.write_count(), 0);
        assert!(console.output().is_empty());

        // The caller still releases everything.
        engine.shutdown();
        assert!(probe.claimed_pins().is_empty());
    }
}
