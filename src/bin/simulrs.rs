// Simulrs CLI
// Chord filter for interception-style pipelines: raw input_event records on
// stdin, filtered records on stdout, logs on stderr.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use log::{error, info};

use simulrs_core::config::{ChordConfig, ChordOverrides, ConfigError};
use simulrs_core::pipeline;
use simulrs_core::{EventReader, EventWriter, FaultHandler};

/// Press source keys together to get a different key
#[derive(Parser, Debug)]
#[command(name = "simulrs")]
#[command(version)]
#[command(about = "Turn simultaneously pressed keys into a single key", long_about = None)]
struct Args {
    /// TOML configuration file (default: ~/.config/simulrs/config.toml if present)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Source key, by name or code (use 2 or 3 times)
    #[arg(short, long = "source", value_name = "KEY")]
    sources: Vec<String>,

    /// Target key, by name or code
    #[arg(short, long = "target", value_name = "KEY")]
    targets: Vec<String>,

    /// Simultaneity threshold in milliseconds
    #[arg(long, value_name = "MS")]
    threshold_ms: Option<u64>,

    /// Pause after deferred presses in microseconds
    #[arg(long, value_name = "US")]
    settle_us: Option<u64>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Validate config and exit
    #[arg(long)]
    check_config: bool,
}

impl Args {
    fn overrides(&self) -> ChordOverrides {
        ChordOverrides {
            sources: self.sources.clone(),
            targets: self.targets.clone(),
            threshold_ms: self.threshold_ms,
            settle_us: self.settle_us,
        }
    }
}

/// stdout carries events, so everything human-readable goes to stderr.
fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .target(env_logger::Target::Stderr)
        .init();
}

/// CLI > config file > built-in defaults
fn load_config(args: &Args) -> Result<ChordConfig, ConfigError> {
    let mut config = match &args.config {
        Some(path) => ChordConfig::from_toml_path(path)?,
        None => ChordConfig::load_default()?,
    };
    config.apply_overrides(&args.overrides())?;
    Ok(config)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = load_config(&args)?;

    if args.check_config {
        let table = config.validate()?;
        println!(
            "Configuration is valid: {} source keys -> {}",
            table.len(),
            table.target()
        );
        return Ok(());
    }

    let sink = Arc::new(EventWriter::new(io::stdout(), config.settle_delay));

    // A timer that cannot write leaves the downstream stream corrupt; stop here.
    let on_fault: FaultHandler = Arc::new(|e| {
        error!("Timer emission failed, exiting: {}", e);
        std::process::exit(1);
    });

    let mut engine = pipeline::build_engine(&config, sink, on_fault)?;
    let mut reader = EventReader::new(io::stdin().lock());

    let count = pipeline::run(&mut reader, &mut engine)?;
    info!("Input closed after {} records", count);
    Ok(())
}
