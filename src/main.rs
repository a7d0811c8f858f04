//! Exercise form analysis over newline-delimited JSON pose messages.
//!
//! Reads `pose` / `setExercise` messages (one JSON object per line) from stdin
//! or a file and writes one `result` message per pose to stdout.

use anyhow::{Context, Result};
use clap::Parser;
use exercise_form_analysis::{
    config::{Config, EXAMPLE_CONFIG},
    engine::PoseEngine,
    protocol::InboundMessage,
};
use log::{info, warn};
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (YAML format)
    #[arg(short = 'C', long)]
    config: Option<PathBuf>,

    /// Exercise catalogue file (YAML), overrides the configuration
    #[arg(long)]
    catalogue: Option<PathBuf>,

    /// Exercise to start with
    #[arg(short, long)]
    exercise: Option<String>,

    /// Smoothing filter (none, one_euro, one_euro:<min_cutoff>:<beta>:<d_cutoff>)
    #[arg(short, long)]
    filter: Option<String>,

    /// Read messages from this file instead of stdin
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// List the exercises in the catalogue and exit
    #[arg(long)]
    list_exercises: bool,

    /// Print an example configuration file and exit
    #[arg(long)]
    print_config: bool,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logger
    if args.debug {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("debug"));
    } else {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    }

    if args.print_config {
        print!("{EXAMPLE_CONFIG}");
        return Ok(());
    }

    // Load configuration if provided
    let mut config = match &args.config {
        Some(path) => {
            info!("Loading configuration from: {}", path.display());
            match Config::from_file(path) {
                Ok(cfg) => cfg,
                Err(e) => {
                    warn!("Failed to load config file: {}. Using defaults.", e);
                    Config::default()
                }
            }
        }
        None => Config::default(),
    };

    if let Some(path) = args.catalogue {
        config.catalogue = Some(path);
    }
    if let Some(exercise) = args.exercise {
        config.analysis.default_exercise = exercise;
    }
    if let Some(filter) = args.filter {
        config.filter.kind = filter;
    }
    config.validate().context("Invalid configuration")?;

    let catalogue = config.load_catalogue().context("Failed to load exercise catalogue")?;

    if args.list_exercises {
        for (id, definition) in &catalogue.exercises {
            let reps = if definition.rep_logic.is_some() { "reps" } else { "form only" };
            println!("{id}\t{}\t{} rules\t{reps}", definition.name, definition.rules.len());
        }
        return Ok(());
    }

    let mut engine = PoseEngine::new(catalogue, &config)?;

    let reader: Box<dyn BufRead> = match &args.input {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("Cannot open {}", path.display()))?,
        )),
        None => Box::new(BufReader::new(io::stdin())),
    };
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    let mut frames = 0u64;
    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let message = match InboundMessage::from_json(&line) {
            Ok(message) => message,
            Err(e) => {
                warn!("Skipping line {}: {}", line_no + 1, e);
                continue;
            }
        };

        if let Some(result) = engine.handle(message) {
            writeln!(out, "{}", result.to_json()?)?;
            frames += 1;
        }
    }
    out.flush()?;

    info!("Processed {} frames", frames);

    Ok(())
}
