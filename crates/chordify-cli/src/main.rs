//! chordify - chord and progression analysis from MIDI note numbers
//!
//! Subcommands:
//! - `chordify chord <notes>...` - Name one chord
//! - `chordify names <notes>...` - Note names with octave
//! - `chordify progression <chord>...` - Analyze a sequence like `60,64,67 65,69,72`
//! - `chordify song <file>` - Analyze a song-structure JSON file
//! - `chordify config` - Show the effective configuration

use std::path::PathBuf;

use anyhow::{Context, Result};
use chordconf::ChordifyConfig;
use chordify::{ChordAnalyzer, CommandOracle};
use clap::{Parser, Subcommand};
use tracing::{debug, warn};

mod commands;
mod output;

#[derive(Parser)]
#[command(name = "chordify")]
#[command(about = "Name chords and analyze progressions from MIDI notes")]
#[command(version)]
struct Cli {
    /// Config file, replacing ./chordify.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Skip the external oracle and use the template engine only
    #[arg(long, global = true)]
    no_oracle: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Name the chord formed by a set of MIDI notes
    Chord {
        /// MIDI note numbers (0-127), any order
        #[arg(required = true, allow_negative_numbers = true)]
        notes: Vec<i64>,

        /// Flag results below this confidence (overrides config)
        #[arg(short, long, value_parser = commands::parse_threshold)]
        threshold: Option<f64>,

        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print note names with octave, e.g. C4
    Names {
        #[arg(required = true, allow_negative_numbers = true)]
        notes: Vec<i64>,
    },

    /// Analyze a chord progression
    Progression {
        /// Chords as comma-separated MIDI notes, e.g. 60,64,67
        #[arg(required = true)]
        chords: Vec<String>,

        #[arg(long)]
        json: bool,
    },

    /// Analyze every section of a song-structure JSON file
    Song {
        file: PathBuf,

        #[arg(long)]
        json: bool,
    },

    /// Print the effective configuration and where it came from
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let (config, sources) = ChordifyConfig::load_with_sources_from(cli.config.as_deref())
        .context("Failed to load configuration")?;

    init_tracing(&config.telemetry.log_level);
    debug!(files = ?sources.files, env = ?sources.env_overrides, "configuration loaded");

    let threshold = config.analysis.confidence_threshold;

    match cli.command {
        Commands::Config => {
            commands::show_config(&config, &sources)?;
        }
        Commands::Chord {
            notes,
            threshold: override_threshold,
            json,
        } => {
            install_analyzer(&config, cli.no_oracle);
            commands::chord(&notes, override_threshold.unwrap_or(threshold), json)?;
        }
        Commands::Names { notes } => {
            commands::names(&notes)?;
        }
        Commands::Progression { chords, json } => {
            install_analyzer(&config, cli.no_oracle);
            commands::progression(&chords, threshold, json)?;
        }
        Commands::Song { file, json } => {
            install_analyzer(&config, cli.no_oracle);
            commands::song(&file, threshold, json)?;
        }
    }

    Ok(())
}

/// Logs go to stderr so JSON on stdout stays parseable.
fn init_tracing(log_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_new(log_level)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Probe the configured oracle and make the result the process-wide analyzer.
fn install_analyzer(config: &ChordifyConfig, no_oracle: bool) {
    let analyzer = build_analyzer(config, no_oracle);
    debug!(oracle = analyzer.oracle_name(), "analyzer ready");
    if chordify::install_default(analyzer).is_err() {
        warn!("default analyzer already installed");
    }
}

fn build_analyzer(config: &ChordifyConfig, no_oracle: bool) -> ChordAnalyzer {
    let oracle = if no_oracle {
        None
    } else {
        config.oracle.active_command().map(|command| {
            CommandOracle::new(command)
                .with_args(&config.oracle.args)
                .with_timeout(config.oracle.timeout())
        })
    };
    ChordAnalyzer::detect(oracle)
}
