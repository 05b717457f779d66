//! goreplay: replay and study Go game records.
//!
//! ## Usage
//!
//! - `goreplay info <file>` - Print the game-info header
//! - `goreplay replay [file]` - Start an interactive replay session on stdin
//! - `goreplay walk <file>` - Random navigation walk that checks board sync

use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use log::LevelFilter;
use simplelog::{ConfigBuilder, WriteLogger};

use goreplay::board::GoBoard;
use goreplay::config::{self, ResolvedConfig};
use goreplay::engine::Engine;
use goreplay::session::ReplaySession;
use goreplay::walk::random_walk;

/// goreplay: a Go game record viewer
#[derive(Parser)]
#[command(name = "goreplay")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file (defaults to ~/.goreplay/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level override (off, error, warn, info, debug, trace)
    #[arg(long, global = true)]
    log_level: Option<LevelFilter>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the game-info header of an SGF file
    Info { file: PathBuf },
    /// Start a replay session reading commands from stdin
    Replay { file: Option<PathBuf> },
    /// Navigate randomly and verify the board against a fresh replay after every step
    Walk {
        file: PathBuf,
        #[arg(long, default_value_t = 1000)]
        steps: usize,
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let (file_config, config) = load_config(&cli)?;
    init_logging(&config);
    config::warn_on_fallbacks(&file_config, &config);

    match cli.command {
        Commands::Info { file } => {
            let mut engine = Engine::new(GoBoard::default()).with_placeholder(config.unknown_placeholder.clone());
            engine
                .open(&file)
                .with_context(|| format!("cannot open {}", file.display()))?;
            if let Some(info) = engine.metadata() {
                println!("{info}");
                println!("Board size {0} x {0}", info.board_size);
                if let Some(name) = &info.game_name {
                    println!("Game: {name}");
                }
                if let Some(event) = &info.event {
                    println!("Event: {event}");
                }
            }
        }
        Commands::Replay { file } => {
            let mut session = ReplaySession::new(&config);
            if let Some(file) = file {
                session
                    .engine_mut()
                    .open(&file)
                    .with_context(|| format!("cannot open {}", file.display()))?;
            }
            session.run().context("replay session failed")?;
        }
        Commands::Walk { file, steps, seed } => {
            let mut engine = Engine::new(GoBoard::default());
            engine
                .open(&file)
                .with_context(|| format!("cannot open {}", file.display()))?;
            let seed = seed.unwrap_or_else(|| fastrand::u64(..));
            let mut rng = fastrand::Rng::with_seed(seed);
            log::info!("Random walk over {} with seed {seed}", file.display());

            match random_walk(&mut engine, &mut rng, steps) {
                Ok(report) => println!(
                    "ok: {} steps, {} moved, deepest move {} (seed {seed})",
                    report.steps, report.moves, report.deepest
                ),
                Err(e) => bail!("{e} (seed {seed})"),
            }
        }
    }
    Ok(())
}

fn load_config(cli: &Cli) -> Result<(config::ReplayConfig, ResolvedConfig)> {
    let file_config = match cli.config.clone().or_else(config::config_path) {
        Some(path) => config::load_config(&path)
            .with_context(|| format!("invalid config file {}", path.display()))?,
        None => config::ReplayConfig::default(),
    };
    let resolved = config::resolve(&file_config, cli.log_level);
    Ok((file_config, resolved))
}

/// File logger; failure to create the log file only disables logging.
fn init_logging(config: &ResolvedConfig) {
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();
    if let Ok(log_file) = File::create(&config.log_file) {
        let _ = WriteLogger::init(config.log_level, log_config, log_file);
    }
}
