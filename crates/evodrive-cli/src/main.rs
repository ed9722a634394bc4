//! Evodrive CLI - headless neuroevolution training runs.

mod commands;
mod config;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::Level;

#[derive(Parser)]
#[command(name = "evodrive")]
#[command(author, version, about = "Evodrive - evolve racing agents on a closed track", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new evodrive project
    Init {
        /// Project directory (default: current directory)
        #[arg(short, long)]
        path: Option<String>,
    },

    /// Train for a number of generations with automatic selection
    Run {
        /// Generations to evolve (default: from evodrive.toml)
        #[arg(short, long)]
        generations: Option<u32>,

        /// Tick cap per generation
        #[arg(short, long)]
        max_ticks: Option<u64>,

        /// Parents picked per generation (1 or 2)
        #[arg(short, long)]
        select: Option<usize>,
    },

    /// Show the fastest recorded laps
    Leaderboard {
        /// Number of entries
        #[arg(short, long, default_value = "10")]
        top: usize,
    },

    /// Drop the latest evolution step
    Undo,

    /// Race the current generation again
    Restart,

    /// Forget all history and scores
    Reset,

    /// Show evolution statistics
    Stats,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Init { path } => commands::init::run(path),
        Commands::Run { generations, max_ticks, select } => {
            commands::run::run(generations, max_ticks, select, cli.verbose)
        }
        Commands::Leaderboard { top } => commands::leaderboard::run(top),
        Commands::Undo => commands::history::undo(),
        Commands::Restart => commands::history::restart(),
        Commands::Reset => commands::history::reset(),
        Commands::Stats => commands::stats::run(),
    }
}
