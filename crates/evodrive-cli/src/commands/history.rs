//! Undo, restart and reset: edits to the evolution history.

use anyhow::{Context, Result};
use colored::Colorize;
use evodrive::prelude::*;

use crate::commands::open_manager;
use crate::config::Config;

pub fn undo() -> Result<()> {
    let config = Config::load()?;
    let mut manager = open_manager(&config, Box::new(NullSink))?;
    let before = manager.generation();

    match manager.undo_last_evolution() {
        Ok(()) => {
            println!(
                "{} Undid generation {} → now at generation {}",
                "✓".green().bold(),
                before.to_string().yellow(),
                manager.generation().to_string().green()
            );
            Ok(())
        }
        Err(RaceError::EmptyHistory) => {
            println!("{} Nothing to undo.", "•".yellow());
            Ok(())
        }
        Err(e) => Err(e).context("Failed to undo"),
    }
}

pub fn restart() -> Result<()> {
    let config = Config::load()?;
    let mut manager = open_manager(&config, Box::new(NullSink))?;
    manager.restart_generation().context("Failed to restart")?;
    println!(
        "{} Generation {} will race again from its parents.",
        "✓".green().bold(),
        manager.generation().to_string().cyan()
    );
    Ok(())
}

pub fn reset() -> Result<()> {
    let config = Config::load()?;
    let mut manager = open_manager(&config, Box::new(NullSink))?;
    let generation = manager.generation();
    let scores = manager.leaderboard().len();
    manager.reset_evolution().context("Failed to reset")?;
    println!(
        "{} Reset: dropped {} generations and {} laps.",
        "✓".green().bold(),
        generation.saturating_sub(1).to_string().yellow(),
        scores.to_string().yellow()
    );
    Ok(())
}
