//! Show the fastest recorded laps.

use anyhow::Result;
use colored::Colorize;

use crate::commands::load_state;
use crate::config::Config;

pub fn run(top: usize) -> Result<()> {
    let config = Config::load()?;
    let Some(state) = load_state(&config)? else {
        println!("{} No runs yet. Try {}", "•".yellow(), "evodrive run".cyan());
        return Ok(());
    };

    let board = state.leaderboard();
    if board.is_empty() {
        println!("{} No agent has finished a lap yet.", "•".yellow());
        return Ok(());
    }

    println!("{}", format!("Leaderboard ({})", config.circuit.name).white().bold());
    println!("{}", "═".repeat(56).dimmed());
    println!("  {:<5} {:>10} {:>7} {:>9}   {}", "Rank", "Time", "Gen", "Agent", "Checkpoints");

    for (rank, entry) in board.top(top).iter().enumerate() {
        let splits = entry
            .checkpoint_times
            .iter()
            .map(|t| format!("{t:.2}"))
            .collect::<Vec<_>>()
            .join(" ");
        let time = format!("{:.2}s", entry.time);
        println!(
            "  {:<5} {:>10} {:>7} {:>9}   {}",
            rank + 1,
            if rank == 0 { time.green().bold() } else { time.cyan() },
            entry.generation,
            format!("#{}", entry.agent_id),
            splits.dimmed()
        );
    }

    println!("{}", "═".repeat(56).dimmed());
    println!("  {} laps recorded", board.len().to_string().cyan());

    Ok(())
}
