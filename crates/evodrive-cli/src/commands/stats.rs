//! Show evolution statistics.

use anyhow::Result;
use colored::Colorize;
use evodrive::prelude::*;

use crate::commands::load_state;
use crate::config::Config;

pub fn run() -> Result<()> {
    let config = Config::load()?;
    let Some(state) = load_state(&config)? else {
        println!("{} No runs yet. Try {}", "•".yellow(), "evodrive run".cyan());
        return Ok(());
    };
    let summary = EvolutionSummary::from_state(&state);

    println!("{}", "Evodrive Statistics".white().bold());
    println!("{}", "═".repeat(40).dimmed());
    println!();

    println!("{}", "Evolution".blue().bold());
    println!("  Track:             {}", config.circuit.name.cyan());
    println!("  Generation:        {}", summary.generation.to_string().cyan());
    println!("  History entries:   {}", summary.history_entries.to_string().cyan());
    println!("  Population:        {}", config.manager.population.size.to_string().cyan());
    println!();

    println!("{}", "Laps".blue().bold());
    println!("  Recorded:          {}", summary.total_scores.to_string().cyan());
    match summary.best_time {
        Some(best) => println!("  Best:              {}", format!("{best:.2}s").green()),
        None => println!("  Best:              {}", "-".dimmed()),
    }
    if let Some(gain) = summary.improvement() {
        println!("  Improvement:       {:+.2}s", gain);
    }
    println!();

    if !summary.per_generation.is_empty() {
        println!("{}", "Best Per Generation".blue().bold());
        for best in &summary.per_generation {
            println!(
                "  gen {:>4}   {}   agent #{:<3} ({} finished)",
                best.generation,
                format!("{:.2}s", best.time).cyan(),
                best.agent_id,
                best.finishers
            );
        }
        println!();
    }

    println!("{}", "═".repeat(40).dimmed());

    Ok(())
}
