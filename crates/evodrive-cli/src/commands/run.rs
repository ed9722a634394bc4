//! Headless training: race, pick parents automatically, evolve.

use anyhow::{bail, Context, Result};
use colored::Colorize;
use evodrive::prelude::*;
use indicatif::{ProgressBar, ProgressStyle};

use crate::commands::open_manager;
use crate::config::Config;

/// Prints each recorded lap above the progress bar.
struct ProgressSink {
    pb: ProgressBar,
}

impl ScoreSink for ProgressSink {
    fn record(&mut self, entry: &ScoreEntry) {
        self.pb.println(format!(
            "  {} generation {} agent #{} finished in {}",
            "✓".green(),
            entry.generation,
            entry.agent_id,
            format!("{:.2}s", entry.time).cyan()
        ));
    }
}

pub fn run(generations: Option<u32>, max_ticks: Option<u64>, select: Option<usize>, verbose: bool) -> Result<()> {
    let config = Config::load()?;
    let generations = generations.unwrap_or(config.training.generations);
    let max_ticks = max_ticks.unwrap_or(config.training.max_ticks);
    let select = select.unwrap_or(config.training.select);
    if !(1..=2).contains(&select) {
        bail!("--select must be 1 or 2, got {select}");
    }

    let pb = ProgressBar::new(u64::from(generations));
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} generations {msg}")
            .context("Invalid progress template")?
            .progress_chars("#>-"),
    );

    let mut manager = open_manager(&config, Box::new(ProgressSink { pb: pb.clone() }))?;
    if manager.store_locked() {
        println!(
            "{} Saved state could not be read; this run will not be saved. Use {} to start over.",
            "!".red().bold(),
            "evodrive reset".cyan()
        );
    }
    let start_generation = manager.generation();
    println!(
        "{} Training from generation {} ({} agents, {} parent{} per generation)",
        "→".blue(),
        start_generation.to_string().cyan(),
        manager.racers().len().to_string().cyan(),
        select,
        if select == 1 { "" } else { "s" }
    );

    for _ in 0..generations {
        pb.set_message(format!("(racing generation {})", manager.generation()));
        race(&mut manager, max_ticks, select, verbose, &pb);

        // Parents are picked from the final standings.
        auto_select(&mut manager, select);
        let stats = manager.stats();
        pb.println(format!(
            "  {} generation {:>3} │ finished {}/{} │ best fitness {} │ best lap {}",
            "•".blue(),
            stats.generation,
            stats.finished,
            stats.population,
            stats.best_fitness.map_or("-".to_string(), |f| format!("{f:.1}")),
            stats.best_finish_time.map_or("-".to_string(), |t| format!("{t:.2}s")),
        ));

        manager.evolve().context("Failed to evolve")?;
        pb.inc(1);
    }
    pb.finish_with_message("done");

    println!();
    println!("{} Training complete!", "✓".green().bold());
    println!(
        "  Generation: {} → {}",
        start_generation.to_string().yellow(),
        manager.generation().to_string().green()
    );
    match manager.leaderboard().best() {
        Some(best) => println!(
            "  Best lap:   {} (generation {}, agent #{})",
            format!("{:.2}s", best.time).green(),
            best.generation,
            best.agent_id
        ),
        None => println!("  Best lap:   {}", "no finishers yet".dimmed()),
    }

    Ok(())
}

/// Tick until the generation completes or the tick cap is hit. Once the
/// time budget is spent the fittest agents are selected, which ends the
/// generation when two are picked.
fn race(manager: &mut GeneticManager<Circuit>, max_ticks: u64, select: usize, verbose: bool, pb: &ProgressBar) {
    let budget = manager.config().population.time_budget_secs;
    while manager.frame() < max_ticks && !manager.is_generation_complete() {
        let events = manager.update();
        if verbose {
            for line in events.iter().filter_map(|event| describe(manager, event)) {
                pb.println(line);
            }
        }
        if manager.elapsed_secs() > budget && manager.selected().len() != select {
            auto_select(manager, select);
        }
    }
}

/// Select the `count` fittest agents, replacing any earlier selection.
fn auto_select(manager: &mut GeneticManager<Circuit>, count: usize) {
    manager.clear_selection();
    let best: Vec<AgentId> = manager.ranking().into_iter().take(count).map(|(id, _)| id).collect();
    for id in best {
        manager.select_agent(id);
    }
}

fn describe(manager: &GeneticManager<Circuit>, event: &RaceEvent) -> Option<String> {
    let number = |id: &AgentId| manager.racer(*id).map_or(0, Racer::number);
    let line = match event {
        RaceEvent::CheckpointHit { id, index, time } => {
            format!("    agent #{} checkpoint {} at {:.2}s", number(id), index, time)
        }
        RaceEvent::WallHit { id, wall_hits } => {
            format!("    agent #{} hit the wall ({} total)", number(id), wall_hits)
        }
        RaceEvent::Eliminated { id } => format!("    agent #{} {}", number(id), "eliminated".red()),
        RaceEvent::AgentFault { id, error } => {
            format!("    agent #{} {}: {}", number(id), "fault".yellow(), error)
        }
        RaceEvent::Finished { .. } | RaceEvent::ScoreRecorded { .. } | RaceEvent::TickComplete { .. } => {
            return None
        }
    };
    Some(line)
}
