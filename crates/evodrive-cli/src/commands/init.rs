//! Initialize a new evodrive project.
//!
//! A project is an `evodrive.toml` plus a `.evodrive/` directory that holds
//! one `evolution-<track>.json` per track raced from it.

use anyhow::{Context, Result};
use colored::Colorize;
use evodrive::prelude::*;
use std::path::{Path, PathBuf};

use crate::config::{Config, CONFIG_FILE};

/// What `init` found and created.
#[derive(Debug)]
struct Project {
    config: Config,
    config_path: PathBuf,
    config_created: bool,
    /// Saved state for the configured track, if a run already happened here.
    existing: Option<EvolutionState>,
}

pub fn run(path: Option<String>) -> Result<()> {
    let base = match path {
        Some(p) => PathBuf::from(p),
        None => std::env::current_dir().context("Failed to read the current directory")?,
    };

    println!("{} Initializing evodrive project in {}", "→".blue(), base.display());
    let project = init_project(&base)?;

    if project.config_created {
        println!("  {} Wrote {}", "✓".green(), project.config_path.display());
    } else {
        println!("  {} Keeping existing {}", "•".yellow(), project.config_path.display());
    }

    let manager = &project.config.manager;
    let (input, hidden, output) = manager.genome_shape();
    println!();
    println!("{}", "Setup".blue().bold());
    println!(
        "  Track:       {} ({} checkpoints, radii {}..{})",
        project.config.circuit.name.cyan(),
        project.config.circuit.checkpoints,
        project.config.circuit.inner_radius,
        project.config.circuit.outer_radius
    );
    println!("  Population:  {} agents", manager.population.size.to_string().cyan());
    println!("  Network:     {}", format!("{input}x{hidden}x{output}").cyan());
    println!("  Sensors:     {} rays over {}°", manager.sensors.ray_count, manager.sensors.spread_degrees);

    match &project.existing {
        Some(state) => println!(
            "  Saved state: generation {}, {} laps recorded",
            state.generation.to_string().yellow(),
            state.scores.len()
        ),
        None => println!("  Saved state: {}", "none yet".dimmed()),
    }

    println!();
    println!("Next steps:");
    println!("  {} evodrive run --generations {}", "1.".blue(), project.config.training.generations);
    println!("  {} evodrive leaderboard", "2.".blue());

    Ok(())
}

/// Create the data directory and a default config unless one exists.
fn init_project(base: &Path) -> Result<Project> {
    let data_dir = base.join(".evodrive");
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create {}", data_dir.display()))?;

    // Evolution state is per machine; the config is what gets shared.
    let gitignore_path = data_dir.join(".gitignore");
    if !gitignore_path.exists() {
        std::fs::write(&gitignore_path, "evolution*.json\n")
            .with_context(|| format!("Failed to write {}", gitignore_path.display()))?;
    }

    let config_path = base.join(CONFIG_FILE);
    let config_created = !config_path.exists();
    let config = if config_created {
        let config = Config::default();
        config.save(&config_path)?;
        config
    } else {
        Config::load_from(&config_path)?
    };

    let store = JsonFileStore::in_dir(&data_dir, Some(config.circuit.name.as_str()));
    let existing = store
        .load()
        .with_context(|| format!("Failed to read {}", store.path().display()))?;

    Ok(Project {
        config,
        config_path,
        config_created,
        existing,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_directory_gets_config_and_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let project = init_project(dir.path()).unwrap();

        assert!(project.config_created);
        assert!(project.existing.is_none());
        assert!(dir.path().join(".evodrive/.gitignore").exists());
        let loaded = Config::load_from(&dir.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(loaded.manager, ManagerConfig::default());
    }

    #[test]
    fn existing_config_and_state_are_kept() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.circuit.name = "oval".to_string();
        config.save(&dir.path().join(CONFIG_FILE)).unwrap();

        let mut store = JsonFileStore::in_dir(&dir.path().join(".evodrive"), Some("oval"));
        store
            .save(&EvolutionState {
                generation: 6,
                brain_history: vec![],
                scores: vec![],
            })
            .unwrap();

        let project = init_project(dir.path()).unwrap();
        assert!(!project.config_created);
        assert_eq!(project.config.circuit.name, "oval");
        assert_eq!(project.existing.map(|s| s.generation), Some(6));
    }
}
