//! Genetic manager - generation lifecycle.
//!
//! The manager owns the racing population, the evolution history and
//! the leaderboard. An operator (a person at a UI, or an automatic
//! selector) picks one or two agents; `evolve` breeds the next generation
//! from them.
//!
//! Each tick:
//! 1. Every racer senses the world and decides its controls (reads only)
//! 2. All drive commands are applied
//! 3. The race clock advances and the physics world steps
//! 4. Contacts are dispatched to their racers in report order
//! 5. Newly finished racers are scored, leaderboard re-sorted, state saved

use crate::config::ManagerConfig;
use crate::history::EvolutionHistory;
use crate::leaderboard::{Leaderboard, NullSink, ScoreEntry, ScoreSink};
use crate::metrics::GenerationStats;
use crate::session::{EvolutionState, EvolutionStore, MemoryStore};
use evodrive_agents::breeding::breed_population;
use evodrive_agents::controller::{Controller, HumanController, KeyState, NeuralController};
use evodrive_agents::fitness::rank_descending;
use evodrive_agents::genome::Genome;
use evodrive_agents::racer::{ContactOutcome, Racer};
use evodrive_agents::sensor::SensorArray;
use evodrive_core::error::{RaceError, Result};
use evodrive_core::physics::Physics;
use evodrive_core::track::Track;
use evodrive_core::types::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Event emitted by the manager during a tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum RaceEvent {
    /// A checkpoint counted for an agent.
    CheckpointHit { id: AgentId, index: usize, time: f64 },
    /// An agent crossed the finish with every checkpoint hit.
    Finished { id: AgentId, time: f64 },
    /// A counted wall contact.
    WallHit { id: AgentId, wall_hits: u32 },
    /// An agent was eliminated.
    Eliminated { id: AgentId },
    /// A score was recorded on the leaderboard at `rank` (0-based).
    ScoreRecorded { id: AgentId, time: f64, rank: usize },
    /// An agent's update failed this tick; it idled instead.
    AgentFault { id: AgentId, error: String },
    /// A tick completed.
    TickComplete { frame: Tick, racing: usize, finished: usize, eliminated: usize },
}

pub struct GeneticManager<W: Physics + Track> {
    world: W,
    config: ManagerConfig,
    sensors: SensorArray,
    rng: StdRng,
    racers: Vec<Racer>,
    generation: u32,
    /// Ticks since the population started.
    frame: Tick,
    /// Frame at which the race clock starts.
    race_start_frame: Tick,
    /// Selected agents, oldest selection first.
    selected: Vec<AgentId>,
    focused: Option<usize>,
    /// Racers whose engine is cut for the next tick after a wall hit.
    stalled: HashSet<usize>,
    history: EvolutionHistory,
    leaderboard: Leaderboard,
    store: Box<dyn EvolutionStore>,
    /// Set when the store held state that could not be read. Saving
    /// would overwrite it, so nothing is saved until an explicit reset.
    store_locked: bool,
    sink: Box<dyn ScoreSink>,
}

impl<W: Physics + Track> GeneticManager<W> {
    /// Create a manager and resume from `store`.
    ///
    /// With saved history the population is rebuilt from the last history
    /// entry at the saved generation. Otherwise generation 1 starts with
    /// random genomes. A store that fails to load, or holds unusable
    /// history, is logged and treated as empty; it is left untouched
    /// until [`reset_evolution`](Self::reset_evolution).
    pub fn new(
        world: W,
        config: ManagerConfig,
        store: Box<dyn EvolutionStore>,
        sink: Box<dyn ScoreSink>,
    ) -> Result<Self> {
        config.validate()?;
        let rng = match config.population.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut manager = Self {
            world,
            sensors: SensorArray::new(config.sensors.clone()),
            config,
            rng,
            racers: Vec::new(),
            generation: 1,
            frame: 0,
            race_start_frame: 0,
            selected: Vec::new(),
            focused: None,
            stalled: HashSet::new(),
            history: EvolutionHistory::new(),
            leaderboard: Leaderboard::new(),
            store,
            store_locked: false,
            sink,
        };
        manager.resume()?;
        Ok(manager)
    }

    /// Manager with an in-memory store and no score sink.
    pub fn in_memory(world: W, config: ManagerConfig) -> Result<Self> {
        Self::new(world, config, Box::new(MemoryStore::new()), Box::new(NullSink))
    }

    fn resume(&mut self) -> Result<()> {
        let state = match self.store.load() {
            Ok(state) => state,
            Err(e) => {
                warn!(error = %e, "failed to load evolution state, starting fresh without saving");
                self.store_locked = true;
                None
            }
        };
        let Some(state) = state else {
            return self.start_random();
        };
        let history = match state.history() {
            Ok(history) => history,
            Err(e) => {
                warn!(error = %e, "stored history is unusable, starting fresh without saving");
                self.store_locked = true;
                return self.start_random();
            }
        };
        self.generation = state.generation.max(1);
        self.leaderboard = state.leaderboard();
        self.history = history;
        info!(
            generation = self.generation,
            history = self.history.len(),
            scores = self.leaderboard.len(),
            "resumed evolution"
        );
        if self.history.is_empty() {
            self.start_random()
        } else {
            self.restart_from_history()
        }
    }

    // --- Population lifecycle ---

    /// Replace the population with `size` fresh random genomes at the
    /// current generation.
    pub fn initialize_population(&mut self, size: usize) -> Result<()> {
        if size == 0 {
            return Err(RaceError::invalid_config("population.size", "0", "population must not be empty"));
        }
        self.config.population.size = size;
        self.start_random()
    }

    fn start_random(&mut self) -> Result<()> {
        let (input, hidden, output) = self.config.genome_shape();
        let genomes = (0..self.config.population.size)
            .map(|_| Genome::random(input, hidden, output, &mut self.rng))
            .collect();
        self.populate(genomes)
    }

    /// Tear down the current racers and start `genomes` racing together.
    fn populate(&mut self, genomes: Vec<Genome>) -> Result<()> {
        let mode = self.config.controller.output_mode;
        let controllers = genomes
            .into_iter()
            .map(|genome| NeuralController::new(genome, mode))
            .collect::<Result<Vec<_>>>()?;

        for racer in self.racers.drain(..) {
            self.world.remove_vehicle(racer.body());
        }
        let checkpoints = self.world.checkpoint_count();
        let order = self.config.rules.checkpoint_order;
        for (index, controller) in controllers.into_iter().enumerate() {
            let body = self.world.spawn_vehicle();
            self.racers.push(Racer::new(index, body, controller.into(), checkpoints, order));
        }

        let dropped = self.leaderboard.remove_generation(self.generation);
        if dropped > 0 {
            debug!(generation = self.generation, dropped, "cleared stale scores");
        }
        self.selected.clear();
        self.stalled.clear();
        self.focused = if self.racers.is_empty() { None } else { Some(0) };
        self.frame = 0;
        self.race_start_frame = self.config.population.countdown_ticks;
        self.persist();
        info!(generation = self.generation, size = self.racers.len(), "generation started");
        Ok(())
    }

    /// Parents in `parents` must match this run's genome shape.
    fn check_parents(&self, parents: &[Genome]) -> Result<()> {
        let (input, hidden, output) = self.config.genome_shape();
        for parent in parents {
            let shape = parent.shape();
            if (shape.input, shape.hidden, shape.output) != (input, hidden, output) {
                return Err(RaceError::shape_mismatch(
                    "parent genome",
                    format!("{input}x{hidden}x{output}"),
                    shape,
                ));
            }
        }
        Ok(())
    }

    fn breed_from(&mut self, parents: &[Genome]) -> Result<Vec<Genome>> {
        self.check_parents(parents)?;
        breed_population(
            parents,
            self.config.population.size,
            self.config.population.breeding,
            self.config.genome.mutation,
            &mut self.rng,
        )
    }

    fn selected_genomes(&self) -> Vec<Genome> {
        self.selected
            .iter()
            .filter_map(|id| self.racers.iter().find(|r| r.id() == *id))
            .filter_map(|r| r.genome().cloned())
            .collect()
    }

    /// Breed the next generation from the selected agents.
    ///
    /// Fails with [`RaceError::NoSelection`] when nothing is selected, in
    /// which case nothing changes.
    pub fn evolve(&mut self) -> Result<()> {
        let parents = self.selected_genomes();
        if parents.is_empty() {
            info!(generation = self.generation, "evolve requested with no selection");
            return Err(RaceError::NoSelection);
        }
        let offspring = self.breed_from(&parents)?;
        let parent_count = parents.len();
        self.history.push(self.generation, parents);
        self.generation += 1;
        info!(generation = self.generation, parents = parent_count, "evolved");
        self.populate(offspring)
    }

    /// Race the current generation again without advancing it.
    ///
    /// Breeds from the current selection, else from the last history
    /// entry, else starts over with random genomes. A selection is
    /// recorded in the history under the current generation number, so
    /// a later resume or undo rebuilds from the parents actually raced.
    pub fn restart_generation(&mut self) -> Result<()> {
        let parents = self.selected_genomes();
        info!(generation = self.generation, selected = parents.len(), "restarting generation");
        if !parents.is_empty() {
            let offspring = self.breed_from(&parents)?;
            self.history.push(self.generation, parents);
            self.populate(offspring)
        } else if !self.history.is_empty() {
            self.restart_from_history()
        } else {
            self.start_random()
        }
    }

    fn restart_from_history(&mut self) -> Result<()> {
        let parents = match self.history.last() {
            Some(entry) => entry.parents.clone(),
            None => return Err(RaceError::EmptyHistory),
        };
        match self.breed_from(&parents) {
            Ok(offspring) => self.populate(offspring),
            Err(e @ RaceError::ShapeMismatch { .. }) => {
                warn!(error = %e, "history does not fit the current genome layout, using random genomes");
                self.start_random()
            }
            Err(e) => Err(e),
        }
    }

    /// Drop the latest evolution step and rebuild from the one before.
    ///
    /// Fails with [`RaceError::EmptyHistory`] when one entry or fewer is
    /// left, leaving everything unchanged.
    pub fn undo_last_evolution(&mut self) -> Result<()> {
        if self.history.len() <= 1 {
            info!(history = self.history.len(), "nothing to undo");
            return Err(RaceError::EmptyHistory);
        }
        self.history.pop();
        self.generation = self.generation.saturating_sub(1).max(1);
        info!(generation = self.generation, "undid last evolution");
        self.restart_from_history()
    }

    /// Forget all history and scores and start again at generation 1.
    pub fn reset_evolution(&mut self) -> Result<()> {
        self.history.clear();
        self.leaderboard.clear();
        self.generation = 1;
        self.store_locked = false;
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "failed to clear stored evolution state");
        }
        info!("evolution reset");
        self.start_random()
    }

    /// Add a keyboard-driven racer to the running generation.
    pub fn add_human_racer(&mut self, keys: KeyState) -> AgentId {
        let body = self.world.spawn_vehicle();
        let racer = Racer::new(
            self.racers.len(),
            body,
            Controller::Human(HumanController::new(keys)),
            self.world.checkpoint_count(),
            self.config.rules.checkpoint_order,
        );
        let id = racer.id();
        self.racers.push(racer);
        id
    }

    // --- Tick ---

    fn counting_down(&self) -> bool {
        self.frame <= self.race_start_frame && self.race_start_frame > 0
    }

    /// Advance the race by one tick.
    pub fn update(&mut self) -> Vec<RaceEvent> {
        self.frame += 1;
        let dt = self.config.dt();
        let mut events = Vec::new();

        if self.counting_down() {
            for racer in &self.racers {
                if let Err(e) = self.world.apply_controls(racer.body(), DriveCommand::idle()) {
                    debug!(agent = racer.number(), error = %e, "idle during countdown failed");
                }
            }
            // Nothing moves, so contacts during the countdown carry no meaning.
            let _ = self.world.step_world(dt);
            events.push(self.tick_complete());
            return events;
        }

        // Phase 1: every racer decides from the same world state.
        let controls: Vec<ControlVector> = self
            .racers
            .iter()
            .map(|racer| match racer.think(&self.world, &self.sensors) {
                Ok(controls) => controls,
                Err(e) => {
                    warn!(agent = racer.number(), error = %e, "racer update failed, idling");
                    events.push(RaceEvent::AgentFault {
                        id: racer.id(),
                        error: e.to_string(),
                    });
                    ControlVector::zero()
                }
            })
            .collect();

        // Phase 2: apply.
        for (index, (racer, controls)) in self.racers.iter().zip(&controls).enumerate() {
            let command = if self.stalled.remove(&index) {
                DriveCommand::idle()
            } else {
                racer.drive_command(controls)
            };
            if let Err(e) = self.world.apply_controls(racer.body(), command) {
                warn!(agent = racer.number(), error = %e, "applying controls failed");
                events.push(RaceEvent::AgentFault {
                    id: racer.id(),
                    error: e.to_string(),
                });
            }
        }

        let race_time = self.elapsed_secs();
        for racer in &mut self.racers {
            racer.set_race_time(race_time);
        }

        let contacts = self.world.step_world(dt);
        for contact in contacts {
            let Some(index) = self.racers.iter().position(|r| r.body() == contact.body) else {
                continue;
            };
            let speed = match self.world.velocity(contact.body) {
                Ok(v) => v.speed(),
                Err(e) => {
                    debug!(error = %e, "no velocity for contact, treating as stationary");
                    0.0
                }
            };
            let rules = self.config.rules;
            let racer = &mut self.racers[index];
            match racer.handle_contact(contact.kind, speed, &rules) {
                ContactOutcome::Ignored => {}
                ContactOutcome::CheckpointHit { index: checkpoint, time } => {
                    events.push(RaceEvent::CheckpointHit {
                        id: racer.id(),
                        index: checkpoint,
                        time,
                    });
                }
                ContactOutcome::Finished { time } => {
                    events.push(RaceEvent::Finished { id: racer.id(), time });
                }
                ContactOutcome::WallHit { eliminated } => {
                    let (id, body, wall_hits) = (racer.id(), racer.body(), racer.wall_hits());
                    events.push(RaceEvent::WallHit { id, wall_hits });
                    if eliminated {
                        events.push(RaceEvent::Eliminated { id });
                    }
                    if let Err(e) = self.world.damp_velocity(body, rules.wall_damping) {
                        warn!(error = %e, "damping after wall hit failed");
                    }
                    self.stalled.insert(index);
                }
            }
        }

        self.record_scores(&mut events);
        events.push(self.tick_complete());
        events
    }

    fn record_scores(&mut self, events: &mut Vec<RaceEvent>) {
        let mut recorded = false;
        for racer in &mut self.racers {
            let Some(time) = racer.take_unreported_finish() else {
                continue;
            };
            let entry = ScoreEntry {
                generation: self.generation,
                agent_id: racer.number(),
                time,
                checkpoint_times: racer.checkpoints().checkpoint_times(),
            };
            self.sink.record(&entry);
            let rank = self.leaderboard.insert(entry);
            info!(generation = self.generation, agent = racer.number(), time, rank, "score recorded");
            events.push(RaceEvent::ScoreRecorded { id: racer.id(), time, rank });
            recorded = true;
        }
        if recorded {
            self.persist();
        }
    }

    fn tick_complete(&self) -> RaceEvent {
        let count = |status: AgentStatus| self.racers.iter().filter(|r| r.status() == status).count();
        RaceEvent::TickComplete {
            frame: self.frame,
            racing: count(AgentStatus::Racing),
            finished: count(AgentStatus::Finished),
            eliminated: count(AgentStatus::Eliminated),
        }
    }

    /// Run `ticks` updates, collecting events per tick.
    pub fn run(&mut self, ticks: u64) -> Vec<Vec<RaceEvent>> {
        (0..ticks).map(|_| self.update()).collect()
    }

    /// Race seconds elapsed since the countdown ended.
    pub fn elapsed_secs(&self) -> f64 {
        self.frame.saturating_sub(self.race_start_frame) as f64 / self.config.population.tick_rate as f64
    }

    /// True once the time budget has passed with exactly two agents
    /// selected, or once every agent is terminal.
    pub fn is_generation_complete(&self) -> bool {
        let budget_spent = self.elapsed_secs() > self.config.population.time_budget_secs;
        (budget_spent && self.selected.len() == 2) || self.racers.iter().all(Racer::is_terminal)
    }

    // --- Selection and focus ---

    /// Toggle `id` in the selection. Returns whether it is now selected.
    ///
    /// Selecting a third agent evicts the earliest selection. Agents
    /// without a genome cannot be selected.
    pub fn select_agent(&mut self, id: AgentId) -> bool {
        if let Some(pos) = self.selected.iter().position(|s| *s == id) {
            self.selected.remove(pos);
            return false;
        }
        let Some(racer) = self.racers.iter().find(|r| r.id() == id) else {
            return false;
        };
        if racer.genome().is_none() {
            debug!(agent = racer.number(), "human racers cannot be selected");
            return false;
        }
        if self.selected.len() >= 2 {
            self.selected.remove(0);
        }
        self.selected.push(id);
        true
    }

    /// Toggle the focused agent's selection.
    pub fn select_focused(&mut self) -> bool {
        match self.focused_agent().map(Racer::id) {
            Some(id) => self.select_agent(id),
            None => false,
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    /// Move focus to the next agent, wrapping.
    pub fn cycle_focus(&mut self) -> Option<usize> {
        if self.racers.is_empty() {
            return None;
        }
        let next = self.focused.map_or(0, |i| (i + 1) % self.racers.len());
        self.focused = Some(next);
        self.focused
    }

    /// Focus agent `index`; out-of-range indices are ignored.
    pub fn focus_agent(&mut self, index: usize) -> bool {
        if index < self.racers.len() {
            self.focused = Some(index);
            true
        } else {
            false
        }
    }

    /// Focus the best agent, cycling through the ranking on repeated calls.
    ///
    /// Finished agents rank by finish time. With no finishers, agents
    /// still in the race rank by checkpoints hit, then by race time.
    pub fn focus_best(&mut self) -> Option<usize> {
        let mut finished: Vec<usize> = (0..self.racers.len())
            .filter(|&i| self.racers[i].status() == AgentStatus::Finished)
            .collect();
        let ordering = if !finished.is_empty() {
            finished.sort_by(|&a, &b| {
                let (ta, tb) = (self.racers[a].finish_time(), self.racers[b].finish_time());
                ta.unwrap_or(f64::INFINITY).total_cmp(&tb.unwrap_or(f64::INFINITY))
            });
            finished
        } else {
            let mut active: Vec<usize> = (0..self.racers.len())
                .filter(|&i| self.racers[i].status() != AgentStatus::Eliminated)
                .collect();
            active.sort_by(|&a, &b| {
                let (ra, rb) = (&self.racers[a], &self.racers[b]);
                rb.checkpoints()
                    .hit_count()
                    .cmp(&ra.checkpoints().hit_count())
                    .then(ra.race_time().total_cmp(&rb.race_time()))
            });
            active
        };
        if ordering.is_empty() {
            debug!("no agent to focus");
            return None;
        }
        let next = match self.focused.and_then(|f| ordering.iter().position(|&i| i == f)) {
            Some(pos) => ordering[(pos + 1) % ordering.len()],
            None => ordering[0],
        };
        self.focused = Some(next);
        self.focused
    }

    // --- Queries ---

    /// Live fitness of every measurable agent, fittest first.
    pub fn ranking(&self) -> Vec<(AgentId, f64)> {
        let mut scores: Vec<(AgentId, f64)> = self
            .racers
            .iter()
            .filter_map(|racer| match self.world.pose(racer.body()) {
                Ok(pose) => Some((racer.id(), racer.fitness(pose.position(), &self.world, &self.config.fitness))),
                Err(e) => {
                    debug!(agent = racer.number(), error = %e, "cannot rank racer without a pose");
                    None
                }
            })
            .collect();
        rank_descending(&mut scores);
        scores
    }

    pub fn stats(&self) -> GenerationStats {
        let fitness: Vec<f64> = self.ranking().into_iter().map(|(_, f)| f).collect();
        GenerationStats::compute(
            self.generation,
            &self.racers,
            &fitness,
            self.selected.len(),
            self.elapsed_secs(),
        )
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn frame(&self) -> Tick {
        self.frame
    }

    pub fn racers(&self) -> &[Racer] {
        &self.racers
    }

    pub fn racer(&self, id: AgentId) -> Option<&Racer> {
        self.racers.iter().find(|r| r.id() == id)
    }

    pub fn selected(&self) -> &[AgentId] {
        &self.selected
    }

    pub fn focused(&self) -> Option<usize> {
        self.focused
    }

    pub fn focused_agent(&self) -> Option<&Racer> {
        self.focused.and_then(|i| self.racers.get(i))
    }

    /// True while unreadable stored state is being protected from saves.
    pub fn store_locked(&self) -> bool {
        self.store_locked
    }

    pub fn history(&self) -> &EvolutionHistory {
        &self.history
    }

    pub fn leaderboard(&self) -> &Leaderboard {
        &self.leaderboard
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    pub fn world(&self) -> &W {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut W {
        &mut self.world
    }

    /// Current state in its persisted form.
    pub fn snapshot(&self) -> EvolutionState {
        EvolutionState::capture(self.generation, &self.history, &self.leaderboard)
    }

    /// Best-effort save; failures are logged and the in-memory state stays
    /// authoritative.
    fn persist(&mut self) {
        if self.store_locked {
            debug!("stored state was unreadable, not overwriting it");
            return;
        }
        let state = self.snapshot();
        if let Err(e) = self.store.save(&state) {
            warn!(error = %e, "failed to persist evolution state");
        }
    }
}
