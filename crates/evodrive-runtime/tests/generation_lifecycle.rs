//! Generation lifecycle tests against a scripted world.
//!
//! The scripted world never moves anything: it reports contacts at fixed
//! world steps, which pins race times to exact frame counts.

use evodrive_runtime::prelude::*;
use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

#[derive(Default)]
struct ScriptedWorld {
    steps: u64,
    next_body: u32,
    live: Vec<BodyId>,
    /// (world step, population slot, contact)
    script: Vec<(u64, usize, ContactKind)>,
    speed: f64,
    broken: HashSet<BodyId>,
    commands: Vec<(BodyId, DriveCommand)>,
    damped: Vec<BodyId>,
    checkpoints: usize,
}

impl ScriptedWorld {
    fn new(checkpoints: usize) -> Self {
        Self {
            checkpoints,
            speed: 5.0,
            ..Self::default()
        }
    }

    fn at(mut self, step: u64, slot: usize, kind: ContactKind) -> Self {
        self.script.push((step, slot, kind));
        self
    }
}

impl Physics for ScriptedWorld {
    fn spawn_vehicle(&mut self) -> BodyId {
        let body = BodyId(self.next_body);
        self.next_body += 1;
        self.live.push(body);
        body
    }

    fn remove_vehicle(&mut self, body: BodyId) {
        self.live.retain(|b| *b != body);
    }

    fn step_world(&mut self, _dt: f64) -> Vec<Contact> {
        self.steps += 1;
        self.script
            .iter()
            .filter(|(step, slot, _)| *step == self.steps && *slot < self.live.len())
            .map(|(_, slot, kind)| Contact::new(self.live[*slot], *kind))
            .collect()
    }

    fn pose(&self, body: BodyId) -> Result<Pose> {
        if self.broken.contains(&body) {
            Err(RaceError::unknown_body(body.0))
        } else {
            Ok(Pose::new(0.0, 0.0, 0.0))
        }
    }

    fn velocity(&self, _body: BodyId) -> Result<Velocity> {
        Ok(Velocity::new(self.speed, 0.0, 0.0))
    }

    fn cast_ray(&self, _origin: Point, _angle: f64, _max_len: f64, _mask: LayerMask) -> Result<f64> {
        Ok(1.0)
    }

    fn apply_controls(&mut self, body: BodyId, command: DriveCommand) -> Result<()> {
        self.commands.push((body, command));
        Ok(())
    }

    fn damp_velocity(&mut self, body: BodyId, _factor: f64) -> Result<()> {
        self.damped.push(body);
        Ok(())
    }
}

impl Track for ScriptedWorld {
    fn checkpoint_count(&self) -> usize {
        self.checkpoints
    }

    fn checkpoint_position(&self, index: usize) -> Option<Point> {
        (index < self.checkpoints).then(|| Point::new(10.0 * (index + 1) as f64, 0.0))
    }

    fn finish_position(&self) -> Point {
        Point::new(0.0, 0.0)
    }
}

/// Collects every recorded score.
#[derive(Clone, Default)]
struct RecordingSink(Rc<RefCell<Vec<ScoreEntry>>>);

impl ScoreSink for RecordingSink {
    fn record(&mut self, entry: &ScoreEntry) {
        self.0.borrow_mut().push(entry.clone());
    }
}

fn config(size: usize) -> ManagerConfig {
    let mut config = ManagerConfig::default();
    config.population.size = size;
    config.population.seed = Some(42);
    config
}

fn frozen(size: usize) -> ManagerConfig {
    let mut config = config(size);
    config.genome.mutation = MutationPolicy::PerWeight {
        probability: 0.0,
        magnitude: 0.1,
    };
    config
}

#[test]
fn single_agent_lap_is_scored_once() {
    let world = ScriptedWorld::new(2)
        .at(60, 0, ContactKind::Checkpoint(0))
        .at(120, 0, ContactKind::Checkpoint(1))
        .at(150, 0, ContactKind::Finish)
        .at(160, 0, ContactKind::Finish);
    let sink = RecordingSink::default();
    let mut m = GeneticManager::new(world, config(1), Box::new(MemoryStore::new()), Box::new(sink.clone())).unwrap();

    let events: Vec<RaceEvent> = m.run(200).into_iter().flatten().collect();

    let racer = &m.racers()[0];
    assert_eq!(racer.status(), AgentStatus::Finished);
    assert_eq!(racer.checkpoints().checkpoint_times(), vec![1.0, 2.0]);
    assert_eq!(racer.finish_time(), Some(2.5));

    assert_eq!(m.leaderboard().len(), 1);
    let entry = &m.leaderboard().entries()[0];
    assert_eq!(entry.time, 2.5);
    assert_eq!(entry.generation, 1);
    assert_eq!(entry.agent_id, 1);
    assert_eq!(entry.checkpoint_times, vec![1.0, 2.0]);

    assert_eq!(sink.0.borrow().len(), 1);
    let recorded = events
        .iter()
        .filter(|e| matches!(e, RaceEvent::ScoreRecorded { .. }))
        .count();
    assert_eq!(recorded, 1);
}

#[test]
fn early_finish_contact_is_ignored() {
    let world = ScriptedWorld::new(2)
        .at(10, 0, ContactKind::Finish)
        .at(20, 0, ContactKind::Checkpoint(0));
    let mut m = GeneticManager::in_memory(world, config(1)).unwrap();
    m.run(30);
    assert_eq!(m.racers()[0].status(), AgentStatus::Racing);
    assert!(m.leaderboard().is_empty());
}

#[test]
fn all_terminal_completes_before_budget() {
    let world = ScriptedWorld::new(1)
        .at(5, 0, ContactKind::Wall)
        .at(6, 1, ContactKind::Wall)
        .at(7, 2, ContactKind::Checkpoint(0))
        .at(8, 2, ContactKind::Finish);
    let mut m = GeneticManager::in_memory(world, config(3)).unwrap();

    m.run(7);
    assert!(!m.is_generation_complete());
    m.update();
    assert!(m.is_generation_complete());
    assert!(m.elapsed_secs() < m.config().population.time_budget_secs);

    let stats = m.stats();
    assert_eq!(stats.eliminated, 2);
    assert_eq!(stats.finished, 1);
    assert_eq!(stats.racing, 0);
}

#[test]
fn wall_hit_damps_and_cuts_engine() {
    let mut cfg = config(1);
    cfg.rules.eliminate_on_wall = false;
    let world = ScriptedWorld::new(1).at(3, 0, ContactKind::Wall);
    let mut m = GeneticManager::in_memory(world, cfg).unwrap();

    let events = m.run(4).concat();
    assert!(events.iter().any(|e| matches!(e, RaceEvent::WallHit { wall_hits: 1, .. })));
    assert!(!events.iter().any(|e| matches!(e, RaceEvent::Eliminated { .. })));
    assert_eq!(m.racers()[0].status(), AgentStatus::Racing);
    assert_eq!(m.world().damped.len(), 1);
    // the command applied on the tick after the hit is idle
    assert!(m.world().commands[3].1.is_idle());
}

#[test]
fn slow_wall_contact_is_ignored() {
    let mut world = ScriptedWorld::new(1).at(2, 0, ContactKind::Wall);
    world.speed = 0.05;
    let mut m = GeneticManager::in_memory(world, config(1)).unwrap();
    m.run(3);
    assert_eq!(m.racers()[0].wall_hits(), 0);
    assert!(m.world().damped.is_empty());
}

#[test]
fn budget_with_two_selections_completes() {
    let mut cfg = config(3);
    cfg.population.time_budget_secs = 1.0;
    let mut m = GeneticManager::in_memory(ScriptedWorld::new(1), cfg).unwrap();
    let ids: Vec<AgentId> = m.racers().iter().map(|r| r.id()).collect();

    m.run(61);
    assert!(m.elapsed_secs() > 1.0);
    assert!(!m.is_generation_complete());

    m.select_agent(ids[0]);
    assert!(!m.is_generation_complete());
    m.select_agent(ids[2]);
    assert!(m.is_generation_complete());
}

#[test]
fn evolve_splits_population_between_parents() {
    let mut m = GeneticManager::in_memory(ScriptedWorld::new(1), frozen(10)).unwrap();
    let first = m.racers()[3].clone();
    let second = m.racers()[8].clone();
    m.select_agent(first.id());
    m.select_agent(second.id());

    m.evolve().unwrap();

    assert_eq!(m.generation(), 2);
    assert_eq!(m.racers().len(), 10);
    assert!(m.selected().is_empty());
    for (slot, racer) in m.racers().iter().enumerate() {
        let parent = if slot < 5 { &first } else { &second };
        assert_eq!(racer.genome(), parent.genome(), "slot {slot}");
        assert_eq!(racer.number() as usize, slot + 1);
    }

    let entry = m.history().last().unwrap();
    assert_eq!(entry.generation, 1);
    assert_eq!(entry.parents.len(), 2);
    assert_eq!(Some(&entry.parents[0]), first.genome());
}

#[test]
fn single_parent_seeds_everyone() {
    let mut m = GeneticManager::in_memory(ScriptedWorld::new(1), frozen(4)).unwrap();
    let parent = m.racers()[2].clone();
    m.focus_agent(2);
    assert!(m.select_focused());
    m.evolve().unwrap();
    assert!(m.racers().iter().all(|r| r.genome() == parent.genome()));
}

#[test]
fn undo_needs_two_history_entries() {
    let mut m = GeneticManager::in_memory(ScriptedWorld::new(1), config(4)).unwrap();
    m.select_focused();
    m.evolve().unwrap();
    assert_eq!(m.history().len(), 1);

    assert_eq!(m.undo_last_evolution(), Err(RaceError::EmptyHistory));
    assert_eq!(m.generation(), 2);
    assert_eq!(m.history().len(), 1);

    m.select_focused();
    m.evolve().unwrap();
    assert_eq!(m.generation(), 3);
    m.undo_last_evolution().unwrap();
    assert_eq!(m.generation(), 2);
    assert_eq!(m.history().len(), 1);
}

#[test]
fn restart_keeps_generation_and_drops_its_scores() {
    let world = ScriptedWorld::new(0).at(30, 0, ContactKind::Finish);
    let mut m = GeneticManager::in_memory(world, config(2)).unwrap();
    m.run(40);
    assert_eq!(m.leaderboard().len(), 1);

    m.restart_generation().unwrap();
    assert_eq!(m.generation(), 1);
    assert!(m.leaderboard().is_empty());
    assert!(m.history().is_empty());
    assert_eq!(m.frame(), 0);
}

#[test]
fn restart_reuses_last_history_entry() {
    let mut m = GeneticManager::in_memory(ScriptedWorld::new(1), frozen(3)).unwrap();
    let parent = m.racers()[1].clone();
    m.select_agent(parent.id());
    m.evolve().unwrap();

    m.restart_generation().unwrap();
    assert_eq!(m.generation(), 2);
    assert_eq!(m.history().len(), 1);
    assert!(m.racers().iter().all(|r| r.genome() == parent.genome()));
}

#[test]
fn faulty_agent_does_not_stop_the_others() {
    let mut world = ScriptedWorld::new(1).at(2, 1, ContactKind::Checkpoint(0));
    world.broken.insert(BodyId(0));
    let mut m = GeneticManager::in_memory(world, config(2)).unwrap();

    let events = m.run(2).concat();
    let faults = events
        .iter()
        .filter(|e| matches!(e, RaceEvent::AgentFault { .. }))
        .count();
    assert_eq!(faults, 2);
    assert_eq!(m.racers()[1].checkpoints().hit_count(), 1);
    // the broken racer idled
    assert!(m.world().commands.iter().filter(|(b, _)| *b == BodyId(0)).all(|(_, c)| c.is_idle()));
}

#[test]
fn countdown_holds_everyone_idle() {
    let mut cfg = config(2);
    cfg.population.countdown_ticks = 30;
    let world = ScriptedWorld::new(1).at(40, 0, ContactKind::Checkpoint(0));
    let mut m = GeneticManager::in_memory(world, cfg).unwrap();

    m.run(30);
    assert_eq!(m.elapsed_secs(), 0.0);
    assert!(m.world().commands.iter().all(|(_, c)| c.is_idle()));

    m.run(10);
    // 10 race ticks at 60 Hz
    let times = m.racers()[0].checkpoints().checkpoint_times();
    assert_eq!(times.len(), 1);
    assert!((times[0] - 10.0 / 60.0).abs() < 1e-12);
}

#[test]
fn focus_best_prefers_finishers_then_cycles() {
    let world = ScriptedWorld::new(0)
        .at(10, 2, ContactKind::Finish)
        .at(20, 0, ContactKind::Finish);
    let mut m = GeneticManager::in_memory(world, config(3)).unwrap();
    m.run(25);

    assert_eq!(m.focus_best(), Some(2));
    assert_eq!(m.focus_best(), Some(0));
    assert_eq!(m.focus_best(), Some(2));
}

#[test]
fn ranking_orders_by_live_fitness() {
    let world = ScriptedWorld::new(2).at(1, 1, ContactKind::Checkpoint(0));
    let mut m = GeneticManager::in_memory(world, config(2)).unwrap();
    m.update();
    let ranking = m.ranking();
    assert_eq!(ranking[0].0, m.racers()[1].id());
    assert!(ranking[0].1 > ranking[1].1);
}
