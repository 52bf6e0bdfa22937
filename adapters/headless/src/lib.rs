#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Headless simulation that wires the world to every system in a fixed order.
//!
//! Each step applies a `Tick`, then runs the day/night director, the wave
//! scheduler, enemy behavior and tower targeting plus combat against the
//! post-tick views. Their commands are applied in that order and the
//! resulting events are forwarded to the presentation seams and carried into
//! the next step.

mod audio;
mod config;

use std::time::Duration;

use town_defence_core::{Command, Event, Outcome, TileCoord, TowerId, TowerTarget};
use town_defence_system_day_night::DayNightDirector;
use town_defence_system_enemy_behavior::EnemyBehavior;
use town_defence_system_tower_combat::TowerCombat;
use town_defence_system_tower_targeting::TowerTargeting;
use town_defence_system_wave_scheduler::WaveScheduler;
use town_defence_world::{self as world, query, World};

pub use audio::{AudioCue, AudioSink, SceneLoader, Silent};
pub use config::{GameConfig, DEFAULT_TRANSITION};

/// Complete tower-defence session driven by explicit time steps.
#[derive(Debug)]
pub struct Simulation<A = Silent, S = Silent> {
    world: World,
    director: DayNightDirector,
    scheduler: WaveScheduler,
    behavior: EnemyBehavior,
    targeting: TowerTargeting,
    combat: TowerCombat,
    audio: A,
    scenes: S,
    carried: Vec<Event>,
    last_step: Vec<Event>,
    requested_scene: Option<String>,
    targets: Vec<TowerTarget>,
    commands: Vec<Command>,
}

impl Simulation {
    /// Creates a simulation that discards sound cues and scene requests.
    #[must_use]
    pub fn headless(config: GameConfig) -> Self {
        Self::new(config, Silent, Silent)
    }
}

impl<A: AudioSink, S: SceneLoader> Simulation<A, S> {
    /// Builds the territory and every system from the provided configuration.
    pub fn new(config: GameConfig, audio: A, scenes: S) -> Self {
        let seed = config.territory.seed;
        let mut simulation = Self {
            world: World::new(),
            director: DayNightDirector::new(config.director, config.waves.clone()),
            scheduler: WaveScheduler::new(config.waves),
            behavior: EnemyBehavior::new(seed),
            targeting: TowerTargeting::new(),
            combat: TowerCombat::new(),
            audio,
            scenes,
            carried: Vec::new(),
            last_step: Vec::new(),
            requested_scene: None,
            targets: Vec::new(),
            commands: Vec::new(),
        };
        log::info!("{}", query::welcome_banner(&simulation.world));
        simulation.submit(vec![
            Command::ConfigureTerritory {
                config: config.territory,
            },
            Command::ConfigureTowerLevels {
                levels: config.tower_levels,
            },
            Command::ConfigureCycle {
                transition_duration: config.transition_duration,
            },
        ]);
        simulation
    }

    /// Read-only access to the world for queries.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Sink receiving sound cues.
    #[must_use]
    pub fn audio(&self) -> &A {
        &self.audio
    }

    /// Loader receiving scene requests.
    #[must_use]
    pub fn scenes(&self) -> &S {
        &self.scenes
    }

    /// Events produced by the most recent step, tick events first.
    #[must_use]
    pub fn last_step_events(&self) -> &[Event] {
        &self.last_step
    }

    /// Outcome latched by the world, if the session ended.
    #[must_use]
    pub fn outcome(&self) -> Option<Outcome> {
        query::outcome(&self.world)
    }

    /// Scene most recently handed to the scene loader since the last reset.
    #[must_use]
    pub fn requested_scene(&self) -> Option<&str> {
        self.requested_scene.as_deref()
    }

    /// Advances the session by `dt`.
    pub fn step(&mut self, dt: Duration) -> &[Event] {
        let mut events = std::mem::take(&mut self.carried);
        let mut produced = Vec::new();
        world::apply(&mut self.world, Command::Tick { dt }, &mut produced);
        events.extend(produced.iter().cloned());

        let cycle = query::cycle_snapshot(&self.world);
        let enemies = query::enemy_view(&self.world);
        let towers = query::tower_view(&self.world);
        let cooldowns = query::tower_cooldowns(&self.world);
        let town_center = query::town_center(&self.world);

        self.commands.clear();
        self.director.handle(&events, &cycle, &mut self.commands);
        self.scheduler.handle(&events, &mut self.commands);
        self.behavior
            .handle(&events, &enemies, town_center, &mut self.commands);
        self.targeting.handle(&towers, &enemies, &mut self.targets);
        self.combat.handle(
            &cycle,
            &towers,
            &cooldowns,
            &self.targets,
            &mut self.commands,
        );

        self.forward(&produced);
        let commands = std::mem::take(&mut self.commands);
        let applied = self.apply_all(commands);
        produced.extend(applied.iter().cloned());
        self.carried = applied;
        self.last_step = produced;
        &self.last_step
    }

    /// Steps repeatedly until `duration` elapsed or a latched session handed
    /// control to the next scene.
    ///
    /// Returns the simulated time that actually elapsed.
    pub fn run_for(&mut self, duration: Duration, tick: Duration) -> Duration {
        let mut elapsed = Duration::ZERO;
        if tick.is_zero() {
            log::warn!("zero tick length; nothing simulated");
            return elapsed;
        }
        while elapsed < duration && !self.finished() {
            let _ = self.step(tick);
            elapsed += tick;
        }
        elapsed
    }

    /// Starts the first day. Only the first call has any effect.
    pub fn trigger_waves(&mut self) -> bool {
        let mut commands = Vec::new();
        if !self.director.trigger_waves(&mut commands) {
            return false;
        }
        self.audio.play(AudioCue::WaveTrigger);
        self.submit(commands);
        true
    }

    /// Adds resources to the inventory.
    pub fn deposit(&mut self, wood: u32, stone: u32) {
        self.submit(vec![Command::DepositResources { wood, stone }]);
    }

    /// Strikes the resource deposit on `tile`.
    pub fn harvest(&mut self, tile: TileCoord, damage: f32) {
        self.submit(vec![Command::HarvestResource { tile, damage }]);
    }

    /// Builds a level-one tower on `tile`.
    pub fn place_tower(&mut self, tile: TileCoord) {
        self.submit(vec![Command::PlaceTower { tile }]);
    }

    /// Raises `tower` by one level.
    pub fn upgrade_tower(&mut self, tower: TowerId) {
        self.submit(vec![Command::UpgradeTower { tower }]);
    }

    /// Starts a day immediately.
    pub fn force_day(&mut self) {
        let mut commands = Vec::new();
        self.director.force_day(&mut commands);
        self.submit(commands);
    }

    /// Starts the next night immediately.
    pub fn force_night(&mut self) {
        let mut commands = Vec::new();
        let cycle = query::cycle_snapshot(&self.world);
        self.director.force_night(&cycle, &mut commands);
        self.submit(commands);
    }

    /// Removes every enemy and completes the active wave.
    pub fn skip_wave(&mut self) {
        let mut commands = Vec::new();
        let cycle = query::cycle_snapshot(&self.world);
        self.director.skip_wave(&cycle, &mut commands);
        self.submit(commands);
    }

    /// Ends the session with the provided outcome.
    pub fn force_outcome(&mut self, outcome: Outcome) {
        let mut commands = Vec::new();
        self.director.force_outcome(outcome, &mut commands);
        self.submit(commands);
    }

    /// Rewinds the session and starts a fresh day.
    pub fn reset(&mut self) {
        let mut commands = Vec::new();
        self.director.reset(&mut commands);
        self.carried.clear();
        self.requested_scene = None;
        self.submit(commands);
    }

    fn finished(&self) -> bool {
        self.outcome().is_some() && self.requested_scene.is_some()
    }

    fn submit(&mut self, commands: Vec<Command>) {
        let events = self.apply_all(commands);
        self.carried.extend(events);
    }

    fn apply_all(&mut self, commands: Vec<Command>) -> Vec<Event> {
        let mut events = Vec::new();
        for command in commands {
            world::apply(&mut self.world, command, &mut events);
        }
        self.forward(&events);
        events
    }

    fn forward(&mut self, events: &[Event]) {
        for event in events {
            if let Some(cue) = AudioCue::for_event(event) {
                self.audio.play(cue);
            }
            if let Event::SceneRequested { name } = event {
                self.scenes.load(name);
                self.requested_scene = Some(name.clone());
            }
        }
    }
}
