#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Town Defence.

mod cycle;
mod enemies;
mod grid;
mod inventory;
mod projectiles;
mod road;
mod town;
mod towers;

use std::{sync::Arc, time::Duration};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use town_defence_core::{
    stream_seed, timers::TimerQueue, Command, EnemyArchetype, EnemyId, EnemyPhase, Event, Outcome,
    Phase, PhaseChangeError, PlacementError, ResourceKind, SpawnError, TerritoryConfig, TileCoord,
    TowerId, TowerLevelTable, UpgradeError, Vec2, WaypointProgress, RNG_STREAM_ROAD,
    RNG_STREAM_TERRAIN, WELCOME_BANNER,
};

pub use grid::{Grid, ResourceDeposit, Tile, TileState};

use cycle::Cycle;
use enemies::{DamageOutcome, Enemy, EnemyRegistry};
use inventory::Inventory;
use projectiles::{ProjectileField, Resolution};
use town::Town;
use towers::TowerRegistry;

const DEFAULT_TRANSITION_DURATION: Duration = Duration::from_secs(1);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum WorldTimer {
    RemoveEnemy(EnemyId),
}

/// Represents the authoritative Town Defence world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    clock: Duration,
    grid: Grid,
    road: Arc<[TileCoord]>,
    town: Option<Town>,
    enemies: EnemyRegistry,
    towers: TowerRegistry,
    levels: TowerLevelTable,
    projectiles: ProjectileField,
    cycle: Cycle,
    inventory: Inventory,
    timers: TimerQueue<WorldTimer>,
}

impl World {
    /// Creates an empty world with no territory and the default tower levels.
    #[must_use]
    pub fn new() -> Self {
        Self {
            banner: WELCOME_BANNER,
            clock: Duration::ZERO,
            grid: Grid::empty(),
            road: Arc::from(Vec::new()),
            town: None,
            enemies: EnemyRegistry::default(),
            towers: TowerRegistry::new(),
            levels: TowerLevelTable::default(),
            projectiles: ProjectileField::default(),
            cycle: Cycle::new(DEFAULT_TRANSITION_DURATION),
            inventory: Inventory::default(),
            timers: TimerQueue::new(),
        }
    }

    fn configure_territory(&mut self, config: TerritoryConfig, out_events: &mut Vec<Event>) {
        if let Err(error) = config.validate() {
            log::warn!("ignoring territory configuration: {error}");
            return;
        }

        let mut grid = Grid::new(
            config.columns,
            config.rows,
            config.tile_spacing,
            config.origin,
        );

        let spawn = TileCoord::new(config.columns - 1, config.rows - 1);
        let mut road_rng = ChaCha8Rng::seed_from_u64(stream_seed(config.seed, RNG_STREAM_ROAD));
        let road = road::build_serpentine_path(&mut grid, spawn, town::TOWN_TILE, &mut road_rng);

        for tile in town::footprint() {
            if grid.tile(tile).is_some_and(Tile::is_buildable) {
                let _ = grid.set_state(tile, TileState::Occupied);
            }
        }

        let mut terrain_rng =
            ChaCha8Rng::seed_from_u64(stream_seed(config.seed, RNG_STREAM_TERRAIN));
        let free: Vec<TileCoord> = grid
            .tiles()
            .filter(|tile| tile.is_buildable())
            .map(Tile::coord)
            .collect();
        for coord in free {
            let roll: f32 = terrain_rng.gen();
            let kind = if roll < config.tree_chance {
                ResourceKind::Tree
            } else if roll < config.tree_chance + config.stone_chance {
                ResourceKind::Stone
            } else {
                continue;
            };
            let _ = grid.set_state(
                coord,
                TileState::Resource(ResourceDeposit {
                    kind,
                    health: config.resource_health,
                }),
            );
        }

        let town_center =
            grid.tile_center(town::TOWN_TILE) + Vec2::splat(0.5 * config.tile_spacing);

        log::info!(
            "territory configured: {}x{} tiles, road of {} tiles",
            config.columns,
            config.rows,
            road.len()
        );
        out_events.push(Event::TerritoryConfigured {
            columns: config.columns,
            rows: config.rows,
            road_length: road.len(),
        });

        self.grid = grid;
        self.road = Arc::from(road);
        self.town = Some(Town::new(config.town_health, town_center));
        self.enemies.clear();
        self.towers.clear();
        self.projectiles.clear();
        self.timers.clear();
    }

    fn spawn_enemy(&mut self, archetype: EnemyArchetype, out_events: &mut Vec<Event>) {
        if let Err(reason) = self.cycle.claim_spawn() {
            log::debug!("spawn rejected: {reason}");
            out_events.push(Event::SpawnRejected { reason });
            return;
        }

        let Some(first) = self.road.first().copied() else {
            log::warn!("spawn consumed without a road to walk");
            out_events.push(Event::SpawnRejected {
                reason: SpawnError::NoRoad,
            });
            return;
        };

        let id = self.enemies.allocate_id();
        let position = self.grid.tile_center(first);
        self.enemies
            .insert(Enemy::spawn(id, archetype, position, Arc::clone(&self.road)));
        log::debug!("enemy {} spawned at {position}", id.get());
        out_events.push(Event::EnemySpawned {
            enemy: id,
            position,
        });
    }

    fn damage_enemy(&mut self, enemy: EnemyId, amount: f32, out_events: &mut Vec<Event>) {
        let Some(state) = self.enemies.get_mut(enemy) else {
            return;
        };

        match state.apply_damage(amount, self.clock) {
            DamageOutcome::Ignored => {}
            DamageOutcome::Wounded { remaining } => {
                out_events.push(Event::EnemyDamaged {
                    enemy,
                    amount,
                    remaining,
                });
            }
            DamageOutcome::Killed {
                remaining,
                remove_at,
            } => {
                out_events.push(Event::EnemyDamaged {
                    enemy,
                    amount,
                    remaining,
                });
                out_events.push(Event::EnemyKilled { enemy });
                let _ = self.timers.schedule(remove_at, WorldTimer::RemoveEnemy(enemy));
            }
        }
    }

    fn remove_enemy(&mut self, enemy: EnemyId, out_events: &mut Vec<Event>) {
        if self.enemies.remove(enemy).is_some() {
            out_events.push(Event::EnemyDied { enemy });
        }
    }

    fn advance(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        self.clock = self.clock.saturating_add(dt);
        out_events.push(Event::TimeAdvanced { dt });

        if let Some(phase) = self.cycle.advance(dt) {
            out_events.push(Event::TransitionSettled { phase });
        }

        let enemies = &self.enemies;
        let resolutions = self.projectiles.step(dt, self.clock, |id| {
            enemies
                .get(id)
                .filter(|enemy| !enemy.dying)
                .map(|enemy| enemy.position)
        });
        for resolution in resolutions {
            match resolution {
                Resolution::Hit {
                    projectile,
                    target,
                    damage,
                } => {
                    log::debug!("projectile {} struck enemy {}", projectile.get(), target.get());
                    self.damage_enemy(target, damage, out_events);
                }
                Resolution::Expired { projectile } => {
                    out_events.push(Event::ProjectileExpired { projectile });
                }
            }
        }

        for timer in self.timers.drain_due(self.clock) {
            match timer {
                WorldTimer::RemoveEnemy(enemy) => self.remove_enemy(enemy, out_events),
            }
        }
    }

    fn announce_instant_settle(&self, out_events: &mut Vec<Event>) {
        if !self.cycle.transitioning() {
            out_events.push(Event::TransitionSettled {
                phase: self.cycle.phase(),
            });
        }
    }

    fn fire_projectile(&mut self, tower: TowerId, target: EnemyId, out_events: &mut Vec<Event>) {
        let clock = self.clock;
        let Some(state) = self.towers.get_mut(tower) else {
            return;
        };
        let Some(level) = self.levels.level(state.level) else {
            return;
        };
        let stats = level.stats;
        if !state.ready_in(&stats, clock).is_zero() {
            return;
        }
        let Some(enemy) = self.enemies.get(target).filter(|enemy| !enemy.dying) else {
            return;
        };

        state.last_fire = Some(clock);
        let projectile = self.projectiles.launch(
            tower,
            target,
            state.position,
            enemy.position,
            stats.damage,
            stats.projectile_speed,
            clock,
        );
        out_events.push(Event::ProjectileFired {
            projectile,
            tower,
            target,
        });
    }

    fn place_tower(&mut self, tile: TileCoord) -> Result<TowerId, PlacementError> {
        let state = self
            .grid
            .tile(tile)
            .map(Tile::state)
            .ok_or(PlacementError::OutOfBounds)?;
        match state {
            TileState::Buildable => {}
            TileState::Road => return Err(PlacementError::Road),
            TileState::Occupied => return Err(PlacementError::Occupied),
            TileState::Resource(_) => return Err(PlacementError::Resource),
            TileState::Tower(_) => return Err(PlacementError::TowerPresent),
        }

        let cost = self
            .levels
            .level(1)
            .ok_or(PlacementError::MissingLevels)?
            .cost;
        if !self.inventory.try_spend(cost) {
            return Err(PlacementError::InsufficientResources);
        }

        let id = self.towers.insert(tile, self.grid.tile_center(tile));
        let _ = self.grid.set_state(tile, TileState::Tower(id));
        Ok(id)
    }

    fn upgrade_tower(&mut self, tower: TowerId) -> Result<u32, UpgradeError> {
        let state = self.towers.get_mut(tower).ok_or(UpgradeError::MissingTower)?;
        let next = self
            .levels
            .next_level(state.level)
            .ok_or(UpgradeError::MaxLevel)?;
        if !self.inventory.try_spend(next.cost) {
            return Err(UpgradeError::InsufficientResources);
        }
        state.level += 1;
        Ok(state.level)
    }

    fn harvest(&mut self, tile: TileCoord, damage: f32, out_events: &mut Vec<Event>) {
        let Some(TileState::Resource(mut deposit)) = self.grid.tile(tile).map(Tile::state) else {
            return;
        };

        deposit.health -= damage;
        match deposit.kind {
            ResourceKind::Tree => self.inventory.deposit(1, 0),
            ResourceKind::Stone => self.inventory.deposit(0, 1),
        }
        out_events.push(Event::ResourceHarvested {
            tile,
            kind: deposit.kind,
        });
        self.push_inventory(out_events);

        if deposit.health <= 0.0 {
            let _ = self.grid.set_state(tile, TileState::Buildable);
            out_events.push(Event::ResourceDepleted {
                tile,
                kind: deposit.kind,
            });
        } else {
            let _ = self.grid.set_state(tile, TileState::Resource(deposit));
        }
    }

    fn push_inventory(&self, out_events: &mut Vec<Event>) {
        out_events.push(Event::InventoryChanged {
            wood: self.inventory.wood(),
            stone: self.inventory.stone(),
        });
    }
}

fn phase_request_accepted(
    requested: Phase,
    result: Result<(), PhaseChangeError>,
    out_events: &mut Vec<Event>,
) -> bool {
    match result {
        Ok(()) => true,
        Err(reason) => {
            log::debug!("{requested:?} request rejected: {reason}");
            out_events.push(Event::PhaseChangeRejected { requested, reason });
            false
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureTerritory { config } => world.configure_territory(config, out_events),
        Command::ConfigureTowerLevels { levels } => {
            let max_level = levels.max_level();
            world.levels = levels;
            for tower in world.towers.iter().map(|tower| tower.id).collect::<Vec<_>>() {
                if let Some(state) = world.towers.get_mut(tower) {
                    state.level = state.level.min(max_level);
                }
            }
        }
        Command::ConfigureCycle {
            transition_duration,
        } => world.cycle.set_transition_duration(transition_duration),
        Command::Tick { dt } => world.advance(dt, out_events),
        Command::StartDay => {
            let result = world.cycle.start_day();
            if phase_request_accepted(Phase::Day, result, out_events) {
                log::info!("day started");
                out_events.push(Event::DayStarted);
                world.announce_instant_settle(out_events);
            }
        }
        Command::StartNight { wave, quota } => {
            let result = world.cycle.start_night(wave, quota);
            if phase_request_accepted(Phase::Night, result, out_events) {
                log::info!("night started: wave {} with {quota} enemies", wave.number());
                out_events.push(Event::NightStarted);
                out_events.push(Event::WaveStarted { wave });
                world.announce_instant_settle(out_events);
            }
        }
        Command::CompleteWave => {
            if let Some(wave) = world.cycle.complete_wave() {
                log::info!("wave {} completed", wave.number());
                out_events.push(Event::WaveCompleted { wave });
            }
        }
        Command::SettleTransition => {
            if let Some(phase) = world.cycle.settle() {
                out_events.push(Event::TransitionSettled { phase });
            }
        }
        Command::LatchOutcome { outcome } => {
            if world.cycle.latch(outcome) {
                log::info!("session ended: {outcome:?}");
                out_events.push(match outcome {
                    Outcome::GameOver => Event::GameOver,
                    Outcome::Victory => Event::Victory,
                });
            }
        }
        Command::RequestScene { name } => out_events.push(Event::SceneRequested { name }),
        Command::ResetGame => {
            world.cycle.reset();
            if let Some(town) = world.town.as_mut() {
                town.restore();
            }
            world.enemies.clear();
            world.projectiles.clear();
            world.timers.clear();
            log::info!("session reset");
            out_events.push(Event::GameReset);
        }
        Command::SpawnEnemy { archetype } => world.spawn_enemy(archetype, out_events),
        Command::MoveEnemy {
            enemy,
            to,
            waypoint,
        } => {
            if let Some(state) = world.enemies.get_mut(enemy).filter(|state| !state.dying) {
                state.position = to;
                match waypoint {
                    WaypointProgress::Untracked => {}
                    WaypointProgress::Reached => state.advance_waypoint(),
                    WaypointProgress::Approaching { distance } => {
                        state.previous_distance = distance;
                    }
                }
            }
        }
        Command::DetectTown { enemy } => {
            if let Some(state) = world.enemies.get_mut(enemy).filter(|state| !state.dying) {
                if state.phase == EnemyPhase::FollowingPath {
                    state.phase = EnemyPhase::Surrounding;
                    out_events.push(Event::TownDetected { enemy });
                }
            }
        }
        Command::AssignSiegePosition { enemy, position } => {
            if let Some(state) = world.enemies.get_mut(enemy).filter(|state| !state.dying) {
                if state.phase == EnemyPhase::Surrounding && state.siege_position.is_none() {
                    state.siege_position = Some(position);
                    out_events.push(Event::SiegePositionAssigned { enemy, position });
                }
            }
        }
        Command::BeginSiege { enemy } => {
            if let Some(state) = world.enemies.get_mut(enemy).filter(|state| !state.dying) {
                if state.phase == EnemyPhase::Surrounding && state.siege_position.is_some() {
                    state.phase = EnemyPhase::Attacking;
                    out_events.push(Event::SiegeBegan { enemy });
                }
            }
        }
        Command::AttackTown { enemy } => {
            if world.cycle.outcome().is_some() {
                return;
            }
            let clock = world.clock;
            let Some(town) = world.town.as_mut() else {
                return;
            };
            let Some(state) = world.enemies.get_mut(enemy).filter(|state| {
                !state.dying && state.phase == EnemyPhase::Attacking && state.attack_ready(clock)
            }) else {
                return;
            };

            state.record_attack(clock);
            let amount = state.archetype.attack_damage;
            out_events.push(Event::FireballLaunched {
                enemy,
                from: state.position,
                to: town.center(),
            });
            let destroyed = town.take_damage(amount);
            out_events.push(Event::TownDamaged {
                amount,
                remaining: town.health(),
            });
            if destroyed {
                log::info!("town destroyed");
                out_events.push(Event::TownDestroyed);
            }
        }
        Command::DamageEnemy { enemy, amount } => world.damage_enemy(enemy, amount, out_events),
        Command::ClearEnemies => {
            let ids: Vec<EnemyId> = world.enemies.iter().map(|enemy| enemy.id).collect();
            for enemy in ids {
                world.remove_enemy(enemy, out_events);
            }
            world.timers.clear();
        }
        Command::FireProjectile { tower, target } => {
            world.fire_projectile(tower, target, out_events);
        }
        Command::PlaceTower { tile } => match world.place_tower(tile) {
            Ok(tower) => {
                log::debug!("tower {} placed at {tile:?}", tower.get());
                out_events.push(Event::TowerPlaced { tower, tile });
                world.push_inventory(out_events);
            }
            Err(reason) => {
                log::warn!("tower placement at {tile:?} rejected: {reason}");
                out_events.push(Event::TowerPlacementRejected { tile, reason });
            }
        },
        Command::UpgradeTower { tower } => match world.upgrade_tower(tower) {
            Ok(level) => {
                log::debug!("tower {} upgraded to level {level}", tower.get());
                out_events.push(Event::TowerUpgraded { tower, level });
                world.push_inventory(out_events);
            }
            Err(reason) => {
                log::warn!("tower {} upgrade rejected: {reason}", tower.get());
                out_events.push(Event::TowerUpgradeRejected { tower, reason });
            }
        },
        Command::HarvestResource { tile, damage } => world.harvest(tile, damage, out_events),
        Command::DepositResources { wood, stone } => {
            world.inventory.deposit(wood, stone);
            world.push_inventory(out_events);
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use super::{Grid, World};
    use town_defence_core::{
        CycleSnapshot, EnemyId, EnemySnapshot, EnemyView, Lighting, Outcome, Phase, ProjectileId,
        TileCoord, TowerCooldownSnapshot, TowerCooldownView, TowerId, TowerLevelTable,
        TowerSnapshot, TowerView, Vec2, WaveIndex,
    };

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Simulated time elapsed since the world was created.
    #[must_use]
    pub fn clock(world: &World) -> Duration {
        world.clock
    }

    /// Provides read-only access to the tile grid.
    #[must_use]
    pub fn grid(world: &World) -> &Grid {
        &world.grid
    }

    /// Ordered road tiles from the spawn tile to the town.
    #[must_use]
    pub fn road(world: &World) -> &[TileCoord] {
        &world.road
    }

    /// Ground-plane centre of the town, if one was founded.
    #[must_use]
    pub fn town_center(world: &World) -> Option<Vec2> {
        world.town.as_ref().map(super::Town::center)
    }

    /// Current town health, if a town exists.
    #[must_use]
    pub fn town_health(world: &World) -> Option<i32> {
        world.town.as_ref().map(super::Town::health)
    }

    /// Active phase of the day/night cycle.
    #[must_use]
    pub fn phase(world: &World) -> Phase {
        world.cycle.phase()
    }

    /// Reports whether a lighting transition is in flight.
    #[must_use]
    pub fn is_transitioning(world: &World) -> bool {
        world.cycle.transitioning()
    }

    /// Current sun lighting.
    #[must_use]
    pub fn lighting(world: &World) -> Lighting {
        world.cycle.lighting()
    }

    /// Wave that most recently started.
    #[must_use]
    pub fn current_wave(world: &World) -> Option<WaveIndex> {
        world.cycle.wave()
    }

    /// Number of registered enemies, dying ones included.
    #[must_use]
    pub fn enemies_alive(world: &World) -> usize {
        world.enemies.len()
    }

    /// Enemies spawned since the active night began.
    #[must_use]
    pub fn enemies_spawned_this_wave(world: &World) -> u32 {
        world.cycle.spawned()
    }

    /// Latched terminal outcome, if any.
    #[must_use]
    pub fn outcome(world: &World) -> Option<Outcome> {
        world.cycle.outcome()
    }

    /// Summarises the cycle for the director.
    #[must_use]
    pub fn cycle_snapshot(world: &World) -> CycleSnapshot {
        let cycle = &world.cycle;
        CycleSnapshot {
            phase: cycle.phase(),
            day_active: cycle.day_active(),
            transitioning: cycle.transitioning(),
            wave: cycle.wave(),
            quota: cycle.quota(),
            spawned_this_wave: cycle.spawned(),
            enemies_alive: world.enemies.len(),
            spawning_enabled: cycle.spawning_enabled(),
            outcome: cycle.outcome(),
            town_health: town_health(world),
            clock: world.clock,
        }
    }

    /// Captures a read-only view of every registered enemy.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        let snapshots = world
            .enemies
            .iter()
            .map(|enemy| EnemySnapshot {
                id: enemy.id,
                position: enemy.position,
                health: enemy.health,
                phase: enemy.phase,
                waypoint: enemy
                    .current_waypoint()
                    .map(|tile| world.grid.tile_center(tile)),
                previous_waypoint_distance: enemy.previous_distance,
                siege_position: enemy.siege_position,
                dying: enemy.dying,
                attack_ready: enemy.attack_ready(world.clock),
                archetype: enemy.archetype,
            })
            .collect();
        EnemyView::from_snapshots(snapshots)
    }

    /// Captures a read-only view of every placed tower.
    #[must_use]
    pub fn tower_view(world: &World) -> TowerView {
        let snapshots = world
            .towers
            .iter()
            .filter_map(|tower| {
                let level = world.levels.level(tower.level)?;
                Some(TowerSnapshot {
                    id: tower.id,
                    tile: tower.tile,
                    position: tower.position,
                    level: tower.level,
                    stats: level.stats,
                })
            })
            .collect();
        TowerView::from_snapshots(snapshots)
    }

    /// Captures the remaining cooldown of every placed tower.
    #[must_use]
    pub fn tower_cooldowns(world: &World) -> TowerCooldownView {
        let snapshots = world
            .towers
            .iter()
            .filter_map(|tower| {
                let level = world.levels.level(tower.level)?;
                Some(TowerCooldownSnapshot {
                    tower: tower.id,
                    ready_in: tower.ready_in(&level.stats, world.clock),
                })
            })
            .collect();
        TowerCooldownView::from_snapshots(snapshots)
    }

    /// Provides read-only access to the tower level table.
    #[must_use]
    pub fn tower_levels(world: &World) -> &TowerLevelTable {
        &world.levels
    }

    /// Reports whether the tower exists and is below the maximum level.
    #[must_use]
    pub fn can_upgrade(world: &World, tower: TowerId) -> bool {
        world
            .towers
            .get(tower)
            .is_some_and(|state| world.levels.can_upgrade(state.level))
    }

    /// Current wood and stone counters.
    #[must_use]
    pub fn inventory(world: &World) -> InventorySnapshot {
        InventorySnapshot {
            wood: world.inventory.wood(),
            stone: world.inventory.stone(),
        }
    }

    /// Positions of projectiles in flight, in launch order.
    #[must_use]
    pub fn projectiles(world: &World) -> Vec<ProjectileSnapshot> {
        world
            .projectiles
            .iter()
            .map(|projectile| ProjectileSnapshot {
                id: projectile.id,
                target: projectile.target,
                position: projectile.position,
            })
            .collect()
    }

    /// Wood and stone held by the player.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct InventorySnapshot {
        /// Wood held.
        pub wood: u32,
        /// Stone held.
        pub stone: u32,
    }

    /// Projectile in flight.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct ProjectileSnapshot {
        /// Identifier of the projectile.
        pub id: ProjectileId,
        /// Enemy the projectile was aimed at.
        pub target: EnemyId,
        /// Current ground-plane position.
        pub position: Vec2,
    }
}
