#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Town Defence simulation.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters and systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! for systems to react to deterministically. Systems consume event streams,
//! query immutable snapshots, and respond exclusively with new command
//! batches.
//!
//! Positions are expressed on the ground plane as [`Vec2`] values whose `x`
//! component maps to the world X axis and whose `y` component maps to the
//! world Z axis. Height is never simulated.

use std::time::Duration;

pub use glam::Vec2;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

mod config;
pub mod timers;

pub use config::{
    ConfigError, EnemyArchetype, ResourceCost, SpawnGroup, TerritoryConfig, TowerLevel,
    TowerLevelTable, TowerStats, WaveDefinition, WaveTable, MINIMUM_TERRITORY_SIDE,
};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Town Defence.";

/// Random stream label used when scattering resource deposits over the grid.
pub const RNG_STREAM_TERRAIN: &str = "terrain";
/// Random stream label used when carving the serpentine road.
pub const RNG_STREAM_ROAD: &str = "road";
/// Random stream label used when picking siege angles around the town.
pub const RNG_STREAM_SIEGE: &str = "siege";

/// Derives an independent seed for a named random stream from a global seed.
#[must_use]
pub fn stream_seed(global_seed: u64, label: &str) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(global_seed.to_le_bytes());
    hasher.update(label.as_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[0..8]);
    u64::from_le_bytes(bytes)
}

/// Segment of the day/night cycle currently in effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Building and gathering segment; spawning is disabled.
    Day,
    /// Defence segment; the active wave spawns.
    Night,
}

/// Terminal state of a session. Only one outcome may ever latch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// The town fell or went missing after the first wave started.
    GameOver,
    /// The final configured wave was cleared.
    Victory,
}

/// Behavioral phase of an enemy agent. Transitions only move forward.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EnemyPhase {
    /// Walking the road toward the town.
    FollowingPath,
    /// Town detected; moving toward an assigned siege position.
    Surrounding,
    /// Holding the siege position and attacking the town.
    Attacking,
}

/// Kind of harvestable deposit sitting on a tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    /// Yields wood when harvested.
    Tree,
    /// Yields stone when harvested.
    Stone,
}

/// Unique identifier assigned to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TowerId(u32);

impl TowerId {
    /// Creates a new tower identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the tower identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a projectile in flight.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProjectileId(u32);

impl ProjectileId {
    /// Creates a new projectile identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the projectile identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Zero-based index of a wave within the configured wave table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WaveIndex(u32);

impl WaveIndex {
    /// First wave of a session.
    pub const FIRST: Self = Self(0);

    /// Creates a new wave index.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the zero-based index.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// One-based wave number as shown to players.
    #[must_use]
    pub const fn number(&self) -> u32 {
        self.0 + 1
    }

    /// Index of the wave that follows this one.
    #[must_use]
    pub const fn next(&self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

/// Location of a single grid tile expressed as X and Z indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    x: u32,
    z: u32,
}

impl TileCoord {
    /// Creates a new tile coordinate.
    #[must_use]
    pub const fn new(x: u32, z: u32) -> Self {
        Self { x, z }
    }

    /// Zero-based index along the X axis.
    #[must_use]
    pub const fn x(&self) -> u32 {
        self.x
    }

    /// Zero-based index along the Z axis.
    #[must_use]
    pub const fn z(&self) -> u32 {
        self.z
    }

    /// Computes the Manhattan distance between two tile coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: TileCoord) -> u32 {
        self.x.abs_diff(other.x) + self.z.abs_diff(other.z)
    }
}

/// Directional light settings published for presentation layers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Lighting {
    /// Linear RGB colour of the sun light.
    pub color: [f32; 3],
    /// Light intensity multiplier.
    pub intensity: f32,
}

impl Lighting {
    /// Full daylight.
    pub const DAY: Self = Self {
        color: [1.0, 1.0, 1.0],
        intensity: 1.0,
    };

    /// Moonlit night.
    pub const NIGHT: Self = Self {
        color: [0.2, 0.2, 0.4],
        intensity: 0.3,
    };

    /// Linearly interpolates between two lighting settings.
    ///
    /// `t` is clamped to `0.0..=1.0`.
    #[must_use]
    pub fn lerp(self, target: Self, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        let mix = |from: f32, to: f32| from * (1.0 - t) + to * t;
        Self {
            color: [
                mix(self.color[0], target.color[0]),
                mix(self.color[1], target.color[1]),
                mix(self.color[2], target.color[2]),
            ],
            intensity: mix(self.intensity, target.intensity),
        }
    }
}

/// How an enemy progressed toward its current road waypoint during a tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum WaypointProgress {
    /// The enemy is not following the road this tick.
    Untracked,
    /// The waypoint was reached; the next waypoint becomes current.
    Reached,
    /// The waypoint is still ahead at the recorded distance.
    Approaching {
        /// Distance to the waypoint measured before moving this tick.
        distance: f32,
    },
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Generates the tile grid, carves the road and places the town.
    ConfigureTerritory {
        /// Layout and tuning of the territory.
        config: TerritoryConfig,
    },
    /// Replaces the tower level table used for placement and upgrades.
    ConfigureTowerLevels {
        /// Contiguous level table starting at level one.
        levels: TowerLevelTable,
    },
    /// Configures how long phase lighting transitions last.
    ConfigureCycle {
        /// Duration of a day or night lighting transition.
        transition_duration: Duration,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that the cycle enter the day phase.
    StartDay,
    /// Requests that the cycle enter the night phase for the provided wave.
    StartNight {
        /// Wave that spawns during this night.
        wave: WaveIndex,
        /// Total number of enemies the wave spawns.
        quota: u32,
    },
    /// Marks the active wave as completed.
    CompleteWave,
    /// Finishes any in-flight lighting transition immediately.
    SettleTransition,
    /// Latches a terminal outcome and disables spawning for good.
    LatchOutcome {
        /// Outcome to latch.
        outcome: Outcome,
    },
    /// Asks adapters to leave the simulation for the named scene.
    RequestScene {
        /// Scene name understood by the scene loader.
        name: String,
    },
    /// Restores town health, clears enemies and projectiles and rewinds the cycle.
    ResetGame,
    /// Requests that a new enemy enter the road at the spawn tile.
    SpawnEnemy {
        /// Stats applied to the spawned enemy.
        archetype: EnemyArchetype,
    },
    /// Moves an enemy and records how it progressed along the road.
    MoveEnemy {
        /// Identifier of the enemy that moved.
        enemy: EnemyId,
        /// Ground-plane position the enemy occupies after moving.
        to: Vec2,
        /// Road waypoint bookkeeping for this movement.
        waypoint: WaypointProgress,
    },
    /// Reports that an enemy detected the town and starts surrounding it.
    DetectTown {
        /// Identifier of the detecting enemy.
        enemy: EnemyId,
    },
    /// Fixes the siege position an enemy will hold while attacking.
    AssignSiegePosition {
        /// Identifier of the enemy.
        enemy: EnemyId,
        /// Point on the ring around the town.
        position: Vec2,
    },
    /// Reports that an enemy reached its siege position.
    BeginSiege {
        /// Identifier of the enemy.
        enemy: EnemyId,
    },
    /// Requests that a sieging enemy strike the town.
    AttackTown {
        /// Identifier of the attacking enemy.
        enemy: EnemyId,
    },
    /// Applies damage to an enemy.
    DamageEnemy {
        /// Identifier of the enemy receiving damage.
        enemy: EnemyId,
        /// Amount of health removed.
        amount: f32,
    },
    /// Removes every enemy from the registry immediately.
    ClearEnemies,
    /// Requests that a tower launch a projectile at the provided enemy.
    FireProjectile {
        /// Tower that fires.
        tower: TowerId,
        /// Enemy the projectile is aimed at.
        target: EnemyId,
    },
    /// Requests construction of a level one tower on a tile.
    PlaceTower {
        /// Tile receiving the tower.
        tile: TileCoord,
    },
    /// Requests that a tower advance to its next level.
    UpgradeTower {
        /// Tower to upgrade.
        tower: TowerId,
    },
    /// Strikes the resource deposit on a tile.
    HarvestResource {
        /// Tile holding the deposit.
        tile: TileCoord,
        /// Health removed from the deposit by the strike.
        damage: f32,
    },
    /// Adds resources to the inventory.
    DepositResources {
        /// Wood to add.
        wood: u32,
        /// Stone to add.
        stone: u32,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that the territory was generated.
    TerritoryConfigured {
        /// Number of tiles along the X axis.
        columns: u32,
        /// Number of tiles along the Z axis.
        rows: u32,
        /// Number of tiles in the carved road.
        road_length: usize,
    },
    /// Announces that the day phase began.
    DayStarted,
    /// Announces that the night phase began.
    NightStarted,
    /// Announces that a wave began spawning.
    WaveStarted {
        /// Wave that started.
        wave: WaveIndex,
    },
    /// Announces that every enemy of a wave spawned and died.
    WaveCompleted {
        /// Wave that completed.
        wave: WaveIndex,
    },
    /// Reports that the lighting transition into a phase finished.
    TransitionSettled {
        /// Phase whose lighting is now stable.
        phase: Phase,
    },
    /// Reports that a phase change request was refused.
    PhaseChangeRejected {
        /// Phase that was requested.
        requested: Phase,
        /// Reason the request was refused.
        reason: PhaseChangeError,
    },
    /// The town fell; the session is over.
    GameOver,
    /// The final wave was cleared; the session is won.
    Victory,
    /// Adapters should leave the simulation for the named scene.
    SceneRequested {
        /// Scene name understood by the scene loader.
        name: String,
    },
    /// The session was reset to its initial state.
    GameReset,
    /// Confirms that an enemy entered the road.
    EnemySpawned {
        /// Identifier assigned to the enemy.
        enemy: EnemyId,
        /// Ground-plane position of the spawn tile.
        position: Vec2,
    },
    /// Reports that a spawn request was refused.
    SpawnRejected {
        /// Reason the spawn failed.
        reason: SpawnError,
    },
    /// Reports that an enemy detected the town.
    TownDetected {
        /// Identifier of the enemy.
        enemy: EnemyId,
    },
    /// Confirms the siege position assigned to an enemy.
    SiegePositionAssigned {
        /// Identifier of the enemy.
        enemy: EnemyId,
        /// Assigned point on the ring around the town.
        position: Vec2,
    },
    /// Reports that an enemy reached its siege position and attacks from now on.
    SiegeBegan {
        /// Identifier of the enemy.
        enemy: EnemyId,
    },
    /// Visual fireball launched by an attacking enemy.
    FireballLaunched {
        /// Identifier of the attacking enemy.
        enemy: EnemyId,
        /// Launch point.
        from: Vec2,
        /// Town centre the fireball flies toward.
        to: Vec2,
    },
    /// The town lost health.
    TownDamaged {
        /// Health removed by the attack.
        amount: u32,
        /// Health remaining after the attack; may be negative.
        remaining: i32,
    },
    /// The town's health reached zero.
    TownDestroyed,
    /// An enemy lost health.
    EnemyDamaged {
        /// Identifier of the enemy.
        enemy: EnemyId,
        /// Health removed.
        amount: f32,
        /// Health remaining after the damage.
        remaining: f32,
    },
    /// An enemy's health reached zero; its death sequence started.
    EnemyKilled {
        /// Identifier of the enemy.
        enemy: EnemyId,
    },
    /// An enemy was removed from the live registry.
    EnemyDied {
        /// Identifier of the enemy.
        enemy: EnemyId,
    },
    /// A tower launched a projectile.
    ProjectileFired {
        /// Identifier of the projectile.
        projectile: ProjectileId,
        /// Tower that fired.
        tower: TowerId,
        /// Enemy the projectile was aimed at.
        target: EnemyId,
    },
    /// A projectile left play without striking its target.
    ProjectileExpired {
        /// Identifier of the projectile.
        projectile: ProjectileId,
    },
    /// Confirms that a tower was placed.
    TowerPlaced {
        /// Identifier assigned to the tower.
        tower: TowerId,
        /// Tile the tower occupies.
        tile: TileCoord,
    },
    /// Reports that a placement request was refused.
    TowerPlacementRejected {
        /// Tile named in the request.
        tile: TileCoord,
        /// Reason the placement failed.
        reason: PlacementError,
    },
    /// Confirms that a tower advanced a level.
    TowerUpgraded {
        /// Identifier of the tower.
        tower: TowerId,
        /// Level reached by the upgrade.
        level: u32,
    },
    /// Reports that an upgrade request was refused.
    TowerUpgradeRejected {
        /// Identifier of the tower.
        tower: TowerId,
        /// Reason the upgrade failed.
        reason: UpgradeError,
    },
    /// A resource deposit was struck and yielded one unit.
    ResourceHarvested {
        /// Tile holding the deposit.
        tile: TileCoord,
        /// Kind of resource gathered.
        kind: ResourceKind,
    },
    /// A resource deposit was exhausted; its tile became buildable.
    ResourceDepleted {
        /// Tile that held the deposit.
        tile: TileCoord,
        /// Kind of resource exhausted.
        kind: ResourceKind,
    },
    /// The inventory counters changed.
    InventoryChanged {
        /// Wood held after the change.
        wood: u32,
        /// Stone held after the change.
        stone: u32,
    },
}

/// Reasons a phase change request may be refused by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error)]
pub enum PhaseChangeError {
    /// A lighting transition is still in flight.
    #[error("a phase transition is already in progress")]
    Transitioning,
    /// A terminal outcome has latched.
    #[error("the session already ended")]
    OutcomeLatched,
    /// The day phase is already active.
    #[error("the day phase is already active")]
    AlreadyDay,
}

/// Reasons a spawn request may be refused by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error)]
pub enum SpawnError {
    /// Spawning is disabled outside the night phase.
    #[error("spawning is disabled")]
    SpawningDisabled,
    /// The active wave already spawned its full quota.
    #[error("the wave quota is already spawned")]
    QuotaReached,
    /// No road was carved, so enemies have nowhere to walk.
    #[error("no road is available")]
    NoRoad,
}

/// Reasons a tower placement request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error)]
pub enum PlacementError {
    /// The tile lies outside the grid or no territory exists.
    #[error("the tile is outside the territory")]
    OutOfBounds,
    /// Towers cannot stand on the road.
    #[error("the tile is a road")]
    Road,
    /// The tile is occupied by another structure.
    #[error("the tile is occupied by another structure")]
    Occupied,
    /// A deposit must be harvested before building.
    #[error("the tile holds an unharvested resource")]
    Resource,
    /// A tower already stands on the tile.
    #[error("a tower already stands on the tile")]
    TowerPresent,
    /// The inventory cannot cover the level one cost.
    #[error("not enough wood or stone")]
    InsufficientResources,
    /// The level table is empty.
    #[error("no tower levels are configured")]
    MissingLevels,
}

/// Reasons a tower upgrade request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error)]
pub enum UpgradeError {
    /// No tower with the provided identifier exists.
    #[error("no such tower")]
    MissingTower,
    /// The tower already reached the highest configured level.
    #[error("the tower is already at its maximum level")]
    MaxLevel,
    /// The inventory cannot cover the next level's cost.
    #[error("not enough wood or stone")]
    InsufficientResources,
}

/// Immutable representation of a single enemy's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Unique identifier assigned to the enemy.
    pub id: EnemyId,
    /// Ground-plane position of the enemy.
    pub position: Vec2,
    /// Current health.
    pub health: f32,
    /// Behavioral phase.
    pub phase: EnemyPhase,
    /// Ground-plane position of the current road waypoint, if any remain.
    pub waypoint: Option<Vec2>,
    /// Distance to the waypoint recorded on the previous tick.
    pub previous_waypoint_distance: f32,
    /// Siege position, once assigned.
    pub siege_position: Option<Vec2>,
    /// Whether the enemy is playing out its death sequence.
    pub dying: bool,
    /// Whether the attack cadence allows another strike now.
    pub attack_ready: bool,
    /// Stats the enemy spawned with.
    pub archetype: EnemyArchetype,
}

/// Read-only snapshot describing all live enemies.
#[derive(Clone, Debug, Default)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Creates a new enemy view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EnemySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured enemy snapshots in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Number of enemies captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view contains no enemies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EnemySnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single tower's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerSnapshot {
    /// Identifier allocated to the tower by the world.
    pub id: TowerId,
    /// Tile the tower occupies.
    pub tile: TileCoord,
    /// Ground-plane position of the tower.
    pub position: Vec2,
    /// Current level, starting at one.
    pub level: u32,
    /// Stats of the current level.
    pub stats: TowerStats,
}

/// Read-only snapshot describing all placed towers.
#[derive(Clone, Debug, Default)]
pub struct TowerView {
    snapshots: Vec<TowerSnapshot>,
}

impl TowerView {
    /// Creates a new tower view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TowerSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured tower snapshots in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &TowerSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<TowerSnapshot> {
        self.snapshots
    }
}

/// Cooldown state of a single tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TowerCooldownSnapshot {
    /// Identifier of the tower.
    pub tower: TowerId,
    /// Time remaining until the tower may fire again.
    pub ready_in: Duration,
}

/// Read-only snapshot of every tower's cooldown, sorted by tower identifier.
#[derive(Clone, Debug, Default)]
pub struct TowerCooldownView {
    snapshots: Vec<TowerCooldownSnapshot>,
}

impl TowerCooldownView {
    /// Creates a new cooldown view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TowerCooldownSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.tower);
        Self { snapshots }
    }

    /// Iterator over the captured cooldowns in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &TowerCooldownSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<TowerCooldownSnapshot> {
        self.snapshots
    }
}

/// Target assignment computed for a tower during a tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerTarget {
    /// Tower that acquired the target.
    pub tower: TowerId,
    /// Enemy selected as the target.
    pub enemy: EnemyId,
    /// Ground-plane position of the tower.
    pub tower_position: Vec2,
    /// Ground-plane position of the enemy when it was selected.
    pub enemy_position: Vec2,
}

/// Read-only summary of the day/night cycle used by the director and UI.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CycleSnapshot {
    /// Active phase.
    pub phase: Phase,
    /// Whether the day phase is active and the next wave has not begun.
    pub day_active: bool,
    /// Whether a lighting transition is in flight.
    pub transitioning: bool,
    /// Wave that most recently started, if any.
    pub wave: Option<WaveIndex>,
    /// Total enemies the active wave spawns.
    pub quota: u32,
    /// Enemies spawned since the active night began.
    pub spawned_this_wave: u32,
    /// Enemies currently registered, dying ones included.
    pub enemies_alive: usize,
    /// Whether spawn requests are honoured.
    pub spawning_enabled: bool,
    /// Terminal outcome, once latched.
    pub outcome: Option<Outcome>,
    /// Current town health, or `None` when no town exists.
    pub town_health: Option<i32>,
    /// Simulated time elapsed since the world was created.
    pub clock: Duration,
}

impl CycleSnapshot {
    /// Reports whether the town is missing or destroyed.
    #[must_use]
    pub fn town_fallen(&self) -> bool {
        self.town_health.map_or(true, |health| health <= 0)
    }

    /// Reports whether the active wave spawned its whole quota and no enemy remains.
    #[must_use]
    pub fn wave_cleared(&self) -> bool {
        self.spawned_this_wave >= self.quota && self.enemies_alive == 0
    }
}
