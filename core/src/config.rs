//! Validated configuration tables consumed by the world and systems.

use std::time::Duration;

use glam::Vec2;

/// Errors raised while validating configuration tables.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// The tower level table contained no levels.
    #[error("the tower level table must contain at least one level")]
    EmptyLevelTable,
    /// A tower level used a fire rate that is zero, negative or not finite.
    #[error("tower level {level} has an invalid fire rate of {fire_rate}")]
    InvalidFireRate {
        /// One-based level index.
        level: u32,
        /// Offending fire rate.
        fire_rate: f32,
    },
    /// A tower level fired so rarely that its interval cannot be represented.
    #[error("tower level {level} fires too rarely: {fire_rate} shots per second")]
    FireIntervalOverflow {
        /// One-based level index.
        level: u32,
        /// Offending fire rate.
        fire_rate: f32,
    },
    /// A tower level dealt negative or non-finite damage.
    #[error("tower level {level} has an invalid damage of {damage}")]
    InvalidDamage {
        /// One-based level index.
        level: u32,
        /// Offending damage.
        damage: f32,
    },
    /// A tower level used a non-positive range or projectile speed.
    #[error("tower level {level} has a non-positive {field}")]
    NonPositiveStat {
        /// One-based level index.
        level: u32,
        /// Name of the offending stat.
        field: &'static str,
    },
    /// An enemy archetype carried unusable stats.
    #[error("enemy archetype has a non-positive {field}")]
    InvalidArchetype {
        /// Name of the offending stat.
        field: &'static str,
    },
    /// The wave table contained no waves with enemies.
    #[error("the wave table must contain at least one wave")]
    EmptyWaveTable,
    /// The territory layout could not hold the town and spawn point.
    #[error("the territory must be at least {minimum}x{minimum} tiles, got {columns}x{rows}")]
    TerritoryTooSmall {
        /// Requested column count.
        columns: u32,
        /// Requested row count.
        rows: u32,
        /// Smallest supported side length.
        minimum: u32,
    },
    /// Resource scatter probabilities fell outside `0.0..=1.0` or summed above one.
    #[error("resource chances must lie in 0..=1 and sum to at most 1 (tree {tree}, stone {stone})")]
    InvalidResourceChance {
        /// Probability of a tree deposit.
        tree: f32,
        /// Probability of a stone deposit.
        stone: f32,
    },
    /// The tile spacing was zero, negative or not finite.
    #[error("tile spacing must be positive, got {0}")]
    InvalidTileSpacing(f32),
}

/// Smallest grid side that fits the town footprint and a separate spawn tile.
pub const MINIMUM_TERRITORY_SIDE: u32 = 4;

/// Layout and tuning of the generated territory.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TerritoryConfig {
    /// Number of tiles along the X axis.
    pub columns: u32,
    /// Number of tiles along the Z axis.
    pub rows: u32,
    /// Distance between adjacent tile centres in world units.
    pub tile_spacing: f32,
    /// World position of tile (0, 0).
    pub origin: Vec2,
    /// Probability that a free tile receives a tree.
    pub tree_chance: f32,
    /// Probability that a free tile receives a stone deposit.
    pub stone_chance: f32,
    /// Health of a freshly founded town.
    pub town_health: i32,
    /// Health of a freshly grown resource deposit.
    pub resource_health: f32,
    /// Global seed from which the terrain and road streams are derived.
    pub seed: u64,
}

impl TerritoryConfig {
    /// Checks that the layout can hold a town, a spawn tile and sensible deposits.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.columns < MINIMUM_TERRITORY_SIDE || self.rows < MINIMUM_TERRITORY_SIDE {
            return Err(ConfigError::TerritoryTooSmall {
                columns: self.columns,
                rows: self.rows,
                minimum: MINIMUM_TERRITORY_SIDE,
            });
        }
        if !(self.tile_spacing.is_finite() && self.tile_spacing > 0.0) {
            return Err(ConfigError::InvalidTileSpacing(self.tile_spacing));
        }
        let in_unit = |chance: f32| (0.0..=1.0).contains(&chance);
        if !in_unit(self.tree_chance)
            || !in_unit(self.stone_chance)
            || self.tree_chance + self.stone_chance > 1.0
        {
            return Err(ConfigError::InvalidResourceChance {
                tree: self.tree_chance,
                stone: self.stone_chance,
            });
        }
        Ok(())
    }
}

impl Default for TerritoryConfig {
    fn default() -> Self {
        Self {
            columns: 15,
            rows: 15,
            tile_spacing: 1.0,
            origin: Vec2::ZERO,
            tree_chance: 0.3,
            stone_chance: 0.3,
            town_health: 10,
            resource_health: 50.0,
            seed: 0,
        }
    }
}

/// Combat stats of a single tower level.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerStats {
    /// Maximum distance at which enemies are acquired.
    pub range: f32,
    /// Damage dealt by each projectile.
    pub damage: f32,
    /// Shots per second.
    pub fire_rate: f32,
    /// Projectile travel speed in world units per second.
    pub projectile_speed: f32,
}

impl TowerStats {
    /// Minimum time between consecutive shots.
    ///
    /// Saturates at [`Duration::MAX`] when the rate is too small to represent.
    #[must_use]
    pub fn fire_interval(&self) -> Duration {
        Duration::try_from_secs_f32(1.0 / self.fire_rate).unwrap_or(Duration::MAX)
    }
}

/// Wood and stone required by a purchase.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ResourceCost {
    /// Wood required.
    pub wood: u32,
    /// Stone required.
    pub stone: u32,
}

/// One row of the tower level table.
#[derive(Clone, Debug, PartialEq)]
pub struct TowerLevel {
    /// Combat stats applied while the tower holds this level.
    pub stats: TowerStats,
    /// Cost of building (level one) or upgrading into this level.
    pub cost: ResourceCost,
    /// Player-facing description.
    pub description: String,
}

/// Contiguous table of tower levels, indexed from one.
#[derive(Clone, Debug, PartialEq)]
pub struct TowerLevelTable {
    levels: Vec<TowerLevel>,
}

impl TowerLevelTable {
    /// Validates and wraps the provided levels; the first entry is level one.
    pub fn new(levels: Vec<TowerLevel>) -> Result<Self, ConfigError> {
        if levels.is_empty() {
            return Err(ConfigError::EmptyLevelTable);
        }
        for (index, level) in levels.iter().enumerate() {
            let number = index as u32 + 1;
            let stats = level.stats;
            if !(stats.fire_rate.is_finite() && stats.fire_rate > 0.0) {
                return Err(ConfigError::InvalidFireRate {
                    level: number,
                    fire_rate: stats.fire_rate,
                });
            }
            if Duration::try_from_secs_f32(1.0 / stats.fire_rate).is_err() {
                return Err(ConfigError::FireIntervalOverflow {
                    level: number,
                    fire_rate: stats.fire_rate,
                });
            }
            if !(stats.damage.is_finite() && stats.damage >= 0.0) {
                return Err(ConfigError::InvalidDamage {
                    level: number,
                    damage: stats.damage,
                });
            }
            if !(stats.range > 0.0) {
                return Err(ConfigError::NonPositiveStat {
                    level: number,
                    field: "range",
                });
            }
            if !(stats.projectile_speed > 0.0) {
                return Err(ConfigError::NonPositiveStat {
                    level: number,
                    field: "projectile speed",
                });
            }
        }
        Ok(Self { levels })
    }

    /// Retrieves the definition of a one-based level.
    #[must_use]
    pub fn level(&self, level: u32) -> Option<&TowerLevel> {
        let index = usize::try_from(level.checked_sub(1)?).ok()?;
        self.levels.get(index)
    }

    /// Retrieves the definition of the level that follows `level`.
    #[must_use]
    pub fn next_level(&self, level: u32) -> Option<&TowerLevel> {
        self.level(level.checked_add(1)?)
    }

    /// Highest configured level.
    #[must_use]
    pub fn max_level(&self) -> u32 {
        self.levels.len() as u32
    }

    /// Reports whether a tower at `level` may still be upgraded.
    #[must_use]
    pub fn can_upgrade(&self, level: u32) -> bool {
        level < self.max_level()
    }
}

impl Default for TowerLevelTable {
    fn default() -> Self {
        let level = |range, damage, fire_rate, projectile_speed, wood, stone, description: &str| {
            TowerLevel {
                stats: TowerStats {
                    range,
                    damage,
                    fire_rate,
                    projectile_speed,
                },
                cost: ResourceCost { wood, stone },
                description: description.to_owned(),
            }
        };
        Self {
            levels: vec![
                level(20.0, 1.0, 1.0, 10.0, 3, 0, "Wooden watchtower"),
                level(30.0, 2.0, 1.2, 12.0, 3, 3, "Reinforced tower"),
                level(40.0, 4.0, 1.5, 15.0, 0, 9, "Stone keep"),
            ],
        }
    }
}

/// Stats shared by every enemy spawned from the same group.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemyArchetype {
    /// Ground speed in world units per second.
    pub speed: f32,
    /// Health at spawn.
    pub max_health: f32,
    /// Distance to the town centre at which the enemy leaves the road.
    pub detection_range: f32,
    /// Minimum time between attacks on the town.
    pub attack_interval: Duration,
    /// Town health removed per attack.
    pub attack_damage: u32,
    /// Radius of the siege ring around the town.
    pub surround_radius: f32,
    /// Neighbour distance considered by avoidance steering.
    pub avoidance_radius: f32,
    /// Strength of the avoidance push.
    pub avoidance_force: f32,
    /// Length of the hit flash.
    pub flash_duration: Duration,
}

impl EnemyArchetype {
    /// Baseline foot soldier.
    pub const GRUNT: Self = Self {
        speed: 2.0,
        max_health: 2.0,
        detection_range: 3.0,
        attack_interval: Duration::from_secs(3),
        attack_damage: 1,
        surround_radius: 2.0,
        avoidance_radius: 1.5,
        avoidance_force: 3.0,
        flash_duration: Duration::from_millis(300),
    };

    /// Slow, sturdy attacker that hits harder.
    pub const BRUTE: Self = Self {
        speed: 1.5,
        max_health: 4.0,
        attack_damage: 2,
        ..Self::GRUNT
    };

    /// Checks that the archetype can move, live and attack.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("speed", self.speed),
            ("max health", self.max_health),
            ("detection range", self.detection_range),
            ("surround radius", self.surround_radius),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::InvalidArchetype { field });
            }
        }
        if self.attack_interval.is_zero() {
            return Err(ConfigError::InvalidArchetype {
                field: "attack interval",
            });
        }
        Ok(())
    }
}

impl Default for EnemyArchetype {
    fn default() -> Self {
        Self::GRUNT
    }
}

/// A run of identical enemies within a wave.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnGroup {
    /// Stats of each spawned enemy.
    pub archetype: EnemyArchetype,
    /// Number of enemies spawned by the group.
    pub spawn_count: u32,
    /// Pause after each spawn.
    pub spawn_delay: Duration,
    /// Pause before the group's first spawn.
    pub start_delay: Duration,
}

/// Named, ordered list of spawn groups.
#[derive(Clone, Debug, PartialEq)]
pub struct WaveDefinition {
    /// Display name of the wave.
    pub name: String,
    /// Groups processed in order.
    pub groups: Vec<SpawnGroup>,
}

impl WaveDefinition {
    /// Total number of enemies the wave spawns.
    #[must_use]
    pub fn quota(&self) -> u32 {
        self.groups
            .iter()
            .fold(0u32, |total, group| total.saturating_add(group.spawn_count))
    }
}

/// Ordered waves of a session; the last entry is the final wave.
#[derive(Clone, Debug, PartialEq)]
pub struct WaveTable {
    waves: Vec<WaveDefinition>,
}

impl WaveTable {
    /// Wraps the provided waves, rejecting an empty table.
    pub fn new(waves: Vec<WaveDefinition>) -> Result<Self, ConfigError> {
        if waves.is_empty() {
            return Err(ConfigError::EmptyWaveTable);
        }
        Ok(Self { waves })
    }

    /// Retrieves the wave at a zero-based index.
    #[must_use]
    pub fn wave(&self, index: crate::WaveIndex) -> Option<&WaveDefinition> {
        self.waves.get(usize::try_from(index.get()).ok()?)
    }

    /// Number of configured waves.
    #[must_use]
    pub fn len(&self) -> usize {
        self.waves.len()
    }

    /// Always false; an empty table cannot be constructed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.waves.is_empty()
    }

    /// Reports whether the index names the last configured wave.
    #[must_use]
    pub fn is_final(&self, index: crate::WaveIndex) -> bool {
        usize::try_from(index.get()).map_or(false, |index| index + 1 == self.waves.len())
    }
}

impl Default for WaveTable {
    fn default() -> Self {
        let grunts = |count, start_delay| SpawnGroup {
            archetype: EnemyArchetype::GRUNT,
            spawn_count: count,
            spawn_delay: Duration::from_millis(500),
            start_delay,
        };
        let brutes = |count, start_delay| SpawnGroup {
            archetype: EnemyArchetype::BRUTE,
            spawn_count: count,
            spawn_delay: Duration::from_secs(1),
            start_delay,
        };
        Self {
            waves: vec![
                WaveDefinition {
                    name: "Scouts".to_owned(),
                    groups: vec![grunts(3, Duration::ZERO)],
                },
                WaveDefinition {
                    name: "Raiders".to_owned(),
                    groups: vec![grunts(4, Duration::ZERO), brutes(1, Duration::from_secs(2))],
                },
                WaveDefinition {
                    name: "Warband".to_owned(),
                    groups: vec![grunts(3, Duration::ZERO), brutes(2, Duration::from_secs(2))],
                },
            ],
        }
    }
}
