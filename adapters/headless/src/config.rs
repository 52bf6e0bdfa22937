//! TOML game file describing the territory, director timings, towers and waves.

use std::{collections::BTreeMap, fs, path::Path, time::Duration};

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use town_defence_core::{
    EnemyArchetype, ResourceCost, SpawnGroup, TerritoryConfig, TowerLevel, TowerLevelTable,
    TowerStats, WaveDefinition, WaveTable,
};
use town_defence_system_day_night::Config as DirectorConfig;

/// Lighting transition length used when the game file does not override it.
pub const DEFAULT_TRANSITION: Duration = Duration::from_secs(1);

/// Fully resolved session configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct GameConfig {
    /// Territory layout, town health and the global seed.
    pub territory: TerritoryConfig,
    /// Day length and menu delay.
    pub director: DirectorConfig,
    /// Duration of the lighting transition between phases.
    pub transition_duration: Duration,
    /// Tower stats and costs per level.
    pub tower_levels: TowerLevelTable,
    /// Waves of the session, the last one being final.
    pub waves: WaveTable,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            territory: TerritoryConfig::default(),
            director: DirectorConfig::default(),
            transition_duration: DEFAULT_TRANSITION,
            tower_levels: TowerLevelTable::default(),
            waves: WaveTable::default(),
        }
    }
}

impl GameConfig {
    /// Reads and resolves a game file from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read game config at {}", path.display()))?;
        Self::from_toml_str(&contents)
            .with_context(|| format!("invalid game config at {}", path.display()))
    }

    /// Parses and resolves a game file. Missing sections keep the default tuning.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let file: GameFile =
            toml::from_str(contents).context("failed to parse game config toml contents")?;
        file.resolve()
    }

    /// Replaces the global seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.territory.seed = seed;
        self
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct GameFile {
    seed: Option<u64>,
    territory: TerritorySection,
    director: DirectorSection,
    tower_levels: Vec<TowerLevelSection>,
    archetypes: BTreeMap<String, ArchetypeSection>,
    waves: Vec<WaveSection>,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct TerritorySection {
    columns: u32,
    rows: u32,
    tile_spacing: f32,
    tree_chance: f32,
    stone_chance: f32,
    town_health: i32,
    resource_health: f32,
}

impl Default for TerritorySection {
    fn default() -> Self {
        let defaults = TerritoryConfig::default();
        Self {
            columns: defaults.columns,
            rows: defaults.rows,
            tile_spacing: defaults.tile_spacing,
            tree_chance: defaults.tree_chance,
            stone_chance: defaults.stone_chance,
            town_health: defaults.town_health,
            resource_health: defaults.resource_health,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct DirectorSection {
    day_duration: f32,
    transition_duration: f32,
    outcome_delay: f32,
}

impl Default for DirectorSection {
    fn default() -> Self {
        let defaults = DirectorConfig::default();
        Self {
            day_duration: defaults.day_duration().as_secs_f32(),
            transition_duration: DEFAULT_TRANSITION.as_secs_f32(),
            outcome_delay: defaults.outcome_delay().as_secs_f32(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TowerLevelSection {
    range: f32,
    damage: f32,
    fire_rate: f32,
    projectile_speed: f32,
    #[serde(default)]
    wood: u32,
    #[serde(default)]
    stone: u32,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ArchetypeSection {
    speed: f32,
    max_health: f32,
    detection_range: f32,
    attack_interval: f32,
    attack_damage: u32,
    surround_radius: f32,
    avoidance_radius: f32,
    avoidance_force: f32,
    flash_duration: f32,
}

impl Default for ArchetypeSection {
    fn default() -> Self {
        let grunt = EnemyArchetype::GRUNT;
        Self {
            speed: grunt.speed,
            max_health: grunt.max_health,
            detection_range: grunt.detection_range,
            attack_interval: grunt.attack_interval.as_secs_f32(),
            attack_damage: grunt.attack_damage,
            surround_radius: grunt.surround_radius,
            avoidance_radius: grunt.avoidance_radius,
            avoidance_force: grunt.avoidance_force,
            flash_duration: grunt.flash_duration.as_secs_f32(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct WaveSection {
    name: String,
    #[serde(default)]
    groups: Vec<GroupSection>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct GroupSection {
    archetype: String,
    count: u32,
    #[serde(default)]
    spawn_delay: f32,
    #[serde(default)]
    start_delay: f32,
}

impl GameFile {
    fn resolve(self) -> Result<GameConfig> {
        let territory = TerritoryConfig {
            columns: self.territory.columns,
            rows: self.territory.rows,
            tile_spacing: self.territory.tile_spacing,
            tree_chance: self.territory.tree_chance,
            stone_chance: self.territory.stone_chance,
            town_health: self.territory.town_health,
            resource_health: self.territory.resource_health,
            seed: self.seed.unwrap_or_default(),
            ..TerritoryConfig::default()
        };
        territory
            .validate()
            .context("invalid [territory] section")?;

        let director = DirectorConfig::new(
            seconds(self.director.day_duration, "director.day_duration")?,
            seconds(self.director.outcome_delay, "director.outcome_delay")?,
        );
        let transition_duration = seconds(
            self.director.transition_duration,
            "director.transition_duration",
        )?;

        let tower_levels = if self.tower_levels.is_empty() {
            TowerLevelTable::default()
        } else {
            let levels = self
                .tower_levels
                .into_iter()
                .map(|level| TowerLevel {
                    stats: TowerStats {
                        range: level.range,
                        damage: level.damage,
                        fire_rate: level.fire_rate,
                        projectile_speed: level.projectile_speed,
                    },
                    cost: ResourceCost {
                        wood: level.wood,
                        stone: level.stone,
                    },
                    description: level.description,
                })
                .collect();
            TowerLevelTable::new(levels).context("invalid [[tower_levels]] table")?
        };

        let archetypes = resolve_archetypes(self.archetypes)?;
        let waves = if self.waves.is_empty() {
            WaveTable::default()
        } else {
            let waves = self
                .waves
                .into_iter()
                .map(|wave| resolve_wave(wave, &archetypes))
                .collect();
            WaveTable::new(waves).context("invalid [[waves]] table")?
        };

        Ok(GameConfig {
            territory,
            director,
            transition_duration,
            tower_levels,
            waves,
        })
    }
}

fn resolve_archetypes(
    sections: BTreeMap<String, ArchetypeSection>,
) -> Result<BTreeMap<String, EnemyArchetype>> {
    let mut archetypes = BTreeMap::from([
        ("grunt".to_owned(), EnemyArchetype::GRUNT),
        ("brute".to_owned(), EnemyArchetype::BRUTE),
    ]);
    for (name, section) in sections {
        let archetype = EnemyArchetype {
            speed: section.speed,
            max_health: section.max_health,
            detection_range: section.detection_range,
            attack_interval: seconds(section.attack_interval, "attack_interval")?,
            attack_damage: section.attack_damage,
            surround_radius: section.surround_radius,
            avoidance_radius: section.avoidance_radius,
            avoidance_force: section.avoidance_force,
            flash_duration: seconds(section.flash_duration, "flash_duration")?,
        };
        archetype
            .validate()
            .with_context(|| format!("invalid archetype `{name}`"))?;
        let _ = archetypes.insert(name, archetype);
    }
    Ok(archetypes)
}

fn resolve_wave(wave: WaveSection, archetypes: &BTreeMap<String, EnemyArchetype>) -> WaveDefinition {
    let mut groups = Vec::with_capacity(wave.groups.len());
    for (index, group) in wave.groups.into_iter().enumerate() {
        let Some(archetype) = archetypes.get(&group.archetype).copied() else {
            log::warn!(
                "wave `{}` group {index}: unknown archetype `{}`; group skipped",
                wave.name,
                group.archetype
            );
            continue;
        };
        if group.count == 0 {
            log::warn!("wave `{}` group {index}: zero spawn count; group skipped", wave.name);
            continue;
        }
        let (Ok(spawn_delay), Ok(start_delay)) = (
            seconds(group.spawn_delay, "spawn_delay"),
            seconds(group.start_delay, "start_delay"),
        ) else {
            log::warn!("wave `{}` group {index}: invalid delay; group skipped", wave.name);
            continue;
        };
        groups.push(SpawnGroup {
            archetype,
            spawn_count: group.count,
            spawn_delay,
            start_delay,
        });
    }
    WaveDefinition {
        name: wave.name,
        groups,
    }
}

fn seconds(value: f32, field: &str) -> Result<Duration> {
    if !value.is_finite() || value < 0.0 {
        bail!("`{field}` must be a non-negative number of seconds, got {value}");
    }
    Duration::try_from_secs_f32(value)
        .with_context(|| format!("`{field}` of {value} seconds is too long"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use town_defence_core::WaveIndex;

    #[test]
    fn empty_file_reproduces_default_tuning() {
        let config = GameConfig::from_toml_str("").expect("empty file should parse");
        assert_eq!(config, GameConfig::default());
    }

    #[test]
    fn sections_override_defaults() {
        let contents = r#"
            seed = 42

            [territory]
            columns = 10
            rows = 8
            town_health = 5

            [director]
            day_duration = 1.5
            transition_duration = 0.0

            [[tower_levels]]
            range = 12.0
            damage = 3.0
            fire_rate = 2.0
            projectile_speed = 20.0
            wood = 2

            [archetypes.runner]
            speed = 4.0
            max_health = 1.0

            [[waves]]
            name = "Rush"
            groups = [
                { archetype = "runner", count = 4, spawn_delay = 0.25 },
                { archetype = "brute", count = 1, start_delay = 2.0 },
            ]
        "#;

        let config = GameConfig::from_toml_str(contents).expect("file should parse");

        assert_eq!(config.territory.seed, 42);
        assert_eq!(config.territory.columns, 10);
        assert_eq!(config.territory.rows, 8);
        assert_eq!(config.territory.town_health, 5);
        assert_eq!(config.director.day_duration(), Duration::from_millis(1_500));
        assert_eq!(config.transition_duration, Duration::ZERO);
        assert_eq!(config.tower_levels.max_level(), 1);

        let wave = config.waves.wave(WaveIndex::FIRST).expect("wave exists");
        assert_eq!(wave.quota(), 5);
        assert_eq!(wave.groups[0].archetype.speed, 4.0);
        assert_eq!(wave.groups[0].spawn_delay, Duration::from_millis(250));
        assert_eq!(wave.groups[1].archetype, EnemyArchetype::BRUTE);
    }

    #[test]
    fn invalid_groups_are_skipped() {
        let contents = r#"
            [[waves]]
            name = "Broken"
            groups = [
                { archetype = "dragon", count = 3 },
                { archetype = "grunt", count = 0 },
                { archetype = "grunt", count = 2, spawn_delay = -1.0 },
                { archetype = "grunt", count = 2 },
            ]
        "#;

        let config = GameConfig::from_toml_str(contents).expect("file should parse");
        let wave = config.waves.wave(WaveIndex::FIRST).expect("wave exists");
        assert_eq!(wave.groups.len(), 1);
        assert_eq!(wave.quota(), 2);
    }

    #[test]
    fn invalid_territory_is_rejected() {
        let contents = r#"
            [territory]
            columns = 2
            rows = 2
        "#;
        assert!(GameConfig::from_toml_str(contents).is_err());
    }

    #[test]
    fn oversized_delay_is_an_error() {
        let error = GameConfig::from_toml_str("[director]\nday_duration = 1e20\n")
            .expect_err("an unrepresentable day must be rejected");
        assert!(format!("{error:#}").contains("director.day_duration"));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(GameConfig::from_toml_str("gravity = 9.81").is_err());
    }

    #[test]
    fn missing_file_reports_its_path() {
        let error = GameConfig::load("does/not/exist.toml").expect_err("file is missing");
        assert!(format!("{error:#}").contains("does/not/exist.toml"));
    }
}
