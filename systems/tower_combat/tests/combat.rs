use std::time::Duration;

use town_defence_core::{
    Command, EnemyArchetype, EnemyId, Event, Outcome, ResourceCost, TerritoryConfig, TowerId,
    TowerLevel, TowerLevelTable, TowerStats, TowerTarget, Vec2, WaveIndex, WaypointProgress,
};
use town_defence_system_tower_combat::TowerCombat;
use town_defence_world::{self as world, query, Tile, World};

fn level(fire_rate: f32) -> TowerLevel {
    TowerLevel {
        stats: TowerStats {
            range: 20.0,
            damage: 0.5,
            fire_rate,
            projectile_speed: 10.0,
        },
        cost: ResourceCost { wood: 1, stone: 0 },
        description: format!("{fire_rate} shots per second"),
    }
}

/// One tower and one grunt standing three units east of it, at night.
fn skirmish() -> World {
    let mut world = World::new();
    let mut events = Vec::new();
    let levels = TowerLevelTable::new(vec![level(1.0), level(4.0)]).expect("valid levels");
    for command in [
        Command::ConfigureTerritory {
            config: TerritoryConfig {
                seed: 17,
                ..TerritoryConfig::default()
            },
        },
        Command::ConfigureTowerLevels { levels },
        Command::ConfigureCycle {
            transition_duration: Duration::ZERO,
        },
        Command::DepositResources { wood: 2, stone: 0 },
    ] {
        world::apply(&mut world, command, &mut events);
    }

    let tile = query::grid(&world)
        .tiles()
        .find(|tile| tile.is_buildable())
        .map(Tile::coord)
        .expect("territory has a buildable tile");
    world::apply(&mut world, Command::PlaceTower { tile }, &mut events);
    world::apply(
        &mut world,
        Command::StartNight {
            wave: WaveIndex::FIRST,
            quota: 1,
        },
        &mut events,
    );
    world::apply(
        &mut world,
        Command::SpawnEnemy {
            archetype: EnemyArchetype::GRUNT,
        },
        &mut events,
    );
    let tower = query::grid(&world).tile_center(tile);
    world::apply(
        &mut world,
        Command::MoveEnemy {
            enemy: EnemyId::new(0),
            to: tower + Vec2::new(3.0, 0.0),
            waypoint: WaypointProgress::Untracked,
        },
        &mut events,
    );
    world
}

fn targets(world: &World) -> Vec<TowerTarget> {
    let enemies = query::enemy_view(world);
    query::tower_view(world)
        .iter()
        .filter_map(|tower| {
            let enemy = enemies.iter().find(|enemy| !enemy.dying)?;
            Some(TowerTarget {
                tower: tower.id,
                enemy: enemy.id,
                tower_position: tower.position,
                enemy_position: enemy.position,
            })
        })
        .collect()
}

fn engage(combat: &mut TowerCombat, world: &mut World) -> Vec<Event> {
    let mut commands = Vec::new();
    combat.handle(
        &query::cycle_snapshot(world),
        &query::tower_view(world),
        &query::tower_cooldowns(world),
        &targets(world),
        &mut commands,
    );
    let mut events = Vec::new();
    for command in commands {
        world::apply(world, command, &mut events);
    }
    events
}

fn shots(events: &[Event]) -> usize {
    events
        .iter()
        .filter(|event| matches!(event, Event::ProjectileFired { .. }))
        .count()
}

fn tick(world: &mut World, millis: u64) {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::Tick {
            dt: Duration::from_millis(millis),
        },
        &mut events,
    );
}

#[test]
fn upgrade_shortens_the_cooldown_of_a_cooling_tower() {
    let mut world = skirmish();
    let mut combat = TowerCombat::new();

    assert_eq!(shots(&engage(&mut combat, &mut world)), 1);

    tick(&mut world, 300);
    assert_eq!(shots(&engage(&mut combat, &mut world)), 0);

    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::UpgradeTower {
            tower: TowerId::new(0),
        },
        &mut events,
    );
    assert!(events.contains(&Event::TowerUpgraded {
        tower: TowerId::new(0),
        level: 2,
    }));

    assert_eq!(shots(&engage(&mut combat, &mut world)), 1);
}

#[test]
fn victory_silences_towers_while_enemies_remain() {
    let mut world = skirmish();
    let mut combat = TowerCombat::new();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::LatchOutcome {
            outcome: Outcome::Victory,
        },
        &mut events,
    );

    assert_eq!(query::enemies_alive(&world), 1);
    assert_eq!(shots(&engage(&mut combat, &mut world)), 0);
    assert!(query::projectiles(&world).is_empty());
}
