use std::time::Duration;

use town_defence_core::{
    Command, EnemyArchetype, EnemyId, Event, TerritoryConfig, TowerTarget, Vec2, WaypointProgress,
    WaveIndex,
};
use town_defence_system_tower_targeting::TowerTargeting;
use town_defence_world::{self as world, query, Tile, World};

#[test]
fn replay_produces_identical_assignments() {
    let first = replay();
    let second = replay();

    assert_eq!(first, second, "replay diverged between runs");
    assert!(
        first.iter().any(|targets| !targets.is_empty()),
        "script must produce at least one assignment"
    );
}

#[test]
fn nearest_enemy_is_selected_after_movement() {
    let assignments = replay();
    let last = assignments.last().expect("replay recorded steps");
    assert_eq!(last.len(), 1);
    assert_eq!(last[0].enemy, EnemyId::new(1));
}

fn replay() -> Vec<Vec<TowerTarget>> {
    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::ConfigureTerritory {
            config: TerritoryConfig {
                seed: 5,
                ..TerritoryConfig::default()
            },
        },
        &mut events,
    );
    world::apply(
        &mut world,
        Command::ConfigureCycle {
            transition_duration: Duration::ZERO,
        },
        &mut events,
    );
    world::apply(
        &mut world,
        Command::StartNight {
            wave: WaveIndex::FIRST,
            quota: 2,
        },
        &mut events,
    );
    world::apply(
        &mut world,
        Command::DepositResources { wood: 3, stone: 0 },
        &mut events,
    );
    let tile = query::grid(&world)
        .tiles()
        .find(|tile| tile.is_buildable())
        .map(Tile::coord)
        .expect("buildable tile");
    world::apply(&mut world, Command::PlaceTower { tile }, &mut events);

    let tower_position = query::grid(&world).tile_center(tile);
    let script = vec![
        Command::SpawnEnemy {
            archetype: EnemyArchetype::GRUNT,
        },
        Command::SpawnEnemy {
            archetype: EnemyArchetype::GRUNT,
        },
        Command::MoveEnemy {
            enemy: EnemyId::new(0),
            to: tower_position + Vec2::new(6.0, 0.0),
            waypoint: WaypointProgress::Untracked,
        },
        Command::MoveEnemy {
            enemy: EnemyId::new(1),
            to: tower_position + Vec2::new(0.0, 2.0),
            waypoint: WaypointProgress::Untracked,
        },
    ];

    let mut targeting = TowerTargeting::new();
    let mut assignments = Vec::new();
    for command in script {
        world::apply(&mut world, command, &mut events);
        let mut out = Vec::new();
        targeting.handle(
            &query::tower_view(&world),
            &query::enemy_view(&world),
            &mut out,
        );
        assignments.push(out);
    }

    assert!(
        !events
            .iter()
            .any(|event| matches!(event, Event::TowerPlacementRejected { .. })),
        "tower placement must succeed"
    );
    assignments
}
