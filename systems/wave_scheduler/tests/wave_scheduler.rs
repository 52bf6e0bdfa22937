use std::time::Duration;

use town_defence_core::{
    Command, EnemyArchetype, Event, SpawnGroup, WaveDefinition, WaveIndex, WaveTable,
};
use town_defence_system_wave_scheduler::WaveScheduler;

fn tick(millis: u64) -> Event {
    Event::TimeAdvanced {
        dt: Duration::from_millis(millis),
    }
}

fn wave_started(index: u32) -> Event {
    Event::WaveStarted {
        wave: WaveIndex::new(index),
    }
}

fn archetypes(commands: &[Command]) -> Vec<EnemyArchetype> {
    commands
        .iter()
        .map(|command| match command {
            Command::SpawnEnemy { archetype } => *archetype,
            other => panic!("unexpected command emitted: {other:?}"),
        })
        .collect()
}

fn mixed_table() -> WaveTable {
    WaveTable::new(vec![WaveDefinition {
        name: "mixed".to_owned(),
        groups: vec![
            SpawnGroup {
                archetype: EnemyArchetype::GRUNT,
                spawn_count: 2,
                spawn_delay: Duration::from_millis(500),
                start_delay: Duration::ZERO,
            },
            SpawnGroup {
                archetype: EnemyArchetype::BRUTE,
                spawn_count: 2,
                spawn_delay: Duration::from_secs(1),
                start_delay: Duration::from_secs(2),
            },
        ],
    }])
    .expect("valid table")
}

#[test]
fn first_spawn_is_immediate_when_group_has_no_start_delay() {
    let mut scheduler = WaveScheduler::new(mixed_table());
    let mut commands = Vec::new();

    scheduler.handle(&[wave_started(0)], &mut commands);

    assert_eq!(archetypes(&commands), vec![EnemyArchetype::GRUNT]);
    assert!(scheduler.is_running());
}

#[test]
fn spawns_follow_group_order_and_delays() {
    let mut scheduler = WaveScheduler::new(mixed_table());
    let mut commands = Vec::new();
    scheduler.handle(&[wave_started(0)], &mut commands);
    commands.clear();

    scheduler.handle(&[tick(499)], &mut commands);
    assert!(commands.is_empty(), "second grunt waits for the spawn delay");

    scheduler.handle(&[tick(1)], &mut commands);
    assert_eq!(archetypes(&commands), vec![EnemyArchetype::GRUNT]);
    commands.clear();

    // 500 ms spawn delay of the last grunt, then the 2 s start delay.
    scheduler.handle(&[tick(2_400)], &mut commands);
    assert!(commands.is_empty());

    scheduler.handle(&[tick(100)], &mut commands);
    assert_eq!(archetypes(&commands), vec![EnemyArchetype::BRUTE]);
    commands.clear();

    scheduler.handle(&[tick(1_000)], &mut commands);
    assert_eq!(archetypes(&commands), vec![EnemyArchetype::BRUTE]);

    scheduler.handle(&[tick(1_000)], &mut commands);
    assert!(!scheduler.is_running());
}

#[test]
fn large_tick_emits_every_due_spawn_in_order() {
    let mut scheduler = WaveScheduler::new(mixed_table());
    let mut commands = Vec::new();

    scheduler.handle(&[wave_started(0), tick(60_000)], &mut commands);

    assert_eq!(
        archetypes(&commands),
        vec![
            EnemyArchetype::GRUNT,
            EnemyArchetype::GRUNT,
            EnemyArchetype::BRUTE,
            EnemyArchetype::BRUTE,
        ]
    );
    assert!(!scheduler.is_running());
}

#[test]
fn emits_exactly_the_wave_quota() {
    let table = WaveTable::default();
    let mut scheduler = WaveScheduler::new(table.clone());

    for index in 0..table.len() as u32 {
        let mut commands = Vec::new();
        scheduler.handle(&[wave_started(index)], &mut commands);
        for _ in 0..600 {
            scheduler.handle(&[tick(100)], &mut commands);
        }
        let quota = table
            .wave(WaveIndex::new(index))
            .map(WaveDefinition::quota)
            .expect("wave exists");
        assert_eq!(commands.len() as u32, quota, "wave {index}");
    }
}

#[test]
fn day_start_cancels_pending_spawns() {
    let mut scheduler = WaveScheduler::new(mixed_table());
    let mut commands = Vec::new();
    scheduler.handle(&[wave_started(0)], &mut commands);
    commands.clear();

    scheduler.handle(&[Event::DayStarted, tick(60_000)], &mut commands);

    assert!(commands.is_empty());
    assert!(!scheduler.is_running());
}

#[test]
fn terminal_outcomes_cancel_pending_spawns() {
    for terminal in [Event::GameOver, Event::Victory, Event::GameReset] {
        let mut scheduler = WaveScheduler::new(mixed_table());
        let mut commands = Vec::new();
        scheduler.handle(&[wave_started(0)], &mut commands);
        commands.clear();

        scheduler.handle(&[terminal.clone(), tick(60_000)], &mut commands);

        assert!(commands.is_empty(), "{terminal:?} must cancel spawning");
    }
}

#[test]
fn time_before_wave_start_is_not_credited() {
    let mut scheduler = WaveScheduler::new(mixed_table());
    let mut commands = Vec::new();

    scheduler.handle(&[tick(10_000), wave_started(0)], &mut commands);

    assert_eq!(archetypes(&commands), vec![EnemyArchetype::GRUNT]);
}
