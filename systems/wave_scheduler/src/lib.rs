#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Wave scheduler that turns configured spawn groups into spawn commands.
//!
//! A wave runs as a cooperative sequence: each group waits out its start
//! delay, then spawns its enemies one at a time separated by the spawn
//! delay. Elapsed time is consumed in order, so a single large tick emits
//! every spawn that fell due within it.

use std::time::Duration;

use town_defence_core::{Command, Event, SpawnGroup, WaveIndex, WaveTable};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Stage {
    StartDelay,
    Spawning { remaining: u32 },
}

#[derive(Clone, Debug)]
struct ActiveWave {
    wave: WaveIndex,
    groups: Vec<SpawnGroup>,
    group: usize,
    stage: Stage,
    wait: Duration,
}

impl ActiveWave {
    fn new(wave: WaveIndex, groups: Vec<SpawnGroup>) -> Self {
        let wait = groups.first().map_or(Duration::ZERO, |group| group.start_delay);
        Self {
            wave,
            groups,
            group: 0,
            stage: Stage::StartDelay,
            wait,
        }
    }
}

/// Pure system that paces enemy spawns for the active wave.
#[derive(Debug)]
pub struct WaveScheduler {
    waves: WaveTable,
    active: Option<ActiveWave>,
}

impl WaveScheduler {
    /// Creates a scheduler driving the provided wave table.
    #[must_use]
    pub fn new(waves: WaveTable) -> Self {
        Self {
            waves,
            active: None,
        }
    }

    /// Reports whether a spawn sequence is still in progress.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    /// Consumes events in order and emits the spawn commands that fell due.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        for event in events {
            match event {
                Event::WaveStarted { wave } => {
                    self.begin(*wave);
                    self.pump(Duration::ZERO, out);
                }
                Event::TimeAdvanced { dt } => self.pump(*dt, out),
                Event::DayStarted | Event::GameOver | Event::Victory | Event::GameReset => {
                    self.cancel();
                }
                _ => {}
            }
        }
    }

    fn begin(&mut self, wave: WaveIndex) {
        let Some(definition) = self.waves.wave(wave) else {
            log::warn!("wave {} is not configured; nothing to spawn", wave.number());
            self.active = None;
            return;
        };
        log::info!(
            "scheduling wave {} ({}) with {} enemies",
            wave.number(),
            definition.name,
            definition.quota()
        );
        self.active = Some(ActiveWave::new(wave, definition.groups.clone()));
    }

    fn cancel(&mut self) {
        if let Some(active) = self.active.take() {
            log::debug!("cancelled spawn sequence of wave {}", active.wave.number());
        }
    }

    fn pump(&mut self, mut budget: Duration, out: &mut Vec<Command>) {
        while let Some(active) = self.active.as_mut() {
            if active.wait > budget {
                active.wait -= budget;
                return;
            }
            budget -= active.wait;
            active.wait = Duration::ZERO;

            let Some(group) = active.groups.get(active.group).copied() else {
                log::debug!("wave {} finished spawning", active.wave.number());
                self.active = None;
                return;
            };

            match active.stage {
                Stage::StartDelay => {
                    active.stage = Stage::Spawning {
                        remaining: group.spawn_count,
                    };
                }
                Stage::Spawning { remaining: 0 } => {
                    active.group += 1;
                    active.stage = Stage::StartDelay;
                    active.wait = active
                        .groups
                        .get(active.group)
                        .map_or(Duration::ZERO, |next| next.start_delay);
                }
                Stage::Spawning { remaining } => {
                    out.push(Command::SpawnEnemy {
                        archetype: group.archetype,
                    });
                    active.stage = Stage::Spawning {
                        remaining: remaining - 1,
                    };
                    active.wait = group.spawn_delay;
                }
            }
        }
    }
}
