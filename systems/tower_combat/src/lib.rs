#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that turns tower targets into projectile launches.
//!
//! A target only becomes a shot when the session is still undecided, the
//! tower's cooldown elapsed and the enemy still lies within the range of the
//! tower's current level. Each tower fires at most once per call.

use town_defence_core::{
    Command, CycleSnapshot, TowerCooldownView, TowerId, TowerTarget, TowerView,
};

/// Tower combat system that reuses its armed-tower buffer between ticks.
#[derive(Debug, Default)]
pub struct TowerCombat {
    armed: Vec<ArmedTower>,
}

#[derive(Clone, Copy, Debug)]
struct ArmedTower {
    id: TowerId,
    range_squared: f32,
    fired: bool,
}

impl TowerCombat {
    /// Creates a new tower combat system.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits `Command::FireProjectile` for every armed tower with a target in range.
    pub fn handle(
        &mut self,
        cycle: &CycleSnapshot,
        towers: &TowerView,
        cooldowns: &TowerCooldownView,
        targets: &[TowerTarget],
        out: &mut Vec<Command>,
    ) {
        if cycle.outcome.is_some() || targets.is_empty() {
            return;
        }

        self.arm(towers, cooldowns);
        if self.armed.is_empty() {
            return;
        }

        for target in targets {
            let Ok(index) = self
                .armed
                .binary_search_by_key(&target.tower, |armed| armed.id)
            else {
                continue;
            };
            let armed = &mut self.armed[index];
            if armed.fired {
                continue;
            }
            let distance_squared = target.tower_position.distance_squared(target.enemy_position);
            if distance_squared > armed.range_squared {
                continue;
            }

            armed.fired = true;
            out.push(Command::FireProjectile {
                tower: target.tower,
                target: target.enemy,
            });
        }
    }

    // Both views are sorted by tower id, so the armed list is too.
    fn arm(&mut self, towers: &TowerView, cooldowns: &TowerCooldownView) {
        self.armed.clear();
        let mut cooldowns = cooldowns.iter().peekable();
        for tower in towers.iter() {
            while cooldowns.next_if(|cooldown| cooldown.tower < tower.id).is_some() {}
            let Some(cooldown) = cooldowns.next_if(|cooldown| cooldown.tower == tower.id) else {
                continue;
            };
            let range = tower.stats.range;
            if !cooldown.ready_in.is_zero() || !(range.is_finite() && range > 0.0) {
                continue;
            }
            self.armed.push(ArmedTower {
                id: tower.id,
                range_squared: range * range,
                fired: false,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use town_defence_core::{
        EnemyId, Outcome, Phase, TileCoord, TowerCooldownSnapshot, TowerSnapshot, TowerStats,
        Vec2, WaveIndex,
    };

    fn cycle(outcome: Option<Outcome>) -> CycleSnapshot {
        CycleSnapshot {
            phase: Phase::Night,
            day_active: false,
            transitioning: false,
            wave: Some(WaveIndex::FIRST),
            quota: 3,
            spawned_this_wave: 1,
            enemies_alive: 1,
            spawning_enabled: true,
            outcome,
            town_health: Some(10),
            clock: Duration::from_secs(12),
        }
    }

    fn tower(id: u32, range: f32) -> TowerSnapshot {
        TowerSnapshot {
            id: TowerId::new(id),
            tile: TileCoord::new(id, 0),
            position: Vec2::new(id as f32, 0.0),
            level: 1,
            stats: TowerStats {
                range,
                damage: 1.0,
                fire_rate: 1.0,
                projectile_speed: 10.0,
            },
        }
    }

    fn cooldown(id: u32, ready_in: Duration) -> TowerCooldownSnapshot {
        TowerCooldownSnapshot {
            tower: TowerId::new(id),
            ready_in,
        }
    }

    fn target(tower: u32, enemy: u32, offset: f32) -> TowerTarget {
        let tower_position = Vec2::new(tower as f32, 0.0);
        TowerTarget {
            tower: TowerId::new(tower),
            enemy: EnemyId::new(enemy),
            tower_position,
            enemy_position: tower_position + Vec2::new(0.0, offset),
        }
    }

    fn fire(tower: u32, enemy: u32) -> Command {
        Command::FireProjectile {
            tower: TowerId::new(tower),
            target: EnemyId::new(enemy),
        }
    }

    #[test]
    fn ready_towers_fire_in_target_order() {
        let mut combat = TowerCombat::new();
        let towers = TowerView::from_snapshots(vec![tower(5, 20.0), tower(2, 20.0)]);
        let cooldowns = TowerCooldownView::from_snapshots(vec![
            cooldown(5, Duration::ZERO),
            cooldown(2, Duration::ZERO),
        ]);
        let mut out = Vec::new();

        combat.handle(
            &cycle(None),
            &towers,
            &cooldowns,
            &[target(2, 4, 3.0), target(5, 1, 19.0)],
            &mut out,
        );

        assert_eq!(out, vec![fire(2, 4), fire(5, 1)]);
    }

    #[test]
    fn cooling_and_unknown_towers_hold_fire() {
        let mut combat = TowerCombat::new();
        let towers = TowerView::from_snapshots(vec![tower(3, 20.0), tower(8, 20.0)]);
        let cooldowns = TowerCooldownView::from_snapshots(vec![
            cooldown(3, Duration::from_millis(250)),
            cooldown(8, Duration::ZERO),
        ]);
        let mut out = Vec::new();

        combat.handle(
            &cycle(None),
            &towers,
            &cooldowns,
            &[target(3, 9, 1.0), target(8, 2, 1.0), target(42, 3, 1.0)],
            &mut out,
        );

        assert_eq!(out, vec![fire(8, 2)]);
    }

    #[test]
    fn target_beyond_current_range_is_dropped() {
        let mut combat = TowerCombat::new();
        let towers = TowerView::from_snapshots(vec![tower(1, 10.0)]);
        let cooldowns = TowerCooldownView::from_snapshots(vec![cooldown(1, Duration::ZERO)]);
        let mut out = Vec::new();

        combat.handle(
            &cycle(None),
            &towers,
            &cooldowns,
            &[target(1, 6, 10.5)],
            &mut out,
        );
        assert!(out.is_empty());

        combat.handle(
            &cycle(None),
            &towers,
            &cooldowns,
            &[target(1, 6, 10.0)],
            &mut out,
        );
        assert_eq!(out, vec![fire(1, 6)]);
    }

    #[test]
    fn tower_fires_once_per_tick() {
        let mut combat = TowerCombat::new();
        let towers = TowerView::from_snapshots(vec![tower(0, 20.0)]);
        let cooldowns = TowerCooldownView::from_snapshots(vec![cooldown(0, Duration::ZERO)]);
        let mut out = Vec::new();

        combat.handle(
            &cycle(None),
            &towers,
            &cooldowns,
            &[target(0, 1, 2.0), target(0, 2, 1.0)],
            &mut out,
        );

        assert_eq!(out, vec![fire(0, 1)]);
    }

    #[test]
    fn latched_outcome_is_silent() {
        for outcome in [Outcome::GameOver, Outcome::Victory] {
            let mut combat = TowerCombat::new();
            let towers = TowerView::from_snapshots(vec![tower(1, 20.0)]);
            let cooldowns = TowerCooldownView::from_snapshots(vec![cooldown(1, Duration::ZERO)]);
            let mut out = Vec::new();

            combat.handle(
                &cycle(Some(outcome)),
                &towers,
                &cooldowns,
                &[target(1, 7, 1.0)],
                &mut out,
            );

            assert!(out.is_empty());
        }
    }
}
