#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that steers enemies along the road and into a siege ring.
//!
//! Each tick an enemy either walks straight at its current road waypoint,
//! or, once the town is within detection range, walks to a private point on
//! a ring around the town while pushing away from close neighbours. Enemies
//! that reach their ring point attack the town; the world gates the attack
//! cadence.

use std::time::Duration;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use town_defence_core::{
    stream_seed, Command, EnemyPhase, EnemySnapshot, EnemyView, Event, Vec2, WaypointProgress,
    RNG_STREAM_SIEGE,
};

/// Distance below which a road waypoint counts as reached.
const WAYPOINT_ARRIVAL: f32 = 0.5;
/// Previous distance below which a growing distance means the waypoint was passed.
const OSCILLATION_GUARD: f32 = 1.0;
/// Distance below which the siege position counts as reached.
const SIEGE_ARRIVAL: f32 = 0.5;
/// Minimum spacing between two siege positions.
const SIEGE_SEPARATION: f32 = 1.5;
/// Random ring angles tried before accepting a crowded siege position.
const SIEGE_ATTEMPTS: usize = 10;
/// Fraction of the avoidance radius inside which neighbours repel.
const AVOIDANCE_REACH: f32 = 0.7;
/// Weight of the avoidance push relative to the goal direction.
const AVOIDANCE_WEIGHT: f32 = 0.3;
/// Avoidance pushes weaker than this are ignored.
const AVOIDANCE_THRESHOLD: f32 = 0.1;

/// Enemy behavior system that reuses scratch buffers between ticks.
#[derive(Debug)]
pub struct EnemyBehavior {
    rng: ChaCha8Rng,
    siege_positions: Vec<Vec2>,
    neighbours: Vec<Vec2>,
}

impl EnemyBehavior {
    /// Creates a behavior system whose siege angles derive from the global seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(stream_seed(seed, RNG_STREAM_SIEGE)),
            siege_positions: Vec::new(),
            neighbours: Vec::new(),
        }
    }

    /// Emits movement, detection, siege and attack commands for the elapsed time.
    pub fn handle(
        &mut self,
        events: &[Event],
        enemies: &EnemyView,
        town_center: Option<Vec2>,
        out: &mut Vec<Command>,
    ) {
        let elapsed = events.iter().fold(Duration::ZERO, |total, event| match event {
            Event::TimeAdvanced { dt } => total.saturating_add(*dt),
            _ => total,
        });
        if elapsed.is_zero() {
            return;
        }
        let Some(town) = town_center else {
            return;
        };
        let dt = elapsed.as_secs_f32();

        self.siege_positions.clear();
        self.siege_positions
            .extend(enemies.iter().filter_map(|enemy| enemy.siege_position));

        for enemy in enemies.iter().filter(|enemy| !enemy.dying) {
            let mut phase = enemy.phase;

            if phase == EnemyPhase::FollowingPath {
                let in_range = enemy.position.distance(town) <= enemy.archetype.detection_range;
                if in_range || enemy.waypoint.is_none() {
                    if !in_range {
                        log::debug!(
                            "enemy {} ran out of road outside detection range",
                            enemy.id.get()
                        );
                    }
                    out.push(Command::DetectTown { enemy: enemy.id });
                    phase = EnemyPhase::Surrounding;
                } else {
                    follow_road(enemy, dt, out);
                    continue;
                }
            }

            let siege = match enemy.siege_position {
                Some(position) => position,
                None => {
                    let position = self.pick_siege_position(enemy, town);
                    self.siege_positions.push(position);
                    out.push(Command::AssignSiegePosition {
                        enemy: enemy.id,
                        position,
                    });
                    position
                }
            };

            if phase == EnemyPhase::Surrounding {
                if enemy.position.distance(siege) > SIEGE_ARRIVAL {
                    let to = self.approach_siege(enemy, enemies, siege, dt);
                    out.push(Command::MoveEnemy {
                        enemy: enemy.id,
                        to,
                        waypoint: WaypointProgress::Untracked,
                    });
                    continue;
                }
                out.push(Command::BeginSiege { enemy: enemy.id });
                out.push(Command::AttackTown { enemy: enemy.id });
                continue;
            }

            if enemy.attack_ready {
                out.push(Command::AttackTown { enemy: enemy.id });
            }
        }
    }

    fn pick_siege_position(&mut self, enemy: &EnemySnapshot, town: Vec2) -> Vec2 {
        let radius = enemy.archetype.surround_radius;
        let mut direction = (enemy.position - town).normalize_or_zero();
        if direction == Vec2::ZERO {
            let random = Vec2::new(self.rng.gen_range(-1.0..1.0), self.rng.gen_range(-1.0..1.0));
            direction = random.try_normalize().unwrap_or(Vec2::X);
        }

        let mut candidate = town + direction * radius;
        for _ in 0..SIEGE_ATTEMPTS {
            let crowded = self
                .siege_positions
                .iter()
                .any(|taken| taken.distance(candidate) < SIEGE_SEPARATION);
            if !crowded {
                break;
            }
            let angle = self.rng.gen_range(0.0..std::f32::consts::TAU);
            candidate = town + Vec2::from_angle(angle) * radius;
        }
        candidate
    }

    fn approach_siege(
        &mut self,
        enemy: &EnemySnapshot,
        enemies: &EnemyView,
        siege: Vec2,
        dt: f32,
    ) -> Vec2 {
        self.neighbours.clear();
        self.neighbours.extend(
            enemies
                .iter()
                .filter(|other| other.id != enemy.id)
                .map(|other| other.position),
        );

        let toward = siege - enemy.position;
        let goal = toward.normalize_or_zero();
        let push = avoidance(
            enemy.position,
            &self.neighbours,
            enemy.archetype.avoidance_radius,
            enemy.archetype.avoidance_force,
        );

        let mut direction = goal;
        if push.length() > AVOIDANCE_THRESHOLD {
            direction += push * AVOIDANCE_WEIGHT;
        }
        let direction = direction.try_normalize().unwrap_or(goal);

        let step = enemy.archetype.speed * dt;
        if direction == goal && step >= toward.length() {
            return siege;
        }
        enemy.position + direction * step
    }
}

fn follow_road(enemy: &EnemySnapshot, dt: f32, out: &mut Vec<Command>) {
    let Some(waypoint) = enemy.waypoint else {
        return;
    };

    let distance = enemy.position.distance(waypoint);
    let step = enemy.archetype.speed * dt;
    let to = if step >= distance {
        waypoint
    } else {
        enemy.position + (waypoint - enemy.position).normalize_or_zero() * step
    };

    let passed = distance > enemy.previous_waypoint_distance
        && enemy.previous_waypoint_distance < OSCILLATION_GUARD;
    let progress = if distance < WAYPOINT_ARRIVAL || passed {
        WaypointProgress::Reached
    } else {
        WaypointProgress::Approaching { distance }
    };

    out.push(Command::MoveEnemy {
        enemy: enemy.id,
        to,
        waypoint: progress,
    });
}

/// Sums the repulsion from neighbours closer than the reduced avoidance radius.
fn avoidance(position: Vec2, neighbours: &[Vec2], radius: f32, force: f32) -> Vec2 {
    let reach = radius * AVOIDANCE_REACH;
    if reach <= 0.0 {
        return Vec2::ZERO;
    }
    neighbours
        .iter()
        .fold(Vec2::ZERO, |push, neighbour| {
            let distance = position.distance(*neighbour);
            if distance >= reach {
                return push;
            }
            let away = (position - *neighbour).normalize_or_zero();
            push + away * ((reach - distance) / reach) * force
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use town_defence_core::{EnemyArchetype, EnemyId};

    fn snapshot(id: u32, position: Vec2) -> EnemySnapshot {
        EnemySnapshot {
            id: EnemyId::new(id),
            position,
            health: 2.0,
            phase: EnemyPhase::FollowingPath,
            waypoint: Some(Vec2::new(10.0, 0.0)),
            previous_waypoint_distance: f32::MAX,
            siege_position: None,
            dying: false,
            attack_ready: true,
            archetype: EnemyArchetype::GRUNT,
        }
    }

    fn tick(dt: Duration) -> Vec<Event> {
        vec![Event::TimeAdvanced { dt }]
    }

    #[test]
    fn no_time_means_no_commands() {
        let mut system = EnemyBehavior::new(1);
        let enemies = EnemyView::from_snapshots(vec![snapshot(0, Vec2::ZERO)]);
        let mut out = Vec::new();

        system.handle(&[], &enemies, Some(Vec2::new(50.0, 0.0)), &mut out);

        assert!(out.is_empty());
    }

    #[test]
    fn road_following_moves_straight_at_waypoint() {
        let mut system = EnemyBehavior::new(1);
        let enemies = EnemyView::from_snapshots(vec![snapshot(0, Vec2::ZERO)]);
        let mut out = Vec::new();

        system.handle(
            &tick(Duration::from_millis(500)),
            &enemies,
            Some(Vec2::new(50.0, 50.0)),
            &mut out,
        );

        assert_eq!(
            out,
            vec![Command::MoveEnemy {
                enemy: EnemyId::new(0),
                to: Vec2::new(1.0, 0.0),
                waypoint: WaypointProgress::Approaching { distance: 10.0 },
            }]
        );
    }

    #[test]
    fn waypoint_is_reached_within_arrival_radius() {
        let mut system = EnemyBehavior::new(1);
        let enemies = EnemyView::from_snapshots(vec![snapshot(0, Vec2::new(9.6, 0.0))]);
        let mut out = Vec::new();

        system.handle(
            &tick(Duration::from_millis(100)),
            &enemies,
            Some(Vec2::new(50.0, 50.0)),
            &mut out,
        );

        assert!(matches!(
            out.as_slice(),
            [Command::MoveEnemy {
                waypoint: WaypointProgress::Reached,
                ..
            }]
        ));
    }

    #[test]
    fn growing_distance_after_close_approach_advances_waypoint() {
        let mut system = EnemyBehavior::new(1);
        let mut enemy = snapshot(0, Vec2::new(10.8, 0.0));
        enemy.previous_waypoint_distance = 0.7;
        let enemies = EnemyView::from_snapshots(vec![enemy]);
        let mut out = Vec::new();

        system.handle(
            &tick(Duration::from_millis(10)),
            &enemies,
            Some(Vec2::new(50.0, 50.0)),
            &mut out,
        );

        assert!(matches!(
            out.as_slice(),
            [Command::MoveEnemy {
                waypoint: WaypointProgress::Reached,
                ..
            }]
        ));
    }

    #[test]
    fn detection_assigns_siege_position_on_ring_toward_enemy() {
        let mut system = EnemyBehavior::new(1);
        let enemies = EnemyView::from_snapshots(vec![snapshot(0, Vec2::new(3.0, 0.0))]);
        let mut out = Vec::new();

        system.handle(
            &tick(Duration::from_millis(100)),
            &enemies,
            Some(Vec2::ZERO),
            &mut out,
        );

        assert_eq!(out[0], Command::DetectTown { enemy: EnemyId::new(0) });
        assert_eq!(
            out[1],
            Command::AssignSiegePosition {
                enemy: EnemyId::new(0),
                position: Vec2::new(2.0, 0.0),
            }
        );
        assert!(matches!(out[2], Command::MoveEnemy { .. }));
    }

    #[test]
    fn siege_positions_assigned_in_one_tick_keep_their_distance() {
        let mut system = EnemyBehavior::new(7);
        let snapshots = (0..3)
            .map(|id| snapshot(id, Vec2::new(2.5, 0.1 * id as f32)))
            .collect();
        let enemies = EnemyView::from_snapshots(snapshots);
        let mut out = Vec::new();

        system.handle(
            &tick(Duration::from_millis(16)),
            &enemies,
            Some(Vec2::ZERO),
            &mut out,
        );

        let positions: Vec<Vec2> = out
            .iter()
            .filter_map(|command| match command {
                Command::AssignSiegePosition { position, .. } => Some(*position),
                _ => None,
            })
            .collect();
        assert_eq!(positions.len(), 3);
        for (index, first) in positions.iter().enumerate() {
            assert!((first.length() - 2.0).abs() < 1e-4);
            for second in &positions[index + 1..] {
                assert!(first.distance(*second) >= SIEGE_SEPARATION);
            }
        }
    }

    #[test]
    fn enemy_at_siege_position_begins_siege_and_attacks() {
        let mut system = EnemyBehavior::new(1);
        let mut enemy = snapshot(0, Vec2::new(2.1, 0.0));
        enemy.phase = EnemyPhase::Surrounding;
        enemy.siege_position = Some(Vec2::new(2.0, 0.0));
        let enemies = EnemyView::from_snapshots(vec![enemy]);
        let mut out = Vec::new();

        system.handle(
            &tick(Duration::from_millis(16)),
            &enemies,
            Some(Vec2::ZERO),
            &mut out,
        );

        assert_eq!(
            out,
            vec![
                Command::BeginSiege {
                    enemy: EnemyId::new(0)
                },
                Command::AttackTown {
                    enemy: EnemyId::new(0)
                },
            ]
        );
    }

    #[test]
    fn attackers_wait_for_cooldown() {
        let mut system = EnemyBehavior::new(1);
        let mut enemy = snapshot(0, Vec2::new(2.0, 0.0));
        enemy.phase = EnemyPhase::Attacking;
        enemy.siege_position = Some(Vec2::new(2.0, 0.0));
        enemy.attack_ready = false;
        let enemies = EnemyView::from_snapshots(vec![enemy]);
        let mut out = Vec::new();

        system.handle(
            &tick(Duration::from_millis(16)),
            &enemies,
            Some(Vec2::ZERO),
            &mut out,
        );

        assert!(out.is_empty());
    }

    #[test]
    fn exhausted_road_outside_range_forces_detection() {
        let mut system = EnemyBehavior::new(1);
        let mut enemy = snapshot(0, Vec2::new(20.0, 0.0));
        enemy.waypoint = None;
        let enemies = EnemyView::from_snapshots(vec![enemy]);
        let mut out = Vec::new();

        system.handle(
            &tick(Duration::from_millis(16)),
            &enemies,
            Some(Vec2::ZERO),
            &mut out,
        );

        assert_eq!(out[0], Command::DetectTown { enemy: EnemyId::new(0) });
    }

    #[test]
    fn dying_enemies_are_frozen() {
        let mut system = EnemyBehavior::new(1);
        let mut enemy = snapshot(0, Vec2::ZERO);
        enemy.dying = true;
        let enemies = EnemyView::from_snapshots(vec![enemy]);
        let mut out = Vec::new();

        system.handle(
            &tick(Duration::from_millis(16)),
            &enemies,
            Some(Vec2::new(1.0, 0.0)),
            &mut out,
        );

        assert!(out.is_empty());
    }

    #[test]
    fn avoidance_pushes_away_from_close_neighbours_only() {
        let push = avoidance(
            Vec2::ZERO,
            &[Vec2::new(0.5, 0.0), Vec2::new(0.0, 5.0)],
            1.5,
            3.0,
        );
        assert!(push.x < 0.0);
        assert_eq!(push.y, 0.0);
        assert_eq!(avoidance(Vec2::ZERO, &[Vec2::new(2.0, 0.0)], 1.5, 3.0), Vec2::ZERO);
    }
}
