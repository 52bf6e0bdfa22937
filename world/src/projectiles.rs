//! Non-homing projectiles launched by towers.

use std::time::Duration;

use town_defence_core::{EnemyId, ProjectileId, TowerId, Vec2};

/// Distance from the aim point at which a projectile is considered arrived.
const ARRIVAL_RADIUS: f32 = 0.5;
/// Distance from the target at arrival that still counts as a hit.
const HIT_RADIUS: f32 = 1.0;
/// Time after launch at which an unresolved projectile is discarded.
pub(crate) const PROJECTILE_LIFETIME: Duration = Duration::from_secs(5);

#[derive(Clone, Debug)]
pub(crate) struct Projectile {
    pub(crate) id: ProjectileId,
    pub(crate) target: EnemyId,
    pub(crate) position: Vec2,
    aim: Vec2,
    damage: f32,
    speed: f32,
    expires_at: Duration,
}

/// How a projectile left play during a step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Resolution {
    /// Arrived close enough to its target.
    Hit {
        projectile: ProjectileId,
        target: EnemyId,
        damage: f32,
    },
    /// Missed, lost its target, or outlived its lifetime.
    Expired { projectile: ProjectileId },
}

#[derive(Debug, Default)]
pub(crate) struct ProjectileField {
    projectiles: Vec<Projectile>,
    next_projectile_id: u32,
}

impl ProjectileField {
    /// Launches a projectile from `origin` toward the target's current position.
    pub(crate) fn launch(
        &mut self,
        tower: TowerId,
        target: EnemyId,
        origin: Vec2,
        aim: Vec2,
        damage: f32,
        speed: f32,
        now: Duration,
    ) -> ProjectileId {
        let id = ProjectileId::new(self.next_projectile_id);
        self.next_projectile_id = self.next_projectile_id.wrapping_add(1);
        log::debug!(
            "tower {} launched projectile {} at enemy {}",
            tower.get(),
            id.get(),
            target.get()
        );
        self.projectiles.push(Projectile {
            id,
            target,
            position: origin,
            aim,
            damage,
            speed,
            expires_at: now + PROJECTILE_LIFETIME,
        });
        id
    }

    /// Advances every projectile and resolves those that arrived or expired.
    ///
    /// `target_position` yields the position of a live, non-dying enemy.
    pub(crate) fn step<F>(&mut self, dt: Duration, now: Duration, target_position: F) -> Vec<Resolution>
    where
        F: Fn(EnemyId) -> Option<Vec2>,
    {
        let mut resolved = Vec::new();
        let travel_time = dt.as_secs_f32();
        self.projectiles.retain_mut(|projectile| {
            let to_aim = projectile.aim - projectile.position;
            let travel = projectile.speed * travel_time;
            if to_aim.length() <= travel {
                projectile.position = projectile.aim;
            } else {
                projectile.position += to_aim.normalize_or_zero() * travel;
            }

            if projectile.position.distance(projectile.aim) < ARRIVAL_RADIUS {
                let hit = target_position(projectile.target)
                    .is_some_and(|target| target.distance(projectile.position) < HIT_RADIUS);
                resolved.push(if hit {
                    Resolution::Hit {
                        projectile: projectile.id,
                        target: projectile.target,
                        damage: projectile.damage,
                    }
                } else {
                    Resolution::Expired {
                        projectile: projectile.id,
                    }
                });
                return false;
            }

            if now >= projectile.expires_at {
                resolved.push(Resolution::Expired {
                    projectile: projectile.id,
                });
                return false;
            }
            true
        });
        resolved
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Projectile> {
        self.projectiles.iter()
    }

    pub(crate) fn clear(&mut self) {
        self.projectiles.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn launch(field: &mut ProjectileField, aim: Vec2) -> ProjectileId {
        field.launch(
            TowerId::new(0),
            EnemyId::new(3),
            Vec2::ZERO,
            aim,
            2.0,
            10.0,
            Duration::ZERO,
        )
    }

    #[test]
    fn projectile_hits_target_still_near_aim_point() {
        let mut field = ProjectileField::default();
        let id = launch(&mut field, Vec2::new(5.0, 0.0));

        let first = field.step(Duration::from_millis(200), Duration::from_millis(200), |_| {
            Some(Vec2::new(5.5, 0.0))
        });
        assert!(first.is_empty());

        let second = field.step(Duration::from_millis(300), Duration::from_millis(500), |_| {
            Some(Vec2::new(5.5, 0.0))
        });
        assert_eq!(
            second,
            vec![Resolution::Hit {
                projectile: id,
                target: EnemyId::new(3),
                damage: 2.0,
            }]
        );
        assert_eq!(field.iter().count(), 0);
    }

    #[test]
    fn projectile_misses_target_that_moved_away() {
        let mut field = ProjectileField::default();
        let id = launch(&mut field, Vec2::new(1.0, 0.0));

        let resolved = field.step(Duration::from_secs(1), Duration::from_secs(1), |_| {
            Some(Vec2::new(3.0, 0.0))
        });

        assert_eq!(resolved, vec![Resolution::Expired { projectile: id }]);
    }

    #[test]
    fn projectile_expires_when_target_is_gone() {
        let mut field = ProjectileField::default();
        let id = launch(&mut field, Vec2::new(1.0, 0.0));

        let resolved = field.step(Duration::from_secs(1), Duration::from_secs(1), |_| None);

        assert_eq!(resolved, vec![Resolution::Expired { projectile: id }]);
    }

    #[test]
    fn projectile_expires_after_lifetime() {
        let mut field = ProjectileField::default();
        let id = field.launch(
            TowerId::new(0),
            EnemyId::new(3),
            Vec2::ZERO,
            Vec2::new(1000.0, 0.0),
            1.0,
            1.0,
            Duration::ZERO,
        );

        assert!(field
            .step(Duration::from_secs(4), Duration::from_secs(4), |_| None)
            .is_empty());
        assert_eq!(
            field.step(Duration::from_secs(1), PROJECTILE_LIFETIME, |_| None),
            vec![Resolution::Expired { projectile: id }]
        );
    }
}
