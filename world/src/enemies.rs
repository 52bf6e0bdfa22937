//! Authoritative enemy state and the live enemy registry.

use std::{collections::BTreeMap, sync::Arc, time::Duration};

use town_defence_core::{EnemyArchetype, EnemyId, EnemyPhase, TileCoord, Vec2};

/// Time a dead enemy lingers after its hit flash before removal.
pub(crate) const DEATH_LINGER: Duration = Duration::from_millis(100);

/// Outcome of applying damage to an enemy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum DamageOutcome {
    /// The enemy was already dying; nothing changed.
    Ignored,
    /// Health dropped but stayed positive.
    Wounded { remaining: f32 },
    /// Health reached zero; the enemy must be removed at `remove_at`.
    Killed { remaining: f32, remove_at: Duration },
}

#[derive(Clone, Debug)]
pub(crate) struct Enemy {
    pub(crate) id: EnemyId,
    pub(crate) archetype: EnemyArchetype,
    pub(crate) position: Vec2,
    pub(crate) health: f32,
    pub(crate) phase: EnemyPhase,
    road: Arc<[TileCoord]>,
    waypoint: usize,
    pub(crate) previous_distance: f32,
    pub(crate) siege_position: Option<Vec2>,
    last_attack: Option<Duration>,
    flash_until: Option<Duration>,
    pub(crate) dying: bool,
}

impl Enemy {
    pub(crate) fn spawn(
        id: EnemyId,
        archetype: EnemyArchetype,
        position: Vec2,
        road: Arc<[TileCoord]>,
    ) -> Self {
        Self {
            id,
            archetype,
            position,
            health: archetype.max_health,
            phase: EnemyPhase::FollowingPath,
            road,
            waypoint: 0,
            previous_distance: f32::MAX,
            siege_position: None,
            last_attack: None,
            flash_until: None,
            dying: false,
        }
    }

    pub(crate) fn current_waypoint(&self) -> Option<TileCoord> {
        self.road.get(self.waypoint).copied()
    }

    pub(crate) fn advance_waypoint(&mut self) {
        if self.waypoint < self.road.len() {
            self.waypoint += 1;
        }
        self.previous_distance = f32::MAX;
    }

    pub(crate) fn attack_ready(&self, now: Duration) -> bool {
        self.last_attack.map_or(true, |last| {
            now.saturating_sub(last) >= self.archetype.attack_interval
        })
    }

    pub(crate) fn record_attack(&mut self, now: Duration) {
        self.last_attack = Some(now);
    }

    pub(crate) fn apply_damage(&mut self, amount: f32, now: Duration) -> DamageOutcome {
        if self.dying {
            return DamageOutcome::Ignored;
        }

        self.health -= amount;
        let flashing = self.flash_until.is_some_and(|until| now < until);
        if !flashing {
            self.flash_until = Some(now + self.archetype.flash_duration);
        }

        if self.health > 0.0 {
            return DamageOutcome::Wounded {
                remaining: self.health,
            };
        }

        self.dying = true;
        let flash_end = self.flash_until.unwrap_or(now).max(now);
        DamageOutcome::Killed {
            remaining: self.health,
            remove_at: flash_end + DEATH_LINGER,
        }
    }
}

/// Registry of live enemies ordered by identifier.
#[derive(Debug, Default)]
pub(crate) struct EnemyRegistry {
    entries: BTreeMap<EnemyId, Enemy>,
    next_enemy_id: u32,
}

impl EnemyRegistry {
    pub(crate) fn allocate_id(&mut self) -> EnemyId {
        let id = EnemyId::new(self.next_enemy_id);
        self.next_enemy_id = self.next_enemy_id.wrapping_add(1);
        id
    }

    pub(crate) fn insert(&mut self, enemy: Enemy) {
        let _ = self.entries.insert(enemy.id, enemy);
    }

    pub(crate) fn get(&self, id: EnemyId) -> Option<&Enemy> {
        self.entries.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: EnemyId) -> Option<&mut Enemy> {
        self.entries.get_mut(&id)
    }

    pub(crate) fn remove(&mut self, id: EnemyId) -> Option<Enemy> {
        self.entries.remove(&id)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Enemy> {
        self.entries.values()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}
