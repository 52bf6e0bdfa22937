//! Authoritative tower state management utilities.

use std::{collections::BTreeMap, time::Duration};

use town_defence_core::{TileCoord, TowerId, TowerStats, Vec2};

/// Snapshot of a tower stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct TowerState {
    /// Identifier allocated by the world for the tower.
    pub(crate) id: TowerId,
    /// Tile occupied by the tower.
    pub(crate) tile: TileCoord,
    /// Ground-plane centre of the tower.
    pub(crate) position: Vec2,
    /// One-based index into the level table.
    pub(crate) level: u32,
    /// Simulation time of the most recent shot.
    pub(crate) last_fire: Option<Duration>,
}

impl TowerState {
    /// Time remaining until the tower may fire again with the provided stats.
    pub(crate) fn ready_in(&self, stats: &TowerStats, now: Duration) -> Duration {
        self.last_fire.map_or(Duration::ZERO, |last| {
            last.saturating_add(stats.fire_interval()).saturating_sub(now)
        })
    }
}

/// Registry that stores towers and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct TowerRegistry {
    entries: BTreeMap<TowerId, TowerState>,
    next_tower_id: TowerId,
}

impl TowerRegistry {
    /// Creates an empty tower registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_tower_id: TowerId::new(0),
        }
    }

    /// Inserts a level one tower and returns its identifier.
    pub(crate) fn insert(&mut self, tile: TileCoord, position: Vec2) -> TowerId {
        let id = self.next_tower_id;
        self.next_tower_id = TowerId::new(id.get().wrapping_add(1));
        let _ = self.entries.insert(
            id,
            TowerState {
                id,
                tile,
                position,
                level: 1,
                last_fire: None,
            },
        );
        id
    }

    pub(crate) fn get(&self, id: TowerId) -> Option<&TowerState> {
        self.entries.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: TowerId) -> Option<&mut TowerState> {
        self.entries.get_mut(&id)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &TowerState> {
        self.entries.values()
    }

    /// Drops every tower while keeping the identifier counter monotonic.
    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}
