//! Town health bookkeeping.

use town_defence_core::{TileCoord, Vec2};

/// Tile holding the lower corner of the town footprint.
pub(crate) const TOWN_TILE: TileCoord = TileCoord::new(1, 1);

/// Side length of the square town footprint in tiles.
pub(crate) const TOWN_FOOTPRINT: u32 = 2;

/// Health sink that enemies besiege.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Town {
    health: i32,
    max_health: i32,
    center: Vec2,
    destroyed: bool,
}

impl Town {
    pub(crate) fn new(health: i32, center: Vec2) -> Self {
        Self {
            health,
            max_health: health,
            center,
            destroyed: false,
        }
    }

    pub(crate) fn health(&self) -> i32 {
        self.health
    }

    pub(crate) fn center(&self) -> Vec2 {
        self.center
    }

    /// Removes health, returning `true` exactly once when the town falls.
    pub(crate) fn take_damage(&mut self, amount: u32) -> bool {
        let amount = i32::try_from(amount).unwrap_or(i32::MAX);
        self.health = self.health.saturating_sub(amount);
        if self.health <= 0 && !self.destroyed {
            self.destroyed = true;
            return true;
        }
        false
    }

    pub(crate) fn restore(&mut self) {
        self.health = self.max_health;
        self.destroyed = false;
    }
}

/// Tiles covered by the town footprint.
pub(crate) fn footprint() -> impl Iterator<Item = TileCoord> {
    let first = TOWN_TILE;
    (0..TOWN_FOOTPRINT).flat_map(move |dz| {
        (0..TOWN_FOOTPRINT).map(move |dx| TileCoord::new(first.x() + dx, first.z() + dz))
    })
}
