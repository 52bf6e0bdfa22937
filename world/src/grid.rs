//! Tile lattice that backs placement, harvesting and road carving.

use town_defence_core::{ResourceKind, TileCoord, TowerId, Vec2};

/// Harvestable deposit occupying a tile.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResourceDeposit {
    /// Kind of resource the deposit yields.
    pub kind: ResourceKind,
    /// Remaining health before the deposit is exhausted.
    pub health: f32,
}

/// Mutually exclusive placement state of a tile.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TileState {
    /// Empty ground that accepts a tower.
    Buildable,
    /// Part of the carved road.
    Road,
    /// Covered by the town footprint.
    Occupied,
    /// Holds an unharvested deposit.
    Resource(ResourceDeposit),
    /// Holds the tower with the provided identifier.
    Tower(TowerId),
}

/// Single grid tile.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tile {
    coord: TileCoord,
    state: TileState,
}

impl Tile {
    /// Coordinate of the tile.
    #[must_use]
    pub const fn coord(&self) -> TileCoord {
        self.coord
    }

    /// Placement state of the tile.
    #[must_use]
    pub const fn state(&self) -> TileState {
        self.state
    }

    /// Reports whether the tile is part of the road.
    #[must_use]
    pub fn is_road(&self) -> bool {
        matches!(self.state, TileState::Road)
    }

    /// Reports whether a tower may be built on the tile.
    #[must_use]
    pub fn is_buildable(&self) -> bool {
        matches!(self.state, TileState::Buildable)
    }
}

/// Dense row-major tile lattice.
#[derive(Clone, Debug)]
pub struct Grid {
    columns: u32,
    rows: u32,
    spacing: f32,
    origin: Vec2,
    tiles: Vec<Tile>,
}

impl Grid {
    /// Creates a grid whose tiles all start buildable.
    #[must_use]
    pub(crate) fn new(columns: u32, rows: u32, spacing: f32, origin: Vec2) -> Self {
        let mut tiles = Vec::new();
        for z in 0..rows {
            for x in 0..columns {
                tiles.push(Tile {
                    coord: TileCoord::new(x, z),
                    state: TileState::Buildable,
                });
            }
        }
        Self {
            columns,
            rows,
            spacing,
            origin,
            tiles,
        }
    }

    /// Creates a grid with no tiles.
    #[must_use]
    pub(crate) fn empty() -> Self {
        Self::new(0, 0, 1.0, Vec2::ZERO)
    }

    /// Number of tiles along the X axis.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of tiles along the Z axis.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Distance between adjacent tile centres.
    #[must_use]
    pub const fn spacing(&self) -> f32 {
        self.spacing
    }

    /// Reports whether the grid holds no tiles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Reports whether the coordinate lies inside the grid.
    #[must_use]
    pub fn contains(&self, coord: TileCoord) -> bool {
        coord.x() < self.columns && coord.z() < self.rows
    }

    /// Retrieves the tile at the provided coordinate.
    #[must_use]
    pub fn tile(&self, coord: TileCoord) -> Option<&Tile> {
        self.index(coord).and_then(|index| self.tiles.get(index))
    }

    /// Iterator over every tile in row-major order.
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter()
    }

    /// World position of the centre of a tile on the ground plane.
    #[must_use]
    pub fn tile_center(&self, coord: TileCoord) -> Vec2 {
        self.origin + Vec2::new(coord.x() as f32, coord.z() as f32) * self.spacing
    }

    /// Converts a tile into a road tile.
    ///
    /// Returns `false` without changing anything when the tile is missing,
    /// already a road, or holds a tower.
    pub(crate) fn mark_road(&mut self, coord: TileCoord) -> bool {
        let Some(tile) = self.tile_mut(coord) else {
            return false;
        };
        match tile.state {
            TileState::Road => false,
            TileState::Tower(tower) => {
                log::warn!(
                    "refusing to carve road through tower {} at {:?}",
                    tower.get(),
                    coord
                );
                false
            }
            _ => {
                tile.state = TileState::Road;
                true
            }
        }
    }

    pub(crate) fn set_state(&mut self, coord: TileCoord, state: TileState) -> bool {
        match self.tile_mut(coord) {
            Some(tile) => {
                tile.state = state;
                true
            }
            None => false,
        }
    }

    pub(crate) fn tile_mut(&mut self, coord: TileCoord) -> Option<&mut Tile> {
        self.index(coord).and_then(|index| self.tiles.get_mut(index))
    }

    fn index(&self, coord: TileCoord) -> Option<usize> {
        if !self.contains(coord) {
            return None;
        }
        let width = usize::try_from(self.columns).ok()?;
        let x = usize::try_from(coord.x()).ok()?;
        let z = usize::try_from(coord.z()).ok()?;
        Some(z * width + x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tile_center_scales_by_spacing_from_origin() {
        let grid = Grid::new(4, 4, 2.0, Vec2::new(-1.0, 3.0));
        assert_eq!(grid.tile_center(TileCoord::new(2, 1)), Vec2::new(3.0, 5.0));
    }

    #[test]
    fn out_of_bounds_lookup_is_none() {
        let grid = Grid::new(3, 2, 1.0, Vec2::ZERO);
        assert!(grid.tile(TileCoord::new(3, 0)).is_none());
        assert!(grid.tile(TileCoord::new(0, 2)).is_none());
        assert!(grid.tile(TileCoord::new(2, 1)).is_some());
    }

    #[test]
    fn mark_road_is_idempotent() {
        let mut grid = Grid::new(3, 3, 1.0, Vec2::ZERO);
        let coord = TileCoord::new(1, 1);
        assert!(grid.mark_road(coord));
        assert!(!grid.mark_road(coord));
        assert!(grid.tile(coord).is_some_and(Tile::is_road));
    }

    #[test]
    fn mark_road_never_overwrites_towers() {
        let mut grid = Grid::new(3, 3, 1.0, Vec2::ZERO);
        let coord = TileCoord::new(0, 2);
        assert!(grid.set_state(coord, TileState::Tower(TowerId::new(4))));
        assert!(!grid.mark_road(coord));
        assert_eq!(
            grid.tile(coord).map(Tile::state),
            Some(TileState::Tower(TowerId::new(4)))
        );
    }
}
