//! Serpentine road carving between the spawn tile and the town.

use rand::Rng;
use town_defence_core::TileCoord;

use crate::grid::Grid;

/// Probability of switching axis after each step.
const AXIS_SWITCH_CHANCE: f64 = 0.3;

/// Carves a winding road from `start` to `end`, marking every visited tile.
///
/// The walk begins on the X axis and moves one tile per step toward `end` on
/// the current axis. An aligned axis switches to the other one without moving,
/// and every step is followed by a random axis switch. Each step shortens the
/// remaining distance, so the path always ends at `end` and never revisits a
/// tile. An empty grid or an endpoint outside it yields an empty path.
pub(crate) fn build_serpentine_path<R: Rng>(
    grid: &mut Grid,
    start: TileCoord,
    end: TileCoord,
    rng: &mut R,
) -> Vec<TileCoord> {
    if grid.is_empty() {
        log::warn!("cannot carve a road on an empty grid");
        return Vec::new();
    }
    if !grid.contains(start) || !grid.contains(end) {
        log::warn!("road endpoints {start:?} -> {end:?} fall outside the grid");
        return Vec::new();
    }

    let capacity = usize::try_from(start.manhattan_distance(end)).unwrap_or(0) + 1;
    let mut path = Vec::with_capacity(capacity);
    let _ = grid.mark_road(start);
    path.push(start);

    let mut current = start;
    let mut horizontal = true;
    while current != end {
        let next = if horizontal {
            if current.x() == end.x() {
                horizontal = false;
                continue;
            }
            TileCoord::new(step_toward(current.x(), end.x()), current.z())
        } else {
            if current.z() == end.z() {
                horizontal = true;
                continue;
            }
            TileCoord::new(current.x(), step_toward(current.z(), end.z()))
        };

        let _ = grid.mark_road(next);
        path.push(next);
        current = next;

        if rng.gen_bool(AXIS_SWITCH_CHANCE) {
            horizontal = !horizontal;
        }
    }

    path
}

fn step_toward(from: u32, to: u32) -> u32 {
    if from < to {
        from + 1
    } else {
        from - 1
    }
}
