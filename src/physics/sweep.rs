// =============================================================================
// SWEEP.RS: Pixel-stepped tile collision sweep
//
// Moves a rectangle along one axis in whole-pixel increments (the final
// increment may be fractional). After each increment only the tiles under
// the leading edge are tested, across the rectangle's perpendicular extent.
// The first blocked increment ends the sweep with the leading edge flush
// against the face of the tile that blocked it. Callers resolve X first,
// then Y against the X-resolved rectangle.
// =============================================================================

use crate::geometry::{Rect, tile_of, tile_of_far_edge, tile_span};
use crate::grid::TileGrid;

/// Furthest distance along X, up to `dx`, that `rect` can travel without its
/// leading edge entering a solid tile. Same sign as `dx`.
pub fn sweep_x(grid: &TileGrid, tile_size: f32, rect: &Rect, dx: f32) -> f32 {
    let lead = if dx > 0.0 { rect.right() } else { rect.x };
    let (first, last) = tile_span(rect.y, rect.h, tile_size);
    sweep_axis(lead, dx, tile_size, |col| {
        (first..=last).any(|row| grid.is_solid(col, row))
    })
}

/// Furthest distance along Y, up to `dy`, that `rect` can travel without its
/// leading edge entering a solid tile. Same sign as `dy`.
pub fn sweep_y(grid: &TileGrid, tile_size: f32, rect: &Rect, dy: f32) -> f32 {
    let lead = if dy > 0.0 { rect.bottom() } else { rect.y };
    let (first, last) = tile_span(rect.x, rect.w, tile_size);
    sweep_axis(lead, dy, tile_size, |row| {
        (first..=last).any(|col| grid.is_solid(col, row))
    })
}

/// Advance the leading edge `lead` toward `lead + delta` one pixel at a time.
/// `solid` reports whether a tile line (column or row) blocks.
fn sweep_axis(lead: f32, delta: f32, tile_size: f32, solid: impl Fn(i32) -> bool) -> f32 {
    if delta == 0.0 {
        return 0.0;
    }
    let forward = delta > 0.0;
    let tile_under = |edge: f32| {
        if forward {
            tile_of_far_edge(edge, tile_size)
        } else {
            tile_of(edge, tile_size)
        }
    };

    let total = delta.abs();
    let dir = delta.signum();
    let mut moved = 0.0_f32;
    while moved < total {
        let next = (moved + 1.0).min(total);
        let tile = tile_under(lead + next * dir);
        if solid(tile) {
            // Face of the blocking tile that the edge would cross.
            let face = if forward {
                tile as f32 * tile_size
            } else {
                (tile + 1) as f32 * tile_size
            };
            let gap = ((face - lead) * dir).clamp(moved, next);
            return gap * dir;
        }
        moved = next;
    }
    delta
}
