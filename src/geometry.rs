// =============================================================================
// GEOMETRY.RS: Axis-aligned rectangles and tile-space helpers
//
// Shared by the physics sweep and the combat pass:
// - Rect: world-space AABB with half-open extents [x, x + w)
// - Overlap and center queries
// - Conversion from world extents to tile index spans
// =============================================================================

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Offset applied to exclusive far edges so that an edge sitting exactly on a
/// tile boundary does not count as touching the next tile.
pub const EDGE_EPSILON: f32 = 1e-3;

/// World-space axis-aligned rectangle. Covers `[x, x + w) × [y, y + h)`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Rectangle of `size` whose top-left corner is `origin + offset`.
    pub fn at(origin: Vec2, offset: Vec2, size: Vec2) -> Self {
        let min = origin + offset;
        Self::new(min.x, min.y, size.x, size.y)
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w * 0.5, self.y + self.h * 0.5)
    }

    /// Copy moved by `(dx, dy)`.
    #[inline]
    pub fn translated(&self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.w, self.h)
    }

    /// Strict overlap test: rectangles that only share an edge do not overlap.
    #[inline]
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

/// Tile index holding the world coordinate `v`.
#[inline]
pub fn tile_of(v: f32, tile_size: f32) -> i32 {
    (v / tile_size).floor() as i32
}

/// Tile index holding the last occupied coordinate of an exclusive far edge.
#[inline]
pub fn tile_of_far_edge(edge: f32, tile_size: f32) -> i32 {
    tile_of(edge - EDGE_EPSILON, tile_size)
}

/// Inclusive tile span `(first, last)` covered by the half-open interval
/// `[start, start + len)`.
#[inline]
pub fn tile_span(start: f32, len: f32, tile_size: f32) -> (i32, i32) {
    let first = tile_of(start, tile_size);
    let last = tile_of_far_edge(start + len, tile_size).max(first);
    (first, last)
}

/// Unit vector from `from` toward `to`, or zero when the points coincide.
#[inline]
pub fn direction_toward(from: Vec2, to: Vec2) -> Vec2 {
    (to - from).normalize_or_zero()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touching_edges_do_not_overlap() {
        let a = Rect::new(0.0, 0.0, 16.0, 16.0);
        let b = Rect::new(16.0, 0.0, 16.0, 16.0);
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&b.translated(-0.5, 0.0)));
    }

    #[test]
    fn coincident_rects_overlap() {
        let a = Rect::new(3.0, 4.0, 8.0, 8.0);
        assert!(a.overlaps(&a));
    }

    #[test]
    fn tile_span_excludes_boundary() {
        assert_eq!(tile_span(0.0, 16.0, 16.0), (0, 0));
        assert_eq!(tile_span(0.0, 16.5, 16.0), (0, 1));
        assert_eq!(tile_span(8.0, 16.0, 16.0), (0, 1));
        assert_eq!(tile_span(-1.0, 2.0, 16.0), (-1, 0));
    }

    #[test]
    fn far_edge_on_boundary_stays_in_tile() {
        assert_eq!(tile_of_far_edge(32.0, 16.0), 1);
        assert_eq!(tile_of_far_edge(32.5, 16.0), 2);
    }

    #[test]
    fn direction_is_normalized() {
        let d = direction_toward(Vec2::ZERO, Vec2::new(3.0, 4.0));
        assert!((d.length() - 1.0).abs() < 1e-5);
        assert_eq!(direction_toward(Vec2::ONE, Vec2::ONE), Vec2::ZERO);
    }
}
