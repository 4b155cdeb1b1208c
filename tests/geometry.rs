use glam::Vec2;
use jsim::geometry::*;
use jsim::grid::{Grid, TileGrid};

#[test]
fn test_rect_at_applies_offset() {
    let r = Rect::at(Vec2::new(10.0, 20.0), Vec2::new(2.0, 0.0), Vec2::new(12.0, 16.0));
    assert_eq!(r, Rect::new(12.0, 20.0, 12.0, 16.0));
    assert_eq!(r.right(), 24.0);
    assert_eq!(r.bottom(), 36.0);
    assert_eq!(r.center(), Vec2::new(18.0, 28.0));
}

#[test]
fn test_overlap_is_symmetric() {
    let a = Rect::new(0.0, 0.0, 10.0, 10.0);
    let b = Rect::new(9.0, 9.0, 10.0, 10.0);
    let c = Rect::new(10.0, 0.0, 10.0, 10.0);
    assert!(a.overlaps(&b) && b.overlaps(&a));
    assert!(!a.overlaps(&c) && !c.overlaps(&a));
}

#[test]
fn test_tile_of_floors_negative_coordinates() {
    assert_eq!(tile_of(-0.5, 16.0), -1);
    assert_eq!(tile_of(-16.0, 16.0), -1);
    assert_eq!(tile_of(15.999, 16.0), 0);
    assert_eq!(tile_of(16.0, 16.0), 1);
}

#[test]
fn test_tile_span_of_rect_across_tiles() {
    let r = Rect::new(10.0, 30.0, 20.0, 4.0);
    assert_eq!(tile_span(r.x, r.w, 16.0), (0, 1));
    assert_eq!(tile_span(r.y, r.h, 16.0), (1, 2));
}

#[test]
fn test_grid_reads_are_bounds_checked() {
    let grid: TileGrid = Grid::from_vec(3, vec![0, 1, 0, 0, 0, 2]);
    assert_eq!(grid.rows(), 2);
    assert_eq!(grid.get(1, 0), Some(1));
    assert_eq!(grid.get(3, 0), None);
    assert_eq!(grid.get(0, -1), None);
    assert!(grid.is_solid(2, 1));
    assert!(!grid.is_solid(0, 1));
    assert!(!grid.is_solid(-5, 40));
}

#[test]
#[should_panic(expected = "out of bounds")]
fn test_grid_write_outside_panics() {
    let mut grid: TileGrid = Grid::new(2, 2);
    grid.set(2, 0, 1);
}

#[test]
#[should_panic(expected = "not a multiple")]
fn test_grid_length_must_fit_columns() {
    let _ = Grid::from_vec(4, vec![0u16; 6]);
}
