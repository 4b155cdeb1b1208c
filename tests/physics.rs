use glam::Vec2;
use jsim::ecs::{Body, Position, World};
use jsim::geometry::Rect;
use jsim::grid::TileGrid;
use jsim::physics::{TileSpace, physics_system, step_body, sweep_x, sweep_y};

const TILE: f32 = 16.0;

/// 8×6 room: solid floor on row 5, a pillar at column 3 on rows 3-4.
fn room() -> TileGrid {
    let mut grid = TileGrid::new(8, 6);
    for x in 0..8 {
        grid.set(x, 5, 1);
    }
    grid.set(3, 3, 1);
    grid.set(3, 4, 1);
    grid
}

fn space(grid: &TileGrid) -> TileSpace<'_> {
    TileSpace {
        grid,
        tile_size: TILE,
    }
}

// ── Sweep ────────────────────────────────────────────────────────────────────

#[test]
fn zero_delta_is_a_no_op_everywhere() {
    let grid = room();
    let rects = [
        Rect::new(0.0, 0.0, 16.0, 16.0),
        Rect::new(40.0, 60.0, 10.0, 20.0),
        Rect::new(-30.0, 200.0, 5.0, 5.0),
        // Already overlapping the pillar.
        Rect::new(50.0, 50.0, 8.0, 8.0),
    ];
    for rect in &rects {
        assert_eq!(sweep_x(&grid, TILE, rect, 0.0), 0.0);
        assert_eq!(sweep_y(&grid, TILE, rect, 0.0), 0.0);
    }
}

/// Leading edge starts `d` pixels from the pillar; any longer request stops at `d`.
#[test]
fn stops_exactly_at_the_tile_boundary() {
    let grid = room();
    let rect = Rect::new(0.0, 48.0, 16.0, 16.0);
    let d = 48.0 - rect.right();
    for requested in [d + 0.5, d + 1.0, d + 7.0, 100.0] {
        assert_eq!(sweep_x(&grid, TILE, &rect, requested), d, "requested {requested}");
    }
}

#[test]
fn free_movement_is_lossless() {
    let grid = room();
    let rect = Rect::new(0.0, 48.0, 16.0, 16.0);
    for requested in [0.25, 1.0, 13.5, 32.0] {
        assert_eq!(sweep_x(&grid, TILE, &rect, requested), requested);
    }
    // Above the pillar nothing blocks horizontal travel.
    let high = Rect::new(0.0, 16.0, 16.0, 16.0);
    assert_eq!(sweep_x(&grid, TILE, &high, 80.0), 80.0);
}

#[test]
fn leftward_sweep_stops_at_pillar_face() {
    let grid = room();
    let rect = Rect::new(80.0, 48.0, 16.0, 16.0);
    assert_eq!(sweep_x(&grid, TILE, &rect, -40.0), -16.0);
}

#[test]
fn falling_rect_lands_on_floor() {
    let grid = room();
    let rect = Rect::new(96.0, 30.0, 16.0, 16.0);
    assert_eq!(sweep_y(&grid, TILE, &rect, 200.0), 80.0 - 46.0);
}

#[test]
fn outside_the_grid_is_open_space() {
    let grid = room();
    let rect = Rect::new(112.0, 0.0, 16.0, 16.0);
    assert_eq!(sweep_x(&grid, TILE, &rect, 64.0), 64.0);
    assert_eq!(sweep_y(&grid, TILE, &rect, -40.0), -40.0);
}

// ── Physics tick ─────────────────────────────────────────────────────────────

#[test]
fn zero_velocity_tick_is_idempotent() {
    let grid = room();
    let mut world = World::new();
    let scene = world.allocate_scene();
    let e = world.create_entity(scene);
    world.add_component(e, Position::new(Vec2::new(96.0, 64.0)));
    world.add_component(e, Body::new(Vec2::ZERO, Vec2::splat(16.0)));

    physics_system(&mut world, scene, space(&grid), 1.0 / 60.0);
    let first = (*world.component::<Position>(e), *world.component::<Body>(e));
    physics_system(&mut world, scene, space(&grid), 1.0 / 60.0);
    let second = (*world.component::<Position>(e), *world.component::<Body>(e));

    assert_eq!(first, second);
    assert_eq!(first.0.pos, Vec2::new(96.0, 64.0));
}

#[test]
fn landing_sets_down_contact_and_zeroes_fall() {
    let grid = room();
    let mut pos = Position::new(Vec2::new(96.0, 60.0));
    let mut body = Body::new(Vec2::ZERO, Vec2::splat(16.0));
    body.velocity = Vec2::new(0.0, 300.0);

    step_body(&mut pos, &mut body, space(&grid), 0.1);

    assert_eq!(pos.pos, Vec2::new(96.0, 64.0));
    assert_eq!(pos.prev, Vec2::new(96.0, 60.0));
    assert!(body.contacts.down);
    assert!(body.on_ground());
    assert!(!body.contacts.left && !body.contacts.right && !body.contacts.up);
    assert_eq!(body.velocity, Vec2::ZERO);
}

#[test]
fn wall_truncates_only_its_own_axis() {
    let grid = room();
    // Box sits left of the pillar, drifting right and slightly up.
    let mut pos = Position::new(Vec2::new(24.0, 56.0));
    let mut body = Body::new(Vec2::ZERO, Vec2::splat(8.0));
    body.velocity = Vec2::new(100.0, -10.0);

    step_body(&mut pos, &mut body, space(&grid), 0.2);

    assert_eq!(pos.pos.x, 40.0);
    assert_eq!(pos.pos.y, 54.0);
    assert!(body.contacts.right);
    assert!(!body.contacts.up);
    assert_eq!(body.velocity, Vec2::new(0.0, -10.0));
}

#[test]
fn physics_only_touches_its_scene() {
    let grid = room();
    let mut world = World::new();
    let active = world.allocate_scene();
    let parked = world.allocate_scene();
    let mover = world.create_entity(active);
    let idle = world.create_entity(parked);
    for e in [mover, idle] {
        world.add_component(e, Position::new(Vec2::new(96.0, 0.0)));
        let mut body = Body::new(Vec2::ZERO, Vec2::splat(16.0));
        body.velocity.y = 60.0;
        world.add_component(e, body);
    }

    physics_system(&mut world, active, space(&grid), 0.5);

    assert_eq!(world.component::<Position>(mover).pos.y, 30.0);
    assert_eq!(world.component::<Position>(idle).pos.y, 0.0);
}
