mod sweep;

pub use sweep::{sweep_x, sweep_y};

use glam::Vec2;

use crate::ecs::{Body, Contacts, Position, SceneId, World};
use crate::grid::TileGrid;

/// Tile map plus the constants needed to sweep against it.
#[derive(Copy, Clone, Debug)]
pub struct TileSpace<'a> {
    pub grid: &'a TileGrid,
    pub tile_size: f32,
}

/// Integrate one step for `position`/`body`. X resolves first, then Y against
/// the X-resolved rectangle; an axis truncated by a wall loses its velocity.
pub fn step_body(position: &mut Position, body: &mut Body, space: TileSpace<'_>, dt: f32) {
    position.prev = position.pos;

    let requested = body.velocity * dt;
    let rect = body.rect_at(position.pos);
    let dx = sweep_x(space.grid, space.tile_size, &rect, requested.x);
    position.pos.x += dx;

    let rect = body.rect_at(position.pos);
    let dy = sweep_y(space.grid, space.tile_size, &rect, requested.y);
    position.pos.y += dy;

    let resolved = Vec2::new(dx, dy);
    body.contacts = contacts(requested, resolved);

    if resolved.x.abs() < requested.x.abs() {
        body.velocity.x = 0.0;
    }
    if resolved.y.abs() < requested.y.abs() {
        body.velocity.y = 0.0;
    }
}

fn contacts(requested: Vec2, resolved: Vec2) -> Contacts {
    let cut_x = resolved.x.abs() < requested.x.abs();
    let cut_y = resolved.y.abs() < requested.y.abs();
    Contacts {
        left: cut_x && requested.x < 0.0,
        right: cut_x && requested.x > 0.0,
        up: cut_y && requested.y < 0.0,
        down: cut_y && requested.y > 0.0,
    }
}

/// Step every entity in `scene` that has both a position and a body, in
/// ascending entity order.
pub fn physics_system(world: &mut World, scene: SceneId, space: TileSpace<'_>, dt: f32) {
    for entity in world.entities_in_scene(scene) {
        let (Some(&position), Some(&body)) = (world.get::<Position>(entity), world.get::<Body>(entity))
        else {
            continue;
        };
        let (mut position, mut body) = (position, body);
        step_body(&mut position, &mut body, space, dt);
        *world.component_mut::<Position>(entity) = position;
        *world.component_mut::<Body>(entity) = body;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;

    #[test]
    fn blocked_axis_zeroes_velocity_only_on_that_axis() {
        // Wall column at x = 32..48.
        let mut grid = Grid::new(4, 4);
        for row in 0..4 {
            grid.set(2, row, 1);
        }
        let space = TileSpace { grid: &grid, tile_size: 16.0 };
        let mut position = Position::new(Vec2::new(10.0, 10.0));
        let mut body = Body::new(Vec2::ZERO, Vec2::new(16.0, 16.0));
        body.velocity = Vec2::new(20.0, 2.0);

        step_body(&mut position, &mut body, space, 0.5);

        assert_eq!(position.prev, Vec2::new(10.0, 10.0));
        assert_eq!(position.pos, Vec2::new(16.0, 11.0));
        assert!(body.contacts.right);
        assert!(!body.contacts.down);
        assert_eq!(body.velocity, Vec2::new(0.0, 2.0));
    }
}
