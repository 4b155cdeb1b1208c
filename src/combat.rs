// ============================================================================
// COMBAT.RS: Hurtbox/hitbox overlap pass
//
// Every ordered pair of distinct entities in one scene is tested: the
// attacker's enabled hurtbox against the target's enabled hitbox. A pair
// connects when the masks share a bit and the world-space boxes overlap.
// Quadratic in the scene entity count.
// ============================================================================

use glam::Vec2;

use crate::ecs::{Entity, Hitbox, Hurtbox, Mailbox, Message, Position, SceneId, World};
use crate::geometry::{Rect, direction_toward};

/// A connected hurtbox/hitbox pair.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CombatHit {
    pub attacker: Entity,
    pub target: Entity,
    /// From the hurtbox center toward the hitbox center, normalized.
    pub direction: Vec2,
}

struct Boxed {
    entity: Entity,
    rect: Rect,
    mask: u32,
}

/// Collect every hit in `scene` without delivering anything.
pub fn detect_hits(world: &World, scene: SceneId) -> Vec<CombatHit> {
    let mut attackers = Vec::new();
    let mut targets = Vec::new();

    for entity in world.entities_in_scene(scene) {
        let Some(position) = world.get::<Position>(entity) else {
            continue;
        };
        if let Some(hurt) = world.get::<Hurtbox>(entity).filter(|h| h.enabled) {
            attackers.push(Boxed {
                entity,
                rect: hurt.rect_at(position.pos),
                mask: hurt.mask,
            });
        }
        if let Some(hit) = world.get::<Hitbox>(entity).filter(|h| h.enabled) {
            targets.push(Boxed {
                entity,
                rect: hit.rect_at(position.pos),
                mask: hit.mask,
            });
        }
    }

    let mut hits = Vec::new();
    for attacker in &attackers {
        for target in &targets {
            if attacker.entity == target.entity || attacker.mask & target.mask == 0 {
                continue;
            }
            if !attacker.rect.overlaps(&target.rect) {
                continue;
            }
            hits.push(CombatHit {
                attacker: attacker.entity,
                target: target.entity,
                direction: direction_toward(attacker.rect.center(), target.rect.center()),
            });
        }
    }
    hits
}

/// Detect hits in `scene` and append them to the targets' mailboxes.
/// Targets without a mailbox are skipped. Returns the number delivered.
pub fn combat_system(world: &mut World, scene: SceneId) -> usize {
    let mut delivered = 0;
    for hit in detect_hits(world, scene) {
        if let Some(mailbox) = world.get_mut::<Mailbox>(hit.target) {
            mailbox.push(Message::CombatHit {
                attacker: hit.attacker,
                direction: hit.direction,
            });
            delivered += 1;
        }
    }
    delivered
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fighter(world: &mut World, scene: SceneId, at: Vec2, hurt_mask: u32, hit_mask: u32) -> Entity {
        let e = world.create_entity(scene);
        let size = Vec2::splat(16.0);
        world.add_component(e, Position::new(at));
        world.add_component(e, Hurtbox::new(Vec2::ZERO, size, hurt_mask));
        world.add_component(e, Hitbox::new(Vec2::ZERO, size, hit_mask));
        world.add_component(e, Mailbox::new());
        e
    }

    #[test]
    fn never_hits_self() {
        let mut world = World::new();
        let scene = world.allocate_scene();
        fighter(&mut world, scene, Vec2::ZERO, 0b1, 0b1);
        assert!(detect_hits(&world, scene).is_empty());
    }

    #[test]
    fn mutual_overlap_hits_both_ways() {
        let mut world = World::new();
        let scene = world.allocate_scene();
        let a = fighter(&mut world, scene, Vec2::ZERO, 0b1, 0b1);
        let b = fighter(&mut world, scene, Vec2::new(8.0, 0.0), 0b1, 0b1);

        let hits = detect_hits(&world, scene);
        assert_eq!(hits.len(), 2);
        let ab = hits.iter().find(|h| h.attacker == a).unwrap();
        assert_eq!(ab.target, b);
        assert_eq!(ab.direction, Vec2::X);
    }

    #[test]
    fn other_scenes_are_ignored() {
        let mut world = World::new();
        let room_a = world.allocate_scene();
        let room_b = world.allocate_scene();
        fighter(&mut world, room_a, Vec2::ZERO, 0b1, 0b1);
        let b = fighter(&mut world, room_b, Vec2::ZERO, 0b1, 0b1);
        assert_eq!(combat_system(&mut world, room_a), 0);
        assert!(world.component::<Mailbox>(b).is_empty());
    }

    #[test]
    fn disabled_boxes_do_not_connect() {
        let mut world = World::new();
        let scene = world.allocate_scene();
        let a = fighter(&mut world, scene, Vec2::ZERO, 0b1, 0b1);
        fighter(&mut world, scene, Vec2::ZERO, 0b1, 0b1);
        world.component_mut::<Hurtbox>(a).enabled = false;
        let hits = detect_hits(&world, scene);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].target, a);
    }
}
