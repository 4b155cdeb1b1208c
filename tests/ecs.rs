use glam::Vec2;
use jsim::ecs::*;

#[cfg(test)]
mod tests {
    use super::*;

    fn full_entity(world: &mut World, scene: SceneId) -> Entity {
        let e = world.create_entity(scene);
        world.add_component(e, Position::new(Vec2::new(4.0, 8.0)));
        world.add_component(e, Body::new(Vec2::ZERO, Vec2::splat(16.0)));
        world.add_component(e, Sprite::new("idle_0"));
        world.add_component(e, Mailbox::new());
        world.add_component(e, Agent(AgentKind::Walker));
        e
    }

    // -- create / destroy ---------------------------------------------------

    #[test]
    fn entity_without_components_is_live() {
        let mut world = World::new();
        let scene = world.allocate_scene();
        let e = world.create_entity(scene);
        assert!(world.contains(e));
        assert_eq!(world.component_set(e), Some(ComponentSet::EMPTY));
        assert_eq!(world.entities_in_scene(scene), vec![e]);
    }

    #[test]
    fn destroy_clears_components_and_scene_membership() {
        let mut world = World::new();
        let scene = world.allocate_scene();
        let e = full_entity(&mut world, scene);
        let other = world.create_entity(scene);

        world.destroy_entity(e);

        assert!(!world.contains(e));
        assert_eq!(world.component_set(e), None);
        assert!(world.get::<Position>(e).is_none());
        assert!(world.get::<Agent>(e).is_none());
        assert_eq!(world.count::<Position>(), 0);
        assert_eq!(world.entities_in_scene(scene), vec![other]);
        assert!(!world.scene_snapshot(scene).contains_key(&e));
    }

    #[test]
    fn destroy_emits_one_removing_event_per_component_then_removed() {
        let mut world = World::new();
        let scene = world.allocate_scene();
        let e = full_entity(&mut world, scene);
        world.drain_events();

        world.destroy_entity(e);
        let events = world.drain_events();

        assert_eq!(events.len(), 6);
        let kinds: Vec<ComponentKind> = events[..5]
            .iter()
            .map(|ev| match ev {
                WorldEvent::ComponentRemoving { entity, component } => {
                    assert_eq!(*entity, e);
                    component.kind()
                }
                other => panic!("expected ComponentRemoving, got {other:?}"),
            })
            .collect();
        assert_eq!(
            kinds,
            vec![
                ComponentKind::Position,
                ComponentKind::Body,
                ComponentKind::Sprite,
                ComponentKind::Mailbox,
                ComponentKind::Agent,
            ]
        );
        assert_eq!(events[5], WorldEvent::EntityRemoved { entity: e, scene });
        assert!(world.drain_events().is_empty());
    }

    #[test]
    fn create_and_add_emit_events_in_order() {
        let mut world = World::new();
        let scene = world.allocate_scene();
        let e = world.create_entity(scene);
        world.add_component(e, Facing::Left);
        assert_eq!(
            world.drain_events(),
            vec![
                WorldEvent::EntityAdded { entity: e, scene },
                WorldEvent::ComponentAdded {
                    entity: e,
                    kind: ComponentKind::Facing,
                },
            ]
        );
    }

    // -- presence discipline ------------------------------------------------

    #[test]
    #[should_panic(expected = "already has a Position component")]
    fn duplicate_add_panics() {
        let mut world = World::new();
        let scene = world.allocate_scene();
        let e = world.create_entity(scene);
        world.add_component(e, Position::new(Vec2::ZERO));
        world.add_component(e, Position::new(Vec2::ONE));
    }

    #[test]
    #[should_panic(expected = "has no Mailbox component")]
    fn removing_absent_component_panics() {
        let mut world = World::new();
        let scene = world.allocate_scene();
        let e = world.create_entity(scene);
        world.remove_component::<Mailbox>(e);
    }

    #[test]
    #[should_panic(expected = "does not exist")]
    fn adding_to_destroyed_entity_panics() {
        let mut world = World::new();
        let scene = world.allocate_scene();
        let e = world.create_entity(scene);
        world.destroy_entity(e);
        world.add_component(e, Facing::Right);
    }

    #[test]
    fn try_variants_report_instead_of_panicking() {
        let mut world = World::new();
        let scene = world.allocate_scene();
        let e = world.create_entity(scene);
        assert!(world.try_remove_component::<Body>(e).is_err());
        assert!(world.try_add_component(e, Facing::Left).is_ok());
        assert!(world.try_add_component(e, Facing::Left).is_err());
        world.destroy_entity(e);
        assert!(world.try_destroy_entity(e).is_err());
    }

    #[test]
    fn read_lookup_of_unknown_entity_is_absent() {
        let mut world = World::new();
        let scene = world.allocate_scene();
        let e = world.create_entity(scene);
        world.destroy_entity(e);
        assert!(world.get::<Position>(e).is_none());
        assert!(!world.has::<Position>(e));
    }

    #[test]
    fn add_remove_sequences_leave_nothing_after_destroy() {
        let mut world = World::new();
        let scene = world.allocate_scene();
        let e = world.create_entity(scene);
        world.add_component(e, Facing::Left);
        world.add_component(e, Mailbox::new());
        world.remove_component::<Facing>(e);
        world.add_component(e, Sprite::new("a"));
        world.remove_component::<Mailbox>(e);
        world.add_component(e, Facing::Right);

        assert_eq!(world.component_set(e).map(|s| s.len()), Some(2));
        world.destroy_entity(e);
        assert_eq!(world.component_set(e), None);
        assert!(world.entities_in_scene(scene).is_empty());
    }

    // -- scenes -------------------------------------------------------------

    #[test]
    fn scenes_partition_iteration() {
        let mut world = World::new();
        let room_a = world.allocate_scene();
        let room_b = world.allocate_scene();
        let a1 = world.create_entity(room_a);
        let b1 = world.create_entity(room_b);
        let a2 = world.create_entity(room_a);
        world.add_component(a2, Facing::Left);

        assert_eq!(world.entities_in_scene(room_a), vec![a1, a2]);
        assert_eq!(world.entities_in_scene(room_b), vec![b1]);

        let snapshot = world.scene_snapshot(room_a);
        assert_eq!(snapshot.len(), 2);
        assert!(snapshot[&a2].contains(ComponentKind::Facing));
        assert!(snapshot[&a1].is_empty());
        assert_eq!(snapshot[&a2].len(), 1);
        assert!(!snapshot.contains_key(&b1));
    }

    #[test]
    fn move_to_scene_updates_both_indices() {
        let mut world = World::new();
        let from = world.allocate_scene();
        let to = world.allocate_scene();
        let e = world.create_entity(from);
        world.move_to_scene(e, to);
        assert!(world.entities_in_scene(from).is_empty());
        assert_eq!(world.entities_in_scene(to), vec![e]);
        assert_eq!(world.scene_of(e), Some(to));
    }
}
