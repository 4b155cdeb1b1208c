use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use log::debug;

use crate::error::{SimError, SimResult, fail_fast};

pub mod components;

pub use components::{
    Agent, AgentKind, Animation, AnyComponent, Body, ComponentKind, ComponentSet, Contacts,
    Facing, Hitbox, Hurtbox, Mailbox, Message, Position, Sprite, masks,
};

// ---------------------------------------------------------------------------
// Entity / SceneId
// ---------------------------------------------------------------------------

/// Opaque entity handle. Ids are allocated monotonically and never reused.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Entity(pub(crate) u32);

impl Entity {
    pub fn id(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Partition of the world (a room or level) used for scoped iteration.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SceneId(pub(crate) u32);

impl SceneId {
    pub fn id(self) -> u32 {
        self.0
    }
}

// ---------------------------------------------------------------------------
// SparseSet<T>: per-kind storage
// ---------------------------------------------------------------------------

const EMPTY: u32 = u32::MAX;

/// Packed storage for one component kind, indexed by entity id.
pub struct SparseSet<T> {
    sparse: Vec<u32>,
    dense: Vec<u32>,
    data: Vec<T>,
}

impl<T> SparseSet<T> {
    fn new() -> Self {
        Self {
            sparse: Vec::new(),
            dense: Vec::new(),
            data: Vec::new(),
        }
    }

    fn contains(&self, id: u32) -> bool {
        let idx = id as usize;
        idx < self.sparse.len() && self.sparse[idx] != EMPTY
    }

    /// Callers check presence first; a second insert for the same id is a bug.
    fn insert(&mut self, id: u32, value: T) {
        let idx = id as usize;
        if idx >= self.sparse.len() {
            self.sparse.resize(idx + 1, EMPTY);
        }
        debug_assert_eq!(self.sparse[idx], EMPTY);
        self.sparse[idx] = self.dense.len() as u32;
        self.dense.push(id);
        self.data.push(value);
    }

    fn remove(&mut self, id: u32) -> Option<T> {
        if !self.contains(id) {
            return None;
        }
        let idx = id as usize;
        let dense_idx = self.sparse[idx] as usize;
        self.sparse[idx] = EMPTY;

        // Swap-remove to keep arrays packed.
        let last = self.dense.len() - 1;
        if dense_idx != last {
            let moved_id = self.dense[last] as usize;
            self.sparse[moved_id] = dense_idx as u32;
        }
        self.dense.swap_remove(dense_idx);
        Some(self.data.swap_remove(dense_idx))
    }

    fn get(&self, id: u32) -> Option<&T> {
        if !self.contains(id) {
            return None;
        }
        Some(&self.data[self.sparse[id as usize] as usize])
    }

    fn get_mut(&mut self, id: u32) -> Option<&mut T> {
        if !self.contains(id) {
            return None;
        }
        Some(&mut self.data[self.sparse[id as usize] as usize])
    }

    fn len(&self) -> usize {
        self.dense.len()
    }
}

// ---------------------------------------------------------------------------
// Stores: one sparse set per closed component kind
// ---------------------------------------------------------------------------

/// All component storage, one field per [`ComponentKind`].
pub struct Stores {
    position: SparseSet<Position>,
    body: SparseSet<Body>,
    sprite: SparseSet<Sprite>,
    facing: SparseSet<Facing>,
    animation: SparseSet<Animation>,
    hitbox: SparseSet<Hitbox>,
    hurtbox: SparseSet<Hurtbox>,
    mailbox: SparseSet<Mailbox>,
    agent: SparseSet<Agent>,
}

impl Stores {
    fn new() -> Self {
        Self {
            position: SparseSet::new(),
            body: SparseSet::new(),
            sprite: SparseSet::new(),
            facing: SparseSet::new(),
            animation: SparseSet::new(),
            hitbox: SparseSet::new(),
            hurtbox: SparseSet::new(),
            mailbox: SparseSet::new(),
            agent: SparseSet::new(),
        }
    }

    fn remove_kind(&mut self, kind: ComponentKind, id: u32) -> Option<AnyComponent> {
        match kind {
            ComponentKind::Position => self.position.remove(id).map(AnyComponent::Position),
            ComponentKind::Body => self.body.remove(id).map(AnyComponent::Body),
            ComponentKind::Sprite => self.sprite.remove(id).map(AnyComponent::Sprite),
            ComponentKind::Facing => self.facing.remove(id).map(AnyComponent::Facing),
            ComponentKind::Animation => self.animation.remove(id).map(AnyComponent::Animation),
            ComponentKind::Hitbox => self.hitbox.remove(id).map(AnyComponent::Hitbox),
            ComponentKind::Hurtbox => self.hurtbox.remove(id).map(AnyComponent::Hurtbox),
            ComponentKind::Mailbox => self.mailbox.remove(id).map(AnyComponent::Mailbox),
            ComponentKind::Agent => self.agent.remove(id).map(AnyComponent::Agent),
        }
    }
}

/// Implemented by every member of the closed component set.
pub trait Component: Clone + Sized + 'static {
    const KIND: ComponentKind;

    fn store(stores: &Stores) -> &SparseSet<Self>;
    fn store_mut(stores: &mut Stores) -> &mut SparseSet<Self>;
    fn into_any(self) -> AnyComponent;
}

macro_rules! impl_component {
    ($ty:ident, $field:ident) => {
        impl Component for $ty {
            const KIND: ComponentKind = ComponentKind::$ty;

            fn store(stores: &Stores) -> &SparseSet<Self> {
                &stores.$field
            }

            fn store_mut(stores: &mut Stores) -> &mut SparseSet<Self> {
                &mut stores.$field
            }

            fn into_any(self) -> AnyComponent {
                AnyComponent::$ty(self)
            }
        }
    };
}

impl_component!(Position, position);
impl_component!(Body, body);
impl_component!(Sprite, sprite);
impl_component!(Facing, facing);
impl_component!(Animation, animation);
impl_component!(Hitbox, hitbox);
impl_component!(Hurtbox, hurtbox);
impl_component!(Mailbox, mailbox);
impl_component!(Agent, agent);

// ---------------------------------------------------------------------------
// Lifecycle events
// ---------------------------------------------------------------------------

/// Notifications emitted by [`World`] mutations, buffered in emission order.
#[derive(Clone, Debug, PartialEq)]
pub enum WorldEvent {
    EntityAdded { entity: Entity, scene: SceneId },
    ComponentAdded { entity: Entity, kind: ComponentKind },
    /// Emitted before the component is dropped; carries the value being removed.
    ComponentRemoving { entity: Entity, component: AnyComponent },
    EntityRemoved { entity: Entity, scene: SceneId },
}

// ---------------------------------------------------------------------------
// Query iterators
// ---------------------------------------------------------------------------

/// Iterator over `(Entity, &T)` pairs from a query.
pub struct QueryIter<'a, T> {
    dense: std::slice::Iter<'a, u32>,
    data: std::slice::Iter<'a, T>,
}

impl<'a, T> Iterator for QueryIter<'a, T> {
    type Item = (Entity, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        Some((Entity(*self.dense.next()?), self.data.next()?))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.data.size_hint()
    }
}

impl<T> ExactSizeIterator for QueryIter<'_, T> {}

/// Iterator over `(Entity, &mut T)` pairs from a query.
pub struct QueryIterMut<'a, T> {
    dense: std::slice::Iter<'a, u32>,
    data: std::slice::IterMut<'a, T>,
}

impl<'a, T> Iterator for QueryIterMut<'a, T> {
    type Item = (Entity, &'a mut T);

    fn next(&mut self) -> Option<Self::Item> {
        Some((Entity(*self.dense.next()?), self.data.next()?))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.data.size_hint()
    }
}

impl<T> ExactSizeIterator for QueryIterMut<'_, T> {}

// ---------------------------------------------------------------------------
// World: central container
// ---------------------------------------------------------------------------

struct EntityRow {
    scene: SceneId,
    kinds: ComponentSet,
}

/// Entity-component store with scene-partitioned iteration.
///
/// Every live entity has a row here, even with zero components. Operations
/// that break the presence discipline (unknown entity, duplicate add, missing
/// remove) are logic errors and panic; `try_*` variants return them instead.
pub struct World {
    next_entity: u32,
    next_scene: u32,
    rows: HashMap<Entity, EntityRow>,
    scenes: HashMap<SceneId, BTreeSet<Entity>>,
    stores: Stores,
    events: Vec<WorldEvent>,
}

impl World {
    pub fn new() -> Self {
        Self {
            next_entity: 0,
            next_scene: 0,
            rows: HashMap::new(),
            scenes: HashMap::new(),
            stores: Stores::new(),
            events: Vec::new(),
        }
    }

    // -- Scenes -------------------------------------------------------------

    pub fn allocate_scene(&mut self) -> SceneId {
        let scene = SceneId(self.next_scene);
        self.next_scene += 1;
        scene
    }

    /// Live entities of `scene` in ascending id order.
    pub fn entities_in_scene(&self, scene: SceneId) -> Vec<Entity> {
        self.scenes
            .get(&scene)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Which component kinds each entity of `scene` carries.
    ///
    /// Kinds only: component values are not copied. Read them through
    /// [`World::get`] or [`World::query`].
    pub fn scene_snapshot(&self, scene: SceneId) -> BTreeMap<Entity, ComponentSet> {
        self.entities_in_scene(scene)
            .into_iter()
            .map(|e| (e, self.rows[&e].kinds))
            .collect()
    }

    pub fn scene_of(&self, entity: Entity) -> Option<SceneId> {
        self.rows.get(&entity).map(|row| row.scene)
    }

    /// Move a live entity into another scene.
    pub fn move_to_scene(&mut self, entity: Entity, scene: SceneId) {
        let row = fail_fast(self.rows.get_mut(&entity).ok_or(SimError::UnknownEntity(entity)));
        let old = std::mem::replace(&mut row.scene, scene);
        if let Some(set) = self.scenes.get_mut(&old) {
            set.remove(&entity);
        }
        self.scenes.entry(scene).or_default().insert(entity);
    }

    // -- Entity lifecycle ---------------------------------------------------

    pub fn create_entity(&mut self, scene: SceneId) -> Entity {
        let entity = Entity(self.next_entity);
        self.next_entity += 1;
        self.rows.insert(
            entity,
            EntityRow {
                scene,
                kinds: ComponentSet::EMPTY,
            },
        );
        self.scenes.entry(scene).or_default().insert(entity);
        debug!("created entity {entity} in scene {}", scene.0);
        self.events.push(WorldEvent::EntityAdded { entity, scene });
        entity
    }

    /// Remove every component (one `ComponentRemoving` each, in kind order),
    /// then the entity row and its scene membership.
    pub fn destroy_entity(&mut self, entity: Entity) {
        fail_fast(self.try_destroy_entity(entity));
    }

    pub fn try_destroy_entity(&mut self, entity: Entity) -> SimResult<()> {
        let kinds = self.row(entity)?.kinds;
        for kind in kinds.iter() {
            self.remove_kind(entity, kind)?;
        }
        let row = self
            .rows
            .remove(&entity)
            .ok_or(SimError::UnknownEntity(entity))?;
        if let Some(set) = self.scenes.get_mut(&row.scene) {
            set.remove(&entity);
            if set.is_empty() {
                self.scenes.remove(&row.scene);
            }
        }
        debug!("destroyed entity {entity}");
        self.events.push(WorldEvent::EntityRemoved {
            entity,
            scene: row.scene,
        });
        Ok(())
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.rows.contains_key(&entity)
    }

    pub fn entity_count(&self) -> usize {
        self.rows.len()
    }

    /// Kinds attached to `entity`, or `None` if it does not exist.
    pub fn component_set(&self, entity: Entity) -> Option<ComponentSet> {
        self.rows.get(&entity).map(|row| row.kinds)
    }

    // -- Components ---------------------------------------------------------

    pub fn add_component<T: Component>(&mut self, entity: Entity, component: T) {
        fail_fast(self.try_add_component(entity, component));
    }

    pub fn try_add_component<T: Component>(&mut self, entity: Entity, component: T) -> SimResult<()> {
        let row = self
            .rows
            .get_mut(&entity)
            .ok_or(SimError::UnknownEntity(entity))?;
        if row.kinds.contains(T::KIND) {
            return Err(SimError::DuplicateComponent {
                entity,
                kind: T::KIND,
            });
        }
        row.kinds.insert(T::KIND);
        T::store_mut(&mut self.stores).insert(entity.0, component);
        self.events.push(WorldEvent::ComponentAdded {
            entity,
            kind: T::KIND,
        });
        Ok(())
    }

    /// Detach and return the `T` component. Panics if it is not attached.
    pub fn remove_component<T: Component>(&mut self, entity: Entity) -> T {
        fail_fast(self.try_remove_component(entity))
    }

    pub fn try_remove_component<T: Component>(&mut self, entity: Entity) -> SimResult<T> {
        let present = self.row(entity)?.kinds.contains(T::KIND);
        if !present {
            return Err(SimError::MissingComponent {
                entity,
                kind: T::KIND,
            });
        }
        let value = T::store(&self.stores)
            .get(entity.0)
            .cloned()
            .ok_or(SimError::MissingComponent {
                entity,
                kind: T::KIND,
            })?;
        self.events.push(WorldEvent::ComponentRemoving {
            entity,
            component: value.clone().into_any(),
        });
        T::store_mut(&mut self.stores).remove(entity.0);
        if let Some(row) = self.rows.get_mut(&entity) {
            row.kinds.remove(T::KIND);
        }
        Ok(value)
    }

    pub fn has<T: Component>(&self, entity: Entity) -> bool {
        T::store(&self.stores).contains(entity.0)
    }

    /// Read-only lookup; absent for a missing entity or component.
    pub fn get<T: Component>(&self, entity: Entity) -> Option<&T> {
        T::store(&self.stores).get(entity.0)
    }

    pub fn get_mut<T: Component>(&mut self, entity: Entity) -> Option<&mut T> {
        T::store_mut(&mut self.stores).get_mut(entity.0)
    }

    /// Direct access for systems whose spawn order guarantees presence.
    #[track_caller]
    pub fn component<T: Component>(&self, entity: Entity) -> &T {
        match self.get::<T>(entity) {
            Some(c) => c,
            None => panic!("{}", missing(self, entity, T::KIND)),
        }
    }

    #[track_caller]
    pub fn component_mut<T: Component>(&mut self, entity: Entity) -> &mut T {
        if !self.has::<T>(entity) {
            panic!("{}", missing(self, entity, T::KIND));
        }
        fail_fast(
            T::store_mut(&mut self.stores)
                .get_mut(entity.0)
                .ok_or(SimError::MissingComponent {
                    entity,
                    kind: T::KIND,
                }),
        )
    }

    // -- Queries ------------------------------------------------------------

    /// Every `T` in the world, across all scenes, in storage order.
    pub fn query<T: Component>(&self) -> QueryIter<'_, T> {
        let set = T::store(&self.stores);
        QueryIter {
            dense: set.dense.iter(),
            data: set.data.iter(),
        }
    }

    pub fn query_mut<T: Component>(&mut self) -> QueryIterMut<'_, T> {
        let set = T::store_mut(&mut self.stores);
        QueryIterMut {
            dense: set.dense.iter(),
            data: set.data.iter_mut(),
        }
    }

    pub fn count<T: Component>(&self) -> usize {
        T::store(&self.stores).len()
    }

    // -- Events -------------------------------------------------------------

    /// Take all buffered lifecycle events in emission order.
    pub fn drain_events(&mut self) -> Vec<WorldEvent> {
        std::mem::take(&mut self.events)
    }

    // -- Internal helpers ---------------------------------------------------

    fn row(&self, entity: Entity) -> SimResult<&EntityRow> {
        self.rows.get(&entity).ok_or(SimError::UnknownEntity(entity))
    }

    fn remove_kind(&mut self, entity: Entity, kind: ComponentKind) -> SimResult<()> {
        let component = self
            .stores
            .remove_kind(kind, entity.0)
            .ok_or(SimError::MissingComponent { entity, kind })?;
        if let Some(row) = self.rows.get_mut(&entity) {
            row.kinds.remove(kind);
        }
        self.events
            .push(WorldEvent::ComponentRemoving { entity, component });
        Ok(())
    }
}

fn missing(world: &World, entity: Entity, kind: ComponentKind) -> SimError {
    if world.contains(entity) {
        SimError::MissingComponent { entity, kind }
    } else {
        SimError::UnknownEntity(entity)
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn pos(x: f32, y: f32) -> Position {
        Position::new(Vec2::new(x, y))
    }

    // -- sparse set ---------------------------------------------------------

    #[test]
    fn swap_remove_preserves_other_entries() {
        let mut set = SparseSet::new();
        set.insert(0, 'a');
        set.insert(1, 'b');
        set.insert(2, 'c');

        assert_eq!(set.remove(1), Some('b'));

        assert_eq!(set.get(0), Some(&'a'));
        assert_eq!(set.get(1), None);
        assert_eq!(set.get(2), Some(&'c'));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn remove_missing_id_is_none() {
        let mut set: SparseSet<u8> = SparseSet::new();
        assert_eq!(set.remove(7), None);
    }

    // -- entity ids ---------------------------------------------------------

    #[test]
    fn ids_are_monotonic_and_never_reused() {
        let mut world = World::new();
        let scene = world.allocate_scene();
        let a = world.create_entity(scene);
        world.destroy_entity(a);
        let b = world.create_entity(scene);
        assert!(b.id() > a.id());
        assert!(!world.contains(a));
    }

    #[test]
    fn scene_ids_are_distinct() {
        let mut world = World::new();
        assert_ne!(world.allocate_scene(), world.allocate_scene());
    }

    // -- events -------------------------------------------------------------

    #[test]
    fn removing_event_carries_removed_value() {
        let mut world = World::new();
        let scene = world.allocate_scene();
        let e = world.create_entity(scene);
        world.add_component(e, Agent(AgentKind::Walker));
        world.drain_events();

        let removed = world.remove_component::<Agent>(e);
        assert_eq!(removed, Agent(AgentKind::Walker));
        assert_eq!(
            world.drain_events(),
            vec![WorldEvent::ComponentRemoving {
                entity: e,
                component: AnyComponent::Agent(Agent(AgentKind::Walker)),
            }]
        );
    }

    #[test]
    fn component_mut_writes_through() {
        let mut world = World::new();
        let scene = world.allocate_scene();
        let e = world.create_entity(scene);
        world.add_component(e, pos(1.0, 2.0));
        world.component_mut::<Position>(e).pos.x = 9.0;
        assert_eq!(world.component::<Position>(e).pos.x, 9.0);
    }

    #[test]
    fn query_mut_yields_entities() {
        let mut world = World::new();
        let scene = world.allocate_scene();
        let a = world.create_entity(scene);
        let b = world.create_entity(scene);
        world.add_component(a, pos(0.0, 0.0));
        world.add_component(b, pos(1.0, 0.0));
        for (_, p) in world.query_mut::<Position>() {
            p.pos.y = 5.0;
        }
        let mut seen: Vec<_> = world.query::<Position>().map(|(e, p)| (e, p.pos.y)).collect();
        seen.sort_by_key(|(e, _)| *e);
        assert_eq!(seen, vec![(a, 5.0), (b, 5.0)]);
    }
}
