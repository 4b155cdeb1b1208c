// ── Side tables ─────────────────────────────────────────────────────────────

// Per-entity state owned by one behavior. Entries are created by the owning
// kind's spawn hook and deleted by its destroy hook.

use std::collections::HashMap;

use crate::ecs::Entity;
use crate::error::{SimError, SimResult, fail_fast};

/// "Create required" table: every operation fails fast when out of order.
#[derive(Debug)]
pub struct SideTable<T> {
    behavior: &'static str,
    entries: HashMap<Entity, T>,
}

impl<T> SideTable<T> {
    pub fn new(behavior: &'static str) -> Self {
        Self {
            behavior,
            entries: HashMap::new(),
        }
    }

    pub fn behavior(&self) -> &'static str {
        self.behavior
    }

    /// Create the entry for `entity`. Panics if one already exists.
    pub fn set(&mut self, entity: Entity, value: T) {
        fail_fast(self.try_set(entity, value));
    }

    pub fn try_set(&mut self, entity: Entity, value: T) -> SimResult<()> {
        if self.entries.contains_key(&entity) {
            return Err(SimError::SideTableDuplicate {
                behavior: self.behavior,
                entity,
            });
        }
        self.entries.insert(entity, value);
        Ok(())
    }

    #[track_caller]
    pub fn get(&self, entity: Entity) -> &T {
        fail_fast(self.try_get(entity))
    }

    pub fn try_get(&self, entity: Entity) -> SimResult<&T> {
        self.entries.get(&entity).ok_or(SimError::SideTableMissing {
            behavior: self.behavior,
            entity,
        })
    }

    #[track_caller]
    pub fn get_mut(&mut self, entity: Entity) -> &mut T {
        fail_fast(self.try_get_mut(entity))
    }

    pub fn try_get_mut(&mut self, entity: Entity) -> SimResult<&mut T> {
        let behavior = self.behavior;
        self.entries
            .get_mut(&entity)
            .ok_or(SimError::SideTableMissing { behavior, entity })
    }

    /// Delete and return the entry. Panics if it was never created.
    pub fn delete(&mut self, entity: Entity) -> T {
        fail_fast(self.try_delete(entity))
    }

    pub fn try_delete(&mut self, entity: Entity) -> SimResult<T> {
        self.entries.remove(&entity).ok_or(SimError::SideTableMissing {
            behavior: self.behavior,
            entity,
        })
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.entries.contains_key(&entity)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// "Create optional" table: lookups may report absence, e.g. for data read
/// before the owner's spawn has completed.
#[derive(Debug)]
pub struct OptionalSideTable<T> {
    behavior: &'static str,
    entries: HashMap<Entity, T>,
}

impl<T> OptionalSideTable<T> {
    pub fn new(behavior: &'static str) -> Self {
        Self {
            behavior,
            entries: HashMap::new(),
        }
    }

    pub fn behavior(&self) -> &'static str {
        self.behavior
    }

    /// Insert or overwrite, returning the previous value.
    pub fn set(&mut self, entity: Entity, value: T) -> Option<T> {
        self.entries.insert(entity, value)
    }

    pub fn get(&self, entity: Entity) -> Option<&T> {
        self.entries.get(&entity)
    }

    pub fn get_mut(&mut self, entity: Entity) -> Option<&mut T> {
        self.entries.get_mut(&entity)
    }

    /// Fail-fast lookup for callers that know the entry exists.
    #[track_caller]
    pub fn expect(&self, entity: Entity) -> &T {
        fail_fast(self.entries.get(&entity).ok_or(SimError::SideTableMissing {
            behavior: self.behavior,
            entity,
        }))
    }

    pub fn delete(&mut self, entity: Entity) -> Option<T> {
        self.entries.remove(&entity)
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.entries.contains_key(&entity)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_delete() {
        let mut table = SideTable::new("walker.health");
        table.set(Entity(3), 10);
        *table.get_mut(Entity(3)) -= 4;
        assert_eq!(*table.get(Entity(3)), 6);
        assert_eq!(table.delete(Entity(3)), 6);
        assert!(table.is_empty());
    }

    #[test]
    fn missing_entry_names_behavior() {
        let table: SideTable<u8> = SideTable::new("player.movement");
        let err = table.try_get(Entity(1)).unwrap_err();
        let text = err.to_string();
        assert!(text.contains("player.movement"), "{text}");
        assert!(text.contains("#1"), "{text}");
    }

    #[test]
    #[should_panic(expected = "already has an entry")]
    fn double_create_panics() {
        let mut table = SideTable::new("player.attack");
        table.set(Entity(0), ());
        table.set(Entity(0), ());
    }

    #[test]
    #[should_panic(expected = "create hook not run")]
    fn get_before_create_panics() {
        let table: SideTable<u8> = SideTable::new("walker.health");
        table.get(Entity(9));
    }

    #[test]
    fn optional_table_reports_absence() {
        let mut table = OptionalSideTable::new("walker.spawn");
        assert!(table.get(Entity(2)).is_none());
        assert_eq!(table.set(Entity(2), 'x'), None);
        assert_eq!(table.set(Entity(2), 'y'), Some('x'));
        assert_eq!(table.delete(Entity(2)), Some('y'));
        assert_eq!(table.delete(Entity(2)), None);
    }
}
