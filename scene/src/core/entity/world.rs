//! World wrapper providing helper methods for entity management

use super::hierarchy;
use hecs::Entity;
use tracing::debug;

/// Wrapper around hecs::World providing additional helper methods
pub struct World {
    inner: hecs::World,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    /// Create a new empty world
    pub fn new() -> Self {
        Self {
            inner: hecs::World::new(),
        }
    }

    /// Spawn a new entity with the given components
    pub fn spawn(&mut self, components: impl hecs::DynamicBundle) -> Entity {
        self.inner.spawn(components)
    }

    /// Get a reference to a component on an entity
    pub fn get<T: hecs::Component>(
        &self,
        entity: Entity,
    ) -> Result<hecs::Ref<T>, hecs::ComponentError> {
        self.inner.get::<&T>(entity)
    }

    /// Query a single entity for a mutable component reference
    pub fn query_one_mut<Q: hecs::Query>(
        &mut self,
        entity: Entity,
    ) -> Result<Q::Item<'_>, hecs::QueryOneError> {
        self.inner.query_one_mut::<Q>(entity)
    }

    /// Insert a component into an entity, replacing any existing one
    pub fn insert_one(
        &mut self,
        entity: Entity,
        component: impl hecs::Component,
    ) -> Result<(), hecs::NoSuchEntity> {
        self.inner.insert_one(entity, component)
    }

    /// Remove a component from an entity, returning it
    pub fn remove_one<T: hecs::Component>(
        &mut self,
        entity: Entity,
    ) -> Result<T, hecs::ComponentError> {
        self.inner.remove_one::<T>(entity)
    }

    /// Query entities with specific components
    pub fn query<Q: hecs::Query>(&self) -> hecs::QueryBorrow<Q> {
        self.inner.query()
    }

    /// Query entities with specific components (mutable)
    pub fn query_mut<Q: hecs::Query>(&mut self) -> hecs::QueryMut<Q> {
        self.inner.query_mut()
    }

    /// Check if an entity exists
    pub fn contains(&self, entity: Entity) -> bool {
        self.inner.contains(entity)
    }

    /// Despawn an entity and all its components
    ///
    /// The entity is detached from the hierarchy first: its children become
    /// roots and its old parent is cleaned up, so the sibling chains never
    /// reference a dead entity.
    pub fn despawn(&mut self, entity: Entity) -> Result<(), hecs::NoSuchEntity> {
        if self.contains(entity) {
            let orphans: Vec<Entity> = hierarchy::children(self, entity).collect();
            for child in orphans {
                hierarchy::clear_parent(self, child);
            }
            hierarchy::clear_parent(self, entity);
            debug!(entity = ?entity, "Despawning entity");
        }
        self.inner.despawn(entity)
    }

    /// Despawn an entity together with its entire subtree
    pub fn despawn_recursive(&mut self, entity: Entity) -> Result<(), hecs::NoSuchEntity> {
        let subtree: Vec<Entity> = hierarchy::children(self, entity).collect();
        for child in subtree {
            let _ = self.despawn_recursive(child);
        }
        self.despawn(entity)
    }

    /// Get access to the inner hecs::World for advanced operations
    pub fn inner(&self) -> &hecs::World {
        &self.inner
    }

    /// Get mutable access to the inner hecs::World for advanced operations
    pub fn inner_mut(&mut self) -> &mut hecs::World {
        &mut self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::entity::components::{Hierarchy, Translation};
    use crate::core::entity::hierarchy::{children, get_parent, set_parent};
    use glam::Vec3;

    #[test]
    fn test_world_spawn() {
        let mut world = World::new();
        let entity = world.spawn((Translation::default(),));
        assert!(world.contains(entity));
    }

    #[test]
    fn test_despawn_detaches_from_parent() {
        let mut world = World::new();
        let parent = world.spawn(());
        let child = world.spawn(());
        let sibling = world.spawn(());
        set_parent(&mut world, child, Some(parent)).unwrap();
        set_parent(&mut world, sibling, Some(parent)).unwrap();

        world.despawn(child).unwrap();

        assert!(!world.contains(child));
        let remaining: Vec<_> = children(&world, parent).collect();
        assert_eq!(remaining, vec![sibling]);
    }

    #[test]
    fn test_despawn_orphans_children() {
        let mut world = World::new();
        let parent = world.spawn(());
        let child = world.spawn(());
        set_parent(&mut world, child, Some(parent)).unwrap();

        world.despawn(parent).unwrap();

        assert!(world.contains(child));
        assert_eq!(get_parent(&world, child), None);
        // The orphan no longer participates in any relationship.
        assert!(world.get::<Hierarchy>(child).is_err());
    }

    #[test]
    fn test_despawn_recursive_removes_subtree() {
        let mut world = World::new();
        let root = world.spawn(());
        let child = world.spawn(());
        let grandchild = world.spawn(());
        let bystander = world.spawn((Translation(Vec3::X),));
        set_parent(&mut world, child, Some(root)).unwrap();
        set_parent(&mut world, grandchild, Some(child)).unwrap();

        world.despawn_recursive(root).unwrap();

        assert!(!world.contains(root));
        assert!(!world.contains(child));
        assert!(!world.contains(grandchild));
        assert!(world.contains(bystander));
    }
}
