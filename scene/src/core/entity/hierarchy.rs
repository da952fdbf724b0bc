//! Parent/child relationships over the entity world
//!
//! The hierarchy is stored as intrusive doubly-linked sibling chains inside
//! the [`Hierarchy`] component; all structural edits go through
//! [`set_parent`]/[`clear_parent`], which keep the chains, the lazily
//! attached [`LocalToParent`] components, and the no-cycle guarantee
//! consistent under arbitrary edit order.

use super::components::{Hierarchy, LocalToParent};
use super::world::World;
use hecs::Entity;
use std::collections::HashSet;
use tracing::{debug, trace, warn};

/// Errors produced by structural hierarchy edits
///
/// Rejected edits leave the hierarchy untouched; they are logged as warnings
/// and reported to the caller, who is free to ignore them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum HierarchyError {
    #[error("entity {0:?} cannot be its own parent")]
    SelfParent(Entity),

    #[error("parenting {entity:?} under {parent:?} would create a cycle")]
    WouldCreateCycle { entity: Entity, parent: Entity },
}

/// Copy an entity's hierarchy links, if it has any
fn links_of(world: &World, entity: Entity) -> Option<Hierarchy> {
    world.get::<Hierarchy>(entity).map(|links| *links).ok()
}

/// Get the parent of an entity, or `None` if it has no parent
pub fn get_parent(world: &World, entity: Entity) -> Option<Entity> {
    debug_assert!(world.contains(entity), "get_parent on a despawned entity");
    links_of(world, entity).and_then(|links| links.parent)
}

/// Reparent `entity` under `parent`; `None` clears the parent.
///
/// Children are inserted at the head of the parent's child list, so sibling
/// traversal visits the most recently attached child first. This is a
/// deliberate, stable policy.
///
/// Self-parenting and edits that would make `entity` an ancestor of itself
/// are rejected: the hierarchy is left unchanged, a warning is logged, and
/// the rejection is returned. Reparenting onto the current parent is a
/// successful no-op.
///
/// The cycle guard walks the ancestor chain of `parent`, which is O(depth);
/// fine for viewer-scale hierarchies, worth revisiting for deep trees.
pub fn set_parent(
    world: &mut World,
    entity: Entity,
    parent: Option<Entity>,
) -> Result<(), HierarchyError> {
    debug_assert!(world.contains(entity), "set_parent on a despawned entity");
    debug_assert!(
        parent.map_or(true, |parent| world.contains(parent)),
        "set_parent with a despawned parent"
    );

    if parent == Some(entity) {
        warn!(entity = ?entity, "Rejected reparent: entity cannot be its own parent");
        return Err(HierarchyError::SelfParent(entity));
    }

    if let Some(parent) = parent {
        // A Hierarchy component implies a valid chain up to a parentless
        // root, so following the links is enough.
        if ancestors(world, parent).any(|ancestor| ancestor == entity) {
            warn!(
                entity = ?entity,
                parent = ?parent,
                "Rejected reparent: entity is an ancestor of the requested parent"
            );
            return Err(HierarchyError::WouldCreateCycle { entity, parent });
        }
    }

    let mut links = links_of(world, entity);

    if let Some(current) = links {
        // Already a child of the requested parent; nothing to do.
        if current.parent == parent {
            return Ok(());
        }

        unlink(world, entity, &current);
        links = Some(Hierarchy {
            first_child: current.first_child,
            ..Hierarchy::default()
        });
    }

    match parent {
        Some(parent) => {
            let mut entity_links = links.unwrap_or_default();
            entity_links.parent = Some(parent);

            // LocalToParent rides along with hierarchy membership.
            if world.get::<LocalToParent>(entity).is_err() {
                let _ = world.insert_one(entity, LocalToParent::default());
            }

            let mut parent_links = links_of(world, parent).unwrap_or_default();
            if let Some(first) = parent_links.first_child {
                if let Ok(first_links) = world.query_one_mut::<&mut Hierarchy>(first) {
                    first_links.previous = Some(entity);
                }
                entity_links.next = Some(first);
                entity_links.previous = None;
            }
            parent_links.first_child = Some(entity);

            let _ = world.insert_one(entity, entity_links);
            let _ = world.insert_one(parent, parent_links);
            trace!(entity = ?entity, parent = ?parent, "Attached entity to parent");
        }
        None => {
            if let Some(entity_links) = links {
                let _ = world.remove_one::<LocalToParent>(entity);
                if entity_links.has_children() {
                    let _ = world.insert_one(entity, entity_links);
                } else {
                    let _ = world.remove_one::<Hierarchy>(entity);
                }
                trace!(entity = ?entity, "Cleared parent");
            }
        }
    }

    Ok(())
}

/// Clear the parent of an entity; equivalent to `set_parent(.., None)`
pub fn clear_parent(world: &mut World, entity: Entity) {
    // Clearing can take neither rejection path, so the result carries nothing.
    let _ = set_parent(world, entity, None);
}

/// Remove `entity` from its current sibling chain.
///
/// Patches the neighbours, advances the old parent's child-list head, and
/// applies the one-level cascade: an old parent left with no children and no
/// parent of its own stops participating in the hierarchy entirely.
fn unlink(world: &mut World, entity: Entity, links: &Hierarchy) {
    if let Some(previous) = links.previous {
        if let Ok(previous_links) = world.query_one_mut::<&mut Hierarchy>(previous) {
            previous_links.next = links.next;
        }
    }

    if let Some(next) = links.next {
        if let Ok(next_links) = world.query_one_mut::<&mut Hierarchy>(next) {
            next_links.previous = links.previous;
        }
    }

    // A parentless root has no chain to leave.
    let Some(parent) = links.parent else {
        return;
    };
    let Some(mut parent_links) = links_of(world, parent) else {
        return;
    };

    if parent_links.first_child == Some(entity) {
        parent_links.first_child = links.next;
    }

    if !parent_links.has_children() && !parent_links.has_parent() {
        let _ = world.remove_one::<Hierarchy>(parent);
        let _ = world.remove_one::<LocalToParent>(parent);
        debug!(parent = ?parent, "Removed hierarchy components from childless root");
    } else {
        let _ = world.insert_one(parent, parent_links);
    }
}

/// Iterator over the direct children of an entity, head (most recently
/// attached) first
pub fn children(world: &World, entity: Entity) -> Children<'_> {
    Children {
        world,
        next: links_of(world, entity).and_then(|links| links.first_child),
    }
}

/// See [`children`]
pub struct Children<'w> {
    world: &'w World,
    next: Option<Entity>,
}

impl Iterator for Children<'_> {
    type Item = Entity;

    fn next(&mut self) -> Option<Entity> {
        let current = self.next?;
        self.next = links_of(self.world, current).and_then(|links| links.next);
        Some(current)
    }
}

/// Iterator over an entity's ancestors, immediate parent first
pub fn ancestors(world: &World, entity: Entity) -> Ancestors<'_> {
    Ancestors {
        world,
        next: get_parent(world, entity),
    }
}

/// See [`ancestors`]
pub struct Ancestors<'w> {
    world: &'w World,
    next: Option<Entity>,
}

impl Iterator for Ancestors<'_> {
    type Item = Entity;

    fn next(&mut self) -> Option<Entity> {
        let current = self.next?;
        self.next = get_parent(self.world, current);
        Some(current)
    }
}

/// Helper function to validate hierarchy consistency
///
/// Every violation is reported as a warning and the walk continues; this
/// never fails hard, so a tool can run it on live scenes.
pub fn validate_hierarchy_system(world: &World) {
    let mut issues = 0;

    for (entity, links) in world.query::<&Hierarchy>().iter() {
        if !links.has_parent() && !links.has_children() {
            warn!(entity = ?entity, "Hierarchy component on an entity with no relationships");
            issues += 1;
        }

        if let Some(next) = links.next {
            if links_of(world, next).and_then(|n| n.previous) != Some(entity) {
                warn!(entity = ?entity, next = ?next, "Sibling chain asymmetry on next link");
                issues += 1;
            }
        }
        if let Some(previous) = links.previous {
            if links_of(world, previous).and_then(|p| p.next) != Some(entity) {
                warn!(entity = ?entity, previous = ?previous, "Sibling chain asymmetry on previous link");
                issues += 1;
            }
        }

        if let Some(parent) = links.parent {
            if !children(world, parent).any(|child| child == entity) {
                warn!(entity = ?entity, parent = ?parent, "Entity missing from its parent's child list");
                issues += 1;
            }
        }

        if links.has_parent() != world.get::<LocalToParent>(entity).is_ok() {
            warn!(entity = ?entity, "LocalToParent presence does not match parent link");
            issues += 1;
        }

        let mut seen = HashSet::new();
        for ancestor in ancestors(world, entity) {
            if !seen.insert(ancestor) || ancestor == entity {
                warn!(entity = ?entity, "Cycle detected in ancestor chain");
                issues += 1;
                break;
            }
        }
    }

    for (entity, _) in world
        .query::<&LocalToParent>()
        .without::<&Hierarchy>()
        .iter()
    {
        warn!(entity = ?entity, "LocalToParent on an entity outside the hierarchy");
        issues += 1;
    }

    if issues > 0 {
        warn!("Found {} hierarchy validation issues", issues);
    } else {
        trace!("Hierarchy validation passed");
    }
}
