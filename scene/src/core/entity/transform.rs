//! Transform composition: local TRS matrices and world-matrix propagation
//!
//! Local transforms are expressed by the `Translation`/`Rotation`/
//! `RotationEulerXyz`/`Scale` components; this module folds them into
//! `LocalToParent` matrices and composes those down the hierarchy into
//! `LocalToWorld`. The accumulated-Euler path is independent of the matrix
//! path and the two are not reconciled; see `RotationEulerXyz`.

use super::components::{
    Hierarchy, LocalToParent, LocalToWorld, Rotation, RotationEulerXyz, Scale, Translation,
};
use super::hierarchy::{ancestors, children, get_parent};
use super::world::World;
use crate::core::math::fix_angles;
use glam::{Mat4, Quat, Vec3};
use hecs::Entity;
use tracing::trace;

/// Derive the parent-relative TRS matrix for an entity.
///
/// Missing components fall back to neutral values: zero translation,
/// identity rotation, unit scale. Composition order is scale, then rotate,
/// then translate. Pure read; no hierarchy traversal.
pub fn local_to_parent_matrix(world: &World, entity: Entity) -> Mat4 {
    let translation = world
        .get::<Translation>(entity)
        .map(|translation| translation.0)
        .unwrap_or(Vec3::ZERO);

    let rotation = match world.get::<Rotation>(entity) {
        Ok(rotation) => rotation.0,
        Err(_) => world
            .get::<RotationEulerXyz>(entity)
            .map(|euler| euler.to_quat())
            .unwrap_or(Quat::IDENTITY),
    };

    let scale = world.get::<Scale>(entity).map(|scale| scale.0).unwrap_or(1.0);

    Mat4::from_scale_rotation_translation(Vec3::splat(scale), rotation, translation)
}

/// Refresh an entity's `LocalToParent` matrix from its value components.
///
/// Entities outside the hierarchy carry no `LocalToParent`; for those this
/// is a no-op.
pub fn compute_local_to_parent(world: &mut World, entity: Entity) {
    let matrix = local_to_parent_matrix(world, entity);
    if let Ok(local_to_parent) = world.query_one_mut::<&mut LocalToParent>(entity) {
        local_to_parent.matrix = matrix;
    }
}

/// Compose an entity's world matrix from the root ancestor down.
///
/// Every `LocalToParent` on the chain is refreshed on the way, so the result
/// never reflects a stale ancestor after a reparent or transform edit. The
/// entity's `LocalToWorld` is written (attached first if absent) and the
/// matrix returned. A root's world matrix is its own local transform.
pub fn compute_local_to_world(world: &mut World, entity: Entity) -> Mat4 {
    debug_assert!(
        world.contains(entity),
        "compute_local_to_world on a despawned entity"
    );

    let parent_matrix = match get_parent(world, entity) {
        Some(parent) => compute_local_to_world(world, parent),
        None => Mat4::IDENTITY,
    };

    let local = local_to_parent_matrix(world, entity);
    if let Ok(local_to_parent) = world.query_one_mut::<&mut LocalToParent>(entity) {
        local_to_parent.matrix = local;
    }

    let matrix = parent_matrix * local;
    write_local_to_world(world, entity, matrix);
    matrix
}

/// Update every entity's derived matrices, parents before children.
///
/// Refreshes all `LocalToParent` matrices from the value components, then
/// walks each root's subtree through the sibling chains writing
/// `LocalToWorld` top-down. Run this after a batch of transform edits or
/// reparents; afterwards no reader observes a world matrix computed from a
/// stale ancestor chain.
pub fn update_transform_system(world: &mut World) {
    let nested: Vec<Entity> = world
        .query::<&LocalToParent>()
        .iter()
        .map(|(entity, _)| entity)
        .collect();
    for &entity in &nested {
        compute_local_to_parent(world, entity);
    }

    // Roots: no parent, and some transform state worth resolving. Entities
    // that carry nothing transform-related are left alone.
    let mut roots = Vec::new();
    for (entity, ()) in world.query::<()>().iter() {
        if get_parent(world, entity).is_some() {
            continue;
        }
        if world.get::<Hierarchy>(entity).is_ok()
            || world.get::<Translation>(entity).is_ok()
            || world.get::<Rotation>(entity).is_ok()
            || world.get::<RotationEulerXyz>(entity).is_ok()
            || world.get::<Scale>(entity).is_ok()
            || world.get::<LocalToWorld>(entity).is_ok()
        {
            roots.push(entity);
        }
    }

    trace!(root_count = roots.len(), "Starting transform update");

    for root in roots {
        propagate(world, root, Mat4::IDENTITY);
    }
}

fn propagate(world: &mut World, entity: Entity, parent_matrix: Mat4) {
    let local = match world.get::<LocalToParent>(entity) {
        Ok(local_to_parent) => local_to_parent.matrix,
        Err(_) => local_to_parent_matrix(world, entity),
    };
    let matrix = parent_matrix * local;
    write_local_to_world(world, entity, matrix);

    let child_list: Vec<Entity> = children(world, entity).collect();
    for child in child_list {
        propagate(world, child, matrix);
    }
}

fn write_local_to_world(world: &mut World, entity: Entity, matrix: Mat4) {
    match world.query_one_mut::<&mut LocalToWorld>(entity) {
        Ok(local_to_world) => local_to_world.matrix = matrix,
        Err(_) => {
            let _ = world.insert_one(entity, LocalToWorld::from_matrix(matrix));
        }
    }
}

/// Accumulate Euler XYZ rotation (degrees) up the ancestor chain.
///
/// Sums the entity's own `RotationEulerXyz` with every ancestor's; entities
/// lacking the component contribute zero. The result is canonicalized into
/// [-180, 180) per axis. This path is deliberately independent of the
/// quaternion/matrix rotation and must not be mixed with it on one chain.
pub fn calculate_absolute_rotation_euler_xyz(world: &World, entity: Entity) -> Vec3 {
    debug_assert!(
        world.contains(entity),
        "calculate_absolute_rotation_euler_xyz on a despawned entity"
    );

    let mut degrees = world
        .get::<RotationEulerXyz>(entity)
        .map(|euler| euler.0)
        .unwrap_or(Vec3::ZERO);

    for ancestor in ancestors(world, entity) {
        if let Ok(euler) = world.get::<RotationEulerXyz>(ancestor) {
            degrees += euler.0;
        }
    }

    fix_angles(degrees)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::entity::components::Name;
    use crate::core::entity::hierarchy::set_parent;
    use std::f32::consts::FRAC_PI_2;

    fn assert_mat4_eq(a: Mat4, b: Mat4) {
        let (a, b) = (a.to_cols_array(), b.to_cols_array());
        for (left, right) in a.iter().zip(b.iter()) {
            assert!((left - right).abs() < 1e-5, "{a:?} != {b:?}");
        }
    }

    #[test]
    fn test_local_matrix_defaults_to_identity() {
        let mut world = World::new();
        let entity = world.spawn(());
        assert_mat4_eq(local_to_parent_matrix(&world, entity), Mat4::IDENTITY);
    }

    #[test]
    fn test_local_matrix_trs_order() {
        let mut world = World::new();
        let entity = world.spawn((
            Translation(Vec3::new(1.0, 0.0, 0.0)),
            Rotation(Quat::from_rotation_y(FRAC_PI_2)),
            Scale(2.0),
        ));

        // Scale, then rotate, then translate: +X maps to scale -> (2,0,0),
        // quarter turn about +Y -> (0,0,-2), offset -> (1,0,-2).
        let matrix = local_to_parent_matrix(&world, entity);
        let mapped = matrix.transform_point3(Vec3::X);
        assert!((mapped - Vec3::new(1.0, 0.0, -2.0)).length() < 1e-5);
    }

    #[test]
    fn test_rotation_preferred_over_euler() {
        let mut world = World::new();
        let entity = world.spawn((
            Rotation(Quat::from_rotation_y(FRAC_PI_2)),
            RotationEulerXyz(Vec3::new(0.0, 0.0, 180.0)),
        ));

        let expected =
            Mat4::from_scale_rotation_translation(Vec3::ONE, Quat::from_rotation_y(FRAC_PI_2), Vec3::ZERO);
        assert_mat4_eq(local_to_parent_matrix(&world, entity), expected);
    }

    #[test]
    fn test_euler_used_when_no_quaternion() {
        let mut world = World::new();
        let entity = world.spawn((RotationEulerXyz(Vec3::new(0.0, 90.0, 0.0)),));

        let matrix = local_to_parent_matrix(&world, entity);
        let mapped = matrix.transform_point3(Vec3::X);
        assert!((mapped - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-5);
    }

    #[test]
    fn test_root_world_equals_local() {
        let mut world = World::new();
        let root = world.spawn((
            Translation(Vec3::new(3.0, -2.0, 5.0)),
            Rotation(Quat::from_rotation_x(0.7)),
            Scale(1.5),
        ));

        let matrix = compute_local_to_world(&mut world, root);

        assert_mat4_eq(matrix, local_to_parent_matrix(&world, root));
        let local_to_world = world.get::<LocalToWorld>(root).unwrap();
        assert_mat4_eq(local_to_world.matrix, matrix);
    }

    #[test]
    fn test_composed_chain_with_scale() {
        let mut world = World::new();
        let root = world.spawn((Translation(Vec3::ZERO),));
        let middle = world.spawn((Translation(Vec3::new(1.0, 0.0, 0.0)), Scale(2.0)));
        let leaf = world.spawn((Translation(Vec3::new(1.0, 0.0, 0.0)),));
        set_parent(&mut world, middle, Some(root)).unwrap();
        set_parent(&mut world, leaf, Some(middle)).unwrap();

        update_transform_system(&mut world);

        // The leaf's offset is scaled by its parent before being translated:
        // 1 + 2 * 1, not the naive 1 + 1.
        let leaf_position = world.get::<LocalToWorld>(leaf).unwrap().position();
        assert!((leaf_position - Vec3::new(3.0, 0.0, 0.0)).length() < 1e-5);

        let middle_position = world.get::<LocalToWorld>(middle).unwrap().position();
        assert!((middle_position - Vec3::new(1.0, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_parent_move_child_follows() {
        let mut world = World::new();
        let parent = world.spawn((Translation(Vec3::ZERO),));
        let child = world.spawn((Translation(Vec3::new(5.0, 0.0, 0.0)),));
        set_parent(&mut world, child, Some(parent)).unwrap();
        update_transform_system(&mut world);

        world.query_one_mut::<&mut Translation>(parent).unwrap().0 = Vec3::new(50.0, 0.0, 0.0);
        update_transform_system(&mut world);

        let child_position = world.get::<LocalToWorld>(child).unwrap().position();
        assert!((child_position - Vec3::new(55.0, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_reparent_then_recompute_is_fresh() {
        let mut world = World::new();
        let first = world.spawn((Translation(Vec3::new(10.0, 0.0, 0.0)),));
        let second = world.spawn((Translation(Vec3::new(20.0, 0.0, 0.0)),));
        let child = world.spawn((Translation(Vec3::new(1.0, 0.0, 0.0)),));

        set_parent(&mut world, child, Some(first)).unwrap();
        let position = compute_local_to_world(&mut world, child).w_axis.truncate();
        assert!((position - Vec3::new(11.0, 0.0, 0.0)).length() < 1e-5);

        set_parent(&mut world, child, Some(second)).unwrap();
        let position = compute_local_to_world(&mut world, child).w_axis.truncate();
        assert!((position - Vec3::new(21.0, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_lazy_local_to_world_attachment() {
        let mut world = World::new();
        let entity = world.spawn((Translation(Vec3::X),));
        assert!(world.get::<LocalToWorld>(entity).is_err());

        update_transform_system(&mut world);

        assert!(world.get::<LocalToWorld>(entity).is_ok());
    }

    #[test]
    fn test_entities_without_transform_state_left_alone() {
        let mut world = World::new();
        let entity = world.spawn((Name::new("bare"),));

        update_transform_system(&mut world);

        assert!(world.get::<LocalToWorld>(entity).is_err());
    }

    #[test]
    fn test_compute_local_to_parent_writes_component() {
        let mut world = World::new();
        let parent = world.spawn(());
        let child = world.spawn((Translation(Vec3::new(2.0, 0.0, 0.0)),));
        set_parent(&mut world, child, Some(parent)).unwrap();

        // Attachment starts the matrix at identity; refreshing folds the
        // value components in.
        compute_local_to_parent(&mut world, child);

        let local_to_parent = world.get::<LocalToParent>(child).unwrap();
        assert_mat4_eq(
            local_to_parent.matrix,
            Mat4::from_translation(Vec3::new(2.0, 0.0, 0.0)),
        );
    }

    #[test]
    fn test_absolute_euler_chain_wraps() {
        let mut world = World::new();
        let root = world.spawn((RotationEulerXyz(Vec3::new(10.0, 0.0, 0.0)),));
        let middle = world.spawn((RotationEulerXyz(Vec3::new(350.0, 0.0, 0.0)),));
        let leaf = world.spawn((RotationEulerXyz(Vec3::new(10.0, 0.0, 0.0)),));
        set_parent(&mut world, middle, Some(root)).unwrap();
        set_parent(&mut world, leaf, Some(middle)).unwrap();

        // 10 + 350 + 10 = 370, canonicalized back into range.
        let absolute = calculate_absolute_rotation_euler_xyz(&world, leaf);
        assert!((absolute.x - 10.0).abs() < 1e-4);
        assert_eq!(absolute.y, 0.0);
        assert_eq!(absolute.z, 0.0);
    }

    #[test]
    fn test_absolute_euler_missing_components_contribute_zero() {
        let mut world = World::new();
        let root = world.spawn((RotationEulerXyz(Vec3::new(30.0, 0.0, 0.0)),));
        let middle = world.spawn(());
        let leaf = world.spawn(());
        set_parent(&mut world, middle, Some(root)).unwrap();
        set_parent(&mut world, leaf, Some(middle)).unwrap();

        let absolute = calculate_absolute_rotation_euler_xyz(&world, leaf);
        assert!((absolute.x - 30.0).abs() < 1e-4);
    }
}
