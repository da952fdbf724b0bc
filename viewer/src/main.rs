//! Viewer entry point demonstrating hierarchy editing and transform composition

use glam::Vec3;
use scene::prelude::*;
use tracing::{info, warn};

fn main() {
    // Initialize logging
    scene::init_logging();
    info!("Starting scene viewer");

    let mut world = World::new();

    // A model with a mount point and a prop attached to it, the way a
    // viewer composes a loaded model with its accessories.
    let model = world.spawn((
        Name::new("model"),
        Translation(Vec3::new(0.0, 0.0, -4.0)),
        RotationEulerXyz(Vec3::new(0.0, 45.0, 0.0)),
    ));
    let mount = world.spawn((
        Name::new("mount"),
        Translation(Vec3::new(0.0, 1.0, 0.0)),
        Scale(0.5),
    ));
    let prop = world.spawn((Name::new("prop"), Translation(Vec3::new(1.0, 0.0, 0.0))));

    set_parent(&mut world, mount, Some(model)).expect("mount attaches to model");
    set_parent(&mut world, prop, Some(mount)).expect("prop attaches to mount");

    update_transform_system(&mut world);
    report(&world, "initial layout");

    // Move the whole model; children follow on the next update.
    world
        .query_one_mut::<&mut Translation>(model)
        .expect("model has a translation")
        .0 = Vec3::new(2.0, 0.0, -4.0);
    update_transform_system(&mut world);
    report(&world, "after moving the model");

    // Reparent the prop directly under the model at runtime.
    set_parent(&mut world, prop, Some(model)).expect("prop reattaches to model");
    update_transform_system(&mut world);
    report(&world, "after reparenting the prop");

    // Structural rejections are no-ops: the viewer just surfaces them.
    if let Err(rejection) = set_parent(&mut world, model, Some(prop)) {
        warn!(%rejection, "Edit rejected, hierarchy unchanged");
    }

    let absolute = calculate_absolute_rotation_euler_xyz(&world, mount);
    info!(yaw = absolute.y, "Mount absolute Euler rotation");

    info!(
        entity_count = world.query::<()>().iter().count(),
        nested_count = world.query::<&Hierarchy>().iter().count(),
        "Scene statistics"
    );
}

fn report(world: &World, stage: &str) {
    info!("World positions: {stage}");
    for (_, (name, local_to_world)) in world.query::<(&Name, &LocalToWorld)>().iter() {
        let position = local_to_world.position();
        info!(name = %name.0, x = position.x, y = position.y, z = position.z, "entity");
    }
}
