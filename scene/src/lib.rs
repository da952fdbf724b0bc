//! Hierarchical scene-transform library
//!
//! This crate provides the entity hierarchy and transform composition core
//! used by model-viewing tools: parent/child relationships over an ECS
//! world, local-to-parent matrix derivation from translation/rotation/scale
//! components, and world-matrix composition down the tree.

pub mod core;

// Re-export commonly used types
pub mod prelude {
    // Entity system types
    pub use crate::core::entity::{
        update_transform_system, Entity, Hierarchy, LocalToParent, LocalToWorld, Name, Rotation,
        RotationEulerXyz, Scale, Translation, World,
    };

    // Hierarchy operations
    pub use crate::core::entity::hierarchy::{
        ancestors, children, clear_parent, get_parent, set_parent, HierarchyError,
    };

    // Transform composition
    pub use crate::core::entity::transform::{
        calculate_absolute_rotation_euler_xyz, compute_local_to_parent, compute_local_to_world,
        local_to_parent_matrix,
    };

    // Math types
    pub use crate::core::math::{fix_angle, fix_angles};
    pub use glam::{Mat3, Mat4, Quat, Vec2, Vec3, Vec4};
}

/// Initialize logging for the library and its host tool
pub fn init_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
