//! Entity-Component System (ECS) functionality
//!
//! This module provides the entity world, the transform and hierarchy
//! components, and the operations that keep them consistent.

pub mod components;
pub mod hierarchy;
pub mod transform;
pub mod world;

// Re-export commonly used types
pub use components::{
    Hierarchy, LocalToParent, LocalToWorld, Name, Rotation, RotationEulerXyz, Scale, Translation,
};
pub use hierarchy::{clear_parent, get_parent, set_parent, HierarchyError};
pub use transform::{calculate_absolute_rotation_euler_xyz, update_transform_system};
pub use world::World;

// Re-export hecs types that users will need
pub use hecs::Entity;
