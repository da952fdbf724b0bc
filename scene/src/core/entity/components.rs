//! Core components for the entity system

use glam::{EulerRot, Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Translation of an entity relative to its parent (or world space if the
/// entity has no parent)
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Translation(pub Vec3);

/// Rotation of an entity relative to its parent, as a unit quaternion
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Rotation(pub Quat);

impl Default for Rotation {
    fn default() -> Self {
        Self(Quat::IDENTITY)
    }
}

/// Optional Euler-angle rotation (degrees, XYZ order) relative to the parent
///
/// This is an alternative representation to [`Rotation`]; the two are not
/// kept in sync. Callers choose one representation per entity, and mixing
/// them along a single ancestor chain is unsupported. When both are present,
/// the transform composer reads [`Rotation`].
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct RotationEulerXyz(pub Vec3);

impl RotationEulerXyz {
    /// Convert the stored degrees into a quaternion
    pub fn to_quat(&self) -> Quat {
        Quat::from_euler(
            EulerRot::XYZ,
            self.0.x.to_radians(),
            self.0.y.to_radians(),
            self.0.z.to_radians(),
        )
    }
}

/// Uniform scale of an entity relative to its parent
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Scale(pub f32);

impl Default for Scale {
    fn default() -> Self {
        Self(1.0)
    }
}

/// Matrix taking an entity's local space into its parent's coordinate system
///
/// Present only on entities that participate in a hierarchy; attached and
/// removed alongside [`Hierarchy`] by the reparenting operations.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LocalToParent {
    /// Parent-relative transformation matrix
    pub matrix: Mat4,
}

impl Default for LocalToParent {
    fn default() -> Self {
        Self {
            matrix: Mat4::IDENTITY,
        }
    }
}

impl LocalToParent {
    /// Create a new local-to-parent transform from a matrix
    pub fn from_matrix(matrix: Mat4) -> Self {
        Self { matrix }
    }
}

/// Matrix taking an entity's local space into world space
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LocalToWorld {
    /// World-space transformation matrix
    pub matrix: Mat4,
}

impl Default for LocalToWorld {
    fn default() -> Self {
        Self {
            matrix: Mat4::IDENTITY,
        }
    }
}

impl LocalToWorld {
    /// Create a new world transform from a matrix
    pub fn from_matrix(matrix: Mat4) -> Self {
        Self { matrix }
    }

    /// Get the world position from the transformation matrix
    pub fn position(&self) -> Vec3 {
        self.matrix.w_axis.truncate()
    }

    /// Get the world rotation by decomposing the matrix
    ///
    /// Only the rotation factor is kept; the matrix is assumed to carry no
    /// skew or perspective.
    pub fn rotation(&self) -> Quat {
        let (_scale, rotation, _translation) = self.matrix.to_scale_rotation_translation();
        rotation
    }

    /// Get the forward direction (negative Z basis column)
    pub fn forward(&self) -> Vec3 {
        (-self.matrix.z_axis.truncate()).normalize()
    }

    /// Get the right direction (positive X basis column)
    pub fn right(&self) -> Vec3 {
        self.matrix.x_axis.truncate().normalize()
    }

    /// Get the up direction (positive Y basis column)
    pub fn up(&self) -> Vec3 {
        self.matrix.y_axis.truncate().normalize()
    }
}

/// Component attached to entities that are a child of another entity and/or
/// have children of their own
///
/// The sibling list is an intrusive doubly-linked chain: `previous`/`next`
/// point at siblings under the same parent, and a parent's `first_child` is
/// the head of that chain. Links are entity identifiers rather than
/// references so the structure stays valid across storage moves. An entity
/// without this component has no parent and no children.
///
/// Note: holds `hecs::Entity` links, which have no serialized form, so this
/// component is intentionally not serializable. Hierarchies are rebuilt by
/// replaying reparent operations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Hierarchy {
    /// Parent entity, if any
    pub parent: Option<hecs::Entity>,
    /// Previous sibling under the same parent
    pub previous: Option<hecs::Entity>,
    /// Next sibling under the same parent
    pub next: Option<hecs::Entity>,
    /// Head of this entity's child list
    pub first_child: Option<hecs::Entity>,
}

impl Hierarchy {
    /// Whether this entity has a parent
    pub fn has_parent(&self) -> bool {
        self.parent.is_some()
    }

    /// Whether this entity has siblings on either side
    pub fn has_siblings(&self) -> bool {
        self.previous.is_some() || self.next.is_some()
    }

    /// Whether this entity has at least one child
    pub fn has_children(&self) -> bool {
        self.first_child.is_some()
    }
}

/// Name component for user-friendly entity identification
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Name(pub String);

impl Name {
    /// Create a new name component
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}
