//! Angle utilities shared by the transform composition code

use glam::Vec3;

/// Wrap an angle in degrees into the canonical range [-180, 180).
pub fn fix_angle(degrees: f32) -> f32 {
    (degrees + 180.0).rem_euclid(360.0) - 180.0
}

/// Wrap each component of a degree triple into [-180, 180).
pub fn fix_angles(degrees: Vec3) -> Vec3 {
    Vec3::new(
        fix_angle(degrees.x),
        fix_angle(degrees.y),
        fix_angle(degrees.z),
    )
}
