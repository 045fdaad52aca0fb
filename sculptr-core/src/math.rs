//! Vector helpers shared by the geometry and camera code
use nalgebra::Vector3;

/// Three-component single precision vector used for positions, directions and normals
pub type Vec3 = Vector3<f32>;

/// Lengths at or below this are treated as zero by [`normalize`]
pub const EPSILON: f32 = 1e-12;

pub fn add(a: Vec3, b: Vec3) -> Vec3 {
    a + b
}

pub fn sub(a: Vec3, b: Vec3) -> Vec3 {
    a - b
}

pub fn scale(v: Vec3, s: f32) -> Vec3 {
    v * s
}

pub fn dot(a: Vec3, b: Vec3) -> f32 {
    a.dot(&b)
}

pub fn cross(a: Vec3, b: Vec3) -> Vec3 {
    a.cross(&b)
}

/// Unit vector in the direction of `v`.
///
/// The zero vector (or anything too short to divide by) maps to the zero
/// vector, so callers never see NaN components.
pub fn normalize(v: Vec3) -> Vec3 {
    v.try_normalize(EPSILON).unwrap_or_else(Vec3::zeros)
}
