//! Math types for Acoustrace

pub use glam::Vec3;

/// Vectors shorter than this normalize to zero instead of blowing up.
pub const NORMALIZE_EPSILON: f32 = 1e-8;

/// Returns `v / |v|`, or the zero vector if `|v|` is below [`NORMALIZE_EPSILON`].
pub fn normalize_or_zero(v: Vec3) -> Vec3 {
    let len = v.length();
    if len < NORMALIZE_EPSILON {
        Vec3::ZERO
    } else {
        v / len
    }
}

/// Mirrors `point` across the plane through `plane_point` with unit normal `normal`.
///
/// This is the image-source construction: the mirrored point sits at the same
/// distance behind the plane as `point` sits in front of it.
pub fn reflect_point_across_plane(point: Vec3, plane_point: Vec3, normal: Vec3) -> Vec3 {
    let signed_distance = (point - plane_point).dot(normal);
    point - normal * (2.0 * signed_distance)
}
