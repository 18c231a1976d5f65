//! Triangle geometry and Möller–Trumbore ray intersection.

use crate::math::{Vec3, normalize_or_zero};

/// Determinants inside `±PARALLEL_EPSILON` are treated as a ray parallel to the triangle.
pub const PARALLEL_EPSILON: f32 = 1e-7;

/// Result of a ray/triangle intersection test.
///
/// `t` is measured in units of the ray direction's magnitude; `u` and `v` are
/// the barycentric coordinates of the hit relative to `v1` and `v2`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    pub hit: bool,
    pub t: f32,
    pub u: f32,
    pub v: f32,
}

impl Intersection {
    pub fn miss() -> Self {
        Self {
            hit: false,
            t: 0.0,
            u: 0.0,
            v: 0.0,
        }
    }

    /// Returns `Some(t)` for a hit, `None` for a miss.
    pub fn distance(&self) -> Option<f32> {
        self.hit.then_some(self.t)
    }
}

/// A single scene triangle tagged with the name of its acoustic material.
///
/// Normal, centroid and area are derived on demand rather than stored.
#[derive(Debug, Clone, PartialEq)]
pub struct Triangle {
    pub v0: Vec3,
    pub v1: Vec3,
    pub v2: Vec3,
    pub material: String,
}

impl Triangle {
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3, material: impl Into<String>) -> Self {
        Self {
            v0,
            v1,
            v2,
            material: material.into(),
        }
    }

    /// Unit normal following the `v0 -> v1 -> v2` winding.
    ///
    /// Zero for degenerate triangles.
    pub fn normal(&self) -> Vec3 {
        normalize_or_zero((self.v1 - self.v0).cross(self.v2 - self.v0))
    }

    pub fn centroid(&self) -> Vec3 {
        (self.v0 + self.v1 + self.v2) / 3.0
    }

    pub fn area(&self) -> f32 {
        (self.v1 - self.v0).cross(self.v2 - self.v0).length() * 0.5
    }

    /// True when the triangle has no usable normal (collinear or coincident vertices).
    pub fn is_degenerate(&self) -> bool {
        self.normal() == Vec3::ZERO
    }

    /// Möller–Trumbore ray/triangle intersection.
    ///
    /// `direction` does not need to be normalized. Misses when the ray is
    /// parallel to the triangle plane, when the hit falls outside the triangle,
    /// or when `t` is not strictly positive.
    pub fn intersect(&self, origin: Vec3, direction: Vec3) -> Intersection {
        let edge1 = self.v1 - self.v0;
        let edge2 = self.v2 - self.v0;
        let h = direction.cross(edge2);
        let det = edge1.dot(h);

        if det > -PARALLEL_EPSILON && det < PARALLEL_EPSILON {
            return Intersection::miss();
        }

        let inv_det = 1.0 / det;
        let s = origin - self.v0;
        let u = inv_det * s.dot(h);
        if !(0.0..=1.0).contains(&u) {
            return Intersection::miss();
        }

        let q = s.cross(edge1);
        let v = inv_det * direction.dot(q);
        if v < 0.0 || u + v > 1.0 {
            return Intersection::miss();
        }

        let t = inv_det * edge2.dot(q);
        if t <= 0.0 {
            return Intersection::miss();
        }

        Intersection { hit: true, t, u, v }
    }
}

/// Free-function form of [`Triangle::intersect`].
pub fn intersect(origin: Vec3, direction: Vec3, triangle: &Triangle) -> Intersection {
    triangle.intersect(origin, direction)
}
