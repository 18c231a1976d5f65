//! Ray casting over scene geometry.
//!
//! The path tracer only asks one question of the scene: "is this segment
//! blocked?". [`RayTracer`] is the seam where an accelerated structure (BVH,
//! grid, an engine's own physics scene) can replace the linear scan.

use crate::math::Vec3;
use crate::scene::Triangle;

/// Fraction of a segment's length trimmed from both ends before occlusion tests,
/// so surfaces touching the endpoints do not count as blockers.
pub const SEGMENT_EPSILON: f32 = 1e-4;

/// A ray with a normalized direction and a valid distance interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit direction
    pub direction: Vec3,
    /// Hits closer than this are ignored (meters)
    pub t_min: f32,
    /// Hits farther than this are ignored (meters)
    pub t_max: f32,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3, t_min: f32, t_max: f32) -> Self {
        Self {
            origin,
            direction,
            t_min,
            t_max,
        }
    }

    /// Builds the ray covering the open segment `from -> to`, trimmed by [`SEGMENT_EPSILON`].
    ///
    /// Returns `None` for zero-length segments.
    pub fn segment(from: Vec3, to: Vec3) -> Option<Self> {
        let delta = to - from;
        let length = delta.length();
        if length <= f32::EPSILON {
            return None;
        }

        Some(Self::new(
            from,
            delta / length,
            length * SEGMENT_EPSILON,
            length * (1.0 - SEGMENT_EPSILON),
        ))
    }

    /// Builds the ray covering the open segment `from -> to` without trimming.
    ///
    /// Every hit strictly between the endpoints counts. Returns `None` for
    /// zero-length segments.
    pub fn open_segment(from: Vec3, to: Vec3) -> Option<Self> {
        let delta = to - from;
        let length = delta.length();
        if length <= f32::EPSILON {
            return None;
        }

        Some(Self::new(
            from,
            delta / length,
            0.0,
            length * (1.0 - f32::EPSILON),
        ))
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Result of a ray cast.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Whether the ray hit any geometry
    pub hit: bool,

    /// Distance from ray origin to hit point (in meters)
    ///
    /// Only meaningful if `hit` is true
    pub distance: f32,

    /// Index of the struck triangle in the scene slice
    ///
    /// Only meaningful if `hit` is true
    pub triangle_index: usize,

    /// Unit normal of the struck triangle
    ///
    /// Only meaningful if `hit` is true
    pub normal: Vec3,
}

impl RayHit {
    /// Creates a miss result (no hit)
    pub fn miss() -> Self {
        Self {
            hit: false,
            distance: 0.0,
            triangle_index: 0,
            normal: Vec3::ZERO,
        }
    }

    /// Creates a hit result
    pub fn new(distance: f32, triangle_index: usize, normal: Vec3) -> Self {
        Self {
            hit: true,
            distance,
            triangle_index,
            normal,
        }
    }
}

impl Default for RayHit {
    fn default() -> Self {
        Self::miss()
    }
}

/// Closest-hit ray queries against scene geometry.
///
/// Implementations must be `Send + Sync`: one tracer may serve concurrent
/// simulations, so it must not rely on interior mutation.
pub trait RayTracer: Send + Sync {
    /// Returns the closest hit within `[ray.t_min, ray.t_max]`, skipping the
    /// triangle indices listed in `ignore`.
    fn cast_ray(&self, ray: &Ray, ignore: &[usize]) -> RayHit;

    /// True when some triangle not in `ignore` blocks the segment `from -> to`,
    /// trimmed by [`SEGMENT_EPSILON`] at both ends.
    ///
    /// Used between bounce points, where surfaces meeting at an endpoint must
    /// not count as blockers.
    fn is_occluded(&self, from: Vec3, to: Vec3, ignore: &[usize]) -> bool {
        match Ray::segment(from, to) {
            Some(ray) => self.cast_ray(&ray, ignore).hit,
            None => false,
        }
    }

    /// True when any triangle is hit strictly between `from` and `to`.
    fn is_segment_blocked(&self, from: Vec3, to: Vec3) -> bool {
        match Ray::open_segment(from, to) {
            Some(ray) => self.cast_ray(&ray, &[]).hit,
            None => false,
        }
    }
}

/// Brute-force tracer that tests every triangle on every query.
#[derive(Debug, Clone, Copy)]
pub struct LinearRayTracer<'a> {
    triangles: &'a [Triangle],
}

impl<'a> LinearRayTracer<'a> {
    pub fn new(triangles: &'a [Triangle]) -> Self {
        Self { triangles }
    }

    pub fn triangles(&self) -> &'a [Triangle] {
        self.triangles
    }
}

impl RayTracer for LinearRayTracer<'_> {
    fn cast_ray(&self, ray: &Ray, ignore: &[usize]) -> RayHit {
        let mut closest = RayHit::miss();

        for (index, triangle) in self.triangles.iter().enumerate() {
            if ignore.contains(&index) {
                continue;
            }

            // Degenerate triangles never intersect (zero determinant), no special case needed
            let Some(t) = triangle.intersect(ray.origin, ray.direction).distance() else {
                continue;
            };

            if t < ray.t_min || t > ray.t_max {
                continue;
            }

            if !closest.hit || t < closest.distance {
                closest = RayHit::new(t, index, triangle.normal());
            }
        }

        closest
    }
}
