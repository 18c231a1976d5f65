//! Specular path enumeration between a source and a receiver.
//!
//! Paths are found with the image-source method. Each candidate sequence of
//! reflecting triangles carries a beam: the apex is the current image source
//! and the aperture is the convex patch of the last triangle that can actually
//! be lit through every previous reflector. A triangle is only explored as the
//! next reflector if it intersects the beam, which keeps the search far below
//! the `triangles^order` sequences of a blind enumeration while never
//! discarding a path that satisfies the acceptance rule below.
//!
//! A candidate path of order `k` is accepted when:
//!
//! - unfolding from the receiver back through the images lands inside every
//!   reflecting triangle, in order;
//! - no other triangle blocks any segment between consecutive path points;
//! - the total length does not exceed the configured cutoff.

use crate::attenuation::AttenuationModel;
use crate::config::SimulationConfig;
use crate::error::{AcoustraceError, Result};
use crate::math::{Vec3, normalize_or_zero, reflect_point_across_plane};
use crate::path::AcousticPath;
use crate::scene::{LinearRayTracer, MaterialCatalog, RayTracer, Triangle};

/// Tolerance in meters for plane-side tests during beam clipping.
const CLIP_EPSILON: f32 = 1e-6;

/// Upper bound on the per-search buffers reserved up front.
const PREALLOCATED_ORDER: usize = 64;

/// Plane of a non-degenerate scene triangle.
#[derive(Debug, Clone, Copy)]
struct Reflector {
    index: usize,
    origin: Vec3,
    normal: Vec3,
}

impl Reflector {
    fn signed_distance(&self, point: Vec3) -> f32 {
        (point - self.origin).dot(self.normal)
    }
}

/// Region of space reachable by rays leaving the last reflector of a sequence.
struct Beam {
    /// Image source all rays in the beam appear to come from
    apex: Vec3,
    /// Lit patch of the last reflector, convex, on that reflector's plane
    aperture: Vec<Vec3>,
    /// The last reflector; `None` for the source itself
    reflector: Option<Reflector>,
}

/// Mutable search state shared down one branch of the enumeration.
struct Search<'s> {
    source: Vec3,
    receiver: Vec3,
    reflectors: &'s [Reflector],
    sequence: Vec<usize>,
    images: Vec<Vec3>,
    paths: Vec<AcousticPath>,
    beams_explored: usize,
}

/// Enumerates direct and specular reflection paths through a borrowed scene.
///
/// The tracer borrows the geometry and material catalog; neither may be
/// dropped while the tracer is alive. Both are only read, so one scene can
/// back any number of tracers on any number of threads.
pub struct PathTracer<'a, R: RayTracer = LinearRayTracer<'a>> {
    geometry: &'a [Triangle],
    catalog: &'a MaterialCatalog,
    ray_tracer: R,
    attenuation: AttenuationModel,
    max_reflection_order: usize,
    max_path_length: f32,
}

impl<'a> PathTracer<'a> {
    /// Creates a tracer that answers occlusion queries by scanning every triangle.
    pub fn new(
        geometry: &'a [Triangle],
        catalog: &'a MaterialCatalog,
        config: &SimulationConfig,
    ) -> Self {
        Self::with_ray_tracer(geometry, catalog, config, LinearRayTracer::new(geometry))
    }
}

impl<'a, R: RayTracer> PathTracer<'a, R> {
    /// Creates a tracer that delegates occlusion queries to `ray_tracer`.
    ///
    /// `ray_tracer` must index triangles the same way as `geometry`.
    pub fn with_ray_tracer(
        geometry: &'a [Triangle],
        catalog: &'a MaterialCatalog,
        config: &SimulationConfig,
        ray_tracer: R,
    ) -> Self {
        Self {
            geometry,
            catalog,
            ray_tracer,
            attenuation: AttenuationModel::from_config(config),
            max_reflection_order: config.max_reflection_order,
            max_path_length: config.max_path_length,
        }
    }

    pub fn geometry(&self) -> &'a [Triangle] {
        self.geometry
    }

    pub fn max_reflection_order(&self) -> usize {
        self.max_reflection_order
    }

    pub fn set_max_reflection_order(&mut self, order: usize) {
        self.max_reflection_order = order;
    }

    pub fn max_path_length(&self) -> f32 {
        self.max_path_length
    }

    /// Changes the path length cutoff, rejecting non-positive or non-finite values.
    pub fn set_max_path_length(&mut self, meters: f32) -> Result<()> {
        if !Self::is_valid_cutoff(meters) {
            return Err(AcoustraceError::config(format!(
                "max path length must be positive and finite, got {}",
                meters
            )));
        }
        self.max_path_length = meters;
        Ok(())
    }

    fn is_valid_cutoff(meters: f32) -> bool {
        meters.is_finite() && meters > 0.0
    }

    /// Returns every accepted path from `source` to `receiver`.
    ///
    /// An empty result is valid: the receiver may be out of range or fully
    /// shielded. Paths come out grouped by search branch, not sorted.
    ///
    /// The path length cutoff is what bounds the search, so a tracer built
    /// from an unvalidated config with a non-positive, infinite or NaN cutoff
    /// finds no paths.
    pub fn trace(&self, source: Vec3, receiver: Vec3) -> Vec<AcousticPath> {
        if !Self::is_valid_cutoff(self.max_path_length) {
            log::warn!(
                "Refusing to trace with max path length {}",
                self.max_path_length
            );
            return Vec::new();
        }

        let reflectors = self.reflectors();
        let reserved = self.max_reflection_order.min(PREALLOCATED_ORDER);

        let mut search = Search {
            source,
            receiver,
            reflectors: &reflectors,
            sequence: Vec::with_capacity(reserved),
            images: Vec::with_capacity(reserved),
            paths: Vec::new(),
            beams_explored: 0,
        };

        if let Some(direct) = self.direct_path(source, receiver) {
            search.paths.push(direct);
        }

        if self.max_reflection_order > 0 {
            let root = Beam {
                apex: source,
                aperture: Vec::new(),
                reflector: None,
            };
            self.extend(&mut search, &root);
        }

        if log::log_enabled!(log::Level::Debug) {
            let highest = search.paths.iter().map(AcousticPath::order).max().unwrap_or(0);
            let mut per_order = vec![0usize; highest + 1];
            for path in &search.paths {
                per_order[path.order()] += 1;
            }
            log::debug!(
                "Traced {} paths (per order: {:?}) exploring {} beams",
                search.paths.len(),
                per_order,
                search.beams_explored
            );
        }

        search.paths
    }

    /// Planes of every usable triangle. Degenerate triangles are skipped.
    fn reflectors(&self) -> Vec<Reflector> {
        let reflectors: Vec<Reflector> = self
            .geometry
            .iter()
            .enumerate()
            .filter_map(|(index, triangle)| {
                let normal = triangle.normal();
                (normal != Vec3::ZERO).then_some(Reflector {
                    index,
                    origin: triangle.v0,
                    normal,
                })
            })
            .collect();

        let skipped = self.geometry.len() - reflectors.len();
        if skipped > 0 {
            log::debug!("Skipping {} degenerate triangles", skipped);
        }

        reflectors
    }

    fn direct_path(&self, source: Vec3, receiver: Vec3) -> Option<AcousticPath> {
        let distance = source.distance(receiver);
        if distance > self.max_path_length {
            return None;
        }

        if self.ray_tracer.is_segment_blocked(source, receiver) {
            log::debug!("Direct path occluded");
            return None;
        }

        let attenuation = self.attenuation.attenuate(distance, []);
        Some(AcousticPath::direct(source, receiver, attenuation))
    }

    fn extend(&self, search: &mut Search<'_>, beam: &Beam) {
        let reflectors = search.reflectors;
        for reflector in reflectors {
            if beam.reflector.is_some_and(|r| r.index == reflector.index) {
                continue;
            }

            let apex_distance = reflector.signed_distance(beam.apex);
            if apex_distance.abs() < CLIP_EPSILON {
                continue;
            }

            let image = reflect_point_across_plane(beam.apex, reflector.origin, reflector.normal);

            // Any completion is at least as long as the unfolded distance to the receiver.
            if image.distance(search.receiver) > self.max_path_length {
                continue;
            }

            let Some(aperture) = self.clip_to_beam(beam, &self.geometry[reflector.index]) else {
                continue;
            };

            search.beams_explored += 1;
            search.sequence.push(reflector.index);
            search.images.push(image);

            if let Some(path) = self.complete_path(search) {
                search.paths.push(path);
            }

            if search.sequence.len() < self.max_reflection_order {
                let child = Beam {
                    apex: image,
                    aperture,
                    reflector: Some(*reflector),
                };
                self.extend(search, &child);
            }

            search.sequence.pop();
            search.images.pop();
        }
    }

    /// Part of `triangle` that rays in `beam` can reach, or `None` if empty.
    fn clip_to_beam(&self, beam: &Beam, triangle: &Triangle) -> Option<Vec<Vec3>> {
        let mut polygon = vec![triangle.v0, triangle.v1, triangle.v2];

        let Some(reflector) = beam.reflector else {
            return Some(polygon);
        };

        // Reflected rays leave on the side of the last reflector opposite the image.
        let front = if reflector.signed_distance(beam.apex) < 0.0 {
            reflector.normal
        } else {
            -reflector.normal
        };
        polygon = clip_polygon(&polygon, reflector.origin, front, CLIP_EPSILON);
        if polygon.len() < 3 {
            return None;
        }

        let aperture = &beam.aperture;
        let centroid = aperture.iter().copied().sum::<Vec3>() / aperture.len() as f32;
        for (i, &a) in aperture.iter().enumerate() {
            let b = aperture[(i + 1) % aperture.len()];
            let mut side = normalize_or_zero((a - beam.apex).cross(b - beam.apex));
            if side == Vec3::ZERO {
                continue;
            }
            if side.dot(centroid - beam.apex) < 0.0 {
                side = -side;
            }

            polygon = clip_polygon(&polygon, beam.apex, side, -CLIP_EPSILON);
            if polygon.len() < 3 {
                return None;
            }
        }

        Some(polygon)
    }

    /// Recovers the bounce points for the current sequence and applies the acceptance rule.
    fn complete_path(&self, search: &Search<'_>) -> Option<AcousticPath> {
        let order = search.sequence.len();
        let mut bounce_points = vec![Vec3::ZERO; order];
        let mut target = search.receiver;

        for k in (0..order).rev() {
            let image = search.images[k];
            let direction = target - image;
            let hit = self.geometry[search.sequence[k]].intersect(image, direction);
            if !hit.hit || hit.t >= 1.0 {
                return None;
            }
            target = image + direction * hit.t;
            bounce_points[k] = target;
        }

        let length = AcousticPath::polyline_length(search.source, &bounce_points, search.receiver);
        if length > self.max_path_length {
            return None;
        }

        // Segment k runs from point k to point k + 1 over source, bounces..., receiver.
        let mut from = search.source;
        for k in 0..=order {
            let to = bounce_points.get(k).copied().unwrap_or(search.receiver);
            let mut ignore = [usize::MAX; 2];
            if k > 0 {
                ignore[0] = search.sequence[k - 1];
            }
            if k < order {
                ignore[1] = search.sequence[k];
            }
            if self.ray_tracer.is_occluded(from, to, &ignore) {
                return None;
            }
            from = to;
        }

        let attenuation = self.attenuation.attenuate(
            length,
            search
                .sequence
                .iter()
                .map(|&index| self.catalog.lookup(&self.geometry[index].material)),
        );

        Some(AcousticPath::reflected(
            search.source,
            search.receiver,
            bounce_points,
            search.sequence.clone(),
            attenuation,
        ))
    }
}

/// Sutherland–Hodgman clip of a convex polygon against one half-space.
///
/// Keeps points with `normal · (p - origin) >= threshold`.
fn clip_polygon(polygon: &[Vec3], origin: Vec3, normal: Vec3, threshold: f32) -> Vec<Vec3> {
    let mut clipped = Vec::with_capacity(polygon.len() + 1);

    for (i, &a) in polygon.iter().enumerate() {
        let b = polygon[(i + 1) % polygon.len()];
        let da = normal.dot(a - origin) - threshold;
        let db = normal.dot(b - origin) - threshold;

        if da >= 0.0 {
            clipped.push(a);
        }
        if (da >= 0.0) != (db >= 0.0) {
            let t = da / (da - db);
            clipped.push(a + (b - a) * t);
        }
    }

    clipped
}
