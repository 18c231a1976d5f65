//! Discrete source-to-receiver propagation paths.

use crate::math::{Vec3, normalize_or_zero};
use crate::scene::{BandGains, NUM_BANDS};

/// One specular propagation path from source to receiver.
///
/// Built by the [`PathTracer`](crate::PathTracer) and immutable afterwards.
/// The direct path has order 0 and no bounces.
#[derive(Debug, Clone, PartialEq)]
pub struct AcousticPath {
    source: Vec3,
    receiver: Vec3,
    length: f32,
    bounce_points: Vec<Vec3>,
    triangles: Vec<usize>,
    attenuation: BandGains,
}

impl AcousticPath {
    pub fn direct(source: Vec3, receiver: Vec3, attenuation: BandGains) -> Self {
        Self {
            source,
            receiver,
            length: source.distance(receiver),
            bounce_points: Vec::new(),
            triangles: Vec::new(),
            attenuation,
        }
    }

    /// A reflected path. `bounce_points[i]` lies on scene triangle `triangles[i]`.
    pub fn reflected(
        source: Vec3,
        receiver: Vec3,
        bounce_points: Vec<Vec3>,
        triangles: Vec<usize>,
        attenuation: BandGains,
    ) -> Self {
        debug_assert_eq!(bounce_points.len(), triangles.len());
        let length = Self::polyline_length(source, &bounce_points, receiver);
        Self {
            source,
            receiver,
            length,
            bounce_points,
            triangles,
            attenuation,
        }
    }

    /// Sum of segment lengths along `source -> points... -> receiver`.
    pub fn polyline_length(source: Vec3, points: &[Vec3], receiver: Vec3) -> f32 {
        let mut previous = source;
        let mut total = 0.0;
        for &point in points.iter().chain(std::iter::once(&receiver)) {
            total += previous.distance(point);
            previous = point;
        }
        total
    }

    pub fn source(&self) -> Vec3 {
        self.source
    }

    pub fn receiver(&self) -> Vec3 {
        self.receiver
    }

    /// Total path length in meters.
    pub fn length(&self) -> f32 {
        self.length
    }

    /// Reflection order (0 = direct).
    pub fn order(&self) -> usize {
        self.bounce_points.len()
    }

    pub fn is_direct(&self) -> bool {
        self.bounce_points.is_empty()
    }

    pub fn bounce_points(&self) -> &[Vec3] {
        &self.bounce_points
    }

    /// Indices into the scene geometry of the struck triangles, in bounce order.
    pub fn triangles(&self) -> &[usize] {
        &self.triangles
    }

    pub fn attenuation(&self) -> &BandGains {
        &self.attenuation
    }

    /// Arithmetic mean of the six band gains.
    pub fn mean_gain(&self) -> f32 {
        self.attenuation.iter().sum::<f32>() / NUM_BANDS as f32
    }

    /// Propagation delay in seconds.
    pub fn delay(&self, speed_of_sound: f32) -> f32 {
        self.length / speed_of_sound
    }

    /// Unit vector from the receiver toward the point the sound last left.
    pub fn arrival_direction(&self) -> Vec3 {
        let last = self.bounce_points.last().copied().unwrap_or(self.source);
        normalize_or_zero(last - self.receiver)
    }

    /// Copy of this path with every band gain multiplied by `gain`.
    pub fn scaled(&self, gain: f32) -> Self {
        Self {
            attenuation: self.attenuation.map(|g| g * gain),
            ..self.clone()
        }
    }
}
