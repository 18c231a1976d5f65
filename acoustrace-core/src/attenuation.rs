//! Per-band gain of a propagation path.
//!
//! Gain for band `i` is the product of three independent factors:
//!
//! - distance law: `1 / max(length, 0.1)`, identical across bands
//! - air absorption: `exp(-k * length * f[i] / 1000)`
//! - material reflectance: product of each bounce's reflection coefficient for band `i`
//!
//! No clamping is applied. A reflectance above one is an authoring error in the
//! material, not something the model corrects.

use crate::config::SimulationConfig;
use crate::scene::{BandGains, MaterialProperties, NUM_BANDS, OCTAVE_BANDS_HZ};

/// Floor on the distance used by the inverse-distance law, in meters.
pub const MIN_DISTANCE: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttenuationModel {
    /// `k` in the air absorption exponent
    pub air_absorption_coefficient: f32,
}

impl Default for AttenuationModel {
    fn default() -> Self {
        Self::from_config(&SimulationConfig::default())
    }
}

impl AttenuationModel {
    pub fn new(air_absorption_coefficient: f32) -> Self {
        Self {
            air_absorption_coefficient,
        }
    }

    pub fn from_config(config: &SimulationConfig) -> Self {
        Self::new(config.air_absorption_coefficient)
    }

    /// Inverse-distance spreading loss.
    pub fn distance_factor(&self, path_length: f32) -> f32 {
        1.0 / path_length.max(MIN_DISTANCE)
    }

    /// Frequency-dependent absorption by the medium over `path_length` meters.
    pub fn air_absorption(&self, path_length: f32) -> BandGains {
        OCTAVE_BANDS_HZ.map(|freq| {
            (-self.air_absorption_coefficient * path_length * freq / 1000.0).exp()
        })
    }

    /// Product of bounce reflectances per band; all ones for the direct path.
    pub fn material_reflectance<'m>(
        &self,
        bounce_materials: impl IntoIterator<Item = &'m MaterialProperties>,
    ) -> BandGains {
        bounce_materials
            .into_iter()
            .fold([1.0; NUM_BANDS], |mut acc, material| {
                for (gain, reflection) in acc.iter_mut().zip(material.reflection) {
                    *gain *= reflection;
                }
                acc
            })
    }

    /// Combined per-band gain of a path of total length `path_length` that
    /// bounced off `bounce_materials` in order.
    pub fn attenuate<'m>(
        &self,
        path_length: f32,
        bounce_materials: impl IntoIterator<Item = &'m MaterialProperties>,
    ) -> BandGains {
        let distance = self.distance_factor(path_length);
        let air = self.air_absorption(path_length);
        let reflectance = self.material_reflectance(bounce_materials);

        std::array::from_fn(|band| distance * air[band] * reflectance[band])
    }
}
