//! Propagation media: the fluid or solid sound travels through between surfaces.

/// Bulk properties of a propagation medium.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Medium {
    pub name: &'static str,
    /// m/s
    pub speed_of_sound: f32,
    /// kg/m³
    pub density: f32,
    /// Rayl
    pub impedance: f32,
    /// Air-absorption style coefficient `k` in `exp(-k * distance * f / 1000)`
    pub attenuation_coefficient: f32,
}

impl Medium {
    /// Air at 20 °C
    pub const AIR: Self = Self {
        name: "Air (20°C)",
        speed_of_sound: 343.0,
        density: 1.204,
        impedance: 413.0,
        attenuation_coefficient: 0.0012,
    };

    /// Water at 20 °C
    pub const WATER: Self = Self {
        name: "Water (20°C)",
        speed_of_sound: 1482.0,
        density: 998.0,
        impedance: 1.48e6,
        attenuation_coefficient: 0.0003,
    };

    pub const GLASS: Self = Self {
        name: "Glass",
        speed_of_sound: 5640.0,
        density: 2500.0,
        impedance: 1.41e7,
        attenuation_coefficient: 0.0001,
    };

    /// Soil
    pub const EARTH: Self = Self {
        name: "Earth (soil)",
        speed_of_sound: 1800.0,
        density: 1600.0,
        impedance: 2.88e6,
        attenuation_coefficient: 0.05,
    };

    /// Resolves a medium by key (`air`, `water`, `glass`, `earth`), falling back to air.
    pub fn by_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "air" => Self::AIR,
            "water" => Self::WATER,
            "glass" => Self::GLASS,
            "earth" => Self::EARTH,
            other => {
                log::debug!("Unknown medium '{}', falling back to air", other);
                Self::AIR
            }
        }
    }
}

impl Default for Medium {
    fn default() -> Self {
        Self::AIR
    }
}
