//! Acoustic material properties and the material catalog.
//!
//! Materials describe how surfaces interact with sound across six octave bands
//! (125 Hz, 250 Hz, 500 Hz, 1 kHz, 2 kHz, 4 kHz).

use std::collections::HashMap;

/// Number of octave bands carried by every per-band quantity.
pub const NUM_BANDS: usize = 6;

/// Center frequencies of the octave bands, in Hz.
pub const OCTAVE_BANDS_HZ: [f32; NUM_BANDS] = [125.0, 250.0, 500.0, 1000.0, 2000.0, 4000.0];

/// One unitless value per octave band.
pub type BandGains = [f32; NUM_BANDS];

/// Acoustic properties of a surface material.
///
/// Reflection and absorption are independent per-band quantities: reflection is
/// the specular reflectance applied to a bounce, absorption is the energy lost
/// into the surface. They are not required to sum to one.
///
/// Materials compare equal when their names match.
///
/// # Example
///
/// ```
/// use acoustrace_core::scene::MaterialProperties;
///
/// let panel = MaterialProperties {
///     name: "Acoustic Panel".to_string(),
///     absorption: [0.30, 0.60, 0.85, 0.90, 0.90, 0.85],
///     reflection: [0.70, 0.40, 0.15, 0.10, 0.10, 0.15],
///     diffusion: 0.7,
///     density: 80.0,
///     speed_of_sound: 150.0,
///     impedance: 1.2e4,
/// };
/// assert!(panel.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct MaterialProperties {
    /// Display name, also the material's identity
    pub name: String,

    /// Fraction of energy absorbed per octave band (0.0 - 1.0)
    pub absorption: BandGains,

    /// Specular reflectance per octave band (0.0 - 1.0)
    pub reflection: BandGains,

    /// 0.0 = purely specular, 1.0 = purely diffuse
    pub diffusion: f32,

    /// kg/m³
    pub density: f32,

    /// Speed of sound inside the material, m/s
    pub speed_of_sound: f32,

    /// Characteristic acoustic impedance, Rayl
    pub impedance: f32,
}

impl PartialEq for MaterialProperties {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for MaterialProperties {}

impl MaterialProperties {
    fn preset(
        name: &str,
        absorption: BandGains,
        reflection: BandGains,
        diffusion: f32,
        density: f32,
        speed_of_sound: f32,
        impedance: f32,
    ) -> Self {
        Self {
            name: name.to_string(),
            absorption,
            reflection,
            diffusion,
            density,
            speed_of_sound,
            impedance,
        }
    }

    pub fn oak() -> Self {
        Self::preset(
            "Oak Wood",
            [0.15, 0.15, 0.10, 0.10, 0.10, 0.10],
            [0.85, 0.85, 0.90, 0.90, 0.90, 0.90],
            0.3,
            750.0,
            3850.0,
            2.89e6,
        )
    }

    pub fn pine() -> Self {
        Self::preset(
            "Pine Wood",
            [0.10, 0.10, 0.08, 0.08, 0.08, 0.08],
            [0.90, 0.90, 0.92, 0.92, 0.92, 0.92],
            0.25,
            550.0,
            3320.0,
            1.83e6,
        )
    }

    pub fn maple() -> Self {
        Self::preset(
            "Maple Wood",
            [0.12, 0.12, 0.09, 0.09, 0.09, 0.09],
            [0.88, 0.88, 0.91, 0.91, 0.91, 0.91],
            0.28,
            705.0,
            4110.0,
            2.90e6,
        )
    }

    pub fn steel() -> Self {
        Self::preset(
            "Steel",
            [0.05; NUM_BANDS],
            [0.95; NUM_BANDS],
            0.1,
            7850.0,
            5960.0,
            4.68e7,
        )
    }

    pub fn aluminum() -> Self {
        Self::preset(
            "Aluminum",
            [0.05; NUM_BANDS],
            [0.95; NUM_BANDS],
            0.08,
            2700.0,
            6420.0,
            1.73e7,
        )
    }

    pub fn copper() -> Self {
        Self::preset(
            "Copper",
            [0.04; NUM_BANDS],
            [0.96; NUM_BANDS],
            0.12,
            8960.0,
            4760.0,
            4.26e7,
        )
    }

    /// Hard, highly reflective surface. Used as the catalog fallback.
    pub fn concrete() -> Self {
        Self::preset(
            "Concrete",
            [0.01, 0.01, 0.02, 0.02, 0.03, 0.04],
            [0.99, 0.99, 0.98, 0.98, 0.97, 0.96],
            0.15,
            2400.0,
            3200.0,
            7.68e6,
        )
    }

    pub fn brick() -> Self {
        Self::preset(
            "Brick",
            [0.03, 0.03, 0.03, 0.04, 0.05, 0.07],
            [0.97, 0.97, 0.97, 0.96, 0.95, 0.93],
            0.4,
            1920.0,
            3650.0,
            7.01e6,
        )
    }

    pub fn plaster() -> Self {
        Self::preset(
            "Plaster",
            [0.02, 0.02, 0.03, 0.04, 0.05, 0.05],
            [0.98, 0.98, 0.97, 0.96, 0.95, 0.95],
            0.2,
            1200.0,
            2000.0,
            2.40e6,
        )
    }

    pub fn glass() -> Self {
        Self::preset(
            "Glass",
            [0.18, 0.06, 0.04, 0.03, 0.02, 0.02],
            [0.82, 0.94, 0.96, 0.97, 0.98, 0.98],
            0.05,
            2500.0,
            5640.0,
            1.41e7,
        )
    }

    pub fn carpet() -> Self {
        Self::preset(
            "Carpet",
            [0.08, 0.24, 0.57, 0.69, 0.71, 0.73],
            [0.92, 0.76, 0.43, 0.31, 0.29, 0.27],
            0.8,
            200.0,
            100.0,
            2.00e4,
        )
    }

    pub fn curtain() -> Self {
        Self::preset(
            "Curtain (Heavy)",
            [0.14, 0.35, 0.55, 0.72, 0.70, 0.65],
            [0.86, 0.65, 0.45, 0.28, 0.30, 0.35],
            0.9,
            300.0,
            80.0,
            2.40e4,
        )
    }

    /// Checks that every per-band coefficient and the diffusion coefficient lie in [0.0, 1.0].
    pub fn validate(&self) -> Result<(), &'static str> {
        if !self.absorption.iter().all(|a| (0.0..=1.0).contains(a)) {
            return Err("Absorption values must be between 0.0 and 1.0");
        }

        if !self.reflection.iter().all(|r| (0.0..=1.0).contains(r)) {
            return Err("Reflection values must be between 0.0 and 1.0");
        }

        if !(0.0..=1.0).contains(&self.diffusion) {
            return Err("Diffusion value must be between 0.0 and 1.0");
        }

        Ok(())
    }

    /// Mean specular reflectance across all bands.
    pub fn mean_reflection(&self) -> f32 {
        self.reflection.iter().sum::<f32>() / NUM_BANDS as f32
    }
}

impl Default for MaterialProperties {
    fn default() -> Self {
        Self::concrete()
    }
}

/// Read-only mapping from material key to [`MaterialProperties`].
///
/// Keys are matched case-insensitively. Any key that is not present resolves
/// to the catalog's default material, so lookups never fail. Build the catalog
/// once and share it by reference; it is never mutated after construction.
///
/// # Example
///
/// ```
/// use acoustrace_core::scene::{MaterialCatalog, MaterialProperties};
///
/// let catalog = MaterialCatalog::with_presets();
/// assert_eq!(catalog.lookup("Carpet").name, "Carpet");
///
/// // Unknown names fall back to the default material
/// assert_eq!(catalog.lookup("unobtainium"), catalog.default_material());
///
/// let custom = MaterialCatalog::new("stone", MaterialProperties::concrete())
///     .with_material("rug", MaterialProperties::carpet());
/// assert_eq!(custom.len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct MaterialCatalog {
    materials: HashMap<String, MaterialProperties>,
    default_key: String,
}

impl MaterialCatalog {
    /// Creates a catalog holding only its default material under `default_key`.
    pub fn new(default_key: &str, default: MaterialProperties) -> Self {
        let default_key = default_key.to_lowercase();
        let mut materials = HashMap::new();
        Self::warn_if_invalid(&default_key, &default);
        materials.insert(default_key.clone(), default);
        Self {
            materials,
            default_key,
        }
    }

    /// Creates a catalog pre-loaded with every preset, defaulting to concrete.
    ///
    /// Keys: oak, pine, maple, steel, aluminum, copper, concrete, brick,
    /// plaster, glass, carpet, curtain.
    pub fn with_presets() -> Self {
        Self::new("concrete", MaterialProperties::concrete())
            .with_material("oak", MaterialProperties::oak())
            .with_material("pine", MaterialProperties::pine())
            .with_material("maple", MaterialProperties::maple())
            .with_material("steel", MaterialProperties::steel())
            .with_material("aluminum", MaterialProperties::aluminum())
            .with_material("copper", MaterialProperties::copper())
            .with_material("brick", MaterialProperties::brick())
            .with_material("plaster", MaterialProperties::plaster())
            .with_material("glass", MaterialProperties::glass())
            .with_material("carpet", MaterialProperties::carpet())
            .with_material("curtain", MaterialProperties::curtain())
    }

    /// Adds or replaces a material. Replacing the default key replaces the fallback.
    pub fn with_material(mut self, key: &str, material: MaterialProperties) -> Self {
        let key = key.to_lowercase();
        Self::warn_if_invalid(&key, &material);
        self.materials.insert(key, material);
        self
    }

    fn warn_if_invalid(key: &str, material: &MaterialProperties) {
        if let Err(reason) = material.validate() {
            log::warn!("Material '{}' has out-of-range coefficients: {}", key, reason);
        }
    }

    /// Resolves a material key. Never fails: unknown keys yield the default material.
    pub fn lookup(&self, key: &str) -> &MaterialProperties {
        if let Some(material) = self.materials.get(key) {
            return material;
        }

        match self.materials.get(&key.to_lowercase()) {
            Some(material) => material,
            None => {
                log::debug!(
                    "Unknown material '{}', falling back to '{}'",
                    key,
                    self.default_key
                );
                self.default_material()
            }
        }
    }

    /// The fallback material for unknown keys.
    pub fn default_material(&self) -> &MaterialProperties {
        // The default entry is inserted on construction and can only be replaced, never removed.
        &self.materials[&self.default_key]
    }

    pub fn default_key(&self) -> &str {
        &self.default_key
    }

    pub fn contains(&self, key: &str) -> bool {
        self.materials.contains_key(&key.to_lowercase())
    }

    /// Returns every key in the catalog, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.materials.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MaterialProperties)> {
        self.materials.iter().map(|(k, m)| (k.as_str(), m))
    }
}

impl Default for MaterialCatalog {
    fn default() -> Self {
        Self::with_presets()
    }
}
