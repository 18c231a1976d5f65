use crate::math::Vec3;

/// A sound emitter placed in the world.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceConfig {
    /// 3D position of the source
    pub position: Vec3,
    /// Linear gain applied to the source signal (0.0 = silent, 1.0 = unchanged)
    pub volume: f32,
    pub name: String,
}

impl SourceConfig {
    /// A full-volume source at `position`
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            volume: 1.0,
            name: "Source".to_string(),
        }
    }

    pub fn with_volume(mut self, volume: f32) -> Self {
        self.volume = volume;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self::at(Vec3::ZERO)
    }
}
