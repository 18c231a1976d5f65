use crate::math::{Vec3, normalize_or_zero};

/// Pickup pattern of a microphone.
///
/// Patterns weight each arriving path by its direction of arrival relative to
/// the microphone's facing direction. This is a broadband gain, not HRTF.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Directivity {
    #[default]
    Omnidirectional,
    /// `0.5 * (1 + cos θ)`
    Cardioid { facing: Vec3 },
    /// `|cos θ|`
    Figure8 { facing: Vec3 },
}

impl Directivity {
    pub fn cardioid(facing: Vec3) -> Self {
        Self::Cardioid {
            facing: normalize_or_zero(facing),
        }
    }

    pub fn figure8(facing: Vec3) -> Self {
        Self::Figure8 {
            facing: normalize_or_zero(facing),
        }
    }

    /// Gain for sound arriving from `arrival` (unit vector pointing from the
    /// microphone toward where the sound comes from).
    pub fn gain(&self, arrival: Vec3) -> f32 {
        match self {
            Self::Omnidirectional => 1.0,
            Self::Cardioid { facing } => 0.5 * (1.0 + facing.dot(arrival)),
            Self::Figure8 { facing } => facing.dot(arrival).abs(),
        }
    }

    pub fn is_omnidirectional(&self) -> bool {
        matches!(self, Self::Omnidirectional)
    }
}

/// A receiver placed in the world.
#[derive(Debug, Clone, PartialEq)]
pub struct MicrophoneConfig {
    pub position: Vec3,
    pub directivity: Directivity,
    pub name: String,
}

impl MicrophoneConfig {
    /// An omnidirectional microphone at `position`
    pub fn omni(position: Vec3) -> Self {
        Self {
            position,
            directivity: Directivity::Omnidirectional,
            name: "Mic".to_string(),
        }
    }

    pub fn with_directivity(mut self, directivity: Directivity) -> Self {
        self.directivity = directivity;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}
