use crate::error::{AcoustraceError, Result};
use crate::scene::Medium;

/// How per-path band gains are turned into impulse-response samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SynthesisMode {
    /// One broadband pulse per path, scaled by the mean of its six band gains
    #[default]
    MeanGain,
    /// One pulse train per octave band, band-filtered and summed
    BandFiltered,
}

/// Knobs for a simulation run.
///
/// Read at call time by [`Simulator`](crate::Simulator); changing a field never
/// requires rebuilding anything else.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    /// Highest specular reflection order enumerated (0 = direct path only)
    pub max_reflection_order: usize,
    /// Paths longer than this (meters) are discarded and pruned during search
    pub max_path_length: f32,
    /// m/s
    pub speed_of_sound: f32,
    /// Hz
    pub sample_rate: u32,
    /// Impulse response length in seconds
    pub impulse_response_duration: f32,
    /// Peak absolute sample value after normalization, in (0, 1]
    pub normalization_peak: f32,
    /// Air absorption coefficient `k` in `exp(-k * distance * f / 1000)`
    pub air_absorption_coefficient: f32,
    /// Length of the decaying pulse injected per path, in samples
    pub pulse_length: usize,
    pub synthesis_mode: SynthesisMode,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            max_reflection_order: 10,
            max_path_length: 100.0,
            speed_of_sound: Medium::AIR.speed_of_sound,
            sample_rate: 44_100,
            impulse_response_duration: 2.0,
            normalization_peak: 0.9,
            air_absorption_coefficient: Medium::AIR.attenuation_coefficient,
            pulse_length: 64,
            synthesis_mode: SynthesisMode::MeanGain,
        }
    }
}

impl SimulationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_reflection_order(mut self, order: usize) -> Self {
        self.max_reflection_order = order;
        self
    }

    pub fn max_path_length(mut self, meters: f32) -> Self {
        self.max_path_length = meters;
        self
    }

    pub fn speed_of_sound(mut self, meters_per_second: f32) -> Self {
        self.speed_of_sound = meters_per_second;
        self
    }

    pub fn sample_rate(mut self, rate: u32) -> Self {
        self.sample_rate = rate;
        self
    }

    pub fn impulse_response_duration(mut self, seconds: f32) -> Self {
        self.impulse_response_duration = seconds;
        self
    }

    pub fn normalization_peak(mut self, peak: f32) -> Self {
        self.normalization_peak = peak;
        self
    }

    pub fn air_absorption_coefficient(mut self, k: f32) -> Self {
        self.air_absorption_coefficient = k;
        self
    }

    pub fn pulse_length(mut self, samples: usize) -> Self {
        self.pulse_length = samples;
        self
    }

    pub fn synthesis_mode(mut self, mode: SynthesisMode) -> Self {
        self.synthesis_mode = mode;
        self
    }

    /// Takes speed of sound and absorption coefficient from a propagation medium.
    pub fn with_medium(mut self, medium: Medium) -> Self {
        self.speed_of_sound = medium.speed_of_sound;
        self.air_absorption_coefficient = medium.attenuation_coefficient;
        self
    }

    /// Number of samples in the synthesized impulse response.
    pub fn impulse_response_len(&self) -> usize {
        (self.impulse_response_duration * self.sample_rate as f32).round() as usize
    }

    /// Rejects contract violations before any work is done.
    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(AcoustraceError::config("sample rate must be positive"));
        }

        if !(self.max_path_length.is_finite() && self.max_path_length > 0.0) {
            return Err(AcoustraceError::config(format!(
                "max path length must be positive and finite, got {}",
                self.max_path_length
            )));
        }

        if !(self.speed_of_sound.is_finite() && self.speed_of_sound > 0.0) {
            return Err(AcoustraceError::config(format!(
                "speed of sound must be positive, got {}",
                self.speed_of_sound
            )));
        }

        if !(self.impulse_response_duration.is_finite() && self.impulse_response_duration > 0.0)
        {
            return Err(AcoustraceError::config(format!(
                "impulse response duration must be positive, got {}",
                self.impulse_response_duration
            )));
        }

        if self.impulse_response_len() == 0 {
            return Err(AcoustraceError::config(format!(
                "impulse response of {} s at {} Hz has no samples",
                self.impulse_response_duration, self.sample_rate
            )));
        }

        if !(self.normalization_peak > 0.0 && self.normalization_peak <= 1.0) {
            return Err(AcoustraceError::config(format!(
                "normalization peak must be in (0, 1], got {}",
                self.normalization_peak
            )));
        }

        if !(self.air_absorption_coefficient.is_finite() && self.air_absorption_coefficient >= 0.0)
        {
            return Err(AcoustraceError::config(format!(
                "air absorption coefficient must be non-negative, got {}",
                self.air_absorption_coefficient
            )));
        }

        if self.pulse_length == 0 {
            return Err(AcoustraceError::config("pulse length must be positive"));
        }

        Ok(())
    }
}
