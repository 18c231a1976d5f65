//! Impulse response synthesis from traced paths.

pub mod band_filter;

pub use band_filter::{Biquad, FilterCascade};

use crate::config::{SimulationConfig, SynthesisMode};
use crate::path::AcousticPath;
use crate::scene::NUM_BANDS;

/// Time constant of the pulse injected for each path, in seconds.
pub const PULSE_DECAY_SECONDS: f32 = 0.01;

/// Sampled room response between one source and one receiver.
#[derive(Debug, Clone, PartialEq)]
pub struct ImpulseResponse {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl ImpulseResponse {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// All-zero response of `len` samples.
    pub fn silent(len: usize, sample_rate: u32) -> Self {
        Self::new(vec![0.0; len], sample_rate)
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn samples_mut(&mut self) -> &mut [f32] {
        &mut self.samples
    }

    pub fn into_samples(self) -> Vec<f32> {
        self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Length in seconds.
    pub fn duration(&self) -> f32 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f32 / self.sample_rate as f32
    }

    pub fn peak(&self) -> f32 {
        self.samples.iter().fold(0.0f32, |peak, s| peak.max(s.abs()))
    }

    pub fn is_silent(&self) -> bool {
        self.samples.iter().all(|&s| s == 0.0)
    }
}

/// Turns a set of paths into a sampled impulse response.
///
/// Every path contributes a short exponentially decaying pulse starting at its
/// arrival sample. Contributions are summed, so path order does not matter.
#[derive(Debug, Clone, PartialEq)]
pub struct ImpulseResponseSynthesizer {
    sample_rate: u32,
    speed_of_sound: f32,
    len: usize,
    pulse_length: usize,
    mode: SynthesisMode,
}

impl ImpulseResponseSynthesizer {
    pub fn new(sample_rate: u32, speed_of_sound: f32, duration_seconds: f32) -> Self {
        Self {
            sample_rate,
            speed_of_sound,
            len: (duration_seconds * sample_rate as f32).round().max(0.0) as usize,
            pulse_length: 64,
            mode: SynthesisMode::MeanGain,
        }
    }

    pub fn from_config(config: &SimulationConfig) -> Self {
        Self {
            sample_rate: config.sample_rate,
            speed_of_sound: config.speed_of_sound,
            len: config.impulse_response_len(),
            pulse_length: config.pulse_length,
            mode: config.synthesis_mode,
        }
    }

    pub fn pulse_length(mut self, samples: usize) -> Self {
        self.pulse_length = samples;
        self
    }

    pub fn mode(mut self, mode: SynthesisMode) -> Self {
        self.mode = mode;
        self
    }

    /// Number of samples in every synthesized response.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Arrival sample of `path`, or `None` if it lands past the end of the buffer.
    pub fn delay_samples(&self, path: &AcousticPath) -> Option<usize> {
        let delay = (path.delay(self.speed_of_sound) * self.sample_rate as f32).round();
        if !delay.is_finite() || delay < 0.0 {
            return None;
        }
        let delay = delay as usize;
        (delay < self.len).then_some(delay)
    }

    pub fn synthesize(&self, paths: &[AcousticPath]) -> ImpulseResponse {
        let samples = match self.mode {
            SynthesisMode::MeanGain => self.render(paths, |path| path.mean_gain()),
            SynthesisMode::BandFiltered => self.render_band_filtered(paths),
        };

        ImpulseResponse::new(samples, self.sample_rate)
    }

    fn render(&self, paths: &[AcousticPath], gain: impl Fn(&AcousticPath) -> f32) -> Vec<f32> {
        let mut buffer = vec![0.0f32; self.len];
        let mut dropped = 0;

        for path in paths {
            match self.delay_samples(path) {
                Some(start) => self.add_pulse(&mut buffer, start, gain(path)),
                None => dropped += 1,
            }
        }

        if dropped > 0 {
            log::debug!(
                "Dropped {} of {} paths arriving after {} samples",
                dropped,
                paths.len(),
                self.len
            );
        }

        buffer
    }

    fn render_band_filtered(&self, paths: &[AcousticPath]) -> Vec<f32> {
        let mut combined = vec![0.0f32; self.len];

        for band in 0..NUM_BANDS {
            let mut band_buffer = self.render(paths, |path| path.attenuation()[band]);
            FilterCascade::octave_band(self.sample_rate, band).process(&mut band_buffer);
            for (out, sample) in combined.iter_mut().zip(&band_buffer) {
                *out += sample;
            }
        }

        combined
    }

    fn add_pulse(&self, buffer: &mut [f32], start: usize, gain: f32) {
        let decay = self.sample_rate as f32 * PULSE_DECAY_SECONDS;
        let end = start.saturating_add(self.pulse_length).min(buffer.len());
        for (j, sample) in buffer[start..end].iter_mut().enumerate() {
            *sample += gain * (-(j as f32) / decay).exp();
        }
    }
}
