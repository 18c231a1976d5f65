//! RBJ biquad sections and Butterworth cascades for octave-band synthesis.

use std::f32::consts::PI;

use crate::scene::{NUM_BANDS, OCTAVE_BANDS_HZ};

/// Q of the two sections of a 4th-order Butterworth filter.
const BUTTERWORTH_4_Q: [f32; 2] = [0.541_196_1, 1.306_563];

/// Cutoffs are clamped below this fraction of the sample rate.
const MAX_CUTOFF_RATIO: f32 = 0.49;

/// Lower edge of an octave band relative to its center.
pub const BAND_LOW_RATIO: f32 = 0.67;

/// Upper edge of an octave band relative to its center.
pub const BAND_HIGH_RATIO: f32 = 1.5;

/// Direct form I biquad.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Biquad {
    b0: f32,
    b1: f32,
    b2: f32,
    a1: f32,
    a2: f32,
    x1: f32,
    x2: f32,
    y1: f32,
    y2: f32,
}

impl Biquad {
    pub fn low_pass(sample_rate: u32, cutoff_hz: f32, q: f32) -> Self {
        let (cos_w0, alpha) = Self::prewarp(sample_rate, cutoff_hz, q);
        let a0 = 1.0 + alpha;
        let b0 = ((1.0 - cos_w0) / 2.0) / a0;
        Self::from_coefficients(
            b0,
            (1.0 - cos_w0) / a0,
            b0,
            (-2.0 * cos_w0) / a0,
            (1.0 - alpha) / a0,
        )
    }

    pub fn high_pass(sample_rate: u32, cutoff_hz: f32, q: f32) -> Self {
        let (cos_w0, alpha) = Self::prewarp(sample_rate, cutoff_hz, q);
        let a0 = 1.0 + alpha;
        let b0 = ((1.0 + cos_w0) / 2.0) / a0;
        Self::from_coefficients(
            b0,
            -(1.0 + cos_w0) / a0,
            b0,
            (-2.0 * cos_w0) / a0,
            (1.0 - alpha) / a0,
        )
    }

    fn from_coefficients(b0: f32, b1: f32, b2: f32, a1: f32, a2: f32) -> Self {
        Self {
            b0,
            b1,
            b2,
            a1,
            a2,
            x1: 0.0,
            x2: 0.0,
            y1: 0.0,
            y2: 0.0,
        }
    }

    fn prewarp(sample_rate: u32, cutoff_hz: f32, q: f32) -> (f32, f32) {
        let sample_rate = sample_rate.max(1) as f32;
        let ratio = (cutoff_hz / sample_rate).clamp(0.0, MAX_CUTOFF_RATIO);
        let w0 = 2.0 * PI * ratio;
        (w0.cos(), w0.sin() / (2.0 * q))
    }

    pub fn process(&mut self, input: f32) -> f32 {
        let output = self.b0 * input + self.b1 * self.x1 + self.b2 * self.x2
            - self.a1 * self.y1
            - self.a2 * self.y2;
        self.x2 = self.x1;
        self.x1 = input;
        self.y2 = self.y1;
        self.y1 = output;
        output
    }

    pub fn reset(&mut self) {
        self.x1 = 0.0;
        self.x2 = 0.0;
        self.y1 = 0.0;
        self.y2 = 0.0;
    }
}

/// Series of biquads applied one after another.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCascade {
    stages: Vec<Biquad>,
}

impl FilterCascade {
    pub fn butterworth_low_pass(sample_rate: u32, cutoff_hz: f32) -> Self {
        Self {
            stages: BUTTERWORTH_4_Q
                .iter()
                .map(|&q| Biquad::low_pass(sample_rate, cutoff_hz, q))
                .collect(),
        }
    }

    pub fn butterworth_high_pass(sample_rate: u32, cutoff_hz: f32) -> Self {
        Self {
            stages: BUTTERWORTH_4_Q
                .iter()
                .map(|&q| Biquad::high_pass(sample_rate, cutoff_hz, q))
                .collect(),
        }
    }

    /// High-pass at `low_hz` followed by low-pass at `high_hz`.
    pub fn band_pass(sample_rate: u32, low_hz: f32, high_hz: f32) -> Self {
        let mut cascade = Self::butterworth_high_pass(sample_rate, low_hz);
        cascade
            .stages
            .extend(Self::butterworth_low_pass(sample_rate, high_hz).stages);
        cascade
    }

    /// Filter isolating octave band `band`.
    ///
    /// The lowest band is open below, the highest open above.
    pub fn octave_band(sample_rate: u32, band: usize) -> Self {
        let center = OCTAVE_BANDS_HZ[band.min(NUM_BANDS - 1)];
        match band {
            0 => Self::butterworth_low_pass(sample_rate, center * BAND_HIGH_RATIO),
            b if b >= NUM_BANDS - 1 => {
                Self::butterworth_high_pass(sample_rate, center * BAND_LOW_RATIO)
            }
            _ => Self::band_pass(
                sample_rate,
                center * BAND_LOW_RATIO,
                center * BAND_HIGH_RATIO,
            ),
        }
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn process_sample(&mut self, input: f32) -> f32 {
        self.stages
            .iter_mut()
            .fold(input, |sample, stage| stage.process(sample))
    }

    /// Filters `buffer` in place, continuing from the current state.
    pub fn process(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process_sample(*sample);
        }
    }

    pub fn reset(&mut self) {
        for stage in &mut self.stages {
            stage.reset();
        }
    }
}
