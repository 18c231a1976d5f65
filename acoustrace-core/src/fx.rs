//! Post-processing applied to a synthesized impulse response before convolution.

use std::f32::consts::PI;
use std::fmt;

use crate::synthesis::{FilterCascade, ImpulseResponse};

/// One stage of an [`FxChain`].
///
/// Processors are shared between threads and must keep no state across
/// calls; filters rebuild their state for every response.
pub trait IrProcessor: Send + Sync {
    /// Short label used in logs.
    fn name(&self) -> &str;

    /// Transforms `samples` in place. The length must not change.
    fn process(&self, samples: &mut [f32], sample_rate: u32);
}

/// Ordered list of processors run over an impulse response.
#[derive(Default)]
pub struct FxChain {
    processors: Vec<Box<dyn IrProcessor>>,
}

impl FxChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `processor` and returns the chain, for building chains inline.
    pub fn with(mut self, processor: impl IrProcessor + 'static) -> Self {
        self.push(processor);
        self
    }

    pub fn push(&mut self, processor: impl IrProcessor + 'static) {
        self.processors.push(Box::new(processor));
    }

    pub fn len(&self) -> usize {
        self.processors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processors.is_empty()
    }

    pub fn clear(&mut self) {
        self.processors.clear();
    }

    pub fn names(&self) -> Vec<&str> {
        self.processors.iter().map(|p| p.name()).collect()
    }

    /// Runs every processor in insertion order.
    pub fn process(&self, impulse_response: &mut ImpulseResponse) {
        let sample_rate = impulse_response.sample_rate();
        for processor in &self.processors {
            log::trace!("Applying {} to impulse response", processor.name());
            processor.process(impulse_response.samples_mut(), sample_rate);
        }
    }
}

impl fmt::Debug for FxChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

/// 4th-order Butterworth low-pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lowpass {
    pub cutoff_hz: f32,
}

impl Lowpass {
    pub fn new(cutoff_hz: f32) -> Self {
        Self { cutoff_hz }
    }
}

impl IrProcessor for Lowpass {
    fn name(&self) -> &str {
        "lowpass"
    }

    fn process(&self, samples: &mut [f32], sample_rate: u32) {
        FilterCascade::butterworth_low_pass(sample_rate, self.cutoff_hz).process(samples);
    }
}

/// 4th-order Butterworth high-pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Highpass {
    pub cutoff_hz: f32,
}

impl Highpass {
    pub fn new(cutoff_hz: f32) -> Self {
        Self { cutoff_hz }
    }
}

impl IrProcessor for Highpass {
    fn name(&self) -> &str {
        "highpass"
    }

    fn process(&self, samples: &mut [f32], sample_rate: u32) {
        FilterCascade::butterworth_high_pass(sample_rate, self.cutoff_hz).process(samples);
    }
}

/// Adds one echo of the input `delay_ms` later, scaled by `feedback`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Delay {
    pub delay_ms: f32,
    pub feedback: f32,
}

impl Delay {
    pub fn new(delay_ms: f32) -> Self {
        Self {
            delay_ms,
            feedback: 0.3,
        }
    }

    pub fn feedback(mut self, feedback: f32) -> Self {
        self.feedback = feedback;
        self
    }

    fn delay_samples(&self, sample_rate: u32) -> usize {
        (self.delay_ms * sample_rate as f32 / 1000.0).max(0.0) as usize
    }
}

impl IrProcessor for Delay {
    fn name(&self) -> &str {
        "delay"
    }

    fn process(&self, samples: &mut [f32], sample_rate: u32) {
        let delay = self.delay_samples(sample_rate);
        if delay == 0 || delay >= samples.len() {
            return;
        }
        // Walk backwards so every echo reads the unprocessed input
        for i in (delay..samples.len()).rev() {
            samples[i] += samples[i - delay] * self.feedback;
        }
    }
}

/// Mixes in a copy of the input read through an LFO-modulated delay line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Chorus {
    pub rate_hz: f32,
    /// Peak delay excursion in seconds
    pub depth: f32,
}

/// Level of the dry signal in the chorus output.
const CHORUS_DRY: f32 = 0.7;
/// Level of the modulated copy in the chorus output.
const CHORUS_WET: f32 = 0.3;

impl Chorus {
    pub fn new(rate_hz: f32, depth: f32) -> Self {
        Self { rate_hz, depth }
    }
}

impl Default for Chorus {
    fn default() -> Self {
        Self::new(1.5, 0.002)
    }
}

impl IrProcessor for Chorus {
    fn name(&self) -> &str {
        "chorus"
    }

    fn process(&self, samples: &mut [f32], sample_rate: u32) {
        if sample_rate == 0 {
            return;
        }
        let dry = samples.to_vec();
        let rate = sample_rate as f32;

        for (i, out) in samples.iter_mut().enumerate() {
            let lfo = (2.0 * PI * self.rate_hz * i as f32 / rate).sin();
            let offset = (self.depth * rate * lfo) as isize;
            let source = i as isize - offset;
            if let Some(&delayed) = usize::try_from(source).ok().and_then(|j| dry.get(j)) {
                *out = CHORUS_DRY * dry[i] + CHORUS_WET * delayed;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn impulse(len: usize, at: usize) -> Vec<f32> {
        let mut samples = vec![0.0; len];
        samples[at] = 1.0;
        samples
    }

    #[test]
    fn test_empty_chain_is_identity() {
        let chain = FxChain::new();
        let mut ir = ImpulseResponse::new(vec![0.5, -0.25, 0.125], 1000);
        chain.process(&mut ir);
        assert_eq!(ir.samples(), &[0.5, -0.25, 0.125]);
        assert!(chain.is_empty());
    }

    #[test]
    fn test_delay_adds_single_echo() {
        let mut samples = impulse(100, 5);
        Delay::new(10.0).process(&mut samples, 1000);

        assert_eq!(samples[5], 1.0);
        assert!((samples[15] - 0.3).abs() < 1e-6);
        // Not recursive
        assert_eq!(samples[25], 0.0);
    }

    #[test]
    fn test_delay_longer_than_buffer_is_noop() {
        let mut samples = impulse(8, 0);
        Delay::new(100.0).feedback(0.9).process(&mut samples, 1000);
        assert_eq!(samples, impulse(8, 0));
    }

    #[test]
    fn test_filters_preserve_length() {
        let chain = FxChain::new()
            .with(Lowpass::new(2_000.0))
            .with(Highpass::new(100.0));
        assert_eq!(chain.names(), vec!["lowpass", "highpass"]);

        let mut ir = ImpulseResponse::new(impulse(1024, 0), 44_100);
        chain.process(&mut ir);
        assert_eq!(ir.len(), 1024);
        assert!(ir.samples().iter().all(|s| s.is_finite()));
        assert!(ir.peak() > 0.0);
    }

    #[test]
    fn test_lowpass_smooths_alternating_signal() {
        let mut samples: Vec<f32> = (0..2048)
            .map(|i| if i % 2 == 0 { 1.0 } else { -1.0 })
            .collect();
        Lowpass::new(500.0).process(&mut samples, 44_100);
        let tail_peak = samples[1024..].iter().fold(0.0f32, |m, s| m.max(s.abs()));
        assert!(tail_peak < 1e-3);
    }

    #[test]
    fn test_chorus_mixes_dry_and_delayed() {
        let samples: Vec<f32> = (0..4410).map(|i| (i as f32 * 0.01).sin()).collect();
        let mut processed = samples.clone();
        Chorus::default().process(&mut processed, 44_100);

        // LFO is zero at t = 0, so the first sample is 0.7 + 0.3 of itself
        assert!((processed[0] - samples[0]).abs() < 1e-6);
        assert!(processed.iter().all(|s| s.abs() <= 1.0 + 1e-6));
        assert!(processed.iter().zip(&samples).any(|(a, b)| (a - b).abs() > 1e-4));
    }
}
