//! Full linear convolution of a signal with an impulse response.
//!
//! Long inputs go through FFT overlap-add: the shorter operand becomes the
//! kernel and is transformed once, the longer one is cut into blocks that are
//! transformed, multiplied with the kernel spectrum, transformed back and
//! accumulated into the output. The result matches [`convolve_direct`] up to
//! floating-point rounding.

use std::sync::Arc;

use realfft::num_complex::Complex;
use realfft::{ComplexToReal, RealFftPlanner, RealToComplex};

use crate::error::{AcoustraceError, Result};

/// Kernels up to this length are convolved in the time domain.
const DIRECT_KERNEL_MAX: usize = 32;

/// Smallest FFT size used for overlap-add.
const MIN_FFT_SIZE: usize = 256;

/// Length of the full linear convolution of inputs of length `a` and `b`.
pub fn output_len(a: usize, b: usize) -> usize {
    if a == 0 || b == 0 { 0 } else { a + b - 1 }
}

/// Convolves `signal` with `impulse_response`.
///
/// The output has `signal.len() + impulse_response.len() - 1` samples.
///
/// # Errors
///
/// [`AcoustraceError::EmptySignal`] if `signal` is empty,
/// [`AcoustraceError::Convolution`] if `impulse_response` is empty or the FFT
/// backend rejects a buffer.
pub fn convolve(signal: &[f32], impulse_response: &[f32]) -> Result<Vec<f32>> {
    if signal.is_empty() {
        return Err(AcoustraceError::EmptySignal);
    }
    if impulse_response.is_empty() {
        return Err(AcoustraceError::Convolution(
            "impulse response is empty".to_string(),
        ));
    }

    let (long, kernel) = if signal.len() >= impulse_response.len() {
        (signal, impulse_response)
    } else {
        (impulse_response, signal)
    };

    if kernel.len() <= DIRECT_KERNEL_MAX {
        return Ok(convolve_direct(long, kernel));
    }

    OverlapAdd::new(kernel)?.convolve(long)
}

/// Time-domain convolution by definition: `out[n] = Σ_k signal[k] * ir[n - k]`.
///
/// Quadratic in the input lengths. Returns an empty vector if either input is empty.
pub fn convolve_direct(signal: &[f32], impulse_response: &[f32]) -> Vec<f32> {
    let mut output = vec![0.0f32; output_len(signal.len(), impulse_response.len())];
    for (k, &s) in signal.iter().enumerate() {
        if s == 0.0 {
            continue;
        }
        for (out, &h) in output[k..].iter_mut().zip(impulse_response) {
            *out += s * h;
        }
    }
    output
}

struct OverlapAdd {
    kernel_len: usize,
    fft_size: usize,
    block_len: usize,
    kernel_spectrum: Vec<Complex<f32>>,
    r2c: Arc<dyn RealToComplex<f32>>,
    c2r: Arc<dyn ComplexToReal<f32>>,
}

impl OverlapAdd {
    fn new(kernel: &[f32]) -> Result<Self> {
        let kernel_len = kernel.len();
        let fft_size = (2 * kernel_len).next_power_of_two().max(MIN_FFT_SIZE);
        let block_len = fft_size - kernel_len + 1;

        let mut planner = RealFftPlanner::<f32>::new();
        let r2c = planner.plan_fft_forward(fft_size);
        let c2r = planner.plan_fft_inverse(fft_size);

        let mut padded = r2c.make_input_vec();
        padded[..kernel_len].copy_from_slice(kernel);
        let mut kernel_spectrum = r2c.make_output_vec();
        r2c.process(&mut padded, &mut kernel_spectrum)?;

        log::debug!(
            "Overlap-add with FFT size {} (kernel {}, block {})",
            fft_size,
            kernel_len,
            block_len
        );

        Ok(Self {
            kernel_len,
            fft_size,
            block_len,
            kernel_spectrum,
            r2c,
            c2r,
        })
    }

    fn convolve(&self, signal: &[f32]) -> Result<Vec<f32>> {
        let mut output = vec![0.0f32; output_len(signal.len(), self.kernel_len)];

        let mut time = self.r2c.make_input_vec();
        let mut spectrum = self.r2c.make_output_vec();
        let scale = 1.0 / self.fft_size as f32;

        for (index, block) in signal.chunks(self.block_len).enumerate() {
            let start = index * self.block_len;

            time.fill(0.0);
            time[..block.len()].copy_from_slice(block);
            self.r2c.process(&mut time, &mut spectrum)?;

            for (bin, kernel_bin) in spectrum.iter_mut().zip(&self.kernel_spectrum) {
                *bin = *bin * *kernel_bin;
            }
            // c2r requires purely real DC and Nyquist bins
            spectrum[0].im = 0.0;
            if let Some(nyquist) = spectrum.last_mut() {
                nyquist.im = 0.0;
            }

            self.c2r.process(&mut spectrum, &mut time)?;

            let produced = block.len() + self.kernel_len - 1;
            for (out, &sample) in output[start..start + produced].iter_mut().zip(&time) {
                *out += sample * scale;
            }
        }

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(len: usize) -> Vec<f32> {
        (0..len).map(|i| ((i * 7919) % 101) as f32 / 50.0 - 1.0).collect()
    }

    fn assert_close(a: &[f32], b: &[f32], tolerance: f32) {
        assert_eq!(a.len(), b.len());
        for (i, (x, y)) in a.iter().zip(b).enumerate() {
            assert!((x - y).abs() <= tolerance, "sample {}: {} vs {}", i, x, y);
        }
    }

    #[test]
    fn test_direct_known_values() {
        let out = convolve_direct(&[1.0, 2.0, 3.0], &[0.0, 1.0, 0.5]);
        assert_eq!(out, vec![0.0, 1.0, 2.5, 4.0, 1.5]);
    }

    #[test]
    fn test_direct_empty() {
        assert!(convolve_direct(&[], &[1.0]).is_empty());
        assert_eq!(output_len(0, 5), 0);
    }

    #[test]
    fn test_unit_impulse_is_identity() {
        let signal = ramp(500);
        let mut impulse = vec![0.0; 300];
        impulse[0] = 1.0;

        let out = convolve(&signal, &impulse).unwrap();
        assert_eq!(out.len(), 799);
        assert_close(&out[..500], &signal, 1e-4);
        assert!(out[500..].iter().all(|s| s.abs() < 1e-4));
    }

    #[test]
    fn test_overlap_add_matches_direct() {
        let signal = ramp(3_000);
        let ir = ramp(700);
        let fast = convolve(&signal, &ir).unwrap();
        let slow = convolve_direct(&signal, &ir);
        let peak = slow.iter().fold(0.0f32, |m, s| m.max(s.abs()));
        assert_close(&fast, &slow, peak * 1e-4);
    }

    #[test]
    fn test_short_signal_long_ir() {
        let signal = ramp(40);
        let ir = ramp(2_000);
        let fast = convolve(&signal, &ir).unwrap();
        let slow = convolve_direct(&signal, &ir);
        assert_eq!(fast.len(), 2_039);
        let peak = slow.iter().fold(0.0f32, |m, s| m.max(s.abs()));
        assert_close(&fast, &slow, peak * 1e-4);
    }

    #[test]
    fn test_small_kernel_uses_direct_path() {
        let out = convolve(&[1.0, 0.0, -1.0], &[2.0]).unwrap();
        assert_eq!(out, vec![2.0, 0.0, -2.0]);
    }

    #[test]
    fn test_empty_inputs_are_errors() {
        assert!(matches!(
            convolve(&[], &[1.0]),
            Err(AcoustraceError::EmptySignal)
        ));
        assert!(matches!(
            convolve(&[1.0], &[]),
            Err(AcoustraceError::Convolution(_))
        ));
    }
}
