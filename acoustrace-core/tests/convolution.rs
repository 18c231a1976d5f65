use acoustrace_core::{AcoustraceError, convolve, convolve_direct};
use approx::assert_abs_diff_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn noise(rng: &mut StdRng, len: usize) -> Vec<f32> {
    (0..len).map(|_| rng.gen_range(-1.0f32..1.0)).collect()
}

/// Reference convolution accumulated in f64.
fn convolve_f64(signal: &[f32], ir: &[f32]) -> Vec<f64> {
    let mut out = vec![0.0f64; signal.len() + ir.len() - 1];
    for (k, &s) in signal.iter().enumerate() {
        for (j, &h) in ir.iter().enumerate() {
            out[k + j] += s as f64 * h as f64;
        }
    }
    out
}

#[test]
fn test_length_law() -> anyhow::Result<()> {
    let mut rng = StdRng::seed_from_u64(1);
    for (a, b) in [(1, 1), (1, 500), (33, 33), (700, 40), (4_097, 1_025)] {
        let signal = noise(&mut rng, a);
        let ir = noise(&mut rng, b);
        assert_eq!(convolve(&signal, &ir)?.len(), a + b - 1);
    }
    Ok(())
}

#[test]
fn test_matches_direct_convolution_on_long_inputs() -> anyhow::Result<()> {
    let mut rng = StdRng::seed_from_u64(42);
    let signal = noise(&mut rng, 10_000);
    let ir = noise(&mut rng, 1_000);

    let fast = convolve(&signal, &ir)?;
    let reference = convolve_f64(&signal, &ir);

    let peak = reference.iter().fold(0.0f64, |m, s| m.max(s.abs()));
    let max_error = fast
        .iter()
        .zip(&reference)
        .fold(0.0f64, |m, (&a, &b)| m.max((a as f64 - b).abs()));
    assert!(
        max_error <= 1e-4 * peak,
        "max error {} against peak {}",
        max_error,
        peak
    );
    Ok(())
}

#[test]
fn test_linearity() -> anyhow::Result<()> {
    let mut rng = StdRng::seed_from_u64(7);
    let a = noise(&mut rng, 2_000);
    let b = noise(&mut rng, 2_000);
    let ir = noise(&mut rng, 300);
    let sum: Vec<f32> = a.iter().zip(&b).map(|(x, y)| x + y).collect();

    let lhs = convolve(&sum, &ir)?;
    let ya = convolve(&a, &ir)?;
    let yb = convolve(&b, &ir)?;

    for (i, value) in lhs.iter().enumerate() {
        assert_abs_diff_eq!(*value, ya[i] + yb[i], epsilon = 1e-3);
    }
    Ok(())
}

#[test]
fn test_commutative() -> anyhow::Result<()> {
    let mut rng = StdRng::seed_from_u64(3);
    let a = noise(&mut rng, 900);
    let b = noise(&mut rng, 120);

    let ab = convolve(&a, &b)?;
    let ba = convolve(&b, &a)?;
    assert_eq!(ab, ba);

    let direct = convolve_direct(&a, &b);
    for (x, y) in ab.iter().zip(&direct) {
        assert_abs_diff_eq!(*x, *y, epsilon = 1e-3);
    }
    Ok(())
}

#[test]
fn test_empty_signal() {
    assert!(matches!(
        convolve(&[], &[1.0, 2.0]),
        Err(AcoustraceError::EmptySignal)
    ));
}
