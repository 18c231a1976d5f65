//! The end-to-end pipeline: trace, attenuate, synthesize, convolve, normalize.

use crate::config::SimulationConfig;
use crate::convolution::convolve;
use crate::error::{AcoustraceError, Result};
use crate::fx::FxChain;
use crate::math::Vec3;
use crate::path::AcousticPath;
use crate::scene::{MaterialCatalog, Triangle};
use crate::synthesis::{ImpulseResponse, ImpulseResponseSynthesizer};
use crate::tracer::PathTracer;

/// Renders a dry signal as heard at a receiver inside a triangulated scene.
///
/// The simulator borrows the scene and catalog and owns only its
/// configuration, so it is cheap to build and every call to
/// [`simulate`](Self::simulate) allocates its own buffers. A `&Simulator` can
/// be shared across threads.
///
/// # Example
///
/// ```
/// use acoustrace_core::{MaterialCatalog, SimulationConfig, Simulator, Vec3};
///
/// let catalog = MaterialCatalog::with_presets();
/// let config = SimulationConfig::new().sample_rate(8_000).impulse_response_duration(0.1);
/// let simulator = Simulator::new(&[], &catalog, config)?;
///
/// let output = simulator.simulate(Vec3::ZERO, &[1.0, 0.5, 0.25], Vec3::new(3.43, 0.0, 0.0))?;
/// assert_eq!(output.len(), 3 + 800 - 1);
/// # Ok::<(), acoustrace_core::AcoustraceError>(())
/// ```
#[derive(Debug)]
pub struct Simulator<'a> {
    geometry: &'a [Triangle],
    catalog: &'a MaterialCatalog,
    config: SimulationConfig,
    fx_chain: FxChain,
}

impl<'a> Simulator<'a> {
    /// Validates `config` and binds it to a scene.
    pub fn new(
        geometry: &'a [Triangle],
        catalog: &'a MaterialCatalog,
        config: SimulationConfig,
    ) -> Result<Self> {
        config.validate()?;

        log::info!(
            "Simulator ready: {} triangles, max order {}, cutoff {} m, {} Hz",
            geometry.len(),
            config.max_reflection_order,
            config.max_path_length,
            config.sample_rate
        );

        Ok(Self {
            geometry,
            catalog,
            config,
            fx_chain: FxChain::new(),
        })
    }

    /// Attaches processors run over every impulse response before convolution.
    pub fn with_fx_chain(mut self, fx_chain: FxChain) -> Self {
        self.fx_chain = fx_chain;
        self
    }

    pub fn fx_chain(&self) -> &FxChain {
        &self.fx_chain
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn geometry(&self) -> &'a [Triangle] {
        self.geometry
    }

    pub fn catalog(&self) -> &'a MaterialCatalog {
        self.catalog
    }

    /// Takes effect on the next call; nothing is rebuilt.
    pub fn set_max_reflection_order(&mut self, order: usize) {
        self.config.max_reflection_order = order;
    }

    /// Changes the path length cutoff, rejecting non-positive values.
    pub fn set_max_path_length(&mut self, meters: f32) -> Result<()> {
        if !(meters.is_finite() && meters > 0.0) {
            return Err(AcoustraceError::config(format!(
                "max path length must be positive and finite, got {}",
                meters
            )));
        }
        self.config.max_path_length = meters;
        Ok(())
    }

    pub fn tracer(&self) -> PathTracer<'a> {
        PathTracer::new(self.geometry, self.catalog, &self.config)
    }

    /// Every accepted propagation path between `source` and `receiver`.
    pub fn trace_paths(&self, source: Vec3, receiver: Vec3) -> Vec<AcousticPath> {
        self.tracer().trace(source, receiver)
    }

    /// Synthesizes the response for `paths` and runs the FX chain over it.
    pub fn impulse_response_for(&self, paths: &[AcousticPath]) -> ImpulseResponse {
        let mut impulse_response =
            ImpulseResponseSynthesizer::from_config(&self.config).synthesize(paths);
        self.fx_chain.process(&mut impulse_response);
        impulse_response
    }

    /// The impulse response between two points together with the paths that built it.
    pub fn room_response(
        &self,
        source: Vec3,
        receiver: Vec3,
    ) -> (ImpulseResponse, Vec<AcousticPath>) {
        let paths = self.trace_paths(source, receiver);
        let impulse_response = self.impulse_response_for(&paths);
        (impulse_response, paths)
    }

    /// Renders `signal`, emitted at `source`, as heard at `receiver`.
    ///
    /// The output has `signal.len() + impulse_response_len - 1` samples and is
    /// peak-normalized to the configured level. A fully shielded receiver gets
    /// silence.
    ///
    /// # Errors
    ///
    /// [`AcoustraceError::EmptySignal`] if `signal` is empty.
    pub fn simulate(&self, source: Vec3, signal: &[f32], receiver: Vec3) -> Result<Vec<f32>> {
        if signal.is_empty() {
            return Err(AcoustraceError::EmptySignal);
        }

        let (impulse_response, paths) = self.room_response(source, receiver);
        log::debug!(
            "Convolving {} samples with {}-sample response from {} paths",
            signal.len(),
            impulse_response.len(),
            paths.len()
        );

        let mut output = convolve(signal, impulse_response.samples())?;
        normalize_peak(&mut output, self.config.normalization_peak);
        Ok(output)
    }
}

/// Scales `samples` so the largest magnitude equals `peak`.
///
/// Silent input and input holding NaN or infinite samples are left
/// untouched. Returns whether any scaling happened.
pub fn normalize_peak(samples: &mut [f32], peak: f32) -> bool {
    if let Some(position) = samples.iter().position(|s| !s.is_finite()) {
        log::warn!(
            "Skipping normalization: sample {} of {} is {}",
            position,
            samples.len(),
            samples[position]
        );
        return false;
    }

    let max = samples.iter().fold(0.0f32, |m, s| m.max(s.abs()));
    if max == 0.0 {
        return false;
    }

    let scale = peak / max;
    for sample in samples.iter_mut() {
        *sample *= scale;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SynthesisMode;
    use crate::fx::Delay;
    use crate::scene::shoebox;

    fn small_config() -> SimulationConfig {
        SimulationConfig::new()
            .sample_rate(8_000)
            .impulse_response_duration(0.25)
            .max_reflection_order(2)
    }

    #[test]
    fn test_rejects_invalid_config() {
        let catalog = MaterialCatalog::with_presets();
        assert!(matches!(
            Simulator::new(&[], &catalog, SimulationConfig::new().sample_rate(0)),
            Err(AcoustraceError::Configuration(_))
        ));
        assert!(matches!(
            Simulator::new(&[], &catalog, SimulationConfig::new().max_path_length(0.0)),
            Err(AcoustraceError::Configuration(_))
        ));
    }

    #[test]
    fn test_empty_signal_is_error() {
        let catalog = MaterialCatalog::with_presets();
        let simulator = Simulator::new(&[], &catalog, small_config()).unwrap();
        assert!(matches!(
            simulator.simulate(Vec3::ZERO, &[], Vec3::X),
            Err(AcoustraceError::EmptySignal)
        ));
    }

    #[test]
    fn test_output_length_and_peak() {
        let catalog = MaterialCatalog::with_presets();
        let room = shoebox(Vec3::ZERO, Vec3::new(10.0, 8.0, 6.0), "concrete");
        let simulator = Simulator::new(&room, &catalog, small_config()).unwrap();

        let signal: Vec<f32> = (0..400).map(|i| (i as f32 * 0.05).sin()).collect();
        let output = simulator
            .simulate(Vec3::new(2.3, 3.1, 1.7), &signal, Vec3::new(6.9, 5.3, 2.45))
            .unwrap();

        assert_eq!(output.len(), 400 + 2_000 - 1);
        let peak = output.iter().fold(0.0f32, |m, s| m.max(s.abs()));
        assert!((peak - 0.9).abs() < 1e-5);
    }

    #[test]
    fn test_out_of_range_receiver_is_silent() {
        let catalog = MaterialCatalog::with_presets();
        let config = small_config().max_path_length(5.0);
        let simulator = Simulator::new(&[], &catalog, config).unwrap();

        let output = simulator
            .simulate(Vec3::ZERO, &[1.0, -1.0], Vec3::new(50.0, 0.0, 0.0))
            .unwrap();
        assert_eq!(output.len(), 2 + 2_000 - 1);
        assert!(output.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_room_response_reports_paths() {
        let catalog = MaterialCatalog::with_presets();
        let room = shoebox(Vec3::ZERO, Vec3::new(10.0, 8.0, 6.0), "concrete");
        let mut simulator = Simulator::new(&room, &catalog, small_config()).unwrap();

        let (ir, paths) =
            simulator.room_response(Vec3::new(2.3, 3.1, 1.7), Vec3::new(6.9, 5.3, 2.45));
        assert_eq!(paths.len(), 1 + 6 + 18);
        assert_eq!(ir.len(), 2_000);
        assert!(!ir.is_silent());

        simulator.set_max_reflection_order(0);
        let (_, direct_only) =
            simulator.room_response(Vec3::new(2.3, 3.1, 1.7), Vec3::new(6.9, 5.3, 2.45));
        assert_eq!(direct_only.len(), 1);
    }

    #[test]
    fn test_band_filtered_mode_renders() {
        let catalog = MaterialCatalog::with_presets();
        let room = shoebox(Vec3::ZERO, Vec3::new(10.0, 8.0, 6.0), "plaster");
        let config = small_config()
            .sample_rate(16_000)
            .synthesis_mode(SynthesisMode::BandFiltered);
        let simulator = Simulator::new(&room, &catalog, config).unwrap();

        let (ir, _) =
            simulator.room_response(Vec3::new(2.3, 3.1, 1.7), Vec3::new(6.9, 5.3, 2.45));
        assert!(ir.samples().iter().all(|s| s.is_finite()));
        assert!(ir.peak() > 0.0);
    }

    #[test]
    fn test_fx_chain_is_applied() {
        let catalog = MaterialCatalog::with_presets();
        let plain = Simulator::new(&[], &catalog, small_config()).unwrap();
        let delayed = Simulator::new(&[], &catalog, small_config())
            .unwrap()
            .with_fx_chain(FxChain::new().with(Delay::new(50.0)));
        assert_eq!(delayed.fx_chain().len(), 1);

        let source = Vec3::ZERO;
        let receiver = Vec3::new(3.43, 0.0, 0.0);
        let (dry, _) = plain.room_response(source, receiver);
        let (wet, _) = delayed.room_response(source, receiver);

        // Direct arrival at 80 samples, echo 400 samples later
        assert_eq!(dry.samples()[480], 0.0);
        assert!(wet.samples()[480] > 0.0);
    }

    #[test]
    fn test_set_max_path_length_validates() {
        let catalog = MaterialCatalog::with_presets();
        let mut simulator = Simulator::new(&[], &catalog, small_config()).unwrap();
        assert!(simulator.set_max_path_length(-1.0).is_err());
        assert!(simulator.set_max_path_length(f32::INFINITY).is_err());
        simulator.set_max_path_length(20.0).unwrap();
        assert_eq!(simulator.config().max_path_length, 20.0);
    }

    #[test]
    fn test_normalize_peak() {
        let mut samples = vec![0.5, -2.0, 1.0];
        assert!(normalize_peak(&mut samples, 0.9));
        assert!((samples[1] + 0.9).abs() < 1e-6);
        assert!((samples[0] - 0.225).abs() < 1e-6);

        let mut silent = vec![0.0; 4];
        assert!(!normalize_peak(&mut silent, 0.9));
        assert_eq!(silent, vec![0.0; 4]);
    }

    #[test]
    fn test_normalize_peak_skips_non_finite() {
        let mut samples = vec![0.5, f32::NAN, 2.0];
        assert!(!normalize_peak(&mut samples, 0.9));
        assert_eq!(samples[0], 0.5);
        assert!(samples[1].is_nan());
        assert_eq!(samples[2], 2.0);

        let mut samples = vec![0.25, f32::NEG_INFINITY];
        assert!(!normalize_peak(&mut samples, 0.9));
        assert_eq!(samples, vec![0.25, f32::NEG_INFINITY]);
    }
}
