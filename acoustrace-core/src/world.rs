//! A scene populated with any number of sources and microphones.

use std::collections::BTreeMap;
use std::fmt;

use crate::config::{MicrophoneConfig, SimulationConfig, SourceConfig};
use crate::convolution::convolve;
use crate::error::{AcoustraceError, Result};
use crate::fx::FxChain;
use crate::math::Vec3;
use crate::scene::{MaterialCatalog, Triangle};
use crate::simulator::{Simulator, normalize_peak};

/// Lightweight, type-safe handle for a source in a [`World`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourceId(u64);

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SourceId({})", self.0)
    }
}

/// Lightweight, type-safe handle for a microphone in a [`World`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MicrophoneId(u64);

impl fmt::Display for MicrophoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MicrophoneId({})", self.0)
    }
}

/// A registered source: where it is and what it plays.
#[derive(Debug, Clone, PartialEq)]
pub struct WorldSource {
    pub config: SourceConfig,
    pub signal: Vec<f32>,
}

/// Owns source signals and microphone placements over a borrowed scene.
///
/// [`render`](Self::render) produces one output per microphone: every source
/// convolved with its own room response to that microphone, summed, then
/// peak-normalized.
#[derive(Debug)]
pub struct World<'a> {
    simulator: Simulator<'a>,
    sources: BTreeMap<SourceId, WorldSource>,
    microphones: BTreeMap<MicrophoneId, MicrophoneConfig>,
    next_id: u64,
}

impl<'a> World<'a> {
    pub fn new(
        geometry: &'a [Triangle],
        catalog: &'a MaterialCatalog,
        config: SimulationConfig,
    ) -> Result<Self> {
        Ok(Self::from_simulator(Simulator::new(geometry, catalog, config)?))
    }

    pub fn from_simulator(simulator: Simulator<'a>) -> Self {
        Self {
            simulator,
            sources: BTreeMap::new(),
            microphones: BTreeMap::new(),
            next_id: 0,
        }
    }

    pub fn with_fx_chain(mut self, fx_chain: FxChain) -> Self {
        self.simulator = self.simulator.with_fx_chain(fx_chain);
        self
    }

    pub fn simulator(&self) -> &Simulator<'a> {
        &self.simulator
    }

    pub fn simulator_mut(&mut self) -> &mut Simulator<'a> {
        &mut self.simulator
    }

    fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Registers `signal` played from the place described by `config`.
    ///
    /// # Errors
    ///
    /// [`AcoustraceError::EmptySignal`] if `signal` is empty.
    pub fn add_source(&mut self, config: SourceConfig, signal: Vec<f32>) -> Result<SourceId> {
        if signal.is_empty() {
            return Err(AcoustraceError::EmptySignal);
        }

        let id = SourceId(self.next_id());
        log::debug!("Added {} '{}' at {}", id, config.name, config.position);
        self.sources.insert(id, WorldSource { config, signal });
        Ok(id)
    }

    pub fn remove_source(&mut self, id: SourceId) -> Option<WorldSource> {
        self.sources.remove(&id)
    }

    pub fn source(&self, id: SourceId) -> Option<&WorldSource> {
        self.sources.get(&id)
    }

    pub fn source_ids(&self) -> Vec<SourceId> {
        self.sources.keys().copied().collect()
    }

    pub fn set_source_position(&mut self, id: SourceId, position: Vec3) -> Result<()> {
        let source = self
            .sources
            .get_mut(&id)
            .ok_or(AcoustraceError::UnknownSource(id))?;
        source.config.position = position;
        Ok(())
    }

    pub fn add_microphone(&mut self, config: MicrophoneConfig) -> MicrophoneId {
        let id = MicrophoneId(self.next_id());
        log::debug!("Added {} '{}' at {}", id, config.name, config.position);
        self.microphones.insert(id, config);
        id
    }

    pub fn remove_microphone(&mut self, id: MicrophoneId) -> Option<MicrophoneConfig> {
        self.microphones.remove(&id)
    }

    pub fn microphone(&self, id: MicrophoneId) -> Option<&MicrophoneConfig> {
        self.microphones.get(&id)
    }

    pub fn microphone_ids(&self) -> Vec<MicrophoneId> {
        self.microphones.keys().copied().collect()
    }

    pub fn set_microphone_position(&mut self, id: MicrophoneId, position: Vec3) -> Result<()> {
        let microphone = self
            .microphones
            .get_mut(&id)
            .ok_or(AcoustraceError::UnknownMicrophone(id))?;
        microphone.position = position;
        Ok(())
    }

    /// Length of every rendered output.
    pub fn output_len(&self) -> usize {
        let longest = self
            .sources
            .values()
            .map(|s| s.signal.len())
            .max()
            .unwrap_or(0);
        if longest == 0 {
            return 0;
        }
        longest + self.simulator.config().impulse_response_len() - 1
    }

    /// Renders what every microphone hears, in microphone id order.
    ///
    /// # Errors
    ///
    /// A configuration error if no source has been added.
    pub fn render(&self) -> Result<Vec<(MicrophoneId, Vec<f32>)>> {
        if self.sources.is_empty() {
            return Err(AcoustraceError::config("world has no sources to render"));
        }

        let output_len = self.output_len();
        let peak = self.simulator.config().normalization_peak;
        let mut outputs = Vec::with_capacity(self.microphones.len());

        for (&mic_id, microphone) in &self.microphones {
            let mut mix = vec![0.0f32; output_len];

            for source in self.sources.values() {
                let mut paths = self
                    .simulator
                    .trace_paths(source.config.position, microphone.position);
                if !microphone.directivity.is_omnidirectional() {
                    paths = paths
                        .iter()
                        .map(|p| p.scaled(microphone.directivity.gain(p.arrival_direction())))
                        .collect();
                }

                let impulse_response = self.simulator.impulse_response_for(&paths);
                let rendered = convolve(&source.signal, impulse_response.samples())?;
                for (out, sample) in mix.iter_mut().zip(rendered) {
                    *out += sample * source.config.volume;
                }
            }

            normalize_peak(&mut mix, peak);
            outputs.push((mic_id, mix));
        }

        log::info!(
            "Rendered {} sources into {} microphones ({} samples each)",
            self.sources.len(),
            outputs.len(),
            output_len
        );

        Ok(outputs)
    }
}
