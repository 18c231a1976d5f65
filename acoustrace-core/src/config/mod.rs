mod microphone_config;
mod simulation_config;
mod source_config;

pub use microphone_config::{Directivity, MicrophoneConfig};
pub use simulation_config::{SimulationConfig, SynthesisMode};
pub use source_config::SourceConfig;
