//! # Acoustrace Core
//!
//! Geometric room acoustics for Rust: traces specular propagation paths
//! through a triangulated scene, turns them into an impulse response and
//! renders dry audio through it.
//!
//! ## Quick Start
//!
//! ```
//! use acoustrace_core::*;
//!
//! // A 10 x 8 x 6 m concrete room
//! let room = scene::shoebox(Vec3::ZERO, Vec3::new(10.0, 8.0, 6.0), "concrete");
//! let catalog = MaterialCatalog::with_presets();
//!
//! let config = SimulationConfig::new()
//!     .max_reflection_order(2)
//!     .sample_rate(16_000)
//!     .impulse_response_duration(0.5);
//! let simulator = Simulator::new(&room, &catalog, config)?;
//!
//! let dry: Vec<f32> = (0..1_600).map(|i| (i as f32 * 0.1).sin()).collect();
//! let wet = simulator.simulate(Vec3::new(2.0, 3.0, 1.5), &dry, Vec3::new(7.0, 5.0, 1.7))?;
//!
//! assert_eq!(wet.len(), dry.len() + 8_000 - 1);
//! # Ok::<(), AcoustraceError>(())
//! ```
//!
//! ## Key Components
//!
//! - **[`PathTracer`]**: Image-source enumeration of direct and reflected paths
//! - **[`AttenuationModel`]**: Per-band distance law, air absorption and material reflectance
//! - **[`ImpulseResponseSynthesizer`]**: Paths to a sampled impulse response
//! - **[`convolve`]**: FFT overlap-add convolution
//! - **[`Simulator`]**: The whole pipeline for one source and one receiver
//! - **[`World`]**: Many sources and microphones rendered together
//! - **[`MaterialCatalog`]**: Read-only material lookup with a default fallback
//! - **[`RayTracer`]**: Trait for plugging in an accelerated occlusion backend
//!
//! ## Sharing
//!
//! Geometry and the material catalog are borrowed, never copied or mutated.
//! Any number of simulators on any number of threads may share one scene.

pub mod attenuation;
pub mod config;
pub mod convolution;
pub mod error;
pub mod fx;
pub mod math;
pub mod path;
pub mod scene;
pub mod simulator;
pub mod synthesis;
pub mod tracer;
pub mod world;

pub use attenuation::AttenuationModel;
pub use config::{Directivity, MicrophoneConfig, SimulationConfig, SourceConfig, SynthesisMode};
pub use convolution::{convolve, convolve_direct};
pub use error::{AcoustraceError, Result};
pub use fx::{FxChain, IrProcessor};
pub use math::Vec3;
pub use path::AcousticPath;
pub use scene::{
    LinearRayTracer, MaterialCatalog, MaterialProperties, Medium, RayTracer, Triangle,
};
pub use simulator::{Simulator, normalize_peak};
pub use synthesis::{ImpulseResponse, ImpulseResponseSynthesizer};
pub use tracer::PathTracer;
pub use world::{MicrophoneId, SourceId, World};
