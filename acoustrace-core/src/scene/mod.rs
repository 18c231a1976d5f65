//! Scene description: geometry, materials, propagation media and ray casting.
//!
//! # Overview
//!
//! 1. **Triangle** - A surface with three vertices and a material key
//! 2. **MaterialProperties / MaterialCatalog** - Per-band acoustic properties looked up by key
//! 3. **Medium** - Speed of sound and absorption of the propagation medium
//! 4. **RayTracer** - Occlusion queries; [`LinearRayTracer`] scans every triangle
//!
//! # Example
//!
//! ```
//! use acoustrace_core::math::Vec3;
//! use acoustrace_core::scene::{LinearRayTracer, MaterialCatalog, RayTracer, Triangle};
//!
//! let catalog = MaterialCatalog::with_presets();
//! let floor = vec![Triangle::new(
//!     Vec3::new(-5.0, -5.0, 0.0),
//!     Vec3::new(5.0, -5.0, 0.0),
//!     Vec3::new(0.0, 5.0, 0.0),
//!     "carpet",
//! )];
//!
//! let tracer = LinearRayTracer::new(&floor);
//! assert!(tracer.is_occluded(Vec3::new(0.0, 0.0, 1.0), Vec3::new(0.0, 0.0, -1.0), &[]));
//! assert_eq!(catalog.lookup(&floor[0].material).name, "Carpet");
//! ```

pub mod geometry;
pub mod material;
pub mod medium;
pub mod ray_tracer;
pub mod triangle;

pub use geometry::{centered_box, shoebox};
pub use material::{BandGains, MaterialCatalog, MaterialProperties, NUM_BANDS, OCTAVE_BANDS_HZ};
pub use medium::Medium;
pub use ray_tracer::{LinearRayTracer, Ray, RayHit, RayTracer};
pub use triangle::{Intersection, Triangle, intersect};
