//! A ray-tracing based Monte Carlo simulator for PET
//!
//! Samples radioactive decays from emission volumes, traces the resulting
//! gamma photons through the scene, and runs the detector deposits through
//! a configurable electronics pipeline into hits, singles, and coincidence
//! streams.
//!
//! The heavy lifting lives in the `gray-*` workspace crates; this crate
//! couples them: the photon transport loop, the per-rank simulation driver,
//! and the configuration surface of the `gray` binary.

// Split into subfiles for development, but anything important is re-exported
mod config;
mod error;
mod material_stack;
mod scene_file;
mod simulation;
mod trace;

#[doc(inline)]
pub use config::Config;

#[doc(inline)]
pub use error::Error;

#[doc(inline)]
pub use material_stack::{MaterialStack, MaterialStackResult, MAX_MATERIALS};

#[doc(inline)]
pub use scene_file::load_scene_file;

#[doc(inline)]
pub use simulation::{run_simulation, Simulation, SimulationStats};

#[doc(inline)]
pub use trace::{GammaRayTrace, GammaRayTraceStats, DEFAULT_MAX_TRACE_DEPTH};
