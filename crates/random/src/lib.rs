//! Deterministic random sampling for the simulator
//!
//! Every rank owns one [GrayRng]; nothing here is process-global. The engine
//! is a Mersenne twister so runs are reproducible from a single seed, and the
//! geometric transforms are pure functions of their variates so they can be
//! tested without an engine at all.

// Split into subfiles for development, but anything important is re-exported
mod mt19937;
mod rng;

pub mod transform;

#[doc(inline)]
pub use mt19937::Mt19937;

#[doc(inline)]
pub use rng::GrayRng;

/// Conversion between a Gaussian FWHM and its standard deviation
pub const FWHM_TO_SIGMA: f64 = 2.354_820_05;
