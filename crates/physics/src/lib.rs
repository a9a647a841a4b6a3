//! Photon, decay, and gamma-interaction physics
//!
//! The value types that flow through the simulator ([Photon], [NuclearDecay],
//! [Interaction]), the isotope decay models that produce them, and the
//! tabulated gamma cross-section data ([GammaStats], [GammaMaterial]) the
//! transport engine samples against.

// Split into subfiles for development, but anything important is re-exported
mod compton;
mod constants;
mod decay;
mod error;
mod gamma_stats;
mod interaction;
mod isotope;
mod material;
mod photon;
mod rayleigh;
mod scatter;

pub mod levin_mfp;

#[doc(inline)]
pub use constants::{klein_nishina_energy, ENERGY_511};

#[doc(inline)]
pub use decay::NuclearDecay;

#[doc(inline)]
pub use error::Error;

#[doc(inline)]
pub use gamma_stats::{AttenLengths, GammaStats};

#[doc(inline)]
pub use interaction::{Interaction, InteractionType, MergedEventsInfo};

#[doc(inline)]
pub use isotope::{Isotope, PositronRange};

#[doc(inline)]
pub use material::{load_materials, material_index, GammaMaterial};

#[doc(inline)]
pub use photon::{Color, Photon};
