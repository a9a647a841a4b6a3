//! Emission sources and the decay scheduler
//!
//! Source shapes sample decay positions, the [SourceList] decides when each
//! source fires next, and negative sources carve activity out of the
//! positive ones by rejection. The scheduler also owns the equal-photon
//! time-splitting used to hand a simulation out to parallel ranks.

// Split into subfiles for development, but anything important is re-exported
mod error;
mod shape;
mod source;
mod source_list;
mod vector;
mod voxel;

pub mod isotopes;

#[doc(inline)]
pub use error::Error;

#[doc(inline)]
pub use shape::SourceShape;

#[doc(inline)]
pub use source::Source;

#[doc(inline)]
pub use source_list::{SourceList, MAX_REJECT_COUNTER, MICRO_CURIE};

#[doc(inline)]
pub use vector::VectorShape;

#[doc(inline)]
pub use voxel::VoxelGrid;
