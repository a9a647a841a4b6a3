//! Vector, rigid-map, and bounding-box primitives
//!
//! Thin geometry layer shared by every other crate in the workspace. The
//! vector type is a plain [nalgebra] alias so all the usual arithmetic is
//! available, while [RigidMap] and [Aabb] carry the small amount of
//! domain-specific behavior the transport and source-sampling code needs.

// Split into subfiles for development, but anything important is re-exported
mod aabb;
mod rigid;

#[doc(inline)]
pub use aabb::Aabb;

#[doc(inline)]
pub use rigid::{ref_axis_plus_trans_to_map, ref_vec_to_map, RigidMap};

/// 3-component double-precision vector used throughout the simulator
pub type Vec3 = nalgebra::Vector3<f64>;
