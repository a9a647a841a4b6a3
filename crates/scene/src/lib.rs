//! Scene geometry, KD-tree acceleration, and detector layout
//!
//! A [SceneDescription] is the immutable world the transport engine traces
//! through: primitives tagged with materials and detector ids, an
//! acceleration tree built once, and the [DetectorArray] that downstream
//! electronics stages key their id mappings off.

// Split into subfiles for development, but anything important is re-exported
mod detector;
mod error;
mod kdtree;
mod primitive;
mod scene;

#[doc(inline)]
pub use detector::{Detector, DetectorArray};

#[doc(inline)]
pub use error::Error;

#[doc(inline)]
pub use kdtree::IntersectKdTree;

#[doc(inline)]
pub use primitive::{Hit, Primitive, Shape, VisiblePoint};

#[doc(inline)]
pub use scene::SceneDescription;
