//! Common utility for extended `std` types
//!
//! These are left public for convenience.
//!
//! For example, the fixed-width scientific formatting is what keeps the
//! ASCII output columns aligned everywhere a record is written.

// Alias for the format! macro
pub use std::format as f;

// Modules
mod sort_ext;
mod value_ext;

// Flatten
pub use sort_ext::SortExt;
pub use value_ext::ValueExt;
