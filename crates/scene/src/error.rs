//! Result and Error types for gray-scene

/// Type alias for Result<T, scene::Error>
pub type Result<T> = core::result::Result<T, Error>;

/// The error type for the `gray-scene` crate
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("failed input/output stream")]
    IOError(#[from] std::io::Error),

    #[error("scene has no primitives to build a tree over")]
    EmptyScene,

    #[error("primitive {0} has a non-finite extent")]
    NonFiniteExtent(usize),

    #[error("material id {0} is not in the scene material table")]
    UnknownMaterial(i32),
}
