//! Result and Error types for gray-physics

/// Type alias for Result<T, physics::Error>
pub type Result<T> = core::result::Result<T, Error>;

/// The error type for the `gray-physics` crate
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("failed input/output stream")]
    IOError(#[from] std::io::Error),

    #[error("malformed material file")]
    MalformedMaterialFile(#[from] serde_json::Error),

    #[error("material \"{material}\" table \"{table}\" length {found} does not match energy grid length {expected}")]
    InconsistentTableLength {
        material: String,
        table: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("material \"{0}\" needs at least two energy grid points")]
    TableTooShort(String),

    #[error("material \"{0}\" energy grid is not strictly increasing")]
    NonMonotonicEnergy(String),

    #[error("material \"{0}\" has a negative cross section")]
    NegativeCrossSection(String),

    #[error("material \"{0}\" not found")]
    UnknownMaterial(String),
}
