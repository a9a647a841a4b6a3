//! Result and Error types for gray-output

/// Type alias for Result<T, output::Error>
pub type Result<T> = core::result::Result<T, Error>;

/// The error type for the `gray-output` crate
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("failed input/output stream")]
    IOError(#[from] std::io::Error),

    #[error("bad file magic (expected \"GRAY\")")]
    BadMagic,

    #[error("unsupported variable-format version {0}")]
    UnsupportedVersion(u32),

    #[error("malformed record: {0}")]
    MalformedRecord(String),

    #[error("cannot combine zero files")]
    NothingToCombine,
}
