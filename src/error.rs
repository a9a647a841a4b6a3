//! Result and Error types for the gray driver

/// Type alias for Result<T, gray::Error>
pub type Result<T> = core::result::Result<T, Error>;

/// The error type for the `gray` driver crate
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("failed input/output stream")]
    IOError(#[from] std::io::Error),

    #[error("physics data error")]
    Physics(#[from] gray_physics::Error),

    #[error("scene error")]
    Scene(#[from] gray_scene::Error),

    #[error("source error")]
    Sources(#[from] gray_sources::Error),

    #[error("daq pipeline error")]
    Daq(#[from] gray_daq::Error),

    #[error("output error")]
    Output(#[from] gray_output::Error),

    #[error("malformed scene description")]
    SceneFile(#[from] serde_json::Error),

    #[error("data file \"{0}\" not found on the search path")]
    FileNotFound(String),

    #[error("configuration error: {0}")]
    Config(String),
}
