//! Result and Error types for gray-daq

/// Type alias for Result<T, daq::Error>
pub type Result<T> = core::result::Result<T, Error>;

/// The error type for the `gray-daq` crate
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("unknown pipeline stage \"{0}\"")]
    UnknownStage(String),

    #[error("unknown detector mapping \"{0}\"")]
    UnknownMapping(String),

    #[error("bad parameters for stage \"{stage}\": {reason}")]
    BadStageParameter { stage: String, reason: String },
}
