//! Result and Error types for gray-sources

/// Type alias for Result<T, sources::Error>
pub type Result<T> = core::result::Result<T, Error>;

/// The error type for the `gray-sources` crate
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("failed input/output stream")]
    IOError(#[from] std::io::Error),

    #[error("scene error")]
    SceneError(#[from] gray_scene::Error),

    #[error("failed to parse isotope table line {line}: \"{content}\"")]
    IsotopeParse { line: usize, content: String },

    #[error("isotope \"{0}\" is not in the loaded table")]
    UnknownIsotope(String),

    #[error("failed to parse voxel source file: {0}")]
    VoxelParse(String),

    #[error("voxel source has no positive activity")]
    EmptyVoxelSource,

    #[error("beam point sources require a beam isotope")]
    BeamPointNeedsBeam,

    #[error("negative sources cannot use annulus shapes")]
    NegativeAnnulus,

    #[error("source has a non-finite extent")]
    NonFiniteExtent,
}
