use thiserror::Error;

/// Library error type for collage builds.
#[derive(Debug, Error)]
pub enum Error {
    /// The requested style name is not present in the style catalog.
    #[error("unknown style '{0}'")]
    UnknownStyle(String),

    /// A build was requested with zero source images.
    #[error("no images supplied for collage")]
    NoImages,

    /// A layout template failed validation when the catalog was built.
    #[error("invalid template '{name}': {reason}")]
    InvalidTemplate { name: String, reason: String },

    /// A style table entry failed validation.
    #[error("invalid style '{name}': {reason}")]
    InvalidStyle { name: String, reason: String },

    /// The configured image directory is missing or not a directory.
    #[error("invalid image directory: {0}")]
    BadDir(String),

    /// Resampling a source image failed.
    #[error("resize failed: {0}")]
    Resize(String),

    /// Underlying IO error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// YAML/serde configuration error.
    #[error(transparent)]
    Config(#[from] serde_yaml::Error),

    /// Image encode/decode error.
    #[error(transparent)]
    Image(#[from] image::ImageError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
