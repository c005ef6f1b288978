use thiserror::Error;

#[derive(Debug, Error)]
pub enum FaceBlurError {
    #[error("no image data supplied")]
    EmptyInput,

    #[error("failed to decode image: {0}")]
    Decode(String),

    #[error("unsupported image format")]
    UnsupportedFormat,

    #[error("image dimensions are zero")]
    ZeroDimensions,

    #[error("face detection failed: {0}")]
    Detection(String),

    /// A single face region could not be extracted or blurred. Contained by
    /// the compositor; never surfaces from the public API.
    #[error("face region processing failed: {0}")]
    Region(String),

    #[error("failed to encode output image: {0}")]
    Encode(String),

    #[error("failed to write output image: {0}")]
    Store(#[from] std::io::Error),

    #[error("external classification failed: {0}")]
    ExternalService(String),

    #[error("blur sigma must be > 0.0, got {0}")]
    InvalidBlurSigma(f32),
}
