//! Privacy-preserving face anonymization: detect faces in a photo, blur each
//! face region in place, and report per-face age and gender estimates.
//!
//! # Example
//!
//! ```no_run
//! use faceblur::{FaceAnonymizer, OutputStore};
//! # use faceblur::{DetectedFace, DetectionOptions, FaceDetector, FaceBlurError};
//! # use image::RgbImage;
//! # struct MyDetector;
//! # impl FaceDetector for MyDetector {
//! #     fn detect(&self, _: &RgbImage, _: &DetectionOptions)
//! #         -> Result<Vec<DetectedFace>, FaceBlurError> { Ok(vec![]) }
//! # }
//!
//! let raw_bytes = std::fs::read("photo.jpg").unwrap();
//! let store = OutputStore::new("./uploads").unwrap();
//! let result = FaceAnonymizer::new(raw_bytes)
//!     .unwrap()
//!     .face_detector(Box::new(MyDetector))
//!     .anonymize(&store)
//!     .unwrap();
//! println!("blurred image at {}", result.image_url);
//! ```
#![warn(missing_docs)]

/// External classification trait used to derive output filenames.
pub mod classify;
/// Region extraction, blurring, and compositing.
pub mod compositor;
mod error;
/// Face detection traits and data types.
pub mod face_detector;
/// PNG encoding and collision-free persistence of output canvases.
pub mod output;
mod pipeline;
mod result;
#[cfg(feature = "rustface")]
/// Built-in SeetaFace-based face detector backend.
pub mod rustface_backend;

/// Default filename label and classification seam.
pub use classify::{ImageLabeler, DEFAULT_LABEL};
/// Blur compositor entry point and its tuning constants.
pub use compositor::{blur_faces, BLUR_SIGMA_BATCH, BLUR_SIGMA_INTERACTIVE};
/// Error type returned by faceblur operations.
pub use error::FaceBlurError;
/// Face detection trait, face record, and the load-once detector cell.
pub use face_detector::{
    BoundingBox, DetectedFace, DetectionOptions, FaceDetector, Gender, SharedDetector,
};
/// Output persistence types.
pub use output::{OutputStore, StoredImage, DEFAULT_URL_PREFIX};
/// Final per-request payload and its assembler.
pub use result::{ProcessingResult, ResultAssembler};
#[cfg(feature = "rustface")]
/// Built-in detector that loads a SeetaFace model from disk.
pub use rustface_backend::RustfaceDetector;

/// Builder for anonymizing a single uploaded photo.
///
/// Validates the input bytes on construction, then runs
/// decode → detect → blur-composite → store with configurable parameters.
/// One instance corresponds to one request; it owns its buffers exclusively
/// and shares nothing mutable with concurrent requests.
pub struct FaceAnonymizer {
    input: Vec<u8>,
    blur_sigma: f32,
    options: DetectionOptions,
    detector: Option<Box<dyn FaceDetector>>,
    labeler: Option<Box<dyn ImageLabeler>>,
}

impl FaceAnonymizer {
    /// Create a new anonymizer from raw image bytes (JPEG, PNG, or WebP).
    ///
    /// Fails with [`FaceBlurError::EmptyInput`] on an empty buffer and
    /// [`FaceBlurError::UnsupportedFormat`] on bytes no decoder recognizes,
    /// before any decode or detection work runs.
    pub fn new(input: Vec<u8>) -> Result<Self, FaceBlurError> {
        pipeline::detect_format(&input)?;

        Ok(Self {
            input,
            blur_sigma: BLUR_SIGMA_BATCH,
            options: DetectionOptions::default(),
            detector: None,
            labeler: None,
        })
    }

    /// Set the gaussian blur strength (default: [`BLUR_SIGMA_BATCH`]).
    ///
    /// [`BLUR_SIGMA_INTERACTIVE`] is the stronger setting used by the
    /// interactive preview path.
    pub fn blur_sigma(mut self, sigma: f32) -> Self {
        self.blur_sigma = sigma;
        self
    }

    /// Select which detection enrichments to compute
    /// (default: all of landmarks, descriptors, age and gender).
    pub fn detection_options(mut self, options: DetectionOptions) -> Self {
        self.options = options;
        self
    }

    /// Provide the face detector implementation.
    ///
    /// Share one heavyweight detector across requests via [`SharedDetector`]
    /// and pass `Box::new(handle)` here — `Arc<dyn FaceDetector>` itself
    /// implements [`FaceDetector`].
    pub fn face_detector(mut self, detector: Box<dyn FaceDetector>) -> Self {
        self.detector = Some(detector);
        self
    }

    /// Provide an external classifier used to derive the output filename.
    /// Its failure degrades to [`DEFAULT_LABEL`] rather than failing the
    /// request.
    pub fn labeler(mut self, labeler: Box<dyn ImageLabeler>) -> Self {
        self.labeler = Some(labeler);
        self
    }

    /// Run the pipeline and persist the anonymized image into `store`.
    ///
    /// Returns only after the output file is durably written; the returned
    /// [`ProcessingResult::image_url`] always references a complete file.
    pub fn anonymize(self, store: &OutputStore) -> Result<ProcessingResult, FaceBlurError> {
        if self.blur_sigma.is_nan() || self.blur_sigma <= 0.0 {
            return Err(FaceBlurError::InvalidBlurSigma(self.blur_sigma));
        }

        let Some(detector) = self.detector.as_deref() else {
            return Err(FaceBlurError::Detection(
                "no face detector configured".into(),
            ));
        };

        pipeline::run(
            &self.input,
            detector,
            &self.options,
            self.blur_sigma,
            self.labeler.as_deref(),
            store,
        )
    }
}
