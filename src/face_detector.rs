use std::sync::{Arc, Mutex, OnceLock};

use image::RgbImage;
use serde::{Deserialize, Serialize};

use crate::error::FaceBlurError;

/// Bounding box of a detected face, in pixel coordinates of the source image.
///
/// Detectors report fractional coordinates; the compositor floor-truncates
/// them to integers and clips them to the image bounds before any pixel
/// access.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// X coordinate of the top-left corner (pixels).
    pub x: f64,
    /// Y coordinate of the top-left corner (pixels).
    pub y: f64,
    /// Width of the bounding box (pixels).
    pub width: f64,
    /// Height of the bounding box (pixels).
    pub height: f64,
}

/// Estimated gender of a detected face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    /// Estimated male.
    Male,
    /// Estimated female.
    Female,
    /// The detector does not regress gender, or the estimate was inconclusive.
    Unknown,
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Gender::Male => write!(f, "male"),
            Gender::Female => write!(f, "female"),
            Gender::Unknown => write!(f, "unknown"),
        }
    }
}

/// A single detected face with its derived attributes.
///
/// Produced once per detection by a [`FaceDetector`]; immutable thereafter.
#[derive(Debug, Clone)]
pub struct DetectedFace {
    /// Where the face sits in the source image.
    pub bounds: BoundingBox,
    /// Estimated age in years, >= 0.
    pub age: f64,
    /// Estimated gender.
    pub gender: Gender,
    /// Confidence of the gender estimate, in [0, 1].
    pub gender_probability: f64,
    /// Optional fixed-length identity embedding. Not consumed by the blur
    /// pipeline's output, but part of the detection contract.
    pub descriptor: Option<Vec<f32>>,
}

/// Which optional enrichment stages a detector should compute.
///
/// Replaces dynamic call-chaining (`detectAllFaces().withLandmarks()...`)
/// with one explicit configuration passed to a single detection call.
#[derive(Debug, Clone, Copy)]
pub struct DetectionOptions {
    /// Refine boxes with facial landmarks.
    pub landmarks: bool,
    /// Compute identity descriptors.
    pub descriptors: bool,
    /// Estimate age and gender.
    pub age_and_gender: bool,
}

impl Default for DetectionOptions {
    fn default() -> Self {
        Self {
            landmarks: true,
            descriptors: true,
            age_and_gender: true,
        }
    }
}

/// Pluggable face detection backend.
///
/// Implement this trait to provide a custom detector (ONNX, dlib, a remote
/// service, etc.) and pass it to [`crate::FaceAnonymizer::face_detector`].
/// The returned faces are in the detector's own order — stable for a given
/// buffer, but not sorted by position or confidence. May be empty.
pub trait FaceDetector: Send + Sync {
    /// Detect faces in an RGB image, computing the enrichments selected in
    /// `options`.
    fn detect(
        &self,
        image: &RgbImage,
        options: &DetectionOptions,
    ) -> Result<Vec<DetectedFace>, FaceBlurError>;
}

impl<T: FaceDetector + ?Sized> FaceDetector for Arc<T> {
    fn detect(
        &self,
        image: &RgbImage,
        options: &DetectionOptions,
    ) -> Result<Vec<DetectedFace>, FaceBlurError> {
        (**self).detect(image, options)
    }
}

/// Process-scoped, load-once cell for a heavyweight detector.
///
/// Model loading is expensive; it must happen at most once per process, and
/// concurrent requests arriving before it completes must await the same load
/// rather than trigger redundant ones. A failed load leaves the cell empty so
/// a later call may retry.
pub struct SharedDetector {
    cell: OnceLock<Arc<dyn FaceDetector>>,
    init: Mutex<()>,
}

impl SharedDetector {
    /// Create an empty cell. Usable in a `static`.
    pub const fn new() -> Self {
        Self {
            cell: OnceLock::new(),
            init: Mutex::new(()),
        }
    }

    /// Return the shared detector, running `load` first if no load has
    /// succeeded yet. Callers racing the first load block until it resolves.
    pub fn get_or_load<F>(&self, load: F) -> Result<Arc<dyn FaceDetector>, FaceBlurError>
    where
        F: FnOnce() -> Result<Arc<dyn FaceDetector>, FaceBlurError>,
    {
        if let Some(detector) = self.cell.get() {
            return Ok(Arc::clone(detector));
        }

        let _guard = self.init.lock().unwrap_or_else(|e| e.into_inner());
        // A racing caller may have finished loading while we waited.
        if let Some(detector) = self.cell.get() {
            return Ok(Arc::clone(detector));
        }

        let detector = load()?;
        let _ = self.cell.set(Arc::clone(&detector));
        Ok(detector)
    }

    /// The already-loaded detector, if any. Never triggers a load.
    pub fn get(&self) -> Option<Arc<dyn FaceDetector>> {
        self.cell.get().map(Arc::clone)
    }
}

impl Default for SharedDetector {
    fn default() -> Self {
        Self::new()
    }
}
