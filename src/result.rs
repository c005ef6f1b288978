use serde::{Deserialize, Serialize};

use crate::face_detector::{DetectedFace, Gender};

/// Per-face metadata plus the stored output location, in the shape the
/// transport layer serializes to JSON.
///
/// All four arrays are index-aligned and follow the detector's emitted face
/// order. `image_url` is populated if and only if output encoding completed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingResult {
    /// Estimated age per face, rounded to whole years.
    pub age: Vec<u32>,
    /// Estimated gender per face.
    pub gender: Vec<Gender>,
    /// Estimated age per face, rounded to two decimal places.
    pub age_probabilities: Vec<f64>,
    /// Gender confidence per face as a whole percentage, 0–100.
    pub gender_probabilities: Vec<u8>,
    /// Relative URL of the anonymized output image.
    pub image_url: String,
}

/// Accumulates per-face metadata in detection order, then merges in the
/// stored output location.
///
/// Recording is independent of compositing: a face whose clipped box has
/// zero area still contributes an entry.
#[derive(Debug, Default)]
pub struct ResultAssembler {
    result: ProcessingResult,
}

impl ResultAssembler {
    /// Start with empty arrays and no output location.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one face's metadata.
    pub fn record(&mut self, face: &DetectedFace) {
        self.result.age.push(face.age.round() as u32);
        self.result.gender.push(face.gender);
        self.result
            .age_probabilities
            .push((face.age * 100.0).round() / 100.0);
        self.result
            .gender_probabilities
            .push((face.gender_probability * 100.0).round() as u8);
    }

    /// Number of faces recorded so far.
    pub fn len(&self) -> usize {
        self.result.age.len()
    }

    /// Whether no faces were recorded.
    pub fn is_empty(&self) -> bool {
        self.result.age.is_empty()
    }

    /// Finalize with the resolved output location. Call only after the
    /// output encoder signaled completion.
    pub fn finish(mut self, image_url: String) -> ProcessingResult {
        self.result.image_url = image_url;
        self.result
    }
}
