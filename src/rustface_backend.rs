use std::path::Path;

use image::RgbImage;

use crate::error::FaceBlurError;
use crate::face_detector::{
    BoundingBox, DetectedFace, DetectionOptions, FaceDetector, Gender,
};

/// Face detector backed by the `rustface` crate (SeetaFace engine).
///
/// The model is read from disk once at construction and reused for every
/// detection; pair with [`crate::SharedDetector`] to share one instance
/// across concurrent requests. SeetaFace regresses bounding boxes only, so
/// every face comes back with `Gender::Unknown` and an age of zero.
pub struct RustfaceDetector {
    model: rustface::Model,
}

impl RustfaceDetector {
    /// Load a SeetaFace frontal-face model (e.g. `seeta_fd_frontal_v1.0.bin`)
    /// from `path`.
    pub fn from_model_path(path: impl AsRef<Path>) -> Result<Self, FaceBlurError> {
        let data = std::fs::read(path.as_ref())
            .map_err(|e| FaceBlurError::Detection(format!("failed to read model: {e}")))?;
        let model = rustface::read_model(std::io::Cursor::new(data))
            .map_err(|e| FaceBlurError::Detection(format!("failed to load model: {e}")))?;
        Ok(Self { model })
    }
}

impl FaceDetector for RustfaceDetector {
    fn detect(
        &self,
        image: &RgbImage,
        _options: &DetectionOptions,
    ) -> Result<Vec<DetectedFace>, FaceBlurError> {
        let gray = image::imageops::grayscale(image);
        let (width, height) = (gray.width(), gray.height());

        let mut detector = rustface::create_detector_with_model(self.model.clone());
        detector.set_min_face_size(20);
        detector.set_score_thresh(2.0);
        detector.set_pyramid_scale_factor(0.8);
        detector.set_slide_window_step(4, 4);

        let faces = detector.detect(&rustface::ImageData::new(gray.as_raw(), width, height));

        Ok(faces
            .iter()
            .map(|face| {
                let bbox = face.bbox();
                DetectedFace {
                    bounds: BoundingBox {
                        x: bbox.x() as f64,
                        y: bbox.y() as f64,
                        width: bbox.width() as f64,
                        height: bbox.height() as f64,
                    },
                    age: 0.0,
                    gender: Gender::Unknown,
                    gender_probability: 0.0,
                    descriptor: None,
                }
            })
            .collect())
    }
}
