use image::{DynamicImage, ImageFormat, RgbImage};
use log::debug;

use crate::classify::{self, ImageLabeler};
use crate::compositor;
use crate::error::FaceBlurError;
use crate::face_detector::{DetectionOptions, FaceDetector};
use crate::output::OutputStore;
use crate::result::{ProcessingResult, ResultAssembler};

/// Decode input bytes into a `DynamicImage`, rejecting zero-size results.
pub(crate) fn decode_image(input: &[u8]) -> Result<DynamicImage, FaceBlurError> {
    if input.is_empty() {
        return Err(FaceBlurError::EmptyInput);
    }
    let decoded =
        image::load_from_memory(input).map_err(|e| FaceBlurError::Decode(e.to_string()))?;
    if decoded.width() == 0 || decoded.height() == 0 {
        return Err(FaceBlurError::ZeroDimensions);
    }
    Ok(decoded)
}

/// Detect the input image format from the raw bytes.
pub(crate) fn detect_format(input: &[u8]) -> Result<ImageFormat, FaceBlurError> {
    if input.is_empty() {
        return Err(FaceBlurError::EmptyInput);
    }
    image::guess_format(input).map_err(|_| FaceBlurError::UnsupportedFormat)
}

/// Full anonymization pipeline:
/// decode → detect → blur-composite → label → store → assemble.
///
/// Metadata is recorded for every detection in detector order, independent of
/// whether its region survived clipping; the stored location is merged in
/// only after the store call returns, so the result never references a
/// partially written file.
pub(crate) fn run(
    input: &[u8],
    detector: &dyn FaceDetector,
    options: &DetectionOptions,
    blur_sigma: f32,
    labeler: Option<&dyn ImageLabeler>,
    store: &OutputStore,
) -> Result<ProcessingResult, FaceBlurError> {
    let source: RgbImage = decode_image(input)?.to_rgb8();
    debug!("decoded {}x{} image", source.width(), source.height());

    let faces = detector.detect(&source, options)?;
    debug!("detected {} face(s)", faces.len());

    let canvas = compositor::blur_faces(&source, &faces, blur_sigma);

    let mut assembler = ResultAssembler::new();
    for face in &faces {
        assembler.record(face);
    }

    let label = classify::resolve_label(labeler, input);
    let stored = store.store(&canvas, &label)?;

    Ok(assembler.finish(stored.url))
}
