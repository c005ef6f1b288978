use image::{imageops, RgbImage};
use log::{debug, warn};

use crate::error::FaceBlurError;
use crate::face_detector::{BoundingBox, DetectedFace};

/// Blur strength for the batch (stored upload) path.
pub const BLUR_SIGMA_BATCH: f32 = 7.0;

/// Blur strength for the interactive (in-memory preview) path.
pub const BLUR_SIGMA_INTERACTIVE: f32 = 10.0;

/// A bounding box after floor truncation and clipping, guaranteed to lie
/// inside the source image with non-zero area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ClippedRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Floor-truncate a fractional bounding box and clip it to
/// `[0, image_width) × [0, image_height)`.
///
/// Truncation is always floor, never rounding, so the extracted pixel region
/// is reproducible. Returns `None` when the clipped box has zero area —
/// such a box is skipped for compositing (its metadata is still emitted by
/// the result assembler, which never consults the clip outcome).
pub(crate) fn clip_region(
    bounds: &BoundingBox,
    image_width: u32,
    image_height: u32,
) -> Option<ClippedRegion> {
    let left = bounds.x.floor() as i64;
    let top = bounds.y.floor() as i64;
    let width = bounds.width.floor() as i64;
    let height = bounds.height.floor() as i64;

    let x0 = left.max(0);
    let y0 = top.max(0);
    let x1 = (left + width).min(i64::from(image_width));
    let y1 = (top + height).min(i64::from(image_height));

    if x1 <= x0 || y1 <= y0 {
        return None;
    }

    Some(ClippedRegion {
        x: x0 as u32,
        y: y0 as u32,
        width: (x1 - x0) as u32,
        height: (y1 - y0) as u32,
    })
}

/// Blur one clipped region of `source` and draw it onto `canvas` at the same
/// offset. The region is always extracted from `source`, never from the
/// progressively mutated canvas, so overlapping boxes do not compound blur.
fn blur_one(
    source: &RgbImage,
    canvas: &mut RgbImage,
    region: ClippedRegion,
    sigma: f32,
) -> Result<(), FaceBlurError> {
    if region.x + region.width > source.width() || region.y + region.height > source.height() {
        return Err(FaceBlurError::Region(format!(
            "region {}x{}+{}+{} exceeds {}x{} source",
            region.width,
            region.height,
            region.x,
            region.y,
            source.width(),
            source.height()
        )));
    }

    let extracted =
        imageops::crop_imm(source, region.x, region.y, region.width, region.height).to_image();
    let blurred = imageops::blur(&extracted, sigma);
    imageops::replace(canvas, &blurred, i64::from(region.x), i64::from(region.y));
    Ok(())
}

/// Replace every valid face region of `source` with a blurred version of
/// itself, in detection order.
///
/// Pixels outside every bounding box remain identical to the source. A box
/// that clips to zero area, or a region whose processing fails, is skipped
/// without aborting the rest.
pub fn blur_faces(source: &RgbImage, faces: &[DetectedFace], sigma: f32) -> RgbImage {
    let mut canvas = source.clone();

    for (index, face) in faces.iter().enumerate() {
        let Some(region) = clip_region(&face.bounds, source.width(), source.height()) else {
            debug!("face {index}: bounding box clips to zero area, skipping composite");
            continue;
        };
        if let Err(e) = blur_one(source, &mut canvas, region, sigma) {
            warn!("face {index}: {e}; leaving region unblurred");
        }
    }

    canvas
}
