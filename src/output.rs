use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbImage};
use log::debug;
use uuid::Uuid;

use crate::error::FaceBlurError;

/// Default URL prefix under which stored images are served.
pub const DEFAULT_URL_PREFIX: &str = "/uploads";

/// A successfully persisted output image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    /// File name within the store directory.
    pub filename: String,
    /// Absolute path of the written file.
    pub path: PathBuf,
    /// Relative URL for the transport layer.
    pub url: String,
}

/// Writes anonymized canvases to a directory as PNG files.
///
/// Each stored file gets a `result_<label>_<uuid>` name, so concurrently
/// completing requests never collide. The store signals completion exactly
/// once per call, only after the bytes are flushed and synced; on any
/// failure the partial file is removed best-effort.
#[derive(Debug, Clone)]
pub struct OutputStore {
    dir: PathBuf,
    url_prefix: String,
}

impl OutputStore {
    /// Create a store rooted at `dir`, creating the directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, FaceBlurError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            url_prefix: DEFAULT_URL_PREFIX.to_string(),
        })
    }

    /// Override the URL prefix exposed in [`StoredImage::url`]
    /// (default: `/uploads`).
    pub fn url_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.url_prefix = prefix.into();
        self
    }

    /// The directory files are written into.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Encode `canvas` as PNG and persist it under a request-unique name.
    pub fn store(&self, canvas: &RgbImage, label: &str) -> Result<StoredImage, FaceBlurError> {
        let filename = format!("result_{}_{}.png", label, Uuid::new_v4().simple());
        let path = self.dir.join(&filename);

        if let Err(e) = write_png(&path, canvas) {
            let _ = fs::remove_file(&path);
            return Err(e);
        }

        debug!(
            "stored {}x{} canvas as {}",
            canvas.width(),
            canvas.height(),
            filename
        );

        Ok(StoredImage {
            url: format!("{}/{}", self.url_prefix, filename),
            path,
            filename,
        })
    }
}

/// Scoped write: the file is created, encoded into, flushed, and synced
/// before this returns. Completion implies the bytes are durably written.
fn write_png(path: &Path, canvas: &RgbImage) -> Result<(), FaceBlurError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    PngEncoder::new(&mut writer)
        .write_image(
            canvas.as_raw(),
            canvas.width(),
            canvas.height(),
            ExtendedColorType::Rgb8,
        )
        .map_err(|e| FaceBlurError::Encode(e.to_string()))?;

    writer.flush()?;
    writer.get_ref().sync_all()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_canvas(width: u32, height: u32) -> RgbImage {
        let mut img = RgbImage::new(width, height);
        for (x, y, pixel) in img.enumerate_pixels_mut() {
            *pixel = image::Rgb([(x % 256) as u8, (y % 256) as u8, 128]);
        }
        img
    }

    #[test]
    fn store_writes_a_decodable_png() {
        let tmp = tempfile::tempdir().unwrap();
        let store = OutputStore::new(tmp.path()).unwrap();
        let canvas = make_canvas(32, 24);

        let stored = store.store(&canvas, "face").unwrap();
        assert!(stored.path.exists());

        let bytes = fs::read(&stored.path).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap().to_rgb8();
        assert_eq!(decoded.as_raw(), canvas.as_raw());
    }

    #[test]
    fn stored_url_joins_prefix_and_filename() {
        let tmp = tempfile::tempdir().unwrap();
        let store = OutputStore::new(tmp.path()).unwrap();
        let stored = store.store(&make_canvas(8, 8), "portrait").unwrap();

        assert!(stored.filename.starts_with("result_portrait_"));
        assert!(stored.filename.ends_with(".png"));
        assert_eq!(stored.url, format!("/uploads/{}", stored.filename));
    }

    #[test]
    fn custom_url_prefix() {
        let tmp = tempfile::tempdir().unwrap();
        let store = OutputStore::new(tmp.path()).unwrap().url_prefix("/media");
        let stored = store.store(&make_canvas(8, 8), "face").unwrap();
        assert!(stored.url.starts_with("/media/result_face_"));
    }

    #[test]
    fn repeated_stores_never_collide() {
        let tmp = tempfile::tempdir().unwrap();
        let store = OutputStore::new(tmp.path()).unwrap();
        let canvas = make_canvas(8, 8);

        let a = store.store(&canvas, "face").unwrap();
        let b = store.store(&canvas, "face").unwrap();
        assert_ne!(a.filename, b.filename);
        assert!(a.path.exists());
        assert!(b.path.exists());
    }

    #[test]
    fn new_creates_missing_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let nested = tmp.path().join("a/b/uploads");
        let store = OutputStore::new(&nested).unwrap();
        assert!(nested.is_dir());
        assert_eq!(store.dir(), nested.as_path());
    }
}
