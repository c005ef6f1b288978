use log::warn;

use crate::error::FaceBlurError;

/// Label used when no classifier is configured or classification fails.
pub const DEFAULT_LABEL: &str = "face";

/// External image classification service, used only to derive a descriptive
/// label for the output filename.
///
/// The call is a network round trip in practice; its failure must never
/// corrupt the main pipeline, so the pipeline degrades to [`DEFAULT_LABEL`]
/// instead of aborting.
pub trait ImageLabeler: Send + Sync {
    /// Return a single descriptive label for the raw image bytes.
    fn label(&self, image_bytes: &[u8]) -> Result<String, FaceBlurError>;
}

/// Resolve the filename label: classify if a labeler is configured, sanitize
/// the answer, and fall back to [`DEFAULT_LABEL`] on failure or on a label
/// that sanitizes to nothing.
pub(crate) fn resolve_label(labeler: Option<&dyn ImageLabeler>, image_bytes: &[u8]) -> String {
    let Some(labeler) = labeler else {
        return DEFAULT_LABEL.to_string();
    };

    match labeler.label(image_bytes) {
        Ok(raw) => {
            let label = sanitize_label(&raw);
            if label.is_empty() {
                warn!("classification label {raw:?} sanitized to nothing, using default");
                DEFAULT_LABEL.to_string()
            } else {
                label
            }
        }
        Err(e) => {
            warn!("classification failed ({e}), using default label");
            DEFAULT_LABEL.to_string()
        }
    }
}

/// Reduce an arbitrary label to a filename-safe `[a-z0-9-]` slug, capped at
/// 32 characters. Runs of other characters collapse to a single dash.
fn sanitize_label(raw: &str) -> String {
    let mut out = String::new();
    let mut last_was_dash = true; // suppress a leading dash
    for c in raw.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_alphanumeric() {
            out.push(c);
            last_was_dash = false;
        } else if !last_was_dash {
            out.push('-');
            last_was_dash = true;
        }
        if out.len() >= 32 {
            break;
        }
    }
    out.trim_end_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(&'static str);

    impl ImageLabeler for Fixed {
        fn label(&self, _image_bytes: &[u8]) -> Result<String, FaceBlurError> {
            Ok(self.0.to_string())
        }
    }

    struct Failing;

    impl ImageLabeler for Failing {
        fn label(&self, _image_bytes: &[u8]) -> Result<String, FaceBlurError> {
            Err(FaceBlurError::ExternalService("connection refused".into()))
        }
    }

    #[test]
    fn no_labeler_uses_default() {
        assert_eq!(resolve_label(None, b"img"), DEFAULT_LABEL);
    }

    #[test]
    fn labeler_failure_degrades_to_default() {
        assert_eq!(resolve_label(Some(&Failing), b"img"), DEFAULT_LABEL);
    }

    #[test]
    fn label_is_lowercased_and_slugged() {
        assert_eq!(resolve_label(Some(&Fixed("Golden Retriever")), b"img"), "golden-retriever");
        assert_eq!(resolve_label(Some(&Fixed("  café au lait! ")), b"img"), "caf-au-lait");
    }

    #[test]
    fn unusable_label_degrades_to_default() {
        assert_eq!(resolve_label(Some(&Fixed("???!!!")), b"img"), DEFAULT_LABEL);
        assert_eq!(resolve_label(Some(&Fixed("")), b"img"), DEFAULT_LABEL);
    }

    #[test]
    fn long_labels_are_capped() {
        let long = "a".repeat(100);
        let label = resolve_label(Some(&Fixed(Box::leak(long.into_boxed_str()))), b"img");
        assert!(label.len() <= 32);
    }
}
