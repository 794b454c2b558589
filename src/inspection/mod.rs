pub mod stub;

use std::path::Path;

use image::ImageReader;
use tracing::warn;

use crate::engine::random::RandomSource;
use crate::error::AppError;
use crate::models::inspection::Inspection;

/// Minimum width and height, in pixels, an image needs to be analyzed.
pub const MIN_IMAGE_SIDE: u32 = 100;

/// Car photo classifier. Implementations must not keep state between calls.
pub trait Classifier: Send + Sync {
    fn classify(
        &self,
        image: &Path,
        random: &mut dyn RandomSource,
    ) -> Result<Inspection, AppError>;
}

/// Reads the image header and returns `(width, height)`.
pub fn image_dimensions(image: &Path) -> Result<(u32, u32), AppError> {
    ImageReader::open(image)
        .and_then(|reader| reader.with_guessed_format())
        .map_err(|err| AppError::UnreadableImage(err.to_string()))?
        .into_dimensions()
        .map_err(|err| AppError::UnreadableImage(err.to_string()))
}

pub fn ensure_large_enough(width: u32, height: u32) -> Result<(), AppError> {
    if width < MIN_IMAGE_SIDE || height < MIN_IMAGE_SIDE {
        return Err(AppError::ImageTooSmall { width, height });
    }
    Ok(())
}

/// Validates the image and runs the classifier on it.
///
/// Unreadable or undersized images are rejected before the classifier is
/// invoked. Anything the classifier itself fails with is reported as a
/// generic analysis failure.
pub fn inspect(
    image: &Path,
    classifier: &dyn Classifier,
    random: &mut dyn RandomSource,
) -> Result<Inspection, AppError> {
    let (width, height) = image_dimensions(image)?;
    ensure_large_enough(width, height)?;

    classifier.classify(image, random).map_err(|err| {
        warn!(error = %err, "classifier failed");
        match err {
            AppError::AnalysisFailed(_) => err,
            other => AppError::AnalysisFailed(other.to_string()),
        }
    })
}


#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::testing::{dirty_intact, write_png, CountingClassifier};
    use super::*;
    use crate::engine::random::testing::ScriptedRandom;

    #[test]
    fn undersized_image_never_reaches_classifier() {
        let dir = TempDir::new().unwrap();
        let classifier = CountingClassifier::default();
        let mut random = ScriptedRandom::default();

        for (width, height) in [(99, 400), (400, 99), (10, 10)] {
            let path = write_png(&dir, width, height);
            let err = inspect(&path, &classifier, &mut random).unwrap_err();
            assert!(matches!(err, AppError::ImageTooSmall { width: w, height: h } if w == width && h == height));
        }

        assert_eq!(classifier.calls(), 0);
        assert_eq!(random.draws, 0);
    }

    #[test]
    fn exact_minimum_is_accepted() {
        let dir = TempDir::new().unwrap();
        let path = write_png(&dir, MIN_IMAGE_SIDE, MIN_IMAGE_SIDE);
        let classifier = CountingClassifier::default();

        let inspection = inspect(&path, &classifier, &mut ScriptedRandom::default()).unwrap();

        assert_eq!(inspection, dirty_intact());
        assert_eq!(classifier.calls(), 1);
    }

    #[test]
    fn garbage_bytes_are_unreadable() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("car.jpg");
        fs::write(&path, b"definitely not an image").unwrap();
        let classifier = CountingClassifier::default();

        let err = inspect(&path, &classifier, &mut ScriptedRandom::default()).unwrap_err();

        assert!(matches!(err, AppError::UnreadableImage(_)));
        assert_eq!(classifier.calls(), 0);
    }

    #[test]
    fn classifier_errors_become_analysis_failures() {
        let dir = TempDir::new().unwrap();
        let path = write_png(&dir, 200, 150);
        let classifier = CountingClassifier {
            fail: true,
            ..CountingClassifier::default()
        };

        let err = inspect(&path, &classifier, &mut ScriptedRandom::default()).unwrap_err();

        assert!(matches!(err, AppError::AnalysisFailed(_)));
    }
}
