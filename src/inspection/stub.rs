use std::path::Path;

use image::ImageReader;

use crate::engine::random::RandomSource;
use crate::error::AppError;
use crate::inspection::{ensure_large_enough, Classifier};
use crate::models::inspection::{Inspection, Label, Verdict};

/// Placeholder classifier: decodes the photo, then scores each head from
/// random logits. The verdicts carry no signal about the picture.
#[derive(Debug, Default, Clone, Copy)]
pub struct StubClassifier;

impl Classifier for StubClassifier {
    fn classify(
        &self,
        image: &Path,
        random: &mut dyn RandomSource,
    ) -> Result<Inspection, AppError> {
        let decoded = ImageReader::open(image)
            .and_then(|reader| reader.with_guessed_format())
            .map_err(|err| AppError::UnreadableImage(err.to_string()))?
            .decode()
            .map_err(|err| AppError::UnreadableImage(err.to_string()))?;

        ensure_large_enough(decoded.width(), decoded.height())?;

        Ok(Inspection {
            cleanliness: random_head(random),
            damage: random_head(random),
        })
    }
}

fn random_head<L: Label>(random: &mut dyn RandomSource) -> Verdict<L> {
    let probs = softmax([random.standard_normal(), random.standard_normal()]);
    let winner = if probs[1] > probs[0] { 1 } else { 0 };

    Verdict {
        label: L::CLASSES[winner],
        confidence: probs[winner],
    }
}

fn softmax(logits: [f64; 2]) -> [f64; 2] {
    let max = logits[0].max(logits[1]);
    let exps = logits.map(|logit| (logit - max).exp());
    let sum = exps[0] + exps[1];
    exps.map(|e| e / sum)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;
    use crate::engine::random::testing::ScriptedRandom;
    use crate::engine::random::StdRandom;
    use crate::inspection::testing::write_png;
    use crate::models::inspection::{Cleanliness, Damage};

    #[test]
    fn winning_softmax_component_becomes_the_verdict() {
        let dir = TempDir::new().unwrap();
        let path = write_png(&dir, 320, 240);
        let mut random = ScriptedRandom::with_normals(&[2.0, 0.0, 0.0, 1.0]);

        let inspection = StubClassifier.classify(&path, &mut random).unwrap();

        assert_eq!(inspection.cleanliness.label, Cleanliness::Clean);
        assert!((inspection.cleanliness.confidence - 0.880797).abs() < 1e-6);
        assert_eq!(inspection.damage.label, Damage::Damaged);
        assert!((inspection.damage.confidence - 0.731059).abs() < 1e-6);
        assert_eq!(random.draws, 4);
    }

    #[test]
    fn tied_logits_pick_the_first_class() {
        let dir = TempDir::new().unwrap();
        let path = write_png(&dir, 120, 120);
        let mut random = ScriptedRandom::with_normals(&[0.3, 0.3, -1.0, -1.0]);

        let inspection = StubClassifier.classify(&path, &mut random).unwrap();

        assert_eq!(inspection.cleanliness.label, Cleanliness::Clean);
        assert_eq!(inspection.cleanliness.confidence, 0.5);
        assert_eq!(inspection.damage.label, Damage::Intact);
    }

    #[test]
    fn confidence_is_always_a_majority_probability() {
        let dir = TempDir::new().unwrap();
        let path = write_png(&dir, 128, 128);
        let mut random = StdRandom::from_seed(11);

        for _ in 0..200 {
            let inspection = StubClassifier.classify(&path, &mut random).unwrap();
            for confidence in [inspection.cleanliness.confidence, inspection.damage.confidence] {
                assert!((0.5..=1.0).contains(&confidence));
            }
        }
    }

    #[test]
    fn rejects_undecodable_and_undersized_images() {
        let dir = TempDir::new().unwrap();
        let garbage = dir.path().join("car.png");
        fs::write(&garbage, b"\x89PNG but not really").unwrap();
        let mut random = ScriptedRandom::default();

        assert!(matches!(
            StubClassifier.classify(&garbage, &mut random),
            Err(AppError::UnreadableImage(_))
        ));

        let small = write_png(&dir, 64, 300);
        assert!(matches!(
            StubClassifier.classify(&small, &mut random),
            Err(AppError::ImageTooSmall { width: 64, height: 300 })
        ));
        assert_eq!(random.draws, 0);
    }

    #[test]
    fn softmax_sums_to_one() {
        let probs = softmax([3.5, -1.25]);
        assert!((probs[0] + probs[1] - 1.0).abs() < 1e-12);
        assert!(probs[0] > probs[1]);
    }
}
