//! Classifier that guesses.
//!
//! Stands in for a real recognition service. Each call returns `true` with a
//! fixed probability; a seed makes the sequence reproducible.

use super::ImageClassifier;
use image::DynamicImage;
use log::debug;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub struct FakeImageClassifier {
    cat_probability: f64,
    rng: Mutex<StdRng>,
}

impl FakeImageClassifier {
    /// `cat_probability` is clamped to `0.0..=1.0`.
    pub fn new(cat_probability: f64) -> Self {
        Self::with_rng(cat_probability, StdRng::from_entropy())
    }

    pub fn seeded(cat_probability: f64, seed: u64) -> Self {
        Self::with_rng(cat_probability, StdRng::seed_from_u64(seed))
    }

    fn with_rng(cat_probability: f64, rng: StdRng) -> Self {
        let cat_probability = if cat_probability.is_nan() {
            0.0
        } else {
            cat_probability.clamp(0.0, 1.0)
        };
        Self {
            cat_probability,
            rng: Mutex::new(rng),
        }
    }

    pub fn cat_probability(&self) -> f64 {
        self.cat_probability
    }
}

impl Default for FakeImageClassifier {
    fn default() -> Self {
        Self::new(0.5)
    }
}

impl ImageClassifier for FakeImageClassifier {
    fn image_contains_cat(&self, image: &DynamicImage, confidence_threshold: f32) -> bool {
        let verdict = self.rng.lock().gen_bool(self.cat_probability);
        debug!(
            "[Camera] {}x{} frame at {:.1}% confidence: cat={}",
            image.width(),
            image.height(),
            confidence_threshold,
            verdict
        );
        verdict
    }
}
