//! Camera image classification.
//!
//! The security service only needs a yes/no answer to "is there a cat in this
//! frame?". How that answer is produced is up to the [`ImageClassifier`].

pub mod fake;

pub use fake::FakeImageClassifier;

use crate::error::Result;
use image::DynamicImage;
use std::path::Path;

/// Confidence threshold the security service passes with every frame.
pub const CAT_CONFIDENCE_THRESHOLD: f32 = 50.0;

/// Decides whether an image contains a cat.
///
/// Calls block until a verdict is available. Implementations must not keep
/// per-frame state that changes later verdicts for the same input.
pub trait ImageClassifier: Send + Sync {
    /// `confidence_threshold` is a percentage in `0.0..=100.0`.
    fn image_contains_cat(&self, image: &DynamicImage, confidence_threshold: f32) -> bool;
}

/// Decode a camera frame from disk.
pub fn load_image(path: impl AsRef<Path>) -> Result<DynamicImage> {
    Ok(image::open(path)?)
}

/// Empty frame of the given size, used when no camera is attached.
pub fn blank_frame(width: u32, height: u32) -> DynamicImage {
    DynamicImage::new_rgb8(width, height)
}
