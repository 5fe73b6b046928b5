//! Text recognition on corrected images.
//!
//! A [`TextRecognizer`] returns ordered text fragments with their regions
//! and confidences. [`RecognitionClient`] keeps only the text.

mod client;
mod tesseract;

use std::path::Path;

use thiserror::Error;

pub use client::RecognitionClient;
pub use tesseract::TesseractRecognizer;

/// Errors from recognition backends.
#[derive(Debug, Error)]
pub enum RecognitionError {
    #[error("Backend not available: {0}")]
    BackendNotAvailable(String),

    #[error("Recognition failed: {0}")]
    Failed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Axis-aligned box around a fragment, in image pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BoundingRegion {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingRegion {
    /// Smallest region covering both.
    pub fn union(&self, other: &BoundingRegion) -> BoundingRegion {
        let left = self.left.min(other.left);
        let top = self.top.min(other.top);
        let right = self
            .left
            .saturating_add(self.width)
            .max(other.left.saturating_add(other.width));
        let bottom = self
            .top
            .saturating_add(self.height)
            .max(other.top.saturating_add(other.height));
        BoundingRegion {
            left,
            top,
            width: right - left,
            height: bottom - top,
        }
    }
}

/// One piece of recognized text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextFragment {
    pub region: BoundingRegion,
    pub text: String,
    /// Confidence score (0.0 - 1.0).
    pub confidence: f32,
}

impl TextFragment {
    pub fn new(region: BoundingRegion, text: impl Into<String>, confidence: f32) -> Self {
        Self {
            region,
            text: text.into(),
            confidence,
        }
    }
}

/// Trait for recognition backends.
pub trait TextRecognizer: Send + Sync {
    /// Backend name, for logs and `check` output.
    fn name(&self) -> &str;

    /// Check if this backend is available (dependencies installed, models present).
    fn is_available(&self) -> bool;

    /// Get a description of what's needed to make this backend available.
    fn availability_hint(&self) -> String;

    /// Recognize text in an image, in reading order.
    fn recognize(&self, image_path: &Path) -> Result<Vec<TextFragment>, RecognitionError>;
}
