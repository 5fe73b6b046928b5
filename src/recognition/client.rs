//! Normalizes recognizer output into the document's text.

use std::path::Path;

use super::{RecognitionError, TextRecognizer};

/// Calls a recognizer once per image and joins its fragments.
pub struct RecognitionClient {
    recognizer: Box<dyn TextRecognizer>,
}

impl RecognitionClient {
    pub fn new(recognizer: Box<dyn TextRecognizer>) -> Self {
        Self { recognizer }
    }

    pub fn recognizer(&self) -> &dyn TextRecognizer {
        self.recognizer.as_ref()
    }

    /// Recognize `image_path` and return its text: fragment texts in
    /// recognizer order, one per line. Regions and confidences are dropped.
    pub fn extract_text(&self, image_path: &Path) -> Result<String, RecognitionError> {
        let fragments = self.recognizer.recognize(image_path)?;
        tracing::debug!(
            "{} returned {} fragments for {}",
            self.recognizer.name(),
            fragments.len(),
            image_path.display()
        );

        let lines: Vec<String> = fragments.into_iter().map(|f| f.text).collect();
        Ok(lines.join("\n"))
    }
}
