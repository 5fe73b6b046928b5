//! The stage-gated state machine driving a document through the pipeline.
//!
//! Stages only move forward: `Empty -> Loaded -> Scanned -> TextExtracted ->
//! Saved`. Scan, Extract and Save may be repeated from any later stage; a new
//! Load discards the current document and starts over from `Loaded`.
//!
//! Every operation is synchronous. Scan blocks until the corrector exits and
//! Extract blocks until the recognizer returns, so at most one correction or
//! recognition is ever in flight for a document.

use std::fs;
use std::path::Path;

use crate::correction::CorrectionEngine;
use crate::models::{DocumentModel, Stage};
use crate::recognition::RecognitionClient;
use crate::utils::probe_image;

use super::error::{Intent, PipelineError};

/// Owns the current document and sequences the pipeline's stages.
pub struct PipelineController {
    document: DocumentModel,
    corrector: Box<dyn CorrectionEngine>,
    recognition: RecognitionClient,
}

impl PipelineController {
    pub fn new(corrector: Box<dyn CorrectionEngine>, recognition: RecognitionClient) -> Self {
        Self {
            document: DocumentModel::empty(),
            corrector,
            recognition,
        }
    }

    /// Read-only view of the current document.
    pub fn document(&self) -> &DocumentModel {
        &self.document
    }

    pub fn stage(&self) -> Stage {
        self.document.stage()
    }

    pub fn corrector(&self) -> &dyn CorrectionEngine {
        self.corrector.as_ref()
    }

    pub fn recognition(&self) -> &RecognitionClient {
        &self.recognition
    }

    /// An image is loaded.
    pub fn can_scan(&self) -> bool {
        self.document.stage() != Stage::Empty
    }

    /// A corrected image exists.
    pub fn can_extract(&self) -> bool {
        self.document.scanned_path().is_some()
    }

    /// There is non-empty text to write.
    pub fn can_save(&self) -> bool {
        self.document
            .extracted_text()
            .is_some_and(|text| !text.is_empty())
    }

    /// Capability query for any intent. Load is always allowed.
    pub fn can(&self, intent: Intent) -> bool {
        match intent {
            Intent::Load => true,
            Intent::Scan => self.can_scan(),
            Intent::Extract => self.can_extract(),
            Intent::Save => self.can_save(),
        }
    }

    fn not_ready(&self, intent: Intent) -> PipelineError {
        PipelineError::NotReady {
            intent,
            stage: self.document.stage(),
        }
    }

    /// Start a new document from an image file.
    ///
    /// On success the previous document is discarded, saved or not. On
    /// failure the previous document is left untouched.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<(), PipelineError> {
        let path = path.as_ref();
        let format = probe_image(path).map_err(|source| {
            tracing::warn!("Rejected {}: {}", path.display(), source);
            PipelineError::LoadFailure {
                path: path.to_path_buf(),
                source,
            }
        })?;

        self.document = DocumentModel::loaded(path.to_path_buf(), format);
        tracing::info!("Loaded {} ({})", path.display(), format);
        Ok(())
    }

    /// Run perspective correction on the loaded image.
    pub fn scan(&mut self) -> Result<(), PipelineError> {
        let original = match self.document.original_path() {
            Some(path) => path.to_path_buf(),
            None => return Err(self.not_ready(Intent::Scan)),
        };

        tracing::info!("Scanning {}", original.display());
        let scanned = self.corrector.correct(&original).map_err(|e| {
            tracing::warn!("Scan of {} failed: {}", original.display(), e);
            PipelineError::from(e)
        })?;

        tracing::info!("Scanned {} -> {}", original.display(), scanned.display());
        self.document.record_scan(scanned);
        Ok(())
    }

    /// Recognize text on the corrected image.
    pub fn extract(&mut self) -> Result<(), PipelineError> {
        let scanned = match self.document.scanned_path() {
            Some(path) => path.to_path_buf(),
            None => return Err(self.not_ready(Intent::Extract)),
        };

        tracing::info!("Extracting text from {}", scanned.display());
        let text = self.recognition.extract_text(&scanned).map_err(|e| {
            tracing::warn!("Text extraction from {} failed: {}", scanned.display(), e);
            PipelineError::from(e)
        })?;

        tracing::info!(
            "Extracted {} lines from {}",
            if text.is_empty() { 0 } else { text.lines().count() },
            scanned.display()
        );
        self.document.record_text(text);
        Ok(())
    }

    /// Write the extracted text to `path` as UTF-8, replacing any existing file.
    pub fn save(&mut self, path: impl AsRef<Path>) -> Result<(), PipelineError> {
        let path = path.as_ref();
        let text = match self.document.extracted_text() {
            Some(text) if !text.is_empty() => text,
            _ => return Err(self.not_ready(Intent::Save)),
        };

        fs::write(path, text.as_bytes()).map_err(|source| {
            tracing::warn!("Saving to {} failed: {}", path.display(), source);
            PipelineError::SaveFailure {
                path: path.to_path_buf(),
                source,
            }
        })?;

        tracing::info!("Saved text to {}", path.display());
        self.document.record_save(path.to_path_buf());
        Ok(())
    }
}
