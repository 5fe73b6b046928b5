//! The document being worked on and its position in the pipeline.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::utils::ImageFormat;

/// Position of a document in the fixed pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Nothing loaded yet.
    #[default]
    Empty,
    /// Original image selected.
    Loaded,
    /// Corrected image produced.
    Scanned,
    /// Text recognized from the corrected image.
    TextExtracted,
    /// Text written to disk.
    Saved,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Empty => "empty",
            Stage::Loaded => "loaded",
            Stage::Scanned => "scanned",
            Stage::TextExtracted => "text_extracted",
            Stage::Saved => "saved",
        }
    }

    /// Whether a corrected image exists at this stage.
    pub fn has_scan(&self) -> bool {
        matches!(self, Stage::Scanned | Stage::TextExtracted | Stage::Saved)
    }

    /// Whether recognized text exists at this stage.
    pub fn has_text(&self) -> bool {
        matches!(self, Stage::TextExtracted | Stage::Saved)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Artifacts of the current document.
///
/// Only `PipelineController` mutates this; everything else reads it. The
/// mutators keep the stage and the optional artifacts consistent:
/// `scanned_path` exists only from `Scanned` on, `extracted_text` only from
/// `TextExtracted` on, and `saved_path` only at `Saved`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DocumentModel {
    stage: Stage,
    original_path: Option<PathBuf>,
    #[serde(skip)]
    format: Option<ImageFormat>,
    scanned_path: Option<PathBuf>,
    extracted_text: Option<String>,
    saved_path: Option<PathBuf>,
}

impl DocumentModel {
    /// A model with nothing loaded.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A freshly loaded document. Replaces any previous document wholesale.
    pub(crate) fn loaded(original_path: PathBuf, format: ImageFormat) -> Self {
        Self {
            stage: Stage::Loaded,
            original_path: Some(original_path),
            format: Some(format),
            ..Self::default()
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn original_path(&self) -> Option<&Path> {
        self.original_path.as_deref()
    }

    pub fn format(&self) -> Option<ImageFormat> {
        self.format
    }

    pub fn scanned_path(&self) -> Option<&Path> {
        self.scanned_path.as_deref()
    }

    pub fn extracted_text(&self) -> Option<&str> {
        self.extracted_text.as_deref()
    }

    pub fn saved_path(&self) -> Option<&Path> {
        self.saved_path.as_deref()
    }

    /// Record a successful scan. Any text from an earlier scan is dropped.
    pub(crate) fn record_scan(&mut self, scanned_path: PathBuf) {
        self.scanned_path = Some(scanned_path);
        self.extracted_text = None;
        self.saved_path = None;
        self.stage = Stage::Scanned;
    }

    /// Record successfully recognized text.
    pub(crate) fn record_text(&mut self, text: String) {
        self.extracted_text = Some(text);
        self.saved_path = None;
        self.stage = Stage::TextExtracted;
    }

    /// Record a successful save.
    pub(crate) fn record_save(&mut self, saved_path: PathBuf) {
        self.saved_path = Some(saved_path);
        self.stage = Stage::Saved;
    }
}
