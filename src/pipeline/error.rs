//! User-facing pipeline failures.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::correction::CorrectionError;
use crate::models::Stage;
use crate::recognition::RecognitionError;
use crate::utils::ImageProbeError;

/// The four user intents the pipeline accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    Load,
    Scan,
    Extract,
    Save,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Load => "load",
            Intent::Scan => "scan",
            Intent::Extract => "extract",
            Intent::Save => "save",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Every failure leaves the document at its last completed stage.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Cannot load {}: {source}", .path.display())]
    LoadFailure {
        path: PathBuf,
        #[source]
        source: ImageProbeError,
    },

    #[error("Error during scanning: {0}")]
    CorrectionProcessFailure(#[source] CorrectionError),

    #[error("Scanned image not found in output directory (expected {})", .expected.display())]
    CorrectionOutputMissing { expected: PathBuf },

    #[error("Error during text extraction: {0}")]
    RecognitionFailure(#[source] RecognitionError),

    #[error("Error saving file {}: {source}", .path.display())]
    SaveFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot {intent} while the document is {stage}")]
    NotReady { intent: Intent, stage: Stage },
}

impl PipelineError {
    /// Short category name, stable across message wording changes.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::LoadFailure { .. } => "load_failure",
            PipelineError::CorrectionProcessFailure(_) => "correction_process_failure",
            PipelineError::CorrectionOutputMissing { .. } => "correction_output_missing",
            PipelineError::RecognitionFailure(_) => "recognition_failure",
            PipelineError::SaveFailure { .. } => "save_failure",
            PipelineError::NotReady { .. } => "not_ready",
        }
    }
}

impl From<CorrectionError> for PipelineError {
    fn from(err: CorrectionError) -> Self {
        match err {
            CorrectionError::OutputMissing { expected } => {
                PipelineError::CorrectionOutputMissing { expected }
            }
            other => PipelineError::CorrectionProcessFailure(other),
        }
    }
}

impl From<RecognitionError> for PipelineError {
    fn from(err: RecognitionError) -> Self {
        PipelineError::RecognitionFailure(err)
    }
}
