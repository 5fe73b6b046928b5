//! Geometric (perspective) correction of photographed pages.
//!
//! Correction is delegated to an external engine behind the
//! [`CorrectionEngine`] trait.

mod invoker;

use std::path::{Path, PathBuf};

use thiserror::Error;

pub use invoker::CorrectionInvoker;

/// Errors from a correction attempt.
#[derive(Debug, Error)]
pub enum CorrectionError {
    #[error("corrector `{command}` not found (check the corrector command in your config)")]
    NotFound { command: String },

    #[error("failed to run corrector `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("corrector `{command}` was terminated ({status})")]
    Crashed { command: String, status: String },

    #[error("corrector `{command}` exited with status {code} and produced no output")]
    Failed { command: String, code: i32 },

    #[error("output directory {} does not exist", .0.display())]
    OutputDirMissing(PathBuf),

    #[error("input path {} has no file name", .0.display())]
    InvalidInput(PathBuf),

    #[error("could not move previous output {} aside: {source}", .path.display())]
    SlotUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("corrector finished but no corrected image was written to {}", .expected.display())]
    OutputMissing { expected: PathBuf },
}

impl CorrectionError {
    /// The engine ran cleanly but declined to produce an image.
    pub fn is_output_missing(&self) -> bool {
        matches!(self, CorrectionError::OutputMissing { .. })
    }
}

/// Something that turns a photographed page into a corrected image.
pub trait CorrectionEngine: Send + Sync {
    /// Correct `image_path`, blocking until done. Returns the corrected
    /// image's location.
    fn correct(&self, image_path: &Path) -> Result<PathBuf, CorrectionError>;

    /// Check if the engine can run (binaries installed, etc.).
    fn is_available(&self) -> bool {
        true
    }

    /// Describe what's needed to make this engine available.
    fn availability_hint(&self) -> String {
        "Corrector is available".to_string()
    }
}
