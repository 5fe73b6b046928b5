//! Shared helper functions for CLI commands.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use docscan::{Intent, PipelineController, PipelineError};

use super::icons::{failure, note, success};

/// Run a blocking stage while a spinner shows `message` on stderr.
pub fn with_spinner<T>(message: String, work: impl FnOnce() -> T) -> T {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));

    let result = work();
    pb.finish_and_clear();
    result
}

/// Run Scan with a spinner.
pub fn scan(controller: &mut PipelineController) -> Result<(), PipelineError> {
    let message = match controller.document().original_path() {
        Some(path) => format!("Scanning {}...", path.display()),
        None => "Scanning...".to_string(),
    };
    with_spinner(message, || controller.scan())
}

/// Run Extract with a spinner.
pub fn extract(controller: &mut PipelineController) -> Result<(), PipelineError> {
    with_spinner("Extracting text...".to_string(), || controller.extract())
}

/// Print a stage outcome to stderr.
pub fn report(intent: Intent, result: &Result<(), PipelineError>, controller: &PipelineController) {
    match result {
        Ok(()) => report_success(intent, controller),
        Err(e) => eprintln!("{} {}", failure(), e),
    }
}

/// Print what a successful stage produced to stderr.
pub fn report_success(intent: Intent, controller: &PipelineController) {
    let doc = controller.document();
    match intent {
        Intent::Load => eprintln!(
            "{} Loaded {}",
            success(),
            doc.original_path().map(|p| p.display().to_string()).unwrap_or_default()
        ),
        Intent::Scan => eprintln!(
            "{} Scanned image: {}",
            success(),
            doc.scanned_path().map(|p| p.display().to_string()).unwrap_or_default()
        ),
        Intent::Extract => {
            let lines = doc
                .extracted_text()
                .filter(|t| !t.is_empty())
                .map(|t| t.lines().count())
                .unwrap_or(0);
            eprintln!("{} Extracted {} lines", success(), lines);
            if lines == 0 {
                eprintln!("  {} No text found; nothing to save", note());
            }
        }
        Intent::Save => eprintln!(
            "{} Text saved successfully to {}",
            success(),
            doc.saved_path().map(|p| p.display().to_string()).unwrap_or_default()
        ),
    }
}
