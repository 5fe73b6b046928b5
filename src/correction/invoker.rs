//! External-process correction engine.
//!
//! Runs a configured command on the input image and waits for it to exit.
//! The command reports nothing back; success means a file named like the
//! input appeared in the output directory. A file already in that slot is
//! moved aside for the run and put back if the run fails. Arguments may contain
//! placeholders:
//! - `{image}` - path of the input image
//! - `{output_dir}` - the output directory
//! - `{output}` - where the corrected image is expected
//! - `{basename}` / `{stem}` - input filename with / without extension

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use super::{CorrectionEngine, CorrectionError};

/// Drives an external corrector and checks its output slot.
#[derive(Debug, Clone)]
pub struct CorrectionInvoker {
    command: String,
    args: Vec<String>,
    output_dir: PathBuf,
}

impl CorrectionInvoker {
    /// Create an invoker. `output_dir` must exist by the time `correct` runs.
    pub fn new(command: impl Into<String>, args: Vec<String>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            command: command.into(),
            args,
            output_dir: output_dir.into(),
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Where the corrected version of `image_path` lands: the output
    /// directory joined with the input's basename.
    pub fn expected_output(&self, image_path: &Path) -> Result<PathBuf, CorrectionError> {
        image_path
            .file_name()
            .map(|name| self.output_dir.join(name))
            .ok_or_else(|| CorrectionError::InvalidInput(image_path.to_path_buf()))
    }

    /// Replace placeholders in an argument.
    fn expand_arg(&self, arg: &str, image_path: &Path, expected: &Path) -> String {
        let mut result = arg
            .replace("{image}", &image_path.to_string_lossy())
            .replace("{output_dir}", &self.output_dir.to_string_lossy())
            .replace("{output}", &expected.to_string_lossy());
        if let Some(basename) = image_path.file_name().and_then(|n| n.to_str()) {
            result = result.replace("{basename}", basename);
        }
        if let Some(stem) = image_path.file_stem().and_then(|n| n.to_str()) {
            result = result.replace("{stem}", stem);
        }
        result
    }

    /// Build command arguments with placeholders expanded.
    fn build_args(&self, image_path: &Path, expected: &Path) -> Vec<String> {
        self.args
            .iter()
            .map(|arg| self.expand_arg(arg, image_path, expected))
            .collect()
    }
}

/// Where a file already occupying `slot` is kept while the corrector runs.
fn backup_path(slot: &Path) -> PathBuf {
    let name = slot
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    slot.with_file_name(format!(".{}.docscan-prev", name))
}

/// A previous result moved out of the output slot for the duration of a run.
///
/// With the slot emptied, "the corrector produced output" is just "the slot
/// holds a file afterwards", whatever timestamps the corrector preserves.
struct SetAside {
    slot: PathBuf,
    backup: PathBuf,
}

impl SetAside {
    fn take(slot: &Path) -> Result<Option<Self>, CorrectionError> {
        if !slot.is_file() {
            return Ok(None);
        }
        let backup = backup_path(slot);
        fs::rename(slot, &backup).map_err(|source| CorrectionError::SlotUnavailable {
            path: slot.to_path_buf(),
            source,
        })?;
        tracing::debug!(
            "Output slot {} occupied, moved previous result to {}",
            slot.display(),
            backup.display()
        );
        Ok(Some(Self {
            slot: slot.to_path_buf(),
            backup,
        }))
    }

    /// The run produced a new result; drop the old one.
    fn discard(self) {
        if let Err(e) = fs::remove_file(&self.backup) {
            tracing::warn!("Failed to remove {}: {}", self.backup.display(), e);
        }
    }

    /// The run failed; put the old result back, replacing any partial output.
    fn restore(self) {
        if let Err(e) = fs::rename(&self.backup, &self.slot) {
            tracing::warn!(
                "Failed to restore previous output {}: {}",
                self.slot.display(),
                e
            );
        }
    }
}

impl CorrectionInvoker {
    /// Run the command once and classify the outcome against `expected`.
    fn run(&self, image_path: &Path, expected: PathBuf) -> Result<PathBuf, CorrectionError> {
        let args = self.build_args(image_path, &expected);
        tracing::debug!("Running corrector: {} {}", self.command, args.join(" "));

        // No timeout: a hung corrector blocks the caller until it exits.
        let status = match Command::new(&self.command).args(&args).status() {
            Ok(status) => status,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(CorrectionError::NotFound {
                    command: self.command.clone(),
                })
            }
            Err(e) => {
                return Err(CorrectionError::Spawn {
                    command: self.command.clone(),
                    source: e,
                })
            }
        };

        let produced = expected.is_file();
        match status.code() {
            None => Err(CorrectionError::Crashed {
                command: self.command.clone(),
                status: status.to_string(),
            }),
            Some(0) if produced => Ok(expected),
            Some(0) => Err(CorrectionError::OutputMissing { expected }),
            Some(code) if produced => {
                tracing::warn!(
                    "Corrector exited with status {} but wrote {}; accepting output",
                    code,
                    expected.display()
                );
                Ok(expected)
            }
            Some(code) => Err(CorrectionError::Failed {
                command: self.command.clone(),
                code,
            }),
        }
    }
}

impl CorrectionEngine for CorrectionInvoker {
    fn correct(&self, image_path: &Path) -> Result<PathBuf, CorrectionError> {
        if !self.output_dir.is_dir() {
            return Err(CorrectionError::OutputDirMissing(self.output_dir.clone()));
        }

        let expected = self.expected_output(image_path)?;
        let previous = SetAside::take(&expected)?;

        let result = self.run(image_path, expected);
        if let Some(previous) = previous {
            if result.is_ok() {
                previous.discard();
            } else {
                previous.restore();
            }
        }
        result
    }

    fn is_available(&self) -> bool {
        which::which(&self.command).is_ok()
    }

    fn availability_hint(&self) -> String {
        if self.is_available() {
            format!("Corrector `{}` is available", self.command)
        } else {
            format!(
                "Corrector `{}` not found in PATH. Set corrector.command in the config or DOCSCAN_CORRECTOR.",
                self.command
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sh(script: &str, output_dir: &Path) -> CorrectionInvoker {
        CorrectionInvoker::new(
            "sh",
            vec![
                "-c".to_string(),
                script.to_string(),
                "corrector".to_string(),
                "{image}".to_string(),
                "{output}".to_string(),
            ],
            output_dir,
        )
    }

    fn setup() -> (TempDir, PathBuf, PathBuf) {
        let dir = TempDir::new().unwrap();
        let photos = dir.path().join("photos");
        let output = dir.path().join("output");
        fs::create_dir_all(&photos).unwrap();
        fs::create_dir_all(&output).unwrap();
        let image = photos.join("invoice.jpg");
        fs::write(&image, b"raw photo").unwrap();
        (dir, image, output)
    }

    #[test]
    fn test_expected_output_uses_basename() {
        let invoker = CorrectionInvoker::new("true", vec![], "output");
        assert_eq!(
            invoker
                .expected_output(Path::new("/home/me/scans/receipt.png"))
                .unwrap(),
            PathBuf::from("output/receipt.png")
        );
        assert_eq!(
            invoker.expected_output(Path::new("receipt.png")).unwrap(),
            PathBuf::from("output/receipt.png")
        );
    }

    #[test]
    fn test_expected_output_without_filename() {
        let invoker = CorrectionInvoker::new("true", vec![], "output");
        assert!(matches!(
            invoker.expected_output(Path::new("/")),
            Err(CorrectionError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_expand_placeholders() {
        let invoker = CorrectionInvoker::new("python3", vec![], "out");
        let image = Path::new("/tmp/pics/page 1.jpeg");
        let expected = invoker.expected_output(image).unwrap();

        assert_eq!(
            invoker.expand_arg("--image={image}", image, &expected),
            "--image=/tmp/pics/page 1.jpeg"
        );
        assert_eq!(
            invoker.expand_arg("{output_dir}/{stem}.png", image, &expected),
            "out/page 1.png"
        );
        assert_eq!(invoker.expand_arg("{basename}", image, &expected), "page 1.jpeg");
        assert_eq!(
            invoker.expand_arg("{output}", image, &expected),
            "out/page 1.jpeg"
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_correct_success() {
        let (_dir, image, output) = setup();
        let invoker = sh("cp \"$1\" \"$2\"", &output);

        let scanned = invoker.correct(&image).unwrap();
        assert_eq!(scanned, output.join("invoice.jpg"));
        assert_eq!(fs::read(&scanned).unwrap(), b"raw photo");
    }

    #[cfg(unix)]
    #[test]
    fn test_clean_exit_without_output_is_silent_miss() {
        let (_dir, image, output) = setup();
        let invoker = sh("exit 0", &output);

        let err = invoker.correct(&image).unwrap_err();
        assert!(err.is_output_missing());
        assert!(!output.join("invoice.jpg").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_stale_output_does_not_mask_silent_miss() {
        let (_dir, image, output) = setup();
        let slot = output.join("invoice.jpg");
        fs::write(&slot, b"previous document").unwrap();
        let invoker = sh("exit 0", &output);

        let err = invoker.correct(&image).unwrap_err();
        assert!(err.is_output_missing());
        // The earlier result is back in place and no backup lingers
        assert_eq!(fs::read(&slot).unwrap(), b"previous document");
        assert!(!backup_path(&slot).exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_stale_output_rewritten_is_accepted() {
        let (_dir, image, output) = setup();
        let slot = output.join("invoice.jpg");
        fs::write(&slot, b"previous document").unwrap();

        let invoker = sh("cp \"$1\" \"$2\"", &output);
        let scanned = invoker.correct(&image).unwrap();
        assert_eq!(fs::read(&scanned).unwrap(), b"raw photo");
        assert!(!backup_path(&slot).exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_rescan_with_preserved_timestamps_is_accepted() {
        let (dir, image, output) = setup();
        let invoker = sh("cp -p \"$1\" \"$2\"", &output);
        invoker.correct(&image).unwrap();

        // Same basename, same bytes, same mtime as the first input
        let other_dir = dir.path().join("b");
        fs::create_dir_all(&other_dir).unwrap();
        let other = other_dir.join("invoice.jpg");
        fs::copy(&image, &other).unwrap();
        let mtime = fs::metadata(&image).unwrap().modified().unwrap();
        fs::File::options()
            .write(true)
            .open(&other)
            .unwrap()
            .set_modified(mtime)
            .unwrap();

        assert_eq!(invoker.correct(&other).unwrap(), output.join("invoice.jpg"));
    }

    #[cfg(unix)]
    #[test]
    fn test_failed_run_restores_previous_output() {
        let (_dir, image, output) = setup();
        let slot = output.join("invoice.jpg");
        fs::write(&slot, b"previous document").unwrap();
        let invoker = sh("echo partial > \"$2\"; kill -9 $$", &output);

        assert!(matches!(
            invoker.correct(&image),
            Err(CorrectionError::Crashed { .. })
        ));
        assert_eq!(fs::read(&slot).unwrap(), b"previous document");
    }

    #[cfg(unix)]
    #[test]
    fn test_nonzero_exit_without_output_is_process_failure() {
        let (_dir, image, output) = setup();
        let invoker = sh("exit 3", &output);

        match invoker.correct(&image) {
            Err(CorrectionError::Failed { code, .. }) => assert_eq!(code, 3),
            other => panic!("expected Failed, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_nonzero_exit_with_output_is_accepted() {
        let (_dir, image, output) = setup();
        let invoker = sh("cp \"$1\" \"$2\"; exit 1", &output);

        assert_eq!(invoker.correct(&image).unwrap(), output.join("invoice.jpg"));
    }

    #[cfg(unix)]
    #[test]
    fn test_killed_process_is_crash() {
        let (_dir, image, output) = setup();
        let invoker = sh("cp \"$1\" \"$2\"; kill -9 $$", &output);

        assert!(matches!(
            invoker.correct(&image),
            Err(CorrectionError::Crashed { .. })
        ));
    }

    #[test]
    fn test_missing_command() {
        let (_dir, image, output) = setup();
        let invoker = CorrectionInvoker::new("docscan-no-such-corrector", vec![], &output);

        assert!(matches!(
            invoker.correct(&image),
            Err(CorrectionError::NotFound { .. })
        ));
        assert!(!invoker.is_available());
    }

    #[test]
    fn test_missing_output_dir() {
        let (dir, image, _output) = setup();
        let invoker = CorrectionInvoker::new("true", vec![], dir.path().join("nowhere"));

        assert!(matches!(
            invoker.correct(&image),
            Err(CorrectionError::OutputDirMissing(_))
        ));
    }
}
