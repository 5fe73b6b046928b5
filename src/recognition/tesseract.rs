//! Tesseract recognition backend.
//!
//! Runs Tesseract via command-line with TSV output and turns word rows into
//! one fragment per text line.

use std::path::Path;
use std::process::Command;

use super::{BoundingRegion, RecognitionError, TextFragment, TextRecognizer};

/// TSV row level for individual words.
const WORD_LEVEL: u32 = 5;

/// Tesseract recognition backend.
pub struct TesseractRecognizer {
    command: String,
    language: String,
}

impl TesseractRecognizer {
    /// Create a backend using `tesseract` from PATH and English.
    pub fn new() -> Self {
        Self {
            command: "tesseract".to_string(),
            language: "eng".to_string(),
        }
    }

    /// Use a different tesseract binary.
    pub fn with_command(mut self, command: &str) -> Self {
        self.command = command.to_string();
        self
    }

    /// Set Tesseract language (e.g. "eng", "eng+deu").
    pub fn with_language(mut self, lang: &str) -> Self {
        self.language = lang.to_string();
        self
    }

    /// Run Tesseract on an image file and return its TSV output.
    fn run_tesseract(&self, image_path: &Path) -> Result<String, RecognitionError> {
        let output = Command::new(&self.command)
            .arg(image_path)
            .arg("stdout")
            .args(["-l", &self.language])
            .arg("tsv")
            .output();

        match output {
            Ok(output) => {
                if output.status.success() {
                    Ok(String::from_utf8_lossy(&output.stdout).to_string())
                } else {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    Err(RecognitionError::Failed(format!(
                        "tesseract failed: {}",
                        stderr.trim()
                    )))
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(RecognitionError::BackendNotAvailable(format!(
                    "{} not found (install tesseract-ocr)",
                    self.command
                )))
            }
            Err(e) => Err(RecognitionError::Io(e)),
        }
    }
}

impl Default for TesseractRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Line key: (page, block, paragraph, line).
type LineKey = (u32, u32, u32, u32);

struct LineBuilder {
    key: LineKey,
    words: Vec<String>,
    region: BoundingRegion,
    confidence_sum: f32,
}

impl LineBuilder {
    fn finish(self) -> TextFragment {
        let count = self.words.len().max(1) as f32;
        TextFragment::new(
            self.region,
            self.words.join(" "),
            (self.confidence_sum / count / 100.0).clamp(0.0, 1.0),
        )
    }
}

/// Parse Tesseract TSV output into line fragments, in output order.
///
/// Columns: level, page_num, block_num, par_num, line_num, word_num, left,
/// top, width, height, conf, text. Only word rows with non-blank text
/// contribute; malformed rows are skipped.
pub(crate) fn parse_tsv(tsv: &str) -> Vec<TextFragment> {
    let mut fragments = Vec::new();
    let mut current: Option<LineBuilder> = None;

    for row in tsv.lines() {
        let cols: Vec<&str> = row.splitn(12, '\t').collect();
        if cols.len() < 12 {
            continue;
        }
        let nums: Option<Vec<u32>> = cols[..10].iter().map(|c| c.trim().parse().ok()).collect();
        let Some(nums) = nums else {
            // Header row or garbage
            continue;
        };
        if nums[0] != WORD_LEVEL {
            continue;
        }
        let text = cols[11].trim();
        if text.is_empty() {
            continue;
        }
        let confidence: f32 = cols[10].trim().parse().unwrap_or(0.0);

        let key = (nums[1], nums[2], nums[3], nums[4]);
        let region = BoundingRegion {
            left: nums[6],
            top: nums[7],
            width: nums[8],
            height: nums[9],
        };

        match current.as_mut() {
            Some(line) if line.key == key => {
                line.words.push(text.to_string());
                line.region = line.region.union(&region);
                line.confidence_sum += confidence.max(0.0);
            }
            _ => {
                if let Some(line) = current.take() {
                    fragments.push(line.finish());
                }
                current = Some(LineBuilder {
                    key,
                    words: vec![text.to_string()],
                    region,
                    confidence_sum: confidence.max(0.0),
                });
            }
        }
    }

    if let Some(line) = current {
        fragments.push(line.finish());
    }
    fragments
}

impl TextRecognizer for TesseractRecognizer {
    fn name(&self) -> &str {
        "tesseract"
    }

    fn is_available(&self) -> bool {
        which::which(&self.command).is_ok()
    }

    fn availability_hint(&self) -> String {
        if self.is_available() {
            "Tesseract is available".to_string()
        } else {
            "Tesseract not installed. Install with: apt install tesseract-ocr".to_string()
        }
    }

    fn recognize(&self, image_path: &Path) -> Result<Vec<TextFragment>, RecognitionError> {
        let tsv = self.run_tesseract(image_path)?;
        Ok(parse_tsv(&tsv))
    }
}
