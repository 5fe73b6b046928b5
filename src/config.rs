//! Configuration management for docscan using the prefer crate.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::correction::CorrectionInvoker;
use crate::pipeline::PipelineController;
use crate::recognition::{RecognitionClient, RecognitionError, TesseractRecognizer, TextRecognizer};

/// Default output directory for corrected images.
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// Corrector command configuration.
///
/// Arguments can include `{image}`, `{output_dir}`, `{output}`, `{basename}`
/// and `{stem}` placeholders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, prefer::FromValue)]
pub struct CorrectorConfig {
    /// Program to execute.
    #[serde(default = "default_corrector_command")]
    #[prefer(default = "python3")]
    pub command: String,
    /// Arguments passed to the program.
    #[serde(default)]
    #[prefer(default)]
    pub args: CorrectorArgs,
}

fn default_corrector_command() -> String {
    "python3".to_string()
}

impl Default for CorrectorConfig {
    fn default() -> Self {
        Self {
            command: default_corrector_command(),
            args: CorrectorArgs::default(),
        }
    }
}

/// Corrector argument list. Defaults to `scan.py --image {image}` when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrectorArgs(pub Vec<String>);

impl Default for CorrectorArgs {
    fn default() -> Self {
        Self(vec![
            "scan.py".to_string(),
            "--image".to_string(),
            "{image}".to_string(),
        ])
    }
}

impl From<Vec<String>> for CorrectorArgs {
    fn from(args: Vec<String>) -> Self {
        Self(args)
    }
}

impl std::ops::Deref for CorrectorArgs {
    type Target = [String];

    fn deref(&self) -> &[String] {
        &self.0
    }
}

impl prefer::FromValue for CorrectorArgs {
    fn from_value(value: &prefer::ConfigValue) -> prefer::Result<Self> {
        <Vec<String> as prefer::FromValue>::from_value(value).map(Self)
    }
}

impl CorrectorConfig {
    /// Check if this is the default config.
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

/// Recognition backend configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, prefer::FromValue)]
pub struct RecognizerConfig {
    /// Backend name. Only "tesseract" is built in.
    #[serde(default = "default_backend")]
    #[prefer(default = "tesseract")]
    pub backend: String,
    /// Backend binary.
    #[serde(default = "default_backend")]
    #[prefer(default = "tesseract")]
    pub command: String,
    /// Recognition language (e.g. "eng", "eng+deu").
    #[serde(default = "default_language")]
    #[prefer(default = "eng")]
    pub language: String,
}

fn default_backend() -> String {
    "tesseract".to_string()
}

fn default_language() -> String {
    "eng".to_string()
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            command: default_backend(),
            language: default_language(),
        }
    }
}

impl RecognizerConfig {
    /// Check if this is the default config.
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

/// Configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize, prefer::FromValue)]
pub struct Config {
    /// Directory corrected images are written to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<String>,
    /// External perspective-correction command.
    #[serde(default, skip_serializing_if = "CorrectorConfig::is_default")]
    #[prefer(default)]
    pub corrector: CorrectorConfig,
    /// Text recognition backend.
    #[serde(default, skip_serializing_if = "RecognizerConfig::is_default")]
    #[prefer(default)]
    pub recognizer: RecognizerConfig,
    /// Path to the config file this was loaded from (not serialized).
    #[serde(skip)]
    #[prefer(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration using prefer crate for discovery.
    /// Automatically discovers docscan config files in standard locations.
    pub async fn load() -> Self {
        match prefer::load("docscan").await {
            Ok(pref_config) => {
                if let Some(path) = pref_config.source_path() {
                    match Self::load_from_path(path).await {
                        Ok(config) => config,
                        Err(e) => {
                            tracing::warn!("Ignoring config {}: {}", path.display(), e);
                            Self::default()
                        }
                    }
                } else {
                    Self::default()
                }
            }
            Err(_) => {
                // No config file found, use defaults
                Self::default()
            }
        }
    }

    /// Load configuration from a specific file path.
    /// Supports JSON, TOML and YAML based on file extension.
    pub async fn load_from_path(path: &Path) -> Result<Self, String> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

        let mut config: Config = match ext {
            "toml" => toml::from_str(&contents)
                .map_err(|e| format!("Failed to parse TOML config: {}", e))?,
            "yaml" | "yml" => serde_yaml::from_str(&contents)
                .map_err(|e| format!("Failed to parse YAML config: {}", e))?,
            _ => serde_json::from_str(&contents)
                .map_err(|e| format!("Failed to parse JSON config: {}", e))?,
        };

        config.source_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Get the base directory for resolving relative paths.
    /// Returns the config file's parent directory if available, otherwise None.
    pub fn base_dir(&self) -> Option<PathBuf> {
        self.source_path
            .as_ref()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    /// Resolve a path that may be relative to the config file.
    /// - Absolute paths are returned as-is
    /// - Paths starting with ~ are expanded
    /// - Relative paths are resolved relative to `base_dir`
    pub fn resolve_path(&self, path_str: &str, base_dir: &Path) -> PathBuf {
        let expanded = shellexpand::tilde(path_str);
        let path = Path::new(expanded.as_ref());

        if path.is_absolute() {
            path.to_path_buf()
        } else {
            base_dir.join(path)
        }
    }

    /// Apply configuration to settings.
    pub fn apply_to_settings(&self, settings: &mut Settings, base_dir: &Path) {
        if let Some(ref output_dir) = self.output_dir {
            settings.output_dir = self.resolve_path(output_dir, base_dir);
        }
        settings.corrector = self.corrector.clone();
        settings.recognizer = self.recognizer.clone();
    }
}

/// Effective application settings.
#[derive(Debug, Clone, Serialize)]
pub struct Settings {
    /// Landing zone for corrected images, keyed by input basename.
    pub output_dir: PathBuf,
    pub corrector: CorrectorConfig,
    pub recognizer: RecognizerConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            corrector: CorrectorConfig::default(),
            recognizer: RecognizerConfig::default(),
        }
    }
}

impl Settings {
    /// Ensure the output directory exists.
    pub fn ensure_directories(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.output_dir).map_err(|e| {
            std::io::Error::new(
                e.kind(),
                format!(
                    "Failed to create output directory '{}': {}",
                    self.output_dir.display(),
                    e
                ),
            )
        })
    }

    /// Apply environment overrides. `lookup` returns a variable's value.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(dir) = get("DOCSCAN_OUTPUT_DIR") {
            tracing::debug!("Using DOCSCAN_OUTPUT_DIR from environment: {}", dir);
            self.output_dir = PathBuf::from(shellexpand::tilde(&dir).as_ref());
        }
        if let Some(command) = get("DOCSCAN_CORRECTOR") {
            tracing::debug!("Using DOCSCAN_CORRECTOR from environment: {}", command);
            self.corrector.command = command;
        }
        if let Some(lang) = get("DOCSCAN_OCR_LANG") {
            tracing::debug!("Using DOCSCAN_OCR_LANG from environment: {}", lang);
            self.recognizer.language = lang;
        }
    }

    /// Build the corrector described by these settings.
    pub fn create_corrector(&self) -> CorrectionInvoker {
        CorrectionInvoker::new(
            self.corrector.command.clone(),
            self.corrector.args.to_vec(),
            self.output_dir.clone(),
        )
    }

    /// Build the recognizer described by these settings.
    pub fn create_recognizer(&self) -> Result<Box<dyn TextRecognizer>, RecognitionError> {
        match self.recognizer.backend.to_lowercase().as_str() {
            "tesseract" => Ok(Box::new(
                TesseractRecognizer::new()
                    .with_command(&self.recognizer.command)
                    .with_language(&self.recognizer.language),
            )),
            other => Err(RecognitionError::BackendNotAvailable(format!(
                "unknown recognizer backend '{}' (available: tesseract)",
                other
            ))),
        }
    }

    /// Wire up a pipeline from these settings.
    pub fn create_pipeline(&self) -> Result<PipelineController, RecognitionError> {
        let recognizer = self.create_recognizer()?;
        Ok(PipelineController::new(
            Box::new(self.create_corrector()),
            RecognitionClient::new(recognizer),
        ))
    }
}

/// Options for loading settings.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Explicit config file path (overrides auto-discovery).
    pub config_path: Option<PathBuf>,
    /// Use CWD for relative paths instead of config file directory.
    pub use_cwd: bool,
    /// Output directory override (--output-dir flag).
    pub output_dir: Option<PathBuf>,
}

/// Load config from file sources.
async fn load_file_config(options: &LoadOptions) -> Config {
    // Priority 1: Explicit --config flag
    if let Some(ref config_path) = options.config_path {
        return match Config::load_from_path(config_path).await {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("{}: {}", config_path.display(), e);
                Config::default()
            }
        };
    }

    // Priority 2: Auto-discover via prefer
    Config::load().await
}

/// Load settings with explicit options.
/// Returns (Settings, Config) tuple.
pub async fn load_settings_with_options(options: LoadOptions) -> (Settings, Config) {
    let config = load_file_config(&options).await;

    let mut settings = Settings::default();

    // Determine base directory for resolving relative paths
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let base_dir = if options.use_cwd {
        cwd
    } else {
        config.base_dir().unwrap_or(cwd)
    };

    config.apply_to_settings(&mut settings, &base_dir);
    settings.apply_env_overrides(|key| std::env::var(key).ok());

    // --output-dir takes precedence over everything
    if let Some(output_dir) = options.output_dir {
        settings.output_dir = output_dir;
    }

    (settings, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_load_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("docscan.toml");
        fs::write(
            &path,
            r#"
output_dir = "corrected"

[corrector]
command = "/opt/scanner/bin/scan"
args = ["--in", "{image}", "--out", "{output}"]

[recognizer]
language = "deu"
"#,
        )
        .unwrap();

        let config = Config::load_from_path(&path).await.unwrap();
        assert_eq!(config.output_dir.as_deref(), Some("corrected"));
        assert_eq!(config.corrector.command, "/opt/scanner/bin/scan");
        assert_eq!(config.corrector.args.len(), 4);
        assert_eq!(config.recognizer.language, "deu");
        assert_eq!(config.recognizer.backend, "tesseract");
        assert_eq!(config.source_path.as_deref(), Some(path.as_path()));
    }

    #[tokio::test]
    async fn test_load_yaml_partial_corrector_keeps_default_args() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("docscan.yaml");
        fs::write(&path, "corrector:\n  command: python3.12\n").unwrap();

        let config = Config::load_from_path(&path).await.unwrap();
        assert_eq!(config.corrector.command, "python3.12");
        assert_eq!(config.corrector.args, CorrectorArgs::default());
        assert!(config.output_dir.is_none());
    }

    #[tokio::test]
    async fn test_load_json_and_bad_json() {
        let dir = TempDir::new().unwrap();
        let good = dir.path().join("docscan.json");
        fs::write(&good, r#"{"output_dir": "/var/scans"}"#).unwrap();
        let config = Config::load_from_path(&good).await.unwrap();
        assert_eq!(config.output_dir.as_deref(), Some("/var/scans"));

        let bad = dir.path().join("broken.json");
        fs::write(&bad, "{ not json").unwrap();
        assert!(Config::load_from_path(&bad).await.is_err());
    }

    #[test]
    fn test_prefer_value_keeps_default_args() {
        let value = prefer::ConfigValue::Object(HashMap::from([(
            "command".to_string(),
            prefer::ConfigValue::from("python3.12"),
        )]));
        let corrector = <CorrectorConfig as prefer::FromValue>::from_value(&value).unwrap();
        assert_eq!(corrector.command, "python3.12");
        assert_eq!(corrector.args, CorrectorArgs::default());

        let value = prefer::ConfigValue::Object(HashMap::from([(
            "args".to_string(),
            prefer::ConfigValue::Array(vec!["{image}".into(), "{output}".into()]),
        )]));
        let corrector = <CorrectorConfig as prefer::FromValue>::from_value(&value).unwrap();
        assert_eq!(corrector.args.to_vec(), vec!["{image}", "{output}"]);
    }

    #[test]
    fn test_relative_output_dir_resolves_against_base() {
        let config = Config {
            output_dir: Some("scans/out".to_string()),
            ..Default::default()
        };
        let mut settings = Settings::default();
        config.apply_to_settings(&mut settings, Path::new("/etc/docscan"));
        assert_eq!(settings.output_dir, PathBuf::from("/etc/docscan/scans/out"));

        let absolute = Config {
            output_dir: Some("/srv/out".to_string()),
            ..Default::default()
        };
        absolute.apply_to_settings(&mut settings, Path::new("/etc/docscan"));
        assert_eq!(settings.output_dir, PathBuf::from("/srv/out"));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("DOCSCAN_OUTPUT_DIR", "/tmp/corrected"),
            ("DOCSCAN_CORRECTOR", "scan-doc"),
            ("DOCSCAN_OCR_LANG", ""),
        ]
        .into_iter()
        .collect();

        let mut settings = Settings::default();
        settings.apply_env_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(settings.output_dir, PathBuf::from("/tmp/corrected"));
        assert_eq!(settings.corrector.command, "scan-doc");
        // Empty values are ignored
        assert_eq!(settings.recognizer.language, "eng");
    }

    #[test]
    fn test_unknown_recognizer_backend() {
        let mut settings = Settings::default();
        settings.recognizer.backend = "easyocr".to_string();
        assert!(matches!(
            settings.create_recognizer(),
            Err(RecognitionError::BackendNotAvailable(_))
        ));
        assert!(settings.create_pipeline().is_err());
    }

    #[test]
    fn test_ensure_directories_creates_output_dir() {
        let dir = TempDir::new().unwrap();
        let settings = Settings {
            output_dir: dir.path().join("nested").join("output"),
            ..Default::default()
        };
        settings.ensure_directories().unwrap();
        assert!(settings.output_dir.is_dir());
        // Idempotent
        settings.ensure_directories().unwrap();
    }

    #[test]
    fn test_default_config_serializes_empty() {
        let json = serde_json::to_string(&Config::default()).unwrap();
        assert_eq!(json, "{}");
    }
}
