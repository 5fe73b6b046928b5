//! Raster image detection for loaded documents.
//!
//! A path is accepted when its extension is one of the supported raster
//! formats and its content sniffs as one of them.

use std::fmt;
use std::path::Path;

use thiserror::Error;

/// Raster formats a document photo can be loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Bmp,
    Tiff,
}

/// File extensions accepted at load time (lowercase, no dot).
pub const SUPPORTED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "tiff", "tif"];

impl ImageFormat {
    /// Get the format ID as a string.
    pub fn id(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
            Self::Bmp => "bmp",
            Self::Tiff => "tiff",
        }
    }

    /// Canonical MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Bmp => "image/bmp",
            Self::Tiff => "image/tiff",
        }
    }

    /// Match a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "bmp" => Some(Self::Bmp),
            "tif" | "tiff" => Some(Self::Tiff),
            _ => None,
        }
    }

    /// Match a sniffed MIME type.
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime.to_lowercase().as_str() {
            "image/png" | "image/apng" => Some(Self::Png),
            "image/jpeg" => Some(Self::Jpeg),
            "image/bmp" | "image/x-ms-bmp" => Some(Self::Bmp),
            "image/tiff" => Some(Self::Tiff),
            _ => None,
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// Reasons a path cannot be loaded as an image.
#[derive(Debug, Error)]
pub enum ImageProbeError {
    #[error("not a file")]
    NotAFile,

    #[error("unsupported file type (expected one of: {})", SUPPORTED_EXTENSIONS.join(", "))]
    UnsupportedExtension,

    #[error("file content is not a supported image (detected {0})")]
    NotAnImage(String),

    #[error("unreadable: {0}")]
    Io(#[from] std::io::Error),
}

/// Check that `path` is a readable raster image and return its format.
pub fn probe_image(path: &Path) -> Result<ImageFormat, ImageProbeError> {
    let has_supported_ext = path
        .extension()
        .and_then(|e| e.to_str())
        .and_then(ImageFormat::from_extension)
        .is_some();
    if !has_supported_ext {
        return Err(ImageProbeError::UnsupportedExtension);
    }

    let meta = std::fs::metadata(path)?;
    if !meta.is_file() {
        return Err(ImageProbeError::NotAFile);
    }

    let kind = infer::get_from_path(path)?;
    let mime = kind.map(|k| k.mime_type().to_string());
    tracing::debug!("Sniffed {} as {:?}", path.display(), mime);

    match mime.as_deref().and_then(ImageFormat::from_mime) {
        Some(format) => Ok(format),
        None => Err(ImageProbeError::NotAnImage(
            mime.unwrap_or_else(|| "unknown".to_string()),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const PNG_HEADER: &[u8] = &[
        0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, b'I', b'H', b'D',
        b'R',
    ];
    const JPEG_HEADER: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F'];

    #[test]
    fn test_extension_matching() {
        assert_eq!(ImageFormat::from_extension("JPG"), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_extension("tif"), Some(ImageFormat::Tiff));
        assert_eq!(ImageFormat::from_extension("gif"), None);
        assert_eq!(ImageFormat::from_extension("pdf"), None);
    }

    #[test]
    fn test_probe_png() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("page.png");
        fs::write(&path, PNG_HEADER).unwrap();

        assert_eq!(probe_image(&path).unwrap(), ImageFormat::Png);
    }

    #[test]
    fn test_probe_accepts_mislabelled_raster() {
        // JPEG bytes behind a .png name still count as an image
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("photo.png");
        fs::write(&path, JPEG_HEADER).unwrap();

        assert_eq!(probe_image(&path).unwrap(), ImageFormat::Jpeg);
    }

    #[test]
    fn test_probe_rejects_text_with_image_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.jpg");
        fs::write(&path, "just some text").unwrap();

        assert!(matches!(
            probe_image(&path),
            Err(ImageProbeError::NotAnImage(_))
        ));
    }

    #[test]
    fn test_probe_rejects_unsupported_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("scan.pdf");
        fs::write(&path, PNG_HEADER).unwrap();

        assert!(matches!(
            probe_image(&path),
            Err(ImageProbeError::UnsupportedExtension)
        ));
    }

    #[test]
    fn test_probe_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.png");

        assert!(matches!(probe_image(&path), Err(ImageProbeError::Io(_))));
    }

    #[test]
    fn test_probe_directory() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("folder.png");
        fs::create_dir(&path).unwrap();

        assert!(matches!(probe_image(&path), Err(ImageProbeError::NotAFile)));
    }
}
