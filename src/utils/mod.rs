//! Shared utility functions.
//!
//! - `image`: raster format detection for loaded documents

mod image;

pub use image::{probe_image, ImageFormat, ImageProbeError, SUPPORTED_EXTENSIONS};
