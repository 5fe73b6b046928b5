//! docscan - turn a photographed document into text.
//!
//! The pipeline loads an image, runs an external perspective corrector on
//! it, recognizes the corrected image's text, and writes that text to disk.
//! [`pipeline::PipelineController`] sequences those stages and owns the
//! current [`models::DocumentModel`].

pub mod config;
pub mod correction;
pub mod models;
pub mod pipeline;
pub mod recognition;
pub mod utils;

pub use config::{load_settings_with_options, Config, LoadOptions, Settings};
pub use models::{DocumentModel, Stage};
pub use pipeline::{Intent, PipelineController, PipelineError};
