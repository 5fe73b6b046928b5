//! Pipeline orchestration: load, scan, extract, save.

mod controller;
mod error;

pub use controller::PipelineController;
pub use error::{Intent, PipelineError};
