//! Data models for docscan.

mod document;

pub use document::{DocumentModel, Stage};
