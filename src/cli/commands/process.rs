//! One-shot pipeline commands.

use std::path::Path;

use docscan::{Intent, Settings};

use crate::cli::helpers::{self, report_success};

/// Load, scan and extract `image`; print the text and optionally save it.
pub fn cmd_process(settings: &Settings, image: &Path, save: Option<&Path>) -> anyhow::Result<()> {
    settings.ensure_directories()?;
    let mut controller = settings.create_pipeline()?;

    controller.load(image)?;
    report_success(Intent::Load, &controller);

    helpers::scan(&mut controller)?;
    report_success(Intent::Scan, &controller);

    helpers::extract(&mut controller)?;
    report_success(Intent::Extract, &controller);

    if let Some(text) = controller.document().extracted_text() {
        println!("{}", text);
    }

    if let Some(dest) = save {
        controller.save(dest)?;
        report_success(Intent::Save, &controller);
    }

    Ok(())
}

/// Load and scan `image`; print the corrected image path.
pub fn cmd_scan(settings: &Settings, image: &Path) -> anyhow::Result<()> {
    settings.ensure_directories()?;
    let mut controller = settings.create_pipeline()?;

    controller.load(image)?;
    report_success(Intent::Load, &controller);

    helpers::scan(&mut controller)?;

    if let Some(scanned) = controller.document().scanned_path() {
        println!("{}", scanned.display());
    }
    Ok(())
}
