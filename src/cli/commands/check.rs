//! Tool availability check.

use console::style;

use docscan::correction::CorrectionEngine;
use docscan::Settings;

use crate::cli::icons::{availability, success, warn};

fn print_status(name: &str, available: bool, hint: &str) {
    println!("  {:<15} {}", name, availability(available));
    if !available {
        println!("                  {}", style(hint).dim());
    }
}

/// Report whether the corrector, recognizer and output directory are usable.
pub fn cmd_check(settings: &Settings) -> anyhow::Result<()> {
    let mut all_ok = true;

    println!("\n{}", style("Corrector:").cyan());
    let corrector = settings.create_corrector();
    let available = corrector.is_available();
    all_ok &= available;
    print_status(corrector.command(), available, &corrector.availability_hint());

    println!("\n{}", style("Recognizer:").cyan());
    match settings.create_recognizer() {
        Ok(recognizer) => {
            let available = recognizer.is_available();
            all_ok &= available;
            print_status(recognizer.name(), available, &recognizer.availability_hint());
        }
        Err(e) => {
            all_ok = false;
            println!("  {:<15} {}", settings.recognizer.backend, style(e).red());
        }
    }

    println!("\n{}", style("Output directory:").cyan());
    let dir = &settings.output_dir;
    if dir.is_dir() {
        println!("  {:<15} {}", dir.display(), style("✓ exists").green());
    } else {
        println!(
            "  {:<15} {}",
            dir.display(),
            style("○ created on first scan").yellow()
        );
    }

    println!();
    if all_ok {
        println!("{} All tools are available", success());
    } else {
        println!(
            "{} Some tools are missing. Scan and extract will fail until they are installed.",
            warn()
        );
    }

    Ok(())
}
