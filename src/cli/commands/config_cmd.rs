//! Configuration display.

use console::style;

use docscan::{Config, Settings};

use crate::cli::icons::note;

/// Print where configuration came from and the effective settings as JSON.
pub fn cmd_config(settings: &Settings, config: &Config) -> anyhow::Result<()> {
    let source = config
        .source_path
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "none (defaults)".to_string());

    eprintln!("{} Config file: {}", note(), style(source).bold());
    println!("{}", serde_json::to_string_pretty(settings)?);

    Ok(())
}
