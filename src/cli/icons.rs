//! Status markers for pipeline and tool output on stderr.

use console::{style, StyledObject};

/// A stage finished.
pub fn success() -> StyledObject<&'static str> {
    style("✓").green()
}

/// A stage failed; the document stays where it was.
pub fn failure() -> StyledObject<&'static str> {
    style("✗").red()
}

pub fn warn() -> StyledObject<&'static str> {
    style("!").yellow()
}

/// Secondary detail under a status line.
pub fn note() -> StyledObject<&'static str> {
    style("→").dim()
}

/// Whether an external tool can be run.
pub fn availability(available: bool) -> StyledObject<&'static str> {
    if available {
        style("✓ available").green()
    } else {
        style("✗ not available").red()
    }
}

/// Intent label, highlighted when the current stage allows it.
pub fn toggle(label: &str, enabled: bool) -> String {
    if enabled {
        style(label).green().bold().to_string()
    } else {
        style(label).dim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markers_keep_their_text() {
        console::set_colors_enabled(false);
        assert_eq!(success().to_string(), "✓");
        assert_eq!(failure().to_string(), "✗");
        assert_eq!(availability(true).to_string(), "✓ available");
        assert_eq!(availability(false).to_string(), "✗ not available");
        assert_eq!(toggle("scan", true), "scan");
        assert_eq!(toggle("save", false), "save");
    }
}
