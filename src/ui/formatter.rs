//! Pure formatting functions for UI output.
//!
//! Functions here build the styled strings; printing is left to the
//! [`ConsoleLogger`](super::ConsoleLogger) so the formatting stays testable.

use console::style;

/// Format a status message with a yellow arrow.
pub fn format_status(message: &str) -> String {
    format!("{} {}", style("→").yellow(), message)
}

/// Format a success message with a green checkmark.
pub fn format_success(message: &str) -> String {
    format!("{} {}", style("✓").green(), message)
}

/// Format a warning message with a yellow warning sign.
pub fn format_warning(message: &str) -> String {
    format!("{} {}", style("⚠ WARNING:").yellow(), message)
}

/// Format an error message in red.
pub fn format_error(message: &str) -> String {
    format!("{} {}", style("ERROR:").red(), message)
}

/// Format the final summary line for a built gem.
///
/// # Arguments
/// * `gem_file` - Artifact file name returned by the prepare step
/// * `version` - Release version that was written
pub fn format_prepared(gem_file: &str, version: &str) -> String {
    format!(
        "Prepared release {}: built {}",
        style(version).bold(),
        style(gem_file).cyan()
    )
}
