//! Terminal UI utilities for progress indication and styled output.
//!
//! All colouring lives here; the comparison and conversion libraries only
//! return data.

use std::borrow::Cow;
use std::fmt::Display;
use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Enable or disable ANSI styling on both output streams.
pub fn set_colors(enabled: bool) {
    console::set_colors_enabled(enabled);
    console::set_colors_enabled_stderr(enabled);
}

/// Spinner for indeterminate progress.
pub struct Spinner {
    bar: ProgressBar,
}

impl Spinner {
    /// Create a new spinner with a message.
    pub fn new(message: impl Into<Cow<'static, str>>) -> Self {
        let bar = ProgressBar::new_spinner();
        if let Ok(spinner_style) = ProgressStyle::default_spinner()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
            .template("{spinner:.cyan} {msg}")
        {
            bar.set_style(spinner_style);
        }
        bar.set_message(message);
        bar.enable_steady_tick(Duration::from_millis(80));
        Self { bar }
    }

    /// Finish the spinner with a success message.
    pub fn finish_with_success(&self, message: &str) {
        self.bar.finish_and_clear();
        success(message);
    }

    /// Finish the spinner with a failure message.
    pub fn finish_with_failure(&self, message: &str) {
        self.bar.finish_and_clear();
        error(message);
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        self.bar.finish_and_clear();
    }
}

// ============================================================================
// Styled output helpers
// ============================================================================

/// Print an info message to stderr.
pub fn info(message: &str) {
    eprintln!("{} {}", style("→").cyan(), message);
}

/// Print a success message to stderr.
pub fn success(message: &str) {
    eprintln!("{} {}", style("✓").green().bold(), style(message).green());
}

/// Print an error message to stderr.
pub fn error(message: &str) {
    eprintln!("{} {}", style("✗").red().bold(), style(message).red());
}

/// Print a warning message to stderr.
pub fn warning(message: &str) {
    eprintln!("{} {}", style("!").yellow().bold(), style(message).yellow());
}

/// Print a dimmed, indented message to stderr.
pub fn dim(message: &str) {
    eprintln!("  {}", style(message).dim());
}

/// Print an indented line to stderr.
pub fn indent(message: &str) {
    eprintln!("  {message}");
}

/// Highlight a file path or other operand inside a message.
pub fn highlight(value: impl Display) -> String {
    style(value).yellow().to_string()
}

/// `n` followed by `noun`, with a plural `s` unless `n` is 1.
pub fn count(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("{n} {noun}")
    } else {
        format!("{n} {noun}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_pluralizes() {
        assert_eq!(count(0, "instruction"), "0 instructions");
        assert_eq!(count(1, "instruction"), "1 instruction");
        assert_eq!(count(2, "occurrence"), "2 occurrences");
    }
}
