//! Terminal capability detection and utilities

use owo_colors::{OwoColorize, colors::css};

/// Widest rule drawn under report headings.
const MAX_RULE_WIDTH: usize = 40;

/// Detects whether colored output should be enabled
pub fn supports_color() -> bool {
    supports_color::on(supports_color::Stream::Stdout).is_some()
}

/// Detects terminal width, returning None if not available
pub fn terminal_width() -> Option<u16> {
    terminal_size::terminal_size().map(|(w, _)| w.0)
}

/// A horizontal rule that fits the terminal.
pub fn rule() -> String {
    let width = terminal_width().map_or(MAX_RULE_WIDTH, |w| usize::from(w).min(MAX_RULE_WIDTH));
    "-".repeat(width)
}

/// Colours status messages, or leaves them plain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Style {
    color: bool,
}

impl Style {
    /// Colour only if stdout supports it.
    pub fn detect() -> Self {
        Self {
            color: supports_color(),
        }
    }

    /// Never colour.
    pub const fn plain() -> Self {
        Self { color: false }
    }

    /// Color as success (green)
    pub fn success(self, text: &str) -> String {
        if self.color {
            text.fg::<css::Green>().to_string()
        } else {
            text.to_string()
        }
    }

    /// Color as warning (amber)
    pub fn warning(self, text: &str) -> String {
        if self.color {
            text.fg::<css::Orange>().to_string()
        } else {
            text.to_string()
        }
    }

    /// Color as info (blue)
    pub fn info(self, text: &str) -> String {
        if self.color {
            text.fg::<css::LightBlue>().to_string()
        } else {
            text.to_string()
        }
    }

    /// Dim the text
    pub fn dim(self, text: &str) -> String {
        if self.color {
            text.dimmed().to_string()
        } else {
            text.to_string()
        }
    }
}
