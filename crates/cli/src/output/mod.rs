//! Output formatting utilities
//!
//! This module provides formatters for CLI output in both human-readable
//! and JSON formats. It also handles progress spinners and colored output.

mod formatter;
mod progress;

use bk_core::config::Defaults;

pub use formatter::Formatter;
pub use progress::Spinner;

/// Output configuration derived from CLI flags
#[derive(Debug, Clone, Default)]
pub struct OutputConfig {
    /// Use JSON output format
    pub json: bool,
    /// Disable colored output
    pub no_color: bool,
    /// Color even when the stream is not a terminal
    pub force_color: bool,
    /// Disable progress spinner
    pub no_progress: bool,
    /// Suppress non-error output
    pub quiet: bool,
}

impl OutputConfig {
    /// Fold config-file defaults into flags the user did not set
    pub fn apply_defaults(&mut self, defaults: &Defaults) {
        self.json |= defaults.output == "json";
        self.no_color |= defaults.color == "never";
        self.force_color |= defaults.color == "always";
        self.no_progress |= !defaults.progress;
    }
}
