//! Message styling for CLI output.
//!
//! Provides consistent prefixes, colors, and formatting for all CLI messages.
//!
//! ## Message Types
//!
//! | Prefix | Meaning | Color |
//! |--------|---------|-------|
//! | `[err]` | Error | Red |
//! | `[warn]` | Warning or diagnostic | Yellow |
//! | `[info]` | Information | Blue |

use owo_colors::OwoColorize;

use cluepath_core::{PathTermination, Stage};

use super::color::ColorMode;

/// Message severity/type for CLI output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    Err,
    /// Also used for reconstruction diagnostics.
    Warn,
    Info,
}

impl MessageType {
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Err => "[err]",
            Self::Warn => "[warn]",
            Self::Info => "[info]",
        }
    }
}

/// Main styling interface for CLI output.
#[derive(Debug, Clone)]
pub struct Style {
    color_mode: ColorMode,
}

impl Default for Style {
    fn default() -> Self {
        Self::new(ColorMode::Auto)
    }
}

impl Style {
    pub fn new(color_mode: ColorMode) -> Self {
        Self { color_mode }
    }

    pub fn colors_enabled(&self) -> bool {
        self.color_mode.is_enabled()
    }

    /// Format a simple message with a type prefix, e.g. `[info] Done`.
    pub fn message(&self, msg_type: MessageType, text: &str) -> String {
        let prefix = msg_type.prefix();
        if self.colors_enabled() {
            let colored_prefix = match msg_type {
                MessageType::Err => prefix.red().to_string(),
                MessageType::Warn => prefix.yellow().to_string(),
                MessageType::Info => prefix.blue().to_string(),
            };
            format!("{} {}", colored_prefix, text)
        } else {
            format!("{} {}", prefix, text)
        }
    }

    /// Format a detail line with 5-space indentation.
    pub fn message_detail(&self, label: &str, value: &str) -> String {
        format!("     {}: {}", label, value)
    }

    pub fn section(&self, title: &str) -> String {
        if self.colors_enabled() {
            title.bold().to_string()
        } else {
            title.to_string()
        }
    }

    /// Format a structured error with optional cause and hint.
    pub fn error_with_context(
        &self,
        msg: &str,
        cause: Option<&str>,
        hint: Option<&str>,
    ) -> String {
        let mut output = self.message(MessageType::Err, msg);

        if let Some(cause_text) = cause {
            output.push('\n');
            output.push_str(&format!("      Cause: {}", cause_text));
        }

        if let Some(hint_text) = hint {
            output.push('\n');
            output.push_str(&format!("      Hint: {}", hint_text));
        }

        output
    }

    /// Indented list item: `  - text`.
    pub fn list_item(&self, prefix: &str, text: &str) -> String {
        let styled_prefix = if self.colors_enabled() {
            prefix.dimmed().to_string()
        } else {
            prefix.to_string()
        };
        format!("  {} {}", styled_prefix, text)
    }

    pub fn key_value(&self, key: &str, value: &str) -> String {
        if self.colors_enabled() {
            format!("{}: {}", key.dimmed(), value)
        } else {
            format!("{}: {}", key, value)
        }
    }

    /// Format a confidence value with color based on magnitude.
    ///
    /// - >= 0.8: green
    /// - >= 0.5: yellow
    /// - < 0.5: red
    pub fn score(&self, value: f64) -> String {
        let formatted = format!("{:.2}", value);
        if self.colors_enabled() {
            if value >= 0.8 {
                formatted.green().to_string()
            } else if value >= 0.5 {
                formatted.yellow().to_string()
            } else {
                formatted.red().to_string()
            }
        } else {
            formatted
        }
    }

    /// Stage name, one color per stage.
    pub fn stage(&self, stage: Stage) -> String {
        let name = stage.as_str();
        if !self.colors_enabled() {
            return name.to_string();
        }
        match stage {
            Stage::Prepare => name.dimmed().to_string(),
            Stage::Recall => name.blue().to_string(),
            Stage::Expand => name.magenta().to_string(),
            Stage::Rerank => name.cyan().to_string(),
        }
    }

    /// How a path ended: `query`, `boundary`, or `dangling`.
    pub fn termination(&self, termination: PathTermination) -> String {
        let label = match termination {
            PathTermination::Query => "query",
            PathTermination::StopBoundary => "boundary",
            PathTermination::Dangling => "dangling",
        };
        if !self.colors_enabled() {
            return label.to_string();
        }
        match termination {
            PathTermination::Query => label.green().to_string(),
            PathTermination::StopBoundary => label.yellow().to_string(),
            PathTermination::Dangling => label.red().to_string(),
        }
    }
}
