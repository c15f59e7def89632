//! Color handling for CLI output.
//!
//! `--color` / `CLUEPATH_COLOR` is parsed by clap into [`ColorMode`], so an
//! unknown value is rejected at argument parsing. In `auto` mode colors are
//! used only when stdout is a terminal and `NO_COLOR` is unset
//! (https://no-color.org/).

use std::io::IsTerminal;

use clap::ValueEnum;

/// Value of the `--color` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorMode {
    Always,
    Never,
    #[default]
    Auto,
}

impl ColorMode {
    /// Resolve the mode against the current environment.
    pub fn is_enabled(self) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Auto => std::env::var_os("NO_COLOR").is_none() && std::io::stdout().is_terminal(),
        }
    }
}

/// Terminal width in columns; 80 when stdout is not a terminal.
pub fn terminal_width() -> usize {
    terminal_size::terminal_size()
        .map(|(w, _)| w.0 as usize)
        .unwrap_or(80)
}
