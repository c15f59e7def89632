//! # CLI UI Module
//!
//! Styling and formatting layer for `cluepath` output.
//!
//! Human output goes through [`Style`] and the table renderers; `--json`
//! bypasses this module entirely and prints serde output.
//!
//! ## Module Structure
//!
//! - `color`: Color mode detection and terminal capability checks
//! - `style`: Message types, prefixes, and styling functions
//! - `format`: Utility formatters (confidence, counts, truncation)
//! - `table`: Table rendering with comfy-table

pub mod color;
pub mod format;
pub mod style;
pub mod table;

pub use color::ColorMode;
pub use style::{MessageType, Style};
