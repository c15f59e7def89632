//! # cluepath CLI
//!
//! Command-line interface for the clue-path reconstruction engine.
//!
//! Loads a clue list exported from a search response and shows what the
//! graph view would render for a given stage selection and display mode.
//! Run `cluepath --help` for usage information.

mod cli;
pub mod ui;

use std::process::ExitCode;

fn main() -> ExitCode {
    cli::run()
}
