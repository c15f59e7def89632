//! Table rendering for CLI output using comfy-table.
//!
//! ## Tables Overview
//!
//! | Command | Table Function |
//! |---------|----------------|
//! | `cluepath filter` | `render_clue_table()` |
//! | `cluepath stages` | `render_stage_table()` |

use comfy_table::presets::NOTHING;
use comfy_table::{Cell, CellAlignment, ColumnConstraint, Table, Width};

use cluepath_core::{Clue, DisplayLevel, StageSummary};

use super::format::{format_confidence, format_thousands, truncate_str};

/// Columns other than FROM → TO take roughly this much space.
const FIXED_COLUMNS_WIDTH: usize = 44;
const MIN_EDGE_WIDTH: usize = 20;

fn level_label(level: DisplayLevel) -> &'static str {
    match level {
        DisplayLevel::Final => "final",
        DisplayLevel::Intermediate => "intermediate",
        DisplayLevel::Debug => "debug",
    }
}

/// Render the clue list shown by `cluepath filter`.
///
/// `width` is the terminal width; the FROM → TO column is truncated to fit.
///
/// ```text
/// ID     STAGE    FROM → TO          CONF   LEVEL
/// qa     recall   Q → A              0.90   intermediate
/// ab     expand   A → B              0.70   intermediate
/// ```
pub fn render_clue_table(clues: &[&Clue], width: usize) -> String {
    if clues.is_empty() {
        return String::new();
    }

    let edge_width = width
        .saturating_sub(FIXED_COLUMNS_WIDTH)
        .max(MIN_EDGE_WIDTH);

    let mut table = Table::new();
    table.load_preset(NOTHING);

    table.set_header(vec![
        Cell::new("ID"),
        Cell::new("STAGE"),
        Cell::new("FROM → TO"),
        Cell::new("CONF").set_alignment(CellAlignment::Right),
        Cell::new("LEVEL"),
    ]);

    table.set_constraints(vec![
        ColumnConstraint::LowerBoundary(Width::Fixed(6)),  // ID
        ColumnConstraint::LowerBoundary(Width::Fixed(8)),  // STAGE
        ColumnConstraint::LowerBoundary(Width::Fixed(12)), // FROM → TO
        ColumnConstraint::LowerBoundary(Width::Fixed(6)),  // CONF
        ColumnConstraint::LowerBoundary(Width::Fixed(8)),  // LEVEL
    ]);

    for clue in clues {
        let edge = format!("{} → {}", clue.from.id, clue.to.id);
        table.add_row(vec![
            Cell::new(truncate_str(&clue.id, 16)),
            Cell::new(clue.stage.as_str()),
            Cell::new(truncate_str(&edge, edge_width)),
            Cell::new(format_confidence(clue.confidence)).set_alignment(CellAlignment::Right),
            Cell::new(level_label(clue.effective_display_level())),
        ]);
    }

    table.trim_fmt().to_string()
}

/// Render per-stage counts for `cluepath stages`.
///
/// ```text
/// STAGE     TOTAL   FINAL   INTERMEDIATE   DEBUG
/// prepare       0       0              0       0
/// recall        2       1              1       0
/// ```
pub fn render_stage_table(summaries: &[StageSummary]) -> String {
    if summaries.is_empty() {
        return String::new();
    }

    let mut table = Table::new();
    table.load_preset(NOTHING);

    table.set_header(vec![
        Cell::new("STAGE"),
        Cell::new("TOTAL").set_alignment(CellAlignment::Right),
        Cell::new("FINAL").set_alignment(CellAlignment::Right),
        Cell::new("INTERMEDIATE").set_alignment(CellAlignment::Right),
        Cell::new("DEBUG").set_alignment(CellAlignment::Right),
    ]);

    table.set_constraints(vec![
        ColumnConstraint::LowerBoundary(Width::Fixed(9)),
        ColumnConstraint::LowerBoundary(Width::Fixed(7)),
        ColumnConstraint::LowerBoundary(Width::Fixed(7)),
        ColumnConstraint::LowerBoundary(Width::Fixed(14)),
        ColumnConstraint::LowerBoundary(Width::Fixed(7)),
    ]);

    for summary in summaries {
        let count = |n: usize| Cell::new(format_thousands(n as u64)).set_alignment(CellAlignment::Right);
        table.add_row(vec![
            Cell::new(summary.stage.as_str()),
            count(summary.total),
            count(summary.final_clues),
            count(summary.intermediate_clues),
            count(summary.debug_clues),
        ]);
    }

    table.trim_fmt().to_string()
}
