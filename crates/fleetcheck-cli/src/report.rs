// crates/fleetcheck-cli/src/report.rs
// ============================================================================
// Module: Run Report Rendering
// Description: Text table rendering for run summaries and plans.
// Purpose: Produce the operator-facing report lines written to stdout.
// Dependencies: fleetcheck-core
// ============================================================================

//! ## Overview
//! Rendering is pure: functions turn a summary or plan into lines and leave
//! writing to the caller. The table pads each column to its widest cell so
//! statuses line up when an operator scans hundreds of results.

// ============================================================================
// SECTION: Imports
// ============================================================================

use fleetcheck_core::Plan;
use fleetcheck_core::RunSummary;
use fleetcheck_core::TestResult;

// ============================================================================
// SECTION: Table Rendering
// ============================================================================

/// Column headers for the result table.
const HEADERS: [&str; 4] = ["DEVICE", "CHECK", "STATUS", "MESSAGES"];

/// Renders the result table, one line per result plus a header.
#[must_use]
pub fn render_table(summary: &RunSummary) -> Vec<String> {
    let rows: Vec<[String; 4]> = summary.results().iter().map(row).collect();
    let widths = column_widths(&rows);

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(format_row(&HEADERS.map(String::from), &widths));
    for result_row in &rows {
        lines.push(format_row(result_row, &widths));
    }
    lines
}

/// Renders the planned units of a dry run, one line per unit.
#[must_use]
pub fn render_plan(plan: &Plan) -> Vec<String> {
    plan.units()
        .iter()
        .map(|unit| format!("{} {}", unit.binding.device, unit.binding.check))
        .collect()
}

/// Builds the table row for one result.
fn row(result: &TestResult) -> [String; 4] {
    [
        result.device.to_string(),
        result.check.to_string(),
        result.status.as_str().to_string(),
        result.messages.join("; "),
    ]
}

/// Computes the width of each column over headers and rows.
fn column_widths(rows: &[[String; 4]]) -> [usize; 4] {
    let mut widths = HEADERS.map(str::len);
    for result_row in rows {
        for (width, cell) in widths.iter_mut().zip(result_row) {
            *width = (*width).max(cell.len());
        }
    }
    widths
}

/// Pads every cell to its column width; the last column is left ragged.
fn format_row(cells: &[String; 4], widths: &[usize; 4]) -> String {
    format!(
        "{:<w0$}  {:<w1$}  {:<w2$}  {}",
        cells[0],
        cells[1],
        cells[2],
        cells[3],
        w0 = widths[0],
        w1 = widths[1],
        w2 = widths[2],
    )
    .trim_end()
    .to_string()
}
