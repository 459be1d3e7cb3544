//! Shared output formatting for tk CLI commands.
//!
//! Report tables and info views go to stdout; footnotes (the import
//! count, GC notices) are diagnostics and go to stderr, gated by the
//! `verbose` configuration.

use crate::config::Config;
use crate::report::Report;

/// Render a report as an aligned text table. Empty reports produce no
/// output at all.
pub fn render_table(report: &Report) -> String {
    if report.rows.is_empty() {
        return String::new();
    }

    let mut widths: Vec<usize> = report.columns.iter().map(String::len).collect();
    for row in &report.rows {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() && cell.len() > widths[i] {
                widths[i] = cell.len();
            }
        }
    }

    let mut out = String::new();
    render_row(&mut out, &report.columns, &widths);
    let separators: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    render_row(&mut out, &separators, &widths);
    for row in &report.rows {
        render_row(&mut out, row, &widths);
    }
    out
}

fn render_row(out: &mut String, cells: &[String], widths: &[usize]) {
    let mut line = String::new();
    for (i, cell) in cells.iter().enumerate() {
        if i > 0 {
            line.push(' ');
        }
        let width = widths.get(i).copied().unwrap_or(0);
        line.push_str(&format!("{:<width$}", cell, width = width));
    }
    out.push_str(line.trim_end());
    out.push('\n');
}

/// Render label/value pairs as the two-column info layout.
pub fn render_pairs(fields: &[(String, String)]) -> String {
    let width = fields.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
    let mut out = String::new();
    for (label, value) in fields {
        out.push_str(&format!("{:<width$}  {}\n", label, value, width = width));
    }
    out
}

/// Emit a footnote diagnostic on stderr, unless verbosity suppresses it.
pub fn footnote(config: &Config, message: &str) {
    if config.footnotes_enabled() {
        eprintln!("{}", message);
    }
}

/// Emit an error on stderr.
pub fn emit_error(err: &crate::error::Error) {
    eprintln!("Error: {}", err);
}
