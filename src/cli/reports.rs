//! Report commands: list, completed, burndown, reports, custom reports
//!
//! All report-style commands except `reports` are classified as
//! mutating because GC regenerates the working set before they render;
//! with GC disabled their transaction records nothing and the store is
//! left untouched.

use crate::classify::CommandSpec;
use crate::dates::format_date;
use crate::error::Result;
use crate::output::render_table;
use crate::report::{self, Report};

use super::{with_write_txn, Context};

/// Render a named report (built-in or custom).
pub(crate) fn run_named(ctx: &Context, spec: CommandSpec, name: &str) -> Result<()> {
    let snapshot = if spec.read_only {
        ctx.store.read()?
    } else {
        with_write_txn(ctx, spec, |txn| Ok(txn.snapshot()))?
    };
    let report = report::render(name, &snapshot, &ctx.config)?;
    print!("{}", render_table(&report));
    Ok(())
}

pub(crate) fn run_burndown(ctx: &Context, spec: CommandSpec) -> Result<()> {
    let snapshot = with_write_txn(ctx, spec, |txn| Ok(txn.snapshot()))?;
    let buckets = report::burndown(&snapshot, ctx.now, 8);

    let rows = buckets
        .iter()
        .map(|bucket| {
            vec![
                format_date(bucket.week_start, &ctx.config.dateformat),
                bucket.started.to_string(),
                bucket.finished.to_string(),
            ]
        })
        .collect();
    let table = Report {
        name: "burndown".to_string(),
        columns: vec![
            "Week".to_string(),
            "Started".to_string(),
            "Finished".to_string(),
        ],
        rows,
    };
    print!("{}", render_table(&table));
    Ok(())
}

/// List the known report names. Strictly read-only.
pub(crate) fn run_reports(ctx: &Context) -> Result<()> {
    for name in report::report_names(&ctx.config) {
        println!("{}", name);
    }
    Ok(())
}
