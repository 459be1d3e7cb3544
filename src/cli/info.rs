//! tk info command implementation
//!
//! Read-only detail view of one task: the label/value table followed
//! by the journal of recorded attribute changes. Labels for malformed
//! temporal attributes are omitted; recurrence metadata shows as raw
//! text.

use crate::error::Result;
use crate::output::render_pairs;
use crate::report;

use super::{resolve_task, Context};

pub(crate) fn run(ctx: &Context, needle: &str) -> Result<()> {
    let snapshot = ctx.store.read()?;
    let task = resolve_task(&snapshot, needle)?;

    let (fields, journal) = report::info(&task, &snapshot, &ctx.config);
    print!("{}", render_pairs(&fields));
    if !journal.is_empty() {
        println!();
        for line in journal {
            println!("{}", line);
        }
    }
    Ok(())
}
