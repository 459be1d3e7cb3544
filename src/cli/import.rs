//! tk import-v2 command implementation
//!
//! Bulk import of the legacy flat files. Mutates the store but runs no
//! GC; per-record add/merge lines go to stdout, and the summary count
//! is a footnote on stderr.

use crate::error::Result;
use crate::import;
use crate::output::footnote;

use super::Context;

pub(crate) fn run(ctx: &Context) -> Result<()> {
    let outcome = import::run(&ctx.store, ctx.now)?;

    for record in &outcome.records {
        let verb = if record.merged { " mod" } else { " add" };
        let description = if record.description.is_empty() {
            "(no description)"
        } else {
            record.description.as_str()
        };
        println!("{} {} {}", verb, record.uuid, description);
    }

    footnote(
        &ctx.config,
        &format!(
            "Imported {} tasks from legacy files. You may now delete these files.",
            outcome.imported()
        ),
    );
    Ok(())
}
