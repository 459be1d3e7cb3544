//! tk export command implementation
//!
//! Read-only raw JSON dump of every task, attribute strings verbatim.
//! Invalid temporal or recurrence values are exported as stored.

use crate::error::Result;
use crate::report;

use super::Context;

pub(crate) fn run(ctx: &Context) -> Result<()> {
    let snapshot = ctx.store.read()?;
    println!("{}", report::export(&snapshot.all())?);
    Ok(())
}
