//! Task mutation commands: modify, start, stop, done, delete
//!
//! All of them run inside one write transaction with GC ahead of the
//! change, and succeed regardless of what garbage the task's existing
//! attributes contain; only new user-supplied values are validated.

use chrono::{DateTime, Utc};

use crate::classify::CommandSpec;
use crate::dates::{self, to_epoch_string};
use crate::error::{Error, Result};
use crate::store::WriteTxn;
use crate::task::{
    Status, Task, ATTR_DESCRIPTION, ATTR_DUE, ATTR_END, ATTR_ENTRY, ATTR_RECUR, ATTR_RTYPE,
    ATTR_SCHEDULED, ATTR_START, ATTR_STATUS, ATTR_TAGS, ATTR_UNTIL, ATTR_WAIT,
};

use super::{resolve_task, with_write_txn, Context};

/// Attribute names settable via `name:value` arguments. Date-valued
/// ones get their value run through the input date grammar.
const DATE_MOD_ATTRS: [&str; 7] = [
    ATTR_DUE,
    ATTR_WAIT,
    ATTR_SCHEDULED,
    ATTR_UNTIL,
    ATTR_START,
    ATTR_END,
    ATTR_ENTRY,
];

const RAW_MOD_ATTRS: [&str; 4] = [ATTR_RECUR, ATTR_RTYPE, ATTR_STATUS, "project"];

/// Parsed command-line modifications.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct Mods {
    pub description: Option<String>,
    pub set: Vec<(String, Option<String>)>,
    pub add_tags: Vec<String>,
    pub remove_tags: Vec<String>,
}

/// Parse modification arguments: plain words accumulate into a new
/// description, `+tag`/`-tag` adjust tags, and `name:value` sets an
/// attribute (empty value removes it).
pub(crate) fn parse_mods(args: &[String], now: DateTime<Utc>) -> Result<Mods> {
    let mut mods = Mods::default();
    let mut words: Vec<&str> = Vec::new();

    for arg in args {
        if let Some(tag) = arg.strip_prefix('+') {
            if !tag.is_empty() {
                mods.add_tags.push(tag.to_string());
                continue;
            }
        }
        if let Some(tag) = arg.strip_prefix('-') {
            if !tag.is_empty() && !tag.starts_with('-') {
                mods.remove_tags.push(tag.to_string());
                continue;
            }
        }
        if let Some((name, value)) = arg.split_once(':') {
            if DATE_MOD_ATTRS.contains(&name) {
                let stored = if value.is_empty() {
                    None
                } else {
                    let when = dates::parse_date_expr(value, now)
                        .ok_or_else(|| Error::InvalidDate(value.to_string()))?;
                    Some(to_epoch_string(when))
                };
                mods.set.push((name.to_string(), stored));
                continue;
            }
            if RAW_MOD_ATTRS.contains(&name) {
                let stored = (!value.is_empty()).then(|| value.to_string());
                mods.set.push((name.to_string(), stored));
                continue;
            }
        }
        words.push(arg);
    }

    if !words.is_empty() {
        mods.description = Some(words.join(" "));
    }
    Ok(mods)
}

/// Turn parsed mods into store-level attribute changes for a task.
fn changes_for(task: &Task, mods: &Mods) -> Vec<(String, Option<String>)> {
    let mut changes = Vec::new();
    if let Some(description) = &mods.description {
        changes.push((ATTR_DESCRIPTION.to_string(), Some(description.clone())));
    }
    changes.extend(mods.set.iter().cloned());

    if !mods.add_tags.is_empty() || !mods.remove_tags.is_empty() {
        let mut tags: Vec<String> = task.data.tags().iter().map(|t| t.to_string()).collect();
        for tag in &mods.add_tags {
            if !tags.contains(tag) {
                tags.push(tag.clone());
            }
        }
        tags.retain(|t| !mods.remove_tags.contains(t));
        let value = (!tags.is_empty()).then(|| tags.join(","));
        changes.push((ATTR_TAGS.to_string(), value));
    }
    changes
}

fn apply(
    txn: &mut WriteTxn<'_>,
    needle: &str,
    now: DateTime<Utc>,
    changes_from: impl FnOnce(&Task) -> Vec<(String, Option<String>)>,
) -> Result<Task> {
    let task = resolve_task(&txn.snapshot(), needle)?;
    let changes = changes_from(&task);
    txn.update(task.uuid, &changes, now)?;
    Ok(task)
}

pub(crate) fn run_modify(
    ctx: &Context,
    spec: CommandSpec,
    needle: &str,
    args: &[String],
) -> Result<()> {
    let mods = parse_mods(args, ctx.now)?;
    let task = with_write_txn(ctx, spec, |txn| {
        apply(txn, needle, ctx.now, |task| changes_for(task, &mods))
    })?;
    println!("Modified task {}", task.uuid);
    Ok(())
}

pub(crate) fn run_start(ctx: &Context, spec: CommandSpec, needle: &str) -> Result<()> {
    let now = to_epoch_string(ctx.now);
    let task = with_write_txn(ctx, spec, |txn| {
        apply(txn, needle, ctx.now, |_| {
            vec![(ATTR_START.to_string(), Some(now.clone()))]
        })
    })?;
    println!("Started task {}", task.uuid);
    Ok(())
}

pub(crate) fn run_stop(ctx: &Context, spec: CommandSpec, needle: &str) -> Result<()> {
    let task = with_write_txn(ctx, spec, |txn| {
        apply(txn, needle, ctx.now, |_| vec![(ATTR_START.to_string(), None)])
    })?;
    println!("Stopped task {}", task.uuid);
    Ok(())
}

pub(crate) fn run_done(ctx: &Context, spec: CommandSpec, needle: &str) -> Result<()> {
    let end = to_epoch_string(ctx.now);
    let task = with_write_txn(ctx, spec, |txn| {
        apply(txn, needle, ctx.now, |_| {
            vec![
                (ATTR_STATUS.to_string(), Some(Status::Completed.name().to_string())),
                (ATTR_END.to_string(), Some(end.clone())),
            ]
        })
    })?;
    println!("Completed task {}", task.uuid);
    Ok(())
}

pub(crate) fn run_delete(ctx: &Context, spec: CommandSpec, needle: &str) -> Result<()> {
    let end = to_epoch_string(ctx.now);
    let task = with_write_txn(ctx, spec, |txn| {
        apply(txn, needle, ctx.now, |_| {
            vec![
                (ATTR_STATUS.to_string(), Some(Status::Deleted.name().to_string())),
                (ATTR_END.to_string(), Some(end.clone())),
            ]
        })
    })?;
    println!("Deleted task {}", task.uuid);
    Ok(())
}
