//! Garbage collection
//!
//! A linear pass over the stored tasks that folds elapsed time into
//! task state before a mutating command runs:
//!
//! - waiting tasks whose `wait` has elapsed become plain pending
//! - pending tasks whose `until` has passed are deleted
//! - recurring templates spawn pending child instances for every
//!   period boundary already reached
//! - the working set (positional ids) is rebuilt
//!
//! Unparsable temporal or recurrence attributes mean "condition not
//! met": the task is left alone, never an error. GC only ever runs
//! inside an already-open write transaction of a mutating command, and
//! never when the `gc` option is disabled; read-only commands never get
//! here at all.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use tracing::debug;
use uuid::Uuid;

use crate::dates::{self, to_epoch_string, RecurrenceKind};
use crate::store::WriteTxn;
use crate::task::{
    Status, TaskData, ATTR_DUE, ATTR_END, ATTR_ENTRY, ATTR_IMASK, ATTR_MASK, ATTR_MODIFIED,
    ATTR_PARENT, ATTR_RECUR, ATTR_RTYPE, ATTR_STATUS, ATTR_UNTIL, ATTR_WAIT,
};

/// Upper bound on instances spawned per template per pass, so a
/// template with a tiny period and an ancient due date cannot stall a
/// command.
const MAX_SPAWN_PER_TEMPLATE: u32 = 100;

/// What a GC pass did. Only used for logging and tests; the working
/// set is rebuilt regardless.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GcStats {
    pub promoted: usize,
    pub expired: usize,
    pub spawned: usize,
}

/// Run one GC pass inside an open write transaction.
pub fn run(txn: &mut WriteTxn<'_>, now: DateTime<Utc>) -> GcStats {
    let mut stats = GcStats::default();

    for uuid in txn.uuids() {
        let Some(data) = txn.get(uuid) else { continue };
        match data.status() {
            Status::Waiting => {
                if wait_elapsed(data, now) {
                    if let Some(data) = txn.get_mut(uuid) {
                        data.set_status(Status::Pending, now);
                        data.set(ATTR_WAIT, None, now);
                        stats.promoted += 1;
                        debug!(%uuid, "promoted waiting task to pending");
                    }
                }
            }
            Status::Pending => {
                if until_passed(data, now) {
                    if let Some(data) = txn.get_mut(uuid) {
                        data.set_status(Status::Deleted, now);
                        data.set(ATTR_END, Some(&to_epoch_string(now)), now);
                        stats.expired += 1;
                        debug!(%uuid, "expired pending task past its until date");
                    }
                }
            }
            Status::Recurring => {
                stats.spawned += spawn_due_instances(txn, uuid, now);
            }
            Status::Completed | Status::Deleted => {}
        }
    }

    rebuild_working_set(txn, now);
    stats
}

fn wait_elapsed(data: &TaskData, now: DateTime<Utc>) -> bool {
    data.get(ATTR_WAIT)
        .and_then(dates::parse_date)
        .map(|wait| wait <= now)
        .unwrap_or(false)
}

fn until_passed(data: &TaskData, now: DateTime<Utc>) -> bool {
    data.get(ATTR_UNTIL)
        .and_then(dates::parse_date)
        .map(|until| until < now)
        .unwrap_or(false)
}

/// Spawn pending instances of a recurring template for every period
/// boundary already reached. The template itself stays recurring; its
/// `mask` attribute grows one character per spawned child, which is how
/// already-spawned boundaries are remembered.
fn spawn_due_instances(txn: &mut WriteTxn<'_>, template_uuid: Uuid, now: DateTime<Utc>) -> usize {
    let Some(template) = txn.get(template_uuid) else {
        return 0;
    };

    let rtype = template.get(ATTR_RTYPE).unwrap_or_default();
    let recur = template.get(ATTR_RECUR).unwrap_or_default();
    let Some(rule) = dates::parse_recurrence(rtype, recur) else {
        return 0; // invalid recurrence metadata is display-only
    };
    let Some(due) = template.get(ATTR_DUE).and_then(dates::parse_date) else {
        return 0;
    };

    // Chained templates wait for the previous instance to finish.
    if rule.kind == RecurrenceKind::Chained && has_open_child(txn, template_uuid) {
        return 0;
    }

    let template_attrs = template.attributes.clone();
    let mut spawned_mask = template.get(ATTR_MASK).unwrap_or_default().to_string();
    let mut spawned = 0;

    while spawned < MAX_SPAWN_PER_TEMPLATE {
        let index = spawned_mask.len() as u32;
        let Some(next_due) = rule.period.advance(due, index) else {
            break;
        };
        if next_due > now {
            break;
        }

        let child_uuid = Uuid::new_v4();
        let child = instance_attributes(&template_attrs, template_uuid, index, next_due, now);
        txn.create(child_uuid, child, now);
        spawned_mask.push('-');
        spawned += 1;
        debug!(template = %template_uuid, child = %child_uuid, "spawned recurring instance");

        if rule.kind == RecurrenceKind::Chained {
            break;
        }
    }

    if spawned > 0 {
        if let Some(template) = txn.get_mut(template_uuid) {
            template.set(ATTR_MASK, Some(&spawned_mask), now);
        }
    }
    spawned as usize
}

fn has_open_child(txn: &WriteTxn<'_>, template_uuid: Uuid) -> bool {
    let parent = template_uuid.to_string();
    txn.uuids().into_iter().any(|uuid| {
        txn.get(uuid)
            .map(|data| data.get(ATTR_PARENT) == Some(parent.as_str()) && !data.status().is_terminal())
            .unwrap_or(false)
    })
}

fn instance_attributes(
    template: &BTreeMap<String, String>,
    template_uuid: Uuid,
    index: u32,
    due: DateTime<Utc>,
    now: DateTime<Utc>,
) -> BTreeMap<String, String> {
    let mut attrs: BTreeMap<String, String> = template
        .iter()
        .filter(|(name, _)| {
            !matches!(
                name.as_str(),
                ATTR_STATUS | ATTR_DUE | ATTR_ENTRY | ATTR_MODIFIED | ATTR_MASK | ATTR_UNTIL
            )
        })
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect();
    attrs.insert(ATTR_STATUS.to_string(), Status::Pending.name().to_string());
    attrs.insert(ATTR_DUE.to_string(), to_epoch_string(due));
    attrs.insert(ATTR_ENTRY.to_string(), to_epoch_string(now));
    attrs.insert(ATTR_PARENT.to_string(), template_uuid.to_string());
    attrs.insert(ATTR_IMASK.to_string(), index.to_string());
    attrs
}

/// Rebuild the working set: still-visible tasks keep their positions,
/// newly visible ones are appended in uuid order.
fn rebuild_working_set(txn: &mut WriteTxn<'_>, now: DateTime<Utc>) {
    let previous: Vec<Uuid> = txn.working_set().to_vec();
    let mut next = Vec::new();

    for uuid in &previous {
        if txn.get(*uuid).map(|data| is_visible(data, now)).unwrap_or(false) {
            next.push(*uuid);
        }
    }
    for uuid in txn.uuids() {
        if next.contains(&uuid) {
            continue;
        }
        if txn.get(uuid).map(|data| is_visible(data, now)).unwrap_or(false) {
            next.push(uuid);
        }
    }

    txn.set_working_set(next);
}

/// Whether a task occupies a working-set slot: pending, and not hidden
/// by a still-future wait date.
fn is_visible(data: &TaskData, now: DateTime<Utc>) -> bool {
    if data.status() != Status::Pending {
        return false;
    }
    match data.get(ATTR_WAIT).and_then(dates::parse_date) {
        Some(wait) => wait <= now,
        None => true, // absent or unparsable wait does not hide
    }
}
