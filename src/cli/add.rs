//! tk add command implementation
//!
//! Creates a pending task from description words and modifications.
//! The new task joins the working set immediately so it gets a
//! positional id without waiting for the next GC pass.

use std::collections::BTreeMap;

use uuid::Uuid;

use crate::classify::CommandSpec;
use crate::dates::to_epoch_string;
use crate::error::{Error, Result};
use crate::task::{Status, ATTR_DESCRIPTION, ATTR_ENTRY, ATTR_STATUS, ATTR_TAGS};

use super::modify::parse_mods;
use super::{with_write_txn, Context};

pub(crate) fn run(ctx: &Context, spec: CommandSpec, args: &[String]) -> Result<()> {
    let mods = parse_mods(args, ctx.now)?;
    let description = mods
        .description
        .clone()
        .ok_or_else(|| Error::InvalidArgument("add requires a description".to_string()))?;

    let mut attributes = BTreeMap::new();
    attributes.insert(ATTR_DESCRIPTION.to_string(), description);
    attributes.insert(ATTR_STATUS.to_string(), Status::Pending.name().to_string());
    attributes.insert(ATTR_ENTRY.to_string(), to_epoch_string(ctx.now));
    for (name, value) in &mods.set {
        if let Some(value) = value {
            attributes.insert(name.clone(), value.clone());
        }
    }
    if !mods.add_tags.is_empty() {
        attributes.insert(ATTR_TAGS.to_string(), mods.add_tags.join(","));
    }

    let uuid = Uuid::new_v4();
    let id = with_write_txn(ctx, spec, |txn| {
        txn.create(uuid, attributes, ctx.now);
        let status = txn.get(uuid).map(|data| data.status());
        if status == Some(Status::Pending) {
            let mut working_set = txn.working_set().to_vec();
            working_set.push(uuid);
            txn.set_working_set(working_set);
        }
        Ok(txn.snapshot().id_of(uuid))
    })?;

    match id {
        Some(id) => println!("Created task {}", id),
        None => println!("Created task {}", uuid),
    }
    Ok(())
}
