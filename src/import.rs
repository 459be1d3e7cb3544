//! Legacy bulk import
//!
//! Reads the two old flat files (`pending.data` for live tasks,
//! `completed.data` for history) from the data directory and merges
//! their records into the store in one transaction. A malformed line or
//! a record without a uuid is skipped with a diagnostic; the rest of
//! the batch continues, and the reported count covers every record that
//! made it in.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use tracing::warn;
use uuid::Uuid;

use crate::codec;
use crate::error::{Error, Result};
use crate::store::TaskStore;
use crate::task::{dep_attr, tag_attr, ATTR_DEPENDS, ATTR_TAGS};

/// Legacy file names, imported in this order.
pub const LEGACY_FILES: [&str; 2] = ["pending.data", "completed.data"];

/// One successfully decoded record, ready for the store.
#[derive(Debug, Clone)]
pub struct ImportedRecord {
    pub uuid: Uuid,
    pub description: String,
    /// Whether the uuid was already present (merge rather than add).
    pub merged: bool,
}

/// Outcome of a legacy import run.
#[derive(Debug, Clone, Default)]
pub struct ImportOutcome {
    pub records: Vec<ImportedRecord>,
    pub skipped: usize,
}

impl ImportOutcome {
    pub fn imported(&self) -> usize {
        self.records.len()
    }
}

/// Import both legacy files (either may be absent) into the store.
pub fn run(store: &TaskStore, now: DateTime<Utc>) -> Result<ImportOutcome> {
    let mut decoded: Vec<(Uuid, BTreeMap<String, String>)> = Vec::new();
    let mut outcome = ImportOutcome::default();

    for file_name in LEGACY_FILES {
        let path = store.data_dir().join(file_name);
        if !path.exists() {
            continue;
        }
        load_file(&path, &mut decoded, &mut outcome)?;
    }

    let mut txn = store.write()?;
    let merged = txn.import_batch(decoded, now);
    for (record, merged) in outcome.records.iter_mut().zip(merged) {
        record.merged = merged;
    }
    txn.commit()?;

    Ok(outcome)
}

fn load_file(
    path: &Path,
    decoded: &mut Vec<(Uuid, BTreeMap<String, String>)>,
    outcome: &mut ImportOutcome,
) -> Result<()> {
    let contents = std::fs::read_to_string(path)?;
    for (index, line) in contents.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let mut attributes = match codec::decode(line) {
            Ok(attributes) => attributes,
            Err(source) => {
                let err = Error::Parse {
                    path: path.to_path_buf(),
                    line: index + 1,
                    source,
                };
                warn!(%err, "skipping malformed record");
                outcome.skipped += 1;
                continue;
            }
        };

        let uuid = attributes
            .get("uuid")
            .and_then(|raw| raw.parse::<Uuid>().ok());
        let Some(uuid) = uuid else {
            warn!(path = %path.display(), line = index + 1, "skipping record with no uuid");
            outcome.skipped += 1;
            continue;
        };

        expand_markers(&mut attributes);
        // uuid and the old positional id are not stored as attributes
        attributes.remove("uuid");
        attributes.remove("id");

        outcome.records.push(ImportedRecord {
            uuid,
            description: attributes.get("description").cloned().unwrap_or_default(),
            merged: false,
        });
        decoded.push((uuid, attributes));
    }
    Ok(())
}

/// Compatibility expansion from the old loader: every tag in `tags`
/// also materializes a `tag_<name>` marker, and every uuid in `depends`
/// a `dep_<uuid>` marker.
fn expand_markers(attributes: &mut BTreeMap<String, String>) {
    if let Some(tags) = attributes.get(ATTR_TAGS).cloned() {
        for tag in tags.split(',').filter(|t| !t.is_empty()) {
            attributes.insert(tag_attr(tag), "x".to_string());
        }
    }
    if let Some(depends) = attributes.get(ATTR_DEPENDS).cloned() {
        for dep in depends.split(',').filter(|d| !d.is_empty()) {
            attributes.insert(dep_attr(dep), "x".to_string());
        }
    }
}
