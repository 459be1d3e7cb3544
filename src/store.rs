//! Task store
//!
//! Owns the durable task collection: a single JSON file in the data
//! directory holding every task (keyed by uuid) plus the working set,
//! the ordered list of uuids behind the positional ids reports show.
//!
//! Access is split by session type so the read/write discipline is
//! visible in the API rather than emergent from call order:
//!
//! - [`TaskStore::read`] returns a [`Snapshot`]: loads the file and can
//!   never write. Read-only commands use only this path, so the store
//!   file's modification time is untouched.
//! - [`TaskStore::write`] returns a [`WriteTxn`]: takes an exclusive
//!   fs2 lock, loads, buffers mutations in memory, and persists them on
//!   [`WriteTxn::commit`] with an atomic temp-and-rename write. Dropping
//!   the transaction without committing discards everything; a commit
//!   that recorded no changes does not touch the file.
//!
//! Writes are serialized by the lock; concurrent readers always see a
//! fully-written file thanks to the rename.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::dates::to_epoch_string;
use crate::error::{Error, Result};
use crate::lock::{self, FileLock, DEFAULT_LOCK_TIMEOUT_MS};
use crate::task::{Task, TaskData, ATTR_MODIFIED};

/// Store file name inside the data directory
pub const STORE_FILE: &str = "tasks.json";

/// Schema identifier written into the store file
pub const STORE_SCHEMA_VERSION: &str = "tk.store.v1";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoreFile {
    schema_version: String,
    #[serde(default)]
    tasks: BTreeMap<Uuid, TaskData>,
    #[serde(default)]
    working_set: Vec<Uuid>,
}

impl Default for StoreFile {
    fn default() -> Self {
        Self {
            schema_version: STORE_SCHEMA_VERSION.to_string(),
            tasks: BTreeMap::new(),
            working_set: Vec::new(),
        }
    }
}

/// Handle on the durable task store. Cheap to create; sessions do the I/O.
#[derive(Debug, Clone)]
pub struct TaskStore {
    data_dir: PathBuf,
}

impl TaskStore {
    pub fn open(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Path to the store file; its mtime is the externally observable
    /// write signal.
    pub fn store_path(&self) -> PathBuf {
        self.data_dir.join(STORE_FILE)
    }

    fn lock_path(&self) -> PathBuf {
        self.data_dir.join(format!("{}.lock", STORE_FILE))
    }

    fn load(&self) -> Result<StoreFile> {
        let path = self.store_path();
        if !path.exists() {
            return Ok(StoreFile::default());
        }
        let contents = std::fs::read_to_string(&path)?;
        let file: StoreFile = serde_json::from_str(&contents)?;
        if file.schema_version != STORE_SCHEMA_VERSION {
            return Err(Error::CorruptStore(format!(
                "unsupported schema version '{}' in {}",
                file.schema_version,
                path.display()
            )));
        }
        Ok(file)
    }

    /// Open a read-only snapshot. Never writes.
    pub fn read(&self) -> Result<Snapshot> {
        let file = self.load()?;
        Ok(Snapshot {
            tasks: file.tasks,
            working_set: file.working_set,
        })
    }

    /// Open a write transaction, serializing against other writers.
    pub fn write(&self) -> Result<WriteTxn<'_>> {
        let lock = FileLock::acquire(self.lock_path(), DEFAULT_LOCK_TIMEOUT_MS)?;
        let file = self.load()?;
        Ok(WriteTxn {
            store: self,
            _lock: lock,
            file,
            dirty: false,
        })
    }
}

/// Read-only view of the store contents.
#[derive(Debug, Clone)]
pub struct Snapshot {
    tasks: BTreeMap<Uuid, TaskData>,
    working_set: Vec<Uuid>,
}

impl Snapshot {
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, uuid: Uuid) -> Option<Task> {
        self.tasks.get(&uuid).map(|data| Task {
            uuid,
            data: data.clone(),
        })
    }

    /// Look up by positional (1-based) working-set id.
    pub fn get_by_id(&self, id: usize) -> Option<Task> {
        let uuid = *self.working_set.get(id.checked_sub(1)?)?;
        self.get(uuid)
    }

    /// The positional id of a task, if it is in the working set.
    pub fn id_of(&self, uuid: Uuid) -> Option<usize> {
        self.working_set.iter().position(|u| *u == uuid).map(|i| i + 1)
    }

    /// Resolve a user-supplied task reference: positional id, full
    /// uuid, or unambiguous uuid prefix.
    pub fn find(&self, needle: &str) -> Option<Task> {
        let needle = needle.trim();
        if let Ok(id) = needle.parse::<usize>() {
            if let Some(task) = self.get_by_id(id) {
                return Some(task);
            }
        }
        if let Ok(uuid) = needle.parse::<Uuid>() {
            return self.get(uuid);
        }
        let lowered = needle.to_lowercase();
        let mut matched = None;
        for uuid in self.tasks.keys() {
            if uuid.to_string().starts_with(&lowered) {
                if matched.is_some() {
                    return None; // ambiguous prefix
                }
                matched = Some(*uuid);
            }
        }
        matched.and_then(|uuid| self.get(uuid))
    }

    pub fn all(&self) -> Vec<Task> {
        self.tasks
            .iter()
            .map(|(uuid, data)| Task {
                uuid: *uuid,
                data: data.clone(),
            })
            .collect()
    }

    /// Tasks in working-set order (the pending report's rows).
    pub fn pending(&self) -> Vec<Task> {
        self.working_set
            .iter()
            .filter_map(|uuid| self.get(*uuid))
            .collect()
    }

    pub fn working_set(&self) -> &[Uuid] {
        &self.working_set
    }

    /// Completed tasks, in uuid order.
    pub fn completed(&self) -> Vec<Task> {
        self.list(|t| t.status() == crate::task::Status::Completed)
    }

    /// Tasks matching a predicate, in uuid order.
    pub fn list(&self, predicate: impl Fn(&Task) -> bool) -> Vec<Task> {
        self.all().into_iter().filter(|t| predicate(t)).collect()
    }
}

/// An open write transaction. Mutations accumulate in memory and hit
/// disk only on commit.
pub struct WriteTxn<'a> {
    store: &'a TaskStore,
    _lock: FileLock,
    file: StoreFile,
    dirty: bool,
}

impl WriteTxn<'_> {
    /// A snapshot of the transaction's current (uncommitted) state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            tasks: self.file.tasks.clone(),
            working_set: self.file.working_set.clone(),
        }
    }

    pub fn get(&self, uuid: Uuid) -> Option<&TaskData> {
        self.file.tasks.get(&uuid)
    }

    pub fn uuids(&self) -> Vec<Uuid> {
        self.file.tasks.keys().copied().collect()
    }

    /// Create a task from raw attributes, journaling each one.
    pub fn create(
        &mut self,
        uuid: Uuid,
        attributes: BTreeMap<String, String>,
        now: DateTime<Utc>,
    ) -> &TaskData {
        let mut data = TaskData::default();
        for (name, value) in &attributes {
            data.set(name, Some(value), now);
        }
        self.dirty = true;
        self.file.tasks.insert(uuid, data);
        &self.file.tasks[&uuid]
    }

    /// Insert pre-built task data verbatim (no journaling).
    pub fn insert(&mut self, uuid: Uuid, data: TaskData) {
        self.dirty = true;
        self.file.tasks.insert(uuid, data);
    }

    /// Apply attribute changes to an existing task. Sets `modified` and
    /// journals every change. `None` removes the attribute.
    pub fn update(
        &mut self,
        uuid: Uuid,
        changes: &[(String, Option<String>)],
        now: DateTime<Utc>,
    ) -> Result<()> {
        let data = self
            .file
            .tasks
            .get_mut(&uuid)
            .ok_or_else(|| Error::TaskNotFound(uuid.to_string()))?;
        for (name, value) in changes {
            data.set(name, value.as_deref(), now);
        }
        data.set(ATTR_MODIFIED, Some(&to_epoch_string(now)), now);
        self.dirty = true;
        Ok(())
    }

    /// Remove a task entirely (purge; status-level deletion is an update).
    pub fn delete(&mut self, uuid: Uuid) -> Result<()> {
        if self.file.tasks.remove(&uuid).is_none() {
            return Err(Error::TaskNotFound(uuid.to_string()));
        }
        self.file.working_set.retain(|u| *u != uuid);
        self.dirty = true;
        Ok(())
    }

    /// Mutable access for GC transitions. Marks the transaction dirty.
    pub fn get_mut(&mut self, uuid: Uuid) -> Option<&mut TaskData> {
        let data = self.file.tasks.get_mut(&uuid);
        if data.is_some() {
            self.dirty = true;
        }
        data
    }

    /// Bulk-import decoded legacy records.
    ///
    /// An already-present uuid is merged: incoming attributes overwrite
    /// stored ones key-by-key. Returns one flag per record, in input
    /// order, saying whether it merged into an existing task; a uuid
    /// repeated within the batch merges from its second occurrence on.
    pub fn import_batch(
        &mut self,
        records: Vec<(Uuid, BTreeMap<String, String>)>,
        now: DateTime<Utc>,
    ) -> Vec<bool> {
        let mut merged = Vec::with_capacity(records.len());
        for (uuid, attributes) in records {
            match self.file.tasks.get_mut(&uuid) {
                Some(existing) => {
                    for (name, value) in &attributes {
                        existing.set(name, Some(value), now);
                    }
                    debug!(%uuid, "merged already-present task");
                    merged.push(true);
                }
                None => {
                    self.create(uuid, attributes, now);
                    merged.push(false);
                }
            }
        }
        if !merged.is_empty() {
            self.dirty = true;
        }
        merged
    }

    /// Replace the working set (GC's renumbering step).
    pub fn set_working_set(&mut self, working_set: Vec<Uuid>) {
        self.file.working_set = working_set;
        self.dirty = true;
    }

    pub fn working_set(&self) -> &[Uuid] {
        &self.file.working_set
    }

    /// Persist buffered changes atomically. Returns whether the file
    /// was written; a transaction with no recorded changes leaves the
    /// store untouched.
    pub fn commit(self) -> Result<bool> {
        if !self.dirty {
            return Ok(false);
        }
        let json = serde_json::to_string_pretty(&self.file)?;
        lock::write_atomic(self.store.store_path(), json.as_bytes())?;
        Ok(true)
    }
}
