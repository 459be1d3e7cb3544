//! Task record model
//!
//! A task is a uuid plus a free-form attribute map. Everything,
//! including `status`, lives in the map as a raw string; interpretation
//! (status enum, timestamps, recurrence) happens lazily and tolerantly
//! at the point of use, so the store never rejects a record over a
//! malformed optional field.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const ATTR_STATUS: &str = "status";
pub const ATTR_DESCRIPTION: &str = "description";
pub const ATTR_ENTRY: &str = "entry";
pub const ATTR_MODIFIED: &str = "modified";
pub const ATTR_START: &str = "start";
pub const ATTR_END: &str = "end";
pub const ATTR_DUE: &str = "due";
pub const ATTR_WAIT: &str = "wait";
pub const ATTR_SCHEDULED: &str = "scheduled";
pub const ATTR_UNTIL: &str = "until";
pub const ATTR_RTYPE: &str = "rtype";
pub const ATTR_RECUR: &str = "recur";
pub const ATTR_TAGS: &str = "tags";
pub const ATTR_DEPENDS: &str = "depends";
pub const ATTR_PARENT: &str = "parent";
pub const ATTR_MASK: &str = "mask";
pub const ATTR_IMASK: &str = "imask";

/// The temporal attributes, in the order info-style reports show them.
pub const DATE_ATTRS: [&str; 8] = [
    ATTR_ENTRY,
    ATTR_START,
    ATTR_END,
    ATTR_DUE,
    ATTR_WAIT,
    ATTR_SCHEDULED,
    ATTR_UNTIL,
    ATTR_MODIFIED,
];

/// Task lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Pending,
    Completed,
    Deleted,
    Recurring,
    Waiting,
}

impl Status {
    /// Tolerant parse of the stored `status` attribute. Unknown or
    /// missing values read as pending rather than failing.
    pub fn parse(raw: Option<&str>) -> Status {
        match raw.map(str::trim) {
            Some("completed") => Status::Completed,
            Some("deleted") => Status::Deleted,
            Some("recurring") => Status::Recurring,
            Some("waiting") => Status::Waiting,
            _ => Status::Pending,
        }
    }

    /// Lowercase form stored in the attribute map.
    pub fn name(self) -> &'static str {
        match self {
            Status::Pending => "pending",
            Status::Completed => "completed",
            Status::Deleted => "deleted",
            Status::Recurring => "recurring",
            Status::Waiting => "waiting",
        }
    }

    /// Capitalized form shown by reports.
    pub fn label(self) -> &'static str {
        match self {
            Status::Pending => "Pending",
            Status::Completed => "Completed",
            Status::Deleted => "Deleted",
            Status::Recurring => "Recurring",
            Status::Waiting => "Waiting",
        }
    }

    /// Completed and deleted tasks are terminal: GC never transitions
    /// them again.
    pub fn is_terminal(self) -> bool {
        matches!(self, Status::Completed | Status::Deleted)
    }
}

/// One recorded attribute change. Reports derive the "X set to '...'"
/// history lines from these.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JournalEntry {
    pub when: DateTime<Utc>,
    pub attr: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new: Option<String>,
}

/// The stored portion of a task: attributes plus change journal.
/// The uuid is the key under which this sits in the store.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskData {
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub journal: Vec<JournalEntry>,
}

impl TaskData {
    pub fn from_attributes(attributes: BTreeMap<String, String>) -> Self {
        Self {
            attributes,
            journal: Vec::new(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn status(&self) -> Status {
        Status::parse(self.get(ATTR_STATUS))
    }

    pub fn description(&self) -> &str {
        self.get(ATTR_DESCRIPTION).unwrap_or("")
    }

    /// Tags, from the comma-separated `tags` attribute.
    pub fn tags(&self) -> Vec<&str> {
        self.get(ATTR_TAGS)
            .map(|raw| raw.split(',').filter(|t| !t.is_empty()).collect())
            .unwrap_or_default()
    }

    /// Set an attribute, journaling the change. An empty value removes
    /// the attribute. Changes to `modified` itself are not journaled.
    pub fn set(&mut self, name: &str, value: Option<&str>, when: DateTime<Utc>) {
        let old = self.attributes.get(name).cloned();
        let new = value.filter(|v| !v.is_empty()).map(str::to_string);
        if old == new {
            return;
        }
        match &new {
            Some(v) => {
                self.attributes.insert(name.to_string(), v.clone());
            }
            None => {
                self.attributes.remove(name);
            }
        }
        if name != ATTR_MODIFIED {
            self.journal.push(JournalEntry {
                when,
                attr: name.to_string(),
                old,
                new,
            });
        }
    }

    pub fn set_status(&mut self, status: Status, when: DateTime<Utc>) {
        self.set(ATTR_STATUS, Some(status.name()), when);
    }
}

/// A task pulled out of the store: uuid plus its stored data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub uuid: Uuid,
    pub data: TaskData,
}

impl Task {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.data.get(name)
    }

    pub fn status(&self) -> Status {
        self.data.status()
    }

    pub fn description(&self) -> &str {
        self.data.description()
    }
}

/// Marker attribute name for a tag, mirroring the legacy loader's
/// `tags` expansion.
pub fn tag_attr(tag: &str) -> String {
    format!("tag_{}", tag)
}

/// Marker attribute name for a dependency uuid.
pub fn dep_attr(dep: &str) -> String {
    format!("dep_{}", dep)
}
