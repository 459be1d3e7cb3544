//! Report engine
//!
//! Turns store snapshots into report rows. Every temporally-typed cell
//! goes through the validator: a value that fails validation renders as
//! an empty cell (or an omitted info label), never an error, while raw
//! views (`export`, recurrence metadata) show the stored text verbatim.
//! No combination of missing or malformed attributes may make a report
//! fail.

use chrono::{DateTime, Datelike, Duration, Utc};
use serde_json::json;

use crate::config::Config;
use crate::dates;
use crate::error::{Error, Result};
use crate::store::Snapshot;
use crate::task::{
    Status, Task, ATTR_DUE, ATTR_END, ATTR_ENTRY, ATTR_MODIFIED, ATTR_PARENT, ATTR_RECUR,
    ATTR_RTYPE, ATTR_SCHEDULED, ATTR_START, ATTR_UNTIL, ATTR_WAIT, DATE_ATTRS,
};

/// A rendered report: ordered column labels plus rows of cells.
#[derive(Debug, Clone)]
pub struct Report {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Names of the built-in reports.
pub const BUILTIN_REPORTS: [&str; 2] = ["list", "completed"];

/// Whether a name is a custom report defined in the configuration.
pub fn is_custom_report(name: &str, config: &Config) -> bool {
    config.report.contains_key(name)
}

/// All known report names: built-ins first, then custom ones.
pub fn report_names(config: &Config) -> Vec<String> {
    let mut names: Vec<String> = BUILTIN_REPORTS.iter().map(|n| n.to_string()).collect();
    for name in config.report.keys() {
        if !names.iter().any(|n| n == name) {
            names.push(name.clone());
        }
    }
    names
}

/// Render a named report over the snapshot.
pub fn render(name: &str, snapshot: &Snapshot, config: &Config) -> Result<Report> {
    let (columns, tasks) = match name {
        "list" => (
            vec!["id", "description", "due", "until", "entry"],
            snapshot.pending(),
        ),
        "completed" => (
            vec!["end", "description", "uuid"],
            snapshot.completed(),
        ),
        custom => {
            let spec = config
                .report
                .get(custom)
                .ok_or_else(|| Error::UnknownReport(custom.to_string()))?;
            let columns: Vec<&str> = spec.columns.iter().map(String::as_str).collect();
            let tasks = match spec.filter.as_deref() {
                Some(filter) => filtered(snapshot, filter)?,
                None => snapshot.all(),
            };
            return Ok(build(name, &columns, &tasks, snapshot, config));
        }
    };
    Ok(build(name, &columns, &tasks, snapshot, config))
}

fn filtered(snapshot: &Snapshot, filter: &str) -> Result<Vec<Task>> {
    match filter.trim().strip_prefix("status:") {
        Some(status_name) => {
            let wanted = Status::parse(Some(status_name));
            Ok(snapshot.list(|t| t.status() == wanted))
        }
        None => Err(Error::InvalidConfig(format!(
            "unsupported report filter '{}'",
            filter
        ))),
    }
}

fn build(
    name: &str,
    columns: &[&str],
    tasks: &[Task],
    snapshot: &Snapshot,
    config: &Config,
) -> Report {
    let rows = tasks
        .iter()
        .map(|task| {
            columns
                .iter()
                .map(|column| cell(task, column, snapshot, config))
                .collect()
        })
        .collect();
    Report {
        name: name.to_string(),
        columns: columns.iter().map(|c| column_label(c).to_string()).collect(),
        rows,
    }
}

/// Render one cell. Malformed optional data degrades to an empty cell.
fn cell(task: &Task, column: &str, snapshot: &Snapshot, config: &Config) -> String {
    match column {
        "id" => snapshot
            .id_of(task.uuid)
            .map(|id| id.to_string())
            .unwrap_or_else(|| "-".to_string()),
        "uuid" => task.uuid.to_string(),
        "description" => task.description().to_string(),
        "status" => task.status().label().to_string(),
        "tags" => task.data.tags().join(" "),
        // Recurrence metadata is deliberately raw text
        "rtype" | "recur" | "parent" | "imask" | "mask" => {
            task.get(column).unwrap_or_default().to_string()
        }
        attr if DATE_ATTRS.contains(&attr) => task
            .get(attr)
            .and_then(dates::parse_date)
            .map(|when| dates::format_date(when, &config.dateformat))
            .unwrap_or_default(),
        other => task.get(other).unwrap_or_default().to_string(),
    }
}

fn column_label(column: &str) -> &str {
    match column {
        "id" => "ID",
        "uuid" => "UUID",
        "description" => "Description",
        "status" => "Status",
        "tags" => "Tags",
        "entry" => "Entered",
        "start" => "Start",
        "end" => "End",
        "due" => "Due",
        "wait" => "Wait",
        "scheduled" => "Scheduled",
        "until" => "Until",
        "modified" => "Modified",
        "rtype" => "Recurrence type",
        "recur" => "Recurrence",
        "parent" => "Parent",
        other => other,
    }
}

/// Label used in info views and journal lines for an attribute.
pub fn attr_label(attr: &str) -> String {
    match attr {
        ATTR_ENTRY => "Entry".to_string(),
        ATTR_MODIFIED => "Modified".to_string(),
        ATTR_RTYPE => "Recurrence type".to_string(),
        ATTR_RECUR => "Recurrence".to_string(),
        other => {
            let mut chars = other.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        }
    }
}

/// Build the info view: label/value pairs followed by journal lines.
///
/// Derived temporal labels are omitted outright when the underlying
/// value fails validation; recurrence metadata appears as raw text.
/// `Status` is always present.
pub fn info(task: &Task, snapshot: &Snapshot, config: &Config) -> (Vec<(String, String)>, Vec<String>) {
    let mut fields = Vec::new();

    if let Some(id) = snapshot.id_of(task.uuid) {
        fields.push(("ID".to_string(), id.to_string()));
    }
    if !task.description().is_empty() {
        fields.push(("Description".to_string(), task.description().to_string()));
    }
    fields.push(("Status".to_string(), task.status().label().to_string()));

    if let Some(rtype) = task.get(ATTR_RTYPE) {
        fields.push(("Recurrence type".to_string(), rtype.to_string()));
    }
    if let Some(recur) = task.get(ATTR_RECUR) {
        fields.push(("Recurrence".to_string(), recur.to_string()));
    }
    if let Some(parent) = task.get(ATTR_PARENT) {
        fields.push(("Parent task".to_string(), parent.to_string()));
    }

    let mut date_field = |attr: &str, label: &str, fields: &mut Vec<(String, String)>| {
        if let Some(when) = task.get(attr).and_then(dates::parse_date) {
            fields.push((label.to_string(), dates::format_date(when, &config.dateformat)));
        }
    };
    date_field(ATTR_ENTRY, "Entered", &mut fields);
    date_field(ATTR_WAIT, "Waiting until", &mut fields);
    date_field(ATTR_SCHEDULED, "Scheduled", &mut fields);
    date_field(ATTR_START, "Start", &mut fields);
    date_field(ATTR_DUE, "Due", &mut fields);
    date_field(ATTR_UNTIL, "Until", &mut fields);
    date_field(ATTR_END, "End", &mut fields);
    date_field(ATTR_MODIFIED, "Last modified", &mut fields);

    let tags = task.data.tags();
    if !tags.is_empty() {
        fields.push(("Tags".to_string(), tags.join(" ")));
    }
    fields.push(("UUID".to_string(), task.uuid.to_string()));

    let journal = task
        .data
        .journal
        .iter()
        .map(|entry| {
            let label = attr_label(&entry.attr);
            match &entry.new {
                Some(value) => format!("{} set to '{}'", label, journal_value(&entry.attr, value, config)),
                None => format!("{} deleted.", label),
            }
        })
        .collect();

    (fields, journal)
}

/// A journal value renders as a date when it parses as one, and as the
/// raw stored text otherwise.
fn journal_value(attr: &str, value: &str, config: &Config) -> String {
    if DATE_ATTRS.contains(&attr) {
        if let Some(when) = dates::parse_date(value) {
            return dates::format_date(when, &config.dateformat);
        }
    }
    value.to_string()
}

/// Raw JSON export of tasks: attribute strings verbatim, invalid
/// values included.
pub fn export(tasks: &[Task]) -> Result<String> {
    let items: Vec<serde_json::Value> = tasks
        .iter()
        .map(|task| {
            let mut object = serde_json::Map::new();
            object.insert("uuid".to_string(), json!(task.uuid.to_string()));
            for (name, value) in &task.data.attributes {
                object.insert(name.clone(), json!(value));
            }
            serde_json::Value::Object(object)
        })
        .collect();
    Ok(serde_json::to_string_pretty(&items)?)
}

/// Weekly burndown buckets derived from parsable `entry`/`end` dates.
/// Unparsable dates simply do not contribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BurndownBucket {
    pub week_start: DateTime<Utc>,
    pub started: usize,
    pub finished: usize,
}

pub fn burndown(snapshot: &Snapshot, now: DateTime<Utc>, weeks: usize) -> Vec<BurndownBucket> {
    let week_of = |when: DateTime<Utc>| {
        let days_into_week = when.date_naive().weekday().num_days_from_monday() as i64;
        (when - Duration::days(days_into_week))
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc())
    };

    let Some(this_week) = week_of(now) else {
        return Vec::new();
    };

    let mut buckets: Vec<BurndownBucket> = (0..weeks)
        .rev()
        .map(|back| BurndownBucket {
            week_start: this_week - Duration::weeks(back as i64),
            started: 0,
            finished: 0,
        })
        .collect();

    for task in snapshot.all() {
        if let Some(week) = task.get(ATTR_ENTRY).and_then(dates::parse_date).and_then(week_of) {
            if let Some(bucket) = buckets.iter_mut().find(|b| b.week_start == week) {
                bucket.started += 1;
            }
        }
        if task.status().is_terminal() {
            if let Some(week) = task.get(ATTR_END).and_then(dates::parse_date).and_then(week_of) {
                if let Some(bucket) = buckets.iter_mut().find(|b| b.week_start == week) {
                    bucket.finished += 1;
                }
            }
        }
    }

    buckets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::TaskStore;
    use crate::task::{ATTR_DESCRIPTION, ATTR_STATUS};
    use chrono::TimeZone;
    use std::collections::BTreeMap;
    use uuid::Uuid;

    fn seeded_snapshot(records: Vec<(Uuid, Vec<(&str, &str)>)>) -> Snapshot {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = TaskStore::open(dir.path());
        let mut txn = store.write().expect("write");
        let now = Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap();
        let mut ws = Vec::new();
        for (uuid, pairs) in records {
            let attrs: BTreeMap<String, String> = pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect();
            let pending = attrs.get(ATTR_STATUS).map_or(true, |s| s == "pending");
            txn.create(uuid, attrs, now);
            if pending {
                ws.push(uuid);
            }
        }
        txn.set_working_set(ws);
        txn.snapshot()
    }

    #[test]
    fn list_report_shows_pending_only() {
        let pending = Uuid::new_v4();
        let done = Uuid::new_v4();
        let snapshot = seeded_snapshot(vec![
            (pending, vec![(ATTR_DESCRIPTION, "bing"), (ATTR_STATUS, "pending")]),
            (done, vec![(ATTR_DESCRIPTION, "bar"), (ATTR_STATUS, "completed")]),
        ]);

        let report = render("list", &snapshot, &Config::default()).expect("render");
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0][0], "1");
        assert_eq!(report.rows[0][1], "bing");
    }

    #[test]
    fn completed_report_excludes_deleted() {
        let done = Uuid::new_v4();
        let gone = Uuid::new_v4();
        let snapshot = seeded_snapshot(vec![
            (done, vec![(ATTR_DESCRIPTION, "bar"), (ATTR_STATUS, "completed")]),
            (gone, vec![(ATTR_DESCRIPTION, "foo"), (ATTR_STATUS, "deleted")]),
        ]);

        let report = render("completed", &snapshot, &Config::default()).expect("render");
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0][1], "bar");
    }

    #[test]
    fn invalid_dates_render_as_empty_cells() {
        let uuid = Uuid::new_v4();
        let snapshot = seeded_snapshot(vec![(
            uuid,
            vec![
                (ATTR_DESCRIPTION, "odd"),
                (ATTR_DUE, "due"),
                (ATTR_ENTRY, "abcdef"),
                (ATTR_UNTIL, "1734480000"),
            ],
        )]);

        let report = render("list", &snapshot, &Config::default()).expect("render");
        let row = &report.rows[0];
        assert_eq!(row[2], ""); // due invalid
        assert_eq!(row[3], "2024-12-18"); // until valid
        assert_eq!(row[4], ""); // entry invalid
    }

    #[test]
    fn custom_report_over_malformed_task_succeeds() {
        let mut config = Config::default();
        config.report.insert(
            "custom-report".to_string(),
            crate::config::ReportConfig {
                columns: ["id", "description", "entry", "start", "end", "due", "scheduled", "modified", "until"]
                    .iter()
                    .map(|c| c.to_string())
                    .collect(),
                filter: None,
            },
        );
        let uuid = Uuid::new_v4();
        let snapshot = seeded_snapshot(vec![(
            uuid,
            vec![
                (ATTR_STATUS, "recurring"),
                (ATTR_RTYPE, "occasional"),
                (ATTR_RECUR, "xxxxx"),
                (ATTR_DUE, "due"),
                (ATTR_WAIT, "wait"),
            ],
        )]);

        let report = render("custom-report", &snapshot, &config).expect("render");
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.columns[0], "ID");
    }

    #[test]
    fn unknown_report_is_an_error() {
        let snapshot = seeded_snapshot(vec![]);
        let err = render("no-such-report", &snapshot, &Config::default()).expect_err("err");
        assert!(matches!(err, Error::UnknownReport(_)));
    }

    #[test]
    fn info_omits_invalid_labels_and_keeps_status() {
        let uuid = Uuid::new_v4();
        let snapshot = seeded_snapshot(vec![(
            uuid,
            vec![(ATTR_ENTRY, "abcdef"), (ATTR_WAIT, "wait"), (ATTR_RTYPE, "occasional")],
        )]);
        let task = snapshot.get(uuid).expect("task");

        let (fields, journal) = info(&task, &snapshot, &Config::default());
        let labels: Vec<&str> = fields.iter().map(|(l, _)| l.as_str()).collect();
        assert!(labels.contains(&"Status"));
        assert!(!labels.contains(&"Entered"));
        assert!(!labels.contains(&"Waiting until"));
        assert!(labels.contains(&"Recurrence type"));
        assert!(journal.iter().any(|line| line == "Wait set to 'wait'"));
    }

    #[test]
    fn export_includes_raw_values() {
        let uuid = Uuid::new_v4();
        let snapshot = seeded_snapshot(vec![(uuid, vec![(ATTR_DUE, "due"), (ATTR_DESCRIPTION, "x")])]);
        let out = export(&snapshot.all()).expect("export");
        assert!(out.contains("\"due\": \"due\""));
        assert!(out.contains(&uuid.to_string()));
    }

    #[test]
    fn burndown_buckets_ignore_unparsable_entries() {
        let now = Utc.with_ymd_and_hms(2026, 2, 4, 12, 0, 0).unwrap();
        let entry = (now - Duration::days(1)).timestamp().to_string();
        let snapshot = seeded_snapshot(vec![
            (Uuid::new_v4(), vec![(ATTR_ENTRY, entry.as_str())]),
            (Uuid::new_v4(), vec![(ATTR_ENTRY, "abcdef")]),
        ]);

        let buckets = burndown(&snapshot, now, 4);
        assert_eq!(buckets.len(), 4);
        assert_eq!(buckets.last().expect("bucket").started, 1);
    }
}
