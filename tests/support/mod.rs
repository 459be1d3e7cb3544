#![allow(dead_code)]

use std::collections::BTreeMap;
use std::fs::{self, File, FileTimes};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use assert_cmd::Command;
use chrono::Utc;
use tempfile::TempDir;
use tk::store::TaskStore;
use uuid::Uuid;

/// A scratch data directory for one test, dropped (and deleted) at the
/// end of the test.
pub struct TestData {
    dir: TempDir,
}

impl TestData {
    pub fn init() -> Self {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn store(&self) -> TaskStore {
        TaskStore::open(self.path())
    }

    pub fn store_path(&self) -> PathBuf {
        self.store().store_path()
    }

    /// Write the configuration file for this data directory.
    pub fn write_config(&self, contents: &str) {
        fs::write(self.path().join("tk.toml"), contents).expect("write config");
    }

    /// Write a legacy import file (`pending.data` / `completed.data`).
    pub fn write_legacy(&self, file_name: &str, contents: &str) {
        fs::write(self.path().join(file_name), contents).expect("write legacy file");
    }

    /// Seed a task with raw attributes directly through the store,
    /// bypassing CLI validation, the way corrupt legacy data gets in.
    pub fn seed_task(&self, attrs: &[(&str, &str)]) -> Uuid {
        let uuid = Uuid::new_v4();
        let attributes: BTreeMap<String, String> = attrs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let store = self.store();
        let mut txn = store.write().expect("write txn");
        txn.create(uuid, attributes, Utc::now());
        txn.commit().expect("commit");
        uuid
    }

    pub fn store_mtime(&self) -> SystemTime {
        fs::metadata(self.store_path())
            .expect("store metadata")
            .modified()
            .expect("store mtime")
    }

    /// Push the store file's mtime an hour into the past, so any write
    /// is unambiguously visible regardless of filesystem timestamp
    /// granularity.
    pub fn age_store(&self) {
        let file = File::options()
            .write(true)
            .open(self.store_path())
            .expect("open store");
        let past = SystemTime::now() - Duration::from_secs(3600);
        file.set_times(FileTimes::new().set_accessed(past).set_modified(past))
            .expect("set store mtime");
    }

    pub fn assert_not_modified(&self) {
        let threshold = SystemTime::now() - Duration::from_secs(1800);
        assert!(
            self.store_mtime() < threshold,
            "store file was modified by a read-only command"
        );
    }

    pub fn assert_modified(&self) {
        let threshold = SystemTime::now() - Duration::from_secs(1800);
        assert!(
            self.store_mtime() > threshold,
            "store file was not modified by a mutating command"
        );
    }
}

/// A tk command pointed at the test's data directory.
pub fn tk_cmd(data: &TestData) -> Command {
    let mut cmd = Command::cargo_bin("tk").expect("tk binary");
    cmd.env("TK_DATA", data.path());
    cmd
}
