//! Read/write classification, observed through the store file's
//! modification time: read-only commands never touch it, mutating
//! commands with GC enabled always do, and disabling GC makes the
//! report commands leave it alone.

mod support;

use support::{tk_cmd, TestData};

fn seeded() -> TestData {
    let data = TestData::init();
    tk_cmd(&data).args(["add", "foo"]).assert().success();
    data.age_store();
    data
}

#[test]
fn reports_command_is_read_only() {
    let data = seeded();
    tk_cmd(&data).arg("reports").assert().success();
    data.assert_not_modified();
}

#[test]
fn info_is_read_only() {
    let data = seeded();
    tk_cmd(&data).args(["info", "1"]).assert().success();
    data.assert_not_modified();
}

#[test]
fn export_is_read_only() {
    let data = seeded();
    tk_cmd(&data).arg("export").assert().success();
    data.assert_not_modified();
}

#[test]
fn list_writes_through_gc() {
    let data = seeded();
    tk_cmd(&data).arg("list").assert().success();
    data.assert_modified();
}

#[test]
fn burndown_writes_through_gc() {
    let data = seeded();
    tk_cmd(&data).arg("burndown").assert().success();
    data.assert_modified();
}

#[test]
fn list_with_gc_disabled_is_read_only() {
    let data = seeded();
    data.write_config("gc = false\n");
    tk_cmd(&data).arg("list").assert().success();
    data.assert_not_modified();
}

#[test]
fn burndown_with_gc_disabled_is_read_only() {
    let data = seeded();
    data.write_config("gc = false\n");
    tk_cmd(&data).arg("burndown").assert().success();
    data.assert_not_modified();
}

#[test]
fn modify_writes_even_with_gc_disabled() {
    let data = seeded();
    data.write_config("gc = false\n");
    tk_cmd(&data)
        .args(["modify", "1", "renamed"])
        .assert()
        .success();
    data.assert_modified();
}
