use std::fs;

use tk::config::Config;

#[test]
fn config_defaults_when_missing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = Config::load(dir.path()).expect("load");

    assert!(config.gc);
    assert_eq!(config.dateformat, "Y-M-D");
    assert_eq!(config.verbose, "all");
    assert!(config.footnotes_enabled());
    assert!(config.report.is_empty());
}

#[test]
fn config_overrides_from_toml() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let toml = r#"
gc = false
dateformat = "m/d/Y"
verbose = "nothing"

[report.overdue]
columns = ["id", "description", "due"]
filter = "status:pending"
"#;
    fs::write(dir.path().join("tk.toml"), toml)?;

    let config = Config::load(dir.path())?;
    assert!(!config.gc);
    assert_eq!(config.dateformat, "m/d/Y");
    assert!(!config.footnotes_enabled());

    let report = config.report.get("overdue").expect("custom report");
    assert_eq!(report.columns, vec!["id", "description", "due"]);
    assert_eq!(report.filter.as_deref(), Some("status:pending"));
    Ok(())
}

#[test]
fn partial_config_keeps_remaining_defaults() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    fs::write(dir.path().join("tk.toml"), "gc = false\n")?;

    let config = Config::load(dir.path())?;
    assert!(!config.gc);
    assert_eq!(config.dateformat, "Y-M-D");
    assert_eq!(config.verbose, "all");
    Ok(())
}

#[test]
fn malformed_config_is_an_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(dir.path().join("tk.toml"), "gc = [not toml").expect("write");

    assert!(Config::load(dir.path()).is_err());
}
