//! Configuration loading and management
//!
//! Handles parsing of the `tk.toml` file in the data directory.
//! Configuration only steers behavior around the store (GC gating,
//! date rendering, verbosity, custom report layouts); it never affects
//! what is persisted.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Config file name inside the data directory
pub const CONFIG_FILE: &str = "tk.toml";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Run garbage collection before mutating commands
    #[serde(default = "default_gc")]
    pub gc: bool,

    /// Date rendering format (legacy letters: Y M D H N S and lowercase variants)
    #[serde(default = "default_dateformat")]
    pub dateformat: String,

    /// Verbosity: "all" or "nothing" (suppresses footnotes)
    #[serde(default = "default_verbose")]
    pub verbose: String,

    /// Custom report definitions, keyed by report name
    #[serde(default)]
    pub report: BTreeMap<String, ReportConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gc: default_gc(),
            dateformat: default_dateformat(),
            verbose: default_verbose(),
            report: BTreeMap::new(),
        }
    }
}

fn default_gc() -> bool {
    true
}

fn default_dateformat() -> String {
    "Y-M-D".to_string()
}

fn default_verbose() -> String {
    "all".to_string()
}

/// A custom report: ordered column list plus optional filter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Ordered attribute names; `id` means the working-set index
    #[serde(default)]
    pub columns: Vec<String>,

    /// Optional status filter, e.g. "status:pending"
    #[serde(default)]
    pub filter: Option<String>,
}

impl Config {
    /// Load configuration from `tk.toml` in the data directory.
    ///
    /// A missing file yields defaults; a malformed file is an error.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let path = data_dir.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Config::default());
        }
        let contents = std::fs::read_to_string(&path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Whether footnote-style diagnostics (e.g. the import count) are emitted.
    pub fn footnotes_enabled(&self) -> bool {
        self.verbose != "nothing"
    }
}
