//! Command classification
//!
//! Every command name maps to a fixed read/write classification. This
//! is a table, deliberately not inferred from command behavior: the
//! read-only guarantee ("this command never touches the store file") is
//! part of each command's contract and is verified externally through
//! the store file's modification time.
//!
//! Report-style commands that renumber the working set (`list`,
//! `completed`, `burndown`, custom reports) are mutating because GC
//! regenerates derived state before they render. `reports`, `info`,
//! and `export` never write. An unrecognized name classifies as
//! read-only: failing safe means never mutating unexpectedly.

/// Classification of a command with respect to durable state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandSpec {
    /// Never opens a write session on the store.
    pub read_only: bool,
    /// Wants a GC pass first (only honored when mutating and `gc` is enabled).
    pub needs_gc: bool,
}

impl CommandSpec {
    const fn read_only() -> Self {
        CommandSpec {
            read_only: true,
            needs_gc: false,
        }
    }

    const fn mutating_with_gc() -> Self {
        CommandSpec {
            read_only: false,
            needs_gc: true,
        }
    }

    const fn mutating_without_gc() -> Self {
        CommandSpec {
            read_only: false,
            needs_gc: false,
        }
    }
}

/// Names with built-in classifications, excluding custom reports.
pub const KNOWN_COMMANDS: [&str; 14] = [
    "add",
    "modify",
    "mod",
    "start",
    "stop",
    "done",
    "delete",
    "list",
    "completed",
    "burndown",
    "import-v2",
    "info",
    "export",
    "reports",
];

/// Classify a command name.
///
/// `is_custom_report` flags names defined under `[report.*]` in the
/// configuration; those behave like the built-in report commands.
pub fn classify(name: &str, is_custom_report: bool) -> CommandSpec {
    match name {
        "add" | "modify" | "mod" | "start" | "stop" | "done" | "delete" => {
            CommandSpec::mutating_with_gc()
        }
        "list" | "completed" | "burndown" => CommandSpec::mutating_with_gc(),
        "import-v2" => CommandSpec::mutating_without_gc(),
        "info" | "export" | "reports" => CommandSpec::read_only(),
        _ if is_custom_report => CommandSpec::mutating_with_gc(),
        _ => CommandSpec::read_only(),
    }
}
