//! Command-line interface for tk
//!
//! This module defines the CLI structure using clap derive macros and
//! owns the dispatch discipline: every command is classified up front
//! (read-only vs mutating, GC or not), read-only commands only ever
//! open a read snapshot, and mutating commands run inside a single
//! write transaction that GC shares.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};

use crate::classify::{classify, CommandSpec};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::gc;
use crate::report;
use crate::store::{Snapshot, TaskStore, WriteTxn};
use crate::task::Task;

mod add;
mod export;
mod import;
mod info;
mod modify;
mod reports;

/// Default data directory when neither `--data` nor `TK_DATA` is set
pub const DEFAULT_DATA_DIR: &str = ".tk";

/// tk - personal task management
///
/// Tasks live in a transactional file-backed store inside the data
/// directory. Commands are strictly classified as read-only or
/// mutating; only mutating commands (and enabled GC) touch the store.
#[derive(Parser, Debug)]
#[command(name = "tk")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the data directory
    #[arg(long, global = true, env = "TK_DATA")]
    pub data: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Add a new pending task
    Add {
        /// Description words and modifications (due:..., +tag)
        #[arg(required = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Modify an existing task
    #[command(alias = "mod")]
    Modify {
        /// Task id, uuid, or uuid prefix
        task: String,

        /// Description words and modifications
        #[arg(required = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Mark a task as started
    Start {
        /// Task id, uuid, or uuid prefix
        task: String,
    },

    /// Clear a task's start mark
    Stop {
        /// Task id, uuid, or uuid prefix
        task: String,
    },

    /// Complete a task
    Done {
        /// Task id, uuid, or uuid prefix
        task: String,
    },

    /// Delete a task
    Delete {
        /// Task id, uuid, or uuid prefix
        task: String,
    },

    /// List pending tasks
    List,

    /// Show completed tasks
    Completed,

    /// Show weekly burndown counts
    Burndown,

    /// List available reports
    Reports,

    /// Show task details
    Info {
        /// Task id, uuid, or uuid prefix
        task: String,
    },

    /// Export all tasks as raw JSON
    Export,

    /// Import legacy pending.data / completed.data files
    #[command(name = "import-v2")]
    ImportV2,

    /// A custom report defined in the configuration
    #[command(external_subcommand)]
    External(Vec<String>),
}

/// Shared state handed to command implementations.
pub(crate) struct Context {
    pub store: TaskStore,
    pub config: Config,
    pub now: DateTime<Utc>,
}

impl Cli {
    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        let data_dir = self
            .data
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));
        let config = Config::load(&data_dir)?;
        let ctx = Context {
            store: TaskStore::open(data_dir),
            config,
            now: Utc::now(),
        };

        let name = self.command_name();
        let spec = classify(&name, report::is_custom_report(&name, &ctx.config));

        match self.command {
            Commands::Add { args } => add::run(&ctx, spec, &args),
            Commands::Modify { task, args } => modify::run_modify(&ctx, spec, &task, &args),
            Commands::Start { task } => modify::run_start(&ctx, spec, &task),
            Commands::Stop { task } => modify::run_stop(&ctx, spec, &task),
            Commands::Done { task } => modify::run_done(&ctx, spec, &task),
            Commands::Delete { task } => modify::run_delete(&ctx, spec, &task),
            Commands::List => reports::run_named(&ctx, spec, "list"),
            Commands::Completed => reports::run_named(&ctx, spec, "completed"),
            Commands::Burndown => reports::run_burndown(&ctx, spec),
            Commands::Reports => reports::run_reports(&ctx),
            Commands::Info { task } => info::run(&ctx, &task),
            Commands::Export => export::run(&ctx),
            Commands::ImportV2 => import::run(&ctx),
            Commands::External(args) => {
                let name = args.first().cloned().unwrap_or_default();
                if report::is_custom_report(&name, &ctx.config) {
                    reports::run_named(&ctx, spec, &name)
                } else {
                    Err(Error::InvalidArgument(format!("Unknown command: {}", name)))
                }
            }
        }
    }

    /// The classification name for the chosen subcommand.
    fn command_name(&self) -> String {
        match &self.command {
            Commands::Add { .. } => "add",
            Commands::Modify { .. } => "modify",
            Commands::Start { .. } => "start",
            Commands::Stop { .. } => "stop",
            Commands::Done { .. } => "done",
            Commands::Delete { .. } => "delete",
            Commands::List => "list",
            Commands::Completed => "completed",
            Commands::Burndown => "burndown",
            Commands::Reports => "reports",
            Commands::Info { .. } => "info",
            Commands::Export => "export",
            Commands::ImportV2 => "import-v2",
            Commands::External(args) => {
                return args.first().cloned().unwrap_or_default();
            }
        }
        .to_string()
    }
}

/// Run a mutating command inside one write transaction, with GC first
/// when the classification and configuration call for it. The commit is
/// a no-op when nothing changed, so a mutating command that ends up
/// doing no work (e.g. a report with GC disabled) leaves the store
/// file untouched.
pub(crate) fn with_write_txn<T>(
    ctx: &Context,
    spec: CommandSpec,
    f: impl FnOnce(&mut WriteTxn<'_>) -> Result<T>,
) -> Result<T> {
    debug_assert!(!spec.read_only);
    let mut txn = ctx.store.write()?;
    if spec.needs_gc && ctx.config.gc {
        gc::run(&mut txn, ctx.now);
    }
    let out = f(&mut txn)?;
    txn.commit()?;
    Ok(out)
}

/// Resolve a user-supplied task reference or fail with a user error.
pub(crate) fn resolve_task(snapshot: &Snapshot, needle: &str) -> Result<Task> {
    snapshot
        .find(needle)
        .ok_or_else(|| Error::TaskNotFound(needle.to_string()))
}
