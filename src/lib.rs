//! tk - Task Management Library
//!
//! This library provides the core functionality for the tk CLI tool:
//! a personal task manager backed by a transactional, file-based store.
//!
//! # Core Concepts
//!
//! - **Task Store**: a single JSON file owning every task record, with
//!   read-only snapshots and locked, atomically-committed write
//!   transactions
//! - **Command Classification**: a fixed table deciding which commands
//!   may write; read-only commands provably never touch the store file
//! - **Garbage Collection**: folds elapsed time into state (wait
//!   promotion, until expiry, recurring instance spawning) ahead of
//!   mutating commands
//! - **Tolerant Validation**: temporal and recurrence attributes are
//!   stored raw; interpretation yields `Option` and rendering degrades
//!   instead of failing
//!
//! # Module Organization
//!
//! - `cli`: command-line interface using clap
//! - `classify`: read-only/mutating command table
//! - `codec`: legacy bracketed `key:"value"` record format
//! - `config`: configuration loading from `tk.toml`
//! - `dates`: date and recurrence validation and rendering
//! - `error`: error types and result aliases
//! - `gc`: garbage collection pass
//! - `import`: legacy flat-file bulk import
//! - `lock`: file locking and atomic writes
//! - `output`: table and info-view formatting
//! - `report`: report engine
//! - `store`: the durable task store
//! - `task`: task record model

pub mod classify;
pub mod cli;
pub mod codec;
pub mod config;
pub mod dates;
pub mod error;
pub mod gc;
pub mod import;
pub mod lock;
pub mod output;
pub mod report;
pub mod store;
pub mod task;

pub use error::{Error, Result};
