//! Local store for the taskhive application.
//!
//! A SQLite-backed persistence layer holding the on-device copy of tasks and
//! reminders. The modules here implement one half of the store contract the
//! sync client dispatches to; the other half lives in [`crate::api`].
//!
//! ## Features
//!
//! - **Core Infrastructure**: Connection management and migrations
//! - **Task Records**: CRUD, filtered queries, and the batched due-date update
//! - **Reminder Records**: CRUD for task-owned reminders with cascade deletion
//!
//! ## Usage
//!
//! ```rust,no_run
//! use taskhive::db::tasks::LocalTasks;
//! use taskhive::libs::query::TaskQuery;
//!
//! # fn main() -> anyhow::Result<()> {
//! let tasks = LocalTasks::new()?;
//! let today = tasks.filter(&TaskQuery::due_on(chrono::Local::now().date_naive()), None)?;
//! # Ok(())
//! # }
//! ```

/// Core database connection and initialization module.
///
/// Provides the `Db` struct that manages SQLite connections, enables the
/// foreign-key cascade and applies migrations.
pub mod db;

/// Database schema migration system.
///
/// Handles versioned schema changes and tracks migration history.
pub mod migrations;

/// Reminder record operations.
///
/// CRUD for task-owned reminders, consumed mostly through reconciliation.
pub mod reminders;

/// Task record operations.
///
/// CRUD, predicate-filtered queries and the all-or-nothing batched due-date
/// update used by the rollover sweep.
pub mod tasks;
