//! # Taskhive - Task synchronization and caching for humans
//!
//! A personal task manager whose data may live in a local embedded store,
//! a remote cloud store, or both, with a caching sync core in between.
//!
//! ## Features
//!
//! - **Two Stores, One Contract**: The same CRUD surface over a local SQLite
//!   store and a remote cloud store
//! - **Day-Bucketed Caching**: Fetched tasks are merged and deduplicated into
//!   per-day buckets to avoid redundant store round-trips
//! - **Overdue Rollover**: Unticked tasks due before today are moved to today
//!   on every fetch
//! - **Reminder Reconciliation**: Diff-based create/update/delete of a task's
//!   reminders on update
//! - **Partial-Failure Tolerance**: One store's outage never blocks another
//!   store's data
//!
//! ## Usage
//!
//! ```rust,no_run
//! use taskhive::commands::Cli;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     Cli::menu().await
//! }
//! ```

pub mod api;
pub mod commands;
pub mod db;
pub mod libs;
