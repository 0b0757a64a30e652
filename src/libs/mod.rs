//! Core library modules for the taskhive application.
//!
//! Serves as the main entry point for all taskhive library components. The
//! sync core lives here: the record model, the query predicate, the
//! day-bucketed cache, the fetch ledger, the reminder reconciler and the
//! sync client tying them together over both stores.
//!
//! ## Features
//!
//! - **Sync Core**: Client, cache, ledger, reconciler, events
//! - **Record Model**: Tasks, reminders and their write-side arguments
//! - **Core Infrastructure**: Configuration, data storage, messaging
//! - **User Interface**: Console rendering and notification handoff
//!
//! ## Usage
//!
//! ```rust,no_run
//! use taskhive::libs::client::TasksClient;
//! use taskhive::libs::config::Config;
//! use taskhive::libs::source::Source;
//! use taskhive::libs::task::TaskArguments;
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let client = TasksClient::new(Config::read()?)?;
//! let arguments = TaskArguments::new("Water the plants", chrono::Local::now());
//! client.create(Source::Local, &arguments).await?;
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod client;
pub mod config;
pub mod data_storage;
pub mod events;
pub mod fetch_context;
pub mod messages;
pub mod notify;
pub mod query;
pub mod reconcile;
pub mod reminder;
pub mod secret;
pub mod source;
pub mod task;
pub mod view;
