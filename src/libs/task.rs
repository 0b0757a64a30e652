//! Canonical task record shared by every store.
//!
//! A [`Task`] is the backend-agnostic representation of a task, no matter
//! whether it was loaded from the local SQLite store or from the remote cloud
//! store. [`TaskArguments`] is the write-side counterpart: the full set of
//! fields a caller may provide when creating or updating a task.

use crate::libs::reminder::{Reminder, ReminderArguments};
use crate::libs::source::Source;
use chrono::{DateTime, Local, NaiveDate};
use uuid::Uuid;

/// A task record.
///
/// `id`, `creation_date` and `source` are fixed for the lifetime of the
/// record; everything else is mutable through [`TaskArguments`].
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    /// Opaque unique identity, stable across fetches.
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub notes: Option<String>,
    /// Whether the task has been checked off.
    pub ticked: bool,
    pub due_date: DateTime<Local>,
    /// Set if and only if `ticked` is true. Enforced by
    /// [`Task::toggle_tick_arguments`], not by the stores.
    pub completion_date: Option<DateTime<Local>>,
    pub creation_date: DateTime<Local>,
    /// Which store owns this instance. Never changes after creation.
    pub source: Source,
    pub reminders: Vec<Reminder>,
}

impl Task {
    /// Calendar day this task is due on, in the local timezone.
    ///
    /// This is the bucketing key used by the cache, the fetch ledger and the
    /// overdue rollover sweep alike.
    pub fn day(&self) -> NaiveDate {
        self.due_date.date_naive()
    }

    /// Arguments that recreate this task as-is, carrying its own id so an
    /// update targets the same record.
    pub fn arguments(&self) -> TaskArguments {
        TaskArguments {
            title: self.title.clone(),
            description: self.description.clone(),
            notes: self.notes.clone(),
            due_date: self.due_date,
            ticked: self.ticked,
            completion_date: self.completion_date,
            id: Some(self.id),
            reminders: self.reminders.iter().map(Reminder::arguments).collect(),
        }
    }

    /// Arguments with the `ticked` state flipped to `new_state`.
    ///
    /// Stamps `completion_date` with the current time when ticking and clears
    /// it when unticking, which is what keeps the completion-date invariant.
    pub fn toggle_tick_arguments(&self, new_state: bool) -> TaskArguments {
        TaskArguments {
            completion_date: new_state.then(Local::now),
            ticked: new_state,
            ..self.arguments()
        }
    }
}

/// Write-side arguments for creating or updating a task.
///
/// A present `id` means update-or-create-with-that-identity; an absent `id`
/// always creates a new record.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskArguments {
    pub title: String,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub due_date: DateTime<Local>,
    pub ticked: bool,
    pub completion_date: Option<DateTime<Local>>,
    pub id: Option<Uuid>,
    pub reminders: Vec<ReminderArguments>,
}

impl TaskArguments {
    /// Arguments for a fresh, unticked task.
    pub fn new(title: &str, due_date: DateTime<Local>) -> Self {
        Self {
            title: title.to_string(),
            description: None,
            notes: None,
            due_date,
            ticked: false,
            completion_date: None,
            id: None,
            reminders: Vec::new(),
        }
    }
}
