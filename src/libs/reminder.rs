//! Reminder records attached to tasks.

use crate::libs::source::Source;
use chrono::{DateTime, Local};
use uuid::Uuid;

/// A reminder owned by a task.
///
/// Reminders have no lifecycle of their own: they are created, updated and
/// deleted while reconciling their parent task, and deleting the task
/// cascades to them.
#[derive(Debug, Clone, PartialEq)]
pub struct Reminder {
    pub id: Uuid,
    /// When the reminder should fire.
    pub time: DateTime<Local>,
    pub creation_date: DateTime<Local>,
    /// The owning task, in the same store.
    pub task_id: Uuid,
    pub source: Source,
}

impl Reminder {
    /// Arguments that recreate this reminder as-is, carrying its own id.
    pub fn arguments(&self) -> ReminderArguments {
        ReminderArguments {
            time: self.time,
            id: Some(self.id),
        }
    }
}

/// Write-side arguments for creating or updating a reminder.
///
/// Reminder reconciliation matches solely by `id`: two reminders with the
/// same `time` but different ids are distinct.
#[derive(Debug, Clone, PartialEq)]
pub struct ReminderArguments {
    pub time: DateTime<Local>,
    pub id: Option<Uuid>,
}

impl ReminderArguments {
    pub fn new(time: DateTime<Local>) -> Self {
        Self { time, id: None }
    }
}
