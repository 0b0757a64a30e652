//! Reminder handoff to a notification scheduler.
//!
//! The sync core never schedules notifications itself. After reminders are
//! reconciled it hands the resulting fire times to a [`ReminderScheduler`];
//! what that does with them (system notifications, nothing at all) is up to
//! the embedding application.

use chrono::{DateTime, Local};
use uuid::Uuid;

/// Content of a notification to schedule for a reminder.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationContent {
    pub title: String,
    pub body: String,
}

/// External scheduler contract consumed by the sync client.
pub trait ReminderScheduler {
    /// Asks the user (or the platform) for permission to notify.
    fn authorize(&self) -> bool;

    /// Schedules a notification to fire at the given time, keyed by the
    /// reminder's id so it can be replaced or cancelled later.
    fn schedule(&self, content: NotificationContent, fire_date: DateTime<Local>, id: Uuid) -> anyhow::Result<()>;

    /// Cancels a previously scheduled notification.
    fn cancel(&self, id: Uuid);
}

/// Scheduler that drops everything on the floor.
///
/// Default for headless use and tests.
#[derive(Debug, Default)]
pub struct NoopScheduler;

impl ReminderScheduler for NoopScheduler {
    fn authorize(&self) -> bool {
        false
    }

    fn schedule(&self, _content: NotificationContent, _fire_date: DateTime<Local>, _id: Uuid) -> anyhow::Result<()> {
        Ok(())
    }

    fn cancel(&self, _id: Uuid) {}
}
