//! Diff-based reminder reconciliation.
//!
//! Reconciling brings a task's stored reminder collection in line with the
//! desired collection from [`crate::libs::task::TaskArguments`]: reminders no
//! longer referenced are deleted, referenced ones are updated when their
//! fields changed, and entries without a matching id are created. Matching is
//! solely by id; two reminders with the same fire time but different ids are
//! distinct.
//!
//! Reconciliation is best-effort on purpose: a failing operation on one
//! reminder is logged and that reminder is skipped, it never aborts the
//! parent task update. A reminder whose deletion failed is still part of the
//! returned collection, because it still exists in the store.

use crate::libs::reminder::{Reminder, ReminderArguments};
use std::collections::HashSet;
use uuid::Uuid;

/// Per-reminder operations a store must offer for reconciliation.
///
/// Implemented by the local and the remote reminder surfaces; the reconciler
/// itself stays store-agnostic.
#[allow(async_fn_in_trait)]
pub trait ReminderBackend {
    type Error: std::fmt::Display;

    /// Creates a reminder owned by the given task, honoring a caller-provided
    /// id in the arguments.
    async fn create_reminder(&self, task_id: Uuid, arguments: &ReminderArguments) -> Result<Reminder, Self::Error>;

    /// Overwrites the reminder's mutable fields.
    async fn update_reminder(&self, reminder: &Reminder, arguments: &ReminderArguments) -> Result<Reminder, Self::Error>;

    async fn delete_reminder(&self, reminder: &Reminder) -> Result<(), Self::Error>;
}

/// Reconciles a task's stored reminders against the desired list and returns
/// the task's new reminder collection.
pub async fn reconcile<B: ReminderBackend>(
    backend: &B,
    task_id: Uuid,
    existing: &[Reminder],
    desired: &[ReminderArguments],
) -> Vec<Reminder> {
    let desired_ids: HashSet<Uuid> = desired.iter().filter_map(|arguments| arguments.id).collect();

    // Delete every stored reminder the desired list no longer references.
    let mut survivors: Vec<Reminder> = Vec::new();
    let mut undeleted: Vec<Reminder> = Vec::new();
    for reminder in existing {
        if desired_ids.contains(&reminder.id) {
            survivors.push(reminder.clone());
            continue;
        }
        if let Err(err) = backend.delete_reminder(reminder).await {
            tracing::warn!(reminder_id = %reminder.id, %err, "failed to delete reminder, keeping it");
            undeleted.push(reminder.clone());
        }
    }

    // Walk the desired list: keep unchanged reminders, update changed ones,
    // create the rest.
    let mut result = Vec::with_capacity(desired.len());
    for arguments in desired {
        let matched = arguments.id.and_then(|id| survivors.iter().find(|reminder| reminder.id == id));
        match matched {
            Some(current) if current.arguments() == *arguments => result.push(current.clone()),
            Some(current) => match backend.update_reminder(current, arguments).await {
                Ok(updated) => result.push(updated),
                Err(err) => {
                    tracing::warn!(reminder_id = %current.id, %err, "failed to update reminder, keeping the stored one");
                    result.push(current.clone());
                }
            },
            None => match backend.create_reminder(task_id, arguments).await {
                Ok(created) => result.push(created),
                Err(err) => {
                    tracing::warn!(%task_id, %err, "failed to create reminder, skipping it");
                }
            },
        }
    }

    result.extend(undeleted);
    result
}
