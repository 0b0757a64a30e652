//! Reminder surface of the local store.

use super::db::Db;
use crate::libs::query::{parse_sql_date, sql_date};
use crate::libs::reconcile::ReminderBackend;
use crate::libs::reminder::{Reminder, ReminderArguments};
use crate::libs::source::Source;
use anyhow::Result;
use chrono::Local;
use rusqlite::{params, Connection, Row};
use std::path::Path;
use thiserror::Error;
use uuid::Uuid;

const INSERT_REMINDER: &str = "INSERT INTO reminders (id, task_id, time, creation_date) VALUES (?1, ?2, ?3, ?4)";
const UPDATE_REMINDER: &str = "UPDATE reminders SET time = ?2, update_date = ?3 WHERE id = ?1";
const DELETE_REMINDER: &str = "DELETE FROM reminders WHERE id = ?1";
pub(crate) const SELECT_REMINDERS_BY_TASK: &str = "SELECT id, task_id, time, creation_date FROM reminders WHERE task_id = ?1 ORDER BY time";

/// Errors that can come from local reminder operations.
#[derive(Debug, Error)]
pub enum CrudError {
    #[error("failed to save reminder")]
    Save(#[source] rusqlite::Error),
    #[error("failed to fetch reminders")]
    Fetch(#[source] rusqlite::Error),
    #[error("failed to update reminder")]
    Update(#[source] rusqlite::Error),
    #[error("failed to delete reminder")]
    Delete(#[source] rusqlite::Error),
}

/// Reminder CRUD against the local SQLite store.
pub struct LocalReminders {
    conn: Connection,
}

impl LocalReminders {
    /// Opens the store in the platform data directory.
    pub fn new() -> Result<Self> {
        Ok(Self { conn: Db::new()?.conn })
    }

    /// Opens the store at an explicit path.
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self { conn: Db::open(path)?.conn })
    }

    /// Creates a reminder owned by the given task. A caller-provided id in
    /// the arguments is honored, otherwise a fresh one is assigned.
    pub fn create(&self, task_id: Uuid, arguments: &ReminderArguments) -> Result<Reminder, CrudError> {
        let reminder = Reminder {
            id: arguments.id.unwrap_or_else(Uuid::new_v4),
            time: arguments.time,
            creation_date: Local::now(),
            task_id,
            source: Source::Local,
        };

        self.conn
            .execute(
                INSERT_REMINDER,
                params![
                    reminder.id.to_string(),
                    reminder.task_id.to_string(),
                    sql_date(&reminder.time),
                    sql_date(&reminder.creation_date)
                ],
            )
            .map_err(CrudError::Save)?;

        Ok(reminder)
    }

    /// Overwrites the reminder's fire time and stamps an update date.
    pub fn update(&self, reminder: &Reminder, arguments: &ReminderArguments) -> Result<Reminder, CrudError> {
        self.conn
            .execute(
                UPDATE_REMINDER,
                params![reminder.id.to_string(), sql_date(&arguments.time), sql_date(&Local::now())],
            )
            .map_err(CrudError::Update)?;

        Ok(Reminder {
            time: arguments.time,
            ..reminder.clone()
        })
    }

    pub fn delete(&self, reminder: &Reminder) -> Result<(), CrudError> {
        self.conn.execute(DELETE_REMINDER, params![reminder.id.to_string()]).map_err(CrudError::Delete)?;
        Ok(())
    }

    /// All reminders owned by the given task, ordered by fire time.
    pub fn for_task(&self, task_id: Uuid) -> Result<Vec<Reminder>, CrudError> {
        reminders_for_task(&self.conn, task_id)
    }
}

impl ReminderBackend for LocalReminders {
    type Error = CrudError;

    async fn create_reminder(&self, task_id: Uuid, arguments: &ReminderArguments) -> Result<Reminder, Self::Error> {
        self.create(task_id, arguments)
    }

    async fn update_reminder(&self, reminder: &Reminder, arguments: &ReminderArguments) -> Result<Reminder, Self::Error> {
        self.update(reminder, arguments)
    }

    async fn delete_reminder(&self, reminder: &Reminder) -> Result<(), Self::Error> {
        self.delete(reminder)
    }
}

/// Shared row mapping, also used when the task surface loads reminders.
pub(crate) fn map_reminder_row(row: &Row) -> rusqlite::Result<Reminder> {
    Ok(Reminder {
        id: Uuid::parse_str(&row.get::<_, String>(0)?).unwrap(),
        task_id: Uuid::parse_str(&row.get::<_, String>(1)?).unwrap(),
        time: parse_sql_date(&row.get::<_, String>(2)?).unwrap(),
        creation_date: parse_sql_date(&row.get::<_, String>(3)?).unwrap(),
        source: Source::Local,
    })
}

/// Loads a task's reminders over an existing connection.
pub(crate) fn reminders_for_task(conn: &Connection, task_id: Uuid) -> Result<Vec<Reminder>, CrudError> {
    let mut stmt = conn.prepare(SELECT_REMINDERS_BY_TASK).map_err(CrudError::Fetch)?;
    let reminder_iter = stmt.query_map(params![task_id.to_string()], map_reminder_row).map_err(CrudError::Fetch)?;

    let mut reminders = Vec::new();
    for reminder in reminder_iter {
        reminders.push(reminder.map_err(CrudError::Fetch)?);
    }
    Ok(reminders)
}
