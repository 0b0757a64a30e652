//! Task surface of the local store.
//!
//! All operations are plain CRUD against SQLite: nothing here touches the
//! in-memory cache or the fetch ledger, those belong to the sync client.

use super::db::Db;
use super::reminders;
use crate::libs::query::{parse_sql_date, sql_date, TaskQuery};
use crate::libs::source::Source;
use crate::libs::task::{Task, TaskArguments};
use anyhow::Result;
use chrono::{DateTime, Local};
use rusqlite::{params, params_from_iter, Connection, Row};
use std::path::Path;
use thiserror::Error;
use uuid::Uuid;

const INSERT_TASK: &str = "INSERT INTO tasks (id, title, description, notes, ticked, due_date, completion_date, creation_date)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)";
const SELECT_TASKS: &str = "SELECT id, title, description, notes, ticked, due_date, completion_date, creation_date FROM tasks";
const UPDATE_TASK: &str = "UPDATE tasks SET title = ?2, description = ?3, notes = ?4, ticked = ?5, due_date = ?6, completion_date = ?7, update_date = ?8
    WHERE id = ?1";
const DELETE_TASK: &str = "DELETE FROM tasks WHERE id = ?1";
const UPDATE_MANY_DUE_DATES: &str = "UPDATE tasks SET due_date = ?, update_date = ? WHERE id IN";
#[cfg(debug_assertions)]
const CLEAR_TASKS: &str = "DELETE FROM tasks";

/// Errors that can come from local task operations.
#[derive(Debug, Error)]
pub enum CrudError {
    #[error("failed to save task")]
    Save(#[source] rusqlite::Error),
    #[error("failed to fetch tasks")]
    Fetch(#[source] rusqlite::Error),
    #[error("failed to update task")]
    Update(#[source] rusqlite::Error),
    #[error("failed to update tasks in batch")]
    UpdateMany(#[source] rusqlite::Error),
    #[error("failed to delete task")]
    Delete(#[source] rusqlite::Error),
    #[error("failed to clear tasks")]
    Clear(#[source] rusqlite::Error),
    #[error("{0}")]
    General(String),
}

/// Task CRUD against the local SQLite store.
pub struct LocalTasks {
    conn: Connection,
}

impl LocalTasks {
    /// Opens the store in the platform data directory.
    pub fn new() -> Result<Self> {
        Ok(Self { conn: Db::new()?.conn })
    }

    /// Opens the store at an explicit path.
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self { conn: Db::open(path)?.conn })
    }

    /// Creates a task from the given arguments and persists it.
    ///
    /// A caller-provided id is honored, otherwise a fresh one is assigned.
    /// The creation date is stamped here; reminders are reconciled separately
    /// by the sync client.
    pub fn create(&self, arguments: &TaskArguments) -> Result<Task, CrudError> {
        let task = Task {
            id: arguments.id.unwrap_or_else(Uuid::new_v4),
            title: arguments.title.clone(),
            description: arguments.description.clone(),
            notes: arguments.notes.clone(),
            ticked: arguments.ticked,
            due_date: arguments.due_date,
            completion_date: arguments.completion_date,
            creation_date: Local::now(),
            source: Source::Local,
            reminders: Vec::new(),
        };

        self.conn
            .execute(
                INSERT_TASK,
                params![
                    task.id.to_string(),
                    task.title,
                    task.description,
                    task.notes,
                    task.ticked,
                    sql_date(&task.due_date),
                    task.completion_date.as_ref().map(sql_date),
                    sql_date(&task.creation_date),
                ],
            )
            .map_err(CrudError::Save)?;

        Ok(task)
    }

    /// Finds a single task matching the query.
    pub fn find(&self, query: &TaskQuery) -> Result<Option<Task>, CrudError> {
        Ok(self.filter(query, Some(1))?.into_iter().next())
    }

    /// All tasks in the store.
    pub fn list(&self) -> Result<Vec<Task>, CrudError> {
        self.filter(&TaskQuery::all(), None)
    }

    /// Tasks matching the query, reminders attached.
    pub fn filter(&self, query: &TaskQuery, limit: Option<usize>) -> Result<Vec<Task>, CrudError> {
        let (where_clause, query_params) = query.to_sql();

        let mut sql = SELECT_TASKS.to_string();
        if !where_clause.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&where_clause);
        }
        if let Some(limit) = limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }

        let mut stmt = self.conn.prepare(&sql).map_err(CrudError::Fetch)?;
        let task_iter = stmt.query_map(params_from_iter(query_params.iter()), map_task_row).map_err(CrudError::Fetch)?;

        let mut tasks = Vec::new();
        for task in task_iter {
            tasks.push(task.map_err(CrudError::Fetch)?);
        }

        for task in &mut tasks {
            task.reminders = reminders::reminders_for_task(&self.conn, task.id)
                .map_err(|err| CrudError::General(format!("failed to load reminders: {}", err)))?;
        }

        Ok(tasks)
    }

    /// Overwrites the task's mutable fields and stamps an update date.
    ///
    /// The id and creation date never change; the stored reminder collection
    /// is untouched here.
    pub fn update(&self, task: &Task, arguments: &TaskArguments) -> Result<Task, CrudError> {
        let affected = self
            .conn
            .execute(
                UPDATE_TASK,
                params![
                    task.id.to_string(),
                    arguments.title,
                    arguments.description,
                    arguments.notes,
                    arguments.ticked,
                    sql_date(&arguments.due_date),
                    arguments.completion_date.as_ref().map(sql_date),
                    sql_date(&Local::now()),
                ],
            )
            .map_err(CrudError::Update)?;

        if affected == 0 {
            return Err(CrudError::General(format!("no stored task with id {}", task.id)));
        }

        Ok(Task {
            title: arguments.title.clone(),
            description: arguments.description.clone(),
            notes: arguments.notes.clone(),
            ticked: arguments.ticked,
            due_date: arguments.due_date,
            completion_date: arguments.completion_date,
            ..task.clone()
        })
    }

    /// Deletes the task. Its reminders cascade in the same statement.
    pub fn delete(&self, task: &Task) -> Result<(), CrudError> {
        self.conn.execute(DELETE_TASK, params![task.id.to_string()]).map_err(CrudError::Delete)?;
        Ok(())
    }

    /// Moves every given task to a new due date in one statement.
    ///
    /// Used by the rollover sweep; the single `UPDATE` makes the batch
    /// all-or-nothing. No-op for an empty slice.
    pub fn update_many_due_dates(&self, tasks: &[Task], date: &DateTime<Local>) -> Result<(), CrudError> {
        if tasks.is_empty() {
            return Ok(());
        }

        let sql = format!("{} ({})", UPDATE_MANY_DUE_DATES, vec!["?"; tasks.len()].join(", "));
        let mut sql_params: Vec<String> = vec![sql_date(date), sql_date(date)];
        sql_params.extend(tasks.iter().map(|task| task.id.to_string()));

        self.conn
            .execute(&sql, params_from_iter(sql_params.iter()))
            .map_err(CrudError::UpdateMany)?;

        Ok(())
    }

    /// Wipes every task (and, through the cascade, every reminder).
    #[cfg(debug_assertions)]
    pub fn clear(&self) -> Result<(), CrudError> {
        self.conn.execute(CLEAR_TASKS, []).map_err(CrudError::Clear)?;
        Ok(())
    }
}

fn map_task_row(row: &Row) -> rusqlite::Result<Task> {
    Ok(Task {
        id: Uuid::parse_str(&row.get::<_, String>(0)?).unwrap(),
        title: row.get(1)?,
        description: row.get(2)?,
        notes: row.get(3)?,
        ticked: row.get(4)?,
        due_date: parse_sql_date(&row.get::<_, String>(5)?).unwrap(),
        completion_date: row.get::<_, Option<String>>(6)?.map(|raw| parse_sql_date(&raw).unwrap()),
        creation_date: parse_sql_date(&row.get::<_, String>(7)?).unwrap(),
        source: Source::Local,
        reminders: Vec::new(),
    })
}
