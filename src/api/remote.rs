//! Remote cloud store client.
//!
//! Implements the record contract against the cloud store's JSON API: task
//! CRUD, the reminder sub-surface used by reconciliation, and the batched
//! due-date update. Every write against the cloud store is revision-guarded;
//! the client keeps an `id -> revision` map populated on every fetch and save
//! so updates and deletes can round-trip without refetching. Domain objects
//! never carry wire payloads.
//!
//! The cloud store is allowed to be in a messy state: fetches deduplicate
//! records by id (keeping the first) and issue best-effort deletes for the
//! surplus, and a missing collection (the record type was never created) is
//! an empty list, not an error.

use crate::api::{Session, MAX_RETRY_COUNT};
use crate::libs::config::ConfigModule;
use crate::libs::query::TaskQuery;
use crate::libs::reconcile::ReminderBackend;
use crate::libs::reminder::{Reminder, ReminderArguments};
use crate::libs::secret::Secret;
use crate::libs::source::Source;
use crate::libs::task::{Task, TaskArguments};
use anyhow::Result;
use base64::prelude::*;
use chrono::{DateTime, Local, SecondsFormat};
use dialoguer::{theme::ColorfulTheme, Confirm, Input};
use parking_lot::Mutex;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicI32, Ordering};
use thiserror::Error;
use uuid::Uuid;

const SESSION_FILE: &str = ".remote_session_id";
const SECRET_FILE: &str = ".remote_secret";
const LOGIN_URL: &str = "auth/login";
const TASKS_URL: &str = "tasks";
const TASKS_FILTER_URL: &str = "tasks/filter";
const TASKS_DUE_DATES_URL: &str = "tasks/due-dates";
const REMINDERS_URL: &str = "reminders";

/// What went wrong while talking to the remote store.
#[derive(Debug, Error)]
pub enum RemoteFailure {
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("remote rejected the request with status {0}")]
    Status(StatusCode),
    #[error("session error: {0}")]
    Session(String),
    #[error("invalid payload: {0}")]
    Decode(String),
}

/// Errors that can come from remote store operations, shaped by operation
/// kind so the sync client can map them one-to-one.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("failed to save record")]
    Save(#[source] RemoteFailure),
    #[error("failed to fetch records")]
    Fetch(#[source] RemoteFailure),
    #[error("failed to update record")]
    Update(#[source] RemoteFailure),
    #[error("failed to update records in batch")]
    UpdateMany(#[source] RemoteFailure),
    #[error("failed to delete record")]
    Delete(#[source] RemoteFailure),
    #[error("remote store is disabled by the user")]
    DisabledByUser,
    #[error("{0}")]
    General(String),
}

#[derive(Serialize)]
struct LoginCredentials {
    login: String,
    password: String,
}

#[derive(Deserialize)]
struct LoginResponse {
    token: String,
}

/// Wire form of a task record. Dates travel as RFC 3339 strings.
#[derive(Debug, Serialize, Deserialize)]
struct TaskRecord {
    id: String,
    title: String,
    description: Option<String>,
    notes: Option<String>,
    ticked: bool,
    due_date: String,
    completion_date: Option<String>,
    creation_date: String,
    rev: i64,
    #[serde(default)]
    reminders: Vec<ReminderRecord>,
}

/// Wire form of a reminder record.
#[derive(Debug, Serialize, Deserialize)]
struct ReminderRecord {
    id: String,
    task_id: String,
    time: String,
    creation_date: String,
    rev: i64,
}

#[derive(Serialize)]
struct SaveTaskPayload {
    id: String,
    title: String,
    description: Option<String>,
    notes: Option<String>,
    ticked: bool,
    due_date: String,
    completion_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rev: Option<i64>,
}

#[derive(Serialize)]
struct FilterPayload {
    query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    limit: Option<usize>,
}

#[derive(Serialize)]
struct DueDatesPayload {
    ids: Vec<String>,
    due_date: String,
}

#[derive(Serialize)]
struct SaveReminderPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    task_id: String,
    time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    rev: Option<i64>,
}

/// Task and reminder CRUD against the remote cloud store.
pub struct RemoteTasks {
    client: Client,
    config: RemoteConfig,
    secret: Secret,
    retries: AtomicI32,
    /// Revision of the last wire record seen per id, for round-tripping
    /// writes. Never held across an await.
    revisions: Mutex<HashMap<Uuid, i64>>,
}

impl RemoteTasks {
    pub fn new(config: &RemoteConfig) -> Self {
        Self {
            client: Client::new(),
            config: config.clone(),
            secret: Secret::new(SECRET_FILE, "Enter your remote store password"),
            retries: AtomicI32::new(0),
            revisions: Mutex::new(HashMap::new()),
        }
    }

    /// A client for an unconfigured remote store; every operation reports
    /// [`RemoteError::DisabledByUser`].
    pub fn disabled() -> Self {
        Self::new(&RemoteConfig::default())
    }

    /// All tasks in the remote store, duplicates scrubbed.
    pub async fn list(&self) -> Result<Vec<Task>, RemoteError> {
        self.ensure_enabled()?;

        let records = self
            .fetch_records(|client, token| client.get(self.api_url(TASKS_URL)).bearer_auth(token))
            .await
            .map_err(RemoteError::Fetch)?;
        let records = self.scrub_duplicates(records).await;

        records.into_iter().map(task_from_record).collect::<Result<_, _>>().map_err(RemoteError::Fetch)
    }

    /// Tasks matching the query, duplicates scrubbed.
    ///
    /// The query crosses the wire in its textual form.
    pub async fn filter(&self, query: &TaskQuery, limit: Option<usize>) -> Result<Vec<Task>, RemoteError> {
        self.ensure_enabled()?;

        let payload = FilterPayload {
            query: query.to_string(),
            limit,
        };
        let records = self
            .fetch_records(|client, token| client.post(self.api_url(TASKS_FILTER_URL)).bearer_auth(token).json(&payload))
            .await
            .map_err(RemoteError::Fetch)?;
        let records = self.scrub_duplicates(records).await;

        records.into_iter().map(task_from_record).collect::<Result<_, _>>().map_err(RemoteError::Fetch)
    }

    /// First task matching the query.
    pub async fn find(&self, query: &TaskQuery) -> Result<Option<Task>, RemoteError> {
        Ok(self.filter(query, Some(1)).await?.into_iter().next())
    }

    /// Creates a task in the remote store.
    pub async fn create(&self, arguments: &TaskArguments) -> Result<Task, RemoteError> {
        self.ensure_enabled()?;

        let payload = save_payload(arguments.id.unwrap_or_else(Uuid::new_v4), arguments, None);
        let response = self
            .request_with_session(|client, token| client.post(self.api_url(TASKS_URL)).bearer_auth(token).json(&payload))
            .await
            .map_err(RemoteError::Save)?;

        let record = decode_record::<TaskRecord>(response).await.map_err(RemoteError::Save)?;
        self.remember_revision(&record);
        task_from_record(record).map_err(RemoteError::Save)
    }

    /// Overwrites the task's mutable fields in the remote store.
    ///
    /// The write is revision-guarded: the revision comes from the cache
    /// populated by earlier fetches, or from a lookup when the record was
    /// never seen by this client.
    pub async fn update(&self, task: &Task, arguments: &TaskArguments) -> Result<Task, RemoteError> {
        self.ensure_enabled()?;

        let rev = self.revision_for(task.id).await.map_err(RemoteError::Update)?;
        let payload = save_payload(task.id, arguments, rev);
        let url = format!("{}/{}", self.api_url(TASKS_URL), task.id);
        let response = self
            .request_with_session(|client, token| client.put(url.as_str()).bearer_auth(token).json(&payload))
            .await
            .map_err(RemoteError::Update)?;

        let record = decode_record::<TaskRecord>(response).await.map_err(RemoteError::Update)?;
        self.remember_revision(&record);

        let mut updated = task_from_record(record).map_err(RemoteError::Update)?;
        updated.creation_date = task.creation_date;
        updated.reminders = task.reminders.clone();
        Ok(updated)
    }

    /// Deletes the task from the remote store. The store cascades the task's
    /// reminders.
    pub async fn delete(&self, task: &Task) -> Result<(), RemoteError> {
        self.ensure_enabled()?;

        let url = format!("{}/{}", self.api_url(TASKS_URL), task.id);
        let response = self
            .request_with_session(|client, token| client.delete(url.as_str()).bearer_auth(token))
            .await
            .map_err(RemoteError::Delete)?;
        expect_success(&response).map_err(RemoteError::Delete)?;

        self.revisions.lock().remove(&task.id);
        Ok(())
    }

    /// Moves every given task to a new due date in one request; the server
    /// applies the batch all-or-nothing. No-op for an empty slice.
    pub async fn update_many_due_dates(&self, tasks: &[Task], date: &DateTime<Local>) -> Result<(), RemoteError> {
        if tasks.is_empty() {
            return Ok(());
        }
        self.ensure_enabled()?;

        let payload = DueDatesPayload {
            ids: tasks.iter().map(|task| task.id.to_string()).collect(),
            due_date: wire_date(date),
        };
        let response = self
            .request_with_session(|client, token| client.patch(self.api_url(TASKS_DUE_DATES_URL)).bearer_auth(token).json(&payload))
            .await
            .map_err(RemoteError::UpdateMany)?;
        expect_success(&response).map_err(RemoteError::UpdateMany)?;

        Ok(())
    }

    // - Internal helpers

    fn ensure_enabled(&self) -> Result<(), RemoteError> {
        if !self.config.enabled {
            return Err(RemoteError::DisabledByUser);
        }
        Ok(())
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/{}", self.config.api_url.trim_end_matches('/'), path)
    }

    /// Sends a request with a session token, dropping the session and
    /// retrying (bounded) when the remote answers 401.
    async fn request_with_session<F>(&self, build: F) -> Result<Response, RemoteFailure>
    where
        F: Fn(&Client, &str) -> RequestBuilder,
    {
        loop {
            let token = self.session_token().await.map_err(|err| RemoteFailure::Session(err.to_string()))?;
            let response = build(&self.client, &token).send().await?;

            match response.status() {
                StatusCode::UNAUTHORIZED if self.retries.load(Ordering::Relaxed) < MAX_RETRY_COUNT => {
                    let _ = self.drop_session();
                    tokio::time::sleep(std::time::Duration::from_secs(1)).await;
                    self.retries.fetch_add(1, Ordering::Relaxed);
                    continue;
                }
                _ => return Ok(response),
            }
        }
    }

    /// Runs a collection fetch. A 404 means the record type was never
    /// created on the remote store and reads as an empty collection.
    async fn fetch_records<F>(&self, build: F) -> Result<Vec<TaskRecord>, RemoteFailure>
    where
        F: Fn(&Client, &str) -> RequestBuilder,
    {
        let response = self.request_with_session(build).await?;

        if response.status() == StatusCode::NOT_FOUND {
            tracing::info!("remote record type not created yet");
            return Ok(Vec::new());
        }
        expect_success(&response)?;

        let records = response.json::<Vec<TaskRecord>>().await?;
        for record in &records {
            self.remember_revision(record);
        }
        Ok(records)
    }

    /// Deduplicates fetched records by id, keeping the first occurrence, and
    /// deletes the surplus from the store (best-effort, logged).
    async fn scrub_duplicates(&self, records: Vec<TaskRecord>) -> Vec<TaskRecord> {
        let mut seen: HashMap<String, TaskRecord> = HashMap::new();
        let mut order: Vec<String> = Vec::new();
        let mut surplus: Vec<TaskRecord> = Vec::new();

        for record in records {
            if seen.contains_key(&record.id) {
                surplus.push(record);
            } else {
                order.push(record.id.clone());
                seen.insert(record.id.clone(), record);
            }
        }

        for duplicate in surplus {
            let url = format!("{}/{}", self.api_url(TASKS_URL), duplicate.id);
            let outcome = self.request_with_session(|client, token| client.delete(url.as_str()).bearer_auth(token)).await;
            match outcome.map(|response| response.status()) {
                Ok(status) if status.is_success() => {
                    tracing::info!(task_id = %duplicate.id, "deleted duplicate remote task");
                }
                Ok(status) => tracing::warn!(task_id = %duplicate.id, %status, "failed to delete duplicate remote task"),
                Err(err) => tracing::warn!(task_id = %duplicate.id, %err, "failed to delete duplicate remote task"),
            }
        }

        order.into_iter().filter_map(|id| seen.remove(&id)).collect()
    }

    async fn revision_for(&self, id: Uuid) -> Result<Option<i64>, RemoteFailure> {
        if let Some(rev) = self.revisions.lock().get(&id).copied() {
            return Ok(Some(rev));
        }

        // Never seen by this client; one lookup repopulates the cache.
        let payload = FilterPayload {
            query: TaskQuery::id_is(id).to_string(),
            limit: Some(1),
        };
        self.fetch_records(|client, token| client.post(self.api_url(TASKS_FILTER_URL)).bearer_auth(token).json(&payload))
            .await?;
        Ok(self.revisions.lock().get(&id).copied())
    }

    fn remember_revision(&self, record: &TaskRecord) {
        if let Ok(id) = Uuid::parse_str(&record.id) {
            self.revisions.lock().insert(id, record.rev);
        }
    }
}

impl Session for RemoteTasks {
    async fn login(&self) -> Result<String> {
        let password = match self.retry() > 0 {
            true => self.secret().prompt()?,
            false => self.secret().get_or_prompt()?,
        };
        let encoded_password = BASE64_STANDARD.encode(BASE64_STANDARD.encode(password));
        let credentials = LoginCredentials {
            login: self.config.login.clone(),
            password: encoded_password,
        };

        let url = format!("{}/{}", self.config.auth_url.trim_end_matches('/'), LOGIN_URL);
        let response = self.client.post(url).json(&credentials).send().await?;
        if !response.status().is_success() {
            anyhow::bail!("login failed with status {}", response.status());
        }

        let session: LoginResponse = response.json().await?;
        Ok(session.token)
    }

    fn session_file(&self) -> &str {
        SESSION_FILE
    }

    fn secret(&self) -> &Secret {
        &self.secret
    }

    fn retry(&self) -> i32 {
        self.retries.load(Ordering::Relaxed)
    }

    fn inc_retry(&self) {
        self.retries.fetch_add(1, Ordering::Relaxed);
    }
}

impl ReminderBackend for RemoteTasks {
    type Error = RemoteError;

    async fn create_reminder(&self, task_id: Uuid, arguments: &ReminderArguments) -> Result<Reminder, Self::Error> {
        self.ensure_enabled()?;

        let payload = SaveReminderPayload {
            id: arguments.id.map(|id| id.to_string()),
            task_id: task_id.to_string(),
            time: wire_date(&arguments.time),
            rev: None,
        };
        let response = self
            .request_with_session(|client, token| client.post(self.api_url(REMINDERS_URL)).bearer_auth(token).json(&payload))
            .await
            .map_err(RemoteError::Save)?;

        let record = decode_record::<ReminderRecord>(response).await.map_err(RemoteError::Save)?;
        reminder_from_record(record).map_err(RemoteError::Save)
    }

    async fn update_reminder(&self, reminder: &Reminder, arguments: &ReminderArguments) -> Result<Reminder, Self::Error> {
        self.ensure_enabled()?;

        let payload = SaveReminderPayload {
            id: None,
            task_id: reminder.task_id.to_string(),
            time: wire_date(&arguments.time),
            rev: None,
        };
        let url = format!("{}/{}", self.api_url(REMINDERS_URL), reminder.id);
        let response = self
            .request_with_session(|client, token| client.put(url.as_str()).bearer_auth(token).json(&payload))
            .await
            .map_err(RemoteError::Update)?;

        let record = decode_record::<ReminderRecord>(response).await.map_err(RemoteError::Update)?;
        reminder_from_record(record).map_err(RemoteError::Update)
    }

    async fn delete_reminder(&self, reminder: &Reminder) -> Result<(), Self::Error> {
        self.ensure_enabled()?;

        let url = format!("{}/{}", self.api_url(REMINDERS_URL), reminder.id);
        let response = self
            .request_with_session(|client, token| client.delete(url.as_str()).bearer_auth(token))
            .await
            .map_err(RemoteError::Delete)?;
        expect_success(&response).map_err(RemoteError::Delete)?;

        Ok(())
    }
}

fn expect_success(response: &Response) -> Result<(), RemoteFailure> {
    if !response.status().is_success() {
        return Err(RemoteFailure::Status(response.status()));
    }
    Ok(())
}

async fn decode_record<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, RemoteFailure> {
    expect_success(&response)?;
    Ok(response.json::<T>().await?)
}

fn save_payload(id: Uuid, arguments: &TaskArguments, rev: Option<i64>) -> SaveTaskPayload {
    SaveTaskPayload {
        id: id.to_string(),
        title: arguments.title.clone(),
        description: arguments.description.clone(),
        notes: arguments.notes.clone(),
        ticked: arguments.ticked,
        due_date: wire_date(&arguments.due_date),
        completion_date: arguments.completion_date.as_ref().map(wire_date),
        rev,
    }
}

fn wire_date(date: &DateTime<Local>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_wire_date(raw: &str) -> Result<DateTime<Local>, RemoteFailure> {
    DateTime::parse_from_rfc3339(raw)
        .map(|date| date.with_timezone(&Local))
        .map_err(|err| RemoteFailure::Decode(format!("bad date {:?}: {}", raw, err)))
}

fn task_from_record(record: TaskRecord) -> Result<Task, RemoteFailure> {
    let id = Uuid::parse_str(&record.id).map_err(|err| RemoteFailure::Decode(format!("bad task id {:?}: {}", record.id, err)))?;

    let mut reminders = Vec::with_capacity(record.reminders.len());
    for reminder in record.reminders {
        reminders.push(reminder_from_record(reminder)?);
    }
    reminders.sort_by_key(|reminder| reminder.time);

    Ok(Task {
        id,
        title: record.title,
        description: record.description,
        notes: record.notes,
        ticked: record.ticked,
        due_date: parse_wire_date(&record.due_date)?,
        completion_date: record.completion_date.as_deref().map(parse_wire_date).transpose()?,
        creation_date: parse_wire_date(&record.creation_date)?,
        source: Source::Remote,
        reminders,
    })
}

fn reminder_from_record(record: ReminderRecord) -> Result<Reminder, RemoteFailure> {
    Ok(Reminder {
        id: Uuid::parse_str(&record.id).map_err(|err| RemoteFailure::Decode(format!("bad reminder id {:?}: {}", record.id, err)))?,
        task_id: Uuid::parse_str(&record.task_id)
            .map_err(|err| RemoteFailure::Decode(format!("bad reminder task id {:?}: {}", record.task_id, err)))?,
        time: parse_wire_date(&record.time)?,
        creation_date: parse_wire_date(&record.creation_date)?,
        source: Source::Remote,
    })
}

/// Remote store connection settings.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct RemoteConfig {
    /// Whether the user wants the remote store used at all.
    pub enabled: bool,
    pub login: String,
    pub auth_url: String,
    pub api_url: String,
}

impl RemoteConfig {
    pub fn module() -> ConfigModule {
        ConfigModule {
            key: "remote".to_string(),
            name: "Remote store".to_string(),
        }
    }

    /// Interactive setup, pre-filled from the existing configuration.
    pub fn init(config: &Option<RemoteConfig>) -> Result<Self> {
        let config = config.clone().unwrap_or_default();
        println!("Remote store settings");
        Ok(Self {
            enabled: Confirm::with_theme(&ColorfulTheme::default())
                .with_prompt("Enable the remote store?")
                .default(true)
                .interact()?,
            login: Input::with_theme(&ColorfulTheme::default())
                .with_prompt("Enter your remote store login")
                .default(config.login)
                .interact_text()?,
            auth_url: Input::with_theme(&ColorfulTheme::default())
                .with_prompt("Enter the remote store auth URL")
                .default(config.auth_url)
                .interact_text()?,
            api_url: Input::with_theme(&ColorfulTheme::default())
                .with_prompt("Enter the remote store API URL")
                .default(config.api_url)
                .interact_text()?,
        })
    }
}
