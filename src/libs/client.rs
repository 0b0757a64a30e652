//! The sync client: single entry point over both stores.
//!
//! [`TasksClient`] dispatches every CRUD call to the right store, merges
//! multi-store fetch results through the day-bucketed cache, runs the overdue
//! rollover sweep, and translates store-specific failures into the
//! backend-agnostic [`TasksError`] taxonomy. Nothing outside this module ever
//! sees a store-specific error type.
//!
//! Fetching is partial-failure tolerant: one store's outage does not block
//! another store's data. Whatever was fetched successfully is merged and
//! returned together with the error, and the just-recorded fetch context is
//! popped from the ledger so a later retry is not considered already covered.

use crate::api::remote::{RemoteError, RemoteTasks};
use crate::db::reminders::LocalReminders;
use crate::db::tasks::{CrudError, LocalTasks};
use crate::libs::cache::TaskStore;
use crate::libs::config::Config;
use crate::libs::events::{EventBus, StoreEvent};
use crate::libs::fetch_context::{FetchContext, FetchContextStore};
use crate::libs::notify::{NoopScheduler, NotificationContent, ReminderScheduler};
use crate::libs::query::TaskQuery;
use crate::libs::reconcile;
use crate::libs::source::Source;
use crate::libs::task::{Task, TaskArguments};
use anyhow::Result;
use chrono::{DateTime, Local, NaiveDate};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;
use tokio::sync::broadcast;
use uuid::Uuid;

/// Store-agnostic task failures.
///
/// Every store-specific error is translated into exactly one of these kinds
/// at the dispatch boundary.
#[derive(Debug, Error)]
pub enum TasksError {
    #[error("failed to save task: {0}")]
    Save(String),
    #[error("failed to fetch tasks: {0}")]
    Fetch(String),
    #[error("failed to update task: {0}")]
    Update(String),
    #[error("failed to update tasks in batch: {0}")]
    UpdateMany(String),
    #[error("failed to delete task: {0}")]
    Delete(String),
    #[error("failed to clear tasks: {0}")]
    Clear(String),
    #[error("task not found")]
    NotFound,
    #[error("the remote store is disabled by the user")]
    RemoteDisabledByUser,
    #[error("{0}")]
    General(String),
}

/// Outcome of a fetch: whatever could be collected, plus the error of the
/// last store that failed, if any.
#[derive(Debug, Default)]
pub struct Fetched {
    pub tasks: Vec<Task>,
    pub error: Option<TasksError>,
}

/// Client to handle all task store access and modifications.
pub struct TasksClient {
    config: Config,
    local: LocalTasks,
    local_reminders: LocalReminders,
    remote: RemoteTasks,
    cache: TaskStore,
    ledger: FetchContextStore,
    events: EventBus,
    scheduler: Box<dyn ReminderScheduler + Send + Sync>,
}

impl TasksClient {
    /// Builds a client over the default database location and the given
    /// configuration.
    pub fn new(config: Config) -> Result<Self> {
        let local = LocalTasks::new()?;
        let local_reminders = LocalReminders::new()?;
        Ok(Self::assemble(config, local, local_reminders))
    }

    /// Builds a client with the local store at an explicit path.
    pub fn open(config: Config, db_path: &Path) -> Result<Self> {
        let local = LocalTasks::open(db_path)?;
        let local_reminders = LocalReminders::open(db_path)?;
        Ok(Self::assemble(config, local, local_reminders))
    }

    fn assemble(config: Config, local: LocalTasks, local_reminders: LocalReminders) -> Self {
        let remote = match &config.remote {
            Some(remote_config) => RemoteTasks::new(remote_config),
            None => RemoteTasks::disabled(),
        };

        Self {
            config,
            local,
            local_reminders,
            remote,
            cache: TaskStore::new(),
            ledger: FetchContextStore::new(),
            events: EventBus::new(),
            scheduler: Box::new(NoopScheduler),
        }
    }

    /// Replaces the reminder scheduler the client hands reconciled reminders
    /// to.
    pub fn with_scheduler(mut self, scheduler: Box<dyn ReminderScheduler + Send + Sync>) -> Self {
        self.scheduler = scheduler;
        self
    }

    /// Subscribes to store change events.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    /// The day-bucketed cache. Callers relocate tasks here after an update
    /// ([`TaskStore::update_in_place`]) or drop them after a delete.
    pub fn cache(&self) -> &TaskStore {
        &self.cache
    }

    /// The fetch ledger.
    pub fn ledger(&self) -> &FetchContextStore {
        &self.ledger
    }

    /// Creates a task on the given store and inserts it into the cache.
    pub async fn create(&self, source: Source, arguments: &TaskArguments) -> Result<Task, TasksError> {
        let mut task = match source {
            Source::Local => self.local.create(arguments).map_err(map_local)?,
            Source::Remote => self.remote.create(arguments).await.map_err(map_remote)?,
        };

        if !arguments.reminders.is_empty() {
            task.reminders = match source {
                Source::Local => reconcile::reconcile(&self.local_reminders, task.id, &[], &arguments.reminders).await,
                Source::Remote => reconcile::reconcile(&self.remote, task.id, &[], &arguments.reminders).await,
            };
            self.hand_off_reminders(&task);
        }

        self.cache.add_single(task.clone()).await;
        if source == Source::Remote {
            self.events.emit(StoreEvent::RemoteChanged);
        }

        Ok(task)
    }

    /// Fetches tasks from the given stores, optionally restricted to one
    /// calendar day.
    ///
    /// This is the central algorithm: record the fetch in the ledger, query
    /// every requested store (continuing past per-store failures), run the
    /// rollover sweep when `update_outdated` is set, merge everything into
    /// the cache, and return the requested day's bucket (or all collected
    /// tasks when no day was given) alongside the last store error.
    pub async fn fetch(&self, sources: &[Source], day: Option<NaiveDate>, update_outdated: bool, force_fetch: bool) -> Fetched {
        let mut recorded = false;
        if let Some(day) = day {
            // Always true today; the ledger keeps the bookkeeping for the
            // pop-on-error below.
            self.ledger.should_fetch(FetchContext::new(day, sources), force_fetch).await;
            recorded = true;
        }

        let mut collected: Vec<Task> = Vec::new();
        let mut error: Option<TasksError> = None;

        for source in sources {
            let fetched = match (day, source) {
                (Some(day), Source::Local) => self.local.filter(&TaskQuery::due_on(day), None).map_err(map_local),
                (Some(day), Source::Remote) => self.remote.filter(&TaskQuery::due_on(day), None).await.map_err(map_remote),
                (None, Source::Local) => self.local.list().map_err(map_local),
                (None, Source::Remote) => self.remote.list().await.map_err(map_remote),
            };

            match fetched {
                Ok(tasks) => collected.extend(tasks),
                Err(err) => {
                    tracing::error!(%source, %err, "failed to fetch tasks from store");
                    // Last failing store wins.
                    error = Some(err);
                }
            }
        }

        if update_outdated {
            let rolled = self.roll_over_outdated(sources, &collected).await;
            collected.extend(rolled);
        }

        self.cache.add_merging(collected.clone()).await;

        if error.is_some() && recorded {
            // The fetch was not fully successful; a later retry must not be
            // considered already covered.
            self.ledger.pop_last().await;
        }

        let tasks = match day {
            Some(day) => self.cache.get(day).await.unwrap_or_default(),
            None => dedup_by_id(collected),
        };

        Fetched { tasks, error }
    }

    /// Updates a task by id on the given store and reconciles its reminders.
    ///
    /// The returned task carries the reconciled reminder collection. The
    /// caller is responsible for relocating the task in the cache via
    /// [`TaskStore::update_in_place`].
    pub async fn update(&self, source: Source, id: Uuid, arguments: &TaskArguments) -> Result<Task, TasksError> {
        let query = TaskQuery::id_is(id);

        let mut updated = match source {
            Source::Local => {
                let found = self.local.find(&query).map_err(map_local)?.ok_or(TasksError::NotFound)?;
                let mut updated = self.local.update(&found, arguments).map_err(map_local)?;
                updated.reminders = reconcile::reconcile(&self.local_reminders, updated.id, &found.reminders, &arguments.reminders).await;
                updated
            }
            Source::Remote => {
                let found = self.remote.find(&query).await.map_err(map_remote)?.ok_or(TasksError::NotFound)?;
                let mut updated = self.remote.update(&found, arguments).await.map_err(map_remote)?;
                updated.reminders = reconcile::reconcile(&self.remote, updated.id, &found.reminders, &arguments.reminders).await;
                updated
            }
        };
        updated.reminders.sort_by_key(|reminder| reminder.time);

        self.hand_off_reminders(&updated);
        if source == Source::Remote {
            self.events.emit(StoreEvent::RemoteChanged);
        }

        Ok(updated)
    }

    /// Deletes a task by id from the given store, returning the deleted
    /// record. Its reminders cascade inside the store; the caller drops the
    /// task from the cache.
    pub async fn delete(&self, source: Source, id: Uuid) -> Result<Task, TasksError> {
        let query = TaskQuery::id_is(id);

        let found = match source {
            Source::Local => {
                let found = self.local.find(&query).map_err(map_local)?.ok_or(TasksError::NotFound)?;
                self.local.delete(&found).map_err(map_local)?;
                found
            }
            Source::Remote => {
                let found = self.remote.find(&query).await.map_err(map_remote)?.ok_or(TasksError::NotFound)?;
                self.remote.delete(&found).await.map_err(map_remote)?;
                found
            }
        };

        for reminder in &found.reminders {
            self.scheduler.cancel(reminder.id);
        }
        if source == Source::Remote {
            self.events.emit(StoreEvent::RemoteChanged);
        }

        Ok(found)
    }

    /// Moves the given tasks to a new due date on one store. Thin
    /// pass-through to the store's batched update; no-op for an empty slice.
    pub async fn update_many_due_dates(&self, tasks: &[Task], source: Source, date: &DateTime<Local>) -> Result<(), TasksError> {
        if tasks.is_empty() {
            return Ok(());
        }

        match source {
            Source::Local => self.local.update_many_due_dates(tasks, date).map_err(map_local),
            Source::Remote => self.remote.update_many_due_dates(tasks, date).await.map_err(map_remote),
        }
    }

    /// Wipes the local store and the cache.
    #[cfg(debug_assertions)]
    pub async fn clear(&self, source: Source) -> Result<(), TasksError> {
        match source {
            Source::Local => {
                self.local.clear().map_err(map_local)?;
                self.cache.clear().await;
                self.events.emit(StoreEvent::Cleared);
                Ok(())
            }
            Source::Remote => Err(TasksError::General("clearing the remote store is not supported".to_string())),
        }
    }

    /// The rollover sweep: every unticked task due before today is moved to
    /// now, store by store.
    ///
    /// Each store's overdue tasks are batch-updated in one all-or-nothing
    /// write. On success the stale cache copies are dropped and the tasks are
    /// returned with their due date patched to now, so the merge lands them
    /// in today's bucket. On failure the tasks are returned with their stale
    /// dates so the caller still sees them.
    async fn roll_over_outdated(&self, sources: &[Source], fetched: &[Task]) -> Vec<Task> {
        let now = Local::now();
        let today = now.date_naive();
        let fetched_ids: Vec<Uuid> = fetched.iter().map(|task| task.id).collect();
        let query = TaskQuery::overdue_unticked(today, &fetched_ids);

        let mut rolled: Vec<Task> = Vec::new();
        let mut rolled_count = 0usize;

        for source in sources {
            let outdated = match source {
                Source::Local => self.local.filter(&query, None).map_err(map_local),
                Source::Remote => self.remote.filter(&query, None).await.map_err(map_remote),
            };
            let outdated = match outdated {
                Ok(tasks) => tasks,
                Err(err) => {
                    tracing::warn!(%source, %err, "failed to query outdated tasks");
                    continue;
                }
            };
            if outdated.is_empty() {
                continue;
            }

            let updated = match source {
                Source::Local => self.local.update_many_due_dates(&outdated, &now).map_err(map_local),
                Source::Remote => self.remote.update_many_due_dates(&outdated, &now).await.map_err(map_remote),
            };

            match updated {
                Ok(()) => {
                    rolled_count += outdated.len();
                    for mut task in outdated {
                        self.cache.remove(&task, task.day()).await;
                        task.due_date = now;
                        rolled.push(task);
                    }
                }
                Err(err) => {
                    tracing::warn!(%source, %err, "failed to roll over outdated tasks, keeping their stale dates");
                    rolled.extend(outdated);
                }
            }
        }

        if rolled_count > 0 {
            tracing::info!(count = rolled_count, "rolled overdue tasks over to today");
            self.events.emit(StoreEvent::RolledOver { count: rolled_count });
        }

        rolled
    }

    /// Hands a task's reconciled reminders to the notification scheduler.
    fn hand_off_reminders(&self, task: &Task) {
        let enabled = self.config.notify.as_ref().map(|notify| notify.enabled).unwrap_or(false);
        if !enabled || task.reminders.is_empty() {
            return;
        }
        if !self.scheduler.authorize() {
            tracing::debug!("notification scheduler not authorized, skipping reminder handoff");
            return;
        }

        for reminder in &task.reminders {
            let content = NotificationContent {
                title: task.title.clone(),
                body: task.description.clone().unwrap_or_default(),
            };
            if let Err(err) = self.scheduler.schedule(content, reminder.time, reminder.id) {
                tracing::warn!(reminder_id = %reminder.id, %err, "failed to schedule reminder notification");
            }
        }
    }
}

fn map_local(err: CrudError) -> TasksError {
    match err {
        CrudError::Save(context) => TasksError::Save(context.to_string()),
        CrudError::Fetch(context) => TasksError::Fetch(context.to_string()),
        CrudError::Update(context) => TasksError::Update(context.to_string()),
        CrudError::UpdateMany(context) => TasksError::UpdateMany(context.to_string()),
        CrudError::Delete(context) => TasksError::Delete(context.to_string()),
        CrudError::Clear(context) => TasksError::Clear(context.to_string()),
        CrudError::General(message) => TasksError::General(message),
    }
}

fn map_remote(err: RemoteError) -> TasksError {
    match err {
        RemoteError::Save(context) => TasksError::Save(context.to_string()),
        RemoteError::Fetch(context) => TasksError::Fetch(context.to_string()),
        RemoteError::Update(context) => TasksError::Update(context.to_string()),
        RemoteError::UpdateMany(context) => TasksError::UpdateMany(context.to_string()),
        RemoteError::Delete(context) => TasksError::Delete(context.to_string()),
        RemoteError::DisabledByUser => TasksError::RemoteDisabledByUser,
        RemoteError::General(message) => TasksError::General(message),
    }
}

/// Keeps the first occurrence of every id, preserving order.
fn dedup_by_id(tasks: Vec<Task>) -> Vec<Task> {
    let mut seen = HashSet::with_capacity(tasks.len());
    tasks.into_iter().filter(|task| seen.insert(task.id)).collect()
}
