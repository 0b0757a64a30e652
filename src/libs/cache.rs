//! In-memory, day-bucketed task cache.
//!
//! [`TaskStore`] maps a calendar day to the deduplicated list of tasks due
//! that day. It is the merge authority: everything fetched from the stores
//! flows through [`TaskStore::add_merging`], which deduplicates by id with
//! incoming data winning over cached data. The whole map sits behind a single
//! `tokio` mutex, so all reads and mutations are serialized in FIFO order and
//! each mutation completes as one atomic step.
//!
//! The cache does not survive a process restart; the next fetch rebuilds it.

use crate::libs::task::Task;
use chrono::NaiveDate;
use std::collections::HashMap;
use tokio::sync::Mutex;

/// Day-bucketed task cache with dedup-by-id buckets.
#[derive(Debug, Default)]
pub struct TaskStore {
    buckets: Mutex<HashMap<NaiveDate, Vec<Task>>>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached bucket for a day, if one was ever written.
    pub async fn get(&self, day: NaiveDate) -> Option<Vec<Task>> {
        self.buckets.lock().await.get(&day).cloned()
    }

    /// Unconditionally overwrites a day's bucket.
    pub async fn set_bucket(&self, day: NaiveDate, tasks: Vec<Task>) {
        self.buckets.lock().await.insert(day, tasks);
    }

    /// Merges freshly fetched tasks into their day buckets.
    ///
    /// The input is grouped by due day. For each day that already has a
    /// bucket, incoming and cached tasks are concatenated new-then-old and
    /// deduplicated by id keeping the first occurrence, so an incoming task
    /// replaces a cached one with the same id. Days without a bucket get one
    /// installed as-is (deduplicated within the input).
    pub async fn add_merging(&self, tasks: Vec<Task>) {
        let mut grouped: HashMap<NaiveDate, Vec<Task>> = HashMap::new();
        for task in tasks {
            grouped.entry(task.day()).or_default().push(task);
        }

        let mut buckets = self.buckets.lock().await;
        for (day, mut incoming) in grouped {
            if let Some(existing) = buckets.remove(&day) {
                incoming.extend(existing);
            }
            buckets.insert(day, dedup_by_id(incoming));
        }
    }

    /// Appends one task to its day's bucket without a dedup pass.
    ///
    /// Only valid on the fresh-create path, where the id cannot already be
    /// cached.
    pub async fn add_single(&self, task: Task) {
        self.buckets.lock().await.entry(task.day()).or_default().push(task);
    }

    /// Removes the task (matched by id) from the given day's bucket.
    pub async fn remove(&self, task: &Task, day: NaiveDate) -> Option<Task> {
        let mut buckets = self.buckets.lock().await;
        let bucket = buckets.get_mut(&day)?;
        let index = bucket.iter().position(|cached| cached.id == task.id)?;
        Some(bucket.remove(index))
    }

    /// Moves a task between day buckets. No-op when `from == to`.
    ///
    /// The task's due date must truncate to `to`; a violation is fatal in
    /// debug builds and logged in release builds.
    pub async fn move_task(&self, task: Task, from: NaiveDate, to: NaiveDate) {
        if from == to {
            return;
        }
        if task.day() != to {
            debug_assert!(task.day() == to, "moving task {} to bucket {} but it is due on {}", task.id, to, task.day());
            tracing::warn!(task_id = %task.id, %to, due_day = %task.day(), "moving task into a bucket that does not match its due date");
        }

        let mut buckets = self.buckets.lock().await;
        if let Some(bucket) = buckets.get_mut(&from) {
            bucket.retain(|cached| cached.id != task.id);
        }
        buckets.entry(to).or_default().push(task);
    }

    /// Replaces the cached copy of a task and relocates it if its due date
    /// changed.
    ///
    /// Looks the task up by id in `source_day`'s bucket, swaps the new value
    /// in, then moves it to the bucket of its current due day.
    pub async fn update_in_place(&self, task: Task, source_day: NaiveDate) {
        let destination = task.day();

        let mut buckets = self.buckets.lock().await;
        if let Some(bucket) = buckets.get_mut(&source_day) {
            if let Some(index) = bucket.iter().position(|cached| cached.id == task.id) {
                bucket[index] = task.clone();
            }
        }

        if source_day != destination {
            if let Some(bucket) = buckets.get_mut(&source_day) {
                bucket.retain(|cached| cached.id != task.id);
            }
            buckets.entry(destination).or_default().push(task);
        }
    }

    /// Drops every bucket.
    pub async fn clear(&self) {
        self.buckets.lock().await.clear();
    }
}

/// Keeps the first occurrence of every id, preserving order.
fn dedup_by_id(tasks: Vec<Task>) -> Vec<Task> {
    let mut seen = std::collections::HashSet::with_capacity(tasks.len());
    tasks.into_iter().filter(|task| seen.insert(task.id)).collect()
}
