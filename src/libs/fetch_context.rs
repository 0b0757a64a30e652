//! Ledger of completed fetches.
//!
//! Every successful day fetch is remembered as a [`FetchContext`] — the day
//! plus the set of stores that were asked. The ledger exists so a fetch that
//! partially failed can be un-remembered ([`FetchContextStore::pop_last`])
//! and retried later without being considered already covered.
//!
//! [`FetchContextStore::should_fetch`] currently always answers `true`: the
//! ledger is bookkeeping, not a cache-hit short-circuit. Turning it into one
//! is a known possible optimization that is deliberately not taken here.

use crate::libs::source::Source;
use chrono::NaiveDate;
use tokio::sync::Mutex;

/// One completed fetch: a day and the stores it covered.
///
/// The store set is normalized (sorted, deduplicated) so equality means
/// set equality.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchContext {
    pub day: NaiveDate,
    sources: Vec<Source>,
}

impl FetchContext {
    pub fn new(day: NaiveDate, sources: &[Source]) -> Self {
        let mut sources = sources.to_vec();
        sources.sort();
        sources.dedup();
        Self { day, sources }
    }

    pub fn sources(&self) -> &[Source] {
        &self.sources
    }
}

/// Ordered history of fetch contexts, serialized behind one mutex.
///
/// At most one entry is kept per day: recording a fetch for an already-known
/// day with a different store set drops the stale entry first.
#[derive(Debug, Default)]
pub struct FetchContextStore {
    store: Mutex<Vec<FetchContext>>,
}

impl FetchContextStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn append(&self, context: FetchContext) {
        self.store.lock().await.push(context);
    }

    /// Replaces the whole history.
    pub async fn replace(&self, contexts: Vec<FetchContext>) {
        *self.store.lock().await = contexts;
    }

    /// Forgets the most recent fetch, returning it.
    pub async fn pop_last(&self) -> Option<FetchContext> {
        self.store.lock().await.pop()
    }

    /// Records that a fetch for `context` is about to run and says whether
    /// the stores should actually be queried.
    ///
    /// With `force_fetch` the context is appended unconditionally. Otherwise
    /// a stale entry for the same day with a different store set is pruned,
    /// and the context is appended unless an identical entry already exists.
    /// Either way the answer is `true` today; the history is maintained for
    /// the pop-on-error invalidation.
    pub async fn should_fetch(&self, context: FetchContext, force_fetch: bool) -> bool {
        let mut store = self.store.lock().await;

        if force_fetch {
            store.push(context);
            return true;
        }

        if let Some(index) = store.iter().position(|known| known.day == context.day) {
            if store[index].sources != context.sources {
                store.remove(index);
            }
        }

        if !store.contains(&context) {
            store.push(context);
        }

        true
    }

    /// Snapshot of the history, oldest first.
    pub async fn history(&self) -> Vec<FetchContext> {
        self.store.lock().await.clone()
    }
}
