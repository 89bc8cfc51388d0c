//! Query/mutation orchestration.
//!
//! Reads go through [`QueryClient::fetch`]: a fresh cache hit is served
//! directly; otherwise the caller joins the key's in-flight request (at most
//! one network call per key) or starts one. Writes go through
//! [`QueryClient::mutate`], which invalidates the declared resource-path
//! prefixes only after the mutation's success response is fully received.
//!
//! Cancellation policy: per-subscriber. Cancelling detaches only the calling
//! subscriber; the shared network call is aborted when its last subscriber
//! has cancelled.

use chrono::Duration;
use futures::future::BoxFuture;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

use super::cache::{CacheEntry, CacheStore};
use super::key::QueryKey;
use crate::cancel::{CancelSource, CancelToken};
use crate::error::ApiError;

/// One fetch attempt. Called once per attempt, so a retry rebuilds the
/// request from the same inputs instead of reusing a spent one.
pub type FetchFuture = BoxFuture<'static, Result<Value, ApiError>>;

/// A write operation plus the cache-key prefixes its success invalidates.
#[derive(Debug, Clone)]
pub struct MutationRecord {
  invalidates: Vec<String>,
}

impl MutationRecord {
  pub fn new<I, S>(invalidates: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    Self {
      invalidates: invalidates.into_iter().map(Into::into).collect(),
    }
  }

  pub fn invalidates(&self) -> &[String] {
    &self.invalidates
  }
}

type ResultSlot = Option<Result<Value, ApiError>>;

struct InFlight {
  rx: watch::Receiver<ResultSlot>,
  subscribers: Arc<AtomicUsize>,
  abort: Arc<CancelSource>,
}

struct Shared {
  store: CacheStore,
  in_flight: Mutex<HashMap<String, InFlight>>,
}

impl Shared {
  fn in_flight_lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, InFlight>> {
    self
      .in_flight
      .lock()
      .unwrap_or_else(std::sync::PoisonError::into_inner)
  }
}

/// Orchestrates cached reads and invalidating writes over one shared store.
#[derive(Clone)]
pub struct QueryClient {
  shared: Arc<Shared>,
  /// How long a fetched value stays fresh without an explicit invalidation.
  stale_time: Duration,
  /// Extra attempts allowed for transient network failures on reads.
  retry: u32,
}

impl Default for QueryClient {
  fn default() -> Self {
    Self::new()
  }
}

impl QueryClient {
  pub fn new() -> Self {
    Self {
      shared: Arc::new(Shared {
        store: CacheStore::new(),
        in_flight: Mutex::new(HashMap::new()),
      }),
      stale_time: Duration::minutes(5),
      retry: 2,
    }
  }

  /// Set the freshness window for cached data.
  pub fn with_stale_time(mut self, stale_time: Duration) -> Self {
    self.stale_time = stale_time;
    self
  }

  /// Set how many extra attempts a read gets after a network failure.
  pub fn with_retry(mut self, retry: u32) -> Self {
    self.retry = retry;
    self
  }

  /// Cached read with de-duplication.
  ///
  /// `fetcher` receives the shared abort token for the underlying network
  /// call; `cancel` detaches only this subscriber.
  pub async fn fetch<T, F>(
    &self,
    key: &QueryKey,
    cancel: &CancelToken,
    fetcher: F,
  ) -> Result<T, ApiError>
  where
    T: DeserializeOwned,
    F: Fn(CancelToken) -> FetchFuture + Send + Sync + 'static,
  {
    if let Some(value) = self.shared.store.fresh_value(key, self.stale_time) {
      return decode(value);
    }

    let (mut rx, subscribers, abort) = self.join_or_spawn(key, fetcher);

    tokio::select! {
      _ = cancel.cancelled() => {
        // Detach this subscriber; abort the shared call only if it was the
        // last one still waiting.
        if subscribers.fetch_sub(1, Ordering::SeqCst) == 1 {
          abort.cancel();
        }
        Err(ApiError::Cancelled)
      }
      result = wait_result(&mut rx) => {
        subscribers.fetch_sub(1, Ordering::SeqCst);
        result.and_then(decode)
      }
    }
  }

  /// Run a mutation; on success, invalidate the record's prefixes.
  ///
  /// Mutations are never retried - a write is not known to be idempotent.
  pub async fn mutate<T, F>(
    &self,
    record: MutationRecord,
    cancel: &CancelToken,
    op: F,
  ) -> Result<T, ApiError>
  where
    T: DeserializeOwned,
    F: FnOnce(CancelToken) -> FetchFuture,
  {
    match op(cancel.clone()).await {
      Ok(value) => {
        for prefix in record.invalidates() {
          let touched = self.shared.store.invalidate_prefix(prefix);
          tracing::debug!(prefix = %prefix, touched, "mutation invalidated cache entries");
        }
        decode(value)
      }
      Err(err @ ApiError::Auth { .. }) => {
        self.clear();
        Err(err)
      }
      Err(err) => Err(err),
    }
  }

  /// Mark every cached entry under `prefix` stale.
  pub fn invalidate_prefix(&self, prefix: &str) {
    self.shared.store.invalidate_prefix(prefix);
  }

  /// Full cache reset (logout, auth failure).
  pub fn clear(&self) {
    self.shared.store.clear();
  }

  /// Snapshot of the cache entry for `key`; exposes stale values and the
  /// error recorded alongside them.
  pub fn entry(&self, key: &QueryKey) -> Option<CacheEntry> {
    self.shared.store.entry(key)
  }

  /// Last fetch failure recorded for `key`, if any.
  pub fn last_error(&self, key: &QueryKey) -> Option<ApiError> {
    self.shared.store.entry(key).and_then(|e| e.error)
  }

  fn join_or_spawn<F>(
    &self,
    key: &QueryKey,
    fetcher: F,
  ) -> (watch::Receiver<ResultSlot>, Arc<AtomicUsize>, Arc<CancelSource>)
  where
    F: Fn(CancelToken) -> FetchFuture + Send + Sync + 'static,
  {
    let hash = key.cache_hash();
    let mut in_flight = self.shared.in_flight_lock();

    if let Some(existing) = in_flight.get(&hash) {
      existing.subscribers.fetch_add(1, Ordering::SeqCst);
      return (
        existing.rx.clone(),
        existing.subscribers.clone(),
        existing.abort.clone(),
      );
    }

    let (tx, rx) = watch::channel(None);
    let (abort_source, abort_token) = CancelSource::new();
    let abort = Arc::new(abort_source);
    let subscribers = Arc::new(AtomicUsize::new(1));

    in_flight.insert(
      hash.clone(),
      InFlight {
        rx: rx.clone(),
        subscribers: subscribers.clone(),
        abort: abort.clone(),
      },
    );
    drop(in_flight);

    let shared = self.shared.clone();
    let key = key.clone();
    let retry = self.retry;
    tokio::spawn(async move {
      let result = drive_fetch(&fetcher, &abort_token, retry).await;

      match &result {
        Ok(value) => shared.store.store_success(&key, value.clone()),
        // Aborted by its last subscriber: nobody is listening, and the
        // cache entry keeps whatever state it had.
        Err(ApiError::Cancelled) => {}
        Err(ApiError::Auth { .. }) => shared.store.clear(),
        Err(err) => shared.store.store_failure(&key, err.clone()),
      }

      shared.in_flight_lock().remove(&key.cache_hash());
      let _ = tx.send(Some(result));
    });

    (rx, subscribers, abort)
  }
}

async fn drive_fetch<F>(fetcher: &F, abort: &CancelToken, retry: u32) -> Result<Value, ApiError>
where
  F: Fn(CancelToken) -> FetchFuture,
{
  let mut attempt = 0;
  loop {
    match fetcher(abort.clone()).await {
      Err(err) if err.is_retryable() && attempt < retry => {
        attempt += 1;
        tracing::debug!(attempt, error = %err, "retrying after network failure");
      }
      other => return other,
    }
  }
}

async fn wait_result(rx: &mut watch::Receiver<ResultSlot>) -> Result<Value, ApiError> {
  loop {
    {
      let slot = rx.borrow_and_update();
      if let Some(result) = slot.as_ref() {
        return result.clone();
      }
    }
    if rx.changed().await.is_err() {
      return Err(ApiError::Network("fetch task dropped".into()));
    }
  }
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
  serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
}
