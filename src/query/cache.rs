//! In-memory store of cached query results.
//!
//! Entries hold raw JSON values; the typed layer deserializes on the way
//! out. A failed refetch never evicts a previously fetched value - the error
//! is recorded alongside it so callers can show stale data with an error.

use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

use super::key::QueryKey;
use crate::error::ApiError;

/// Cached state for one query key.
#[derive(Debug, Clone)]
pub struct CacheEntry {
  pub key: QueryKey,
  /// Last-known good value; survives failed refetches.
  pub value: Option<Value>,
  /// When `value` was fetched.
  pub fetched_at: Option<DateTime<Utc>>,
  /// Set by invalidation; forces a refetch on the next read.
  pub stale: bool,
  /// Most recent fetch failure, kept alongside any surviving value.
  pub error: Option<ApiError>,
}

impl CacheEntry {
  fn empty(key: QueryKey) -> Self {
    Self {
      key,
      value: None,
      fetched_at: None,
      stale: false,
      error: None,
    }
  }

  /// Whether the entry can be served without a network fetch.
  pub fn is_fresh(&self, stale_time: Duration, now: DateTime<Utc>) -> bool {
    if self.stale || self.value.is_none() {
      return false;
    }
    match self.fetched_at {
      Some(at) => now - at <= stale_time,
      None => false,
    }
  }
}

/// Process-wide cache shared by all resource facades.
#[derive(Default)]
pub struct CacheStore {
  entries: Mutex<HashMap<String, CacheEntry>>,
}

impl CacheStore {
  pub fn new() -> Self {
    Self::default()
  }

  fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, CacheEntry>> {
    // Poisoning only means a panic elsewhere; the map itself is still valid.
    self
      .entries
      .lock()
      .unwrap_or_else(std::sync::PoisonError::into_inner)
  }

  /// Value for `key` if present and within the freshness window.
  pub fn fresh_value(&self, key: &QueryKey, stale_time: Duration) -> Option<Value> {
    let entries = self.lock();
    let entry = entries.get(&key.cache_hash())?;
    if entry.is_fresh(stale_time, Utc::now()) {
      entry.value.clone()
    } else {
      None
    }
  }

  /// Snapshot of the entry for `key`, if any.
  pub fn entry(&self, key: &QueryKey) -> Option<CacheEntry> {
    self.lock().get(&key.cache_hash()).cloned()
  }

  /// Record a successful fetch.
  pub fn store_success(&self, key: &QueryKey, value: Value) {
    let mut entries = self.lock();
    let entry = entries
      .entry(key.cache_hash())
      .or_insert_with(|| CacheEntry::empty(key.clone()));
    entry.value = Some(value);
    entry.fetched_at = Some(Utc::now());
    entry.stale = false;
    entry.error = None;
  }

  /// Record a failed fetch, keeping any previous value in place.
  pub fn store_failure(&self, key: &QueryKey, error: ApiError) {
    let mut entries = self.lock();
    let entry = entries
      .entry(key.cache_hash())
      .or_insert_with(|| CacheEntry::empty(key.clone()));
    entry.error = Some(error);
  }

  /// Mark every entry under a resource-path prefix stale.
  ///
  /// Returns the number of entries affected.
  pub fn invalidate_prefix(&self, prefix: &str) -> usize {
    let mut entries = self.lock();
    let mut count = 0;
    for entry in entries.values_mut() {
      if entry.key.matches_prefix(prefix) && !entry.stale {
        entry.stale = true;
        count += 1;
      }
    }
    count
  }

  /// Drop every entry (logout / auth reset).
  pub fn clear(&self) {
    self.lock().clear();
  }

  /// Number of cached entries, for diagnostics.
  pub fn len(&self) -> usize {
    self.lock().len()
  }

  pub fn is_empty(&self) -> bool {
    self.lock().is_empty()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn minutes(n: i64) -> Duration {
    Duration::minutes(n)
  }

  #[test]
  fn test_store_and_read_fresh_value() {
    let store = CacheStore::new();
    let key = QueryKey::with_params("/budgets/", vec![("month_year", "2025-01")]);

    assert_eq!(store.fresh_value(&key, minutes(5)), None);
    store.store_success(&key, json!([{"id": 1}]));
    assert_eq!(store.fresh_value(&key, minutes(5)), Some(json!([{"id": 1}])));
  }

  #[test]
  fn test_invalidated_entry_is_not_fresh() {
    let store = CacheStore::new();
    let key = QueryKey::new("/budgets/");
    store.store_success(&key, json!([]));

    let touched = store.invalidate_prefix("/budgets/");
    assert_eq!(touched, 1);
    assert_eq!(store.fresh_value(&key, minutes(5)), None);

    // The value itself survives invalidation.
    let entry = store.entry(&key).unwrap();
    assert_eq!(entry.value, Some(json!([])));
    assert!(entry.stale);
  }

  #[test]
  fn test_prefix_invalidation_spares_other_resources() {
    let store = CacheStore::new();
    let budgets = QueryKey::with_params("/budgets/", vec![("month_year", "2025-01")]);
    let budget_item = QueryKey::new("/budgets/7");
    let categories = QueryKey::new("/categories/");

    store.store_success(&budgets, json!([]));
    store.store_success(&budget_item, json!({"id": 7}));
    store.store_success(&categories, json!([]));

    store.invalidate_prefix("/budgets/");
    assert_eq!(store.fresh_value(&budgets, minutes(5)), None);
    assert_eq!(store.fresh_value(&budget_item, minutes(5)), None);
    assert!(store.fresh_value(&categories, minutes(5)).is_some());
  }

  #[test]
  fn test_failure_keeps_previous_value() {
    let store = CacheStore::new();
    let key = QueryKey::new("/transactions/");
    store.store_success(&key, json!([{"id": 1}]));
    store.invalidate_prefix("/transactions/");

    store.store_failure(&key, ApiError::Network("offline".into()));

    let entry = store.entry(&key).unwrap();
    assert_eq!(entry.value, Some(json!([{"id": 1}])));
    assert!(matches!(entry.error, Some(ApiError::Network(_))));
  }

  #[test]
  fn test_success_resets_stale_and_error() {
    let store = CacheStore::new();
    let key = QueryKey::new("/transactions/");
    store.store_success(&key, json!([]));
    store.invalidate_prefix("/transactions/");
    store.store_failure(&key, ApiError::Network("offline".into()));

    store.store_success(&key, json!([{"id": 2}]));
    let entry = store.entry(&key).unwrap();
    assert!(!entry.stale);
    assert!(entry.error.is_none());
    assert_eq!(store.fresh_value(&key, minutes(5)), Some(json!([{"id": 2}])));
  }

  #[test]
  fn test_expired_entry_is_not_fresh() {
    let store = CacheStore::new();
    let key = QueryKey::new("/categories/");
    store.store_success(&key, json!([]));

    // Zero stale-time expires entries immediately.
    assert_eq!(store.fresh_value(&key, Duration::zero()), None);
  }

  #[test]
  fn test_clear_drops_everything() {
    let store = CacheStore::new();
    store.store_success(&QueryKey::new("/budgets/"), json!([]));
    store.store_success(&QueryKey::new("/categories/"), json!([]));

    store.clear();
    assert!(store.is_empty());
  }
}
