//! Deterministic cache keys for server queries.

use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Cache key for a query: resource path plus its query parameters.
///
/// Parameters are held in a `BTreeMap`, so two keys built from the same
/// entries in different insertion order compare equal. Item lookups embed the
/// resolved id in the path, so distinct ids never collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
  path: String,
  params: BTreeMap<String, String>,
}

impl QueryKey {
  /// Key for a parameterless query (e.g. an item path or a bare list).
  pub fn new(path: impl Into<String>) -> Self {
    Self {
      path: path.into(),
      params: BTreeMap::new(),
    }
  }

  /// Key for a parameterised query.
  pub fn with_params<I, K, V>(path: impl Into<String>, params: I) -> Self
  where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
  {
    Self {
      path: path.into(),
      params: params
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect(),
    }
  }

  /// Resource path component of the key.
  pub fn path(&self) -> &str {
    &self.path
  }

  /// Sorted query parameters.
  pub fn params(&self) -> &BTreeMap<String, String> {
    &self.params
  }

  /// Whether this key belongs to the resource family rooted at `prefix`.
  pub fn matches_prefix(&self, prefix: &str) -> bool {
    self.path.starts_with(prefix)
  }

  /// Stable fixed-length hash of the canonical key form.
  ///
  /// Used as the index into the cache store and the in-flight table.
  pub fn cache_hash(&self) -> String {
    let mut input = self.path.clone();
    for (k, v) in &self.params {
      input.push('&');
      input.push_str(k);
      input.push('=');
      input.push_str(v);
    }

    // SHA256 hash for stable, fixed-length keys
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
  }
}

impl std::fmt::Display for QueryKey {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.path)?;
    for (i, (k, v)) in self.params.iter().enumerate() {
      let sep = if i == 0 { '?' } else { '&' };
      write!(f, "{}{}={}", sep, k, v)?;
    }
    Ok(())
  }
}
