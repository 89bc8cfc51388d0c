//! Session state: the bearer token pair and its durable storage.
//!
//! The session is the single source of truth for the current access token.
//! Transport reads it through [`Session::access_token`] on every call, so a
//! cleared token is observed immediately by the next request.

use rusqlite::{params, Connection};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::error::ApiError;

/// Durable key under which the access token is stored.
pub const ACCESS_TOKEN_KEY: &str = "access_token";
/// Durable key under which the refresh token is stored.
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";

/// Trait for durable key-value token storage backends.
pub trait TokenStorage: Send + Sync {
  /// Get a stored value by key.
  fn get(&self, key: &str) -> Result<Option<String>, ApiError>;

  /// Store a value durably under a key.
  fn set(&self, key: &str, value: &str) -> Result<(), ApiError>;

  /// Remove a stored value.
  fn remove(&self, key: &str) -> Result<(), ApiError>;
}

/// In-memory storage for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryTokenStore {
  values: Mutex<HashMap<String, String>>,
}

impl MemoryTokenStore {
  pub fn new() -> Self {
    Self::default()
  }
}

impl TokenStorage for MemoryTokenStore {
  fn get(&self, key: &str) -> Result<Option<String>, ApiError> {
    let values = self
      .values
      .lock()
      .map_err(|e| ApiError::Storage(format!("lock poisoned: {}", e)))?;
    Ok(values.get(key).cloned())
  }

  fn set(&self, key: &str, value: &str) -> Result<(), ApiError> {
    let mut values = self
      .values
      .lock()
      .map_err(|e| ApiError::Storage(format!("lock poisoned: {}", e)))?;
    values.insert(key.to_string(), value.to_string());
    Ok(())
  }

  fn remove(&self, key: &str) -> Result<(), ApiError> {
    let mut values = self
      .values
      .lock()
      .map_err(|e| ApiError::Storage(format!("lock poisoned: {}", e)))?;
    values.remove(key);
    Ok(())
  }
}

/// SQLite-backed token storage.
pub struct SqliteTokenStore {
  conn: Mutex<Connection>,
}

/// Schema for the token table.
const TOKEN_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS tokens (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;

impl SqliteTokenStore {
  /// Open or create the token database at the default location.
  pub fn open() -> Result<Self, ApiError> {
    let path = Self::default_path()?;

    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)
        .map_err(|e| ApiError::Storage(format!("failed to create data directory: {}", e)))?;
    }

    let conn = Connection::open(&path).map_err(|e| {
      ApiError::Storage(format!("failed to open token store at {}: {}", path.display(), e))
    })?;

    Self::from_connection(conn)
  }

  /// Build a store around an existing connection (in-memory in tests).
  pub fn from_connection(conn: Connection) -> Result<Self, ApiError> {
    conn
      .execute_batch(TOKEN_SCHEMA)
      .map_err(|e| ApiError::Storage(format!("failed to run token migrations: {}", e)))?;

    Ok(Self {
      conn: Mutex::new(conn),
    })
  }

  /// Get the default database path.
  fn default_path() -> Result<PathBuf, ApiError> {
    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or_else(|| ApiError::Storage("could not determine data directory".into()))?;

    Ok(data_dir.join("bursar").join("tokens.db"))
  }

  fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, ApiError> {
    self
      .conn
      .lock()
      .map_err(|e| ApiError::Storage(format!("lock poisoned: {}", e)))
  }
}

impl TokenStorage for SqliteTokenStore {
  fn get(&self, key: &str) -> Result<Option<String>, ApiError> {
    let conn = self.lock()?;
    let mut stmt = conn
      .prepare("SELECT value FROM tokens WHERE key = ?")
      .map_err(|e| ApiError::Storage(format!("failed to prepare query: {}", e)))?;

    let value: Option<String> = stmt.query_row(params![key], |row| row.get(0)).ok();
    Ok(value)
  }

  fn set(&self, key: &str, value: &str) -> Result<(), ApiError> {
    let conn = self.lock()?;
    conn
      .execute(
        "INSERT OR REPLACE INTO tokens (key, value) VALUES (?, ?)",
        params![key, value],
      )
      .map_err(|e| ApiError::Storage(format!("failed to store token: {}", e)))?;
    Ok(())
  }

  fn remove(&self, key: &str) -> Result<(), ApiError> {
    let conn = self.lock()?;
    conn
      .execute("DELETE FROM tokens WHERE key = ?", params![key])
      .map_err(|e| ApiError::Storage(format!("failed to remove token: {}", e)))?;
    Ok(())
  }
}

/// Handle to the current authentication state.
///
/// Cloning is cheap; every clone shares the same backing storage.
#[derive(Clone)]
pub struct Session {
  storage: Arc<dyn TokenStorage>,
}

impl Session {
  pub fn new(storage: Arc<dyn TokenStorage>) -> Self {
    Self { storage }
  }

  /// Session backed by the default on-disk store.
  pub fn open_default() -> Result<Self, ApiError> {
    Ok(Self::new(Arc::new(SqliteTokenStore::open()?)))
  }

  /// Current access token, read through to storage on every call.
  pub fn access_token(&self) -> Result<Option<String>, ApiError> {
    self.storage.get(ACCESS_TOKEN_KEY)
  }

  /// Current refresh token.
  pub fn refresh_token(&self) -> Result<Option<String>, ApiError> {
    self.storage.get(REFRESH_TOKEN_KEY)
  }

  /// Persist a freshly issued token pair.
  pub fn set_tokens(&self, access: &str, refresh: &str) -> Result<(), ApiError> {
    self.storage.set(ACCESS_TOKEN_KEY, access)?;
    self.storage.set(REFRESH_TOKEN_KEY, refresh)
  }

  /// Remove both tokens; subsequent transport calls go out unauthenticated.
  pub fn clear(&self) -> Result<(), ApiError> {
    self.storage.remove(ACCESS_TOKEN_KEY)?;
    self.storage.remove(REFRESH_TOKEN_KEY)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn memory_session() -> Session {
    Session::new(Arc::new(MemoryTokenStore::new()))
  }

  #[test]
  fn test_set_and_read_tokens() {
    let session = memory_session();
    assert_eq!(session.access_token().unwrap(), None);

    session.set_tokens("acc-123", "ref-456").unwrap();
    assert_eq!(session.access_token().unwrap(), Some("acc-123".into()));
    assert_eq!(session.refresh_token().unwrap(), Some("ref-456".into()));
  }

  #[test]
  fn test_clear_removes_both_tokens() {
    let session = memory_session();
    session.set_tokens("acc", "ref").unwrap();

    session.clear().unwrap();
    assert_eq!(session.access_token().unwrap(), None);
    assert_eq!(session.refresh_token().unwrap(), None);
  }

  #[test]
  fn test_clones_share_storage() {
    let session = memory_session();
    let clone = session.clone();

    session.set_tokens("acc", "ref").unwrap();
    assert_eq!(clone.access_token().unwrap(), Some("acc".into()));

    clone.clear().unwrap();
    assert_eq!(session.access_token().unwrap(), None);
  }

  #[test]
  fn test_sqlite_store_roundtrip() {
    let conn = Connection::open_in_memory().unwrap();
    let store = SqliteTokenStore::from_connection(conn).unwrap();

    assert_eq!(store.get(ACCESS_TOKEN_KEY).unwrap(), None);
    store.set(ACCESS_TOKEN_KEY, "tok").unwrap();
    assert_eq!(store.get(ACCESS_TOKEN_KEY).unwrap(), Some("tok".into()));

    store.set(ACCESS_TOKEN_KEY, "tok2").unwrap();
    assert_eq!(store.get(ACCESS_TOKEN_KEY).unwrap(), Some("tok2".into()));

    store.remove(ACCESS_TOKEN_KEY).unwrap();
    assert_eq!(store.get(ACCESS_TOKEN_KEY).unwrap(), None);
  }
}
