//! Error taxonomy for API calls.
//!
//! Every failure a caller can observe is an [`ApiError`] variant. The enum is
//! `Clone` so a single de-duplicated failure can be delivered to every
//! subscriber waiting on the same in-flight request.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for transport, resource, and cache operations.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
  /// The call was aborted by its caller. Never a user-visible failure.
  #[error("request cancelled")]
  Cancelled,

  /// No response was received (offline, DNS failure, timeout).
  #[error("network error: {0}")]
  Network(String),

  /// The server rejected the credentials (401).
  #[error("authentication failed: {message}")]
  Auth { message: String },

  /// The server reported the resource as absent (404).
  #[error("not found: {0}")]
  NotFound(String),

  /// The server rejected the payload (422) with field-level detail.
  #[error("validation failed ({} field error(s))", .detail.len())]
  Validation { detail: Vec<FieldError> },

  /// Any other non-2xx response.
  #[error("server returned {status}: {message}")]
  Http { status: u16, message: String },

  /// The response body did not match the expected shape.
  #[error("failed to decode response: {0}")]
  Decode(String),

  /// Token persistence failed.
  #[error("storage error: {0}")]
  Storage(String),
}

impl ApiError {
  /// HTTP status associated with this error, if it came from a response.
  pub fn status(&self) -> Option<u16> {
    match self {
      Self::Auth { .. } => Some(401),
      Self::NotFound(_) => Some(404),
      Self::Validation { .. } => Some(422),
      Self::Http { status, .. } => Some(*status),
      _ => None,
    }
  }

  /// Whether the orchestration layer may retry this failure.
  pub fn is_retryable(&self) -> bool {
    matches!(self, Self::Network(_))
  }
}

/// One entry of a 422 response's `detail` array: `{ loc, msg, type }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldError {
  pub loc: Vec<LocSegment>,
  pub msg: String,
  #[serde(rename = "type")]
  pub kind: String,
}

/// A `loc` path segment; the server mixes field names and array indices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LocSegment {
  Key(String),
  Index(u64),
}

impl std::fmt::Display for LocSegment {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Key(k) => write!(f, "{}", k),
      Self::Index(i) => write!(f, "{}", i),
    }
  }
}

impl FieldError {
  /// Dotted path to the offending field, e.g. `body.amount`.
  pub fn path(&self) -> String {
    self
      .loc
      .iter()
      .map(|s| s.to_string())
      .collect::<Vec<_>>()
      .join(".")
  }
}
