//! Categories resource.
//!
//! The server exposes no single-item fetch or delete for categories, so this
//! facade has no `get` or `delete` - unsupported operations simply do not
//! exist on the type.

use std::sync::Arc;

use crate::cancel::CancelToken;
use crate::error::ApiError;
use crate::query::{MutationRecord, QueryClient, QueryKey};
use crate::transport::Transport;

use super::resource::{Operations, ResourceClient, ResourceDescriptor};
use super::types::{CategoryCreate, CategoryRead, CategoryUpdate};

pub const CATEGORIES: ResourceDescriptor = ResourceDescriptor::new(
  "categories",
  "/categories/",
  Operations::new(true, true, false, true, false),
);

const INVALIDATES: [&str; 1] = ["/categories/"];

#[derive(Clone)]
pub struct Categories {
  resource: ResourceClient,
  queries: QueryClient,
}

impl Categories {
  pub fn new(transport: Arc<dyn Transport>, queries: QueryClient) -> Self {
    Self {
      resource: ResourceClient::new(transport, CATEGORIES),
      queries,
    }
  }

  /// List all categories for the current user.
  pub async fn list(&self, cancel: &CancelToken) -> Result<Vec<CategoryRead>, ApiError> {
    let key = QueryKey::new(CATEGORIES.path);
    let resource = self.resource.clone();
    self
      .queries
      .fetch(&key, cancel, move |abort| resource.list(Vec::new(), abort))
      .await
  }

  /// Create a category.
  pub async fn create(
    &self,
    payload: &CategoryCreate,
    cancel: &CancelToken,
  ) -> Result<CategoryRead, ApiError> {
    let body = serde_json::to_value(payload).map_err(|e| ApiError::Decode(e.to_string()))?;
    let resource = self.resource.clone();
    self
      .queries
      .mutate(MutationRecord::new(INVALIDATES), cancel, move |abort| {
        resource.create(body, abort)
      })
      .await
  }

  /// Rename or retype a category.
  pub async fn update(
    &self,
    id: i64,
    payload: &CategoryUpdate,
    cancel: &CancelToken,
  ) -> Result<CategoryRead, ApiError> {
    let body = serde_json::to_value(payload).map_err(|e| ApiError::Decode(e.to_string()))?;
    let resource = self.resource.clone();
    self
      .queries
      .mutate(MutationRecord::new(INVALIDATES), cancel, move |abort| {
        resource.update(id, body, abort)
      })
      .await
  }
}
