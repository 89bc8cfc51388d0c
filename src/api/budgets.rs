//! Budgets resource: monthly spending limits per category.

use std::sync::Arc;

use crate::cancel::CancelToken;
use crate::error::ApiError;
use crate::query::{MutationRecord, QueryClient, QueryKey};
use crate::transport::Transport;

use super::resource::{Operations, ResourceClient, ResourceDescriptor};
use super::types::{BudgetCreate, BudgetListParams, BudgetRead, BudgetUpdate};

pub const BUDGETS: ResourceDescriptor =
  ResourceDescriptor::new("budgets", "/budgets/", Operations::CRUD);

// Budget mutations also touch categories: the budget form can create a
// category inline.
const INVALIDATES: [&str; 2] = ["/budgets/", "/categories/"];

#[derive(Clone)]
pub struct Budgets {
  resource: ResourceClient,
  queries: QueryClient,
}

impl Budgets {
  pub fn new(transport: Arc<dyn Transport>, queries: QueryClient) -> Self {
    Self {
      resource: ResourceClient::new(transport, BUDGETS),
      queries,
    }
  }

  /// List budgets, cached under the collection path + filter parameters.
  pub async fn list(
    &self,
    params: &BudgetListParams,
    cancel: &CancelToken,
  ) -> Result<Vec<BudgetRead>, ApiError> {
    let query = params.to_query();
    let key = QueryKey::with_params(BUDGETS.path, query.clone());
    let resource = self.resource.clone();
    self
      .queries
      .fetch(&key, cancel, move |abort| resource.list(query.clone(), abort))
      .await
  }

  /// Fetch one budget, cached under its item path.
  pub async fn get(&self, id: i64, cancel: &CancelToken) -> Result<BudgetRead, ApiError> {
    let key = QueryKey::new(BUDGETS.item_path(id));
    let resource = self.resource.clone();
    self
      .queries
      .fetch(&key, cancel, move |abort| resource.get(id, abort))
      .await
  }

  /// Create a budget; invalidates budget and category caches on success.
  pub async fn create(
    &self,
    payload: &BudgetCreate,
    cancel: &CancelToken,
  ) -> Result<BudgetRead, ApiError> {
    let body = serde_json::to_value(payload).map_err(|e| ApiError::Decode(e.to_string()))?;
    let resource = self.resource.clone();
    self
      .queries
      .mutate(MutationRecord::new(INVALIDATES), cancel, move |abort| {
        resource.create(body, abort)
      })
      .await
  }

  /// Update a budget; invalidates budget and category caches on success.
  pub async fn update(
    &self,
    id: i64,
    payload: &BudgetUpdate,
    cancel: &CancelToken,
  ) -> Result<BudgetRead, ApiError> {
    let body = serde_json::to_value(payload).map_err(|e| ApiError::Decode(e.to_string()))?;
    let resource = self.resource.clone();
    self
      .queries
      .mutate(MutationRecord::new(INVALIDATES), cancel, move |abort| {
        resource.update(id, body, abort)
      })
      .await
  }

  /// Delete a budget. A missing budget surfaces as [`ApiError::NotFound`].
  pub async fn delete(&self, id: i64, cancel: &CancelToken) -> Result<(), ApiError> {
    let resource = self.resource.clone();
    self
      .queries
      .mutate(MutationRecord::new(INVALIDATES), cancel, move |abort| {
        resource.delete(id, abort)
      })
      .await
  }
}
