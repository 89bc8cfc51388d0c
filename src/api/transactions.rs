//! Transactions resource: individual income and expense movements.

use std::sync::Arc;

use crate::cancel::CancelToken;
use crate::error::ApiError;
use crate::query::{MutationRecord, QueryClient, QueryKey};
use crate::transport::Transport;

use super::resource::{Operations, ResourceClient, ResourceDescriptor};
use super::types::{TransactionCreate, TransactionListParams, TransactionRead, TransactionUpdate};

pub const TRANSACTIONS: ResourceDescriptor =
  ResourceDescriptor::new("transactions", "/transactions/", Operations::CRUD);

// Every report aggregates transactions, so transaction writes stale them too.
const INVALIDATES: [&str; 2] = ["/transactions/", "/reports/"];

#[derive(Clone)]
pub struct Transactions {
  resource: ResourceClient,
  queries: QueryClient,
}

impl Transactions {
  pub fn new(transport: Arc<dyn Transport>, queries: QueryClient) -> Self {
    Self {
      resource: ResourceClient::new(transport, TRANSACTIONS),
      queries,
    }
  }

  /// List transactions. Pagination and filter parameters pass through to the
  /// server uninterpreted, and the server's ordering is preserved.
  pub async fn list(
    &self,
    params: &TransactionListParams,
    cancel: &CancelToken,
  ) -> Result<Vec<TransactionRead>, ApiError> {
    let query = params.to_query();
    let key = QueryKey::with_params(TRANSACTIONS.path, query.clone());
    let resource = self.resource.clone();
    self
      .queries
      .fetch(&key, cancel, move |abort| resource.list(query.clone(), abort))
      .await
  }

  /// Fetch one transaction, cached under its item path.
  pub async fn get(&self, id: i64, cancel: &CancelToken) -> Result<TransactionRead, ApiError> {
    let key = QueryKey::new(TRANSACTIONS.item_path(id));
    let resource = self.resource.clone();
    self
      .queries
      .fetch(&key, cancel, move |abort| resource.get(id, abort))
      .await
  }

  /// Record a transaction; staleness cascades to reports.
  pub async fn create(
    &self,
    payload: &TransactionCreate,
    cancel: &CancelToken,
  ) -> Result<TransactionRead, ApiError> {
    let body = serde_json::to_value(payload).map_err(|e| ApiError::Decode(e.to_string()))?;
    let resource = self.resource.clone();
    self
      .queries
      .mutate(MutationRecord::new(INVALIDATES), cancel, move |abort| {
        resource.create(body, abort)
      })
      .await
  }

  /// Update a transaction.
  pub async fn update(
    &self,
    id: i64,
    payload: &TransactionUpdate,
    cancel: &CancelToken,
  ) -> Result<TransactionRead, ApiError> {
    let body = serde_json::to_value(payload).map_err(|e| ApiError::Decode(e.to_string()))?;
    let resource = self.resource.clone();
    self
      .queries
      .mutate(MutationRecord::new(INVALIDATES), cancel, move |abort| {
        resource.update(id, body, abort)
      })
      .await
  }

  /// Delete a transaction. A missing id surfaces as [`ApiError::NotFound`].
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
