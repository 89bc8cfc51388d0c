//! Recurring payments resource: scheduled charges (subscriptions, rent).
//!
//! The server exposes create, list, and delete only; there is no single-item
//! fetch or update, so this facade carries neither.

use std::sync::Arc;

use crate::cancel::CancelToken;
use crate::error::ApiError;
use crate::query::{MutationRecord, QueryClient, QueryKey};
use crate::transport::Transport;

use super::resource::{Operations, ResourceClient, ResourceDescriptor};
use super::types::{RecurringPaymentCreate, RecurringPaymentRead};

pub const RECURRING_PAYMENTS: ResourceDescriptor = ResourceDescriptor::new(
  "recurring-payments",
  "/recurring-payments/",
  Operations::new(true, true, false, false, true),
);

// The recurring-payment form can create a category inline.
const INVALIDATES: [&str; 2] = ["/recurring-payments/", "/categories/"];

#[derive(Clone)]
pub struct RecurringPayments {
  resource: ResourceClient,
  queries: QueryClient,
}

impl RecurringPayments {
  pub fn new(transport: Arc<dyn Transport>, queries: QueryClient) -> Self {
    Self {
      resource: ResourceClient::new(transport, RECURRING_PAYMENTS),
      queries,
    }
  }

  /// List scheduled payments.
  pub async fn list(&self, cancel: &CancelToken) -> Result<Vec<RecurringPaymentRead>, ApiError> {
    let key = QueryKey::new(RECURRING_PAYMENTS.path);
    let resource = self.resource.clone();
    self
      .queries
      .fetch(&key, cancel, move |abort| resource.list(Vec::new(), abort))
      .await
  }

  /// Schedule a payment.
  pub async fn create(
    &self,
    payload: &RecurringPaymentCreate,
    cancel: &CancelToken,
  ) -> Result<RecurringPaymentRead, ApiError> {
    let body = serde_json::to_value(payload).map_err(|e| ApiError::Decode(e.to_string()))?;
    let resource = self.resource.clone();
    self
      .queries
      .mutate(MutationRecord::new(INVALIDATES), cancel, move |abort| {
        resource.create(body, abort)
      })
      .await
  }

  /// Cancel a scheduled payment.
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
