//! Read-only aggregate reports derived from transactions.

use serde::de::DeserializeOwned;
use std::sync::Arc;

use crate::cancel::CancelToken;
use crate::error::ApiError;
use crate::query::{QueryClient, QueryKey};
use crate::transport::{RequestSpec, Transport};

use super::types::{ByCategoryReport, FlowType, Granularity, IncomeExpenseReport, ReportRange, TrendReport};

const INCOME_EXPENSE_PATH: &str = "/reports/income-expense";
const BY_CATEGORY_PATH: &str = "/reports/by-category";
const TREND_PATH: &str = "/reports/trend";

#[derive(Clone)]
pub struct Reports {
  transport: Arc<dyn Transport>,
  queries: QueryClient,
}

impl Reports {
  pub fn new(transport: Arc<dyn Transport>, queries: QueryClient) -> Self {
    Self { transport, queries }
  }

  /// Income vs. expense per period over the given range.
  pub async fn income_expense(
    &self,
    range: &ReportRange,
    cancel: &CancelToken,
  ) -> Result<IncomeExpenseReport, ApiError> {
    self
      .cached_get(INCOME_EXPENSE_PATH, range.to_query(), cancel)
      .await
  }

  /// Totals grouped by category, optionally restricted to one flow type.
  pub async fn by_category(
    &self,
    range: &ReportRange,
    kind: Option<FlowType>,
    cancel: &CancelToken,
  ) -> Result<ByCategoryReport, ApiError> {
    let mut query = range.to_query();
    if let Some(kind) = kind {
      query.push(("type".into(), kind.as_str().into()));
    }
    self.cached_get(BY_CATEGORY_PATH, query, cancel).await
  }

  /// Transaction totals per period at the given granularity.
  pub async fn trend(
    &self,
    range: &ReportRange,
    granularity: Granularity,
    cancel: &CancelToken,
  ) -> Result<TrendReport, ApiError> {
    let mut query = range.to_query();
    query.push(("granularity".into(), granularity.as_str().into()));
    self.cached_get(TREND_PATH, query, cancel).await
  }

  async fn cached_get<T: DeserializeOwned>(
    &self,
    path: &'static str,
    query: Vec<(String, String)>,
    cancel: &CancelToken,
  ) -> Result<T, ApiError> {
    let key = QueryKey::with_params(path, query.clone());
    let transport = self.transport.clone();
    self
      .queries
      .fetch(&key, cancel, move |abort| {
        transport.send(RequestSpec::get_with_query(path, query.clone()), abort)
      })
      .await
  }
}
