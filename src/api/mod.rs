//! Typed resource facades over the transport and query layers.
//!
//! [`ApiClient`] is constructed once at process start; every facade shares
//! the same transport, query cache, and session by reference.

mod auth;
mod budgets;
mod categories;
mod recurring_payments;
mod reports;
mod resource;
mod transactions;
pub mod types;

pub use auth::Auth;
pub use budgets::{Budgets, BUDGETS};
pub use categories::{Categories, CATEGORIES};
pub use recurring_payments::{RecurringPayments, RECURRING_PAYMENTS};
pub use reports::Reports;
pub use resource::{Operations, ResourceClient, ResourceDescriptor};
pub use transactions::{Transactions, TRANSACTIONS};

use std::sync::Arc;

use crate::config::Config;
use crate::error::ApiError;
use crate::query::QueryClient;
use crate::session::Session;
use crate::transport::{HttpTransport, Transport};

/// Entry point to the API: one facade per resource, one shared cache.
#[derive(Clone)]
pub struct ApiClient {
  budgets: Budgets,
  transactions: Transactions,
  categories: Categories,
  recurring_payments: RecurringPayments,
  reports: Reports,
  auth: Auth,
  queries: QueryClient,
  session: Session,
}

impl ApiClient {
  /// Build the client against a real HTTP transport.
  pub fn new(config: &Config, session: Session) -> Result<Self, ApiError> {
    let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new(config, session.clone())?);
    Ok(Self::with_transport(transport, session, QueryClient::new()))
  }

  /// Assemble the client from explicit parts; the seam tests use to swap in
  /// fake transports or a custom freshness window.
  pub fn with_transport(
    transport: Arc<dyn Transport>,
    session: Session,
    queries: QueryClient,
  ) -> Self {
    Self {
      budgets: Budgets::new(transport.clone(), queries.clone()),
      transactions: Transactions::new(transport.clone(), queries.clone()),
      categories: Categories::new(transport.clone(), queries.clone()),
      recurring_payments: RecurringPayments::new(transport.clone(), queries.clone()),
      reports: Reports::new(transport.clone(), queries.clone()),
      auth: Auth::new(transport, queries.clone(), session.clone()),
      queries,
      session,
    }
  }

  pub fn budgets(&self) -> &Budgets {
    &self.budgets
  }

  pub fn transactions(&self) -> &Transactions {
    &self.transactions
  }

  pub fn categories(&self) -> &Categories {
    &self.categories
  }

  pub fn recurring_payments(&self) -> &RecurringPayments {
    &self.recurring_payments
  }

  pub fn reports(&self) -> &Reports {
    &self.reports
  }

  pub fn auth(&self) -> &Auth {
    &self.auth
  }

  /// Shared orchestration layer, for explicit invalidation or cache resets.
  pub fn queries(&self) -> &QueryClient {
    &self.queries
  }

  pub fn session(&self) -> &Session {
    &self.session
  }
}
