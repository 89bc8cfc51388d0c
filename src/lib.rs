//! Data-access core for a personal-finance app.
//!
//! Typed REST resource clients (budgets, transactions, categories, recurring
//! payments, reports, auth) composed over three layers:
//!
//! - [`transport`] issues the HTTP calls, attaching the bearer token read
//!   from the [`session`] store on every request
//! - [`query`] caches reads under deterministic keys, collapses concurrent
//!   identical requests into one network call, and invalidates resource
//!   families by path prefix after writes
//! - [`api`] exposes one typed facade per resource with exactly the
//!   operations the server supports
//!
//! # Example
//!
//! ```ignore
//! let session = Session::open_default()?;
//! let client = ApiClient::new(&Config::new("http://192.168.100.2:8000"), session)?;
//!
//! let tokens = client.auth().login(&credentials, &CancelToken::noop()).await?;
//!
//! let params = BudgetListParams { month_year: Some("2025-01".into()) };
//! let budgets = client.budgets().list(&params, &CancelToken::noop()).await?;
//! ```

pub mod api;
pub mod cancel;
pub mod config;
pub mod error;
pub mod query;
pub mod session;
pub mod transport;

pub use api::ApiClient;
pub use cancel::{CancelSource, CancelToken};
pub use config::Config;
pub use error::{ApiError, FieldError, LocSegment};
pub use query::{MutationRecord, QueryClient, QueryKey};
pub use session::{MemoryTokenStore, Session, SqliteTokenStore, TokenStorage};
pub use transport::{HttpTransport, Method, RequestSpec, Transport};
