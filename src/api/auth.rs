//! Authentication: login, registration, current user, logout.

use std::sync::Arc;

use crate::cancel::CancelToken;
use crate::error::ApiError;
use crate::query::{QueryClient, QueryKey};
use crate::session::Session;
use crate::transport::{RequestSpec, Transport};

use super::types::{LoginData, TokenPair, UserCreate, UserRead};

const LOGIN_PATH: &str = "/auth/login";
const REGISTER_PATH: &str = "/auth/register";
const CURRENT_USER_PATH: &str = "/users/me";

#[derive(Clone)]
pub struct Auth {
  transport: Arc<dyn Transport>,
  queries: QueryClient,
  session: Session,
}

impl Auth {
  pub fn new(transport: Arc<dyn Transport>, queries: QueryClient, session: Session) -> Self {
    Self {
      transport,
      queries,
      session,
    }
  }

  /// Exchange credentials for a token pair and persist it in the session.
  ///
  /// The next transport call picks the new access token up through its
  /// per-call session read.
  pub async fn login(
    &self,
    credentials: &LoginData,
    cancel: &CancelToken,
  ) -> Result<TokenPair, ApiError> {
    let body = serde_json::to_value(credentials).map_err(|e| ApiError::Decode(e.to_string()))?;
    let value = self
      .transport
      .send(RequestSpec::post(LOGIN_PATH, body), cancel.clone())
      .await?;

    let tokens: TokenPair =
      serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))?;
    self
      .session
      .set_tokens(&tokens.access_token, &tokens.refresh_token)?;

    Ok(tokens)
  }

  /// Create an account. Does not log the new user in.
  pub async fn register(
    &self,
    payload: &UserCreate,
    cancel: &CancelToken,
  ) -> Result<UserRead, ApiError> {
    let body = serde_json::to_value(payload).map_err(|e| ApiError::Decode(e.to_string()))?;
    let value = self
      .transport
      .send(RequestSpec::post(REGISTER_PATH, body), cancel.clone())
      .await?;

    serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
  }

  /// Currently authenticated user, cached under `/users/me`.
  ///
  /// Issued without retries: an expired token should fail fast and route the
  /// caller to login rather than hammer the server.
  pub async fn current_user(&self, cancel: &CancelToken) -> Result<UserRead, ApiError> {
    let key = QueryKey::new(CURRENT_USER_PATH);
    let transport = self.transport.clone();
    self
      .queries
      .clone()
      .with_retry(0)
      .fetch(&key, cancel, move |abort| {
        transport.send(RequestSpec::get(CURRENT_USER_PATH), abort)
      })
      .await
  }

  /// Clear both stored tokens and reset the entire query cache.
  ///
  /// Subsequent reads are unauthenticated until the next login, so no cached
  /// entry may survive.
  pub fn logout(&self) -> Result<(), ApiError> {
    self.session.clear()?;
    self.queries.clear();
    Ok(())
  }
}
