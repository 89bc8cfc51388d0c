//! HTTP transport: turns a [`RequestSpec`] into a completed exchange.
//!
//! The transport resolves `base_url + path`, attaches the bearer token read
//! through [`Session`] on every call, serializes JSON bodies, and maps every
//! response to the unified [`ApiError`] shape. Cancellation is cooperative:
//! the future races the request against the caller's [`CancelToken`].

use futures::future::BoxFuture;
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;
use url::Url;

use crate::cancel::CancelToken;
use crate::config::Config;
use crate::error::{ApiError, FieldError};
use crate::session::Session;

/// HTTP methods the resource layer issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
  Get,
  Post,
  Put,
  Delete,
}

impl Method {
  fn to_reqwest(self) -> reqwest::Method {
    match self {
      Self::Get => reqwest::Method::GET,
      Self::Post => reqwest::Method::POST,
      Self::Put => reqwest::Method::PUT,
      Self::Delete => reqwest::Method::DELETE,
    }
  }
}

impl std::fmt::Display for Method {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let name = match self {
      Self::Get => "GET",
      Self::Post => "POST",
      Self::Put => "PUT",
      Self::Delete => "DELETE",
    };
    write!(f, "{}", name)
  }
}

/// One concrete HTTP call. Immutable once constructed; retries build a new
/// spec from the same inputs rather than mutating this one.
#[derive(Debug, Clone)]
pub struct RequestSpec {
  method: Method,
  path: String,
  query: Vec<(String, String)>,
  body: Option<Value>,
}

impl RequestSpec {
  pub fn get(path: impl Into<String>) -> Self {
    Self {
      method: Method::Get,
      path: path.into(),
      query: Vec::new(),
      body: None,
    }
  }

  pub fn get_with_query(path: impl Into<String>, query: Vec<(String, String)>) -> Self {
    Self {
      method: Method::Get,
      path: path.into(),
      query,
      body: None,
    }
  }

  pub fn post(path: impl Into<String>, body: Value) -> Self {
    Self {
      method: Method::Post,
      path: path.into(),
      query: Vec::new(),
      body: Some(body),
    }
  }

  pub fn put(path: impl Into<String>, body: Value) -> Self {
    Self {
      method: Method::Put,
      path: path.into(),
      query: Vec::new(),
      body: Some(body),
    }
  }

  pub fn delete(path: impl Into<String>) -> Self {
    Self {
      method: Method::Delete,
      path: path.into(),
      query: Vec::new(),
      body: None,
    }
  }

  pub fn method(&self) -> Method {
    self.method
  }

  pub fn path(&self) -> &str {
    &self.path
  }

  pub fn query(&self) -> &[(String, String)] {
    &self.query
  }

  pub fn body(&self) -> Option<&Value> {
    self.body.as_ref()
  }
}

/// Result future of a transport call.
pub type TransportFuture = BoxFuture<'static, Result<Value, ApiError>>;

/// Trait for issuing HTTP exchanges.
///
/// The resource layer holds an `Arc<dyn Transport>`, so tests can substitute
/// fakes without touching the network.
pub trait Transport: Send + Sync {
  /// Issue the call described by `spec`, aborting if `cancel` fires first.
  fn send(&self, spec: RequestSpec, cancel: CancelToken) -> TransportFuture;
}

/// Transport implementation backed by `reqwest`.
#[derive(Clone)]
pub struct HttpTransport {
  http: reqwest::Client,
  base_url: Url,
  session: Session,
}

impl HttpTransport {
  /// Build the transport once at startup; pass it by reference afterwards.
  pub fn new(config: &Config, session: Session) -> Result<Self, ApiError> {
    let http = reqwest::Client::builder()
      .timeout(Duration::from_secs(config.api.timeout_secs))
      .build()
      .map_err(|e| ApiError::Network(format!("failed to build http client: {}", e)))?;

    let base_url = Url::parse(&config.api.base_url)
      .map_err(|e| ApiError::Network(format!("invalid base_url: {}", e)))?;

    Ok(Self {
      http,
      base_url,
      session,
    })
  }

  /// Session this transport reads credentials from.
  pub fn session(&self) -> &Session {
    &self.session
  }

  /// Resolve the full URL as `base_url + path`, appending query parameters.
  fn resolve_url(&self, spec: &RequestSpec) -> Result<Url, ApiError> {
    let joined = format!(
      "{}{}",
      self.base_url.as_str().trim_end_matches('/'),
      spec.path()
    );
    let mut url =
      Url::parse(&joined).map_err(|e| ApiError::Network(format!("invalid url {}: {}", joined, e)))?;

    if !spec.query().is_empty() {
      url
        .query_pairs_mut()
        .extend_pairs(spec.query().iter().map(|(k, v)| (k.as_str(), v.as_str())));
    }

    Ok(url)
  }

  async fn dispatch(&self, spec: &RequestSpec) -> Result<Value, ApiError> {
    let url = self.resolve_url(spec)?;
    tracing::debug!(method = %spec.method(), url = %url, "dispatching request");

    let mut request = self.http.request(spec.method().to_reqwest(), url.clone());

    // Read-through on every call: a cleared token is observed immediately.
    if let Some(token) = self.session.access_token()? {
      if !token.is_empty() {
        request = request.bearer_auth(&token);
      }
    }

    if let Some(body) = spec.body() {
      request = request.json(body);
    }

    let response = request
      .send()
      .await
      .map_err(|e| ApiError::Network(e.to_string()))?;

    let status = response.status();
    if status.is_success() {
      if status == StatusCode::NO_CONTENT {
        return Ok(Value::Null);
      }
      let bytes = response
        .bytes()
        .await
        .map_err(|e| ApiError::Network(e.to_string()))?;
      if bytes.is_empty() {
        return Ok(Value::Null);
      }
      serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))
    } else {
      let body = response.text().await.unwrap_or_default();
      tracing::warn!(status = status.as_u16(), url = %url, "request failed");
      Err(self.classify_failure(status.as_u16(), body))
    }
  }

  /// Map a non-2xx response to the error taxonomy.
  ///
  /// Detecting a 401 clears the session before the error propagates, so the
  /// next call goes out unauthenticated.
  fn classify_failure(&self, status: u16, body: String) -> ApiError {
    match status {
      401 => {
        if let Err(e) = self.session.clear() {
          tracing::warn!(error = %e, "failed to clear session after 401");
        }
        ApiError::Auth {
          message: detail_message(&body),
        }
      }
      404 => ApiError::NotFound(detail_message(&body)),
      422 => match parse_validation_detail(&body) {
        Some(detail) => ApiError::Validation { detail },
        None => ApiError::Http {
          status,
          message: body,
        },
      },
      _ => ApiError::Http {
        status,
        message: detail_message(&body),
      },
    }
  }
}

impl Transport for HttpTransport {
  fn send(&self, spec: RequestSpec, cancel: CancelToken) -> TransportFuture {
    let this = self.clone();
    Box::pin(async move {
      tokio::select! {
        _ = cancel.cancelled() => Err(ApiError::Cancelled),
        result = this.dispatch(&spec) => result,
      }
    })
  }
}

/// Pull a human-readable message out of an error body, tolerating both
/// `{"detail": "..."}` objects and plain text.
fn detail_message(body: &str) -> String {
  if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
    if let Some(Value::String(detail)) = map.get("detail") {
      return detail.clone();
    }
  }
  body.to_string()
}

/// Parse a 422 body's `detail` array, preserving it unchanged for callers.
fn parse_validation_detail(body: &str) -> Option<Vec<FieldError>> {
  #[derive(serde::Deserialize)]
  struct ValidationBody {
    detail: Vec<FieldError>,
  }

  serde_json::from_str::<ValidationBody>(body)
    .ok()
    .map(|b| b.detail)
}
