//! End-to-end flows against a mock HTTP server.

use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use bursar::api::types::{BudgetCreate, BudgetListParams, LoginData};
use bursar::{ApiClient, ApiError, CancelToken, Config, MemoryTokenStore, QueryClient, Session};

fn test_client(server: &MockServer) -> ApiClient {
  let session = Session::new(Arc::new(MemoryTokenStore::new()));
  ApiClient::new(&Config::new(server.uri()), session).unwrap()
}

#[tokio::test]
async fn test_budgets_list_scenario_caches_unmodified_entity() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/budgets/"))
    .and(query_param("month_year", "2025-01"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!([
      {"id": 1, "category_id": 2, "amount": "100.00", "month_year": "2025-01"}
    ])))
    .expect(1)
    .mount(&server)
    .await;

  let client = test_client(&server);
  let params = BudgetListParams {
    month_year: Some("2025-01".into()),
  };

  let budgets = client
    .budgets()
    .list(&params, &CancelToken::noop())
    .await
    .unwrap();
  assert_eq!(budgets.len(), 1);
  assert_eq!(budgets[0].id, 1);
  assert_eq!(budgets[0].category_id, 2);
  assert_eq!(budgets[0].amount, "100.00");
  assert_eq!(budgets[0].month_year, "2025-01");

  // Second read is served from cache; the mock's expect(1) verifies only one
  // network call happened.
  let again = client
    .budgets()
    .list(&params, &CancelToken::noop())
    .await
    .unwrap();
  assert_eq!(again, budgets);
}

#[tokio::test]
async fn test_create_then_list_includes_created_entity_after_invalidation() {
  let server = MockServer::start().await;

  // First list: empty. Consumed once, then the post-create list below matches.
  Mock::given(method("GET"))
    .and(path("/budgets/"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
    .up_to_n_times(1)
    .mount(&server)
    .await;
  Mock::given(method("GET"))
    .and(path("/budgets/"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!([
      {"id": 10, "category_id": 3, "amount": "75.00", "month_year": "2025-03"}
    ])))
    .mount(&server)
    .await;
  Mock::given(method("POST"))
    .and(path("/budgets/"))
    .respond_with(ResponseTemplate::new(200).set_body_json(
      json!({"id": 10, "category_id": 3, "amount": "75.00", "month_year": "2025-03"}),
    ))
    .expect(1)
    .mount(&server)
    .await;

  let client = test_client(&server);
  let params = BudgetListParams::default();

  let before = client
    .budgets()
    .list(&params, &CancelToken::noop())
    .await
    .unwrap();
  assert!(before.is_empty());

  let payload = BudgetCreate {
    category_id: 3,
    amount: 75.0,
    month_year: "2025-03".into(),
    user_id: None,
  };
  let created = client
    .budgets()
    .create(&payload, &CancelToken::noop())
    .await
    .unwrap();
  assert_eq!(created.category_id, 3);
  assert_eq!(created.month_year, "2025-03");

  let after = client
    .budgets()
    .list(&params, &CancelToken::noop())
    .await
    .unwrap();
  assert_eq!(after.len(), 1);
  assert_eq!(after[0].id, created.id);
  assert_eq!(after[0].amount, "75.00");
}

#[tokio::test]
async fn test_delete_forces_fresh_fetch_within_freshness_window() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/budgets/"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!([
      {"id": 4, "category_id": 1, "amount": "20.00", "month_year": "2025-04"}
    ])))
    .expect(2)
    .mount(&server)
    .await;
  Mock::given(method("DELETE"))
    .and(path("/budgets/4"))
    .respond_with(ResponseTemplate::new(204))
    .expect(1)
    .mount(&server)
    .await;

  let client = test_client(&server);
  let params = BudgetListParams::default();

  client
    .budgets()
    .list(&params, &CancelToken::noop())
    .await
    .unwrap();
  client.budgets().delete(4, &CancelToken::noop()).await.unwrap();
  client
    .budgets()
    .list(&params, &CancelToken::noop())
    .await
    .unwrap();
}

#[tokio::test]
async fn test_invalid_budget_payload_surfaces_field_detail() {
  let server = MockServer::start().await;
  Mock::given(method("POST"))
    .and(path("/budgets/"))
    .respond_with(ResponseTemplate::new(422).set_body_json(json!({
      "detail": [
        {"loc": ["body", "amount"], "msg": "Input should be greater than 0", "type": "greater_than"}
      ]
    })))
    .mount(&server)
    .await;

  let client = test_client(&server);
  let payload = BudgetCreate {
    category_id: 3,
    amount: -1.0,
    month_year: "2025-03".into(),
    user_id: None,
  };

  let err = client
    .budgets()
    .create(&payload, &CancelToken::noop())
    .await
    .unwrap_err();
  match err {
    ApiError::Validation { detail } => {
      assert_eq!(detail.len(), 1);
      assert_eq!(detail[0].path(), "body.amount");
      assert_eq!(detail[0].msg, "Input should be greater than 0");
      assert_eq!(detail[0].kind, "greater_than");
    }
    other => panic!("expected validation error, got {:?}", other),
  }
}

#[tokio::test]
async fn test_login_authenticates_subsequent_calls_until_logout() {
  let server = MockServer::start().await;
  Mock::given(method("POST"))
    .and(path("/auth/login"))
    .respond_with(ResponseTemplate::new(200).set_body_json(
      json!({"access_token": "acc-1", "refresh_token": "ref-1", "token_type": "bearer"}),
    ))
    .mount(&server)
    .await;
  // Authenticated variant must be matched while logged in.
  Mock::given(method("GET"))
    .and(path("/users/me"))
    .and(header("authorization", "Bearer acc-1"))
    .respond_with(ResponseTemplate::new(200).set_body_json(
      json!({"id": 1, "email": "ana@example.com", "first_name": "Ana", "last_name": "Pérez"}),
    ))
    .expect(1)
    .mount(&server)
    .await;
  // After logout the same endpoint sees no Authorization header and rejects.
  Mock::given(method("GET"))
    .and(path("/users/me"))
    .respond_with(
      ResponseTemplate::new(401).set_body_json(json!({"detail": "Not authenticated"})),
    )
    .mount(&server)
    .await;

  let client = test_client(&server);
  let credentials = LoginData {
    email: "ana@example.com".into(),
    password: "secret123".into(),
  };

  client
    .auth()
    .login(&credentials, &CancelToken::noop())
    .await
    .unwrap();
  let user = client
    .auth()
    .current_user(&CancelToken::noop())
    .await
    .unwrap();
  assert_eq!(user.email, "ana@example.com");

  client.auth().logout().unwrap();

  // Cache was reset, so this is a real request - now unauthenticated.
  let err = client
    .auth()
    .current_user(&CancelToken::noop())
    .await
    .unwrap_err();
  assert!(matches!(err, ApiError::Auth { .. }));
}

#[tokio::test]
async fn test_concurrent_lists_share_one_network_call() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/transactions/"))
    .respond_with(
      ResponseTemplate::new(200)
        .set_body_json(json!([
          {"id": 1, "user_id": 1, "category_id": 2, "amount": "9.99", "date": "2025-05-01"}
        ]))
        .set_delay(std::time::Duration::from_millis(50)),
    )
    .expect(1)
    .mount(&server)
    .await;

  let session = Session::new(Arc::new(MemoryTokenStore::new()));
  let client = ApiClient::new(&Config::new(server.uri()), session).unwrap();

  let params = bursar::api::types::TransactionListParams::default();
  let token_a = CancelToken::noop();
  let token_b = CancelToken::noop();
  let (a, b) = tokio::join!(
    client.transactions().list(&params, &token_a),
    client.transactions().list(&params, &token_b),
  );

  assert_eq!(a.unwrap(), b.unwrap());
}

#[tokio::test]
async fn test_server_401_clears_session_and_cache() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/categories/"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
    .mount(&server)
    .await;
  Mock::given(method("GET"))
    .and(path("/transactions/"))
    .respond_with(
      ResponseTemplate::new(401).set_body_json(json!({"detail": "Token expired"})),
    )
    .mount(&server)
    .await;

  let session = Session::new(Arc::new(MemoryTokenStore::new()));
  session.set_tokens("expired", "ref").unwrap();
  let client = ApiClient::new(&Config::new(server.uri()), session.clone()).unwrap();

  client
    .categories()
    .list(&CancelToken::noop())
    .await
    .unwrap();

  let params = bursar::api::types::TransactionListParams::default();
  let err = client
    .transactions()
    .list(&params, &CancelToken::noop())
    .await
    .unwrap_err();
  assert!(matches!(err, ApiError::Auth { .. }));

  // Session cleared by the transport, cache cleared by the orchestrator.
  assert_eq!(session.access_token().unwrap(), None);
  assert!(client.queries().entry(&bursar::QueryKey::new("/categories/")).is_none());
}

#[tokio::test]
async fn test_explicit_stale_time_zero_always_refetches() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/categories/"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
    .expect(2)
    .mount(&server)
    .await;

  let session = Session::new(Arc::new(MemoryTokenStore::new()));
  let transport = Arc::new(
    bursar::HttpTransport::new(&Config::new(server.uri()), session.clone()).unwrap(),
  );
  let queries = QueryClient::new().with_stale_time(chrono::Duration::zero());
  let client = ApiClient::with_transport(transport, session, queries);

  client.categories().list(&CancelToken::noop()).await.unwrap();
  client.categories().list(&CancelToken::noop()).await.unwrap();
}
