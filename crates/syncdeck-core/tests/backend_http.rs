//! HTTP tests for the backend client and the OAuth credential flow.
//!
//! Tests run against a local mockito server, so no real backend or provider
//! credentials are needed.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use mockito::{Matcher, Server};
use serde_json::json;
use syncdeck_core::{
    AuthError, BackendClient, CredentialBag, CredentialFlow, IntegrationKind, LoadError,
    OAuthFlow, Operator, SessionView, Transition,
};
use syncdeck_core::storage::AuthConfig;

fn backend(server: &Server) -> BackendClient {
    BackendClient::new(&server.url(), Duration::from_secs(5)).unwrap()
}

fn quick_flow(server: &Server) -> OAuthFlow {
    OAuthFlow::new(backend(server), &AuthConfig::default())
        .with_browser(false)
        .with_poll_interval(Duration::from_millis(10))
        .with_timeout(Duration::from_millis(80))
}

// ============================================================================
// Load endpoint
// ============================================================================

#[tokio::test]
async fn load_posts_credentials_as_multipart_field() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/integrations/airtable/load")
        .match_header("content-type", Matcher::Regex("multipart/form-data".into()))
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex(r#"name="credentials""#.into()),
            Matcher::Regex(r#""access_token":"credA""#.into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"[{"id":"1","name":"Sheet1","type":"Table"}]"#)
        .create_async()
        .await;

    let credentials = CredentialBag::new(json!({"access_token": "credA"}));
    let records = backend(&server)
        .load_records(IntegrationKind::Airtable, &credentials)
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id.as_deref(), Some("1"));
    assert_eq!(records[0].name.as_deref(), Some("Sheet1"));
    assert_eq!(records[0].item_type.as_deref(), Some("Table"));
}

#[tokio::test]
async fn load_failure_carries_backend_detail() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/integrations/hubspot/load")
        .with_status(400)
        .with_header("content-type", "application/json")
        .with_body(r#"{"detail": "invalid token"}"#)
        .create_async()
        .await;

    let credentials = CredentialBag::new(json!({"access_token": "nope"}));
    let err = backend(&server)
        .load_records(IntegrationKind::HubSpot, &credentials)
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(400));
    assert_eq!(err.user_message(), "invalid token");
}

#[tokio::test]
async fn load_rejects_non_array_body() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/integrations/notion/load")
        .with_status(200)
        .with_body(r#"{"results": []}"#)
        .create_async()
        .await;

    let credentials = CredentialBag::new(json!({}));
    let err = backend(&server)
        .load_records(IntegrationKind::Notion, &credentials)
        .await
        .unwrap_err();

    assert!(matches!(err, LoadError::Decode(_)));
}

#[tokio::test]
async fn view_keeps_previous_rows_when_backend_rejects() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/integrations/airtable/load")
        .with_status(200)
        .with_body(r#"[{"id":"1","name":"Sheet1","type":"Table"}]"#)
        .expect(1)
        .create_async()
        .await;
    let client = backend(&server);

    let mut view = SessionView::default();
    view.pick(IntegrationKind::Airtable);
    view.on_auth_completed(syncdeck_core::AuthCompleted {
        kind: IntegrationKind::Airtable,
        credentials: CredentialBag::new(json!({"access_token": "credA"})),
    });
    assert!(view.load(&client).await.is_applied());

    server.reset();
    server
        .mock("POST", "/integrations/airtable/load")
        .with_status(401)
        .with_body(r#"{"detail": "invalid token"}"#)
        .create_async()
        .await;

    let transition = view.load(&client).await;

    assert_eq!(
        transition,
        Transition::Failed {
            message: "invalid token".into()
        }
    );
    assert_eq!(view.take_notice().as_deref(), Some("invalid token"));
    let rows = view.panel().rows().unwrap();
    assert_eq!(rows[0].name.as_deref(), Some("Sheet1"));
}

#[tokio::test]
async fn unreachable_backend_is_a_transport_error() {
    // Port 9 (discard) is not expected to accept HTTP connections.
    let client = BackendClient::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
    let err = client
        .load_records(IntegrationKind::Notion, &CredentialBag::new(json!({})))
        .await
        .unwrap_err();
    assert!(matches!(err, LoadError::Transport(_)));
}

// ============================================================================
// OAuth flow
// ============================================================================

#[tokio::test]
async fn oauth_flow_returns_credentials_for_kind() {
    let mut server = Server::new_async().await;
    let authorize = server
        .mock("POST", "/integrations/hubspot/authorize")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("user_id".into(), "ada".into()),
            Matcher::UrlEncoded("org_id".into(), "acme".into()),
        ]))
        .with_status(200)
        .with_body(r#""https://app.hubspot.com/oauth/authorize?client_id=x""#)
        .create_async()
        .await;
    server
        .mock("POST", "/integrations/hubspot/credentials")
        .with_status(200)
        .with_body(r#"{"access_token": "tok", "expires_in": 1800}"#)
        .create_async()
        .await;

    let seen = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&seen);
    let flow = quick_flow(&server).on_authorization_url(move |_, url| {
        *sink.lock().unwrap() = Some(url.to_string());
    });

    let done = flow
        .authorize(IntegrationKind::HubSpot, &Operator::new("ada", "acme"))
        .await
        .unwrap();

    authorize.assert_async().await;
    assert_eq!(done.kind, IntegrationKind::HubSpot);
    assert_eq!(done.credentials.as_value()["access_token"], "tok");
    assert_eq!(
        seen.lock().unwrap().as_deref(),
        Some("https://app.hubspot.com/oauth/authorize?client_id=x")
    );
}

#[tokio::test]
async fn oauth_flow_times_out_while_credentials_are_missing() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/integrations/notion/authorize")
        .with_status(200)
        .with_body(r#""https://api.notion.com/v1/oauth/authorize""#)
        .create_async()
        .await;
    server
        .mock("POST", "/integrations/notion/credentials")
        .with_status(400)
        .with_body(r#"{"detail": "No credentials found."}"#)
        .expect_at_least(2)
        .create_async()
        .await;

    let err = quick_flow(&server)
        .authorize(IntegrationKind::Notion, &Operator::default())
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::Timeout { .. }));
}

#[tokio::test]
async fn oauth_flow_surfaces_authorize_rejection() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/integrations/airtable/authorize")
        .with_status(500)
        .with_body(r#"{"detail": "client id not configured"}"#)
        .create_async()
        .await;

    let err = quick_flow(&server)
        .authorize(IntegrationKind::Airtable, &Operator::default())
        .await
        .unwrap_err();

    match err {
        AuthError::Rejected { service, detail } => {
            assert_eq!(service, "Airtable");
            assert_eq!(detail, "client id not configured");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn credential_errors_other_than_not_ready_abort_polling() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/integrations/airtable/authorize")
        .with_status(200)
        .with_body(r#""https://airtable.com/oauth2/v1/authorize""#)
        .create_async()
        .await;
    let credentials = server
        .mock("POST", "/integrations/airtable/credentials")
        .with_status(503)
        .with_body(r#"{"detail": "redis unavailable"}"#)
        .expect(1)
        .create_async()
        .await;

    let err = quick_flow(&server)
        .authorize(IntegrationKind::Airtable, &Operator::default())
        .await
        .unwrap_err();

    credentials.assert_async().await;
    assert!(matches!(err, AuthError::Rejected { .. }));
}

#[tokio::test]
async fn oauth_flow_accepts_unbounded_timeout_from_config() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/integrations/notion/authorize")
        .with_status(200)
        .with_body(r#""https://api.notion.com/v1/oauth/authorize""#)
        .create_async()
        .await;
    server
        .mock("POST", "/integrations/notion/credentials")
        .with_status(200)
        .with_body(r#"{"access_token": "tok"}"#)
        .create_async()
        .await;

    let config = AuthConfig {
        timeout_secs: u64::MAX,
        open_browser: false,
        ..AuthConfig::default()
    };
    let done = OAuthFlow::new(backend(&server), &config)
        .authorize(IntegrationKind::Notion, &Operator::default())
        .await
        .unwrap();

    assert_eq!(done.credentials.as_value()["access_token"], "tok");
}

#[tokio::test]
async fn oauth_flow_with_oversized_poll_interval_times_out() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/integrations/hubspot/authorize")
        .with_status(200)
        .with_body(r#""https://app.hubspot.com/oauth/authorize""#)
        .create_async()
        .await;
    server
        .mock("POST", "/integrations/hubspot/credentials")
        .with_status(400)
        .with_body(r#"{"detail": "No credentials found."}"#)
        .expect(1)
        .create_async()
        .await;

    let config = AuthConfig {
        poll_interval_secs: u64::MAX,
        timeout_secs: 1,
        open_browser: false,
    };
    let err = OAuthFlow::new(backend(&server), &config)
        .authorize(IntegrationKind::HubSpot, &Operator::default())
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::Timeout { timeout_secs: 1 }));
}
