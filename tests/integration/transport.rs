//! Dispatch and response normalization.

use std::time::{Duration, Instant};

use super::common::{builder, client};
use restapi::client::CancellationToken;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_permanent_redirect_is_followed() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(
            ResponseTemplate::new(308).insert_header("location", format!("{}/new", server.uri())),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/new"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"moved":true}"#))
        .expect(1)
        .mount(&server)
        .await;

    let body = client(builder(&server))
        .send_request("GET", "/old", "")
        .await
        .unwrap();
    assert_eq!(body, r#"{"moved":true}"#);
}

#[tokio::test]
async fn test_timeout_returns_transport_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(30)))
        .mount(&server)
        .await;

    let api = client(builder(&server).with_timeout_secs(1));
    let start = Instant::now();
    let err = api.send_request("GET", "/never", "").await.unwrap_err();

    assert!(err.is_transport(), "unexpected error: {err}");
    assert!(start.elapsed() < Duration::from_millis(2500));
}

#[tokio::test]
async fn test_timeout_leaves_client_usable() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(30)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/fast"))
        .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
        .mount(&server)
        .await;

    let api = client(builder(&server).with_timeout_secs(1).with_rate_limit(10.0));
    assert!(api.send_request("GET", "/slow", "").await.unwrap_err().is_timeout());
    assert_eq!(api.send_request("GET", "/fast", "").await.unwrap(), "[]");
}

#[tokio::test]
async fn test_empty_success_body_is_empty_object() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let body = client(builder(&server))
        .send_request("DELETE", "/things/1", "")
        .await
        .unwrap();
    assert_eq!(body, "{}");
}

#[tokio::test]
async fn test_xssi_prefix_is_stripped() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(")]}'\n{\"id\":\"x-1\"}"))
        .mount(&server)
        .await;

    let body = client(builder(&server).with_xssi_prefix(")]}'\n"))
        .send_request("GET", "/things/x-1", "")
        .await
        .unwrap();
    assert_eq!(restapi::payload::get_field(&body, "id").unwrap(), "x-1");
}

#[tokio::test]
async fn test_api_error_carries_status_and_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(422).set_body_string(r#"{"errors":["name is required"]}"#),
        )
        .mount(&server)
        .await;

    let err = client(builder(&server))
        .send_request("POST", "/things", "{}")
        .await
        .unwrap_err();
    assert!(err.is_api());
    assert_eq!(err.status(), Some(422));
    assert_eq!(err.body(), Some(r#"{"errors":["name is required"]}"#));
    assert!(err.to_string().starts_with("unexpected response code '422'"));
}

#[tokio::test]
async fn test_cookies_persist_across_requests() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).insert_header("set-cookie", "session=abc; Path=/"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/me"))
        .and(header("cookie", "session=abc"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"id":"me"}"#))
        .expect(1)
        .mount(&server)
        .await;

    let api = client(builder(&server).with_cookies(true));
    api.send_request("POST", "/login", "").await.unwrap();
    assert_eq!(api.send_request("GET", "/me", "").await.unwrap(), r#"{"id":"me"}"#);
}

#[tokio::test]
async fn test_cancellation_is_distinct_from_transport_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let api = client(builder(&server).with_rate_limit(0.5));
    api.send_request("GET", "/first", "").await.unwrap();

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let err = api
        .send_request_with_cancel("GET", "/second", "", &cancel)
        .await
        .unwrap_err();
    assert!(err.is_cancelled());
    assert!(!err.is_transport());
}
