//! Object lifecycle driven through deserialized options.

use restapi::{ApiClient, ClientOptions};
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::common::init_tracing;

fn options(server: &MockServer, extra: serde_json::Value) -> ClientOptions {
    init_tracing();
    let mut doc = json!({ "uri": format!("{}/", server.uri()) });
    if let (Some(doc), Some(extra)) = (doc.as_object_mut(), extra.as_object()) {
        doc.extend(extra.clone());
    }
    serde_json::from_value(doc).unwrap()
}

#[tokio::test]
async fn test_full_lifecycle() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/widgets"))
        .and(body_json(json!({"name": "w"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"data": {"id": "w-1"}})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/widgets/w-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"id": "w-1"},
            "name": "w",
            "version": 4
        })))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/widgets/w-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"id": "w-1"},
            "name": "w2",
            "version": 5
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/api/widgets/w-1"))
        .and(body_json(json!({"name": "w2", "version": 4})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/widgets/w-1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let config = options(
        &server,
        json!({
            "idAttribute": "data/id",
            "updateMethod": "PATCH",
            "copyKeys": ["version"]
        }),
    )
    .into_config()
    .unwrap();
    let api = ApiClient::new(config).unwrap();

    let created = api.create_object("/api/widgets", r#"{"name":"w"}"#).await.unwrap();
    assert_eq!(created.id, "w-1");
    assert_eq!(created.data["version"], 4);

    let updated = api.update_object(&created, r#"{"name":"w2"}"#).await.unwrap();
    assert_eq!(updated.data["version"], 5);
    assert_eq!(updated.data["name"], "w2");

    api.delete_object(&updated).await.unwrap();
}

#[tokio::test]
async fn test_import_by_identifier_query() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tenants"))
        .and(query_param("identifier", "acme"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{"id": "t-9", "identifier": "acme"}])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let builder = options(&server, json!({}))
        .into_builder()
        .unwrap()
        .with_addressing(restapi::client::ObjectAddressing::Query("identifier".to_string()));
    let api = ApiClient::new(builder.build().unwrap()).unwrap();

    let object = api.import_object("/tenants/,acme").await.unwrap();
    assert_eq!(object.id, "acme");
    assert_eq!(restapi::payload::lookup_string(&object.data, "id").unwrap(), "t-9");
}

#[tokio::test]
async fn test_connect_check_failure_fails_construction() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(ResponseTemplate::new(500).set_body_string("down"))
        .expect(1)
        .mount(&server)
        .await;

    let config = options(&server, json!({"testPath": "/status"}))
        .into_config()
        .unwrap();
    let err = ApiClient::connect(config).await.unwrap_err();
    assert_eq!(err.status(), Some(500));
    assert_eq!(err.body(), Some("down"));
}

#[test]
fn test_invalid_options_are_configuration_errors() {
    for doc in [
        json!({"uri": ""}),
        json!({"uri": "example.com"}),
        json!({"uri": "http://x", "rateLimit": 0}),
        json!({"uri": "http://x", "jwt": {"claims": {}}}),
        json!({"uri": "http://x", "jwt": {"secret": "s", "claims": "{oops"}}),
        json!({"uri": "http://x", "rootCaString": "garbage"}),
        json!({"uri": "http://x", "certString": "c"}),
    ] {
        let options: ClientOptions = serde_json::from_value(doc.clone()).unwrap();
        let err = options.into_config().unwrap_err();
        assert!(err.is_configuration(), "{doc} gave {err}");
    }
}
