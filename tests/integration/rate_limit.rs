//! Throughput ceiling across sequential and concurrent callers.

use std::time::{Duration, Instant};

use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::common::{builder, client};

async fn server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn test_four_requests_at_one_per_second() {
    let server = server().await;
    let api = client(builder(&server).with_rate_limit(1.0));

    let start = Instant::now();
    for i in 0..4 {
        api.send_request("GET", &format!("/things/{i}"), "").await.unwrap();
    }

    assert!(
        start.elapsed() >= Duration::from_secs(3),
        "took {:?}",
        start.elapsed()
    );
}

#[tokio::test]
async fn test_concurrent_callers_share_the_bucket() {
    let server = server().await;
    let api = client(builder(&server).with_rate_limit(2.0));

    let start = Instant::now();
    let handles: Vec<_> = (0..5)
        .map(|i| {
            let api = api.clone();
            tokio::spawn(async move { api.send_request("GET", &format!("/things/{i}"), "").await })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    // burst 2, then one token every 500ms
    assert!(start.elapsed() >= Duration::from_millis(1500));
}

#[tokio::test]
async fn test_unlimited_by_default() {
    let server = server().await;
    let api = client(builder(&server));
    assert_eq!(api.rate_limiter().rate(), None);

    let start = Instant::now();
    for _ in 0..10 {
        api.send_request("GET", "/things", "").await.unwrap();
    }
    assert!(start.elapsed() < Duration::from_secs(2));
}
