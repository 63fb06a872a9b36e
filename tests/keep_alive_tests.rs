/// Self-ping tests against a mocked `/health`
use cliente_consolidado::keep_alive::KeepAlive;
use reqwest::StatusCode;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_ping_hits_health_once() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": "ok"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let keep_alive = KeepAlive::new(&mock_server.uri(), Duration::from_secs(780)).unwrap();
    let status = keep_alive.ping_once().await.unwrap();

    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_ping_non_200_is_reported_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&mock_server)
        .await;

    let keep_alive = KeepAlive::new(&mock_server.uri(), Duration::from_secs(780)).unwrap();
    let result = keep_alive.ping_once().await;

    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("503"));
}

#[tokio::test]
async fn test_ping_treats_other_success_codes_as_unexpected() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&mock_server)
        .await;

    let keep_alive = KeepAlive::new(&mock_server.uri(), Duration::from_secs(780)).unwrap();
    assert!(keep_alive.ping_once().await.is_err());
}

#[tokio::test]
async fn test_ping_times_out_on_slow_health() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(15)))
        .mount(&mock_server)
        .await;

    let keep_alive = KeepAlive::new(&mock_server.uri(), Duration::from_secs(780)).unwrap();
    let started = std::time::Instant::now();

    assert!(keep_alive.ping_once().await.is_err());
    assert!(started.elapsed() < Duration::from_secs(14));
}

#[tokio::test]
async fn test_background_loop_waits_one_interval_then_repeats() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let keep_alive = KeepAlive::new(&mock_server.uri(), Duration::from_millis(300)).unwrap();
    let handle = keep_alive.start();

    tokio::time::sleep(Duration::from_millis(150)).await;
    let early = mock_server.received_requests().await.unwrap().len();

    tokio::time::sleep(Duration::from_millis(800)).await;
    let later = mock_server.received_requests().await.unwrap().len();
    handle.abort();

    assert_eq!(early, 0, "no ping may fire before the first interval elapses");
    assert!(later >= 2, "expected repeated pings, got {}", later);
}
