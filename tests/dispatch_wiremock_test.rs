use std::time::Duration;
use webhook_relay::dispatch::{DispatchConfig, spawn};
use webhook_relay::{CapturedValue, EventLevel, encode};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

async fn wait_for_requests(server: &MockServer, count: usize) -> Vec<Request> {
    for _ in 0..150 {
        let requests = server.received_requests().await.unwrap_or_default();
        if requests.len() >= count {
            return requests;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    server.received_requests().await.unwrap_or_default()
}

fn config_for(server: &MockServer) -> DispatchConfig {
    DispatchConfig {
        endpoint: format!("{}/v1/events", server.uri()),
        timeout: Duration::from_secs(5),
        ..Default::default()
    }
}

#[tokio::test]
async fn posts_one_json_event_per_dispatch() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/events"))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let (handle, _worker) = spawn(config_for(&mock_server)).unwrap();

    handle.dispatch(encode(
        EventLevel::Error,
        &[CapturedValue::from("failed:"), CapturedValue::from(42i64)],
    ));

    let requests = wait_for_requests(&mock_server, 1).await;
    assert_eq!(requests.len(), 1);

    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["level"], "error");
    assert_eq!(body["messages"][0], "failed:");
    assert_eq!(body["messages"][1], "42");
    assert!(body["timestamp"].as_str().unwrap().ends_with('Z'));
}

#[tokio::test]
async fn non_2xx_response_still_counts_as_delivered() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/events"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&mock_server)
        .await;

    let (handle, _worker) = spawn(config_for(&mock_server)).unwrap();

    handle.dispatch(encode(EventLevel::Warn, &[CapturedValue::from("first")]));
    handle.dispatch(encode(EventLevel::Warn, &[CapturedValue::from("second")]));

    // No retry and no worker death: exactly one request per event.
    let requests = wait_for_requests(&mock_server, 2).await;
    assert_eq!(requests.len(), 2);
}

#[tokio::test]
async fn transport_failure_does_not_kill_the_worker() {
    // Nothing listens here; every send fails at the transport level.
    let config = DispatchConfig {
        endpoint: "http://127.0.0.1:9/v1/events".to_string(),
        timeout: Duration::from_millis(500),
        connection_timeout: Duration::from_millis(500),
        ..Default::default()
    };
    let (handle, worker) = spawn(config).unwrap();

    handle.dispatch(encode(EventLevel::Info, &[CapturedValue::from("lost")]));
    handle.dispatch(encode(EventLevel::Info, &[CapturedValue::from("also lost")]));
    tokio::time::sleep(Duration::from_millis(200)).await;

    // The worker survives the failures and exits cleanly once the last
    // handle drops.
    drop(handle);
    tokio::time::timeout(Duration::from_secs(10), worker.join())
        .await
        .expect("worker should drain and exit");
}

#[tokio::test]
async fn in_flight_events_may_complete_in_any_order_but_all_arrive() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/events"))
        .respond_with(ResponseTemplate::new(202))
        .mount(&mock_server)
        .await;

    let (handle, _worker) = spawn(config_for(&mock_server)).unwrap();

    for i in 0..5i64 {
        handle.dispatch(encode(EventLevel::Log, &[CapturedValue::from(i)]));
    }

    let requests = wait_for_requests(&mock_server, 5).await;
    assert_eq!(requests.len(), 5);
}
