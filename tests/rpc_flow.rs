//! Integration tests for the session-token handshake and call flow
//!
//! A wiremock server stands in for the Transmission daemon so the full
//! HTTP exchange can be asserted: probe, token caching, stale-token
//! retry, and the error mapping for each status the daemon can answer.

use serde_json::json;
use transmission_rpc_client::{AddArgs, TransmissionClient, TransmissionError};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const RPC_PATH: &str = "/transmission/rpc/";
const SESSION_HEADER: &str = "X-Transmission-Session-Id";

/// Mount the probe answer: 409 carrying the given session id.
async fn mount_probe(server: &MockServer, session_id: &str) {
    Mock::given(method("HEAD"))
        .and(path(RPC_PATH))
        .respond_with(ResponseTemplate::new(409).insert_header(SESSION_HEADER, session_id))
        .mount(server)
        .await;
}

fn success_body() -> serde_json::Value {
    json!({ "result": "success", "arguments": {} })
}

/// Test a cold client: one probe, then the real call with the cached
/// token and the exact wire body.
#[tokio::test]
async fn test_handshake_then_call() {
    let server = MockServer::start().await;

    Mock::given(method("HEAD"))
        .and(path(RPC_PATH))
        .respond_with(ResponseTemplate::new(409).insert_header(SESSION_HEADER, "abc123"))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(RPC_PATH))
        .and(header(SESSION_HEADER, "abc123"))
        .and(body_json(json!({
            "method": "torrent-start",
            "arguments": { "ids": [1, 2] }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(success_body()))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = TransmissionClient::open(&server.uri()).unwrap();
    client.start(&[1, 2]).await.unwrap();
}

/// Test that a rejected token is renegotiated and the call retried
/// exactly once.
#[tokio::test]
async fn test_stale_token_renegotiates_once() {
    let server = MockServer::start().await;

    // First probe hands out a token the daemon then expires
    Mock::given(method("HEAD"))
        .and(path(RPC_PATH))
        .respond_with(ResponseTemplate::new(409).insert_header(SESSION_HEADER, "stale"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_probe(&server, "fresh").await;

    Mock::given(method("POST"))
        .and(path(RPC_PATH))
        .and(header(SESSION_HEADER, "stale"))
        .respond_with(ResponseTemplate::new(409))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(RPC_PATH))
        .and(header(SESSION_HEADER, "fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(success_body()))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = TransmissionClient::open(&server.uri()).unwrap();
    client.stop(&[]).await.unwrap();
}

/// Test that a second 409 after renegotiation fails permanently instead
/// of looping.
#[tokio::test]
async fn test_second_conflict_is_fatal() {
    let server = MockServer::start().await;

    mount_probe(&server, "token").await;

    Mock::given(method("POST"))
        .and(path(RPC_PATH))
        .respond_with(ResponseTemplate::new(409))
        .expect(2)
        .mount(&server)
        .await;

    let mut client = TransmissionClient::open(&server.uri()).unwrap();
    let err = client.start(&[]).await.unwrap_err();
    assert!(matches!(err, TransmissionError::Session(_)), "{err:?}");
}

/// Test that a 409 probe answer without the token header is fatal.
#[tokio::test]
async fn test_probe_without_token_header_is_fatal() {
    let server = MockServer::start().await;

    Mock::given(method("HEAD"))
        .and(path(RPC_PATH))
        .respond_with(ResponseTemplate::new(409))
        .mount(&server)
        .await;

    let mut client = TransmissionClient::open(&server.uri()).unwrap();
    let err = client.start(&[]).await.unwrap_err();
    assert!(matches!(err, TransmissionError::Session(_)), "{err:?}");
}

/// Test the 401 mapping during the handshake.
#[tokio::test]
async fn test_unauthorized_probe() {
    let server = MockServer::start().await;

    Mock::given(method("HEAD"))
        .and(path(RPC_PATH))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let mut client = TransmissionClient::open(&server.uri()).unwrap();
    let err = client.start(&[]).await.unwrap_err();
    assert!(matches!(err, TransmissionError::Authentication), "{err:?}");
}

/// Test the 401 mapping on the real call.
#[tokio::test]
async fn test_unauthorized_call() {
    let server = MockServer::start().await;

    mount_probe(&server, "token").await;

    Mock::given(method("POST"))
        .and(path(RPC_PATH))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let mut client = TransmissionClient::open(&server.uri()).unwrap();
    let err = client.start(&[]).await.unwrap_err();
    assert!(matches!(err, TransmissionError::Authentication), "{err:?}");
}

/// Test that an unexpected status carries its code.
#[tokio::test]
async fn test_unexpected_status() {
    let server = MockServer::start().await;

    Mock::given(method("HEAD"))
        .and(path(RPC_PATH))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let mut client = TransmissionClient::open(&server.uri()).unwrap();
    let err = client.start(&[]).await.unwrap_err();
    assert!(matches!(err, TransmissionError::Protocol(500)), "{err:?}");
}

/// Test that a daemon-reported failure surfaces its message verbatim.
#[tokio::test]
async fn test_daemon_error_message() {
    let server = MockServer::start().await;

    mount_probe(&server, "token").await;

    Mock::given(method("POST"))
        .and(path(RPC_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": "unrecognized method",
            "arguments": {}
        })))
        .mount(&server)
        .await;

    let mut client = TransmissionClient::open(&server.uri()).unwrap();
    match client.verify(&[1]).await.unwrap_err() {
        TransmissionError::Daemon(message) => assert_eq!(message, "unrecognized method"),
        other => panic!("expected daemon error, got {other:?}"),
    }
}

/// Test that an empty 200 body is a benign no-op, not an error.
#[tokio::test]
async fn test_empty_body_is_benign() {
    let server = MockServer::start().await;

    mount_probe(&server, "token").await;

    Mock::given(method("POST"))
        .and(path(RPC_PATH))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let mut client = TransmissionClient::open(&server.uri()).unwrap();
    client.stop(&[]).await.unwrap();
}

/// Test that basic auth rides along on both the probe and the call.
#[tokio::test]
async fn test_basic_auth_attached_everywhere() {
    let server = MockServer::start().await;

    // base64("admin:secret")
    let authorization = "Basic YWRtaW46c2VjcmV0";

    Mock::given(method("HEAD"))
        .and(path(RPC_PATH))
        .and(header("Authorization", authorization))
        .respond_with(ResponseTemplate::new(409).insert_header(SESSION_HEADER, "token"))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(RPC_PATH))
        .and(header("Authorization", authorization))
        .respond_with(ResponseTemplate::new(200).set_body_json(success_body()))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = TransmissionClient::open(&server.uri())
        .unwrap()
        .with_auth("admin", "secret");
    client.start(&[]).await.unwrap();
}

/// Test the torrent list call: merged default fields on the wire and
/// status decoration on the way back.
#[tokio::test]
async fn test_torrent_list_fields_and_decoration() {
    let server = MockServer::start().await;

    mount_probe(&server, "token").await;

    Mock::given(method("POST"))
        .and(path(RPC_PATH))
        .and(body_json(json!({
            "method": "torrent-get",
            "arguments": {
                "fields": ["id", "name", "status", "totalSize", "percentDone"],
                "ids": [1]
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": "success",
            "arguments": {
                "torrents": [
                    { "id": 1, "name": "debian.iso", "status": 4, "totalSize": 1000 }
                ]
            }
        })))
        .mount(&server)
        .await;

    let mut client = TransmissionClient::open(&server.uri()).unwrap();
    let torrents = client.torrents(&[1], &["percentDone"]).await.unwrap();

    // Default policy decorates status only
    assert_eq!(
        torrents,
        Some(json!([
            { "id": 1, "name": "debian.iso", "status": "Downloading", "totalSize": 1000 }
        ]))
    );
}

/// Test that adding an already-known torrent reports `torrent-duplicate`
/// through the record's `status` field.
#[tokio::test]
async fn test_add_reports_duplicate() {
    let server = MockServer::start().await;

    mount_probe(&server, "token").await;

    Mock::given(method("POST"))
        .and(path(RPC_PATH))
        .and(body_json(json!({
            "method": "torrent-add",
            "arguments": { "filename": "magnet:?xt=urn:btih:ff" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": "success",
            "arguments": {
                "torrent-duplicate": { "id": 5, "name": "debian.iso", "hashString": "ff" }
            }
        })))
        .mount(&server)
        .await;

    let mut client = TransmissionClient::open(&server.uri()).unwrap();
    let record = client
        .add(AddArgs::filename("magnet:?xt=urn:btih:ff"))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(record["status"], "torrent-duplicate");
    assert_eq!(record["id"], 5);
}

/// Test key projection on session variables.
#[tokio::test]
async fn test_session_vars_projection() {
    let server = MockServer::start().await;

    mount_probe(&server, "token").await;

    Mock::given(method("POST"))
        .and(path(RPC_PATH))
        .and(body_json(json!({ "method": "session-get", "arguments": {} })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": "success",
            "arguments": { "version": "4.0.5", "rpc-version": 17, "dht-enabled": true }
        })))
        .mount(&server)
        .await;

    let mut client = TransmissionClient::open(&server.uri()).unwrap();
    let vars = client.session_vars(&["version"]).await.unwrap();
    assert_eq!(vars, Some(json!({ "version": "4.0.5" })));
}
