use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use voicewire::config::{SessionConfig, DEFAULT_MODEL};
use voicewire::error::VoicewireError;
use voicewire::signalling::SignallingClient;
use wiremock::matchers::{body_string, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const OFFER_SDP: &str = "v=0\r\no=- 4611731400430051336 2 IN IP4 127.0.0.1\r\ns=-\r\n";
const ANSWER_SDP: &str = "v=0\r\no=- 8447919763360361462 2 IN IP4 127.0.0.1\r\ns=-\r\n";

fn client_for(server: &MockServer) -> SignallingClient {
    let config = SessionConfig::new(format!("{}/api/voice/key", server.uri()))
        .with_realtime_url(format!("{}/realtime", server.uri()))
        .with_http_timeout(Duration::from_secs(2));
    SignallingClient::new(&config)
}

#[tokio::test]
async fn credential_happy_path() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/voice/key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "client_secret": { "value": "ek-test-secret" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let credential = client_for(&server)
        .get_credential()
        .await
        .expect("credential fetch should succeed");
    assert_eq!(credential.secret(), "ek-test-secret");
}

#[tokio::test]
async fn credential_missing_secret_is_a_hard_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/voice/key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "expires_at": 0 })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .get_credential()
        .await
        .expect_err("missing secret should fail");
    assert!(
        matches!(err, VoicewireError::Credential(ref message) if message.contains("client_secret")),
        "unexpected error: {err}"
    );
}

#[tokio::test]
async fn credential_non_ok_status_is_a_credential_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/voice/key"))
        .respond_with(ResponseTemplate::new(500).set_body_string("backend exploded"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .get_credential()
        .await
        .expect_err("500 should fail");
    assert!(
        matches!(err, VoicewireError::Credential(ref message)
            if message.contains("500") && message.contains("backend exploded")),
        "unexpected error: {err}"
    );
}

#[tokio::test]
async fn credential_non_json_body_is_a_credential_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/voice/key"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .get_credential()
        .await
        .expect_err("html body should fail");
    assert!(matches!(err, VoicewireError::Credential(_)));
}

#[tokio::test]
async fn sdp_exchange_posts_offer_with_bearer_and_model() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/voice/key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "client_secret": { "value": "ek-test-secret" }
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/realtime"))
        .and(query_param("model", DEFAULT_MODEL))
        .and(header("authorization", "Bearer ek-test-secret"))
        .and(header("content-type", "application/sdp"))
        .and(body_string(OFFER_SDP))
        .respond_with(ResponseTemplate::new(200).set_body_string(ANSWER_SDP))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let credential = client.get_credential().await.expect("credential");
    let answer = client
        .exchange_session_description(OFFER_SDP, &credential)
        .await
        .expect("exchange should succeed");
    assert_eq!(answer, ANSWER_SDP);
}

#[tokio::test]
async fn sdp_exchange_surfaces_rejection_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/voice/key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "client_secret": { "value": "ek-expired" }
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/realtime"))
        .respond_with(ResponseTemplate::new(401).set_body_string("session token expired"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let credential = client.get_credential().await.expect("credential");
    let err = client
        .exchange_session_description(OFFER_SDP, &credential)
        .await
        .expect_err("401 should fail");
    assert!(
        matches!(err, VoicewireError::Signalling { status: 401, ref message }
            if message.contains("session token expired")),
        "unexpected error: {err}"
    );
}
