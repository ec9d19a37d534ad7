use futures_util::StreamExt;
use httpmock::{Method::POST, MockServer};
use llm::{AnthropicClient, CompletionClient, CompletionError, CompletionRequest};

fn request() -> CompletionRequest {
    CompletionRequest::new("be brief", "Is 50 too old to get a tattoo?", "claude-sonnet-4-5", 64)
}

const STREAM_BODY: &str = concat!(
    "event: message_start\n",
    "data: {\"type\":\"message_start\",\"message\":{\"id\":\"msg_1\"}}\n",
    "\n",
    "event: content_block_start\n",
    "data: {\"type\":\"content_block_start\",\"index\":0}\n",
    "\n",
    "event: content_block_delta\n",
    "data: {\"type\":\"content_block_delta\",\"index\":0,\"delta\":{\"type\":\"text_delta\",\"text\":\"Hel\"}}\n",
    "\n",
    "event: content_block_delta\n",
    "data: {\"type\":\"content_block_delta\",\"index\":0,\"delta\":{\"type\":\"text_delta\",\"text\":\"lo\"}}\n",
    "\n",
    "event: content_block_stop\n",
    "data: {\"type\":\"content_block_stop\",\"index\":0}\n",
    "\n",
    "event: message_stop\n",
    "data: {\"type\":\"message_stop\"}\n",
    "\n",
);

#[tokio::test]
async fn streams_deltas_in_upstream_order() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/messages")
                .header("x-api-key", "k")
                .header("anthropic-version", "2023-06-01")
                .json_body_partial(r#"{"model":"claude-sonnet-4-5","stream":true}"#);
            then.status(200)
                .header("content-type", "text/event-stream")
                .body(STREAM_BODY);
        })
        .await;

    let client = AnthropicClient::with_base_url(Some("k".into()), server.base_url());
    let mut stream = client.stream_message(request()).await.unwrap();
    let mut got = Vec::new();
    while let Some(chunk) = stream.next().await {
        got.push(chunk.unwrap());
    }
    assert_eq!(got, ["Hel", "lo"]);
    mock.assert_async().await;
}

#[tokio::test]
async fn complete_concatenates_every_delta() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/messages");
            then.status(200)
                .header("content-type", "text/event-stream")
                .body(STREAM_BODY);
        })
        .await;

    let client = AnthropicClient::with_base_url(Some("k".into()), server.base_url());
    let text = client.complete(request()).await.unwrap();
    assert_eq!(text, "Hello");
}

#[tokio::test]
async fn missing_key_is_auth_error_without_a_call() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/messages");
            then.status(200).body("");
        })
        .await;

    let client = AnthropicClient::with_base_url(None, server.base_url());
    let err = client.stream_message(request()).await.map(|_| ()).unwrap_err();
    assert!(matches!(err, CompletionError::Auth(_)));
    assert_eq!(mock.hits_async().await, 0);
}

#[tokio::test]
async fn http_401_maps_to_auth_with_provider_message() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/messages");
            then.status(401).json_body(serde_json::json!({
                "type": "error",
                "error": { "type": "authentication_error", "message": "invalid x-api-key" }
            }));
        })
        .await;

    let client = AnthropicClient::with_base_url(Some("bad".into()), server.base_url());
    match client.stream_message(request()).await.map(|_| ()) {
        Err(CompletionError::Auth(msg)) => assert!(msg.contains("invalid x-api-key")),
        other => panic!("expected auth error, got {other:?}"),
    }
}

#[tokio::test]
async fn http_429_maps_to_rate_limited() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/messages");
            then.status(429).json_body(serde_json::json!({
                "type": "error",
                "error": { "type": "rate_limit_error", "message": "slow down" }
            }));
        })
        .await;

    let client = AnthropicClient::with_base_url(Some("k".into()), server.base_url());
    let err = client.stream_message(request()).await.map(|_| ()).unwrap_err();
    assert!(matches!(err, CompletionError::RateLimited(_)));
}

#[tokio::test]
async fn http_500_surfaces_provider_message() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/messages");
            then.status(500).json_body(serde_json::json!({
                "type": "error",
                "error": { "type": "api_error", "message": "overloaded" }
            }));
        })
        .await;

    let client = AnthropicClient::with_base_url(Some("k".into()), server.base_url());
    match client.stream_message(request()).await.map(|_| ()) {
        Err(CompletionError::Api(msg)) => assert!(msg.contains("overloaded")),
        other => panic!("expected api error, got {other:?}"),
    }
}

#[tokio::test]
async fn mid_stream_error_event_terminates_after_deltas() {
    let body = concat!(
        "event: content_block_delta\n",
        "data: {\"type\":\"content_block_delta\",\"index\":0,\"delta\":{\"type\":\"text_delta\",\"text\":\"Hel\"}}\n",
        "\n",
        "event: error\n",
        "data: {\"type\":\"error\",\"error\":{\"type\":\"overloaded_error\",\"message\":\"Overloaded\"}}\n",
        "\n",
    );
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/messages");
            then.status(200)
                .header("content-type", "text/event-stream")
                .body(body);
        })
        .await;

    let client = AnthropicClient::with_base_url(Some("k".into()), server.base_url());
    let mut stream = client.stream_message(request()).await.unwrap();
    assert_eq!(stream.next().await.unwrap().unwrap(), "Hel");
    match stream.next().await {
        Some(Err(CompletionError::Api(msg))) => assert!(msg.contains("Overloaded")),
        other => panic!("expected terminal api error, got {other:?}"),
    }
    assert!(stream.next().await.is_none());
}

#[tokio::test]
async fn unreachable_server_is_network_error() {
    // Nothing listens on the discard port.
    let client = AnthropicClient::with_base_url(Some("k".into()), "http://127.0.0.1:9");
    let err = client.stream_message(request()).await.map(|_| ()).unwrap_err();
    assert!(matches!(err, CompletionError::Network(_)));
}
