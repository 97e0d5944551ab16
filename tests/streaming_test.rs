//! Large bodies stream through the gateway without corruption.

use api_gateway::config::{GatewayConfig, RouteConfig};
use serde_json::Value;

mod common;

const RESPONSE_SIZE: usize = 50 * 1024 * 1024;
const UPLOAD_SIZE: usize = 20 * 1024 * 1024;

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_large_response_is_byte_identical() {
    let backend = common::start_streaming_backend(RESPONSE_SIZE).await;
    let mut config = GatewayConfig::default();
    config.routes = vec![RouteConfig::new(
        "bulk",
        "/api/bulk",
        format!("http://{}", backend),
    )];
    let (gateway, shutdown) = common::start_gateway(config).await;

    let mut res = common::client()
        .get(format!("http://{}/api/bulk/blob", gateway))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(
        res.content_length(),
        Some(RESPONSE_SIZE as u64)
    );

    let mut offset = 0;
    while let Some(chunk) = res.chunk().await.unwrap() {
        for (i, byte) in chunk.iter().enumerate() {
            assert_eq!(*byte, common::pattern_byte(offset + i), "mismatch at {}", offset + i);
        }
        offset += chunk.len();
    }
    assert_eq!(offset, RESPONSE_SIZE);

    shutdown.trigger();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_large_upload_reaches_backend() {
    let backend = common::start_echo_backend().await;
    let mut config = GatewayConfig::default();
    config.limits.max_body_size = (UPLOAD_SIZE + 1) as u64;
    config.routes = vec![RouteConfig::new(
        "upload",
        "/api/upload",
        format!("http://{}", backend),
    )];
    let (gateway, shutdown) = common::start_gateway(config).await;

    let echo: Value = common::client()
        .put(format!("http://{}/api/upload/file", gateway))
        .body(vec![7u8; UPLOAD_SIZE])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(echo["method"], "PUT");
    assert_eq!(echo["body_len"], UPLOAD_SIZE);

    shutdown.trigger();
}
