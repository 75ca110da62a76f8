//! Block explorer and IPFS gateway clients against a local HTTP server

use bitcoin::Network;
use catenis_message_inspector::errors::{ErrorKind, FetchError, InspectError, Stage};
use catenis_message_inspector::fetch::{
    BlockExplorerClient, ContentSource, IpfsGatewayClient, TransactionSource,
};
use catenis_message_inspector::offchain::JsonOffChainProtocol;
use catenis_message_inspector::{InspectRequest, MessageInspector};
use anyhow::Result;
use std::collections::HashMap;
use std::time::Duration;

use crate::common::http_server::{Route, TestServer};
use crate::common::{
    build_tx, content_id, envelope_payload, null_data_output, reference_tail, tx_hex, Device,
};

const TXID: &str = "8e2c8b0ea9e1a7b4d5c8bbc4d1e0c0f1c2d3e4f5a6b7c8d9e0f1a2b3c4d5e6f7";

fn routes(entries: Vec<(String, Route)>) -> HashMap<String, Route> {
    entries.into_iter().collect()
}

#[tokio::test]
async fn test_explorer_plain_hex_response() -> Result<()> {
    let server = TestServer::start(routes(vec![(
        format!("/api/tx/{}/hex", TXID),
        Route::ok("0200abcd\n"),
    )]))
    .await;

    let client =
        BlockExplorerClient::new(&format!("{}/api/", server.base_url), "tx/:txid/hex", 2_000)?;
    let hex = client.get_transaction(TXID).await?;

    assert_eq!(hex, "0200abcd");
    assert_eq!(server.requests(), vec![format!("/api/tx/{}/hex", TXID)]);
    Ok(())
}

#[tokio::test]
async fn test_explorer_endpoint_replaces_last_root_segment() -> Result<()> {
    let server = TestServer::start(routes(vec![(
        format!("/tx/{}/hex", TXID),
        Route::ok("0200abcd"),
    )]))
    .await;

    // Without a trailing slash "api" is a file name and the endpoint resolves next to it
    let client =
        BlockExplorerClient::new(&format!("{}/api", server.base_url), "tx/:txid/hex", 2_000)?;
    assert_eq!(client.get_transaction(TXID).await?, "0200abcd");
    assert_eq!(server.requests(), vec![format!("/tx/{}/hex", TXID)]);
    Ok(())
}

#[tokio::test]
async fn test_explorer_json_response_and_custom_endpoint() -> Result<()> {
    let server = TestServer::start(routes(vec![(
        format!("/rawtx/{}", TXID),
        Route::ok(format!(r#"{{"txid":"{}","hex":"0100ff"}}"#, TXID)),
    )]))
    .await;

    let client = BlockExplorerClient::new(&server.base_url, "/rawtx/:txid", 2_000)?;
    assert_eq!(client.get_transaction(TXID).await?, "0100ff");
    Ok(())
}

#[tokio::test]
async fn test_explorer_error_status() {
    let server = TestServer::start(routes(vec![(
        format!("/tx/{}/hex", TXID),
        Route::status(404, "Transaction not found"),
    )]))
    .await;

    let client = BlockExplorerClient::new(&server.base_url, "tx/:txid/hex", 2_000).unwrap();
    let err = client.get_transaction(TXID).await.unwrap_err();

    match err {
        FetchError::HttpStatus { status, message } => {
            assert_eq!(status, 404);
            assert_eq!(message, "Transaction not found");
        }
        other => panic!("Expected HTTP status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_error_status_without_body_uses_reason_phrase() {
    let server = TestServer::start(HashMap::new()).await;

    let client = IpfsGatewayClient::new(&server.base_url, 2_000).unwrap();
    let err = client.get_data(&content_id(0x01)).await.unwrap_err();

    assert_eq!(err.to_string(), "[404] Not Found");
}

#[tokio::test]
async fn test_explorer_unexpected_body() {
    let server = TestServer::start(routes(vec![(
        format!("/tx/{}/hex", TXID),
        Route::ok("<html>maintenance</html>"),
    )]))
    .await;

    let client = BlockExplorerClient::new(&server.base_url, "tx/:txid/hex", 2_000).unwrap();
    let err = client.get_transaction(TXID).await.unwrap_err();
    assert!(matches!(err, FetchError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_ipfs_gateway_fetch() -> Result<()> {
    let cid = content_id(0x02);
    let server = TestServer::start(routes(vec![(
        format!("/ipfs/{}", cid),
        Route::ok(vec![0x00, 0x01, 0xff]),
    )]))
    .await;

    let client = IpfsGatewayClient::new(&server.base_url, 2_000)?;
    assert_eq!(client.get_data(&cid).await?, vec![0x00, 0x01, 0xff]);
    Ok(())
}

#[tokio::test]
async fn test_ipfs_gateway_timeout() {
    let cid = content_id(0x03);
    let server = TestServer::start(routes(vec![(
        format!("/ipfs/{}", cid),
        Route::ok("late").delayed(Duration::from_secs(5)),
    )]))
    .await;

    let client = IpfsGatewayClient::new(&server.base_url, 100).unwrap();
    let err = client.get_data(&cid).await.unwrap_err();

    assert!(err.is_timeout());
    assert!(err.to_string().starts_with("Request timed out"));
}

#[tokio::test]
async fn test_connection_refused() {
    // Bind then drop to get a port nobody listens on
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = IpfsGatewayClient::new(&format!("http://{}", addr), 2_000).unwrap();
    let err = client.get_data(&content_id(0x04)).await.unwrap_err();

    assert!(matches!(err, FetchError::RequestFailed { .. }));
    assert!(!err.is_timeout());
}

#[tokio::test]
async fn test_inspector_over_http() -> Result<()> {
    let origin = Device::new(30);
    let message_cid = content_id(0x05);
    let tx = build_tx(
        vec![origin.p2wpkh_input(0)],
        vec![null_data_output(&envelope_payload(
            0x02,
            0x00,
            &reference_tail(0x01, &message_cid),
        ))],
    );
    let txid = tx.compute_txid().to_string();

    let server = TestServer::start(routes(vec![
        (format!("/api/tx/{}/hex", txid), Route::ok(tx_hex(&tx))),
        (format!("/ipfs/{}", message_cid), Route::ok("Fetched over HTTP")),
    ]))
    .await;

    let inspector = MessageInspector::new(
        BlockExplorerClient::new(&format!("{}/api/", server.base_url), "tx/:txid/hex", 2_000)?,
        IpfsGatewayClient::new(&server.base_url, 2_000)?,
        JsonOffChainProtocol,
        Network::Bitcoin,
    );

    let result = inspector.inspect(&InspectRequest::for_txid(&txid)).await?;

    assert_eq!(result.message_text(), Some("Fetched over HTTP"));
    assert_eq!(server.requests().len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_inspector_reports_gateway_timeout_with_stage() {
    let origin = Device::new(31);
    let message_cid = content_id(0x06);
    let tx = build_tx(
        vec![origin.p2wpkh_input(0)],
        vec![null_data_output(&envelope_payload(
            0x02,
            0x00,
            &reference_tail(0x01, &message_cid),
        ))],
    );
    let txid = tx.compute_txid().to_string();

    let server = TestServer::start(routes(vec![
        (format!("/tx/{}/hex", txid), Route::ok(tx_hex(&tx))),
        (
            format!("/ipfs/{}", message_cid),
            Route::ok("too late").delayed(Duration::from_secs(5)),
        ),
    ]))
    .await;

    let inspector = MessageInspector::new(
        BlockExplorerClient::new(&server.base_url, "tx/:txid/hex", 2_000).unwrap(),
        IpfsGatewayClient::new(&server.base_url, 100).unwrap(),
        JsonOffChainProtocol,
        Network::Bitcoin,
    );

    let err = inspector
        .inspect(&InspectRequest::for_txid(&txid))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::TransportFailure);
    match err {
        InspectError::Transport { stage, source } => {
            assert_eq!(stage, Stage::FetchExternalMessage);
            assert!(source.is_timeout());
        }
        other => panic!("Expected transport error, got {:?}", other),
    }
}
