//! Standard (on-chain) message resolution

use bitcoin::Network;
use catenis_message_inspector::errors::{ErrorKind, InspectError, Stage};
use catenis_message_inspector::offchain::JsonOffChainProtocol;
use catenis_message_inspector::types::{MessageTxType, MessageType};
use catenis_message_inspector::{InspectRequest, MessageInspector};

use crate::common::{
    build_tx, content_id, envelope_payload, null_data_output, reference_tail, Device,
    MockContentSource, MockTransactionSource,
};

type MockInspector = MessageInspector<MockTransactionSource, MockContentSource>;

fn inspector(txs: &MockTransactionSource, content: &MockContentSource) -> MockInspector {
    MessageInspector::new(
        txs.clone(),
        content.clone(),
        JsonOffChainProtocol,
        Network::Bitcoin,
    )
}

#[tokio::test]
async fn test_embedded_send_message_with_read_confirmation() {
    let origin = Device::new(1);
    let target = Device::new(2);
    let tx = build_tx(
        vec![origin.p2wpkh_input(0), origin.p2wpkh_input(1)],
        vec![
            target.p2wpkh_output(),
            target.p2wpkh_output(),
            null_data_output(&envelope_payload(0x01, 0x01, b"Hello")),
            origin.p2wpkh_output(),
        ],
    );
    let txs = MockTransactionSource::with_transactions(&[&tx]);
    let content = MockContentSource::default();

    let txid = tx.compute_txid().to_string();
    let result = inspector(&txs, &content)
        .inspect(&InspectRequest::for_txid(&txid))
        .await
        .unwrap();

    assert_eq!(result.txid.as_deref(), Some(txid.as_str()));
    assert!(result.hex_tx.is_some());
    assert_eq!(result.tx_type, Some(MessageTxType::SendMessage));
    assert_eq!(result.msg_type, Some(MessageType::SendStandardMessage));

    let options = result.msg_options.clone().unwrap();
    assert_eq!(options.embedding, Some(true));
    assert!(!options.encryption);
    assert_eq!(options.padding, Some(false));
    assert_eq!(options.read_confirmation, Some(true));

    let origin_device = result.origin_device.clone().unwrap();
    assert_eq!(
        origin_device.address,
        Some(origin.p2wpkh_address(Network::Bitcoin).to_string())
    );
    assert_eq!(hex::encode(&origin_device.pub_key_hash), origin.pub_key_hash_hex());

    let target_device = result.target_device.clone().unwrap();
    assert_eq!(
        target_device.address,
        Some(target.p2wpkh_address(Network::Bitcoin).to_string())
    );
    assert_eq!(hex::encode(&target_device.pub_key_hash), target.pub_key_hash_hex());

    assert_eq!(result.message_text(), Some("Hello"));
    assert_eq!(result.msg_padding, None);
    assert_eq!(result.message_ref, None);
    assert!(content.requested().is_empty());
}

#[tokio::test]
async fn test_send_message_without_read_confirmation() {
    let origin = Device::new(3);
    let target = Device::new(4);
    let tx = build_tx(
        vec![origin.p2wpkh_input(0), origin.p2pkh_input(1)],
        vec![
            target.p2pkh_output(),
            null_data_output(&envelope_payload(0x01, 0x03, &[0xde, 0xad])),
        ],
    );
    let txs = MockTransactionSource::with_transactions(&[&tx]);

    let result = inspector(&txs, &MockContentSource::default())
        .inspect(&InspectRequest::for_txid(tx.compute_txid().to_string()))
        .await
        .unwrap();

    let options = result.msg_options.unwrap();
    assert!(options.encryption);
    assert_eq!(options.read_confirmation, Some(false));
    assert_eq!(result.message, Some(vec![0xde, 0xad]));
    assert_eq!(
        result.target_device.unwrap().address,
        Some(target.p2pkh_address(Network::Bitcoin).to_string())
    );
}

#[tokio::test]
async fn test_padded_log_message_from_p2pkh_input() {
    let origin = Device::new(5);
    let tx = build_tx(
        vec![origin.p2pkh_input(0)],
        vec![
            null_data_output(&envelope_payload(0x02, 0x05, &[0x02, 0xaa, 0xaa, b'H', b'i'])),
            origin.p2pkh_output(),
        ],
    );
    let txs = MockTransactionSource::with_transactions(&[&tx]);

    let result = inspector(&txs, &MockContentSource::default())
        .inspect(&InspectRequest::for_txid(tx.compute_txid().to_string()))
        .await
        .unwrap();

    assert_eq!(result.tx_type, Some(MessageTxType::LogMessage));
    assert_eq!(result.msg_type, Some(MessageType::LogStandardMessage));
    assert_eq!(result.msg_padding, Some(vec![0xaa, 0xaa]));
    assert_eq!(result.message_text(), Some("Hi"));

    let options = result.msg_options.unwrap();
    assert_eq!(options.padding, Some(true));
    assert_eq!(options.read_confirmation, None);

    assert_eq!(
        result.origin_device.unwrap().address,
        Some(origin.p2pkh_address(Network::Bitcoin).to_string())
    );
    assert_eq!(result.target_device, None);
}

#[tokio::test]
async fn test_external_message_is_fetched_from_ipfs() {
    let origin = Device::new(6);
    let target = Device::new(7);
    let message_cid = content_id(0x31);
    let tx = build_tx(
        vec![origin.p2wpkh_input(0), origin.p2wpkh_input(1)],
        vec![
            target.p2wpkh_output(),
            null_data_output(&envelope_payload(0x01, 0x00, &reference_tail(0x01, &message_cid))),
        ],
    );
    let txs = MockTransactionSource::with_transactions(&[&tx]);
    let content = MockContentSource::default();
    content.insert(&message_cid, b"Stored on IPFS".to_vec());

    let result = inspector(&txs, &content)
        .inspect(&InspectRequest::for_txid(tx.compute_txid().to_string()))
        .await
        .unwrap();

    let provider = result.storage_provider.clone().unwrap();
    assert_eq!(provider.name, "ipfs");
    assert_eq!(provider.version, 1);
    assert_eq!(result.message_ref, Some(message_cid.clone()));
    assert_eq!(result.message_text(), Some("Stored on IPFS"));
    assert_eq!(result.msg_options.unwrap().embedding, Some(false));
    assert_eq!(content.requested(), vec![message_cid]);
}

#[tokio::test]
async fn test_external_message_left_unresolved_on_request() {
    let origin = Device::new(8);
    let message_cid = content_id(0x32);
    let tx = build_tx(
        vec![origin.p2wpkh_input(0)],
        vec![null_data_output(&envelope_payload(
            0x02,
            0x02,
            &reference_tail(0x02, &message_cid),
        ))],
    );
    let txs = MockTransactionSource::with_transactions(&[&tx]);
    let content = MockContentSource::default();

    let request =
        InspectRequest::for_txid(tx.compute_txid().to_string()).without_external_message();
    let result = inspector(&txs, &content).inspect(&request).await.unwrap();

    assert_eq!(result.tx_type, Some(MessageTxType::LogMessage));
    assert_eq!(result.message_ref, Some(message_cid));
    assert_eq!(result.storage_provider.unwrap().version, 2);
    assert_eq!(result.message, None);
    assert!(content.requested().is_empty());
}

#[tokio::test]
async fn test_external_message_fetch_failure_names_stage() {
    let origin = Device::new(9);
    let tx = build_tx(
        vec![origin.p2wpkh_input(0)],
        vec![null_data_output(&envelope_payload(
            0x02,
            0x00,
            &reference_tail(0x01, &content_id(0x33)),
        ))],
    );
    let txs = MockTransactionSource::with_transactions(&[&tx]);

    let err = inspector(&txs, &MockContentSource::default())
        .inspect(&InspectRequest::for_txid(tx.compute_txid().to_string()))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::TransportFailure);
    assert!(matches!(
        err,
        InspectError::Transport {
            stage: Stage::FetchExternalMessage,
            ..
        }
    ));
    assert!(err.to_string().starts_with("Error retrieving external message: [404]"));
}

#[tokio::test]
async fn test_missing_identifiers_do_no_io() {
    let txs = MockTransactionSource::default();
    let content = MockContentSource::default();

    let err = inspector(&txs, &content)
        .inspect(&InspectRequest::default())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::MissingRequiredParameter);
    assert_eq!(txs.calls(), 0);
    assert!(content.requested().is_empty());
}

#[tokio::test]
async fn test_invalid_identifiers_do_no_io() {
    let txs = MockTransactionSource::default();
    let content = MockContentSource::default();
    let inspector = inspector(&txs, &content);

    let err = inspector
        .inspect(&InspectRequest::for_txid("not-a-txid"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);

    let err = inspector
        .inspect(&InspectRequest::for_off_chain_cid("Qm-invalid"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);

    assert_eq!(txs.calls(), 0);
    assert!(content.requested().is_empty());
}

#[tokio::test]
async fn test_unknown_transaction_fails_with_transport_error() {
    let txs = MockTransactionSource::default();

    let err = inspector(&txs, &MockContentSource::default())
        .inspect(&InspectRequest::for_txid("11".repeat(32)))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        InspectError::Transport {
            stage: Stage::FetchTransaction,
            ..
        }
    ));
    assert_eq!(txs.calls(), 1);
}

#[tokio::test]
async fn test_unrecognized_shape() {
    let origin = Device::new(10);
    let tx = build_tx(
        vec![origin.p2wpkh_input(0)],
        vec![origin.p2wpkh_output(), origin.p2wpkh_output()],
    );
    let txs = MockTransactionSource::with_transactions(&[&tx]);

    let err = inspector(&txs, &MockContentSource::default())
        .inspect(&InspectRequest::for_txid(tx.compute_txid().to_string()))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::UnrecognizedTransactionShape);
}

#[tokio::test]
async fn test_malformed_envelope() {
    let origin = Device::new(11);
    let tx = build_tx(
        vec![origin.p2wpkh_input(0)],
        vec![null_data_output(b"XYZ\x02\x01Hello")],
    );
    let txs = MockTransactionSource::with_transactions(&[&tx]);

    let err = inspector(&txs, &MockContentSource::default())
        .inspect(&InspectRequest::for_txid(tx.compute_txid().to_string()))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::MalformedEnvelope);
}

#[tokio::test]
async fn test_settlement_shape_with_send_function_byte() {
    // Single input, null-data first: fits log and settlement shapes but not send
    let origin = Device::new(12);
    let tx = build_tx(
        vec![origin.p2wpkh_input(0)],
        vec![null_data_output(&envelope_payload(0x01, 0x01, b"Hi"))],
    );
    let txs = MockTransactionSource::with_transactions(&[&tx]);

    let err = inspector(&txs, &MockContentSource::default())
        .inspect(&InspectRequest::for_txid(tx.compute_txid().to_string()))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InconsistentFunctionByte);
    assert!(matches!(
        err,
        InspectError::InconsistentFunctionByte { func_byte: 0x01 }
    ));
}

#[tokio::test]
async fn test_each_inspection_returns_a_fresh_result() {
    let origin = Device::new(13);
    let log_tx = build_tx(
        vec![origin.p2wpkh_input(0)],
        vec![null_data_output(&envelope_payload(0x02, 0x01, b"first"))],
    );
    let message_cid = content_id(0x34);
    let external_tx = build_tx(
        vec![origin.p2wpkh_input(1)],
        vec![null_data_output(&envelope_payload(
            0x02,
            0x00,
            &reference_tail(0x01, &message_cid),
        ))],
    );
    let txs = MockTransactionSource::with_transactions(&[&log_tx, &external_tx]);
    let inspector = inspector(&txs, &MockContentSource::default());

    let first = inspector
        .inspect(&InspectRequest::for_txid(log_tx.compute_txid().to_string()))
        .await
        .unwrap();

    let second = inspector
        .inspect(
            &InspectRequest::for_txid(external_tx.compute_txid().to_string())
                .without_external_message(),
        )
        .await
        .unwrap();

    // Nothing from the first inspection leaks into the second
    assert_eq!(second.message, None);
    assert_eq!(second.message_ref, Some(message_cid));

    let again = inspector
        .inspect(&InspectRequest::for_txid(log_tx.compute_txid().to_string()))
        .await
        .unwrap();
    assert_eq!(first, again);
}
