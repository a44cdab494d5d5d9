//! Wallet session and gateway tests.

use std::sync::Arc;

use alloy::primitives::{Address, Bytes};
use alloy::sol_types::SolCall;
use property_registry::registry::contract::getOwnerCall;
use property_registry::registry::{
    encode, query_owner, ContractGateway, ErrorKind, ProviderError, RegistryError, WalletSession,
};

mod common;
use common::*;

#[tokio::test]
async fn test_connect_without_wallet() {
    let session: Arc<WalletSession<ScriptedProvider>> = Arc::new(WalletSession::new(None));

    let err = session.connect().await.unwrap_err();
    assert_eq!(err, RegistryError::WalletUnavailable);
    assert_eq!(err.kind(), ErrorKind::WalletUnavailable);
    assert!(!session.is_connected());

    // Nothing else becomes available.
    let gateway = ContractGateway::new(session, Address::ZERO, 1);
    assert!(gateway.register("Lot-42").await.is_err());
    assert!(gateway.get_owner("Lot-42").await.is_err());
}

#[tokio::test]
async fn test_connect_returns_primary_account() {
    let provider = Arc::new(ScriptedProvider::new().on_connect(Ok(vec![ALICE, BOB])));
    let session = session(provider);

    assert_eq!(session.connect().await.unwrap(), ALICE);
    assert_eq!(session.account(), Some(ALICE));
}

#[tokio::test]
async fn test_connect_rejected_by_user() {
    let provider = Arc::new(ScriptedProvider::new().on_connect(Err(ProviderError::user_rejected())));
    let session = session(provider);

    let err = session.connect().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UserRejected);
    assert!(!session.is_connected());
}

#[tokio::test]
async fn test_connect_with_no_accounts() {
    let provider = Arc::new(ScriptedProvider::new().on_connect(Ok(Vec::new())));
    let session = session(provider);

    let err = session.connect().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NetworkOrProviderError);
}

#[tokio::test]
async fn test_reconnect_replaces_connection() {
    let provider = Arc::new(
        ScriptedProvider::new()
            .on_connect(Ok(vec![ALICE]))
            .on_connect(Ok(vec![BOB])),
    );
    let session = session(provider);

    session.connect().await.unwrap();
    let first = session.connection().unwrap();
    assert!(session.is_current(first.generation));

    session.connect().await.unwrap();
    let second = session.connection().unwrap();
    assert_eq!(second.account, BOB);
    assert!(second.generation > first.generation);
    assert!(!session.is_current(first.generation));
}

#[tokio::test]
async fn test_get_owner() {
    let provider = Arc::new(ScriptedProvider::new());
    let gateway = connected_gateway(provider.clone()).await;

    assert_eq!(gateway.get_owner("Lot-42").await.unwrap(), ALICE);

    let reads = provider.reads.lock().unwrap();
    assert_eq!(reads.len(), 1);
    let decoded = getOwnerCall::abi_decode(&reads[0].input).unwrap();
    assert_eq!(decoded._propertyId, encode("Lot-42").unwrap());
    assert_eq!(provider.sent_count(), 0);
}

#[tokio::test]
async fn test_get_owner_rejects_long_identifier() {
    let provider = Arc::new(ScriptedProvider::new());
    let gateway = connected_gateway(provider.clone()).await;

    let err = gateway.get_owner(&"x".repeat(33)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InputInvalid);
    assert_eq!(provider.read_count(), 0);
}

#[tokio::test]
async fn test_get_owner_requires_connection() {
    let provider = Arc::new(ScriptedProvider::new());
    let gateway = gateway(session(provider.clone()));

    assert_eq!(
        gateway.get_owner("Lot-42").await.unwrap_err(),
        RegistryError::not_connected()
    );
    assert_eq!(provider.read_count(), 0);
}

#[tokio::test]
async fn test_query_owner_classifies_failures() {
    let provider = Arc::new(
        ScriptedProvider::new().with_owner_output(Err(ProviderError::new("").with_code(-32000))),
    );
    let gateway = connected_gateway(provider).await;

    let failure = query_owner(&*gateway, "Lot-42").await.unwrap_err();
    assert_eq!(failure.kind, ErrorKind::NetworkOrProviderError);
    assert!(!failure.message.is_empty());
}

#[tokio::test]
async fn test_query_owner_malformed_response() {
    let provider = Arc::new(ScriptedProvider::new().with_owner_output(Ok(Bytes::from_static(&[1, 2, 3]))));
    let gateway = connected_gateway(provider).await;

    let failure = query_owner(&*gateway, "Lot-42").await.unwrap_err();
    assert_eq!(failure.kind, ErrorKind::NetworkOrProviderError);
    assert!(failure.message.contains("getOwner"));
}

#[tokio::test]
async fn test_register_returns_handle() {
    let provider = Arc::new(ScriptedProvider::new());
    let gateway = connected_gateway(provider).await;

    let handle = gateway.register("Lot-42").await.unwrap();
    assert_eq!(handle.from, ALICE);

    let receipt = gateway.wait_for_confirmation(&handle).await.unwrap();
    assert_eq!(receipt.tx_hash, handle.hash);
    assert!(receipt.success);
}

#[tokio::test]
async fn test_transfer_ownership_validates_address() {
    let provider = Arc::new(ScriptedProvider::new());
    let gateway = connected_gateway(provider.clone()).await;

    let err = gateway
        .transfer_ownership("Lot-42", "0xnot-an-address")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InputInvalid);
    assert_eq!(provider.sent_count(), 0);

    assert!(gateway.transfer_ownership("Lot-42", BOB_HEX).await.is_ok());
    assert_eq!(provider.sent_count(), 1);
}

#[test]
fn test_connect_records_metrics() {
    let recorder = CountingRecorder::default();
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();

    metrics::with_local_recorder(&recorder, || {
        runtime.block_on(async {
            let ok = session(Arc::new(ScriptedProvider::new()));
            ok.connect().await.unwrap();

            let empty = session(Arc::new(ScriptedProvider::new().on_connect(Ok(Vec::new()))));
            empty.connect().await.unwrap_err();
        })
    });

    assert_eq!(
        recorder.count(
            "registry_operations_total",
            &[("operation", "connect"), ("outcome", "ok")]
        ),
        1
    );
    assert_eq!(
        recorder.count("registry_errors_total", &[("kind", "network_or_provider_error")]),
        1
    );
}
