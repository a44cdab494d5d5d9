//! Shared utilities for integration tests: a wallet provider driven by a
//! script instead of a real key and node.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::{Arc, Mutex};

use alloy::primitives::{address, Address, Bytes, Log, TxHash};
use alloy::sol_types::SolValue;
use metrics::{Counter, Gauge, Histogram, Key, KeyName, Metadata, Recorder, SharedString, Unit};
use tokio::sync::mpsc;

use property_registry::registry::{
    ContractCall, ContractGateway, ProviderError, Receipt, StatusEvent, TxState, WalletProvider,
    WalletSession,
};
use property_registry::registry::contract::DEFAULT_CONTRACT_ADDRESS;

pub const ALICE: Address = address!("00000000000000000000000000000000000a11ce");
pub const BOB: Address = address!("0000000000000000000000000000000000000b0b");
pub const BOB_HEX: &str = "0x0000000000000000000000000000000000000b0b";

/// What `wait_for_receipt` reports.
#[derive(Debug, Clone)]
pub enum ReceiptScript {
    Success(Vec<Log>),
    Reverted,
    Error(ProviderError),
}

pub struct ScriptedProvider {
    connects: Mutex<VecDeque<Result<Vec<Address>, ProviderError>>>,
    send_error: Mutex<Option<ProviderError>>,
    owner: Mutex<Result<Bytes, ProviderError>>,
    receipt: Mutex<ReceiptScript>,
    next_hash: AtomicU8,
    pub sent: Mutex<Vec<(Address, ContractCall)>>,
    pub reads: Mutex<Vec<ContractCall>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self {
            connects: Mutex::new(VecDeque::new()),
            send_error: Mutex::new(None),
            owner: Mutex::new(Ok(Bytes::from(ALICE.abi_encode()))),
            receipt: Mutex::new(ReceiptScript::Success(Vec::new())),
            next_hash: AtomicU8::new(1),
            sent: Mutex::new(Vec::new()),
            reads: Mutex::new(Vec::new()),
        }
    }

    /// Queue the answer to the next account request.
    pub fn on_connect(self, answer: Result<Vec<Address>, ProviderError>) -> Self {
        self.connects.lock().unwrap().push_back(answer);
        self
    }

    pub fn failing_send(self, err: ProviderError) -> Self {
        *self.send_error.lock().unwrap() = Some(err);
        self
    }

    pub fn with_receipt(self, script: ReceiptScript) -> Self {
        *self.receipt.lock().unwrap() = script;
        self
    }

    pub fn with_owner_output(self, output: Result<Bytes, ProviderError>) -> Self {
        *self.owner.lock().unwrap() = output;
        self
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn read_count(&self) -> usize {
        self.reads.lock().unwrap().len()
    }
}

impl WalletProvider for ScriptedProvider {
    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError> {
        let queued = self.connects.lock().unwrap().pop_front();
        queued.unwrap_or_else(|| Ok(vec![ALICE]))
    }

    async fn send_transaction(&self, from: Address, call: ContractCall) -> Result<TxHash, ProviderError> {
        self.sent.lock().unwrap().push((from, call));
        if let Some(err) = self.send_error.lock().unwrap().clone() {
            return Err(err);
        }
        Ok(TxHash::repeat_byte(self.next_hash.fetch_add(1, Ordering::SeqCst)))
    }

    async fn call(&self, call: ContractCall) -> Result<Bytes, ProviderError> {
        self.reads.lock().unwrap().push(call);
        self.owner.lock().unwrap().clone()
    }

    async fn wait_for_receipt(&self, tx_hash: TxHash, _confirmations: u32) -> Result<Receipt, ProviderError> {
        let script = self.receipt.lock().unwrap().clone();
        match script {
            ReceiptScript::Success(logs) => Ok(Receipt {
                tx_hash,
                block_number: 42,
                success: true,
                logs,
            }),
            ReceiptScript::Reverted => Ok(Receipt {
                tx_hash,
                block_number: 42,
                success: false,
                logs: Vec::new(),
            }),
            ReceiptScript::Error(err) => Err(err),
        }
    }
}

/// Session over `provider`, not yet connected.
pub fn session(provider: Arc<ScriptedProvider>) -> Arc<WalletSession<ScriptedProvider>> {
    Arc::new(WalletSession::new(Some(provider)))
}

pub fn gateway(session: Arc<WalletSession<ScriptedProvider>>) -> Arc<ContractGateway<ScriptedProvider>> {
    Arc::new(ContractGateway::new(session, DEFAULT_CONTRACT_ADDRESS, 1))
}

/// Gateway whose session has already connected.
pub async fn connected_gateway(provider: Arc<ScriptedProvider>) -> Arc<ContractGateway<ScriptedProvider>> {
    let session = session(provider);
    session.connect().await.unwrap();
    gateway(session)
}

pub fn recording_sink() -> (mpsc::UnboundedSender<StatusEvent>, mpsc::UnboundedReceiver<StatusEvent>) {
    mpsc::unbounded_channel()
}

pub fn drain(rx: &mut mpsc::UnboundedReceiver<StatusEvent>) -> Vec<StatusEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

pub fn states(events: &[StatusEvent]) -> Vec<TxState> {
    events.iter().filter_map(StatusEvent::state).collect()
}

pub fn request_sent_count(events: &[StatusEvent]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, StatusEvent::RequestSent { .. }))
        .count()
}

/// Recorder that keeps counter values in memory.
#[derive(Default)]
pub struct CountingRecorder {
    counters: Mutex<Vec<(Key, Arc<AtomicU64>)>>,
}

impl CountingRecorder {
    /// Sum of all `name` counters carrying every label in `labels`.
    pub fn count(&self, name: &str, labels: &[(&str, &str)]) -> u64 {
        self.counters
            .lock()
            .unwrap()
            .iter()
            .filter(|(key, _)| key.name() == name)
            .filter(|(key, _)| {
                labels
                    .iter()
                    .all(|(k, v)| key.labels().any(|l| l.key() == *k && l.value() == *v))
            })
            .map(|(_, value)| value.load(Ordering::SeqCst))
            .sum()
    }
}

impl Recorder for CountingRecorder {
    fn describe_counter(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}
    fn describe_gauge(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}
    fn describe_histogram(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}

    fn register_counter(&self, key: &Key, _: &Metadata<'_>) -> Counter {
        let mut counters = self.counters.lock().unwrap();
        if let Some((_, value)) = counters.iter().find(|(k, _)| k == key) {
            return Counter::from_arc(value.clone());
        }
        let value = Arc::new(AtomicU64::new(0));
        counters.push((key.clone(), value.clone()));
        Counter::from_arc(value)
    }

    fn register_gauge(&self, _: &Key, _: &Metadata<'_>) -> Gauge {
        Gauge::noop()
    }

    fn register_histogram(&self, _: &Key, _: &Metadata<'_>) -> Histogram {
        Histogram::noop()
    }
}
