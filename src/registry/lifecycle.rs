//! Transaction lifecycle: drives one operation from submission to a terminal
//! state and reports every step to a status sink.
//!
//! # State Machine
//! ```text
//! Idle ──▶ Submitted ──▶ Pending ──▶ Confirmed
//!   │          │            │
//!   └──────────┴────────────┴──────▶ Failed
//! ```
//!
//! Transfers also publish a `RequestSent` notice as soon as a hash exists.
//! The notice is never withdrawn; a later failure is reported by the terminal
//! `Failed` status instead.

use std::sync::Arc;

use alloy::primitives::{Address, TxHash};
use serde::Serialize;
use tokio::sync::mpsc;

use crate::observability::metrics;
use crate::registry::contract;
use crate::registry::error::{ErrorKind, RegistryError};
use crate::registry::gateway::{ContractGateway, Operation};
use crate::registry::provider::WalletProvider;

/// Lifecycle state of a submitted operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TxState {
    Idle,
    Submitted,
    Pending,
    Confirmed,
    Failed,
}

impl TxState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TxState::Confirmed | TxState::Failed)
    }

    /// Whether `next` is a legal successor of `self`.
    pub fn can_advance_to(&self, next: TxState) -> bool {
        matches!(
            (self, next),
            (TxState::Idle, TxState::Submitted)
                | (TxState::Submitted, TxState::Pending)
                | (TxState::Pending, TxState::Confirmed)
                | (TxState::Idle | TxState::Submitted | TxState::Pending, TxState::Failed)
        )
    }
}

impl std::fmt::Display for TxState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TxState::Idle => "idle",
            TxState::Submitted => "submitted",
            TxState::Pending => "pending",
            TxState::Confirmed => "confirmed",
            TxState::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// A classified failure, ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&RegistryError> for Failure {
    fn from(err: &RegistryError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

impl From<RegistryError> for Failure {
    fn from(err: RegistryError) -> Self {
        Failure::from(&err)
    }
}

impl std::fmt::Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Update published to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum StatusEvent {
    /// The operation entered `state`.
    Transition {
        state: TxState,
        message: String,
        tx_hash: Option<TxHash>,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<ErrorKind>,
    },
    /// Optimistic notice that a transfer request is in flight.
    RequestSent { tx_hash: TxHash, new_owner: Address },
}

impl StatusEvent {
    pub fn state(&self) -> Option<TxState> {
        match self {
            StatusEvent::Transition { state, .. } => Some(*state),
            StatusEvent::RequestSent { .. } => None,
        }
    }

    pub fn message(&self) -> String {
        match self {
            StatusEvent::Transition { message, .. } => message.clone(),
            StatusEvent::RequestSent { new_owner, .. } => {
                format!("request sent to new owner {}", new_owner)
            }
        }
    }
}

/// Receiver of lifecycle status updates.
pub trait StatusSink: Send + Sync {
    fn publish(&self, event: StatusEvent);
}

impl<F> StatusSink for F
where
    F: Fn(StatusEvent) + Send + Sync,
{
    fn publish(&self, event: StatusEvent) {
        self(event)
    }
}

impl StatusSink for mpsc::UnboundedSender<StatusEvent> {
    fn publish(&self, event: StatusEvent) {
        // Receiver gone means nobody is watching any more; the transaction
        // itself is unaffected.
        let _ = self.send(event);
    }
}

/// The single operation tracked by a lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub operation: Operation,
    pub hash: Option<TxHash>,
    pub state: TxState,
}

impl Transaction {
    fn new(operation: Operation) -> Self {
        Self {
            operation,
            hash: None,
            state: TxState::Idle,
        }
    }

    fn advance(&mut self, next: TxState) -> bool {
        if !self.state.can_advance_to(next) {
            tracing::error!(from = %self.state, to = %next, "Illegal lifecycle transition ignored");
            return false;
        }
        self.state = next;
        true
    }
}

/// Terminal result of one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Confirmed { tx_hash: TxHash, block_number: u64 },
    Failed { failure: Failure, tx_hash: Option<TxHash> },
}

impl Outcome {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, Outcome::Confirmed { .. })
    }
}

/// Runs state-changing operations of one class, one at a time.
pub struct TransactionLifecycle<P, S> {
    gateway: Arc<ContractGateway<P>>,
    sink: S,
    current: Option<Transaction>,
}

impl<P: WalletProvider, S: StatusSink> TransactionLifecycle<P, S> {
    pub fn new(gateway: Arc<ContractGateway<P>>, sink: S) -> Self {
        Self {
            gateway,
            sink,
            current: None,
        }
    }

    /// The operation currently (or most recently) tracked.
    pub fn current(&self) -> Option<&Transaction> {
        self.current.as_ref()
    }

    /// Drive `op` to a terminal state. Every failure is classified and
    /// reported; nothing is retried.
    pub async fn run(&mut self, op: Operation) -> Outcome {
        let name = op.name();
        // Starting a new operation discards the previous one.
        self.current = Some(Transaction::new(op.clone()));

        let outcome = self.drive(&op).await;
        match &outcome {
            Outcome::Confirmed { tx_hash, block_number } => {
                tracing::info!(operation = name, tx_hash = %tx_hash, block_number, "Operation confirmed");
                metrics::record_operation(name, "confirmed");
            }
            Outcome::Failed { failure, tx_hash } => {
                tracing::warn!(
                    operation = name,
                    kind = %failure.kind,
                    tx_hash = ?tx_hash,
                    error = %failure.message,
                    "Operation failed"
                );
                metrics::record_operation(name, "failed");
                metrics::record_error(failure.kind);
            }
        }
        outcome
    }

    async fn drive(&mut self, op: &Operation) -> Outcome {
        let prepared = match self.gateway.prepare(op) {
            Ok(prepared) => prepared,
            Err(err) => return self.fail(err),
        };
        let new_owner = prepared.new_owner;

        self.transition(TxState::Submitted, "awaiting signature in wallet".to_string());

        let handle = match self.gateway.submit(prepared).await {
            Ok(handle) => handle,
            Err(err) => return self.fail(err),
        };
        if let Some(tx) = self.current.as_mut() {
            tx.hash = Some(handle.hash);
        }

        self.transition(TxState::Pending, "sent, awaiting confirmation".to_string());
        if let Some(new_owner) = new_owner {
            self.sink.publish(StatusEvent::RequestSent {
                tx_hash: handle.hash,
                new_owner,
            });
        }

        let receipt = match self.gateway.wait_for_confirmation(&handle).await {
            Ok(receipt) => receipt,
            Err(err) => return self.fail(err),
        };

        if !self.gateway.session().is_current(handle.generation) {
            tracing::warn!(
                tx_hash = %handle.hash,
                signer = %handle.from,
                "Wallet reconnected while transaction was in flight"
            );
        }

        if let Operation::Transfer { .. } = op {
            for event in contract::transfers_in(self.gateway.contract(), &receipt) {
                tracing::info!(
                    property_id = %event.propertyId,
                    old_owner = %event.oldOwner,
                    new_owner = %event.newOwner,
                    "PropertyTransferred"
                );
            }
        }

        let done = match op {
            Operation::Register { .. } => "property registered",
            Operation::Transfer { .. } => "ownership transferred",
        };
        self.transition(
            TxState::Confirmed,
            format!("confirmed, {}, hash={}", done, handle.hash),
        );

        Outcome::Confirmed {
            tx_hash: handle.hash,
            block_number: receipt.block_number,
        }
    }

    fn transition(&mut self, state: TxState, message: String) {
        let Some(tx) = self.current.as_mut() else {
            return;
        };
        if !tx.advance(state) {
            return;
        }
        let tx_hash = tx.hash;
        self.sink.publish(StatusEvent::Transition {
            state,
            message,
            tx_hash,
            error: None,
        });
    }

    fn fail(&mut self, err: RegistryError) -> Outcome {
        let failure = Failure::from(&err);
        let tx_hash = self.current.as_ref().and_then(|tx| tx.hash);

        if let Some(tx) = self.current.as_mut() {
            if tx.advance(TxState::Failed) {
                self.sink.publish(StatusEvent::Transition {
                    state: TxState::Failed,
                    message: format!("failed: {}", failure.message),
                    tx_hash,
                    error: Some(failure.kind),
                });
            }
        }

        Outcome::Failed { failure, tx_hash }
    }
}

/// Look up the current owner of a property.
///
/// Read-only, so there is no lifecycle: the result is either an address or a
/// classified failure.
pub async fn query_owner<P: WalletProvider>(
    gateway: &ContractGateway<P>,
    identifier: &str,
) -> Result<Address, Failure> {
    match gateway.get_owner(identifier).await {
        Ok(owner) => {
            tracing::debug!(identifier, owner = %owner, "Owner fetched");
            metrics::record_operation("query", "ok");
            Ok(owner)
        }
        Err(err) => {
            tracing::warn!(identifier, error = %err, "Owner lookup failed");
            metrics::record_operation("query", "failed");
            metrics::record_error(err.kind());
            Err(Failure::from(err))
        }
    }
}
