//! Wallet provider boundary.
//!
//! A `WalletProvider` is whatever holds the user's keys: it hands out
//! authorized accounts, signs and broadcasts contract calls, answers read-only
//! calls and reports inclusion of submitted transactions. The registry core
//! only talks to the chain through this trait.

use std::future::Future;

use alloy::primitives::{Address, Bytes, Log, TxHash};

/// Provider error code reserved for "user declined the request".
pub const USER_REJECTED_CODE: i64 = 4001;

/// A call to a named method of a deployed contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractCall {
    /// Contract address.
    pub contract: Address,
    /// Solidity method name, used for prompts and logging.
    pub method: &'static str,
    /// ABI-encoded calldata (selector + arguments).
    pub input: Bytes,
}

/// Inclusion report for a broadcast transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub tx_hash: TxHash,
    pub block_number: u64,
    /// `false` when the transaction was mined but reverted.
    pub success: bool,
    pub logs: Vec<Log>,
}

/// Raw failure reported by a wallet provider.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderError {
    /// Numeric code (EIP-1193 / JSON-RPC), if the provider supplied one.
    pub code: Option<i64>,
    /// Short human-readable reason, e.g. a decoded revert string.
    pub short_message: Option<String>,
    /// Full raw message.
    pub message: String,
}

impl ProviderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn with_code(mut self, code: i64) -> Self {
        self.code = Some(code);
        self
    }

    pub fn with_short_message(mut self, reason: impl Into<String>) -> Self {
        self.short_message = Some(reason.into());
        self
    }

    /// The error a provider reports when the user dismisses a prompt.
    pub fn user_rejected() -> Self {
        Self::new("User rejected the request.").with_code(USER_REJECTED_CODE)
    }
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.code {
            Some(code) => write!(f, "provider error {}: {}", code, self.message),
            None => write!(f, "provider error: {}", self.message),
        }
    }
}

impl std::error::Error for ProviderError {}

/// Key-custody backend able to authorize accounts and sign contract calls.
///
/// Every method may suspend for as long as the backend needs, including
/// waiting on a human to approve a prompt.
pub trait WalletProvider: Send + Sync {
    /// Ask for account access. The first address is the primary account.
    fn request_accounts(&self) -> impl Future<Output = Result<Vec<Address>, ProviderError>> + Send;

    /// Sign and broadcast a state-changing call, returning its hash.
    fn send_transaction(
        &self,
        from: Address,
        call: ContractCall,
    ) -> impl Future<Output = Result<TxHash, ProviderError>> + Send;

    /// Execute a read-only call against the latest state.
    fn call(&self, call: ContractCall) -> impl Future<Output = Result<Bytes, ProviderError>> + Send;

    /// Wait until `tx_hash` is included with at least `confirmations` blocks.
    fn wait_for_receipt(
        &self,
        tx_hash: TxHash,
        confirmations: u32,
    ) -> impl Future<Output = Result<Receipt, ProviderError>> + Send;
}
