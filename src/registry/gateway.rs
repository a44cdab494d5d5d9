//! Typed facade over the registry contract.
//!
//! # Responsibilities
//! - Validate and encode user input before any wallet round-trip
//! - Submit state-changing calls through the connected session
//! - Query the current owner of a property
//! - Wait for inclusion of submitted transactions

use std::str::FromStr;
use std::sync::Arc;

use alloy::primitives::{Address, TxHash};

use crate::registry::codec::{self, OnChainKey};
use crate::registry::contract;
use crate::registry::error::{RegistryError, RegistryResult};
use crate::registry::provider::{ContractCall, Receipt, WalletProvider};
use crate::registry::session::WalletSession;

/// State-changing operations exposed by the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Register { identifier: String },
    Transfer { identifier: String, new_owner: String },
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Register { .. } => "register",
            Operation::Transfer { .. } => "transfer",
        }
    }

    pub fn identifier(&self) -> &str {
        match self {
            Operation::Register { identifier } | Operation::Transfer { identifier, .. } => identifier,
        }
    }
}

/// A validated call, ready to be signed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedCall {
    pub key: OnChainKey,
    /// Recipient, for transfers.
    pub new_owner: Option<Address>,
    pub call: ContractCall,
}

/// A broadcast transaction awaiting confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionHandle {
    pub hash: TxHash,
    /// Account that signed the transaction.
    pub from: Address,
    /// Session generation the transaction was signed under.
    pub generation: u64,
}

/// Registry contract bound to a wallet session.
pub struct ContractGateway<P> {
    session: Arc<WalletSession<P>>,
    contract: Address,
    confirmations: u32,
}

impl<P: WalletProvider> ContractGateway<P> {
    pub fn new(session: Arc<WalletSession<P>>, contract: Address, confirmations: u32) -> Self {
        Self {
            session,
            contract,
            confirmations: confirmations.max(1),
        }
    }

    pub fn session(&self) -> &Arc<WalletSession<P>> {
        &self.session
    }

    pub fn contract(&self) -> Address {
        self.contract
    }

    /// Validate inputs for `op` without touching the network.
    pub fn prepare(&self, op: &Operation) -> RegistryResult<PreparedCall> {
        if !self.session.is_connected() {
            return Err(RegistryError::not_connected());
        }

        match op {
            Operation::Register { identifier } => {
                let key = encode_identifier(identifier)?;
                Ok(PreparedCall {
                    key,
                    new_owner: None,
                    call: contract::register_property(self.contract, key),
                })
            }
            Operation::Transfer {
                identifier,
                new_owner,
            } => {
                let key = encode_identifier(identifier)?;
                let new_owner = parse_address(new_owner)?;
                Ok(PreparedCall {
                    key,
                    new_owner: Some(new_owner),
                    call: contract::transfer_ownership(self.contract, key, new_owner),
                })
            }
        }
    }

    /// Hand a prepared call to the wallet for signing and broadcast.
    pub async fn submit(&self, prepared: PreparedCall) -> RegistryResult<TransactionHandle> {
        let (provider, connection) = self.session.signer()?;

        tracing::debug!(
            method = prepared.call.method,
            key = %prepared.key,
            from = %connection.account,
            "Submitting contract call"
        );

        let hash = provider
            .send_transaction(connection.account, prepared.call)
            .await?;

        Ok(TransactionHandle {
            hash,
            from: connection.account,
            generation: connection.generation,
        })
    }

    /// Register a new property owned by the connected account.
    pub async fn register(&self, identifier: &str) -> RegistryResult<TransactionHandle> {
        let prepared = self.prepare(&Operation::Register {
            identifier: identifier.to_string(),
        })?;
        self.submit(prepared).await
    }

    /// Transfer a property to `new_owner`.
    pub async fn transfer_ownership(
        &self,
        identifier: &str,
        new_owner: &str,
    ) -> RegistryResult<TransactionHandle> {
        let prepared = self.prepare(&Operation::Transfer {
            identifier: identifier.to_string(),
            new_owner: new_owner.to_string(),
        })?;
        self.submit(prepared).await
    }

    /// Current owner of a property. Read-only.
    pub async fn get_owner(&self, identifier: &str) -> RegistryResult<Address> {
        let (provider, _) = self.session.signer()?;
        let key = encode_identifier(identifier)?;

        let output = provider.call(contract::get_owner(self.contract, key)).await?;
        contract::decode_owner(&output)
            .map_err(|e| RegistryError::Provider(format!("malformed getOwner response: {}", e)))
    }

    /// Wait for a submitted transaction to be included.
    pub async fn wait_for_confirmation(&self, handle: &TransactionHandle) -> RegistryResult<Receipt> {
        // The transaction is already out; a later reconnect must not hide it.
        let provider = self
            .session
            .provider()
            .ok_or(RegistryError::WalletUnavailable)?;

        let receipt = provider
            .wait_for_receipt(handle.hash, self.confirmations)
            .await?;

        if !receipt.success {
            return Err(RegistryError::ContractReverted(
                "transaction reverted on-chain".to_string(),
            ));
        }
        Ok(receipt)
    }
}

fn encode_identifier(identifier: &str) -> RegistryResult<OnChainKey> {
    if identifier.is_empty() {
        return Err(RegistryError::missing("property ID"));
    }
    // Trailing NULs would be indistinguishable from the zero padding.
    if identifier.contains('\0') {
        return Err(RegistryError::InputInvalid(
            "property ID must not contain NUL characters".to_string(),
        ));
    }
    Ok(codec::encode(identifier)?)
}

/// Parse a textual address.
///
/// Mixed-case input must carry a valid EIP-55 checksum.
pub fn parse_address(input: &str) -> RegistryResult<Address> {
    let input = input.trim();
    if input.is_empty() {
        return Err(RegistryError::missing("new owner address"));
    }

    let hex = input.strip_prefix("0x").unwrap_or(input);
    let mixed_case =
        hex.chars().any(|c| c.is_ascii_uppercase()) && hex.chars().any(|c| c.is_ascii_lowercase());

    let parsed = if mixed_case {
        Address::parse_checksummed(format!("0x{}", hex), None).map_err(|e| e.to_string())
    } else {
        Address::from_str(input).map_err(|e| e.to_string())
    };

    parsed.map_err(|e| RegistryError::InputInvalid(format!("invalid address '{}': {}", input, e)))
}
