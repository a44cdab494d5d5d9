//! JSON-RPC wallet provider.
//!
//! # Responsibilities
//! - Sign and broadcast contract calls with the local key
//! - Run read-only calls
//! - Poll for receipts until the requested confirmation depth
//! - Translate alloy errors into provider errors (code + revert reason)
//! - Optionally ask the user to approve each prompt on the terminal

use std::io::Write;
use std::time::Duration;

use alloy::network::{EthereumWallet, TransactionBuilder};
use alloy::primitives::{Address, Bytes, TxHash};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::sol_types::decode_revert_reason;
use alloy::transports::{RpcError, TransportErrorKind};
use tokio::time::{interval, timeout, MissedTickBehavior};

use crate::blockchain::types::{BlockchainError, BlockchainResult};
use crate::blockchain::wallet::Wallet;
use crate::config::NetworkConfig;
use crate::registry::provider::{ContractCall, ProviderError, Receipt, WalletProvider};

/// Message prefix nodes use when a call reverts.
const EXECUTION_REVERTED_PREFIX: &str = "execution reverted";

/// Wallet provider backed by a local key and an HTTP JSON-RPC endpoint.
pub struct RpcWalletProvider {
    provider: DynProvider,
    wallet: Wallet,
    rpc_timeout: Duration,
    poll_interval: Duration,
    confirm_signing: bool,
}

impl RpcWalletProvider {
    /// Build a provider for `network`. No request is sent yet.
    pub fn new(network: &NetworkConfig, wallet: Wallet, confirm_signing: bool) -> BlockchainResult<Self> {
        let url: url::Url = network.rpc_url.parse().map_err(|e| {
            BlockchainError::Rpc(format!("Invalid RPC URL '{}': {}", network.rpc_url, e))
        })?;

        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(wallet.signer().clone()))
            .connect_http(url)
            .erased();

        tracing::info!(
            rpc_url = %network.rpc_url,
            chain_id = network.chain_id,
            address = %wallet.address(),
            "RPC wallet initialized"
        );

        Ok(Self {
            provider,
            wallet,
            rpc_timeout: Duration::from_secs(network.rpc_timeout_secs),
            poll_interval: Duration::from_millis(network.poll_interval_ms),
            confirm_signing,
        })
    }

    /// Ask the user to approve `prompt`. Waits as long as the user needs.
    async fn approve(&self, prompt: String) -> Result<(), ProviderError> {
        if !self.confirm_signing {
            return Ok(());
        }

        let answer = tokio::task::spawn_blocking(move || {
            eprint!("{} [y/N] ", prompt);
            let _ = std::io::stderr().flush();
            let mut line = String::new();
            std::io::stdin().read_line(&mut line).map(|_| line)
        })
        .await;

        match answer {
            Ok(Ok(line)) if is_yes(&line) => Ok(()),
            Ok(Ok(_)) => Err(ProviderError::user_rejected()),
            Ok(Err(e)) => Err(ProviderError::new(format!("failed to read approval: {}", e))),
            Err(e) => Err(ProviderError::new(format!("approval prompt aborted: {}", e))),
        }
    }

    fn timed_out(&self, what: &str) -> ProviderError {
        ProviderError::new(format!(
            "{} timed out after {} seconds",
            what,
            self.rpc_timeout.as_secs()
        ))
    }
}

impl WalletProvider for RpcWalletProvider {
    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError> {
        let chain_id = match timeout(self.rpc_timeout, self.provider.get_chain_id()).await {
            Ok(Ok(id)) => id,
            Ok(Err(e)) => return Err(map_rpc_error(e)),
            Err(_) => return Err(self.timed_out("eth_chainId")),
        };
        if chain_id != self.wallet.chain_id() {
            return Err(ProviderError::new(format!(
                "wallet is configured for chain {} but the RPC endpoint serves chain {}",
                self.wallet.chain_id(),
                chain_id
            )));
        }

        let account = self.wallet.address();
        self.approve(format!("Connect account {}?", account)).await?;
        Ok(vec![account])
    }

    async fn send_transaction(&self, from: Address, call: ContractCall) -> Result<TxHash, ProviderError> {
        if from != self.wallet.address() {
            return Err(ProviderError::new(format!("account {} is not managed by this wallet", from)));
        }

        self.approve(format!("Sign {} on {}?", call.method, call.contract))
            .await?;

        let tx = TransactionRequest::default()
            .with_from(from)
            .with_to(call.contract)
            .with_input(call.input)
            .with_chain_id(self.wallet.chain_id());

        match timeout(self.rpc_timeout, self.provider.send_transaction(tx)).await {
            Ok(Ok(pending)) => {
                let hash = *pending.tx_hash();
                tracing::info!(tx_hash = %hash, method = call.method, "Transaction broadcast");
                Ok(hash)
            }
            Ok(Err(e)) => Err(map_rpc_error(e)),
            Err(_) => Err(self.timed_out("broadcast")),
        }
    }

    async fn call(&self, call: ContractCall) -> Result<Bytes, ProviderError> {
        let tx = TransactionRequest::default()
            .with_to(call.contract)
            .with_input(call.input);

        match timeout(self.rpc_timeout, self.provider.call(tx)).await {
            Ok(Ok(output)) => Ok(output),
            Ok(Err(e)) => Err(map_rpc_error(e)),
            Err(_) => Err(self.timed_out(call.method)),
        }
    }

    async fn wait_for_receipt(&self, tx_hash: TxHash, confirmations: u32) -> Result<Receipt, ProviderError> {
        let mut ticker = interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            let receipt = match self.provider.get_transaction_receipt(tx_hash).await {
                Ok(Some(r)) => r,
                Ok(None) => {
                    tracing::debug!(tx_hash = %tx_hash, "Transaction pending");
                    continue;
                }
                Err(e) => {
                    tracing::warn!(tx_hash = %tx_hash, error = %e, "Receipt poll failed, still waiting");
                    continue;
                }
            };

            let logs = receipt
                .inner
                .logs()
                .iter()
                .map(|log| log.inner.clone())
                .collect();

            let current_block = match self.provider.get_block_number().await {
                Ok(block) => block,
                Err(e) => {
                    tracing::warn!(tx_hash = %tx_hash, error = %e, "Block number poll failed, still waiting");
                    continue;
                }
            };
            let tx_block = receipt.block_number.unwrap_or(current_block);

            if !receipt.status() {
                return Ok(Receipt {
                    tx_hash,
                    block_number: tx_block,
                    success: false,
                    logs,
                });
            }

            let depth = confirmation_depth(current_block, tx_block);
            if depth >= u64::from(confirmations) {
                return Ok(Receipt {
                    tx_hash,
                    block_number: tx_block,
                    success: true,
                    logs,
                });
            }

            tracing::debug!(
                tx_hash = %tx_hash,
                confirmations = depth,
                required = confirmations,
                "Waiting for confirmations"
            );
        }
    }
}

impl std::fmt::Debug for RpcWalletProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcWalletProvider")
            .field("address", &self.wallet.address())
            .field("chain_id", &self.wallet.chain_id())
            .field("timeout_secs", &self.rpc_timeout.as_secs())
            .finish()
    }
}

/// Confirmations of a transaction mined in `tx_block`, seen at `current_block`.
/// The inclusion block itself is the first confirmation.
fn confirmation_depth(current_block: u64, tx_block: u64) -> u64 {
    current_block.saturating_sub(tx_block) + 1
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Convert an alloy RPC failure into a provider error.
///
/// JSON-RPC error responses keep their code; a revert reason is taken from
/// the ABI-encoded revert data, or from an `execution reverted: ...` message.
pub fn map_rpc_error(err: RpcError<TransportErrorKind>) -> ProviderError {
    let Some(payload) = err.as_error_resp() else {
        return ProviderError::new(err.to_string());
    };

    let message = payload.message.to_string();
    let reason = payload
        .as_revert_data()
        .and_then(|data| decode_revert_reason(&data))
        .or_else(|| revert_reason_from_message(&message));

    ProviderError {
        code: Some(payload.code),
        short_message: reason,
        message,
    }
}

fn revert_reason_from_message(message: &str) -> Option<String> {
    let rest = message.strip_prefix(EXECUTION_REVERTED_PREFIX)?;
    let reason = rest.trim_start_matches(':').trim();
    if reason.is_empty() {
        Some(EXECUTION_REVERTED_PREFIX.to_string())
    } else {
        Some(reason.to_string())
    }
}
