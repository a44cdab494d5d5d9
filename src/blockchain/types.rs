//! Error definitions for the RPC wallet.

use thiserror::Error;

/// Errors raised while setting up the RPC wallet.
#[derive(Debug, Error)]
pub enum BlockchainError {
    /// RPC endpoint could not be used.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// Invalid private key format or derivation error.
    #[error("Wallet error: {0}")]
    Wallet(String),
}

/// Result type for blockchain setup.
pub type BlockchainResult<T> = Result<T, BlockchainError>;
