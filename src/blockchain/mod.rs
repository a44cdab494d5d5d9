//! Blockchain integration: a key-backed wallet provider over JSON-RPC.
//!
//! # Data Flow
//! ```text
//! Environment Variable (private key)
//!     → wallet.rs (key loading)
//!     → rpc.rs (signing, broadcast, calls, receipt polling)
//!     → registry::WalletProvider
//! ```
//!
//! # Security Constraints
//! - Private keys ONLY from environment variables
//! - Never log private keys or sensitive data
//! - Broadcast and read calls have configurable timeouts

pub mod rpc;
pub mod types;
pub mod wallet;

pub use rpc::RpcWalletProvider;
pub use types::{BlockchainError, BlockchainResult};
pub use wallet::Wallet;
