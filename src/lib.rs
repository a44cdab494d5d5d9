//! Client for the on-chain property registry.
//!
//! Register properties, transfer ownership and look up current owners
//! through a wallet provider.

pub mod blockchain;
pub mod config;
pub mod observability;
pub mod registry;

pub use config::RegistryConfig;
pub use registry::{ContractGateway, TransactionLifecycle, WalletSession};
