//! Property registry client core.
//!
//! # Data Flow
//! ```text
//! caller
//!     → lifecycle.rs (state machine, status events)
//!     → gateway.rs (validation, typed contract calls)
//!         → codec.rs (identifier → bytes32)
//!         → contract.rs (ABI encoding)
//!     → session.rs (connected account + signer)
//!     → provider.rs (wallet boundary)
//! failures → error.rs (classification) → status text
//! ```

pub mod codec;
pub mod contract;
pub mod error;
pub mod gateway;
pub mod lifecycle;
pub mod provider;
pub mod session;

pub use codec::{encode, CodecError, OnChainKey};
pub use error::{classify, ErrorKind, RegistryError, RegistryResult};
pub use gateway::{ContractGateway, Operation, TransactionHandle};
pub use lifecycle::{query_owner, Failure, Outcome, StatusEvent, StatusSink, TransactionLifecycle, TxState};
pub use provider::{ContractCall, ProviderError, Receipt, WalletProvider};
pub use session::WalletSession;
