//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → CLI overrides
//!     → validation.rs (semantic checks)
//!     → RegistryConfig (validated, immutable)
//! ```
//!
//! All fields have defaults, so running without a file targets the deployed
//! registry on a local node. The signing key is never read from the file.

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{ContractConfig, NetworkConfig, ObservabilityConfig, RegistryConfig, WalletConfig};
