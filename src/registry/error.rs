//! Error taxonomy and classification of provider failures.

use serde::Serialize;
use thiserror::Error;

use crate::registry::codec::CodecError;
use crate::registry::provider::{ProviderError, USER_REJECTED_CODE};

/// Closed set of failure classes surfaced to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    UserRejected,
    WalletUnavailable,
    InputInvalid,
    ContractReverted,
    NetworkOrProviderError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::UserRejected => "user_rejected",
            ErrorKind::WalletUnavailable => "wallet_unavailable",
            ErrorKind::InputInvalid => "input_invalid",
            ErrorKind::ContractReverted => "contract_reverted",
            ErrorKind::NetworkOrProviderError => "network_or_provider_error",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur during registry operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Identifier could not be encoded.
    #[error("{0}")]
    Identifier(#[from] CodecError),

    /// Missing field, malformed address or no connected wallet.
    #[error("{0}")]
    InputInvalid(String),

    /// No wallet provider present.
    #[error("no wallet available, install or configure a wallet first")]
    WalletUnavailable,

    /// The user declined a wallet prompt.
    #[error("request rejected in wallet")]
    UserRejected,

    /// The contract rejected the call.
    #[error("contract reverted: {0}")]
    ContractReverted(String),

    /// Any other provider or network failure.
    #[error("{0}")]
    Provider(String),
}

impl RegistryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RegistryError::Identifier(_) | RegistryError::InputInvalid(_) => ErrorKind::InputInvalid,
            RegistryError::WalletUnavailable => ErrorKind::WalletUnavailable,
            RegistryError::UserRejected => ErrorKind::UserRejected,
            RegistryError::ContractReverted(_) => ErrorKind::ContractReverted,
            RegistryError::Provider(_) => ErrorKind::NetworkOrProviderError,
        }
    }

    pub fn not_connected() -> Self {
        RegistryError::InputInvalid("wallet not connected".to_string())
    }

    pub fn missing(field: &str) -> Self {
        RegistryError::InputInvalid(format!("{} is missing", field))
    }
}

impl From<ProviderError> for RegistryError {
    fn from(raw: ProviderError) -> Self {
        classify(&raw)
    }
}

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Classify a raw provider failure.
///
/// Checks the rejection code first, then a provider-supplied short reason,
/// and finally falls back to the raw message.
pub fn classify(raw: &ProviderError) -> RegistryError {
    if raw.code == Some(USER_REJECTED_CODE) {
        return RegistryError::UserRejected;
    }

    if let Some(reason) = raw.short_message.as_deref().map(str::trim) {
        if !reason.is_empty() {
            return RegistryError::ContractReverted(reason.to_string());
        }
    }

    let message = raw.message.trim();
    if message.is_empty() {
        let fallback = match raw.code {
            Some(code) => format!("unknown provider error (code {})", code),
            None => "unknown provider error".to_string(),
        };
        return RegistryError::Provider(fallback);
    }
    RegistryError::Provider(message.to_string())
}
