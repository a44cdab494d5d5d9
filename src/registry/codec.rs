//! Property identifier encoding.
//!
//! Identifiers are stored on-chain as `bytes32`: the UTF-8 bytes of the label,
//! left-aligned and right-padded with zeros. Labels longer than 32 bytes are
//! rejected rather than truncated, since truncation would make distinct
//! labels collide in the contract's storage mapping.

use alloy::primitives::B256;
use thiserror::Error;

/// Width of an on-chain property key in bytes.
pub const KEY_WIDTH: usize = 32;

/// Fixed-width key used by the registry contract.
pub type OnChainKey = B256;

/// Errors produced while encoding an identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// The identifier does not fit into a `bytes32`.
    #[error("property ID is {len} bytes long and exceeds the {KEY_WIDTH}-byte limit")]
    IdentifierTooLong { len: usize },
}

/// Encode a human-readable identifier into its on-chain key.
pub fn encode(identifier: &str) -> Result<OnChainKey, CodecError> {
    let bytes = identifier.as_bytes();
    if bytes.len() > KEY_WIDTH {
        return Err(CodecError::IdentifierTooLong { len: bytes.len() });
    }

    let mut key = [0u8; KEY_WIDTH];
    key[..bytes.len()].copy_from_slice(bytes);
    Ok(B256::from(key))
}
