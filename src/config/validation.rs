//! Configuration validation.
//!
//! Returns every problem found rather than stopping at the first one.

use alloy::primitives::Address;
use thiserror::Error;

use crate::config::schema::RegistryConfig;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("network.rpc_url '{url}' is not a valid URL: {reason}")]
    RpcUrl { url: String, reason: String },

    #[error("contract.address '{0}' is not a valid address")]
    ContractAddress(String),

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("observability.log_level '{0}' is not one of trace, debug, info, warn, error")]
    LogLevel(String),
}

pub fn validate_config(config: &RegistryConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(e) = config.network.rpc_url.parse::<url::Url>() {
        errors.push(ValidationError::RpcUrl {
            url: config.network.rpc_url.clone(),
            reason: e.to_string(),
        });
    }

    if config.contract.address.parse::<Address>().is_err() {
        errors.push(ValidationError::ContractAddress(config.contract.address.clone()));
    }

    if config.network.rpc_timeout_secs == 0 {
        errors.push(ValidationError::Zero("network.rpc_timeout_secs"));
    }
    if config.network.confirmations == 0 {
        errors.push(ValidationError::Zero("network.confirmations"));
    }
    if config.network.poll_interval_ms == 0 {
        errors.push(ValidationError::Zero("network.poll_interval_ms"));
    }

    let level = config.observability.log_level.to_lowercase();
    if !["trace", "debug", "info", "warn", "error"].contains(&level.as_str()) {
        errors.push(ValidationError::LogLevel(config.observability.log_level.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&RegistryConfig::default()), Ok(()));
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = RegistryConfig::default();
        config.network.rpc_url = "not a url".to_string();
        config.network.rpc_timeout_secs = 0;
        config.observability.log_level = "loud".to_string();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(matches!(errors[0], ValidationError::RpcUrl { .. }));
        assert_eq!(errors[1], ValidationError::Zero("network.rpc_timeout_secs"));
        assert_eq!(errors[2], ValidationError::LogLevel("loud".to_string()));
    }

    #[test]
    fn test_bad_contract_address() {
        let mut config = RegistryConfig::default();
        config.contract.address = "0x1234".to_string();
        assert_eq!(
            validate_config(&config),
            Err(vec![ValidationError::ContractAddress("0x1234".to_string())])
        );
    }
}
