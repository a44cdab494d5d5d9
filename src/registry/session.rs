//! Wallet session: the connected account and its signing capability.
//!
//! The session is shared by handle between the gateway and the lifecycle.
//! It starts empty, is filled by `connect`, and a later `connect` replaces the
//! previous connection outright (last writer wins).

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use alloy::primitives::Address;
use arc_swap::ArcSwapOption;

use crate::observability::metrics;
use crate::registry::error::{ErrorKind, RegistryError, RegistryResult};
use crate::registry::provider::WalletProvider;

/// A successful connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    /// Primary account returned by the provider.
    pub account: Address,
    /// Incremented on every successful connect. Work started under an older
    /// generation was signed by a connection that is no longer current.
    pub generation: u64,
}

/// Connected-account state bound to an optional wallet provider.
pub struct WalletSession<P> {
    provider: Option<Arc<P>>,
    connection: ArcSwapOption<Connection>,
    generation: AtomicU64,
}

impl<P: WalletProvider> WalletSession<P> {
    /// Create an empty session. `None` means no wallet is installed.
    pub fn new(provider: Option<Arc<P>>) -> Self {
        Self {
            provider,
            connection: ArcSwapOption::empty(),
            generation: AtomicU64::new(0),
        }
    }

    /// Request account access from the wallet.
    ///
    /// Suspends until the user answers the wallet prompt.
    pub async fn connect(&self) -> RegistryResult<Address> {
        let provider = self.provider.as_ref().ok_or_else(|| {
            tracing::warn!("connect requested but no wallet provider is present");
            metrics::record_error(ErrorKind::WalletUnavailable);
            RegistryError::WalletUnavailable
        })?;

        let accounts = provider.request_accounts().await.map_err(|raw| {
            let err = RegistryError::from(raw);
            metrics::record_error(err.kind());
            err
        })?;

        let account = accounts.first().copied().ok_or_else(|| {
            let err = RegistryError::Provider("wallet returned no accounts".to_string());
            metrics::record_error(err.kind());
            err
        })?;

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let previous = self
            .connection
            .swap(Some(Arc::new(Connection { account, generation })));

        if let Some(prev) = previous.filter(|prev| prev.account != account) {
            tracing::info!(
                previous = %prev.account,
                account = %account,
                "Wallet account changed"
            );
        }
        tracing::info!(account = %account, generation, "Wallet connected");
        metrics::record_operation("connect", "ok");

        Ok(account)
    }

    /// Current connection, if any.
    pub fn connection(&self) -> Option<Arc<Connection>> {
        self.connection.load_full()
    }

    pub fn account(&self) -> Option<Address> {
        self.connection().map(|c| c.account)
    }

    pub fn is_connected(&self) -> bool {
        self.connection.load().is_some()
    }

    /// True when `generation` is still the live connection.
    pub fn is_current(&self, generation: u64) -> bool {
        self.connection()
            .map(|c| c.generation == generation)
            .unwrap_or(false)
    }

    pub fn provider(&self) -> Option<Arc<P>> {
        self.provider.clone()
    }

    /// The signing provider together with the connection it is bound to.
    pub fn signer(&self) -> RegistryResult<(Arc<P>, Arc<Connection>)> {
        let provider = self
            .provider
            .clone()
            .ok_or(RegistryError::WalletUnavailable)?;
        let connection = self.connection().ok_or_else(RegistryError::not_connected)?;
        Ok((provider, connection))
    }
}

impl<P> std::fmt::Debug for WalletSession<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletSession")
            .field("provider_present", &self.provider.is_some())
            .field("connection", &self.connection.load_full())
            .finish()
    }
}
