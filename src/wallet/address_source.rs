// src/wallet/address_source.rs
//! Receiving-address supply for the wallet.
//!
//! The introduction flow needs one fresh, previously unused receiving
//! address per attempt. How that address is derived from the wallet's key
//! material is a separate concern; this module only defines the contract the
//! flow depends on.

use async_trait::async_trait;

use crate::errors::IntroductionError;

/// Supplies fresh receiving addresses for the current wallet.
///
/// Implementations must never hand out the same address twice: each call
/// advances the wallet's derivation state.
#[async_trait]
pub trait AddressSource: Send + Sync {
    /// Produces one not-previously-issued receiving address.
    ///
    /// # Errors
    /// Returns `IntroductionError::AddressGeneration` if no key material is
    /// available to derive from.
    async fn fresh_address(&self) -> Result<String, IntroductionError>;
}
