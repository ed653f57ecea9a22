// src/lib.rs

//! # Blockcerts Wallet - Issuer Introduction
//!
//! Holder-side library for establishing trust with a blockchain-anchored
//! credential issuer. It covers two responsibilities:
//!
//! 1. **Certificate contract**: the normalized shape of a verifiable
//!    blockchain certificate (`BlockCert`), independent of wire format and
//!    issuing network.
//! 2. **Issuer introduction**: discovering an issuer from a URL, proving
//!    possession of a fresh receiving address, and registering that address
//!    with the issuer — either directly or through a web-delegated
//!    authorization step.
//!
//! The crate provides no user interface. Presentation intent is emitted as
//! events (`services::issuer_introduction::IntroductionEvent`) for a
//! rendering layer to consume, and external capabilities — address
//! generation, issuer HTTP access, the web authorization agent — are
//! injected through traits.
//!
//! ## Environment Variables
//! - `WALLET_NETWORK`: (Optional) chain network, `mainnet` or `testnet`
//! - `WALLET_HTTP_TIMEOUT_SECS`: (Optional) issuer HTTP timeout in seconds

// Module declarations (organized by functional domain)
pub mod config; // Environment-driven configuration
pub mod errors; // Crate error taxonomy
pub mod models; // Data structures
pub mod services; // Business logic
pub mod storage; // Local persistence layer
pub mod wallet; // Wallet-side contracts
