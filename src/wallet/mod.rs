// src/wallet/mod.rs
//! Wallet-side contracts.

pub mod address_source;
