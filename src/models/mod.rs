// src/models/mod.rs
//! Data structures shared across the wallet.

pub mod block_cert;
pub mod introduction;
pub mod issuer;
