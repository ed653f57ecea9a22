// src/services/mod.rs
//! Business logic services.

pub mod issuer_directory;
pub mod issuer_introduction;
pub mod web_auth;
