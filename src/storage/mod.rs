// src/storage/mod.rs
//! Local persistence layer.

pub mod issuer_store;
