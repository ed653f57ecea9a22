// src/storage/issuer_store.rs
//! Issuer record storage.
//!
//! Provides an in-memory store for issuers the wallet has been introduced
//! to, keyed by the issuer-assigned identifier. One record exists per
//! successful introduction.
//!
//! # Note
//! For production use, consider persisting to secure storage or a database.

use std::collections::HashMap;

use chrono::Utc;

use crate::models::issuer::{IssuerRecord, IssuerResponse};

/// In-memory store of introduced issuers.
///
/// - O(1) average case complexity for insertions and lookups
/// - Overwrites an existing record when the same issuer id is saved again
pub struct IssuerStore {
    /// Internal hashmap storing records by issuer-assigned id
    issuers: HashMap<String, IssuerRecord>,
}

impl IssuerStore {
    /// Creates a new empty IssuerStore instance.
    pub fn new() -> Self {
        IssuerStore {
            issuers: HashMap::new(),
        }
    }

    /// Persists an issuer with its registered receiving address.
    ///
    /// # Arguments
    /// * `id` - Issuer-assigned identifier from the registration call
    /// * `issuer` - The resolved issuer metadata
    /// * `address` - The receiving address registered with the issuer
    ///
    /// # Returns
    /// The stored record's id, for reporting back to the observer.
    pub fn save(&mut self, id: String, issuer: IssuerResponse, address: String) -> String {
        let record = IssuerRecord {
            id: id.clone(),
            issuer,
            address,
            introduced_at: Utc::now(),
        };
        self.issuers.insert(id.clone(), record);
        id
    }

    /// Retrieves an issuer record by its id.
    ///
    /// # Returns
    /// - `Some(&IssuerRecord)` if found
    /// - `None` if no issuer with that id has been introduced
    pub fn get(&self, id: &str) -> Option<&IssuerRecord> {
        self.issuers.get(id)
    }

    /// Checks whether an issuer with the given id has been introduced.
    pub fn contains(&self, id: &str) -> bool {
        self.issuers.contains_key(id)
    }

    /// Returns the number of introduced issuers.
    pub fn count(&self) -> usize {
        self.issuers.len()
    }

    /// Removes an issuer record by its id.
    ///
    /// # Returns
    /// `true` if a record was present and removed, `false` otherwise.
    pub fn remove(&mut self, id: &str) -> bool {
        self.issuers.remove(id).is_some()
    }
}

impl Default for IssuerStore {
    fn default() -> Self {
        Self::new()
    }
}
