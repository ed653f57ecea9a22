// src/models/block_cert.rs
//! Blockchain certificate data model.
//!
//! Defines the normalized shape of a verifiable blockchain certificate
//! (`BlockCert`) independent of its wire format or issuing network. Each
//! supported serialization format becomes one struct implementing the same
//! accessor set; format detection and parsing happen at import time and are
//! not modeled here.
//!
//! Certificates are immutable after construction: the trait exposes only
//! accessors and one derived computation, `address`, parameterized by network
//! so the same certificate value works across network contexts without
//! re-issuing.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::CertError;

/// Chain network a certificate address can belong to.
///
/// Serialized in lowercase to match the network labels used in certificate
/// documents.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// The production chain
    Mainnet,
    /// The public test chain
    Testnet,
}

/// A verifiable blockchain certificate, independent of format version.
///
/// Downstream verification code depends on this trait only, so adding a new
/// certificate format means adding one implementation, not touching the
/// verifiers.
///
/// # Invariants
/// - A value is immutable after construction; there are no mutators.
/// - `address` is deterministic: the same network parameter yields the same
///   address on every call, with no I/O.
pub trait BlockCert {
    /// Opaque unique identifier, assigned by the issuer
    fn cert_uid(&self) -> &str;

    /// Display name of the certificate
    fn cert_name(&self) -> &str;

    /// Display description of the certificate
    fn cert_description(&self) -> &str;

    /// Identifier correlating the certificate to an issuer record
    fn issuer_id(&self) -> &str;

    /// Issuance timestamp
    fn issue_date(&self) -> DateTime<Utc>;

    /// Canonical retrieval location for the certificate document
    fn url(&self) -> &str;

    /// The public key the certificate claims belongs to the holder
    fn recipient_public_key(&self) -> &str;

    /// Identifier of the on-chain transaction anchoring this certificate
    fn source_id(&self) -> &str;

    /// The root hash the certificate's inclusion proof must resolve to
    fn merkle_root(&self) -> &str;

    /// Returns the holder's receiving address for the given network.
    ///
    /// # Errors
    /// Returns `CertError::UnsupportedNetwork` if the certificate carries no
    /// address scheme for `network`. The mismatch is surfaced, never
    /// silently defaulted to another network.
    fn address(&self, network: Network) -> Result<String, CertError>;
}

/// A certificate in the v1.2 serialization format.
///
/// v1.2 documents predate multi-network issuance: the recipient address is a
/// single mainnet address embedded in the document, so `address` succeeds
/// only for `Network::Mainnet`.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct BlockCertV12 {
    /// Unique identifier assigned by the issuer
    pub uid: String,
    /// Certificate display name
    pub name: String,
    /// Certificate display description
    pub description: String,
    /// Issuer identifier
    pub issuer_id: String,
    /// Issuance timestamp
    pub issue_date: DateTime<Utc>,
    /// Canonical retrieval URL
    pub url: String,
    /// Holder's public key as claimed by the certificate
    pub recipient_public_key: String,
    /// Anchoring transaction identifier
    pub source_id: String,
    /// Merkle root of the inclusion proof
    pub merkle_root: String,
    /// Mainnet receiving address resolved at import time
    pub recipient_address: String,
}

/// A certificate in the v2.0 serialization format.
///
/// v2.0 documents can be issued against multiple networks; addresses are
/// resolved from the holder's key material at import time and stored per
/// network.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct BlockCertV20 {
    /// Unique identifier assigned by the issuer
    pub uid: String,
    /// Certificate display name
    pub name: String,
    /// Certificate display description
    pub description: String,
    /// Issuer identifier
    pub issuer_id: String,
    /// Issuance timestamp
    pub issue_date: DateTime<Utc>,
    /// Canonical retrieval URL
    pub url: String,
    /// Holder's public key as claimed by the certificate
    pub recipient_public_key: String,
    /// Anchoring transaction identifier
    pub source_id: String,
    /// Merkle root of the inclusion proof
    pub merkle_root: String,
    /// Receiving addresses keyed by network, resolved at import time
    pub recipient_addresses: BTreeMap<Network, String>,
}

impl BlockCert for BlockCertV12 {
    fn cert_uid(&self) -> &str {
        &self.uid
    }

    fn cert_name(&self) -> &str {
        &self.name
    }

    fn cert_description(&self) -> &str {
        &self.description
    }

    fn issuer_id(&self) -> &str {
        &self.issuer_id
    }

    fn issue_date(&self) -> DateTime<Utc> {
        self.issue_date
    }

    fn url(&self) -> &str {
        &self.url
    }

    fn recipient_public_key(&self) -> &str {
        &self.recipient_public_key
    }

    fn source_id(&self) -> &str {
        &self.source_id
    }

    fn merkle_root(&self) -> &str {
        &self.merkle_root
    }

    fn address(&self, network: Network) -> Result<String, CertError> {
        match network {
            Network::Mainnet => Ok(self.recipient_address.clone()),
            other => Err(CertError::UnsupportedNetwork { network: other }),
        }
    }
}

impl BlockCert for BlockCertV20 {
    fn cert_uid(&self) -> &str {
        &self.uid
    }

    fn cert_name(&self) -> &str {
        &self.name
    }

    fn cert_description(&self) -> &str {
        &self.description
    }

    fn issuer_id(&self) -> &str {
        &self.issuer_id
    }

    fn issue_date(&self) -> DateTime<Utc> {
        self.issue_date
    }

    fn url(&self) -> &str {
        &self.url
    }

    fn recipient_public_key(&self) -> &str {
        &self.recipient_public_key
    }

    fn source_id(&self) -> &str {
        &self.source_id
    }

    fn merkle_root(&self) -> &str {
        &self.merkle_root
    }

    fn address(&self, network: Network) -> Result<String, CertError> {
        self.recipient_addresses
            .get(&network)
            .cloned()
            .ok_or(CertError::UnsupportedNetwork { network })
    }
}
