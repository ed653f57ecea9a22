// src/models/issuer.rs
//! Issuer metadata and persisted issuer records.
//!
//! `IssuerResponse` is the wire shape returned when an introduction URL is
//! resolved; field names follow the Blockcerts issuer document. An
//! `IssuerRecord` is the locally persisted result of a successful
//! introduction: one record per introduction, keyed by the issuer-assigned
//! identifier.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How an issuer requires the introduction to be completed.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IntroductionMethod {
    /// Direct registration against the issuer's introduction endpoint
    #[default]
    #[serde(rename = "basic")]
    Basic,
    /// Registration delegated to a web-based authorization step
    #[serde(rename = "web")]
    WebAuth,
}

/// Issuer metadata resolved from an introduction URL.
///
/// # Example document
/// ```json
/// {
///   "id": "https://issuer.example/issuer.json",
///   "name": "Example Institute",
///   "email": "certs@issuer.example",
///   "url": "https://issuer.example",
///   "introductionURL": "https://issuer.example/intro",
///   "introductionAuthenticationMethod": "basic"
/// }
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct IssuerResponse {
    /// Issuer identifier (canonical URL of the issuer document)
    pub id: String,

    /// Issuer display name
    pub name: String,

    /// Issuer contact address
    pub email: String,

    /// Issuer homepage
    pub url: String,

    /// Endpoint the introduction is registered against
    #[serde(rename = "introductionURL")]
    pub introduction_url: String,

    /// Which introduction method the issuer requires
    #[serde(rename = "introductionAuthenticationMethod", default)]
    pub introduction_method: IntroductionMethod,
}

impl IssuerResponse {
    /// Returns true when the issuer requires web-delegated authorization
    /// before registration can complete.
    pub fn uses_web_auth(&self) -> bool {
        self.introduction_method == IntroductionMethod::WebAuth
    }
}

/// A locally persisted issuer, created on successful introduction.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct IssuerRecord {
    /// Issuer-assigned identifier returned by the registration call
    pub id: String,

    /// The issuer metadata as resolved at introduction time
    pub issuer: IssuerResponse,

    /// The receiving address registered with the issuer
    pub address: String,

    /// When the introduction completed
    pub introduced_at: DateTime<Utc>,
}
