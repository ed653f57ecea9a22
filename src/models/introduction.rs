// src/models/introduction.rs
//! Introduction request value.
//!
//! The typed intermediate between the two stages of the introduction flow:
//! the three-way join produces one `IntroductionRequest`, and the branch
//! (standard vs. web-delegated) consumes it exactly once. A retry never
//! reuses an instance — a new attempt draws a fresh address and builds a new
//! request.

use serde::{Deserialize, Serialize};

use crate::models::issuer::IssuerResponse;

/// One issuer introduction attempt, ready to be registered.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct IntroductionRequest {
    /// One-time token supplied by the user, round-tripped to the issuer
    /// unchanged
    pub nonce: String,

    /// The freshly generated receiving address at time of request
    pub address: String,

    /// Resolved issuer metadata for the introduction URL
    pub issuer: IssuerResponse,
}

impl IntroductionRequest {
    /// Joins the three resolved inputs into one request.
    pub fn new(address: String, nonce: String, issuer: IssuerResponse) -> Self {
        IntroductionRequest {
            nonce,
            address,
            issuer,
        }
    }
}
