// src/services/web_auth.rs
//! Delegated authorization boundary.
//!
//! Some issuers require an interactive web-based step (e.g. a hosted login)
//! before registration can complete. The introduction flow hands a
//! fully-formed request to an external agent — typically a web view owned by
//! the presentation layer — and suspends until the agent resolves. Only the
//! result contract is defined here; the page content and its presentation
//! are not this crate's concern.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::IntroductionError;
use crate::models::introduction::IntroductionRequest;

/// Result returned by the delegated authorization agent.
///
/// `address` is present only when `success` is true; a success result
/// without an address is a contract violation and is treated as failure by
/// the introduction flow. A dismissal without any resolution is represented
/// as `success: false`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct WebAuthResult {
    /// Whether the external authorization step completed successfully
    pub success: bool,

    /// The receiving address chosen during the external flow.
    ///
    /// This is not necessarily the address the wallet generated before the
    /// handoff — the flow may choose its own.
    pub address: Option<String>,
}

impl WebAuthResult {
    /// A successful result carrying the address chosen during the flow.
    pub fn succeeded(address: impl Into<String>) -> Self {
        WebAuthResult {
            success: true,
            address: Some(address.into()),
        }
    }

    /// A non-success result, covering both failure and dismissal.
    pub fn dismissed() -> Self {
        WebAuthResult {
            success: false,
            address: None,
        }
    }
}

/// External agent driving the web-based authorization step.
///
/// The returned future is a long-lived suspension point: its duration is
/// bounded only by user interaction. Callers must not hold any exclusive
/// lock across an `authorize` call.
#[async_trait]
pub trait WebAuthAgent: Send + Sync {
    /// Runs the delegated authorization step for the given request.
    ///
    /// # Errors
    /// Implementations should report agent-level failures (e.g. the web view
    /// could not be presented) as `IntroductionError::DelegatedAuthorization`;
    /// an orderly non-success outcome is returned as a `WebAuthResult` with
    /// `success: false`.
    async fn authorize(
        &self,
        request: &IntroductionRequest,
    ) -> Result<WebAuthResult, IntroductionError>;
}
