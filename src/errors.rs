// src/errors.rs
//! Error types for the Blockcerts wallet.
//!
//! Defines the error taxonomy shared across the crate. Errors carry enough
//! context (phase plus underlying cause) to tell address-generation problems
//! apart from issuer-side problems, since the user-facing remediation differs
//! (retry vs. check the introduction URL and nonce).

use thiserror::Error;

use crate::models::block_cert::Network;

/// Errors raised by certificate accessors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CertError {
    /// The certificate carries no address scheme for the requested network.
    ///
    /// Surfaced to the caller as-is; a certificate must never silently
    /// default to another network's address.
    #[error("certificate has no address for network {network:?}")]
    UnsupportedNetwork {
        /// The network the caller asked for
        network: Network,
    },
}

/// Categorization of issuer resolution failures.
///
/// Mirrors the HTTP-level distinctions the issuer directory can observe, so
/// callers can distinguish an unreachable issuer from a malformed one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionErrorKind {
    /// No issuer document exists at the introduction URL (HTTP 404)
    NotFound,
    /// The issuer document could not be decoded
    Malformed,
    /// Any other non-success HTTP status, carried verbatim
    Http(u16),
    /// Transport-level failure (DNS, connect, timeout)
    Network,
}

/// Categorization of issuer registration failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationErrorKind {
    /// The issuer rejected the request contents (HTTP 4xx other than 409)
    BadRequest,
    /// The issuer already holds a registration for this identity (HTTP 409)
    Conflict,
    /// Transport-level failure or a 5xx from the issuer
    Network,
}

/// Errors raised during an issuer introduction attempt.
///
/// Each variant corresponds to one phase of the introduction flow:
/// - `InvalidArgument`: caller misuse, not retried
/// - `AddressGeneration` / `IssuerResolution`: join-phase failures,
///   retryable by re-invoking the introduction
/// - `IssuerRegistration`: continuation-phase failure, retryable
/// - `DelegatedAuthorization`: non-success or dismissal from the external
///   agent, retryable only by restarting the whole attempt
#[derive(Error, Debug)]
pub enum IntroductionError {
    /// A precondition the caller was responsible for did not hold.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// The wallet could not produce a fresh receiving address.
    #[error("address generation failed: {0}")]
    AddressGeneration(String),

    /// The issuer's introduction URL could not be resolved to metadata.
    #[error("issuer resolution failed ({category:?}): {detail}")]
    IssuerResolution {
        /// HTTP-style categorization of the failure
        category: ResolutionErrorKind,
        /// Underlying cause, for logs and error dialogs
        detail: String,
    },

    /// The issuer rejected or failed the registration call.
    #[error("issuer registration failed ({category:?}): {detail}")]
    IssuerRegistration {
        /// Categorization of the registration failure
        category: RegistrationErrorKind,
        /// Underlying cause, for logs and error dialogs
        detail: String,
    },

    /// The delegated authorization agent did not return a usable result.
    ///
    /// Covers a non-success result, a dismissal without any result, and the
    /// contract violation of a success result with no receiving address.
    #[error("delegated authorization failed: {0}")]
    DelegatedAuthorization(String),
}

impl IntroductionError {
    /// Returns true when re-invoking the introduction may succeed.
    ///
    /// Everything except caller misuse is retryable; a retry always starts a
    /// whole new attempt with a freshly drawn address.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::InvalidArgument(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_argument_is_not_retryable() {
        assert!(!IntroductionError::InvalidArgument("nonce").is_retryable());
    }

    #[test]
    fn join_and_continuation_failures_are_retryable() {
        assert!(IntroductionError::AddressGeneration("no key material".into()).is_retryable());
        assert!(IntroductionError::IssuerResolution {
            category: ResolutionErrorKind::Network,
            detail: "connection refused".into(),
        }
        .is_retryable());
        assert!(IntroductionError::IssuerRegistration {
            category: RegistrationErrorKind::Conflict,
            detail: "already introduced".into(),
        }
        .is_retryable());
        assert!(IntroductionError::DelegatedAuthorization("dismissed".into()).is_retryable());
    }
}
