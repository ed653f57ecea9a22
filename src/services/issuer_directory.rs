// src/services/issuer_directory.rs
//! Issuer directory service.
//!
//! Resolves issuer-introduction URLs into issuer metadata and performs the
//! registration call that binds a receiving address to the issuer's records.
//! The `IssuerDirectory` trait is the seam the introduction flow depends on;
//! `HttpIssuerDirectory` is the HTTP implementation used against real
//! issuers.

use async_trait::async_trait;
use log::debug;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::WalletConfig;
use crate::errors::{IntroductionError, RegistrationErrorKind, ResolutionErrorKind};
use crate::models::introduction::IntroductionRequest;
use crate::models::issuer::IssuerResponse;

/// Resolves issuers and registers introductions with them.
#[async_trait]
pub trait IssuerDirectory: Send + Sync {
    /// Resolves an introduction URL into issuer metadata.
    ///
    /// # Errors
    /// Returns `IntroductionError::IssuerResolution` categorized by what the
    /// directory observed: unreachable host, non-success HTTP status, or a
    /// malformed issuer document.
    async fn resolve(&self, url: &str) -> Result<IssuerResponse, IntroductionError>;

    /// Registers an introduction request with its issuer.
    ///
    /// # Returns
    /// The issuer-assigned identifier for the new registration.
    ///
    /// # Errors
    /// Returns `IntroductionError::IssuerRegistration` categorized as bad
    /// request, conflict, or network failure.
    async fn register(&self, request: &IntroductionRequest) -> Result<String, IntroductionError>;
}

/// Wire body POSTed to the issuer's introduction endpoint.
///
/// Field names match what Blockcerts issuers expect.
#[derive(Serialize, Debug)]
struct RegistrationBody<'a> {
    nonce: &'a str,
    #[serde(rename = "bitcoinAddress")]
    bitcoin_address: &'a str,
}

/// Wire body some issuers return from a successful registration.
#[derive(Deserialize, Debug)]
struct RegistrationReply {
    id: String,
}

/// HTTP-backed issuer directory.
pub struct HttpIssuerDirectory {
    /// Shared HTTP client with the configured timeout applied
    client: reqwest::Client,
}

impl HttpIssuerDirectory {
    /// Creates a directory using the wallet's HTTP configuration.
    ///
    /// # Errors
    /// Returns `IntroductionError::IssuerResolution` with a `Network`
    /// category if the underlying HTTP client cannot be constructed.
    pub fn new(config: &WalletConfig) -> Result<Self, IntroductionError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()
            .map_err(|e| IntroductionError::IssuerResolution {
                category: ResolutionErrorKind::Network,
                detail: format!("could not build HTTP client: {}", e),
            })?;
        Ok(HttpIssuerDirectory { client })
    }

    /// Maps a transport-level resolution failure to its error category.
    fn resolution_error(err: reqwest::Error) -> IntroductionError {
        IntroductionError::IssuerResolution {
            category: ResolutionErrorKind::Network,
            detail: err.to_string(),
        }
    }

    /// Maps a registration HTTP status to its error category.
    fn registration_category(status: reqwest::StatusCode) -> RegistrationErrorKind {
        if status == reqwest::StatusCode::CONFLICT {
            RegistrationErrorKind::Conflict
        } else if status.is_client_error() {
            RegistrationErrorKind::BadRequest
        } else {
            RegistrationErrorKind::Network
        }
    }
}

#[async_trait]
impl IssuerDirectory for HttpIssuerDirectory {
    async fn resolve(&self, url: &str) -> Result<IssuerResponse, IntroductionError> {
        debug!("Resolving issuer document at {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(Self::resolution_error)?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(IntroductionError::IssuerResolution {
                category: ResolutionErrorKind::NotFound,
                detail: format!("no issuer document at {}", url),
            });
        }
        if !status.is_success() {
            return Err(IntroductionError::IssuerResolution {
                category: ResolutionErrorKind::Http(status.as_u16()),
                detail: format!("issuer at {} answered {}", url, status),
            });
        }

        response
            .json::<IssuerResponse>()
            .await
            .map_err(|e| IntroductionError::IssuerResolution {
                category: ResolutionErrorKind::Malformed,
                detail: format!("malformed issuer document at {}: {}", url, e),
            })
    }

    async fn register(&self, request: &IntroductionRequest) -> Result<String, IntroductionError> {
        let endpoint = &request.issuer.introduction_url;
        debug!("Registering introduction with issuer at {}", endpoint);

        let body = RegistrationBody {
            nonce: &request.nonce,
            bitcoin_address: &request.address,
        };

        let response = self
            .client
            .post(endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| IntroductionError::IssuerRegistration {
                category: RegistrationErrorKind::Network,
                detail: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(IntroductionError::IssuerRegistration {
                category: Self::registration_category(status),
                detail: format!("issuer at {} answered {}", endpoint, status),
            });
        }

        // Issuers that assign their own identifier return it in the reply
        // body; otherwise the issuer document's id is the record key.
        match response.json::<RegistrationReply>().await {
            Ok(reply) => Ok(reply.id),
            Err(_) => Ok(request.issuer.id.clone()),
        }
    }
}
