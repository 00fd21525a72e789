//! Error types for the certificate exporter.
//!
//! Only [`CredentialExchangeError`] and [`ConfigError`] are fatal, and only at
//! startup. [`ServiceError`] is what every cloud call returns; the collector
//! logs it and carries on with whatever data it could still fetch.

use std::fmt;
use std::str::FromStr;

use strum_macros::{Display, EnumString};
use thiserror::Error;

/// Error returned by a certificate or identity service call.
///
/// Carries the service error code when the backend reports one, so callers can
/// tell rejected credentials apart from any other failure without probing the
/// message text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{operation} failed{}: {message}", CodeSuffix(.code))]
pub struct ServiceError {
    /// Name of the service operation, e.g. `ListCertificates`
    pub operation: String,
    /// Service error code, if the backend reports structured errors
    pub code: Option<String>,
    /// Human readable description of the failure
    pub message: String,
}

impl ServiceError {
    pub fn new(
        operation: impl Into<String>,
        code: Option<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            operation: operation.into(),
            code,
            message: message.into(),
        }
    }

    /// Returns true when the call failed because the credentials were invalid
    /// or expired.
    ///
    /// The error code is matched against [`CredentialErrorCode`]. Backends that
    /// do not report codes fall back to a case-insensitive search of the
    /// message for [`CREDENTIAL_MESSAGE_HINTS`].
    pub fn is_credential_error(&self) -> bool {
        if let Some(code) = self.code.as_deref() {
            return CredentialErrorCode::from_str(code).is_ok();
        }
        let message = self.message.to_ascii_lowercase();
        CREDENTIAL_MESSAGE_HINTS
            .iter()
            .any(|hint| message.contains(hint))
    }
}

struct CodeSuffix<'a>(&'a Option<String>);

impl fmt::Display for CodeSuffix<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(code) => write!(f, " ({})", code),
            None => Ok(()),
        }
    }
}

/// Service error codes that mean the caller's credentials were rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
pub enum CredentialErrorCode {
    ExpiredToken,
    ExpiredTokenException,
    InvalidClientTokenId,
    UnrecognizedClientException,
    InvalidSignatureException,
    SignatureDoesNotMatch,
    AuthFailure,
    RequestExpired,
}

/// Lower-case message fragments that identify a credential failure when the
/// backend does not report an error code.
pub const CREDENTIAL_MESSAGE_HINTS: &[&str] =
    &["security token", "invalid token", "expired", "credentials"];

/// Role assumption failed.
///
/// Fatal when it happens while the collector is being built. During a scrape
/// the collector logs it and keeps its previous clients.
#[derive(Debug, Clone, Error)]
#[error("failed to assume role {role_arn}: {source}")]
pub struct CredentialExchangeError {
    /// The role that could not be assumed
    pub role_arn: String,
    /// The underlying service failure
    #[source]
    pub source: ServiceError,
}

/// Errors that can occur during configuration loading and parsing.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error (file not found, permission denied, etc.)
    #[error("IO Error: {0}")]
    Io(String),
    /// YAML parsing error (invalid syntax, type mismatch, etc.)
    #[error("Parse Error: {0}")]
    Parse(String),
    /// Validation error (invalid values, bad environment overrides, etc.)
    #[error("Validation Error: {0}")]
    Validation(String),
}

/// Errors that stop the exporter before it starts serving.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Credentials(#[from] CredentialExchangeError),
    #[error("failed to register collector: {0}")]
    Registry(#[from] prometheus::Error),
}
