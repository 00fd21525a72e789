//! Credentials the exporter signs its requests with.

use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use tracing::info;

use crate::config::Config;
use crate::error::CredentialExchangeError;
use crate::service::CloudBackend;

/// How long before expiry a scrape replaces temporary credentials.
pub const REFRESH_MARGIN: TimeDelta = TimeDelta::minutes(5);

/// Key material for temporary credentials. `Debug` never prints secrets.
#[derive(Clone, PartialEq, Eq)]
pub struct TemporaryCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: String,
}

impl fmt::Debug for TemporaryCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemporaryCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"** redacted **")
            .field("session_token", &"** redacted **")
            .finish()
    }
}

/// The credentials currently in use.
///
/// Without material the backend's default credential chain is used and the
/// set never expires.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CredentialSet {
    material: Option<TemporaryCredentials>,
    expires_at: Option<DateTime<Utc>>,
}

impl CredentialSet {
    pub fn ambient() -> Self {
        Self::default()
    }

    pub fn temporary(material: TemporaryCredentials, expires_at: DateTime<Utc>) -> Self {
        Self {
            material: Some(material),
            expires_at: Some(expires_at),
        }
    }

    pub fn material(&self) -> Option<&TemporaryCredentials> {
        self.material.as_ref()
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// True once `now` is within [`REFRESH_MARGIN`] of the expiry.
    pub fn needs_refresh(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires_at) => now >= expires_at - REFRESH_MARGIN,
            None => false,
        }
    }
}

/// Obtains credentials, assuming a role when one is configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialProvider {
    role_arn: Option<String>,
    session_name: String,
}

impl CredentialProvider {
    pub fn new(role_arn: Option<String>, session_name: impl Into<String>) -> Self {
        Self {
            role_arn,
            session_name: session_name.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.role_arn().map(str::to_string), config.session_name())
    }

    pub fn role_arn(&self) -> Option<&str> {
        self.role_arn.as_deref()
    }

    /// Returns ambient credentials, or the temporary credentials of the
    /// configured role.
    pub fn obtain(
        &self,
        backend: &dyn CloudBackend,
    ) -> Result<CredentialSet, CredentialExchangeError> {
        let Some(role_arn) = self.role_arn.as_deref() else {
            return Ok(CredentialSet::ambient());
        };

        let credentials = backend
            .assume_role(role_arn, &self.session_name)
            .map_err(|source| CredentialExchangeError {
                role_arn: role_arn.to_string(),
                source,
            })?;

        match credentials.expires_at() {
            Some(expires_at) => info!(
                role_arn,
                session = %self.session_name,
                expires_at = %expires_at.to_rfc3339(),
                "assumed role"
            ),
            None => info!(role_arn, session = %self.session_name, "assumed role"),
        }

        Ok(credentials)
    }
}
