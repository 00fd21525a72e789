//! Per-region certificate clients and the account they belong to.

use tracing::{info, warn};

use crate::credentials::CredentialSet;
use crate::service::{CertificateService, CloudBackend, IdentityService};

/// Region used when neither the configuration nor the environment names one.
pub const FALLBACK_REGION: &str = "us-east-1";

/// Account label value when the account id cannot be resolved.
pub const UNKNOWN_ACCOUNT: &str = "unknown";

/// Picks the regions to collect from: the configured ones, else the
/// backend's ambient region, else [`FALLBACK_REGION`].
pub fn resolve_regions(configured: &[String], backend: &dyn CloudBackend) -> Vec<String> {
    if !configured.is_empty() {
        return configured.to_vec();
    }
    vec![backend
        .ambient_region()
        .filter(|region| !region.is_empty())
        .unwrap_or_else(|| FALLBACK_REGION.to_string())]
}

/// Clients built from one credential set. Replaced as a whole on refresh.
pub struct RegionalClientSet {
    certificates: Vec<(String, Box<dyn CertificateService>)>,
    identity: Box<dyn IdentityService>,
    account_id: String,
}

impl RegionalClientSet {
    /// Builds one certificate client per region and resolves the account id
    /// through an identity client in the first region.
    ///
    /// An unresolvable account id is logged and reported as
    /// [`UNKNOWN_ACCOUNT`].
    pub fn build(
        backend: &dyn CloudBackend,
        credentials: &CredentialSet,
        regions: &[String],
    ) -> Self {
        let certificates = regions
            .iter()
            .map(|region| {
                info!(region = %region, "initialized certificate client");
                (
                    region.clone(),
                    backend.certificate_client(credentials, region),
                )
            })
            .collect();

        let primary_region = regions
            .first()
            .cloned()
            .or_else(|| backend.ambient_region())
            .unwrap_or_else(|| FALLBACK_REGION.to_string());
        let identity = backend.identity_client(credentials, &primary_region);

        let account_id = match identity.account_id() {
            Ok(account_id) => account_id,
            Err(e) => {
                warn!(region = %primary_region, error = %e, "error getting AWS account id");
                UNKNOWN_ACCOUNT.to_string()
            }
        };

        Self {
            certificates,
            identity,
            account_id,
        }
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    pub fn identity(&self) -> &dyn IdentityService {
        self.identity.as_ref()
    }

    /// Certificate clients in configured region order.
    pub fn regions(&self) -> impl Iterator<Item = (&str, &dyn CertificateService)> {
        self.certificates
            .iter()
            .map(|(region, client)| (region.as_str(), client.as_ref()))
    }
}
