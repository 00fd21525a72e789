//! The seam between the collector and the cloud.
//!
//! [`CloudBackend`] builds clients from a [`CredentialSet`]. The collector only
//! ever talks to these traits, so the AWS SDK lives entirely in
//! [`crate::aws`] and tests substitute an in-memory backend.

use chrono::{DateTime, Utc};

use crate::credentials::CredentialSet;
use crate::error::ServiceError;

/// One certificate as listed by the certificate service, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CertificateSummary {
    pub arn: Option<String>,
    pub domain_name: Option<String>,
    pub not_after: Option<DateTime<Utc>>,
    pub cert_type: Option<String>,
    pub renewal_eligibility: Option<String>,
    pub export_option: Option<String>,
    pub exported: Option<bool>,
}

/// One page of a certificate listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CertificatePage {
    pub summaries: Vec<CertificateSummary>,
    /// Token for the next page; `None` on the last page
    pub next_token: Option<String>,
}

/// A tag exactly as the service returns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTag {
    pub key: String,
    pub value: Option<String>,
}

/// Certificate service client bound to one region.
pub trait CertificateService: Send {
    /// Lists one page of certificates in `ISSUED` status.
    fn list_issued_page(&self, next_token: Option<&str>) -> Result<CertificatePage, ServiceError>;

    fn list_tags(&self, certificate_arn: &str) -> Result<Vec<RawTag>, ServiceError>;
}

/// Identity service client, used to resolve the owning account.
pub trait IdentityService: Send {
    fn account_id(&self) -> Result<String, ServiceError>;
}

/// Builds credentials and clients for a cloud provider.
pub trait CloudBackend: Send + Sync {
    /// Region resolved from the environment or profile, if any.
    fn ambient_region(&self) -> Option<String>;

    /// Exchanges the ambient identity for temporary credentials.
    fn assume_role(
        &self,
        role_arn: &str,
        session_name: &str,
    ) -> Result<CredentialSet, ServiceError>;

    fn certificate_client(
        &self,
        credentials: &CredentialSet,
        region: &str,
    ) -> Box<dyn CertificateService>;

    fn identity_client(&self, credentials: &CredentialSet, region: &str)
        -> Box<dyn IdentityService>;
}
