//! [`CloudBackend`] backed by the AWS SDK.
//!
//! The SDK is async; the collector is not. Every call is driven to
//! completion with [`Handle::block_on`], so the backend must be used from a
//! thread that is not itself running async code (the main thread before the
//! server starts, or the blocking pool during a scrape).

use std::time::{Duration, SystemTime};

use aws_config::timeout::TimeoutConfig;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_credential_types::provider::SharedCredentialsProvider;
use aws_credential_types::Credentials;
use aws_sdk_acm::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_acm::primitives::DateTime as AwsDateTime;
use aws_sdk_acm::types::CertificateStatus;
use chrono::{DateTime, Utc};
use tokio::runtime::Handle;

use crate::clients::FALLBACK_REGION;
use crate::credentials::{CredentialSet, TemporaryCredentials};
use crate::error::ServiceError;
use crate::service::{
    CertificatePage, CertificateService, CertificateSummary, CloudBackend, IdentityService, RawTag,
};

/// Upper bound on a single AWS operation, retries included.
static TIMEOUT: u64 = 30;

const PROVIDER_NAME: &str = "acm-exporter-assume-role";

pub struct AwsBackend {
    handle: Handle,
    base: SdkConfig,
}

impl AwsBackend {
    /// Resolves the default AWS configuration (environment, profile,
    /// instance metadata) on `handle`.
    pub fn load(handle: Handle) -> Self {
        let timeouts = TimeoutConfig::builder()
            .operation_timeout(Duration::from_secs(TIMEOUT))
            .build();
        let base = handle.block_on(
            aws_config::defaults(BehaviorVersion::latest())
                .timeout_config(timeouts)
                .load(),
        );
        Self { handle, base }
    }

    fn config_for(&self, credentials: &CredentialSet, region: &str) -> SdkConfig {
        let mut builder = self
            .base
            .to_builder()
            .region(Region::new(region.to_string()));
        if let Some(material) = credentials.material() {
            let static_credentials = Credentials::new(
                material.access_key_id.clone(),
                material.secret_access_key.clone(),
                Some(material.session_token.clone()),
                credentials.expires_at().map(SystemTime::from),
                PROVIDER_NAME,
            );
            builder = builder.credentials_provider(SharedCredentialsProvider::new(static_credentials));
        }
        builder.build()
    }
}

impl CloudBackend for AwsBackend {
    fn ambient_region(&self) -> Option<String> {
        self.base.region().map(|region| region.to_string())
    }

    fn assume_role(
        &self,
        role_arn: &str,
        session_name: &str,
    ) -> Result<CredentialSet, ServiceError> {
        let region = self
            .ambient_region()
            .unwrap_or_else(|| FALLBACK_REGION.to_string());
        let sts = aws_sdk_sts::Client::new(&self.config_for(&CredentialSet::ambient(), &region));

        let output = self
            .handle
            .block_on(
                sts.assume_role()
                    .role_arn(role_arn)
                    .role_session_name(session_name)
                    .send(),
            )
            .map_err(|e| service_error("AssumeRole", e))?;

        let credentials = output.credentials().ok_or_else(|| {
            ServiceError::new("AssumeRole", None, "response did not include credentials")
        })?;
        let expires_at = to_utc(credentials.expiration()).ok_or_else(|| {
            ServiceError::new("AssumeRole", None, "credential expiration out of range")
        })?;

        Ok(CredentialSet::temporary(
            TemporaryCredentials {
                access_key_id: credentials.access_key_id().to_string(),
                secret_access_key: credentials.secret_access_key().to_string(),
                session_token: credentials.session_token().to_string(),
            },
            expires_at,
        ))
    }

    fn certificate_client(
        &self,
        credentials: &CredentialSet,
        region: &str,
    ) -> Box<dyn CertificateService> {
        Box::new(AcmClient {
            handle: self.handle.clone(),
            client: aws_sdk_acm::Client::new(&self.config_for(credentials, region)),
        })
    }

    fn identity_client(
        &self,
        credentials: &CredentialSet,
        region: &str,
    ) -> Box<dyn IdentityService> {
        Box::new(StsClient {
            handle: self.handle.clone(),
            client: aws_sdk_sts::Client::new(&self.config_for(credentials, region)),
        })
    }
}

struct AcmClient {
    handle: Handle,
    client: aws_sdk_acm::Client,
}

impl CertificateService for AcmClient {
    fn list_issued_page(&self, next_token: Option<&str>) -> Result<CertificatePage, ServiceError> {
        let output = self
            .handle
            .block_on(
                self.client
                    .list_certificates()
                    .certificate_statuses(CertificateStatus::Issued)
                    .set_next_token(next_token.map(str::to_string))
                    .send(),
            )
            .map_err(|e| service_error("ListCertificates", e))?;

        Ok(CertificatePage {
            summaries: output
                .certificate_summary_list()
                .iter()
                .map(|summary| CertificateSummary {
                    arn: summary.certificate_arn().map(str::to_string),
                    domain_name: summary.domain_name().map(str::to_string),
                    not_after: summary.not_after().and_then(to_utc),
                    cert_type: summary.r#type().map(|t| t.as_str().to_string()),
                    renewal_eligibility: summary
                        .renewal_eligibility()
                        .map(|r| r.as_str().to_string()),
                    // ACM reports exportability through the `exported` flag
                    export_option: None,
                    exported: summary.exported(),
                })
                .collect(),
            next_token: output.next_token().map(str::to_string),
        })
    }

    fn list_tags(&self, certificate_arn: &str) -> Result<Vec<RawTag>, ServiceError> {
        let output = self
            .handle
            .block_on(
                self.client
                    .list_tags_for_certificate()
                    .certificate_arn(certificate_arn)
                    .send(),
            )
            .map_err(|e| service_error("ListTagsForCertificate", e))?;

        Ok(output
            .tags()
            .iter()
            .map(|tag| RawTag {
                key: tag.key().to_string(),
                value: tag.value().map(str::to_string),
            })
            .collect())
    }
}

struct StsClient {
    handle: Handle,
    client: aws_sdk_sts::Client,
}

impl IdentityService for StsClient {
    fn account_id(&self) -> Result<String, ServiceError> {
        let output = self
            .handle
            .block_on(self.client.get_caller_identity().send())
            .map_err(|e| service_error("GetCallerIdentity", e))?;

        output.account().map(str::to_string).ok_or_else(|| {
            ServiceError::new("GetCallerIdentity", None, "response did not include an account")
        })
    }
}

fn service_error<E, R>(operation: &str, err: SdkError<E, R>) -> ServiceError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    ServiceError::new(
        operation,
        err.code().map(str::to_string),
        DisplayErrorContext(&err).to_string(),
    )
}

fn to_utc(timestamp: &AwsDateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(timestamp.secs(), timestamp.subsec_nanos())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_utc() {
        let converted = to_utc(&AwsDateTime::from_secs(1_767_225_600)).unwrap();
        assert_eq!(converted.to_rfc3339(), "2026-01-01T00:00:00+00:00");

        let converted = to_utc(&AwsDateTime::from_secs_and_nanos(0, 500_000_000)).unwrap();
        assert_eq!(converted.timestamp_subsec_millis(), 500);
    }
}
