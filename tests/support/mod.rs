//! In-memory cloud backend for driving the collector without AWS.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use acm_exporter::{
    CertificatePage, CertificateService, CertificateSummary, CloudBackend, CredentialSet,
    IdentityService, RawTag, ServiceError, TemporaryCredentials,
};
use chrono::{DateTime, TimeDelta, Utc};

#[derive(Default)]
pub struct FakeRegion {
    pages: Vec<Vec<CertificateSummary>>,
    list_error: Option<ServiceError>,
    tags: HashMap<String, Result<Vec<RawTag>, ServiceError>>,
}

impl FakeRegion {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a page of certificates; pages are served in insertion order.
    pub fn page(mut self, summaries: Vec<CertificateSummary>) -> Self {
        self.pages.push(summaries);
        self
    }

    pub fn failing(mut self, error: ServiceError) -> Self {
        self.list_error = Some(error);
        self
    }

    pub fn tags(mut self, arn: &str, tags: &[(&str, &str)]) -> Self {
        let tags = tags
            .iter()
            .map(|(key, value)| RawTag {
                key: key.to_string(),
                value: Some(value.to_string()),
            })
            .collect();
        self.tags.insert(arn.to_string(), Ok(tags));
        self
    }

    pub fn tags_error(mut self, arn: &str, error: ServiceError) -> Self {
        self.tags.insert(arn.to_string(), Err(error));
        self
    }
}

#[derive(Default)]
struct State {
    regions: HashMap<String, FakeRegion>,
    account: Option<String>,
    ambient_region: Option<String>,
    assume_role: VecDeque<Result<CredentialSet, ServiceError>>,
    calls: Vec<String>,
}

/// Backend whose responses are scripted by the test.
///
/// Every client call is recorded as `"<operation> <region> <access key>"`,
/// where the access key is `ambient` for default credentials.
#[derive(Clone, Default)]
pub struct FakeBackend {
    state: Arc<Mutex<State>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        let backend = Self::default();
        backend.state.lock().unwrap().account = Some("123456789012".to_string());
        backend
    }

    pub fn region(self, name: &str, region: FakeRegion) -> Self {
        self.state
            .lock()
            .unwrap()
            .regions
            .insert(name.to_string(), region);
        self
    }

    pub fn ambient_region(self, name: &str) -> Self {
        self.state.lock().unwrap().ambient_region = Some(name.to_string());
        self
    }

    pub fn without_account(self) -> Self {
        self.state.lock().unwrap().account = None;
        self
    }

    /// Queues the result of the next role assumption.
    pub fn assume_role_result(self, result: Result<CredentialSet, ServiceError>) -> Self {
        self.state.lock().unwrap().assume_role.push_back(result);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    fn record(&self, call: String) {
        self.state.lock().unwrap().calls.push(call);
    }
}

fn access_key(credentials: &CredentialSet) -> String {
    credentials
        .material()
        .map_or_else(|| "ambient".to_string(), |m| m.access_key_id.clone())
}

impl CloudBackend for FakeBackend {
    fn ambient_region(&self) -> Option<String> {
        self.state.lock().unwrap().ambient_region.clone()
    }

    fn assume_role(
        &self,
        role_arn: &str,
        session_name: &str,
    ) -> Result<CredentialSet, ServiceError> {
        self.record(format!("AssumeRole {} {}", role_arn, session_name));
        self.state
            .lock()
            .unwrap()
            .assume_role
            .pop_front()
            .unwrap_or_else(|| Err(ServiceError::new("AssumeRole", None, "no scripted result")))
    }

    fn certificate_client(
        &self,
        credentials: &CredentialSet,
        region: &str,
    ) -> Box<dyn CertificateService> {
        Box::new(FakeAcm {
            backend: self.clone(),
            region: region.to_string(),
            access_key: access_key(credentials),
        })
    }

    fn identity_client(
        &self,
        credentials: &CredentialSet,
        region: &str,
    ) -> Box<dyn IdentityService> {
        Box::new(FakeSts {
            backend: self.clone(),
            region: region.to_string(),
            access_key: access_key(credentials),
        })
    }
}

struct FakeAcm {
    backend: FakeBackend,
    region: String,
    access_key: String,
}

impl CertificateService for FakeAcm {
    fn list_issued_page(&self, next_token: Option<&str>) -> Result<CertificatePage, ServiceError> {
        self.backend.record(format!(
            "ListCertificates {} {} {}",
            self.region,
            self.access_key,
            next_token.unwrap_or("-")
        ));

        let state = self.backend.state.lock().unwrap();
        let Some(region) = state.regions.get(&self.region) else {
            return Ok(CertificatePage::default());
        };
        if let Some(error) = &region.list_error {
            return Err(error.clone());
        }

        let index = next_token
            .and_then(|token| token.strip_prefix("page-"))
            .and_then(|n| n.parse::<usize>().ok())
            .unwrap_or(0);
        let summaries = region.pages.get(index).cloned().unwrap_or_default();
        let next_token = (index + 1 < region.pages.len()).then(|| format!("page-{}", index + 1));
        Ok(CertificatePage {
            summaries,
            next_token,
        })
    }

    fn list_tags(&self, certificate_arn: &str) -> Result<Vec<RawTag>, ServiceError> {
        self.backend.record(format!(
            "ListTagsForCertificate {} {} {}",
            self.region, self.access_key, certificate_arn
        ));

        let state = self.backend.state.lock().unwrap();
        state
            .regions
            .get(&self.region)
            .and_then(|region| region.tags.get(certificate_arn))
            .cloned()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

struct FakeSts {
    backend: FakeBackend,
    region: String,
    access_key: String,
}

impl IdentityService for FakeSts {
    fn account_id(&self) -> Result<String, ServiceError> {
        self.backend.record(format!(
            "GetCallerIdentity {} {}",
            self.region, self.access_key
        ));
        self.backend
            .state
            .lock()
            .unwrap()
            .account
            .clone()
            .ok_or_else(|| ServiceError::new("GetCallerIdentity", None, "access denied"))
    }
}

pub fn certificate(arn: &str, domain: &str, not_after: DateTime<Utc>) -> CertificateSummary {
    CertificateSummary {
        arn: Some(arn.to_string()),
        domain_name: Some(domain.to_string()),
        not_after: Some(not_after),
        cert_type: Some("AMAZON_ISSUED".to_string()),
        renewal_eligibility: Some("ELIGIBLE".to_string()),
        export_option: None,
        exported: Some(false),
    }
}

pub fn arn(region: &str, id: &str) -> String {
    format!("arn:aws:acm:{}:123456789012:certificate/{}", region, id)
}

pub fn temporary_credentials(access_key_id: &str, expires_in: TimeDelta) -> CredentialSet {
    CredentialSet::temporary(
        TemporaryCredentials {
            access_key_id: access_key_id.to_string(),
            secret_access_key: "secret".to_string(),
            session_token: "token".to_string(),
        },
        Utc::now() + expires_in,
    )
}
