//! Fetching certificates from one region and turning them into records.

use std::collections::BTreeMap;

use chrono::{DateTime, TimeDelta, Utc};
use tracing::{debug, error, warn};

use crate::error::ServiceError;
use crate::service::{CertificateService, CertificateSummary};
use crate::tags::TagFilter;

/// A certificate ready to be exported as one sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateRecord {
    pub region: String,
    pub certificate_id: String,
    pub domain: String,
    /// Whole days until expiry, negative once expired
    pub days_remaining: i64,
    pub cert_type: String,
    pub renewal_eligibility: String,
    pub export_option: String,
    /// Label name to value, see [`crate::tags`]
    pub tags: BTreeMap<String, String>,
}

impl CertificateRecord {
    /// Builds a record, or `None` when the summary lacks the ARN, domain or
    /// expiry.
    pub fn from_summary(
        region: &str,
        summary: &CertificateSummary,
        tags: BTreeMap<String, String>,
        now: DateTime<Utc>,
    ) -> Option<Self> {
        let (arn, domain, not_after) = required_fields(summary)?;
        Some(Self {
            region: region.to_string(),
            certificate_id: certificate_id(arn),
            domain: domain.to_string(),
            days_remaining: days_remaining(not_after, now),
            cert_type: summary.cert_type.clone().unwrap_or_default(),
            renewal_eligibility: summary.renewal_eligibility.clone().unwrap_or_default(),
            export_option: export_option(summary),
            tags,
        })
    }
}

fn required_fields(summary: &CertificateSummary) -> Option<(&str, &str, DateTime<Utc>)> {
    let arn = summary.arn.as_deref().filter(|arn| !arn.is_empty())?;
    let domain = summary
        .domain_name
        .as_deref()
        .filter(|domain| !domain.is_empty())?;
    Some((arn, domain, summary.not_after?))
}

/// Extracts the certificate id from its ARN.
///
/// `arn:aws:acm:us-east-1:123456789012:certificate/abcd` yields `abcd`. ARNs
/// without a `/` yield the part after the last `:`.
pub fn certificate_id(arn: &str) -> String {
    let id = match arn.rsplit_once('/') {
        Some((_, id)) => id,
        None => arn.rsplit_once(':').map_or(arn, |(_, id)| id),
    };
    id.to_string()
}

/// Whole days from `now` until `not_after`, rounded toward negative infinity.
///
/// A certificate that expired an hour ago has `-1` days remaining.
pub fn days_remaining(not_after: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let delta = not_after - now;
    let days = delta.num_days();
    // num_days truncates toward zero
    if delta < TimeDelta::days(days) {
        days - 1
    } else {
        days
    }
}

/// The export option label: the service value when present, otherwise
/// derived from the `exported` flag.
pub fn export_option(summary: &CertificateSummary) -> String {
    if let Some(option) = summary.export_option.as_deref().filter(|o| !o.is_empty()) {
        return option.to_string();
    }
    match summary.exported {
        Some(true) => "EXPORTED".to_string(),
        Some(false) => "NOT_EXPORTED".to_string(),
        None => String::new(),
    }
}

/// Lists every issued certificate in a region, following pagination to the
/// last page.
///
/// # Errors
///
/// Fails when a page fails, or when the service hands back the token it was
/// just given.
pub fn fetch_region(
    client: &dyn CertificateService,
    region: &str,
) -> Result<Vec<CertificateSummary>, ServiceError> {
    let mut summaries = Vec::new();
    let mut next_token: Option<String> = None;
    let mut pages = 0usize;
    loop {
        let page = client.list_issued_page(next_token.as_deref())?;
        pages += 1;
        summaries.extend(page.summaries);
        match page.next_token {
            Some(token) if !token.is_empty() => {
                if next_token.as_deref() == Some(token.as_str()) {
                    return Err(ServiceError::new(
                        "ListCertificates",
                        None,
                        format!("pagination token {} repeated after {} pages", token, pages),
                    ));
                }
                next_token = Some(token);
            }
            _ => break,
        }
    }
    debug!(region, pages, certificates = summaries.len(), "listed certificates");
    Ok(summaries)
}

/// Fetches and projects the tags of one certificate. Failures are logged and
/// yield no tags.
pub fn fetch_tags(
    client: &dyn CertificateService,
    region: &str,
    arn: &str,
    filter: &TagFilter,
) -> BTreeMap<String, String> {
    match client.list_tags(arn) {
        Ok(tags) => filter.project(&tags),
        Err(e) => {
            warn!(region, arn, error = %e, "error fetching tags for certificate");
            BTreeMap::new()
        }
    }
}

/// Collects the records of one region.
///
/// A listing failure is logged and yields no records so the other regions
/// can still be exported.
pub fn collect_region(
    client: &dyn CertificateService,
    region: &str,
    filter: &TagFilter,
    now: DateTime<Utc>,
) -> Vec<CertificateRecord> {
    let summaries = match fetch_region(client, region) {
        Ok(summaries) => summaries,
        Err(e) if e.is_credential_error() => {
            error!(
                region,
                error = %e,
                "credentials rejected while listing certificates, skipping region"
            );
            return Vec::new();
        }
        Err(e) => {
            error!(region, error = %e, "error listing certificates, skipping region");
            return Vec::new();
        }
    };

    summaries
        .iter()
        .filter_map(|summary| {
            let Some((arn, _, _)) = required_fields(summary) else {
                debug!(region, arn = ?summary.arn, "skipping certificate with missing fields");
                return None;
            };
            let tags = fetch_tags(client, region, arn, filter);
            CertificateRecord::from_summary(region, summary, tags, now)
        })
        .collect()
}
