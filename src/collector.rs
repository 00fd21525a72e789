//! The scrape-time collector.
//!
//! [`AcmCollector`] is a [`prometheus::core::Collector`]: every call to
//! `collect` refreshes credentials when they are about to expire, fetches
//! all regions one after another, and rebuilds the metric families from
//! scratch. Nothing is cached between scrapes.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use prometheus::core::{Collector, Desc};
use prometheus::proto::MetricFamily;
use prometheus::Registry;
use tracing::{debug, error, info};

use crate::certificate::{collect_region, CertificateRecord};
use crate::clients::{resolve_regions, RegionalClientSet};
use crate::config::Config;
use crate::credentials::{CredentialProvider, CredentialSet};
use crate::error::CredentialExchangeError;
use crate::metrics::grouping::{group_by_tag_keys, LabelGroup};
use crate::metrics::prom::render_groups;
use crate::service::CloudBackend;
use crate::tags::TagFilter;

struct ScrapeState {
    credentials: CredentialSet,
    clients: RegionalClientSet,
}

struct Inner {
    backend: Arc<dyn CloudBackend>,
    provider: CredentialProvider,
    regions: Vec<String>,
    filter: TagFilter,
    // Held for the whole scrape so concurrent scrapes run one at a time.
    state: Mutex<ScrapeState>,
}

/// Collects ACM certificate expiry metrics on every scrape.
///
/// Cloning is cheap and clones share state.
#[derive(Clone)]
pub struct AcmCollector {
    inner: Arc<Inner>,
}

impl AcmCollector {
    /// Obtains credentials and builds the regional clients.
    ///
    /// # Errors
    ///
    /// Fails when a role is configured and cannot be assumed.
    pub fn new(
        config: &Config,
        backend: Arc<dyn CloudBackend>,
    ) -> Result<Self, CredentialExchangeError> {
        let provider = CredentialProvider::from_config(config);
        let regions = resolve_regions(&config.configured_regions(), backend.as_ref());
        let filter = config.tag_filter();

        let credentials = provider.obtain(backend.as_ref())?;
        let clients = RegionalClientSet::build(backend.as_ref(), &credentials, &regions);

        if !filter.is_unrestricted() {
            let selected: Vec<&str> = filter.selected().collect();
            info!(tags = ?selected, "filtering tags to include only selected keys");
        }
        info!(
            regions = ?regions,
            account = %clients.account_id(),
            "certificate collector ready"
        );

        Ok(Self {
            inner: Arc::new(Inner {
                backend,
                provider,
                regions,
                filter,
                state: Mutex::new(ScrapeState {
                    credentials,
                    clients,
                }),
            }),
        })
    }

    /// Registers this collector with `registry`.
    pub fn register(&self, registry: &Registry) -> prometheus::Result<()> {
        registry.register(Box::new(self.clone()))
    }

    pub fn regions(&self) -> &[String] {
        &self.inner.regions
    }

    /// Runs one scrape and returns the certificates grouped by tag key set.
    pub fn scrape(&self) -> (String, Vec<LabelGroup>) {
        self.scrape_at(Utc::now())
    }

    /// Runs one scrape as of `now`.
    pub fn scrape_at(&self, now: DateTime<Utc>) -> (String, Vec<LabelGroup>) {
        let mut state = self
            .inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        self.refresh_if_needed(&mut state, now);

        let mut records: Vec<CertificateRecord> = Vec::new();
        for (region, client) in state.clients.regions() {
            records.extend(collect_region(client, region, &self.inner.filter, now));
        }
        debug!(certificates = records.len(), "collected certificates");

        (
            state.clients.account_id().to_string(),
            group_by_tag_keys(records),
        )
    }

    fn refresh_if_needed(&self, state: &mut ScrapeState, now: DateTime<Utc>) {
        if !state.credentials.needs_refresh(now) {
            return;
        }

        info!(
            expires_at = ?state.credentials.expires_at(),
            "credentials about to expire, refreshing"
        );
        let backend = self.inner.backend.as_ref();
        match self.inner.provider.obtain(backend) {
            Ok(credentials) => {
                let clients = RegionalClientSet::build(backend, &credentials, &self.inner.regions);
                *state = ScrapeState {
                    credentials,
                    clients,
                };
            }
            Err(e) => {
                error!(error = %e, "credential refresh failed, keeping previous clients");
            }
        }
    }
}

impl Collector for AcmCollector {
    /// The label schema depends on the tags found at scrape time, so no
    /// descriptors are declared up front.
    fn desc(&self) -> Vec<&Desc> {
        Vec::new()
    }

    fn collect(&self) -> Vec<MetricFamily> {
        let (account_id, groups) = self.scrape();
        render_groups(&groups, &account_id)
    }
}
