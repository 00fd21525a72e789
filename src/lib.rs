//! Prometheus exporter for AWS Certificate Manager certificates.
//!
//! On every scrape the exporter lists the issued certificates of each
//! configured region and exports the days left until each one expires as the
//! `acm_certificate_expiry_duration_days` gauge, labelled with the region,
//! account, certificate id, domain, type, renewal eligibility, export option
//! and any selected certificate tags.
//!
//! ```no_run
//! use std::sync::Arc;
//! use acm_exporter::{aws::AwsBackend, AcmCollector, Config};
//! use prometheus::Registry;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let runtime = tokio::runtime::Runtime::new()?;
//! let backend = AwsBackend::load(runtime.handle().clone());
//! let collector = AcmCollector::new(&Config::default(), Arc::new(backend))?;
//!
//! let registry = Registry::new();
//! collector.register(&registry)?;
//! # Ok(())
//! # }
//! ```

pub mod aws;
pub mod certificate;
pub mod clients;
pub mod collector;
pub mod config;
pub mod credentials;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod server;
pub mod service;
pub mod startup;
pub mod tags;

pub use certificate::CertificateRecord;
pub use collector::AcmCollector;
pub use config::Config;
pub use credentials::{CredentialProvider, CredentialSet, TemporaryCredentials};
pub use error::{
    ConfigError, CredentialErrorCode, CredentialExchangeError, ServiceError, StartupError,
};
pub use metrics::grouping::LabelGroup;
pub use service::{
    CertificatePage, CertificateService, CertificateSummary, CloudBackend, IdentityService, RawTag,
};
pub use tags::TagFilter;
