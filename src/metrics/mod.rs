//! Metric families exported for ACM certificates.
//!
//! Prometheus requires every series in a family to carry the same label
//! names. Certificates carry different tags, so they are partitioned by tag
//! key set and each partition becomes its own family with a complete label
//! schema. No series ever gets an empty label value for a tag it lacks.
//!
//! # Submodules
//!
//! - `grouping` - partitioning records by tag key set
//! - `prom` - rendering partitions as Prometheus metric families

pub mod grouping;
pub mod prom;

/// Name of the exported gauge.
pub const METRIC_NAME: &str = "acm_certificate_expiry_duration_days";

/// Help text of the exported gauge.
pub const METRIC_HELP: &str = "Number of days until ACM certificate expires";

/// Labels every sample carries, in order, before its tag labels.
pub const FIXED_LABELS: [&str; 7] = [
    "region",
    "aws_account",
    "certificate_id",
    "domain",
    "type",
    "renewal_eligibility",
    "export_option",
];
