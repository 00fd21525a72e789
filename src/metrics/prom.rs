use prometheus::core::Collector;
use prometheus::proto::MetricFamily;
use prometheus::{IntGaugeVec, Opts};
use tracing::error;

use crate::metrics::grouping::LabelGroup;
use crate::metrics::{METRIC_HELP, METRIC_NAME};

/// Renders one label group as a gauge family, one sample per record.
///
/// Fails when the group's label names are not valid Prometheus label names.
/// Records built by tag projection never carry such names.
pub fn render_group(
    group: &LabelGroup,
    account_id: &str,
) -> prometheus::Result<Vec<MetricFamily>> {
    let gauge = IntGaugeVec::new(
        Opts::new(METRIC_NAME, METRIC_HELP),
        &group.label_names(),
    )?;

    for record in &group.records {
        gauge
            .get_metric_with_label_values(&group.label_values(record, account_id))?
            .set(record.days_remaining);
    }

    Ok(gauge.collect())
}

/// Renders every group. A group that cannot be rendered is logged and left
/// out so the others are still exported.
pub fn render_groups(groups: &[LabelGroup], account_id: &str) -> Vec<MetricFamily> {
    let mut families = Vec::with_capacity(groups.len());
    for group in groups {
        match render_group(group, account_id) {
            Ok(rendered) => families.extend(rendered),
            Err(e) => error!(
                labels = ?group.tag_keys,
                certificates = group.records.len(),
                error = %e,
                "failed to render certificate metric family"
            ),
        }
    }
    families
}
