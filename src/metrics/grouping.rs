use std::collections::HashMap;

use crate::certificate::CertificateRecord;
use crate::metrics::FIXED_LABELS;

/// Records that share exactly the same tag label names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelGroup {
    /// Tag label names, sorted ascending
    pub tag_keys: Vec<String>,
    pub records: Vec<CertificateRecord>,
}

impl LabelGroup {
    /// The fixed labels followed by the group's tag labels.
    pub fn label_names(&self) -> Vec<&str> {
        FIXED_LABELS
            .iter()
            .copied()
            .chain(self.tag_keys.iter().map(String::as_str))
            .collect()
    }

    /// Label values of one record, in [`LabelGroup::label_names`] order.
    ///
    /// The record must belong to this group.
    pub fn label_values<'a>(
        &'a self,
        record: &'a CertificateRecord,
        account_id: &'a str,
    ) -> Vec<&'a str> {
        let fixed = [
            record.region.as_str(),
            account_id,
            record.certificate_id.as_str(),
            record.domain.as_str(),
            record.cert_type.as_str(),
            record.renewal_eligibility.as_str(),
            record.export_option.as_str(),
        ];
        fixed
            .into_iter()
            .chain(
                self.tag_keys
                    .iter()
                    .map(|key| record.tags.get(key).map_or("", String::as_str)),
            )
            .collect()
    }
}

/// Partitions records by their exact set of tag label names.
///
/// Groups come out in the order their key set was first seen; records keep
/// their input order inside a group. Records without tags share the group
/// with no tag keys.
pub fn group_by_tag_keys(records: Vec<CertificateRecord>) -> Vec<LabelGroup> {
    let mut groups: Vec<LabelGroup> = Vec::new();
    let mut index: HashMap<Vec<String>, usize> = HashMap::new();

    for record in records {
        // BTreeMap keys iterate sorted
        let tag_keys: Vec<String> = record.tags.keys().cloned().collect();
        match index.get(&tag_keys) {
            Some(&position) => groups[position].records.push(record),
            None => {
                index.insert(tag_keys.clone(), groups.len());
                groups.push(LabelGroup {
                    tag_keys,
                    records: vec![record],
                });
            }
        }
    }

    groups
}
