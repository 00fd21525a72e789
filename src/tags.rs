//! Projection of certificate tags into Prometheus label names and values.

use std::collections::{BTreeMap, BTreeSet};

use tracing::warn;

use crate::service::RawTag;

/// Prefix that marks a label as coming from a certificate tag.
pub const TAG_LABEL_PREFIX: &str = "tags_";

/// Allow-list of tag keys to export.
///
/// Keys are matched exactly and case-sensitively. An empty allow-list exports
/// every tag with a non-empty value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagFilter {
    selected: BTreeSet<String>,
}

impl TagFilter {
    /// Builds a filter from configured tag keys. Entries are trimmed and
    /// blank entries dropped.
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let selected = keys
            .into_iter()
            .map(|key| key.as_ref().trim().to_string())
            .filter(|key| !key.is_empty())
            .collect();
        Self { selected }
    }

    pub fn is_unrestricted(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn allows(&self, key: &str) -> bool {
        self.is_unrestricted() || self.selected.contains(key)
    }

    pub fn selected(&self) -> impl Iterator<Item = &str> {
        self.selected.iter().map(String::as_str)
    }

    /// Turns the raw tags of one certificate into label key/value pairs.
    ///
    /// A tag is kept when its trimmed key and trimmed value are both non-empty
    /// and the filter allows the key exactly as the service reported it. Tags
    /// whose label name Prometheus would reject (`aws:cloudformation:stack-name`,
    /// `kubernetes.io/cluster`) are logged and dropped; the certificate keeps
    /// its other tags. When two keys normalize to the same label, the later
    /// tag wins.
    pub fn project(&self, tags: &[RawTag]) -> BTreeMap<String, String> {
        let mut labels = BTreeMap::new();
        for tag in tags {
            let key = tag.key.trim();
            let value = tag.value.as_deref().map(str::trim).unwrap_or_default();
            if key.is_empty() || value.is_empty() {
                continue;
            }
            // Matched as reported by the service, before trimming.
            if !self.allows(&tag.key) {
                continue;
            }
            let name = label_name(key);
            if !is_valid_label_name(&name) {
                warn!(tag = %tag.key, label = %name, "tag key is not a valid label name, skipping tag");
                continue;
            }
            labels.insert(name, value.to_string());
        }
        labels
    }
}

/// Normalizes a tag key into a label name: trimmed, `-` replaced by `_`, and
/// prefixed with [`TAG_LABEL_PREFIX`]. Case is kept.
///
/// The prefix is always added, so `tags_env` becomes `tags_tags_env`.
pub fn label_name(tag_key: &str) -> String {
    format!("{}{}", TAG_LABEL_PREFIX, tag_key.trim().replace('-', "_"))
}

/// Whether `name` matches `[a-zA-Z_][a-zA-Z0-9_]*`.
pub fn is_valid_label_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
