//! Label queries
//!
//! Equality-based label selectors, validated with the same qualified-name
//! rules the API server applies so a malformed selector fails here rather
//! than as an opaque 400 from the cluster.

use super::error::{K8sError, K8sResult};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

static LABEL_NAME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9]([-A-Za-z0-9_.]*[A-Za-z0-9])?$").unwrap()
});

static DNS_SUBDOMAIN_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?(\.[a-z0-9]([-a-z0-9]*[a-z0-9])?)*$").unwrap()
});

const MAX_NAME_LEN: usize = 63;
const MAX_PREFIX_LEN: usize = 253;

/// A validated `k1=v1,k2=v2` label query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelQuery {
    terms: BTreeMap<String, String>,
}

impl LabelQuery {
    /// Query matching a single `key=value` term
    pub fn term(key: &str, value: &str) -> K8sResult<Self> {
        Self::from_pairs([(key, value)])
    }

    /// Query requiring every pair at once
    pub fn from_pairs<'a, I>(pairs: I) -> K8sResult<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut terms = BTreeMap::new();
        for (key, value) in pairs {
            validate_key(key)?;
            validate_value(key, value)?;
            terms.insert(key.to_string(), value.to_string());
        }
        Ok(Self { terms })
    }

    /// Query requiring every entry of a selector map at once
    pub fn from_map(labels: &BTreeMap<String, String>) -> K8sResult<Self> {
        Self::from_pairs(labels.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    }

    /// An empty query matches everything
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Whether an object carrying `labels` satisfies the query
    pub fn matches(&self, labels: &BTreeMap<String, String>) -> bool {
        self.terms
            .iter()
            .all(|(key, value)| labels.get(key) == Some(value))
    }
}

impl std::fmt::Display for LabelQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (key, value) in &self.terms {
            if !first {
                f.write_str(",")?;
            }
            write!(f, "{}={}", key, value)?;
            first = false;
        }
        Ok(())
    }
}

fn validate_key(key: &str) -> K8sResult<()> {
    let (prefix, name) = match key.rsplit_once('/') {
        Some((prefix, name)) => (Some(prefix), name),
        None => (None, key),
    };

    if let Some(prefix) = prefix {
        if prefix.is_empty() || prefix.len() > MAX_PREFIX_LEN || !DNS_SUBDOMAIN_REGEX.is_match(prefix) {
            return Err(K8sError::InvalidSelector(format!(
                "label key '{}' has an invalid prefix",
                key
            )));
        }
    }

    if name.is_empty() || name.len() > MAX_NAME_LEN || !LABEL_NAME_REGEX.is_match(name) {
        return Err(K8sError::InvalidSelector(format!(
            "label key '{}' is not a valid qualified name",
            key
        )));
    }

    Ok(())
}

fn validate_value(key: &str, value: &str) -> K8sResult<()> {
    if value.is_empty() {
        return Ok(());
    }
    if value.len() > MAX_NAME_LEN || !LABEL_NAME_REGEX.is_match(value) {
        return Err(K8sError::InvalidSelector(format!(
            "label value '{}' for key '{}' is invalid",
            value, key
        )));
    }
    Ok(())
}
