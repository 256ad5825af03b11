//! Per-step log variables

use serde::Serialize;
use std::collections::BTreeMap;

/// Metric name → scalar, produced once per training step
///
/// Keys appear only for branches that ran. An absent key means "not updated
/// this step", never zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct LogRecord {
    values: BTreeMap<String, f64>,
}

impl LogRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: f64) {
        self.values.insert(key.into(), value);
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: f64) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.values.get(key).copied()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Merge another record into this one; keys from `other` win
    pub fn merge(&mut self, other: LogRecord) {
        self.values.extend(other.values);
    }

    /// Key-wise mean over several records
    ///
    /// A key is averaged over the records that contain it.
    pub fn gather(records: &[LogRecord]) -> LogRecord {
        let mut sums: BTreeMap<String, (f64, usize)> = BTreeMap::new();
        for record in records {
            for (key, value) in &record.values {
                let entry = sums.entry(key.clone()).or_insert((0.0, 0));
                entry.0 += value;
                entry.1 += 1;
            }
        }
        LogRecord {
            values: sums.into_iter().map(|(k, (sum, n))| (k, sum / n as f64)).collect(),
        }
    }

    /// Copy of this record with every key prefixed
    pub fn with_prefix(&self, prefix: &str) -> LogRecord {
        LogRecord {
            values: self.values.iter().map(|(k, v)| (format!("{prefix}{k}"), *v)).collect(),
        }
    }
}

impl FromIterator<(String, f64)> for LogRecord {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self { values: iter.into_iter().collect() }
    }
}
