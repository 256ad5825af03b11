//! Metric expectations used by the regression summary
//!
//! A [`MetricMap`] lists, in display order, every metric the summary knows
//! about: the candidate result keys to look up, the tolerance band and the
//! direction that counts as an improvement.

use crate::config::ValidationError;
use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;

/// Which direction of change is an improvement
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    Larger,
    Less,
    /// Any other spelling, kept verbatim
    ///
    /// Verdicts treat it like [`Rule::Less`]: only `larger` flips the sense.
    Unrecognized(String),
}

impl Rule {
    pub fn parse(s: &str) -> Self {
        match s {
            "larger" => Rule::Larger,
            "less" => Rule::Less,
            other => Rule::Unrecognized(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Rule::Larger => "larger",
            Rule::Less => "less",
            Rule::Unrecognized(s) => s,
        }
    }

    pub fn is_larger_better(&self) -> bool {
        matches!(self, Rule::Larger)
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Rule {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Rule {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Rule::parse(&s))
    }
}

/// One summarized metric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricExpectation {
    /// Display name, also the key in the catalog's expected metrics
    pub name: String,

    /// Candidate keys in the result file; the first present one wins
    pub keys: Vec<String>,

    #[serde(default = "default_tolerance")]
    pub tolerance: f64,

    pub rule: Rule,
}

fn default_tolerance() -> f64 {
    0.1
}

impl MetricExpectation {
    pub fn new(name: &str, keys: &[&str], tolerance: f64, rule: Rule) -> Self {
        Self {
            name: name.to_string(),
            keys: keys.iter().map(|k| (*k).to_string()).collect(),
            tolerance,
            rule,
        }
    }

    fn validate(&self) -> std::result::Result<(), ValidationError> {
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(ValidationError::InvalidTolerance {
                metric: self.name.clone(),
                value: self.tolerance,
            });
        }
        if self.keys.is_empty() || self.keys.iter().any(String::is_empty) {
            return Err(ValidationError::EmptyMetricKeys { metric: self.name.clone() });
        }
        Ok(())
    }
}

/// Ordered collection of metric expectations
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MetricMap {
    metrics: Vec<MetricExpectation>,
}

impl MetricMap {
    /// Build a map, rejecting bad tolerances, empty key lists and duplicates
    pub fn new(metrics: Vec<MetricExpectation>) -> std::result::Result<Self, ValidationError> {
        let mut seen = HashSet::new();
        for metric in &metrics {
            metric.validate()?;
            if !seen.insert(metric.name.as_str()) {
                return Err(ValidationError::DuplicateMetric(metric.name.clone()));
            }
        }
        Ok(Self { metrics })
    }

    /// Load a YAML list of expectations
    ///
    /// ```yaml
    /// - name: FID
    ///   keys: [FID-Full-50k/fid]
    ///   tolerance: 0.1
    ///   rule: less
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::io(format!("Failed to read metric map {}", path.display()), e))?;
        let metrics: Vec<MetricExpectation> =
            serde_yaml::from_str(&content).map_err(|e| Error::ConfigParseError {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        Ok(Self::new(metrics)?)
    }

    pub fn iter(&self) -> impl Iterator<Item = &MetricExpectation> {
        self.metrics.iter()
    }

    pub fn get(&self, name: &str) -> Option<&MetricExpectation> {
        self.metrics.iter().find(|m| m.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.metrics.iter().map(|m| m.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }
}

impl Default for MetricMap {
    fn default() -> Self {
        let large = || Rule::Unrecognized("large".to_string());
        Self {
            metrics: vec![
                MetricExpectation::new("SWD", &["SWD/avg"], 0.1, Rule::Less),
                MetricExpectation::new("MS-SSIM", &["MS-SSIM"], 0.1, Rule::Larger),
                MetricExpectation::new("FID", &["FID-Full-50k/fid"], 0.1, Rule::Less),
                MetricExpectation::new("FID50k", &["FID-Full-50k/fid"], 0.1, Rule::Less),
                MetricExpectation::new("IS", &["IS-50k/is"], 0.1, Rule::Larger),
                MetricExpectation::new("IS50k", &["IS-50k/is"], 0.1, Rule::Larger),
                MetricExpectation::new("Precision50k", &["PR-50K/precision"], 0.1, large()),
                MetricExpectation::new("Recall50k", &["PR-50K/recall"], 0.1, large()),
                MetricExpectation::new("Precision10k", &["PR-10K/precision"], 0.1, large()),
                MetricExpectation::new("Recall10k", &["PR-10K/recall"], 0.1, large()),
                MetricExpectation::new("EQ-R", &["EQ/eqr"], 0.1, Rule::Larger),
                MetricExpectation::new("EQ-T", &["EQ/eqt_int"], 0.1, Rule::Larger),
            ],
        }
    }
}
