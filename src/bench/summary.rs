//! Regression summary: observed results against catalog expectations

use super::catalog::ModelCatalogEntry;
use super::metrics::{MetricMap, Rule};
use crate::error::{Error, Result};
use chrono::{DateTime, Local};
use serde::Serialize;
use serde_pickle::{DeOptions, HashableValue, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Name of the per-model result file written by test jobs
pub const RESULT_FILE_NAME: &str = "result.pkl";

/// Numeric entries of a pickled result dict
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultFile {
    values: BTreeMap<String, f64>,
}

impl ResultFile {
    pub fn from_values(values: BTreeMap<String, f64>) -> Self {
        Self { values }
    }

    /// Read a pickled dict; non-string keys and non-numeric values are dropped
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .map_err(|e| Error::io(format!("Failed to read {}", path.display()), e))?;
        let value = serde_pickle::value_from_slice(&bytes, DeOptions::new()).map_err(|e| {
            Error::ResultFile { path: path.to_path_buf(), message: e.to_string() }
        })?;
        let Value::Dict(dict) = value else {
            return Err(Error::ResultFile {
                path: path.to_path_buf(),
                message: "expected a dict at the top level".to_string(),
            });
        };

        let values = dict
            .into_iter()
            .filter_map(|(key, value)| {
                let HashableValue::String(key) = key else {
                    return None;
                };
                let number = match value {
                    Value::F64(v) => v,
                    Value::I64(v) => v as f64,
                    Value::Bool(v) => f64::from(u8::from(v)),
                    _ => return None,
                };
                Some((key, number))
            })
            .collect();
        Ok(Self { values })
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.values.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Outcome of comparing one observed value with its expectation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    /// Moved in the preferred direction beyond tolerance
    Favorable,
    /// Moved against the preferred direction beyond tolerance
    Unfavorable,
    /// Within tolerance
    Neutral,
}

/// Round half away from zero to two decimals
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Classify `value` against `expect ± tolerance`
///
/// Both values are rounded to two decimals first. Only [`Rule::Larger`]
/// treats an increase as favorable; every other rule reads as
/// lower-is-better.
pub fn verdict(value: f64, expect: f64, tolerance: f64, rule: &Rule) -> Verdict {
    let value = round2(value);
    let expect = round2(expect);
    let larger = rule.is_larger_better();
    if value > expect + tolerance {
        if larger {
            Verdict::Favorable
        } else {
            Verdict::Unfavorable
        }
    } else if value < expect - tolerance {
        if larger {
            Verdict::Unfavorable
        } else {
            Verdict::Favorable
        }
    } else {
        Verdict::Neutral
    }
}

/// One metric of one model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricComparison {
    pub expect: f64,
    pub result: f64,
    pub tolerance: f64,
    pub rule: Rule,
}

impl MetricComparison {
    pub fn verdict(&self) -> Verdict {
        verdict(self.result, self.expect, self.tolerance, &self.rule)
    }
}

/// Summary row for one model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryEntry {
    pub model_name: String,
    /// Config reference as listed in the catalog
    pub config: String,
    /// Completion date of the result file, `None` while pending
    pub date: Option<String>,
    pub metrics: BTreeMap<String, MetricComparison>,
}

impl SummaryEntry {
    pub fn pending(entry: &ModelCatalogEntry) -> Self {
        Self {
            model_name: entry.name.clone(),
            config: entry.config.clone(),
            date: None,
            metrics: BTreeMap::new(),
        }
    }

    /// No result file has been produced yet
    pub fn is_pending(&self) -> bool {
        self.date.is_none()
    }
}

/// Compare an entry's expectations with a loaded result file
///
/// For each metric, the first candidate key present in the results is used.
/// Metrics without an expectation or without any present key are left out.
pub fn compare(
    entry: &ModelCatalogEntry,
    results: &ResultFile,
    date: String,
    metric_map: &MetricMap,
) -> SummaryEntry {
    let mut summary = SummaryEntry::pending(entry);
    summary.date = Some(date);
    let Some(expected) = entry.expected_metrics() else {
        return summary;
    };

    for metric in metric_map.iter() {
        let Some(&expect) = expected.get(&metric.name) else {
            continue;
        };
        let Some(result) = metric.keys.iter().find_map(|key| results.get(key)) else {
            continue;
        };
        summary.metrics.insert(
            metric.name.clone(),
            MetricComparison {
                expect,
                result,
                tolerance: metric.tolerance,
                rule: metric.rule.clone(),
            },
        );
    }
    summary
}

/// Result file location for a model under `root`
pub fn result_path(root: &Path, model_name: &str) -> PathBuf {
    root.join(model_name).join(RESULT_FILE_NAME)
}

fn modified_date(path: &Path) -> Result<String> {
    let modified = std::fs::symlink_metadata(path)
        .and_then(|meta| meta.modified())
        .map_err(|e| Error::io(format!("Failed to stat {}", path.display()), e))?;
    Ok(DateTime::<Local>::from(modified).format("%Y-%m-%d").to_string())
}

/// Summarize every entry that lists expected results
///
/// A missing result file yields a pending row rather than an error.
pub fn summarize(
    entries: &[&ModelCatalogEntry],
    root: &Path,
    metric_map: &MetricMap,
) -> Result<Vec<SummaryEntry>> {
    let mut rows = Vec::new();
    for entry in entries.iter().filter(|e| e.has_expected_results()) {
        let path = result_path(root, &entry.name);
        if !path.exists() {
            rows.push(SummaryEntry::pending(entry));
            continue;
        }
        let results = ResultFile::load(&path)?;
        let date = modified_date(&path)?;
        rows.push(compare(entry, &results, date, metric_map));
    }
    Ok(rows)
}
