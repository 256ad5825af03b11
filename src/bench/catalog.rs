//! Benchmark model catalog
//!
//! Reads a model-index document: a YAML file with a `Models` list and/or an
//! `Import` list of further metafiles (resolved relative to the importing
//! file). Both the model-index capitalisation (`Name`, `Config`, `Weights`,
//! `Results`, `Metrics`) and lowercase keys are accepted.

use crate::config::ValidationError;
use crate::error::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

/// Expected metric values may be numbers or numeric strings; anything else is
/// treated as "no expectation" for that metric.
fn deserialize_metrics<'de, D>(deserializer: D) -> std::result::Result<BTreeMap<String, f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<BTreeMap<String, serde_yaml::Value>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(key, value)| {
            let number = match &value {
                serde_yaml::Value::Number(n) => n.as_f64(),
                serde_yaml::Value::String(s) => s.trim().parse::<f64>().ok(),
                _ => None,
            };
            number.map(|n| (key, n))
        })
        .collect())
}

/// One block of expected results
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultBlock {
    #[serde(default, alias = "Dataset", skip_serializing_if = "Option::is_none")]
    pub dataset: Option<String>,

    #[serde(default, alias = "Task", skip_serializing_if = "Option::is_none")]
    pub task: Option<String>,

    #[serde(default, alias = "Metrics", deserialize_with = "deserialize_metrics")]
    pub metrics: BTreeMap<String, f64>,
}

/// A named benchmark model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelCatalogEntry {
    #[serde(alias = "Name")]
    pub name: String,

    /// Config path or upstream URL
    #[serde(alias = "Config")]
    pub config: String,

    /// Checkpoint download URL
    #[serde(default, alias = "Weights", skip_serializing_if = "Option::is_none")]
    pub weights: Option<String>,

    #[serde(default, alias = "Results", skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<ResultBlock>>,
}

impl ModelCatalogEntry {
    pub fn new(name: impl Into<String>, config: impl Into<String>) -> Self {
        Self { name: name.into(), config: config.into(), weights: None, results: None }
    }

    pub fn with_weights(mut self, weights: impl Into<String>) -> Self {
        self.weights = Some(weights.into());
        self
    }

    pub fn with_expected(mut self, metrics: BTreeMap<String, f64>) -> Self {
        self.results
            .get_or_insert_with(Vec::new)
            .push(ResultBlock { metrics, ..Default::default() });
        self
    }

    /// Metrics of the first result block, `None` when no results are listed
    pub fn expected_metrics(&self) -> Option<&BTreeMap<String, f64>> {
        self.results.as_ref().and_then(|r| r.first()).map(|block| &block.metrics)
    }

    /// Whether this entry takes part in benchmarks at all
    pub fn has_expected_results(&self) -> bool {
        self.expected_metrics().is_some()
    }
}

#[derive(Debug, Default, Deserialize)]
struct IndexDocument {
    #[serde(default, alias = "Import")]
    import: Vec<String>,

    #[serde(default, alias = "Models")]
    models: Vec<ModelCatalogEntry>,
}

/// Result of applying name filters to the catalog
#[derive(Debug)]
pub enum FilterOutcome<'a> {
    Selected(Vec<&'a ModelCatalogEntry>),
    NoMatch { available: Vec<String> },
}

/// Ordered collection of catalog entries with unique names
#[derive(Debug, Clone, Default)]
pub struct ModelCatalog {
    entries: Vec<ModelCatalogEntry>,
}

impl ModelCatalog {
    /// Build a catalog, rejecting duplicate model names
    pub fn from_entries(entries: Vec<ModelCatalogEntry>) -> Result<Self> {
        let mut seen = HashSet::new();
        for entry in &entries {
            if !seen.insert(entry.name.as_str()) {
                return Err(Error::Catalog(format!("duplicate model name '{}'", entry.name)));
            }
        }
        Ok(Self { entries })
    }

    /// Load a model-index file, following `Import` entries
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut entries = Vec::new();
        let mut visited = HashSet::new();
        collect_models(path.as_ref(), &mut entries, &mut visited)?;
        Self::from_entries(entries)
    }

    pub fn entries(&self) -> &[ModelCatalogEntry] {
        &self.entries
    }

    pub fn get(&self, name: &str) -> Option<&ModelCatalogEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Select entries whose name matches any pattern at its start
    ///
    /// An empty pattern list selects every entry.
    pub fn filter(&self, patterns: &[String]) -> Result<FilterOutcome<'_>> {
        if patterns.is_empty() {
            return Ok(FilterOutcome::Selected(self.entries.iter().collect()));
        }
        let regexes = patterns
            .iter()
            .map(|p| {
                Regex::new(&format!("^(?:{p})")).map_err(|e| ValidationError::InvalidPattern {
                    pattern: p.clone(),
                    message: e.to_string(),
                })
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let selected: Vec<&ModelCatalogEntry> =
            self.entries.iter().filter(|e| regexes.iter().any(|r| r.is_match(&e.name))).collect();

        if selected.is_empty() {
            Ok(FilterOutcome::NoMatch { available: self.names() })
        } else {
            Ok(FilterOutcome::Selected(selected))
        }
    }
}

fn collect_models(
    path: &Path,
    entries: &mut Vec<ModelCatalogEntry>,
    visited: &mut HashSet<PathBuf>,
) -> Result<()> {
    let key = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    if !visited.insert(key) {
        return Ok(());
    }

    let yaml = fs::read_to_string(path)
        .map_err(|e| Error::io(format!("reading model index {}", path.display()), e))?;
    let doc: Option<IndexDocument> = serde_yaml::from_str(&yaml).map_err(|e| {
        Error::ConfigParseError { path: path.to_path_buf(), message: e.to_string() }
    })?;
    let doc = doc.unwrap_or_default();

    entries.extend(doc.models);

    let base = path.parent().unwrap_or_else(|| Path::new("."));
    for import in &doc.import {
        collect_models(&base.join(import), entries, visited)?;
    }
    Ok(())
}
