//! Rendering of regression summaries: terminal table, Markdown and JSON

use super::color::SummaryPalette;
use super::job::{normalize_config_path, BenchMode};
use super::metrics::MetricMap;
use super::summary::{round2, SummaryEntry};
use crate::error::{Error, Result};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// A complete summary ready for display
#[derive(Debug, Clone)]
pub struct SummaryReport {
    pub mode: BenchMode,
    pub metrics: MetricMap,
    pub rows: Vec<SummaryEntry>,
    use_alternate_config: bool,
}

struct Cell {
    text: String,
    painted: Option<String>,
}

impl Cell {
    fn plain(text: impl Into<String>) -> Self {
        Self { text: text.into(), painted: None }
    }
}

impl SummaryReport {
    pub fn new(mode: BenchMode, metrics: MetricMap, rows: Vec<SummaryEntry>) -> Self {
        Self { mode, metrics, rows, use_alternate_config: false }
    }

    /// Resolve configs against the `configs_ceph` tree in Markdown output
    pub fn with_alternate_config(mut self, enabled: bool) -> Self {
        self.use_alternate_config = enabled;
        self
    }

    pub fn title(&self) -> String {
        format!("{} Benchmark Regression Summary", self.mode.title())
    }

    fn metric_headers(&self) -> Vec<String> {
        self.metrics
            .names()
            .flat_map(|name| [format!("{name} (expect)"), name.to_string()])
            .collect()
    }

    /// Expected and observed cells for every metric of a row
    fn metric_cells(&self, row: &SummaryEntry, palette: &SummaryPalette) -> Vec<Cell> {
        let mut cells = Vec::with_capacity(self.metrics.len() * 2);
        for name in self.metrics.names() {
            match row.metrics.get(name) {
                Some(metric) => {
                    let observed = format!("{:.2}", round2(metric.result));
                    let painted = palette.paint(&observed, metric.verdict());
                    cells.push(Cell::plain(format!("{:.2}", round2(metric.expect))));
                    cells.push(Cell { text: observed, painted: Some(painted) });
                }
                None => {
                    cells.push(Cell::plain(""));
                    cells.push(Cell::plain(""));
                }
            }
        }
        cells
    }

    /// Aligned table with observed values coloured by verdict
    pub fn render_table(&self, palette: &SummaryPalette) -> String {
        let mut header = vec!["Model".to_string()];
        header.extend(self.metric_headers());
        header.push("Date".to_string());

        let rows: Vec<Vec<Cell>> = self
            .rows
            .iter()
            .map(|row| {
                let mut cells = vec![Cell::plain(row.model_name.clone())];
                cells.extend(self.metric_cells(row, palette));
                cells.push(Cell::plain(row.date.clone().unwrap_or_default()));
                cells
            })
            .collect();

        let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
        for row in &rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.text.chars().count());
            }
        }

        let mut out = String::new();
        let _ = writeln!(out, "{}", palette.style(&self.title()).bold());
        let header_line: Vec<String> =
            header.iter().zip(&widths).map(|(h, w)| format!("{h:<w$}")).collect();
        let _ = writeln!(out, "{}", header_line.join(" │ ").trim_end());
        let rule: Vec<String> = widths.iter().map(|w| "─".repeat(*w)).collect();
        let _ = writeln!(out, "{}", rule.join("─┼─"));

        for row in &rows {
            let line: Vec<String> = row
                .iter()
                .zip(&widths)
                .map(|(cell, w)| {
                    let pad = " ".repeat(w.saturating_sub(cell.text.chars().count()));
                    format!("{}{pad}", cell.painted.as_deref().unwrap_or(&cell.text))
                })
                .collect();
            let _ = writeln!(out, "{}", line.join(" │ ").trim_end());
        }
        out
    }

    /// Markdown document with one row per model
    pub fn to_markdown(&self) -> String {
        let mut header = vec!["Model".to_string()];
        header.extend(self.metric_headers());
        header.push("Date".to_string());
        header.push("Config".to_string());

        let plain = SummaryPalette::plain();
        let mut out = format!("# {}\n", self.title());
        let _ = writeln!(out, "| {} |", header.join(" | "));
        let _ = writeln!(out, "|:{}:|", vec!["---"; header.len()].join(":|:"));
        for row in &self.rows {
            let mut cells = vec![row.model_name.clone()];
            cells.extend(self.metric_cells(row, &plain).into_iter().map(|c| c.text));
            cells.push(row.date.clone().unwrap_or_default());
            cells.push(normalize_config_path(&row.config, self.use_alternate_config));
            let _ = writeln!(out, "| {} |", cells.join(" | "));
        }
        out
    }

    /// Write the Markdown summary into `work_dir`, returning its path
    pub fn save(&self, work_dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(work_dir).map_err(|e| {
            Error::io(format!("Failed to create work dir {}", work_dir.display()), e)
        })?;
        let path = work_dir.join(self.mode.report_file_name());
        std::fs::write(&path, self.to_markdown())
            .map_err(|e| Error::io(format!("Failed to write summary {}", path.display()), e))?;
        Ok(path)
    }

    pub fn to_json(&self) -> Result<String> {
        let rows: Vec<serde_json::Value> = self
            .rows
            .iter()
            .map(|row| {
                let metrics: serde_json::Map<String, serde_json::Value> = row
                    .metrics
                    .iter()
                    .map(|(name, m)| {
                        (
                            name.clone(),
                            serde_json::json!({
                                "expect": m.expect,
                                "result": m.result,
                                "tolerance": m.tolerance,
                                "rule": m.rule,
                                "verdict": m.verdict(),
                            }),
                        )
                    })
                    .collect();
                serde_json::json!({
                    "model": row.model_name,
                    "config": normalize_config_path(&row.config, self.use_alternate_config),
                    "date": row.date,
                    "pending": row.is_pending(),
                    "metrics": metrics,
                })
            })
            .collect();
        let doc = serde_json::json!({
            "title": self.title(),
            "mode": self.mode.to_string(),
            "rows": rows,
        });
        serde_json::to_string_pretty(&doc)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize summary: {e}")))
    }
}
