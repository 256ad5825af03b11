//! Batch planning: which models get a job, on which port, launched how

use super::catalog::ModelCatalogEntry;
use super::job::{BenchMode, Generated, JobGenerator};
use crate::config::ValidationError;
use crate::error::{Error, Result};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

/// Hands out consecutive master ports
#[derive(Debug, Clone)]
pub struct PortAllocator {
    start: u16,
    next: Option<u16>,
    issued: usize,
}

impl PortAllocator {
    pub fn new(start: u16) -> Self {
        Self { start, next: Some(start), issued: 0 }
    }

    /// Next port; errors once the range past `start` is used up
    pub fn allocate(&mut self) -> std::result::Result<u16, ValidationError> {
        let port = self.next.ok_or(ValidationError::PortRangeExhausted {
            start: self.start,
            count: self.issued,
        })?;
        self.next = port.checked_add(1);
        self.issued += 1;
        Ok(port)
    }

    pub fn issued(&self) -> usize {
        self.issued
    }
}

/// Commands and preview for one benchmark batch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BenchPlan {
    pub commands: Vec<String>,
    /// Most recently generated script
    pub preview_script: Option<PathBuf>,
    /// Informational messages (converted checkpoints skipped)
    pub notes: Vec<String>,
    /// Per-model warnings (checkpoint not found)
    pub warnings: Vec<String>,
    /// Models that received a job, in order
    pub scheduled: Vec<String>,
}

impl BenchPlan {
    /// Generate jobs for `entries`
    ///
    /// Entries without expected results are ignored. Train mode skips
    /// converted checkpoints. Every other entry consumes a port, even when
    /// its checkpoint turns out to be missing.
    pub fn build(
        generator: &JobGenerator,
        entries: &[&ModelCatalogEntry],
        start_port: u16,
    ) -> Result<Self> {
        let mode = generator.options().mode;
        let mut ports = PortAllocator::new(start_port);
        let mut plan = Self::default();

        for entry in entries {
            if !entry.has_expected_results() {
                continue;
            }
            if mode == BenchMode::Train && entry.name.contains("cvt") {
                plan.notes.push(format!("Skip converted config: {} ({})", entry.name, entry.config));
                continue;
            }

            let port = ports.allocate()?;
            match generator.prepare(entry, port)? {
                Generated::Job(job) => {
                    plan.commands.push(job.preview_command());
                    plan.commands.push(job.launch_command());
                    plan.scheduled.push(job.model_name.clone());
                    plan.preview_script = Some(job.script_path.clone());
                }
                Generated::Skipped(reason) => plan.warnings.push(format!("WARNING: {reason}")),
            }
        }
        Ok(plan)
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn command_text(&self) -> String {
        self.commands.join("\n")
    }

    /// Last script and the command list, both with line numbers
    pub fn render_preview(&self) -> Result<String> {
        let mut out = String::new();
        match &self.preview_script {
            Some(path) => {
                let script = std::fs::read_to_string(path).map_err(|e| {
                    Error::io(format!("Failed to read job script {}", path.display()), e)
                })?;
                let _ = writeln!(out, "── {} ──", path.display());
                out.push_str(&numbered(&script));
            }
            None => out.push_str("── no job script generated ──\n"),
        }
        out.push_str("── Shell command preview ──\n");
        out.push_str(&numbered(&self.command_text()));
        Ok(out)
    }

    /// Run the command text through `sh -c`
    pub fn execute(&self) -> Result<ExitStatus> {
        run_shell(&self.command_text(), None)
    }
}

/// Run a command string through `sh -c`
pub fn run_shell(command: &str, cwd: Option<&Path>) -> Result<ExitStatus> {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(command);
    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }
    cmd.status().map_err(|e| Error::Command(format!("failed to spawn sh: {e}")))
}

fn numbered(text: &str) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let width = lines.len().to_string().len();
    let mut out = String::new();
    for (i, line) in lines.iter().enumerate() {
        let _ = writeln!(out, "{:>width$} │ {line}", i + 1);
    }
    out
}
