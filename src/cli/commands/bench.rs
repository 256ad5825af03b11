//! Shared benchmark pipeline for the train and test commands

use crate::bench::{
    summarize, BenchMode, BenchPlan, FilterOutcome, JobGenerator, MetricMap, ModelCatalog,
    ModelCatalogEntry, RunOptions, SummaryPalette, SummaryReport,
};
use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::config::{BenchCommonArgs, OutputFormat};

/// Options derived from the command line for one benchmark mode
pub(crate) fn run_options(
    common: &BenchCommonArgs,
    mode: BenchMode,
    checkpoint_root: Option<String>,
) -> RunOptions {
    let mut options = RunOptions::new(mode, common.partition.clone());
    if let Some(job_name) = &common.job_name {
        options.job_name = job_name.clone();
    }
    if let Some(work_dir) = &common.work_dir {
        options.work_dir = work_dir.clone();
    }
    options.use_alternate_config = common.use_ceph_config;
    options.local = common.local;
    options.mail = common.mail.clone();
    options.mail_types = common.mail_type.clone();
    options.quota_type = common.quotatype;
    options.checkpoint_root = checkpoint_root;
    options
}

/// Load the catalog and apply `--models`; `None` when nothing matched
fn select_models<'a>(
    catalog: &'a ModelCatalog,
    patterns: &[String],
    level: LogLevel,
) -> Result<Option<Vec<&'a ModelCatalogEntry>>, String> {
    match catalog.filter(patterns).map_err(|e| e.to_string())? {
        FilterOutcome::Selected(entries) => Ok(Some(entries)),
        FilterOutcome::NoMatch { available } => {
            log(level, LogLevel::Normal, "No model found, please specify models in:");
            log(level, LogLevel::Normal, &available.join("\n"));
            Ok(None)
        }
    }
}

pub(crate) fn run_benchmark(
    common: &BenchCommonArgs,
    options: RunOptions,
    level: LogLevel,
) -> Result<(), String> {
    log(
        level,
        LogLevel::Verbose,
        &format!("Loading model index: {}", common.model_index.display()),
    );
    let catalog = ModelCatalog::load(&common.model_index).map_err(|e| e.to_string())?;
    log(level, LogLevel::Verbose, &format!("  {} models in catalog", catalog.len()));

    let Some(entries) = select_models(&catalog, &common.models, level)? else {
        return Ok(());
    };

    if common.summary {
        run_summary(common, &options, &entries, level)
    } else {
        run_jobs(common, options, &entries, level)
    }
}

fn run_summary(
    common: &BenchCommonArgs,
    options: &RunOptions,
    entries: &[&ModelCatalogEntry],
    level: LogLevel,
) -> Result<(), String> {
    let metric_map = match &common.metrics {
        Some(path) => MetricMap::load(path).map_err(|e| e.to_string())?,
        None => MetricMap::default(),
    };
    let rows = summarize(entries, &options.work_dir, &metric_map).map_err(|e| e.to_string())?;
    let pending = rows.iter().filter(|r| r.is_pending()).count();
    log(
        level,
        LogLevel::Verbose,
        &format!("Summarized {} models ({pending} pending)", rows.len()),
    );

    let report = SummaryReport::new(options.mode, metric_map, rows)
        .with_alternate_config(options.use_alternate_config);

    match common.format {
        OutputFormat::Json => {
            let json = report.to_json().map_err(|e| e.to_string())?;
            log(level, LogLevel::Normal, &json);
        }
        OutputFormat::Text => {
            log(level, LogLevel::Normal, &report.render_table(&SummaryPalette::default()));
        }
    }

    if common.save {
        let path = report.save(&options.work_dir).map_err(|e| e.to_string())?;
        log(level, LogLevel::Normal, &format!("Summary saved: {}", path.display()));
    }
    Ok(())
}

fn run_jobs(
    common: &BenchCommonArgs,
    options: RunOptions,
    entries: &[&ModelCatalogEntry],
    level: LogLevel,
) -> Result<(), String> {
    let generator = JobGenerator::new(options).map_err(|e| e.to_string())?;
    let plan = BenchPlan::build(&generator, entries, common.port).map_err(|e| e.to_string())?;

    for note in &plan.notes {
        log(level, LogLevel::Normal, note);
    }
    for warning in &plan.warnings {
        log(level, LogLevel::Normal, warning);
    }
    log(
        level,
        LogLevel::Verbose,
        &format!(
            "Generated {} job scripts under {}",
            plan.scheduled.len(),
            generator.options().work_dir.display()
        ),
    );

    if plan.is_empty() {
        log(level, LogLevel::Normal, "No job generated.");
        return Ok(());
    }

    log(level, LogLevel::Normal, &plan.render_preview().map_err(|e| e.to_string())?);

    if common.run {
        let status = plan.execute().map_err(|e| e.to_string())?;
        if !status.success() {
            return Err(format!("Benchmark commands exited with {status}"));
        }
    } else {
        log(level, LogLevel::Normal, "Please set \"--run\" to start the job");
    }
    Ok(())
}
