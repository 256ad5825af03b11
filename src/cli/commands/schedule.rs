//! Schedule command implementation

use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::config::{load_schedule_spec, ScheduleArgs};
use crate::schedule::{AdversarialScheduler, StageSchedule};
use std::fmt::Write as _;

pub fn run_schedule(args: ScheduleArgs, level: LogLevel) -> Result<(), String> {
    log(level, LogLevel::Normal, &format!("Schedule: {}", args.config.display()));

    let spec = load_schedule_spec(&args.config).map_err(|e| e.to_string())?;
    let scheduler = spec.build().map_err(|e| format!("Invalid schedule: {e}"))?;
    let stages = spec.stage_schedule().map_err(|e| format!("Invalid schedule: {e}"))?;

    let d = scheduler.discriminator_policy();
    let g = scheduler.generator_policy();
    log(
        level,
        LogLevel::Verbose,
        &format!(
            "  discriminator: every {} x{} after {}\n  generator: every {} x{} after {}",
            d.steps(),
            d.accumulative_counts(),
            d.init_steps(),
            g.steps(),
            g.accumulative_counts(),
            g.init_steps()
        ),
    );

    let end = args.start.saturating_add(args.iters);
    log(level, LogLevel::Normal, &render_timeline(&scheduler, stages.as_ref(), args.start, end));
    Ok(())
}

/// One line per iteration: which networks update, and the stage if any
pub(crate) fn render_timeline(
    scheduler: &AdversarialScheduler,
    stages: Option<&StageSchedule>,
    start: u64,
    end: u64,
) -> String {
    let mark = |on: bool| if on { "x" } else { "." };
    let mut out = String::new();
    let _ = write!(out, "{:>8}  D  G", "iter");
    if stages.is_some() {
        out.push_str("  stage");
    }
    out.push('\n');

    let (mut d_updates, mut g_updates) = (0u64, 0u64);
    for (iter, decision) in scheduler.timeline(start..end) {
        d_updates += u64::from(decision.discriminator);
        g_updates += u64::from(decision.generator);
        let _ = write!(
            out,
            "{iter:>8}  {}  {}",
            mark(decision.discriminator),
            mark(decision.generator)
        );
        if let Some(stages) = stages {
            let _ = write!(out, "  {}", stages.stage_at(iter));
        }
        out.push('\n');
    }
    let _ = write!(
        out,
        "{} iterations: {d_updates} discriminator updates, {g_updates} generator updates",
        end.saturating_sub(start)
    );
    out
}
