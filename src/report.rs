//! Human-readable and JSON rendering of a correlated [`Job`].

use std::fmt::Write as _;

use crate::config::ToolsConfig;
use crate::error::Result;
use crate::record::{Field, Job, Step};

const STEP_SEPARATOR_WIDTH: usize = 220;

/// Parse a Slurm elapsed time (`[D-]HH:MM:SS`, `MM:SS`, optional
/// fractional seconds) into whole seconds.
pub fn parse_elapsed(value: &str) -> Option<u64> {
    let value = value.trim();
    let (days, clock) = match value.split_once('-') {
        Some((days, clock)) => (days.parse::<u64>().ok()?, clock),
        None => (0, value),
    };

    let parts: Vec<&str> = clock.split(':').collect();
    let (hours, minutes, seconds) = match parts.as_slice() {
        [h, m, s] => (*h, *m, *s),
        [m, s] => ("0", *m, *s),
        _ => return None,
    };
    let seconds = seconds.split('.').next()?;

    let hours: u64 = hours.parse().ok()?;
    let minutes: u64 = minutes.parse().ok()?;
    let seconds: u64 = seconds.parse().ok()?;
    Some(((days * 24 + hours) * 60 + minutes) * 60 + seconds)
}

/// Format seconds as `H:MM:SS`, prefixed with `N day(s), ` past a day.
pub fn format_duration(total: u64) -> String {
    let days = total / 86_400;
    let rem = total % 86_400;
    let clock = format!("{}:{:02}:{:02}", rem / 3600, (rem % 3600) / 60, rem % 60);
    match days {
        0 => clock,
        1 => format!("1 day, {}", clock),
        n => format!("{} days, {}", n, clock),
    }
}

/// CPU-equivalent time: elapsed wall time multiplied by allocated CPUs.
pub fn cpu_equivalent_time(job: &Job) -> Option<String> {
    let elapsed = parse_elapsed(job.record.elapsed.value()?)?;
    let cpus: u64 = job.record.cpu_count.value()?.trim().parse().ok()?;
    Some(format_duration(elapsed.checked_mul(cpus)?))
}

/// Header block, step count and step table.
pub fn render(job: &Job, config: &ToolsConfig) -> String {
    let na = config.not_available.as_str();
    let r = &job.record;
    let v = |field: &Field| field.display_or(na).to_string();

    let mut out = String::new();
    let _ = writeln!(out);
    let _ = writeln!(out, "#########################################");
    let _ = writeln!(out, "#        {:31.31}#", config.title);
    let _ = writeln!(out, "#        Job Accounting                 #");
    let _ = writeln!(out, "#########################################");
    let _ = writeln!(out, "Cluster              : {}", v(&r.cluster));
    let _ = writeln!(out, "JobID                : {}", job.id);
    if job.is_heterogeneous {
        let _ = writeln!(out, "Heterogeneous job    : yes");
    }
    let _ = writeln!(out, "JobName              : {}", v(&r.job_name));
    let _ = writeln!(out, "Account              : {}", v(&r.account));
    let _ = writeln!(
        out,
        "User                 : {}({}), {}({})",
        v(&r.user),
        v(&r.uid),
        v(&r.group),
        v(&r.gid)
    );
    let _ = writeln!(out, "Partition            : {}", v(&r.partition));
    let _ = writeln!(out, "QOS                  : {}", v(&r.qos));
    let _ = writeln!(
        out,
        "Nodelist             : {} ({})",
        v(&r.node_list),
        v(&r.node_count)
    );
    let _ = writeln!(
        out,
        "State                : {}  (Exitcode={}, DerivedExitCode={}, Restarts={})",
        v(&r.state),
        v(&r.exit_code),
        v(&r.derived_exit_code),
        job.restarts
    );
    let _ = writeln!(out, "Submit date          : {}", v(&r.submit));
    let _ = writeln!(out, "Start time           : {}", v(&r.start));
    let _ = writeln!(out, "End time             : {}", v(&r.end));
    let _ = writeln!(
        out,
        "Elapsed time         : {}  (Timelimit={}, Suspended={})",
        v(&r.elapsed),
        v(&r.time_limit),
        v(&r.suspended)
    );
    let _ = writeln!(
        out,
        "TEI                  : {}",
        cpu_equivalent_time(job).unwrap_or_else(|| na.to_string())
    );
    let _ = writeln!(out, "Command              : {}", v(&r.command));
    let _ = writeln!(out, "WorkDir              : {}", v(&r.work_dir));
    let _ = writeln!(out, "StdOut               : {}", v(&r.std_out));
    let _ = writeln!(out, "StdErr               : {}", v(&r.std_err));
    let _ = writeln!(
        out,
        "Log archive location : {}",
        v(&job.archive_location)
    );
    let _ = writeln!(out);

    render_steps(&mut out, job, na);
    out
}

fn render_steps(out: &mut String, job: &Job, na: &str) {
    let _ = writeln!(out, "STEP(s): {}", job.steps.display_count());
    let _ = writeln!(out, "---------");
    let _ = writeln!(
        out,
        "   {:7.7} | {:12.12} {:11.11} {:6.6} {:19.19} {:19.19} {:9.9} {:10.10} {:10.10} {:>14.14} {:>11.11} {:>12.12} {:>10.10} {:>10.10} {:>10.10} {:>6.6} NodeList Comment",
        "StepID",
        "JobName",
        "State",
        "Exit",
        "Start",
        "End",
        "Elapsed",
        "TotalCPU",
        "CPUTime",
        "ConsumedEnergy",
        "MaxDiskRead",
        "MaxDiskWrite",
        "MaxRSS",
        "MaxRSSTask",
        "MaxRSSNode",
        "NNodes",
    );
    let _ = writeln!(out, "   {}", "-".repeat(STEP_SEPARATOR_WIDTH));
    for step in job.steps.listed() {
        render_step(out, step, na);
    }
}

fn render_step(out: &mut String, step: &Step, na: &str) {
    let v = |field: &Field| field.display_or(na).to_string();
    let _ = writeln!(
        out,
        "   {:7.7} | {:12.12} {:11.11} {:6.6} {:19.19} {:19.19} {:9.9} {:10.10} {:10.10} {:>14.14} {:>11.11} {:>12.12} {:>10.10} {:>10.10} {:>10.10} {:>6.6} {} {}",
        step.step_id,
        v(&step.job_name),
        v(&step.state),
        v(&step.exit_code),
        v(&step.start),
        v(&step.end),
        v(&step.elapsed),
        v(&step.total_cpu),
        v(&step.cpu_time),
        v(&step.consumed_energy),
        v(&step.max_disk_read),
        v(&step.max_disk_write),
        v(&step.max_rss),
        v(&step.max_rss_task),
        v(&step.max_rss_node),
        v(&step.node_count),
        v(&step.node_list),
        v(&step.comment),
    );
}

/// OOM killer warning, empty when no event was recorded. `details` is the
/// full event text when the detailed report was requested.
pub fn render_oom(job: &Job, details: Option<&str>) -> String {
    if !job.oom_detected {
        return String::new();
    }
    let mut out = String::from("WARNING: OOM KILLER detected !\n--------\n");
    match details {
        Some(text) => {
            for line in text.lines() {
                let _ = writeln!(out, "{}", line);
            }
        }
        None => out.push_str("Use option \"-o\" for more details.\n"),
    }
    out
}

pub fn render_json(job: &Job) -> Result<String> {
    Ok(serde_json::to_string_pretty(job)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_formats() {
        assert_eq!(parse_elapsed("00:01:30"), Some(90));
        assert_eq!(parse_elapsed("1-02:00:00"), Some(93_600));
        assert_eq!(parse_elapsed("05:07"), Some(307));
        assert_eq!(parse_elapsed("00:00:01.500"), Some(1));
        assert_eq!(parse_elapsed("Unknown"), None);
        assert_eq!(parse_elapsed(""), None);
    }

    #[test]
    fn duration_formats() {
        assert_eq!(format_duration(0), "0:00:00");
        assert_eq!(format_duration(3_725), "1:02:05");
        assert_eq!(format_duration(86_400 + 60), "1 day, 0:01:00");
        assert_eq!(format_duration(3 * 86_400), "3 days, 0:00:00");
    }
}
