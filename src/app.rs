//! One invocation of `ja`: resolve the requested ids, then correlate and
//! print each job in turn.
//!
//! Resolution errors abort the invocation. Once the id list is known, a
//! failing job is reported and the next one is processed.

use std::io::{self, Write};

use clap::ValueEnum;

use crate::config::{Directives, ToolsConfig};
use crate::error::JobAcctError;
use crate::identifier::{AmbientJob, JobId, Resolver};
use crate::record::{Correlator, Job};
use crate::report;
use crate::source::{AccountingSource, ArchiveSource, LiveStateSource, OomSource};

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// What the command line asked for.
#[derive(Debug, Clone, Default)]
pub struct Request {
    /// Job id or comma-separated list; `None` uses the ambient job
    pub job_ids: Option<String>,
    pub directives: Directives,
    pub output: OutputFormat,
    /// Print the OOM killer event text instead of a hint
    pub oom_details: bool,
}

/// Result of processing one resolved job id.
#[derive(Debug)]
pub enum Outcome {
    Reported(Box<Job>),
    /// Accounting holds no row for the id
    NoData(JobId),
    Failed(JobId, JobAcctError),
}

pub async fn process_job(correlator: &Correlator<'_>, job_id: &JobId) -> Outcome {
    match correlator.correlate(job_id).await {
        Ok(job) => Outcome::Reported(Box::new(job)),
        Err(JobAcctError::NoAccountingData(_)) => Outcome::NoData(job_id.clone()),
        Err(e) => Outcome::Failed(job_id.clone(), e),
    }
}

/// Run the whole report, writing reports to `out` and errors to `err`.
/// Returns the process exit code.
pub async fn run<T, W, E>(
    tools: &T,
    config: &ToolsConfig,
    request: &Request,
    ambient: &AmbientJob,
    out: &mut W,
    err: &mut E,
) -> io::Result<i32>
where
    T: AccountingSource + LiveStateSource + ArchiveSource + OomSource,
    W: Write,
    E: Write,
{
    let job_ids = match Resolver::new(tools)
        .resolve(request.job_ids.as_deref(), &request.directives, ambient)
        .await
    {
        Ok(ids) => ids,
        Err(e) => {
            writeln!(err, "[ja] Error : {}", e)?;
            if e.is_usage_error() {
                writeln!(err, "Try 'ja --help' for more information")?;
            }
            return Ok(EXIT_FAILURE);
        }
    };

    let correlator = Correlator::from_tools(tools);
    for job_id in &job_ids {
        match process_job(&correlator, job_id).await {
            Outcome::Reported(job) => print_job(&job, tools, config, request, out).await?,
            Outcome::NoData(id) => writeln!(out, "INFO => no data about job {}", id)?,
            Outcome::Failed(id, e) => {
                tracing::debug!(job_id = %id, error = %e, "Job skipped");
                writeln!(err, "[ja] Error : {}", e)?;
            }
        }
    }

    Ok(EXIT_SUCCESS)
}

async fn print_job<T: OomSource, W: Write>(
    job: &Job,
    tools: &T,
    config: &ToolsConfig,
    request: &Request,
    out: &mut W,
) -> io::Result<()> {
    match request.output {
        OutputFormat::Json => {
            let json = report::render_json(job).map_err(io::Error::other)?;
            writeln!(out, "{}", json)?;
        }
        OutputFormat::Table => {
            writeln!(out, "{}", report::render(job, config))?;
            if job.oom_detected {
                let details = if request.oom_details {
                    match tools.oom_report(&job.id).await {
                        Ok(text) => Some(text),
                        Err(e) => {
                            tracing::debug!(job_id = %job.id, error = %e, "OOM killer report unavailable");
                            None
                        }
                    }
                } else {
                    None
                };
                writeln!(out, "{}", report::render_oom(job, details.as_deref()))?;
            }
        }
    }
    Ok(())
}
