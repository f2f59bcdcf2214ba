//! Data source adapters for the external Slurm tools.
//!
//! Each collaborator is a narrow trait so the resolver and the correlator
//! can run against in-memory fakes in tests:
//!
//! - [`AccountingSource`]: the accounting database (`sacct`), authoritative
//!   for job outcome and resource usage
//! - [`LiveStateSource`]: the scheduler's live view (`scontrol`), falling
//!   back to the epilog-captured snapshot once the job has left the scheduler
//! - [`ArchiveSource`]: where the job's logs were archived
//! - [`OomSource`]: whether the OOM killer fired for the job
//!
//! [`SlurmTools`] implements all four by spawning the real tools through a
//! [`ToolRunner`], which bounds every call with the configured timeout.

pub mod runner;
pub mod slurm;

use async_trait::async_trait;

use crate::error::Result;
use crate::identifier::JobId;

pub use runner::{ToolOutput, ToolRunner};
pub use slurm::SlurmTools;

#[async_trait]
pub trait AccountingSource: Send + Sync {
    /// Every identifier accounting knows about, one entry per row (steps
    /// included, e.g. `42_0.batch`).
    async fn list_job_ids(&self) -> Result<Vec<String>>;

    /// Pipe-delimited rows for `job_id`, one per job or step, with the
    /// requested `columns` in order. Duplicate rows are included.
    async fn job_rows(&self, job_id: &JobId, columns: &[&str]) -> Result<Vec<String>>;
}

#[async_trait]
pub trait LiveStateSource: Send + Sync {
    /// Raw `key=value` text for the job, `None` when no source knows it.
    async fn job_state(&self, job_id: &JobId) -> Result<Option<String>>;
}

#[async_trait]
pub trait ArchiveSource: Send + Sync {
    async fn archive_location(&self, job_id: &JobId) -> Result<Option<String>>;
}

#[async_trait]
pub trait OomSource: Send + Sync {
    /// True when an OOM killer event is recorded for the job.
    async fn oom_detected(&self, job_id: &JobId) -> Result<bool>;

    /// Full event text, for the detailed report.
    async fn oom_report(&self, job_id: &JobId) -> Result<String>;
}
