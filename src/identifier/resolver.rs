use std::str::FromStr;

use crate::config::Directives;
use crate::error::{JobAcctError, Result};
use crate::identifier::JobId;
use crate::source::AccountingSource;

/// Job context inherited from the environment when running inside a job.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AmbientJob {
    pub job_id: Option<String>,
    pub array_task_id: Option<String>,
}

impl AmbientJob {
    pub fn from_env() -> Self {
        Self {
            job_id: std::env::var("SLURM_JOB_ID").ok(),
            array_task_id: std::env::var("SLURM_ARRAY_TASK_ID").ok(),
        }
    }

    /// The current job, as an array task id when running inside an array.
    pub fn job(&self) -> Result<JobId> {
        let job_id = self
            .job_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or(JobAcctError::MissingContext)?;

        match self.array_task_id.as_deref().map(str::trim) {
            Some(index) if !index.is_empty() => JobId::parse(&format!("{}_{}", job_id, index)),
            _ => JobId::parse(job_id),
        }
    }
}

/// Inclusive range of array indices, written `<start>-<end>` with optional
/// surrounding brackets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexRange {
    pub start: u64,
    pub end: u64,
}

impl IndexRange {
    pub fn contains(&self, index: u64) -> bool {
        (self.start..=self.end).contains(&index)
    }
}

impl FromStr for IndexRange {
    type Err = JobAcctError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || JobAcctError::InvalidRange(s.to_string());
        let inner = s.trim().trim_start_matches('[').trim_end_matches(']');
        let (start, end) = inner.split_once('-').ok_or_else(invalid)?;
        let start = start.trim().parse().map_err(|_| invalid())?;
        let end = end.trim().parse().map_err(|_| invalid())?;
        Ok(Self { start, end })
    }
}

/// Expands user input into the final, ordered list of job ids to report.
pub struct Resolver<'a> {
    accounting: &'a dyn AccountingSource,
}

impl<'a> Resolver<'a> {
    pub fn new(accounting: &'a dyn AccountingSource) -> Self {
        Self { accounting }
    }

    /// Resolve `input` (a job id or comma-separated list) against the jobs
    /// accounting currently knows.
    ///
    /// Without input the ambient job is used as-is; array expansion and
    /// range filtering apply only to explicit input.
    pub async fn resolve(
        &self,
        input: Option<&str>,
        directives: &Directives,
        ambient: &AmbientJob,
    ) -> Result<Vec<JobId>> {
        let input = input.map(str::trim).filter(|s| !s.is_empty());
        let Some(input) = input else {
            let job = ambient.job()?;
            tracing::debug!(job_id = %job, "Using job from environment");
            return Ok(vec![job]);
        };

        let range = directives
            .range
            .as_deref()
            .map(IndexRange::from_str)
            .transpose()?;

        let requested = JobId::parse_list(input)?;
        let mut resolved = self.expand_arrays(requested, directives).await?;

        if let Some(range) = range {
            filter_by_range(&mut resolved, &range);
        }

        tracing::debug!(job_ids = ?resolved, "Resolved job ids");
        Ok(resolved)
    }

    async fn expand_arrays(
        &self,
        requested: Vec<JobId>,
        directives: &Directives,
    ) -> Result<Vec<JobId>> {
        let known = if requested.iter().any(|id| !id.is_array_task()) {
            self.known_job_ids().await
        } else {
            Vec::new()
        };

        let mut resolved: Vec<JobId> = Vec::with_capacity(requested.len());
        for id in requested {
            if resolved.contains(&id) {
                continue;
            }
            if id.is_array_task() {
                resolved.push(id);
                continue;
            }

            let children: Vec<&JobId> = known.iter().filter(|k| k.is_child_of(&id)).collect();
            if children.is_empty() {
                resolved.push(id);
                continue;
            }
            if !directives.allows_expansion() {
                return Err(JobAcctError::AmbiguousParent(id.to_string()));
            }
            for child in children {
                if !resolved.contains(child) {
                    resolved.push(child.clone());
                }
            }
        }
        Ok(resolved)
    }

    /// Job ids known to accounting, step suffixes removed, first occurrence
    /// order kept.
    async fn known_job_ids(&self) -> Vec<JobId> {
        let raw = match self.accounting.list_job_ids().await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(error = %e, "Could not list accounting job ids, skipping array expansion");
                return Vec::new();
            }
        };

        let mut known: Vec<JobId> = Vec::new();
        for line in raw {
            let root = line.split('.').next().unwrap_or_default();
            if root.trim().is_empty() {
                continue;
            }
            let id = JobId::from_accounting(root);
            if !known.contains(&id) {
                known.push(id);
            }
        }
        known
    }
}

/// Drop array tasks whose index falls outside `range`. Plain ids are kept.
pub fn filter_by_range(ids: &mut Vec<JobId>, range: &IndexRange) {
    ids.retain(|id| {
        !id.is_array_task() || id.array_index().is_some_and(|index| range.contains(index))
    });
}
