use crate::error::{JobAcctError, Result};
use crate::identifier::JobId;
use crate::record::field::Field;
use crate::record::job::{
    accounting_column_names, parse_live_state, row_job_id, Job, JobRecord, ACCOUNTING_COLUMNS,
    LIVE_STATE_KEYS,
};
use crate::record::step::StepSet;
use crate::source::{AccountingSource, ArchiveSource, LiveStateSource, OomSource};

/// Merges the data sources into one [`Job`] per identifier.
///
/// Only the accounting source is mandatory. Live state, archive location
/// and OOM lookups that fail leave their fields not available.
pub struct Correlator<'a> {
    accounting: &'a dyn AccountingSource,
    live_state: &'a dyn LiveStateSource,
    archive: &'a dyn ArchiveSource,
    oom: &'a dyn OomSource,
}

impl<'a> Correlator<'a> {
    pub fn new(
        accounting: &'a dyn AccountingSource,
        live_state: &'a dyn LiveStateSource,
        archive: &'a dyn ArchiveSource,
        oom: &'a dyn OomSource,
    ) -> Self {
        Self {
            accounting,
            live_state,
            archive,
            oom,
        }
    }

    /// Use one value for all four sources.
    pub fn from_tools<T>(tools: &'a T) -> Self
    where
        T: AccountingSource + LiveStateSource + ArchiveSource + OomSource,
    {
        Self::new(tools, tools, tools, tools)
    }

    pub async fn correlate(&self, job_id: &JobId) -> Result<Job> {
        let rows = self
            .accounting
            .job_rows(job_id, &accounting_column_names())
            .await?;
        if rows.is_empty() {
            return Err(JobAcctError::NoAccountingData(job_id.to_string()));
        }
        let is_heterogeneous = rows.iter().any(|row| is_heterogeneous_row(row));
        let records: Vec<JobRecord> = rows
            .iter()
            .map(|row| JobRecord::from_accounting_row(row))
            .collect();

        let live_pairs = match self.live_state.job_state(job_id).await {
            Ok(Some(text)) => parse_live_state(&text),
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::debug!(job_id = %job_id, error = %e, "Live state unavailable");
                Vec::new()
            }
        };

        let archive_location = match self.archive.archive_location(job_id).await {
            Ok(Some(path)) => Field::live_state(path),
            Ok(None) => Field::NotAvailable,
            Err(e) => {
                tracing::debug!(job_id = %job_id, error = %e, "Archive location unavailable");
                Field::NotAvailable
            }
        };

        let oom_detected = match self.oom.oom_detected(job_id).await {
            Ok(detected) => detected,
            Err(e) => {
                tracing::debug!(job_id = %job_id, error = %e, "OOM lookup unavailable");
                false
            }
        };

        // Live state first, so accounting overrides every shared slot.
        let mut record = JobRecord::default();
        record.apply_live_state(&live_pairs);
        record.apply_accounting_row(&rows[select_main_row(&rows, job_id)]);

        let restarts = record
            .restarts
            .value()
            .and_then(|value| value.trim().parse().ok())
            .unwrap_or(0);

        log_fields(job_id, &mut record);

        let steps = StepSet::aggregate(&records);
        tracing::debug!(
            job_id = %job_id,
            rows = steps.len(),
            main_index = ?steps.main_index(),
            is_heterogeneous,
            oom_detected,
            "Job correlated"
        );

        Ok(Job {
            id: job_id.clone(),
            record,
            restarts,
            archive_location,
            oom_detected,
            is_heterogeneous,
            steps,
        })
    }
}

/// True when the row belongs to a heterogeneous job component (`42+1`).
pub fn is_heterogeneous_row(row: &str) -> bool {
    row_job_id(row)
        .split('.')
        .next()
        .is_some_and(|id| JobId::from_accounting(id).is_heterogeneous_component())
}

/// Index of the row describing the job itself: the last row whose id is
/// exactly `job_id`, else the first heterogeneous leader row (`<id>+0`),
/// else the last row without a step suffix, else the first row.
pub fn select_main_row(rows: &[String], job_id: &JobId) -> usize {
    let leader = format!("{}+0", job_id);
    rows.iter()
        .rposition(|row| row_job_id(row) == job_id.as_str())
        .or_else(|| rows.iter().position(|row| row_job_id(row) == leader))
        .or_else(|| rows.iter().rposition(|row| !row_job_id(row).contains('.')))
        .unwrap_or(0)
}

fn log_fields(job_id: &JobId, record: &mut JobRecord) {
    if !tracing::enabled!(tracing::Level::DEBUG) {
        return;
    }
    for &(name, slot) in ACCOUNTING_COLUMNS.iter().chain(LIVE_STATE_KEYS.iter()) {
        let field = &*slot(record);
        if !field.is_available() {
            continue;
        }
        tracing::debug!(job_id = %job_id, field = name, value = %field, source = ?field.source(), "Field");
    }
}
