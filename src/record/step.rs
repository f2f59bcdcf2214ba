use serde::Serialize;

use crate::record::field::Field;
use crate::record::job::JobRecord;

/// One accounting row of a job: the job itself or one of its steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Step {
    /// Suffix after the last `.` of the row id (`0`, `batch`, `extern`);
    /// empty for the job's own row.
    pub step_id: String,
    pub job_id: Field,
    pub job_name: Field,
    pub state: Field,
    pub exit_code: Field,
    pub start: Field,
    pub end: Field,
    pub elapsed: Field,
    pub total_cpu: Field,
    pub cpu_time: Field,
    pub consumed_energy: Field,
    pub max_disk_read: Field,
    pub max_disk_write: Field,
    pub max_rss: Field,
    pub max_rss_task: Field,
    pub max_rss_node: Field,
    pub node_count: Field,
    pub node_list: Field,
    pub comment: Field,
}

impl Step {
    pub fn from_record(record: &JobRecord) -> Self {
        Self {
            step_id: record.step_suffix().to_string(),
            job_id: record.job_id.clone(),
            job_name: record.job_name.clone(),
            state: record.state.clone(),
            exit_code: record.exit_code.clone(),
            start: record.start.clone(),
            end: record.end.clone(),
            elapsed: record.elapsed.clone(),
            total_cpu: record.total_cpu.clone(),
            cpu_time: record.cpu_time.clone(),
            consumed_energy: record.consumed_energy.clone(),
            max_disk_read: record.max_disk_read.clone(),
            max_disk_write: record.max_disk_write.clone(),
            max_rss: record.max_rss.clone(),
            max_rss_task: record.max_rss_task.clone(),
            max_rss_node: record.max_rss_node.clone(),
            node_count: record.node_count.clone(),
            node_list: record.node_list.clone(),
            comment: record.comment.clone(),
        }
    }

    pub fn is_main(&self) -> bool {
        self.step_id.is_empty()
    }
}

/// Ordered steps of a job, in accounting row order.
///
/// `main_index` points at the job's own row (no step suffix). When several
/// such rows exist (requeued jobs reported with duplicates) the last one
/// wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StepSet {
    steps: Vec<Step>,
    main_index: Option<usize>,
}

impl StepSet {
    pub fn aggregate(records: &[JobRecord]) -> Self {
        let steps: Vec<Step> = records.iter().map(Step::from_record).collect();
        let main_index = steps.iter().rposition(Step::is_main);
        Self { steps, main_index }
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn main_index(&self) -> Option<usize> {
        self.main_index
    }

    pub fn main(&self) -> Option<&Step> {
        self.main_index.and_then(|i| self.steps.get(i))
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// True when at least one row besides the main record exists.
    pub fn has_sub_steps(&self) -> bool {
        (0..self.steps.len()).any(|i| Some(i) != self.main_index)
    }

    /// Step count shown in the report header: one less than the row count,
    /// since the job's own row is not a step.
    pub fn display_count(&self) -> usize {
        self.steps.len().saturating_sub(1)
    }

    /// Steps to list in the report. Every row except the main one; a job
    /// without sub-steps is listed as a single step equal to itself.
    pub fn listed(&self) -> Vec<&Step> {
        if !self.has_sub_steps() {
            return self.main().into_iter().collect();
        }
        self.steps
            .iter()
            .enumerate()
            .filter(|(i, _)| Some(*i) != self.main_index)
            .map(|(_, step)| step)
            .collect()
    }
}
