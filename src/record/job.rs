use serde::Serialize;

use crate::identifier::JobId;
use crate::record::field::Field;
use crate::record::step::StepSet;

/// Accessor for one named slot of a [`JobRecord`].
pub type Slot = fn(&mut JobRecord) -> &mut Field;

macro_rules! slot {
    ($field:ident) => {{
        fn slot(record: &mut JobRecord) -> &mut Field {
            &mut record.$field
        }
        slot as Slot
    }};
}

/// Every attribute the report can show for a job or a step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct JobRecord {
    // identity
    pub job_id: Field,
    pub cluster: Field,
    pub job_name: Field,
    pub account: Field,
    pub user: Field,
    pub uid: Field,
    pub group: Field,
    pub gid: Field,
    pub user_id: Field,
    pub comment: Field,

    // placement
    pub partition: Field,
    pub qos: Field,
    pub priority: Field,
    pub node_list: Field,
    pub node_count: Field,
    pub cpu_count: Field,
    pub task_count: Field,
    pub batch_host: Field,
    pub batch_flag: Field,
    pub requested_nodes: Field,
    pub excluded_nodes: Field,
    pub num_cpus: Field,
    pub num_nodes: Field,
    pub features: Field,
    pub gres: Field,
    pub licenses: Field,
    pub reservation: Field,
    pub contiguous: Field,
    pub min_memory_node: Field,
    pub req_mem: Field,

    // lifecycle
    pub state: Field,
    pub job_state: Field,
    pub reason: Field,
    pub exit_code: Field,
    pub derived_exit_code: Field,
    pub restarts: Field,
    pub requeue: Field,
    pub dependency: Field,

    // timing
    pub submit: Field,
    pub submit_time: Field,
    pub eligible: Field,
    pub start: Field,
    pub end: Field,
    pub elapsed: Field,
    pub run_time: Field,
    pub time_limit: Field,
    pub live_time_limit: Field,
    pub suspended: Field,

    // resource usage
    pub total_cpu: Field,
    pub user_cpu: Field,
    pub system_cpu: Field,
    pub cpu_time: Field,
    pub ave_cpu: Field,
    pub consumed_energy: Field,
    pub ave_disk_read: Field,
    pub max_disk_read: Field,
    pub max_disk_read_node: Field,
    pub max_disk_read_task: Field,
    pub ave_disk_write: Field,
    pub max_disk_write: Field,
    pub max_disk_write_node: Field,
    pub max_disk_write_task: Field,
    pub ave_rss: Field,
    pub max_rss: Field,
    pub max_rss_node: Field,
    pub max_rss_task: Field,
    pub max_vm_size: Field,

    // paths
    pub command: Field,
    pub work_dir: Field,
    pub std_in: Field,
    pub std_out: Field,
    pub std_err: Field,
}

/// Accounting columns, in the order requested from `sacct`. The first
/// column must stay `JobID`.
pub const ACCOUNTING_COLUMNS: &[(&str, Slot)] = &[
    ("JobID", slot!(job_id)),
    ("Cluster", slot!(cluster)),
    ("JobName", slot!(job_name)),
    ("Account", slot!(account)),
    ("User", slot!(user)),
    ("UID", slot!(uid)),
    ("Group", slot!(group)),
    ("GID", slot!(gid)),
    ("Partition", slot!(partition)),
    ("QOS", slot!(qos)),
    ("Priority", slot!(priority)),
    ("NodeList", slot!(node_list)),
    ("NNodes", slot!(node_count)),
    ("NCPUS", slot!(cpu_count)),
    ("NTasks", slot!(task_count)),
    ("ReqMem", slot!(req_mem)),
    ("State", slot!(state)),
    ("ExitCode", slot!(exit_code)),
    ("DerivedExitCode", slot!(derived_exit_code)),
    ("Submit", slot!(submit)),
    ("Eligible", slot!(eligible)),
    ("Start", slot!(start)),
    ("End", slot!(end)),
    ("Elapsed", slot!(elapsed)),
    ("Timelimit", slot!(time_limit)),
    ("Suspended", slot!(suspended)),
    ("TotalCPU", slot!(total_cpu)),
    ("UserCPU", slot!(user_cpu)),
    ("SystemCPU", slot!(system_cpu)),
    ("CPUTime", slot!(cpu_time)),
    ("AveCPU", slot!(ave_cpu)),
    ("ConsumedEnergy", slot!(consumed_energy)),
    ("AveDiskRead", slot!(ave_disk_read)),
    ("MaxDiskRead", slot!(max_disk_read)),
    ("MaxDiskReadNode", slot!(max_disk_read_node)),
    ("MaxDiskReadTask", slot!(max_disk_read_task)),
    ("AveDiskWrite", slot!(ave_disk_write)),
    ("MaxDiskWrite", slot!(max_disk_write)),
    ("MaxDiskWriteNode", slot!(max_disk_write_node)),
    ("MaxDiskWriteTask", slot!(max_disk_write_task)),
    ("AveRSS", slot!(ave_rss)),
    ("MaxRSS", slot!(max_rss)),
    ("MaxRSSNode", slot!(max_rss_node)),
    ("MaxRSSTask", slot!(max_rss_task)),
    ("MaxVMSize", slot!(max_vm_size)),
    ("Comment", slot!(comment)),
];

/// Keys read from live scheduler state. `Account`, `ExitCode`, `NodeList`,
/// `Partition`, `Priority` and `QOS` share a slot with an accounting column.
pub const LIVE_STATE_KEYS: &[(&str, Slot)] = &[
    ("Account", slot!(account)),
    ("BatchFlag", slot!(batch_flag)),
    ("BatchHost", slot!(batch_host)),
    ("Command", slot!(command)),
    ("Contiguous", slot!(contiguous)),
    ("Dependency", slot!(dependency)),
    ("ExcNodeList", slot!(excluded_nodes)),
    ("ExitCode", slot!(exit_code)),
    ("Features", slot!(features)),
    ("Gres", slot!(gres)),
    ("JobState", slot!(job_state)),
    ("Licenses", slot!(licenses)),
    ("MinMemoryNode", slot!(min_memory_node)),
    ("NodeList", slot!(node_list)),
    ("NumCPUs", slot!(num_cpus)),
    ("NumNodes", slot!(num_nodes)),
    ("Partition", slot!(partition)),
    ("Priority", slot!(priority)),
    ("QOS", slot!(qos)),
    ("Reason", slot!(reason)),
    ("ReqNodeList", slot!(requested_nodes)),
    ("Requeue", slot!(requeue)),
    ("Reservation", slot!(reservation)),
    ("Restarts", slot!(restarts)),
    ("RunTime", slot!(run_time)),
    ("StdErr", slot!(std_err)),
    ("StdIn", slot!(std_in)),
    ("StdOut", slot!(std_out)),
    ("SubmitTime", slot!(submit_time)),
    ("TimeLimit", slot!(live_time_limit)),
    ("UserId", slot!(user_id)),
    ("WorkDir", slot!(work_dir)),
];

/// Column list passed to the accounting tool.
pub fn accounting_column_names() -> Vec<&'static str> {
    ACCOUNTING_COLUMNS.iter().map(|(name, _)| *name).collect()
}

/// Collapse `CANCELLED by <uid>` and similar variants to `CANCELLED`.
pub fn normalize_state(value: &str) -> String {
    if value.contains("CANCELLED") {
        "CANCELLED".to_string()
    } else {
        value.to_string()
    }
}

/// Identifier column of a raw accounting row.
pub fn row_job_id(row: &str) -> &str {
    row.split('|').next().unwrap_or_default().trim()
}

/// Split a live-state dump into `key=value` pairs.
///
/// Tokens are whitespace separated. A token containing `=` starts a new
/// pair (split at the first `=`); any other token belongs to the previous
/// value, as in `Command=/bin/run --flag value`.
pub fn parse_live_state(text: &str) -> Vec<(String, String)> {
    let mut pairs: Vec<(String, String)> = Vec::new();
    for token in text.split_whitespace() {
        match token.split_once('=') {
            Some((key, value)) => pairs.push((key.to_string(), value.to_string())),
            None => {
                if let Some((_, value)) = pairs.last_mut() {
                    value.push(' ');
                    value.push_str(token);
                }
            }
        }
    }
    pairs
}

impl JobRecord {
    pub fn from_accounting_row(row: &str) -> Self {
        let mut record = Self::default();
        record.apply_accounting_row(row);
        record
    }

    /// Overwrite every slot with the matching column of `row`.
    ///
    /// Columns missing from a short row leave their slot untouched.
    pub fn apply_accounting_row(&mut self, row: &str) {
        for (&(column, slot), value) in ACCOUNTING_COLUMNS.iter().zip(row.split('|')) {
            let value = if column == "State" {
                normalize_state(value)
            } else {
                value.to_string()
            };
            *slot(self) = Field::accounting(value);
        }
    }

    /// Fill slots from live-state pairs. A value equal to its own key means
    /// the source never populated the field.
    pub fn apply_live_state(&mut self, pairs: &[(String, String)]) {
        for (key, value) in pairs {
            let Some(&(_, slot)) = LIVE_STATE_KEYS.iter().find(|(name, _)| name == key) else {
                continue;
            };
            let field = if value == key {
                Field::NotAvailable
            } else if key == "JobState" {
                Field::live_state(normalize_state(value))
            } else {
                Field::live_state(value.as_str())
            };
            *slot(self) = field;
        }
    }

    /// Step suffix of this record's identifier; empty for the job itself.
    pub fn step_suffix(&self) -> &str {
        self.job_id
            .value()
            .and_then(|id| id.rsplit_once('.'))
            .map(|(_, suffix)| suffix)
            .unwrap_or_default()
    }
}

/// A fully correlated job, ready to be rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Job {
    pub id: JobId,
    pub record: JobRecord,
    /// Always numeric; zero when the live-state source did not report it.
    pub restarts: u32,
    pub archive_location: Field,
    pub oom_detected: bool,
    pub is_heterogeneous: bool,
    pub steps: StepSet,
}
