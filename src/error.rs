use thiserror::Error;

#[derive(Error, Debug)]
pub enum JobAcctError {
    #[error("Wrong input jobid '{0}' (digits only, or an array task id such as 42_1)")]
    MalformedIdentifier(String),

    #[error("SLURM_JOB_ID not found in your environment")]
    MissingContext,

    #[error(
        "Job {0} is parent to a job array, please enter children job ID (ex : {0}_1) or use --replace flag"
    )]
    AmbiguousParent(String),

    #[error("Invalid range '{0}', expected <start>-<end>")]
    InvalidRange(String),

    #[error("no data about job {0}")]
    NoAccountingData(String),

    #[error("Accounting source unavailable for job {job_id}: {reason}")]
    AccountingUnavailable { job_id: String, reason: String },

    #[error("{tool} unavailable: {reason}")]
    SourceUnavailable { tool: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl JobAcctError {
    /// Errors caused by the command line itself. They abort the whole
    /// invocation with exit code 1.
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            JobAcctError::MalformedIdentifier(_)
                | JobAcctError::MissingContext
                | JobAcctError::AmbiguousParent(_)
                | JobAcctError::InvalidRange(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, JobAcctError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_errors_are_classified() {
        assert!(JobAcctError::MalformedIdentifier("abc".into()).is_usage_error());
        assert!(JobAcctError::MissingContext.is_usage_error());
        assert!(JobAcctError::AmbiguousParent("42".into()).is_usage_error());
        assert!(JobAcctError::InvalidRange("1..3".into()).is_usage_error());
        assert!(!JobAcctError::NoAccountingData("42".into()).is_usage_error());
        assert!(!JobAcctError::SourceUnavailable {
            tool: "scontrol".into(),
            reason: "timed out".into(),
        }
        .is_usage_error());
    }

    #[test]
    fn ambiguous_parent_message_suggests_child() {
        let msg = JobAcctError::AmbiguousParent("42".into()).to_string();
        assert!(msg.contains("42_1"));
        assert!(msg.contains("--replace"));
    }
}
