use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Text shown for any field no source ever populated.
pub const NOT_AVAILABLE: &str = "*** Not available ***";

const JOB_INFO_TOOL: &str = "/opt/softs/adm/slurm/bin/showJobInfo";

/// An external program and the arguments placed before the job id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl ToolCommand {
    pub fn new(program: impl Into<PathBuf>, args: &[&str]) -> Self {
        Self {
            program: program.into(),
            args: args.iter().map(|arg| arg.to_string()).collect(),
        }
    }

    /// Full argument list for one job: the prefix followed by `job_id`.
    pub fn args_for(&self, job_id: &str) -> Vec<String> {
        let mut args = self.args.clone();
        args.push(job_id.to_string());
        args
    }
}

/// Parses a whitespace-separated command line such as
/// `showJobInfo -c oom_killer -j`.
impl FromStr for ToolCommand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut words = s.split_whitespace();
        let program = words.next().ok_or_else(|| "empty command".to_string())?;
        Ok(Self {
            program: PathBuf::from(program),
            args: words.map(str::to_string).collect(),
        })
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Locations and limits for the external Slurm tools.
///
/// Every adapter receives this structure; nothing reads tool paths from
/// process-wide constants.
#[derive(Debug, Clone)]
pub struct ToolsConfig {
    /// Accounting database query tool (`sacct`)
    pub sacct_path: PathBuf,
    /// Live scheduler state query tool (`scontrol`)
    pub scontrol_path: PathBuf,
    /// Epilog-captured snapshot, used when the scheduler no longer knows
    /// the job
    pub live_state_fallback_command: ToolCommand,
    /// Archived log location query
    pub archive_command: ToolCommand,
    /// OOM killer event query. Exit status 0 means an event was recorded.
    pub oom_command: ToolCommand,
    /// Upper bound for a single tool invocation
    pub timeout: Duration,
    /// Text rendered for fields no source populated
    pub not_available: String,
    /// Banner printed at the top of each report
    pub title: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            sacct_path: PathBuf::from("/usr/bin/sacct"),
            scontrol_path: PathBuf::from("/usr/bin/scontrol"),
            live_state_fallback_command: ToolCommand::new(JOB_INFO_TOOL, &["-c", "scontrol", "-j"]),
            archive_command: ToolCommand::new(JOB_INFO_TOOL, &["-c", "archive_location", "-j"]),
            oom_command: ToolCommand::new(JOB_INFO_TOOL, &["-c", "oom_killer", "-j"]),
            timeout: Duration::from_secs(5),
            not_available: NOT_AVAILABLE.to_string(),
            title: "BULL - METEO-FRANCE".to_string(),
        }
    }
}

impl ToolsConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// User directives controlling job array expansion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Directives {
    /// Replace an array parent id by all of its children
    pub replace: bool,
    /// Keep only array children whose index lies in `<start>-<end>`
    pub range: Option<String>,
}

impl Directives {
    /// True when a parent id may be expanded into its array children.
    pub fn allows_expansion(&self) -> bool {
        self.replace || self.range.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tools_config_default() {
        let cfg = ToolsConfig::default();
        assert_eq!(cfg.sacct_path, PathBuf::from("/usr/bin/sacct"));
        assert_eq!(cfg.scontrol_path, PathBuf::from("/usr/bin/scontrol"));
        assert_eq!(
            cfg.oom_command.to_string(),
            "/opt/softs/adm/slurm/bin/showJobInfo -c oom_killer -j"
        );
        assert_eq!(cfg.archive_command.args, vec!["-c", "archive_location", "-j"]);
        assert_eq!(cfg.live_state_fallback_command.args, vec!["-c", "scontrol", "-j"]);
        assert_eq!(cfg.timeout, Duration::from_secs(5));
        assert_eq!(cfg.not_available, NOT_AVAILABLE);
    }

    #[test]
    fn tools_config_with_timeout() {
        let cfg = ToolsConfig::default().with_timeout(Duration::from_millis(250));
        assert_eq!(cfg.timeout, Duration::from_millis(250));
    }

    #[test]
    fn tool_command_parses_prefix() {
        let cmd: ToolCommand = "/usr/local/bin/jobinfo  --oom -j".parse().unwrap();
        assert_eq!(cmd.program, PathBuf::from("/usr/local/bin/jobinfo"));
        assert_eq!(cmd.args_for("42_3"), vec!["--oom", "-j", "42_3"]);
    }

    #[test]
    fn tool_command_without_args() {
        let cmd: ToolCommand = "oomcheck".parse().unwrap();
        assert!(cmd.args.is_empty());
        assert_eq!(cmd.args_for("7"), vec!["7"]);
        assert!("   ".parse::<ToolCommand>().is_err());
    }

    #[test]
    fn directives_expansion() {
        assert!(!Directives::default().allows_expansion());
        assert!(Directives {
            replace: true,
            range: None
        }
        .allows_expansion());
        assert!(Directives {
            replace: false,
            range: Some("0-3".to_string())
        }
        .allows_expansion());
    }
}
