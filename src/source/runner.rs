use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;

use crate::error::{JobAcctError, Result};

/// Captured result of one tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Runs external tools with captured output, bounded by a timeout.
///
/// A non-zero exit is not an error at this level; callers decide what the
/// exit status means. Spawn failures and timeouts are reported as
/// [`JobAcctError::SourceUnavailable`]. The child is killed when the timeout
/// fires.
#[derive(Debug, Clone)]
pub struct ToolRunner {
    timeout: Duration,
}

impl ToolRunner {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub async fn run(&self, program: &Path, args: &[String]) -> Result<ToolOutput> {
        let tool = tool_name(program);
        tracing::debug!(tool = %tool, program = %program.display(), ?args, "Running tool");

        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        match tokio::time::timeout(self.timeout, child).await {
            Ok(result) => Self::process_output(&tool, result),
            Err(_) => {
                tracing::debug!(tool = %tool, timeout = ?self.timeout, "Tool timed out");
                Err(JobAcctError::SourceUnavailable {
                    tool,
                    reason: format!("timed out after {:?}", self.timeout),
                })
            }
        }
    }

    fn process_output(
        tool: &str,
        result: std::result::Result<std::process::Output, std::io::Error>,
    ) -> Result<ToolOutput> {
        match result {
            Ok(output) => {
                let exit_code = output.status.code();
                tracing::debug!(tool, exit_code = ?exit_code, "Tool finished");
                Ok(ToolOutput {
                    exit_code,
                    stdout: String::from_utf8_lossy(&output.stdout).to_string(),
                    stderr: String::from_utf8_lossy(&output.stderr).to_string(),
                })
            }
            Err(e) => {
                tracing::debug!(tool, error = %e, "Tool could not be started");
                Err(JobAcctError::SourceUnavailable {
                    tool: tool.to_string(),
                    reason: e.to_string(),
                })
            }
        }
    }
}

/// Short name of a tool for error messages: the program's file name.
pub(crate) fn tool_name(program: &Path) -> String {
    program
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| program.display().to_string())
}
