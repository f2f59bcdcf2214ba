use async_trait::async_trait;

use crate::config::{ToolCommand, ToolsConfig};
use crate::error::{JobAcctError, Result};
use crate::identifier::JobId;
use crate::source::runner::tool_name;
use crate::source::{
    AccountingSource, ArchiveSource, LiveStateSource, OomSource, ToolOutput, ToolRunner,
};

/// Adapters backed by the Slurm command-line tools.
#[derive(Debug, Clone)]
pub struct SlurmTools {
    config: ToolsConfig,
    runner: ToolRunner,
}

impl SlurmTools {
    pub fn new(config: ToolsConfig) -> Self {
        let runner = ToolRunner::new(config.timeout);
        Self { config, runner }
    }

    pub fn config(&self) -> &ToolsConfig {
        &self.config
    }

    async fn run_for_job(&self, command: &ToolCommand, job_id: &JobId) -> Result<ToolOutput> {
        self.runner
            .run(&command.program, &command.args_for(job_id.as_str()))
            .await
    }
}

fn sacct_args(format: &str) -> Vec<String> {
    vec![
        "--duplicates".to_string(),
        "--noheader".to_string(),
        "--parsable2".to_string(),
        format!("--format={}", format),
    ]
}

fn non_empty_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect()
}

fn unavailable(tool: &str, output: &ToolOutput) -> JobAcctError {
    let stderr = output.stderr.trim();
    JobAcctError::SourceUnavailable {
        tool: tool.to_string(),
        reason: if stderr.is_empty() {
            format!("exit code {:?}", output.exit_code)
        } else {
            stderr.to_string()
        },
    }
}

/// Extract the path from `ArchiveLocation=<path>` output.
pub fn parse_archive_location(text: &str) -> Option<String> {
    text.lines()
        .filter_map(|line| line.trim().split_once("ArchiveLocation="))
        .map(|(_, path)| path.trim().to_string())
        .find(|path| !path.is_empty())
}

#[async_trait]
impl AccountingSource for SlurmTools {
    async fn list_job_ids(&self) -> Result<Vec<String>> {
        let output = self
            .runner
            .run(&self.config.sacct_path, &sacct_args("JobID"))
            .await?;
        if !output.success() {
            return Err(unavailable("sacct", &output));
        }
        Ok(non_empty_lines(&output.stdout)
            .into_iter()
            .map(|line| line.trim().to_string())
            .collect())
    }

    async fn job_rows(&self, job_id: &JobId, columns: &[&str]) -> Result<Vec<String>> {
        let mut args = sacct_args(&columns.join(","));
        args.push(format!("--jobs={}", job_id));

        let output = self
            .runner
            .run(&self.config.sacct_path, &args)
            .await
            .map_err(|e| JobAcctError::AccountingUnavailable {
                job_id: job_id.to_string(),
                reason: e.to_string(),
            })?;

        if !output.success() {
            return Err(JobAcctError::AccountingUnavailable {
                job_id: job_id.to_string(),
                reason: unavailable("sacct", &output).to_string(),
            });
        }
        Ok(non_empty_lines(&output.stdout))
    }
}

#[async_trait]
impl LiveStateSource for SlurmTools {
    async fn job_state(&self, job_id: &JobId) -> Result<Option<String>> {
        let args = vec![
            "--all".to_string(),
            "show".to_string(),
            "job".to_string(),
            job_id.to_string(),
        ];
        match self.runner.run(&self.config.scontrol_path, &args).await {
            Ok(output) if output.success() && !output.stdout.trim().is_empty() => {
                return Ok(Some(output.stdout));
            }
            Ok(output) => {
                tracing::debug!(job_id = %job_id, exit_code = ?output.exit_code, "Job not in live state, using epilog snapshot");
            }
            Err(e) => {
                tracing::debug!(job_id = %job_id, error = %e, "Live state query failed, using epilog snapshot");
            }
        }

        let command = &self.config.live_state_fallback_command;
        let output = self.run_for_job(command, job_id).await?;
        if !output.success() {
            return Err(unavailable(&tool_name(&command.program), &output));
        }
        if output.stdout.trim().is_empty() {
            Ok(None)
        } else {
            Ok(Some(output.stdout))
        }
    }
}

#[async_trait]
impl ArchiveSource for SlurmTools {
    async fn archive_location(&self, job_id: &JobId) -> Result<Option<String>> {
        let command = &self.config.archive_command;
        let output = self.run_for_job(command, job_id).await?;
        if !output.success() {
            return Err(unavailable(&tool_name(&command.program), &output));
        }
        Ok(parse_archive_location(&output.stdout))
    }
}

#[async_trait]
impl OomSource for SlurmTools {
    async fn oom_detected(&self, job_id: &JobId) -> Result<bool> {
        let output = self.run_for_job(&self.config.oom_command, job_id).await?;
        Ok(output.success())
    }

    async fn oom_report(&self, job_id: &JobId) -> Result<String> {
        let command = &self.config.oom_command;
        let output = self.run_for_job(command, job_id).await?;
        if !output.success() {
            return Err(unavailable(&tool_name(&command.program), &output));
        }
        Ok(output.stdout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn archive_location_is_extracted() {
        assert_eq!(
            parse_archive_location("ArchiveLocation=/archive/2026/42\n"),
            Some("/archive/2026/42".to_string())
        );
        assert_eq!(
            parse_archive_location("noise\n  ArchiveLocation=/a/b  \n"),
            Some("/a/b".to_string())
        );
    }

    #[test]
    fn archive_location_missing() {
        assert_eq!(parse_archive_location(""), None);
        assert_eq!(parse_archive_location("ArchiveLocation=\n"), None);
        assert_eq!(parse_archive_location("something else"), None);
    }

    #[test]
    fn sacct_args_shape() {
        let args = sacct_args("JobID,State");
        assert_eq!(
            args,
            vec![
                "--duplicates",
                "--noheader",
                "--parsable2",
                "--format=JobID,State"
            ]
        );
    }

    #[test]
    fn empty_lines_are_dropped() {
        assert_eq!(
            non_empty_lines("10|a\n\n10.0|b\r\n  \n"),
            vec!["10|a".to_string(), "10.0|b".to_string()]
        );
    }
}
