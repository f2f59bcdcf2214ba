use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use jobacct::app::{self, OutputFormat, Request};
use jobacct::config::{Directives, ToolCommand, ToolsConfig};
use jobacct::identifier::AmbientJob;
use jobacct::source::SlurmTools;

#[derive(Parser, Debug)]
#[command(name = "ja")]
#[command(version)]
#[command(about = "Print accounting information about Slurm jobs")]
struct Args {
    /// Job id or comma-separated list of job ids (defaults to $SLURM_JOB_ID)
    jobid: Option<String>,

    /// Debug mode (developers)
    #[arg(short, long)]
    debug: bool,

    /// Display all information about the OOM killer
    #[arg(short, long)]
    oom: bool,

    /// Replace parent job ids by their job array children
    #[arg(short, long)]
    replace: bool,

    /// Range of job array indices to print, e.g. "0-10"
    #[arg(long)]
    range: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value = "table")]
    output: OutputFormat,

    #[command(flatten)]
    tools: ToolArgs,
}

// =============================================================================
// External Tools
// =============================================================================

#[derive(clap::Args, Debug, Clone)]
struct ToolArgs {
    /// Accounting query tool
    #[arg(long, env = "JA_SACCT", default_value = "/usr/bin/sacct")]
    sacct: PathBuf,

    /// Live scheduler state tool
    #[arg(long, env = "JA_SCONTROL", default_value = "/usr/bin/scontrol")]
    scontrol: PathBuf,

    /// Epilog snapshot command, used once the scheduler has forgotten the
    /// job (the job id is appended)
    #[arg(
        long,
        env = "JA_LIVE_STATE_FALLBACK",
        default_value = "/opt/softs/adm/slurm/bin/showJobInfo -c scontrol -j"
    )]
    live_state_fallback: ToolCommand,

    /// Archived log location command (the job id is appended)
    #[arg(
        long,
        env = "JA_ARCHIVE_LOCATION",
        default_value = "/opt/softs/adm/slurm/bin/showJobInfo -c archive_location -j"
    )]
    archive_location: ToolCommand,

    /// OOM killer event command (the job id is appended)
    #[arg(
        long,
        env = "JA_OOM_KILLER",
        default_value = "/opt/softs/adm/slurm/bin/showJobInfo -c oom_killer -j"
    )]
    oom_killer: ToolCommand,

    /// Timeout in seconds for each tool invocation
    #[arg(long, env = "JA_TIMEOUT", default_value = "5")]
    timeout: u64,

    /// Report banner
    #[arg(long, env = "JA_TITLE", default_value = "BULL - METEO-FRANCE")]
    title: String,
}

impl ToolArgs {
    fn into_config(self) -> ToolsConfig {
        ToolsConfig {
            sacct_path: self.sacct,
            scontrol_path: self.scontrol,
            live_state_fallback_command: self.live_state_fallback,
            archive_command: self.archive_location,
            oom_command: self.oom_killer,
            timeout: Duration::from_secs(self.timeout),
            title: self.title,
            ..ToolsConfig::default()
        }
    }
}

// =============================================================================
// Main Entry Point
// =============================================================================

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let default_level = if args.debug { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let tools = SlurmTools::new(args.tools.into_config());
    let request = Request {
        job_ids: args.jobid,
        directives: Directives {
            replace: args.replace,
            range: args.range,
        },
        output: args.output,
        oom_details: args.oom,
    };

    let code = app::run(
        &tools,
        tools.config(),
        &request,
        &AmbientJob::from_env(),
        &mut std::io::stdout(),
        &mut std::io::stderr(),
    )
    .await?;

    if code != app::EXIT_SUCCESS {
        std::process::exit(code);
    }
    Ok(())
}
