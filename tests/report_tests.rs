//! Tests for the text and JSON reports.


use jobacct::config::{ToolsConfig, NOT_AVAILABLE};
use jobacct::identifier::JobId;
use jobacct::record::{Correlator, Job};
use jobacct::report;
use test_harness::{row, FakeSlurm};

async fn correlate(slurm: &FakeSlurm, id: &str) -> Job {
    Correlator::from_tools(slurm)
        .correlate(&JobId::parse(id).unwrap())
        .await
        .unwrap()
}

fn job_with_steps() -> FakeSlurm {
    FakeSlurm::new()
        .with_rows(
            "10",
            vec![
                row(&[
                    ("JobID", "10"),
                    ("Cluster", "hpc"),
                    ("JobName", "solve"),
                    ("User", "alice"),
                    ("UID", "1000"),
                    ("NCPUS", "4"),
                    ("Elapsed", "01:00:00"),
                    ("State", "COMPLETED"),
                ]),
                row(&[("JobID", "10.0"), ("JobName", "step-zero")]),
                row(&[("JobID", "10.1"), ("JobName", "step-one")]),
                row(&[("JobID", "10.2"), ("JobName", "step-two")]),
            ],
        )
        .with_live_state("10", "Command=/bin/solve StdOut=/tmp/10.out")
}

#[tokio::test]
async fn test_header_and_step_count() {
    let slurm = job_with_steps();
    let job = correlate(&slurm, "10").await;

    let text = report::render(&job, &ToolsConfig::default());

    assert!(text.contains("Cluster              : hpc"));
    assert!(text.contains("User                 : alice(1000)"));
    assert!(text.contains("Command              : /bin/solve"));
    assert!(text.contains("STEP(s): 3"));
    assert!(text.contains("step-zero"));
    assert!(text.contains("step-two"));
}

#[tokio::test]
async fn test_single_row_job_shows_zero_steps_and_itself() {
    let slurm = FakeSlurm::new().with_rows(
        "11",
        vec![row(&[("JobID", "11"), ("JobName", "lonely")])],
    );
    let job = correlate(&slurm, "11").await;

    let text = report::render(&job, &ToolsConfig::default());

    assert!(text.contains("STEP(s): 0"));
    assert_eq!(text.matches("lonely").count(), 2);
}

#[tokio::test]
async fn test_missing_fields_render_sentinel() {
    let slurm = job_with_steps();
    let job = correlate(&slurm, "10").await;

    let text = report::render(&job, &ToolsConfig::default());

    assert!(text.contains(&format!("StdErr               : {}", NOT_AVAILABLE)));
    assert!(text.contains(&format!("Log archive location : {}", NOT_AVAILABLE)));
}

#[tokio::test]
async fn test_custom_sentinel_text() {
    let slurm = job_with_steps();
    let job = correlate(&slurm, "10").await;
    let config = ToolsConfig {
        not_available: "n/a".to_string(),
        ..ToolsConfig::default()
    };

    let text = report::render(&job, &config);

    assert!(text.contains("StdErr               : n/a"));
    assert!(!text.contains(NOT_AVAILABLE));
}

#[tokio::test]
async fn test_cpu_equivalent_time() {
    let slurm = job_with_steps();
    let job = correlate(&slurm, "10").await;

    assert_eq!(report::cpu_equivalent_time(&job), Some("4:00:00".to_string()));
    assert!(report::render(&job, &ToolsConfig::default()).contains("TEI                  : 4:00:00"));
}

#[tokio::test]
async fn test_oom_warning() {
    let slurm = job_with_steps().with_oom("10");
    let job = correlate(&slurm, "10").await;

    let hint = report::render_oom(&job, None);
    assert!(hint.starts_with("WARNING: OOM KILLER detected !"));
    assert!(hint.contains("Use option \"-o\" for more details."));

    let detailed = report::render_oom(&job, Some("killed process 123\n"));
    assert!(detailed.contains("killed process 123"));
    assert!(!detailed.contains("Use option"));
}

#[tokio::test]
async fn test_no_oom_warning_without_event() {
    let slurm = job_with_steps();
    let job = correlate(&slurm, "10").await;

    assert!(report::render_oom(&job, None).is_empty());
}

#[tokio::test]
async fn test_json_output() {
    let slurm = job_with_steps();
    let job = correlate(&slurm, "10").await;

    let json: serde_json::Value = serde_json::from_str(&report::render_json(&job).unwrap()).unwrap();

    assert_eq!(json["id"], "10");
    assert_eq!(json["record"]["cluster"], "hpc");
    assert!(json["record"]["std_err"].is_null());
    assert_eq!(json["restarts"], 0);
    assert_eq!(json["steps"]["main_index"], 0);
    assert_eq!(json["steps"]["steps"].as_array().unwrap().len(), 4);
}
