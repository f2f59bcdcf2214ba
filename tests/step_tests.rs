//! Tests for splitting a job's accounting rows into steps.


use jobacct::identifier::JobId;
use jobacct::record::{Correlator, JobRecord, StepSet};
use test_harness::{row, FakeSlurm};

fn records(rows: &[String]) -> Vec<JobRecord> {
    rows.iter().map(|r| JobRecord::from_accounting_row(r)).collect()
}

#[test]
fn test_job_with_three_steps() {
    let rows = vec![
        row(&[("JobID", "10"), ("State", "COMPLETED")]),
        row(&[("JobID", "10.0")]),
        row(&[("JobID", "10.1")]),
        row(&[("JobID", "10.2")]),
    ];

    let steps = StepSet::aggregate(&records(&rows));

    assert_eq!(steps.len(), 4);
    assert_eq!(steps.main_index(), Some(0));
    assert_eq!(steps.display_count(), 3);
    assert!(steps.has_sub_steps());

    let listed: Vec<&str> = steps
        .listed()
        .iter()
        .map(|step| step.step_id.as_str())
        .collect();
    assert_eq!(listed, vec!["0", "1", "2"]);
}

#[test]
fn test_job_without_steps_lists_itself() {
    let rows = vec![row(&[("JobID", "10"), ("JobName", "solve")])];

    let steps = StepSet::aggregate(&records(&rows));

    assert_eq!(steps.main_index(), Some(0));
    assert_eq!(steps.display_count(), 0);
    assert!(!steps.has_sub_steps());

    let listed = steps.listed();
    assert_eq!(listed.len(), 1);
    assert!(listed[0].is_main());
    assert_eq!(listed[0].job_name.value(), Some("solve"));
}

#[test]
fn test_steps_keep_accounting_order() {
    let rows = vec![
        row(&[("JobID", "10.batch")]),
        row(&[("JobID", "10.extern")]),
        row(&[("JobID", "10")]),
        row(&[("JobID", "10.0")]),
    ];

    let steps = StepSet::aggregate(&records(&rows));

    let order: Vec<&str> = steps
        .steps()
        .iter()
        .map(|step| step.step_id.as_str())
        .collect();
    assert_eq!(order, vec!["batch", "extern", "", "0"]);
    assert_eq!(steps.main_index(), Some(2));

    let listed: Vec<&str> = steps
        .listed()
        .iter()
        .map(|step| step.step_id.as_str())
        .collect();
    assert_eq!(listed, vec!["batch", "extern", "0"]);
}

#[test]
fn test_step_suffix_of_array_task() {
    let rows = vec![row(&[("JobID", "42_3")]), row(&[("JobID", "42_3.0")])];

    let steps = StepSet::aggregate(&records(&rows));

    assert_eq!(steps.steps()[1].step_id, "0");
    assert_eq!(steps.main().unwrap().job_id.value(), Some("42_3"));
}

#[test]
fn test_requeued_job_uses_last_main_row() {
    let rows = vec![
        row(&[("JobID", "10"), ("State", "REQUEUED")]),
        row(&[("JobID", "10"), ("State", "COMPLETED")]),
        row(&[("JobID", "10.0")]),
    ];

    let steps = StepSet::aggregate(&records(&rows));

    assert_eq!(steps.main_index(), Some(1));
    assert_eq!(steps.main().unwrap().state.value(), Some("COMPLETED"));
    assert_eq!(steps.display_count(), 2);
}

#[test]
fn test_rows_without_main_are_all_listed() {
    let rows = vec![row(&[("JobID", "10.0")]), row(&[("JobID", "10.1")])];

    let steps = StepSet::aggregate(&records(&rows));

    assert_eq!(steps.main_index(), None);
    assert_eq!(steps.listed().len(), 2);
}

#[test]
fn test_empty_rows() {
    let steps = StepSet::aggregate(&[]);

    assert!(steps.is_empty());
    assert_eq!(steps.display_count(), 0);
    assert!(steps.listed().is_empty());
}

#[tokio::test]
async fn test_correlated_job_owns_its_steps() {
    let slurm = FakeSlurm::new().with_rows(
        "10",
        vec![
            row(&[("JobID", "10")]),
            row(&[("JobID", "10.0"), ("MaxRSS", "1024K"), ("MaxRSSNode", "node01")]),
        ],
    );
    let correlator = Correlator::from_tools(&slurm);

    let job = correlator
        .correlate(&JobId::parse("10").unwrap())
        .await
        .unwrap();

    assert_eq!(job.steps.display_count(), 1);
    let step = job.steps.listed()[0];
    assert_eq!(step.max_rss.value(), Some("1024K"));
    assert_eq!(step.max_rss_node.value(), Some("node01"));
}
