//! # Runner Integration Tests / 运行器集成测试
//!
//! Drives the sequential runner end to end over in-memory collaborators and
//! checks that every probe produces exactly one record, whatever happens to it.
//!
//! 使用内存中的协作者端到端驱动顺序运行器，
//! 检查每个探针无论发生什么都恰好产生一条记录。

mod common;

use common::{row, FakeApi, FakeReply, FakeSource};
use share_consistency::config::{starter_probes, ProbeKind, ProbeSpec};
use share_consistency::execution::{RunOptions, Runner};
use share_consistency::models::{Outcome, SqlValue};
use share_consistency::reporting::html::render_html_report;
use share_consistency::reporting::json::to_json_string;

fn quiet(warnings_as_failures: bool) -> RunOptions {
    RunOptions {
        locale: "en".to_string(),
        warnings_as_failures,
        live_output: false,
    }
}

fn healthy_source() -> FakeSource {
    let shares_columns = [
        "id",
        "share_id",
        "post_id",
        "sender_id",
        "receiver_id",
        "share_message",
        "create_time",
    ];
    FakeSource::new()
        .with_rows(
            "information_schema.TABLES",
            vec![row([("table_name", SqlValue::Text("shares".into()))])],
        )
        .with_rows(
            "information_schema.COLUMNS",
            shares_columns
                .iter()
                .map(|c| row([("column_name", SqlValue::Text(c.to_string()))]))
                .collect(),
        )
        .with_rows(
            "FROM shares",
            vec![row([
                ("share_id", SqlValue::Text("S1".into())),
                ("post_id", SqlValue::Int(65)),
                ("post_title", SqlValue::Text("Sunset".into())),
            ])],
        )
        .with_rows(
            "FROM posts",
            vec![row([
                ("id", SqlValue::Int(65)),
                ("post_id", SqlValue::Text("P65".into())),
                ("title", SqlValue::Text("Sunset".into())),
            ])],
        )
        .with_rows(
            "FROM users",
            vec![
                row([("id", SqlValue::Int(2)), ("username", SqlValue::Text("alice".into()))]),
                row([("id", SqlValue::Int(35)), ("username", SqlValue::Text("bob".into()))]),
            ],
        )
        .with_rows(
            "FROM follows",
            vec![
                row([("follower_id", SqlValue::Int(2)), ("followee_id", SqlValue::Int(35))]),
                row([("follower_id", SqlValue::Int(35)), ("followee_id", SqlValue::Int(2))]),
            ],
        )
}

#[tokio::test]
async fn test_healthy_system_passes_every_probe() {
    let runner = Runner::new(healthy_source(), FakeApi::up(), quiet(true));
    let probes = starter_probes();
    let report = runner.run(&probes).await;

    assert_eq!(report.records.len(), probes.len());
    for record in &report.records {
        assert!(record.outcome.is_pass(), "{} did not pass: {}", record.name, record.outcome);
    }
    assert!(report.summary.is_success());
    assert_eq!(report.summary.passed, probes.len());
    assert!(report.finished_at >= report.started_at);
}

#[tokio::test]
async fn test_records_follow_plan_order() {
    let runner = Runner::new(FakeSource::new(), FakeApi::up(), quiet(true));
    let probes = starter_probes();
    let report = runner.run(&probes).await;

    let expected: Vec<&str> = probes.iter().map(|p| p.name.as_str()).collect();
    let actual: Vec<&str> = report.records.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(actual, expected);
}

#[tokio::test]
async fn test_empty_database_does_not_abort_the_run() {
    let runner = Runner::new(FakeSource::new(), FakeApi::up(), quiet(true));
    let report = runner.run(&starter_probes()).await;

    assert_eq!(report.records.len(), 6);
    assert!(!report.summary.is_success());
    // The API probe is independent of the database and still passes.
    assert!(report.records[5].outcome.is_pass());
    assert_eq!(report.summary.passed + report.summary.failed, report.summary.total);
}

#[tokio::test]
async fn test_panicking_probe_becomes_error_and_run_continues() {
    let source = healthy_source().panicking_on("FROM shares");
    let runner = Runner::new(source, FakeApi::up(), quiet(true));
    let report = runner.run(&starter_probes()).await;

    assert_eq!(report.records.len(), 6);
    let shares = &report.records[1];
    assert_eq!(shares.name, "recent-shares");
    assert!(shares.outcome.is_error());
    assert!(shares.outcome.message().contains("unexpected error"));
    assert!(report.records[2].outcome.is_pass());
    assert_eq!(report.summary.errored, 1);
}

#[tokio::test]
async fn test_probe_error_is_classified() {
    let probes = vec![ProbeSpec {
        name: "feed".to_string(),
        kind: ProbeKind::Endpoint {
            method: "GET".to_string(),
            path: "/api/v1/shares".to_string(),
            auth: true,
            timeout_secs: None,
        },
    }];
    let runner = Runner::new(FakeSource::new(), FakeApi::new(FakeReply::Structural), quiet(true));
    let report = runner.run(&probes).await;

    assert!(matches!(report.records[0].outcome, Outcome::Fail { .. }));
    assert!(report.records[0].outcome.message().contains("api.token"));
}

#[tokio::test]
async fn test_warning_policy_controls_verdict() {
    let probes = vec![ProbeSpec {
        name: "mutual-follow".to_string(),
        kind: ProbeKind::MutualFollow {
            user_a: 2,
            user_b: 35,
        },
    }];

    let strict = Runner::new(FakeSource::new(), FakeApi::up(), quiet(true));
    let report = strict.run(&probes).await;
    assert!(report.records[0].outcome.is_warn());
    assert!(!report.summary.is_success());

    let lenient = Runner::new(FakeSource::new(), FakeApi::up(), quiet(false));
    let report = lenient.run(&probes).await;
    assert!(report.summary.is_success());
    assert_eq!(report.summary.warned, 1);
}

#[tokio::test]
async fn test_empty_plan_yields_empty_successful_report() {
    let runner = Runner::new(FakeSource::new(), FakeApi::up(), quiet(true));
    let report = runner.run(&[]).await;
    assert!(report.records.is_empty());
    assert!(report.summary.is_success());
}

#[tokio::test]
async fn test_report_renders_to_json_and_html() {
    let runner = Runner::new(FakeSource::new(), FakeApi::up(), quiet(true));
    let report = runner.run(&starter_probes()).await;

    let json: serde_json::Value = serde_json::from_str(&to_json_string(&report).unwrap()).unwrap();
    assert_eq!(json["records"].as_array().unwrap().len(), 6);
    assert_eq!(json["records"][0]["outcome"]["status"], "fail");
    assert_eq!(json["summary"]["total"], 6);

    let html = render_html_report(&report, "en").into_string();
    assert!(html.contains("shares-schema"));
    assert!(html.contains("status-fail"));
    assert!(html.contains("status-pass"));
}
