//! End-to-end runs: validation, download, reconciliation and artifacts.

mod common;

use std::time::Duration;

use common::{MockServer, RecordingPause, Reply, md5_hex, write_manifest};
use snapfetch_core::{ColumnSpec, ConfigError, Error, OutputState, PreparedRun, RunConfig, run};
use snapfetch_fetch::RetryPolicy;
use snapfetch_verify::{ChecksumAlgorithm, ChecksumTable, DirectoryScanner, ScanError};

fn quick_retry() -> RetryPolicy { RetryPolicy::new(2, Duration::from_millis(1)) }

fn server() -> MockServer {
    MockServer::new()
        .route("http://x/a.jpg", vec![Reply::Body(b"alpha".to_vec())])
        .route("http://x/b.jpg", vec![Reply::Body(b"bravo".to_vec())])
        .route("http://x/c.jpg", vec![Reply::Body(b"charlie".to_vec())])
}

#[tokio::test]
async fn complete_download_reconciles_cleanly() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_manifest(
        dir.path(),
        "birds.csv",
        "filename,file_url\na.jpg,http://x/a.jpg\nb.jpg,http://x/b.jpg\nc.jpg,http://x/c.jpg\n",
    );
    let server = server();
    let pause = RecordingPause::default();
    let config = RunConfig::new(&input, dir.path().join("out")).retry(quick_retry());

    let summary = run(config, &server, &pause, DirectoryScanner::new()).await.unwrap();

    assert_eq!(summary.tally.delivered, 3);
    assert_eq!(summary.report.expected_count, 3);
    assert_eq!(summary.report.actual_count, 3);
    assert!(summary.report.counts_match());
    assert!(summary.report.verification.is_none());

    let table = ChecksumTable::read_csv(dir.path().join("birds_checksums.csv"), ChecksumAlgorithm::Md5).unwrap();
    assert_eq!(table.len(), 3);
    assert!(!dir.path().join("birds_missing.csv").exists());
}

#[tokio::test]
async fn single_checksum_mismatch_is_the_only_missing_row() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_manifest(
        dir.path(),
        "birds.csv",
        &format!(
            "filename,file_url,MD5\n\
             a.jpg,http://x/a.jpg,{}\n\
             b.jpg,http://x/b.jpg,{}\n\
             c.jpg,http://x/c.jpg,{}\n",
            md5_hex(b"alpha"),
            md5_hex(b"not bravo"),
            md5_hex(b"charlie").to_uppercase(),
        ),
    );
    let server = server();
    let pause = RecordingPause::default();
    let config = RunConfig::new(&input, dir.path().join("out"))
        .retry(quick_retry())
        .columns(ColumnSpec::default().verifier(Some("md5".to_string())));

    let summary = run(config, &server, &pause, DirectoryScanner::new()).await.unwrap();

    let verification = summary.report.verification.unwrap();
    assert_eq!(verification.checked, 3);
    assert_eq!(verification.missing.len(), 1);
    assert_eq!(verification.missing[0].image_name, "b.jpg");
    assert_eq!(verification.missing[0].last_status.as_deref(), Some("200"));

    let report = std::fs::read_to_string(dir.path().join("birds_missing.csv")).unwrap();
    let lines: Vec<&str> = report.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], "filename,file_url,MD5");
    assert!(lines[1].starts_with("b.jpg,http://x/b.jpg,"));
}

#[tokio::test]
async fn rerun_over_complete_output_gives_the_same_verdict() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_manifest(
        dir.path(),
        "birds.csv",
        &format!(
            "filename,file_url,md5\na.jpg,http://x/a.jpg,{}\nb.jpg,http://x/b.jpg,{}\n",
            md5_hex(b"alpha"),
            md5_hex(b"bravo"),
        ),
    );
    let server = server();
    let pause = RecordingPause::default();
    let config = RunConfig::new(&input, dir.path().join("out"))
        .retry(quick_retry())
        .columns(ColumnSpec::default().verifier(Some("md5".to_string())));

    let first = run(config.clone(), &server, &pause, DirectoryScanner::new()).await.unwrap();
    let prepared = PreparedRun::prepare(config).unwrap();
    assert!(prepared.inspect_output().unwrap().is_complete());
    let second_tally = prepared.download(&server, &pause, |_, _| {}).await.unwrap();
    let second = prepared.reconcile(DirectoryScanner::new()).unwrap();

    assert_eq!(first.report.missing_count(), 0);
    assert_eq!(second.missing_count(), 0);
    assert_eq!(first.report.actual_count, second.actual_count);
    assert_eq!(second_tally.already_present, 2);
    assert_eq!(server.hits("http://x/a.jpg"), 1);
}

#[tokio::test]
async fn duplicate_names_fail_before_any_request_or_write() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_manifest(
        dir.path(),
        "birds.csv",
        "filename,file_url\na.jpg,http://x/a.jpg\na.jpg,http://x/b.jpg\n",
    );
    let server = server();
    let pause = RecordingPause::default();
    let out = dir.path().join("out");

    let err = run(RunConfig::new(&input, &out), &server, &pause, DirectoryScanner::new())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Config(ConfigError::DuplicateNames { .. })));
    assert!(server.requests().is_empty());
    assert!(!out.exists());
    assert!(!dir.path().join("birds_log.jsonl").exists());
}

#[test]
fn missing_column_is_a_configuration_error() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_manifest(dir.path(), "birds.csv", "name,link\na.jpg,http://x/a.jpg\n");

    let err = PreparedRun::prepare(RunConfig::new(&input, dir.path().join("out"))).unwrap_err();
    assert!(matches!(err, Error::Config(ConfigError::MissingColumn { role: "name", .. })));
}

#[tokio::test]
async fn output_removed_before_reconciliation_aborts_but_keeps_logs() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_manifest(dir.path(), "birds.csv", "filename,file_url\na.jpg,\n");
    let server = server();
    let pause = RecordingPause::default();
    let out = dir.path().join("out");

    let prepared = PreparedRun::prepare(RunConfig::new(&input, &out)).unwrap();
    assert_eq!(prepared.inspect_output().unwrap(), OutputState::Absent);
    let tally = prepared.download(&server, &pause, |_, _| {}).await.unwrap();
    assert_eq!(tally.missing_url, 1);
    assert!(out.is_dir());

    std::fs::remove_dir_all(&out).unwrap();
    let err = prepared.reconcile(DirectoryScanner::new()).unwrap_err();
    assert!(matches!(err, Error::Reconcile(ScanError::NotADirectory { .. })));
    assert!(dir.path().join("birds_error_log.jsonl").is_file());
    assert!(!dir.path().join("birds_checksums.csv").exists());
}

#[tokio::test]
async fn total_outage_still_reconciles_with_every_row_missing() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_manifest(
        dir.path(),
        "birds.csv",
        &format!(
            "filename,file_url,md5\na.jpg,http://x/a.jpg,{}\nb.jpg,http://x/b.jpg,{}\n",
            md5_hex(b"alpha"),
            md5_hex(b"bravo"),
        ),
    );
    let server = MockServer::new()
        .route("http://x/a.jpg", vec![Reply::Status(503)])
        .route("http://x/b.jpg", vec![Reply::Refused]);
    let pause = RecordingPause::default();
    let config = RunConfig::new(&input, dir.path().join("out"))
        .retry(quick_retry())
        .columns(ColumnSpec::default().verifier(Some("md5".to_string())));

    let summary = run(config, &server, &pause, DirectoryScanner::new()).await.unwrap();

    assert_eq!(summary.tally.failed, 2);
    assert_eq!((summary.report.expected_count, summary.report.actual_count), (2, 0));
    assert_eq!(summary.report.missing_count(), 2);
    let report = std::fs::read_to_string(dir.path().join("birds_missing.csv")).unwrap();
    assert_eq!(report.lines().count(), 3);
}

/// Dot-prefixed names and subfolders are ordinary targets.
#[tokio::test]
async fn dot_prefixed_targets_count_toward_reconciliation() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_manifest(
        dir.path(),
        "birds.csv",
        &format!(
            "filename,file_url,dir,md5\n.a.jpg,http://x/a.jpg,,{}\nb.jpg,http://x/b.jpg,.cache,{}\n",
            md5_hex(b"alpha"),
            md5_hex(b"bravo"),
        ),
    );
    let server = server();
    let pause = RecordingPause::default();
    let out = dir.path().join("out");
    let config = RunConfig::new(&input, &out).retry(quick_retry()).columns(
        ColumnSpec::default()
            .subfolder(Some("dir".to_string()))
            .verifier(Some("md5".to_string())),
    );

    let summary = run(config, &server, &pause, DirectoryScanner::new()).await.unwrap();

    assert!(out.join(".a.jpg").is_file());
    assert!(out.join(".cache/b.jpg").is_file());
    assert_eq!((summary.report.expected_count, summary.report.actual_count), (2, 2));
    assert_eq!(summary.report.missing_count(), 0);
}

/// A verified run that finds nothing missing replaces an earlier report
/// with a header-only one.
#[tokio::test]
async fn clean_rerun_clears_an_earlier_missing_report() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_manifest(
        dir.path(),
        "birds.csv",
        &format!("filename,file_url,md5\na.jpg,http://x/a.jpg,{}\n", md5_hex(b"alpha")),
    );
    let config = RunConfig::new(&input, dir.path().join("out"))
        .retry(RetryPolicy::new(1, Duration::from_millis(1)))
        .columns(ColumnSpec::default().verifier(Some("md5".to_string())));
    let pause = RecordingPause::default();

    let down = MockServer::new().route("http://x/a.jpg", vec![Reply::Status(503)]);
    let first = run(config.clone(), &down, &pause, DirectoryScanner::new()).await.unwrap();
    assert_eq!(first.report.missing_count(), 1);
    let report = std::fs::read_to_string(dir.path().join("birds_missing.csv")).unwrap();
    assert!(report.contains("a.jpg,http://x/a.jpg"));

    let second = run(config, &server(), &pause, DirectoryScanner::new()).await.unwrap();
    assert_eq!(second.report.missing_count(), 0);
    let report = std::fs::read_to_string(dir.path().join("birds_missing.csv")).unwrap();
    assert_eq!(report.lines().collect::<Vec<_>>(), ["filename,file_url,md5"]);
}

#[tokio::test]
async fn failed_rows_show_up_as_count_mismatch_with_logged_status() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_manifest(
        dir.path(),
        "birds.csv",
        &format!(
            "filename,file_url,md5\na.jpg,http://x/a.jpg,{}\nz.jpg,http://x/z.jpg,{}\n",
            md5_hex(b"alpha"),
            md5_hex(b"zulu"),
        ),
    );
    let server = server().route("http://x/z.jpg", vec![Reply::Status(503)]);
    let pause = RecordingPause::default();
    let config = RunConfig::new(&input, dir.path().join("out"))
        .retry(quick_retry())
        .columns(ColumnSpec::default().verifier(Some("md5".to_string())));

    let summary = run(config, &server, &pause, DirectoryScanner::new()).await.unwrap();

    assert_eq!(summary.tally.failed, 1);
    assert_eq!((summary.report.expected_count, summary.report.actual_count), (2, 1));
    let missing = &summary.report.verification.unwrap().missing;
    assert_eq!(missing.len(), 1);
    assert_eq!(missing[0].image_name, "z.jpg");
    assert_eq!(missing[0].last_status.as_deref(), Some("503"));
    assert_eq!(server.hits("http://x/z.jpg"), 2);
}
