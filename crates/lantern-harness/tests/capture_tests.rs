use lantern_harness::artifacts::CaptureLog;
use lantern_harness::capture::capture;
use lantern_sim::LineStream;
use tokio_util::sync::CancellationToken;

fn temp_log(dir: &tempfile::TempDir) -> CaptureLog {
    CaptureLog::create(&dir.path().join("serial.txt")).unwrap()
}

#[tokio::test]
async fn test_sentinel_sets_completion_and_stops() {
    let dir = tempfile::tempdir().unwrap();
    let mut log = temp_log(&dir);
    let (tx, stream) = LineStream::channel();
    let completion = CancellationToken::new();
    let cancel = CancellationToken::new();

    tx.send("EVENT: Button Press".to_string()).unwrap();
    tx.send("  done \r".to_string()).unwrap();
    tx.send("after the end".to_string()).unwrap();

    let report = capture(stream, &mut log, "DONE", &completion, &cancel)
        .await
        .unwrap();

    assert!(report.sentinel_seen);
    assert!(completion.is_cancelled());
    assert_eq!(report.lines_captured, 2, "nothing read past the sentinel");

    drop(log);
    let text = std::fs::read_to_string(dir.path().join("serial.txt")).unwrap();
    assert_eq!(text, "EVENT: Button Press\n  done \r\n");
}

#[tokio::test]
async fn test_non_sentinel_lines_do_not_complete() {
    let dir = tempfile::tempdir().unwrap();
    let mut log = temp_log(&dir);
    let (tx, stream) = LineStream::channel();
    let completion = CancellationToken::new();
    let cancel = CancellationToken::new();

    tx.send("DONE AND MORE".to_string()).unwrap();
    tx.send("ALMOST DONE".to_string()).unwrap();
    drop(tx);

    let report = capture(stream, &mut log, "DONE", &completion, &cancel)
        .await
        .unwrap();

    assert!(!report.sentinel_seen);
    assert!(!completion.is_cancelled());
    assert_eq!(report.lines_captured, 2);
}

#[tokio::test]
async fn test_source_end_without_sentinel_returns_quietly() {
    let dir = tempfile::tempdir().unwrap();
    let mut log = temp_log(&dir);
    let (tx, stream) = LineStream::channel();
    let completion = CancellationToken::new();
    let cancel = CancellationToken::new();

    drop(tx);

    let report = capture(stream, &mut log, "DONE", &completion, &cancel)
        .await
        .unwrap();

    assert_eq!(report.lines_captured, 0);
    assert!(!report.sentinel_seen);
    assert!(!completion.is_cancelled());
    assert!(!report.cancelled);
}

#[tokio::test]
async fn test_never_signals_after_prior_cancellation() {
    let dir = tempfile::tempdir().unwrap();
    let mut log = temp_log(&dir);
    let (tx, stream) = LineStream::channel();
    let completion = CancellationToken::new();
    let cancel = CancellationToken::new();

    tx.send("DONE".to_string()).unwrap();
    cancel.cancel();

    let report = capture(stream, &mut log, "DONE", &completion, &cancel)
        .await
        .unwrap();

    assert!(report.cancelled);
    assert!(!report.sentinel_seen);
    assert!(!completion.is_cancelled());
    assert_eq!(report.lines_captured, 0);
}
