//! Failure-mode coverage: a broken backend aborts the session up front,
//! while per-unit failures are counted and the session still completes.

#[path = "support/mod.rs"]
mod support;

use storebench::runner::{run_session, BenchConfig, SessionError};

use support::{
    write_test_file, CorruptingTransport, FlakyPutTransport, PrefixFailTransport,
    StallingUploadTransport,
};

#[tokio::test]
async fn test_unreachable_backend_aborts_session() {
    let dir = tempfile::tempdir().unwrap();
    let files = vec![write_test_file(dir.path(), "a.dat", 64 * 1024)];
    let transport = PrefixFailTransport::new(".connect_");

    let result = run_session(transport, BenchConfig::default(), &files).await;
    assert!(matches!(result, Err(SessionError::Connectivity(_))));
}

#[tokio::test]
async fn test_failed_upload_is_counted_and_loop_continues() {
    let dir = tempfile::tempdir().unwrap();
    let files = vec![
        write_test_file(dir.path(), "a.dat", 256 * 1024),
        write_test_file(dir.path(), "b.dat", 256 * 1024),
    ];
    let config = BenchConfig {
        test_runs: 2,
        adaptive: false,
        ..Default::default()
    };

    // Second benchmark upload refused: run 1 of b.dat fails, the other
    // three units go through
    let transport = FlakyPutTransport::new(2);
    let inner = transport.inner.clone();
    let report = run_session(transport, config, &files).await.unwrap();

    assert_eq!(report.runs.len(), 3);
    assert_eq!(report.failures.transfer, 1);
    assert_eq!(report.failures.total(), 1);
    assert_eq!(report.aggregate.successful_runs, 3);
    assert_eq!(inner.object_count(), 0);
}

#[tokio::test]
async fn test_corrupted_compressed_download_counts_as_codec_failure() {
    let dir = tempfile::tempdir().unwrap();
    let files = vec![write_test_file(dir.path(), "a.dat", 512 * 1024)];
    let config = BenchConfig {
        test_runs: 1,
        adaptive: false,
        manual_level: 3,
        ..Default::default()
    };

    let transport = CorruptingTransport::new();
    let report = run_session(transport, config, &files).await.unwrap();

    assert!(report.runs.is_empty());
    assert_eq!(report.failures.codec, 1);
    assert_eq!(report.failures.total(), 1);
}

#[tokio::test]
async fn test_corrupted_raw_download_fails_verification() {
    let dir = tempfile::tempdir().unwrap();
    let files = vec![write_test_file(dir.path(), "a.dat", 512 * 1024)];
    let config = BenchConfig {
        test_runs: 1,
        adaptive: false,
        enable_compression: false,
        enable_verification: true,
        ..Default::default()
    };

    // Same size comes back, so only the content checksum can catch it
    let transport = CorruptingTransport::new();
    let report = run_session(transport, config, &files).await.unwrap();

    assert!(report.runs.is_empty());
    assert_eq!(report.failures.verification, 1);
    assert_eq!(report.failures.total(), 1);
}

#[tokio::test]
async fn test_stalled_upload_is_detected_and_session_completes() {
    let dir = tempfile::tempdir().unwrap();
    let files = vec![write_test_file(dir.path(), "a.dat", 1024 * 1024)];
    let config = BenchConfig {
        test_runs: 1,
        adaptive: false,
        enable_compression: false,
        progress_interval_ms: 20,
        stall_ticks_limit: 3,
        ..Default::default()
    };

    let transport = StallingUploadTransport::new();
    let inner = transport.inner.clone();
    let report = run_session(transport, config, &files).await.unwrap();

    assert!(report.runs.is_empty());
    assert_eq!(report.failures.transfer, 1);
    assert_eq!(inner.object_count(), 0);
}

#[tokio::test]
async fn test_failed_probe_falls_back_to_maximum_compression() {
    let dir = tempfile::tempdir().unwrap();
    let files = vec![write_test_file(dir.path(), "a.dat", 256 * 1024)];
    let config = BenchConfig {
        test_runs: 1,
        sample_size_mb: 1,
        samples: 2,
        ..Default::default()
    };

    // Probe traffic is refused but benchmark traffic works; the session
    // proceeds on the unmeasured-network strategy
    let transport = PrefixFailTransport::new(".speedtest_");
    let report = run_session(transport, config, &files).await.unwrap();

    assert_eq!(report.session.compression_level, Some(15));
    assert!(report.session.probe.is_none());
    assert_eq!(report.runs.len(), 1);
    assert_eq!(report.failures.total(), 0);
}
