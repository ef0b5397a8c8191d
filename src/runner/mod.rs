//! Benchmark orchestration
//!
//! Drives the run × file loop: compress, upload, download, decompress,
//! verify, record. Execution is strictly sequential; one unit finishes
//! (including cleanup) before the next starts, over a single transport
//! session. A unit failure is logged and counted, never fatal; only a
//! failed connectivity check aborts the session.

pub mod error;
pub mod types;

pub use error::{RunError, RunResult, SessionError, SessionResult};
pub use types::{BenchConfig, UnitState};

use std::path::{Path, PathBuf};
use std::time::Instant;

use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::adaptive::CompressionSelector;
use crate::codec::{self, CodecError};
use crate::copier::{NoopObserver, ProgressObserver, StreamCopier};
use crate::integrity;
use crate::probe::{NetworkProbe, ProbeOutcome};
use crate::report::{BenchmarkReport, ResultsAggregator, RunRecord, SessionInfo};
use crate::transport::{StorageTransport, TransportError};

/// Resolve the session's compression level and rationale.
///
/// The resolved level is an immutable value for the whole session; it is
/// threaded through the runner rather than stored anywhere shared.
pub fn resolve_strategy(
    config: &BenchConfig,
    selector: &CompressionSelector,
    outcome: Option<&ProbeOutcome>,
) -> Result<(Option<i32>, Option<String>), CodecError> {
    if !config.enable_compression {
        return Ok((None, None));
    }
    if config.adaptive {
        let outcome = outcome.cloned().unwrap_or(ProbeOutcome::Unmeasured);
        let strategy = selector.select_for(&outcome);
        // A table tuned for another algorithm can resolve a level the
        // configured codec rejects; surface that before any unit runs.
        codec::validate_level(config.algorithm, strategy.level)?;
        return Ok((Some(strategy.level), Some(strategy.rationale.clone())));
    }
    codec::validate_level(config.algorithm, config.manual_level)?;
    Ok((Some(config.manual_level), None))
}

pub struct BenchmarkRunner<T: StorageTransport> {
    transport: T,
    config: BenchConfig,
    selector: CompressionSelector,
    copier: StreamCopier,
}

impl<T: StorageTransport> BenchmarkRunner<T> {
    pub fn new(transport: T, config: BenchConfig) -> Self {
        let copier = StreamCopier::new(config.copier_config());
        Self {
            transport,
            config,
            selector: CompressionSelector::default(),
            copier,
        }
    }

    /// Replace the default strategy table
    pub fn with_selector(mut self, selector: CompressionSelector) -> Self {
        self.selector = selector;
        self
    }

    pub fn config(&self) -> &BenchConfig {
        &self.config
    }

    /// Run the whole benchmarking session and produce a report.
    ///
    /// As long as the initial connectivity check passes, this always
    /// completes: individual run failures show up as reduced successful-run
    /// counts and explicit failure tallies, never as a silent gap.
    pub async fn run_session(
        &self,
        files: &[PathBuf],
        observer: &mut dyn ProgressObserver,
    ) -> SessionResult<BenchmarkReport> {
        let started_at = chrono::Utc::now();
        self.verify_connectivity().await?;

        let probe_outcome = if self.config.adaptive {
            let probe = NetworkProbe::new(self.config.probe_config());
            Some(probe.measure(&self.transport).await)
        } else {
            None
        };

        let (level, rationale) =
            resolve_strategy(&self.config, &self.selector, probe_outcome.as_ref())?;
        match level {
            Some(level) => tracing::info!(
                level,
                algorithm = %self.config.algorithm,
                rationale = rationale.as_deref().unwrap_or("manual"),
                "compression level fixed for session"
            ),
            None => tracing::info!("compression disabled, transferring files as-is"),
        }

        let mut aggregator = ResultsAggregator::new();
        let total_units = self.config.test_runs as usize * files.len();

        tracing::info!(
            runs = self.config.test_runs,
            files = files.len(),
            total_units,
            "starting benchmark loop"
        );

        for run in 1..=self.config.test_runs {
            for file in files {
                let filename = display_name(file);
                match self.run_unit(run, file, &filename, level, observer).await {
                    Ok(record) => {
                        tracing::info!(
                            run,
                            file = %filename,
                            upload_s = format_args!("{:.3}", record.upload_time_s),
                            download_s = format_args!("{:.3}", record.download_time_s),
                            ratio = format_args!("{:.1}%", record.compression_ratio() * 100.0),
                            state = %UnitState::Recorded,
                            "unit complete"
                        );
                        aggregator.record(record);
                    }
                    Err(err) => {
                        tracing::error!(
                            run,
                            file = %filename,
                            error = %err,
                            state = %UnitState::Failed,
                            "unit failed, continuing with next"
                        );
                        aggregator.record_failure(err.failure_class());
                    }
                }
            }
        }

        let session = SessionInfo {
            started_at,
            algorithm: self.config.algorithm,
            compression_level: level,
            strategy_rationale: rationale,
            adaptive: self.config.adaptive,
            buffer_size: self.config.buffer_size,
            test_runs: self.config.test_runs,
            files: files.iter().map(|f| display_name(f)).collect(),
            probe: probe_outcome.and_then(|o| o.sample().cloned()),
        };
        Ok(aggregator.finish(session))
    }

    /// Tiny put/remove round trip before any benchmarking starts. A backend
    /// we cannot even write one object to makes the whole session pointless.
    async fn verify_connectivity(&self) -> SessionResult<()> {
        let remote = format!(".connect_{}", Uuid::new_v4().simple());
        let check = async {
            let mut writer = self.transport.put(&remote).await?;
            writer.write_all(b"connectivity check").await?;
            writer.shutdown().await?;
            self.transport.remove(&remote).await?;
            Ok::<_, RunError>(())
        };
        match check.await {
            Ok(()) => {
                tracing::debug!("connectivity verified");
                Ok(())
            }
            Err(err) => Err(SessionError::Connectivity(err.to_string())),
        }
    }

    /// One (run, file) unit, cleanup included on every exit path. Local
    /// temporary files are uniquely named and owned by this unit alone.
    async fn run_unit(
        &self,
        run: u32,
        file: &Path,
        filename: &str,
        level: Option<i32>,
        observer: &mut dyn ProgressObserver,
    ) -> RunResult<RunRecord> {
        let remote = format!("bench_{}_{}", filename, Uuid::new_v4().simple());
        let result = self.execute_unit(run, file, filename, &remote, level, observer).await;

        // Remote cleanup runs on success and failure alike; a failure here
        // is a warning, not a change to the run's recorded status.
        if let Err(err) = self.transport.remove(&remote).await {
            match err {
                // Nothing was uploaded before the unit failed
                TransportError::NotFound(_) => {}
                err => tracing::warn!(remote = %remote, error = %err, "failed to remove remote object"),
            }
        }

        result
    }

    async fn execute_unit(
        &self,
        run: u32,
        file: &Path,
        filename: &str,
        remote: &str,
        level: Option<i32>,
        observer: &mut dyn ProgressObserver,
    ) -> RunResult<RunRecord> {
        tracing::debug!(run, file = %filename, state = %UnitState::Start, "unit starting");
        let original_size = tokio::fs::metadata(file).await?.len();
        let original_checksum = if self.config.enable_verification {
            Some(integrity::checksum_file(file).await?)
        } else {
            None
        };

        // Compression may be skipped per-file above the size threshold even
        // when enabled for the session.
        let level = match (level, self.config.compress_skip_threshold) {
            (Some(_), Some(threshold)) if original_size > threshold => {
                tracing::debug!(
                    file = %filename,
                    size = original_size,
                    threshold,
                    "file above skip threshold, transferring uncompressed"
                );
                None
            }
            (level, _) => level,
        };

        let mut compressed_tmp = None;
        let (upload_path, compress_time_s) = match level {
            Some(level) => {
                tracing::debug!(run, file = %filename, state = %UnitState::Compressing, level, "compressing");
                let tmp = NamedTempFile::new()?;
                let start = Instant::now();
                codec::compress_file(
                    file,
                    tmp.path(),
                    self.config.algorithm,
                    level,
                    self.config.buffer_size,
                )?;
                let elapsed = start.elapsed().as_secs_f64();
                let path = tmp.path().to_path_buf();
                compressed_tmp = Some(tmp);
                (path, elapsed)
            }
            None => (file.to_path_buf(), 0.0),
        };
        let transfer_size = tokio::fs::metadata(&upload_path).await?.len();

        // Upload
        tracing::debug!(run, file = %filename, state = %UnitState::Uploading, bytes = transfer_size, "uploading");
        let mut source = tokio::fs::File::open(&upload_path).await?;
        let mut sink = self.transport.put(remote).await?;
        let start = Instant::now();
        self.copier
            .copy(&mut source, &mut sink, Some(transfer_size), observer)
            .await?;
        sink.shutdown().await?;
        let upload_time_s = start.elapsed().as_secs_f64();
        drop(compressed_tmp);

        // Download
        tracing::debug!(run, file = %filename, state = %UnitState::Downloading, "downloading");
        let download_tmp = NamedTempFile::new()?;
        let mut reader = self.transport.get(remote).await?;
        let mut writer = tokio::fs::File::create(download_tmp.path()).await?;
        let start = Instant::now();
        self.copier
            .copy(&mut reader, &mut writer, Some(transfer_size), observer)
            .await?;
        writer.shutdown().await?;
        let download_time_s = start.elapsed().as_secs_f64();

        // Decompress
        let mut decompressed_tmp = None;
        let (final_path, decompress_time_s) = match level {
            Some(_) => {
                tracing::debug!(run, file = %filename, state = %UnitState::Decompressing, "decompressing");
                let tmp = NamedTempFile::new()?;
                let start = Instant::now();
                codec::decompress_file(
                    download_tmp.path(),
                    tmp.path(),
                    self.config.algorithm,
                    self.config.buffer_size,
                )?;
                let elapsed = start.elapsed().as_secs_f64();
                let path = tmp.path().to_path_buf();
                decompressed_tmp = Some(tmp);
                (path, elapsed)
            }
            None => (download_tmp.path().to_path_buf(), 0.0),
        };

        // Verify: size always, content checksum when enabled
        let final_size = tokio::fs::metadata(&final_path).await?.len();
        if final_size != original_size {
            return Err(RunError::Verification(format!(
                "size mismatch: expected {original_size} bytes, got {final_size}"
            )));
        }
        if let Some(expected) = original_checksum {
            tracing::debug!(run, file = %filename, state = %UnitState::Verifying, "verifying content checksum");
            let actual = integrity::checksum_file(&final_path).await?;
            if actual != expected {
                return Err(RunError::Verification(
                    "content checksum mismatch after round trip".to_owned(),
                ));
            }
        }
        drop(decompressed_tmp);

        Ok(RunRecord {
            run_index: run,
            filename: filename.to_owned(),
            original_size_bytes: original_size,
            transfer_size_bytes: transfer_size,
            compress_time_s,
            upload_time_s,
            download_time_s,
            decompress_time_s,
            verified: self.config.enable_verification,
        })
    }
}

/// Convenience entry point with no progress reporting
pub async fn run_session<T: StorageTransport>(
    transport: T,
    config: BenchConfig,
    files: &[PathBuf],
) -> SessionResult<BenchmarkReport> {
    BenchmarkRunner::new(transport, config)
        .run_session(files, &mut NoopObserver)
        .await
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::TransferSample;

    fn outcome(mbps: f64) -> ProbeOutcome {
        ProbeOutcome::Measured(TransferSample {
            sample_size_bytes: 5 * 1024 * 1024,
            upload_mbps: mbps,
            download_mbps: mbps,
            latency_ms: 10.0,
        })
    }

    #[test]
    fn test_resolve_strategy_adaptive() {
        let config = BenchConfig::default();
        let selector = CompressionSelector::default();

        let (level, rationale) =
            resolve_strategy(&config, &selector, Some(&outcome(75.0))).unwrap();
        assert_eq!(level, Some(3));
        assert!(rationale.unwrap().contains("fast network"));

        let (level, _) = resolve_strategy(&config, &selector, Some(&outcome(150.0))).unwrap();
        assert_eq!(level, Some(1));
    }

    #[test]
    fn test_resolve_strategy_unmeasured_uses_fallback() {
        let config = BenchConfig::default();
        let selector = CompressionSelector::default();
        let (level, _) =
            resolve_strategy(&config, &selector, Some(&ProbeOutcome::Unmeasured)).unwrap();
        assert_eq!(level, Some(15));
    }

    #[test]
    fn test_resolve_strategy_rejects_adaptive_level_outside_algorithm_range() {
        let config = BenchConfig {
            algorithm: crate::codec::Algorithm::Gzip,
            ..Default::default()
        };
        let selector = CompressionSelector::default();

        // The unmeasured tier resolves level 15, which gzip cannot encode;
        // that has to fail before any unit runs, not per unit.
        let result = resolve_strategy(&config, &selector, Some(&ProbeOutcome::Unmeasured));
        assert!(matches!(result, Err(CodecError::InvalidLevel { .. })));

        // A fast network resolves a level gzip accepts
        let (level, _) = resolve_strategy(&config, &selector, Some(&outcome(75.0))).unwrap();
        assert_eq!(level, Some(3));
    }

    #[test]
    fn test_resolve_strategy_manual() {
        let config = BenchConfig {
            adaptive: false,
            manual_level: 7,
            ..Default::default()
        };
        let selector = CompressionSelector::default();
        let (level, rationale) = resolve_strategy(&config, &selector, None).unwrap();
        assert_eq!(level, Some(7));
        assert!(rationale.is_none());
    }

    #[test]
    fn test_resolve_strategy_rejects_invalid_manual_level() {
        let config = BenchConfig {
            adaptive: false,
            manual_level: 99,
            ..Default::default()
        };
        let selector = CompressionSelector::default();
        assert!(resolve_strategy(&config, &selector, None).is_err());
    }

    #[test]
    fn test_resolve_strategy_compression_disabled() {
        let config = BenchConfig {
            enable_compression: false,
            ..Default::default()
        };
        let selector = CompressionSelector::default();
        let (level, rationale) =
            resolve_strategy(&config, &selector, Some(&outcome(0.5))).unwrap();
        assert!(level.is_none());
        assert!(rationale.is_none());
    }
}
