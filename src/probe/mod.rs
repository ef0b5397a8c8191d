//! Network throughput and latency probing
//!
//! Runs a handful of independent trials, each uploading and re-downloading a
//! fresh random payload against the live transport session. The payload is
//! random only to defeat backend-side caching or deduplication that would
//! bias the timing; there is nothing cryptographic about it.

pub mod error;
pub mod types;

pub use error::{ProbeError, ProbeResult};
pub use types::{ProbeConfig, ProbeOutcome, TransferSample};

use std::time::Instant;

use rand::RngCore;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use uuid::Uuid;

use crate::transport::StorageTransport;

const MIB: u64 = 1024 * 1024;

#[derive(Debug, Clone, Default)]
pub struct NetworkProbe {
    config: ProbeConfig,
}

impl NetworkProbe {
    pub fn new(config: ProbeConfig) -> Self {
        Self { config }
    }

    /// Run all trials and average them.
    ///
    /// Individual trial failures are logged and skipped; only when every
    /// trial fails does the probe report `Unmeasured`.
    pub async fn measure<T: StorageTransport>(&self, transport: &T) -> ProbeOutcome {
        let samples = self.config.samples.max(1);
        let mut collected = Vec::with_capacity(samples as usize);

        tracing::info!(
            samples,
            sample_size_mb = self.config.sample_size_mb,
            "probing network throughput"
        );

        for trial in 1..=samples {
            match self.run_trial(transport).await {
                Ok(sample) => {
                    tracing::info!(
                        trial,
                        upload_mbps = format_args!("{:.2}", sample.upload_mbps),
                        download_mbps = format_args!("{:.2}", sample.download_mbps),
                        latency_ms = format_args!("{:.0}", sample.latency_ms),
                        "probe trial complete"
                    );
                    collected.push(sample);
                }
                Err(err) => {
                    tracing::warn!(trial, error = %err, "probe trial failed, skipping");
                }
            }
        }

        if collected.is_empty() {
            tracing::warn!("all probe trials failed; network speed is unmeasured");
            return ProbeOutcome::Unmeasured;
        }

        let n = collected.len() as f64;
        let averaged = TransferSample {
            sample_size_bytes: self.config.sample_size_mb as u64 * MIB,
            upload_mbps: collected.iter().map(|s| s.upload_mbps).sum::<f64>() / n,
            download_mbps: collected.iter().map(|s| s.download_mbps).sum::<f64>() / n,
            latency_ms: collected.iter().map(|s| s.latency_ms).sum::<f64>() / n,
        };
        ProbeOutcome::Measured(averaged)
    }

    async fn run_trial<T: StorageTransport>(&self, transport: &T) -> ProbeResult<TransferSample> {
        let size_mb = self.config.sample_size_mb.max(1) as u64;
        let mut payload = vec![0u8; (size_mb * MIB) as usize];
        rand::thread_rng().fill_bytes(&mut payload);

        let remote = format!(".speedtest_{}", Uuid::new_v4().simple());

        let result = self.timed_round_trip(transport, &remote, &payload, size_mb).await;

        // Best-effort cleanup of the probe object on every exit path
        if let Err(err) = transport.remove(&remote).await {
            tracing::warn!(remote = %remote, error = %err, "failed to remove probe object");
        }

        result
    }

    async fn timed_round_trip<T: StorageTransport>(
        &self,
        transport: &T,
        remote: &str,
        payload: &[u8],
        size_mb: u64,
    ) -> ProbeResult<TransferSample> {
        // Upload, in bounded chunks so the transport sees a stream
        let start = Instant::now();
        let mut writer = transport.put(remote).await?;
        for chunk in payload.chunks(MIB as usize) {
            writer.write_all(chunk).await?;
        }
        writer.shutdown().await?;
        let upload_secs = start.elapsed().as_secs_f64();

        // Time to first byte as a latency proxy
        let start = Instant::now();
        let mut reader = transport.get(remote).await?;
        let mut first = [0u8; 1];
        let n = reader.read(&mut first).await?;
        if n == 0 {
            return Err(ProbeError::EmptyObject);
        }
        let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
        drop(reader);

        // Full download
        let start = Instant::now();
        let mut reader = transport.get(remote).await?;
        tokio::io::copy(&mut reader, &mut tokio::io::sink()).await?;
        let download_secs = start.elapsed().as_secs_f64();

        Ok(TransferSample {
            sample_size_bytes: size_mb * MIB,
            upload_mbps: throughput_mbps(size_mb, upload_secs),
            download_mbps: throughput_mbps(size_mb, download_secs),
            latency_ms,
        })
    }
}

fn throughput_mbps(size_mb: u64, secs: f64) -> f64 {
    if secs > 0.0 {
        size_mb as f64 / secs
    } else {
        // Sub-resolution timing (in-memory backends); report the payload
        // size against the smallest measurable interval instead of infinity.
        size_mb as f64 / f64::EPSILON
    }
}
