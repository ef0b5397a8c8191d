//! Buffered stream copying with throughput tracking and stall detection
//!
//! The copy loop and a watchdog run side by side: the loop moves bytes in
//! fixed-size chunks, the watchdog fires progress callbacks once per
//! interval and fails the copy when the byte count stops advancing for a
//! configured number of consecutive ticks. Racing the watchdog against the
//! whole copy future means a hang inside either a read or a write is caught.

pub mod error;
pub mod progress;

pub use error::{CopyError, CopyResult};
pub use progress::{CopyProgress, NoopObserver, ProgressObserver};

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::{Instant, MissedTickBehavior};

/// Tunables for a streamed copy.
///
/// Buffer size is a parameter rather than a constant: the throughput-optimal
/// chunk size depends on the backend's round-trip latency.
#[derive(Debug, Clone)]
pub struct CopierConfig {
    pub buffer_size: usize,
    /// Minimum spacing between progress callbacks
    pub progress_interval: Duration,
    /// Consecutive no-progress ticks before the copy is declared stalled
    pub stall_ticks_limit: u32,
}

impl Default for CopierConfig {
    fn default() -> Self {
        Self {
            buffer_size: 2 * 1024 * 1024,
            progress_interval: Duration::from_millis(500),
            stall_ticks_limit: 10,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CopyOutcome {
    pub bytes_copied: u64,
    pub elapsed: Duration,
}

impl CopyOutcome {
    /// Throughput over the whole copy, in MB/s
    pub fn throughput_mbps(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.bytes_copied as f64 / (1024.0 * 1024.0) / secs
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct StreamCopier {
    config: CopierConfig,
}

impl StreamCopier {
    pub fn new(config: CopierConfig) -> Self {
        Self { config }
    }

    /// Copy everything from `reader` into `writer`.
    ///
    /// `total_bytes` is only used for percentage reporting. The partial
    /// destination artifact is the caller's to discard on failure.
    pub async fn copy<R, W>(
        &self,
        reader: &mut R,
        writer: &mut W,
        total_bytes: Option<u64>,
        observer: &mut dyn ProgressObserver,
    ) -> CopyResult<CopyOutcome>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let copied = Arc::new(AtomicU64::new(0));
        let start = Instant::now();

        // Scoped so both futures (and their borrows of the streams and the
        // observer) are gone before the completion callback.
        let result = {
            let transfer =
                Self::pump(reader, writer, self.config.buffer_size, Arc::clone(&copied));
            tokio::pin!(transfer);

            let stall = self.watchdog(Arc::clone(&copied), total_bytes, start, &mut *observer);
            tokio::pin!(stall);

            tokio::select! {
                result = &mut transfer => result,
                err = &mut stall => Err(err),
            }
        };
        result?;

        let outcome = CopyOutcome {
            bytes_copied: copied.load(Ordering::Relaxed),
            elapsed: start.elapsed(),
        };
        observer.on_progress(&CopyProgress {
            bytes_copied: outcome.bytes_copied,
            total_bytes,
            elapsed: outcome.elapsed,
            throughput_mbps: outcome.throughput_mbps(),
            finished: true,
        });
        Ok(outcome)
    }

    async fn pump<R, W>(
        reader: &mut R,
        writer: &mut W,
        buffer_size: usize,
        copied: Arc<AtomicU64>,
    ) -> CopyResult<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut buf = vec![0u8; buffer_size.max(1)];
        loop {
            let n = reader.read(&mut buf).await?;
            if n == 0 {
                break;
            }
            writer.write_all(&buf[..n]).await?;
            copied.fetch_add(n as u64, Ordering::Relaxed);
        }
        writer.flush().await?;
        Ok(())
    }

    /// Resolves only when the transfer stalls.
    async fn watchdog(
        &self,
        copied: Arc<AtomicU64>,
        total_bytes: Option<u64>,
        start: Instant,
        observer: &mut dyn ProgressObserver,
    ) -> CopyError {
        let mut interval = tokio::time::interval(self.config.progress_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        interval.tick().await; // first tick fires immediately

        let mut last_seen = 0u64;
        let mut stalled_ticks = 0u32;
        loop {
            interval.tick().await;
            let bytes = copied.load(Ordering::Relaxed);
            if bytes == last_seen {
                stalled_ticks += 1;
                if stalled_ticks >= self.config.stall_ticks_limit {
                    return CopyError::Stalled {
                        ticks: stalled_ticks,
                        bytes_copied: bytes,
                    };
                }
            } else {
                stalled_ticks = 0;
                last_seen = bytes;
            }

            let elapsed = start.elapsed();
            let secs = elapsed.as_secs_f64();
            observer.on_progress(&CopyProgress {
                bytes_copied: bytes,
                total_bytes,
                elapsed,
                throughput_mbps: if secs > 0.0 {
                    bytes as f64 / (1024.0 * 1024.0) / secs
                } else {
                    0.0
                },
                finished: false,
            });
        }
    }
}
