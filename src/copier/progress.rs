//! Progress observation for streamed copies
//!
//! Measurement stays in the copier; presentation (terminal bars, log lines)
//! lives behind this trait.

use std::time::Duration;

/// Snapshot handed to observers at most once per progress interval,
/// and always once on completion.
#[derive(Debug, Clone)]
pub struct CopyProgress {
    pub bytes_copied: u64,
    /// Expected total, when the source size is known up front
    pub total_bytes: Option<u64>,
    pub elapsed: Duration,
    /// Running throughput over the whole copy so far, in MB/s
    pub throughput_mbps: f64,
    pub finished: bool,
}

impl CopyProgress {
    pub fn percent(&self) -> Option<f64> {
        self.total_bytes.filter(|&total| total > 0).map(|total| {
            (self.bytes_copied as f64 / total as f64 * 100.0).min(100.0)
        })
    }
}

pub trait ProgressObserver: Send {
    fn on_progress(&mut self, progress: &CopyProgress);
}

/// Observer that discards all updates
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl ProgressObserver for NoopObserver {
    fn on_progress(&mut self, _progress: &CopyProgress) {}
}
