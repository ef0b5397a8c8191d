//! Result collection and aggregate statistics
//!
//! Owns the per-run records for the lifetime of the report. Statistics are
//! recomputed from the record set when the report is produced; throughput is
//! reported as two distinct metrics, wire (transferred bytes over time) and
//! effective (original bytes over time), because they answer different
//! questions and must not be conflated.

pub mod render;
pub mod types;

pub use types::{
    AggregateStats, BenchmarkReport, FailureClass, FailureTally, FileStats, RunRecord,
    SessionInfo,
};

use std::collections::BTreeMap;

#[derive(Debug, Default)]
pub struct ResultsAggregator {
    records: Vec<RunRecord>,
    failures: FailureTally,
}

impl ResultsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, record: RunRecord) {
        self.records.push(record);
    }

    pub fn record_failure(&mut self, class: FailureClass) {
        self.failures.count(class);
    }

    pub fn successful_runs(&self) -> usize {
        self.records.len()
    }

    pub fn failures(&self) -> FailureTally {
        self.failures
    }

    /// Produce the report for the collected records.
    pub fn finish(&self, session: SessionInfo) -> BenchmarkReport {
        BenchmarkReport {
            aggregate: aggregate_stats(&self.records),
            per_file: per_file_stats(&self.records),
            failures: self.failures,
            runs: self.records.clone(),
            session,
        }
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let mut sum = 0.0;
    let mut count = 0usize;
    for v in values {
        sum += v;
        count += 1;
    }
    if count > 0 {
        sum / count as f64
    } else {
        0.0
    }
}

fn aggregate_stats(records: &[RunRecord]) -> AggregateStats {
    AggregateStats {
        successful_runs: records.len(),
        total_compress_time_s: records.iter().map(|r| r.compress_time_s).sum(),
        total_upload_time_s: records.iter().map(|r| r.upload_time_s).sum(),
        total_download_time_s: records.iter().map(|r| r.download_time_s).sum(),
        total_decompress_time_s: records.iter().map(|r| r.decompress_time_s).sum(),
        avg_compress_time_s: mean(records.iter().map(|r| r.compress_time_s)),
        avg_upload_time_s: mean(records.iter().map(|r| r.upload_time_s)),
        avg_download_time_s: mean(records.iter().map(|r| r.download_time_s)),
        avg_decompress_time_s: mean(records.iter().map(|r| r.decompress_time_s)),
        avg_compression_ratio: mean(records.iter().map(|r| r.compression_ratio())),
        avg_wire_upload_mbps: mean(records.iter().map(|r| r.wire_upload_mbps())),
        avg_wire_download_mbps: mean(records.iter().map(|r| r.wire_download_mbps())),
        avg_effective_upload_mbps: mean(records.iter().map(|r| r.effective_upload_mbps())),
        avg_effective_download_mbps: mean(records.iter().map(|r| r.effective_download_mbps())),
    }
}

fn per_file_stats(records: &[RunRecord]) -> Vec<FileStats> {
    // BTreeMap keeps the per-file section in a stable order
    let mut groups: BTreeMap<&str, Vec<&RunRecord>> = BTreeMap::new();
    for record in records {
        groups.entry(&record.filename).or_default().push(record);
    }

    groups
        .into_iter()
        .map(|(filename, group)| {
            let runs = group.len();
            FileStats {
                filename: filename.to_owned(),
                runs,
                avg_original_size_bytes: mean(
                    group.iter().map(|r| r.original_size_bytes as f64),
                ) as u64,
                avg_transfer_size_bytes: mean(
                    group.iter().map(|r| r.transfer_size_bytes as f64),
                ) as u64,
                avg_compression_ratio: mean(group.iter().map(|r| r.compression_ratio())),
                avg_compress_time_s: mean(group.iter().map(|r| r.compress_time_s)),
                avg_upload_time_s: mean(group.iter().map(|r| r.upload_time_s)),
                avg_download_time_s: mean(group.iter().map(|r| r.download_time_s)),
                avg_decompress_time_s: mean(group.iter().map(|r| r.decompress_time_s)),
                avg_wire_upload_mbps: mean(group.iter().map(|r| r.wire_upload_mbps())),
                avg_wire_download_mbps: mean(group.iter().map(|r| r.wire_download_mbps())),
                avg_effective_upload_mbps: mean(group.iter().map(|r| r.effective_upload_mbps())),
                avg_effective_download_mbps: mean(
                    group.iter().map(|r| r.effective_download_mbps()),
                ),
            }
        })
        .collect()
}
