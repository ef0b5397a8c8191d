use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::codec::Algorithm;
use crate::probe::TransferSample;

const MIB: f64 = 1024.0 * 1024.0;

/// Outcome of one successful (run, file) unit. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    pub run_index: u32,
    pub filename: String,
    pub original_size_bytes: u64,
    /// Bytes actually placed on the wire (post-compression). May exceed
    /// `original_size_bytes` for incompressible input.
    pub transfer_size_bytes: u64,
    pub compress_time_s: f64,
    pub upload_time_s: f64,
    pub download_time_s: f64,
    pub decompress_time_s: f64,
    /// True iff the decompressed round trip was byte-identical to the
    /// original (size and content checksum)
    pub verified: bool,
}

impl RunRecord {
    /// `1 - transfer/original`; negative for data that grew on the wire
    pub fn compression_ratio(&self) -> f64 {
        if self.original_size_bytes == 0 {
            return 0.0;
        }
        1.0 - self.transfer_size_bytes as f64 / self.original_size_bytes as f64
    }

    pub fn wire_upload_mbps(&self) -> f64 {
        throughput(self.transfer_size_bytes, self.upload_time_s)
    }

    pub fn wire_download_mbps(&self) -> f64 {
        throughput(self.transfer_size_bytes, self.download_time_s)
    }

    pub fn effective_upload_mbps(&self) -> f64 {
        throughput(self.original_size_bytes, self.upload_time_s)
    }

    pub fn effective_download_mbps(&self) -> f64 {
        throughput(self.original_size_bytes, self.download_time_s)
    }
}

fn throughput(bytes: u64, secs: f64) -> f64 {
    if secs > 0.0 {
        bytes as f64 / MIB / secs
    } else {
        0.0
    }
}

/// Why a unit failed. Transfer and verification failures point at different
/// root causes (network vs correctness) and are counted separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureClass {
    Transfer,
    Verification,
    Codec,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct FailureTally {
    pub transfer: u32,
    pub verification: u32,
    pub codec: u32,
}

impl FailureTally {
    pub fn count(&mut self, class: FailureClass) {
        match class {
            FailureClass::Transfer => self.transfer += 1,
            FailureClass::Verification => self.verification += 1,
            FailureClass::Codec => self.codec += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.transfer + self.verification + self.codec
    }
}

/// Session-level metadata recorded in the report header
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionInfo {
    pub started_at: DateTime<Utc>,
    pub algorithm: Algorithm,
    /// None when compression was disabled for the session
    pub compression_level: Option<i32>,
    pub strategy_rationale: Option<String>,
    pub adaptive: bool,
    pub buffer_size: usize,
    pub test_runs: u32,
    pub files: Vec<String>,
    /// Averaged probe measurement, when a probe ran and succeeded
    pub probe: Option<TransferSample>,
}

/// Mean phase times and throughputs across all recorded runs
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AggregateStats {
    pub successful_runs: usize,
    pub total_compress_time_s: f64,
    pub total_upload_time_s: f64,
    pub total_download_time_s: f64,
    pub total_decompress_time_s: f64,
    pub avg_compress_time_s: f64,
    pub avg_upload_time_s: f64,
    pub avg_download_time_s: f64,
    pub avg_decompress_time_s: f64,
    pub avg_compression_ratio: f64,
    pub avg_wire_upload_mbps: f64,
    pub avg_wire_download_mbps: f64,
    pub avg_effective_upload_mbps: f64,
    pub avg_effective_download_mbps: f64,
}

/// Per-file rollup across runs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileStats {
    pub filename: String,
    pub runs: usize,
    pub avg_original_size_bytes: u64,
    pub avg_transfer_size_bytes: u64,
    pub avg_compression_ratio: f64,
    pub avg_compress_time_s: f64,
    pub avg_upload_time_s: f64,
    pub avg_download_time_s: f64,
    pub avg_decompress_time_s: f64,
    pub avg_wire_upload_mbps: f64,
    pub avg_wire_download_mbps: f64,
    pub avg_effective_upload_mbps: f64,
    pub avg_effective_download_mbps: f64,
}

/// Complete benchmark report: session metadata, aggregate statistics,
/// per-file statistics and the full per-run table. Derived from the record
/// set and never mutated in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkReport {
    pub session: SessionInfo,
    pub aggregate: AggregateStats,
    pub per_file: Vec<FileStats>,
    pub failures: FailureTally,
    pub runs: Vec<RunRecord>,
}
