use serde::{Deserialize, Serialize};

/// One averaged network measurement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferSample {
    pub sample_size_bytes: u64,
    pub upload_mbps: f64,
    pub download_mbps: f64,
    pub latency_ms: f64,
}

impl TransferSample {
    /// Mean of upload and download throughput, the value fed to the
    /// compression selector
    pub fn average_mbps(&self) -> f64 {
        (self.upload_mbps + self.download_mbps) / 2.0
    }
}

/// Result of a probing session.
///
/// `Unmeasured` means every trial failed. Callers fall back to the most
/// conservative strategy instead of aborting the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ProbeOutcome {
    Measured(TransferSample),
    Unmeasured,
}

impl ProbeOutcome {
    pub fn sample(&self) -> Option<&TransferSample> {
        match self {
            ProbeOutcome::Measured(sample) => Some(sample),
            ProbeOutcome::Unmeasured => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// Size of each synthetic payload in MiB
    pub sample_size_mb: u32,
    /// Number of independent trials to average
    pub samples: u32,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            sample_size_mb: 5,
            samples: 3,
        }
    }
}
