//! storebench: adaptive network-aware compression benchmarking for remote
//! object storage.
//!
//! The engine measures effective network throughput with synthetic probe
//! transfers, picks a compression aggressiveness level from an ordered
//! threshold table, then runs an N-run × M-file benchmark loop (compress,
//! upload, download, decompress, verify) with streaming progress tracking
//! and stuck-transfer detection, and aggregates the per-run records into a
//! report.
//!
//! Connecting and authenticating to the storage backend is the caller's
//! job; the engine takes an established [`transport::StorageTransport`]
//! session and only streams bytes through it.

pub mod adaptive;
pub mod codec;
pub mod copier;
pub mod integrity;
pub mod probe;
pub mod report;
pub mod runner;
pub mod transport;

pub use adaptive::{CompressionSelector, CompressionStrategy};
pub use codec::Algorithm;
pub use copier::{CopierConfig, CopyProgress, ProgressObserver, StreamCopier};
pub use probe::{NetworkProbe, ProbeConfig, ProbeOutcome, TransferSample};
pub use report::{BenchmarkReport, ResultsAggregator, RunRecord};
pub use runner::{BenchConfig, BenchmarkRunner, SessionError};
pub use transport::{MemoryTransport, StorageTransport};
