use thiserror::Error;

use crate::codec::CodecError;
use crate::copier::CopyError;
use crate::report::FailureClass;
use crate::transport::TransportError;

/// Failure of a single (run, file) unit. Recovered at run granularity:
/// logged, counted, and the loop moves on.
#[derive(Error, Debug)]
pub enum RunError {
    #[error("codec failure: {0}")]
    Codec(#[from] CodecError),

    #[error("transfer failure: {0}")]
    Transport(#[from] TransportError),

    #[error("transfer stalled after {bytes_copied} bytes ({ticks} silent progress checks)")]
    Stalled { ticks: u32, bytes_copied: u64 },

    #[error("verification failed: {0}")]
    Verification(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<CopyError> for RunError {
    fn from(err: CopyError) -> Self {
        match err {
            CopyError::Io(e) => RunError::Io(e),
            CopyError::Stalled { ticks, bytes_copied } => {
                RunError::Stalled { ticks, bytes_copied }
            }
        }
    }
}

impl RunError {
    /// Bucket this failure for the report's separate tallies
    pub fn failure_class(&self) -> FailureClass {
        match self {
            RunError::Codec(_) => FailureClass::Codec,
            RunError::Verification(_) => FailureClass::Verification,
            RunError::Transport(_) | RunError::Stalled { .. } | RunError::Io(_) => {
                FailureClass::Transfer
            }
        }
    }
}

/// Fatal, session-level failure: nothing ran, no report is produced.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("connectivity check failed: {0}")]
    Connectivity(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] CodecError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type RunResult<T> = std::result::Result<T, RunError>;
pub type SessionResult<T> = std::result::Result<T, SessionError>;
