use thiserror::Error;

#[derive(Error, Debug)]
pub enum CopyError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("transfer stalled: no progress across {ticks} checks ({bytes_copied} bytes copied)")]
    Stalled { ticks: u32, bytes_copied: u64 },
}

pub type CopyResult<T> = std::result::Result<T, CopyError>;
