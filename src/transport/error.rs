use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("remote object not found: {0}")]
    NotFound(String),

    #[error("backend error: {0}")]
    Backend(String),
}

pub type TransportResult<T> = std::result::Result<T, TransportError>;
