use thiserror::Error;

use crate::transport::TransportError;

#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("remote object was empty during latency check")]
    EmptyObject,
}

pub type ProbeResult<T> = std::result::Result<T, ProbeError>;
