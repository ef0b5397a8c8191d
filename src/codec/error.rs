use thiserror::Error;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid compression level {level} for {algorithm} (supported: {supported})")]
    InvalidLevel {
        algorithm: &'static str,
        level: i32,
        supported: &'static str,
    },

    #[error("corrupt compressed data: {0}")]
    Corrupt(String),
}

pub type CodecResult<T> = std::result::Result<T, CodecError>;
