//! Pluggable compression codecs
//!
//! Streams data through bounded buffers rather than materializing whole
//! files. The `level` knob is algorithm-defined; out-of-range levels are
//! rejected rather than clamped so benchmark runs stay reproducible.

pub mod error;

pub use error::{CodecError, CodecResult};

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Compression algorithm applied to files before upload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    /// No compression
    None,
    /// gzip via flate2 (levels 1-9)
    Gzip,
    /// Zstandard (levels 1-22)
    #[default]
    Zstd,
    /// LZ4 frame format (no level knob)
    Lz4,
}

impl Algorithm {
    pub fn name(&self) -> &'static str {
        match self {
            Algorithm::None => "none",
            Algorithm::Gzip => "gzip",
            Algorithm::Zstd => "zstd",
            Algorithm::Lz4 => "lz4",
        }
    }
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Validate a compression level for the given algorithm.
///
/// `None` and `Lz4` carry no level knob and accept any value.
pub fn validate_level(algorithm: Algorithm, level: i32) -> CodecResult<()> {
    let (range, supported) = match algorithm {
        Algorithm::None | Algorithm::Lz4 => return Ok(()),
        Algorithm::Gzip => (1..=9, "1-9"),
        Algorithm::Zstd => (1..=22, "1-22"),
    };
    if range.contains(&level) {
        Ok(())
    } else {
        Err(CodecError::InvalidLevel {
            algorithm: algorithm.name(),
            level,
            supported,
        })
    }
}

/// Compress `src` into `dst`, returning the compressed size in bytes.
pub fn compress_file(
    src: &Path,
    dst: &Path,
    algorithm: Algorithm,
    level: i32,
    buffer_size: usize,
) -> CodecResult<u64> {
    validate_level(algorithm, level)?;
    let mut reader = BufReader::new(File::open(src)?);
    let writer = BufWriter::new(File::create(dst)?);
    compress_stream(&mut reader, writer, algorithm, level, buffer_size)?;
    Ok(std::fs::metadata(dst)?.len())
}

/// Decompress `src` into `dst`, returning the decompressed size in bytes.
pub fn decompress_file(
    src: &Path,
    dst: &Path,
    algorithm: Algorithm,
    buffer_size: usize,
) -> CodecResult<u64> {
    let reader = BufReader::new(File::open(src)?);
    let mut writer = BufWriter::new(File::create(dst)?);
    let written = decompress_stream(reader, &mut writer, algorithm, buffer_size)?;
    writer.flush()?;
    Ok(written)
}

/// Compress a byte slice in memory (probe payloads and tests)
pub fn compress(data: &[u8], algorithm: Algorithm, level: i32) -> CodecResult<Vec<u8>> {
    validate_level(algorithm, level)?;
    let mut out = Vec::new();
    let mut reader = io::Cursor::new(data);
    compress_stream(&mut reader, &mut out, algorithm, level, 64 * 1024)?;
    Ok(out)
}

/// Decompress a byte slice in memory
pub fn decompress(data: &[u8], algorithm: Algorithm) -> CodecResult<Vec<u8>> {
    let mut out = Vec::new();
    decompress_stream(io::Cursor::new(data), &mut out, algorithm, 64 * 1024)?;
    Ok(out)
}

fn compress_stream<R: Read, W: Write>(
    reader: &mut R,
    writer: W,
    algorithm: Algorithm,
    level: i32,
    buffer_size: usize,
) -> CodecResult<()> {
    match algorithm {
        Algorithm::None => {
            let mut writer = writer;
            copy_buffered(reader, &mut writer, buffer_size)?;
            writer.flush()?;
        }
        Algorithm::Gzip => {
            let mut encoder =
                flate2::write::GzEncoder::new(writer, flate2::Compression::new(level as u32));
            copy_buffered(reader, &mut encoder, buffer_size)?;
            encoder.finish()?.flush()?;
        }
        Algorithm::Zstd => {
            let mut encoder = zstd::stream::Encoder::new(writer, level)?;
            copy_buffered(reader, &mut encoder, buffer_size)?;
            encoder.finish()?.flush()?;
        }
        Algorithm::Lz4 => {
            let mut encoder = lz4_flex::frame::FrameEncoder::new(writer);
            copy_buffered(reader, &mut encoder, buffer_size)?;
            encoder
                .finish()
                .map_err(|e| CodecError::Corrupt(e.to_string()))?
                .flush()?;
        }
    }
    Ok(())
}

fn decompress_stream<R: Read, W: Write>(
    reader: R,
    writer: &mut W,
    algorithm: Algorithm,
    buffer_size: usize,
) -> CodecResult<u64> {
    let written = match algorithm {
        Algorithm::None => {
            let mut reader = reader;
            copy_buffered(&mut reader, writer, buffer_size).map_err(map_decode_error)?
        }
        Algorithm::Gzip => {
            let mut decoder = flate2::read::GzDecoder::new(reader);
            copy_buffered(&mut decoder, writer, buffer_size).map_err(map_decode_error)?
        }
        Algorithm::Zstd => {
            let mut decoder = zstd::stream::Decoder::new(reader).map_err(map_decode_error)?;
            copy_buffered(&mut decoder, writer, buffer_size).map_err(map_decode_error)?
        }
        Algorithm::Lz4 => {
            let mut decoder = lz4_flex::frame::FrameDecoder::new(reader);
            copy_buffered(&mut decoder, writer, buffer_size).map_err(map_decode_error)?
        }
    };
    Ok(written)
}

/// Copy with a bounded, caller-sized buffer
fn copy_buffered<R: Read, W: Write>(
    reader: &mut R,
    writer: &mut W,
    buffer_size: usize,
) -> io::Result<u64> {
    let mut buf = vec![0u8; buffer_size.max(1)];
    let mut total = 0u64;
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        writer.write_all(&buf[..n])?;
        total += n as u64;
    }
    Ok(total)
}

/// Malformed input surfaces as read-side IO errors from the decoders;
/// anything that is not a plain filesystem failure is a corruption.
fn map_decode_error(err: io::Error) -> CodecError {
    match err.kind() {
        io::ErrorKind::InvalidData | io::ErrorKind::InvalidInput | io::ErrorKind::UnexpectedEof => {
            CodecError::Corrupt(err.to_string())
        }
        io::ErrorKind::Other => CodecError::Corrupt(err.to_string()),
        _ => CodecError::Io(err),
    }
}
