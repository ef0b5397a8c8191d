//! Fault-injecting transport wrappers for integration tests
//!
//! These wrap the in-memory transport to reproduce the failure modes the
//! engine must survive: refused requests, corrupted downloads, and writers
//! that stop making progress mid-upload.

#![allow(dead_code)]

use std::io::Cursor;
use std::pin::Pin;
use std::sync::atomic::{AtomicU32, Ordering};
use std::task::{Context, Poll};

use tokio::io::{AsyncReadExt, AsyncWrite};

use storebench::transport::memory::MemoryWriter;
use storebench::transport::{MemoryTransport, StorageTransport, TransportError, TransportResult};

/// Fails every operation on paths with the given prefix; everything else
/// passes through. A prefix of `.connect_` kills the connectivity check, a
/// prefix of `.speedtest_` makes every probe trial fail.
pub struct PrefixFailTransport {
    pub inner: MemoryTransport,
    pub fail_prefix: &'static str,
}

impl PrefixFailTransport {
    pub fn new(fail_prefix: &'static str) -> Self {
        Self {
            inner: MemoryTransport::new(),
            fail_prefix,
        }
    }

    fn check(&self, path: &str) -> TransportResult<()> {
        if path.starts_with(self.fail_prefix) {
            Err(TransportError::Backend(format!(
                "injected failure for {path}"
            )))
        } else {
            Ok(())
        }
    }
}

impl StorageTransport for PrefixFailTransport {
    type Reader = Cursor<bytes::Bytes>;
    type Writer = MemoryWriter;

    async fn put(&self, path: &str) -> TransportResult<Self::Writer> {
        self.check(path)?;
        self.inner.put(path).await
    }

    async fn get(&self, path: &str) -> TransportResult<Self::Reader> {
        self.check(path)?;
        self.inner.get(path).await
    }

    async fn remove(&self, path: &str) -> TransportResult<()> {
        self.check(path)?;
        self.inner.remove(path).await
    }
}

/// Fails the N-th `put` of a benchmark object (1-based); probe and
/// connectivity traffic is untouched.
pub struct FlakyPutTransport {
    pub inner: MemoryTransport,
    fail_on: u32,
    seen: AtomicU32,
}

impl FlakyPutTransport {
    pub fn new(fail_on: u32) -> Self {
        Self {
            inner: MemoryTransport::new(),
            fail_on,
            seen: AtomicU32::new(0),
        }
    }
}

impl StorageTransport for FlakyPutTransport {
    type Reader = Cursor<bytes::Bytes>;
    type Writer = MemoryWriter;

    async fn put(&self, path: &str) -> TransportResult<Self::Writer> {
        if path.starts_with("bench_") {
            let n = self.seen.fetch_add(1, Ordering::SeqCst) + 1;
            if n == self.fail_on {
                return Err(TransportError::Backend("injected put failure".into()));
            }
        }
        self.inner.put(path).await
    }

    async fn get(&self, path: &str) -> TransportResult<Self::Reader> {
        self.inner.get(path).await
    }

    async fn remove(&self, path: &str) -> TransportResult<()> {
        self.inner.remove(path).await
    }
}

/// Flips the first byte of every downloaded benchmark object. For
/// compressed payloads that breaks the frame header; for raw payloads it
/// changes the content checksum while keeping the size intact.
pub struct CorruptingTransport {
    pub inner: MemoryTransport,
}

impl CorruptingTransport {
    pub fn new() -> Self {
        Self {
            inner: MemoryTransport::new(),
        }
    }
}

impl StorageTransport for CorruptingTransport {
    type Reader = Cursor<Vec<u8>>;
    type Writer = MemoryWriter;

    async fn put(&self, path: &str) -> TransportResult<Self::Writer> {
        self.inner.put(path).await
    }

    async fn get(&self, path: &str) -> TransportResult<Self::Reader> {
        let mut reader = self.inner.get(path).await?;
        let mut data = Vec::new();
        reader.read_to_end(&mut data).await?;
        if path.starts_with("bench_") && !data.is_empty() {
            data[0] ^= 0xff;
        }
        Ok(Cursor::new(data))
    }

    async fn remove(&self, path: &str) -> TransportResult<()> {
        self.inner.remove(path).await
    }
}

/// Upload writer that accepts a small prefix and then never progresses
pub enum MaybeStallWriter {
    Pass(MemoryWriter),
    Stall { accepted: usize, limit: usize },
}

impl AsyncWrite for MaybeStallWriter {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<std::io::Result<usize>> {
        match self.get_mut() {
            MaybeStallWriter::Pass(writer) => Pin::new(writer).poll_write(cx, buf),
            MaybeStallWriter::Stall { accepted, limit } => {
                if *accepted < *limit {
                    let n = buf.len().min(*limit - *accepted);
                    *accepted += n;
                    Poll::Ready(Ok(n))
                } else {
                    // Never wake again; the stall watchdog has to fire.
                    Poll::Pending
                }
            }
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        match self.get_mut() {
            MaybeStallWriter::Pass(writer) => Pin::new(writer).poll_flush(cx),
            MaybeStallWriter::Stall { .. } => Poll::Ready(Ok(())),
        }
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        match self.get_mut() {
            MaybeStallWriter::Pass(writer) => Pin::new(writer).poll_shutdown(cx),
            MaybeStallWriter::Stall { .. } => Poll::Ready(Ok(())),
        }
    }
}

/// Stalls every benchmark upload after a 64 KB prefix
pub struct StallingUploadTransport {
    pub inner: MemoryTransport,
}

impl StallingUploadTransport {
    pub fn new() -> Self {
        Self {
            inner: MemoryTransport::new(),
        }
    }
}

impl StorageTransport for StallingUploadTransport {
    type Reader = Cursor<bytes::Bytes>;
    type Writer = MaybeStallWriter;

    async fn put(&self, path: &str) -> TransportResult<Self::Writer> {
        if path.starts_with("bench_") {
            Ok(MaybeStallWriter::Stall {
                accepted: 0,
                limit: 64 * 1024,
            })
        } else {
            Ok(MaybeStallWriter::Pass(self.inner.put(path).await?))
        }
    }

    async fn get(&self, path: &str) -> TransportResult<Self::Reader> {
        self.inner.get(path).await
    }

    async fn remove(&self, path: &str) -> TransportResult<()> {
        self.inner.remove(path).await
    }
}

/// Write a file whose first half is patterned (compressible) and second
/// half repeats a short cycle
pub fn write_test_file(dir: &std::path::Path, name: &str, size: usize) -> std::path::PathBuf {
    let path = dir.join(name);
    let data: Vec<u8> = (0..size).map(|i| (i / 32 % 251) as u8).collect();
    std::fs::write(&path, data).expect("writing test file");
    path
}
