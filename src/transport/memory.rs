//! In-memory transport backend
//!
//! Backs tests and the demo driver. Objects live in a shared map; a `put`
//! writer buffers bytes and publishes them on shutdown, mirroring how a
//! real backend makes an object visible once the stream is closed.

use std::io::Cursor;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use bytes::Bytes;
use dashmap::DashMap;
use tokio::io::AsyncWrite;

use crate::transport::{StorageTransport, TransportError, TransportResult};

#[derive(Clone, Default)]
pub struct MemoryTransport {
    objects: Arc<DashMap<String, Bytes>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored objects
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Fetch a stored object without going through the streaming API
    pub fn object(&self, path: &str) -> Option<Bytes> {
        self.objects.get(path).map(|entry| entry.value().clone())
    }
}

impl StorageTransport for MemoryTransport {
    type Reader = Cursor<Bytes>;
    type Writer = MemoryWriter;

    async fn put(&self, path: &str) -> TransportResult<Self::Writer> {
        Ok(MemoryWriter {
            path: path.to_owned(),
            objects: Arc::clone(&self.objects),
            buf: Vec::new(),
            committed: false,
        })
    }

    async fn get(&self, path: &str) -> TransportResult<Self::Reader> {
        let data = self
            .objects
            .get(path)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| TransportError::NotFound(path.to_owned()))?;
        Ok(Cursor::new(data))
    }

    async fn remove(&self, path: &str) -> TransportResult<()> {
        self.objects
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| TransportError::NotFound(path.to_owned()))
    }
}

pub struct MemoryWriter {
    path: String,
    objects: Arc<DashMap<String, Bytes>>,
    buf: Vec<u8>,
    committed: bool,
}

impl MemoryWriter {
    fn commit(&mut self) {
        if !self.committed {
            self.committed = true;
            let data = Bytes::from(std::mem::take(&mut self.buf));
            self.objects.insert(self.path.clone(), data);
        }
    }
}

impl AsyncWrite for MemoryWriter {
    fn poll_write(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<std::io::Result<usize>> {
        self.buf.extend_from_slice(buf);
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        self.commit();
        Poll::Ready(Ok(()))
    }
}

// A writer abandoned mid-transfer still publishes what it received, the
// same way a real stream leaves a partial object behind. Cleanup removes it.
impl Drop for MemoryWriter {
    fn drop(&mut self) {
        self.commit();
    }
}
