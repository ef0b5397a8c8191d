//! Storage transport abstraction
//!
//! The engine never speaks a backend protocol itself; it streams bytes
//! through readers and writers handed out by an already-authenticated
//! transport session. `put` returns a streamed writer (rather than taking a
//! whole buffer) so progress can be observed mid-transfer.

pub mod error;
pub mod memory;

pub use error::{TransportError, TransportResult};
pub use memory::MemoryTransport;

use tokio::io::{AsyncRead, AsyncWrite};

/// A streamed put/get/remove session against a remote object store.
///
/// Implementations are expected to behave like a single authenticated
/// session: requests issued after a completed `put` or `remove` observe
/// the effect of that operation. The engine only ever drives one transfer
/// at a time, so no additional synchronization is required.
pub trait StorageTransport {
    type Reader: AsyncRead + Unpin + Send;
    type Writer: AsyncWrite + Unpin + Send;

    /// Open a remote object for writing. The object becomes visible once
    /// the returned writer is shut down.
    fn put(
        &self,
        path: &str,
    ) -> impl std::future::Future<Output = TransportResult<Self::Writer>> + Send;

    /// Open a remote object for reading.
    fn get(
        &self,
        path: &str,
    ) -> impl std::future::Future<Output = TransportResult<Self::Reader>> + Send;

    /// Delete a remote object.
    fn remove(&self, path: &str)
        -> impl std::future::Future<Output = TransportResult<()>> + Send;
}
