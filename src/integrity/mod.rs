//! Content checksums for round-trip verification

use std::path::Path;

use blake3::Hasher;
use tokio::io::AsyncReadExt;

/// BLAKE3 checksum of a byte slice
pub fn checksum_bytes(data: &[u8]) -> [u8; 32] {
    let mut hasher = Hasher::new();
    hasher.update(data);
    *hasher.finalize().as_bytes()
}

/// BLAKE3 checksum of a file, streamed through a bounded buffer
pub async fn checksum_file(path: &Path) -> std::io::Result<[u8; 32]> {
    let mut file = tokio::fs::File::open(path).await?;
    let mut hasher = Hasher::new();
    let mut buffer = vec![0u8; 64 * 1024];

    loop {
        let n = file.read(&mut buffer).await?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    Ok(*hasher.finalize().as_bytes())
}
