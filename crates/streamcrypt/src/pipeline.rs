//! File transform pipeline: source → cipher → sink.
//!
//! One invocation pumps one stream to completion. Chunks are applied in
//! order (CTR keystream position is part of the engine), each transformed
//! chunk is written before the next read, and success is reported only after
//! the sink is flushed and shut down. Dropping the returned future stops the
//! transform and releases both handles.

use std::path::Path;

use thiserror::Error;
use tokio::fs;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::engine::{CipherEngine, CipherError};

/// Read-buffer size for the transform loop.
pub const CHUNK_SIZE: usize = 64 * 1024;

/// Errors produced by the transform pipeline, classified by the failing side.
#[derive(Debug, Error)]
pub enum TransformError {
    /// Reading from the source stream failed.
    #[error("source read failed")]
    SourceRead(#[source] std::io::Error),

    /// The cipher layer failed mid-stream.
    #[error(transparent)]
    Cipher(#[from] CipherError),

    /// Writing to the sink stream failed.
    #[error("sink write failed")]
    SinkWrite(#[source] std::io::Error),
}

/// Pump `source` through `engine` into `sink` until the source is exhausted.
///
/// Returns the number of bytes transformed. The first read, cipher, or write
/// error short-circuits the loop; whatever reached the sink before that point
/// must not be treated as a complete output.
///
/// # Errors
///
/// Returns [`TransformError`] naming the side that failed.
pub async fn run<R, W>(
    mut source: R,
    mut sink: W,
    engine: &mut CipherEngine,
) -> Result<u64, TransformError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = vec![0u8; CHUNK_SIZE];
    let mut total: u64 = 0;

    loop {
        let n = source
            .read(&mut buf)
            .await
            .map_err(TransformError::SourceRead)?;
        if n == 0 {
            break;
        }
        engine.apply(&mut buf[..n])?;
        sink.write_all(&buf[..n])
            .await
            .map_err(TransformError::SinkWrite)?;
        total += n as u64;
    }

    // Completion means flushed and shut down, not merely handed off.
    sink.flush().await.map_err(TransformError::SinkWrite)?;
    sink.shutdown().await.map_err(TransformError::SinkWrite)?;
    Ok(total)
}

/// Transform the file at `src` into `dst`, removing `dst` on failure.
///
/// The destination is created (truncating any previous content). On any
/// pipeline error the partial destination is deleted so a failed transform
/// never leaves a truncated artifact that looks complete.
///
/// # Errors
///
/// Returns [`TransformError::SourceRead`] if `src` cannot be opened or read,
/// [`TransformError::SinkWrite`] if `dst` cannot be created or written.
pub async fn transform_file(
    src: &Path,
    dst: &Path,
    engine: &mut CipherEngine,
) -> Result<u64, TransformError> {
    let source = fs::File::open(src)
        .await
        .map_err(TransformError::SourceRead)?;
    let sink = fs::File::create(dst)
        .await
        .map_err(TransformError::SinkWrite)?;

    match run(source, sink, engine).await {
        Ok(n) => Ok(n),
        Err(e) => {
            let _ = fs::remove_file(dst).await;
            Err(e)
        }
    }
}
