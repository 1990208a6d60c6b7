//! Stream handles used to route a child's standard streams.

use std::fmt::Debug;
use std::io;
use std::pin::Pin;
use std::sync::PoisonError;
use std::task::Context;
use std::task::Poll;

use async_dup::Arc;
use async_dup::Mutex;
use tokio::io::AsyncWrite;
use tokio::io::DuplexStream;
use tokio::io::Sink;
use tokio::io::Stderr;
use tokio::io::Stdout;
use tokio_util::compat::Compat;
use tokio_util::compat::FuturesAsyncWriteCompatExt;
use tokio_util::compat::TokioAsyncWriteCompatExt;

use crate::buffers::CAPTURE_BUFFER_CAPACITY;

/// An append-only byte buffer shared between a reader task and a
/// [`ProcessResult`][crate::ProcessResult].
///
/// Clones share the same underlying buffer.
#[derive(Debug, Clone)]
pub struct CaptureBuffer(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

impl CaptureBuffer {
    /// Construct an empty buffer.
    pub fn new() -> Self {
        Self(std::sync::Arc::new(std::sync::Mutex::new(Vec::with_capacity(
            CAPTURE_BUFFER_CAPACITY,
        ))))
    }

    /// Append bytes to the end of the buffer.
    pub fn append(&self, bytes: &[u8]) {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(bytes);
    }

    /// A copy of the raw bytes written so far.
    pub fn bytes(&self) -> Vec<u8> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// The contents written so far, decoded as UTF-8. Invalid sequences are replaced with
    /// `U+FFFD`.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap_or_else(PoisonError::into_inner))
            .into_owned()
    }

    /// True if nothing has been written yet.
    pub fn is_empty(&self) -> bool {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).is_empty()
    }
}

impl Default for CaptureBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// A place to show a child's output.
#[derive(Debug)]
pub enum OutputStream {
    /// This process's stdout.
    Stdout(Stdout),
    /// This process's stderr.
    Stderr(Stderr),
    /// One half of an in-memory pipe.
    DuplexStream(Compat<Arc<Mutex<Compat<DuplexStream>>>>),
    /// An in-memory buffer.
    Buffer(CaptureBuffer),
    /// Discard everything.
    Sink(Sink),
}

impl OutputStream {
    /// Write to this process's stdout.
    pub fn stdout() -> Self {
        Self::Stdout(tokio::io::stdout())
    }

    /// Write to this process's stderr.
    pub fn stderr() -> Self {
        Self::Stderr(tokio::io::stderr())
    }

    /// Write to an in-memory pipe. Clones write to the same pipe.
    pub fn duplex_stream(duplex_stream: DuplexStream) -> Self {
        Self::DuplexStream(Arc::new(Mutex::new(duplex_stream.compat_write())).compat_write())
    }

    /// Write to an in-memory buffer. Clones write to the same buffer.
    pub fn buffer(buffer: CaptureBuffer) -> Self {
        Self::Buffer(buffer)
    }

    /// Discard everything written.
    pub fn sink() -> Self {
        Self::Sink(tokio::io::sink())
    }
}

impl AsyncWrite for OutputStream {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<Result<usize, io::Error>> {
        match Pin::into_inner(self) {
            Self::Stdout(ref mut x) => Pin::new(x).poll_write(cx, buf),
            Self::Stderr(ref mut x) => Pin::new(x).poll_write(cx, buf),
            Self::DuplexStream(ref mut x) => Pin::new(x).poll_write(cx, buf),
            Self::Buffer(x) => {
                x.append(buf);
                Poll::Ready(Ok(buf.len()))
            }
            Self::Sink(ref mut x) => Pin::new(x).poll_write(cx, buf),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<(), io::Error>> {
        match Pin::into_inner(self) {
            Self::Stdout(ref mut x) => Pin::new(x).poll_flush(cx),
            Self::Stderr(ref mut x) => Pin::new(x).poll_flush(cx),
            Self::DuplexStream(ref mut x) => Pin::new(x).poll_flush(cx),
            Self::Buffer(_) => Poll::Ready(Ok(())),
            Self::Sink(ref mut x) => Pin::new(x).poll_flush(cx),
        }
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<(), io::Error>> {
        match Pin::into_inner(self) {
            Self::Stdout(ref mut x) => Pin::new(x).poll_shutdown(cx),
            Self::Stderr(ref mut x) => Pin::new(x).poll_shutdown(cx),
            Self::DuplexStream(ref mut x) => Pin::new(x).poll_shutdown(cx),
            Self::Buffer(_) => Poll::Ready(Ok(())),
            Self::Sink(ref mut x) => Pin::new(x).poll_shutdown(cx),
        }
    }
}

impl Clone for OutputStream {
    fn clone(&self) -> Self {
        match self {
            Self::Stdout(_) => Self::stdout(),
            Self::Stderr(_) => Self::stderr(),
            Self::DuplexStream(x) => Self::DuplexStream(x.clone()),
            Self::Buffer(x) => Self::Buffer(x.clone()),
            Self::Sink(_) => Self::sink(),
        }
    }
}

/// Where a child's stdin comes from when it's connected.
#[derive(Debug, Clone)]
pub enum InputStream {
    /// Inherit this process's stdin.
    Stdin,
    /// Feed these bytes to the child, then close its stdin.
    Bytes(std::sync::Arc<[u8]>),
    /// An empty input.
    Null,
}

impl InputStream {
    /// Feed the given bytes to the child.
    pub fn bytes(bytes: impl Into<Vec<u8>>) -> Self {
        let bytes: Vec<u8> = bytes.into();
        Self::Bytes(bytes.into())
    }
}
