//! Copying a child's output into a capture buffer and, optionally, a visible stream.

use std::io;

use tokio::io::AsyncRead;
use tokio::io::AsyncReadExt;
use tokio::io::AsyncWriteExt;
use tracing::instrument;

use crate::buffers::READ_BUFFER_CAPACITY;
use crate::writer::CaptureBuffer;
use crate::writer::OutputStream;

/// A pair of writers receiving every chunk read from a child's output stream.
///
/// The capture buffer always receives every chunk. If writing to the visible stream fails, the
/// visible stream is dropped and capturing continues.
#[derive(Debug)]
pub struct Tee {
    name: &'static str,
    capture: CaptureBuffer,
    visible: Option<OutputStream>,
}

impl Tee {
    /// Construct a tee for the stream called `name` (used for logging).
    pub fn new(name: &'static str, capture: CaptureBuffer, visible: Option<OutputStream>) -> Self {
        Self {
            name,
            capture,
            visible,
        }
    }

    /// Write a chunk to both writers.
    pub async fn write_all(&mut self, chunk: &[u8]) {
        self.capture.append(chunk);

        if let Some(visible) = &mut self.visible {
            let result = async {
                visible.write_all(chunk).await?;
                visible.flush().await
            }
            .await;

            if let Err(err) = result {
                tracing::warn!(stream = self.name, "Failed to show output, only capturing: {err}");
                self.visible = None;
            }
        }
    }

    /// Copy everything from `reader` into this tee until end-of-file.
    #[instrument(skip_all, fields(stream = self.name), level = "debug")]
    pub async fn drain(mut self, mut reader: impl AsyncRead + Unpin) -> io::Result<()> {
        let mut buffer = vec![0; READ_BUFFER_CAPACITY];
        let mut total = 0;
        loop {
            let n = reader.read(&mut buffer).await?;
            if n == 0 {
                break;
            }
            tracing::trace!(bytes = n, "Read chunk");
            total += n;
            self.write_all(&buffer[..n]).await;
        }
        tracing::debug!(bytes = total, "Reached end of stream");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use tokio::io::AsyncWriteExt;
    use tracing_test::traced_test;

    #[tokio::test]
    async fn test_drain_capture_only() {
        let capture = CaptureBuffer::new();
        let tee = Tee::new("stdout", capture.clone(), None);
        tee.drain(&b"hello\nworld\n"[..]).await.unwrap();
        assert_eq!(capture.contents(), "hello\nworld\n");
    }

    #[tokio::test]
    async fn test_drain_visible() {
        let capture = CaptureBuffer::new();
        let shown = CaptureBuffer::new();
        let tee = Tee::new(
            "stderr",
            capture.clone(),
            Some(OutputStream::buffer(shown.clone())),
        );
        tee.drain(&b"warning: oops\n"[..]).await.unwrap();
        assert_eq!(capture.contents(), "warning: oops\n");
        assert_eq!(shown.contents(), "warning: oops\n");
    }

    #[tokio::test]
    #[traced_test]
    async fn test_drain_visible_closed() {
        let (write, read) = tokio::io::duplex(64);
        drop(read);

        let capture = CaptureBuffer::new();
        let tee = Tee::new(
            "stdout",
            capture.clone(),
            Some(OutputStream::duplex_stream(write)),
        );

        let (mut child, output) = tokio::io::duplex(64);
        child.write_all(b"first\n").await.unwrap();
        child.write_all(b"second\n").await.unwrap();
        drop(child);
        tee.drain(output).await.unwrap();

        assert_eq!(capture.contents(), "first\nsecond\n");
        assert!(logs_contain("Failed to show output, only capturing"));
    }
}
