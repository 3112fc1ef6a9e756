use std::{
    io,
    pin::Pin,
    task::{Context, Poll, ready},
};

use base64::{Engine as _, engine::general_purpose::STANDARD};
use tokio::io::AsyncWrite;

/// A streaming base64 encoder, writing its (padded) encoding into `inner`.
///
/// Input is accepted in full once the output of the previous write was
/// drained into `inner`. Up to two trailing input bytes are kept around
/// until more input arrives, or until shutdown, which pads them.
pub(crate) struct Base64Encoder<W> {
    inner: W,
    carry: Vec<u8>,
    out: Vec<u8>,
    written: usize,
}

impl<W> Base64Encoder<W> {
    pub(crate) fn new(inner: W) -> Self {
        Self {
            inner,
            carry: Vec::with_capacity(2),
            out: Vec::new(),
            written: 0,
        }
    }
}

impl<W: AsyncWrite + Unpin> Base64Encoder<W> {
    fn poll_drain(&mut self, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        while self.written < self.out.len() {
            let n = ready!(Pin::new(&mut self.inner).poll_write(cx, &self.out[self.written..]))?;
            if n == 0 {
                return Poll::Ready(Err(io::ErrorKind::WriteZero.into()));
            }
            self.written += n;
        }
        self.out.clear();
        self.written = 0;
        Poll::Ready(Ok(()))
    }
}

impl<W: AsyncWrite + Unpin> AsyncWrite for Base64Encoder<W> {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let this = self.get_mut();
        ready!(this.poll_drain(cx))?;

        if buf.is_empty() {
            return Poll::Ready(Ok(0));
        }

        let mut input = std::mem::take(&mut this.carry);
        input.extend_from_slice(buf);
        let full = input.len() / 3 * 3;

        this.out = STANDARD.encode(&input[..full]).into_bytes();
        this.carry = input.split_off(full);

        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        ready!(this.poll_drain(cx))?;
        Pin::new(&mut this.inner).poll_flush(cx)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        ready!(this.poll_drain(cx))?;

        if !this.carry.is_empty() {
            this.out = STANDARD.encode(&this.carry).into_bytes();
            this.carry.clear();
            ready!(this.poll_drain(cx))?;
        }

        Pin::new(&mut this.inner).poll_shutdown(cx)
    }
}

#[tokio::test]
async fn base64_encoder_pads_on_shutdown() {
    use tokio::io::AsyncWriteExt;

    let mut encoder = Base64Encoder::new(Vec::new());
    for part in [&b"hel"[..], b"lo, w", b"orld\n"] {
        encoder.write_all(part).await.unwrap();
    }
    encoder.shutdown().await.unwrap();

    assert_eq!(encoder.inner, b"aGVsbG8sIHdvcmxkCg==");
}
