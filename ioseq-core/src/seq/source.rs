use std::{fmt, future::Future, pin::pin};

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use super::{ByteSeq, Yielder};
use crate::bytes::{BufMut, Bytes, BytesMut};
use crate::error::BoxError;
use crate::telemetry::tracing;

/// Default size of the one working buffer used by [`ReaderSeq`].
pub const DEFAULT_BUFFER_SIZE: usize = 8 * 1024;

/// A byte source that can push everything it has into a sink by itself.
///
/// Sources implementing it skip the fill-a-buffer-and-yield loop
/// of [`ReaderSeq`] once adapted through [`seq_from_write_to`]:
/// every write they do on the given sink becomes one chunk.
pub trait WriteTo {
    /// Write all remaining data into `writer`, returning the number of bytes written.
    ///
    /// A failed write on `writer` is expected to be returned as is.
    fn write_to<W>(&mut self, writer: &mut W) -> impl Future<Output = Result<u64, BoxError>> + Send
    where
        W: AsyncWrite + Send + Unpin + ?Sized;
}

impl WriteTo for Bytes {
    async fn write_to<W>(&mut self, writer: &mut W) -> Result<u64, BoxError>
    where
        W: AsyncWrite + Send + Unpin + ?Sized,
    {
        let data = std::mem::take(self);
        writer.write_all(&data).await?;
        Ok(data.len() as u64)
    }
}

/// A [`ByteSeq`] pulling its chunks out of an [`AsyncRead`].
///
/// A single working buffer is filled with at most `buffer_size` bytes per
/// step, and handed to the consumer without a copy. Its memory is reused for
/// later steps once the consumer released the chunk. A read of zero bytes
/// ends the sequence cleanly, a failed read ends it with that error.
pub struct ReaderSeq<R> {
    reader: R,
    buffer_size: usize,
}

impl<R> ReaderSeq<R> {
    /// Create a new [`ReaderSeq`] with a buffer of [`DEFAULT_BUFFER_SIZE`] bytes.
    pub const fn new(reader: R) -> Self {
        Self {
            reader,
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }

    /// Set the size of the working buffer, clamped to at least one byte.
    #[must_use]
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size.max(1);
        self
    }

    /// Set the size of the working buffer, clamped to at least one byte.
    pub fn set_buffer_size(&mut self, size: usize) -> &mut Self {
        self.buffer_size = size.max(1);
        self
    }

    /// The size of the working buffer.
    #[must_use]
    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    /// Consume the sequence, returning the inner reader.
    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: fmt::Debug> fmt::Debug for ReaderSeq<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReaderSeq")
            .field("reader", &self.reader)
            .field("buffer_size", &self.buffer_size)
            .finish()
    }
}

impl<R> ByteSeq for ReaderSeq<R>
where
    R: AsyncRead + Send + 'static,
{
    async fn drive(self, mut yielder: Yielder) {
        let Self {
            reader,
            buffer_size,
        } = self;
        let mut reader = pin!(reader);
        let mut buf = BytesMut::new();

        loop {
            buf.reserve(buffer_size);
            let read = reader.read_buf(&mut (&mut buf).limit(buffer_size)).await;
            match read {
                Ok(0) => {
                    tracing::trace!("byte sequence reader reached eof");
                    return;
                }
                Ok(_) => {
                    if yielder.yield_chunk(buf.split().freeze()).await.is_break() {
                        return;
                    }
                }
                Err(err) => {
                    tracing::debug!("byte sequence reader failed: {err}");
                    if yielder.yield_error(err).await.is_break() {
                        tracing::trace!("read error step refused by stopped consumer");
                    }
                    return;
                }
            }
        }
    }
}

/// A [`ByteSeq`] driven by a [`WriteTo`] source writing into a [`SeqWriter`](super::SeqWriter).
pub struct WriteToSeq<R>(R);

impl<R: fmt::Debug> fmt::Debug for WriteToSeq<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("WriteToSeq").field(&self.0).finish()
    }
}

impl<R> ByteSeq for WriteToSeq<R>
where
    R: WriteTo + Send + 'static,
{
    async fn drive(self, mut yielder: Yielder) {
        let mut source = self.0;
        let mut writer = yielder.writer();

        match source.write_to(&mut writer).await {
            Ok(n) => tracing::trace!(bytes = n, "write_to source finished"),
            Err(err) if yielder.is_active() => {
                tracing::debug!("write_to source failed: {err}");
                if yielder.yield_error(err).await.is_break() {
                    tracing::trace!("write_to error step refused by stopped consumer");
                }
            }
            Err(err) => tracing::trace!("suppress error of stopped write_to source: {err}"),
        }
    }
}

/// Adapt a demand-driven byte source into a [`ByteSeq`],
/// using a working buffer of `buffer_size` bytes (at least one).
pub fn seq_from_reader<R>(reader: R, buffer_size: usize) -> ReaderSeq<R>
where
    R: AsyncRead + Send + 'static,
{
    ReaderSeq::new(reader).with_buffer_size(buffer_size)
}

/// Adapt a [`WriteTo`] source into a [`ByteSeq`], skipping the working buffer.
pub fn seq_from_write_to<R>(source: R) -> WriteToSeq<R>
where
    R: WriteTo + Send + 'static,
{
    WriteToSeq(source)
}
