use std::{fmt, future::Future};

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

use super::{ByteSeq, ReaderSeq, SeqWriter, StreamReader, Yielder, copy_seq, seq_from_reader};
use crate::error::{BoxError, ErrorContext as _};
use crate::telemetry::tracing;

/// A [`ByteSeq`] of the output of a write transform, fed with the chunks of an input sequence.
///
/// Created by [`pipe_seq_through`]. On its first pull the transform is built
/// around a [`SeqWriter`] of the output sequence, after which every input
/// chunk is written into it. Once the input is exhausted the transform is
/// shut down, giving it the chance to emit any trailing bytes it still holds.
///
/// A failure of the input or of the transform becomes the terminal error of
/// the output sequence (a failure to close the transform is annotated as such),
/// unless the output consumer already stopped, in which
/// case it is the expected fallout of that stop and is dropped.
pub struct PipeSeq<S, F> {
    input: S,
    transform: F,
}

impl<S: fmt::Debug, F> fmt::Debug for PipeSeq<S, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipeSeq")
            .field("input", &self.input)
            .field("transform", &std::any::type_name::<F>())
            .finish()
    }
}

impl<S, F, W> ByteSeq for PipeSeq<S, F>
where
    S: ByteSeq,
    F: FnOnce(SeqWriter) -> W + Send + 'static,
    W: AsyncWrite + Send + Unpin + 'static,
{
    async fn drive(self, mut yielder: Yielder) {
        let Self { input, transform } = self;
        let mut sink = transform(yielder.writer());

        let result = match copy_seq(input, &mut sink).await {
            Ok(n) => sink
                .shutdown()
                .await
                .context("close transform")
                .map(|()| n)
                .map_err(BoxError::from),
            Err(err) => Err(err),
        };

        match result {
            Ok(n) => tracing::trace!(bytes = n, "pipe: input exhausted and transform closed"),
            Err(err) if yielder.is_active() => {
                tracing::debug!("pipe: transform of byte sequence failed: {err}");
                if yielder.yield_error(err).await.is_break() {
                    tracing::trace!("pipe: error step refused by stopped consumer");
                }
            }
            Err(err) => tracing::trace!("pipe: suppress failure after consumer stopped: {err}"),
        }
    }
}

/// Compose the write transform created by `transform` with the `input` sequence.
///
/// See [`PipeSeq`].
pub fn pipe_seq_through<S, F, W>(input: S, transform: F) -> PipeSeq<S, F>
where
    S: ByteSeq,
    F: FnOnce(SeqWriter) -> W + Send + 'static,
    W: AsyncWrite + Send + Unpin + 'static,
{
    PipeSeq { input, transform }
}

/// Transform the bytes of `reader` through the write transform created by `transform`.
///
/// The only buffering involved is the working buffer of `buffer_size` bytes
/// used to read from `reader`, next to whatever state the transform keeps.
pub fn pipe_through<R, F, W>(
    reader: R,
    transform: F,
    buffer_size: usize,
) -> StreamReader<PipeSeq<ReaderSeq<R>, F>>
where
    R: AsyncRead + Send + 'static,
    F: FnOnce(SeqWriter) -> W + Send + 'static,
    W: AsyncWrite + Send + Unpin + 'static,
{
    StreamReader::new(pipe_seq_through(
        seq_from_reader(reader, buffer_size),
        transform,
    ))
}

/// A [`ByteSeq`] of everything a generator function writes.
///
/// Created by [`reader_with_content`].
pub struct ContentSeq<F>(F);

impl<F> fmt::Debug for ContentSeq<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ContentSeq")
            .field(&std::any::type_name::<F>())
            .finish()
    }
}

impl<F, Fut> ByteSeq for ContentSeq<F>
where
    F: FnOnce(SeqWriter) -> Fut + Send + 'static,
    Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
{
    async fn drive(self, mut yielder: Yielder) {
        match (self.0)(yielder.writer()).await {
            Ok(()) => tracing::trace!("content generator finished"),
            Err(err) if yielder.is_active() => {
                tracing::debug!("content generator failed: {err}");
                if yielder.yield_error(err).await.is_break() {
                    tracing::trace!("content generator error step refused by stopped consumer");
                }
            }
            Err(err) => tracing::trace!("suppress failure of stopped content generator: {err}"),
        }
    }
}

/// Create a reader over everything `generate` writes into the given [`SeqWriter`].
///
/// The generator runs lazily, one write ahead of the reader at most.
/// An error it returns is read as the terminal error of the reader,
/// unless the reader was already closed.
pub fn reader_with_content<F, Fut>(generate: F) -> StreamReader<ContentSeq<F>>
where
    F: FnOnce(SeqWriter) -> Fut + Send + 'static,
    Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
{
    StreamReader::new(ContentSeq(generate))
}
