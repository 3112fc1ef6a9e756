//! Pull sequences of byte chunks, and the adapters between them and push-style I/O.
//!
//! A [`ByteSeq`] is driven by its consumer: its producer is handed a
//! [`Yielder`] and only makes progress while the consumer asks for the next
//! [`Step`]. Each step is either a chunk of bytes or the single terminal
//! error of the sequence. A sequence that simply runs out of data ends
//! without a final error step.
//!
//! A consumer can stop a sequence at any point. The producer learns about it
//! through the [`ControlFlow::Break`] returned by its pending yield (or the
//! [`SequenceTerminated`] error of its [`SeqWriter`]) and is expected to
//! return after its own cleanup. Stopping is never reported as an error
//! to either side.
//!
//! Chunks are [`Bytes`]: once handed over they are owned by the consumer
//! and remain valid for as long as it wants to keep them.
//!
//! # Adapters
//!
//! | from | to | via |
//! |------|----|-----|
//! | [`AsyncRead`] | [`ByteSeq`] | [`seq_from_reader`] |
//! | [`WriteTo`] | [`ByteSeq`] | [`seq_from_write_to`] |
//! | [`Stream`] | [`ByteSeq`] | [`seq_from_stream`] |
//! | [`ByteSeq`] | [`Stream`] | [`ByteSeqExt::into_steps`] |
//! | [`ByteSeq`] | [`AsyncRead`] | [`ByteSeqExt::into_reader`] |
//! | [`ByteSeq`] | [`AsyncWrite`] | [`copy_seq`] |
//! | [`ByteSeq`] + [`AsyncWrite`] transform | [`ByteSeq`] | [`pipe_seq_through`] |
//! | [`AsyncRead`] + [`AsyncWrite`] transform | [`AsyncRead`] | [`pipe_through`] |
//!
//! All of it runs within the task polling the consumer side.
//! Nothing gets spawned, and the only copies made are the ones
//! of [`SeqWriter`] (which accepts borrowed slices) and of
//! [`StreamReader`] (which fills borrowed buffers).

use std::{fmt, future::Future, pin::pin};

use tokio::io::{AsyncRead, AsyncWrite};

use crate::bytes::Bytes;
use crate::error::BoxError;
use crate::futures::{Stream, StreamExt};

#[doc(no_inline)]
pub use std::ops::ControlFlow;

mod yielder;
#[doc(inline)]
pub use yielder::{ActiveFlag, YieldStep, Yielder};

mod steps;
#[doc(inline)]
pub use steps::{BoxSteps, Steps};

mod sink;
#[doc(inline)]
pub use sink::{SeqWriter, SequenceTerminated, is_sequence_terminated};

mod copy;
#[doc(inline)]
pub use copy::copy_seq;

mod source;
#[doc(inline)]
pub use source::{
    DEFAULT_BUFFER_SIZE, ReaderSeq, WriteTo, WriteToSeq, seq_from_reader, seq_from_write_to,
};

mod reader;
#[doc(inline)]
pub use reader::StreamReader;

mod pipe;
#[doc(inline)]
pub use pipe::{ContentSeq, PipeSeq, pipe_seq_through, pipe_through, reader_with_content};

/// One step of a [`ByteSeq`]: the next chunk, or the terminal error.
pub type Step = Result<Bytes, BoxError>;

/// A lazily driven producer of byte chunks.
///
/// The future returned by [`ByteSeq::drive`] is the producer. It hands its
/// steps over one at a time using the given [`Yielder`], and returns once it
/// has no more data, once it yielded an error, or once a yield resolved to
/// [`ControlFlow::Break`].
///
/// Most sequences are created by one of the adapters of this module,
/// or from an async closure via [`seq_fn`].
pub trait ByteSeq: Send + 'static {
    /// Run the producer, yielding every step through `yielder`.
    fn drive(self, yielder: Yielder) -> impl Future<Output = ()> + Send + 'static;
}

/// Extends [`ByteSeq`] with the ways to consume it.
pub trait ByteSeqExt: ByteSeq + Sized {
    /// Pull the steps of this sequence as a [`Stream`].
    fn into_steps(self) -> Steps<impl Future<Output = ()> + Send + 'static> {
        steps::launch(self)
    }

    /// Read the bytes of this sequence via [`AsyncRead`].
    fn into_reader(self) -> StreamReader<Self> {
        StreamReader::new(self)
    }

    /// Feed this sequence through the write transform created by `transform`.
    fn pipe_through<F, W>(self, transform: F) -> PipeSeq<Self, F>
    where
        F: FnOnce(SeqWriter) -> W + Send + 'static,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        pipe_seq_through(self, transform)
    }

    /// Write every chunk of this sequence into `writer`.
    ///
    /// See [`copy_seq`].
    fn copy_to<W>(self, writer: &mut W) -> impl Future<Output = Result<u64, BoxError>> + Send
    where
        W: AsyncWrite + Send + Unpin + ?Sized,
    {
        copy_seq(self, writer)
    }
}

impl<S: ByteSeq> ByteSeqExt for S {}

/// A [`ByteSeq`] backed by a producer function.
///
/// Created by [`seq_fn`].
#[derive(Clone)]
pub struct SeqFn<F>(F);

impl<F> fmt::Debug for SeqFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SeqFn")
            .field(&std::any::type_name::<F>())
            .finish()
    }
}

impl<F, Fut> ByteSeq for SeqFn<F>
where
    F: FnOnce(Yielder) -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    fn drive(self, yielder: Yielder) -> impl Future<Output = ()> + Send + 'static {
        (self.0)(yielder)
    }
}

/// Create a [`ByteSeq`] from a producer function, usually an async closure.
pub fn seq_fn<F, Fut>(f: F) -> SeqFn<F>
where
    F: FnOnce(Yielder) -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    SeqFn(f)
}

/// A [`ByteSeq`] of chunks taken from an iterator.
///
/// Created by [`seq_from_chunks`].
#[derive(Debug, Clone)]
pub struct ChunksSeq<I>(I);

impl<I> ByteSeq for ChunksSeq<I>
where
    I: Iterator<Item: Into<Bytes> + Send> + Send + 'static,
{
    async fn drive(self, mut yielder: Yielder) {
        for chunk in self.0 {
            if yielder.yield_chunk(chunk).await.is_break() {
                return;
            }
        }
    }
}

/// Create a [`ByteSeq`] yielding every item of `chunks`, in order.
pub fn seq_from_chunks<I>(chunks: I) -> ChunksSeq<I::IntoIter>
where
    I: IntoIterator<Item: Into<Bytes> + Send>,
    I::IntoIter: Send + 'static,
{
    ChunksSeq(chunks.into_iter())
}

/// A [`ByteSeq`] of the items of a fallible [`Stream`].
///
/// Created by [`seq_from_stream`].
#[derive(Debug)]
pub struct StreamSeq<St>(St);

impl<St, B, E> ByteSeq for StreamSeq<St>
where
    St: Stream<Item = Result<B, E>> + Send + 'static,
    B: Into<Bytes> + Send + 'static,
    E: Into<BoxError> + Send + 'static,
{
    async fn drive(self, mut yielder: Yielder) {
        let mut stream = pin!(self.0);
        while let Some(item) = stream.next().await {
            let step = item.map(Into::into).map_err(Into::into);
            let failed = step.is_err();
            if yielder.yield_step(step).await.is_break() || failed {
                return;
            }
        }
    }
}

/// Create a [`ByteSeq`] from a [`Stream`] of chunks, ending at its first error.
pub fn seq_from_stream<St, B, E>(stream: St) -> StreamSeq<St>
where
    St: Stream<Item = Result<B, E>> + Send + 'static,
    B: Into<Bytes> + Send + 'static,
    E: Into<BoxError> + Send + 'static,
{
    StreamSeq(stream)
}

/// Adapt a demand-driven byte source into a [`StreamReader`], reading
/// from it with a working buffer of [`DEFAULT_BUFFER_SIZE`] bytes.
pub fn reader_from<R>(reader: R) -> StreamReader<ReaderSeq<R>>
where
    R: AsyncRead + Send + 'static,
{
    StreamReader::new(ReaderSeq::new(reader))
}
