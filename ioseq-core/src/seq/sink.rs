use std::{
    error::Error as StdError,
    fmt, io,
    ops::ControlFlow,
    pin::Pin,
    task::{Context, Poll, ready},
};

use tokio::io::AsyncWrite;

use super::{Step, Yielder};
use crate::bytes::Bytes;
use crate::telemetry::tracing;

/// Error reported by a [`SeqWriter`] once the consumer of its sequence
/// refused any further steps.
///
/// It is always wrapped in an [`io::Error`] of kind [`io::ErrorKind::BrokenPipe`],
/// use [`is_sequence_terminated`] to recognise it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[non_exhaustive]
pub struct SequenceTerminated;

impl SequenceTerminated {
    fn into_io_error(self) -> io::Error {
        io::Error::new(io::ErrorKind::BrokenPipe, self)
    }
}

impl fmt::Display for SequenceTerminated {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("sequence terminated")
    }
}

impl StdError for SequenceTerminated {}

/// Returns true if `error` is (or wraps) a [`SequenceTerminated`] error.
#[must_use]
pub fn is_sequence_terminated(error: &(dyn StdError + 'static)) -> bool {
    // an io::Error hides its custom error from its own sources
    crate::error::chain(error).any(|cause| {
        cause.is::<SequenceTerminated>()
            || cause
                .downcast_ref::<io::Error>()
                .and_then(io::Error::get_ref)
                .is_some_and(|inner| inner.is::<SequenceTerminated>())
    })
}

/// An [`AsyncWrite`] sink that turns every write into one chunk of a sequence.
///
/// Created by [`Yielder::writer`]. Each non-empty write copies the written
/// bytes, so the caller is free to reuse its buffer as soon as the write
/// returned, and resolves once the consumer asked for the next chunk.
/// A write is accepted in full or not at all: a write that returned pending
/// is expected to be polled again with the same bytes.
///
/// Once the consumer stopped the sequence every write fails with
/// [`SequenceTerminated`], without producing a step. Flush and shutdown
/// have no effect.
pub struct SeqWriter {
    yielder: Yielder,
    pending: Option<Step>,
    in_flight: Option<usize>,
}

impl SeqWriter {
    pub(super) fn new(yielder: Yielder) -> Self {
        Self {
            yielder,
            pending: None,
            in_flight: None,
        }
    }

    /// Returns true as long as the consumer accepts further chunks.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.yielder.is_active()
    }
}

impl AsyncWrite for SeqWriter {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let this = self.get_mut();

        let written = match this.in_flight {
            Some(written) => written,
            None => {
                if !this.yielder.is_active() {
                    return Poll::Ready(Err(SequenceTerminated.into_io_error()));
                }
                if buf.is_empty() {
                    return Poll::Ready(Ok(0));
                }
                this.pending = Some(Ok(Bytes::copy_from_slice(buf)));
                this.in_flight = Some(buf.len());
                buf.len()
            }
        };

        let flow = ready!(this.yielder.poll_yield(&mut this.pending));
        this.in_flight = None;

        match flow {
            ControlFlow::Continue(()) => Poll::Ready(Ok(written)),
            ControlFlow::Break(()) => {
                tracing::trace!(bytes = written, "sequence writer refused: consumer stopped");
                Poll::Ready(Err(SequenceTerminated.into_io_error()))
            }
        }
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}

impl fmt::Debug for SeqWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeqWriter")
            .field("yielder", &self.yielder)
            .field("in_flight", &self.in_flight)
            .finish()
    }
}
