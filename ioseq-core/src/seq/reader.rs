use std::{
    fmt, io, mem,
    pin::Pin,
    task::{Context, Poll, ready},
};

use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};

use super::{BoxSteps, ByteSeq, WriteTo, copy_seq, steps};
use crate::bytes::Bytes;
use crate::error::{BoxError, SharedError};
use crate::futures::StreamExt;
use crate::telemetry::tracing;

enum State<S> {
    Idle(S),
    Pulling(BoxSteps),
    Done,
}

#[derive(Debug, Clone)]
enum Terminal {
    Eof,
    Failed(SharedError),
}

/// An [`AsyncRead`] over the chunks of a [`ByteSeq`].
///
/// The sequence is only started on the first read, from then on every read
/// copies as much of the current chunk as fits, pulling the next chunk once
/// the previous one is consumed. The first error of the sequence is returned
/// by every read that follows it, the sequence itself is never resumed again
/// after it ended.
///
/// A read that delivers the last bytes of a sequence does not report its end
/// at the same time: the end of stream (or the terminal error) is returned by
/// the read after it.
///
/// Call [`StreamReader::close`] once done reading to let an unfinished
/// producer run its cleanup. A reader dropped while still pulling cancels the
/// producer at its current suspension point.
///
/// A reader that was never read from can be copied in bulk via [`WriteTo`],
/// which drives the sequence straight into the destination.
pub struct StreamReader<S> {
    state: State<S>,
    residual: Bytes,
    terminal: Option<Terminal>,
}

// the sequence is never pinned before it got moved into its (boxed) producer
impl<S> Unpin for StreamReader<S> {}

impl<S> StreamReader<S> {
    /// Create a new [`StreamReader`], reading the chunks of `seq`.
    pub const fn new(seq: S) -> Self {
        Self {
            state: State::Idle(seq),
            residual: Bytes::new(),
            terminal: None,
        }
    }

    /// Returns true if the sequence was not started yet.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self.state, State::Idle(_))
    }

    /// Returns true once an end of stream or error got recorded,
    /// including the one installed by [`StreamReader::close`].
    #[must_use]
    pub fn is_terminated(&self) -> bool {
        self.terminal.is_some()
    }
}

impl<S: ByteSeq> StreamReader<S> {
    /// Release the sequence, letting its producer run its cleanup if it did not finish yet.
    ///
    /// Any later read reports the end of stream, unless an error was recorded
    /// before, in which case that error keeps being reported. Calling it again,
    /// or before any read, is fine.
    pub async fn close(&mut self) {
        match mem::replace(&mut self.state, State::Done) {
            State::Pulling(mut steps) => {
                Pin::new(&mut steps).stop().await;
                tracing::trace!("byte sequence reader closed");
            }
            State::Idle(_) => tracing::trace!("byte sequence reader closed before it was read"),
            State::Done => (),
        }
        self.residual.clear();
        self.terminal.get_or_insert(Terminal::Eof);
    }

    fn pulling(&mut self) -> Option<&mut BoxSteps> {
        self.state = match mem::replace(&mut self.state, State::Done) {
            State::Idle(seq) => {
                tracing::trace!("byte sequence reader: start pulling");
                State::Pulling(steps::launch_boxed(seq))
            }
            state => state,
        };
        match &mut self.state {
            State::Pulling(steps) => Some(steps),
            State::Idle(_) | State::Done => None,
        }
    }

    fn fail(&mut self, err: BoxError) -> io::Error {
        tracing::debug!("byte sequence reader failed: {err}");
        let err = SharedError::from(err);
        self.terminal = Some(Terminal::Failed(err.clone()));
        err.into_io_error()
    }
}

impl<S: ByteSeq> AsyncRead for StreamReader<S> {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();

        if buf.remaining() == 0 {
            return Poll::Ready(Ok(()));
        }

        loop {
            if !this.residual.is_empty() {
                let n = this.residual.len().min(buf.remaining());
                buf.put_slice(&this.residual.split_to(n));
                return Poll::Ready(Ok(()));
            }

            match &this.terminal {
                Some(Terminal::Eof) => return Poll::Ready(Ok(())),
                Some(Terminal::Failed(err)) => return Poll::Ready(Err(err.clone().into_io_error())),
                None => (),
            }

            let Some(steps) = this.pulling() else {
                return Poll::Ready(Ok(()));
            };

            match ready!(steps.poll_next_unpin(cx)) {
                // empty chunks are skipped
                Some(Ok(chunk)) => this.residual = chunk,
                Some(Err(err)) => return Poll::Ready(Err(this.fail(err))),
                None => {
                    tracing::trace!("byte sequence reader reached end of stream");
                    this.state = State::Done;
                    this.terminal = Some(Terminal::Eof);
                    return Poll::Ready(Ok(()));
                }
            }
        }
    }
}

impl<S: ByteSeq> WriteTo for StreamReader<S> {
    /// Copy everything that is left into `writer`.
    ///
    /// A reader that was never read from drives its sequence straight into
    /// `writer`, after which any read reports the end of stream.
    /// Otherwise this falls back to copying via incremental reads.
    async fn write_to<W>(&mut self, writer: &mut W) -> Result<u64, BoxError>
    where
        W: AsyncWrite + Send + Unpin + ?Sized,
    {
        match mem::replace(&mut self.state, State::Done) {
            State::Idle(seq) => {
                tracing::trace!("byte sequence reader: bulk copy");
                let result = copy_seq(seq, writer).await;
                self.terminal = Some(Terminal::Eof);
                result
            }
            state => {
                self.state = state;
                Ok(tokio::io::copy(self, writer).await?)
            }
        }
    }
}

impl<S> Drop for StreamReader<S> {
    fn drop(&mut self) {
        if let State::Pulling(steps) = &self.state
            && !steps.is_terminated()
        {
            tracing::trace!("byte sequence reader dropped before close: cancel producer");
        }
    }
}

impl<S> fmt::Debug for StreamReader<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &self.state {
            State::Idle(_) => "idle",
            State::Pulling(_) => "pulling",
            State::Done => "done",
        };
        f.debug_struct("StreamReader")
            .field("state", &state)
            .field("residual", &self.residual.len())
            .field("terminal", &self.terminal)
            .finish()
    }
}
