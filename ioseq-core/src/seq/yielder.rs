use std::{
    fmt,
    future::Future,
    ops::ControlFlow,
    pin::Pin,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    task::{Context, Poll},
};

use parking_lot::Mutex;

use super::{SeqWriter, Step};
use crate::bytes::Bytes;
use crate::error::BoxError;
use crate::telemetry::tracing;

/// Shared "still willing to accept data" cell of a single sequence.
///
/// A fresh flag is created for every sequence that gets driven and is shared by
/// the producer side ([`Yielder`], [`SeqWriter`]) and the consumer driving it.
/// It starts out active and is flipped exactly once, by the consumer refusing
/// any further steps. It never becomes active again.
#[derive(Clone)]
pub struct ActiveFlag(Arc<AtomicBool>);

impl ActiveFlag {
    /// Create a new, active, flag.
    #[must_use]
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    /// Returns true as long as the consumer accepts further steps.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Mark the sequence as terminated by its consumer,
    /// returning whether it was still active before this call.
    pub fn deactivate(&self) -> bool {
        self.0.swap(false, Ordering::AcqRel)
    }
}

impl Default for ActiveFlag {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ActiveFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ActiveFlag").field(&self.is_active()).finish()
    }
}

/// Slot through which a suspended producer hands its step to the puller.
///
/// Only ever touched by the one thread polling the sequence,
/// the lock is there to make the handoff [`Send`].
#[derive(Debug, Default)]
pub(super) struct Handoff {
    slot: Mutex<Option<Step>>,
}

impl Handoff {
    /// Move `step` into the slot, unless the slot is still occupied.
    fn offer(&self, step: &mut Option<Step>) {
        let mut slot = self.slot.lock();
        if slot.is_none() {
            *slot = step.take();
        }
    }

    fn is_taken(&self) -> bool {
        self.slot.lock().is_none()
    }

    pub(super) fn take(&self) -> Option<Step> {
        self.slot.lock().take()
    }
}

/// The step function handed to a [`ByteSeq`](super::ByteSeq) producer.
///
/// Every [`yield_step`](Self::yield_step) suspends the producer until its
/// consumer asks for more, at which point it resolves to
/// [`ControlFlow::Continue`], or until the consumer stopped, in which case
/// it resolves to [`ControlFlow::Break`]. A producer is expected to return
/// (after its own cleanup) once it got a `Break`: any later step is refused
/// without ever reaching the consumer.
///
/// A yielded chunk is handed over as is, without a copy.
pub struct Yielder {
    handoff: Arc<Handoff>,
    active: ActiveFlag,
}

impl Yielder {
    pub(super) fn new(handoff: Arc<Handoff>, active: ActiveFlag) -> Self {
        Self { handoff, active }
    }

    /// Returns true as long as the consumer accepts further steps.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.is_active()
    }

    /// The [`ActiveFlag`] shared between this producer and its consumer.
    #[must_use]
    pub fn active_flag(&self) -> &ActiveFlag {
        &self.active
    }

    /// Hand the next step over to the consumer.
    pub fn yield_step(&mut self, step: Step) -> YieldStep<'_> {
        YieldStep {
            yielder: self,
            step: Some(step),
        }
    }

    /// Hand the next chunk over to the consumer.
    pub fn yield_chunk(&mut self, chunk: impl Into<Bytes>) -> YieldStep<'_> {
        self.yield_step(Ok(chunk.into()))
    }

    /// Hand the terminal error over to the consumer.
    ///
    /// The sequence is over after this step, no matter what it resolves to.
    pub fn yield_error(&mut self, error: impl Into<BoxError>) -> YieldStep<'_> {
        self.yield_step(Err(error.into()))
    }

    /// Create a [`SeqWriter`] that turns every write into a step of this sequence.
    ///
    /// The writer shares the sequence with this yielder: do not await a step
    /// of both at the same time.
    #[must_use]
    pub fn writer(&self) -> SeqWriter {
        SeqWriter::new(Self {
            handoff: self.handoff.clone(),
            active: self.active.clone(),
        })
    }

    /// Poll the handoff of `step`.
    ///
    /// While `step` is `Some` it has not been handed over yet, once taken out
    /// of the option it is owned by the consumer and this call waits for
    /// the consumer to ask for the next step.
    pub(super) fn poll_yield(&self, step: &mut Option<Step>) -> Poll<ControlFlow<()>> {
        if !self.active.is_active() {
            if step.take().is_some() {
                tracing::trace!("sequence step refused: consumer stopped");
            }
            return Poll::Ready(ControlFlow::Break(()));
        }

        if step.is_some() {
            // no wake-up needed: the puller checks the slot
            // every time the producer returns pending
            self.handoff.offer(step);
            return Poll::Pending;
        }

        if !self.handoff.is_taken() {
            return Poll::Pending;
        }

        Poll::Ready(if self.active.is_active() {
            ControlFlow::Continue(())
        } else {
            ControlFlow::Break(())
        })
    }
}

impl fmt::Debug for Yielder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Yielder")
            .field("active", &self.active)
            .finish()
    }
}

/// Future for the [`yield_step`](Yielder::yield_step) method.
#[must_use = "futures do nothing unless polled"]
pub struct YieldStep<'a> {
    yielder: &'a mut Yielder,
    step: Option<Step>,
}

impl Future for YieldStep<'_> {
    type Output = ControlFlow<()>;

    fn poll(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        this.yielder.poll_yield(&mut this.step)
    }
}

impl fmt::Debug for YieldStep<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("YieldStep")
            .field("yielder", &self.yielder)
            .field("handed_off", &self.step.is_none())
            .finish()
    }
}
