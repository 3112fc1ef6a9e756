use std::{
    fmt,
    future::{Future, poll_fn},
    pin::Pin,
    sync::Arc,
    task::{Context, Poll, ready},
};

use pin_project_lite::pin_project;

use super::{
    ActiveFlag, ByteSeq, Step,
    yielder::{Handoff, Yielder},
};
use crate::futures::Stream;
use crate::telemetry::tracing;

/// [`Steps`] of a type-erased producer, as used by [`StreamReader`](super::StreamReader).
pub type BoxSteps = Steps<Pin<Box<dyn Future<Output = ()> + Send>>>;

pin_project! {
    /// The pull side of a [`ByteSeq`]: a [`Stream`] of its steps.
    ///
    /// Created by [`ByteSeqExt::into_steps`](super::ByteSeqExt::into_steps).
    /// The producer only runs while the stream is polled: every poll resumes it
    /// until it hands over its next step, so at most one step is ever produced
    /// ahead of the consumer.
    ///
    /// The stream ends once the producer returns, or right after the first
    /// error step. Use [`Steps::stop`] to end the sequence early: it lets the
    /// producer observe the refusal and run its own cleanup to completion.
    /// Dropping an unfinished [`Steps`] cancels the producer instead.
    #[must_use = "streams do nothing unless polled"]
    pub struct Steps<F> {
        #[pin]
        producer: Option<F>,
        handoff: Arc<Handoff>,
        active: ActiveFlag,
        failed: bool,
    }
}

fn parts<S: ByteSeq>(
    seq: S,
) -> (
    impl Future<Output = ()> + Send + 'static,
    Arc<Handoff>,
    ActiveFlag,
) {
    let handoff = Arc::new(Handoff::default());
    let active = ActiveFlag::new();
    let producer = seq.drive(Yielder::new(handoff.clone(), active.clone()));
    (producer, handoff, active)
}

pub(super) fn launch<S: ByteSeq>(seq: S) -> Steps<impl Future<Output = ()> + Send + 'static> {
    let (producer, handoff, active) = parts(seq);
    Steps::from_parts(producer, handoff, active)
}

pub(super) fn launch_boxed<S: ByteSeq>(seq: S) -> BoxSteps {
    let (producer, handoff, active) = parts(seq);
    let producer: Pin<Box<dyn Future<Output = ()> + Send>> = Box::pin(producer);
    Steps::from_parts(producer, handoff, active)
}

impl<F> Steps<F> {
    fn from_parts(producer: F, handoff: Arc<Handoff>, active: ActiveFlag) -> Self {
        Self {
            producer: Some(producer),
            handoff,
            active,
            failed: false,
        }
    }

    /// Returns true as long as the consumer did not stop the sequence.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.is_active()
    }

    /// Returns true once the producer returned.
    #[must_use]
    pub fn is_terminated(&self) -> bool {
        self.producer.is_none()
    }
}

impl<F: Future<Output = ()>> Steps<F> {
    /// Refuse any further steps and resume the producer until it returned.
    ///
    /// Calling it again, or on a finished sequence, is a no-op.
    pub fn poll_stop(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        let mut this = self.project();

        if this.active.deactivate() && this.producer.is_some() {
            tracing::trace!("sequence stopped by its consumer: resume producer for cleanup");
        }

        if let Some(producer) = this.producer.as_mut().as_pin_mut() {
            ready!(producer.poll(cx));
            this.producer.set(None);
        }

        if this.handoff.take().is_some() {
            tracing::trace!("discard sequence step handed over after stop");
        }

        Poll::Ready(())
    }

    /// Refuse any further steps and let the producer run to completion.
    ///
    /// See [`Steps::poll_stop`].
    pub async fn stop(mut self: Pin<&mut Self>) {
        poll_fn(|cx| self.as_mut().poll_stop(cx)).await
    }
}

impl<F: Future<Output = ()>> Stream for Steps<F> {
    type Item = Step;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        if *this.failed {
            return Poll::Ready(None);
        }

        let Some(producer) = this.producer.as_mut().as_pin_mut() else {
            return Poll::Ready(None);
        };

        let returned = producer.poll(cx).is_ready();
        if returned {
            this.producer.set(None);
        }

        match this.handoff.take() {
            Some(step) => {
                *this.failed = step.is_err();
                Poll::Ready(Some(step))
            }
            None if returned => Poll::Ready(None),
            None => Poll::Pending,
        }
    }
}

impl<F> fmt::Debug for Steps<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Steps")
            .field("active", &self.active)
            .field("terminated", &self.producer.is_none())
            .field("failed", &self.failed)
            .finish()
    }
}
