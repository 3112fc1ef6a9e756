//! Error types for ioseq.
//!
//! Failures travel through a sequence as a [`BoxError`]: the terminal step
//! of a [`ByteSeq`](crate::seq::ByteSeq) carries whatever error its source
//! or transform produced, only annotated with [`ContextError`] when a transform
//! fails to close. A [`StreamReader`](crate::seq::StreamReader)
//! keeps that error as a [`SharedError`], so every read that follows the
//! failure can report it again.
//!
//! Use [`ErrorExt`] and [`ErrorContext`] to add context or to inspect the cause
//! of such an error, and [`chain`] or [`find_source`] to do the same on a trait object.

#[doc(inline)]
pub use ::ioseq_error::*;
