//! Pull sequences of byte chunks and their adapters.
//!
//! See [`ioseq_core::seq`] for an overview.

#[doc(inline)]
pub use ::ioseq_core::seq::*;
