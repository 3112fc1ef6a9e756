//! Error types and utilities, re-exported from `ioseq-error`.
//!
//! See [`ioseq_error`] for more information.

#[doc(inline)]
pub use ::ioseq_error::*;
