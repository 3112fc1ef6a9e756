//! Tracing core re-export, for your convenience

#[doc(inline)]
pub use ::tracing::*;
