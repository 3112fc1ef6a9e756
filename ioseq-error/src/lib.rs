//! Error types and utilities for ioseq.
//!
//! The [`BoxError`] type is a type-erased error type that can be used to represent any error that
//! implements the `std::error::Error` trait. Every fallible operation of a byte sequence, as well
//! as the terminal error step of a sequence itself, is expressed in terms of it: it is usually not
//! that important what specific error type is returned, but rather that (and where) an error occurred.
//!
//! Use [`ErrorContext`] to annotate a failure with what was being done when it happened,
//! [`ErrorExt`] (or [`chain`] for trait objects) to look through the sources of an error,
//! and [`SharedError`] when the same terminal failure has to be reported more than once.

use std::error::Error as StdError;

/// Alias for a type-erased error type.
pub type BoxError = Box<dyn StdError + Send + Sync>;

mod chain;
pub use chain::{Chain, chain, find_source};

mod context;
pub use context::{ContextError, ErrorContext, ErrorExt};

mod shared;
pub use shared::SharedError;
