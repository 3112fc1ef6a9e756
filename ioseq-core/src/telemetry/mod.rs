//! Telemetry modules for ioseq.
//!
//! The adapters only emit `trace` and `debug` events, and only at the edges of a
//! sequence's lifetime (start, early stop, suppressed or surfaced failures),
//! never per byte.

pub mod tracing;
