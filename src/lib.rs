//! Pull sequences of byte chunks, and the push/pull adapters around them.
//!
//! Many byte transforms (encoders, compressors, serializers) are written
//! against a sink they push their output into, while the code consuming that
//! output would rather pull it, one buffer at a time. ioseq bridges the two
//! without spawning a task and without an intermediate pipe: the pushing side
//! runs as a lazily driven producer, suspended between the chunks it emits.
//!
//! The building blocks live in [`seq`]:
//!
//! - a [`ByteSeq`](seq::ByteSeq) is a pull sequence of byte chunks,
//!   ending cleanly or with a single terminal error;
//! - [`seq_from_reader`](seq::seq_from_reader) and [`seq_from_write_to`](seq::seq_from_write_to)
//!   turn a byte source into a sequence;
//! - [`StreamReader`](seq::StreamReader) reads a sequence through tokio's `AsyncRead`;
//! - [`SeqWriter`](seq::SeqWriter) is the `AsyncWrite` sink a producer
//!   writes its chunks into;
//! - [`pipe_through`](seq::pipe_through) transforms a reader through any write transform.
//!
//! # Example
//!
//! Gzip compress a reader, pulling the compressed bytes on demand:
//!
//! ```
//! use async_compression::tokio::write::GzipEncoder;
//! use ioseq::seq;
//! use tokio::io::AsyncReadExt as _;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let input = &b"hello, world\n"[..];
//! let mut compressed = seq::pipe_through(input, GzipEncoder::new, seq::DEFAULT_BUFFER_SIZE);
//!
//! let mut output = Vec::new();
//! compressed.read_to_end(&mut output).await.unwrap();
//! compressed.close().await;
//!
//! assert_eq!(&output[..2], &[0x1f, 0x8b]);
//! # }
//! ```
//!
//! # Telemetry
//!
//! ioseq emits [`tracing`](telemetry::tracing) events at the edges of a
//! sequence's life (start, exhaustion, failure, stop, cancellation), all at
//! `trace` or `debug` level. Install a subscriber, e.g. via
//! [`telemetry::tracing::subscriber`], to see them.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod error;

pub mod seq;

pub mod telemetry;

#[doc(inline)]
pub use ::ioseq_core::bytes;

#[doc(inline)]
pub use ::ioseq_core::futures;
