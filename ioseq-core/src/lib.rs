//! Core of ioseq: pull sequences of byte chunks and the adapters between
//! them and push-style I/O.
//!
//! A [`ByteSeq`](seq::ByteSeq) is a lazily driven producer of byte chunks,
//! ending either cleanly or with a single terminal error. Most bulk-transfer
//! and encoding algorithms are however written against a sink they push into
//! ([`AsyncWrite`](tokio::io::AsyncWrite)), while their consumers want to pull
//! ([`AsyncRead`](tokio::io::AsyncRead) or [`Stream`](futures::Stream)).
//! The [`seq`] module bridges both worlds on a single logical thread of control,
//! without spawning tasks and without an intermediate pipe:
//!
//! - [`seq_from_reader`](seq::seq_from_reader) and [`seq_from_write_to`](seq::seq_from_write_to)
//!   turn a demand-driven byte source into a sequence;
//! - [`StreamReader`](seq::StreamReader) turns a sequence back into a demand-driven source;
//! - [`SeqWriter`](seq::SeqWriter) lets a write algorithm produce the chunks of a sequence;
//! - [`pipe_seq_through`](seq::pipe_seq_through) and [`pipe_through`](seq::pipe_through) compose
//!   a write algorithm (e.g. an encoder) with a sequence or reader.
//!
//! # Example
//!
//! ```
//! use ioseq_core::seq::{self, ByteSeqExt as _};
//! use tokio::io::AsyncReadExt as _;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let hello = seq::seq_fn(async move |mut yielder: seq::Yielder| {
//!     for chunk in ["hello", ", ", "world"] {
//!         if yielder.yield_chunk(chunk).await.is_break() {
//!             return;
//!         }
//!     }
//! });
//!
//! let mut reader = hello.into_reader();
//! let mut output = String::new();
//! reader.read_to_string(&mut output).await.unwrap();
//! reader.close().await;
//!
//! assert_eq!(output, "hello, world");
//! # }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod error;
pub mod seq;
pub mod telemetry;

#[doc(inline)]
pub use ::bytes;

#[doc(inline)]
pub use ::futures;
