use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_compression::tokio::write::{GzipDecoder, GzipEncoder};
use ioseq::bytes::Bytes;
use ioseq::error::{BoxError, ErrorExt as _};
use ioseq::seq::{
    self, ByteSeqExt as _, SeqWriter, WriteTo as _, Yielder, is_sequence_terminated,
};
use parking_lot::Mutex;
use tokio::io::{AsyncReadExt as _, AsyncWriteExt as _};

mod utils;
use utils::Base64Encoder;

const HELLO: &[u8] = b"hello, world\n";
const HELLO_BASE64: &str = "aGVsbG8sIHdvcmxkCg==";

#[tokio::test]
async fn base64_encode_sequence() {
    for chunks in [vec!["hello, world\n"], vec!["hel", "lo, w", "", "orld\n"]] {
        let mut reader = seq::seq_from_chunks(chunks)
            .pipe_through(Base64Encoder::new)
            .into_reader();

        let mut output = String::new();
        reader.read_to_string(&mut output).await.unwrap();
        reader.close().await;

        assert_eq!(output, HELLO_BASE64);
    }
}

#[tokio::test]
async fn base64_encode_reader() {
    for buffer_size in [1, 2, 3, 5, 64] {
        let mut reader = seq::pipe_through(HELLO, Base64Encoder::new, buffer_size);

        let mut output = String::new();
        reader.read_to_string(&mut output).await.unwrap();
        reader.close().await;

        assert_eq!(output, HELLO_BASE64, "buffer size {buffer_size}");
    }
}

#[tokio::test]
async fn base64_encode_bulk_copy() {
    let mut reader = seq::pipe_through(HELLO, Base64Encoder::new, 4);

    let mut output = Vec::new();
    let n = reader.write_to(&mut output).await.unwrap();
    assert_eq!(n, HELLO_BASE64.len() as u64);
    assert_eq!(output, HELLO_BASE64.as_bytes());

    let mut rest = Vec::new();
    assert_eq!(reader.read_to_end(&mut rest).await.unwrap(), 0);
    reader.close().await;
}

#[tokio::test]
async fn gzip_round_trip() {
    let data: Vec<u8> = (0..64 * 1024u32)
        .flat_map(|i| (i % 251).to_le_bytes())
        .collect();

    let compressed = seq::pipe_through(std::io::Cursor::new(data.clone()), GzipEncoder::new, 1000);
    let mut decompressed = seq::pipe_through(compressed, GzipDecoder::new, 333);

    let mut output = Vec::new();
    decompressed.read_to_end(&mut output).await.unwrap();
    decompressed.close().await;

    assert_eq!(output.len(), data.len());
    assert!(output == data);
}

#[tokio::test]
async fn gzip_decoder_reports_corrupt_input() {
    let garbage = Bytes::from_static(b"this is not gzip at all");
    let mut reader = seq::seq_from_write_to(garbage)
        .pipe_through(GzipDecoder::new)
        .into_reader();

    let mut output = Vec::new();
    let err = reader.read_to_end(&mut output).await.unwrap_err();
    assert!(!is_sequence_terminated(&err));

    let again = reader.read(&mut [0u8; 8]).await.unwrap_err();
    assert_eq!(again.kind(), err.kind());
    assert_eq!(again.to_string(), err.to_string());
    reader.close().await;
}

#[tokio::test]
async fn reader_failure_keeps_its_kind_under_context() {
    let mut reader = seq::seq_fn(async move |mut yielder: Yielder| {
        if yielder.yield_chunk("partial").await.is_continue() {
            let _ = yielder
                .yield_error(std::io::Error::new(
                    std::io::ErrorKind::ConnectionReset,
                    "peer reset",
                ))
                .await;
        }
    })
    .into_reader();

    let mut output = Vec::new();
    let err = reader.read_to_end(&mut output).await.unwrap_err();
    assert_eq!(err.kind(), std::io::ErrorKind::ConnectionReset);
    reader.close().await;

    let err = err.context("read upload");
    assert_eq!(err.to_string(), "read upload: peer reset");
    assert_eq!(err.root_cause().to_string(), "peer reset");
    assert!(!is_sequence_terminated(&err));
}

#[tokio::test]
async fn early_close_is_not_an_error_for_either_side() {
    let outcome: Arc<Mutex<Option<Result<(), String>>>> = Arc::default();
    let writes = Arc::new(AtomicUsize::new(0));

    let mut reader = {
        let outcome = outcome.clone();
        let writes = writes.clone();
        seq::reader_with_content(async move |mut writer: SeqWriter| {
            let result: std::io::Result<()> = loop {
                if let Err(err) = writer.write_all(b"hello world").await {
                    break Err(err);
                }
                writes.fetch_add(1, Ordering::SeqCst);
            };
            let observed = result.as_ref().map(|_| ()).map_err(|err| {
                assert!(is_sequence_terminated(err));
                err.to_string()
            });
            *outcome.lock() = Some(observed);
            result.map_err(BoxError::from)
        })
    };

    let mut buf = [0u8; 5];
    reader.read_exact(&mut buf).await.unwrap();
    assert_eq!(&buf, b"hello");
    assert!(outcome.lock().is_none());

    reader.close().await;
    assert_eq!(writes.load(Ordering::SeqCst), 0);
    assert_eq!(
        outcome.lock().take(),
        Some(Err("sequence terminated".to_owned()))
    );

    // the generator error is swallowed: the reader just ends
    assert_eq!(reader.read(&mut buf).await.unwrap(), 0);
}

#[tokio::test]
async fn stop_after_first_chunk_reports_no_error() {
    let cleanups = Arc::new(AtomicUsize::new(0));
    let input = {
        let cleanups = cleanups.clone();
        seq::seq_fn(async move |mut yielder: Yielder| {
            while yielder.yield_chunk("abc").await.is_continue() {}
            cleanups.fetch_add(1, Ordering::SeqCst);
        })
    };

    let mut reader = input.pipe_through(Base64Encoder::new).into_reader();
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf).await.unwrap();
    assert_eq!(&buf, b"YWJj");
    reader.close().await;

    assert_eq!(cleanups.load(Ordering::SeqCst), 1);
    assert_eq!(reader.read(&mut buf).await.unwrap(), 0);
}

#[tokio::test]
async fn subscriber_sees_lifecycle_events() {
    use ioseq::telemetry::tracing::subscriber::{self, util::SubscriberInitExt as _};

    let _guard = subscriber::fmt()
        .with_env_filter("ioseq_core=trace")
        .with_test_writer()
        .finish()
        .set_default();

    let mut reader = seq::pipe_through(HELLO, Base64Encoder::new, 8);
    let mut output = String::new();
    reader.read_to_string(&mut output).await.unwrap();
    reader.close().await;

    assert_eq!(output, HELLO_BASE64);
}
