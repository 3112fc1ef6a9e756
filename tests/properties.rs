use std::io::Cursor;

use ioseq::bytes::Bytes;
use ioseq::futures::StreamExt as _;
use ioseq::seq::{self, ByteSeq, ByteSeqExt as _, WriteTo as _};
use quickcheck::{Arbitrary, Gen};
use quickcheck_macros::quickcheck;
use tokio::io::AsyncReadExt as _;

/// Chunks of arbitrary sizes, including empty ones.
#[derive(Clone, Debug)]
struct Chunks(Vec<Vec<u8>>);

impl Chunks {
    fn concat(&self) -> Vec<u8> {
        self.0.concat()
    }
}

impl Arbitrary for Chunks {
    fn arbitrary(g: &mut Gen) -> Self {
        Self(Vec::arbitrary(g))
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        Box::new(self.0.shrink().map(Self))
    }
}

async fn read_in_steps_of<S: ByteSeq>(seq: S, step: usize) -> Vec<u8> {
    let mut reader = seq.into_reader();
    let mut output = Vec::new();
    let mut buf = vec![0u8; step];
    loop {
        let n = reader.read(&mut buf).await.unwrap();
        if n == 0 {
            break;
        }
        output.extend_from_slice(&buf[..n]);
    }
    reader.close().await;
    output
}

#[quickcheck]
fn incremental_reads_equal_bulk_copy(chunks: Chunks, read_size: u8) -> bool {
    let expected = chunks.concat();
    let read_size = usize::from(read_size).max(1);

    tokio_test::block_on(async move {
        let incremental = read_in_steps_of(seq::seq_from_chunks(chunks.0.clone()), read_size).await;

        let mut bulk = Vec::new();
        let mut reader = seq::seq_from_chunks(chunks.0).into_reader();
        let n = reader.write_to(&mut bulk).await.unwrap();

        incremental == expected && bulk == expected && n == expected.len() as u64
    })
}

#[quickcheck]
fn both_source_adapters_preserve_the_bytes(data: Vec<u8>, buffer_size: u8) -> bool {
    let buffer_size = usize::from(buffer_size);

    tokio_test::block_on(async move {
        let buffered: Vec<Bytes> = seq::seq_from_reader(Cursor::new(data.clone()), buffer_size)
            .into_steps()
            .map(|step| step.unwrap())
            .collect()
            .await;
        let chunks_bounded = buffered
            .iter()
            .all(|chunk| !chunk.is_empty() && chunk.len() <= buffer_size.max(1));

        let mut direct = Vec::new();
        seq::seq_from_write_to(Bytes::from(data.clone()))
            .copy_to(&mut direct)
            .await
            .unwrap();

        chunks_bounded && buffered.concat() == data && direct == data
    })
}

#[quickcheck]
fn identity_pipe_preserves_the_bytes(data: Vec<u8>, buffer_size: u8) -> bool {
    tokio_test::block_on(async move {
        let mut reader = seq::pipe_through(
            Cursor::new(data.clone()),
            |writer| writer,
            usize::from(buffer_size),
        );

        let mut output = Vec::new();
        reader.read_to_end(&mut output).await.unwrap();
        reader.close().await;

        output == data
    })
}

#[quickcheck]
fn write_to_source_reads_back_the_bytes(data: Vec<u8>, read_size: u8) -> bool {
    let read_size = usize::from(read_size).max(1);

    tokio_test::block_on(async move {
        let seq = seq::seq_from_write_to(Bytes::from(data.clone()));
        read_in_steps_of(seq, read_size).await == data
    })
}
