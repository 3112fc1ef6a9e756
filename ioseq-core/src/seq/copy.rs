use std::pin::pin;

use tokio::io::{AsyncWrite, AsyncWriteExt};

use super::{ByteSeq, steps};
use crate::error::BoxError;
use crate::futures::StreamExt;
use crate::telemetry::tracing;

/// Drive `seq` to completion, writing every chunk in full into `writer`.
///
/// Returns the number of bytes written. The first error, be it a failure
/// step of the sequence or a failed write, stops the sequence and is returned
/// as is: the producer is resumed one last time to run its cleanup before this
/// function returns. `writer` is neither flushed nor shut down.
pub async fn copy_seq<S, W>(seq: S, writer: &mut W) -> Result<u64, BoxError>
where
    S: ByteSeq,
    W: AsyncWrite + Unpin + ?Sized,
{
    let mut steps = pin!(steps::launch(seq));
    let mut written: u64 = 0;

    while let Some(step) = steps.next().await {
        let result = match step {
            Ok(chunk) => writer
                .write_all(&chunk)
                .await
                .map(|()| chunk.len() as u64)
                .map_err(BoxError::from),
            Err(err) => Err(err),
        };

        match result {
            Ok(n) => written += n,
            Err(err) => {
                tracing::debug!(written, "copy of byte sequence failed: {err}");
                steps.as_mut().stop().await;
                return Err(err);
            }
        }
    }

    tracing::trace!(written, "copied byte sequence");
    Ok(written)
}
