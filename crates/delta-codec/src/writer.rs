use crate::error::CodecError;
use delta_model::FieldSet;
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Writes records as newline-delimited JSON, honoring backpressure (spec
/// §4.6): records are handed to a bounded channel whose capacity is the
/// write-ahead buffer; once it is full, `write_record` simply doesn't
/// return until the background drain makes room, the async equivalent of
/// waiting for a stream's "drain" event before writing more.
pub struct NdjsonWriter<W> {
    tx: Option<mpsc::Sender<FieldSet>>,
    task: JoinHandle<Result<(W, usize), CodecError>>,
}

impl<W> NdjsonWriter<W>
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    pub fn spawn(writer: W, buffer: usize) -> Self {
        let (tx, mut rx) = mpsc::channel(buffer.max(1));
        let task = tokio::spawn(async move {
            let mut inner = BufWriter::new(writer);
            let mut written = 0usize;
            while let Some(record) = rx.recv().await {
                // Empty validationMessages are already omitted by FieldSet's
                // Serialize impl (spec §6), so no extra pruning needed here.
                let mut line = serde_json::to_vec(&record)?;
                line.push(b'\n');
                inner.write_all(&line).await?;
                written += 1;
            }
            inner.flush().await?;
            let writer = inner.into_inner();
            Ok((writer, written))
        });
        NdjsonWriter {
            tx: Some(tx),
            task,
        }
    }

    /// Awaits channel capacity before returning, which is this writer's
    /// backpressure mechanism.
    pub async fn write_record(&self, record: FieldSet) -> Result<(), CodecError> {
        let tx = self.tx.as_ref().ok_or(CodecError::Closed)?;
        tx.send(record).await.map_err(|_| CodecError::Closed)
    }

    /// Closes the input side and waits for the background writer to drain
    /// and flush, handing back the underlying writer along with the number
    /// of records written (callers writing to an in-memory sink need the
    /// buffer back; callers writing to a socket or file can just drop it).
    pub async fn finish(mut self) -> Result<(W, usize), CodecError> {
        self.tx.take();
        match self.task.await {
            Ok(result) => result,
            Err(_) => Err(CodecError::Closed),
        }
    }
}
