use crate::error::CodecError;
use bytelines::AsyncByteLines;
use delta_model::FieldSet;
use tokio::io::AsyncBufRead;

/// Reads records one per non-empty line of newline-delimited JSON. Peak
/// memory is O(1 + largest record): only one line is ever buffered.
///
/// A malformed line fails the whole read (spec §4.6): once `next_record`
/// returns an error, every subsequent call returns `Ok(None)` rather than
/// attempting to resynchronize on the next line.
pub struct NdjsonReader<R: AsyncBufRead + Unpin> {
    lines: AsyncByteLines<R>,
    halted: bool,
}

impl<R: AsyncBufRead + Unpin> NdjsonReader<R> {
    pub fn new(reader: R) -> Self {
        NdjsonReader {
            lines: AsyncByteLines::new(reader),
            halted: false,
        }
    }

    pub async fn next_record(&mut self) -> Result<Option<FieldSet>, CodecError> {
        if self.halted {
            return Ok(None);
        }
        loop {
            let line = match self.lines.next().await {
                Ok(Some(line)) => line,
                Ok(None) => return Ok(None),
                Err(e) => {
                    self.halted = true;
                    return Err(CodecError::Io(e));
                }
            };
            if line.is_empty() {
                continue;
            }
            return match serde_json::from_slice::<FieldSet>(line) {
                Ok(record) => Ok(Some(record)),
                Err(source) => {
                    self.halted = true;
                    let prefix_len = line.len().min(80);
                    let prefix = String::from_utf8_lossy(&line[..prefix_len]).into_owned();
                    Err(CodecError::Parse { prefix, source })
                }
            };
        }
    }

    /// Convenience for callers (mostly tests) who want the whole dataset;
    /// production code paths should prefer `next_record` to stay O(1).
    pub async fn read_all(&mut self) -> Result<Vec<FieldSet>, CodecError> {
        let mut out = Vec::new();
        while let Some(record) = self.next_record().await? {
            out.push(record);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use delta_model::Field;
    use std::io::Cursor;

    fn record(id: i64) -> FieldSet {
        FieldSet::new(vec![Field::new("id", id)])
    }

    #[tokio::test]
    async fn reads_one_record_per_line() {
        let input = format!(
            "{}\n{}\n",
            serde_json::to_string(&record(1)).unwrap(),
            serde_json::to_string(&record(2)).unwrap()
        );
        let mut reader = NdjsonReader::new(Cursor::new(input));
        let all = reader.read_all().await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn blank_lines_are_skipped() {
        let input = format!("\n{}\n\n", serde_json::to_string(&record(1)).unwrap());
        let mut reader = NdjsonReader::new(Cursor::new(input));
        let all = reader.read_all().await.unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn malformed_line_fails_the_whole_read() {
        let input = format!("{}\nnot json\n", serde_json::to_string(&record(1)).unwrap());
        let mut reader = NdjsonReader::new(Cursor::new(input));
        assert!(reader.next_record().await.unwrap().is_some());
        assert!(matches!(
            reader.next_record().await,
            Err(CodecError::Parse { .. })
        ));
        // Once halted, further calls report end-of-stream rather than re-erroring.
        assert!(reader.next_record().await.unwrap().is_none());
    }
}
