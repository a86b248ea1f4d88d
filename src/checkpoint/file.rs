//! # File Checkpoint Store
//!
//! Line-delimited text file, one decimal prime per line, ascending across all
//! runs. Reading the last record only looks at a window at the end of the
//! file, doubling it until a complete line is found, so resuming does not
//! depend on how many primes have been stored.

use std::io::{ErrorKind, SeekFrom};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt, BufWriter};
use tracing::{debug, info};

use super::CheckpointStore;
use crate::constants::DEFAULT_TAIL_WINDOW;
use crate::error::{PrimeScanError, Result};

#[derive(Debug, Clone)]
pub struct FileCheckpointStore {
    path: PathBuf,
    tail_window: u64,
}

/// Outcome of looking for the last record inside a tail window.
#[derive(Debug, PartialEq, Eq)]
enum TailScan<'a> {
    Found(&'a [u8]),
    /// The last record has no terminating newline; an append was torn.
    Unterminated(&'a [u8]),
    /// The window may begin mid-record; a larger window is needed.
    Incomplete,
    /// The whole file was examined and holds no records.
    Empty,
}

impl FileCheckpointStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self::with_tail_window(path, DEFAULT_TAIL_WINDOW)
    }

    pub fn with_tail_window<P: Into<PathBuf>>(path: P, tail_window: u64) -> Self {
        Self {
            path: path.into(),
            tail_window: tail_window.max(1),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_error(&self, error: std::io::Error) -> PrimeScanError {
        PrimeScanError::checkpoint_read(self.location(), error)
    }

    async fn read_window(&self, file: &mut File, size: u64, window: u64) -> Result<Vec<u8>> {
        file.seek(SeekFrom::Start(size - window))
            .await
            .map_err(|e| self.read_error(e))?;
        let len = usize::try_from(window).map_err(|e| {
            PrimeScanError::checkpoint_read(self.location(), format!("tail window too large: {e}"))
        })?;
        let mut buf = vec![0u8; len];
        file.read_exact(&mut buf)
            .await
            .map_err(|e| self.read_error(e))?;
        Ok(buf)
    }

    fn parse_record(&self, record: &[u8]) -> Result<u64> {
        std::str::from_utf8(record)
            .ok()
            .and_then(|text| text.trim().parse::<u64>().ok())
            .ok_or_else(|| {
                PrimeScanError::checkpoint_corrupt(
                    self.location(),
                    String::from_utf8_lossy(record).trim().to_string(),
                )
            })
    }

    /// Whether a non-empty file ends partway through a record. Spaces and
    /// tabs after the final newline are padding, not a record.
    async fn has_unterminated_tail(&self, size: u64) -> std::io::Result<bool> {
        if size == 0 {
            return Ok(false);
        }
        let mut file = File::open(&self.path).await?;
        file.seek(SeekFrom::Start(size - 1)).await?;
        let mut last = [0u8; 1];
        file.read_exact(&mut last).await?;
        Ok(!matches!(last[0], b'\n' | b' ' | b'\t'))
    }
}

/// Find the last non-blank line in `buf`. When `from_file_start` is false the
/// first line of the buffer may be a fragment and is not trusted. Every
/// record is written with a trailing newline, so a non-blank final line
/// without one is the remains of an interrupted append.
fn scan_tail(buf: &[u8], from_file_start: bool) -> TailScan<'_> {
    let lines: Vec<&[u8]> = buf.split(|&b| b == b'\n').collect();
    let last = lines.len() - 1;
    for (position, line) in lines.iter().enumerate().rev() {
        if line.iter().all(u8::is_ascii_whitespace) {
            continue;
        }
        if position == last {
            return TailScan::Unterminated(line);
        }
        if position == 0 && !from_file_start {
            return TailScan::Incomplete;
        }
        return TailScan::Found(line);
    }
    if from_file_start {
        TailScan::Empty
    } else {
        TailScan::Incomplete
    }
}

#[async_trait]
impl CheckpointStore for FileCheckpointStore {
    async fn read_last(&self) -> Result<Option<u64>> {
        let mut file = match File::open(&self.path).await {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No checkpoint file, starting fresh");
                return Ok(None);
            }
            Err(e) => return Err(self.read_error(e)),
        };

        let size = file
            .metadata()
            .await
            .map_err(|e| self.read_error(e))?
            .len();
        let mut window = self.tail_window.min(size);

        loop {
            let buf = self.read_window(&mut file, size, window).await?;
            match scan_tail(&buf, window == size) {
                TailScan::Found(record) => return self.parse_record(record).map(Some),
                TailScan::Unterminated(record) => {
                    return Err(PrimeScanError::checkpoint_corrupt(
                        self.location(),
                        String::from_utf8_lossy(record).trim().to_string(),
                    ));
                }
                TailScan::Empty => return Ok(None),
                TailScan::Incomplete => {
                    window = window.saturating_mul(2).min(size);
                    debug!(window, size, "Checkpoint tail window grown");
                }
            }
        }
    }

    async fn append_all(&self, values: &[u64]) -> Result<()> {
        if values.is_empty() {
            return Ok(());
        }
        let write_error =
            |e: std::io::Error| PrimeScanError::checkpoint_write(self.location(), e, values.len());

        let size = match tokio::fs::metadata(&self.path).await {
            Ok(meta) => meta.len(),
            Err(e) if e.kind() == ErrorKind::NotFound => 0,
            Err(e) => return Err(write_error(e)),
        };

        if self.has_unterminated_tail(size).await.map_err(write_error)? {
            return Err(write_error(std::io::Error::new(
                ErrorKind::InvalidData,
                "existing file ends with an unterminated record",
            )));
        }

        let mut payload = String::with_capacity(values.len() * 21);
        for value in values {
            payload.push_str(&value.to_string());
            payload.push('\n');
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(write_error)?;
        let mut writer = BufWriter::new(file);
        writer
            .write_all(payload.as_bytes())
            .await
            .map_err(write_error)?;
        writer.flush().await.map_err(write_error)?;
        writer.get_ref().sync_all().await.map_err(write_error)?;

        info!(
            path = %self.path.display(),
            appended = values.len(),
            "Checkpoint advanced"
        );
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_tail_skips_trailing_blank_lines() {
        assert_eq!(
            scan_tail(b"2\n3\n5\n\n  \n", true),
            TailScan::Found(b"5".as_slice())
        );
    }

    #[test]
    fn test_scan_tail_distrusts_leading_fragment() {
        assert_eq!(scan_tail(b"\n9997\n", false), TailScan::Found(b"9997".as_slice()));
        assert_eq!(scan_tail(b"9997\n", false), TailScan::Incomplete);
        assert_eq!(scan_tail(b"997\n\n", false), TailScan::Incomplete);
    }

    #[test]
    fn test_scan_tail_flags_unterminated_record() {
        assert_eq!(
            scan_tail(b"89\n97\n10", false),
            TailScan::Unterminated(b"10".as_slice())
        );
        assert_eq!(scan_tail(b"997", true), TailScan::Unterminated(b"997".as_slice()));
        // Trailing whitespace after the last newline is not a record.
        assert_eq!(scan_tail(b"\n97\n  ", false), TailScan::Found(b"97".as_slice()));
    }

    #[test]
    fn test_scan_tail_blank_file() {
        assert_eq!(scan_tail(b"", true), TailScan::Empty);
        assert_eq!(scan_tail(b"\n\n", true), TailScan::Empty);
        assert_eq!(scan_tail(b"\n\n", false), TailScan::Incomplete);
    }

    #[test]
    fn test_parse_record_trims_carriage_return() {
        let store = FileCheckpointStore::new("primes.csv");
        assert_eq!(store.parse_record(b"97\r").unwrap(), 97);
        assert!(matches!(
            store.parse_record(b"-3"),
            Err(PrimeScanError::CheckpointCorrupt { .. })
        ));
    }
}
