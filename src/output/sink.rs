//! Output destinations for generated candidates

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ForgeError, Result};
use crate::types::ForgeConfig;

/// Where a job sends its output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Destination {
    /// Keep the list in memory, bounded by `ForgeConfig::memory_limit`
    Memory,
    /// Stream the list into a file, one word per line
    File(PathBuf),
}

impl Destination {
    pub fn is_memory(&self) -> bool {
        matches!(self, Destination::Memory)
    }
}

/// What a sink leaves behind once closed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkOutput {
    Words(Vec<String>),
    File { path: PathBuf, lines: u64 },
    /// Partial in-memory output dropped after cancellation or failure
    Discarded,
}

/// Bounded in-memory ordered sequence
#[derive(Debug, Clone)]
pub struct MemorySink {
    words: Vec<String>,
    limit: u64,
}

impl MemorySink {
    pub fn new(limit: u64) -> Self {
        Self {
            words: Vec::new(),
            limit,
        }
    }

    pub fn push(&mut self, word: &str) -> Result<()> {
        let len = self.words.len() as u64;
        if len >= self.limit {
            return Err(ForgeError::capacity_exceeded(len as u128 + 1, self.limit));
        }
        self.words.push(word.to_string());
        Ok(())
    }

    pub fn written(&self) -> u64 {
        self.words.len() as u64
    }

    pub fn into_words(self) -> Vec<String> {
        self.words
    }
}

/// Buffered file writer that flushes every `flush_interval` lines.
///
/// `written` counts lines handed to the buffer; `flushed` counts lines known
/// to have reached the file.
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
    writer: BufWriter<File>,
    written: u64,
    flushed: u64,
    flush_interval: u64,
}

impl FileSink {
    /// Create (or truncate) the target file
    pub fn create(path: &Path, flush_interval: u64) -> Result<Self> {
        let file = File::create(path).map_err(|e| io_error(e, path))?;
        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
            written: 0,
            flushed: 0,
            flush_interval: flush_interval.max(1),
        })
    }

    pub fn push(&mut self, word: &str) -> Result<()> {
        debug_assert!(!word.contains('\n'), "line separator inside a candidate");
        writeln!(self.writer, "{}", word).map_err(|e| io_error(e, &self.path))?;
        self.written += 1;
        if self.written - self.flushed >= self.flush_interval {
            self.flush()?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush().map_err(|e| io_error(e, &self.path))?;
        self.flushed = self.written;
        tracing::debug!(
            path = %self.path.display(),
            written = self.written,
            "Flushed wordlist file"
        );
        Ok(())
    }

    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn flushed(&self) -> u64 {
        self.flushed
    }
}

/// Either a bounded in-memory list or a flushing file writer
#[derive(Debug)]
pub enum StreamingSink {
    Memory(MemorySink),
    File(FileSink),
}

impl StreamingSink {
    /// Open the sink for a destination
    pub fn open(destination: &Destination, config: &ForgeConfig) -> Result<Self> {
        match destination {
            Destination::Memory => Ok(StreamingSink::Memory(MemorySink::new(config.memory_limit))),
            Destination::File(path) => Ok(StreamingSink::File(FileSink::create(path, config.flush_interval)?)),
        }
    }

    pub fn push(&mut self, word: &str) -> Result<()> {
        match self {
            StreamingSink::Memory(sink) => sink.push(word),
            StreamingSink::File(sink) => sink.push(word),
        }
    }

    pub fn written(&self) -> u64 {
        match self {
            StreamingSink::Memory(sink) => sink.written(),
            StreamingSink::File(sink) => sink.written(),
        }
    }

    /// Push buffered lines to the file; a no-op in memory
    pub fn flush(&mut self) -> Result<()> {
        match self {
            StreamingSink::Memory(_) => Ok(()),
            StreamingSink::File(sink) => sink.flush(),
        }
    }

    /// Flush and hand back the complete output
    pub fn finish(mut self) -> Result<SinkOutput> {
        self.flush()?;
        Ok(self.into_output())
    }

    /// Close after cancellation or failure.
    ///
    /// In-memory output is dropped. A file keeps the lines that reached it;
    /// a flush error at this point is only logged since the job already has
    /// a terminal state.
    pub fn abandon(self) -> SinkOutput {
        match self {
            StreamingSink::Memory(_) => SinkOutput::Discarded,
            StreamingSink::File(mut sink) => {
                if let Err(e) = sink.flush() {
                    tracing::warn!(path = %sink.path.display(), error = %e, "Final flush failed");
                }
                StreamingSink::File(sink).into_output()
            }
        }
    }

    /// Output as it stands, counting only flushed file lines
    pub fn into_output(self) -> SinkOutput {
        match self {
            StreamingSink::Memory(sink) => SinkOutput::Words(sink.into_words()),
            StreamingSink::File(sink) => SinkOutput::File {
                lines: sink.flushed,
                path: sink.path,
            },
        }
    }
}

fn io_error(err: std::io::Error, path: &Path) -> ForgeError {
    ForgeError::io(err.to_string(), Some(path.display().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_limit() {
        let mut sink = MemorySink::new(2);
        sink.push("a").unwrap();
        sink.push("b").unwrap();
        let err = sink.push("c").unwrap_err();
        assert_eq!(err, ForgeError::capacity_exceeded(3, 2));
        assert_eq!(sink.into_words(), vec!["a", "b"]);
    }

    #[test]
    fn test_file_sink_writes_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        let mut sink = StreamingSink::File(FileSink::create(&path, 2).unwrap());
        for word in ["one", "two", "three"] {
            sink.push(word).unwrap();
        }
        let output = sink.finish().unwrap();
        assert_eq!(output, SinkOutput::File { path: path.clone(), lines: 3 });
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "one\ntwo\nthree\n");
    }

    #[test]
    fn test_periodic_flush_reaches_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        let mut sink = FileSink::create(&path, 2).unwrap();
        sink.push("a").unwrap();
        sink.push("b").unwrap();
        // flushed after the second line without finishing the sink
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "a\nb\n");
    }

    #[test]
    fn test_abandon_discards_memory() {
        let mut sink = StreamingSink::Memory(MemorySink::new(10));
        sink.push("a").unwrap();
        assert_eq!(sink.abandon(), SinkOutput::Discarded);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_flush_failure_is_io_error() {
        let mut sink = FileSink::create(Path::new("/dev/full"), 1).unwrap();
        let err = sink.push("word").unwrap_err();
        assert!(matches!(err, ForgeError::Io { path: Some(_), .. }));
        assert_eq!(sink.written(), 1);
        assert_eq!(sink.flushed(), 0);

        let output = StreamingSink::File(sink).abandon();
        assert_eq!(
            output,
            SinkOutput::File {
                path: PathBuf::from("/dev/full"),
                lines: 0
            }
        );
    }

    #[test]
    fn test_abandon_counts_flushed_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        let mut sink = StreamingSink::File(FileSink::create(&path, 100).unwrap());
        sink.push("a").unwrap();
        sink.push("b").unwrap();
        assert_eq!(sink.abandon(), SinkOutput::File { path: path.clone(), lines: 2 });
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "a\nb\n");
    }

    #[test]
    fn test_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.txt");
        assert!(matches!(FileSink::create(&path, 10), Err(ForgeError::Io { .. })));
    }
}
