//! Shared append-only log file.

use std::fs::{File, OpenOptions};
use std::io::{self, LineWriter, Write};
use std::path::Path;
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};
use tracing_subscriber::fmt::MakeWriter;

/// Append handle to a JSONL file.
///
/// Clones share one [`LineWriter`]. Every event holds the lock for its
/// whole line, so lines from different threads never interleave, and the
/// trailing newline pushes the line to disk.
#[derive(Clone)]
pub struct LogFile {
    file: Arc<Mutex<LineWriter<File>>>,
}

impl LogFile {
    /// Opens `path` for appending, creating parent directories.
    pub fn open(path: &Path) -> io::Result<Self> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Arc::new(Mutex::new(LineWriter::new(file))),
        })
    }
}

/// Writer for a single event; releases the file on drop.
pub struct LogFileWriter<'a>(MutexGuard<'a, LineWriter<File>>);

impl Write for LogFileWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.flush()
    }
}

impl<'a> MakeWriter<'a> for LogFile {
    type Writer = LogFileWriter<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        LogFileWriter(self.file.lock())
    }
}
