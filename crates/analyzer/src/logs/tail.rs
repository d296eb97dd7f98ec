//! Tail — bounded backward reader for the end of a (possibly huge) log file.
//!
//! The file is scanned from the end in fixed-size chunks until enough
//! newlines have been seen, the byte cap is hit, or the start of the file
//! is reached. Memory use is bounded by [`TailOptions::max_bytes`] no matter
//! how large the file grows.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Default number of lines handed to the oracle.
pub const DEFAULT_MAX_LINES: usize = 1000;
/// Hard cap on bytes read from the end of the file.
pub const DEFAULT_MAX_BYTES: usize = 100_000;
/// Size of each backward read.
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

#[derive(Debug, Error)]
pub enum TailError {
    #[error("Failed to open log file {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("I/O error while reading log tail: {0}")]
    Io(#[from] io::Error),
}

/// Limits applied to a single tail read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TailOptions {
    pub max_lines: usize,
    pub max_bytes: usize,
    pub chunk_size: usize,
}

impl Default for TailOptions {
    fn default() -> Self {
        Self {
            max_lines: DEFAULT_MAX_LINES,
            max_bytes: DEFAULT_MAX_BYTES,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl TailOptions {
    pub fn with_max_lines(mut self, max_lines: usize) -> Self {
        self.max_lines = max_lines;
        self
    }
}

/// The most recent lines of a log file, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogWindow {
    lines: Vec<String>,
    bytes_scanned: u64,
    reached_start: bool,
}

impl LogWindow {
    /// Build a window from lines that are already in memory.
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let lines: Vec<String> = lines.into_iter().map(Into::into).collect();
        let bytes_scanned = lines.iter().map(|l| l.len() as u64 + 1).sum();
        Self {
            lines,
            bytes_scanned,
            reached_start: true,
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of bytes read from the end of the source.
    pub fn bytes_scanned(&self) -> u64 {
        self.bytes_scanned
    }

    /// Whether the scan reached byte 0 of the source.
    pub fn reached_start(&self) -> bool {
        self.reached_start
    }

    /// Lines joined with `\n`, verbatim.
    pub fn joined(&self) -> String {
        self.lines.join("\n")
    }
}

/// Read the last `options.max_lines` lines of the file at `path`.
pub fn read_tail(path: impl AsRef<Path>, options: &TailOptions) -> Result<LogWindow, TailError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| TailError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let window = read_tail_from(file, options)?;
    debug!(
        path = %path.display(),
        lines = window.len(),
        bytes_scanned = window.bytes_scanned(),
        reached_start = window.reached_start(),
        "Read log tail"
    );
    Ok(window)
}

/// Read the last `options.max_lines` lines from any seekable source.
pub fn read_tail_from<R: Read + Seek>(mut reader: R, options: &TailOptions) -> Result<LogWindow, TailError> {
    if options.max_lines == 0 || options.max_bytes == 0 {
        return Ok(LogWindow::default());
    }

    let end = reader.seek(SeekFrom::End(0))?;
    let chunk_size = options.chunk_size.max(1) as u64;
    let max_bytes = options.max_bytes as u64;

    let mut pos = end;
    let mut scanned: u64 = 0;
    let mut newlines = 0usize;
    let mut chunks: Vec<Vec<u8>> = Vec::new();

    // N complete lines need N + 1 newlines unless the scan reaches byte 0.
    while pos > 0 && scanned < max_bytes && newlines <= options.max_lines {
        let step = chunk_size.min(pos).min(max_bytes - scanned);
        pos -= step;
        reader.seek(SeekFrom::Start(pos))?;

        let mut chunk = vec![0u8; step as usize];
        reader.read_exact(&mut chunk)?;
        newlines += chunk.iter().filter(|&&b| b == b'\n').count();
        scanned += step;
        chunks.push(chunk);
    }

    let mut buf: Vec<u8> = Vec::with_capacity(scanned as usize);
    for chunk in chunks.iter().rev() {
        buf.extend_from_slice(chunk);
    }

    let reached_start = pos == 0;
    if !reached_start && !starts_on_line_boundary(&mut reader, pos)? {
        // A lone partial line is still better than nothing.
        if let Some(first_newline) = buf.iter().position(|&b| b == b'\n') {
            buf.drain(..=first_newline);
        }
    }

    let text = String::from_utf8_lossy(&buf);
    let all: Vec<&str> = text.lines().collect();
    let skip = all.len().saturating_sub(options.max_lines);
    let lines = all[skip..].iter().map(|l| l.to_string()).collect();

    Ok(LogWindow {
        lines,
        bytes_scanned: scanned,
        reached_start,
    })
}

/// True when the byte just before `pos` is a newline.
fn starts_on_line_boundary<R: Read + Seek>(reader: &mut R, pos: u64) -> io::Result<bool> {
    if pos == 0 {
        return Ok(true);
    }
    reader.seek(SeekFrom::Start(pos - 1))?;
    let mut byte = [0u8; 1];
    reader.read_exact(&mut byte)?;
    Ok(byte[0] == b'\n')
}
