//! Line-oriented file streams
//!
//! Pipeline files are ISO-8859-1 text with `\n` terminators. Any path ending
//! in `.gz` is gzip-compressed; the codec is resolved once when the stream is
//! opened and never re-derived afterwards.

use crate::error::{Result, ToaError};
use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Compression applied to a file stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Codec {
    Plain,
    Gzip,
}

impl Codec {
    /// Resolve the codec from the file extension
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        match path.as_ref().extension() {
            Some(ext) if ext.eq_ignore_ascii_case("gz") => Codec::Gzip,
            _ => Codec::Plain,
        }
    }
}

/// Decode ISO-8859-1 bytes; every byte maps to the code point of the same value.
pub fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

/// Encode text as ISO-8859-1; characters outside the range become `?`.
pub fn encode_latin1(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}

/// Reads decoded lines and keeps track of the 1-based line number
pub struct LineReader {
    inner: Box<dyn BufRead>,
    path: PathBuf,
    buf: Vec<u8>,
    line_number: u64,
}

impl LineReader {
    /// Open a file, choosing the codec from its extension
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        Self::open_with_codec(path, Codec::from_path(path))
    }

    pub fn open_with_codec(path: impl AsRef<Path>, codec: Codec) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| ToaError::file_open(path, e))?;
        let inner: Box<dyn BufRead> = match codec {
            Codec::Plain => Box::new(BufReader::new(file)),
            Codec::Gzip => Box::new(BufReader::new(MultiGzDecoder::new(file))),
        };
        Ok(Self::from_reader(path, inner))
    }

    /// Wrap an already open reader; `name` is used in error messages
    pub fn from_reader(name: impl Into<PathBuf>, reader: impl BufRead + 'static) -> Self {
        Self {
            inner: Box::new(reader),
            path: name.into(),
            buf: Vec::with_capacity(512),
            line_number: 0,
        }
    }

    /// Next line without its terminator, or `None` at end of stream
    pub fn next_line(&mut self) -> Result<Option<String>> {
        self.buf.clear();
        let read = self
            .inner
            .read_until(b'\n', &mut self.buf)
            .map_err(|e| ToaError::file_read(&self.path, e))?;
        if read == 0 {
            return Ok(None);
        }
        self.line_number += 1;

        if self.buf.last() == Some(&b'\n') {
            self.buf.pop();
            if self.buf.last() == Some(&b'\r') {
                self.buf.pop();
            }
        }
        Ok(Some(decode_latin1(&self.buf)))
    }

    /// Number of lines returned so far
    pub fn line_number(&self) -> u64 {
        self.line_number
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

enum Sink {
    Plain(BufWriter<File>),
    Gzip(GzEncoder<BufWriter<File>>),
}

/// Writes ISO-8859-1 lines, gzip-compressed when the path ends in `.gz`
pub struct LineWriter {
    sink: Sink,
    path: PathBuf,
}

impl LineWriter {
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        Self::create_with_codec(path, Codec::from_path(path))
    }

    pub fn create_with_codec(path: impl AsRef<Path>, codec: Codec) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| ToaError::file_create(path, e))?;
        let writer = BufWriter::new(file);
        let sink = match codec {
            Codec::Plain => Sink::Plain(writer),
            Codec::Gzip => Sink::Gzip(GzEncoder::new(writer, Compression::default())),
        };
        Ok(Self {
            sink,
            path: path.to_path_buf(),
        })
    }

    /// Write one line followed by `\n`
    pub fn write_line(&mut self, line: &str) -> Result<()> {
        let mut bytes = encode_latin1(line);
        bytes.push(b'\n');
        self.write_all(&bytes)
            .map_err(|e| ToaError::file_write(&self.path, e))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flush buffers and write the gzip trailer
    pub fn finish(self) -> Result<()> {
        let path = self.path;
        let result = match self.sink {
            Sink::Plain(mut w) => w.flush(),
            Sink::Gzip(encoder) => encoder.finish().and_then(|mut w| w.flush()),
        };
        result.map_err(|e| ToaError::file_write(&path, e))
    }
}

impl Write for LineWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match self.sink {
            Sink::Plain(ref mut w) => w.write(buf),
            Sink::Gzip(ref mut w) => w.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match self.sink {
            Sink::Plain(ref mut w) => w.flush(),
            Sink::Gzip(ref mut w) => w.flush(),
        }
    }
}
