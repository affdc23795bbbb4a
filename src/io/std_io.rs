//! Standard byte sources for files and stdin.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::PathBuf;

use super::{ByteSource, SourceProvider};

fn closed(id: &str) -> io::Error {
    io::Error::new(io::ErrorKind::NotConnected, format!("source '{id}' is closed"))
}

/// Byte source over a regular file that may still be growing.
///
/// Readiness compares the current position with the file length on disk, so
/// bytes appended by another writer become visible on the next poll.
#[derive(Debug)]
pub struct FileSource {
    id: String,
    file: Option<File>,
    pos: u64,
}

impl FileSource {
    pub fn new(id: impl Into<String>, file: File) -> Self {
        Self {
            id: id.into(),
            file: Some(file),
            pos: 0,
        }
    }

    fn file(&mut self) -> io::Result<&mut File> {
        match self.file.as_mut() {
            Some(f) => Ok(f),
            None => Err(closed(&self.id)),
        }
    }

    fn available(&mut self) -> io::Result<u64> {
        let pos = self.pos;
        let len = self.file()?.metadata()?.len();
        Ok(len.saturating_sub(pos))
    }
}

impl ByteSource for FileSource {
    fn id(&self) -> &str {
        &self.id
    }

    fn ready(&mut self) -> io::Result<bool> {
        if self.file.is_none() {
            return Ok(false);
        }
        Ok(self.available()? > 0)
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.file()?.read(buf)?;
        self.pos += n as u64;
        Ok(n)
    }

    fn skip(&mut self, n: u64) -> io::Result<u64> {
        let step = n.min(self.available()?);
        if step > 0 {
            let pos = self.pos + step;
            self.file()?.seek(SeekFrom::Start(pos))?;
            self.pos = pos;
        }
        Ok(step)
    }

    fn rewind(&mut self) -> io::Result<()> {
        self.file()?.rewind()?;
        self.pos = 0;
        Ok(())
    }

    fn close(&mut self) -> io::Result<()> {
        self.file.take();
        Ok(())
    }
}

/// Byte source over any `Read` implementation, such as stdin or a pipe.
///
/// A plain reader cannot report readiness without reading, so the source is
/// considered ready until a read returns zero bytes. Reads may block if the
/// underlying reader does.
pub struct StreamSource<R> {
    id: String,
    inner: Option<R>,
    eof: bool,
}

impl<R> std::fmt::Debug for StreamSource<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamSource")
            .field("id", &self.id)
            .field("open", &self.inner.is_some())
            .field("eof", &self.eof)
            .finish()
    }
}

impl<R: Read> StreamSource<R> {
    pub fn new(id: impl Into<String>, inner: R) -> Self {
        Self {
            id: id.into(),
            inner: Some(inner),
            eof: false,
        }
    }

    fn inner(&mut self) -> io::Result<&mut R> {
        match self.inner.as_mut() {
            Some(r) => Ok(r),
            None => Err(closed(&self.id)),
        }
    }
}

impl<R: Read> ByteSource for StreamSource<R> {
    fn id(&self) -> &str {
        &self.id
    }

    fn ready(&mut self) -> io::Result<bool> {
        Ok(self.inner.is_some() && !self.eof)
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner()?.read(buf)?;
        if n == 0 && !buf.is_empty() {
            self.eof = true;
        }
        Ok(n)
    }

    fn skip(&mut self, n: u64) -> io::Result<u64> {
        let skipped = io::copy(&mut self.inner()?.by_ref().take(n), &mut io::sink())?;
        if skipped < n {
            self.eof = true;
        }
        Ok(skipped)
    }

    fn close(&mut self) -> io::Result<()> {
        self.inner.take();
        Ok(())
    }
}

/// Source provider for reading from stdin.
#[derive(Debug, Clone)]
pub struct StdinProvider {
    id: String,
}

impl StdinProvider {
    pub fn new() -> Self {
        Self { id: "-".into() }
    }
}

impl Default for StdinProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceProvider for StdinProvider {
    fn id(&self) -> &str {
        &self.id
    }

    fn open(&self) -> io::Result<Box<dyn ByteSource + Send>> {
        Ok(Box::new(StreamSource::new(self.id.clone(), io::stdin())))
    }
}

/// Source provider for reading from files.
#[derive(Debug, Clone)]
pub struct FileProvider {
    id: String,
    path: PathBuf,
}

impl FileProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let id = path.to_string_lossy().into_owned();
        Self { id, path }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl SourceProvider for FileProvider {
    fn id(&self) -> &str {
        &self.id
    }

    fn open(&self) -> io::Result<Box<dyn ByteSource + Send>> {
        tracing::debug!(path = %self.path.display(), "opening file");
        let file = File::open(&self.path)?;
        Ok(Box::new(FileSource::new(self.id.clone(), file)))
    }
}
