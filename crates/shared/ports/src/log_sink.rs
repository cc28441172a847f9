use std::fmt;
use std::io::{self, Write};
use std::sync::Arc;

use parking_lot::Mutex;

type SharedWriter = Arc<Mutex<Box<dyn Write + Send>>>;

/// Diagnostic output destination owned by a connector
///
/// Cloning shares the underlying writer. The default sink discards
/// everything written to it.
#[derive(Clone, Default)]
pub struct LogSink {
    target: Option<SharedWriter>,
}

impl LogSink {
    pub fn new<W: Write + Send + 'static>(writer: W) -> Self {
        Self {
            target: Some(Arc::new(Mutex::new(Box::new(writer)))),
        }
    }

    pub fn discard() -> Self {
        Self::default()
    }

    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }

    /// In-memory sink plus a handle to read back what was written
    pub fn capture() -> (Self, LogCapture) {
        let capture = LogCapture::default();
        (Self::new(capture.clone()), capture)
    }

    pub fn is_discard(&self) -> bool {
        self.target.is_none()
    }
}

impl Write for LogSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match &self.target {
            Some(target) => target.lock().write(buf),
            None => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match &self.target {
            Some(target) => target.lock().flush(),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for LogSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogSink")
            .field("discard", &self.is_discard())
            .finish()
    }
}

/// Shared in-memory buffer behind [`LogSink::capture`]
#[derive(Clone, Default)]
pub struct LogCapture {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl LogCapture {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buffer.lock()).into_owned()
    }
}

impl Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discard_accepts_writes() {
        let mut sink = LogSink::discard();
        assert!(sink.is_discard());
        assert_eq!(sink.write(b"dropped").unwrap(), 7);
    }

    #[test]
    fn test_clones_share_writer() {
        let (sink, capture) = LogSink::capture();
        let mut a = sink.clone();
        let mut b = sink;
        writeln!(a, "first").unwrap();
        writeln!(b, "second").unwrap();
        assert_eq!(capture.contents(), "first\nsecond\n");
    }
}
