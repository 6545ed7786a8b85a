//! Destinations that receive fully rendered log lines.
//!
//! A [`Destination`] is the only capability the logging channels need from
//! the outside world: "write this line somewhere". Each implementation
//! serialises whole lines so concurrent callers never interleave partial
//! output.

use std::fmt;
use std::io::{self, Write};
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::line_mode::LineMode;
use crate::sink::MessageSink;

/// Sink capable of receiving formatted log lines.
pub trait Destination: Send + Sync {
    /// Writes a single line. The destination supplies the terminator.
    fn write_line(&self, line: &str) -> io::Result<()>;

    /// Flushes buffered output, if any.
    fn flush(&self) -> io::Result<()> {
        Ok(())
    }
}

impl<D> Destination for Arc<D>
where
    D: Destination + ?Sized,
{
    fn write_line(&self, line: &str) -> io::Result<()> {
        (**self).write_line(line)
    }

    fn flush(&self) -> io::Result<()> {
        (**self).flush()
    }
}

/// Process stream a handler writes to.
///
/// The serialised names are the `ext://` references understood by
/// dictionary-based logging configurations.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StreamTarget {
    /// Standard output.
    #[cfg_attr(feature = "serde", serde(rename = "ext://sys.stdout"))]
    Stdout,
    /// Standard error.
    #[cfg_attr(feature = "serde", serde(rename = "ext://sys.stderr"))]
    Stderr,
}

impl StreamTarget {
    /// Returns the configuration name of the stream.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stdout => "ext://sys.stdout",
            Self::Stderr => "ext://sys.stderr",
        }
    }

    /// Opens a destination bound to the process stream.
    #[must_use]
    pub fn open(self) -> Arc<dyn Destination> {
        Arc::new(StdStream::new(self))
    }
}

impl fmt::Display for StreamTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StreamTarget {
    type Err = UnknownStreamTarget;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.trim() {
            "ext://sys.stdout" | "sys.stdout" | "stdout" => Ok(Self::Stdout),
            "ext://sys.stderr" | "sys.stderr" | "stderr" => Ok(Self::Stderr),
            other => Err(UnknownStreamTarget {
                name: other.to_owned(),
            }),
        }
    }
}

/// Error returned when a stream name does not match a known [`StreamTarget`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UnknownStreamTarget {
    name: String,
}

impl UnknownStreamTarget {
    /// Returns the rejected stream name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for UnknownStreamTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown stream '{}'; expected ext://sys.stdout or ext://sys.stderr",
            self.name
        )
    }
}

impl std::error::Error for UnknownStreamTarget {}

/// Destination bound to the process' standard output or standard error.
///
/// Each line is written while holding the standard handle's lock.
#[derive(Clone, Copy, Debug)]
pub struct StdStream {
    target: StreamTarget,
}

impl StdStream {
    /// Creates a destination for `target`.
    #[must_use]
    pub const fn new(target: StreamTarget) -> Self {
        Self { target }
    }
}

impl Destination for StdStream {
    fn write_line(&self, line: &str) -> io::Result<()> {
        match self.target {
            StreamTarget::Stdout => MessageSink::new(io::stdout().lock()).write(line),
            StreamTarget::Stderr => MessageSink::new(io::stderr().lock()).write(line),
        }
    }

    fn flush(&self) -> io::Result<()> {
        match self.target {
            StreamTarget::Stdout => io::stdout().flush(),
            StreamTarget::Stderr => io::stderr().flush(),
        }
    }
}

/// [`MessageSink`] behind a mutex, usable as a shared [`Destination`].
#[derive(Debug)]
pub struct SharedSink<W> {
    sink: Mutex<MessageSink<W>>,
}

impl<W> SharedSink<W> {
    /// Wraps `writer`, terminating each line with a newline.
    #[must_use]
    pub fn new(writer: W) -> Self {
        Self {
            sink: Mutex::new(MessageSink::with_line_mode(writer, LineMode::WithNewline)),
        }
    }

    /// Consumes the destination and returns the wrapped writer.
    pub fn into_inner(self) -> W {
        self.sink
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .into_inner()
    }

    fn lock(&self) -> MutexGuard<'_, MessageSink<W>> {
        // A panic while holding the lock leaves at worst a partial line.
        self.sink.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<W> Destination for SharedSink<W>
where
    W: Write + Send,
{
    fn write_line(&self, line: &str) -> io::Result<()> {
        self.lock().write(line)
    }

    fn flush(&self) -> io::Result<()> {
        self.lock().flush()
    }
}

/// Cloneable in-memory writer; every clone appends to the same buffer.
#[derive(Clone, Debug, Default)]
pub struct CaptureBuffer {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl CaptureBuffer {
    /// Creates an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns everything written so far, decoding lossily.
    #[must_use]
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.bytes()).into_owned()
    }

    /// Returns the captured output split into lines.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_owned).collect()
    }

    /// Discards the captured output.
    pub fn clear(&self) {
        self.bytes().clear();
    }

    fn bytes(&self) -> MutexGuard<'_, Vec<u8>> {
        self.bytes.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Write for CaptureBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn stream_target_parses_configuration_names() {
        assert_eq!("ext://sys.stdout".parse::<StreamTarget>(), Ok(StreamTarget::Stdout));
        assert_eq!("ext://sys.stderr".parse::<StreamTarget>(), Ok(StreamTarget::Stderr));
        assert_eq!("stderr".parse::<StreamTarget>(), Ok(StreamTarget::Stderr));

        let err = "ext://sys.stdin".parse::<StreamTarget>().unwrap_err();
        assert_eq!(err.name(), "ext://sys.stdin");
        assert!(err.to_string().contains("ext://sys.stdin"));
    }

    #[test]
    fn stream_target_display_matches_as_str() {
        assert_eq!(StreamTarget::Stdout.to_string(), "ext://sys.stdout");
        assert_eq!(StreamTarget::Stderr.to_string(), "ext://sys.stderr");
    }

    #[test]
    fn shared_sink_terminates_lines() {
        let sink = SharedSink::new(Vec::new());
        sink.write_line("one").expect("write succeeds");
        sink.write_line("two").expect("write succeeds");
        assert_eq!(sink.into_inner(), b"one\ntwo\n".to_vec());
    }

    #[test]
    fn capture_buffer_clones_share_storage() {
        let buffer = CaptureBuffer::new();
        let sink = SharedSink::new(buffer.clone());
        sink.write_line("hello").expect("write succeeds");

        assert_eq!(buffer.lines(), vec!["hello".to_owned()]);
        buffer.clear();
        assert!(buffer.contents().is_empty());
    }

    #[test]
    fn concurrent_writers_never_interleave_lines() {
        let buffer = CaptureBuffer::new();
        let sink = Arc::new(SharedSink::new(buffer.clone()));

        let handles: Vec<_> = (0..8)
            .map(|worker| {
                let sink = Arc::clone(&sink);
                thread::spawn(move || {
                    let line = format!("worker-{worker}-").repeat(32);
                    for _ in 0..50 {
                        sink.write_line(&line).expect("write succeeds");
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("worker finished");
        }

        let lines = buffer.lines();
        assert_eq!(lines.len(), 8 * 50);
        for line in lines {
            let prefix: String = line.chars().take_while(|c| *c != '-').collect();
            assert_eq!(prefix, "worker");
            let first = line.split('-').nth(1).expect("worker id");
            assert_eq!(line, format!("worker-{first}-").repeat(32));
        }
    }
}
