//
// Copyright 2017-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Output sinks: the buffered network path and redirected destinations

use bytes::{BufMut, BytesMut};
use metrics::counter;
use std::fmt;
use std::io;
use std::path::Path;
use std::sync::Arc;
use telshell_telnetcodec::consts;
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};
use tracing::{debug, trace, warn};

/// Boxed byte sink used for sockets and redirect streams
pub type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// Fixed-capacity send buffer for the network path.
///
/// The buffered length always stays below `capacity`. One byte of headroom
/// is kept for expanding a trailing LF into CRLF, and [`SendBuffer::needs_flush`]
/// reports when a write of `line_len` bytes plus that expansion might not fit.
///
/// Geometry is checked by [`crate::ShellConfig::validate`]; an unvalidated
/// geometry never underflows but may truncate every write.
#[derive(Debug)]
pub struct SendBuffer {
    buffer: BytesMut,
    capacity: usize,
    line_len: usize,
}

impl SendBuffer {
    /// Create a send buffer of `capacity` bytes with a flush threshold of
    /// `capacity - line_len`
    pub fn new(capacity: usize, line_len: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(capacity),
            capacity,
            line_len,
        }
    }

    /// Bytes currently buffered
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Whether nothing is buffered
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Fixed capacity of the buffer
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Buffered bytes, in order
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Append `text`, returning how many of its bytes were accepted.
    ///
    /// Text beyond `capacity - 1` total bytes is dropped. If this write
    /// leaves the buffer ending in a bare LF and headroom remains, the LF is
    /// rewritten as CRLF.
    pub fn append(&mut self, text: &[u8]) -> usize {
        let room = self
            .capacity
            .saturating_sub(1)
            .saturating_sub(self.buffer.len());
        let accepted = text.len().min(room);
        if accepted < text.len() {
            debug!(
                dropped = text.len() - accepted,
                "Send buffer full, truncating output"
            );
        }
        self.buffer.extend_from_slice(&text[..accepted]);

        if accepted > 0 && self.ends_with_bare_newline() && self.buffer.len() + 1 < self.capacity {
            let last = self.buffer.len() - 1;
            self.buffer[last] = consts::CR;
            self.buffer.put_u8(consts::LF);
        }
        accepted
    }

    /// Whether another worst-case line, with its CRLF expansion, might not fit
    pub fn needs_flush(&self) -> bool {
        self.buffer.len() + self.line_len + 2 > self.capacity
    }

    /// Drain the buffered bytes for sending, leaving the buffer empty
    pub fn take(&mut self) -> BytesMut {
        self.buffer.split()
    }

    /// Drop everything buffered
    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    fn ends_with_bare_newline(&self) -> bool {
        match self.buffer.as_ref() {
            [.., prev, consts::LF] => *prev != consts::CR,
            [consts::LF] => true,
            _ => false,
        }
    }
}

/// The network half of a connection: socket writer plus its send buffer
pub struct NetworkSink {
    writer: BoxedWriter,
    send: SendBuffer,
}

impl NetworkSink {
    /// Wrap the write half of a socket
    pub fn new(writer: BoxedWriter, capacity: usize, line_len: usize) -> Self {
        Self {
            writer,
            send: SendBuffer::new(capacity, line_len),
        }
    }

    /// Send buffer state
    pub fn buffer(&self) -> &SendBuffer {
        &self.send
    }

    /// Buffer `text`, flushing proactively when the buffer runs low
    pub async fn write(&mut self, text: &[u8]) -> io::Result<usize> {
        let accepted = self.send.append(text);
        if self.send.needs_flush() {
            self.flush().await?;
        }
        Ok(accepted)
    }

    /// Send everything buffered and reset the buffer
    pub async fn flush(&mut self) -> io::Result<()> {
        if !self.send.is_empty() {
            let frame = self.send.take();
            trace!(bytes = frame.len(), "Flushing shell output");
            counter!("telshell.bytes.sent").increment(frame.len() as u64);
            self.writer.write_all(&frame).await?;
        }
        self.writer.flush().await
    }

    /// Write `bytes` straight to the socket, bypassing the send buffer
    pub async fn send_immediate(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.writer.write_all(bytes).await?;
        self.writer.flush().await
    }

    /// Flush and shut down the write half
    pub async fn shutdown(&mut self) -> io::Result<()> {
        self.flush().await?;
        self.writer.shutdown().await
    }
}

impl fmt::Debug for NetworkSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetworkSink")
            .field("send", &self.send)
            .finish_non_exhaustive()
    }
}

/// Where redirected output goes.
///
/// `Console` is the process's standard output; it is flushed but never
/// closed. `File` shares one open descriptor between every handle, snapshot
/// and clone that names it; the descriptor closes when the last of them is
/// gone. Two destinations are equal when they name the same descriptor.
#[derive(Debug, Clone)]
pub enum Destination {
    /// Standard output of the server process
    Console,
    /// An open file
    File(Arc<std::fs::File>),
}

impl Destination {
    /// Use an already open file
    pub fn file(file: std::fs::File) -> Self {
        Destination::File(Arc::new(file))
    }

    /// Create or truncate the file at `path`
    pub async fn create(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = tokio::fs::File::create(path).await?;
        Ok(Self::file(file.into_std().await))
    }

    /// Open the file at `path` for appending, creating it if needed
    pub async fn append(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await?;
        Ok(Self::file(file.into_std().await))
    }

    /// Whether this is the console
    pub fn is_console(&self) -> bool {
        matches!(self, Destination::Console)
    }

    fn open_stream(&self) -> io::Result<BoxedWriter> {
        match self {
            Destination::Console => Ok(Box::new(tokio::io::stdout())),
            Destination::File(file) => {
                let file = tokio::fs::File::from_std(file.try_clone()?);
                Ok(Box::new(BufWriter::new(file)))
            }
        }
    }
}

impl PartialEq for Destination {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Destination::Console, Destination::Console) => true,
            (Destination::File(a), Destination::File(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Eq for Destination {}

/// A destination plus the stream opened over it.
///
/// The stream is opened on the first write rather than at redirection time,
/// since the task that sets up a redirection is not always the one that
/// writes through it.
pub struct Redirection {
    destination: Destination,
    stream: Option<BoxedWriter>,
}

impl Redirection {
    /// Target `destination` without opening it
    pub fn new(destination: Destination) -> Self {
        Self {
            destination,
            stream: None,
        }
    }

    /// Target of this redirection
    pub fn destination(&self) -> &Destination {
        &self.destination
    }

    /// Whether the stream has been opened
    pub fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    /// Write `text`, opening the stream first if needed
    pub async fn write(&mut self, text: &[u8]) -> io::Result<usize> {
        let stream = match self.stream.take() {
            Some(stream) => stream,
            None => self.destination.open_stream()?,
        };
        let stream = self.stream.insert(stream);
        stream.write_all(text).await?;
        Ok(text.len())
    }

    /// Flush the stream if it is open
    pub async fn flush(&mut self) -> io::Result<()> {
        match &mut self.stream {
            Some(stream) => stream.flush().await,
            None => Ok(()),
        }
    }

    /// Flush and, unless the destination is the console, close the stream
    pub async fn close(mut self) -> io::Result<()> {
        match self.stream.take() {
            Some(mut stream) if !self.destination.is_console() => {
                stream.flush().await?;
                stream.shutdown().await
            }
            Some(mut stream) => stream.flush().await,
            None => Ok(()),
        }
    }
}

impl Drop for Redirection {
    fn drop(&mut self) {
        if self.stream.is_some() && !self.destination.is_console() {
            warn!(
                destination = ?self.destination,
                "Redirection dropped without close, buffered output may be lost"
            );
        }
    }
}

impl fmt::Debug for Redirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Redirection")
            .field("destination", &self.destination)
            .field("open", &self.is_open())
            .finish()
    }
}

/// The two interchangeable output backends
#[derive(Debug)]
pub enum OutputSink {
    /// Output goes to the connection's send buffer
    NetworkBacked,
    /// Output goes to a redirected destination
    RedirectBacked(Redirection),
}

impl OutputSink {
    /// Whether output is currently redirected
    pub fn is_redirected(&self) -> bool {
        matches!(self, OutputSink::RedirectBacked(_))
    }

    /// Redirect target, if any
    pub fn destination(&self) -> Option<&Destination> {
        match self {
            OutputSink::NetworkBacked => None,
            OutputSink::RedirectBacked(redirection) => Some(redirection.destination()),
        }
    }
}
