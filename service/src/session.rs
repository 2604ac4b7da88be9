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

//! Per-connection shell state handed to command interpreters

use crate::config::ShellConfig;
use crate::error::{Result, TelnetError};
use crate::line::LineBuffer;
use crate::output::{Destination, NetworkSink, OutputSink};
use crate::redirect::{OutputHandle, RedirectionSnapshot};
use crate::types::ConnectionId;
use std::fmt;
use tokio::io::AsyncWrite;
use tracing::{trace, warn};

/// Everything a command interpreter can reach for one shell session.
///
/// A session created for a connection writes to its network sink until it
/// is redirected. Sessions made with [`ShellSession::clone_session`] have no
/// network part and always start redirected.
#[derive(Debug)]
pub struct ShellSession {
    id: ConnectionId,
    network: Option<NetworkSink>,
    output: OutputHandle,
    line: LineBuffer,
    exit_requested: bool,
}

impl ShellSession {
    /// Create the session for a connection writing to `writer`.
    ///
    /// Fails with [`TelnetError::InvalidConfig`] if `config` does not pass
    /// [`ShellConfig::validate`].
    pub fn new<W>(id: ConnectionId, writer: W, config: &ShellConfig) -> Result<Self>
    where
        W: AsyncWrite + Send + Unpin + 'static,
    {
        config.validate()?;
        Ok(Self {
            id,
            network: Some(NetworkSink::new(
                Box::new(writer),
                config.io_buffer_size,
                config.line_len,
            )),
            output: OutputHandle::network(),
            line: LineBuffer::new(config.line_len),
            exit_requested: false,
        })
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Write `text` to the current sink, returning the bytes accepted
    pub async fn write_str(&mut self, text: &str) -> Result<usize> {
        trace!(connection_id = %self.id, bytes = text.len(), "Shell output");
        match self.output.sink_mut() {
            OutputSink::RedirectBacked(redirection) => Ok(redirection.write(text.as_bytes()).await?),
            OutputSink::NetworkBacked => match &mut self.network {
                Some(network) => Ok(network.write(text.as_bytes()).await?),
                None => Err(TelnetError::Detached),
            },
        }
    }

    /// Format and write to the current sink.
    ///
    /// Formatting happens before the returned future is created, so
    /// `write!(session, ...).await` works from `Send` contexts.
    pub fn write_fmt(
        &mut self,
        args: fmt::Arguments<'_>,
    ) -> impl Future<Output = Result<usize>> + Send + '_ {
        let text = args.to_string();
        async move { self.write_str(&text).await }
    }

    /// Flush buffered network output and any open redirect stream
    pub async fn flush(&mut self) -> Result<()> {
        if let OutputSink::RedirectBacked(redirection) = self.output.sink_mut() {
            redirection.flush().await?;
        }
        if let Some(network) = &mut self.network {
            network.flush().await?;
        }
        Ok(())
    }

    /// Write protocol bytes straight to the peer
    pub(crate) async fn send_immediate(&mut self, bytes: &[u8]) -> Result<()> {
        match &mut self.network {
            Some(network) => Ok(network.send_immediate(bytes).await?),
            None => Err(TelnetError::Detached),
        }
    }

    /// Redirect output without saving the current sink
    pub async fn redirect(&mut self, destination: Destination) -> Result<()> {
        Ok(self.output.redirect(destination).await?)
    }

    /// Redirect output, returning a snapshot for [`ShellSession::undirect`]
    pub async fn redirect_saving(&mut self, destination: Destination) -> Result<RedirectionSnapshot> {
        Ok(self.output.redirect_saving(destination).await?)
    }

    /// Undo the redirection that produced `snapshot`
    pub async fn undirect(&mut self, snapshot: RedirectionSnapshot) -> Result<()> {
        Ok(self.output.undirect(snapshot).await?)
    }

    /// A detached session targeting the same output, with its own line
    /// buffer and a single reference.
    ///
    /// Every reference must be given back with [`ShellSession::release`].
    /// The last release flushes and closes the clone's stream; a clone
    /// dropped without it loses any output still buffered and logs a
    /// warning.
    pub fn clone_session(&self) -> Self {
        Self {
            id: self.id,
            network: None,
            output: self.output.clone_handle(),
            line: LineBuffer::new(self.line.capacity()),
            exit_requested: false,
        }
    }

    pub fn add_ref(&mut self) {
        self.output.add_ref();
    }

    /// Drop one reference, tearing the session down on the last.
    ///
    /// # Panics
    ///
    /// If the last reference is released while output is not redirected.
    pub async fn release(self) -> Result<Option<Self>> {
        let Self {
            id,
            mut network,
            output,
            line,
            exit_requested,
        } = self;
        match output.release().await? {
            Some(output) => Ok(Some(Self {
                id,
                network,
                output,
                line,
                exit_requested,
            })),
            None => {
                if let Some(network) = &mut network {
                    network.shutdown().await?;
                }
                Ok(None)
            }
        }
    }

    /// Raw storage of the line being assembled
    pub fn line_buffer(&mut self) -> &mut [u8] {
        self.line.as_mut_bytes()
    }

    pub(crate) fn line_mut(&mut self) -> &mut LineBuffer {
        &mut self.line
    }

    /// Ask the connection to close once the current command returns
    pub fn exit(&mut self) {
        self.exit_requested = true;
    }

    pub fn exit_requested(&self) -> bool {
        self.exit_requested
    }

    pub fn is_redirected(&self) -> bool {
        self.output.is_redirected()
    }

    pub fn output(&self) -> &OutputHandle {
        &self.output
    }

    /// Close any redirection, then flush and shut down the network sink
    pub(crate) async fn close(&mut self) -> Result<()> {
        if self.output.depth() != 0 {
            warn!(
                connection_id = %self.id,
                depth = self.output.depth(),
                "Closing session with unrestored redirections"
            );
        }
        let redirect = self.output.close().await;
        let network = match &mut self.network {
            Some(network) => network.shutdown().await,
            None => Ok(()),
        };
        redirect?;
        network?;
        Ok(())
    }
}
