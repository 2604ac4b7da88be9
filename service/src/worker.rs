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

//! Connection worker implementation
//!
//! A ConnectionWorker runs one shell session over one connection:
//! - Greets the peer with the configured banner
//! - Prompts, reads, and feeds every byte through the TELNET decoder
//! - Refuses option negotiations as they arrive
//! - Assembles lines and dispatches them to the command interpreter
//! - Tears the session down however the loop ends

use crate::{CommandInterpreter, ConnectionId, Result, ShellConfig, ShellSession, WorkerState};
use bytes::BytesMut;
use metrics::counter;
use std::sync::Arc;
use telshell_telnetcodec::{DecodeAction, NegotiationReply, TelnetCodec};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, ReadHalf};
use tokio_util::codec::Encoder;
use tracing::{debug, info, instrument, trace, warn};

/// Drives a single connection from greeting to close
pub struct ConnectionWorker<S> {
    /// Connection ID
    id: ConnectionId,
    /// Read half of the connection
    reader: ReadHalf<S>,
    /// Protocol decoder state
    codec: TelnetCodec,
    /// Session exposed to the interpreter, owning the write half
    session: ShellSession,
    /// Executes completed lines
    interpreter: Arc<dyn CommandInterpreter>,
    config: Arc<ShellConfig>,
    state: WorkerState,
    /// Receive buffer, reused for every read
    recv: Box<[u8]>,
    /// Scratch space for encoding refusals
    reply: BytesMut,
}

impl<S> ConnectionWorker<S>
where
    S: AsyncRead + AsyncWrite + Send + Unpin + 'static,
{
    /// Create a worker for `stream`, rejecting an invalid `config`
    pub fn new(
        id: ConnectionId,
        stream: S,
        interpreter: Arc<dyn CommandInterpreter>,
        config: Arc<ShellConfig>,
    ) -> Result<Self> {
        let (reader, writer) = tokio::io::split(stream);
        let session = ShellSession::new(id, writer, &config)?;
        Ok(Self {
            id,
            reader,
            codec: TelnetCodec::new(),
            session,
            interpreter,
            recv: vec![0; config.io_buffer_size].into_boxed_slice(),
            reply: BytesMut::with_capacity(3),
            config,
            state: WorkerState::Greeting,
        })
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Lifecycle state. `run` consumes the worker, so transitions after that
    /// are reported as `debug` events carrying a `state` field.
    pub fn state(&self) -> WorkerState {
        self.state
    }

    /// Run the session until the peer leaves, asks to close, or an error
    /// occurs. Teardown always runs; the loop's error takes precedence over
    /// a teardown error.
    #[instrument(skip(self), fields(connection_id = %self.id))]
    pub async fn run(mut self) -> Result<()> {
        info!("Shell session started");
        let result = self.session_loop().await;
        if let Err(e) = &result {
            warn!(error = %e, "Shell session ended with error");
        }
        let teardown = self.teardown().await;
        info!("Shell session closed");
        result.and(teardown)
    }

    async fn session_loop(&mut self) -> Result<()> {
        self.session.write_str(&self.config.banner).await?;
        self.set_state(WorkerState::PromptLoop);

        loop {
            self.session.write_str(&self.config.prompt).await?;
            self.session.flush().await?;

            let read = self.reader.read(&mut self.recv).await?;
            if read == 0 {
                debug!("Peer closed the connection");
                return Ok(());
            }
            trace!(bytes = read, "Received input");

            for index in 0..read {
                if self.codec.is_closing() {
                    break;
                }
                let byte = self.recv[index];
                self.process_byte(byte).await?;
            }

            if self.codec.is_closing() {
                debug!("Close requested");
                return Ok(());
            }
        }
    }

    async fn process_byte(&mut self, byte: u8) -> Result<()> {
        match self.codec.decode_byte(byte) {
            DecodeAction::Emit(byte) => {
                if let Some(line) = self.session.line_mut().feed(byte) {
                    self.dispatch(&line).await?;
                }
            }
            DecodeAction::Negotiate(reply) => self.refuse(reply).await?,
            DecodeAction::NoOp | DecodeAction::CloseRequested => {}
        }
        Ok(())
    }

    async fn dispatch(&mut self, line: &str) -> Result<()> {
        debug!(line, "Dispatching line");
        counter!("telshell.lines.dispatched").increment(1);
        self.interpreter.execute(line, &mut self.session).await?;
        if self.session.exit_requested() {
            self.codec.close();
        }
        Ok(())
    }

    async fn refuse(&mut self, reply: NegotiationReply) -> Result<()> {
        trace!(verb = ?reply.verb, option = reply.option, "Refusing option");
        counter!("telshell.negotiations.refused").increment(1);
        self.codec.encode(reply, &mut self.reply)?;
        let frame = self.reply.split();
        self.session.send_immediate(&frame).await
    }

    fn set_state(&mut self, state: WorkerState) {
        debug!(state = %state, "Worker state changed");
        self.state = state;
    }

    async fn teardown(&mut self) -> Result<()> {
        self.set_state(WorkerState::Closed);
        self.session.close().await
    }
}

impl<S> std::fmt::Debug for ConnectionWorker<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionWorker")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("codec", &self.codec)
            .finish()
    }
}
