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

//! Telnet Shell Service
//!
//! Serves an interactive line-oriented shell over TELNET. Each accepted
//! connection runs a [`ConnectionWorker`] that decodes the byte stream,
//! refuses every option negotiation, assembles lines, and hands them to a
//! [`CommandInterpreter`]. Commands write through their [`ShellSession`],
//! whose output can be redirected to files or the console and restored in
//! nested fashion.
//!
//! # Architecture
//!
//! ```text
//! TelnetServer
//!     ↓
//! ConnectionWorker → TelnetCodec (telshell-telnetcodec)
//!     ↓
//! CommandInterpreter → ShellSession → OutputHandle → OutputSink
//! ```
//!
//! # Example
//!
//! ```no_run
//! use telshell_service::{CommandInterpreter, Destination, Result, ShellConfig, ShellSession, TelnetServer};
//! use async_trait::async_trait;
//!
//! struct Shell;
//!
//! #[async_trait]
//! impl CommandInterpreter for Shell {
//!     async fn execute(&self, line: &str, session: &mut ShellSession) -> Result<()> {
//!         match line {
//!             "exit" => session.exit(),
//!             "date" => {
//!                 let snapshot = session.redirect_saving(Destination::append("date.log").await?).await?;
//!                 session.write_str("today\n").await?;
//!                 session.undirect(snapshot).await?;
//!             }
//!             other => {
//!                 session.write_str(&format!("unknown command: {other}\n")).await?;
//!             }
//!         }
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
//!     let server = TelnetServer::new(ShellConfig::default()).await?;
//!     server.start(std::sync::Arc::new(Shell)).await?;
//!     tokio::signal::ctrl_c().await?;
//!     server.shutdown().await?;
//!     Ok(())
//! }
//! ```

mod config;
mod error;
mod interpreter;
mod line;
mod output;
mod redirect;
mod server;
mod session;
mod types;
mod worker;

pub use config::{DEFAULT_IO_BUFFER_SIZE, DEFAULT_LINE_LEN, DEFAULT_TELNET_PORT, ShellConfig};
pub use error::{Result, TelnetError};
pub use interpreter::CommandInterpreter;
pub use line::LineBuffer;
pub use output::{BoxedWriter, Destination, NetworkSink, OutputSink, Redirection, SendBuffer};
pub use redirect::{OutputHandle, RedirectionSnapshot};
pub use server::TelnetServer;
pub use session::ShellSession;
pub use types::{ConnectionId, WorkerState};
pub use worker::ConnectionWorker;
