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

//! Telnet Shell Server Example
//!
//! A small shell with a few built-in commands. Any command can be followed
//! by `> file` or `>> file` to send its output to a file instead.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --example shell_server
//! ```
//!
//! Then connect with:
//! ```bash
//! telnet localhost 2323
//! ```
//!
//! ## Commands
//!
//! - `help` - List commands
//! - `echo <text>` - Print text
//! - `log <text>` - Print text on the server console
//! - `exit` - Close the connection

use async_trait::async_trait;
use std::sync::Arc;
use telshell_service::{
    CommandInterpreter, Destination, Result, ShellConfig, ShellSession, TelnetServer,
};
use tracing::info;

struct DemoShell;

impl DemoShell {
    async fn run_command(&self, command: &str, session: &mut ShellSession) -> Result<()> {
        let (name, args) = command.split_once(' ').unwrap_or((command, ""));
        match name {
            "" => {}
            "help" => {
                session
                    .write_str("commands: help, echo <text>, log <text>, exit\n")
                    .await?;
                session
                    .write_str("append '> file' or '>> file' to redirect output\n")
                    .await?;
            }
            "echo" => {
                session.write_str(&format!("{args}\n")).await?;
            }
            "log" => {
                let mut console = session.clone_session();
                console.write_str(&format!("[{}] {args}\n", session.id())).await?;
                console.release().await?;
            }
            "exit" => {
                session.write_str("bye\n").await?;
                session.exit();
            }
            other => {
                session.write_str(&format!("{other}: command not found\n")).await?;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl CommandInterpreter for DemoShell {
    async fn execute(&self, line: &str, session: &mut ShellSession) -> Result<()> {
        let (command, target) = match line.split_once('>') {
            Some((command, target)) => (command.trim(), Some(target)),
            None => (line.trim(), None),
        };

        let Some(target) = target else {
            return self.run_command(command, session).await;
        };

        let destination = match target.strip_prefix('>') {
            Some(path) => Destination::append(path.trim()).await,
            None => Destination::create(target.trim()).await,
        };
        let destination = match destination {
            Ok(destination) => destination,
            Err(e) => {
                session.write_str(&format!("{}: {e}\n", target.trim())).await?;
                return Ok(());
            }
        };

        let snapshot = session.redirect_saving(destination).await?;
        let result = self.run_command(command, session).await;
        session.undirect(snapshot).await?;
        result
    }
}

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let config = ShellConfig::new("127.0.0.1:2323".parse()?).with_banner("Telshell demo\n");
    let server = TelnetServer::new(config).await?;

    info!("Shell server running on {}", server.bind_address());
    println!("Press Ctrl+C to stop");

    server.start(Arc::new(DemoShell)).await?;

    tokio::signal::ctrl_c().await?;

    server.shutdown().await?;

    Ok(())
}
