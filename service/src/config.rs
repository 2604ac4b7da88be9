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

//! Shell service configuration
//!
//! # Examples
//!
//! ```
//! use telshell_service::ShellConfig;
//!
//! let config = ShellConfig::new("127.0.0.1:2323".parse().unwrap())
//!     .with_io_buffer_size(1024)
//!     .with_line_len(128)
//!     .with_prompt("$ ");
//! assert!(config.validate().is_ok());
//! ```

use crate::{Result, TelnetError};
use std::net::SocketAddr;

/// Default receive/send buffer capacity in bytes
pub const DEFAULT_IO_BUFFER_SIZE: usize = 512;
/// Default maximum line length in bytes
pub const DEFAULT_LINE_LEN: usize = 80;
/// Conventional Telnet port
pub const DEFAULT_TELNET_PORT: u16 = 23;

/// Configuration shared by the acceptor and every connection worker
#[derive(Debug, Clone)]
pub struct ShellConfig {
    /// Address to listen on
    pub bind_address: SocketAddr,

    /// Capacity of the receive buffer and of the send buffer
    pub io_buffer_size: usize,

    /// Capacity of the line buffer; lines are cut at `line_len - 1` bytes
    pub line_len: usize,

    /// Maximum number of concurrent connections accepted
    pub max_connections: usize,

    /// Greeting written once when a connection opens
    pub banner: String,

    /// Prompt written before every read
    pub prompt: String,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([0, 0, 0, 0], DEFAULT_TELNET_PORT)),
            io_buffer_size: DEFAULT_IO_BUFFER_SIZE,
            line_len: DEFAULT_LINE_LEN,
            max_connections: 16,
            banner: "Telshell\n".to_string(),
            prompt: "tsh> ".to_string(),
        }
    }
}

impl ShellConfig {
    /// Create a configuration listening on `bind_address`
    pub fn new(bind_address: SocketAddr) -> Self {
        Self {
            bind_address,
            ..Default::default()
        }
    }

    /// Set the receive/send buffer capacity
    pub fn with_io_buffer_size(mut self, size: usize) -> Self {
        self.io_buffer_size = size;
        self
    }

    /// Set the maximum line length
    pub fn with_line_len(mut self, len: usize) -> Self {
        self.line_len = len;
        self
    }

    /// Set the connection limit
    pub fn with_max_connections(mut self, max: usize) -> Self {
        self.max_connections = max;
        self
    }

    /// Set the greeting banner
    pub fn with_banner(mut self, banner: impl Into<String>) -> Self {
        self.banner = banner.into();
        self
    }

    /// Set the prompt string
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    /// Check the buffer geometry.
    ///
    /// The send buffer must hold at least one worst-case line plus the spare
    /// byte used for CRLF expansion.
    pub fn validate(&self) -> Result<()> {
        if self.line_len < 2 {
            return Err(TelnetError::InvalidConfig(format!(
                "line_len must be at least 2, got {}",
                self.line_len
            )));
        }
        if self.io_buffer_size <= self.line_len + 1 {
            return Err(TelnetError::InvalidConfig(format!(
                "io_buffer_size ({}) must exceed line_len + 1 ({})",
                self.io_buffer_size,
                self.line_len + 1
            )));
        }
        if self.max_connections == 0 {
            return Err(TelnetError::InvalidConfig(
                "max_connections must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
