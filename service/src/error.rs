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

//! Error types for the Telnet shell service

use thiserror::Error;

/// Result type for operations
pub type Result<T> = std::result::Result<T, TelnetError>;

/// Telnet shell error types
///
/// Buffer overflows and unknown negotiation bytes are handled in place and
/// never surface here. Misuse of reference counts or redirect pairing is a
/// programming error and panics instead of producing a variant.
#[derive(Debug, Error)]
pub enum TelnetError {
    /// I/O error from the socket or a redirect destination
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Protocol error from the codec layer
    #[error("Protocol error: {0}")]
    Protocol(#[from] telshell_telnetcodec::CodecError),

    /// Console output requested from a session that has no network connection
    #[error("Session is not attached to a connection")]
    Detached,

    /// Configuration rejected by validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Maximum number of connections reached
    #[error("Maximum connections ({0}) reached")]
    MaxConnectionsReached(usize),

    /// Server is not running
    #[error("Server not running")]
    ServerNotRunning,

    /// Generic error with a message
    #[error("{0}")]
    Other(String),
}

impl TelnetError {
    /// Check if the error ends the connection it occurred on
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            TelnetError::Io(_) | TelnetError::Protocol(_) | TelnetError::Detached
        )
    }
}
