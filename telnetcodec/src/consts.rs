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

//! Telnet command bytes (RFC 854) and line control characters.

/// Carriage Return
pub const CR: u8 = 0x0D;
/// Line Feed
pub const LF: u8 = 0x0A;

/// End of subnegotiation parameters.
pub const SE: u8 = 240;
/// No operation.
pub const NOP: u8 = 241;
/// Subnegotiation of the indicated option follows.
pub const SB: u8 = 250;
/// Sender wants to begin performing, or confirms it is performing, the option.
pub const WILL: u8 = 251;
/// Sender refuses to perform, or to continue performing, the option.
pub const WONT: u8 = 252;
/// Sender requests that the receiver perform the option.
pub const DO: u8 = 253;
/// Sender demands that the receiver stop performing the option.
pub const DONT: u8 = 254;
/// Interpret As Command
pub const IAC: u8 = 255;

/// Commonly negotiated options, used by tests and diagnostics only. The
/// decoder refuses every option without looking at its value.
pub mod option {
    /// Binary Transmission (RFC 856)
    pub const BINARY: u8 = 0;
    /// Echo (RFC 857)
    pub const ECHO: u8 = 1;
    /// Suppress Go Ahead (RFC 858)
    pub const SGA: u8 = 3;
    /// Terminal Type (RFC 1091)
    pub const TTYPE: u8 = 24;
    /// Negotiate About Window Size (RFC 1073)
    pub const NAWS: u8 = 31;
    /// Linemode (RFC 1184)
    pub const LINEMODE: u8 = 34;
}
