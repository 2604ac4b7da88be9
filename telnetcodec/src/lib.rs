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

//! # Telshell Telnet Decoder
//!
//! This crate strips Telnet (RFC 854) command sequences out of a shell's input
//! stream and answers every option request with a refusal.
//!
//! ## Overview
//!
//! A shell front-end never enters a negotiated mode. It only needs to:
//!
//! - pass ordinary bytes through to the line assembler,
//! - turn `IAC IAC` back into a literal `0xFF`,
//! - reply `DONT` to `WILL`/`WONT` and `WONT` to `DO`/`DONT`,
//! - silently drop any other command byte following `IAC`.
//!
//! ## Core Components
//!
//! ### [`DecoderState`]
//!
//! The seven states of the negotiation machine. [`DecoderState::step`] is a
//! pure transition function.
//!
//! ### [`TelnetCodec`]
//!
//! Holds the state for one connection and implements [`Decoder`] and
//! `Encoder<NegotiationReply>` from `tokio_util::codec`.
//!
//! ## Usage Example
//!
//! ```rust
//! use telshell_telnetcodec::{DecodeAction, NegotiationReply, Refusal, TelnetCodec, consts};
//!
//! let mut codec = TelnetCodec::new();
//! let actions: Vec<_> = [consts::IAC, consts::DO, consts::option::ECHO, b'l', b's']
//!     .into_iter()
//!     .map(|byte| codec.decode_byte(byte))
//!     .collect();
//!
//! assert_eq!(
//!     actions,
//!     vec![
//!         DecodeAction::NoOp,
//!         DecodeAction::NoOp,
//!         DecodeAction::Negotiate(NegotiationReply::new(Refusal::Wont, consts::option::ECHO)),
//!         DecodeAction::Emit(b'l'),
//!         DecodeAction::Emit(b's'),
//!     ]
//! );
//! ```
//!
//! [`Decoder`]: tokio_util::codec::Decoder

#![warn(
    clippy::cargo,
    missing_docs,
    clippy::pedantic,
    future_incompatible,
    rust_2018_idioms
)]
#![allow(
    clippy::option_if_let_else,
    clippy::module_name_repetitions,
    clippy::missing_errors_doc
)]

mod codec;
pub mod consts;
mod event;
mod result;

pub use self::codec::{DecoderState, TelnetCodec};
pub use self::event::{DecodeAction, NegotiationReply, Refusal};
pub use self::result::{CodecError, CodecResult};
