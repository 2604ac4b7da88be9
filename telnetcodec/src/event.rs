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

use crate::consts;

///
/// The negative verb sent back for every option request. The shell never
/// enters a negotiated mode, so only the refusal polarity is ever encoded.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Refusal {
    /// `IAC DONT <option>`, the answer to WILL and WONT.
    Dont,
    /// `IAC WONT <option>`, the answer to DO and DONT.
    Wont,
}

impl Refusal {
    /// Command byte for this refusal.
    pub fn to_u8(self) -> u8 {
        match self {
            Refusal::Dont => consts::DONT,
            Refusal::Wont => consts::WONT,
        }
    }
}

///
/// A complete refusal reply for a single option.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NegotiationReply {
    /// Negative verb to send.
    pub verb: Refusal,
    /// Option byte echoed back unchanged.
    pub option: u8,
}

impl NegotiationReply {
    /// Create a reply for `option`.
    pub fn new(verb: Refusal, option: u8) -> Self {
        NegotiationReply { verb, option }
    }

    /// Wire form of the reply: `IAC, <DONT|WONT>, option`.
    pub fn to_bytes(self) -> [u8; 3] {
        [consts::IAC, self.verb.to_u8(), self.option]
    }
}

///
/// `DecodeAction` is the outcome of feeding one byte to the decoder.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecodeAction {
    /// Ordinary shell input, including an escaped `IAC IAC` literal.
    Emit(u8),
    /// Option negotiation finished and must be refused on the wire.
    Negotiate(NegotiationReply),
    /// Byte consumed as part of a command sequence.
    NoOp,
    /// The decoder is closing; the session should wind down.
    CloseRequested,
}
