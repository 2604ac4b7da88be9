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

use super::{CodecError, DecodeAction, NegotiationReply, Refusal, consts};
use bytes::{Buf, BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};
use tracing::trace;

///
/// Represents the internal state of the Telnet decoder.
///
/// Transitions are a pure function of the current state and the next byte,
/// see [`DecoderState::step`].
///
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DecoderState {
    /// Normal Data
    #[default]
    Normal,
    /// Received IAC, Next byte is Command
    SawIac,
    /// Received WILL Command, Next Byte is the option
    SawWill,
    /// Received WONT Command, Next Byte is the option
    SawWont,
    /// Received DO Command, Next Byte is the option
    SawDo,
    /// Received DONT Command, Next Byte is the option
    SawDont,
    /// Session is shutting down. Absorbs every further byte.
    Closing,
}

impl DecoderState {
    /// Advance the state machine by one byte.
    ///
    /// Every option is refused: WILL and WONT are answered with DONT, DO and
    /// DONT are answered with WONT. A command byte that is not a negotiation
    /// verb (NOP, SB, GA, ...) silently returns to [`DecoderState::Normal`].
    pub fn step(self, byte: u8) -> (DecoderState, DecodeAction) {
        match (self, byte) {
            (DecoderState::Normal, consts::IAC) => (DecoderState::SawIac, DecodeAction::NoOp),
            (DecoderState::Normal, _) => (DecoderState::Normal, DecodeAction::Emit(byte)),
            (DecoderState::SawIac, consts::IAC) => {
                (DecoderState::Normal, DecodeAction::Emit(consts::IAC))
            }
            (DecoderState::SawIac, consts::WILL) => (DecoderState::SawWill, DecodeAction::NoOp),
            (DecoderState::SawIac, consts::WONT) => (DecoderState::SawWont, DecodeAction::NoOp),
            (DecoderState::SawIac, consts::DO) => (DecoderState::SawDo, DecodeAction::NoOp),
            (DecoderState::SawIac, consts::DONT) => (DecoderState::SawDont, DecodeAction::NoOp),
            (DecoderState::SawIac, _) => {
                trace!("Ignoring Telnet command {:#X}", byte);
                (DecoderState::Normal, DecodeAction::NoOp)
            }
            (DecoderState::SawWill | DecoderState::SawWont, _) => (
                DecoderState::Normal,
                DecodeAction::Negotiate(NegotiationReply::new(Refusal::Dont, byte)),
            ),
            (DecoderState::SawDo | DecoderState::SawDont, _) => (
                DecoderState::Normal,
                DecodeAction::Negotiate(NegotiationReply::new(Refusal::Wont, byte)),
            ),
            (DecoderState::Closing, _) => (DecoderState::Closing, DecodeAction::CloseRequested),
        }
    }
}

/// A codec that strips Telnet negotiation out of a shell's input stream.
///
/// `TelnetCodec` holds exactly one [`DecoderState`] per connection and is
/// not meant to be shared between connections. Bytes can be fed one at a
/// time through [`TelnetCodec::decode_byte`] or in bulk through the
/// [`Decoder`] implementation, which skips [`DecodeAction::NoOp`].
///
/// Refusals are encoded through `Encoder<NegotiationReply>` as the three
/// byte sequence `IAC <DONT|WONT> <option>`.
#[derive(Clone, Debug, Default)]
pub struct TelnetCodec {
    decoder_state: DecoderState,
}

impl TelnetCodec {
    /// Creates a new instance of `TelnetCodec` in [`DecoderState::Normal`].
    ///
    /// # Example
    /// ```
    /// use telshell_telnetcodec::{DecoderState, TelnetCodec};
    ///
    /// let codec = TelnetCodec::new();
    /// assert_eq!(codec.state(), DecoderState::Normal);
    /// ```
    pub fn new() -> TelnetCodec {
        TelnetCodec::default()
    }

    /// Current decoder state.
    pub fn state(&self) -> DecoderState {
        self.decoder_state
    }

    /// Feed a single byte and return what the caller must do with it.
    pub fn decode_byte(&mut self, byte: u8) -> DecodeAction {
        let (next, action) = self.decoder_state.step(byte);
        self.decoder_state = next;
        action
    }

    /// Force the decoder into [`DecoderState::Closing`].
    pub fn close(&mut self) {
        self.decoder_state = DecoderState::Closing;
    }

    /// Whether the decoder has been told to close.
    pub fn is_closing(&self) -> bool {
        self.decoder_state == DecoderState::Closing
    }
}

impl Decoder for TelnetCodec {
    type Item = DecodeAction;
    type Error = CodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<DecodeAction>, Self::Error> {
        while src.has_remaining() {
            match self.decode_byte(src.get_u8()) {
                DecodeAction::NoOp => continue,
                action => return Ok(Some(action)),
            }
        }
        Ok(None)
    }
}

impl Encoder<NegotiationReply> for TelnetCodec {
    type Error = CodecError;

    fn encode(&mut self, item: NegotiationReply, dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.reserve(3);
        dst.put_slice(&item.to_bytes());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ============================================================================
    // Helper Functions
    // ============================================================================

    fn collect_all(codec: &mut TelnetCodec, mut src: BytesMut) -> Vec<DecodeAction> {
        let mut out = Vec::new();
        while let Some(action) = codec.decode(&mut src).expect("decode should not error") {
            out.push(action);
        }
        out
    }

    fn refusal(verb: Refusal, option: u8) -> DecodeAction {
        DecodeAction::Negotiate(NegotiationReply::new(verb, option))
    }

    // ============================================================================
    // State Transitions
    // ============================================================================

    #[test]
    fn normal_passes_data_through() {
        assert_eq!(
            DecoderState::Normal.step(b'x'),
            (DecoderState::Normal, DecodeAction::Emit(b'x'))
        );
    }

    #[test]
    fn normal_iac_enters_command() {
        assert_eq!(
            DecoderState::Normal.step(consts::IAC),
            (DecoderState::SawIac, DecodeAction::NoOp)
        );
    }

    #[test]
    fn iac_iac_is_escaped_literal() {
        assert_eq!(
            DecoderState::SawIac.step(consts::IAC),
            (DecoderState::Normal, DecodeAction::Emit(consts::IAC))
        );
    }

    #[test]
    fn iac_verbs_select_negotiation_state() {
        assert_eq!(DecoderState::SawIac.step(consts::WILL).0, DecoderState::SawWill);
        assert_eq!(DecoderState::SawIac.step(consts::WONT).0, DecoderState::SawWont);
        assert_eq!(DecoderState::SawIac.step(consts::DO).0, DecoderState::SawDo);
        assert_eq!(DecoderState::SawIac.step(consts::DONT).0, DecoderState::SawDont);
    }

    #[test]
    fn iac_unknown_command_resynchronises() {
        for byte in [consts::NOP, consts::SB, consts::SE, 0x00, b'a'] {
            assert_eq!(
                DecoderState::SawIac.step(byte),
                (DecoderState::Normal, DecodeAction::NoOp)
            );
        }
    }

    #[test]
    fn will_and_wont_are_refused_with_dont() {
        assert_eq!(
            DecoderState::SawWill.step(consts::option::ECHO),
            (DecoderState::Normal, refusal(Refusal::Dont, consts::option::ECHO))
        );
        assert_eq!(
            DecoderState::SawWont.step(consts::option::SGA),
            (DecoderState::Normal, refusal(Refusal::Dont, consts::option::SGA))
        );
    }

    #[test]
    fn do_and_dont_are_refused_with_wont() {
        assert_eq!(
            DecoderState::SawDo.step(consts::option::NAWS),
            (DecoderState::Normal, refusal(Refusal::Wont, consts::option::NAWS))
        );
        assert_eq!(
            DecoderState::SawDont.step(consts::option::BINARY),
            (DecoderState::Normal, refusal(Refusal::Wont, consts::option::BINARY))
        );
    }

    #[test]
    fn closing_absorbs_everything() {
        for byte in [b'a', consts::IAC, consts::DO] {
            assert_eq!(
                DecoderState::Closing.step(byte),
                (DecoderState::Closing, DecodeAction::CloseRequested)
            );
        }
    }

    // ============================================================================
    // Codec
    // ============================================================================

    #[test]
    fn decode_skips_noops() {
        let mut codec = TelnetCodec::new();
        let actions = collect_all(
            &mut codec,
            BytesMut::from(&[consts::IAC, consts::DO, 1, b'h', b'i'][..]),
        );
        assert_eq!(
            actions,
            vec![
                refusal(Refusal::Wont, 1),
                DecodeAction::Emit(b'h'),
                DecodeAction::Emit(b'i'),
            ]
        );
        assert_eq!(codec.state(), DecoderState::Normal);
    }

    #[test]
    fn decode_partial_negotiation_keeps_state() {
        let mut codec = TelnetCodec::new();
        let first = collect_all(&mut codec, BytesMut::from(&[consts::IAC, consts::WILL][..]));
        assert!(first.is_empty());
        assert_eq!(codec.state(), DecoderState::SawWill);

        let second = collect_all(&mut codec, BytesMut::from(&[consts::option::TTYPE][..]));
        assert_eq!(second, vec![refusal(Refusal::Dont, consts::option::TTYPE)]);
    }

    #[test]
    fn close_forces_closing() {
        let mut codec = TelnetCodec::new();
        codec.close();
        assert!(codec.is_closing());
        assert_eq!(codec.decode_byte(b'a'), DecodeAction::CloseRequested);
        assert!(codec.is_closing());
    }

    #[test]
    fn encode_reply_is_three_bytes() {
        let mut codec = TelnetCodec::new();
        let mut dst = BytesMut::new();
        codec
            .encode(NegotiationReply::new(Refusal::Wont, consts::option::ECHO), &mut dst)
            .expect("encode ok");
        assert_eq!(&dst[..], &[consts::IAC, consts::WONT, consts::option::ECHO]);
    }
}
