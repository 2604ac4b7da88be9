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

//! Fixed-capacity line assembly

use telshell_telnetcodec::consts;

/// Accumulates shell input into a fixed-size line buffer.
///
/// Carriage returns are dropped. A line completes on LF, or as soon as
/// `capacity - 1` bytes are stored, so no client can push a line past the
/// buffer. The cursor always stays within `[0, capacity)`.
#[derive(Debug, Clone)]
pub struct LineBuffer {
    buffer: Box<[u8]>,
    cursor: usize,
}

impl LineBuffer {
    /// Create a line buffer holding `line_len` bytes.
    ///
    /// # Panics
    ///
    /// Panics if `line_len < 2`; [`crate::ShellConfig::validate`] rejects such
    /// configurations before a buffer is ever built.
    pub fn new(line_len: usize) -> Self {
        assert!(line_len >= 2, "line buffer needs room for a byte and a terminator");
        Self {
            buffer: vec![0; line_len].into_boxed_slice(),
            cursor: 0,
        }
    }

    /// Total capacity, including the terminator slot
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Number of bytes stored for the line in progress
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Feed one byte of shell input, returning the completed line if any.
    ///
    /// The terminating LF is not part of the returned line. Input is decoded
    /// as lossy UTF-8.
    pub fn feed(&mut self, byte: u8) -> Option<String> {
        match byte {
            consts::CR => None,
            consts::LF => Some(self.complete()),
            _ => {
                self.buffer[self.cursor] = byte;
                self.cursor += 1;
                if self.cursor == self.buffer.len() - 1 {
                    Some(self.complete())
                } else {
                    None
                }
            }
        }
    }

    /// Raw storage of the line buffer for in-place editing by built-ins.
    ///
    /// After a line completes, the bytes of that line remain here followed by
    /// a NUL terminator until new input overwrites them.
    pub fn as_mut_bytes(&mut self) -> &mut [u8] {
        &mut self.buffer
    }

    /// Discard the line in progress
    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    fn complete(&mut self) -> String {
        let len = self.cursor;
        if len > 0 {
            self.buffer[len] = 0;
        }
        self.cursor = 0;
        String::from_utf8_lossy(&self.buffer[..len]).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed_all(line: &mut LineBuffer, input: &[u8]) -> Vec<String> {
        input.iter().filter_map(|byte| line.feed(*byte)).collect()
    }

    #[test]
    fn test_newline_completes_line() {
        let mut line = LineBuffer::new(80);
        assert_eq!(feed_all(&mut line, b"help\n"), vec!["help".to_string()]);
        assert_eq!(line.cursor(), 0);
    }

    #[test]
    fn test_carriage_returns_are_stripped() {
        let mut line = LineBuffer::new(80);
        assert_eq!(feed_all(&mut line, b"abc\r\r\ndef"), vec!["abc".to_string()]);
        assert_eq!(line.cursor(), 3);
        assert_eq!(feed_all(&mut line, b"\n"), vec!["def".to_string()]);
    }

    #[test]
    fn test_empty_line_is_dispatched() {
        let mut line = LineBuffer::new(80);
        assert_eq!(feed_all(&mut line, b"\r\n"), vec![String::new()]);
    }

    #[test]
    fn test_full_line_dispatches_without_newline() {
        let mut line = LineBuffer::new(8);
        let input = [b'x'; 7];
        assert_eq!(feed_all(&mut line, &input), vec!["xxxxxxx".to_string()]);
        assert_eq!(line.cursor(), 0);
    }

    #[test]
    fn test_short_line_waits_for_newline() {
        let mut line = LineBuffer::new(8);
        assert!(feed_all(&mut line, &[b'x'; 6]).is_empty());
        assert_eq!(line.cursor(), 6);
        assert_eq!(feed_all(&mut line, b"y"), vec!["xxxxxxy".to_string()]);
    }

    #[test]
    fn test_overlong_input_is_split() {
        let mut line = LineBuffer::new(4);
        assert_eq!(
            feed_all(&mut line, b"abcdefg\n"),
            vec!["abc".to_string(), "def".to_string(), "g".to_string()]
        );
    }

    #[test]
    fn test_completed_line_is_terminated_in_place() {
        let mut line = LineBuffer::new(16);
        feed_all(&mut line, b"ls\n");
        assert_eq!(&line.as_mut_bytes()[..3], b"ls\0");
    }

    #[test]
    fn test_cursor_never_reaches_capacity() {
        let mut line = LineBuffer::new(3);
        for byte in b"abcdefghij" {
            line.feed(*byte);
            assert!(line.cursor() < line.capacity());
        }
    }
}
