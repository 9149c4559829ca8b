//! Character sources feeding the lexer
//!
//! A source hands out one decoded character at a time with a single character
//! of lookahead, and tracks the position of the next unread character. End of
//! input is `Ok(None)`; read failures and malformed UTF-8 are `Err`.

use crate::error::{LexError, Position};
use smallvec::SmallVec;
use std::io::{self, BufRead};

/// One-character-lookahead view over decoded input
pub trait CharSource {
    /// Returns the next character without consuming it
    fn peek(&mut self) -> Result<Option<char>, LexError>;

    /// Consumes and returns the next character
    fn advance(&mut self) -> Result<Option<char>, LexError>;

    /// Position of the next unread character
    fn position(&self) -> Position;
}

/// Source over an in-memory string
#[derive(Debug, Clone)]
pub struct StrSource<'a> {
    input: &'a str,
    position: Position,
}

impl<'a> StrSource<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            position: Position::new(),
        }
    }

    #[inline(always)]
    fn peek_char(&self) -> Option<char> {
        self.input[self.position.offset..].chars().next()
    }
}

impl CharSource for StrSource<'_> {
    #[inline]
    fn peek(&mut self) -> Result<Option<char>, LexError> {
        Ok(self.peek_char())
    }

    #[inline]
    fn advance(&mut self) -> Result<Option<char>, LexError> {
        let ch = self.peek_char();
        if let Some(ch) = ch {
            self.position.advance(ch);
        }
        Ok(ch)
    }

    fn position(&self) -> Position {
        self.position
    }
}

/// Source decoding UTF-8 from any buffered byte reader
///
/// Characters are decoded one at a time, so a multi-byte sequence split across
/// two reads of the underlying reader is handled transparently.
pub struct ReaderSource<R: BufRead> {
    /// Buffered reader for input
    reader: R,
    /// Decoded lookahead; `Some(None)` caches end of input
    lookahead: Option<Option<char>>,
    /// Position of the next unread character
    position: Position,
}

impl<R: BufRead> ReaderSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            lookahead: None,
            position: Position::new(),
        }
    }

    /// Consumes the source, returning the reader
    pub fn into_inner(self) -> R {
        self.reader
    }

    fn next_byte(&mut self) -> io::Result<Option<u8>> {
        loop {
            let buf = match self.reader.fill_buf() {
                Ok(buf) => buf,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            let Some(&byte) = buf.first() else {
                return Ok(None);
            };
            self.reader.consume(1);
            return Ok(Some(byte));
        }
    }

    fn decode_char(&mut self) -> io::Result<Option<char>> {
        let Some(first) = self.next_byte()? else {
            return Ok(None);
        };

        let expected_len = match first {
            0x00..=0x7F => return Ok(Some(first as char)),
            0b11000000..=0b11011111 => 2, // 110xxxxx
            0b11100000..=0b11101111 => 3, // 1110xxxx
            0b11110000..=0b11110111 => 4, // 11110xxx
            _ => return Err(invalid_utf8(format!("invalid UTF-8 lead byte 0x{:02x}", first))),
        };

        let mut bytes: SmallVec<[u8; 4]> = SmallVec::new();
        bytes.push(first);
        while bytes.len() < expected_len {
            match self.next_byte()? {
                Some(byte) if byte & 0b11000000 == 0b10000000 => bytes.push(byte),
                Some(byte) => {
                    return Err(invalid_utf8(format!(
                        "invalid UTF-8 continuation byte 0x{:02x}",
                        byte
                    )));
                }
                None => return Err(invalid_utf8("truncated UTF-8 sequence at end of input")),
            }
        }

        // Rejects overlong encodings, surrogates and code points past U+10FFFF
        match std::str::from_utf8(&bytes) {
            Ok(decoded) => Ok(decoded.chars().next()),
            Err(_) => Err(invalid_utf8("invalid UTF-8 sequence")),
        }
    }
}

fn invalid_utf8(message: impl Into<String>) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, message.into())
}

impl<R: BufRead> CharSource for ReaderSource<R> {
    fn peek(&mut self) -> Result<Option<char>, LexError> {
        if let Some(cached) = self.lookahead {
            return Ok(cached);
        }
        let decoded = self
            .decode_char()
            .map_err(|e| LexError::io(e, self.position))?;
        self.lookahead = Some(decoded);
        Ok(decoded)
    }

    fn advance(&mut self) -> Result<Option<char>, LexError> {
        let ch = self.peek()?;
        if let Some(ch) = ch {
            self.position.advance(ch);
            self.lookahead = None;
        }
        Ok(ch)
    }

    fn position(&self) -> Position {
        self.position
    }
}
