use std::collections::VecDeque;

use crate::byte_buffer::ByteBuffer;

/// The 64-character alphabet of RFC 4648.
pub const BASE64_ALPHABET: &[u8; 64] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

/// Padding symbol appended when the byte count is not a multiple of three.
pub const PAD_SYMBOL: u8 = b'=';

fn symbol(sextet: u32) -> char {
    char::from(BASE64_ALPHABET[(sextet & 0x3F) as usize])
}

fn sextet(symbol: u8) -> Option<u32> {
    match symbol {
        b'A'..=b'Z' => Some(u32::from(symbol - b'A')),
        b'a'..=b'z' => Some(u32::from(symbol - b'a') + 26),
        b'0'..=b'9' => Some(u32::from(symbol - b'0') + 52),
        b'+' => Some(62),
        b'/' => Some(63),
        _ => None,
    }
}

/// Converts a pushed byte stream into chunked base64 text. Input is staged
/// through a [`ByteBuffer`], consumed three bytes at a time, and emitted as
/// chunks no longer than the configured maximum, available through
/// `has_chunk()`/`pop_chunk()`.
pub struct Base64Encoder {
    input: ByteBuffer,
    flipped: bool,
    chunks: VecDeque<String>,
    current: String,
    max_chunk_len: usize,
}

impl Base64Encoder {
    pub fn new(max_chunk_len: usize) -> Self {
        if max_chunk_len == 0 {
            panic!("can't chunk encoder output to a maximum length of 0");
        }
        Self {
            input: ByteBuffer::new(),
            flipped: false,
            chunks: VecDeque::new(),
            current: String::new(),
            max_chunk_len,
        }
    }

    pub fn write_byte(&mut self, value: u8) {
        self.input.write_byte(value);
    }

    pub fn write_short(&mut self, value: u16) {
        self.input.write_short(value);
    }

    pub fn write_int(&mut self, value: i32) {
        self.input.write_int(value);
    }

    /// Consumes all buffered bytes into chunked output, padding the final
    /// group per RFC 4648.
    pub fn encode(&mut self) {
        while !self.encode_step(64) {}
    }

    /// Encodes up to `max_groups` three-byte groups. Returns true once all
    /// buffered input has been consumed and the final chunk flushed; the
    /// bounded slice keeps one encode from monopolizing a scheduling step.
    pub fn encode_step(&mut self, max_groups: usize) -> bool {
        if !self.flipped {
            self.input.flip();
            self.flipped = true;
        }
        let mut groups = 0;
        while groups < max_groups {
            let remaining = self.input.remaining();
            if remaining == 0 {
                if !self.current.is_empty() {
                    self.chunks.push_back(std::mem::take(&mut self.current));
                }
                return true;
            }
            match remaining {
                1 => {
                    let group = u32::from(self.input.read_byte()) << 16;
                    self.push_symbol(symbol(group >> 18));
                    self.push_symbol(symbol(group >> 12));
                    self.push_symbol(char::from(PAD_SYMBOL));
                    self.push_symbol(char::from(PAD_SYMBOL));
                }
                2 => {
                    let group = (u32::from(self.input.read_byte()) << 16)
                        | (u32::from(self.input.read_byte()) << 8);
                    self.push_symbol(symbol(group >> 18));
                    self.push_symbol(symbol(group >> 12));
                    self.push_symbol(symbol(group >> 6));
                    self.push_symbol(char::from(PAD_SYMBOL));
                }
                _ => {
                    let group = (u32::from(self.input.read_byte()) << 16)
                        | (u32::from(self.input.read_byte()) << 8)
                        | u32::from(self.input.read_byte());
                    self.push_symbol(symbol(group >> 18));
                    self.push_symbol(symbol(group >> 12));
                    self.push_symbol(symbol(group >> 6));
                    self.push_symbol(symbol(group));
                }
            }
            groups += 1;
        }
        false
    }

    fn push_symbol(&mut self, value: char) {
        self.current.push(value);
        if self.current.len() == self.max_chunk_len {
            self.chunks.push_back(std::mem::take(&mut self.current));
        }
    }

    pub fn has_chunk(&self) -> bool {
        !self.chunks.is_empty()
    }

    pub fn pop_chunk(&mut self) -> Option<String> {
        self.chunks.pop_front()
    }
}

/// Converts pushed base64 chunks back into a byte stream. Characters
/// outside the alphabet, padding included, contribute zero bits and produce
/// no output bytes themselves: a group of four with `n` valid symbols emits
/// `n - 1` bytes. Unknown characters never error.
pub struct Base64Decoder {
    pending: VecDeque<u8>,
    output: ByteBuffer,
}

impl Base64Decoder {
    pub fn new() -> Self {
        Self {
            pending: VecDeque::new(),
            output: ByteBuffer::new(),
        }
    }

    /// Accepts the next chunk. Chunks must arrive in encode order.
    pub fn push_chunk(&mut self, chunk: &str) {
        self.pending.extend(chunk.bytes());
    }

    /// Consumes all pushed characters into the output byte stream.
    pub fn decode(&mut self) {
        while !self.decode_step(64) {}
    }

    /// Decodes up to `max_groups` four-character groups. Returns true once
    /// all pushed input has been consumed.
    pub fn decode_step(&mut self, max_groups: usize) -> bool {
        let mut groups = 0;
        while groups < max_groups {
            if self.pending.is_empty() {
                return true;
            }
            let mut group: u32 = 0;
            let mut valid = 0usize;
            for position in 0..4 {
                if let Some(bits) = self.pending.pop_front().and_then(sextet) {
                    group |= bits << (18 - 6 * position);
                    valid += 1;
                }
            }
            let emit = valid.saturating_sub(1);
            if emit >= 1 {
                self.output.write_byte((group >> 16) as u8);
            }
            if emit >= 2 {
                self.output.write_byte((group >> 8) as u8);
            }
            if emit >= 3 {
                self.output.write_byte(group as u8);
            }
            groups += 1;
        }
        self.pending.is_empty()
    }

    /// Hands over the decoded byte stream, flipped and ready to read.
    pub fn take_output(&mut self) -> ByteBuffer {
        let mut output = std::mem::take(&mut self.output);
        output.flip();
        output
    }
}

impl Default for Base64Decoder {
    fn default() -> Self {
        Self::new()
    }
}
