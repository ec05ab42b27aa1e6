use std::collections::VecDeque;

use groupcast_serde::{Base64Decoder, Base64Encoder};

use super::error::StringCodecError;
use crate::staging::buffer::StagingBuffer;

/// Bridges the staging buffer's string sequence to the scalar-only
/// transport. Outbound, every string becomes a 2-byte length prefix plus
/// its UTF-8 bytes in one concatenated stream; the stream runs through the
/// base64 encoder and each resulting character travels as an integer.
/// Inbound, received integers feed the decoder and the reconstructed
/// strings are appended back onto a staging buffer.
pub struct StringCodecAdapter {
    encoder: Base64Encoder,
    decoder: Base64Decoder,
    outgoing: VecDeque<i32>,
    incoming: String,
    max_chunk_len: usize,
}

impl StringCodecAdapter {
    pub fn new(max_chunk_len: usize) -> Self {
        Self {
            encoder: Base64Encoder::new(max_chunk_len),
            decoder: Base64Decoder::new(),
            outgoing: VecDeque::new(),
            incoming: String::new(),
            max_chunk_len,
        }
    }

    // Outbound

    /// Drains every unread string from `staging` (which must be readable)
    /// into the encoded character stream. Returns the total number of
    /// encoded characters; that count is part of the metadata every
    /// participant adopts.
    pub fn encode_strings(&mut self, staging: &mut StagingBuffer) -> Result<u32, StringCodecError> {
        while staging.has_string() {
            let string = staging.try_read_string()?;
            let bytes = string.as_bytes();
            if bytes.len() > usize::from(u16::MAX) {
                return Err(StringCodecError::StringTooLong {
                    length: bytes.len(),
                    limit: usize::from(u16::MAX),
                });
            }
            self.encoder.write_short(bytes.len() as u16);
            for &byte in bytes {
                self.encoder.write_byte(byte);
            }
        }
        self.encoder.encode();
        while let Some(chunk) = self.encoder.pop_chunk() {
            for symbol in chunk.bytes() {
                self.outgoing.push_back(i32::from(symbol));
            }
        }
        Ok(self.outgoing.len() as u32)
    }

    pub fn has_outgoing(&self) -> bool {
        !self.outgoing.is_empty()
    }

    /// Next encoded character to transmit, in stream order.
    pub fn pop_char(&mut self) -> Option<i32> {
        self.outgoing.pop_front()
    }

    // Inbound

    /// Accepts one delivered character. Values outside the ASCII range can
    /// never be alphabet symbols; they are folded to a placeholder the
    /// decoder ignores.
    pub fn push_char(&mut self, value: i32) {
        let byte = u8::try_from(value)
            .ok()
            .filter(u8::is_ascii)
            .unwrap_or(0);
        self.incoming.push(char::from(byte));
        if self.incoming.len() == self.max_chunk_len {
            self.decoder.push_chunk(&self.incoming);
            self.incoming.clear();
        }
    }

    /// Finishes decoding and appends every reconstructed string onto
    /// `staging` (which must be writable), in stream order.
    pub fn decode_into(&mut self, staging: &mut StagingBuffer) -> Result<(), StringCodecError> {
        if !self.incoming.is_empty() {
            self.decoder.push_chunk(&self.incoming);
            self.incoming.clear();
        }
        self.decoder.decode();
        let mut bytes = self.decoder.take_output();
        while bytes.remaining() >= 2 {
            let length = usize::from(bytes.read_short());
            // a truncated tail yields a shorter final string rather than a panic
            let take = length.min(bytes.remaining());
            let mut utf8 = Vec::with_capacity(take);
            for _ in 0..take {
                utf8.push(bytes.read_byte());
            }
            staging.try_write_string(String::from_utf8_lossy(&utf8).into_owned())?;
        }
        Ok(())
    }
}
