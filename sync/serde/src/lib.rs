//! # Groupcast Serde
//! Byte-level serialization shared by the groupcast crates: a word-cell
//! byte buffer and a chunked, permissive base64 codec built on top of it.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

mod base64;
mod byte_buffer;
mod error;

pub use base64::{Base64Decoder, Base64Encoder, BASE64_ALPHABET, PAD_SYMBOL};
pub use byte_buffer::ByteBuffer;
pub use error::SerdeError;
