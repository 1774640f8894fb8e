//! codec/base64.rs
//! Streaming Base64 (RFC 4648, standard or URL-safe alphabet).
//!
//! Design notes:
//! - Encoding pulls plaintext in multiples of 3 bytes, so every non-final
//!   chunk maps to whole 4-character groups and `=` padding can only appear
//!   after the final chunk. Output is identical for every chunk size.
//! - Decoding pulls the encoded length of that plaintext chunk, so whole
//!   4-character groups are always decoded together. Padding on the final
//!   group is optional.

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::codec::reader::CodecReader;
use crate::codec::types::{ChunkTransform, Codec, CodecFactory, Direction};
use crate::constants::{DEFAULT_BASE64_CHUNK_SIZE, MAX_CHUNK_SIZE};
use crate::reader::base::{new_invalid_reader, DataReader};
use crate::types::StreamError;

const ENGINE_CONFIG: GeneralPurposeConfig = GeneralPurposeConfig::new()
    .with_encode_padding(true)
    .with_decode_padding_mode(DecodePaddingMode::Indifferent);

const STANDARD_ENGINE: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, ENGINE_CONFIG);
const URL_SAFE_ENGINE: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, ENGINE_CONFIG);

/// Base64 codec settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Base64Config {
    /// Plaintext bytes per chunk. Rounded down to a multiple of 3; values
    /// below 3 select the default.
    pub chunk_size: usize,
    /// Use the URL/filename-safe alphabet (`-` and `_`).
    pub websafe: bool,
}

impl Default for Base64Config {
    fn default() -> Self {
        Self { chunk_size: DEFAULT_BASE64_CHUNK_SIZE, websafe: false }
    }
}

impl Base64Config {
    pub fn new(chunk_size: usize, websafe: bool) -> Self {
        Self { chunk_size, websafe }
    }

    pub fn validate(&self) -> Result<(), StreamError> {
        if self.chunk_size > MAX_CHUNK_SIZE {
            return Err(StreamError::InvalidArgument(format!(
                "base64 chunk size too large: {} > {}",
                self.chunk_size, MAX_CHUNK_SIZE
            )));
        }
        Ok(())
    }

    /// Plaintext chunk size actually used: a positive multiple of 3.
    pub fn plain_chunk_size(&self) -> usize {
        let size = if self.chunk_size < 3 { DEFAULT_BASE64_CHUNK_SIZE } else { self.chunk_size };
        size - size % 3
    }

    /// Encoded length of one full plaintext chunk.
    pub fn encoded_chunk_size(&self) -> Result<usize, StreamError> {
        let plain = self.plain_chunk_size();
        base64::encoded_len(plain, true)
            .ok_or_else(|| StreamError::InvalidArgument(format!("base64 chunk size overflows: {plain}")))
    }

    /// (source chunk size, output buffer size) for a reader in `direction`.
    pub fn reader_sizes(&self, direction: Direction) -> Result<(usize, usize), StreamError> {
        self.validate()?;
        let plain = self.plain_chunk_size();
        let encoded = self.encoded_chunk_size()?;
        Ok(match direction {
            Direction::Encode => (plain, encoded),
            Direction::Decode => (encoded, plain),
        })
    }
}

/// Stateless per-chunk Base64 transform.
#[derive(Debug, Clone, Copy)]
pub struct Base64Transform {
    websafe: bool,
}

impl Base64Transform {
    pub fn new(websafe: bool) -> Self {
        Self { websafe }
    }

    fn engine(&self) -> &'static GeneralPurpose {
        if self.websafe { &URL_SAFE_ENGINE } else { &STANDARD_ENGINE }
    }
}

impl ChunkTransform for Base64Transform {
    fn encode_chunk(&mut self, from: &[u8], _is_final: bool, to: &mut [u8]) -> Result<usize, StreamError> {
        self.engine()
            .encode_slice(from, to)
            .map_err(|e| StreamError::InvalidArgument(format!("base64 encode failed: {e}")))
    }

    fn decode_chunk(&mut self, from: &[u8], _is_final: bool, to: &mut [u8]) -> Result<usize, StreamError> {
        self.engine()
            .decode_slice(from, to)
            .map_err(|e| StreamError::InvalidArgument(format!("invalid base64 input: {e}")))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Base64Codec {
    config: Base64Config,
}

impl Base64Codec {
    pub fn new(config: Base64Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Base64Config {
        &self.config
    }

    fn reader<S: DataReader>(
        &self,
        source: S,
        direction: Direction,
    ) -> Result<CodecReader<S, Base64Transform>, StreamError> {
        let (chunk_size, buffer_size) = self.config.reader_sizes(direction)?;
        CodecReader::new(source, Base64Transform::new(self.config.websafe), direction, chunk_size, buffer_size)
    }

    /// Statically typed encoding reader over `source`.
    pub fn encoding_reader<S: DataReader>(&self, source: S) -> Result<CodecReader<S, Base64Transform>, StreamError> {
        self.reader(source, Direction::Encode)
    }

    /// Statically typed decoding reader over `source`.
    pub fn decoding_reader<S: DataReader>(&self, source: S) -> Result<CodecReader<S, Base64Transform>, StreamError> {
        self.reader(source, Direction::Decode)
    }
}

impl Codec for Base64Codec {
    fn new_encoding_reader<'a>(&self, source: Box<dyn DataReader + 'a>) -> Box<dyn DataReader + 'a> {
        match self.encoding_reader(source) {
            Ok(reader) => Box::new(reader),
            Err(e) => new_invalid_reader(e),
        }
    }

    fn new_decoding_reader<'a>(&self, source: Box<dyn DataReader + 'a>) -> Box<dyn DataReader + 'a> {
        match self.decoding_reader(source) {
            Ok(reader) => Box::new(reader),
            Err(e) => new_invalid_reader(e),
        }
    }
}

/// Builds `Base64Codec`s; defaults to the standard alphabet and 8 KiB chunks.
#[derive(Debug, Clone, Default)]
pub struct Base64CodecFactory {
    config: Base64Config,
}

impl Base64CodecFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn chunk_size(&self) -> usize {
        self.config.chunk_size
    }

    pub fn set_chunk_size(&mut self, chunk_size: usize) {
        self.config.chunk_size = chunk_size;
    }

    pub fn websafe(&self) -> bool {
        self.config.websafe
    }

    pub fn set_websafe(&mut self, websafe: bool) {
        self.config.websafe = websafe;
    }
}

impl CodecFactory for Base64CodecFactory {
    fn new_codec(&self) -> Result<Box<dyn Codec>, StreamError> {
        self.config.validate()?;
        Ok(Box::new(Base64Codec::new(self.config)))
    }
}
