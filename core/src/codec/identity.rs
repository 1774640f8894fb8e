//! codec/identity.rs
//! Pass-through codec.
//!
//! Runs the chunked engine with a transform that copies its input, so it
//! behaves like any other codec (chunking, seeks, counters) without changing
//! the bytes.

use crate::codec::reader::CodecReader;
use crate::codec::types::{ChunkTransform, Codec, CodecFactory, Direction};
use crate::constants::{DEFAULT_READ_BUFFER_SIZE, MAX_CHUNK_SIZE};
use crate::reader::base::{new_invalid_reader, DataReader};
use crate::types::StreamError;
use crate::utils::check_chunk_size;

#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityTransform;

impl IdentityTransform {
    pub fn new() -> Self { Self }

    fn copy(from: &[u8], to: &mut [u8]) -> Result<usize, StreamError> {
        if from.len() > to.len() {
            return Err(StreamError::Internal(format!(
                "chunk of {} bytes does not fit {} byte buffer",
                from.len(),
                to.len()
            )));
        }
        to[..from.len()].copy_from_slice(from);
        Ok(from.len())
    }
}

impl ChunkTransform for IdentityTransform {
    fn encode_chunk(&mut self, from: &[u8], _is_final: bool, to: &mut [u8]) -> Result<usize, StreamError> {
        Self::copy(from, to)
    }

    fn decode_chunk(&mut self, from: &[u8], _is_final: bool, to: &mut [u8]) -> Result<usize, StreamError> {
        Self::copy(from, to)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentityCodec {
    chunk_size: usize,
}

impl Default for IdentityCodec {
    fn default() -> Self {
        Self { chunk_size: DEFAULT_READ_BUFFER_SIZE }
    }
}

impl IdentityCodec {
    pub fn new(chunk_size: usize) -> Result<Self, StreamError> {
        check_chunk_size("identity chunk size", chunk_size, MAX_CHUNK_SIZE)?;
        Ok(Self { chunk_size })
    }

    pub fn reader<S: DataReader>(
        &self,
        source: S,
        direction: Direction,
    ) -> Result<CodecReader<S, IdentityTransform>, StreamError> {
        CodecReader::new(source, IdentityTransform::new(), direction, self.chunk_size, self.chunk_size)
    }
}

impl Codec for IdentityCodec {
    fn new_encoding_reader<'a>(&self, source: Box<dyn DataReader + 'a>) -> Box<dyn DataReader + 'a> {
        match self.reader(source, Direction::Encode) {
            Ok(reader) => Box::new(reader),
            Err(e) => new_invalid_reader(e),
        }
    }

    fn new_decoding_reader<'a>(&self, source: Box<dyn DataReader + 'a>) -> Box<dyn DataReader + 'a> {
        match self.reader(source, Direction::Decode) {
            Ok(reader) => Box::new(reader),
            Err(e) => new_invalid_reader(e),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityCodecFactory;

impl CodecFactory for IdentityCodecFactory {
    fn new_codec(&self) -> Result<Box<dyn Codec>, StreamError> {
        Ok(Box::new(IdentityCodec::default()))
    }
}
