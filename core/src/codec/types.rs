//! codec/types.rs
//! Codec contracts: the per-chunk transform, the codec that wraps readers
//! with it, and the factory that builds codecs from configuration.

use crate::reader::base::DataReader;
use crate::reader::memory::InMemoryDataReader;
use crate::types::StreamError;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    Encode,
    Decode,
}

/// A stateful chunk-at-a-time transform driven by `CodecReader`.
///
/// `is_final` is set exactly once per pass, on the chunk that ends the
/// source (which may be empty). `init` starts a new pass and is called again
/// before every replay.
pub trait ChunkTransform {
    fn init(&mut self) -> Result<(), StreamError> {
        Ok(())
    }

    /// Encode `from` into `to`, returning the bytes written.
    fn encode_chunk(&mut self, from: &[u8], is_final: bool, to: &mut [u8]) -> Result<usize, StreamError>;

    /// Decode `from` into `to`, returning the bytes written.
    fn decode_chunk(&mut self, from: &[u8], is_final: bool, to: &mut [u8]) -> Result<usize, StreamError>;

    fn transform_chunk(
        &mut self,
        direction: Direction,
        from: &[u8],
        is_final: bool,
        to: &mut [u8],
    ) -> Result<usize, StreamError> {
        match direction {
            Direction::Encode => self.encode_chunk(from, is_final, to),
            Direction::Decode => self.decode_chunk(from, is_final, to),
        }
    }
}

impl<T: ChunkTransform + ?Sized> ChunkTransform for Box<T> {
    fn init(&mut self) -> Result<(), StreamError> {
        (**self).init()
    }

    fn encode_chunk(&mut self, from: &[u8], is_final: bool, to: &mut [u8]) -> Result<usize, StreamError> {
        (**self).encode_chunk(from, is_final, to)
    }

    fn decode_chunk(&mut self, from: &[u8], is_final: bool, to: &mut [u8]) -> Result<usize, StreamError> {
        (**self).decode_chunk(from, is_final, to)
    }
}

/// Wraps readers with an encoding or decoding transform.
///
/// Both factory methods are total: a codec that cannot build its reader
/// returns one that is already failed, carrying the reason in `status()`.
pub trait Codec: Send + Sync {
    fn new_encoding_reader<'a>(&self, source: Box<dyn DataReader + 'a>) -> Box<dyn DataReader + 'a>;

    fn new_decoding_reader<'a>(&self, source: Box<dyn DataReader + 'a>) -> Box<dyn DataReader + 'a>;

    /// Encode a whole buffer through the streaming path.
    fn encode(&self, plain: &[u8]) -> Result<Vec<u8>, StreamError> {
        let mut reader = self.new_encoding_reader(Box::new(InMemoryDataReader::copy_from_slice(plain)));
        let out = reader.remainder_to_vec();
        reader.status()?;
        Ok(out)
    }

    /// Decode a whole buffer through the streaming path.
    fn decode(&self, encoded: &[u8]) -> Result<Vec<u8>, StreamError> {
        let mut reader = self.new_decoding_reader(Box::new(InMemoryDataReader::copy_from_slice(encoded)));
        let out = reader.remainder_to_vec();
        reader.status()?;
        Ok(out)
    }
}

/// Builds configured codecs.
pub trait CodecFactory {
    fn new_codec(&self) -> Result<Box<dyn Codec>, StreamError>;
}
