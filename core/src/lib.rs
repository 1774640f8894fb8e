//! datastream-core
//!
//! Pull-based byte streams with composable encode/decode transforms.
//! Pure Rust, synchronous, no FFI.

#![forbid(unsafe_code)]

// Shared and top level
pub mod constants;
pub mod types;
pub mod utils;

// Streams
pub mod reader;
pub mod writer;

// Transforms
pub mod codec;
pub mod crypto;
pub mod telemetry;

// -----------------------------------------------------------------------------
// Prelude (Rust users)
// -----------------------------------------------------------------------------
pub mod prelude {
    pub use crate::codec::{
        Base64Codec, Base64CodecFactory, Base64Config, CipherCodec, CipherCodecFactory,
        CipherConfig, Codec, CodecFactory, CodecReader, Direction, IdentityCodec,
    };
    pub use crate::crypto::{CipherKind, KdfDigest, PassphraseParams};
    pub use crate::reader::{
        new_invalid_reader, CompositeDataReader, DataReader, FileDataReader, InMemoryDataReader,
        InvalidDataReader, IoDataReader,
    };
    pub use crate::telemetry::TransformCounters;
    pub use crate::types::{ErrorCode, Status, StreamError};
    pub use crate::writer::{DataWriter, FileDataWriter, FileWriteOptions, InMemoryDataWriter};
}
