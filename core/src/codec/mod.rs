//! codec/mod.rs
//! Encode/decode transforms layered over readers.

pub mod base64;
pub mod cipher;
pub mod identity;
pub mod reader;
pub mod types;

pub use self::base64::{Base64Codec, Base64CodecFactory, Base64Config, Base64Transform};
pub use self::cipher::{CipherCodec, CipherCodecFactory, CipherConfig, CipherTransform};
pub use self::identity::{IdentityCodec, IdentityCodecFactory, IdentityTransform};
pub use self::reader::CodecReader;
pub use self::types::{ChunkTransform, Codec, CodecFactory, Direction};
