//! codec/cipher.rs
//! Symmetric-cipher codec: raw ciphertext, no container or header.
//!
//! Design notes:
//! - One `CipherContext` runs across every chunk of a pass; `update` on each
//!   chunk, `finalize` only on the final one. Seeking anywhere but forward
//!   restarts the context and replays from the start of the source.
//! - The output buffer is `chunk_size + MAX_CIPHER_BLOCK_LENGTH` so padding
//!   and a held-back block always fit.
//! - Key material is supplied raw or derived once from a passphrase in the
//!   factory. It is never serialized or printed.

use std::fmt;

use crate::codec::reader::CodecReader;
use crate::codec::types::{ChunkTransform, Codec, CodecFactory, Direction};
use crate::constants::{
    DEFAULT_CIPHER_CHUNK_SIZE, DEFAULT_KDF_ITERATIONS, DEFAULT_KDF_SALT, KDF_SALT_LEN,
    MAX_CHUNK_SIZE, MAX_CIPHER_BLOCK_LENGTH,
};
use crate::crypto::cipher::CipherContext;
use crate::crypto::kdf::{derive_key_iv, DerivedKey, PassphraseParams};
use crate::crypto::types::{CipherKind, CryptoError, KdfDigest};
use crate::reader::base::{new_invalid_reader, DataReader};
use crate::types::StreamError;
use crate::utils::check_chunk_size;

fn invalid(e: CryptoError) -> StreamError {
    StreamError::InvalidArgument(e.to_string())
}

/// Everything a cipher reader needs.
#[derive(Clone, PartialEq, Eq)]
pub struct CipherConfig {
    pub kind: CipherKind,
    pub key: Vec<u8>,
    pub iv: Vec<u8>,
    /// Raw bytes pulled from the source per step.
    pub chunk_size: usize,
}

impl fmt::Debug for CipherConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CipherConfig")
            .field("kind", &self.kind)
            .field("key", &format_args!("<{} bytes>", self.key.len()))
            .field("iv", &format_args!("<{} bytes>", self.iv.len()))
            .field("chunk_size", &self.chunk_size)
            .finish()
    }
}

impl CipherConfig {
    pub fn new(kind: CipherKind, key: impl Into<Vec<u8>>, iv: impl Into<Vec<u8>>) -> Self {
        Self { kind, key: key.into(), iv: iv.into(), chunk_size: DEFAULT_CIPHER_CHUNK_SIZE }
    }

    /// Derive key and IV from `passphrase` with `params`.
    pub fn from_passphrase(passphrase: &[u8], params: &PassphraseParams) -> Result<Self, StreamError> {
        let DerivedKey { key, iv } = derive_key_iv(passphrase, params).map_err(invalid)?;
        Ok(Self::new(params.kind, key, iv))
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn validate(&self) -> Result<(), StreamError> {
        check_chunk_size("cipher chunk size", self.chunk_size, MAX_CHUNK_SIZE)?;
        if self.key.len() != self.kind.key_len() {
            return Err(invalid(CryptoError::InvalidKeyLen {
                expected: self.kind.key_len(),
                actual: self.key.len(),
            }));
        }
        if self.iv.len() != self.kind.iv_len() {
            return Err(invalid(CryptoError::InvalidIvLen {
                expected: self.kind.iv_len(),
                actual: self.iv.len(),
            }));
        }
        Ok(())
    }

    pub fn buffer_size(&self) -> usize {
        self.chunk_size + MAX_CIPHER_BLOCK_LENGTH
    }
}

/// Per-pass cipher transform. `init` (re)creates the running context.
pub struct CipherTransform {
    kind: CipherKind,
    key: Vec<u8>,
    iv: Vec<u8>,
    encrypting: bool,
    ctx: Option<CipherContext>,
}

impl CipherTransform {
    pub fn new(config: &CipherConfig, direction: Direction) -> Self {
        Self {
            kind: config.kind,
            key: config.key.clone(),
            iv: config.iv.clone(),
            encrypting: direction == Direction::Encode,
            ctx: None,
        }
    }

    pub fn kind(&self) -> CipherKind {
        self.kind
    }

    fn run(&mut self, encrypting: bool, from: &[u8], is_final: bool, to: &mut [u8]) -> Result<usize, StreamError> {
        let ctx = self
            .ctx
            .as_mut()
            .ok_or_else(|| StreamError::FailedPrecondition("cipher not initialized".into()))?;
        if ctx.is_encrypting() != encrypting {
            return Err(StreamError::FailedPrecondition(format!(
                "cipher initialized for {}",
                if ctx.is_encrypting() { "encryption" } else { "decryption" }
            )));
        }

        let mut produced = ctx
            .update(from, to)
            .map_err(|e| StreamError::Unknown(format!("cipher update failed: {e}")))?;
        if is_final {
            produced += ctx
                .finalize(&mut to[produced..])
                .map_err(|e| StreamError::Unknown(format!("cipher final failed: {e}")))?;
        }
        Ok(produced)
    }
}

impl ChunkTransform for CipherTransform {
    fn init(&mut self) -> Result<(), StreamError> {
        self.ctx = None;
        let ctx = CipherContext::new(self.kind, &self.key, &self.iv, self.encrypting)
            .map_err(|e| StreamError::Unknown(format!("cipher init failed: {e}")))?;
        self.ctx = Some(ctx);
        Ok(())
    }

    fn encode_chunk(&mut self, from: &[u8], is_final: bool, to: &mut [u8]) -> Result<usize, StreamError> {
        self.run(true, from, is_final, to)
    }

    fn decode_chunk(&mut self, from: &[u8], is_final: bool, to: &mut [u8]) -> Result<usize, StreamError> {
        self.run(false, from, is_final, to)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CipherCodec {
    config: CipherConfig,
}

impl CipherCodec {
    pub fn new(config: CipherConfig) -> Result<Self, StreamError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &CipherConfig {
        &self.config
    }

    fn reader<S: DataReader>(
        &self,
        source: S,
        direction: Direction,
    ) -> Result<CodecReader<S, CipherTransform>, StreamError> {
        CodecReader::new(
            source,
            CipherTransform::new(&self.config, direction),
            direction,
            self.config.chunk_size,
            self.config.buffer_size(),
        )
    }

    /// Statically typed encrypting reader over `source`.
    pub fn encoding_reader<S: DataReader>(&self, source: S) -> Result<CodecReader<S, CipherTransform>, StreamError> {
        self.reader(source, Direction::Encode)
    }

    /// Statically typed decrypting reader over `source`.
    pub fn decoding_reader<S: DataReader>(&self, source: S) -> Result<CodecReader<S, CipherTransform>, StreamError> {
        self.reader(source, Direction::Decode)
    }
}

impl Codec for CipherCodec {
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

/// Builds `CipherCodec`s. Defaults: AES-128-CBC, SHA-256 derivation, zero
/// salt, 16 iterations, 1 KiB chunks.
///
/// Cipher and derivation settings apply to the next `set_passphrase`; change
/// them first.
#[derive(Clone)]
pub struct CipherCodecFactory {
    params: PassphraseParams,
    chunk_size: usize,
    key: Option<DerivedKey>,
}

impl Default for CipherCodecFactory {
    fn default() -> Self {
        Self {
            params: PassphraseParams {
                kind: CipherKind::Aes128Cbc,
                digest: KdfDigest::Sha256,
                salt: DEFAULT_KDF_SALT,
                iterations: DEFAULT_KDF_ITERATIONS,
            },
            chunk_size: DEFAULT_CIPHER_CHUNK_SIZE,
            key: None,
        }
    }
}

impl fmt::Debug for CipherCodecFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CipherCodecFactory")
            .field("params", &self.params)
            .field("chunk_size", &self.chunk_size)
            .field("has_key", &self.key.is_some())
            .finish()
    }
}

impl CipherCodecFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn params(&self) -> &PassphraseParams {
        &self.params
    }

    pub fn set_cipher(&mut self, kind: CipherKind) {
        self.params.kind = kind;
    }

    pub fn set_digest(&mut self, digest: KdfDigest) {
        self.params.digest = digest;
    }

    /// The salt must be exactly 8 bytes.
    pub fn set_salt(&mut self, salt: &[u8]) -> Result<(), StreamError> {
        let salt: [u8; KDF_SALT_LEN] = salt.try_into().map_err(|_| {
            StreamError::InvalidArgument(format!("salt must be exactly {KDF_SALT_LEN} bytes, got {}", salt.len()))
        })?;
        self.params.salt = salt;
        Ok(())
    }

    pub fn set_iterations(&mut self, iterations: u32) {
        self.params.iterations = iterations;
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn set_chunk_size(&mut self, chunk_size: usize) {
        self.chunk_size = chunk_size;
    }

    /// Derive and keep the key/IV for the current settings.
    pub fn set_passphrase(&mut self, passphrase: impl AsRef<[u8]>) -> Result<(), StreamError> {
        let derived = derive_key_iv(passphrase.as_ref(), &self.params).map_err(invalid)?;
        self.key = Some(derived);
        Ok(())
    }

    /// Use raw key material instead of a passphrase.
    pub fn set_key_iv(&mut self, key: impl Into<Vec<u8>>, iv: impl Into<Vec<u8>>) {
        self.key = Some(DerivedKey { key: key.into(), iv: iv.into() });
    }
}

impl CodecFactory for CipherCodecFactory {
    fn new_codec(&self) -> Result<Box<dyn Codec>, StreamError> {
        let Some(derived) = &self.key else {
            return Err(StreamError::InvalidArgument("passphrase not set".into()));
        };
        let config = CipherConfig::new(self.params.kind, derived.key.clone(), derived.iv.clone())
            .with_chunk_size(self.chunk_size);
        Ok(Box::new(CipherCodec::new(config)?))
    }
}
