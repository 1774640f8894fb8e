//! crypto/types.rs
//! Cipher and digest registries plus the crypto-layer error.

use std::fmt;
use num_enum::TryFromPrimitive;

use crate::constants::{cipher_ids, prf_ids};
use crate::utils::enum_name_or_hex;

/// Symmetric ciphers available to the cipher codec.
#[repr(u16)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, TryFromPrimitive)]
pub enum CipherKind {
    Aes128Cbc = cipher_ids::AES128_CBC,
    Aes256Cbc = cipher_ids::AES256_CBC,
    Aes128Ctr = cipher_ids::AES128_CTR,
    Aes256Ctr = cipher_ids::AES256_CTR,
    ChaCha20  = cipher_ids::CHACHA20,
}

impl Default for CipherKind {
    fn default() -> Self {
        CipherKind::Aes128Cbc
    }
}

impl CipherKind {
    pub fn from_id(raw: u16) -> Result<Self, CryptoError> {
        CipherKind::try_from_primitive(raw).map_err(|_| CryptoError::UnsupportedCipher { cipher_id: raw })
    }

    pub fn key_len(self) -> usize {
        match self {
            CipherKind::Aes128Cbc | CipherKind::Aes128Ctr => 16,
            CipherKind::Aes256Cbc | CipherKind::Aes256Ctr | CipherKind::ChaCha20 => 32,
        }
    }

    pub fn iv_len(self) -> usize {
        match self {
            CipherKind::ChaCha20 => 12,
            _ => 16,
        }
    }

    /// 1 for stream modes (no padding, output length == input length).
    pub fn block_size(self) -> usize {
        match self {
            CipherKind::Aes128Cbc | CipherKind::Aes256Cbc => 16,
            _ => 1,
        }
    }

    pub fn is_padded(self) -> bool {
        self.block_size() > 1
    }
}

/// Digest used by passphrase key derivation.
#[repr(u16)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, TryFromPrimitive)]
pub enum KdfDigest {
    Sha256 = prf_ids::SHA256,
    Sha512 = prf_ids::SHA512,
    /// Legacy digest of `openssl enc` and older tooling; only for reading existing data.
    Sha1   = prf_ids::SHA1,
}

impl Default for KdfDigest {
    fn default() -> Self {
        KdfDigest::Sha256
    }
}

impl KdfDigest {
    pub fn from_id(raw: u16) -> Result<Self, CryptoError> {
        KdfDigest::try_from_primitive(raw).map_err(|_| CryptoError::UnsupportedPrf { prf_id: raw })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Unknown cipher id.
    UnsupportedCipher { cipher_id: u16 },

    /// Unknown key-derivation digest id.
    UnsupportedPrf { prf_id: u16 },

    InvalidKeyLen { expected: usize, actual: usize },

    InvalidIvLen { expected: usize, actual: usize },

    /// Destination cannot hold what the step would produce.
    OutputTooSmall { need: usize, have: usize },

    /// Ciphertext ended mid-block.
    WrongFinalBlockLength { len: usize },

    /// Padding check failed; usually the wrong key.
    BadDecrypt,

    /// General runtime error with context.
    Failure(String),
}

impl fmt::Display for CryptoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use CryptoError::*;
        match self {
            UnsupportedCipher { cipher_id } =>
                write!(f, "unsupported cipher: {}", enum_name_or_hex::<CipherKind>(*cipher_id)),
            UnsupportedPrf { prf_id } =>
                write!(f, "unsupported key derivation digest: {}", enum_name_or_hex::<KdfDigest>(*prf_id)),
            InvalidKeyLen { expected, actual } =>
                write!(f, "invalid key length: expected={}, actual={}", expected, actual),
            InvalidIvLen { expected, actual } =>
                write!(f, "invalid iv length: expected={}, actual={}", expected, actual),
            OutputTooSmall { need, have } =>
                write!(f, "output buffer too small: need={}, have={}", need, have),
            WrongFinalBlockLength { len } =>
                write!(f, "wrong final block length: {} buffered bytes", len),
            BadDecrypt =>
                write!(f, "bad decrypt"),
            Failure(msg) =>
                write!(f, "crypto failure: {}", msg),
        }
    }
}

impl std::error::Error for CryptoError {}
