//! crypto/kdf.rs
//! Passphrase to key/IV derivation.
//!
//! Design:
//! - D_1 = H^n(passphrase || salt), D_i = H^n(D_{i-1} || passphrase || salt)
//!   where H^n is the digest applied `iterations` times.
//! - key || iv is the prefix of D_1 || D_2 || ... of length key_len + iv_len.
//!
//! This is OpenSSL's `EVP_BytesToKey` construction, so ciphertext stays
//! interoperable with `openssl enc` style tooling given the same digest,
//! salt and iteration count. It is not a modern password hash.

use rand::rngs::OsRng;
use rand::RngCore;
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha512};

use crate::constants::{DEFAULT_KDF_ITERATIONS, DEFAULT_KDF_SALT, KDF_SALT_LEN};
use crate::crypto::types::{CipherKind, CryptoError, KdfDigest};

/// Parameters for deriving cipher material from a passphrase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassphraseParams {
    pub kind: CipherKind,
    pub digest: KdfDigest,
    pub salt: [u8; KDF_SALT_LEN],
    pub iterations: u32,
}

impl Default for PassphraseParams {
    fn default() -> Self {
        Self {
            kind: CipherKind::default(),
            digest: KdfDigest::default(),
            salt: DEFAULT_KDF_SALT,
            iterations: DEFAULT_KDF_ITERATIONS,
        }
    }
}

impl PassphraseParams {
    /// Defaults with a fresh random salt from the OS.
    pub fn with_random_salt() -> Self {
        let mut salt = [0u8; KDF_SALT_LEN];
        OsRng.fill_bytes(&mut salt);
        Self { salt, ..Self::default() }
    }

    pub fn validate(&self) -> Result<(), CryptoError> {
        if self.iterations == 0 {
            return Err(CryptoError::Failure("iteration count must be positive".into()));
        }
        Ok(())
    }
}

/// Key and IV for one cipher session.
#[derive(Clone, PartialEq, Eq)]
pub struct DerivedKey {
    pub key: Vec<u8>,
    pub iv: Vec<u8>,
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivedKey")
            .field("key", &format_args!("<{} bytes>", self.key.len()))
            .field("iv", &format_args!("<{} bytes>", self.iv.len()))
            .finish()
    }
}

fn bytes_to_key<D: Digest>(passphrase: &[u8], salt: &[u8], iterations: u32, out: &mut [u8]) {
    let mut filled = 0;
    let mut prev: Option<Vec<u8>> = None;

    while filled < out.len() {
        let mut hasher = D::new();
        if let Some(prev) = &prev {
            hasher.update(prev);
        }
        hasher.update(passphrase);
        hasher.update(salt);
        let mut block = hasher.finalize();
        for _ in 1..iterations {
            block = D::digest(&block);
        }

        let take = block.len().min(out.len() - filled);
        out[filled..filled + take].copy_from_slice(&block[..take]);
        filled += take;
        prev = Some(block.to_vec());
    }
}

/// Summary: derive the key and IV for `params.kind` from `passphrase`.
///
/// Errors:
/// - `Failure` when the iteration count is zero.
pub fn derive_key_iv(passphrase: &[u8], params: &PassphraseParams) -> Result<DerivedKey, CryptoError> {
    params.validate()?;

    let key_len = params.kind.key_len();
    let mut material = vec![0u8; key_len + params.kind.iv_len()];
    match params.digest {
        KdfDigest::Sha256 => bytes_to_key::<Sha256>(passphrase, &params.salt, params.iterations, &mut material),
        KdfDigest::Sha512 => bytes_to_key::<Sha512>(passphrase, &params.salt, params.iterations, &mut material),
        KdfDigest::Sha1 => bytes_to_key::<Sha1>(passphrase, &params.salt, params.iterations, &mut material),
    }

    let iv = material.split_off(key_len);
    Ok(DerivedKey { key: material, iv })
}
