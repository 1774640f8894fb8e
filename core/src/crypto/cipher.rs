//! crypto/cipher.rs
//! Running symmetric cipher context with an update/finalize interface.
//!
//! Design notes:
//! - One context covers one pass over a stream. It holds the chaining state
//!   (CBC) or keystream position (CTR, ChaCha20) between `update` calls.
//! - CBC uses PKCS#7 padding. `update` only emits whole blocks; when
//!   decrypting it also holds back the last whole block so `finalize` can
//!   strip the padding.
//! - Stream modes produce exactly as many bytes as they consume and
//!   `finalize` emits nothing.
//! - `update` never writes more than `input.len() + block_size - 1` bytes and
//!   `finalize` never more than `block_size`.

use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit, StreamCipher};
use aes::{Aes128, Aes256};

use crate::crypto::types::{CipherKind, CryptoError};

const CBC_BLOCK: usize = 16;

trait BlockStep: Send {
    fn process_block(&mut self, block: &mut [u8]);
}

macro_rules! block_step {
    ($ty:ty, $method:ident) => {
        impl BlockStep for $ty {
            fn process_block(&mut self, block: &mut [u8]) {
                self.$method(GenericArray::from_mut_slice(block));
            }
        }
    };
}

block_step!(cbc::Encryptor<Aes128>, encrypt_block_mut);
block_step!(cbc::Encryptor<Aes256>, encrypt_block_mut);
block_step!(cbc::Decryptor<Aes128>, decrypt_block_mut);
block_step!(cbc::Decryptor<Aes256>, decrypt_block_mut);

trait StreamStep: Send {
    fn apply(&mut self, data: &mut [u8]) -> Result<(), CryptoError>;
}

impl<T: StreamCipher + Send> StreamStep for T {
    fn apply(&mut self, data: &mut [u8]) -> Result<(), CryptoError> {
        self.try_apply_keystream(data)
            .map_err(|e| CryptoError::Failure(format!("keystream exhausted: {e}")))
    }
}

enum Mode {
    Block(Box<dyn BlockStep>),
    Stream(Box<dyn StreamStep>),
}

pub struct CipherContext {
    kind: CipherKind,
    encrypting: bool,
    mode: Mode,
    /// CBC bytes not yet emitted (partial block, or the held-back last block).
    pending: Vec<u8>,
    finalized: bool,
}

fn init_err<E: std::fmt::Display>(e: E) -> CryptoError {
    CryptoError::Failure(format!("cipher init failed: {e}"))
}

impl CipherContext {
    /// Summary: build a fresh context for `kind`.
    ///
    /// Errors:
    /// - `InvalidKeyLen` / `InvalidIvLen` when the material does not match the kind.
    pub fn new(kind: CipherKind, key: &[u8], iv: &[u8], encrypting: bool) -> Result<Self, CryptoError> {
        if key.len() != kind.key_len() {
            return Err(CryptoError::InvalidKeyLen { expected: kind.key_len(), actual: key.len() });
        }
        if iv.len() != kind.iv_len() {
            return Err(CryptoError::InvalidIvLen { expected: kind.iv_len(), actual: iv.len() });
        }

        let mode = match (kind, encrypting) {
            (CipherKind::Aes128Cbc, true) => Mode::Block(Box::new(
                cbc::Encryptor::<Aes128>::new_from_slices(key, iv).map_err(init_err)?,
            )),
            (CipherKind::Aes128Cbc, false) => Mode::Block(Box::new(
                cbc::Decryptor::<Aes128>::new_from_slices(key, iv).map_err(init_err)?,
            )),
            (CipherKind::Aes256Cbc, true) => Mode::Block(Box::new(
                cbc::Encryptor::<Aes256>::new_from_slices(key, iv).map_err(init_err)?,
            )),
            (CipherKind::Aes256Cbc, false) => Mode::Block(Box::new(
                cbc::Decryptor::<Aes256>::new_from_slices(key, iv).map_err(init_err)?,
            )),
            // Counter and ChaCha20 modes are symmetric.
            (CipherKind::Aes128Ctr, _) => Mode::Stream(Box::new(
                ctr::Ctr128BE::<Aes128>::new_from_slices(key, iv).map_err(init_err)?,
            )),
            (CipherKind::Aes256Ctr, _) => Mode::Stream(Box::new(
                ctr::Ctr128BE::<Aes256>::new_from_slices(key, iv).map_err(init_err)?,
            )),
            (CipherKind::ChaCha20, _) => Mode::Stream(Box::new(
                chacha20::ChaCha20::new_from_slices(key, iv).map_err(init_err)?,
            )),
        };

        Ok(Self { kind, encrypting, mode, pending: Vec::with_capacity(CBC_BLOCK), finalized: false })
    }

    pub fn kind(&self) -> CipherKind {
        self.kind
    }

    pub fn is_encrypting(&self) -> bool {
        self.encrypting
    }

    /// Feed `input`, writing whatever output is ready into `out`.
    /// Returns the number of bytes written.
    pub fn update(&mut self, input: &[u8], out: &mut [u8]) -> Result<usize, CryptoError> {
        if self.finalized {
            return Err(CryptoError::Failure("update after finalize".into()));
        }

        match &mut self.mode {
            Mode::Stream(step) => {
                if out.len() < input.len() {
                    return Err(CryptoError::OutputTooSmall { need: input.len(), have: out.len() });
                }
                out[..input.len()].copy_from_slice(input);
                step.apply(&mut out[..input.len()])?;
                Ok(input.len())
            }
            Mode::Block(step) => {
                let total = self.pending.len() + input.len();
                let mut emit = total - total % CBC_BLOCK;
                if !self.encrypting && emit == total && emit > 0 {
                    emit -= CBC_BLOCK;
                }
                if emit == 0 {
                    self.pending.extend_from_slice(input);
                    return Ok(0);
                }
                if out.len() < emit {
                    return Err(CryptoError::OutputTooSmall { need: emit, have: out.len() });
                }

                let held = self.pending.len();
                let taken = emit - held;
                out[..held].copy_from_slice(&self.pending);
                out[held..emit].copy_from_slice(&input[..taken]);
                self.pending.clear();
                self.pending.extend_from_slice(&input[taken..]);

                for block in out[..emit].chunks_exact_mut(CBC_BLOCK) {
                    step.process_block(block);
                }
                Ok(emit)
            }
        }
    }

    /// Flush the tail: padding when encrypting, padding check when decrypting.
    pub fn finalize(&mut self, out: &mut [u8]) -> Result<usize, CryptoError> {
        if self.finalized {
            return Err(CryptoError::Failure("finalize called twice".into()));
        }
        self.finalized = true;

        let Mode::Block(step) = &mut self.mode else {
            return Ok(0);
        };

        if self.encrypting {
            if out.len() < CBC_BLOCK {
                return Err(CryptoError::OutputTooSmall { need: CBC_BLOCK, have: out.len() });
            }
            let held = self.pending.len();
            let pad = (CBC_BLOCK - held) as u8;
            out[..held].copy_from_slice(&self.pending);
            out[held..CBC_BLOCK].fill(pad);
            step.process_block(&mut out[..CBC_BLOCK]);
            self.pending.clear();
            return Ok(CBC_BLOCK);
        }

        if self.pending.len() != CBC_BLOCK {
            return Err(CryptoError::WrongFinalBlockLength { len: self.pending.len() });
        }
        let mut block = [0u8; CBC_BLOCK];
        block.copy_from_slice(&self.pending);
        self.pending.clear();
        step.process_block(&mut block);

        let pad = block[CBC_BLOCK - 1] as usize;
        if pad == 0 || pad > CBC_BLOCK || block[CBC_BLOCK - pad..].iter().any(|&b| b as usize != pad) {
            return Err(CryptoError::BadDecrypt);
        }
        let plain = CBC_BLOCK - pad;
        if out.len() < plain {
            return Err(CryptoError::OutputTooSmall { need: plain, have: out.len() });
        }
        out[..plain].copy_from_slice(&block[..plain]);
        Ok(plain)
    }
}
