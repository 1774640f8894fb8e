//! constants.rs
//! Defaults and sanity bounds shared by readers, writers and codecs.

/// Scratch buffer used by `read_to_vec` when copying out of a reader (8 KiB).
pub const DEFAULT_READ_BUFFER_SIZE: usize = 8 * 1024;

/// Piece size used when a writer drains a reader (4 KiB).
pub const WRITER_COPY_CHUNK_SIZE: usize = 4 * 1024;

/// Plaintext chunk size for Base64 codecs when none (or < 3) is requested.
pub const DEFAULT_BASE64_CHUNK_SIZE: usize = 8 * 1024;

/// Raw bytes pulled per step by cipher codecs.
pub const DEFAULT_CIPHER_CHUNK_SIZE: usize = 1024;

/// Max chunk size sanity bound (32 MiB).
pub const MAX_CHUNK_SIZE: usize = 32 * 1024 * 1024;

/// Worst-case growth of one cipher update + finalize over its input.
/// Matches OpenSSL's `EVP_MAX_BLOCK_LENGTH`.
pub const MAX_CIPHER_BLOCK_LENGTH: usize = 32;

/// Passphrase key derivation defaults.
pub const KDF_SALT_LEN: usize = 8;
pub const DEFAULT_KDF_ITERATIONS: u32 = 16;
pub const DEFAULT_KDF_SALT: [u8; KDF_SALT_LEN] = [0u8; KDF_SALT_LEN];

/// Cipher identifiers (stable, usable in persisted metadata).
pub mod cipher_ids {
    pub const AES128_CBC: u16 = 0x0001;
    pub const AES256_CBC: u16 = 0x0003;
    pub const AES128_CTR: u16 = 0x0011;
    pub const AES256_CTR: u16 = 0x0013;
    pub const CHACHA20: u16   = 0x0021;
}

/// Digest identifiers for passphrase key derivation.
pub mod prf_ids {
    pub const SHA256: u16 = 0x0001;
    pub const SHA512: u16 = 0x0002;
    pub const SHA1: u16   = 0x0003;
}
