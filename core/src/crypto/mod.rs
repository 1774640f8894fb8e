//! crypto/mod.rs
//! Streaming symmetric ciphers and passphrase key derivation.

pub mod cipher;
pub mod kdf;
pub mod types;

pub use cipher::*;
pub use kdf::*;
pub use types::*;
