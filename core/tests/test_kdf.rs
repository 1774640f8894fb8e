#[cfg(test)]
mod tests {
    use datastream_core::constants::{DEFAULT_KDF_ITERATIONS, DEFAULT_KDF_SALT};
    use datastream_core::crypto::{derive_key_iv, CryptoError};
    use datastream_core::prelude::*;

    fn params(kind: CipherKind, digest: KdfDigest, salt: [u8; 8], iterations: u32) -> PassphraseParams {
        PassphraseParams { kind, digest, salt, iterations }
    }

    #[test]
    fn test_single_iteration_sha256() {
        let p = params(CipherKind::Aes128Cbc, KdfDigest::Sha256, [0u8; 8], 1);
        let derived = derive_key_iv(b"password", &p).unwrap();
        assert_eq!(hex::encode(&derived.key), "38bdb5ad83371218838675ce3504fec0");
        assert_eq!(hex::encode(&derived.iv), "5fa85128cd88ce12eaaa8b9f1fc547b7");
    }

    #[test]
    fn test_default_parameters() {
        let p = PassphraseParams::default();
        assert_eq!(p.kind, CipherKind::Aes128Cbc);
        assert_eq!(p.digest, KdfDigest::Sha256);
        assert_eq!(p.salt, DEFAULT_KDF_SALT);
        assert_eq!(p.iterations, DEFAULT_KDF_ITERATIONS);

        let derived = derive_key_iv(b"password", &p).unwrap();
        assert_eq!(hex::encode(&derived.key), "7d40dfcc842cb5f7fe758ec8e5d33c55");
        assert_eq!(hex::encode(&derived.iv), "6316a0ec4e09211361886977ec3a3ce0");
    }

    #[test]
    fn test_material_spans_digest_blocks() {
        let p = params(CipherKind::Aes256Cbc, KdfDigest::Sha256, [1, 2, 3, 4, 5, 6, 7, 8], 1);
        let derived = derive_key_iv(b"password", &p).unwrap();
        assert_eq!(
            hex::encode(&derived.key),
            "2435177f1410536baad2acc155c0f94783d58384573cb0f72157443606285d3f"
        );
        assert_eq!(hex::encode(&derived.iv), "f96efc044e0f1613bf324245c95e7411");
    }

    #[test]
    fn test_sha1_digest_matches_legacy_tooling() {
        let p = params(CipherKind::Aes128Cbc, KdfDigest::Sha1, [0u8; 8], 1);
        let derived = derive_key_iv(b"password", &p).unwrap();
        assert_eq!(hex::encode(&derived.key), "5ccaf828fe89ee10067b69b455c5ee20");
        assert_eq!(hex::encode(&derived.iv), "775bf4c1961765644ff2ab412068d6ea");

        let p = params(CipherKind::Aes128Cbc, KdfDigest::Sha1, [0u8; 8], DEFAULT_KDF_ITERATIONS);
        let derived = derive_key_iv(b"password", &p).unwrap();
        assert_eq!(hex::encode(&derived.key), "2d261a154cf624fc2ec7f14bd9161bf5");
        assert_eq!(hex::encode(&derived.iv), "4c2f5082b006658146acc8f292d87aac");
    }

    #[test]
    fn test_factory_sha1_round_trip() {
        let mut factory = CipherCodecFactory::new();
        factory.set_digest(KdfDigest::Sha1);
        factory.set_passphrase("password").unwrap();
        let codec = factory.new_codec().unwrap();

        let encrypted = codec.encode(b"Hello, World!").unwrap();
        assert_eq!(codec.decode(&encrypted).unwrap(), b"Hello, World!");

        let mut sha256 = CipherCodecFactory::new();
        sha256.set_passphrase("password").unwrap();
        assert_ne!(sha256.new_codec().unwrap().encode(b"Hello, World!").unwrap(), encrypted);
    }

    #[test]
    fn test_sha512_digest() {
        let p = params(CipherKind::Aes128Cbc, KdfDigest::Sha512, [0u8; 8], 1);
        let derived = derive_key_iv(b"password", &p).unwrap();
        assert_eq!(hex::encode(&derived.key), "87f12f88b7df05d9ada96a515cd75b96");
        assert_eq!(hex::encode(&derived.iv), "ad1d995848349259774f88b16ea629f5");
    }

    #[test]
    fn test_lengths_follow_cipher() {
        for kind in [
            CipherKind::Aes128Cbc,
            CipherKind::Aes256Cbc,
            CipherKind::Aes128Ctr,
            CipherKind::Aes256Ctr,
            CipherKind::ChaCha20,
        ] {
            let p = PassphraseParams { kind, ..PassphraseParams::default() };
            let derived = derive_key_iv(b"pw", &p).unwrap();
            assert_eq!(derived.key.len(), kind.key_len());
            assert_eq!(derived.iv.len(), kind.iv_len());
        }
    }

    #[test]
    fn test_derivation_is_deterministic_and_salted() {
        let p = PassphraseParams::default();
        assert_eq!(derive_key_iv(b"pw", &p).unwrap(), derive_key_iv(b"pw", &p).unwrap());

        let salted = PassphraseParams { salt: [9u8; 8], ..p };
        assert_ne!(derive_key_iv(b"pw", &p).unwrap(), derive_key_iv(b"pw", &salted).unwrap());

        let more = PassphraseParams { iterations: 17, ..p };
        assert_ne!(derive_key_iv(b"pw", &p).unwrap(), derive_key_iv(b"pw", &more).unwrap());
    }

    #[test]
    fn test_zero_iterations_rejected() {
        let p = PassphraseParams { iterations: 0, ..PassphraseParams::default() };
        assert!(matches!(derive_key_iv(b"pw", &p), Err(CryptoError::Failure(_))));
    }

    #[test]
    fn test_random_salt() {
        let a = PassphraseParams::with_random_salt();
        let b = PassphraseParams::with_random_salt();
        assert_eq!(a.iterations, DEFAULT_KDF_ITERATIONS);
        // 2^-64 chance of a false failure.
        assert_ne!(a.salt, b.salt);
    }

    #[test]
    fn test_derived_key_debug_is_redacted() {
        let derived = derive_key_iv(b"password", &PassphraseParams::default()).unwrap();
        let shown = format!("{derived:?}");
        assert!(shown.contains("<16 bytes>"));
        assert!(!shown.contains("125"));
    }

    #[test]
    fn test_registry_ids() {
        assert_eq!(CipherKind::from_id(0x0003).unwrap(), CipherKind::Aes256Cbc);
        assert_eq!(KdfDigest::from_id(0x0002).unwrap(), KdfDigest::Sha512);
        assert_eq!(KdfDigest::from_id(0x0003).unwrap(), KdfDigest::Sha1);

        let err = CipherKind::from_id(0x9999).unwrap_err();
        assert_eq!(err, CryptoError::UnsupportedCipher { cipher_id: 0x9999 });
        assert!(err.to_string().contains("0x9999"));

        let err = KdfDigest::from_id(0x9999).unwrap_err();
        assert!(err.to_string().contains("0x9999"));
    }

    #[test]
    fn test_cipher_geometry() {
        assert_eq!(CipherKind::default(), CipherKind::Aes128Cbc);
        assert!(CipherKind::Aes256Cbc.is_padded());
        assert!(!CipherKind::Aes128Ctr.is_padded());
        assert_eq!(CipherKind::ChaCha20.block_size(), 1);
        assert_eq!(CipherKind::ChaCha20.iv_len(), 12);
    }
}
