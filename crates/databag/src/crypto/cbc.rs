//! AES-256-CBC with PKCS#7 padding, used by scheme versions 1 and 2.

use aes::cipher::{BlockDecrypt, BlockEncrypt, KeyInit};
use aes::{Aes256, Block};

use super::cipher::CipherError;

/// AES block size and CBC IV length.
pub const BLOCK_LEN: usize = 16;

/// Encrypt `plaintext`, padding it to a whole number of blocks.
pub fn encrypt(key: &[u8], iv: &[u8; BLOCK_LEN], plaintext: &[u8]) -> Result<Vec<u8>, CipherError> {
    let cipher = build_cipher(key)?;

    let pad = BLOCK_LEN - plaintext.len() % BLOCK_LEN;
    let mut padded = Vec::with_capacity(plaintext.len() + pad);
    padded.extend_from_slice(plaintext);
    padded.resize(plaintext.len() + pad, pad as u8);

    let mut prev = *iv;
    let mut out = Vec::with_capacity(padded.len());
    for chunk in padded.chunks_exact(BLOCK_LEN) {
        let mut block = Block::clone_from_slice(chunk);
        xor_block(&mut block, &prev);
        cipher.encrypt_block(&mut block);
        prev.copy_from_slice(&block);
        out.extend_from_slice(&block);
    }
    Ok(out)
}

/// Decrypt `ciphertext` and strip its padding.
///
/// # Errors
///
/// Returns [`CipherError::InvalidFormat`] if the ciphertext is empty or not
/// block-aligned, and [`CipherError::BadPadding`] if the padding is invalid
/// (the usual outcome of decrypting with the wrong key).
pub fn decrypt(key: &[u8], iv: &[u8; BLOCK_LEN], ciphertext: &[u8]) -> Result<Vec<u8>, CipherError> {
    if ciphertext.is_empty() || ciphertext.len() % BLOCK_LEN != 0 {
        return Err(CipherError::InvalidFormat("encrypted_data"));
    }
    let cipher = build_cipher(key)?;

    let mut prev = *iv;
    let mut out = Vec::with_capacity(ciphertext.len());
    for chunk in ciphertext.chunks_exact(BLOCK_LEN) {
        let mut block = Block::clone_from_slice(chunk);
        cipher.decrypt_block(&mut block);
        xor_block(&mut block, &prev);
        prev.copy_from_slice(chunk);
        out.extend_from_slice(&block);
    }

    let pad = usize::from(out[out.len() - 1]);
    if pad == 0 || pad > BLOCK_LEN || out[out.len() - pad..].iter().any(|&b| usize::from(b) != pad) {
        return Err(CipherError::BadPadding);
    }
    out.truncate(out.len() - pad);
    Ok(out)
}

fn xor_block(block: &mut Block, other: &[u8; BLOCK_LEN]) {
    for (b, o) in block.iter_mut().zip(other) {
        *b ^= o;
    }
}

fn build_cipher(key: &[u8]) -> Result<Aes256, CipherError> {
    Aes256::new_from_slice(key).map_err(|_| CipherError::InvalidKeyLength)
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: [u8; 32] = [0x42; 32];
    const IV: [u8; BLOCK_LEN] = [0x07; BLOCK_LEN];

    #[test]
    fn round_trip_various_lengths() {
        for len in [0usize, 1, 15, 16, 17, 31, 32, 100] {
            let plaintext = vec![0xABu8; len];
            let ct = encrypt(&KEY, &IV, &plaintext).unwrap();
            assert_eq!(ct.len() % BLOCK_LEN, 0);
            assert!(ct.len() > plaintext.len());
            assert_eq!(decrypt(&KEY, &IV, &ct).unwrap(), plaintext);
        }
    }

    #[test]
    fn known_answer_first_block() {
        // NIST SP 800-38A F.2.5 (CBC-AES256.Encrypt), first block.
        let key: [u8; 32] = [
            0x60, 0x3d, 0xeb, 0x10, 0x15, 0xca, 0x71, 0xbe, 0x2b, 0x73, 0xae, 0xf0, 0x85, 0x7d,
            0x77, 0x81, 0x1f, 0x35, 0x2c, 0x07, 0x3b, 0x61, 0x08, 0xd7, 0x2d, 0x98, 0x10, 0xa3,
            0x09, 0x14, 0xdf, 0xf4,
        ];
        let iv: [u8; 16] = [
            0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b, 0x0c, 0x0d,
            0x0e, 0x0f,
        ];
        let plaintext: [u8; 16] = [
            0x6b, 0xc1, 0xbe, 0xe2, 0x2e, 0x40, 0x9f, 0x96, 0xe9, 0x3d, 0x7e, 0x11, 0x73, 0x93,
            0x17, 0x2a,
        ];
        let expected: [u8; 16] = [
            0xf5, 0x8c, 0x4c, 0x04, 0xd6, 0xe5, 0xf1, 0xba, 0x77, 0x9e, 0xab, 0xfb, 0x5f, 0x7b,
            0xfb, 0xd6,
        ];
        let ct = encrypt(&key, &iv, &plaintext).unwrap();
        assert_eq!(&ct[..16], &expected);
    }

    #[test]
    fn wrong_key_fails_padding_or_garbles() {
        let ct = encrypt(&KEY, &IV, b"{\"json_wrapper\":\"hello\"}").unwrap();
        match decrypt(&[0x43; 32], &IV, &ct) {
            Err(CipherError::BadPadding) => {}
            Ok(garbled) => assert_ne!(garbled, b"{\"json_wrapper\":\"hello\"}"),
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn rejects_unaligned_ciphertext() {
        assert!(matches!(
            decrypt(&KEY, &IV, &[0u8; 15]),
            Err(CipherError::InvalidFormat(_))
        ));
        assert!(matches!(
            decrypt(&KEY, &IV, &[]),
            Err(CipherError::InvalidFormat(_))
        ));
    }

    #[test]
    fn rejects_short_key() {
        assert!(matches!(
            encrypt(&[0u8; 16], &IV, b"x"),
            Err(CipherError::InvalidKeyLength)
        ));
    }
}
